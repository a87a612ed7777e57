//! Human-readable report rendering.
//!
//! The report is append-only and always ordered: header, optional
//! "File errors" block, summary, elapsed-time footer. Downstream tools scrape
//! this text, so the order and labels are fixed.

use crate::config::KindFlags;
use crate::models::{Kind, LineClass, ReportLine, RunTotals};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::time::Duration;

pub const END_LINE: &str = "\n";
const BRANCH: &str = "└── ";

/// Colors are on unless disabled by flag or `NO_COLOR`.
pub fn use_colors(no_color: bool) -> bool {
    !no_color && std::env::var_os("NO_COLOR").is_none()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Neutral,
    Warning,
    Error,
    Muted,
    Heading,
    Banner,
}

impl From<LineClass> for Style {
    fn from(c: LineClass) -> Self {
        match c {
            LineClass::Warning => Style::Warning,
            LineClass::Error => Style::Error,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Painter {
    pub color: bool,
}

impl Painter {
    pub fn paint(&self, text: &str, style: Style) -> String {
        if !self.color {
            return text.to_string();
        }
        match style {
            Style::Neutral => text.white().to_string(),
            Style::Warning => text.yellow().to_string(),
            Style::Error => text.red().to_string(),
            Style::Muted => text.bright_black().to_string(),
            Style::Heading => text.underline().to_string(),
            Style::Banner => text.black().on_white().to_string(),
        }
    }
}

/// Identifies the invocation in the report header.
pub struct ReportHeader<'a> {
    pub run_type: &'a str,
    pub name: &'a str,
    pub time: String,
}

/// Compose the whole report (pure) for testing and printing.
pub fn compose_report(
    header: &ReportHeader,
    lines: &[ReportLine],
    totals: &RunTotals,
    yellow: &KindFlags,
    elapsed: Duration,
    painter: Painter,
) -> String {
    let p = painter;
    let mut out = String::new();
    out.push_str(&p.paint(
        &format!(
            "{}Typechecker plugin({}) {}",
            END_LINE, header.run_type, header.name
        ),
        Style::Banner,
    ));
    out.push_str(&p.paint(&format!(".{}", END_LINE), Style::Neutral));
    out.push_str(&p.paint(&format!("Time:{} {}", header.time, END_LINE), Style::Muted));

    if !lines.is_empty() {
        out.push_str(&p.paint(&format!("{}File errors", END_LINE), Style::Heading));
        out.push_str(&p.paint(":", Style::Neutral));
        for line in lines {
            out.push_str(END_LINE);
            out.push_str(&render_line(p, line));
        }
    }

    let total = totals.total();
    out.push_str(&p.paint(&format!("{}{}Errors", END_LINE, END_LINE), Style::Heading));
    out.push_str(&p.paint(&format!(":{}{}", total, END_LINE), Style::Neutral));
    if total > 0 {
        for kind in Kind::ALL {
            let count = totals.count(kind);
            let style = if count == 0 {
                Style::Neutral
            } else if yellow.get(kind) {
                Style::Warning
            } else {
                Style::Error
            };
            let tail = if kind == Kind::Lint {
                format!("{}{}", END_LINE, END_LINE)
            } else {
                END_LINE.to_string()
            };
            out.push_str(&p.paint(
                &format!("{}{}: {}{}", BRANCH, kind.label(), count, tail),
                style,
            ));
        }
    }

    out.push_str(&p.paint(
        &format!("Typechecking time: {}ms{}", elapsed.as_millis(), END_LINE),
        Style::Muted,
    ));
    out
}

fn render_line(p: Painter, line: &ReportLine) -> String {
    let mut s = p.paint(BRANCH, Style::Error);
    // Only located lines carry the level/code tag.
    if let Some(loc) = line.location.as_ref() {
        s.push_str(&p.paint(&format!("{} ", loc), line.class.into()));
        s.push_str(&p.paint(&format!("({})", line.tag), Style::Neutral));
        s.push(' ');
    }
    s.push_str(&line.message);
    s
}

/// Write the report to `out`.
pub fn print_report(
    out: &mut impl Write,
    header: &ReportHeader,
    lines: &[ReportLine],
    totals: &RunTotals,
    yellow: &KindFlags,
    elapsed: Duration,
    painter: Painter,
) -> io::Result<()> {
    out.write_all(compose_report(header, lines, totals, yellow, elapsed, painter).as_bytes())?;
    out.flush()
}

//! Outcome decision: what the invocation does once totals are final.
//!
//! First match wins:
//! 1. a `throwOn*` flag with a nonzero count → `Fatal`
//! 2. `quit` → `Quit`
//! 3. `finished` → `Finished`
//! 4. otherwise → `KeepAlive`

use crate::config::KindFlags;
use crate::error::CheckerError;
use crate::models::{Kind, RunTotals};
use crate::output::{Painter, Style, END_LINE};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Fatal checks run in this order; the first nonzero flagged kind decides.
const FATAL_ORDER: [Kind; 5] = [
    Kind::Global,
    Kind::Options,
    Kind::Semantic,
    Kind::Lint,
    Kind::Syntactic,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A fatal policy matched; carries the kind that triggered it.
    Fatal(Kind),
    Quit,
    Finished,
    KeepAlive,
}

/// Optional channel to a supervising parent process.
pub trait ParentNotifier {
    fn notify_done(&self) -> io::Result<()>;
    fn notify_error(&self) -> io::Result<()>;
}

/// Appends `done` / `error` lines to a file or named pipe the parent reads.
pub struct ChannelNotifier {
    path: PathBuf,
}

impl ChannelNotifier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn send(&self, indicator: &str) -> io::Result<()> {
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(f, "{}", indicator)
    }
}

impl ParentNotifier for ChannelNotifier {
    fn notify_done(&self) -> io::Result<()> {
        self.send("done")
    }

    fn notify_error(&self) -> io::Result<()> {
        self.send("error")
    }
}

pub fn decide(throw: &KindFlags, quit: bool, finished: bool, totals: &RunTotals) -> Outcome {
    if let Some(kind) = FATAL_ORDER
        .iter()
        .find(|k| throw.get(**k) && totals.count(**k) > 0)
    {
        return Outcome::Fatal(*kind);
    }
    if quit {
        Outcome::Quit
    } else if finished {
        Outcome::Finished
    } else {
        Outcome::KeepAlive
    }
}

/// Carry out `outcome`: write the lifecycle footer and signal the parent.
///
/// Returns the grand total for every branch except a fatal outcome without
/// a parent, which becomes `CheckerError::FatalPolicy`.
pub fn conclude(
    outcome: Outcome,
    totals: &RunTotals,
    parent: Option<&dyn ParentNotifier>,
    out: &mut impl Write,
    painter: Painter,
) -> Result<usize, CheckerError> {
    let total = totals.total();
    match outcome {
        Outcome::Fatal(kind) => match parent {
            Some(p) => {
                warn!(kind = kind.label(), total, "fatal policy matched; signalling parent");
                p.notify_error()?;
            }
            None => return Err(CheckerError::FatalPolicy { total }),
        },
        Outcome::Quit => {
            footer(out, painter, "Quitting typechecker")?;
            match parent {
                Some(p) => p.notify_done()?,
                None => debug!("no parent process to notify"),
            }
        }
        Outcome::Finished => footer(out, painter, "Quitting typechecker")?,
        Outcome::KeepAlive => footer(out, painter, "Keeping typechecker alive")?,
    }
    Ok(total)
}

fn footer(out: &mut impl Write, painter: Painter, text: &str) -> io::Result<()> {
    let line = format!("{}{}{}", text, END_LINE, END_LINE);
    out.write_all(painter.paint(&line, Style::Muted).as_bytes())?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    const PLAIN: Painter = Painter { color: false };

    #[derive(Default)]
    struct Recorder {
        sent: RefCell<Vec<&'static str>>,
    }

    impl ParentNotifier for Recorder {
        fn notify_done(&self) -> io::Result<()> {
            self.sent.borrow_mut().push("done");
            Ok(())
        }

        fn notify_error(&self) -> io::Result<()> {
            self.sent.borrow_mut().push("error");
            Ok(())
        }
    }

    fn totals(global: usize, semantic: usize) -> RunTotals {
        RunTotals {
            global,
            semantic,
            ..Default::default()
        }
    }

    #[test]
    fn test_fatal_beats_quit() {
        let throw = KindFlags {
            global: true,
            ..Default::default()
        };
        assert_eq!(
            decide(&throw, true, true, &totals(1, 0)),
            Outcome::Fatal(Kind::Global)
        );
    }

    #[test]
    fn test_fatal_needs_flag_and_count() {
        let throw = KindFlags {
            semantic: true,
            ..Default::default()
        };
        assert_eq!(decide(&throw, false, false, &totals(3, 0)), Outcome::KeepAlive);
        assert_eq!(
            decide(&KindFlags::default(), false, true, &totals(0, 5)),
            Outcome::Finished
        );
    }

    #[test]
    fn test_fatal_order_picks_global_before_semantic() {
        let throw = KindFlags {
            global: true,
            semantic: true,
            ..Default::default()
        };
        assert_eq!(
            decide(&throw, false, false, &totals(1, 1)),
            Outcome::Fatal(Kind::Global)
        );
    }

    #[test]
    fn test_lifecycle_priority() {
        let none = KindFlags::default();
        let zero = RunTotals::default();
        assert_eq!(decide(&none, true, true, &zero), Outcome::Quit);
        assert_eq!(decide(&none, false, true, &zero), Outcome::Finished);
        assert_eq!(decide(&none, false, false, &zero), Outcome::KeepAlive);
    }

    #[test]
    fn test_fatal_without_parent_is_an_error_carrying_total() {
        let mut out = Vec::new();
        let err = conclude(Outcome::Fatal(Kind::Semantic), &totals(0, 2), None, &mut out, PLAIN)
            .unwrap_err();
        assert!(matches!(err, CheckerError::FatalPolicy { total: 2 }));
        assert_eq!(err.exit_code(), 1);
        assert!(out.is_empty());
    }

    #[test]
    fn test_fatal_with_parent_signals_error_and_returns_total() {
        let parent = Recorder::default();
        let mut out = Vec::new();
        let total = conclude(
            Outcome::Fatal(Kind::Semantic),
            &totals(0, 2),
            Some(&parent),
            &mut out,
            PLAIN,
        )
        .unwrap();
        assert_eq!(total, 2);
        assert_eq!(*parent.sent.borrow(), vec!["error"]);
    }

    #[test]
    fn test_quit_signals_done_and_finished_does_not() {
        let parent = Recorder::default();
        let mut out = Vec::new();
        conclude(Outcome::Quit, &RunTotals::default(), Some(&parent), &mut out, PLAIN).unwrap();
        conclude(Outcome::Finished, &RunTotals::default(), Some(&parent), &mut out, PLAIN).unwrap();
        conclude(Outcome::KeepAlive, &totals(1, 0), Some(&parent), &mut out, PLAIN).unwrap();
        assert_eq!(*parent.sent.borrow(), vec!["done"]);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Quitting typechecker\n\nQuitting typechecker\n\nKeeping typechecker alive\n\n"
        );
    }

    #[test]
    fn test_channel_notifier_appends_indicators() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parent.chan");
        let n = ChannelNotifier::new(&path);
        n.notify_done().unwrap();
        n.notify_error().unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "done\nerror\n");
    }
}

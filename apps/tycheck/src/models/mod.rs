//! Shared data models: categorized diagnostics, lint failures, report lines
//! and the per-category totals the summary and the outcome decision read.

pub mod position;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Type-checker diagnostic class, in collection order.
pub enum Category {
    Options,
    Global,
    Syntactic,
    Semantic,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Options,
        Category::Global,
        Category::Syntactic,
        Category::Semantic,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// A summary bucket: one of the four diagnostic categories or the linter.
///
/// Color and fatal policies are configured per kind.
pub enum Kind {
    Options,
    Global,
    Syntactic,
    Semantic,
    Lint,
}

impl Kind {
    /// Summary order.
    pub const ALL: [Kind; 5] = [
        Kind::Options,
        Kind::Global,
        Kind::Syntactic,
        Kind::Semantic,
        Kind::Lint,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Kind::Options => "Options",
            Kind::Global => "Global",
            Kind::Syntactic => "Syntactic",
            Kind::Semantic => "Semantic",
            Kind::Lint => "TsLint",
        }
    }
}

impl From<Category> for Kind {
    fn from(c: Category) -> Self {
        match c {
            Category::Options => Kind::Options,
            Category::Global => Kind::Global,
            Category::Syntactic => Kind::Syntactic,
            Category::Semantic => Kind::Semantic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The engine's own level for a diagnostic, shown next to the code.
pub enum DiagnosticLevel {
    Warning,
    Error,
    Suggestion,
    Message,
}

impl DiagnosticLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticLevel::Warning => "Warning",
            DiagnosticLevel::Error => "Error",
            DiagnosticLevel::Suggestion => "Suggestion",
            DiagnosticLevel::Message => "Message",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "warning" => Some(DiagnosticLevel::Warning),
            "error" => Some(DiagnosticLevel::Error),
            "suggestion" => Some(DiagnosticLevel::Suggestion),
            "message" => Some(DiagnosticLevel::Message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Diagnostic message text, possibly a chain of nested causes.
pub enum MessageText {
    Plain(String),
    Chain { text: String, next: Vec<MessageText> },
}

impl MessageText {
    /// Join the chain into one string. Nested parts start on a new line
    /// (`newline`) and are indented two spaces per level.
    pub fn flatten(&self, newline: &str) -> String {
        let mut out = String::new();
        self.flatten_into(newline, 0, &mut out);
        out
    }

    fn flatten_into(&self, newline: &str, depth: usize, out: &mut String) {
        if depth > 0 {
            out.push_str(newline);
            for _ in 0..depth {
                out.push_str("  ");
            }
        }
        match self {
            MessageText::Plain(text) => out.push_str(text),
            MessageText::Chain { text, next } => {
                out.push_str(text);
                for part in next {
                    part.flatten_into(newline, depth + 1, out);
                }
            }
        }
    }
}

impl From<&str> for MessageText {
    fn from(s: &str) -> Self {
        MessageText::Plain(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A diagnostic as the type-checking engine hands it over, before it is
/// tagged with a category. `start` is a character offset into the file.
pub struct EngineDiagnostic {
    pub file: Option<String>,
    pub start: Option<usize>,
    pub code: u32,
    pub level: DiagnosticLevel,
    pub message: MessageText,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// 0-based position inside a named file.
pub struct Location {
    pub file: String,
    pub line: usize,
    pub character: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A categorized type-checker finding. Built once by the session and read
/// by the normalizer; it has no setters.
pub struct Diagnostic {
    category: Category,
    location: Option<Location>,
    code: u32,
    level: DiagnosticLevel,
    message: MessageText,
}

impl Diagnostic {
    pub fn new(
        category: Category,
        location: Option<Location>,
        code: u32,
        level: DiagnosticLevel,
        message: MessageText,
    ) -> Self {
        Self {
            category,
            location,
            code,
            level,
            message,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn code(&self) -> u32 {
        self.code
    }

    pub fn level(&self) -> DiagnosticLevel {
        self.level
    }

    pub fn message(&self) -> &MessageText {
        &self.message
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Lint rule severity.
pub enum RuleSeverity {
    Warning,
    Error,
}

impl RuleSeverity {
    /// Case-insensitive; `warn` is accepted as an alias.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "warning" | "warn" => Some(RuleSeverity::Warning),
            "error" => Some(RuleSeverity::Error),
            _ => None,
        }
    }

    /// Capitalized display form.
    pub fn as_str(self) -> &'static str {
        match self {
            RuleSeverity::Warning => "Warning",
            RuleSeverity::Error => "Error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One lint finding. Positions are 0-based.
pub struct LintFailure {
    pub file: String,
    pub line: usize,
    pub character: usize,
    pub rule: String,
    pub severity: RuleSeverity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Lint failures of a single file. Sessions only keep non-empty ones.
pub struct FileLintResult {
    pub file: String,
    pub failures: Vec<LintFailure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Display class of a report line.
pub enum LineClass {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A normalized line of the "File errors" block.
pub struct ReportLine {
    pub kind: Kind,
    /// `file (line,char)`, 1-based.
    pub location: Option<String>,
    pub class: LineClass,
    /// `Level:TScode` or `Severity:rule`.
    pub tag: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
/// What the TsLint summary counter counts.
pub enum LintCountUnit {
    /// Files with at least one failure.
    #[default]
    Files,
    /// Individual failures.
    Failures,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Per-kind finding counts.
pub struct RunTotals {
    pub options: usize,
    pub global: usize,
    pub syntactic: usize,
    pub semantic: usize,
    pub lint: usize,
}

impl RunTotals {
    pub fn count(&self, kind: Kind) -> usize {
        match kind {
            Kind::Options => self.options,
            Kind::Global => self.global,
            Kind::Syntactic => self.syntactic,
            Kind::Semantic => self.semantic,
            Kind::Lint => self.lint,
        }
    }

    /// Grand total across all five kinds.
    pub fn total(&self) -> usize {
        Kind::ALL.iter().map(|k| self.count(*k)).sum()
    }
}

//! Normalization of type-checker diagnostics and lint failures into
//! uniform report lines.
//!
//! Both mappings are pure: the same input always yields the same line.
//! Positions become 1-based here; the per-kind `yellowOn*` flag picks the
//! display class without affecting any count.

use crate::config::KindFlags;
use crate::models::{
    Diagnostic, FileLintResult, Kind, LineClass, LintFailure, ReportLine,
};
use tracing::warn;

/// Separator used inside flattened multi-part messages.
pub const LINE_SEPARATOR: &str = "\n";

fn class_for(kind: Kind, yellow: &KindFlags) -> LineClass {
    if yellow.get(kind) {
        LineClass::Warning
    } else {
        LineClass::Error
    }
}

pub fn normalize_diagnostic(diag: &Diagnostic, yellow: &KindFlags) -> ReportLine {
    let kind = Kind::from(diag.category());
    ReportLine {
        kind,
        location: diag
            .location()
            .map(|l| format!("{} ({},{})", l.file, l.line + 1, l.character + 1)),
        class: class_for(kind, yellow),
        tag: format!("{}:TS{}", diag.level().as_str(), diag.code()),
        message: diag.message().flatten(LINE_SEPARATOR),
    }
}

pub fn normalize_failure(failure: &LintFailure, yellow: &KindFlags) -> ReportLine {
    ReportLine {
        kind: Kind::Lint,
        location: Some(format!(
            "{} ({},{})",
            failure.file,
            failure.line + 1,
            failure.character + 1
        )),
        class: class_for(Kind::Lint, yellow),
        tag: format!("{}:{}", failure.severity.as_str(), failure.rule),
        message: failure.message.clone(),
    }
}

/// Flatten per-file lint results into lines, in file then failure order.
///
/// A failure filed under another file's result is still reported, under
/// its own file name, and logged.
pub fn flatten_lint_results(results: &[FileLintResult], yellow: &KindFlags) -> Vec<ReportLine> {
    let mut out = Vec::new();
    for result in results {
        for failure in &result.failures {
            if failure.file != result.file {
                warn!(
                    result = %result.file,
                    failure = %failure.file,
                    rule = %failure.rule,
                    "lint failure filed under a different file"
                );
            }
            out.push(normalize_failure(failure, yellow));
        }
    }
    out
}

/// All report lines: diagnostics first, then lint failures.
pub fn report_lines(
    diagnostics: &[Diagnostic],
    lint_results: &[FileLintResult],
    yellow: &KindFlags,
) -> Vec<ReportLine> {
    diagnostics
        .iter()
        .map(|d| normalize_diagnostic(d, yellow))
        .chain(flatten_lint_results(lint_results, yellow))
        .collect()
}

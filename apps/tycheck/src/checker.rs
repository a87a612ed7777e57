//! One checker invocation: configure, render, decide.
//!
//! `Checker` keeps the last program between invocations so a host that
//! re-triggers it (the KeepAlive model) gets incremental re-analysis.

use crate::config::RunConfiguration;
use crate::engine::{LintEngine, TypeEngine};
use crate::error::CheckerError;
use crate::normalize::report_lines;
use crate::outcome::{conclude, decide, Outcome, ParentNotifier};
use crate::output::{print_report, Painter, ReportHeader};
use crate::session::{configure, Session};
use std::io::{BufRead, Write};
use tracing::debug;

/// What an invocation ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub outcome: Outcome,
    pub total: usize,
}

pub struct Checker<E: TypeEngine, L: LintEngine> {
    engine: E,
    linter: L,
    previous: Option<E::Program>,
    parent: Option<Box<dyn ParentNotifier>>,
    painter: Painter,
}

impl<E: TypeEngine, L: LintEngine> Checker<E, L> {
    pub fn new(engine: E, linter: L) -> Self {
        Self {
            engine,
            linter,
            previous: None,
            parent: None,
            painter: Painter { color: false },
        }
    }

    pub fn with_parent(mut self, parent: Box<dyn ParentNotifier>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.painter = Painter { color };
        self
    }

    /// Build a session, seeding it with the previous invocation's program.
    pub fn configure(
        &mut self,
        config: &RunConfiguration,
    ) -> Result<Session<E::Program>, CheckerError> {
        configure(config, &self.engine, &self.linter, self.previous.take())
    }

    /// Render the session's report to `out` and carry out the outcome.
    pub fn typecheck(
        &mut self,
        config: &RunConfiguration,
        session: Session<E::Program>,
        time: String,
        out: &mut impl Write,
    ) -> Result<Verdict, CheckerError> {
        let lines = report_lines(&session.diagnostics, &session.lint_results, &config.yellow);
        let header = ReportHeader {
            run_type: &config.run_type,
            name: &config.name,
            time,
        };
        let totals = session.totals(config.lint_count);
        print_report(
            out,
            &header,
            &lines,
            &totals,
            &config.yellow,
            session.elapsed,
            self.painter,
        )?;
        self.previous = Some(session.into_program());

        let outcome = decide(&config.throw, config.quit, config.finished, &totals);
        let total = conclude(
            outcome,
            &totals,
            self.parent.as_deref(),
            out,
            self.painter,
        )?;
        Ok(Verdict { outcome, total })
    }

    /// `configure` then `typecheck`, stamping the header with local time.
    pub fn run(
        &mut self,
        config: &RunConfiguration,
        out: &mut impl Write,
    ) -> Result<Verdict, CheckerError> {
        let session = self.configure(config)?;
        let time = chrono::Local::now().format("%a %b %d %Y %H:%M:%S").to_string();
        self.typecheck(config, session, time, out)
    }

    /// Run once, then, while `listen` is set and the outcome is KeepAlive,
    /// run again for every line read from `triggers`. EOF ends the loop.
    pub fn serve(
        &mut self,
        config: &RunConfiguration,
        listen: bool,
        triggers: impl BufRead,
        out: &mut impl Write,
    ) -> Result<Verdict, CheckerError> {
        let mut lines = triggers.lines();
        loop {
            let verdict = self.run(config, out)?;
            if verdict.outcome != Outcome::KeepAlive || !listen {
                return Ok(verdict);
            }
            match lines.next() {
                Some(line) => {
                    line?;
                    debug!("re-run triggered");
                }
                None => return Ok(verdict),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{diag, FakeEngine, FakeLinter};

    #[test]
    fn test_run_writes_report_then_footer() {
        let engine = FakeEngine::default()
            .file("a.ts", "let a = 1;")
            .semantic(diag(Some("a.ts"), Some(4), 2322, "bad"));
        let mut checker = Checker::new(engine, FakeLinter::default());
        let config = RunConfiguration {
            finished: true,
            ..Default::default()
        };
        let mut out = Vec::new();
        let verdict = checker.run(&config, &mut out).unwrap();
        assert_eq!(verdict, Verdict { outcome: Outcome::Finished, total: 1 });
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("└── a.ts (1,5) (Error:TS2322) bad"));
        assert!(text.ends_with("Quitting typechecker\n\n"));
        assert!(text.find("Typechecking time:").unwrap() < text.find("Quitting").unwrap());
    }

    #[test]
    fn test_program_is_reused_across_invocations() {
        let mut checker = Checker::new(FakeEngine::default().file("a.ts", "x"), FakeLinter::default());
        let config = RunConfiguration::default();
        let mut out = Vec::new();
        checker.run(&config, &mut out).unwrap();
        let session = checker.configure(&config).unwrap();
        assert_eq!(session.program.generation, 1);
    }

    fn runs(out: &[u8]) -> usize {
        String::from_utf8_lossy(out).matches("Typechecker plugin").count()
    }

    #[test]
    fn test_serve_reruns_on_each_line_until_eof() {
        let mut checker = Checker::new(FakeEngine::default().file("a.ts", "x"), FakeLinter::default());
        let config = RunConfiguration::default();
        let mut out = Vec::new();
        let verdict = checker
            .serve(&config, true, "\nagain\n".as_bytes(), &mut out)
            .unwrap();
        assert_eq!(verdict.outcome, Outcome::KeepAlive);
        assert_eq!(runs(&out), 3);
        // Each re-run was seeded with the program before it.
        let session = checker.configure(&config).unwrap();
        assert_eq!(session.program.generation, 3);
    }

    #[test]
    fn test_serve_runs_once_without_listen_or_keep_alive() {
        let mut checker = Checker::new(FakeEngine::default().file("a.ts", "x"), FakeLinter::default());
        let mut out = Vec::new();
        checker
            .serve(&RunConfiguration::default(), false, "\n\n".as_bytes(), &mut out)
            .unwrap();
        assert_eq!(runs(&out), 1);

        let finished = RunConfiguration {
            finished: true,
            ..Default::default()
        };
        let mut out = Vec::new();
        let verdict = checker.serve(&finished, true, "\n\n".as_bytes(), &mut out).unwrap();
        assert_eq!(verdict.outcome, Outcome::Finished);
        assert_eq!(runs(&out), 1);
    }
}

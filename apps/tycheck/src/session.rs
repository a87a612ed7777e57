//! Session configuration: build the program, collect categorized
//! diagnostics and lint the program's files.

use crate::config::RunConfiguration;
use crate::engine::{LintEngine, Program, TypeEngine};
use crate::error::CheckerError;
use crate::models::position::LineMap;
use crate::models::{
    Category, Diagnostic, EngineDiagnostic, FileLintResult, LintCountUnit, Location, RunTotals,
};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Analysis outputs of one configuration step.
pub struct Session<P> {
    pub program: P,
    /// Options, global, syntactic then semantic diagnostics.
    pub diagnostics: Vec<Diagnostic>,
    /// Only files with at least one failure.
    pub lint_results: Vec<FileLintResult>,
    /// Wall-clock time of diagnostics collection plus linting.
    pub elapsed: Duration,
}

/// Build a session for `config`. `previous` seeds the new program.
pub fn configure<E, L>(
    config: &RunConfiguration,
    engine: &E,
    linter: &L,
    previous: Option<E::Program>,
) -> Result<Session<E::Program>, CheckerError>
where
    E: TypeEngine,
    L: LintEngine,
{
    let start = Instant::now();
    let project = engine.parse_project(&config.ts_config_obj, &config.base_path)?;
    let program = engine.create_program(&project, previous)?;
    let diagnostics = collect_diagnostics(&program);

    let mut lint_results = Vec::new();
    if let Some(ts_lint) = config.ts_lint.as_ref() {
        let full_path = config.base_path.join(ts_lint);
        let lint_config = linter.find_configuration(&full_path, &config.base_path)?;
        for file in linter.file_names(&program) {
            let text = program
                .source_text(&file)
                .ok_or_else(|| CheckerError::MissingSource(file.clone()))?;
            let failures = linter.lint(&file, text, &lint_config, &config.lint_options)?;
            if failures.is_empty() {
                continue;
            }
            lint_results.push(FileLintResult { file, failures });
        }
    }

    let elapsed = start.elapsed();
    info!(
        diagnostics = diagnostics.len(),
        lint_files = lint_results.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "session configured"
    );
    Ok(Session {
        program,
        diagnostics,
        lint_results,
        elapsed,
    })
}

/// Tag every engine diagnostic with its category, in collection order.
pub fn collect_diagnostics<P: Program>(program: &P) -> Vec<Diagnostic> {
    let mut line_maps: HashMap<String, LineMap> = HashMap::new();
    let sets = [
        (Category::Options, program.options_diagnostics()),
        (Category::Global, program.global_diagnostics()),
        (Category::Syntactic, program.syntactic_diagnostics()),
        (Category::Semantic, program.semantic_diagnostics()),
    ];
    let mut out = Vec::new();
    for (category, set) in sets {
        for raw in set {
            let location = locate(program, &raw, &mut line_maps);
            out.push(Diagnostic::new(
                category,
                location,
                raw.code,
                raw.level,
                raw.message,
            ));
        }
    }
    out
}

/// 0-based location of a diagnostic, when its file and offset resolve.
fn locate<P: Program>(
    program: &P,
    raw: &EngineDiagnostic,
    line_maps: &mut HashMap<String, LineMap>,
) -> Option<Location> {
    let file = raw.file.as_ref()?;
    let start = raw.start?;
    if !line_maps.contains_key(file) {
        let Some(text) = program.source_text(file) else {
            debug!(file = %file, "diagnostic file has no text; rendering without location");
            return None;
        };
        line_maps.insert(file.clone(), LineMap::new(text));
    }
    let (line, character) = line_maps.get(file)?.line_and_character(start);
    Some(Location {
        file: file.clone(),
        line,
        character,
    })
}

impl<P: Program> Session<P> {
    /// Per-kind counts, asking the program for its diagnostics again rather
    /// than reusing `self.diagnostics`.
    pub fn totals(&self, unit: LintCountUnit) -> RunTotals {
        let lint = match unit {
            LintCountUnit::Files => self.lint_results.len(),
            LintCountUnit::Failures => self.lint_results.iter().map(|r| r.failures.len()).sum(),
        };
        RunTotals {
            options: self.program.options_diagnostics().len(),
            global: self.program.global_diagnostics().len(),
            syntactic: self.program.syntactic_diagnostics().len(),
            semantic: self.program.semantic_diagnostics().len(),
            lint,
        }
    }

    /// Give the program back for seeding the next invocation.
    pub fn into_program(self) -> P {
        self.program
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{diag, failure, FakeEngine, FakeLinter};

    fn lint_config() -> RunConfiguration {
        RunConfiguration {
            ts_lint: Some("tslint.json".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_collects_categories_in_order_with_locations() {
        let engine = FakeEngine::default()
            .file("a.ts", "let a = 1;\nlet b: string = 2;\n")
            .semantic(diag(Some("a.ts"), Some(15), 2322, "not assignable"))
            .options(diag(None, None, 5023, "unknown option"))
            .global(diag(None, None, 2318, "no global Array"));
        let session =
            configure(&RunConfiguration::default(), &engine, &FakeLinter::default(), None).unwrap();
        let cats: Vec<Category> = session.diagnostics.iter().map(|d| d.category()).collect();
        assert_eq!(
            cats,
            vec![Category::Options, Category::Global, Category::Semantic]
        );
        let loc = session.diagnostics[2].location().unwrap();
        assert_eq!((loc.file.as_str(), loc.line, loc.character), ("a.ts", 1, 4));
        assert!(session.diagnostics[0].location().is_none());
    }

    #[test]
    fn test_lint_skipped_without_config_path() {
        let engine = FakeEngine::default().file("a.ts", "x");
        let linter = FakeLinter::default().fail("a.ts", vec![failure("a.ts", "semicolon", "error")]);
        let session = configure(&RunConfiguration::default(), &engine, &linter, None).unwrap();
        assert!(session.lint_results.is_empty());
        assert_eq!(linter.calls(), 0);
    }

    #[test]
    fn test_clean_files_are_dropped_from_lint_results() {
        let engine = FakeEngine::default()
            .file("a.ts", "a")
            .file("b.ts", "b")
            .file("c.ts", "c");
        let linter = FakeLinter::default()
            .fail("b.ts", vec![failure("b.ts", "semicolon", "error")])
            .fail(
                "c.ts",
                vec![
                    failure("c.ts", "quotemark", "warning"),
                    failure("c.ts", "no-var-keyword", "error"),
                ],
            );
        let session = configure(&lint_config(), &engine, &linter, None).unwrap();
        let files: Vec<&str> = session.lint_results.iter().map(|r| r.file.as_str()).collect();
        assert_eq!(files, vec!["b.ts", "c.ts"]);
        assert_eq!(linter.calls(), 3);
        assert_eq!(session.totals(LintCountUnit::Files).lint, 2);
        assert_eq!(session.totals(LintCountUnit::Failures).lint, 3);
    }

    #[test]
    fn test_missing_source_text_fails_loudly() {
        let engine = FakeEngine::default().file("a.ts", "a").phantom("ghost.ts");
        let err = configure(&lint_config(), &engine, &FakeLinter::default(), None)
            .err()
            .unwrap();
        assert!(matches!(err, CheckerError::MissingSource(f) if f == "ghost.ts"));
    }

    #[test]
    fn test_lint_configuration_error_propagates() {
        let engine = FakeEngine::default().file("a.ts", "a");
        let linter = FakeLinter::default().broken_config();
        let err = configure(&lint_config(), &engine, &linter, None).err().unwrap();
        assert!(matches!(err, CheckerError::Engine(_)));
    }

    #[test]
    fn test_previous_program_is_threaded_into_engine() {
        let engine = FakeEngine::default().file("a.ts", "a");
        let linter = FakeLinter::default();
        let first = configure(&RunConfiguration::default(), &engine, &linter, None).unwrap();
        assert_eq!(first.program.generation, 0);
        let second = configure(
            &RunConfiguration::default(),
            &engine,
            &linter,
            Some(first.into_program()),
        )
        .unwrap();
        assert_eq!(second.program.generation, 1);
    }

    #[test]
    fn test_totals_recomputed_from_program() {
        let engine = FakeEngine::default()
            .file("a.ts", "abc")
            .syntactic(diag(Some("a.ts"), Some(1), 1005, "';' expected"))
            .semantic(diag(Some("a.ts"), Some(0), 2304, "cannot find name"))
            .semantic(diag(Some("a.ts"), Some(2), 2304, "cannot find name"));
        let session =
            configure(&RunConfiguration::default(), &engine, &FakeLinter::default(), None).unwrap();
        let totals = session.totals(LintCountUnit::Files);
        assert_eq!(totals.syntactic, 1);
        assert_eq!(totals.semantic, 2);
        assert_eq!(totals.total(), 3);
    }
}

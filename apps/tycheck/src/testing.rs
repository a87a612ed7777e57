//! In-memory engines for unit tests.

use crate::config::LintOptions;
use crate::engine::{EngineError, LintEngine, ParsedProject, Program, TypeEngine};
use crate::models::{DiagnosticLevel, EngineDiagnostic, LintFailure, RuleSeverity};
use serde_json::Value as Json;
use std::cell::Cell;
use std::collections::HashMap;
use std::path::Path;

pub fn diag(file: Option<&str>, start: Option<usize>, code: u32, msg: &str) -> EngineDiagnostic {
    EngineDiagnostic {
        file: file.map(str::to_string),
        start,
        code,
        level: DiagnosticLevel::Error,
        message: msg.into(),
    }
}

pub fn failure(file: &str, rule: &str, severity: &str) -> LintFailure {
    LintFailure {
        file: file.to_string(),
        line: 0,
        character: 0,
        rule: rule.to_string(),
        severity: RuleSeverity::parse(severity).unwrap_or(RuleSeverity::Error),
        message: format!("{} failed", rule),
    }
}

#[derive(Default, Clone)]
pub struct FakeEngine {
    files: Vec<String>,
    texts: HashMap<String, String>,
    sets: [Vec<EngineDiagnostic>; 4],
}

impl FakeEngine {
    pub fn file(mut self, name: &str, text: &str) -> Self {
        self.files.push(name.to_string());
        self.texts.insert(name.to_string(), text.to_string());
        self
    }

    /// A program file without text.
    pub fn phantom(mut self, name: &str) -> Self {
        self.files.push(name.to_string());
        self
    }

    pub fn options(mut self, d: EngineDiagnostic) -> Self {
        self.sets[0].push(d);
        self
    }

    pub fn global(mut self, d: EngineDiagnostic) -> Self {
        self.sets[1].push(d);
        self
    }

    pub fn syntactic(mut self, d: EngineDiagnostic) -> Self {
        self.sets[2].push(d);
        self
    }

    pub fn semantic(mut self, d: EngineDiagnostic) -> Self {
        self.sets[3].push(d);
        self
    }
}

pub struct FakeProgram {
    pub generation: usize,
    engine: FakeEngine,
}

impl Program for FakeProgram {
    fn options_diagnostics(&self) -> Vec<EngineDiagnostic> {
        self.engine.sets[0].clone()
    }

    fn global_diagnostics(&self) -> Vec<EngineDiagnostic> {
        self.engine.sets[1].clone()
    }

    fn syntactic_diagnostics(&self) -> Vec<EngineDiagnostic> {
        self.engine.sets[2].clone()
    }

    fn semantic_diagnostics(&self) -> Vec<EngineDiagnostic> {
        self.engine.sets[3].clone()
    }

    fn file_names(&self) -> Vec<String> {
        self.engine.files.clone()
    }

    fn source_text(&self, file: &str) -> Option<&str> {
        self.engine.texts.get(file).map(String::as_str)
    }
}

impl TypeEngine for FakeEngine {
    type Program = FakeProgram;

    fn parse_project(&self, config: &Json, base_path: &Path) -> Result<ParsedProject, EngineError> {
        Ok(ParsedProject {
            file_names: self.files.clone(),
            options: config.clone(),
            base_path: base_path.to_path_buf(),
        })
    }

    fn create_program(
        &self,
        _project: &ParsedProject,
        previous: Option<FakeProgram>,
    ) -> Result<FakeProgram, EngineError> {
        Ok(FakeProgram {
            generation: previous.map(|p| p.generation + 1).unwrap_or(0),
            engine: self.clone(),
        })
    }
}

#[derive(Default)]
pub struct FakeLinter {
    failures: HashMap<String, Vec<LintFailure>>,
    broken: bool,
    calls: Cell<usize>,
}

impl FakeLinter {
    pub fn fail(mut self, file: &str, failures: Vec<LintFailure>) -> Self {
        self.failures.insert(file.to_string(), failures);
        self
    }

    pub fn broken_config(mut self) -> Self {
        self.broken = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl LintEngine for FakeLinter {
    type Config = ();

    fn find_configuration(&self, path: &Path, _base_path: &Path) -> Result<(), EngineError> {
        if self.broken {
            return Err(EngineError::LintConfigMissing(path.to_path_buf()));
        }
        Ok(())
    }

    fn lint(
        &self,
        file: &str,
        _text: &str,
        _config: &(),
        _options: &LintOptions,
    ) -> Result<Vec<LintFailure>, EngineError> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.failures.get(file).cloned().unwrap_or_default())
    }
}

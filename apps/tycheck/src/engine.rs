//! Seams to the external analysis engines.
//!
//! The type checker builds a program over a resolved file list and reports
//! four diagnostic sets; the linter resolves a rule configuration once and
//! lints one file at a time. Both are black boxes to the rest of the crate.

use crate::config::LintOptions;
use crate::models::{EngineDiagnostic, LintFailure};
use serde_json::Value as Json;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("`{command}` failed with status {status}: {stderr}")]
    Failed {
        command: String,
        status: i32,
        stderr: String,
    },

    #[error("invalid project configuration: {0}")]
    Project(String),

    #[error("invalid glob pattern '{pattern}': {source}")]
    Glob {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("lint configuration not found: {0}")]
    LintConfigMissing(PathBuf),

    #[error("malformed lint configuration {path}: {reason}")]
    LintConfigMalformed { path: PathBuf, reason: String },

    #[error("unreadable linter output for {file}: {source}")]
    LintOutput {
        file: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq)]
/// Project configuration resolved against the host filesystem.
pub struct ParsedProject {
    /// Source files relative to `base_path`, sorted.
    pub file_names: Vec<String>,
    /// `compilerOptions`, passed through to the engine.
    pub options: Json,
    pub base_path: PathBuf,
}

/// A type-checked program.
pub trait Program {
    fn options_diagnostics(&self) -> Vec<EngineDiagnostic>;
    fn global_diagnostics(&self) -> Vec<EngineDiagnostic>;
    fn syntactic_diagnostics(&self) -> Vec<EngineDiagnostic>;
    fn semantic_diagnostics(&self) -> Vec<EngineDiagnostic>;
    /// Files known to the program, in program order.
    fn file_names(&self) -> Vec<String>;
    /// Full text of a program file.
    fn source_text(&self, file: &str) -> Option<&str>;
}

pub trait TypeEngine {
    type Program: Program;

    /// Resolve the project object into files and options.
    fn parse_project(&self, config: &Json, base_path: &Path) -> Result<ParsedProject, EngineError> {
        crate::project::resolve_project(config, base_path)
    }

    /// Build a program. `previous` seeds the new one when present.
    fn create_program(
        &self,
        project: &ParsedProject,
        previous: Option<Self::Program>,
    ) -> Result<Self::Program, EngineError>;
}

pub trait LintEngine {
    type Config;

    fn find_configuration(&self, path: &Path, base_path: &Path)
        -> Result<Self::Config, EngineError>;

    /// Files to lint; every program file by default.
    fn file_names<P: Program>(&self, program: &P) -> Vec<String> {
        program.file_names()
    }

    /// Lint one file. `text` is the program's current text for `file`.
    /// Engines that can only read from disk lint the file as it is there
    /// and should report when it no longer matches `text`.
    fn lint(
        &self,
        file: &str,
        text: &str,
        config: &Self::Config,
        options: &LintOptions,
    ) -> Result<Vec<LintFailure>, EngineError>;
}

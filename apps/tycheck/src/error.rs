//! Error taxonomy for one checker invocation.
//!
//! Findings are never errors. Engine failures pass through unmodified; the
//! fatal-policy outcome is its own variant so callers can tell a configured
//! escalation from a broken run.

use crate::engine::EngineError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CheckerError {
    #[error("failed to load {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("lint target '{0}' has no source text in the program")]
    MissingSource(String),

    #[error("Typechecker throwing error due to throw options set ({total} finding(s))")]
    FatalPolicy { total: usize },

    #[error("failed to write report: {0}")]
    Output(#[from] std::io::Error),
}

impl CheckerError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CheckerError::FatalPolicy { .. } => 1,
            _ => 2,
        }
    }
}

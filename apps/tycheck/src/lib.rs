//! Tycheck core library.
//!
//! This crate runs an external type checker and linter over a project,
//! aggregates both result sets into one report, and decides whether the
//! build pipeline should continue, stop, or fail.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective run configuration.
//! - `engine`: Traits for the type-checking and lint engines.
//! - `project`: Project file resolution over the host filesystem.
//! - `tsc` / `tslint`: Engines backed by external processes.
//! - `session`: Program build, categorized diagnostics, filtered lint results.
//! - `normalize`: Diagnostics and lint failures to uniform report lines.
//! - `output`: Report rendering.
//! - `outcome`: Continue/finish/fail decision and parent signalling.
//! - `checker`: One invocation end to end.
//! - `models`: Shared data models.
pub mod checker;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod normalize;
pub mod outcome;
pub mod output;
pub mod project;
pub mod session;
pub mod tsc;
pub mod tslint;

#[cfg(test)]
mod testing;

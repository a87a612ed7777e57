//! Lint engine backed by an external `tslint` process.
//!
//! The rule configuration is resolved and validated once per session. Each
//! file is linted with `-t json`; the JSON failure array becomes
//! `LintFailure`s named after the program's file.
//!
//! `tslint` reads the file itself, so the program's text is only compared
//! against the disk; a mismatch is logged and the disk copy is linted.

use crate::config::LintOptions;
use crate::engine::{EngineError, LintEngine};
use crate::models::{LintFailure, RuleSeverity};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

/// `tslint` exits with 2 when the file has failures.
const FAILURES_FOUND: i32 = 2;

pub struct TslintEngine {
    command: Vec<String>,
}

impl TslintEngine {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

#[derive(Debug, Clone)]
/// A validated rule configuration file.
pub struct TslintConfig {
    pub path: PathBuf,
    pub base_path: PathBuf,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFailure {
    failure: String,
    rule_name: String,
    #[serde(default)]
    rule_severity: String,
    start_position: RawPosition,
}

#[derive(Deserialize)]
struct RawPosition {
    line: usize,
    character: usize,
}

impl LintEngine for TslintEngine {
    type Config = TslintConfig;

    fn find_configuration(&self, path: &Path, base_path: &Path) -> Result<TslintConfig, EngineError> {
        if !path.is_file() {
            return Err(EngineError::LintConfigMissing(path.to_path_buf()));
        }
        let s = fs::read_to_string(path).map_err(|source| EngineError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let malformed = |reason: String| EngineError::LintConfigMalformed {
            path: path.to_path_buf(),
            reason,
        };
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let is_mapping = if is_yaml {
            serde_yaml::from_str::<serde_yaml::Value>(&s)
                .map_err(|e| malformed(e.to_string()))?
                .is_mapping()
        } else {
            serde_json::from_str::<serde_json::Value>(&s)
                .map_err(|e| malformed(e.to_string()))?
                .is_object()
        };
        if !is_mapping {
            return Err(malformed("top level must be a mapping".into()));
        }
        debug!(config = %path.display(), "lint configuration resolved");
        Ok(TslintConfig {
            path: path.to_path_buf(),
            base_path: base_path.to_path_buf(),
        })
    }

    fn lint(
        &self,
        file: &str,
        text: &str,
        config: &TslintConfig,
        options: &LintOptions,
    ) -> Result<Vec<LintFailure>, EngineError> {
        if !disk_matches(&config.base_path.join(file), text) {
            warn!(file = %file, "file changed on disk since the program was built; linting the disk copy");
        }
        let (program, args) = match self.command.split_first() {
            Some((p, a)) => (p.clone(), a.to_vec()),
            None => return Err(EngineError::Project("empty lint command".into())),
        };
        let mut cmd = Command::new(&program);
        cmd.args(&args)
            .arg("-c")
            .arg(&config.path)
            .args(["-t", "json"]);
        if options.fix {
            cmd.arg("--fix");
        }
        if let Some(dir) = options.rules_directory.as_ref() {
            cmd.args(["-r", dir]);
        }
        cmd.arg(file).current_dir(&config.base_path);

        let shown = self.command.join(" ");
        let output = cmd.output().map_err(|source| EngineError::Spawn {
            command: shown.clone(),
            source,
        })?;
        let status = output.status.code().unwrap_or(-1);
        if !output.status.success() && status != FAILURES_FOUND {
            return Err(EngineError::Failed {
                command: shown,
                status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        parse_failures(file, &String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse the `-t json` formatter output for one file.
fn parse_failures(file: &str, stdout: &str) -> Result<Vec<LintFailure>, EngineError> {
    if stdout.trim().is_empty() {
        return Ok(Vec::new());
    }
    let raw: Vec<RawFailure> =
        serde_json::from_str(stdout).map_err(|source| EngineError::LintOutput {
            file: file.to_string(),
            source,
        })?;
    Ok(raw
        .into_iter()
        .map(|r| {
            let severity = RuleSeverity::parse(&r.rule_severity).unwrap_or_else(|| {
                warn!(rule = %r.rule_name, severity = %r.rule_severity, "unknown rule severity; treating as error");
                RuleSeverity::Error
            });
            LintFailure {
                file: file.to_string(),
                line: r.start_position.line,
                character: r.start_position.character,
                rule: r.rule_name,
                severity,
                message: r.failure,
            }
        })
        .collect())
}

fn disk_matches(path: &Path, text: &str) -> bool {
    fs::read_to_string(path).map(|disk| disk == text).unwrap_or(false)
}

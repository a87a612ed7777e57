//! Configuration discovery and effective run settings.
//!
//! Tycheck reads `tycheck.toml|yaml|yml` from the start directory (or the
//! closest ancestor) and merges it with CLI flags into a `RunConfiguration`.
//! Defaults:
//! - `basePath`: the directory holding the config file
//! - `type`: `sync`, `name`: `tycheck`
//! - `yellowOn*`, `throwOn*`, `quit`, `finished`: false
//! - `[engine].command`: `["tsc"]`, `[lint].command`: `["tslint"]`
//! - `lintCount`: `files`
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::error::CheckerError;
use crate::models::{Kind, LintCountUnit};
use serde::Deserialize;
use serde_json::Value as Json;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
/// Root configuration loaded from `tycheck.toml|yaml`.
pub struct TycheckConfig {
    pub ts_config_obj: Option<Json>,
    /// Path to a JSON project file, used when `tsConfigObj` is absent.
    pub ts_config: Option<String>,
    pub base_path: Option<String>,
    pub ts_lint: Option<String>,
    #[serde(default)]
    pub lintoptions: LintOptions,
    #[serde(rename = "type")]
    pub run_type: Option<String>,
    pub name: Option<String>,
    pub yellow_on_options: Option<bool>,
    pub yellow_on_global: Option<bool>,
    pub yellow_on_syntactic: Option<bool>,
    pub yellow_on_semantic: Option<bool>,
    pub yellow_on_lint: Option<bool>,
    pub throw_on_options: Option<bool>,
    pub throw_on_global: Option<bool>,
    pub throw_on_syntactic: Option<bool>,
    pub throw_on_semantic: Option<bool>,
    pub throw_on_ts_lint: Option<bool>,
    pub quit: Option<bool>,
    pub finished: Option<bool>,
    pub lint_count: Option<LintCountUnit>,
    pub engine: Option<CommandCfg>,
    pub lint: Option<CommandCfg>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// `[engine]` / `[lint]` sections.
pub struct CommandCfg {
    pub command: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
/// Options forwarded to the lint engine.
pub struct LintOptions {
    #[serde(default)]
    pub fix: bool,
    pub rules_directory: Option<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
/// One boolean per summary kind.
pub struct KindFlags {
    pub options: bool,
    pub global: bool,
    pub syntactic: bool,
    pub semantic: bool,
    pub lint: bool,
}

impl KindFlags {
    pub fn get(&self, kind: Kind) -> bool {
        match kind {
            Kind::Options => self.options,
            Kind::Global => self.global,
            Kind::Syntactic => self.syntactic,
            Kind::Semantic => self.semantic,
            Kind::Lint => self.lint,
        }
    }
}

#[derive(Debug, Clone)]
/// Fully-resolved, per-invocation settings.
pub struct RunConfiguration {
    pub base_path: PathBuf,
    pub ts_config_obj: Json,
    pub ts_lint: Option<String>,
    pub lint_options: LintOptions,
    pub run_type: String,
    pub name: String,
    /// Render findings of a kind as warnings instead of errors.
    pub yellow: KindFlags,
    /// Escalate a nonzero count of a kind into a fatal outcome.
    pub throw: KindFlags,
    pub quit: bool,
    pub finished: bool,
    pub lint_count: LintCountUnit,
    pub engine_command: Vec<String>,
    pub lint_command: Vec<String>,
}

impl Default for RunConfiguration {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("."),
            ts_config_obj: Json::Object(Default::default()),
            ts_lint: None,
            lint_options: LintOptions::default(),
            run_type: "sync".into(),
            name: "tycheck".into(),
            yellow: KindFlags::default(),
            throw: KindFlags::default(),
            quit: false,
            finished: false,
            lint_count: LintCountUnit::default(),
            engine_command: vec!["tsc".into()],
            lint_command: vec!["tslint".into()],
        }
    }
}

#[derive(Debug, Default, Clone)]
/// CLI-provided overrides. `None` leaves the config file value in place.
pub struct Overrides {
    pub base_path: Option<String>,
    pub ts_config: Option<String>,
    pub ts_lint: Option<String>,
    pub name: Option<String>,
    pub quit: Option<bool>,
    pub finished: Option<bool>,
    pub lint_count: Option<LintCountUnit>,
}

const CONFIG_FILES: [&str; 3] = ["tycheck.toml", "tycheck.yaml", "tycheck.yml"];

/// Walk upward from `start` to the directory holding a config file.
///
/// Stops at a `tycheck.toml|yaml|yml` or a `.git` directory.
pub fn detect_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_FILES.iter().any(|f| cur.join(f).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `TycheckConfig` from `tycheck.toml` or `tycheck.yaml|yml` if present.
///
/// A file that exists but does not parse is an error.
pub fn load_config(root: &Path) -> Result<Option<TycheckConfig>, CheckerError> {
    let toml_path = root.join("tycheck.toml");
    if toml_path.exists() {
        let s = read(&toml_path)?;
        let cfg = toml::from_str(&s).map_err(|e| config_error(&toml_path, e))?;
        return Ok(Some(cfg));
    }
    for yml in ["tycheck.yaml", "tycheck.yml"] {
        let p = root.join(yml);
        if p.exists() {
            let s = read(&p)?;
            let cfg = serde_yaml::from_str(&s).map_err(|e| config_error(&p, e))?;
            return Ok(Some(cfg));
        }
    }
    Ok(None)
}

fn read(path: &Path) -> Result<String, CheckerError> {
    fs::read_to_string(path).map_err(|e| config_error(path, e))
}

fn config_error(path: &Path, e: impl std::fmt::Display) -> CheckerError {
    CheckerError::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

/// Resolve `RunConfiguration` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(
    cli_start: Option<&str>,
    cli: &Overrides,
) -> Result<RunConfiguration, CheckerError> {
    let start = PathBuf::from(cli_start.unwrap_or("."));
    let root = detect_root(&start);
    let cfg = load_config(&root)?.unwrap_or_default();
    let defaults = RunConfiguration::default();

    let base_path = match cli.base_path.clone().or(cfg.base_path) {
        Some(p) => root.join(p),
        None => root.clone(),
    };

    // --project beats everything; otherwise an inline object beats `tsConfig`.
    let project_file = match (&cli.ts_config, &cfg.ts_config_obj) {
        (Some(p), _) => Some(p.clone()),
        (None, None) => cfg.ts_config.clone(),
        (None, Some(_)) => None,
    };
    let ts_config_obj = match project_file {
        Some(p) => {
            let path = base_path.join(p);
            let s = read(&path)?;
            serde_json::from_str(&s).map_err(|e| config_error(&path, e))?
        }
        None => cfg.ts_config_obj.unwrap_or(defaults.ts_config_obj),
    };

    let yellow = KindFlags {
        options: cfg.yellow_on_options.unwrap_or(false),
        global: cfg.yellow_on_global.unwrap_or(false),
        syntactic: cfg.yellow_on_syntactic.unwrap_or(false),
        semantic: cfg.yellow_on_semantic.unwrap_or(false),
        lint: cfg.yellow_on_lint.unwrap_or(false),
    };
    let throw = KindFlags {
        options: cfg.throw_on_options.unwrap_or(false),
        global: cfg.throw_on_global.unwrap_or(false),
        syntactic: cfg.throw_on_syntactic.unwrap_or(false),
        semantic: cfg.throw_on_semantic.unwrap_or(false),
        lint: cfg.throw_on_ts_lint.unwrap_or(false),
    };

    Ok(RunConfiguration {
        base_path,
        ts_config_obj,
        ts_lint: cli.ts_lint.clone().or(cfg.ts_lint),
        lint_options: cfg.lintoptions,
        run_type: cfg.run_type.unwrap_or(defaults.run_type),
        name: cli.name.clone().or(cfg.name).unwrap_or(defaults.name),
        yellow,
        throw,
        quit: cli.quit.or(cfg.quit).unwrap_or(false),
        finished: cli.finished.or(cfg.finished).unwrap_or(false),
        lint_count: cli.lint_count.or(cfg.lint_count).unwrap_or_default(),
        engine_command: command_or(cfg.engine, defaults.engine_command),
        lint_command: command_or(cfg.lint, defaults.lint_command),
    })
}

fn command_or(section: Option<CommandCfg>, default: Vec<String>) -> Vec<String> {
    section
        .and_then(|s| s.command)
        .filter(|c| !c.is_empty())
        .unwrap_or(default)
}

//! Type-checking engine backed by an external `tsc` process.
//!
//! The compiler runs once per program with `--noEmit --pretty false` over the
//! resolved file list. Its line-oriented output is parsed back into engine
//! diagnostics and split into the four categories by code range.

use crate::engine::{EngineError, ParsedProject, Program, TypeEngine};
use crate::models::position::LineMap;
use crate::models::{Category, DiagnosticLevel, EngineDiagnostic, MessageText};
use regex::Regex;
use serde_json::Value as Json;
use std::collections::HashMap;
use std::fs;
use std::process::Command;
use std::sync::OnceLock;
use std::time::SystemTime;
use tracing::{debug, info};

/// Options the engine always sets itself.
const RESERVED_OPTIONS: [&str; 2] = ["noEmit", "pretty"];

pub struct TscEngine {
    command: Vec<String>,
}

impl TscEngine {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

struct SourceFile {
    text: String,
    modified: Option<SystemTime>,
}

/// Program produced by one compiler run.
pub struct TscProgram {
    files: Vec<String>,
    sources: HashMap<String, SourceFile>,
    diagnostics: Vec<(Category, EngineDiagnostic)>,
}

impl TscProgram {
    fn of(&self, category: Category) -> Vec<EngineDiagnostic> {
        self.diagnostics
            .iter()
            .filter(|(c, _)| *c == category)
            .map(|(_, d)| d.clone())
            .collect()
    }
}

impl Program for TscProgram {
    fn options_diagnostics(&self) -> Vec<EngineDiagnostic> {
        self.of(Category::Options)
    }

    fn global_diagnostics(&self) -> Vec<EngineDiagnostic> {
        self.of(Category::Global)
    }

    fn syntactic_diagnostics(&self) -> Vec<EngineDiagnostic> {
        self.of(Category::Syntactic)
    }

    fn semantic_diagnostics(&self) -> Vec<EngineDiagnostic> {
        self.of(Category::Semantic)
    }

    fn file_names(&self) -> Vec<String> {
        self.files.clone()
    }

    fn source_text(&self, file: &str) -> Option<&str> {
        self.sources.get(file).map(|s| s.text.as_str())
    }
}

impl TypeEngine for TscEngine {
    type Program = TscProgram;

    fn create_program(
        &self,
        project: &ParsedProject,
        previous: Option<TscProgram>,
    ) -> Result<TscProgram, EngineError> {
        let mut previous = previous.map(|p| p.sources).unwrap_or_default();
        let mut sources = HashMap::new();
        let mut reused = 0usize;
        for file in &project.file_names {
            let path = project.base_path.join(file);
            let modified = fs::metadata(&path).and_then(|m| m.modified()).ok();
            if let Some(old) = previous.remove(file) {
                if modified.is_some() && old.modified == modified {
                    sources.insert(file.clone(), old);
                    reused += 1;
                    continue;
                }
            }
            let text = fs::read_to_string(&path).map_err(|source| EngineError::Read {
                path: path.clone(),
                source,
            })?;
            sources.insert(file.clone(), SourceFile { text, modified });
        }
        debug!(reused, total = project.file_names.len(), "program sources loaded");

        // Without file arguments the compiler falls back to a tsconfig.json
        // in the working directory or prints its usage text.
        if project.file_names.is_empty() {
            info!("project resolved no files; type checker not started");
            return Ok(TscProgram {
                files: Vec::new(),
                sources,
                diagnostics: Vec::new(),
            });
        }

        let (program, args) = match self.command.split_first() {
            Some((p, a)) => (p.clone(), a.to_vec()),
            None => return Err(EngineError::Project("empty engine command".into())),
        };
        let mut cmd = Command::new(&program);
        cmd.args(&args)
            .args(["--noEmit", "--pretty", "false"])
            .args(compiler_flags(&project.options))
            .args(&project.file_names)
            .current_dir(&project.base_path);
        let shown = self.command.join(" ");
        info!(command = %shown, files = project.file_names.len(), "running type checker");
        let output = cmd.output().map_err(|source| EngineError::Spawn {
            command: shown.clone(),
            source,
        })?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() && stdout.trim().is_empty() {
            return Err(EngineError::Failed {
                command: shown,
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let mut line_maps: HashMap<String, LineMap> = HashMap::new();
        let diagnostics = parse_output(&stdout)
            .into_iter()
            .map(|raw| {
                let start = match (&raw.file, raw.position) {
                    (Some(f), Some((line, col))) => sources.get(f).and_then(|src| {
                        line_maps
                            .entry(f.clone())
                            .or_insert_with(|| LineMap::new(&src.text))
                            .offset(line.saturating_sub(1), col.saturating_sub(1))
                    }),
                    _ => None,
                };
                let diag = EngineDiagnostic {
                    file: raw.file,
                    start,
                    code: raw.code,
                    level: raw.level,
                    message: raw.message,
                };
                (categorize(&diag), diag)
            })
            .collect();

        Ok(TscProgram {
            files: project.file_names.clone(),
            sources,
            diagnostics,
        })
    }
}

/// A diagnostic as printed by the compiler. Positions are 1-based.
#[derive(Debug, PartialEq)]
struct RawDiagnostic {
    file: Option<String>,
    position: Option<(usize, usize)>,
    level: DiagnosticLevel,
    code: u32,
    message: MessageText,
}

fn located_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<file>.+)\((?P<line>\d+),(?P<col>\d+)\): (?P<level>error|warning|message|suggestion) TS(?P<code>\d+): (?P<msg>.*)$",
        )
        .expect("valid regex")
    })
}

fn global_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<level>error|warning|message|suggestion) TS(?P<code>\d+): (?P<msg>.*)$")
            .expect("valid regex")
    })
}

/// Parse `--pretty false` output. Indented lines continue the previous
/// diagnostic's message chain; anything else is ignored.
fn parse_output(stdout: &str) -> Vec<RawDiagnostic> {
    let mut out: Vec<(RawDiagnostic, String, Vec<(usize, String)>)> = Vec::new();
    for line in stdout.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        let indent = line.len() - line.trim_start().len();
        if indent > 0 {
            if let Some((_, _, parts)) = out.last_mut() {
                parts.push(((indent / 2).max(1), line.trim_start().to_string()));
            }
            continue;
        }
        let (file, position, caps) = if let Some(c) = located_re().captures(line) {
            let pos: (usize, usize) = (c["line"].parse().unwrap_or(1), c["col"].parse().unwrap_or(1));
            (Some(c["file"].to_string()), Some(pos), c)
        } else if let Some(c) = global_re().captures(line) {
            (None, None, c)
        } else {
            continue;
        };
        let level = DiagnosticLevel::parse(&caps["level"]).unwrap_or(DiagnosticLevel::Error);
        let raw = RawDiagnostic {
            file,
            position,
            level,
            code: caps["code"].parse().unwrap_or(0),
            message: MessageText::Plain(String::new()),
        };
        out.push((raw, caps["msg"].to_string(), Vec::new()));
    }
    out.into_iter()
        .map(|(mut raw, head, parts)| {
            raw.message = nest(head, &parts, 0);
            raw
        })
        .collect()
}

/// Build a message chain from `(depth, text)` continuation parts.
fn nest(head: String, parts: &[(usize, String)], depth: usize) -> MessageText {
    let mut next = Vec::new();
    let mut i = 0;
    while i < parts.len() {
        let end = parts[i + 1..]
            .iter()
            .position(|(d, _)| *d <= depth + 1)
            .map(|p| i + 1 + p)
            .unwrap_or(parts.len());
        next.push(nest(parts[i].1.clone(), &parts[i + 1..end], depth + 1));
        i = end;
    }
    if next.is_empty() {
        MessageText::Plain(head)
    } else {
        MessageText::Chain { text: head, next }
    }
}

/// Options (5xxx, 6xxx) and other file-less codes are reported before any
/// file is checked; 1xxx codes come from the parser.
fn categorize(d: &EngineDiagnostic) -> Category {
    match (d.file.is_some(), d.code) {
        (false, 5000..=6999) => Category::Options,
        (false, _) => Category::Global,
        (true, 1000..=1999) => Category::Syntactic,
        (true, _) => Category::Semantic,
    }
}

/// Translate `compilerOptions` into command-line flags. Nested objects such
/// as `paths` have no flag form and are skipped.
fn compiler_flags(options: &Json) -> Vec<String> {
    let Some(obj) = options.as_object() else {
        return Vec::new();
    };
    let mut flags = Vec::new();
    for (key, value) in obj {
        if RESERVED_OPTIONS.contains(&key.as_str()) {
            continue;
        }
        let flag = format!("--{}", key);
        match value {
            Json::Bool(true) => flags.push(flag),
            Json::Bool(false) => flags.extend([flag, "false".into()]),
            Json::String(s) => flags.extend([flag, s.clone()]),
            Json::Number(n) => flags.extend([flag, n.to_string()]),
            Json::Array(items) => {
                let joined: Vec<String> = items
                    .iter()
                    .filter_map(|i| i.as_str().map(str::to_string))
                    .collect();
                flags.extend([flag, joined.join(",")]);
            }
            _ => debug!(option = %key, "compiler option has no flag form; skipped"),
        }
    }
    flags
}

//! Project resolution over the host filesystem.
//!
//! Turns a project object (`files`, `include`, `exclude`, `compilerOptions`)
//! into a sorted list of source files relative to the base path.

use crate::engine::{EngineError, ParsedProject};
use glob::{glob, Pattern};
use serde_json::Value as Json;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

const SOURCE_EXTENSIONS: [&str; 2] = ["ts", "tsx"];
const DEFAULT_EXCLUDE: &str = "node_modules";

/// Resolve `config` against `base_path`.
///
/// - `files` entries are taken as-is.
/// - `include` globs (default `**/*`) pick up `.ts`/`.tsx` files; a pattern
///   without a wildcard or extension in its last segment is a directory.
/// - `exclude` (default `node_modules`) removes matches and everything below.
pub fn resolve_project(config: &Json, base_path: &Path) -> Result<ParsedProject, EngineError> {
    let obj = config
        .as_object()
        .ok_or_else(|| EngineError::Project("project configuration must be an object".into()))?;

    let files = string_list(obj.get("files"), "files")?.unwrap_or_default();
    let include = string_list(obj.get("include"), "include")?.unwrap_or_else(|| {
        // An explicit `files` list without `include` means only those files.
        if obj.contains_key("files") {
            Vec::new()
        } else {
            vec!["**/*".to_string()]
        }
    });
    let exclude = string_list(obj.get("exclude"), "exclude")?
        .unwrap_or_else(|| vec![DEFAULT_EXCLUDE.to_string()]);
    let exclude = compile_excludes(&exclude)?;

    let mut out: BTreeSet<String> = files.into_iter().collect();
    for pat in include.iter() {
        let abs_glob = base_path.join(expand_directory(pat));
        let pattern = abs_glob.to_string_lossy().to_string();
        let entries = glob(&pattern).map_err(|source| EngineError::Glob {
            pattern: pat.clone(),
            source,
        })?;
        for entry in entries.flatten() {
            if !entry.is_file() || !is_source(&entry) {
                continue;
            }
            let rel = pathdiff::diff_paths(&entry, base_path).unwrap_or(entry);
            let rel = rel.to_string_lossy().replace('\\', "/");
            if exclude.iter().any(|p| p.matches(&rel)) {
                continue;
            }
            out.insert(rel);
        }
    }
    debug!(files = out.len(), base = %base_path.display(), "resolved project files");

    Ok(ParsedProject {
        file_names: out.into_iter().collect(),
        options: obj
            .get("compilerOptions")
            .cloned()
            .unwrap_or_else(|| Json::Object(Default::default())),
        base_path: base_path.to_path_buf(),
    })
}

fn string_list(v: Option<&Json>, key: &str) -> Result<Option<Vec<String>>, EngineError> {
    let Some(v) = v else { return Ok(None) };
    let arr = v
        .as_array()
        .ok_or_else(|| EngineError::Project(format!("'{}' must be an array", key)))?;
    arr.iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| EngineError::Project(format!("'{}' entries must be strings", key)))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn expand_directory(pat: &str) -> String {
    let last = pat.rsplit('/').next().unwrap_or(pat);
    if last.contains('*') || last.contains('?') || last.contains('.') {
        pat.to_string()
    } else {
        format!("{}/**/*", pat.trim_end_matches('/'))
    }
}

fn compile_excludes(exclude: &[String]) -> Result<Vec<Pattern>, EngineError> {
    let mut out = Vec::new();
    for e in exclude {
        let e = e.trim_end_matches('/');
        for p in [e.to_string(), format!("{}/**", e)] {
            out.push(Pattern::new(&p).map_err(|source| EngineError::Glob {
                pattern: p.clone(),
                source,
            })?);
        }
    }
    Ok(out)
}

fn is_source(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SOURCE_EXTENSIONS.contains(&e))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    fn touch(root: &Path, rel: &str) {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, "").unwrap();
    }

    #[test]
    fn test_default_include_skips_node_modules_and_non_sources() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(root, "src/a.ts");
        touch(root, "src/b.tsx");
        touch(root, "src/types.d.ts");
        touch(root, "src/readme.md");
        touch(root, "node_modules/lib/index.d.ts");

        let parsed = resolve_project(&json!({}), root).unwrap();
        assert_eq!(
            parsed.file_names,
            vec!["src/a.ts", "src/b.tsx", "src/types.d.ts"]
        );
        assert_eq!(parsed.options, json!({}));
    }

    #[test]
    fn test_include_directory_and_exclude_pattern() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(root, "src/a.ts");
        touch(root, "src/gen/b.ts");
        touch(root, "test/c.ts");

        let cfg = json!({
            "include": ["src"],
            "exclude": ["src/gen"],
            "compilerOptions": {"strict": true}
        });
        let parsed = resolve_project(&cfg, root).unwrap();
        assert_eq!(parsed.file_names, vec!["src/a.ts"]);
        assert_eq!(parsed.options["strict"], true);
    }

    #[test]
    fn test_files_only_project() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(root, "a.ts");
        touch(root, "b.ts");
        let parsed = resolve_project(&json!({"files": ["b.ts"]}), root).unwrap();
        assert_eq!(parsed.file_names, vec!["b.ts"]);
    }

    #[test]
    fn test_rejects_non_object_and_bad_lists() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            resolve_project(&json!([]), dir.path()),
            Err(EngineError::Project(_))
        ));
        assert!(matches!(
            resolve_project(&json!({"include": "src"}), dir.path()),
            Err(EngineError::Project(_))
        ));
    }
}

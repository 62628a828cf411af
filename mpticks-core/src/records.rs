use mpticks_common::{MpticksError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

const EXTENSIONS: [&str; 3] = ["json", "jsonl", "ndjson"];

/// Per-user counters as exported from the users collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRecord {
    pub id: Option<String>,
    pub num_routes: i64,
    pub num_imports: i64,
    pub last_import_time: Option<String>, // RFC 3339, informational only
    pub date_ticks: BTreeMap<String, i64>, // "YYYYMMDD" -> ticks on that day
}

impl UserRecord {
    pub fn total_ticks(&self) -> i64 {
        self.date_ticks.values().fold(0i64, |acc, &t| acc.saturating_add(t))
    }
}

fn has_record_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| EXTENSIONS.contains(&e))
        .unwrap_or(false)
}

fn is_json_lines(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("jsonl") | Some("ndjson"))
}

fn scan_recursive(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            scan_recursive(&path, out)?;
        } else if has_record_extension(&path) {
            out.push(path);
        }
    }
    Ok(())
}

/// resolve an input string: single file, directory (recursive), or glob pattern
pub fn resolve_inputs(input: &str) -> Result<Vec<PathBuf>> {
    let path = Path::new(input);
    let mut results = Vec::new();
    if path.is_file() {
        results.push(path.to_path_buf());
    } else if path.is_dir() {
        scan_recursive(path, &mut results)?;
    } else {
        let entries = glob::glob(input)
            .map_err(|e| MpticksError::InvalidArgument(format!("bad pattern {input}: {e}")))?;
        for entry in entries.flatten() {
            if entry.is_file() && has_record_extension(&entry) {
                results.push(entry);
            }
        }
    }
    results.sort();
    if results.is_empty() {
        return Err(MpticksError::InvalidArgument(format!("no user exports found: {input}")));
    }
    for p in &results {
        debug!(path = %p.display(), "resolved input");
    }
    Ok(results)
}

/// Decodes one export file: a JSON array, or one record per line for
/// `.jsonl`/`.ndjson`.
pub fn load_users(path: &Path) -> Result<Vec<UserRecord>> {
    let content = std::fs::read_to_string(path)?;
    let users = if is_json_lines(path) {
        parse_json_lines(path, &content)?
    } else {
        serde_json::from_str::<Vec<UserRecord>>(&content).map_err(|e| MpticksError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
    };
    debug!(path = %path.display(), users = users.len(), "loaded user export");
    Ok(users)
}

fn parse_json_lines(path: &Path, content: &str) -> Result<Vec<UserRecord>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|e| MpticksError::Decode {
                path: path.to_path_buf(),
                message: format!("line {}: {e}", i + 1),
            })
        })
        .collect()
}

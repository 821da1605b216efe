//! Directory listing for retention pruning

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Directory that holds the live file. An empty parent means the current
/// directory.
pub fn log_dir(live_path: &Path) -> PathBuf {
    match live_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// List the live file and its rotated siblings.
///
/// An entry belongs to the set when its name equals the live file name or
/// starts with `<name>.`. Directories are skipped. Order is unspecified.
pub fn sibling_logs(live_path: &Path) -> io::Result<Vec<PathBuf>> {
    let base = match live_path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name,
        None => return Ok(Vec::new()),
    };
    let rotated_prefix = format!("{}.", base);

    let mut found = Vec::new();
    for entry in fs::read_dir(log_dir(live_path))? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name == base || name.starts_with(&rotated_prefix) {
            found.push(entry.path());
        }
    }
    Ok(found)
}

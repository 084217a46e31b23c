//! Drawing discovery and staging

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use ahash::AHashSet;
use glob::{glob_with, MatchOptions, Pattern};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::error::{Result, SheetListError};

static ILLEGAL_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1F]"#).unwrap());

/// Replace characters that are not allowed in Windows file names with `_`
pub fn sanitize_filename(name: &str) -> String {
    ILLEGAL_FILENAME_CHARS.replace_all(name, "_").into_owned()
}

/// Create a directory and its parents
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| SheetListError::io(path, e))
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| extensions.iter().any(|want| want.trim_start_matches('.').eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

fn is_lock_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('~'))
        .unwrap_or(false)
}

/// Order drawings by file name, case-insensitively, then by full path
fn compare_drawings(a: &Path, b: &Path) -> Ordering {
    let key = |p: &Path| {
        p.file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    };
    key(a).cmp(&key(b)).then_with(|| a.cmp(b))
}

/// List drawing files under `dir` with one of `extensions`.
///
/// Editor lock files (names starting with `~`) are skipped. The result is
/// sorted by file name so runs over the same folder are reproducible.
pub fn list_drawing_files(dir: &Path, recursive: bool, extensions: &[String]) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(SheetListError::io(
            dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "input folder does not exist"),
        ));
    }

    let root = dir
        .to_str()
        .ok_or_else(|| SheetListError::Custom(format!("non UTF-8 path: {}", dir.display())))?;
    let pattern = if recursive {
        format!("{}/**/*", Pattern::escape(root))
    } else {
        format!("{}/*", Pattern::escape(root))
    };

    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };
    let entries = glob_with(&pattern, options)
        .map_err(|e| SheetListError::Custom(format!("invalid search pattern '{pattern}': {e}")))?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() && has_extension(&path, extensions) && !is_lock_file(&path) => {
                files.push(path)
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "unreadable entry while listing drawings"),
        }
    }
    files.sort_by(|a, b| compare_drawings(a, b));
    debug!(dir = %dir.display(), count = files.len(), "drawings found");
    Ok(files)
}

/// Drop files under any of `dirs`. Keeps the staged drawings and PDFs of
/// an earlier run out of a recursive listing of the same folder.
pub fn exclude_dirs(files: Vec<PathBuf>, dirs: &[PathBuf]) -> Vec<PathBuf> {
    let canonical = |p: &Path| fs::canonicalize(p).unwrap_or_else(|_| p.to_path_buf());
    let dirs: Vec<PathBuf> = dirs.iter().map(|d| canonical(d.as_path())).collect();
    files
        .into_iter()
        .filter(|file| {
            let file_path = canonical(file.as_path());
            let excluded = dirs.iter().any(|dir| file_path.starts_with(dir));
            if excluded {
                debug!(path = %file.display(), "output folder entry left out");
            }
            !excluded
        })
        .collect()
}

/// First `name`, `name (1)`, `name (2)`, ... not yet `taken` in this
/// staging pass
fn unique_destination(dir: &Path, source: &Path, taken: &AHashSet<PathBuf>) -> PathBuf {
    let file_name = source.file_name().map(PathBuf::from).unwrap_or_default();
    let candidate = dir.join(&file_name);
    if !taken.contains(&candidate) {
        return candidate;
    }

    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (1..)
        .map(|i| dir.join(format!("{stem} ({i}){extension}")))
        .find(|p| !taken.contains(p))
        .unwrap_or(candidate)
}

/// Copy drawings into `dest`, renaming when two inputs share a file name.
/// Copies left by an earlier run are overwritten. Returns the copies in
/// input order.
pub fn copy_drawing_files(files: &[PathBuf], dest: &Path) -> Result<Vec<PathBuf>> {
    ensure_dir(dest)?;
    let mut taken = AHashSet::with_capacity(files.len());
    let mut copied = Vec::with_capacity(files.len());
    for source in files {
        let target = unique_destination(dest, source, &taken);
        fs::copy(source, &target).map_err(|e| SheetListError::io(source, e))?;
        debug!(from = %source.display(), to = %target.display(), "drawing staged");
        taken.insert(target.clone());
        copied.push(target);
    }
    Ok(copied)
}

use crate::error::CoreResult;
use crate::file::dir::read_dir;
use crate::tagged::{ErrorCategory, ResultExt};
use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

fn compile(pattern: &str) -> CoreResult<Pattern> {
    Ok(Pattern::new(pattern).tag(
        ErrorCategory::Validation,
        format!("invalid glob pattern {:?}", pattern),
    )?)
}

/// Every path under `root` (including `root`) whose base name matches `pattern`.
pub fn find_files(root: impl AsRef<Path>, pattern: &str) -> CoreResult<Vec<PathBuf>> {
    let pattern = compile(pattern)?;
    let mut matches = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if pattern.matches(&entry.file_name().to_string_lossy()) {
            matches.push(entry.into_path());
        }
    }
    Ok(matches)
}

/// Like [`find_files`] but only looks at the direct children of `dir`.
pub fn find_files_matching_pattern(
    dir: impl AsRef<Path>,
    pattern: &str,
) -> CoreResult<Vec<PathBuf>> {
    let pattern = compile(pattern)?;
    Ok(read_dir(dir)?
        .into_iter()
        .filter(|e| pattern.matches(&e.file_name().to_string_lossy()))
        .map(|e| e.path())
        .collect())
}

pub fn list_files_recursive(dir: impl AsRef<Path>) -> CoreResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Call `f` for every entry under `root`, `root` included, in lexical order.
/// The walk stops at the first error, whether from the filesystem or from `f`.
pub fn walk_files<F>(root: impl AsRef<Path>, mut f: F) -> CoreResult<()>
where
    F: FnMut(&DirEntry) -> CoreResult<()>,
{
    for entry in WalkDir::new(root).sort_by_file_name() {
        f(&entry?)?;
    }
    Ok(())
}

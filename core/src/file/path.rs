use crate::error::{io_error, CoreResult};
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;

/// Absolute, lexically cleaned form of `path`. Symlinks are not resolved.
/// An empty path means the current directory.
pub fn absolute_path(path: impl AsRef<Path>) -> CoreResult<PathBuf> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Ok(clean(&env::current_dir()?));
    }
    Ok(clean(&std::path::absolute(path)?))
}

/// Clean `.` and `..` out of `path`, then make it absolute.
pub fn simplify_path(path: impl AsRef<Path>) -> CoreResult<PathBuf> {
    absolute_path(clean(path.as_ref()))
}

/// Whether the last element, ignoring trailing separators, starts with a dot.
/// `..` counts as hidden, `.` does not.
pub fn is_hidden(path: impl AsRef<Path>) -> bool {
    let s = path.as_ref().to_string_lossy();
    let base = s
        .trim_end_matches(std::path::is_separator)
        .rsplit(std::path::is_separator)
        .next()
        .unwrap_or_default();
    base != "." && base.starts_with('.')
}

pub fn executable_path() -> CoreResult<PathBuf> {
    absolute_path(env::current_exe()?)
}

/// Entries of the `PATH` environment variable.
pub fn environment_paths() -> Vec<PathBuf> {
    env::var_os("PATH")
        .map(|p| env::split_paths(&p).collect())
        .unwrap_or_default()
}

/// Create a temporary file in `dir` whose name starts with `prefix`.
///
/// The file is removed when the handle drops unless the caller calls
/// [`NamedTempFile::keep`].
pub fn create_temp_file(dir: impl AsRef<Path>, prefix: &str) -> CoreResult<NamedTempFile> {
    let dir = dir.as_ref();
    tempfile::Builder::new()
        .prefix(prefix)
        .tempfile_in(dir)
        .map_err(|e| io_error(dir, e))
}

#[cfg(unix)]
pub fn create_symlink(target: impl AsRef<Path>, link: impl AsRef<Path>) -> CoreResult<()> {
    std::os::unix::fs::symlink(target, link)?;
    Ok(())
}

pub fn is_symlink(path: impl AsRef<Path>) -> CoreResult<bool> {
    let path = path.as_ref();
    Ok(fs::symlink_metadata(path)
        .map_err(|e| io_error(path, e))?
        .file_type()
        .is_symlink())
}

pub fn read_symlink(path: impl AsRef<Path>) -> CoreResult<PathBuf> {
    let path = path.as_ref();
    fs::read_link(path).map_err(|e| io_error(path, e))
}

// Lexical cleanup: drops `.`, folds `name/..`, and drops `..` directly under the root.
fn clean(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for c in path.components() {
        match c {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(c),
            },
            other => out.push(other),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::clean;
    use std::path::{Path, PathBuf};

    #[test]
    fn clean_folds_parent_segments() {
        assert_eq!(clean(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
        assert_eq!(clean(Path::new("/../x")), PathBuf::from("/x"));
    }

    #[test]
    fn clean_keeps_leading_parents_of_relative_paths() {
        assert_eq!(clean(Path::new("../../a/..")), PathBuf::from("../.."));
        assert_eq!(clean(Path::new("a/..")), PathBuf::from("."));
    }
}

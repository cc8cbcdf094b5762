use crate::error::{io_error, CoreResult};
use crate::file::ops::copy_file;
use crate::tagged::TaggedError;
use std::fs::{self, DirEntry};
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Create `path` and any missing parents. `mode` applies on unix only.
pub fn create_directory(path: impl AsRef<Path>, mode: u32) -> CoreResult<()> {
    let path = path.as_ref();
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    builder.create(path)?;
    Ok(())
}

pub fn ensure_dir(path: impl AsRef<Path>, mode: u32) -> CoreResult<()> {
    let path = path.as_ref();
    if path.is_dir() {
        return Ok(());
    }
    create_directory(path, mode)
}

/// Remove a directory tree. A path that is already gone is not an error.
pub fn remove_directory(path: impl AsRef<Path>) -> CoreResult<()> {
    let path = path.as_ref();
    match fs::remove_dir_all(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "removed directory");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Directory entries sorted by file name.
pub fn read_dir(path: impl AsRef<Path>) -> CoreResult<Vec<DirEntry>> {
    let path = path.as_ref();
    let mut entries = fs::read_dir(path)
        .map_err(|e| io_error(path, e))?
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

/// Recursively copy `src` into `dst`, which must not exist yet.
pub fn copy_directory(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> CoreResult<()> {
    let (src, dst) = (src.as_ref(), dst.as_ref());
    let meta = fs::metadata(src).map_err(|e| io_error(src, e))?;
    if !meta.is_dir() {
        return Err(
            TaggedError::validation(format!("source {} is not a directory", src.display())).into(),
        );
    }
    match fs::symlink_metadata(dst) {
        Ok(_) => {
            return Err(TaggedError::validation(format!(
                "destination {} already exists",
                dst.display()
            ))
            .into())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(io_error(dst, e)),
    }

    fs::create_dir_all(dst)?;
    fs::set_permissions(dst, meta.permissions())?;
    for entry in read_dir(src)? {
        let from = entry.path();
        let to = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_directory(&from, &to)?;
        } else {
            copy_file(&from, &to)?;
        }
    }
    Ok(())
}

/// Total size in bytes of all files below `path`.
pub fn dir_size(path: impl AsRef<Path>) -> CoreResult<u64> {
    let mut size = 0;
    for entry in WalkDir::new(path) {
        let entry = entry?;
        if entry.file_type().is_file() {
            size += entry.metadata()?.len();
        }
    }
    Ok(size)
}

/// Probe by creating (and dropping) a temporary file inside `path`.
pub fn is_directory_writable(path: impl AsRef<Path>) -> bool {
    tempfile::NamedTempFile::new_in(path).is_ok()
}

/// Delete everything inside `path`, keeping `path` itself.
pub fn remove_contents(path: impl AsRef<Path>) -> CoreResult<()> {
    for entry in read_dir(path)? {
        let p = entry.path();
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&p)?;
        } else {
            fs::remove_file(&p)?;
        }
    }
    Ok(())
}

/// Recursively remove empty subdirectories of `path` (but never `path`).
pub fn remove_empty_dirs(path: impl AsRef<Path>) -> CoreResult<()> {
    for entry in read_dir(path)? {
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let sub = entry.path();
        remove_empty_dirs(&sub)?;
        if fs::read_dir(&sub)?.next().is_none() {
            fs::remove_dir(&sub)?;
            tracing::debug!(path = %sub.display(), "removed empty directory");
        }
    }
    Ok(())
}

/// Names of the non-directory entries of `path`, sorted.
pub fn file_names_in_dir(path: impl AsRef<Path>) -> CoreResult<Vec<String>> {
    let mut names = Vec::new();
    for entry in read_dir(path)? {
        if !entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}

/// Rename entries of `dir` whose name contains `pattern`, replacing every
/// occurrence with `replacement`. Returns how many entries were renamed.
pub fn rename_files_with_pattern(
    dir: impl AsRef<Path>,
    pattern: &str,
    replacement: &str,
) -> CoreResult<usize> {
    if pattern.is_empty() {
        return Err(TaggedError::validation("rename pattern must not be empty").into());
    }
    let dir = dir.as_ref();
    let mut renamed = 0;
    for entry in read_dir(dir)? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.contains(pattern) {
            let new_name = name.replace(pattern, replacement);
            fs::rename(entry.path(), dir.join(&new_name))?;
            tracing::debug!(from = %name, to = %new_name, "renamed entry");
            renamed += 1;
        }
    }
    Ok(renamed)
}

#[cfg(unix)]
pub fn chown_recursive(path: impl AsRef<Path>, uid: u32, gid: u32) -> CoreResult<()> {
    for entry in WalkDir::new(path) {
        let entry = entry?;
        std::os::unix::fs::chown(entry.path(), Some(uid), Some(gid))?;
    }
    Ok(())
}

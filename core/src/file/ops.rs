use crate::error::{io_error, CoreResult};
use crate::tagged::TaggedError;
use std::fs::{self, File, FileTimes};
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::time::SystemTime;

pub fn read_file(path: impl AsRef<Path>) -> CoreResult<String> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|e| io_error(path, e))
}

pub fn write_file(path: impl AsRef<Path>, data: &str) -> CoreResult<()> {
    write_binary_file(path, data.as_bytes())
}

pub fn read_binary_file(path: impl AsRef<Path>) -> CoreResult<Vec<u8>> {
    let path = path.as_ref();
    fs::read(path).map_err(|e| io_error(path, e))
}

pub fn write_binary_file(path: impl AsRef<Path>, data: &[u8]) -> CoreResult<()> {
    let path = path.as_ref();
    fs::write(path, data)?;
    tracing::debug!(path = %path.display(), bytes = data.len(), "wrote file");
    Ok(())
}

/// True when `path` exists and is not a directory.
pub fn file_exists(path: impl AsRef<Path>) -> bool {
    fs::metadata(path).map(|m| !m.is_dir()).unwrap_or(false)
}

pub fn delete_file(path: impl AsRef<Path>) -> CoreResult<()> {
    let path = path.as_ref();
    fs::remove_file(path).map_err(|e| io_error(path, e))?;
    tracing::debug!(path = %path.display(), "deleted file");
    Ok(())
}

/// Copy a regular file, returning the number of bytes copied.
pub fn copy_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> CoreResult<u64> {
    let (src, dst) = (src.as_ref(), dst.as_ref());
    let meta = fs::metadata(src).map_err(|e| io_error(src, e))?;
    if !meta.is_file() {
        return Err(
            TaggedError::validation(format!("{} is not a regular file", src.display())).into(),
        );
    }
    let n = fs::copy(src, dst)?;
    tracing::debug!(src = %src.display(), dst = %dst.display(), bytes = n, "copied file");
    Ok(n)
}

pub fn move_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> CoreResult<()> {
    let (src, dst) = (src.as_ref(), dst.as_ref());
    fs::rename(src, dst).map_err(|e| io_error(src, e))?;
    tracing::debug!(src = %src.display(), dst = %dst.display(), "moved file");
    Ok(())
}

pub fn file_size(path: impl AsRef<Path>) -> CoreResult<u64> {
    let path = path.as_ref();
    Ok(fs::metadata(path).map_err(|e| io_error(path, e))?.len())
}

#[cfg(unix)]
pub fn change_permissions(path: impl AsRef<Path>, mode: u32) -> CoreResult<()> {
    use std::os::unix::fs::PermissionsExt;
    let path = path.as_ref();
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| io_error(path, e))
}

/// Remove every file in order, stopping at the first failure.
pub fn batch_remove_files<P: AsRef<Path>>(paths: &[P]) -> CoreResult<()> {
    for p in paths {
        delete_file(p)?;
    }
    Ok(())
}

/// Byte-for-byte equality of two files.
pub fn compare_files(a: impl AsRef<Path>, b: impl AsRef<Path>) -> CoreResult<bool> {
    Ok(read_binary_file(a)? == read_binary_file(b)?)
}

/// Line-wise comparison; true when the files differ.
pub fn diff_files(a: impl AsRef<Path>, b: impl AsRef<Path>) -> CoreResult<bool> {
    let (a, b) = (a.as_ref(), b.as_ref());
    let mut left = BufReader::new(File::open(a).map_err(|e| io_error(a, e))?).lines();
    let mut right = BufReader::new(File::open(b).map_err(|e| io_error(b, e))?).lines();
    loop {
        match (left.next().transpose()?, right.next().transpose()?) {
            (Some(l), Some(r)) => {
                if l != r {
                    return Ok(true);
                }
            }
            (None, None) => return Ok(false),
            _ => return Ok(true),
        }
    }
}

/// Set access and modification time to now. The path must exist and may be
/// a directory or a read-only file.
pub fn touch_file(path: impl AsRef<Path>) -> CoreResult<()> {
    let path = path.as_ref();
    let f = open_for_times(path).map_err(|e| io_error(path, e))?;
    let now = SystemTime::now();
    f.set_times(FileTimes::new().set_accessed(now).set_modified(now))
        .map_err(|e| io_error(path, e))?;
    Ok(())
}

// futimens only needs ownership, so a read-only handle is enough.
#[cfg(not(windows))]
fn open_for_times(path: &Path) -> io::Result<File> {
    File::open(path)
}

#[cfg(windows)]
fn open_for_times(path: &Path) -> io::Result<File> {
    use std::os::windows::fs::OpenOptionsExt;
    const FILE_WRITE_ATTRIBUTES: u32 = 0x0100;
    const FILE_FLAG_BACKUP_SEMANTICS: u32 = 0x0200_0000;
    std::fs::OpenOptions::new()
        .access_mode(FILE_WRITE_ATTRIBUTES)
        .custom_flags(FILE_FLAG_BACKUP_SEMANTICS)
        .open(path)
}

/// Copy `src` over `dst` when `dst` is missing or older. Returns whether a copy happened.
pub fn copy_if_newer(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> CoreResult<bool> {
    let (src, dst) = (src.as_ref(), dst.as_ref());
    let src_modified = fs::metadata(src)
        .map_err(|e| io_error(src, e))?
        .modified()?;
    let stale = match fs::metadata(dst) {
        Ok(m) => src_modified > m.modified()?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => true,
        Err(e) => return Err(e.into()),
    };
    if stale {
        copy_file(src, dst)?;
    }
    Ok(stale)
}

/// Write the contents of `sources`, in order, into a new file at `dest`.
pub fn concatenate_files<P: AsRef<Path>>(dest: impl AsRef<Path>, sources: &[P]) -> CoreResult<u64> {
    let dest = dest.as_ref();
    let mut out = File::create(dest)?;
    let mut total = 0;
    for src in sources {
        let src = src.as_ref();
        let mut f = File::open(src).map_err(|e| io_error(src, e))?;
        total += io::copy(&mut f, &mut out)?;
    }
    tracing::debug!(
        path = %dest.display(),
        files = sources.len(),
        bytes = total,
        "concatenated files"
    );
    Ok(total)
}

use crate::config::ArchiveConfig;
use crate::error::{io_error, CoreResult};
use crate::file::hash::file_sha256;
use crate::tagged::TaggedError;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Deflate `files` into a new archive at `out`.
///
/// Entry names are the paths as given, with `\` turned into `/`, the leading
/// `/` removed and `..` segments folded away.
pub fn zip_files<P: AsRef<Path>>(out: impl AsRef<Path>, files: &[P]) -> CoreResult<()> {
    let out = out.as_ref();
    let mut zw = ZipWriter::new(File::create(out)?);
    let base_opts = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in files {
        let path = path.as_ref();
        let meta = fs::metadata(path).map_err(|e| io_error(path, e))?;
        if meta.is_dir() {
            return Err(TaggedError::validation(format!(
                "{} is a directory; use zip_dir_deterministic",
                path.display()
            ))
            .into());
        }
        #[cfg(unix)]
        let opts = {
            use std::os::unix::fs::PermissionsExt;
            base_opts.unix_permissions(meta.permissions().mode())
        };
        #[cfg(not(unix))]
        let opts = base_opts;

        zw.start_file(entry_name(path), opts)?;
        let mut rf = File::open(path)?;
        io::copy(&mut rf, &mut zw)?;
    }
    zw.finish()?;
    tracing::debug!(path = %out.display(), entries = files.len(), "wrote zip archive");
    Ok(())
}

/// Extract `src` into `dest`, returning the extracted paths in archive order.
///
/// Entries whose names would land outside `dest` are rejected.
pub fn unzip(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> CoreResult<Vec<PathBuf>> {
    let (src, dest) = (src.as_ref(), dest.as_ref());
    let file = File::open(src).map_err(|e| io_error(src, e))?;
    let mut archive = ZipArchive::new(file)?;
    let mut extracted = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(rel) = entry.enclosed_name() else {
            tracing::warn!(entry = entry.name(), "refusing unsafe zip entry name");
            return Err(TaggedError::validation(format!(
                "zip entry {:?} escapes the destination directory",
                entry.name()
            ))
            .into());
        };
        let out_path = dest.join(rel);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
        } else {
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&out_path)?;
            io::copy(&mut entry, &mut out)?;
            apply_mode(&out_path, entry.unix_mode())?;
        }
        extracted.push(out_path);
    }
    tracing::debug!(
        src = %src.display(),
        dest = %dest.display(),
        entries = extracted.len(),
        "extracted zip archive"
    );
    Ok(extracted)
}

/// Zip the tree under `root_dir` so identical trees give identical bytes.
///
/// - entries sorted lexicographically by relative path
/// - fixed timestamps (1980-01-01, the DOS epoch)
/// - fixed compression method and level
/// - fixed permissions (0755 directories, 0644 files)
/// - empty archive comment
///
/// Returns the SHA-256 of the written archive as lowercase hex.
pub fn zip_dir_deterministic(
    root_dir: impl AsRef<Path>,
    out_zip: impl AsRef<Path>,
    cfg: &ArchiveConfig,
) -> CoreResult<String> {
    let (root_dir, out_zip) = (root_dir.as_ref(), out_zip.as_ref());
    if !root_dir.is_dir() {
        return Err(TaggedError::not_found(format!(
            "{} is not a directory",
            root_dir.display()
        ))
        .into());
    }
    if !(0..=9).contains(&cfg.compression_level) {
        return Err(TaggedError::validation(format!(
            "compression level {} is outside 0-9",
            cfg.compression_level
        ))
        .into());
    }

    let mut entries: Vec<(PathBuf, String)> = Vec::new();
    for e in WalkDir::new(root_dir) {
        let e = e?;
        let p = e.path();
        let Ok(rel) = p.strip_prefix(root_dir) else {
            continue;
        };
        if rel.as_os_str().is_empty() {
            continue;
        }
        let mut rel_s = rel.to_string_lossy().replace('\\', "/");
        if e.file_type().is_dir() {
            // Directory entries are kept so empty directories survive.
            rel_s.push('/');
            entries.push((p.to_path_buf(), rel_s));
        } else if e.file_type().is_file() {
            entries.push((p.to_path_buf(), rel_s));
        }
    }
    entries.sort_by(|a, b| a.1.cmp(&b.1));

    let mut zw = ZipWriter::new(File::create(out_zip)?);
    let fixed_time = zip::DateTime::from_date_and_time(1980, 1, 1, 0, 0, 0)
        .map_err(|_| TaggedError::validation("failed to create fixed zip datetime"))?;
    let base_opts = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(cfg.compression_level))
        .last_modified_time(fixed_time);

    for (abs_path, rel) in entries {
        if rel.ends_with('/') {
            zw.add_directory(rel, base_opts.unix_permissions(0o755))?;
            continue;
        }
        zw.start_file(rel, base_opts.unix_permissions(0o644))?;
        let mut rf = File::open(abs_path)?;
        io::copy(&mut rf, &mut zw)?;
    }

    zw.set_comment("");
    zw.finish()?;

    let digest = file_sha256(out_zip)?;
    tracing::debug!(path = %out_zip.display(), sha256 = %digest, "wrote deterministic zip");
    Ok(digest)
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: Option<u32>) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    match mode {
        Some(mode) => fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o7777)),
        None => Ok(()),
    }
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: Option<u32>) -> io::Result<()> {
    Ok(())
}

// Relative `/`-separated name. `name/..` pairs fold and any `..` left over at
// the front is dropped, so the entry always extracts inside the destination.
fn entry_name(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    let mut segs: Vec<&str> = Vec::new();
    for seg in normalized.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                segs.pop();
            }
            s => segs.push(s),
        }
    }
    segs.join("/")
}

#[cfg(test)]
mod tests {
    use super::entry_name;
    use std::path::Path;

    #[test]
    fn entry_name_strips_root_and_normalizes_separators() {
        assert_eq!(entry_name(Path::new("/tmp/a/b.txt")), "tmp/a/b.txt");
        assert_eq!(entry_name(Path::new("dir\\file.txt")), "dir/file.txt");
    }

    #[test]
    fn entry_name_folds_dot_segments() {
        assert_eq!(entry_name(Path::new("../a.txt")), "a.txt");
        assert_eq!(entry_name(Path::new("./x/../y/./z")), "y/z");
        assert_eq!(entry_name(Path::new("..\\..\\w")), "w");
    }
}

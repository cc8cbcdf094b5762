use crate::error::{io_error, CoreResult};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

pub fn write_lines<S: AsRef<str>>(lines: &[S], path: impl AsRef<Path>) -> CoreResult<()> {
    let mut w = BufWriter::new(File::create(path)?);
    for line in lines {
        w.write_all(line.as_ref().as_bytes())?;
        w.write_all(b"\n")?;
    }
    w.flush()?;
    Ok(())
}

/// Lines of the file without their `\n` or `\r\n` terminators.
pub fn read_lines(path: impl AsRef<Path>) -> CoreResult<Vec<String>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| io_error(path, e))?;
    Ok(BufReader::new(file).lines().collect::<Result<Vec<_>, _>>()?)
}

/// Append `text` verbatim, creating the file if needed.
pub fn append_to_file(path: impl AsRef<Path>, text: &str) -> CoreResult<()> {
    let mut f = OpenOptions::new().append(true).create(true).open(path)?;
    f.write_all(text.as_bytes())?;
    Ok(())
}

/// Lines containing `needle`.
pub fn grep_file(path: impl AsRef<Path>, needle: &str) -> CoreResult<Vec<String>> {
    Ok(read_lines(path)?
        .into_iter()
        .filter(|l| l.contains(needle))
        .collect())
}

/// Number of `\n` bytes in the file.
pub fn count_lines(path: impl AsRef<Path>) -> CoreResult<usize> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| io_error(path, e))?;
    let mut buf = [0u8; 32 * 1024];
    let mut count = 0;
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        count += buf[..n].iter().filter(|&&b| b == b'\n').count();
    }
    Ok(count)
}

pub fn convert_unix_to_dos(path: impl AsRef<Path>) -> CoreResult<()> {
    rewrite(path.as_ref(), |bytes| lf_to_crlf(&crlf_to_lf(bytes)))
}

pub fn convert_dos_to_unix(path: impl AsRef<Path>) -> CoreResult<()> {
    rewrite(path.as_ref(), crlf_to_lf)
}

fn rewrite(path: &Path, f: impl FnOnce(&[u8]) -> Vec<u8>) -> CoreResult<()> {
    let original = fs::read(path).map_err(|e| io_error(path, e))?;
    fs::write(path, f(&original))?;
    tracing::debug!(path = %path.display(), "rewrote line endings");
    Ok(())
}

fn crlf_to_lf(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\r' && bytes.get(i + 1) == Some(&b'\n') {
            i += 1;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

// Input must already be LF-only, otherwise existing CRLF pairs gain a second CR.
fn lf_to_crlf(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + bytes.len() / 16);
    for &b in bytes {
        if b == b'\n' {
            out.push(b'\r');
        }
        out.push(b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crlf_to_lf_keeps_lone_carriage_returns() {
        assert_eq!(crlf_to_lf(b"a\r\nb\rc\r\n"), b"a\nb\rc\n".to_vec());
    }

    #[test]
    fn lf_to_crlf_expands_every_newline() {
        assert_eq!(lf_to_crlf(b"a\nb\n\n"), b"a\r\nb\r\n\r\n".to_vec());
    }

    #[test]
    fn unix_to_dos_is_idempotent_on_mixed_input() {
        let once = lf_to_crlf(&crlf_to_lf(b"x\r\ny\nz"));
        let twice = lf_to_crlf(&crlf_to_lf(&once));
        assert_eq!(once, b"x\r\ny\r\nz".to_vec());
        assert_eq!(once, twice);
    }
}

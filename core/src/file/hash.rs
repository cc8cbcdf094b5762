use crate::error::{io_error, CoreResult};
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub fn file_md5(path: impl AsRef<Path>) -> CoreResult<String> {
    digest_file::<Md5>(path.as_ref())
}

pub fn file_sha1(path: impl AsRef<Path>) -> CoreResult<String> {
    digest_file::<Sha1>(path.as_ref())
}

pub fn file_sha256(path: impl AsRef<Path>) -> CoreResult<String> {
    digest_file::<Sha256>(path.as_ref())
}

fn digest_file<D: Digest>(path: &Path) -> CoreResult<String> {
    let mut f = File::open(path).map_err(|e| io_error(path, e))?;
    let mut h = D::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = f.read(&mut buf)?;
        if n == 0 {
            break;
        }
        h.update(&buf[..n]);
    }
    Ok(hex::encode(h.finalize()))
}

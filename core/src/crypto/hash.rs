use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};

pub fn md5_hex(s: &str) -> String {
    digest_hex::<Md5>(s.as_bytes())
}

pub fn sha1_hex(s: &str) -> String {
    digest_hex::<Sha1>(s.as_bytes())
}

pub fn sha256_hex(s: &str) -> String {
    sha256_hex_bytes(s.as_bytes())
}

pub fn sha256_hex_bytes(bytes: &[u8]) -> String {
    digest_hex::<Sha256>(bytes)
}

fn digest_hex<D: Digest>(bytes: &[u8]) -> String {
    let mut h = D::new();
    h.update(bytes);
    hex::encode(h.finalize())
}

use crate::error::CoreResult;
use crate::tagged::{ErrorCategory, ResultExt};
use rand::rngs::OsRng;
use rand::RngCore;

/// `n` bytes from the operating system's CSPRNG.
pub fn random_bytes(n: usize) -> CoreResult<Vec<u8>> {
    let mut out = vec![0u8; n];
    OsRng
        .try_fill_bytes(&mut out)
        .tag(ErrorCategory::Crypto, "system random source failed")?;
    Ok(out)
}

/// Hex encoding of `n` random bytes, so the result is `2 * n` characters.
pub fn random_string(n: usize) -> CoreResult<String> {
    Ok(hex::encode(random_bytes(n)?))
}

pub fn generate_salt(size: usize) -> CoreResult<Vec<u8>> {
    random_bytes(size)
}

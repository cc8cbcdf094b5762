use crate::error::CoreResult;
use crate::tagged::{ErrorCategory, TaggedError};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 of `message` under `secret`.
pub fn create_hmac(secret: &[u8], message: &[u8]) -> CoreResult<Vec<u8>> {
    let mut mac = keyed(secret)?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Constant-time check of `tag` against the HMAC-SHA256 of `message`.
pub fn verify_hmac(secret: &[u8], message: &[u8], tag: &[u8]) -> CoreResult<bool> {
    let mut mac = keyed(secret)?;
    mac.update(message);
    Ok(mac.verify_slice(tag).is_ok())
}

fn keyed(secret: &[u8]) -> CoreResult<HmacSha256> {
    HmacSha256::new_from_slice(secret).map_err(|e| {
        TaggedError::new(ErrorCategory::Crypto, format!("invalid hmac key: {}", e)).into()
    })
}

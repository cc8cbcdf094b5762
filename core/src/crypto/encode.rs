use crate::error::CoreResult;
use crate::tagged::{ErrorCategory, ResultExt};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

pub fn base64_encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

pub fn base64_decode(encoded: &str) -> CoreResult<Vec<u8>> {
    Ok(STANDARD
        .decode(encoded)
        .tag(ErrorCategory::Validation, "invalid base64 input")?)
}

pub fn hex_encode(data: &[u8]) -> String {
    hex::encode(data)
}

pub fn hex_decode(encoded: &str) -> CoreResult<Vec<u8>> {
    Ok(hex::decode(encoded).tag(ErrorCategory::Validation, "invalid hex input")?)
}

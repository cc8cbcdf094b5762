use crate::error::CoreResult;
use crate::tagged::TaggedError;
use aes_gcm::aead::consts::U12;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, AeadCore, KeyInit};
use aes_gcm::aes::Aes192;
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm};
use rand::RngCore;

type Aes192Gcm = AesGcm<Aes192, U12>;

pub const AES_GCM_NONCE_LEN: usize = 12;

/// AES-GCM encrypt with a 16, 24 or 32 byte key.
///
/// The output is the random nonce followed by the ciphertext and tag.
pub fn encrypt_aes(key: &[u8], plaintext: &[u8]) -> CoreResult<Vec<u8>> {
    let mut nonce = [0u8; AES_GCM_NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce);
    let ct = match key.len() {
        16 => seal::<Aes128Gcm>(key, &nonce, plaintext)?,
        24 => seal::<Aes192Gcm>(key, &nonce, plaintext)?,
        32 => seal::<Aes256Gcm>(key, &nonce, plaintext)?,
        n => return Err(invalid_aes_key(n)),
    };
    let mut out = Vec::with_capacity(AES_GCM_NONCE_LEN + ct.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ct);
    Ok(out)
}

/// Inverse of [`encrypt_aes`].
pub fn decrypt_aes(key: &[u8], data: &[u8]) -> CoreResult<Vec<u8>> {
    if data.len() < AES_GCM_NONCE_LEN {
        return Err(TaggedError::validation(format!(
            "ciphertext is {} bytes, shorter than the {} byte nonce",
            data.len(),
            AES_GCM_NONCE_LEN
        ))
        .into());
    }
    let (nonce, ct) = data.split_at(AES_GCM_NONCE_LEN);
    match key.len() {
        16 => open::<Aes128Gcm>(key, nonce, ct),
        24 => open::<Aes192Gcm>(key, nonce, ct),
        32 => open::<Aes256Gcm>(key, nonce, ct),
        n => Err(invalid_aes_key(n)),
    }
}

fn seal<C>(key: &[u8], nonce: &[u8], plaintext: &[u8]) -> CoreResult<Vec<u8>>
where
    C: KeyInit + Aead + AeadCore<NonceSize = U12>,
{
    let cipher = C::new_from_slice(key)
        .map_err(|e| TaggedError::validation(format!("invalid key: {}", e)))?;
    Ok(cipher
        .encrypt(GenericArray::from_slice(nonce), plaintext)
        .map_err(|e| TaggedError::crypto(format!("encryption failed: {}", e)))?)
}

fn open<C>(key: &[u8], nonce: &[u8], ct: &[u8]) -> CoreResult<Vec<u8>>
where
    C: KeyInit + Aead + AeadCore<NonceSize = U12>,
{
    let cipher = C::new_from_slice(key)
        .map_err(|e| TaggedError::validation(format!("invalid key: {}", e)))?;
    Ok(cipher
        .decrypt(GenericArray::from_slice(nonce), ct)
        .map_err(|e| TaggedError::crypto(format!("decryption failed: {}", e)))?)
}

fn invalid_aes_key(len: usize) -> crate::error::CoreError {
    TaggedError::validation(format!(
        "AES key must be 16, 24 or 32 bytes, got {}",
        len
    ))
    .into()
}

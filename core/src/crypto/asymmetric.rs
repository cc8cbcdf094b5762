//! RSA helpers: OAEP-SHA256 for encryption, PSS-SHA256 for signatures.

use crate::error::CoreResult;
use crate::tagged::{ErrorCategory, ResultExt};
use rsa::{Oaep, Pss};
use sha2::{Digest, Sha256};

pub use rsa::{RsaPrivateKey, RsaPublicKey};

pub fn generate_rsa_keys(bits: usize) -> CoreResult<(RsaPrivateKey, RsaPublicKey)> {
    let private = RsaPrivateKey::new(&mut rand::thread_rng(), bits).tag(
        ErrorCategory::Crypto,
        format!("failed to generate {}-bit RSA key", bits),
    )?;
    let public = RsaPublicKey::from(&private);
    Ok((private, public))
}

pub fn encrypt_rsa(public: &RsaPublicKey, data: &[u8]) -> CoreResult<Vec<u8>> {
    Ok(public
        .encrypt(&mut rand::thread_rng(), Oaep::new::<Sha256>(), data)
        .tag(ErrorCategory::Crypto, "RSA-OAEP encryption failed")?)
}

pub fn decrypt_rsa(private: &RsaPrivateKey, ciphertext: &[u8]) -> CoreResult<Vec<u8>> {
    Ok(private
        .decrypt(Oaep::new::<Sha256>(), ciphertext)
        .tag(ErrorCategory::Crypto, "RSA-OAEP decryption failed")?)
}

/// Same scheme as [`encrypt_rsa`]; meant for short payloads such as wrapped keys.
pub fn encrypt_with_public_key(public: &RsaPublicKey, data: &[u8]) -> CoreResult<Vec<u8>> {
    encrypt_rsa(public, data)
}

pub fn decrypt_with_private_key(private: &RsaPrivateKey, data: &[u8]) -> CoreResult<Vec<u8>> {
    decrypt_rsa(private, data)
}

pub fn sign_data(private: &RsaPrivateKey, data: &[u8]) -> CoreResult<Vec<u8>> {
    let digest = Sha256::digest(data);
    Ok(private
        .sign_with_rng(&mut rand::thread_rng(), Pss::new::<Sha256>(), &digest)
        .tag(ErrorCategory::Crypto, "RSA-PSS signing failed")?)
}

/// `Ok(())` when `signature` is a valid PSS signature of `data`.
pub fn verify_signature(public: &RsaPublicKey, data: &[u8], signature: &[u8]) -> CoreResult<()> {
    let digest = Sha256::digest(data);
    public
        .verify(Pss::new::<Sha256>(), &digest, signature)
        .tag(ErrorCategory::Crypto, "RSA-PSS signature does not verify")?;
    Ok(())
}

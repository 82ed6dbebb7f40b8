use aes_gcm::{
    aead::{Aead, KeyInit, OsRng, Payload},
    Aes256Gcm, Nonce,
};
use aes_gcm::aead::rand_core::RngCore;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The size of the AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;
/// The size of the AES-GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;

/// Errors raised by the AEAD primitives.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CipherError {
    #[error("key must be exactly {expected} bytes, got {0}", expected = KEY_SIZE)]
    InvalidKeySize(usize),

    #[error("sealed data is shorter than a nonce")]
    Truncated,

    #[error("encryption failed")]
    Encrypt,

    #[error("decryption failed")]
    Decrypt,
}

/// A secure key wrapper that ensures the key is zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecureKey([u8; KEY_SIZE]);

impl SecureKey {
    /// Creates a new `SecureKey` from a byte array.
    pub fn new(key: [u8; KEY_SIZE]) -> Self {
        Self(key)
    }

    /// Copies a key out of a slice, rejecting anything that is not exactly
    /// `KEY_SIZE` bytes long.
    pub fn from_slice(key: &[u8]) -> Result<Self, CipherError> {
        let bytes: [u8; KEY_SIZE] = key
            .try_into()
            .map_err(|_| CipherError::InvalidKeySize(key.len()))?;
        Ok(Self(bytes))
    }

    /// Returns a reference to the key as a byte slice.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

/// Generates a new random AES-GCM nonce.
pub fn generate_nonce() -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// Encrypts and authenticates `plaintext` with AES-256-GCM, binding `aad`
/// into the tag.
///
/// # Returns
///
/// `nonce || ciphertext || tag` as a single buffer.
pub fn seal(key: &SecureKey, plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>, CipherError> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    let nonce_bytes = generate_nonce();
    let nonce = Nonce::from(nonce_bytes);

    let ciphertext = cipher
        .encrypt(&nonce, Payload { msg: plaintext, aad })
        .map_err(|_| CipherError::Encrypt)?;

    let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    sealed.extend_from_slice(&nonce_bytes);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

/// Reverses [`seal`]. Fails if any byte of `sealed` or `aad` was altered.
pub fn open(key: &SecureKey, sealed: &[u8], aad: &[u8]) -> Result<Vec<u8>, CipherError> {
    if sealed.len() < NONCE_SIZE {
        return Err(CipherError::Truncated);
    }

    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_SIZE);
    let cipher = Aes256Gcm::new(key.as_bytes().into());
    let nonce = Nonce::from_slice(nonce_bytes);

    cipher
        .decrypt(nonce, Payload { msg: ciphertext, aad })
        .map_err(|_| CipherError::Decrypt)
}

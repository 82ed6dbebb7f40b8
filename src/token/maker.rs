use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::crypto::aes::{self, SecureKey};
use crate::token::payload::Payload;

/// Version header prepended to every sealed token and bound as associated data.
pub const TOKEN_HEADER: &str = "v1.local.";

/// Errors produced while issuing or verifying a token.
#[derive(Error, Debug)]
pub enum TokenError {
    /// The symmetric key has the wrong length.
    #[error("invalid key size: must be exactly {} bytes", aes::KEY_SIZE)]
    InvalidKeySize,

    /// A token was requested with a non-positive lifetime.
    #[error("token duration must be positive")]
    InvalidDuration,

    /// The payload could not be serialized.
    #[error("payload serialization failed: {0}")]
    Serialization(String),

    /// The payload could not be sealed.
    #[error("token sealing failed")]
    Sealing,

    /// Malformed, tampered with, or sealed under another key.
    #[error("token is invalid")]
    InvalidToken,

    /// Authentic but past its expiry.
    #[error("token has expired")]
    ExpiredToken,
}

/// Issues and verifies session tokens.
pub trait TokenMaker: Send + Sync {
    /// Creates a token for `username` valid for `duration`.
    fn create_token(&self, username: &str, duration: Duration) -> Result<(String, Payload), TokenError>;

    /// Checks a token and returns its payload if it is authentic and fresh.
    fn verify_token(&self, token: &str) -> Result<Payload, TokenError>;
}

/// Seals payloads with AES-256-GCM so that holders of a token can neither
/// read nor alter it without the key.
pub struct SealedTokenMaker {
    key: SecureKey,
}

impl SealedTokenMaker {
    /// Creates a new maker.
    ///
    /// # Arguments
    ///
    /// * `symmetric_key` - Exactly 32 bytes.
    ///
    /// # Returns
    ///
    /// `TokenError::InvalidKeySize` for any other length.
    pub fn new(symmetric_key: &[u8]) -> Result<Self, TokenError> {
        let key = SecureKey::from_slice(symmetric_key).map_err(|_| TokenError::InvalidKeySize)?;
        Ok(Self { key })
    }

    /// Same as [`TokenMaker::create_token`] with an explicit issue instant.
    pub fn create_token_at(
        &self,
        username: &str,
        duration: Duration,
        now: DateTime<Utc>,
    ) -> Result<(String, Payload), TokenError> {
        if duration <= Duration::zero() {
            return Err(TokenError::InvalidDuration);
        }

        let payload = Payload::new(username, duration, now);
        let json = sonic_rs::to_vec(&payload)
            .map_err(|e| TokenError::Serialization(e.to_string()))?;

        let sealed = aes::seal(&self.key, &json, TOKEN_HEADER.as_bytes())
            .map_err(|_| TokenError::Sealing)?;

        let token = format!("{}{}", TOKEN_HEADER, URL_SAFE_NO_PAD.encode(sealed));
        Ok((token, payload))
    }

    /// Same as [`TokenMaker::verify_token`] with an explicit current instant.
    pub fn verify_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<Payload, TokenError> {
        let body = token
            .strip_prefix(TOKEN_HEADER)
            .ok_or(TokenError::InvalidToken)?;

        let sealed = URL_SAFE_NO_PAD
            .decode(body)
            .map_err(|_| TokenError::InvalidToken)?;

        let json = aes::open(&self.key, &sealed, TOKEN_HEADER.as_bytes())
            .map_err(|_| TokenError::InvalidToken)?;

        let payload: Payload = sonic_rs::from_slice(&json).map_err(|_| TokenError::InvalidToken)?;

        // Expiry is checked only once the payload is known to be authentic.
        if payload.is_expired_at(now) {
            return Err(TokenError::ExpiredToken);
        }

        Ok(payload)
    }
}

impl TokenMaker for SealedTokenMaker {
    fn create_token(&self, username: &str, duration: Duration) -> Result<(String, Payload), TokenError> {
        self.create_token_at(username, duration, Utc::now())
    }

    fn verify_token(&self, token: &str) -> Result<Payload, TokenError> {
        self.verify_token_at(token, Utc::now())
    }
}

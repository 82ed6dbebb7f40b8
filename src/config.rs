use std::env;
use std::net::SocketAddr;
use anyhow::{Context, Result};
use zeroize::{Zeroize, Zeroizing};

use crate::crypto::aes::KEY_SIZE;

/// Default listen address.
pub const DEFAULT_SERVER_ADDRESS: &str = "0.0.0.0:8080";
/// Default access token lifetime in minutes.
pub const DEFAULT_ACCESS_TOKEN_MINUTES: i64 = 15;
/// Default upper bound on pooled database connections.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: usize = 16;

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// The URL of the PostgreSQL database.
    pub database_url: String,
    /// The upper bound on pooled database connections.
    pub database_max_connections: usize,
    /// The address the HTTP server binds to.
    pub server_address: SocketAddr,
    /// The key used to seal session tokens.
    pub token_symmetric_key: Zeroizing<Vec<u8>>,
    /// The lifetime of newly issued tokens.
    pub access_token_duration: chrono::Duration,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Creates a new `Config` from an arbitrary variable lookup.
    ///
    /// # Arguments
    ///
    /// * `lookup` - Returns the value of a variable, if set.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut key_hex = lookup("TOKEN_SYMMETRIC_KEY")
            .context("TOKEN_SYMMETRIC_KEY must be set (generate with: openssl rand -hex 32)")?;

        let key_bytes = hex::decode(key_hex.trim());
        key_hex.zeroize();
        let key_bytes = key_bytes.context("TOKEN_SYMMETRIC_KEY must be valid hexadecimal")?;

        if key_bytes.len() != KEY_SIZE {
            anyhow::bail!(
                "TOKEN_SYMMETRIC_KEY must be exactly {} bytes ({} hex characters)",
                KEY_SIZE,
                KEY_SIZE * 2
            );
        }

        let minutes: i64 = lookup("ACCESS_TOKEN_DURATION_MINUTES")
            .unwrap_or_else(|| DEFAULT_ACCESS_TOKEN_MINUTES.to_string())
            .parse()
            .context("Invalid ACCESS_TOKEN_DURATION_MINUTES")?;

        if minutes <= 0 {
            anyhow::bail!("ACCESS_TOKEN_DURATION_MINUTES must be positive");
        }

        let database_max_connections: usize = lookup("DATABASE_MAX_CONNECTIONS")
            .map(|v| v.parse::<usize>())
            .transpose()
            .context("Invalid DATABASE_MAX_CONNECTIONS")?
            .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS);

        if database_max_connections == 0 {
            anyhow::bail!("DATABASE_MAX_CONNECTIONS must be positive");
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_max_connections,
            server_address: lookup("SERVER_ADDRESS")
                .unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string())
                .parse()
                .context("Invalid SERVER_ADDRESS")?,
            token_symmetric_key: Zeroizing::new(key_bytes),
            access_token_duration: chrono::Duration::minutes(minutes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const KEY_HEX: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/registry"),
            ("TOKEN_SYMMETRIC_KEY", KEY_HEX),
        ])
        .unwrap();

        assert_eq!(config.server_address, DEFAULT_SERVER_ADDRESS.parse::<SocketAddr>().unwrap());
        assert_eq!(config.access_token_duration, chrono::Duration::minutes(15));
        assert_eq!(config.database_max_connections, DEFAULT_DATABASE_MAX_CONNECTIONS);
        assert_eq!(config.token_symmetric_key.len(), KEY_SIZE);
        assert_eq!(config.token_symmetric_key[31], 0x1f);
    }

    #[test]
    fn explicit_values_are_used() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/registry"),
            ("TOKEN_SYMMETRIC_KEY", KEY_HEX),
            ("SERVER_ADDRESS", "127.0.0.1:9000"),
            ("ACCESS_TOKEN_DURATION_MINUTES", "60"),
            ("DATABASE_MAX_CONNECTIONS", "4"),
        ])
        .unwrap();

        assert_eq!(config.database_max_connections, 4);

        assert_eq!(config.server_address.port(), 9000);
        assert_eq!(config.access_token_duration, chrono::Duration::hours(1));
    }

    #[test]
    fn short_key_fails_fast() {
        let err = load(&[
            ("DATABASE_URL", "postgres://localhost/registry"),
            ("TOKEN_SYMMETRIC_KEY", "00010203"),
        ])
        .err()
        .unwrap();
        assert!(err.to_string().contains("exactly 32 bytes"));
    }

    #[test]
    fn missing_or_invalid_values_fail() {
        assert!(load(&[("DATABASE_URL", "postgres://localhost/registry")]).is_err());
        assert!(load(&[("TOKEN_SYMMETRIC_KEY", KEY_HEX)]).is_err());
        assert!(load(&[
            ("DATABASE_URL", "postgres://localhost/registry"),
            ("TOKEN_SYMMETRIC_KEY", "zz"),
        ])
        .is_err());
        assert!(load(&[
            ("DATABASE_URL", "postgres://localhost/registry"),
            ("TOKEN_SYMMETRIC_KEY", KEY_HEX),
            ("ACCESS_TOKEN_DURATION_MINUTES", "0"),
        ])
        .is_err());
        for size in ["0", "many"] {
            assert!(load(&[
                ("DATABASE_URL", "postgres://localhost/registry"),
                ("TOKEN_SYMMETRIC_KEY", KEY_HEX),
                ("DATABASE_MAX_CONNECTIONS", size),
            ])
            .is_err());
        }
    }
}

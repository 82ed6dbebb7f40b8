use std::sync::Arc;
use anyhow::Context;

use crate::config::Config;
use crate::repositories::user::{PgUserStore, UserStore};
use crate::token::maker::{SealedTokenMaker, TokenMaker};

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// Where users and their session tokens live.
    pub store: Arc<dyn UserStore>,
    /// Issues and verifies session tokens.
    pub tokens: Arc<dyn TokenMaker>,
    /// The application's configuration.
    pub config: Config,
}

impl AppState {
    /// Creates a new `AppState` backed by PostgreSQL.
    ///
    /// Fails if the database is unreachable or the token key is unusable.
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let pool = crate::db::create_pool(&config.database_url, config.database_max_connections)?;
        tracing::info!("✅ PostgreSQL Pool initialized with deadpool-postgres");

        let store = PgUserStore::new(pool);
        store
            .ensure_schema()
            .await
            .context("Failed to prepare the users table")?;

        let tokens = SealedTokenMaker::new(&config.token_symmetric_key)
            .context("Cannot create token maker")?;
        tracing::info!("✅ Token maker initialized");

        Ok(Self::with_parts(config.clone(), Arc::new(store), Arc::new(tokens)))
    }

    /// Assembles a state from already-built parts.
    pub fn with_parts(
        config: Config,
        store: Arc<dyn UserStore>,
        tokens: Arc<dyn TokenMaker>,
    ) -> Self {
        Self {
            store,
            tokens,
            config,
        }
    }
}

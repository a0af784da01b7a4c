use std::sync::Arc;

use anyhow::{Context, Result};
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use migration::{Migrator, MigratorTrait};
use model::entities::category;
use sea_orm::{Database, DatabaseConnection};
use serde::Deserialize;
use tracing::{debug, error, info, trace, warn};

use crate::auth::AuthKeys;
use crate::schemas::AppState;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://finance.db?mode=rwc";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8000";
/// Development secret. The first 16 characters salt every stored password
/// hash, so changing it invalidates existing accounts.
pub const DEFAULT_SECRET_KEY: &str = "your-secret-key-change-in-production-finance-tracker-2024";
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60 * 24;

/// Runtime settings.
///
/// Sources, later ones winning: built-in defaults, an optional
/// `fintrack.toml` in the working directory, then the environment
/// (`DATABASE_URL`, `BIND_ADDRESS`, `SECRET_KEY`, `TOKEN_TTL_MINUTES`).
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: String,
    pub secret_key: String,
    pub token_ttl_minutes: i64,
}

impl AppConfig {
    /// Loads the configuration from `.env`, `fintrack.toml` and the environment.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let builder = Config::builder()
            .add_source(File::with_name("fintrack").required(false))
            .add_source(Environment::default().try_parsing(true));
        Self::from_builder(builder)
    }

    /// Applies the defaults underneath `builder` and deserializes the result.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let config: AppConfig = builder
            .set_default("database_url", DEFAULT_DATABASE_URL)?
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("secret_key", DEFAULT_SECRET_KEY)?
            .set_default("token_ttl_minutes", DEFAULT_TOKEN_TTL_MINUTES)?
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        if config.secret_key == DEFAULT_SECRET_KEY {
            warn!("SECRET_KEY not set, using the development default");
        }
        Ok(config)
    }

    /// Replaces values given on the command line.
    pub fn with_overrides(mut self, database_url: Option<String>, bind_address: Option<String>) -> Self {
        if let Some(database_url) = database_url {
            self.database_url = database_url;
        }
        if let Some(bind_address) = bind_address {
            self.bind_address = bind_address;
        }
        self
    }

    pub fn auth_keys(&self) -> AuthKeys {
        AuthKeys::new(
            &self.secret_key,
            chrono::Duration::minutes(self.token_ttl_minutes),
        )
    }
}

/// Opens the database pool.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    trace!("Attempting to connect to database");
    match Database::connect(database_url).await {
        Ok(connection) => {
            info!("Successfully connected to database");
            Ok(connection)
        }
        Err(e) => {
            error!("Failed to connect to database '{}': {}", database_url, e);
            Err(e.into())
        }
    }
}

/// Applies pending migrations and inserts the default categories when none exist.
pub async fn prepare_database(db: &DatabaseConnection) -> Result<()> {
    info!("Running database migrations");
    if let Err(e) = Migrator::up(db, None).await {
        error!("Failed to run database migrations: {}", e);
        return Err(e.into());
    }
    debug!("All pending migrations have been applied");

    let seeded = category::seed_defaults(db)
        .await
        .context("Failed to seed default categories")?;
    if !seeded.is_empty() {
        info!("Inserted {} default categories", seeded.len());
    }
    Ok(())
}

/// Initialize application state from an open connection
pub fn initialize_app_state(db: DatabaseConnection, config: &AppConfig) -> AppState {
    AppState {
        db,
        auth: Arc::new(config.auth_keys()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_without_sources() {
        let config = AppConfig::from_builder(Config::builder()).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.secret_key, DEFAULT_SECRET_KEY);
        assert_eq!(config.token_ttl_minutes, 1440);
    }

    #[test]
    fn test_sources_override_defaults() {
        let builder = Config::builder()
            .set_override("token_ttl_minutes", 30)
            .unwrap()
            .set_override("database_url", "sqlite::memory:")
            .unwrap();
        let config = AppConfig::from_builder(builder).unwrap();
        assert_eq!(config.token_ttl_minutes, 30);
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
    }

    #[test]
    fn test_cli_overrides_win() {
        let config = AppConfig::from_builder(Config::builder())
            .unwrap()
            .with_overrides(Some("sqlite://other.db".to_string()), None);
        assert_eq!(config.database_url, "sqlite://other.db");
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
    }
}

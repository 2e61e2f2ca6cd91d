use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::{migrate::Migrator, postgres::PgPoolOptions, PgPool};
use tracing::{error, info, warn};

use crate::auth::{password::PasswordHashing, repo::PgUserStore, services::CredentialService};
use crate::config::AppConfig;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Clone)]
pub struct AppState {
    pub credentials: CredentialService,
}

impl AppState {
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let hashing = PasswordHashing::new(&config.hash)?;
        let db = connect(config).await?;
        let store = Arc::new(PgUserStore::new(db));
        Ok(Self::from_parts(CredentialService::new(store, hashing)))
    }

    pub fn from_parts(credentials: CredentialService) -> Self {
        Self { credentials }
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        use crate::auth::{password::cheap_hashing, repo::InMemoryUserStore};

        let store = Arc::new(InMemoryUserStore::new());
        Self::from_parts(CredentialService::new(store, cheap_hashing()))
    }
}

fn pool_options(config: &AppConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(config.database_acquire_timeout_secs))
}

/// An unreachable database does not stop the server: the failure is logged
/// and the pool connects lazily, so each request fails on its own until the
/// database comes back. The lazy pool runs the migrations on every new
/// connection, so the `users` table exists once the database is reachable
/// again without a restart.
async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    match pool_options(config).connect(&config.database_url).await {
        Ok(db) => {
            info!("database connected");
            if let Err(e) = MIGRATOR.run(&db).await {
                warn!(error = %e, "migration failed; continuing");
            }
            Ok(db)
        }
        Err(e) => {
            error!(error = %e, "database connection failed; serving anyway");
            pool_options(config)
                .after_connect(|conn, _meta| {
                    Box::pin(async move {
                        if let Err(e) = MIGRATOR.run_direct(conn).await {
                            warn!(error = %e, "migration failed; continuing");
                        }
                        Ok(())
                    })
                })
                .connect_lazy(&config.database_url)
                .context("parse DATABASE_URL")
        }
    }
}

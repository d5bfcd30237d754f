use std::sync::Arc;

use tower_sessions_sqlx_store::SqliteStore;

use crate::config::Config;
use crate::database::Database;

#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub sessions: SqliteStore,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn from_config(config: Config) -> Result<Self, sqlx::Error> {
        let database =
            Database::connect(&config.database_url, config.database_max_connections).await?;

        // Session records share the application's pool
        let sessions = SqliteStore::new(database.pool().clone());
        sessions.migrate().await?;

        Ok(AppState {
            database,
            sessions,
            config: Arc::new(config),
        })
    }
}

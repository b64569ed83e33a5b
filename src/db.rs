use crate::error::StoreResult;
use libsql::{Builder, Connection, Database};
use std::path::Path;
use tracing::info;

/// Applied to every connection. Foreign keys are per-connection in
/// SQLite, so this cannot live in the migration.
const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON;";

pub struct DatabaseManager {
    db: Database,
}

impl DatabaseManager {
    /// Open (or create) a local libSQL database file.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        info!("Opening database at {}", path.display());

        let db = Builder::new_local(path).build().await?;

        Ok(Self { db })
    }

    /// Get a connection to the database. The connection is closed when the
    /// returned value is dropped.
    pub async fn connect(&self) -> StoreResult<Connection> {
        let conn = self.db.connect()?;
        conn.execute_batch(CONNECTION_PRAGMAS).await?;
        Ok(conn)
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> StoreResult<()> {
        info!("Running database migrations...");

        let conn = self.connect().await?;

        let migration_sql_001 = include_str!("../migrations/001_create_venues_artists_shows.sql");
        conn.execute_batch(migration_sql_001).await?;

        info!("Database migrations completed successfully");
        Ok(())
    }
}

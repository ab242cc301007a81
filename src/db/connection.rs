/// Database connection management with connection pooling
///
/// Provides a thread-safe connection pool to SQLite database.

use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Maximum number of database connections in the pool
const MAX_CONNECTIONS: u32 = 5;

const SCHEMA: &str = include_str!("../../database/schema.sql");

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: Arc<SqlitePool>,
    db_path: PathBuf,
}

impl Database {
    /// Open (or create) the database at `db_path`
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    ///
    /// # Returns
    /// * `Ok(Database)` - Successfully created database instance
    /// * `Err(AdvisorError)` - If connection fails
    ///
    /// # Examples
    /// ```no_run
    /// use farmgenie_lib::db::Database;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let db = Database::new("/var/lib/farmgenie/farmgenie.db").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
            .create_if_missing(true)
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?;

        let db = Self {
            pool: Arc::new(pool),
            db_path,
        };

        db.initialize_schema().await?;
        tracing::debug!(path = %db.db_path.display(), "database ready");

        Ok(db)
    }

    /// Create a test database in memory
    ///
    /// Single connection: every in-memory connection would be its own database.
    #[cfg(test)]
    pub async fn new_test() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let db = Self {
            pool: Arc::new(pool),
            db_path: PathBuf::from(":memory:"),
        };

        db.initialize_schema().await?;

        Ok(db)
    }

    /// Create tables and indexes if they don't exist
    async fn initialize_schema(&self) -> Result<()> {
        // sqlx runs one statement per query, so split the script
        for statement in SCHEMA.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                sqlx::query(trimmed).execute(self.pool.as_ref()).await?;
            }
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Close all connections in the pool
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn stats(&self) -> Result<DatabaseStats> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM predictions")
            .fetch_one(self.pool.as_ref())
            .await?;

        let (fertilizer,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM predictions WHERE kind = 'fertilizer'")
                .fetch_one(self.pool.as_ref())
                .await?;

        let (disease,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM predictions WHERE kind = 'disease'")
                .fetch_one(self.pool.as_ref())
                .await?;

        let (chat,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM predictions WHERE kind = 'chat'")
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(DatabaseStats {
            total_predictions: total,
            fertilizer_predictions: fertilizer,
            disease_predictions: disease,
            chat_predictions: chat,
            pool_size: self.pool.size(),
            idle_connections: self.pool.num_idle(),
        })
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub total_predictions: i64,
    pub fertilizer_predictions: i64,
    pub disease_predictions: i64,
    pub chat_predictions: i64,
    pub pool_size: u32,
    pub idle_connections: usize,
}

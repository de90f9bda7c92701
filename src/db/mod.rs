//! Database related module.
use async_trait::async_trait;
use std::str::FromStr;

use sqlx::any::{self, AnyPoolOptions};
use sqlx::AnyPool;
use sqlx::ConnectOptions;
use sqlx::Transaction;
use tracing::instrument;

use self::error::{StoreError, StoreResult};

/// Typed errors surfaced by the storage layer.
pub mod error;
/// Database initialization.
pub mod init;
/// Models for the database.
pub mod models;
/// Idempotent schema creation.
pub mod schema;

#[async_trait]
/// Generic Database
pub trait Db {
    /// Connects to a database.
    ///
    /// # Errors
    /// Errors if connection to database fails.
    async fn connect(url: &str) -> StoreResult<DatabaseConnection>;
}

#[async_trait]
/// Generic transaction
pub trait Tx {
    /// Begin a transaction.
    async fn begin(pool: AnyPool) -> StoreResult<DatabaseTransaction>;
    /// Commit a transaction.
    async fn commit(self) -> StoreResult<()>;
    /// Rollback a transaction.
    async fn rollback(self) -> StoreResult<()>;
}

/// Type of database connection.
#[derive(Debug, Clone, Copy)]
pub enum DatabaseKind {
    /// Sqlite database.
    Sqlite,
    /// Postgres database.
    Postgres,
}

/// Database connection.
#[derive(Debug, Clone)]
pub struct DatabaseConnection {
    /// Database connection pool.
    pub pool: AnyPool,
    /// Type of database connection.
    pub kind: DatabaseKind,
}

/// Database transaction.
pub struct DatabaseTransaction {
    /// Database transaction.
    pub tx: Transaction<'static, sqlx::Any>,
}

#[async_trait]
impl Db for DatabaseConnection {
    /// Connects to a database.
    ///
    /// # Errors
    /// Errors if connection to database fails.
    #[instrument(level = "trace")]
    async fn connect(db_url: &str) -> StoreResult<Self> {
        any::install_default_drivers();
        let kind = match db_url {
            url if url.starts_with("sqlite:") => DatabaseKind::Sqlite,
            url if url.starts_with("postgres://") || url.starts_with("postgresql://") => {
                DatabaseKind::Postgres
            }
            _ => {
                return Err(StoreError::Connection(format!(
                    "Unsupported database URL: {db_url}"
                )))
            }
        };
        let options = any::AnyConnectOptions::from_str(db_url)
            .map_err(StoreError::classify)?
            .disable_statement_logging();
        let pool = AnyPoolOptions::new()
            .max_connections(50)
            .connect_with(options)
            .await
            .map_err(StoreError::classify)?;
        Ok(Self { pool, kind })
    }
}

#[async_trait]
impl Tx for DatabaseTransaction {
    /// Begin a transaction.
    async fn begin(pool: AnyPool) -> StoreResult<Self> {
        let tx = pool.begin().await.map_err(StoreError::classify)?;
        Ok(Self { tx })
    }
    /// Commit a transaction.
    async fn commit(self) -> StoreResult<()> {
        self.tx.commit().await.map_err(StoreError::classify)?;
        Ok(())
    }

    /// Rollback a transaction.
    async fn rollback(self) -> StoreResult<()> {
        self.tx.rollback().await.map_err(StoreError::classify)?;
        Ok(())
    }
}

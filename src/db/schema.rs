//! Idempotent schema creation for the two catalog tables.
//!
//! Each statement is `IF NOT EXISTS`, so startup is a no-op against an
//! already-initialized database. The `REFERENCES` clauses document the
//! publication/book relationship at the DDL level; the managers additionally
//! guard it explicitly inside their transactions, since sqlite only enforces
//! foreign keys behind a per-connection pragma.
use crate::db::error::{StoreError, StoreResult};
use crate::db::{DatabaseConnection, DatabaseKind};

/// DDL for sqlite. `INTEGER PRIMARY KEY` aliases the rowid, so book ids are
/// assigned by the engine on insert.
const SQLITE_SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS publication (
        id INTEGER PRIMARY KEY,
        name VARCHAR(80) NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS book (
        id INTEGER PRIMARY KEY,
        title VARCHAR(500) NOT NULL,
        author VARCHAR(350),
        avg_rating REAL,
        format VARCHAR(50),
        image VARCHAR(100) UNIQUE,
        num_pages INTEGER,
        pub_date TEXT NOT NULL,
        pub_id INTEGER REFERENCES publication (id)
    )",
    "CREATE INDEX IF NOT EXISTS idx_book_title ON book (title)",
];

/// DDL for postgres.
const POSTGRES_SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS publication (
        id BIGINT PRIMARY KEY,
        name VARCHAR(80) NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS book (
        id BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
        title VARCHAR(500) NOT NULL,
        author VARCHAR(350),
        avg_rating DOUBLE PRECISION,
        format VARCHAR(50),
        image VARCHAR(100) UNIQUE,
        num_pages BIGINT,
        pub_date TEXT NOT NULL,
        pub_id BIGINT REFERENCES publication (id)
    )",
    "CREATE INDEX IF NOT EXISTS idx_book_title ON book (title)",
];

/// Create both catalog tables if they do not already exist.
///
/// # Errors
/// Errors if can't establish a connection to the database, or if the DDL is
/// rejected by the engine.
pub async fn create_all(connection: &DatabaseConnection) -> StoreResult<()> {
    let statements = match connection.kind {
        DatabaseKind::Sqlite => SQLITE_SCHEMA,
        DatabaseKind::Postgres => POSTGRES_SCHEMA,
    };
    let mut conn = connection
        .pool
        .acquire()
        .await
        .map_err(StoreError::classify)?;
    for statement in statements {
        sqlx::query(statement)
            .execute(&mut *conn)
            .await
            .map_err(StoreError::classify)?;
    }
    tracing::debug!("Catalog schema is in place");
    Ok(())
}

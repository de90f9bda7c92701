use crate::db::{schema, DatabaseConnection, Db as _};
use std::env;

/// Default sqlite database, created in the working directory when no URL is
/// given. `mode=rwc` lets sqlite create the file on first run.
const DEFAULT_SQLITE_URL: &str = "sqlite://catalog.db?mode=rwc";

/// Connects to a database and ensures the catalog schema exists.
/// We use `SQLite` by default, but we can override this by passing a URL or
/// setting the `DATABASE_URL` environment variable.
///
/// # Errors
/// Errors if connection to database fails.
/// Connections can fail if the database is not running, or if the database URL is invalid.
pub async fn connect(db_url: Option<&str>) -> anyhow::Result<DatabaseConnection> {
    let db_url = db_url.map_or_else(
        || env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_SQLITE_URL.to_owned()),
        ToOwned::to_owned,
    );
    let connection = DatabaseConnection::connect(&db_url).await?;
    tracing::info!("Connected to database");
    schema::create_all(&connection).await?;
    Ok(connection)
}

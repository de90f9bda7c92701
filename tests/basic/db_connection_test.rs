use crate::common;
use catalog::db::{init, DatabaseKind};
use std::matches;
use tempfile::tempdir;

#[actix_web::test]
async fn test_connect_when_sqlite_url_expect_sqlite_connection() {
    let dir = tempdir().unwrap();
    let connection = common::connect_to_scratch_db(&dir).await;
    assert!(matches!(connection.kind, DatabaseKind::Sqlite));
}

#[actix_web::test]
async fn test_connect_when_sqlite_file_cannot_be_created_expect_error() {
    let dir = tempdir().unwrap();
    let url = format!(
        "sqlite://{}",
        dir.path().join("missing/db.sqlite3").display()
    );
    let actual = init::connect(Some(&url)).await.unwrap_err();
    let expected = "unable to open database file";
    assert!(
        actual.to_string().contains(expected),
        "\"{actual}\" doesn't contain {expected}"
    );
}

#[actix_web::test]
async fn test_connect_when_unsupported_url_expect_error() {
    let actual = init::connect(Some("mysql://root@localhost/catalog"))
        .await
        .unwrap_err();
    let expected = "Unsupported database URL";
    assert!(
        actual.to_string().contains(expected),
        "\"{actual}\" doesn't contain {expected}"
    );
}

#[actix_web::test]
async fn test_connect_twice_expect_schema_creation_idempotent() {
    let dir = tempdir().unwrap();
    let first = common::connect_to_scratch_db(&dir).await;
    first.pool.close().await;
    // The second connect replays CREATE TABLE IF NOT EXISTS on existing tables.
    let second = common::connect_to_scratch_db(&dir).await;
    assert!(matches!(second.kind, DatabaseKind::Sqlite));
}

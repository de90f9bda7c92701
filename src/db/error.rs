//! Typed errors for the storage layer.
//!
//! Every failure a repository operation can produce collapses into one of
//! four kinds: a constraint violation, a referential-integrity violation,
//! a missing record, or an unreachable backend. Callers match on the kind;
//! nothing is retried internally.
use sqlx::error::ErrorKind;
use thiserror::Error;

/// Result alias for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the storage layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A required field is missing or empty, a length limit was exceeded,
    /// or a unique value collided with an existing row.
    #[error("constraint violation: {0}")]
    Constraint(String),
    /// A foreign key points at a missing parent, or a parent delete is
    /// blocked by existing children.
    #[error("referential integrity violation: {0}")]
    ReferentialIntegrity(String),
    /// Lookup by primary key found no row.
    #[error("no {table} with id {id}")]
    NotFound {
        /// Table the lookup ran against.
        table: &'static str,
        /// Primary key that had no match.
        id: i64,
    },
    /// The storage backend is unreachable or the connection URL is unusable.
    #[error("storage connection failure: {0}")]
    Connection(String),
    /// Any other error bubbled up from sqlx.
    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl StoreError {
    /// Classify an sqlx error into one of the storage error kinds.
    ///
    /// Engine-reported constraint failures are folded into [`Self::Constraint`]
    /// and [`Self::ReferentialIntegrity`]; pool and IO failures into
    /// [`Self::Connection`]. `RowNotFound` is not mapped here since only the
    /// call site knows which table and id were involved.
    pub(crate) fn classify(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => Self::Constraint(db_err.message().to_owned()),
                ErrorKind::ForeignKeyViolation => {
                    Self::ReferentialIntegrity(db_err.message().to_owned())
                }
                _ => Self::Sqlx(sqlx::Error::Database(db_err)),
            },
            err @ (sqlx::Error::Configuration(_)
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed) => Self::Connection(err.to_string()),
            other => Self::Sqlx(other),
        }
    }
}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{any::AnyRow, FromRow, Row as _};

use crate::db::error::StoreResult;

use super::{require_max_len, require_non_empty};

pub mod manager;

/// Maximum length of a publication name.
const MAX_NAME_LEN: usize = 80;

/// Trait for managing publications.
#[async_trait]
pub trait Manager {
    /// Persist one publication; commits immediately.
    async fn create(&self, publication: &Publication) -> StoreResult<()>;
    /// Persist an ordered sequence of publications in one transaction.
    /// A single violation rolls back the entire batch.
    async fn create_all(&self, publications: &[Publication]) -> StoreResult<()>;
    /// Find all publications, in the storage's native order.
    async fn find_all(&self) -> StoreResult<Vec<Publication>>;
    /// Find a publication by primary key.
    async fn find_by_id(&self, id: i64) -> StoreResult<Publication>;
    /// Find the first publication with the given name, if any.
    async fn find_first_by_name(&self, name: &str) -> StoreResult<Option<Publication>>;
    /// Delete a previously-fetched publication. Blocked while any book
    /// still references it.
    async fn delete(&self, publication: &Publication) -> StoreResult<()>;
}

/// Trait for managing transactions on publications.
#[async_trait]
pub trait TxManager {
    /// Insert a publication within the open transaction.
    async fn create(&mut self, publication: &Publication) -> StoreResult<()>;
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
/// Model for a publication. The id is chosen by the caller, not the
/// storage engine, and is fixed at construction.
pub struct Publication {
    /// Caller-assigned primary key.
    pub id: i64,
    /// Name of the publication, at most 80 characters.
    pub name: String,
}

impl FromRow<'_, AnyRow> for Publication {
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
        })
    }
}

impl Publication {
    /// Create a new publication with a caller-chosen id.
    ///
    /// # Errors
    /// Errors if `name` is empty or longer than 80 characters.
    pub fn new(id: i64, name: &str) -> StoreResult<Self> {
        let publication = Self {
            id,
            name: name.to_owned(),
        };
        publication.validate()?;
        Ok(publication)
    }

    /// Re-check field constraints. Fields are public, so the managers run
    /// this again at persist time.
    pub(crate) fn validate(&self) -> StoreResult<()> {
        require_non_empty("publication", "name", &self.name)?;
        require_max_len("publication", "name", &self.name, MAX_NAME_LEN)?;
        Ok(())
    }
}

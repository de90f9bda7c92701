//! Manager for the publication model.
use crate::db::error::{StoreError, StoreResult};
use crate::db::models::book;
use crate::db::{DatabaseConnection, DatabaseTransaction, Tx as _};
use async_trait::async_trait;

use super::Publication;

#[async_trait]
impl super::Manager for DatabaseConnection {
    /// Insert one publication and commit.
    ///
    /// # Errors
    /// Errors if the name violates a field constraint or the id collides
    /// with an existing publication.
    async fn create(&self, publication: &Publication) -> StoreResult<()> {
        publication.validate()?;
        let statement = "
            INSERT INTO publication ( id, name )
            VALUES ( $1, $2 )
        ";
        let mut connection = self.pool.acquire().await.map_err(StoreError::classify)?;
        sqlx::query(statement)
            .bind(publication.id)
            .bind(&publication.name)
            .execute(&mut *connection)
            .await
            .map_err(StoreError::classify)?;
        Ok(())
    }

    /// Delete a publication, refusing while any book still references it.
    /// The reference count and the delete run in the same transaction.
    ///
    /// # Errors
    /// Errors with `ReferentialIntegrity` while referencing books exist, and
    /// with `NotFound` if the publication was already deleted.
    async fn delete(&self, publication: &Publication) -> StoreResult<()> {
        let mut tx = DatabaseTransaction::begin(self.pool.clone()).await?;
        let referencing = book::TxManager::count_by_pub_id(&mut tx, publication.id).await?;
        if referencing > 0 {
            return Err(StoreError::ReferentialIntegrity(format!(
                "publication {} is still referenced by {referencing} book(s)",
                publication.id
            )));
        }
        let statement = "
            DELETE FROM publication
            WHERE id = $1
        ";
        let result = sqlx::query(statement)
            .bind(publication.id)
            .execute(&mut *tx.tx)
            .await
            .map_err(StoreError::classify)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                table: "publication",
                id: publication.id,
            });
        }
        tx.commit().await
    }

    /// Insert a batch of publications in one transaction.
    ///
    /// # Errors
    /// Errors on the first violation; nothing from the batch is persisted.
    async fn create_all(&self, publications: &[Publication]) -> StoreResult<()> {
        let mut tx = DatabaseTransaction::begin(self.pool.clone()).await?;
        for publication in publications {
            super::TxManager::create(&mut tx, publication).await?;
        }
        tx.commit().await
    }

    async fn find_all(&self) -> StoreResult<Vec<Publication>> {
        let statement = "
            SELECT *
            FROM publication
        ";
        let mut connection = self.pool.acquire().await.map_err(StoreError::classify)?;
        let rows = sqlx::query_as::<_, Publication>(statement)
            .fetch_all(&mut *connection)
            .await
            .map_err(StoreError::classify)?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Publication> {
        let statement = "
            SELECT *
            FROM publication
            WHERE id = $1
        ";
        let mut connection = self.pool.acquire().await.map_err(StoreError::classify)?;
        let row = sqlx::query_as::<_, Publication>(statement)
            .bind(id)
            .fetch_optional(&mut *connection)
            .await
            .map_err(StoreError::classify)?;
        row.ok_or(StoreError::NotFound {
            table: "publication",
            id,
        })
    }

    async fn find_first_by_name(&self, name: &str) -> StoreResult<Option<Publication>> {
        let statement = "
            SELECT *
            FROM publication
            WHERE name = $1
            LIMIT 1
        ";
        let mut connection = self.pool.acquire().await.map_err(StoreError::classify)?;
        let row = sqlx::query_as::<_, Publication>(statement)
            .bind(name)
            .fetch_optional(&mut *connection)
            .await
            .map_err(StoreError::classify)?;
        Ok(row)
    }
}

#[async_trait]
impl super::TxManager for DatabaseTransaction {
    /// Insert a new publication within the transaction.
    ///
    /// # Errors
    /// Errors if the publication cannot be inserted into the database.
    async fn create(&mut self, publication: &Publication) -> StoreResult<()> {
        publication.validate()?;
        let statement = "
            INSERT INTO publication ( id, name )
            VALUES ( $1, $2 )
        ";
        sqlx::query(statement)
            .bind(publication.id)
            .bind(&publication.name)
            .execute(&mut *self.tx)
            .await
            .map_err(StoreError::classify)?;
        Ok(())
    }
}

//! Manager for the book model.
use crate::db::error::{StoreError, StoreResult};
use crate::db::{DatabaseConnection, DatabaseTransaction, Tx as _};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row as _;

use super::{Book, BookFilter, NewBook};

/// A value waiting to be bound to a dynamically assembled statement.
enum Bind {
    /// Text parameter.
    Text(String),
    /// Integer parameter.
    Int(i64),
    /// Floating point parameter.
    Real(f64),
}

/// Compile a [`BookFilter`] into a SELECT statement and its bind values.
/// Parameters are numbered in the order the clauses are pushed.
fn filter_statement(filter: &BookFilter) -> (String, Vec<Bind>) {
    let mut statement = String::from("SELECT * FROM book");
    let mut clauses: Vec<String> = Vec::new();
    let mut binds: Vec<Bind> = Vec::new();
    if let Some(author) = &filter.author {
        binds.push(Bind::Text(author.clone()));
        clauses.push(format!("author = ${}", binds.len()));
    }
    if let Some(format) = &filter.format {
        binds.push(Bind::Text(format.clone()));
        clauses.push(format!("format = ${}", binds.len()));
    }
    if let Some(pub_id) = filter.pub_id {
        binds.push(Bind::Int(pub_id));
        clauses.push(format!("pub_id = ${}", binds.len()));
    }
    if let Some(rating) = filter.min_avg_rating {
        binds.push(Bind::Real(rating));
        clauses.push(format!("avg_rating > ${}", binds.len()));
    }
    if !clauses.is_empty() {
        statement.push_str(" WHERE ");
        statement.push_str(&clauses.join(" AND "));
    }
    if let Some(order) = filter.order_by {
        statement.push_str(" ORDER BY ");
        statement.push_str(order.column());
        statement.push_str(" ASC");
    }
    if let Some(limit) = filter.limit {
        binds.push(Bind::Int(limit));
        statement.push_str(&format!(" LIMIT ${}", binds.len()));
    }
    (statement, binds)
}

/// Fail with `ReferentialIntegrity` unless the publication exists. Runs
/// inside the caller's transaction so the check and the write are atomic.
async fn ensure_publication_exists(
    tx: &mut DatabaseTransaction,
    pub_id: i64,
) -> StoreResult<()> {
    let statement = "
        SELECT COUNT(*)
        FROM publication
        WHERE id = $1
    ";
    let count: i64 = sqlx::query_scalar(statement)
        .bind(pub_id)
        .fetch_one(&mut *tx.tx)
        .await
        .map_err(StoreError::classify)?;
    if count == 0 {
        return Err(StoreError::ReferentialIntegrity(format!(
            "book.pub_id references missing publication {pub_id}"
        )));
    }
    Ok(())
}

#[async_trait]
impl super::Manager for DatabaseConnection {
    /// Insert one book and commit, returning the persisted record.
    ///
    /// # Errors
    /// Errors if a field or uniqueness constraint is violated, or if
    /// `pub_id` references a missing publication. Storage is left
    /// unchanged on failure.
    async fn insert(&self, book: &NewBook) -> StoreResult<Book> {
        let pub_date = Utc::now().to_rfc3339();
        let mut tx = DatabaseTransaction::begin(self.pool.clone()).await?;
        let id = super::TxManager::insert(&mut tx, book, &pub_date).await?;
        tx.commit().await?;
        super::Manager::find_by_id(self, id).await
    }

    /// Insert a batch of books in one transaction, returning their ids.
    ///
    /// # Errors
    /// Errors on the first violation; nothing from the batch is persisted.
    async fn insert_all(&self, books: &[NewBook]) -> StoreResult<Vec<i64>> {
        let pub_date = Utc::now().to_rfc3339();
        let mut tx = DatabaseTransaction::begin(self.pool.clone()).await?;
        let mut ids = Vec::with_capacity(books.len());
        for book in books {
            ids.push(super::TxManager::insert(&mut tx, book, &pub_date).await?);
        }
        tx.commit().await?;
        Ok(ids)
    }

    async fn find_all(&self) -> StoreResult<Vec<Book>> {
        let statement = "
            SELECT *
            FROM book
        ";
        let mut connection = self.pool.acquire().await.map_err(StoreError::classify)?;
        let rows = sqlx::query_as::<_, Book>(statement)
            .fetch_all(&mut *connection)
            .await
            .map_err(StoreError::classify)?;
        Ok(rows)
    }

    async fn find_first(&self) -> StoreResult<Option<Book>> {
        let statement = "
            SELECT *
            FROM book
            LIMIT 1
        ";
        let mut connection = self.pool.acquire().await.map_err(StoreError::classify)?;
        let row = sqlx::query_as::<_, Book>(statement)
            .fetch_optional(&mut *connection)
            .await
            .map_err(StoreError::classify)?;
        Ok(row)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Book> {
        let statement = "
            SELECT *
            FROM book
            WHERE id = $1
        ";
        let mut connection = self.pool.acquire().await.map_err(StoreError::classify)?;
        let row = sqlx::query_as::<_, Book>(statement)
            .bind(id)
            .fetch_optional(&mut *connection)
            .await
            .map_err(StoreError::classify)?;
        row.ok_or(StoreError::NotFound { table: "book", id })
    }

    async fn find_all_by_author(&self, author: &str) -> StoreResult<Vec<Book>> {
        let statement = "
            SELECT *
            FROM book
            WHERE author = $1
        ";
        let mut connection = self.pool.acquire().await.map_err(StoreError::classify)?;
        let rows = sqlx::query_as::<_, Book>(statement)
            .bind(author)
            .fetch_all(&mut *connection)
            .await
            .map_err(StoreError::classify)?;
        Ok(rows)
    }

    async fn find_first_by_author(&self, author: &str) -> StoreResult<Option<Book>> {
        let statement = "
            SELECT *
            FROM book
            WHERE author = $1
            LIMIT 1
        ";
        let mut connection = self.pool.acquire().await.map_err(StoreError::classify)?;
        let row = sqlx::query_as::<_, Book>(statement)
            .bind(author)
            .fetch_optional(&mut *connection)
            .await
            .map_err(StoreError::classify)?;
        Ok(row)
    }

    async fn find_first_by_title(&self, title: &str) -> StoreResult<Option<Book>> {
        let statement = "
            SELECT *
            FROM book
            WHERE title = $1
            LIMIT 1
        ";
        let mut connection = self.pool.acquire().await.map_err(StoreError::classify)?;
        let row = sqlx::query_as::<_, Book>(statement)
            .bind(title)
            .fetch_optional(&mut *connection)
            .await
            .map_err(StoreError::classify)?;
        Ok(row)
    }

    async fn find_all_by_pub_id(&self, pub_id: i64) -> StoreResult<Vec<Book>> {
        let statement = "
            SELECT *
            FROM book
            WHERE pub_id = $1
        ";
        let mut connection = self.pool.acquire().await.map_err(StoreError::classify)?;
        let rows = sqlx::query_as::<_, Book>(statement)
            .bind(pub_id)
            .fetch_all(&mut *connection)
            .await
            .map_err(StoreError::classify)?;
        Ok(rows)
    }

    async fn find_all_filtered(&self, filter: &BookFilter) -> StoreResult<Vec<Book>> {
        let (statement, binds) = filter_statement(filter);
        let mut query = sqlx::query_as::<_, Book>(&statement);
        for bind in binds {
            query = match bind {
                Bind::Text(value) => query.bind(value),
                Bind::Int(value) => query.bind(value),
                Bind::Real(value) => query.bind(value),
            };
        }
        let mut connection = self.pool.acquire().await.map_err(StoreError::classify)?;
        let rows = query
            .fetch_all(&mut *connection)
            .await
            .map_err(StoreError::classify)?;
        Ok(rows)
    }

    /// Persist every column of the book by primary key.
    ///
    /// # Errors
    /// Errors if a new value violates a constraint, if a changed `pub_id`
    /// references a missing publication, or with `NotFound` if the row is
    /// gone.
    async fn update(&self, book: &Book) -> StoreResult<()> {
        book.validate()?;
        let mut tx = DatabaseTransaction::begin(self.pool.clone()).await?;
        if let Some(pub_id) = book.pub_id {
            ensure_publication_exists(&mut tx, pub_id).await?;
        }
        let statement = "
            UPDATE book
            SET title = $1, author = $2, avg_rating = $3, format = $4,
                image = $5, num_pages = $6, pub_date = $7, pub_id = $8
            WHERE id = $9
        ";
        let result = sqlx::query(statement)
            .bind(&book.title)
            .bind(book.author.as_deref())
            .bind(book.avg_rating)
            .bind(book.format.as_deref())
            .bind(book.image.as_deref())
            .bind(book.num_pages)
            .bind(&book.pub_date)
            .bind(book.pub_id)
            .execute(&mut *tx.tx)
            .await
            .map_err(StoreError::classify)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                table: "book",
                id: book.id,
            });
        }
        tx.commit().await
    }

    async fn delete(&self, book: &Book) -> StoreResult<()> {
        super::Manager::delete_by_id(self, book.id).await
    }

    /// Delete by primary key.
    ///
    /// # Errors
    /// Errors with `NotFound` if the row was already deleted.
    async fn delete_by_id(&self, id: i64) -> StoreResult<()> {
        let statement = "
            DELETE FROM book
            WHERE id = $1
        ";
        let mut connection = self.pool.acquire().await.map_err(StoreError::classify)?;
        let result = sqlx::query(statement)
            .bind(id)
            .execute(&mut *connection)
            .await
            .map_err(StoreError::classify)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { table: "book", id });
        }
        Ok(())
    }

    async fn delete_by_pub_id(&self, pub_id: i64) -> StoreResult<u64> {
        let mut tx = DatabaseTransaction::begin(self.pool.clone()).await?;
        let removed = super::TxManager::delete_by_pub_id(&mut tx, pub_id).await?;
        tx.commit().await?;
        Ok(removed)
    }
}

#[async_trait]
impl super::TxManager for DatabaseTransaction {
    /// Insert a new book within the transaction and return its assigned id.
    ///
    /// # Errors
    /// Errors if the book cannot be inserted into the database.
    async fn insert(&mut self, book: &NewBook, pub_date: &str) -> StoreResult<i64> {
        book.validate()?;
        if let Some(pub_id) = book.pub_id {
            ensure_publication_exists(self, pub_id).await?;
        }
        let statement = "
            INSERT INTO book ( title, author, avg_rating, format, image, num_pages, pub_date, pub_id )
            VALUES ( $1, $2, $3, $4, $5, $6, $7, $8 )
            RETURNING id
        ";
        let row = sqlx::query(statement)
            .bind(&book.title)
            .bind(book.author.as_deref())
            .bind(book.avg_rating)
            .bind(book.format.as_deref())
            .bind(book.image.as_deref())
            .bind(book.num_pages)
            .bind(pub_date)
            .bind(book.pub_id)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(StoreError::classify)?;
        let id: i64 = row.try_get("id").map_err(StoreError::classify)?;
        Ok(id)
    }

    async fn count_by_pub_id(&mut self, pub_id: i64) -> StoreResult<i64> {
        let statement = "
            SELECT COUNT(*)
            FROM book
            WHERE pub_id = $1
        ";
        let count: i64 = sqlx::query_scalar(statement)
            .bind(pub_id)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(StoreError::classify)?;
        Ok(count)
    }

    async fn delete_by_pub_id(&mut self, pub_id: i64) -> StoreResult<u64> {
        let statement = "
            DELETE FROM book
            WHERE pub_id = $1
        ";
        let result = sqlx::query(statement)
            .bind(pub_id)
            .execute(&mut *self.tx)
            .await
            .map_err(StoreError::classify)?;
        Ok(result.rows_affected())
    }
}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{any::AnyRow, FromRow, Row as _};

use crate::db::error::StoreResult;

use super::{require_max_len, require_non_empty};

pub mod manager;

/// Maximum length of a book title.
const MAX_TITLE_LEN: usize = 500;
/// Maximum length of an author name.
const MAX_AUTHOR_LEN: usize = 350;
/// Maximum length of a format label.
const MAX_FORMAT_LEN: usize = 50;
/// Maximum length of an image path.
const MAX_IMAGE_LEN: usize = 100;

/// Trait for managing books.
#[async_trait]
pub trait Manager {
    /// Persist one book; commits immediately. The id and `pub_date` are
    /// assigned by the storage layer; the persisted record is returned.
    async fn insert(&self, book: &NewBook) -> StoreResult<Book>;
    /// Persist an ordered sequence of books in one transaction, returning
    /// their assigned ids. A single violation rolls back the entire batch.
    async fn insert_all(&self, books: &[NewBook]) -> StoreResult<Vec<i64>>;
    /// Find all books, in the storage's native order.
    async fn find_all(&self) -> StoreResult<Vec<Book>>;
    /// Find the first book in the storage's native order, if any.
    async fn find_first(&self) -> StoreResult<Option<Book>>;
    /// Find a book by primary key.
    async fn find_by_id(&self, id: i64) -> StoreResult<Book>;
    /// Find all books by a given author.
    async fn find_all_by_author(&self, author: &str) -> StoreResult<Vec<Book>>;
    /// Find the first book by a given author, if any.
    async fn find_first_by_author(&self, author: &str) -> StoreResult<Option<Book>>;
    /// Find the first book with the given title, if any.
    async fn find_first_by_title(&self, title: &str) -> StoreResult<Option<Book>>;
    /// Find all books printed by the given publication.
    async fn find_all_by_pub_id(&self, pub_id: i64) -> StoreResult<Vec<Book>>;
    /// Find all books satisfying the filter, optionally ordered and limited.
    async fn find_all_filtered(&self, filter: &BookFilter) -> StoreResult<Vec<Book>>;
    /// Persist every column of a fetched-and-mutated book by primary key.
    async fn update(&self, book: &Book) -> StoreResult<()>;
    /// Delete a previously-fetched book.
    async fn delete(&self, book: &Book) -> StoreResult<()>;
    /// Delete a book by primary key. Deleting an id with no row reports
    /// `NotFound`, so an already-deleted record is observable.
    async fn delete_by_id(&self, id: i64) -> StoreResult<()>;
    /// Delete every book referencing the given publication, in one
    /// transaction. Returns the number of rows removed.
    async fn delete_by_pub_id(&self, pub_id: i64) -> StoreResult<u64>;
}

/// Trait for managing transactions on books.
#[async_trait]
pub trait TxManager {
    /// Insert a book within the open transaction and return its assigned id.
    /// Verifies that a non-null `pub_id` references an existing publication.
    async fn insert(&mut self, book: &NewBook, pub_date: &str) -> StoreResult<i64>;
    /// Count the books referencing a publication.
    async fn count_by_pub_id(&mut self, pub_id: i64) -> StoreResult<i64>;
    /// Delete every book referencing a publication.
    async fn delete_by_pub_id(&mut self, pub_id: i64) -> StoreResult<u64>;
}

/// A book that has not been persisted yet. The primary key does not exist
/// until the storage layer assigns one, which is why this is a separate type
/// from [`Book`].
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct NewBook {
    /// Title of the book, at most 500 characters.
    pub title: String,
    /// Author, at most 350 characters.
    pub author: Option<String>,
    /// Average reader rating.
    pub avg_rating: Option<f64>,
    /// Physical or digital format, at most 50 characters.
    pub format: Option<String>,
    /// Cover image path, unique across the catalog, at most 100 characters.
    pub image: Option<String>,
    /// Page count.
    pub num_pages: Option<i64>,
    /// Foreign key reference to a publication by id.
    pub pub_id: Option<i64>,
}

/// Model for a persisted book.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Book {
    /// Storage-assigned primary key.
    pub id: i64,
    /// Title of the book, at most 500 characters.
    pub title: String,
    /// Author, at most 350 characters.
    pub author: Option<String>,
    /// Average reader rating.
    pub avg_rating: Option<f64>,
    /// Physical or digital format, at most 50 characters.
    pub format: Option<String>,
    /// Cover image path, unique across the catalog, at most 100 characters.
    pub image: Option<String>,
    /// Page count.
    pub num_pages: Option<i64>,
    /// Moment the record was persisted, RFC 3339.
    pub pub_date: String,
    /// Foreign key reference to a publication by id.
    pub pub_id: Option<i64>,
}

impl FromRow<'_, AnyRow> for Book {
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            author: row.try_get("author")?,
            avg_rating: row.try_get("avg_rating")?,
            format: row.try_get("format")?,
            image: row.try_get("image")?,
            num_pages: row.try_get("num_pages")?,
            pub_date: row.try_get("pub_date")?,
            pub_id: row.try_get("pub_id")?,
        })
    }
}

impl NewBook {
    /// Create a new book, mirroring the full column list of the table.
    ///
    /// # Errors
    /// Errors if `title` is empty or any text field exceeds its column
    /// length. Whether `pub_id` references an existing publication is
    /// checked at persist time, not here.
    #[allow(
        clippy::too_many_arguments,
        reason = "Mirrors the full column list of the book table"
    )]
    pub fn new(
        title: &str,
        author: Option<&str>,
        avg_rating: Option<f64>,
        format: Option<&str>,
        image: Option<&str>,
        num_pages: Option<i64>,
        pub_id: Option<i64>,
    ) -> StoreResult<Self> {
        let book = Self {
            title: title.to_owned(),
            author: author.map(ToOwned::to_owned),
            avg_rating,
            format: format.map(ToOwned::to_owned),
            image: image.map(ToOwned::to_owned),
            num_pages,
            pub_id,
        };
        book.validate()?;
        Ok(book)
    }

    pub(crate) fn validate(&self) -> StoreResult<()> {
        validate_fields(
            &self.title,
            self.author.as_deref(),
            self.format.as_deref(),
            self.image.as_deref(),
        )
    }
}

impl Book {
    pub(crate) fn validate(&self) -> StoreResult<()> {
        validate_fields(
            &self.title,
            self.author.as_deref(),
            self.format.as_deref(),
            self.image.as_deref(),
        )
    }
}

/// Field constraints shared by new and persisted books.
fn validate_fields(
    title: &str,
    author: Option<&str>,
    format: Option<&str>,
    image: Option<&str>,
) -> StoreResult<()> {
    require_non_empty("book", "title", title)?;
    require_max_len("book", "title", title, MAX_TITLE_LEN)?;
    if let Some(author) = author {
        require_max_len("book", "author", author, MAX_AUTHOR_LEN)?;
    }
    if let Some(format) = format {
        require_max_len("book", "format", format, MAX_FORMAT_LEN)?;
    }
    if let Some(image) = image {
        require_max_len("book", "image", image, MAX_IMAGE_LEN)?;
    }
    Ok(())
}

/// Column to sort a book query by, always ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookOrder {
    /// Sort by title.
    Title,
    /// Sort by author.
    Author,
    /// Sort by average rating.
    AvgRating,
    /// Sort by page count.
    NumPages,
    /// Sort by persist timestamp.
    PubDate,
}

impl BookOrder {
    /// Column name for the ORDER BY clause.
    pub(crate) const fn column(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::AvgRating => "avg_rating",
            Self::NumPages => "num_pages",
            Self::PubDate => "pub_date",
        }
    }
}

/// A composable predicate over books: equality on named fields, a strict
/// lower bound on the rating, and an optional sort and row limit. All
/// clauses are ANDed.
#[derive(Debug, Default, Clone)]
pub struct BookFilter {
    /// Keep books whose author equals this value.
    pub author: Option<String>,
    /// Keep books whose format equals this value.
    pub format: Option<String>,
    /// Keep books referencing this publication.
    pub pub_id: Option<i64>,
    /// Keep books rated strictly above this value.
    pub min_avg_rating: Option<f64>,
    /// Sort ascending by this column.
    pub order_by: Option<BookOrder>,
    /// Return at most this many rows.
    pub limit: Option<i64>,
}

impl BookFilter {
    /// Start an empty filter matching every book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep books whose author equals `author`.
    #[must_use]
    pub fn by_author(mut self, author: &str) -> Self {
        self.author = Some(author.to_owned());
        self
    }

    /// Keep books whose format equals `format`.
    #[must_use]
    pub fn by_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_owned());
        self
    }

    /// Keep books referencing the publication `pub_id`.
    #[must_use]
    pub const fn by_pub_id(mut self, pub_id: i64) -> Self {
        self.pub_id = Some(pub_id);
        self
    }

    /// Keep books rated strictly above `rating`.
    #[must_use]
    pub const fn rated_above(mut self, rating: f64) -> Self {
        self.min_avg_rating = Some(rating);
        self
    }

    /// Sort the result ascending by `order`.
    #[must_use]
    pub const fn order_by(mut self, order: BookOrder) -> Self {
        self.order_by = Some(order);
        self
    }

    /// Return at most `limit` rows.
    #[must_use]
    pub const fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

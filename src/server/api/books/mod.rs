//! Handlers for the book catalog.
#![allow(clippy::future_not_send)]
use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse, Responder};

use crate::db::error::StoreError;
use crate::db::models::book;

use super::state::{App as AppState, Global as _};

/// Module that maps the HTTP web request body to structs.
mod request {
    use serde::Deserialize;
    /// Request for the book detail endpoint.
    #[derive(Deserialize, Debug)]
    pub struct BookId {
        /// Primary key of the book.
        pub id: i64,
    }
}

/// Module that renders book records into HTTP response bodies.
mod response {
    use crate::db::models::book::Book;

    /// Replace the characters HTML treats specially in field values.
    fn escape(value: &str) -> String {
        value
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
    }

    /// Render the full book list as an HTML page.
    pub fn book_list_page(books: &[Book]) -> String {
        let mut page = String::from(
            "<html><head><title>Books</title></head><body>\n<h1>Books</h1>\n<ul>\n",
        );
        for book in books {
            let author = book.author.as_deref().unwrap_or("unknown author");
            let format = book.format.as_deref().unwrap_or("unknown format");
            page.push_str(&format!(
                "<li>{} by {} ({})</li>\n",
                escape(&book.title),
                escape(author),
                escape(format),
            ));
        }
        page.push_str("</ul>\n</body></html>\n");
        page
    }
}

/// Handler for the landing page.
pub async fn landing() -> impl Responder {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body("<h1>This is the landing page</h1>")
}

/// Handler for the full book list, rendered as HTML.
#[tracing::instrument(skip(data))]
pub async fn list(data: web::Data<AppState>) -> impl Responder {
    let db = data.db();
    match book::Manager::find_all(db).await {
        Ok(books) => HttpResponse::Ok()
            .content_type(ContentType::html())
            .body(response::book_list_page(&books)),
        Err(err) => {
            tracing::error!("Error listing books: {err}");
            HttpResponse::InternalServerError().body("Error listing books.")
        }
    }
}

/// Handler for a single book by primary key, returned as JSON.
/// A missing id surfaces as a 404.
#[tracing::instrument(skip(data))]
pub async fn show(data: web::Data<AppState>, params: web::Path<request::BookId>) -> impl Responder {
    let db = data.db();
    match book::Manager::find_by_id(db, params.id).await {
        Ok(book) => HttpResponse::Ok().json(book),
        Err(err @ StoreError::NotFound { .. }) => HttpResponse::NotFound().body(err.to_string()),
        Err(err) => {
            tracing::error!("Error fetching book {}: {err}", params.id);
            HttpResponse::InternalServerError().body("Error fetching book.")
        }
    }
}

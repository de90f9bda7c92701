//! API endpoints for the catalog server.

/// Handlers for the book catalog.
pub mod books;
/// A central place to register App routes.
pub mod routes;
/// Centralized state management.
pub mod state;

//! Serving the catalog over HTTP.

/// Endpoints and handlers.
pub mod api;
/// Server bootstrap.
pub mod app;
/// Tracing/logging for the HTTP server.
pub mod tracing;

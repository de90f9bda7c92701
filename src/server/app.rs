//! Serve the book catalog.
#![allow(clippy::exit, clippy::module_name_repetitions)]
use crate::db;
use crate::server::api::routes;
use crate::server::api::state::App as AppState;
use crate::server::tracing::CatalogRootSpanBuilder;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::{App, Error, HttpServer};
use tracing_actix_web::TracingLogger;

use std::{io, process};

use actix_http::body::MessageBody;
use actix_service::ServiceFactory;

/// Serve the book catalog over HTTP.
///
/// Connects to the database (exiting with an error when it is unreachable),
/// ensures the schema exists, and runs the server until interrupted.
#[actix_web::main]
pub async fn serve(database_url: Option<&str>, port: u16) -> io::Result<()> {
    let bind = "127.0.0.1";
    tracing::info!("Running catalog server on http://{bind}:{port}.");

    let db = match db::init::connect(database_url).await {
        Ok(db) => db,
        Err(err) => {
            tracing::error!(
                "error: could not connect to database. Confirm that DATABASE_URL env var is set correctly."
            );
            tracing::error!("Error: {:?}", err);
            process::exit(1);
        }
    };

    let state = AppState { db };

    HttpServer::new(move || init_app(&state))
        .bind((bind, port))?
        .run()
        .await
}

/// Initialize the application and all routing at start-up time.
///
/// # Arguments
/// * `state` - The application state
pub fn init_app(
    state: &AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Response = ServiceResponse<impl MessageBody>,
        Config = (),
        InitError = (),
        Error = Error,
    >,
> {
    let app = App::new().wrap(TracingLogger::<CatalogRootSpanBuilder>::new());
    routes::register_app(app, state)
}

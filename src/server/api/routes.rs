//! A central place to register App routes.
use actix_service::ServiceFactory;
use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    web, App, Error,
};

use super::books;
use super::state::App as AppState;

/// Central place to register all the App routing.
///
/// The landing page and the book list are the whole public surface; the
/// detail route exists so a missing primary key can surface as a 404.
#[tracing::instrument(skip(app, state))]
pub fn register_app<
    T: MessageBody,
    U: ServiceFactory<
        ServiceRequest,
        Response = ServiceResponse<T>,
        Config = (),
        InitError = (),
        Error = Error,
    >,
>(
    app: App<U>,
    state: &AppState,
) -> App<U> {
    app.app_data(web::Data::new(state.clone()))
        .service(web::resource("/").route(web::get().to(books::landing)))
        .service(
            web::scope("/books")
                .service(web::resource("").route(web::get().to(books::list)))
                .service(web::resource("/{id}").route(web::get().to(books::show))),
        )
}

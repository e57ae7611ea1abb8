//! HTTP server setup module.

use std::sync::Arc;
use std::time::Duration;

use actix_web::{
    App, HttpRequest, HttpResponse, HttpServer,
    dev::Server,
    http::{Method, header},
    middleware::{DefaultHeaders, Logger},
    web,
};

use crate::{
    api,
    model::{AppState, ErrorResult},
};

const ALLOWED_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Accept, Authorization";

/// CORS headers attached to every response, preflight answers included
pub fn cors_headers(origin: &str) -> DefaultHeaders {
    DefaultHeaders::new()
        .add((header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.to_string()))
        .add((header::ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS))
        .add((header::ACCESS_CONTROL_ALLOW_HEADERS, ALLOWED_HEADERS))
}

/// Answers preflight requests with 204 and everything else unmatched with 404
pub async fn fallback(req: HttpRequest) -> HttpResponse {
    if req.method() == Method::OPTIONS {
        HttpResponse::NoContent().finish()
    } else {
        ErrorResult::not_found(req.path())
    }
}

/// Creates and binds the HTTP server.
pub fn http_server(
    app_state: Arc<AppState>,
    cors_origin: String,
    address: String,
    port: u16,
    shutdown_timeout: Duration,
) -> Result<Server, std::io::Error> {
    Ok(HttpServer::new(move || {
        App::new()
            .wrap(cors_headers(&cors_origin))
            .wrap(Logger::default())
            .app_data(web::Data::from(app_state.clone()))
            .service(api::routes())
            .default_service(web::to(fallback))
    })
    .shutdown_timeout(shutdown_timeout.as_secs())
    .disable_signals()
    .bind((address, port))?
    .run())
}

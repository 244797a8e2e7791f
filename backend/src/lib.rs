use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub mod handlers {
    pub mod contact_dtos;
    pub mod contact_handlers;
    pub mod health_handlers;
}
pub mod utils {
    pub mod email_utils;
    pub mod sanitize;
}
pub mod models {
    pub mod contact_models;
    pub mod language;
}
pub mod repositories {
    pub mod contact_repository;
}
pub mod config;
pub mod db;
pub mod error;
pub mod schema;

use handlers::{contact_handlers, health_handlers};
use repositories::contact_repository::ContactStore;
use utils::email_utils::Mailer;

/// Services shared by every request. Built once in `main` and injected into the router.
pub struct AppState {
    pub contact_store: Arc<dyn ContactStore>,
    pub mailer: Arc<dyn Mailer>,
    /// Business inbox that receives a copy of every submission.
    pub contact_recipient: String,
}

pub fn build_router(state: Arc<AppState>, allowed_origins: Vec<HeaderValue>) -> Router {
    Router::new()
        .route(
            "/contactFormSubmit",
            post(contact_handlers::contact_form_submit)
                .fallback(contact_handlers::method_not_allowed),
        )
        .route("/apiHealthCheck", get(health_handlers::api_health_check))
        .layer(CatchPanicLayer::custom(contact_handlers::handle_panic))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN]),
        )
        .with_state(state)
}

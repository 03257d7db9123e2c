use axum::{
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::auth::ServerState;
use crate::openapi::ApiDoc;

pub mod reservations;
pub mod services;
pub mod shops;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK")))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: public catalog reads, admin catalog
/// writes and authenticated reservation endpoints.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let api = Router::new()
        .route("/api/v1/shops", get(shops::list).post(shops::create))
        .route(
            "/api/v1/shops/:id",
            get(shops::get).put(shops::update).delete(shops::delete),
        )
        .route(
            "/api/v1/shops/:id/services",
            get(services::list_by_shop).post(services::create),
        )
        .route("/api/v1/services", get(services::list))
        .route(
            "/api/v1/services/:id",
            get(services::get).put(services::update).delete(services::delete),
        )
        .route(
            "/api/v1/reservations",
            get(reservations::list).post(reservations::create),
        )
        .route(
            "/api/v1/reservations/:id",
            get(reservations::get)
                .put(reservations::update)
                .delete(reservations::delete),
        )
        .route("/health", get(health))
        .with_state(state);

    api.merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new().level(Level::INFO).include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new().level(Level::INFO).include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

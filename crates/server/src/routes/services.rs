use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;
use uuid::Uuid;

use service::policy;
use service::query::{apply_select, ListParams, PageLinks};
use service::services::{self, ServiceInput, ServicePatch};
use service::views::{self, ServiceView};

use crate::auth::{CurrentUser, ServerState};
use crate::envelope::{serialize_page, Envelope};
use crate::errors::ApiError;

#[utoipa::path(
    get, path = "/api/v1/services", tag = "services",
    responses((status = 200, description = "List OK"))
)]
pub async fn list(
    State(state): State<ServerState>,
    Query(raw): Query<HashMap<String, String>>,
) -> Result<Json<Envelope<Vec<Value>>>, ApiError> {
    let params = ListParams::from_query(&raw);
    let (rows, total) = services::list_services(&state.db, &params, None).await?;
    let pagination = PageLinks::build(params.page, params.limit, total);

    // top-level listing embeds the owning shop summary
    let page = views::service_views(&state.db, rows).await?;
    let mut data = serialize_page(&page)?;
    if let Some(select) = &params.select {
        for record in &mut data {
            apply_select(record, select);
        }
    }
    let count = data.len();
    Ok(Json(Envelope::list(data, count, pagination)))
}

#[utoipa::path(
    get, path = "/api/v1/shops/{id}/services", tag = "services",
    params(("id" = Uuid, Path, description = "Shop ID")),
    responses((status = 200, description = "List OK"))
)]
pub async fn list_by_shop(
    State(state): State<ServerState>,
    Path(shop_id): Path<Uuid>,
    Query(raw): Query<HashMap<String, String>>,
) -> Result<Json<Envelope<Vec<Value>>>, ApiError> {
    let params = ListParams::from_query(&raw);
    let (rows, total) = services::list_services(&state.db, &params, Some(shop_id)).await?;
    let pagination = PageLinks::build(params.page, params.limit, total);

    // nested listing skips populate and generic filters
    let mut data = serialize_page(&rows)?;
    if let Some(select) = &params.select {
        for record in &mut data {
            apply_select(record, select);
        }
    }
    let count = data.len();
    Ok(Json(Envelope::list(data, count, pagination)))
}

#[utoipa::path(
    get, path = "/api/v1/services/{id}", tag = "services",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<ServiceView>>, ApiError> {
    let found = services::get_service(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Service not found with id of {}", id)))?;
    let view = views::service_view(&state.db, found).await?;
    Ok(Json(Envelope::data(view)))
}

#[utoipa::path(
    post, path = "/api/v1/shops/{id}/services", tag = "services",
    params(("id" = Uuid, Path, description = "Shop ID")),
    request_body = crate::openapi::ServiceInputDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Shop Not Found")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    CurrentUser(caller): CurrentUser,
    Path(shop_id): Path<Uuid>,
    Json(input): Json<ServiceInput>,
) -> Result<(StatusCode, Json<Envelope<models::service::Model>>), ApiError> {
    policy::require_admin(&caller)?;
    let created = services::create_service(&state.db, shop_id, input).await?;
    Ok((StatusCode::CREATED, Json(Envelope::data(created))))
}

#[utoipa::path(
    put, path = "/api/v1/services/{id}", tag = "services",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Validation Error"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<ServicePatch>,
) -> Result<Json<Envelope<models::service::Model>>, ApiError> {
    policy::require_admin(&caller)?;
    let updated = services::update_service(&state.db, id, patch).await?;
    Ok(Json(Envelope::data(updated)))
}

#[utoipa::path(
    delete, path = "/api/v1/services/{id}", tag = "services",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete(
    State(state): State<ServerState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Value>>, ApiError> {
    policy::require_admin(&caller)?;
    if !services::delete_service(&state.db, id).await? {
        return Err(ApiError::not_found(format!("Service not found with id of {}", id)));
    }
    Ok(Json(Envelope::data(serde_json::json!({}))))
}

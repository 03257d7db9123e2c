use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use models::shop;
use service::policy;
use service::query::{apply_select, ListParams, PageLinks};
use service::shops::{self, ShopInput, ShopPatch};
use service::views::{self, ShopView};

use crate::auth::{CurrentUser, ServerState};
use crate::envelope::{serialize_page, Envelope};
use crate::errors::ApiError;

#[utoipa::path(
    get, path = "/api/v1/shops", tag = "shops",
    responses((status = 200, description = "List OK"))
)]
pub async fn list(
    State(state): State<ServerState>,
    Query(raw): Query<HashMap<String, String>>,
) -> Result<Json<Envelope<Vec<Value>>>, ApiError> {
    let params = ListParams::from_query(&raw);
    let (rows, total) = shops::list_shops(&state.db, &params).await?;
    let pagination = PageLinks::build(params.page, params.limit, total);

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
    get, path = "/api/v1/shops/{id}", tag = "shops",
    params(("id" = Uuid, Path, description = "Shop ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<ShopView>>, ApiError> {
    let found = shops::get_shop(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Shop not found with id of {}", id)))?;
    let view = views::shop_view(&state.db, found).await?;
    Ok(Json(Envelope::data(view)))
}

#[utoipa::path(
    post, path = "/api/v1/shops", tag = "shops",
    request_body = crate::openapi::ShopInputDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    CurrentUser(caller): CurrentUser,
    Json(input): Json<ShopInput>,
) -> Result<(StatusCode, Json<Envelope<shop::Model>>), ApiError> {
    policy::require_admin(&caller)?;
    let created = shops::create_shop(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(Envelope::data(created))))
}

#[utoipa::path(
    put, path = "/api/v1/shops/{id}", tag = "shops",
    params(("id" = Uuid, Path, description = "Shop ID")),
    responses(
        (status = 200, description = "Updated"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<ShopPatch>,
) -> Result<Json<Envelope<shop::Model>>, ApiError> {
    policy::require_admin(&caller)?;
    let updated = shops::update_shop(&state.db, id, patch).await?;
    Ok(Json(Envelope::data(updated)))
}

#[utoipa::path(
    delete, path = "/api/v1/shops/{id}", tag = "shops",
    params(("id" = Uuid, Path, description = "Shop ID")),
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
    if !shops::delete_shop(&state.db, id).await? {
        return Err(ApiError::not_found(format!("Shop not found with id of {}", id)));
    }
    info!(shop_id = %id, "shop deleted via api");
    Ok(Json(Envelope::data(serde_json::json!({}))))
}

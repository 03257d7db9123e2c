use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use models::reservation;
use service::query::{date_range_filters, ListParams, PageLinks};
use service::reservations::domain::{CreateReservationInput, ReservationPatch};
use service::reservations::repository::SeaOrmReservationStore;
use service::reservations::service::{ReservationService, MAX_ACTIVE_RESERVATIONS};
use service::views::{self, ReservationView};

use crate::auth::{CurrentUser, ServerState};
use crate::envelope::Envelope;
use crate::errors::ApiError;

fn booking(state: &ServerState) -> ReservationService<SeaOrmReservationStore> {
    ReservationService::new(Arc::new(SeaOrmReservationStore { db: state.db.clone() }))
}

#[utoipa::path(
    get, path = "/api/v1/reservations", tag = "reservations",
    responses((status = 200, description = "List OK"), (status = 401, description = "Unauthorized"))
)]
pub async fn list(
    State(state): State<ServerState>,
    CurrentUser(caller): CurrentUser,
    Query(raw): Query<HashMap<String, String>>,
) -> Result<Json<Envelope<Vec<ReservationView>>>, ApiError> {
    let mut params = ListParams::from_query(&raw);
    if caller.is_admin() {
        // date-range convenience filters are an admin-only surface
        let range =
            date_range_filters(&raw, "resvDate").map_err(|e| ApiError::bad_request(e))?;
        params.filters.extend(range);
    }

    let (rows, total) = booking(&state).list(&caller, params.clone()).await?;
    let pagination = PageLinks::build(params.page, params.limit, total);
    let data = views::reservation_views(&state.db, rows).await?;
    let count = data.len();
    Ok(Json(Envelope::list(data, count, pagination)))
}

#[utoipa::path(
    get, path = "/api/v1/reservations/{id}", tag = "reservations",
    params(("id" = Uuid, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "OK"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get(
    State(state): State<ServerState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<ReservationView>>, ApiError> {
    let found = booking(&state).get(&caller, id).await?;
    let view = views::reservation_view(&state.db, found).await?;
    Ok(Json(Envelope::data(view)))
}

#[utoipa::path(
    post, path = "/api/v1/reservations", tag = "reservations",
    request_body = crate::openapi::CreateReservationInputDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Shop or Service Not Found")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    CurrentUser(caller): CurrentUser,
    Json(input): Json<CreateReservationInput>,
) -> Result<(StatusCode, Json<Envelope<reservation::Model>>), ApiError> {
    let (created, active) = booking(&state).create(&caller, input, Utc::now()).await?;
    let message = format!(
        "Reservation created successfully. You now have {} of {} active reservations.",
        active, MAX_ACTIVE_RESERVATIONS
    );
    Ok((StatusCode::CREATED, Json(Envelope::data(created).with_message(message))))
}

#[utoipa::path(
    put, path = "/api/v1/reservations/{id}", tag = "reservations",
    params(("id" = Uuid, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Too Late To Modify"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<ReservationPatch>,
) -> Result<Json<Envelope<reservation::Model>>, ApiError> {
    let updated = booking(&state).update(&caller, id, patch, Utc::now()).await?;
    Ok(Json(Envelope::data(updated)))
}

// delete is not documented yet; can be added with #[utoipa::path]
pub async fn delete(
    State(state): State<ServerState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Value>>, ApiError> {
    booking(&state).delete(&caller, id, Utc::now()).await?;
    Ok(Json(Envelope::data(serde_json::json!({}))))
}

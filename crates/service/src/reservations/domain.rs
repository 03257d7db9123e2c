use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use uuid::Uuid;

use models::reservation::ReservationStatus;

/// Create payload. A client-supplied `user` is accepted and ignored; the
/// owner is always the caller resolved from the identity token.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationInput {
    pub resv_date: DateTime<FixedOffset>,
    #[serde(default)]
    pub status: Option<ReservationStatus>,
    pub shop: Uuid,
    pub service: Uuid,
    #[serde(default)]
    pub user: Option<Uuid>,
}

/// Partial update. `user` is deliberately absent: ownership never changes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationPatch {
    pub resv_date: Option<DateTime<FixedOffset>>,
    pub status: Option<ReservationStatus>,
    pub shop: Option<Uuid>,
    pub service: Option<Uuid>,
}

/// Row data handed to the store once every rule has passed.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub resv_date: DateTime<FixedOffset>,
    pub status: ReservationStatus,
    pub user_id: Uuid,
    pub shop_id: Uuid,
    pub service_id: Uuid,
}

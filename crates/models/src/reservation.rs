use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{service, shop, user};

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl Default for ReservationStatus {
    fn default() -> Self {
        ReservationStatus::Pending
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reservation")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub resv_date: DateTimeWithTimeZone,
    pub status: ReservationStatus,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    #[serde(rename = "shop")]
    pub shop_id: Uuid,
    #[serde(rename = "service")]
    pub service_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
    Shop,
    Service,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
            Relation::Shop => Entity::belongs_to(shop::Entity)
                .from(Column::ShopId)
                .to(shop::Column::Id)
                .into(),
            Relation::Service => Entity::belongs_to(service::Entity)
                .from(Column::ServiceId)
                .to(service::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Active = counts toward the reservation cap: pending or confirmed,
    /// and not yet in the past.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        matches!(
            self.status,
            ReservationStatus::Pending | ReservationStatus::Confirmed
        ) && self.resv_date.with_timezone(&Utc) >= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn resv(status: ReservationStatus, resv_date: DateTime<Utc>) -> Model {
        Model {
            id: Uuid::new_v4(),
            resv_date: resv_date.into(),
            status,
            user_id: Uuid::new_v4(),
            shop_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn active_requires_open_status_and_future_date() {
        let now = Utc::now();
        let future = now + Duration::days(2);
        let past = now - Duration::days(2);

        assert!(resv(ReservationStatus::Pending, future).is_active(now));
        assert!(resv(ReservationStatus::Confirmed, future).is_active(now));
        assert!(!resv(ReservationStatus::Cancelled, future).is_active(now));
        assert!(!resv(ReservationStatus::Completed, future).is_active(now));
        assert!(!resv(ReservationStatus::Pending, past).is_active(now));
    }
}

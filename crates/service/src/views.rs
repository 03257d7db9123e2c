//! Response assembly: resolve entity references and embed summaries, the
//! way the API reports a reservation together with its shop, service and
//! owner.

use std::collections::{HashMap, HashSet};

use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use uuid::Uuid;

use models::reservation::ReservationStatus;
use models::service::{OilType, ServiceArea};
use models::{reservation, service, shop, user};

use crate::errors::ServiceError;

/// A reference that may or may not have been resolved; unresolved ones
/// serialize as the bare id, resolved ones as the embedded summary.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MaybePopulated<T: Serialize> {
    Id(Uuid),
    Populated(T),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopSummary {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub location: String,
    pub tel: String,
    pub open_time: String,
    pub close_time: String,
}

impl From<&shop::Model> for ShopSummary {
    fn from(m: &shop::Model) -> Self {
        Self {
            id: m.id,
            name: m.name.clone(),
            address: m.address.clone(),
            location: m.location.clone(),
            tel: m.tel.clone(),
            open_time: m.open_time.clone(),
            close_time: m.close_time.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ServiceSummary {
    pub id: Uuid,
    pub name: String,
    pub area: ServiceArea,
    pub duration: i32,
    pub oil: OilType,
    pub price: i32,
    pub sessions: i32,
}

impl From<&service::Model> for ServiceSummary {
    fn from(m: &service::Model) -> Self {
        Self {
            id: m.id,
            name: m.name.clone(),
            area: m.area,
            duration: m.duration,
            oil: m.oil,
            price: m.price,
            sessions: m.sessions,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub telephone: Option<String>,
}

impl From<&user::Model> for UserSummary {
    fn from(m: &user::Model) -> Self {
        Self {
            id: m.id,
            name: m.name.clone(),
            email: m.email.clone(),
            telephone: m.telephone.clone(),
        }
    }
}

/// Reservation with its references resolved.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationView {
    pub id: Uuid,
    pub resv_date: DateTimeWithTimeZone,
    pub status: ReservationStatus,
    pub created_at: DateTimeWithTimeZone,
    pub user: MaybePopulated<UserSummary>,
    pub shop: MaybePopulated<ShopSummary>,
    pub service: MaybePopulated<ServiceSummary>,
}

/// Batch-resolve the shop/service/user references of a page of reservations.
pub async fn reservation_views(
    db: &DatabaseConnection,
    rows: Vec<reservation::Model>,
) -> Result<Vec<ReservationView>, ServiceError> {
    let shop_ids: HashSet<Uuid> = rows.iter().map(|r| r.shop_id).collect();
    let service_ids: HashSet<Uuid> = rows.iter().map(|r| r.service_id).collect();
    let user_ids: HashSet<Uuid> = rows.iter().map(|r| r.user_id).collect();

    let shops: HashMap<Uuid, shop::Model> = shop::Entity::find()
        .filter(shop::Column::Id.is_in(shop_ids))
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .into_iter()
        .map(|m| (m.id, m))
        .collect();
    let services: HashMap<Uuid, service::Model> = service::Entity::find()
        .filter(service::Column::Id.is_in(service_ids))
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .into_iter()
        .map(|m| (m.id, m))
        .collect();
    let users: HashMap<Uuid, user::Model> = user::Entity::find()
        .filter(user::Column::Id.is_in(user_ids))
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .into_iter()
        .map(|m| (m.id, m))
        .collect();

    Ok(rows
        .into_iter()
        .map(|r| ReservationView {
            id: r.id,
            resv_date: r.resv_date,
            status: r.status,
            created_at: r.created_at,
            user: populate(&users, r.user_id),
            shop: populate(&shops, r.shop_id),
            service: populate(&services, r.service_id),
        })
        .collect())
}

pub async fn reservation_view(
    db: &DatabaseConnection,
    row: reservation::Model,
) -> Result<ReservationView, ServiceError> {
    let mut views = reservation_views(db, vec![row]).await?;
    // single-element batch
    Ok(views.remove(0))
}

fn populate<'a, M, T>(map: &'a HashMap<Uuid, M>, id: Uuid) -> MaybePopulated<T>
where
    T: From<&'a M> + Serialize,
{
    match map.get(&id) {
        Some(m) => MaybePopulated::Populated(T::from(m)),
        None => MaybePopulated::Id(id),
    }
}

/// Service with its owning shop embedded.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceView {
    pub id: Uuid,
    pub name: String,
    pub area: ServiceArea,
    pub duration: i32,
    pub oil: OilType,
    pub price: i32,
    pub sessions: i32,
    pub description: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub shop: MaybePopulated<ShopSummary>,
}

pub async fn service_views(
    db: &DatabaseConnection,
    rows: Vec<service::Model>,
) -> Result<Vec<ServiceView>, ServiceError> {
    let shop_ids: HashSet<Uuid> = rows.iter().map(|s| s.shop_id).collect();
    let shops: HashMap<Uuid, shop::Model> = shop::Entity::find()
        .filter(shop::Column::Id.is_in(shop_ids))
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .into_iter()
        .map(|m| (m.id, m))
        .collect();

    Ok(rows
        .into_iter()
        .map(|s| {
            let shop = populate(&shops, s.shop_id);
            ServiceView {
                id: s.id,
                name: s.name,
                area: s.area,
                duration: s.duration,
                oil: s.oil,
                price: s.price,
                sessions: s.sessions,
                description: s.description,
                created_at: s.created_at,
                shop,
            }
        })
        .collect())
}

pub async fn service_view(
    db: &DatabaseConnection,
    row: service::Model,
) -> Result<ServiceView, ServiceError> {
    let mut views = service_views(db, vec![row]).await?;
    Ok(views.remove(0))
}

/// Shop with its services listed by reverse lookup (not stored on the shop).
#[derive(Debug, Serialize)]
pub struct ShopView {
    #[serde(flatten)]
    pub shop: shop::Model,
    pub services: Vec<service::Model>,
}

pub async fn shop_view(
    db: &DatabaseConnection,
    row: shop::Model,
) -> Result<ShopView, ServiceError> {
    let services = service::Entity::find()
        .filter(service::Column::ShopId.eq(row.id))
        .order_by_desc(service::Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(ShopView { shop: row, services })
}

//! Massage-service catalog operations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use models::service::{self, OilType, ServiceArea};

use crate::errors::ServiceError;
use crate::query::{build_condition, ListParams};
use crate::shops;

fn default_sessions() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInput {
    pub name: String,
    pub area: ServiceArea,
    pub duration: i32,
    #[serde(default)]
    pub oil: OilType,
    pub price: i32,
    #[serde(default = "default_sessions")]
    pub sessions: i32,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial update; the owning shop is immutable and deliberately absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePatch {
    pub name: Option<String>,
    pub area: Option<ServiceArea>,
    pub duration: Option<i32>,
    pub oil: Option<OilType>,
    pub price: Option<i32>,
    pub sessions: Option<i32>,
    pub description: Option<String>,
}

fn column_for(field: &str) -> Option<service::Column> {
    match field {
        "id" => Some(service::Column::Id),
        "name" => Some(service::Column::Name),
        "area" => Some(service::Column::Area),
        "duration" => Some(service::Column::Duration),
        "oil" => Some(service::Column::Oil),
        "price" => Some(service::Column::Price),
        "sessions" => Some(service::Column::Sessions),
        "shop" => Some(service::Column::ShopId),
        "createdAt" => Some(service::Column::CreatedAt),
        _ => None,
    }
}

/// List services. When `shop_id` is given (nested route) the listing is
/// constrained to that shop and generic filters are ignored; sort and
/// pagination apply either way. The total is collection-wide.
pub async fn list_services(
    db: &DatabaseConnection,
    params: &ListParams,
    shop_id: Option<Uuid>,
) -> Result<(Vec<service::Model>, u64), ServiceError> {
    let cond = match shop_id {
        Some(shop_id) => Condition::all().add(service::Column::ShopId.eq(shop_id)),
        None => build_condition(&params.filters, column_for),
    };
    let mut query = service::Entity::find().filter(cond);
    for (field, order) in &params.sort {
        if let Some(col) = column_for(field) {
            query = query.order_by(col, order.clone());
        }
    }
    if params.sort.is_empty() {
        query = query.order_by_desc(service::Column::CreatedAt);
    }
    let rows = query
        .offset(params.offset())
        .limit(params.limit)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    let total = service::Entity::find()
        .count(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok((rows, total))
}

pub async fn get_service(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<service::Model>, ServiceError> {
    service::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

/// Create a service under a shop; the shop must exist.
pub async fn create_service(
    db: &DatabaseConnection,
    shop_id: Uuid,
    input: ServiceInput,
) -> Result<service::Model, ServiceError> {
    if shops::get_shop(db, shop_id).await?.is_none() {
        return Err(ServiceError::not_found_with_id("Shop", shop_id));
    }
    service::validate_name(&input.name)?;
    service::validate_duration(input.duration)?;
    service::validate_price(input.price)?;
    service::validate_sessions(input.sessions)?;

    let am = service::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name.trim().to_string()),
        area: Set(input.area),
        duration: Set(input.duration),
        oil: Set(input.oil),
        price: Set(input.price),
        sessions: Set(input.sessions),
        description: Set(input.description),
        shop_id: Set(shop_id),
        created_at: Set(Utc::now().into()),
    };
    let created = am.insert(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    info!(service_id = %created.id, shop_id = %shop_id, "created service");
    Ok(created)
}

/// Partial update with validation re-run on the merged document.
pub async fn update_service(
    db: &DatabaseConnection,
    id: Uuid,
    patch: ServicePatch,
) -> Result<service::Model, ServiceError> {
    let existing = get_service(db, id)
        .await?
        .ok_or_else(|| ServiceError::not_found_with_id("Service", id))?;

    let name = patch.name.map(|n| n.trim().to_string()).unwrap_or(existing.name);
    let duration = patch.duration.unwrap_or(existing.duration);
    let price = patch.price.unwrap_or(existing.price);
    let sessions = patch.sessions.unwrap_or(existing.sessions);
    service::validate_name(&name)?;
    service::validate_duration(duration)?;
    service::validate_price(price)?;
    service::validate_sessions(sessions)?;

    let am = service::ActiveModel {
        id: Set(id),
        name: Set(name),
        area: Set(patch.area.unwrap_or(existing.area)),
        duration: Set(duration),
        oil: Set(patch.oil.unwrap_or(existing.oil)),
        price: Set(price),
        sessions: Set(sessions),
        description: Set(patch.description.or(existing.description)),
        shop_id: Set(existing.shop_id),
        created_at: Set(existing.created_at),
    };
    let updated = am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    info!(service_id = %updated.id, "updated service");
    Ok(updated)
}

pub async fn delete_service(db: &DatabaseConnection, id: Uuid) -> Result<bool, ServiceError> {
    let res = service::Entity::delete_by_id(id)
        .exec(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    if res.rows_affected > 0 {
        info!(service_id = %id, "deleted service");
    }
    Ok(res.rows_affected > 0)
}

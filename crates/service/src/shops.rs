//! Shop catalog operations over the database connection.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use models::shop;

use crate::errors::ServiceError;
use crate::query::{build_condition, ListParams};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopInput {
    pub name: String,
    pub address: String,
    pub location: String,
    pub tel: String,
    pub map: String,
    pub open_time: String,
    pub close_time: String,
    pub price_range_min: i32,
    pub price_range_max: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub location: Option<String>,
    pub tel: Option<String>,
    pub map: Option<String>,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    pub price_range_min: Option<i32>,
    pub price_range_max: Option<i32>,
}

/// Public query-string field names -> columns. Unknown fields are dropped.
fn column_for(field: &str) -> Option<shop::Column> {
    match field {
        "id" => Some(shop::Column::Id),
        "name" => Some(shop::Column::Name),
        "address" => Some(shop::Column::Address),
        "location" => Some(shop::Column::Location),
        "tel" => Some(shop::Column::Tel),
        "map" => Some(shop::Column::Map),
        "openTime" => Some(shop::Column::OpenTime),
        "closeTime" => Some(shop::Column::CloseTime),
        "priceRangeMin" => Some(shop::Column::PriceRangeMin),
        "priceRangeMax" => Some(shop::Column::PriceRangeMax),
        _ => None,
    }
}

/// List shops with filters, sort and pagination; returns the page and the
/// collection total used for pagination links.
pub async fn list_shops(
    db: &DatabaseConnection,
    params: &ListParams,
) -> Result<(Vec<shop::Model>, u64), ServiceError> {
    let mut query =
        shop::Entity::find().filter(build_condition(&params.filters, column_for));
    for (field, order) in &params.sort {
        if let Some(col) = column_for(field) {
            query = query.order_by(col, order.clone());
        }
    }
    if params.sort.is_empty() {
        query = query.order_by_asc(shop::Column::Name);
    }
    let rows = query
        .offset(params.offset())
        .limit(params.limit)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    let total = shop::Entity::find()
        .count(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok((rows, total))
}

pub async fn get_shop(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<shop::Model>, ServiceError> {
    shop::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

pub async fn create_shop(
    db: &DatabaseConnection,
    input: ShopInput,
) -> Result<shop::Model, ServiceError> {
    let name = input.name.trim().to_string();
    shop::validate_name(&name)?;
    shop::validate_price_range(input.price_range_min, input.price_range_max)?;
    ensure_name_available(db, &name, None).await?;

    let am = shop::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        address: Set(input.address),
        location: Set(input.location),
        tel: Set(input.tel),
        map: Set(input.map),
        open_time: Set(input.open_time),
        close_time: Set(input.close_time),
        price_range_min: Set(input.price_range_min),
        price_range_max: Set(input.price_range_max),
    };
    let created = am.insert(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    info!(shop_id = %created.id, name = %created.name, "created shop");
    Ok(created)
}

/// Partial update; the merged document is re-validated before the write.
pub async fn update_shop(
    db: &DatabaseConnection,
    id: Uuid,
    patch: ShopPatch,
) -> Result<shop::Model, ServiceError> {
    let existing = get_shop(db, id)
        .await?
        .ok_or_else(|| ServiceError::not_found_with_id("Shop", id))?;

    let name = patch.name.map(|n| n.trim().to_string()).unwrap_or(existing.name);
    let min = patch.price_range_min.unwrap_or(existing.price_range_min);
    let max = patch.price_range_max.unwrap_or(existing.price_range_max);
    shop::validate_name(&name)?;
    shop::validate_price_range(min, max)?;
    ensure_name_available(db, &name, Some(id)).await?;

    let am = shop::ActiveModel {
        id: Set(id),
        name: Set(name),
        address: Set(patch.address.unwrap_or(existing.address)),
        location: Set(patch.location.unwrap_or(existing.location)),
        tel: Set(patch.tel.unwrap_or(existing.tel)),
        map: Set(patch.map.unwrap_or(existing.map)),
        open_time: Set(patch.open_time.unwrap_or(existing.open_time)),
        close_time: Set(patch.close_time.unwrap_or(existing.close_time)),
        price_range_min: Set(min),
        price_range_max: Set(max),
    };
    let updated = am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    info!(shop_id = %updated.id, "updated shop");
    Ok(updated)
}

pub async fn delete_shop(db: &DatabaseConnection, id: Uuid) -> Result<bool, ServiceError> {
    // RESTRICT FKs: deleting a shop with services or reservations surfaces a
    // store error rather than orphaning them.
    let res = shop::Entity::delete_by_id(id)
        .exec(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    if res.rows_affected > 0 {
        info!(shop_id = %id, "deleted shop");
    }
    Ok(res.rows_affected > 0)
}

async fn ensure_name_available(
    db: &DatabaseConnection,
    name: &str,
    exclude: Option<Uuid>,
) -> Result<(), ServiceError> {
    let mut query = shop::Entity::find().filter(shop::Column::Name.eq(name));
    if let Some(id) = exclude {
        query = query.filter(shop::Column::Id.ne(id));
    }
    let clash = query.one(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    if clash.is_some() {
        return Err(ServiceError::Validation(format!(
            "Shop with name '{}' already exists",
            name
        )));
    }
    Ok(())
}

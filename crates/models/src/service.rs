use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::shop;

pub const MIN_DURATION_MINUTES: i32 = 15;

/// Body area a massage service covers.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ServiceArea {
    #[sea_orm(string_value = "full body")]
    #[serde(rename = "full body")]
    FullBody,
    #[sea_orm(string_value = "back")]
    Back,
    #[sea_orm(string_value = "foot")]
    Foot,
    #[sea_orm(string_value = "head")]
    Head,
    #[sea_orm(string_value = "shoulder")]
    Shoulder,
    #[sea_orm(string_value = "face")]
    Face,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum OilType {
    #[sea_orm(string_value = "none")]
    None,
    #[sea_orm(string_value = "aromatherapy")]
    Aromatherapy,
    #[sea_orm(string_value = "herbal")]
    Herbal,
    #[sea_orm(string_value = "coconut")]
    Coconut,
    #[sea_orm(string_value = "jojoba")]
    Jojoba,
    #[sea_orm(string_value = "other")]
    Other,
}

impl Default for OilType {
    fn default() -> Self {
        OilType::None
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub area: ServiceArea,
    pub duration: i32,
    pub oil: OilType,
    pub price: i32,
    pub sessions: i32,
    pub description: Option<String>,
    #[serde(rename = "shop")]
    pub shop_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Shop,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Shop => Entity::belongs_to(shop::Entity)
                .from(Column::ShopId)
                .to(shop::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("service name required".into()));
    }
    Ok(())
}

pub fn validate_duration(minutes: i32) -> Result<(), ModelError> {
    if minutes < MIN_DURATION_MINUTES {
        return Err(ModelError::Validation("Minimum duration is 15 minutes".into()));
    }
    Ok(())
}

pub fn validate_price(price: i32) -> Result<(), ModelError> {
    if price < 0 {
        return Err(ModelError::Validation("Price cannot be negative".into()));
    }
    Ok(())
}

pub fn validate_sessions(sessions: i32) -> Result<(), ModelError> {
    if sessions < 1 {
        return Err(ModelError::Validation("Minimum 1 session".into()));
    }
    Ok(())
}

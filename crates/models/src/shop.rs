use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;

pub const MAX_NAME_LEN: usize = 100;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shop")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
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

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        panic!("no relations defined here")
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("name required".into()));
    }
    if name.trim().chars().count() > MAX_NAME_LEN {
        return Err(ModelError::Validation(
            "Name can not be more than 100 characters".into(),
        ));
    }
    Ok(())
}

pub fn validate_price_range(min: i32, max: i32) -> Result<(), ModelError> {
    if min < 0 || max < 0 {
        return Err(ModelError::Validation("price range cannot be negative".into()));
    }
    if min > max {
        return Err(ModelError::Validation(
            "minimum price range cannot exceed maximum".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_length_bound() {
        assert!(validate_name(&"x".repeat(100)).is_ok());
        assert!(validate_name(&"x".repeat(101)).is_err());
        assert!(validate_name("   ").is_err());
    }

    #[test]
    fn price_range_ordering() {
        assert!(validate_price_range(100, 500).is_ok());
        assert!(validate_price_range(500, 100).is_err());
        assert!(validate_price_range(-1, 100).is_err());
    }
}

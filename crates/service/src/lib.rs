//! Business layer providing booking operations on top of models.
//! - Separates business rules and authorization from data access.
//! - Reuses validation and entity definitions in `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod policy;
pub mod query;
pub mod reservations;
pub mod services;
pub mod shops;
pub mod views;

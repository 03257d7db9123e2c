use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    /// NotFound with the id-bearing message the API exposes.
    pub fn not_found_with_id(entity: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{} not found with id of {}", entity, id))
    }
}

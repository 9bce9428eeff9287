use crate::product::ProductStatus;
use crate::types::DbId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Product {id} is not a draft (current status: {status})")]
    NotDraft { id: DbId, status: ProductStatus },

    #[error("Network error: {0}")]
    Network(String),
}

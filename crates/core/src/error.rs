use crate::authorization::DenialReason;
use crate::lifecycle::TransitionError;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not authorized: {0}")]
    Authorization(DenialReason),

    #[error("Invalid transition: {0}")]
    InvalidTransition(TransitionError),

    #[error("Project {project_id} was modified concurrently (expected version {expected_version})")]
    ConcurrencyConflict {
        project_id: DbId,
        expected_version: i64,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        CoreError::Validation(errors.to_string())
    }
}

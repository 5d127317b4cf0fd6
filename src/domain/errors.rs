use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// The entity is absent or not owned by the caller. The two cases are
    /// deliberately indistinguishable.
    #[error("Not found")]
    NotFound,
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Forbidden")]
    Forbidden,
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

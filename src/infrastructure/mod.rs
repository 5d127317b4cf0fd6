pub mod cart_repo;
pub mod catalog_repo;
pub mod models;
pub mod order_repo;

#[cfg(test)]
mod test_support;

use diesel::result::DatabaseErrorKind;

use crate::domain::errors::DomainError;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                log::warn!("Unique constraint violated: {}", info.message());
                DomainError::Conflict("record already exists".to_string())
            }
            diesel::result::Error::DatabaseError(_, info) if is_out_of_range(info.message()) => {
                log::warn!("Value rejected by the database: {}", info.message());
                DomainError::InvalidInput("value is out of range".to_string())
            }
            other => DomainError::Internal(other.to_string()),
        }
    }
}

/// Postgres SQLSTATE 22003 (`numeric_value_out_of_range`). Diesel does not
/// expose the code, only the message.
fn is_out_of_range(message: &str) -> bool {
    message.contains("out of range") || message.contains("numeric field overflow")
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

//! Error types for pgstmt

use thiserror::Error;

/// Result type alias for pgstmt operations
pub type StmtResult<T> = Result<T, StmtError>;

/// SQLSTATE raised when a serializable transaction cannot be committed.
pub const SERIALIZATION_FAILURE: &str = "40001";

/// Error types for building and executing statements
#[derive(Debug, Error)]
pub enum StmtError {
    /// Builder state rejected at build/compile time
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serializable transaction conflict (SQLSTATE 40001), safe to retry
    #[error("Serialization failure: {0}")]
    Serialization(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[source] tokio_postgres::Error),

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl StmtError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is a serialization failure that the caller may retry
    pub fn is_serialization_failure(&self) -> bool {
        matches!(self, Self::Serialization(_))
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Parse a tokio_postgres error into a more specific StmtError
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            if let Some(mapped) = classify(db_err.code().code(), constraint, db_err.message()) {
                return mapped;
            }
        }
        Self::Query(err)
    }
}

/// `?` on a driver error classifies it the same way the clients do, so a
/// conflict raised by `Transaction::commit` is still retryable.
impl From<tokio_postgres::Error> for StmtError {
    fn from(err: tokio_postgres::Error) -> Self {
        Self::from_db_error(err)
    }
}

/// Map a SQLSTATE to the matching domain error, if it has one.
pub(crate) fn classify(code: &str, constraint: &str, message: &str) -> Option<StmtError> {
    match code {
        SERIALIZATION_FAILURE => Some(StmtError::Serialization(message.to_string())),
        "23505" => Some(StmtError::UniqueViolation(format!("{constraint}: {message}"))),
        "23503" => Some(StmtError::ForeignKeyViolation(format!(
            "{constraint}: {message}"
        ))),
        "23514" => Some(StmtError::CheckViolation(format!("{constraint}: {message}"))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization_state_maps_to_serialization_error() {
        let err = classify("40001", "unknown", "could not serialize access").unwrap();
        assert!(err.is_serialization_failure());
        assert_eq!(
            err.to_string(),
            "Serialization failure: could not serialize access"
        );
    }

    #[test]
    fn constraint_states_keep_constraint_name() {
        let err = classify("23505", "pairings_pkey", "duplicate key").unwrap();
        assert!(err.is_unique_violation());
        assert_eq!(
            err.to_string(),
            "Unique constraint violation: pairings_pkey: duplicate key"
        );
        assert!(matches!(
            classify("23503", "fk", "missing"),
            Some(StmtError::ForeignKeyViolation(_))
        ));
        assert!(matches!(
            classify("23514", "ck", "bad"),
            Some(StmtError::CheckViolation(_))
        ));
    }

    #[test]
    fn driver_errors_convert_through_classification() {
        let driver_err = "port=not-a-number"
            .parse::<tokio_postgres::Config>()
            .unwrap_err();
        let err: StmtError = driver_err.into();
        assert!(matches!(err, StmtError::Query(_)));
        assert!(!err.is_serialization_failure());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn other_states_are_not_classified() {
        assert!(classify("42P01", "unknown", "relation does not exist").is_none());
        // deadlocks are not folded into the retryable variant
        assert!(classify("40P01", "unknown", "deadlock detected").is_none());
    }
}

//! Unified error types for `SchoolDesk`.
//!
//! Lookups that find nothing are not errors: they resolve to `None` or an empty
//! collection. The variants below cover storage failures, configuration problems,
//! template handling, and rejected user input.

use thiserror::Error;

/// Every failure the crate can surface to a caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or was malformed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// The record store rejected an operation
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem or socket failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required environment variable was missing or not unicode
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// A stored JSON blob or session payload failed to decode
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A template file could not be fetched
    #[error("Failed to load template {path}: {source}")]
    TemplateLoad {
        /// Path that was requested
        path: String,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// A binding names a marker the template does not contain
    #[error("Template has no marker named `{name}`")]
    UnknownMarker {
        /// Binding key that matched nothing
        name: String,
    },

    /// Strict rendering found a marker with no binding
    #[error("No value bound for template marker `{name}`")]
    MissingBinding {
        /// Marker left without a value
        name: String,
    },

    /// Amount must be a positive, finite number
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// Amount that was rejected
        amount: f64,
    },

    /// A command referenced a student that does not exist
    #[error("Student not found: {id}")]
    StudentNotFound {
        /// Student id that was requested
        id: String,
    },

    /// User input failed a validation rule
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable reason
        message: String,
    },
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::InvalidAmount { amount: -5.0 };
        assert_eq!(err.to_string(), "Invalid amount: -5");

        let err = Error::UnknownMarker {
            name: "student.nickname".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Template has no marker named `student.nickname`"
        );
    }

    #[test]
    fn test_json_error_converts() {
        let parse: std::result::Result<Vec<String>, _> = serde_json::from_str("[1,");
        let err: Error = parse.unwrap_err().into();
        assert!(matches!(err, Error::Json(_)));
    }
}

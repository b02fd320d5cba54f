//! Error types for the inventory core
//!
//! This module defines error types using thiserror for ergonomic error handling.
//! Errors are categorized by domain (validation, routing, storage, etc.) for
//! better error handling and reporting.
//!
//! The schema contract itself never fails: supplier validation answers with a
//! `bool`. Everything here belongs to the collaborators that honor the
//! contract (storage, provider, platform bridges).

use thiserror::Error;

/// Result type alias using our InventoryError type
pub type Result<T> = std::result::Result<T, InventoryError>;

/// Main error type for the inventory core
#[derive(Error, Debug)]
pub enum InventoryError {
    // ===== Validation Errors =====

    /// Supplier code outside the closed supplier set
    #[error("Book requires valid supplier, got code {0}")]
    InvalidSupplier(i32),

    /// Numeric column that must not go below zero
    #[error("Book requires non-negative {field}, got {value}")]
    NegativeValue {
        field: &'static str,
        value: i64,
    },

    /// Required column is missing or blank
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    /// Generic input validation error
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ===== Routing Errors =====

    /// Content URI does not match any known pattern
    #[error("Unknown URI: {0}")]
    UnknownUri(String),

    // ===== Database Errors =====

    /// Database is unusable (e.g. failed integrity check)
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Database schema migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database record not found
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    // ===== File Errors =====

    /// Generic file I/O error
    #[error("File I/O error: {0}")]
    FileIoError(String),

    // ===== Internal Errors =====

    /// Internal error that should not normally occur
    #[error("Internal error: {0}")]
    InternalError(String),

    // ===== External Library Errors =====
    // Automatic conversions from external error types

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// Database driver error from sqlx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Malformed content URI
    #[error("URI parse error: {0}")]
    UrlError(#[from] url::ParseError),

    /// JNI bridge error (Android only)
    #[error("JNI error: {0}")]
    #[cfg(target_os = "android")]
    JniError(String),
}

// Helper methods for creating common errors
impl InventoryError {
    /// Create a RecordNotFound error with a resource name
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        InventoryError::RecordNotFound(resource.into())
    }

    /// Create an InvalidInput error with a message
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        InventoryError::InvalidInput(message.into())
    }

    /// Create an InternalError with a message
    pub fn internal<S: Into<String>>(message: S) -> Self {
        InventoryError::InternalError(message.into())
    }

    /// Check if error comes from rejecting a row's contents
    ///
    /// Validation errors never succeed on retry; the caller has to fix the
    /// values first.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            InventoryError::InvalidSupplier(_)
                | InventoryError::NegativeValue { .. }
                | InventoryError::MissingRequiredField(_)
                | InventoryError::InvalidInput(_)
        )
    }

    /// Check if error is related to the database
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            InventoryError::DatabaseError(_)
                | InventoryError::MigrationFailed(_)
                | InventoryError::SqlxError(_)
        )
    }

    /// Coarse category for platform callers: `validation`, `storage` or `other`
    pub fn kind(&self) -> &'static str {
        if self.is_validation_error() {
            "validation"
        } else if self.is_storage_error() {
            "storage"
        } else {
            "other"
        }
    }

    /// Get user-friendly error message suitable for display
    pub fn user_message(&self) -> String {
        match self {
            InventoryError::InvalidSupplier(_) => {
                "Please pick one of the listed suppliers.".to_string()
            }
            InventoryError::NegativeValue { field, .. } => {
                format!("The {} can't be negative.", field)
            }
            InventoryError::MissingRequiredField(field) => {
                format!("Please enter the book's {}.", field)
            }
            InventoryError::RecordNotFound(_) => {
                "That book no longer exists in the inventory.".to_string()
            }
            InventoryError::MigrationFailed(_) => {
                "The inventory database could not be upgraded. Try reinstalling the app.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        assert!(InventoryError::InvalidSupplier(5).is_validation_error());
        assert!(InventoryError::NegativeValue { field: "price", value: -1 }.is_validation_error());
        assert!(!InventoryError::UnknownUri("content://x".into()).is_validation_error());
        assert!(InventoryError::MigrationFailed("boom".into()).is_storage_error());
        assert!(InventoryError::DatabaseError("integrity check failed".into()).is_storage_error());
        assert!(!InventoryError::not_found("book 1").is_storage_error());
    }

    #[test]
    fn test_kind() {
        assert_eq!(InventoryError::InvalidSupplier(9).kind(), "validation");
        assert_eq!(InventoryError::MigrationFailed("boom".into()).kind(), "storage");
        assert_eq!(InventoryError::UnknownUri("content://x".into()).kind(), "other");
    }

    #[test]
    fn test_user_message() {
        let err = InventoryError::MissingRequiredField("name".to_string());
        assert_eq!(err.user_message(), "Please enter the book's name.");

        let err = InventoryError::UnknownUri("content://nope".to_string());
        assert_eq!(err.user_message(), "Unknown URI: content://nope");
    }
}

//! Storage error types.

use farm_core::credentials::HashError;
use farm_core::validation::ValidationError;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested entity was not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g., "egg_production", "session").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// A uniqueness rule was violated.
    #[error("{entity} with {field} {value:?} already exists")]
    Duplicate {
        entity: String,
        field: String,
        value: String,
    },

    /// A validation constraint was violated.
    #[error("validation error: {message}")]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// Feed usage asked for more than is in stock.
    #[error("insufficient {feed_type} in stock: {available} available, {requested} requested")]
    InsufficientStock {
        feed_type: String,
        available: f64,
        requested: f64,
    },

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("session expired")]
    SessionExpired,

    /// Failed to establish or maintain a database connection.
    #[error("connection error: {0}")]
    Connection(String),

    /// A transaction operation failed.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// A schema migration failed.
    #[error("migration {name} failed: {reason}")]
    Migration {
        /// Name of the migration that failed.
        name: String,
        /// Underlying error description.
        reason: String,
    },

    /// A raw SQLite query error.
    #[error("query error: {0}")]
    Query(#[from] rusqlite::Error),

    /// JSON serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Catch-all for unexpected internal errors.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience alias used throughout the storage crate.
pub type Result<T> = std::result::Result<T, StorageError>;

impl From<HashError> for StorageError {
    fn from(e: HashError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<ValidationError> for StorageError {
    fn from(e: ValidationError) -> Self {
        Self::validation(e.to_string())
    }
}

impl StorageError {
    // -- Constructors --------------------------------------------------------

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(
        entity: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::Duplicate {
            entity: entity.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    // -- Predicates ----------------------------------------------------------

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Errors caused by who is asking rather than what they asked for.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::InvalidCredentials | Self::SessionExpired)
    }

    /// Requests that conflict with the current state of stored data.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Duplicate { .. } | Self::InsufficientStock { .. })
    }
}

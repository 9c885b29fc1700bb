use thiserror::Error;

/// Error type for sqladapter operations
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("SQL format error: {0}")]
    Format(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),
}

impl DbError {
    /// The driver diagnostic (or local reason) carried by this error.
    pub fn message(&self) -> &str {
        match self {
            DbError::Connection(msg)
            | DbError::Format(msg)
            | DbError::Query(msg)
            | DbError::Transaction(msg)
            | DbError::Config(msg)
            | DbError::ColumnNotFound(msg) => msg,
        }
    }
}

/// Result type alias for sqladapter operations
pub type Result<T> = std::result::Result<T, DbError>;

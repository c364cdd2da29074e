use sea_orm::DbErr;
use thiserror::Error;

/// Errors that can occur during record-store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sea-orm.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Record not found.
    #[error("Record not found: {context}")]
    NotFound { context: String },

    /// Invalid input data.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl StoreError {
    /// Create a NotFound error for a username lookup.
    pub fn no_such_user(username: &str) -> Self {
        Self::NotFound {
            context: format!("username={}", username),
        }
    }
}

impl From<sea_orm::TransactionError<DbErr>> for StoreError {
    fn from(err: sea_orm::TransactionError<DbErr>) -> Self {
        match err {
            sea_orm::TransactionError::Connection(e) => Self::Database(e),
            sea_orm::TransactionError::Transaction(e) => Self::Database(e),
        }
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

use std::error::Error;
use std::fmt;

/// Error type for store operations
#[derive(Debug)]
pub enum DbError {
    /// Error surfaced by SeaORM
    SeaOrmError(sea_orm::DbErr),
    /// The database connection could not be established
    ConnectionError(String),
    /// A statement failed or returned an unusable row
    QueryError(String),
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbError::SeaOrmError(e) => write!(f, "Store error: {}", e),
            DbError::ConnectionError(msg) => write!(f, "Database connection failed: {}", msg),
            DbError::QueryError(msg) => write!(f, "Query failed: {}", msg),
        }
    }
}

impl Error for DbError {}

impl From<sea_orm::DbErr> for DbError {
    fn from(err: sea_orm::DbErr) -> Self {
        DbError::SeaOrmError(err)
    }
}

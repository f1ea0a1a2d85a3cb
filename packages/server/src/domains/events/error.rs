use sqlx::error::ErrorKind;
use thiserror::Error;

/// Errors raised by event persistence.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store refused the row (constraint violation, malformed value)
    #[error("Store rejected event: {0}")]
    Rejected(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl StoreError {
    pub fn is_rejection(&self) -> bool {
        matches!(self, StoreError::Rejected(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let rejection = match &err {
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation
                | ErrorKind::ForeignKeyViolation => Some(db_err.message().to_string()),
                _ => None,
            },
            _ => None,
        };

        match rejection {
            Some(message) => StoreError::Rejected(message),
            None => StoreError::Database(err),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    /// A write was rejected because other records depend on the one being changed (or the referenced record does not
    /// exist).
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("Update request contained no changes")]
    EmptyUpdate,
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db_err)
                if db_err.is_foreign_key_violation() || db_err.is_check_violation() || db_err.is_unique_violation() =>
            {
                StoreError::ConstraintViolation(db_err.message().to_string())
            },
            _ => StoreError::DatabaseError(e.to_string()),
        }
    }
}

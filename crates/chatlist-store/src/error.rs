use thiserror::Error;

/// Errors surfaced by the store.
///
/// Every fallible operation reports exactly one of these kinds; callers
/// are expected to map each kind to a distinct user-facing message.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Required input was missing or malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced identifier does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// A uniqueness rule was violated, e.g. a duplicate model name.
    #[error("unique constraint violation: {0}")]
    UniqueConstraint(String),

    /// The underlying SQLite layer failed.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl StoreError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        StoreError::Validation(msg.into())
    }

    pub(crate) fn not_found(entity: &'static str, id: i64) -> Self {
        StoreError::NotFound { entity, id }
    }

    /// Remap SQLite constraint failures so callers see the dedicated
    /// error kind instead of a generic storage error.
    pub(crate) fn constraint(err: rusqlite::Error, what: impl Into<String>) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::UniqueConstraint(what.into())
            }
            _ => StoreError::Storage(err),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

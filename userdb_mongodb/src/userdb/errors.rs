use thiserror::Error;

/// MongoDB server error code for a unique index violation.
pub(crate) const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Clone, Error, Debug)]
pub enum UserDbError {
    #[error("User not found")]
    NotFound,

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Driver and transport failures, passed through untouched.
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

impl From<uuid::Error> for UserDbError {
    fn from(err: uuid::Error) -> Self {
        UserDbError::Serialization(err.to_string())
    }
}

/// Map a driver error to `DuplicateKey` when it is a unique index violation,
/// leaving every other error as `Database`.
pub(crate) fn classify_write_error(err: mongodb::error::Error) -> UserDbError {
    use mongodb::error::{ErrorKind, WriteFailure};

    let duplicate = match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY_CODE,
        _ => false,
    };

    if duplicate {
        UserDbError::DuplicateKey(err.to_string())
    } else {
        UserDbError::Database(err)
    }
}

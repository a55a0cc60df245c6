use rusqlite::ErrorCode;
use thiserror::Error;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("requested item not found")]
    NotFound,

    #[error("user with this email already exists")]
    DuplicateEmail,

    #[error("user with this username already exists")]
    DuplicateUsername,

    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("database error: {0}")]
    Sqlite(rusqlite::Error),
}

impl From<rusqlite::Error> for RepoError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::QueryReturnedNoRows => RepoError::NotFound,
            other => unique_violation(&other).unwrap_or(RepoError::Sqlite(other)),
        }
    }
}

/// Map a UNIQUE constraint failure on the users table to its sentinel.
fn unique_violation(err: &rusqlite::Error) -> Option<RepoError> {
    let rusqlite::Error::SqliteFailure(code, Some(message)) = err else {
        return None;
    };
    if code.code != ErrorCode::ConstraintViolation || !message.starts_with("UNIQUE") {
        return None;
    }
    if message.contains("users.email") {
        Some(RepoError::DuplicateEmail)
    } else if message.contains("users.username") {
        Some(RepoError::DuplicateUsername)
    } else {
        None
    }
}

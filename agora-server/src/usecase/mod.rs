//! Business rules sitting between the HTTP handlers and the repositories.
//!
//! Services own validation, existence and ownership checks, and password
//! handling. They talk to storage only through the `*Store` traits.

mod comment;
mod interaction;
mod post;
mod user;

pub use comment::CommentService;
pub use interaction::InteractionService;
pub use post::PostService;
pub use user::{LoginOutcome, TokenIssuer, UserService};

use thiserror::Error;

use crate::db::RepoError;
use crate::validation::ValidationError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("requested item not found")]
    NotFound,

    #[error("user with this email already exists")]
    DuplicateEmail,

    #[error("user with this username already exists")]
    DuplicateUsername,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("not allowed to modify this resource")]
    Unauthorized,

    #[error("you cannot follow yourself")]
    CannotFollowSelf,

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("failed to {context}")]
    Internal {
        context: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl ServiceError {
    pub fn internal(context: &'static str, source: impl Into<anyhow::Error>) -> Self {
        ServiceError::Internal {
            context,
            source: source.into(),
        }
    }
}

/// Carry repository sentinels through unchanged and wrap everything else
/// with `context`.
pub(crate) fn from_repo(context: &'static str) -> impl Fn(RepoError) -> ServiceError {
    move |err| match err {
        RepoError::NotFound => ServiceError::NotFound,
        RepoError::DuplicateEmail => ServiceError::DuplicateEmail,
        RepoError::DuplicateUsername => ServiceError::DuplicateUsername,
        other => ServiceError::internal(context, other),
    }
}

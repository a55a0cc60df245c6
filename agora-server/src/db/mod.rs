pub mod connection;
pub mod error;
pub mod repositories;
pub mod schema;

pub use connection::{Database, DbPool};
pub use error::{RepoError, RepoResult};

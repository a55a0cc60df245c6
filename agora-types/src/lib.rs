pub mod models;
pub mod pagination;

pub use models::*;
pub use pagination::*;

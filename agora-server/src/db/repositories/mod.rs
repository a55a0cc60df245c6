//! Persistence seam: one trait per entity, one SQLite implementation each.
//!
//! Services depend on the `*Store` traits so they can be exercised against
//! any backing store; the `*Repository` structs are the SQLite adapters.

mod comment_repository;
mod follow_repository;
mod like_repository;
mod post_repository;
mod user_repository;

pub use comment_repository::CommentRepository;
pub use follow_repository::FollowRepository;
pub use like_repository::LikeRepository;
pub use post_repository::PostRepository;
pub use user_repository::UserRepository;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::Type;
use rusqlite::Row;
use uuid::Uuid;

use agora_types::{Comment, Follow, Like, Post, User};

use crate::db::RepoResult;

pub trait UserStore: Send + Sync {
    fn create(&self, user: &User) -> RepoResult<()>;
    fn get_by_id(&self, id: &Uuid) -> RepoResult<User>;
    fn get_by_email(&self, email: &str) -> RepoResult<User>;
    fn get_by_username(&self, username: &str) -> RepoResult<User>;
    /// Persist name, bio, image URL and `updated_at`.
    fn update(&self, user: &User) -> RepoResult<()>;
    /// Case-insensitive substring match on name or username, newest first.
    fn search(&self, query: &str, limit: u32, offset: u32) -> RepoResult<Vec<User>>;
}

pub trait PostStore: Send + Sync {
    fn create(&self, post: &Post) -> RepoResult<()>;
    fn get_by_id(&self, id: &Uuid) -> RepoResult<Post>;
    fn get_by_author(&self, author_id: &Uuid, limit: u32, offset: u32) -> RepoResult<Vec<Post>>;
    /// Posts by every account `user_id` follows, newest first.
    fn get_feed(&self, user_id: &Uuid, limit: u32, offset: u32) -> RepoResult<Vec<Post>>;
    /// Persist content, image URL and `updated_at`.
    fn update(&self, post: &Post) -> RepoResult<()>;
    fn delete(&self, id: &Uuid) -> RepoResult<()>;
}

pub trait CommentStore: Send + Sync {
    fn create(&self, comment: &Comment) -> RepoResult<()>;
    fn get_by_id(&self, id: &Uuid) -> RepoResult<Comment>;
    /// Comments on a post, oldest first.
    fn get_by_post(&self, post_id: &Uuid, limit: u32, offset: u32) -> RepoResult<Vec<Comment>>;
    fn delete(&self, id: &Uuid) -> RepoResult<()>;
}

pub trait LikeStore: Send + Sync {
    /// Insert the like; an existing (user, post) pair is left untouched.
    fn create(&self, like: &Like) -> RepoResult<()>;
    fn delete(&self, user_id: &Uuid, post_id: &Uuid) -> RepoResult<()>;
    fn exists(&self, user_id: &Uuid, post_id: &Uuid) -> RepoResult<bool>;
}

pub trait FollowStore: Send + Sync {
    /// Insert the edge; an existing (user, follower) pair is left untouched.
    fn create(&self, follow: &Follow) -> RepoResult<()>;
    fn delete(&self, user_id: &Uuid, follower_id: &Uuid) -> RepoResult<()>;
    fn exists(&self, user_id: &Uuid, follower_id: &Uuid) -> RepoResult<bool>;
    /// Users who follow `user_id`, most recent edge first.
    fn get_followers(&self, user_id: &Uuid, limit: u32, offset: u32) -> RepoResult<Vec<User>>;
    /// Users `follower_id` follows, most recent edge first.
    fn get_following(&self, follower_id: &Uuid, limit: u32, offset: u32)
        -> RepoResult<Vec<User>>;
}

/// Current time at the precision the store keeps.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width RFC 3339 so that text ordering matches time ordering.
pub(crate) fn encode_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn time_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    raw.parse::<DateTime<Utc>>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Column list matching [`user_from_row`]
pub(crate) const USER_COLUMNS: &str =
    "id, name, username, email, password_hash, bio, image_url, created_at, updated_at";

pub(crate) fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: uuid_at(row, 0)?,
        name: row.get(1)?,
        username: row.get(2)?,
        email: row.get(3)?,
        password: row.get(4)?,
        bio: row.get(5)?,
        image_url: row.get(6)?,
        created_at: time_at(row, 7)?,
        updated_at: time_at(row, 8)?,
    })
}

/// Column list matching [`post_from_row`]
pub(crate) const POST_COLUMNS: &str = "id, author_id, content, image_url, created_at, updated_at";

pub(crate) fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: uuid_at(row, 0)?,
        author_id: uuid_at(row, 1)?,
        content: row.get(2)?,
        image_url: row.get(3)?,
        created_at: time_at(row, 4)?,
        updated_at: time_at(row, 5)?,
    })
}

use rusqlite::params;
use uuid::Uuid;

use agora_types::{Follow, User};

use super::{encode_time, user_from_row, FollowStore};
use crate::db::{DbPool, RepoError, RepoResult};

pub struct FollowRepository {
    pool: DbPool,
}

impl FollowRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn related_users(&self, query: &str, id: &Uuid, limit: u32, offset: u32) -> RepoResult<Vec<User>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(query)?;
        let users = stmt
            .query_map(params![id.to_string(), limit, offset], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }
}

impl FollowStore for FollowRepository {
    fn create(&self, follow: &Follow) -> RepoResult<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT OR IGNORE INTO follows (user_id, follower_id, created_at) VALUES (?1, ?2, ?3)",
            params![
                follow.user_id.to_string(),
                follow.follower_id.to_string(),
                encode_time(&follow.created_at),
            ],
        )?;
        Ok(())
    }

    fn delete(&self, user_id: &Uuid, follower_id: &Uuid) -> RepoResult<()> {
        let conn = self.pool.get()?;
        let rows_affected = conn.execute(
            "DELETE FROM follows WHERE user_id = ?1 AND follower_id = ?2",
            params![user_id.to_string(), follower_id.to_string()],
        )?;
        if rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    fn exists(&self, user_id: &Uuid, follower_id: &Uuid) -> RepoResult<bool> {
        let conn = self.pool.get()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE user_id = ?1 AND follower_id = ?2)",
            params![user_id.to_string(), follower_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn get_followers(&self, user_id: &Uuid, limit: u32, offset: u32) -> RepoResult<Vec<User>> {
        self.related_users(
            "SELECT u.id, u.name, u.username, u.email, u.password_hash, u.bio, u.image_url, u.created_at, u.updated_at
             FROM users u
             INNER JOIN follows f ON u.id = f.follower_id
             WHERE f.user_id = ?1
             ORDER BY f.created_at DESC, f.rowid DESC
             LIMIT ?2 OFFSET ?3",
            user_id,
            limit,
            offset,
        )
    }

    fn get_following(&self, follower_id: &Uuid, limit: u32, offset: u32) -> RepoResult<Vec<User>> {
        self.related_users(
            "SELECT u.id, u.name, u.username, u.email, u.password_hash, u.bio, u.image_url, u.created_at, u.updated_at
             FROM users u
             INNER JOIN follows f ON u.id = f.user_id
             WHERE f.follower_id = ?1
             ORDER BY f.created_at DESC, f.rowid DESC
             LIMIT ?2 OFFSET ?3",
            follower_id,
            limit,
            offset,
        )
    }
}

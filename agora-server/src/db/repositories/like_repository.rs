use rusqlite::params;
use uuid::Uuid;

use agora_types::Like;

use super::{encode_time, LikeStore};
use crate::db::{DbPool, RepoError, RepoResult};

pub struct LikeRepository {
    pool: DbPool,
}

impl LikeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl LikeStore for LikeRepository {
    fn create(&self, like: &Like) -> RepoResult<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT OR IGNORE INTO likes (user_id, post_id, created_at) VALUES (?1, ?2, ?3)",
            params![
                like.user_id.to_string(),
                like.post_id.to_string(),
                encode_time(&like.created_at),
            ],
        )?;
        Ok(())
    }

    fn delete(&self, user_id: &Uuid, post_id: &Uuid) -> RepoResult<()> {
        let conn = self.pool.get()?;
        let rows_affected = conn.execute(
            "DELETE FROM likes WHERE user_id = ?1 AND post_id = ?2",
            params![user_id.to_string(), post_id.to_string()],
        )?;
        if rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    fn exists(&self, user_id: &Uuid, post_id: &Uuid) -> RepoResult<bool> {
        let conn = self.pool.get()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM likes WHERE user_id = ?1 AND post_id = ?2)",
            params![user_id.to_string(), post_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::{insert_post, insert_user, setup_test_db};
    use crate::db::repositories::{timestamp_now, PostRepository, PostStore, UserRepository};

    #[test]
    fn test_duplicate_like_is_absorbed() {
        let db = setup_test_db();
        let users = UserRepository::new(db.pool.clone());
        let posts = PostRepository::new(db.pool.clone());
        let repo = LikeRepository::new(db.pool.clone());
        let user = insert_user(&users, "alice");
        let post = insert_post(&posts, user.id, "like me");
        let like = Like {
            user_id: user.id,
            post_id: post.id,
            created_at: timestamp_now(),
        };

        repo.create(&like).unwrap();
        repo.create(&like).unwrap();
        assert!(repo.exists(&user.id, &post.id).unwrap());

        repo.delete(&user.id, &post.id).unwrap();
        assert!(!repo.exists(&user.id, &post.id).unwrap());
        assert!(matches!(repo.delete(&user.id, &post.id), Err(RepoError::NotFound)));
    }

    #[test]
    fn test_deleting_post_cascades_to_likes() {
        let db = setup_test_db();
        let users = UserRepository::new(db.pool.clone());
        let posts = PostRepository::new(db.pool.clone());
        let repo = LikeRepository::new(db.pool.clone());
        let user = insert_user(&users, "alice");
        let post = insert_post(&posts, user.id, "like me");
        repo.create(&Like {
            user_id: user.id,
            post_id: post.id,
            created_at: timestamp_now(),
        })
        .unwrap();

        posts.delete(&post.id).unwrap();
        assert!(!repo.exists(&user.id, &post.id).unwrap());
    }
}

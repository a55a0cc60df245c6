use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use agora_types::Post;

use super::{encode_time, post_from_row, PostStore, POST_COLUMNS};
use crate::db::{DbPool, RepoError, RepoResult};

pub struct PostRepository {
    pool: DbPool,
}

impl PostRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl PostStore for PostRepository {
    fn create(&self, post: &Post) -> RepoResult<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO posts (id, author_id, content, image_url, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                post.id.to_string(),
                post.author_id.to_string(),
                post.content,
                post.image_url,
                encode_time(&post.created_at),
                encode_time(&post.updated_at),
            ],
        )?;
        Ok(())
    }

    fn get_by_id(&self, id: &Uuid) -> RepoResult<Post> {
        let conn = self.pool.get()?;
        let query = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1");
        conn.query_row(&query, [id.to_string()], post_from_row)
            .optional()?
            .ok_or(RepoError::NotFound)
    }

    fn get_by_author(&self, author_id: &Uuid, limit: u32, offset: u32) -> RepoResult<Vec<Post>> {
        let conn = self.pool.get()?;
        let query = format!(
            "SELECT {POST_COLUMNS} FROM posts
             WHERE author_id = ?1
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2 OFFSET ?3"
        );
        let mut stmt = conn.prepare(&query)?;
        let posts = stmt
            .query_map(params![author_id.to_string(), limit, offset], post_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(posts)
    }

    fn get_feed(&self, user_id: &Uuid, limit: u32, offset: u32) -> RepoResult<Vec<Post>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT p.id, p.author_id, p.content, p.image_url, p.created_at, p.updated_at
             FROM posts p
             INNER JOIN follows f ON p.author_id = f.user_id
             WHERE f.follower_id = ?1
             ORDER BY p.created_at DESC, p.rowid DESC
             LIMIT ?2 OFFSET ?3",
        )?;
        let posts = stmt
            .query_map(params![user_id.to_string(), limit, offset], post_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(posts)
    }

    fn update(&self, post: &Post) -> RepoResult<()> {
        let conn = self.pool.get()?;
        let rows_affected = conn.execute(
            "UPDATE posts SET content = ?1, image_url = ?2, updated_at = ?3 WHERE id = ?4",
            params![
                post.content,
                post.image_url,
                encode_time(&post.updated_at),
                post.id.to_string(),
            ],
        )?;
        if rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    fn delete(&self, id: &Uuid) -> RepoResult<()> {
        let conn = self.pool.get()?;
        let rows_affected = conn.execute("DELETE FROM posts WHERE id = ?1", [id.to_string()])?;
        if rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::{insert_post, insert_user, setup_test_db};
    use crate::db::repositories::{timestamp_now, FollowRepository, FollowStore, UserRepository};
    use agora_types::Follow;

    #[test]
    fn test_create_then_fetch_round_trip() {
        let db = setup_test_db();
        let users = UserRepository::new(db.pool.clone());
        let repo = PostRepository::new(db.pool.clone());
        let author = insert_user(&users, "alice");

        let mut post = insert_post(&repo, author.id, "hello");
        assert_eq!(repo.get_by_id(&post.id).unwrap(), post);

        post.image_url = Some("https://example.com/cat.png".to_string());
        repo.update(&post).unwrap();
        assert_eq!(repo.get_by_id(&post.id).unwrap(), post);
    }

    #[test]
    fn test_posts_require_existing_author() {
        let db = setup_test_db();
        let repo = PostRepository::new(db.pool.clone());
        let now = timestamp_now();
        let orphan = Post {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            content: "nobody wrote this".to_string(),
            image_url: None,
            created_at: now,
            updated_at: now,
        };

        assert!(matches!(repo.create(&orphan), Err(RepoError::Sqlite(_))));
    }

    #[test]
    fn test_get_by_author_is_newest_first_and_paginated() {
        let db = setup_test_db();
        let users = UserRepository::new(db.pool.clone());
        let repo = PostRepository::new(db.pool.clone());
        let author = insert_user(&users, "alice");

        for i in 0..5 {
            insert_post(&repo, author.id, &format!("post {i}"));
        }

        let first_page = repo.get_by_author(&author.id, 2, 0).unwrap();
        assert_eq!(first_page.len(), 2);
        assert_eq!(first_page[0].content, "post 4");
        assert_eq!(first_page[1].content, "post 3");

        let last_page = repo.get_by_author(&author.id, 2, 4).unwrap();
        assert_eq!(last_page.len(), 1);
        assert_eq!(last_page[0].content, "post 0");

        assert!(repo.get_by_author(&author.id, 2, 10).unwrap().is_empty());
    }

    #[test]
    fn test_delete_reports_missing_post() {
        let db = setup_test_db();
        let users = UserRepository::new(db.pool.clone());
        let repo = PostRepository::new(db.pool.clone());
        let author = insert_user(&users, "alice");
        let post = insert_post(&repo, author.id, "short lived");

        repo.delete(&post.id).unwrap();
        assert!(matches!(repo.get_by_id(&post.id), Err(RepoError::NotFound)));
        assert!(matches!(repo.delete(&post.id), Err(RepoError::NotFound)));
    }

    #[test]
    fn test_feed_only_contains_followed_authors() {
        let db = setup_test_db();
        let users = UserRepository::new(db.pool.clone());
        let follows = FollowRepository::new(db.pool.clone());
        let repo = PostRepository::new(db.pool.clone());
        let reader = insert_user(&users, "reader");
        let followed = insert_user(&users, "followed");
        let stranger = insert_user(&users, "stranger");

        follows
            .create(&Follow {
                user_id: followed.id,
                follower_id: reader.id,
                created_at: timestamp_now(),
            })
            .unwrap();

        insert_post(&repo, followed.id, "older");
        insert_post(&repo, stranger.id, "not for you");
        insert_post(&repo, followed.id, "newer");
        insert_post(&repo, reader.id, "my own post");

        let feed = repo.get_feed(&reader.id, 10, 0).unwrap();
        let contents: Vec<&str> = feed.iter().map(|p| p.content.as_str()).collect();
        assert_eq!(contents, vec!["newer", "older"]);

        assert_eq!(repo.get_feed(&reader.id, 1, 1).unwrap()[0].content, "older");
        assert!(repo.get_feed(&stranger.id, 10, 0).unwrap().is_empty());
    }
}

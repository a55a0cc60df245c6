use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use agora_types::Comment;

use super::{encode_time, time_at, uuid_at, CommentStore};
use crate::db::{DbPool, RepoError, RepoResult};

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: uuid_at(row, 0)?,
        post_id: uuid_at(row, 1)?,
        author_id: uuid_at(row, 2)?,
        content: row.get(3)?,
        created_at: time_at(row, 4)?,
    })
}

pub struct CommentRepository {
    pool: DbPool,
}

impl CommentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CommentStore for CommentRepository {
    fn create(&self, comment: &Comment) -> RepoResult<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO comments (id, post_id, author_id, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                comment.id.to_string(),
                comment.post_id.to_string(),
                comment.author_id.to_string(),
                comment.content,
                encode_time(&comment.created_at),
            ],
        )?;
        Ok(())
    }

    fn get_by_id(&self, id: &Uuid) -> RepoResult<Comment> {
        let conn = self.pool.get()?;
        conn.query_row(
            "SELECT id, post_id, author_id, content, created_at FROM comments WHERE id = ?1",
            [id.to_string()],
            comment_from_row,
        )
        .optional()?
        .ok_or(RepoError::NotFound)
    }

    fn get_by_post(&self, post_id: &Uuid, limit: u32, offset: u32) -> RepoResult<Vec<Comment>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, post_id, author_id, content, created_at
             FROM comments
             WHERE post_id = ?1
             ORDER BY created_at ASC, rowid ASC
             LIMIT ?2 OFFSET ?3",
        )?;
        let comments = stmt
            .query_map(params![post_id.to_string(), limit, offset], comment_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(comments)
    }

    fn delete(&self, id: &Uuid) -> RepoResult<()> {
        let conn = self.pool.get()?;
        let rows_affected =
            conn.execute("DELETE FROM comments WHERE id = ?1", [id.to_string()])?;
        if rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use agora_types::User;

use super::{encode_time, user_from_row, UserStore, USER_COLUMNS};
use crate::db::{DbPool, RepoError, RepoResult};

pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn get_by_column(&self, column: &'static str, value: &str) -> RepoResult<User> {
        let conn = self.pool.get()?;
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1");
        conn.query_row(&query, [value], user_from_row)
            .optional()?
            .ok_or(RepoError::NotFound)
    }
}

/// Fold the query's case and escape LIKE wildcards so it matches literally.
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl UserStore for UserRepository {
    fn create(&self, user: &User) -> RepoResult<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO users (id, name, username, email, password_hash, bio, image_url, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                user.id.to_string(),
                user.name,
                user.username,
                user.email,
                user.password,
                user.bio,
                user.image_url,
                encode_time(&user.created_at),
                encode_time(&user.updated_at),
            ],
        )?;
        Ok(())
    }

    fn get_by_id(&self, id: &Uuid) -> RepoResult<User> {
        self.get_by_column("id", &id.to_string())
    }

    fn get_by_email(&self, email: &str) -> RepoResult<User> {
        self.get_by_column("email", email)
    }

    fn get_by_username(&self, username: &str) -> RepoResult<User> {
        self.get_by_column("username", username)
    }

    fn update(&self, user: &User) -> RepoResult<()> {
        let conn = self.pool.get()?;
        let rows_affected = conn.execute(
            "UPDATE users SET name = ?1, bio = ?2, image_url = ?3, updated_at = ?4 WHERE id = ?5",
            params![
                user.name,
                user.bio,
                user.image_url,
                encode_time(&user.updated_at),
                user.id.to_string(),
            ],
        )?;
        if rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    fn search(&self, query: &str, limit: u32, offset: u32) -> RepoResult<Vec<User>> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE fold(name) LIKE ?1 ESCAPE '\\' OR fold(username) LIKE ?1 ESCAPE '\\'
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2 OFFSET ?3"
        );
        let mut stmt = conn.prepare(&sql)?;
        let users = stmt
            .query_map(params![like_pattern(query), limit, offset], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }
}

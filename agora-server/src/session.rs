use crate::db::repositories::timestamp_now;
use crate::db::Database;
use crate::usecase::TokenIssuer;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rusqlite::OptionalExtension;
use uuid::Uuid;

/// Database-backed session manager for bearer-token authentication
///
/// Tokens are UUID v4 strings stored in the `sessions` table with an expiry.
/// Expired tokens are rejected and removed on sight, and swept in bulk by
/// [`SessionManager::cleanup_expired_sessions`].
#[derive(Clone)]
pub struct SessionManager {
    db: Database,
    ttl: Duration,
}

fn encode(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl SessionManager {
    pub fn new(db: Database, ttl: Duration) -> Self {
        Self { db, ttl }
    }

    /// Create a new session for a user and return its token
    pub fn create_session(&self, user_id: Uuid) -> Result<String> {
        let token = Uuid::new_v4().to_string();
        let created_at = timestamp_now();
        let expires_at = created_at
            .checked_add_signed(self.ttl)
            .context("Session expiry is out of range")?;

        let conn = self.db.connection()?;
        conn.execute(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                token,
                user_id.to_string(),
                encode(created_at),
                encode(expires_at),
            ],
        )
        .context("Failed to create session")?;

        tracing::info!(%user_id, "Created session");
        Ok(token)
    }

    /// Resolve a token to its user.
    ///
    /// Returns `Ok(None)` for unknown or expired tokens; errors are reserved
    /// for storage failures.
    pub fn validate_session(&self, token: &str) -> Result<Option<Uuid>> {
        let row: Option<(String, String)> = {
            let conn = self.db.connection()?;
            conn.query_row(
                "SELECT user_id, expires_at FROM sessions WHERE token = ?1",
                rusqlite::params![token],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .context("Failed to look up session")?
        };

        let Some((user_id, expires_at)) = row else {
            return Ok(None);
        };

        let expires_at = DateTime::parse_from_rfc3339(&expires_at)
            .context("Failed to parse expiry time")?
            .with_timezone(&Utc);

        if Utc::now() > expires_at {
            self.delete_session(token)?;
            tracing::debug!("Rejected expired session");
            return Ok(None);
        }

        let user_id = Uuid::parse_str(&user_id).context("Failed to parse user ID")?;
        Ok(Some(user_id))
    }

    /// Delete a session (logout). Unknown tokens are ignored.
    pub fn delete_session(&self, token: &str) -> Result<()> {
        let conn = self.db.connection()?;
        let rows_affected = conn
            .execute(
                "DELETE FROM sessions WHERE token = ?1",
                rusqlite::params![token],
            )
            .context("Failed to delete session")?;

        if rows_affected > 0 {
            tracing::info!("Deleted session");
        }

        Ok(())
    }

    /// Remove every session past its expiry, returning how many were removed
    pub fn cleanup_expired_sessions(&self) -> Result<usize> {
        let conn = self.db.connection()?;
        let now = encode(Utc::now());

        let rows_affected = conn
            .execute(
                "DELETE FROM sessions WHERE expires_at < ?1",
                rusqlite::params![now],
            )
            .context("Failed to cleanup expired sessions")?;

        if rows_affected > 0 {
            tracing::info!("Cleaned up {} expired sessions", rows_affected);
        }

        Ok(rows_affected)
    }
}

impl TokenIssuer for SessionManager {
    fn issue_token(&self, user_id: Uuid) -> Result<String> {
        self.create_session(user_id)
    }
}

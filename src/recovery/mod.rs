//! Short-lived credentials: password-reset tokens and email-verification
//! codes.
//!
//! Both are stored hashed-or-opaque with a 15-minute expiry and at most one
//! live row per user. Expired rows are purged by the persistence layer
//! (scheduled job); every query filters on `expires_at` so a stale row can
//! never be consumed.

use chrono::{DateTime, Duration, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error::Result;

/// Reset tokens and verification codes both die after 15 minutes.
pub const TOKEN_TTL_MINUTES: i64 = 15;

#[derive(Clone)]
pub struct RecoveryRepository {
    pool: Pool<Postgres>,
}

impl RecoveryRepository {
    /// Create a new [`RecoveryRepository`].
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Store a fresh reset-token hash for a user, deleting any prior one so
    /// at most one token is live per user.
    pub async fn replace_reset_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
    ) -> Result<DateTime<Utc>> {
        let expires_at = Utc::now() + Duration::minutes(TOKEN_TTL_MINUTES);
        let mut tx = self.pool.begin().await?;

        sqlx::query(r#"DELETE FROM reset_tokens WHERE user_id = $1"#)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"INSERT INTO reset_tokens (id, user_id, token_hash, expires_at)
                VALUES ($1, $2, $3, $4)"#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(expires_at)
    }

    /// Consume a reset token: look up a non-expired row by hash and delete
    /// it in the same statement, so a token can be used exactly once.
    pub async fn consume_reset_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<Uuid>> {
        let user_id = sqlx::query_scalar::<_, Uuid>(
            r#"DELETE FROM reset_tokens
                WHERE token_hash = $1 AND expires_at > NOW()
                RETURNING user_id"#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user_id)
    }

    /// Drop every live reset token of a user. Used as defensive cleanup on
    /// login.
    pub async fn clear_reset_tokens(&self, user_id: Uuid) -> Result<()> {
        sqlx::query(r#"DELETE FROM reset_tokens WHERE user_id = $1"#)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Store a fresh verification code for a user, deleting any prior one.
    pub async fn replace_verification_code(
        &self,
        user_id: Uuid,
        code: &str,
    ) -> Result<()> {
        let expires_at = Utc::now() + Duration::minutes(TOKEN_TTL_MINUTES);
        let mut tx = self.pool.begin().await?;

        sqlx::query(r#"DELETE FROM verification_codes WHERE user_id = $1"#)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"INSERT INTO verification_codes (id, user_id, code, expires_at)
                VALUES ($1, $2, $3, $4)"#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(code)
        .bind(expires_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }
}

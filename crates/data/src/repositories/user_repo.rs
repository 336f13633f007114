//! User repository.

use anyhow::Result;
use optiondesk_core::error::{DeskError, DeskResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::UserRecord;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, balance, role, status, trading_mode, created_at";

/// Repository for user account operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new user account.
    ///
    /// Two concurrent registrations can both pass a pre-insert uniqueness
    /// check; the loser's unique violation comes back as `Validation` so it
    /// reads the same as the check it raced past.
    ///
    /// # Errors
    /// Returns `Validation` when the username or email is already taken and
    /// an internal error for any other database failure.
    pub async fn insert(&self, record: &UserRecord) -> DeskResult<()> {
        sqlx::query(
            r"
            INSERT INTO users
                (id, username, email, password_hash, balance, role, status, trading_mode, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(record.id)
        .bind(&record.username)
        .bind(&record.email)
        .bind(&record.password_hash)
        .bind(record.balance)
        .bind(&record.role)
        .bind(&record.status)
        .bind(&record.trading_mode)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(())
    }

    /// Gets a user by ID.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<UserRecord>> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Gets a user by username.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Gets a user by email.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Lists users ordered by creation time, newest first.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UserRecord>> {
        let records = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Updates a user's trading mode.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn set_trading_mode(&self, id: Uuid, mode: &str) -> Result<u64> {
        let result = sqlx::query("UPDATE users SET trading_mode = $2 WHERE id = $1")
            .bind(id)
            .bind(mode)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Updates a user's account status.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn set_status(&self, id: Uuid, status: &str) -> Result<u64> {
        let result = sqlx::query("UPDATE users SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Updates a user's role.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn set_role(&self, id: Uuid, role: &str) -> Result<u64> {
        let result = sqlx::query("UPDATE users SET role = $2 WHERE id = $1")
            .bind(id)
            .bind(role)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Counts all users.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn count(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.0)
    }
}

fn map_insert_error(e: sqlx::Error) -> DeskError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => DeskError::Validation(format!(
            "{} already taken",
            duplicate_field(db.constraint())
        )),
        _ => DeskError::Internal(anyhow::Error::new(e).context("insert user")),
    }
}

/// Names the column behind a unique violation from its constraint name.
fn duplicate_field(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("users_email_key") => "email",
        _ => "username",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_field_by_constraint() {
        assert_eq!(duplicate_field(Some("users_email_key")), "email");
        assert_eq!(duplicate_field(Some("users_username_key")), "username");
        assert_eq!(duplicate_field(None), "username");
    }

    #[test]
    fn non_violation_insert_errors_stay_internal() {
        let err = map_insert_error(sqlx::Error::RowNotFound);
        assert_eq!(err.kind(), "internal");
    }
}

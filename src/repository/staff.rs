//! Staff accounts repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{map_unique_violation, AppError, AppResult},
    models::staff::{StaffAccount, StaffPublic},
    models::enums::{StaffRole, StaffStatus},
};

#[derive(Clone)]
pub struct StaffRepository {
    pool: Pool<Postgres>,
}

impl StaffRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get staff account by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<StaffAccount> {
        sqlx::query_as::<_, StaffAccount>("SELECT * FROM staff_accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Staff account with id {} not found", id)))
    }

    /// Get staff account by username (authentication lookup)
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<StaffAccount>> {
        let account = sqlx::query_as::<_, StaffAccount>(
            "SELECT * FROM staff_accounts WHERE LOWER(username) = LOWER($1)",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// Check if a username is already taken
    pub async fn username_exists(&self, username: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM staff_accounts WHERE LOWER(username) = LOWER($1) AND id != $2)",
            )
            .bind(username)
            .bind(id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM staff_accounts WHERE LOWER(username) = LOWER($1))",
            )
            .bind(username)
            .fetch_one(&self.pool)
            .await?
        };
        Ok(exists)
    }

    /// List all staff accounts
    pub async fn list(&self) -> AppResult<Vec<StaffPublic>> {
        let accounts = sqlx::query_as::<_, StaffPublic>(
            "SELECT id, username, full_name, email, role, status, created_at \
             FROM staff_accounts ORDER BY username",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }

    /// Create a new staff account with a pre-hashed password
    pub async fn create(
        &self,
        username: &str,
        password_hash: &str,
        full_name: &str,
        email: Option<&str>,
        role: StaffRole,
    ) -> AppResult<StaffAccount> {
        sqlx::query_as::<_, StaffAccount>(
            r#"
            INSERT INTO staff_accounts (username, password_hash, full_name, email, role, status)
            VALUES ($1, $2, $3, $4, $5, 'active')
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(full_name)
        .bind(email)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Username already exists"))
    }

    /// Update an existing account; the password hash only changes when given
    pub async fn update(
        &self,
        id: i32,
        full_name: &str,
        email: Option<&str>,
        role: StaffRole,
        status: StaffStatus,
        password_hash: Option<&str>,
    ) -> AppResult<StaffAccount> {
        sqlx::query_as::<_, StaffAccount>(
            r#"
            UPDATE staff_accounts
            SET full_name = $1, email = $2, role = $3, status = $4,
                password_hash = COALESCE($5, password_hash)
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(full_name)
        .bind(email)
        .bind(role)
        .bind(status)
        .bind(password_hash)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Email already exists"))?
        .ok_or_else(|| AppError::NotFound(format!("Staff account with id {} not found", id)))
    }

    /// Delete a staff account; blocked while loans reference it as processor
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.get_by_id(id).await?;

        let loan_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE staff_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        if loan_count > 0 {
            return Err(AppError::Conflict(
                "Staff account has processed loans and cannot be deleted".to_string(),
            ));
        }

        sqlx::query("DELETE FROM staff_accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

//! Staff account management service (admin-only operations)

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::staff::{CreateStaff, StaffClaims, StaffPublic, UpdateStaff},
    repository::Repository,
    services::auth,
};

use super::validation_messages;

#[derive(Clone)]
pub struct StaffService {
    repository: Repository,
}

impl StaffService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get staff account by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<StaffPublic> {
        let account = self.repository.staff.get_by_id(id).await?;
        Ok(account.into())
    }

    /// List all staff accounts
    pub async fn list_accounts(&self) -> AppResult<Vec<StaffPublic>> {
        self.repository.staff.list().await
    }

    /// Create a new staff account
    pub async fn create_account(&self, request: CreateStaff) -> AppResult<StaffPublic> {
        if let Err(e) = request.validate() {
            return Err(AppError::Validation(validation_messages(e)));
        }

        if self
            .repository
            .staff
            .username_exists(&request.username, None)
            .await?
        {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        let password_hash = auth::hash_password(&request.password)?;
        let created = self
            .repository
            .staff
            .create(
                &request.username,
                &password_hash,
                &request.full_name,
                request.email.as_deref(),
                request.role,
            )
            .await?;

        tracing::info!(username = %created.username, "Staff account created");
        Ok(created.into())
    }

    /// Update an existing staff account; re-hashes the password when changed
    pub async fn update_account(&self, id: i32, request: UpdateStaff) -> AppResult<StaffPublic> {
        if let Err(e) = request.validate() {
            return Err(AppError::Validation(validation_messages(e)));
        }

        let password_hash = match request.password.as_deref() {
            Some(password) => Some(auth::hash_password(password)?),
            None => None,
        };

        let updated = self
            .repository
            .staff
            .update(
                id,
                &request.full_name,
                request.email.as_deref(),
                request.role,
                request.status,
                password_hash.as_deref(),
            )
            .await?;

        Ok(updated.into())
    }

    /// Delete a staff account. Self-deletion is rejected, and accounts that
    /// have processed loans are kept for the audit trail.
    pub async fn delete_account(&self, id: i32, acting: &StaffClaims) -> AppResult<()> {
        if id == acting.staff_id {
            return Err(AppError::Conflict(
                "You cannot delete your own account".to_string(),
            ));
        }
        self.repository.staff.delete(id).await
    }
}

//! Staff account model, JWT claims and related types

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, AppResult};

use super::enums::{StaffRole, StaffStatus};

/// Staff account from database. The password hash never leaves the server.
#[derive(Debug, Clone, Deserialize, FromRow)]
pub struct StaffAccount {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub email: Option<String>,
    pub role: StaffRole,
    pub status: StaffStatus,
    pub created_at: DateTime<Utc>,
}

/// Staff account representation safe to return to clients
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StaffPublic {
    pub id: i32,
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    pub role: StaffRole,
    pub status: StaffStatus,
    pub created_at: DateTime<Utc>,
}

impl From<StaffAccount> for StaffPublic {
    fn from(account: StaffAccount) -> Self {
        Self {
            id: account.id,
            username: account.username,
            full_name: account.full_name,
            email: account.email,
            role: account.role,
            status: account.status,
            created_at: account.created_at,
        }
    }
}

/// Create staff account request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStaff {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: Option<String>,
    pub role: StaffRole,
}

/// Update staff account request; password is only changed when supplied
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStaff {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: Option<String>,
    pub role: StaffRole,
    pub status: StaffStatus,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
}

/// JWT claims carried by every authenticated request. This is the explicit
/// acting-staff context stamped onto created loans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffClaims {
    /// Username
    pub sub: String,
    pub staff_id: i32,
    pub role: StaffRole,
    pub exp: i64,
    pub iat: i64,
}

impl StaffClaims {
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let data = decode::<StaffClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }

    /// Gate for admin-only operations (staff account management,
    /// permanent loan deletion)
    pub fn require_admin(&self) -> AppResult<()> {
        if self.role == StaffRole::Admin {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Administrator role required".to_string(),
            ))
        }
    }
}

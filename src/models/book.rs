//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::BookStatus;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub publication_year: Option<i16>,
    pub isbn: Option<String>,
    pub category_id: Option<i32>,
    pub total_copies: i32,
    pub available_copies: i32,
    pub status: BookStatus,
    pub created_at: DateTime<Utc>,
}

impl Book {
    /// Copies currently out on active loans
    pub fn borrowed_copies(&self) -> i32 {
        self.total_copies - self.available_copies
    }
}

/// Book row joined with its category name for listing
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookWithCategory {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub publication_year: Option<i16>,
    pub isbn: Option<String>,
    pub category_id: Option<i32>,
    pub category_name: Option<String>,
    pub total_copies: i32,
    pub available_copies: i32,
    pub status: BookStatus,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    pub publisher: Option<String>,
    pub publication_year: Option<i16>,
    pub isbn: Option<String>,
    pub category_id: Option<i32>,
    #[validate(range(min = 1, message = "Total copies must be at least 1"))]
    pub total_copies: i32,
}

/// Update book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    pub publisher: Option<String>,
    pub publication_year: Option<i16>,
    pub isbn: Option<String>,
    pub category_id: Option<i32>,
    #[validate(range(min = 1, message = "Total copies must be at least 1"))]
    pub total_copies: i32,
    pub status: BookStatus,
}

/// Book search query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct BookQuery {
    /// Match against title, author or ISBN
    pub search: Option<String>,
    pub category_id: Option<i32>,
    pub status: Option<BookStatus>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl BookQuery {
    /// Effective page number, clamped to at least 1
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Effective page size, clamped to 1..=100
    pub fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(20).clamp(1, 100)
    }
}

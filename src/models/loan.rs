//! Loan model and related types

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::enums::LoanStatus;

/// Loan model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i32,
    /// Human-readable unique code (e.g. LN0042), distinct from the row id
    pub loan_code: String,
    pub book_id: i32,
    pub member_id: i32,
    /// The staff account that processed the loan
    pub staff_id: i32,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub fine_amount: Decimal,
    pub notes: Option<String>,
    pub status: LoanStatus,
    pub created_at: DateTime<Utc>,
}

impl Loan {
    /// Derived display state: an active loan past its due date. Never stored.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == LoanStatus::Active && self.due_date < today
    }
}

/// Loan joined with book, member and staff details for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanDetails {
    pub id: i32,
    pub loan_code: String,
    pub book_id: i32,
    pub book_title: String,
    pub book_author: String,
    pub member_id: i32,
    pub member_name: String,
    pub member_code: String,
    pub processed_by: String,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub fine_amount: Decimal,
    pub notes: Option<String>,
    pub status: LoanStatus,
    pub is_overdue: bool,
    /// Days past the due date for an active loan, zero otherwise
    pub days_overdue: i64,
    /// Advisory fine computed from the configured per-day rate; the stored
    /// amount is whatever the librarian submits on return
    pub suggested_fine: Decimal,
}

/// Create loan request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLoan {
    pub book_id: i32,
    pub member_id: i32,
    pub loan_date: NaiveDate,
    /// Defaults to loan_date plus the configured loan period when omitted
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Return loan request
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReturnLoan {
    pub return_date: NaiveDate,
    #[serde(default)]
    pub fine_amount: Decimal,
    pub notes: Option<String>,
}

/// Edit loan request; never touches availability
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLoan {
    pub due_date: NaiveDate,
    pub fine_amount: Decimal,
    pub notes: Option<String>,
}

/// Loan search query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct LoanQuery {
    /// One of active, returned, cancelled, or the derived filter "overdue"
    pub status: Option<String>,
    pub book_id: Option<i32>,
    pub member_id: Option<i32>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl LoanQuery {
    /// Effective page number, clamped to at least 1
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Effective page size, clamped to 1..=100
    pub fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(20).clamp(1, 100)
    }
}

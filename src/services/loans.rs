//! Loan lifecycle service: validation and orchestration of the loan state
//! machine over the repositories.

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::{
    config::LoansConfig,
    error::{AppError, AppResult},
    models::enums::{BookStatus, LoanStatus, MemberStatus},
    models::loan::{CreateLoan, Loan, LoanDetails, LoanQuery, ReturnLoan, UpdateLoan},
    repository::loans::{LoanDetailsRow, LoanStatusFilter},
    repository::Repository,
    services::codes,
};

/// Validate the date ordering of a new or edited loan
fn validate_due_date(loan_date: NaiveDate, due_date: NaiveDate) -> Option<String> {
    if due_date <= loan_date {
        Some("Due date must be after loan date".to_string())
    } else {
        None
    }
}

/// Validate a return request against the loan being closed
fn validate_return(loan_date: NaiveDate, request: &ReturnLoan) -> Vec<String> {
    let mut errors = Vec::new();
    if request.return_date < loan_date {
        errors.push("Return date cannot be before loan date".to_string());
    }
    if request.fine_amount < Decimal::ZERO {
        errors.push("Fine amount cannot be negative".to_string());
    }
    errors
}

/// Days an active loan is past its due date, zero for anything else
fn overdue_days(status: LoanStatus, due_date: NaiveDate, today: NaiveDate) -> i64 {
    if status == LoanStatus::Active && due_date < today {
        (today - due_date).num_days()
    } else {
        0
    }
}

/// Parse the loan status filter, accepting the derived "overdue" view
fn parse_status_filter(s: &str) -> Result<LoanStatusFilter, String> {
    if s == "overdue" {
        return Ok(LoanStatusFilter::Overdue);
    }
    s.parse::<LoanStatus>()
        .map(LoanStatusFilter::Stored)
        .map_err(|_| format!("Invalid loan status filter: {}", s))
}

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    config: LoansConfig,
}

impl LoansService {
    pub fn new(repository: Repository, config: LoansConfig) -> Self {
        Self { repository, config }
    }

    fn to_details(&self, row: LoanDetailsRow, today: NaiveDate) -> LoanDetails {
        let days_overdue = overdue_days(row.status, row.due_date, today);
        LoanDetails {
            id: row.id,
            loan_code: row.loan_code,
            book_id: row.book_id,
            book_title: row.book_title,
            book_author: row.book_author,
            member_id: row.member_id,
            member_name: row.member_name,
            member_code: row.member_code,
            processed_by: row.processed_by,
            loan_date: row.loan_date,
            due_date: row.due_date,
            return_date: row.return_date,
            fine_amount: row.fine_amount,
            notes: row.notes,
            status: row.status,
            is_overdue: days_overdue > 0,
            days_overdue,
            suggested_fine: Decimal::from(days_overdue * self.config.fine_per_day),
        }
    }

    /// Get joined loan details by ID
    pub async fn get_loan(&self, id: i32) -> AppResult<LoanDetails> {
        let row = self.repository.loans.get_details(id).await?;
        Ok(self.to_details(row, Utc::now().date_naive()))
    }

    /// Search loans, including the derived "overdue" status filter
    pub async fn search_loans(&self, query: &LoanQuery) -> AppResult<(Vec<LoanDetails>, i64)> {
        let status = match query.status.as_deref() {
            Some(s) => Some(parse_status_filter(s).map_err(AppError::validation)?),
            None => None,
        };

        let (rows, total) = self.repository.loans.search(status, query).await?;
        let today = Utc::now().date_naive();
        let details = rows.into_iter().map(|r| self.to_details(r, today)).collect();
        Ok((details, total))
    }

    /// Create a new loan on behalf of the acting staff member.
    ///
    /// Preconditions: the book exists, has a copy available and is not under
    /// maintenance; the member exists and is active; the due date falls after
    /// the loan date. Code generation, insert and the ledger decrement are
    /// one transaction in the repository.
    pub async fn create_loan(&self, staff_id: i32, loan: CreateLoan) -> AppResult<Loan> {
        let due_date = loan
            .due_date
            .unwrap_or(loan.loan_date + Duration::days(self.config.loan_period_days));

        if let Some(error) = validate_due_date(loan.loan_date, due_date) {
            return Err(AppError::Validation(vec![error]));
        }

        let book = self.repository.books.get_by_id(loan.book_id).await?;
        if book.status == BookStatus::Maintenance {
            return Err(AppError::Conflict(
                "Selected book is under maintenance".to_string(),
            ));
        }
        if book.available_copies <= 0 {
            return Err(AppError::Conflict(
                "Selected book is not available for loan".to_string(),
            ));
        }

        let member = self.repository.members.get_by_id(loan.member_id).await?;
        if member.status != MemberStatus::Active {
            return Err(AppError::Conflict(
                "Selected member is not active".to_string(),
            ));
        }

        let loan_code = codes::generate_unique(
            codes::LOAN_CODE_PREFIX,
            codes::LOAN_CODE_WIDTH,
            |code| async move { self.repository.loans.code_exists(&code).await },
        )
        .await?;

        let created = self
            .repository
            .loans
            .create(&loan_code, staff_id, &loan, due_date)
            .await?;

        tracing::info!(
            loan_code = %created.loan_code,
            book_id = created.book_id,
            member_id = created.member_id,
            "Loan created"
        );

        Ok(created)
    }

    /// Cancel an active loan, restoring one copy
    pub async fn cancel_loan(&self, id: i32) -> AppResult<Loan> {
        let cancelled = self.repository.loans.cancel(id).await?;
        tracing::info!(loan_code = %cancelled.loan_code, "Loan cancelled");
        Ok(cancelled)
    }

    /// Return an active loan, recording date, fine and notes
    pub async fn return_loan(&self, id: i32, request: ReturnLoan) -> AppResult<Loan> {
        let loan = self.repository.loans.get_by_id(id).await?;
        if loan.status != LoanStatus::Active {
            return Err(AppError::Conflict(format!(
                "Loan {} is not active (status: {})",
                loan.loan_code, loan.status
            )));
        }

        let errors = validate_return(loan.loan_date, &request);
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let returned = self.repository.loans.return_loan(id, &request).await?;
        tracing::info!(loan_code = %returned.loan_code, "Loan returned");
        Ok(returned)
    }

    /// Edit due date, fine amount and notes; availability is untouched
    pub async fn update_loan(&self, id: i32, request: UpdateLoan) -> AppResult<Loan> {
        let loan = self.repository.loans.get_by_id(id).await?;

        let mut errors = Vec::new();
        if let Some(error) = validate_due_date(loan.loan_date, request.due_date) {
            errors.push(error);
        }
        if request.fine_amount < Decimal::ZERO {
            errors.push("Fine amount cannot be negative".to_string());
        }
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        self.repository.loans.update(id, &request).await
    }

    /// Permanently delete a loan record, releasing its copy if still active.
    /// The handler requires the admin role before calling this.
    pub async fn delete_loan(&self, id: i32) -> AppResult<()> {
        self.repository.loans.delete(id).await?;
        tracing::warn!(loan_id = id, "Loan record permanently deleted");
        Ok(())
    }

    /// Count currently active loans
    pub async fn count_active(&self) -> AppResult<i64> {
        self.repository.loans.count_active().await
    }

    /// Count active loans past their due date
    pub async fn count_overdue(&self) -> AppResult<i64> {
        self.repository.loans.count_overdue().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn due_date_must_fall_strictly_after_loan_date() {
        let loan_date = date(2024, 6, 1);
        assert!(validate_due_date(loan_date, date(2024, 6, 15)).is_none());
        assert!(validate_due_date(loan_date, loan_date).is_some());
        assert!(validate_due_date(loan_date, date(2024, 5, 31)).is_some());
    }

    #[test]
    fn return_date_may_equal_loan_date_but_not_precede_it() {
        let loan_date = date(2024, 6, 1);

        let same_day = ReturnLoan {
            return_date: loan_date,
            fine_amount: Decimal::ZERO,
            notes: None,
        };
        assert!(validate_return(loan_date, &same_day).is_empty());

        let before = ReturnLoan {
            return_date: date(2024, 5, 31),
            fine_amount: Decimal::ZERO,
            notes: None,
        };
        assert_eq!(validate_return(loan_date, &before).len(), 1);
    }

    #[test]
    fn negative_fine_is_reported_alongside_bad_dates() {
        let loan_date = date(2024, 6, 1);
        let request = ReturnLoan {
            return_date: date(2024, 5, 1),
            fine_amount: Decimal::from(-5),
            notes: None,
        };
        assert_eq!(validate_return(loan_date, &request).len(), 2);
    }

    #[test]
    fn overdue_days_counts_only_active_past_due_loans() {
        let today = date(2024, 6, 20);
        assert_eq!(overdue_days(LoanStatus::Active, date(2024, 6, 15), today), 5);
        assert_eq!(overdue_days(LoanStatus::Active, today, today), 0);
        assert_eq!(overdue_days(LoanStatus::Returned, date(2024, 6, 15), today), 0);
        assert_eq!(overdue_days(LoanStatus::Cancelled, date(2024, 6, 15), today), 0);
    }

    #[test]
    fn status_filter_accepts_stored_states_and_overdue() {
        assert_eq!(
            parse_status_filter("active").unwrap(),
            LoanStatusFilter::Stored(LoanStatus::Active)
        );
        assert_eq!(
            parse_status_filter("overdue").unwrap(),
            LoanStatusFilter::Overdue
        );
        assert!(parse_status_filter("deleted").is_err());
    }
}

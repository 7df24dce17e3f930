//! Loans repository: the loan state machine and its database transactions.
//!
//! Every lifecycle step (create, cancel, return, delete) runs as a single
//! transaction together with its availability-ledger update; an error on any
//! step drops the transaction and rolls everything back.

use chrono::NaiveDate;
use sqlx::{FromRow, Pool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    models::enums::LoanStatus,
    models::loan::{CreateLoan, Loan, LoanQuery, ReturnLoan, UpdateLoan},
};

use super::books::BooksRepository;

/// Status filter for loan searches; "overdue" is a derived view over
/// active loans, not a stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanStatusFilter {
    Stored(LoanStatus),
    Overdue,
}

/// Loan row joined with book, member and staff columns
#[derive(Debug, Clone, FromRow)]
pub struct LoanDetailsRow {
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
    pub fine_amount: rust_decimal::Decimal,
    pub notes: Option<String>,
    pub status: LoanStatus,
}

const DETAILS_SELECT: &str = "SELECT l.id, l.loan_code, l.book_id, b.title AS book_title, \
     b.author AS book_author, l.member_id, m.name AS member_name, m.member_code, \
     s.username AS processed_by, l.loan_date, l.due_date, l.return_date, \
     l.fine_amount, l.notes, l.status \
     FROM loans l \
     JOIN books b ON l.book_id = b.id \
     JOIN members m ON l.member_id = m.id \
     JOIN staff_accounts s ON l.staff_id = s.id";

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Get joined loan details by ID
    pub async fn get_details(&self, id: i32) -> AppResult<LoanDetailsRow> {
        let mut qb = QueryBuilder::new(DETAILS_SELECT);
        qb.push(" WHERE l.id = ").push_bind(id);
        qb.build_query_as::<LoanDetailsRow>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    fn push_filters(
        qb: &mut QueryBuilder<'_, Postgres>,
        status: Option<LoanStatusFilter>,
        query: &LoanQuery,
    ) {
        match status {
            Some(LoanStatusFilter::Stored(s)) => {
                qb.push(" AND l.status = ").push_bind(s);
            }
            Some(LoanStatusFilter::Overdue) => {
                qb.push(" AND l.status = 'active' AND l.due_date < CURRENT_DATE");
            }
            None => {}
        }
        if let Some(book_id) = query.book_id {
            qb.push(" AND l.book_id = ").push_bind(book_id);
        }
        if let Some(member_id) = query.member_id {
            qb.push(" AND l.member_id = ").push_bind(member_id);
        }
    }

    /// Search loans with pagination
    pub async fn search(
        &self,
        status: Option<LoanStatusFilter>,
        query: &LoanQuery,
    ) -> AppResult<(Vec<LoanDetailsRow>, i64)> {
        let page = query.page();
        let per_page = query.per_page();

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM loans l WHERE 1=1");
        Self::push_filters(&mut count_qb, status, query);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::new(DETAILS_SELECT);
        qb.push(" WHERE 1=1");
        Self::push_filters(&mut qb, status, query);
        qb.push(" ORDER BY l.loan_date DESC, l.id DESC LIMIT ")
            .push_bind(per_page)
            .push(" OFFSET ")
            .push_bind((page - 1) * per_page);

        let loans = qb
            .build_query_as::<LoanDetailsRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok((loans, total))
    }

    /// Check if a loan code is already taken (used by code generation)
    pub async fn code_exists(&self, code: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM loans WHERE loan_code = $1)")
                .bind(code)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Create a loan and reserve one copy of the book, atomically. The
    /// guarded ledger update is the final word on availability: if the book
    /// ran out between validation and here, the insert rolls back with it.
    pub async fn create(
        &self,
        loan_code: &str,
        staff_id: i32,
        loan: &CreateLoan,
        due_date: NaiveDate,
    ) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (loan_code, book_id, member_id, staff_id,
                               loan_date, due_date, notes, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'active')
            RETURNING *
            "#,
        )
        .bind(loan_code)
        .bind(loan.book_id)
        .bind(loan.member_id)
        .bind(staff_id)
        .bind(loan.loan_date)
        .bind(due_date)
        .bind(&loan.notes)
        .fetch_one(&mut *tx)
        .await?;

        BooksRepository::reserve_copy(&mut tx, loan.book_id).await?;

        tx.commit().await?;
        Ok(created)
    }

    /// Cancel an active loan and release its copy, atomically
    pub async fn cancel(&self, id: i32) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let cancelled = sqlx::query_as::<_, Loan>(
            "UPDATE loans SET status = 'cancelled' WHERE id = $1 AND status = 'active' RETURNING *",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(cancelled) = cancelled else {
            return Err(self.not_active_error(id).await);
        };

        BooksRepository::release_copy(&mut tx, cancelled.book_id).await?;

        tx.commit().await?;
        Ok(cancelled)
    }

    /// Return an active loan: record the return date and fine, append the
    /// return notes, and release the copy, atomically
    pub async fn return_loan(&self, id: i32, request: &ReturnLoan) -> AppResult<Loan> {
        let return_notes = match request.notes.as_deref() {
            Some(n) if !n.is_empty() => format!("\n[Return] {}", n),
            _ => String::new(),
        };

        let mut tx = self.pool.begin().await?;

        let returned = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans
            SET status = 'returned', return_date = $1, fine_amount = $2,
                notes = NULLIF(COALESCE(notes, '') || $3, '')
            WHERE id = $4 AND status = 'active'
            RETURNING *
            "#,
        )
        .bind(request.return_date)
        .bind(request.fine_amount)
        .bind(&return_notes)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(returned) = returned else {
            return Err(self.not_active_error(id).await);
        };

        BooksRepository::release_copy(&mut tx, returned.book_id).await?;

        tx.commit().await?;
        Ok(returned)
    }

    /// Edit due date, fine and notes without touching availability
    pub async fn update(&self, id: i32, request: &UpdateLoan) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans
            SET due_date = $1, fine_amount = $2, notes = $3
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(request.due_date)
        .bind(request.fine_amount)
        .bind(&request.notes)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Permanently delete a loan record. A still-active loan gives its copy
    /// back first, in the same transaction. This destroys history and is
    /// admin-gated at the API layer.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query_as::<_, Loan>("DELETE FROM loans WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))?;

        if deleted.status == LoanStatus::Active {
            BooksRepository::release_copy(&mut tx, deleted.book_id).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Distinguish "no such loan" from "loan already closed" after a
    /// zero-row status update
    async fn not_active_error(&self, id: i32) -> AppError {
        match self.get_by_id(id).await {
            Ok(loan) => AppError::Conflict(format!(
                "Loan {} is not active (status: {})",
                loan.loan_code, loan.status
            )),
            Err(e) => e,
        }
    }

    /// Count currently active loans
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE status = 'active'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Count active loans past their due date
    pub async fn count_overdue(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE status = 'active' AND due_date < CURRENT_DATE",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

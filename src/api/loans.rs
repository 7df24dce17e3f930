//! Loan lifecycle endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::loan::{CreateLoan, Loan, LoanDetails, LoanQuery, ReturnLoan, UpdateLoan},
};

use super::{AuthenticatedStaff, PaginatedResponse};

/// Loan mutation response: the affected loan plus a status message
#[derive(Serialize, ToSchema)]
pub struct LoanResponse {
    pub message: String,
    pub loan: Loan,
}

/// List loans with status/book/member filters and pagination
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(LoanQuery),
    responses(
        (status = 200, description = "List of loans", body = PaginatedResponse<LoanDetails>),
        (status = 400, description = "Invalid status filter")
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    AuthenticatedStaff(_claims): AuthenticatedStaff,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<PaginatedResponse<LoanDetails>>> {
    let (loans, total) = state.services.loans.search_loans(&query).await?;

    Ok(Json(PaginatedResponse {
        items: loans,
        total,
        page: query.page(),
        per_page: query.per_page(),
    }))
}

/// Get loan details by ID, including overdue state and the advisory fine
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Loan details", body = LoanDetails),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn get_loan(
    State(state): State<crate::AppState>,
    AuthenticatedStaff(_claims): AuthenticatedStaff,
    Path(id): Path<i32>,
) -> AppResult<Json<LoanDetails>> {
    let loan = state.services.loans.get_loan(id).await?;
    Ok(Json(loan))
}

/// Create a new loan, stamped with the acting staff identity
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan created", body = LoanResponse),
        (status = 400, description = "Invalid dates"),
        (status = 404, description = "Book or member not found"),
        (status = 409, description = "Book unavailable or member inactive")
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    AuthenticatedStaff(claims): AuthenticatedStaff,
    Json(request): Json<CreateLoan>,
) -> AppResult<(StatusCode, Json<LoanResponse>)> {
    let loan = state
        .services
        .loans
        .create_loan(claims.staff_id, request)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(LoanResponse {
            message: format!("Loan created successfully! Loan Code: {}", loan.loan_code),
            loan,
        }),
    ))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan ID")),
    request_body = ReturnLoan,
    responses(
        (status = 200, description = "Book returned", body = LoanResponse),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Loan is not active")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    AuthenticatedStaff(_claims): AuthenticatedStaff,
    Path(id): Path<i32>,
    Json(request): Json<ReturnLoan>,
) -> AppResult<Json<LoanResponse>> {
    let loan = state.services.loans.return_loan(id, request).await?;

    Ok(Json(LoanResponse {
        message: "Book returned successfully".to_string(),
        loan,
    }))
}

/// Cancel an active loan
#[utoipa::path(
    post,
    path = "/loans/{id}/cancel",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Loan cancelled", body = LoanResponse),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Loan is not active")
    )
)]
pub async fn cancel_loan(
    State(state): State<crate::AppState>,
    AuthenticatedStaff(_claims): AuthenticatedStaff,
    Path(id): Path<i32>,
) -> AppResult<Json<LoanResponse>> {
    let loan = state.services.loans.cancel_loan(id).await?;

    Ok(Json(LoanResponse {
        message: "Loan cancelled successfully".to_string(),
        loan,
    }))
}

/// Edit a loan's due date, fine amount and notes
#[utoipa::path(
    put,
    path = "/loans/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan ID")),
    request_body = UpdateLoan,
    responses(
        (status = 200, description = "Loan updated", body = LoanResponse),
        (status = 400, description = "Invalid dates or fine"),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn update_loan(
    State(state): State<crate::AppState>,
    AuthenticatedStaff(_claims): AuthenticatedStaff,
    Path(id): Path<i32>,
    Json(request): Json<UpdateLoan>,
) -> AppResult<Json<LoanResponse>> {
    let loan = state.services.loans.update_loan(id, request).await?;

    Ok(Json(LoanResponse {
        message: "Loan updated successfully".to_string(),
        loan,
    }))
}

/// Permanently delete a loan record (admin only; destroys history)
#[utoipa::path(
    delete,
    path = "/loans/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 204, description = "Loan deleted"),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn delete_loan(
    State(state): State<crate::AppState>,
    AuthenticatedStaff(claims): AuthenticatedStaff,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.loans.delete_loan(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

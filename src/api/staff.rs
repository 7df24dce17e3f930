//! Staff account management endpoints (admin only)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::staff::{CreateStaff, StaffPublic, UpdateStaff},
};

use super::AuthenticatedStaff;

/// List all staff accounts
#[utoipa::path(
    get,
    path = "/staff",
    tag = "staff",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of staff accounts", body = Vec<StaffPublic>),
        (status = 403, description = "Administrator role required")
    )
)]
pub async fn list_staff(
    State(state): State<crate::AppState>,
    AuthenticatedStaff(claims): AuthenticatedStaff,
) -> AppResult<Json<Vec<StaffPublic>>> {
    claims.require_admin()?;

    let accounts = state.services.staff.list_accounts().await?;
    Ok(Json(accounts))
}

/// Get staff account by ID
#[utoipa::path(
    get,
    path = "/staff/{id}",
    tag = "staff",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Staff account ID")),
    responses(
        (status = 200, description = "Staff account", body = StaffPublic),
        (status = 404, description = "Staff account not found")
    )
)]
pub async fn get_staff(
    State(state): State<crate::AppState>,
    AuthenticatedStaff(claims): AuthenticatedStaff,
    Path(id): Path<i32>,
) -> AppResult<Json<StaffPublic>> {
    claims.require_admin()?;

    let account = state.services.staff.get_by_id(id).await?;
    Ok(Json(account))
}

/// Create a new staff account
#[utoipa::path(
    post,
    path = "/staff",
    tag = "staff",
    security(("bearer_auth" = [])),
    request_body = CreateStaff,
    responses(
        (status = 201, description = "Staff account created", body = StaffPublic),
        (status = 403, description = "Administrator role required"),
        (status = 409, description = "Username already exists")
    )
)]
pub async fn create_staff(
    State(state): State<crate::AppState>,
    AuthenticatedStaff(claims): AuthenticatedStaff,
    Json(request): Json<CreateStaff>,
) -> AppResult<(StatusCode, Json<StaffPublic>)> {
    claims.require_admin()?;

    let created = state.services.staff.create_account(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an existing staff account
#[utoipa::path(
    put,
    path = "/staff/{id}",
    tag = "staff",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Staff account ID")),
    request_body = UpdateStaff,
    responses(
        (status = 200, description = "Staff account updated", body = StaffPublic),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Staff account not found")
    )
)]
pub async fn update_staff(
    State(state): State<crate::AppState>,
    AuthenticatedStaff(claims): AuthenticatedStaff,
    Path(id): Path<i32>,
    Json(request): Json<UpdateStaff>,
) -> AppResult<Json<StaffPublic>> {
    claims.require_admin()?;

    let updated = state.services.staff.update_account(id, request).await?;
    Ok(Json(updated))
}

/// Delete a staff account (self-deletion is rejected)
#[utoipa::path(
    delete,
    path = "/staff/{id}",
    tag = "staff",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Staff account ID")),
    responses(
        (status = 204, description = "Staff account deleted"),
        (status = 403, description = "Administrator role required"),
        (status = 409, description = "Cannot delete own account or account with processed loans")
    )
)]
pub async fn delete_staff(
    State(state): State<crate::AppState>,
    AuthenticatedStaff(claims): AuthenticatedStaff,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.staff.delete_account(id, &claims).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! The caller's company and its console users.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::api::handlers::auth::check_credentials;
use crate::api::handlers::check_text;
use crate::api::types::{clean, clean_opt, CreateUserRequest, UpdateCompanyRequest};
use crate::auth::{AdminUser, CurrentUser};
use crate::domain::{Company, User};
use crate::error::{HrError, HrResult, Validator};
use crate::AppState;

/// Get the caller's company.
///
/// GET /v1/company
#[utoipa::path(
    get,
    path = "/v1/company",
    responses(
        (status = 200, description = "Company details", body = Company),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "company"
)]
pub async fn get_company(
    State(state): State<AppState>,
    user: CurrentUser,
) -> HrResult<Json<Company>> {
    let company = state.repository.get_company(user.company_id()).await?;
    Ok(Json(company))
}

/// Update the caller's company.
///
/// PUT /v1/company
#[utoipa::path(
    put,
    path = "/v1/company",
    request_body = UpdateCompanyRequest,
    responses(
        (status = 200, description = "Company updated", body = Company),
        (status = 403, description = "Administrator role required"),
        (status = 422, description = "Invalid fields", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "company"
)]
pub async fn update_company(
    State(state): State<AppState>,
    admin: AdminUser,
    payload: Result<Json<UpdateCompanyRequest>, JsonRejection>,
) -> HrResult<Json<Company>> {
    let Json(request) = payload?;

    let mut v = Validator::new();
    check_text(&mut v, "name", &request.name, 2);
    v.finish()?;

    let company = state
        .repository
        .update_company(
            admin.company_id(),
            &clean(&request.name),
            clean_opt(request.address.as_deref()).as_deref(),
            clean_opt(request.phone.as_deref()).as_deref(),
        )
        .await?;

    tracing::info!(company_id = %company.id, updated_by = %admin.0.sub, "Company updated");

    Ok(Json(company))
}

/// List the users of the caller's company.
///
/// GET /v1/users
#[utoipa::path(
    get,
    path = "/v1/users",
    responses(
        (status = 200, description = "Company users", body = Vec<User>),
        (status = 403, description = "Administrator role required")
    ),
    security(("bearer_auth" = [])),
    tag = "company"
)]
pub async fn list_users(
    State(state): State<AppState>,
    admin: AdminUser,
) -> HrResult<Json<Vec<User>>> {
    let users = state.repository.list_users(admin.company_id()).await?;
    Ok(Json(users))
}

/// Create a user in the caller's company.
///
/// POST /v1/users
#[utoipa::path(
    post,
    path = "/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 403, description = "Administrator role required"),
        (status = 409, description = "Email already in use"),
        (status = 422, description = "Invalid fields", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "company"
)]
pub async fn create_user(
    State(state): State<AppState>,
    admin: AdminUser,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> HrResult<(StatusCode, Json<User>)> {
    let Json(request) = payload?;

    let mut v = Validator::new();
    check_text(&mut v, "name", &request.name, 2);
    check_credentials(&mut v, &request.email, &request.password);
    v.finish()?;

    let user = User::new(
        admin.company_id(),
        request.email,
        clean(&request.name),
        &request.password,
        request.role,
    );
    state.repository.create_user(&user).await?;

    tracing::info!(
        user_id = %user.id,
        company_id = %user.company_id,
        role = %user.role,
        created_by = %admin.0.sub,
        "User created"
    );

    Ok((StatusCode::CREATED, Json(user)))
}

/// Delete a user of the caller's company.
///
/// DELETE /v1/users/{id}
#[utoipa::path(
    delete,
    path = "/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Cannot delete your own account"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "company"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
) -> HrResult<StatusCode> {
    if id == admin.0.sub {
        return Err(HrError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }

    state.repository.delete_user(admin.company_id(), id).await?;

    tracing::info!(user_id = %id, deleted_by = %admin.0.sub, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}

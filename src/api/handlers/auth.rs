//! Login, company sign-up and the current user.

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};

use crate::api::handlers::{check_rut, check_text, found};
use crate::api::types::{clean, LoginRequest, LoginResponse, RegisterRequest};
use crate::auth::CurrentUser;
use crate::domain::{looks_like_email, Company, User, UserRole};
use crate::error::{HrError, HrResult, Validator};
use crate::AppState;

/// Shortest password accepted for console users.
pub const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn check_credentials(v: &mut Validator, email: &str, password: &str) {
    v.check(looks_like_email(email.trim()), "email", "must be a valid email address");
    v.check(
        password.chars().count() >= MIN_PASSWORD_LEN,
        "password",
        "must have at least 8 characters",
    );
}

/// Login to obtain a JWT token.
///
/// POST /v1/auth/login
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> HrResult<Json<LoginResponse>> {
    let Json(request) = payload?;

    let user = state
        .repository
        .get_user_by_email(&request.email)
        .await?
        .filter(|user| user.verify_password(&request.password))
        .ok_or_else(|| {
            tracing::warn!(email = %request.email, "Failed login attempt");
            HrError::Unauthorized("Invalid email or password".to_string())
        })?;

    let token = state.jwt_manager.generate_token(&user)?;

    tracing::info!(
        user_id = %user.id,
        company_id = %user.company_id,
        role = %user.role,
        "User logged in"
    );

    Ok(Json(LoginResponse {
        token,
        user,
        expires_in: state.jwt_manager.expires_in_secs(),
    }))
}

/// Register a company together with its first administrator.
///
/// POST /v1/auth/register
#[utoipa::path(
    post,
    path = "/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Company registered", body = LoginResponse),
        (status = 409, description = "Company RUT or email already registered"),
        (status = 422, description = "Invalid fields", body = crate::error::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> HrResult<(StatusCode, Json<LoginResponse>)> {
    let Json(request) = payload?;

    let mut v = Validator::new();
    check_text(&mut v, "company_name", &request.company_name, 2);
    let rut = check_rut(&mut v, "company_rut", &request.company_rut);
    check_text(&mut v, "name", &request.name, 2);
    check_credentials(&mut v, &request.email, &request.password);
    v.finish()?;

    let rut = rut.ok_or_else(|| HrError::Internal("validated RUT missing".to_string()))?;
    let company = Company::new(clean(&request.company_name), rut.to_string());
    let admin = User::new(
        company.id,
        request.email,
        clean(&request.name),
        &request.password,
        UserRole::Admin,
    );
    state.repository.register_company(&company, &admin).await?;

    tracing::info!(
        company_id = %company.id,
        company_rut = %company.rut,
        user_id = %admin.id,
        "Company registered"
    );

    let token = state.jwt_manager.generate_token(&admin)?;
    Ok((
        StatusCode::CREATED,
        Json(LoginResponse {
            token,
            user: admin,
            expires_in: state.jwt_manager.expires_in_secs(),
        }),
    ))
}

/// Get the authenticated user.
///
/// GET /v1/auth/me
#[utoipa::path(
    get,
    path = "/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
) -> HrResult<Json<User>> {
    // A token can outlive its user.
    found(state.repository.get_user(claims.sub).await)?
        .map(Json)
        .ok_or_else(|| HrError::Unauthorized("User no longer exists".to_string()))
}

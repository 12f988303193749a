//! Departments and positions of the caller's company.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::api::handlers::{check_text, found};
use crate::api::types::{clean, DepartmentRequest, ListPositionsQuery, PositionRequest};
use crate::auth::{CurrentUser, Editor};
use crate::domain::{Department, Position};
use crate::error::{HrError, HrResult, Validator};
use crate::AppState;

// ==================== Departments ====================

/// List departments by name.
///
/// GET /v1/departments
#[utoipa::path(
    get,
    path = "/v1/departments",
    responses(
        (status = 200, description = "Departments of the company", body = Vec<Department>)
    ),
    security(("bearer_auth" = [])),
    tag = "organization"
)]
pub async fn list_departments(
    State(state): State<AppState>,
    user: CurrentUser,
) -> HrResult<Json<Vec<Department>>> {
    let departments = state.repository.list_departments(user.company_id()).await?;
    Ok(Json(departments))
}

/// Get a department.
///
/// GET /v1/departments/{id}
#[utoipa::path(
    get,
    path = "/v1/departments/{id}",
    params(("id" = Uuid, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department details", body = Department),
        (status = 404, description = "Department not found")
    ),
    security(("bearer_auth" = [])),
    tag = "organization"
)]
pub async fn get_department(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> HrResult<Json<Department>> {
    let department = state.repository.get_department(user.company_id(), id).await?;
    Ok(Json(department))
}

/// Create a department.
///
/// POST /v1/departments
#[utoipa::path(
    post,
    path = "/v1/departments",
    request_body = DepartmentRequest,
    responses(
        (status = 201, description = "Department created", body = Department),
        (status = 409, description = "Name already used in the company"),
        (status = 422, description = "Invalid fields", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "organization"
)]
pub async fn create_department(
    State(state): State<AppState>,
    editor: Editor,
    payload: Result<Json<DepartmentRequest>, JsonRejection>,
) -> HrResult<(StatusCode, Json<Department>)> {
    let Json(request) = payload?;

    let mut v = Validator::new();
    check_text(&mut v, "name", &request.name, 2);
    v.finish()?;

    let department = Department::new(editor.company_id(), clean(&request.name));
    state.repository.create_department(&department).await?;

    tracing::info!(
        department_id = %department.id,
        name = %department.name,
        created_by = %editor.0.sub,
        "Department created"
    );

    Ok((StatusCode::CREATED, Json(department)))
}

/// Rename a department.
///
/// PUT /v1/departments/{id}
#[utoipa::path(
    put,
    path = "/v1/departments/{id}",
    params(("id" = Uuid, Path, description = "Department ID")),
    request_body = DepartmentRequest,
    responses(
        (status = 200, description = "Department updated", body = Department),
        (status = 404, description = "Department not found"),
        (status = 409, description = "Name already used in the company")
    ),
    security(("bearer_auth" = [])),
    tag = "organization"
)]
pub async fn update_department(
    State(state): State<AppState>,
    editor: Editor,
    Path(id): Path<Uuid>,
    payload: Result<Json<DepartmentRequest>, JsonRejection>,
) -> HrResult<Json<Department>> {
    let Json(request) = payload?;

    let mut v = Validator::new();
    check_text(&mut v, "name", &request.name, 2);
    v.finish()?;

    let department = state
        .repository
        .update_department(editor.company_id(), id, &clean(&request.name))
        .await?;

    tracing::info!(department_id = %id, updated_by = %editor.0.sub, "Department updated");

    Ok(Json(department))
}

/// Delete a department without positions, workers or contracts.
///
/// DELETE /v1/departments/{id}
#[utoipa::path(
    delete,
    path = "/v1/departments/{id}",
    params(("id" = Uuid, Path, description = "Department ID")),
    responses(
        (status = 204, description = "Department deleted"),
        (status = 404, description = "Department not found"),
        (status = 409, description = "Department still in use")
    ),
    security(("bearer_auth" = [])),
    tag = "organization"
)]
pub async fn delete_department(
    State(state): State<AppState>,
    editor: Editor,
    Path(id): Path<Uuid>,
) -> HrResult<StatusCode> {
    state.repository.delete_department(editor.company_id(), id).await?;

    tracing::info!(department_id = %id, deleted_by = %editor.0.sub, "Department deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ==================== Positions ====================

/// Parse the mandatory `department_id` filter of the positions list.
pub(crate) fn required_department(query: &ListPositionsQuery) -> HrResult<Uuid> {
    let raw = query
        .department_id
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| HrError::BadRequest("Query parameter 'department_id' is required".to_string()))?;

    Uuid::parse_str(raw)
        .map_err(|_| HrError::BadRequest(format!("Invalid department_id: {}", raw)))
}

/// List the positions of one department by name.
///
/// GET /v1/positions?department_id=
#[utoipa::path(
    get,
    path = "/v1/positions",
    params(ListPositionsQuery),
    responses(
        (status = 200, description = "Positions of the department", body = Vec<Position>),
        (status = 400, description = "Missing or invalid department_id"),
        (status = 404, description = "Department not found")
    ),
    security(("bearer_auth" = [])),
    tag = "organization"
)]
pub async fn list_positions(
    State(state): State<AppState>,
    user: CurrentUser,
    query: Result<Query<ListPositionsQuery>, QueryRejection>,
) -> HrResult<Json<Vec<Position>>> {
    let Query(query) = query?;
    let department_id = required_department(&query)?;

    let department = state
        .repository
        .get_department(user.company_id(), department_id)
        .await?;
    let positions = state.repository.list_positions(department.id).await?;

    Ok(Json(positions))
}

/// Get a position.
///
/// GET /v1/positions/{id}
#[utoipa::path(
    get,
    path = "/v1/positions/{id}",
    params(("id" = Uuid, Path, description = "Position ID")),
    responses(
        (status = 200, description = "Position details", body = Position),
        (status = 404, description = "Position not found")
    ),
    security(("bearer_auth" = [])),
    tag = "organization"
)]
pub async fn get_position(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> HrResult<Json<Position>> {
    let position = state.repository.get_position(user.company_id(), id).await?;
    Ok(Json(position))
}

async fn check_position(
    state: &AppState,
    company_id: Uuid,
    request: &PositionRequest,
) -> HrResult<()> {
    let mut v = Validator::new();
    check_text(&mut v, "name", &request.name, 2);
    if found(state.repository.get_department(company_id, request.department_id).await)?.is_none() {
        v.push("department_id", "department does not exist");
    }
    v.finish()
}

/// Create a position inside a department.
///
/// POST /v1/positions
#[utoipa::path(
    post,
    path = "/v1/positions",
    request_body = PositionRequest,
    responses(
        (status = 201, description = "Position created", body = Position),
        (status = 409, description = "Name already used in the department"),
        (status = 422, description = "Invalid fields", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "organization"
)]
pub async fn create_position(
    State(state): State<AppState>,
    editor: Editor,
    payload: Result<Json<PositionRequest>, JsonRejection>,
) -> HrResult<(StatusCode, Json<Position>)> {
    let Json(request) = payload?;
    check_position(&state, editor.company_id(), &request).await?;

    let position = Position::new(request.department_id, clean(&request.name));
    state.repository.create_position(&position).await?;

    tracing::info!(
        position_id = %position.id,
        department_id = %position.department_id,
        created_by = %editor.0.sub,
        "Position created"
    );

    Ok((StatusCode::CREATED, Json(position)))
}

/// Rename a position, or move it to another department while nothing uses it.
///
/// PUT /v1/positions/{id}
#[utoipa::path(
    put,
    path = "/v1/positions/{id}",
    params(("id" = Uuid, Path, description = "Position ID")),
    request_body = PositionRequest,
    responses(
        (status = 200, description = "Position updated", body = Position),
        (status = 404, description = "Position not found"),
        (status = 409, description = "Position in use cannot change department"),
        (status = 422, description = "Invalid fields", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "organization"
)]
pub async fn update_position(
    State(state): State<AppState>,
    editor: Editor,
    Path(id): Path<Uuid>,
    payload: Result<Json<PositionRequest>, JsonRejection>,
) -> HrResult<Json<Position>> {
    let Json(request) = payload?;
    let company_id = editor.company_id();
    check_position(&state, company_id, &request).await?;

    let position = state
        .repository
        .update_position(company_id, id, request.department_id, &clean(&request.name))
        .await?;

    tracing::info!(position_id = %id, updated_by = %editor.0.sub, "Position updated");

    Ok(Json(position))
}

/// Delete a position no worker or contract uses.
///
/// DELETE /v1/positions/{id}
#[utoipa::path(
    delete,
    path = "/v1/positions/{id}",
    params(("id" = Uuid, Path, description = "Position ID")),
    responses(
        (status = 204, description = "Position deleted"),
        (status = 404, description = "Position not found"),
        (status = 409, description = "Position still in use")
    ),
    security(("bearer_auth" = [])),
    tag = "organization"
)]
pub async fn delete_position(
    State(state): State<AppState>,
    editor: Editor,
    Path(id): Path<Uuid>,
) -> HrResult<StatusCode> {
    state.repository.delete_position(editor.company_id(), id).await?;

    tracing::info!(position_id = %id, deleted_by = %editor.0.sub, "Position deleted");

    Ok(StatusCode::NO_CONTENT)
}

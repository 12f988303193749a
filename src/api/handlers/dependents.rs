//! Family dependents (cargas familiares).

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::api::handlers::{check_rut, check_text, found, page_request};
use crate::api::types::{clean, clean_opt, CreateDependentRequest, DependentDetails, ListDependentsQuery};
use crate::auth::{CurrentUser, Editor};
use crate::domain::{FamilyDependent, Page};
use crate::error::{HrResult, Validator};
use crate::AppState;

/// Normalized dependent data: name and canonical RUT.
pub(crate) fn check_details(
    v: &mut Validator,
    details: &DependentDetails,
    today: NaiveDate,
) -> (String, Option<String>) {
    check_text(v, "full_name", &details.full_name, 3);
    let rut = clean_opt(details.rut.as_deref())
        .and_then(|raw| check_rut(v, "rut", &raw))
        .map(|rut| rut.to_string());
    v.check(details.birth_date <= today, "birth_date", "cannot be in the future");
    (clean(&details.full_name), rut)
}

/// List dependents of the caller's company.
///
/// GET /v1/dependents
#[utoipa::path(
    get,
    path = "/v1/dependents",
    params(ListDependentsQuery),
    responses(
        (status = 200, description = "One page of dependents", body = Page<FamilyDependent>)
    ),
    security(("bearer_auth" = [])),
    tag = "dependents"
)]
pub async fn list_dependents(
    State(state): State<AppState>,
    user: CurrentUser,
    query: Result<Query<ListDependentsQuery>, QueryRejection>,
) -> HrResult<Json<Page<FamilyDependent>>> {
    let Query(query) = query?;
    let page = page_request(&state, query.page, query.limit);

    let (dependents, total) = state
        .repository
        .list_dependents(user.company_id(), query.worker_id, page)
        .await?;

    Ok(Json(Page::new(dependents, total, page)))
}

/// Get a dependent.
///
/// GET /v1/dependents/{id}
#[utoipa::path(
    get,
    path = "/v1/dependents/{id}",
    params(("id" = Uuid, Path, description = "Dependent ID")),
    responses(
        (status = 200, description = "Dependent details", body = FamilyDependent),
        (status = 404, description = "Dependent not found")
    ),
    security(("bearer_auth" = [])),
    tag = "dependents"
)]
pub async fn get_dependent(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> HrResult<Json<FamilyDependent>> {
    let dependent = state.repository.get_dependent(user.company_id(), id).await?;
    Ok(Json(dependent))
}

/// Register a dependent for a worker.
///
/// POST /v1/dependents
#[utoipa::path(
    post,
    path = "/v1/dependents",
    request_body = CreateDependentRequest,
    responses(
        (status = 201, description = "Dependent registered", body = FamilyDependent),
        (status = 422, description = "Invalid fields", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "dependents"
)]
pub async fn create_dependent(
    State(state): State<AppState>,
    editor: Editor,
    payload: Result<Json<CreateDependentRequest>, JsonRejection>,
) -> HrResult<(StatusCode, Json<FamilyDependent>)> {
    let Json(request) = payload?;
    let company_id = editor.company_id();

    let mut v = Validator::new();
    if found(state.repository.get_worker(company_id, request.worker_id).await)?.is_none() {
        v.push("worker_id", "worker does not exist");
    }
    let (full_name, rut) = check_details(&mut v, &request.details, Utc::now().date_naive());
    v.finish()?;

    let dependent = FamilyDependent::new(
        request.worker_id,
        full_name,
        rut,
        request.details.birth_date,
        request.details.relationship,
    );
    state.repository.create_dependent(&dependent).await?;

    tracing::info!(
        dependent_id = %dependent.id,
        worker_id = %dependent.worker_id,
        relationship = %dependent.relationship,
        created_by = %editor.0.sub,
        "Dependent registered"
    );

    Ok((StatusCode::CREATED, Json(dependent)))
}

/// Update a dependent.
///
/// PUT /v1/dependents/{id}
#[utoipa::path(
    put,
    path = "/v1/dependents/{id}",
    params(("id" = Uuid, Path, description = "Dependent ID")),
    request_body = DependentDetails,
    responses(
        (status = 200, description = "Dependent updated", body = FamilyDependent),
        (status = 404, description = "Dependent not found"),
        (status = 422, description = "Invalid fields", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "dependents"
)]
pub async fn update_dependent(
    State(state): State<AppState>,
    editor: Editor,
    Path(id): Path<Uuid>,
    payload: Result<Json<DependentDetails>, JsonRejection>,
) -> HrResult<Json<FamilyDependent>> {
    let Json(details) = payload?;

    let mut v = Validator::new();
    let (full_name, rut) = check_details(&mut v, &details, Utc::now().date_naive());
    v.finish()?;

    let dependent = state
        .repository
        .update_dependent(
            editor.company_id(),
            id,
            &full_name,
            rut.as_deref(),
            details.birth_date,
            details.relationship,
        )
        .await?;

    tracing::info!(dependent_id = %id, updated_by = %editor.0.sub, "Dependent updated");

    Ok(Json(dependent))
}

/// Delete a dependent.
///
/// DELETE /v1/dependents/{id}
#[utoipa::path(
    delete,
    path = "/v1/dependents/{id}",
    params(("id" = Uuid, Path, description = "Dependent ID")),
    responses(
        (status = 204, description = "Dependent deleted"),
        (status = 404, description = "Dependent not found")
    ),
    security(("bearer_auth" = [])),
    tag = "dependents"
)]
pub async fn delete_dependent(
    State(state): State<AppState>,
    editor: Editor,
    Path(id): Path<Uuid>,
) -> HrResult<StatusCode> {
    state.repository.delete_dependent(editor.company_id(), id).await?;

    tracing::info!(dependent_id = %id, deleted_by = %editor.0.sub, "Dependent deleted");

    Ok(StatusCode::NO_CONTENT)
}

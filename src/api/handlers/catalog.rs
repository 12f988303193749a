//! National reference tables: AFP, Isapre, work schedules, contract types
//! and communes. Any user reads them; only administrators change them.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::api::handlers::check_text;
use crate::api::types::{
    clean, clean_opt, CommuneRequest, ContractTypeRequest, ListCommunesQuery, NamedRequest,
    WorkScheduleRequest,
};
use crate::auth::{AdminUser, CurrentUser};
use crate::domain::{Afp, Commune, ContractType, Isapre, WorkSchedule, MAX_WEEKLY_HOURS};
use crate::error::{HrResult, Validator};
use crate::AppState;

fn check_named(request: &NamedRequest) -> HrResult<(String, Option<String>)> {
    let mut v = Validator::new();
    check_text(&mut v, "name", &request.name, 2);
    v.finish()?;
    Ok((clean(&request.name), clean_opt(request.description.as_deref())))
}

pub(crate) fn check_schedule(id: Uuid, request: &WorkScheduleRequest) -> HrResult<WorkSchedule> {
    let mut v = Validator::new();
    check_text(&mut v, "name", &request.name, 2);
    v.check(
        (1..=MAX_WEEKLY_HOURS).contains(&request.weekly_hours),
        "weekly_hours",
        "must be between 1 and 45",
    );
    v.finish()?;

    Ok(WorkSchedule {
        id,
        name: clean(&request.name),
        description: clean_opt(request.description.as_deref()),
        weekly_hours: request.weekly_hours,
    })
}

// ==================== AFP ====================

/// List AFPs.
///
/// GET /v1/afps
#[utoipa::path(
    get,
    path = "/v1/afps",
    responses((status = 200, description = "Pension funds by name", body = Vec<Afp>)),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn list_afps(State(state): State<AppState>, _user: CurrentUser) -> HrResult<Json<Vec<Afp>>> {
    Ok(Json(state.repository.list_afps().await?))
}

/// Get an AFP.
///
/// GET /v1/afps/{id}
#[utoipa::path(
    get,
    path = "/v1/afps/{id}",
    params(("id" = Uuid, Path, description = "AFP ID")),
    responses(
        (status = 200, description = "AFP details", body = Afp),
        (status = 404, description = "AFP not found")
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn get_afp(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> HrResult<Json<Afp>> {
    Ok(Json(state.repository.get_afp(id).await?))
}

/// Create an AFP.
///
/// POST /v1/afps
#[utoipa::path(
    post,
    path = "/v1/afps",
    request_body = NamedRequest,
    responses(
        (status = 201, description = "AFP created", body = Afp),
        (status = 403, description = "Administrator role required"),
        (status = 409, description = "Name already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn create_afp(
    State(state): State<AppState>,
    admin: AdminUser,
    payload: Result<Json<NamedRequest>, JsonRejection>,
) -> HrResult<(StatusCode, Json<Afp>)> {
    let Json(request) = payload?;
    let (name, description) = check_named(&request)?;

    let afp = Afp {
        id: Uuid::new_v4(),
        name,
        description,
    };
    state.repository.create_afp(&afp).await?;

    tracing::info!(afp_id = %afp.id, name = %afp.name, created_by = %admin.0.sub, "AFP created");

    Ok((StatusCode::CREATED, Json(afp)))
}

/// Update an AFP.
///
/// PUT /v1/afps/{id}
#[utoipa::path(
    put,
    path = "/v1/afps/{id}",
    params(("id" = Uuid, Path, description = "AFP ID")),
    request_body = NamedRequest,
    responses(
        (status = 200, description = "AFP updated", body = Afp),
        (status = 404, description = "AFP not found")
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn update_afp(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
    payload: Result<Json<NamedRequest>, JsonRejection>,
) -> HrResult<Json<Afp>> {
    let Json(request) = payload?;
    let (name, description) = check_named(&request)?;

    let afp = state
        .repository
        .update_afp(id, &name, description.as_deref())
        .await?;

    tracing::info!(afp_id = %id, updated_by = %admin.0.sub, "AFP updated");

    Ok(Json(afp))
}

/// Delete an AFP no contract references.
///
/// DELETE /v1/afps/{id}
#[utoipa::path(
    delete,
    path = "/v1/afps/{id}",
    params(("id" = Uuid, Path, description = "AFP ID")),
    responses(
        (status = 204, description = "AFP deleted"),
        (status = 404, description = "AFP not found"),
        (status = 409, description = "AFP referenced by contracts")
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn delete_afp(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
) -> HrResult<StatusCode> {
    state.repository.delete_afp(id).await?;
    tracing::info!(afp_id = %id, deleted_by = %admin.0.sub, "AFP deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ==================== Isapre ====================

/// List Isapres.
///
/// GET /v1/isapres
#[utoipa::path(
    get,
    path = "/v1/isapres",
    responses((status = 200, description = "Health insurers by name", body = Vec<Isapre>)),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn list_isapres(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> HrResult<Json<Vec<Isapre>>> {
    Ok(Json(state.repository.list_isapres().await?))
}

/// Get an Isapre.
///
/// GET /v1/isapres/{id}
#[utoipa::path(
    get,
    path = "/v1/isapres/{id}",
    params(("id" = Uuid, Path, description = "Isapre ID")),
    responses(
        (status = 200, description = "Isapre details", body = Isapre),
        (status = 404, description = "Isapre not found")
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn get_isapre(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> HrResult<Json<Isapre>> {
    Ok(Json(state.repository.get_isapre(id).await?))
}

/// Create an Isapre.
///
/// POST /v1/isapres
#[utoipa::path(
    post,
    path = "/v1/isapres",
    request_body = NamedRequest,
    responses(
        (status = 201, description = "Isapre created", body = Isapre),
        (status = 403, description = "Administrator role required"),
        (status = 409, description = "Name already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn create_isapre(
    State(state): State<AppState>,
    admin: AdminUser,
    payload: Result<Json<NamedRequest>, JsonRejection>,
) -> HrResult<(StatusCode, Json<Isapre>)> {
    let Json(request) = payload?;
    let (name, description) = check_named(&request)?;

    let isapre = Isapre {
        id: Uuid::new_v4(),
        name,
        description,
    };
    state.repository.create_isapre(&isapre).await?;

    tracing::info!(isapre_id = %isapre.id, name = %isapre.name, created_by = %admin.0.sub, "Isapre created");

    Ok((StatusCode::CREATED, Json(isapre)))
}

/// Update an Isapre.
///
/// PUT /v1/isapres/{id}
#[utoipa::path(
    put,
    path = "/v1/isapres/{id}",
    params(("id" = Uuid, Path, description = "Isapre ID")),
    request_body = NamedRequest,
    responses(
        (status = 200, description = "Isapre updated", body = Isapre),
        (status = 404, description = "Isapre not found")
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn update_isapre(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
    payload: Result<Json<NamedRequest>, JsonRejection>,
) -> HrResult<Json<Isapre>> {
    let Json(request) = payload?;
    let (name, description) = check_named(&request)?;

    let isapre = state
        .repository
        .update_isapre(id, &name, description.as_deref())
        .await?;

    tracing::info!(isapre_id = %id, updated_by = %admin.0.sub, "Isapre updated");

    Ok(Json(isapre))
}

/// Delete an Isapre no contract references.
///
/// DELETE /v1/isapres/{id}
#[utoipa::path(
    delete,
    path = "/v1/isapres/{id}",
    params(("id" = Uuid, Path, description = "Isapre ID")),
    responses(
        (status = 204, description = "Isapre deleted"),
        (status = 404, description = "Isapre not found"),
        (status = 409, description = "Isapre referenced by contracts")
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn delete_isapre(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
) -> HrResult<StatusCode> {
    state.repository.delete_isapre(id).await?;
    tracing::info!(isapre_id = %id, deleted_by = %admin.0.sub, "Isapre deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ==================== Work schedules ====================

/// List work schedules.
///
/// GET /v1/work-schedules
#[utoipa::path(
    get,
    path = "/v1/work-schedules",
    responses((status = 200, description = "Work schedules by name", body = Vec<WorkSchedule>)),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn list_work_schedules(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> HrResult<Json<Vec<WorkSchedule>>> {
    Ok(Json(state.repository.list_work_schedules().await?))
}

/// Get a work schedule.
///
/// GET /v1/work-schedules/{id}
#[utoipa::path(
    get,
    path = "/v1/work-schedules/{id}",
    params(("id" = Uuid, Path, description = "Work schedule ID")),
    responses(
        (status = 200, description = "Work schedule details", body = WorkSchedule),
        (status = 404, description = "Work schedule not found")
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn get_work_schedule(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> HrResult<Json<WorkSchedule>> {
    Ok(Json(state.repository.get_work_schedule(id).await?))
}

/// Create a work schedule.
///
/// POST /v1/work-schedules
#[utoipa::path(
    post,
    path = "/v1/work-schedules",
    request_body = WorkScheduleRequest,
    responses(
        (status = 201, description = "Work schedule created", body = WorkSchedule),
        (status = 422, description = "Invalid fields", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn create_work_schedule(
    State(state): State<AppState>,
    admin: AdminUser,
    payload: Result<Json<WorkScheduleRequest>, JsonRejection>,
) -> HrResult<(StatusCode, Json<WorkSchedule>)> {
    let Json(request) = payload?;
    let schedule = check_schedule(Uuid::new_v4(), &request)?;
    state.repository.create_work_schedule(&schedule).await?;

    tracing::info!(
        schedule_id = %schedule.id,
        weekly_hours = schedule.weekly_hours,
        created_by = %admin.0.sub,
        "Work schedule created"
    );

    Ok((StatusCode::CREATED, Json(schedule)))
}

/// Update a work schedule.
///
/// PUT /v1/work-schedules/{id}
#[utoipa::path(
    put,
    path = "/v1/work-schedules/{id}",
    params(("id" = Uuid, Path, description = "Work schedule ID")),
    request_body = WorkScheduleRequest,
    responses(
        (status = 200, description = "Work schedule updated", body = WorkSchedule),
        (status = 404, description = "Work schedule not found"),
        (status = 422, description = "Invalid fields", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn update_work_schedule(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
    payload: Result<Json<WorkScheduleRequest>, JsonRejection>,
) -> HrResult<Json<WorkSchedule>> {
    let Json(request) = payload?;
    let schedule = check_schedule(id, &request)?;
    let schedule = state.repository.update_work_schedule(&schedule).await?;

    tracing::info!(schedule_id = %id, updated_by = %admin.0.sub, "Work schedule updated");

    Ok(Json(schedule))
}

/// Delete a work schedule no contract references.
///
/// DELETE /v1/work-schedules/{id}
#[utoipa::path(
    delete,
    path = "/v1/work-schedules/{id}",
    params(("id" = Uuid, Path, description = "Work schedule ID")),
    responses(
        (status = 204, description = "Work schedule deleted"),
        (status = 404, description = "Work schedule not found"),
        (status = 409, description = "Work schedule referenced by contracts")
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn delete_work_schedule(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
) -> HrResult<StatusCode> {
    state.repository.delete_work_schedule(id).await?;
    tracing::info!(schedule_id = %id, deleted_by = %admin.0.sub, "Work schedule deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ==================== Contract types ====================

/// List contract types.
///
/// GET /v1/contract-types
#[utoipa::path(
    get,
    path = "/v1/contract-types",
    responses((status = 200, description = "Contract types by name", body = Vec<ContractType>)),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn list_contract_types(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> HrResult<Json<Vec<ContractType>>> {
    Ok(Json(state.repository.list_contract_types().await?))
}

/// Get a contract type.
///
/// GET /v1/contract-types/{id}
#[utoipa::path(
    get,
    path = "/v1/contract-types/{id}",
    params(("id" = Uuid, Path, description = "Contract type ID")),
    responses(
        (status = 200, description = "Contract type details", body = ContractType),
        (status = 404, description = "Contract type not found")
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn get_contract_type(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> HrResult<Json<ContractType>> {
    Ok(Json(state.repository.get_contract_type(id).await?))
}

/// Create a contract type.
///
/// POST /v1/contract-types
#[utoipa::path(
    post,
    path = "/v1/contract-types",
    request_body = ContractTypeRequest,
    responses(
        (status = 201, description = "Contract type created", body = ContractType),
        (status = 409, description = "Name already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn create_contract_type(
    State(state): State<AppState>,
    admin: AdminUser,
    payload: Result<Json<ContractTypeRequest>, JsonRejection>,
) -> HrResult<(StatusCode, Json<ContractType>)> {
    let Json(request) = payload?;

    let mut v = Validator::new();
    check_text(&mut v, "name", &request.name, 2);
    v.finish()?;

    let contract_type = ContractType {
        id: Uuid::new_v4(),
        name: clean(&request.name),
        indefinite: request.indefinite,
    };
    state.repository.create_contract_type(&contract_type).await?;

    tracing::info!(
        contract_type_id = %contract_type.id,
        indefinite = contract_type.indefinite,
        created_by = %admin.0.sub,
        "Contract type created"
    );

    Ok((StatusCode::CREATED, Json(contract_type)))
}

// ==================== Communes ====================

/// List communes, optionally of one city.
///
/// GET /v1/communes
#[utoipa::path(
    get,
    path = "/v1/communes",
    params(ListCommunesQuery),
    responses((status = 200, description = "Communes by name", body = Vec<Commune>)),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn list_communes(
    State(state): State<AppState>,
    _user: CurrentUser,
    query: Result<Query<ListCommunesQuery>, QueryRejection>,
) -> HrResult<Json<Vec<Commune>>> {
    let Query(query) = query?;
    let city = query.city.as_deref().map(str::trim).filter(|c| !c.is_empty());
    Ok(Json(state.repository.list_communes(city).await?))
}

/// Create a commune.
///
/// POST /v1/communes
#[utoipa::path(
    post,
    path = "/v1/communes",
    request_body = CommuneRequest,
    responses(
        (status = 201, description = "Commune created", body = Commune),
        (status = 409, description = "Commune already exists in the city")
    ),
    security(("bearer_auth" = [])),
    tag = "catalog"
)]
pub async fn create_commune(
    State(state): State<AppState>,
    admin: AdminUser,
    payload: Result<Json<CommuneRequest>, JsonRejection>,
) -> HrResult<(StatusCode, Json<Commune>)> {
    let Json(request) = payload?;

    let mut v = Validator::new();
    check_text(&mut v, "name", &request.name, 2);
    check_text(&mut v, "city", &request.city, 2);
    v.finish()?;

    let commune = Commune {
        id: Uuid::new_v4(),
        name: clean(&request.name),
        city: clean(&request.city),
    };
    state.repository.create_commune(&commune).await?;

    tracing::info!(commune_id = %commune.id, city = %commune.city, created_by = %admin.0.sub, "Commune created");

    Ok((StatusCode::CREATED, Json(commune)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_hours_bounds() {
        let request = |hours| WorkScheduleRequest {
            name: "Turno".to_string(),
            description: Some("  ".to_string()),
            weekly_hours: hours,
        };

        let ok = check_schedule(Uuid::new_v4(), &request(45)).unwrap();
        assert_eq!(ok.weekly_hours, 45);
        assert!(ok.description.is_none());

        assert!(check_schedule(Uuid::new_v4(), &request(0)).is_err());
        assert!(check_schedule(Uuid::new_v4(), &request(46)).is_err());
    }
}

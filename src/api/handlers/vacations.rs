//! Vacation leave and balances of a worker.

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

use crate::api::types::{clean_opt, BalanceQuery, VacationRequest};
use crate::auth::{CurrentUser, Editor};
use crate::domain::{Contract, VacationBalance, VacationLeave};
use crate::error::{HrError, HrResult, Validator};
use crate::AppState;

/// Check a leave request: dates in order and days within the span.
pub(crate) fn check_leave(v: &mut Validator, request: &VacationRequest) {
    if request.end_date < request.start_date {
        v.push("end_date", "cannot be before start_date");
    }
    if request.days <= 0 {
        v.push("days", "must be greater than zero");
    } else if request.end_date >= request.start_date {
        let span = (request.end_date - request.start_date).num_days() + 1;
        v.check(request.days <= span, "days", "cannot exceed the days between start_date and end_date");
    }
}

/// Contract that anchors the accrual: the one in force on `as_of`, else
/// the most recent. `contracts` is expected newest first.
pub(crate) fn anchor_contract(contracts: &[Contract], as_of: NaiveDate) -> Option<&Contract> {
    contracts
        .iter()
        .find(|c| c.is_in_force(as_of))
        .or_else(|| contracts.first())
}

/// List a worker's vacation leave.
///
/// GET /v1/workers/{id}/vacations
#[utoipa::path(
    get,
    path = "/v1/workers/{id}/vacations",
    params(("id" = Uuid, Path, description = "Worker ID")),
    responses(
        (status = 200, description = "Leave taken, most recent first", body = Vec<VacationLeave>),
        (status = 404, description = "Worker not found")
    ),
    security(("bearer_auth" = [])),
    tag = "vacations"
)]
pub async fn list_vacations(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> HrResult<Json<Vec<VacationLeave>>> {
    let worker = state.repository.get_worker(user.company_id(), id).await?;
    let leaves = state.repository.list_vacation_leaves(worker.id).await?;
    Ok(Json(leaves))
}

/// Record vacation days taken by a worker.
///
/// POST /v1/workers/{id}/vacations
#[utoipa::path(
    post,
    path = "/v1/workers/{id}/vacations",
    params(("id" = Uuid, Path, description = "Worker ID")),
    request_body = VacationRequest,
    responses(
        (status = 201, description = "Leave recorded", body = VacationLeave),
        (status = 404, description = "Worker not found"),
        (status = 422, description = "Invalid fields", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "vacations"
)]
pub async fn create_vacation(
    State(state): State<AppState>,
    editor: Editor,
    Path(id): Path<Uuid>,
    payload: Result<Json<VacationRequest>, JsonRejection>,
) -> HrResult<(StatusCode, Json<VacationLeave>)> {
    let Json(request) = payload?;
    let worker = state.repository.get_worker(editor.company_id(), id).await?;

    let mut v = Validator::new();
    check_leave(&mut v, &request);
    v.finish()?;

    let leave = VacationLeave::new(
        worker.id,
        request.start_date,
        request.end_date,
        request.days,
        clean_opt(request.notes.as_deref()),
    );
    state.repository.create_vacation_leave(&leave).await?;

    tracing::info!(
        leave_id = %leave.id,
        worker_id = %worker.id,
        days = leave.days,
        created_by = %editor.0.sub,
        "Vacation leave recorded"
    );

    Ok((StatusCode::CREATED, Json(leave)))
}

/// Vacation balance of a worker on a date (today by default).
///
/// GET /v1/workers/{id}/vacations/balance
#[utoipa::path(
    get,
    path = "/v1/workers/{id}/vacations/balance",
    params(("id" = Uuid, Path, description = "Worker ID"), BalanceQuery),
    responses(
        (status = 200, description = "Accrued, consumed and remaining days", body = VacationBalance),
        (status = 404, description = "Worker not found or without contract")
    ),
    security(("bearer_auth" = [])),
    tag = "vacations"
)]
pub async fn vacation_balance(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    query: Result<Query<BalanceQuery>, QueryRejection>,
) -> HrResult<Json<VacationBalance>> {
    let Query(query) = query?;
    let as_of = query.as_of.unwrap_or_else(|| Utc::now().date_naive());

    let worker = state.repository.get_worker(user.company_id(), id).await?;
    let contracts = state.repository.worker_contracts(worker.id).await?;
    let contract = anchor_contract(&contracts, as_of)
        .ok_or_else(|| HrError::NotFound(format!("Worker {} has no contract", worker.id)))?;

    let consumed = state
        .repository
        .consumed_vacation_days(worker.id, contract.start_date)
        .await?;

    Ok(Json(VacationBalance::compute(
        worker.id,
        contract.start_date,
        as_of,
        consumed,
    )))
}

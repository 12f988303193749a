//! Employment contracts.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::api::handlers::{check_placement, found, page_request};
use crate::api::types::{clean_opt, ContractRequest, ListContractsQuery};
use crate::auth::{CurrentUser, Editor};
use crate::domain::{Contract, ContractTerms, ContractType, Page};
use crate::error::{FieldError, HrError, HrResult, Validator};
use crate::storage::HrRepository;
use crate::AppState;

/// Rules that only depend on the request and the contract type.
pub(crate) fn contract_terms(
    v: &mut Validator,
    request: &ContractRequest,
    contract_type: Option<&ContractType>,
) -> ContractTerms {
    for component in request.remuneration.negative_components() {
        v.push(component, "cannot be negative");
    }

    match (request.gratification_kind.requires_amount(), request.gratification_amount) {
        (true, Some(amount)) if amount > 0 => {}
        (true, _) => {
            v.push("gratification_amount", "is required for a fixed gratification");
        }
        (false, Some(_)) => {
            v.push("gratification_amount", "only applies to a fixed gratification");
        }
        (false, None) => {}
    }

    let end_date = match (request.end_date, request.duration) {
        (Some(_), Some(_)) => {
            v.push("duration", "send either end_date or duration, not both");
            None
        }
        (Some(end), None) => Some(end),
        (None, Some(duration)) => {
            let end = duration.end_date(request.start_date);
            if end.is_none() {
                v.push("duration", "must be a positive length");
            }
            end
        }
        (None, None) => None,
    };

    if let Some(end) = end_date {
        v.check(end >= request.start_date, "end_date", "cannot be before start_date");
        if contract_type.is_some_and(|t| t.indefinite) {
            v.push("end_date", "an indefinite contract has no end date");
        }
    }

    ContractTerms {
        contract_type_id: request.contract_type_id,
        start_date: request.start_date,
        end_date,
        work_schedule_id: request.work_schedule_id,
        department_id: request.department_id,
        position_id: request.position_id,
        job_description: clean_opt(request.job_description.as_deref()),
        remuneration: request.remuneration,
        gratification_kind: request.gratification_kind,
        gratification_amount: request.gratification_amount,
        afp_id: request.afp_id,
        isapre_id: request.isapre_id,
    }
}

/// Validate a contract request against the caller's company.
async fn validate(
    repo: &HrRepository,
    company_id: Uuid,
    request: &ContractRequest,
) -> HrResult<ContractTerms> {
    let mut v = Validator::new();

    if found(repo.get_worker(company_id, request.worker_id).await)?.is_none() {
        v.push("worker_id", "worker does not exist");
    }

    let contract_type = found(repo.get_contract_type(request.contract_type_id).await)?;
    if contract_type.is_none() {
        v.push("contract_type_id", "contract type does not exist");
    }

    if found(repo.get_work_schedule(request.work_schedule_id).await)?.is_none() {
        v.push("work_schedule_id", "work schedule does not exist");
    }

    check_placement(&mut v, repo, company_id, request.department_id, request.position_id).await?;

    if let Some(afp_id) = request.afp_id {
        if found(repo.get_afp(afp_id).await)?.is_none() {
            v.push("afp_id", "AFP does not exist");
        }
    }
    if let Some(isapre_id) = request.isapre_id {
        if found(repo.get_isapre(isapre_id).await)?.is_none() {
            v.push("isapre_id", "Isapre does not exist");
        }
    }

    let terms = contract_terms(&mut v, request, contract_type.as_ref());
    v.finish()?;
    Ok(terms)
}

/// List contracts of the caller's company.
///
/// GET /v1/contracts
#[utoipa::path(
    get,
    path = "/v1/contracts",
    params(ListContractsQuery),
    responses(
        (status = 200, description = "One page of contracts", body = Page<Contract>)
    ),
    security(("bearer_auth" = [])),
    tag = "contracts"
)]
pub async fn list_contracts(
    State(state): State<AppState>,
    user: CurrentUser,
    query: Result<Query<ListContractsQuery>, QueryRejection>,
) -> HrResult<Json<Page<Contract>>> {
    let Query(query) = query?;
    let page = page_request(&state, query.page, query.limit);

    let (contracts, total) = state
        .repository
        .list_contracts(user.company_id(), query.worker_id, page)
        .await?;

    Ok(Json(Page::new(contracts, total, page)))
}

/// Get a contract.
///
/// GET /v1/contracts/{id}
#[utoipa::path(
    get,
    path = "/v1/contracts/{id}",
    params(("id" = Uuid, Path, description = "Contract ID")),
    responses(
        (status = 200, description = "Contract details", body = Contract),
        (status = 404, description = "Contract not found")
    ),
    security(("bearer_auth" = [])),
    tag = "contracts"
)]
pub async fn get_contract(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> HrResult<Json<Contract>> {
    let contract = state.repository.get_contract(user.company_id(), id).await?;
    Ok(Json(contract))
}

/// Create a contract.
///
/// POST /v1/contracts
#[utoipa::path(
    post,
    path = "/v1/contracts",
    request_body = ContractRequest,
    responses(
        (status = 201, description = "Contract created", body = Contract),
        (status = 422, description = "Invalid fields", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "contracts"
)]
pub async fn create_contract(
    State(state): State<AppState>,
    editor: Editor,
    payload: Result<Json<ContractRequest>, JsonRejection>,
) -> HrResult<(StatusCode, Json<Contract>)> {
    let Json(request) = payload?;
    let terms = validate(&state.repository, editor.company_id(), &request).await?;

    let contract = Contract::new(request.worker_id, terms);
    state.repository.create_contract(&contract).await?;

    tracing::info!(
        contract_id = %contract.id,
        worker_id = %contract.worker_id,
        start_date = %contract.start_date,
        monthly_total = contract.remuneration.monthly_total(),
        created_by = %editor.0.sub,
        "Contract created"
    );

    Ok((StatusCode::CREATED, Json(contract)))
}

/// Replace a contract's terms.
///
/// PUT /v1/contracts/{id}
#[utoipa::path(
    put,
    path = "/v1/contracts/{id}",
    params(("id" = Uuid, Path, description = "Contract ID")),
    request_body = ContractRequest,
    responses(
        (status = 200, description = "Contract updated", body = Contract),
        (status = 404, description = "Contract not found"),
        (status = 422, description = "Invalid fields", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "contracts"
)]
pub async fn update_contract(
    State(state): State<AppState>,
    editor: Editor,
    Path(id): Path<Uuid>,
    payload: Result<Json<ContractRequest>, JsonRejection>,
) -> HrResult<Json<Contract>> {
    let Json(request) = payload?;
    let company_id = editor.company_id();
    let existing = state.repository.get_contract(company_id, id).await?;

    if request.worker_id != existing.worker_id {
        return Err(HrError::Validation(vec![FieldError::new(
            "worker_id",
            "a contract cannot move to another worker",
        )]));
    }

    let terms = validate(&state.repository, company_id, &request).await?;
    let contract = state.repository.update_contract(company_id, id, &terms).await?;

    tracing::info!(contract_id = %id, updated_by = %editor.0.sub, "Contract updated");

    Ok(Json(contract))
}

/// Delete a contract.
///
/// DELETE /v1/contracts/{id}
#[utoipa::path(
    delete,
    path = "/v1/contracts/{id}",
    params(("id" = Uuid, Path, description = "Contract ID")),
    responses(
        (status = 204, description = "Contract deleted"),
        (status = 404, description = "Contract not found")
    ),
    security(("bearer_auth" = [])),
    tag = "contracts"
)]
pub async fn delete_contract(
    State(state): State<AppState>,
    editor: Editor,
    Path(id): Path<Uuid>,
) -> HrResult<StatusCode> {
    state.repository.delete_contract(editor.company_id(), id).await?;

    tracing::info!(contract_id = %id, deleted_by = %editor.0.sub, "Contract deleted");

    Ok(StatusCode::NO_CONTENT)
}

//! Worker registration, listing, soft deletion and document uploads.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Multipart, Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::api::handlers::{check_placement, check_rut, check_text, found, page_request};
use crate::api::types::{clean, clean_opt, ListWorkersQuery, WorkerRequest};
use crate::auth::{CurrentUser, Editor};
use crate::domain::{
    looks_like_email, normalize_mobile_phone, DocumentKind, Page, Worker, WorkerFields,
};
use crate::error::{HrError, HrResult, Validator};
use crate::storage::HrRepository;
use crate::AppState;

/// Check the self-contained worker fields and build the normalized values.
///
/// The result is only meaningful when `v` ends up without errors.
pub(crate) fn worker_fields(v: &mut Validator, request: WorkerRequest, today: NaiveDate) -> WorkerFields {
    check_text(v, "first_name", &request.first_name, 3);
    check_text(v, "last_names", &request.last_names, 3);

    let email = request.email.trim().to_lowercase();
    v.check(looks_like_email(&email), "email", "must be a valid email address");

    let phone = clean_opt(request.phone.as_deref()).and_then(|raw| {
        let normalized = normalize_mobile_phone(&raw);
        if normalized.is_none() {
            v.push("phone", "must be a Chilean mobile number such as +56 9 1234 5678");
        }
        normalized
    });

    v.check(request.birth_date <= today, "birth_date", "cannot be in the future");
    v.check(request.children >= 0, "children", "cannot be negative");
    check_text(v, "address", &request.address, 1);
    check_text(v, "city", &request.city, 1);

    WorkerFields {
        first_name: clean(&request.first_name),
        last_names: clean(&request.last_names),
        email,
        phone,
        birth_date: request.birth_date,
        marital_status: request.marital_status,
        children: request.children,
        address: clean(&request.address),
        address_detail: clean_opt(request.address_detail.as_deref()),
        commune_id: request.commune_id,
        city: clean(&request.city),
        department_id: request.department_id,
        position_id: request.position_id,
    }
}

/// Checks that need the database: placement and commune.
async fn check_references(
    v: &mut Validator,
    repo: &HrRepository,
    company_id: Uuid,
    fields: &WorkerFields,
) -> HrResult<()> {
    check_placement(v, repo, company_id, fields.department_id, fields.position_id).await?;
    if let Some(commune_id) = fields.commune_id {
        if found(repo.get_commune(commune_id).await)?.is_none() {
            v.push("commune_id", "commune does not exist");
        }
    }
    Ok(())
}

/// List active workers.
///
/// GET /v1/workers
#[utoipa::path(
    get,
    path = "/v1/workers",
    params(ListWorkersQuery),
    responses(
        (status = 200, description = "One page of workers", body = Page<Worker>),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "workers"
)]
pub async fn list_workers(
    State(state): State<AppState>,
    user: CurrentUser,
    query: Result<Query<ListWorkersQuery>, QueryRejection>,
) -> HrResult<Json<Page<Worker>>> {
    let Query(query) = query?;
    let page = page_request(&state, query.page, query.limit);

    let (workers, total) = state
        .repository
        .list_workers(user.company_id(), query.filter.as_deref(), page)
        .await?;

    Ok(Json(Page::new(workers, total, page)))
}

/// Get an active worker.
///
/// GET /v1/workers/{id}
#[utoipa::path(
    get,
    path = "/v1/workers/{id}",
    params(("id" = Uuid, Path, description = "Worker ID")),
    responses(
        (status = 200, description = "Worker details", body = Worker),
        (status = 404, description = "Worker not found")
    ),
    security(("bearer_auth" = [])),
    tag = "workers"
)]
pub async fn get_worker(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> HrResult<Json<Worker>> {
    let worker = state.repository.get_worker(user.company_id(), id).await?;
    Ok(Json(worker))
}

/// Register a worker.
///
/// POST /v1/workers
#[utoipa::path(
    post,
    path = "/v1/workers",
    request_body = WorkerRequest,
    responses(
        (status = 201, description = "Worker registered", body = Worker),
        (status = 403, description = "Read-only user"),
        (status = 409, description = "RUT already registered in the company"),
        (status = 422, description = "Invalid fields", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "workers"
)]
pub async fn create_worker(
    State(state): State<AppState>,
    editor: Editor,
    payload: Result<Json<WorkerRequest>, JsonRejection>,
) -> HrResult<(StatusCode, Json<Worker>)> {
    let Json(request) = payload?;
    let company_id = editor.company_id();

    let mut v = Validator::new();
    let rut = match request.rut.as_deref() {
        Some(raw) => check_rut(&mut v, "rut", raw),
        None => {
            v.push("rut", "is required");
            None
        }
    };
    let fields = worker_fields(&mut v, request, Utc::now().date_naive());
    check_references(&mut v, &state.repository, company_id, &fields).await?;
    v.finish()?;

    let rut = rut.ok_or_else(|| HrError::Internal("validated RUT missing".to_string()))?;
    let worker = Worker::new(company_id, rut.to_string(), fields);
    state.repository.create_worker(&worker).await?;

    tracing::info!(
        worker_id = %worker.id,
        company_id = %company_id,
        rut = %worker.rut,
        created_by = %editor.0.sub,
        "Worker registered"
    );

    Ok((StatusCode::CREATED, Json(worker)))
}

/// Update a worker. The RUT cannot change.
///
/// PUT /v1/workers/{id}
#[utoipa::path(
    put,
    path = "/v1/workers/{id}",
    params(("id" = Uuid, Path, description = "Worker ID")),
    request_body = WorkerRequest,
    responses(
        (status = 200, description = "Worker updated", body = Worker),
        (status = 404, description = "Worker not found"),
        (status = 422, description = "Invalid fields", body = crate::error::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "workers"
)]
pub async fn update_worker(
    State(state): State<AppState>,
    editor: Editor,
    Path(id): Path<Uuid>,
    payload: Result<Json<WorkerRequest>, JsonRejection>,
) -> HrResult<Json<Worker>> {
    let Json(request) = payload?;
    let company_id = editor.company_id();
    let existing = state.repository.get_worker(company_id, id).await?;

    let mut v = Validator::new();
    if let Some(raw) = request.rut.as_deref() {
        if let Some(rut) = check_rut(&mut v, "rut", raw) {
            v.check(rut.to_string() == existing.rut, "rut", "cannot be changed");
        }
    }
    let fields = worker_fields(&mut v, request, Utc::now().date_naive());
    check_references(&mut v, &state.repository, company_id, &fields).await?;
    v.finish()?;

    let worker = state.repository.update_worker(company_id, id, &fields).await?;

    tracing::info!(worker_id = %id, updated_by = %editor.0.sub, "Worker updated");

    Ok(Json(worker))
}

/// Soft-delete a worker.
///
/// DELETE /v1/workers/{id}
#[utoipa::path(
    delete,
    path = "/v1/workers/{id}",
    params(("id" = Uuid, Path, description = "Worker ID")),
    responses(
        (status = 204, description = "Worker deactivated"),
        (status = 404, description = "Worker not found")
    ),
    security(("bearer_auth" = [])),
    tag = "workers"
)]
pub async fn delete_worker(
    State(state): State<AppState>,
    editor: Editor,
    Path(id): Path<Uuid>,
) -> HrResult<StatusCode> {
    state.repository.deactivate_worker(editor.company_id(), id).await?;

    tracing::info!(worker_id = %id, deactivated_by = %editor.0.sub, "Worker deactivated");

    Ok(StatusCode::NO_CONTENT)
}

/// Deactivate a worker. Same effect as `DELETE`.
///
/// PATCH /v1/workers/{id}/deactivate
#[utoipa::path(
    patch,
    path = "/v1/workers/{id}/deactivate",
    params(("id" = Uuid, Path, description = "Worker ID")),
    responses(
        (status = 204, description = "Worker deactivated"),
        (status = 404, description = "Worker not found")
    ),
    security(("bearer_auth" = [])),
    tag = "workers"
)]
pub async fn deactivate_worker(
    state: State<AppState>,
    editor: Editor,
    id: Path<Uuid>,
) -> HrResult<StatusCode> {
    delete_worker(state, editor, id).await
}

/// Upload one of the worker's documents as multipart field `file`.
///
/// PUT /v1/workers/{id}/documents/{kind}
#[utoipa::path(
    put,
    path = "/v1/workers/{id}/documents/{kind}",
    params(
        ("id" = Uuid, Path, description = "Worker ID"),
        ("kind" = DocumentKind, Path, description = "cv, background_certificate, afp_certificate or fun_form")
    ),
    request_body(content = String, content_type = "multipart/form-data", description = "Multipart form with a `file` field"),
    responses(
        (status = 200, description = "Document stored", body = Worker),
        (status = 400, description = "Missing file or unknown document kind"),
        (status = 404, description = "Worker not found"),
        (status = 413, description = "File too large")
    ),
    security(("bearer_auth" = [])),
    tag = "workers"
)]
pub async fn upload_document(
    State(state): State<AppState>,
    editor: Editor,
    Path((id, kind)): Path<(Uuid, String)>,
    mut multipart: Multipart,
) -> HrResult<Json<Worker>> {
    let kind: DocumentKind = kind.parse().map_err(HrError::BadRequest)?;
    let company_id = editor.company_id();
    let worker = state.repository.get_worker(company_id, id).await?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let file_name = field.file_name().map(str::to_string);
            let bytes = field.bytes().await?;
            upload = Some((file_name, bytes));
            break;
        }
    }
    let (file_name, bytes) =
        upload.ok_or_else(|| HrError::BadRequest("Multipart field 'file' is required".to_string()))?;

    let path = state
        .documents
        .save(company_id, &worker.rut, kind, file_name.as_deref(), &bytes)
        .await?;
    let previous = worker.documents.get(kind).map(str::to_string);
    let worker = state
        .repository
        .set_worker_document(company_id, id, kind, &path)
        .await?;
    if let Some(previous) = previous {
        state.documents.discard(&previous, &path).await;
    }

    tracing::info!(
        worker_id = %id,
        kind = %kind,
        size = bytes.len(),
        uploaded_by = %editor.0.sub,
        "Worker document stored"
    );

    Ok(Json(worker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MaritalStatus;

    fn request() -> WorkerRequest {
        WorkerRequest {
            rut: Some("12.345.678-5".to_string()),
            first_name: "  Ana ".to_string(),
            last_names: "Pérez Soto".to_string(),
            email: "Ana.Perez@Empresa.CL".to_string(),
            phone: Some("9 8765 4321".to_string()),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(),
            marital_status: MaritalStatus::Married,
            children: 1,
            address: "Los Aromos 123".to_string(),
            address_detail: Some("  ".to_string()),
            commune_id: None,
            city: "Santiago".to_string(),
            department_id: Uuid::new_v4(),
            position_id: Uuid::new_v4(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_worker_fields_are_normalized() {
        let mut v = Validator::new();
        let fields = worker_fields(&mut v, request(), today());
        assert!(v.finish().is_ok());
        assert_eq!(fields.first_name, "Ana");
        assert_eq!(fields.email, "ana.perez@empresa.cl");
        assert_eq!(fields.phone.as_deref(), Some("+56987654321"));
        assert!(fields.address_detail.is_none());
    }

    #[test]
    fn test_worker_fields_report_every_problem() {
        let mut bad = request();
        bad.first_name = "Al".to_string();
        bad.email = "no-at-sign".to_string();
        bad.phone = Some("22 345 6789".to_string());
        bad.birth_date = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        bad.children = -1;
        bad.city = " ".to_string();

        let mut v = Validator::new();
        worker_fields(&mut v, bad, today());
        match v.finish() {
            Err(HrError::Validation(errors)) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(
                    fields,
                    vec!["first_name", "email", "phone", "birth_date", "children", "city"]
                );
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_phone_is_absent() {
        let mut req = request();
        req.phone = Some("   ".to_string());
        let mut v = Validator::new();
        let fields = worker_fields(&mut v, req, today());
        assert!(v.finish().is_ok());
        assert!(fields.phone.is_none());
    }
}

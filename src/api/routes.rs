//! Route definitions for the API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::handlers::{
    auth, catalog, company, contracts, dependents, health, organization, vacations, workers,
};
use crate::auth::require_jwt;
use crate::AppState;

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Security scheme modifier for OpenAPI.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        auth::get_current_user,
        company::get_company,
        company::update_company,
        company::list_users,
        company::create_user,
        company::delete_user,
        workers::list_workers,
        workers::get_worker,
        workers::create_worker,
        workers::update_worker,
        workers::delete_worker,
        workers::deactivate_worker,
        workers::upload_document,
        vacations::list_vacations,
        vacations::create_vacation,
        vacations::vacation_balance,
        contracts::list_contracts,
        contracts::get_contract,
        contracts::create_contract,
        contracts::update_contract,
        contracts::delete_contract,
        dependents::list_dependents,
        dependents::get_dependent,
        dependents::create_dependent,
        dependents::update_dependent,
        dependents::delete_dependent,
        organization::list_departments,
        organization::get_department,
        organization::create_department,
        organization::update_department,
        organization::delete_department,
        organization::list_positions,
        organization::get_position,
        organization::create_position,
        organization::update_position,
        organization::delete_position,
        catalog::list_afps,
        catalog::get_afp,
        catalog::create_afp,
        catalog::update_afp,
        catalog::delete_afp,
        catalog::list_isapres,
        catalog::get_isapre,
        catalog::create_isapre,
        catalog::update_isapre,
        catalog::delete_isapre,
        catalog::list_work_schedules,
        catalog::get_work_schedule,
        catalog::create_work_schedule,
        catalog::update_work_schedule,
        catalog::delete_work_schedule,
        catalog::list_contract_types,
        catalog::get_contract_type,
        catalog::create_contract_type,
        catalog::list_communes,
        catalog::create_commune,
    ),
    components(schemas(
        crate::api::types::LoginRequest,
        crate::api::types::LoginResponse,
        crate::api::types::RegisterRequest,
        crate::api::types::UpdateCompanyRequest,
        crate::api::types::CreateUserRequest,
        crate::api::types::WorkerRequest,
        crate::api::types::ContractRequest,
        crate::api::types::DependentDetails,
        crate::api::types::CreateDependentRequest,
        crate::api::types::VacationRequest,
        crate::api::types::DepartmentRequest,
        crate::api::types::PositionRequest,
        crate::api::types::NamedRequest,
        crate::api::types::WorkScheduleRequest,
        crate::api::types::ContractTypeRequest,
        crate::api::types::CommuneRequest,
        crate::api::types::HealthResponse,
        crate::error::ErrorResponse,
        crate::error::FieldError,
        crate::domain::Company,
        crate::domain::User,
        crate::domain::UserRole,
        crate::domain::Worker,
        crate::domain::WorkerDocuments,
        crate::domain::MaritalStatus,
        crate::domain::DocumentKind,
        crate::domain::Contract,
        crate::domain::ContractDuration,
        crate::domain::DurationUnit,
        crate::domain::Remuneration,
        crate::domain::GratificationKind,
        crate::domain::FamilyDependent,
        crate::domain::Relationship,
        crate::domain::VacationLeave,
        crate::domain::VacationBalance,
        crate::domain::Department,
        crate::domain::Position,
        crate::domain::Afp,
        crate::domain::Isapre,
        crate::domain::WorkSchedule,
        crate::domain::ContractType,
        crate::domain::Commune,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Login, company sign-up and current user"),
        (name = "company", description = "Company profile and console users"),
        (name = "workers", description = "Worker records and documents"),
        (name = "vacations", description = "Vacation leave and balances"),
        (name = "contracts", description = "Employment contracts"),
        (name = "dependents", description = "Family dependents"),
        (name = "organization", description = "Departments and positions"),
        (name = "catalog", description = "AFP, Isapre, schedules, contract types and communes"),
        (name = "health", description = "Health and status endpoints")
    ),
    info(
        title = "HR Core API",
        version = "0.1.0",
        description = "Multi-tenant HR administration for Chilean companies",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Build the API router.
///
/// Everything except health, login and registration sits behind
/// [`require_jwt`].
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Document uploads exceed axum's default body limit.
    let upload_routes = Router::new()
        .route(
            "/v1/workers/{id}/documents/{kind}",
            put(workers::upload_document),
        )
        .layer(DefaultBodyLimit::max(
            state.documents.max_bytes() + MULTIPART_OVERHEAD,
        ));

    let protected_routes = Router::new()
        .route("/v1/auth/me", get(auth::get_current_user))
        // Company and users
        .route(
            "/v1/company",
            get(company::get_company).put(company::update_company),
        )
        .route(
            "/v1/users",
            get(company::list_users).post(company::create_user),
        )
        .route("/v1/users/{id}", axum::routing::delete(company::delete_user))
        // Workers
        .route(
            "/v1/workers",
            get(workers::list_workers).post(workers::create_worker),
        )
        .route(
            "/v1/workers/{id}",
            get(workers::get_worker)
                .put(workers::update_worker)
                .delete(workers::delete_worker),
        )
        .route(
            "/v1/workers/{id}/deactivate",
            patch(workers::deactivate_worker),
        )
        .route(
            "/v1/workers/{id}/vacations",
            get(vacations::list_vacations).post(vacations::create_vacation),
        )
        .route(
            "/v1/workers/{id}/vacations/balance",
            get(vacations::vacation_balance),
        )
        .merge(upload_routes)
        // Contracts
        .route(
            "/v1/contracts",
            get(contracts::list_contracts).post(contracts::create_contract),
        )
        .route(
            "/v1/contracts/{id}",
            get(contracts::get_contract)
                .put(contracts::update_contract)
                .delete(contracts::delete_contract),
        )
        // Dependents
        .route(
            "/v1/dependents",
            get(dependents::list_dependents).post(dependents::create_dependent),
        )
        .route(
            "/v1/dependents/{id}",
            get(dependents::get_dependent)
                .put(dependents::update_dependent)
                .delete(dependents::delete_dependent),
        )
        // Organization
        .route(
            "/v1/departments",
            get(organization::list_departments).post(organization::create_department),
        )
        .route(
            "/v1/departments/{id}",
            get(organization::get_department)
                .put(organization::update_department)
                .delete(organization::delete_department),
        )
        .route(
            "/v1/positions",
            get(organization::list_positions).post(organization::create_position),
        )
        .route(
            "/v1/positions/{id}",
            get(organization::get_position)
                .put(organization::update_position)
                .delete(organization::delete_position),
        )
        // Reference tables
        .route("/v1/afps", get(catalog::list_afps).post(catalog::create_afp))
        .route(
            "/v1/afps/{id}",
            get(catalog::get_afp)
                .put(catalog::update_afp)
                .delete(catalog::delete_afp),
        )
        .route(
            "/v1/isapres",
            get(catalog::list_isapres).post(catalog::create_isapre),
        )
        .route(
            "/v1/isapres/{id}",
            get(catalog::get_isapre)
                .put(catalog::update_isapre)
                .delete(catalog::delete_isapre),
        )
        .route(
            "/v1/work-schedules",
            get(catalog::list_work_schedules).post(catalog::create_work_schedule),
        )
        .route(
            "/v1/work-schedules/{id}",
            get(catalog::get_work_schedule)
                .put(catalog::update_work_schedule)
                .delete(catalog::delete_work_schedule),
        )
        .route(
            "/v1/contract-types",
            get(catalog::list_contract_types).post(catalog::create_contract_type),
        )
        .route("/v1/contract-types/{id}", get(catalog::get_contract_type))
        .route(
            "/v1/communes",
            get(catalog::list_communes).post(catalog::create_commune),
        )
        .layer(middleware::from_fn_with_state(
            state.jwt_manager.clone(),
            require_jwt,
        ));

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/v1/health", get(health::health_check))
        .route("/v1/auth/login", post(auth::login))
        .route("/v1/auth/register", post(auth::register));

    Router::new()
        .merge(protected_routes)
        .merge(public_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::auth::JwtManager;
    use crate::config::{ListingConfig, UploadsConfig};
    use crate::storage::{DocumentStore, HrRepository};

    struct TestApp {
        router: Router,
        state: AppState,
        _uploads: tempfile::TempDir,
    }

    async fn app() -> TestApp {
        crate::logging::init_test();
        let uploads = tempfile::tempdir().unwrap();
        let state = AppState {
            repository: HrRepository::in_memory().await,
            jwt_manager: JwtManager::new("test-secret-0123456789", "hr-core".to_string(), 1),
            documents: DocumentStore::new(&UploadsConfig {
                dir: uploads.path().to_string_lossy().into_owned(),
                max_file_bytes: 1024,
            }),
            listing: ListingConfig {
                default_limit: 10,
                max_limit: 50,
            },
        };
        TestApp {
            router: build_router(state.clone()),
            state,
            _uploads: uploads,
        }
    }

    impl TestApp {
        async fn send(
            &self,
            method: Method,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
            }
            let request = match body {
                Some(body) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or(Value::Null)
            };
            (status, value)
        }

        /// Register a company and return the admin token.
        async fn register(&self, company_rut: &str, email: &str) -> String {
            let (status, body) = self
                .send(
                    Method::POST,
                    "/v1/auth/register",
                    None,
                    Some(json!({
                        "company_name": "Transportes Sur",
                        "company_rut": company_rut,
                        "name": "María González",
                        "email": email,
                        "password": "secreto123",
                    })),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{}", body);
            body["token"].as_str().unwrap().to_string()
        }

        /// Create a department with one position, returning their IDs.
        async fn org(&self, token: &str) -> (String, String) {
            let (_, department) = self
                .send(
                    Method::POST,
                    "/v1/departments",
                    Some(token),
                    Some(json!({ "name": "Operaciones" })),
                )
                .await;
            let department_id = department["id"].as_str().unwrap().to_string();
            let (_, position) = self
                .send(
                    Method::POST,
                    "/v1/positions",
                    Some(token),
                    Some(json!({ "department_id": department_id, "name": "Conductor" })),
                )
                .await;
            (department_id, position["id"].as_str().unwrap().to_string())
        }

        /// Upload one document as multipart field `file`.
        async fn upload(
            &self,
            token: &str,
            worker_id: &str,
            kind: &str,
            file_name: &str,
            payload: &str,
        ) -> (StatusCode, Value) {
            let boundary = "XBOUNDARYX";
            let body = format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n{p}\r\n--{b}--\r\n",
                b = boundary,
                f = file_name,
                p = payload
            );
            let request = Request::builder()
                .method(Method::PUT)
                .uri(format!("/v1/workers/{}/documents/{}", worker_id, kind))
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(Body::from(body))
                .unwrap();

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
        }
    }

    fn worker_body(rut: &str, first_name: &str, org: &(String, String)) -> Value {
        json!({
            "rut": rut,
            "first_name": first_name,
            "last_names": "Rojas Muñoz",
            "email": "trabajador@sur.cl",
            "phone": "+56 9 8765 4321",
            "birth_date": "1988-04-12",
            "marital_status": "single",
            "children": 0,
            "address": "Av. Matta 1020",
            "city": "Santiago",
            "department_id": org.0,
            "position_id": org.1,
        })
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = app().await;
        let (status, body) = app.send(Method::GET, "/v1/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["database"], "connected");
    }

    #[tokio::test]
    async fn test_missing_token_is_rejected() {
        let app = app().await;
        let (status, body) = app.send(Method::GET, "/v1/workers", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "MISSING_TOKEN");

        let (status, body) = app
            .send(Method::GET, "/v1/workers", Some("not-a-jwt"), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let app = app().await;
        app.register("76.086.428-5", "maria@sur.cl").await;

        let (status, body) = app
            .send(
                Method::POST,
                "/v1/auth/login",
                None,
                Some(json!({ "email": "MARIA@sur.cl", "password": "secreto123" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["role"], "admin");
        let token = body["token"].as_str().unwrap().to_string();

        let (status, me) = app.send(Method::GET, "/v1/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["email"], "maria@sur.cl");
        assert!(me.get("password_hash").is_none());

        let (status, company) = app.send(Method::GET, "/v1/company", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(company["rut"], "76086428-5");

        let (status, _) = app
            .send(
                Method::POST,
                "/v1/auth/login",
                None,
                Some(json!({ "email": "maria@sur.cl", "password": "incorrecta" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_duplicate_company_is_conflict() {
        let app = app().await;
        app.register("76086428-5", "uno@sur.cl").await;

        let (status, _) = app
            .send(
                Method::POST,
                "/v1/auth/register",
                None,
                Some(json!({
                    "company_name": "Otra",
                    "company_rut": "76.086.428-5",
                    "name": "Pedro",
                    "email": "otro@sur.cl",
                    "password": "secreto123",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_worker_lifecycle_and_tenant_isolation() {
        let app = app().await;
        let token = app.register("76086428-5", "admin@sur.cl").await;
        let other = app.register("12345678-5", "admin@norte.cl").await;
        let org = app.org(&token).await;

        let (status, worker) = app
            .send(
                Method::POST,
                "/v1/workers",
                Some(&token),
                Some(worker_body("11.111.111-1", "Camila", &org)),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", worker);
        assert_eq!(worker["rut"], "11111111-1");
        assert_eq!(worker["phone"], "+56987654321");
        let uri = format!("/v1/workers/{}", worker["id"].as_str().unwrap());

        // Same RUT again in the same company.
        let (status, _) = app
            .send(
                Method::POST,
                "/v1/workers",
                Some(&token),
                Some(worker_body("11111111-1", "Camila", &org)),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        // Another company cannot see it.
        let (status, _) = app.send(Method::GET, &uri, Some(&other), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (_, page) = app.send(Method::GET, "/v1/workers", Some(&other), None).await;
        assert_eq!(page["total"], 0);

        let (status, _) = app.send(Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = app.send(Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_worker_validation_lists_fields() {
        let app = app().await;
        let token = app.register("76086428-5", "admin@sur.cl").await;
        let org = app.org(&token).await;

        let mut body = worker_body("11111111-2", "Al", &org);
        body["email"] = json!("sin-arroba");
        let (status, error) = app
            .send(Method::POST, "/v1/workers", Some(&token), Some(body))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error["code"], "VALIDATION_FAILED");

        let fields: Vec<&str> = error["fields"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|f| f["field"].as_str())
            .collect();
        assert_eq!(fields, vec!["rut", "first_name", "email"]);

        // Malformed JSON is a 400 with the same error shape.
        let (status, error) = app
            .send(Method::POST, "/v1/workers", Some(&token), Some(json!({ "rut": 5 })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_worker_listing_filters_and_pages() {
        let app = app().await;
        let token = app.register("76086428-5", "admin@sur.cl").await;
        let org = app.org(&token).await;

        for (rut, name) in [
            ("11111111-1", "Camila"),
            ("22222222-2", "Carlos"),
            ("33333333-3", "Daniela"),
        ] {
            let (status, _) = app
                .send(Method::POST, "/v1/workers", Some(&token), Some(worker_body(rut, name, &org)))
                .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, page) = app
            .send(Method::GET, "/v1/workers?page=2&limit=2", Some(&token), None)
            .await;
        assert_eq!(page["total"], 3);
        assert_eq!(page["total_pages"], 2);
        assert_eq!(page["data"].as_array().unwrap().len(), 1);

        let (_, page) = app
            .send(Method::GET, "/v1/workers?filter=car", Some(&token), None)
            .await;
        assert_eq!(page["total"], 1);
        assert_eq!(page["data"][0]["first_name"], "Carlos");

        let (_, page) = app
            .send(Method::GET, "/v1/workers?filter=33.333", Some(&token), None)
            .await;
        assert_eq!(page["total"], 1);

        let (status, _) = app
            .send(Method::GET, "/v1/workers?page=abc", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_viewer_is_read_only() {
        let app = app().await;
        let token = app.register("76086428-5", "admin@sur.cl").await;

        let (status, _) = app
            .send(
                Method::POST,
                "/v1/users",
                Some(&token),
                Some(json!({
                    "email": "lector@sur.cl",
                    "name": "Lector",
                    "password": "lectura123",
                    "role": "viewer",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, login) = app
            .send(
                Method::POST,
                "/v1/auth/login",
                None,
                Some(json!({ "email": "lector@sur.cl", "password": "lectura123" })),
            )
            .await;
        let viewer = login["token"].as_str().unwrap();

        let (status, _) = app.send(Method::GET, "/v1/departments", Some(viewer), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = app
            .send(
                Method::POST,
                "/v1/departments",
                Some(viewer),
                Some(json!({ "name": "Ventas" })),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "FORBIDDEN");
        let (status, _) = app.send(Method::GET, "/v1/users", Some(viewer), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_positions_require_department() {
        let app = app().await;
        let token = app.register("76086428-5", "admin@sur.cl").await;
        let (department_id, _) = app.org(&token).await;

        let (status, _) = app.send(Method::GET, "/v1/positions", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .send(Method::GET, "/v1/positions?department_id=xyz", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let unknown = format!("/v1/positions?department_id={}", uuid::Uuid::new_v4());
        let (status, _) = app.send(Method::GET, &unknown, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let uri = format!("/v1/positions?department_id={}", department_id);
        let (status, positions) = app.send(Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(positions[0]["name"], "Conductor");

        // Still referenced by its position.
        let (status, _) = app
            .send(
                Method::DELETE,
                &format!("/v1/departments/{}", department_id),
                Some(&token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_contract_and_vacation_balance() {
        let app = app().await;
        let token = app.register("76086428-5", "admin@sur.cl").await;
        let org = app.org(&token).await;

        let (_, worker) = app
            .send(
                Method::POST,
                "/v1/workers",
                Some(&token),
                Some(worker_body("11111111-1", "Camila", &org)),
            )
            .await;
        let worker_id = worker["id"].as_str().unwrap().to_string();

        let (_, types) = app.send(Method::GET, "/v1/contract-types", Some(&token), None).await;
        let indefinite = types
            .as_array()
            .unwrap()
            .iter()
            .find(|t| t["indefinite"] == true)
            .unwrap()["id"]
            .clone();
        let (_, schedules) = app.send(Method::GET, "/v1/work-schedules", Some(&token), None).await;
        let schedule = schedules[0]["id"].clone();

        let balance_uri = format!(
            "/v1/workers/{}/vacations/balance?as_of=2024-03-01",
            worker_id
        );
        let (status, _) = app.send(Method::GET, &balance_uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let mut contract = json!({
            "worker_id": worker_id,
            "contract_type_id": indefinite,
            "start_date": "2021-01-15",
            "work_schedule_id": schedule,
            "department_id": org.0,
            "position_id": org.1,
            "base_salary": 750000,
            "meal_allowance": 50000,
            "gratification_kind": "annual_25_percent",
        });
        let (status, created) = app
            .send(Method::POST, "/v1/contracts", Some(&token), Some(contract.clone()))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", created);
        assert_eq!(created["remuneration"]["base_salary"], 750000);

        // Indefinite contracts carry no end date.
        contract["end_date"] = json!("2022-01-14");
        let (status, _) = app
            .send(Method::POST, "/v1/contracts", Some(&token), Some(contract))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = app
            .send(
                Method::POST,
                &format!("/v1/workers/{}/vacations", worker_id),
                Some(&token),
                Some(json!({ "start_date": "2023-02-06", "end_date": "2023-02-17", "days": 10 })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, balance) = app.send(Method::GET, &balance_uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(balance["years_of_service"], 3);
        assert_eq!(balance["accrued_days"], 45);
        assert_eq!(balance["consumed_days"], 10);
        assert_eq!(balance["remaining_days"], 35);

        let (_, page) = app
            .send(
                Method::GET,
                &format!("/v1/contracts?worker_id={}", worker_id),
                Some(&token),
                None,
            )
            .await;
        assert_eq!(page["total"], 1);
    }

    #[tokio::test]
    async fn test_dependents_follow_worker_company() {
        let app = app().await;
        let token = app.register("76086428-5", "admin@sur.cl").await;
        let other = app.register("12345678-5", "admin@norte.cl").await;
        let org = app.org(&token).await;

        let (_, worker) = app
            .send(
                Method::POST,
                "/v1/workers",
                Some(&token),
                Some(worker_body("11111111-1", "Camila", &org)),
            )
            .await;
        let dependent = json!({
            "worker_id": worker["id"],
            "full_name": "Tomás Rojas",
            "birth_date": "2016-08-30",
            "relationship": "child",
        });

        let (status, _) = app
            .send(Method::POST, "/v1/dependents", Some(&other), Some(dependent.clone()))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, created) = app
            .send(Method::POST, "/v1/dependents", Some(&token), Some(dependent))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let uri = format!("/v1/dependents/{}", created["id"].as_str().unwrap());
        let (status, _) = app.send(Method::GET, &uri, Some(&other), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = app.send(Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_document_upload() {
        let app = app().await;
        let token = app.register("76086428-5", "admin@sur.cl").await;
        let org = app.org(&token).await;
        let (_, worker) = app
            .send(
                Method::POST,
                "/v1/workers",
                Some(&token),
                Some(worker_body("11111111-1", "Camila", &org)),
            )
            .await;
        let worker_id = worker["id"].as_str().unwrap();

        let boundary = "XBOUNDARYX";
        let multipart = |payload: &str| {
            format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"cv.PDF\"\r\n\
                 Content-Type: application/pdf\r\n\r\n{p}\r\n--{b}--\r\n",
                b = boundary,
                p = payload
            )
        };
        let upload = |kind: &str, body: String| {
            Request::builder()
                .method(Method::PUT)
                .uri(format!("/v1/workers/{}/documents/{}", worker_id, kind))
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(Body::from(body))
                .unwrap()
        };

        let response = app
            .router
            .clone()
            .oneshot(upload("cv", multipart("%PDF-1.4 contenido")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let updated: Value = serde_json::from_slice(&bytes).unwrap();
        let path = updated["documents"]["cv"].as_str().unwrap();
        assert!(path.ends_with("11111111-1_cv.pdf"));
        tokio_test::assert_ok!(tokio::fs::metadata(path).await);

        let response = app
            .router
            .clone()
            .oneshot(upload("passport", multipart("x")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .router
            .clone()
            .oneshot(upload("cv", multipart(&"x".repeat(2048))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        assert!(app.state.documents.max_bytes() < 2048);
    }

    #[tokio::test]
    async fn test_documents_are_kept_per_company() {
        let app = app().await;
        let sur = app.register("76086428-5", "admin@sur.cl").await;
        let norte = app.register("12345678-5", "admin@norte.cl").await;

        let mut workers = Vec::new();
        for token in [&sur, &norte] {
            let org = app.org(token).await;
            let (status, worker) = app
                .send(
                    Method::POST,
                    "/v1/workers",
                    Some(token),
                    Some(worker_body("11111111-1", "Camila", &org)),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
            workers.push(worker["id"].as_str().unwrap().to_string());
        }

        let (status, b) = app
            .upload(&norte, &workers[1], "cv", "cv.pdf", "NORTE")
            .await;
        assert_eq!(status, StatusCode::OK);
        let (status, a) = app.upload(&sur, &workers[0], "cv", "cv.pdf", "SUR").await;
        assert_eq!(status, StatusCode::OK);

        let a_path = a["documents"]["cv"].as_str().unwrap();
        let b_path = b["documents"]["cv"].as_str().unwrap();
        assert_ne!(a_path, b_path);
        assert_eq!(tokio::fs::read_to_string(a_path).await.unwrap(), "SUR");
        assert_eq!(tokio::fs::read_to_string(b_path).await.unwrap(), "NORTE");
    }

    #[tokio::test]
    async fn test_reupload_with_new_extension_removes_old_file() {
        let app = app().await;
        let token = app.register("76086428-5", "admin@sur.cl").await;
        let org = app.org(&token).await;
        let (_, worker) = app
            .send(
                Method::POST,
                "/v1/workers",
                Some(&token),
                Some(worker_body("11111111-1", "Camila", &org)),
            )
            .await;
        let worker_id = worker["id"].as_str().unwrap();

        let (_, first) = app.upload(&token, worker_id, "cv", "cv.pdf", "v1").await;
        let pdf = first["documents"]["cv"].as_str().unwrap().to_string();
        let (status, second) = app.upload(&token, worker_id, "cv", "cv.docx", "v2").await;
        assert_eq!(status, StatusCode::OK);
        let docx = second["documents"]["cv"].as_str().unwrap();

        assert!(docx.ends_with("11111111-1_cv.docx"));
        assert!(tokio::fs::metadata(&pdf).await.is_err());
        assert_eq!(tokio::fs::read_to_string(docx).await.unwrap(), "v2");
    }

    /// Create a user with `role` in the admin's company and log them in.
    async fn member(app: &TestApp, admin: &str, email: &str, role: &str) -> (String, String) {
        let (status, user) = app
            .send(
                Method::POST,
                "/v1/users",
                Some(admin),
                Some(json!({
                    "email": email,
                    "name": "Integrante",
                    "password": "clave12345",
                    "role": role,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", user);

        let (_, login) = app
            .send(
                Method::POST,
                "/v1/auth/login",
                None,
                Some(json!({ "email": email, "password": "clave12345" })),
            )
            .await;
        (
            user["id"].as_str().unwrap().to_string(),
            login["token"].as_str().unwrap().to_string(),
        )
    }

    #[tokio::test]
    async fn test_editor_changes_hr_records_only() {
        let app = app().await;
        let admin = app.register("76086428-5", "admin@sur.cl").await;
        let (_, editor) = member(&app, &admin, "editor@sur.cl", "editor").await;

        // HR records are open to editors.
        let org = app.org(&editor).await;
        let (status, worker) = app
            .send(
                Method::POST,
                "/v1/workers",
                Some(&editor),
                Some(worker_body("11111111-1", "Camila", &org)),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", worker);
        let uri = format!("/v1/workers/{}/deactivate", worker["id"].as_str().unwrap());
        let (status, _) = app.send(Method::PATCH, &uri, Some(&editor), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        // Reference tables, company data and users are admin-only.
        let (_, afps) = app.send(Method::GET, "/v1/afps", Some(&editor), None).await;
        let afp = format!("/v1/afps/{}", afps[0]["id"].as_str().unwrap());
        let named = json!({ "name": "AFP Nueva" });
        let attempts = [
            (Method::POST, "/v1/afps".to_string(), Some(named.clone())),
            (Method::PUT, afp.clone(), Some(named.clone())),
            (Method::DELETE, afp, None),
            (Method::POST, "/v1/isapres".to_string(), Some(named)),
            (
                Method::POST,
                "/v1/work-schedules".to_string(),
                Some(json!({ "name": "Part time", "weekly_hours": 20 })),
            ),
            (
                Method::POST,
                "/v1/contract-types".to_string(),
                Some(json!({ "name": "Reemplazo", "indefinite": false })),
            ),
            (
                Method::POST,
                "/v1/communes".to_string(),
                Some(json!({ "name": "Maipú", "city": "Santiago" })),
            ),
            (Method::PUT, "/v1/company".to_string(), Some(json!({ "name": "Otra" }))),
            (
                Method::POST,
                "/v1/users".to_string(),
                Some(json!({
                    "email": "x@sur.cl",
                    "name": "X",
                    "password": "clave12345",
                    "role": "viewer",
                })),
            ),
            (Method::DELETE, format!("/v1/users/{}", uuid::Uuid::new_v4()), None),
        ];
        for (method, uri, body) in attempts {
            let (status, _) = app.send(method.clone(), &uri, Some(&editor), body).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{} {}", method, uri);
        }

        let (status, _) = app
            .send(
                Method::POST,
                "/v1/afps",
                Some(&admin),
                Some(json!({ "name": "AFP Nueva" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_admin_deletes_users_but_not_self() {
        let app = app().await;
        let admin = app.register("76086428-5", "admin@sur.cl").await;
        let (viewer_id, _) = member(&app, &admin, "lector@sur.cl", "viewer").await;

        let (_, me) = app.send(Method::GET, "/v1/auth/me", Some(&admin), None).await;
        let own = format!("/v1/users/{}", me["id"].as_str().unwrap());
        let (status, body) = app.send(Method::DELETE, &own, Some(&admin), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");

        let uri = format!("/v1/users/{}", viewer_id);
        let (status, _) = app.send(Method::DELETE, &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = app.send(Method::DELETE, &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, users) = app.send(Method::GET, "/v1/users", Some(&admin), None).await;
        assert_eq!(users.as_array().unwrap().len(), 1);

        // The deleted user can no longer log in.
        let (status, _) = app
            .send(
                Method::POST,
                "/v1/auth/login",
                None,
                Some(json!({ "email": "lector@sur.cl", "password": "clave12345" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_position_in_use_cannot_move() {
        let app = app().await;
        let token = app.register("76086428-5", "admin@sur.cl").await;
        let org = app.org(&token).await;
        let worker = worker_body("11111111-1", "Camila", &org);
        let (_, created) = app
            .send(Method::POST, "/v1/workers", Some(&token), Some(worker.clone()))
            .await;

        let (_, bodega) = app
            .send(
                Method::POST,
                "/v1/departments",
                Some(&token),
                Some(json!({ "name": "Bodega" })),
            )
            .await;
        let position = format!("/v1/positions/{}", org.1);
        let (status, _) = app
            .send(
                Method::PUT,
                &position,
                Some(&token),
                Some(json!({ "department_id": bodega["id"], "name": "Conductor" })),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        // The worker still saves unchanged.
        let mut unchanged = worker;
        unchanged.as_object_mut().unwrap().remove("rut");
        let uri = format!("/v1/workers/{}", created["id"].as_str().unwrap());
        let (status, body) = app.send(Method::PUT, &uri, Some(&token), Some(unchanged)).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
    }

    #[tokio::test]
    async fn test_huge_page_number_is_empty_page() {
        let app = app().await;
        let token = app.register("76086428-5", "admin@sur.cl").await;

        let uri = format!("/v1/workers?page={}", i64::MAX);
        let (status, page) = app.send(Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["data"].as_array().unwrap().len(), 0);
    }
}

//! API request and response types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::{
    ContractDuration, GratificationKind, MaritalStatus, Relationship, Remuneration, User, UserRole,
};

// ==================== Auth ====================

/// Login request body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response with JWT token.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// JWT access token.
    pub token: String,
    pub user: User,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}

/// Sign-up of a new company and its first administrator.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub company_name: String,
    /// Company RUT, e.g. `76.086.428-5`.
    pub company_rut: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

// ==================== Company & users ====================

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCompanyRequest {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// A new console user in the caller's company.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub role: UserRole,
}

// ==================== Workers ====================

/// Query parameters for listing workers.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListWorkersQuery {
    /// 1-based page number.
    pub page: Option<i64>,
    /// Page size.
    pub limit: Option<i64>,
    /// Substring of first name, last names or RUT.
    pub filter: Option<String>,
}

/// Worker data as submitted by the registration form.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct WorkerRequest {
    /// Required on create. On update it may be omitted but not changed.
    #[serde(default)]
    pub rut: Option<String>,
    pub first_name: String,
    pub last_names: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub birth_date: NaiveDate,
    pub marital_status: MaritalStatus,
    #[serde(default)]
    pub children: i64,
    pub address: String,
    #[serde(default)]
    pub address_detail: Option<String>,
    #[serde(default)]
    pub commune_id: Option<Uuid>,
    pub city: String,
    pub department_id: Uuid,
    pub position_id: Uuid,
}

// ==================== Contracts ====================

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListContractsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Only contracts of this worker.
    pub worker_id: Option<Uuid>,
}

/// Contract data as submitted by the contract form.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ContractRequest {
    pub worker_id: Uuid,
    pub contract_type_id: Uuid,
    pub start_date: NaiveDate,
    /// Explicit last day. Mutually exclusive with `duration`.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Length of a fixed-term contract; the end date is derived from it.
    #[serde(default)]
    pub duration: Option<ContractDuration>,
    pub work_schedule_id: Uuid,
    pub department_id: Uuid,
    pub position_id: Uuid,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(flatten)]
    pub remuneration: Remuneration,
    pub gratification_kind: GratificationKind,
    #[serde(default)]
    pub gratification_amount: Option<i64>,
    #[serde(default)]
    pub afp_id: Option<Uuid>,
    #[serde(default)]
    pub isapre_id: Option<Uuid>,
}

// ==================== Dependents ====================

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListDependentsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub worker_id: Option<Uuid>,
}

/// Editable data of a family dependent.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DependentDetails {
    pub full_name: String,
    #[serde(default)]
    pub rut: Option<String>,
    pub birth_date: NaiveDate,
    pub relationship: Relationship,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDependentRequest {
    pub worker_id: Uuid,
    #[serde(flatten)]
    pub details: DependentDetails,
}

// ==================== Vacations ====================

#[derive(Debug, Deserialize, ToSchema)]
pub struct VacationRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Working days charged against the balance.
    pub days: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct BalanceQuery {
    /// Date to compute the balance on. Defaults to today.
    pub as_of: Option<NaiveDate>,
}

// ==================== Organization ====================

#[derive(Debug, Deserialize, ToSchema)]
pub struct DepartmentRequest {
    pub name: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListPositionsQuery {
    /// Department whose positions are listed. Required.
    pub department_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PositionRequest {
    pub department_id: Uuid,
    pub name: String,
}

// ==================== Reference tables ====================

/// Body for AFP and Isapre records.
#[derive(Debug, Deserialize, ToSchema)]
pub struct NamedRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct WorkScheduleRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub weekly_hours: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ContractTypeRequest {
    pub name: String,
    #[serde(default)]
    pub indefinite: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CommuneRequest {
    pub name: String,
    pub city: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListCommunesQuery {
    pub city: Option<String>,
}

// ==================== Health ====================

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    pub timestamp: String,
}

/// Trim a required text field.
pub(crate) fn clean(value: &str) -> String {
    value.trim().to_string()
}

/// Trim an optional text field, treating blank as absent.
pub(crate) fn clean_opt(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

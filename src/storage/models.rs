//! Database models for HR Core.
//!
//! These are the row types returned by SQLx queries. Ids and timestamps are
//! stored as TEXT (UUID / RFC 3339 / ISO dates) and parsed back here.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::{
    Afp, Commune, Company, Contract, ContractType, Department, FamilyDependent, Isapre, Position,
    Remuneration, User, VacationLeave, WorkSchedule, Worker, WorkerDocuments,
};
use crate::error::HrError;

pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, HrError> {
    Uuid::parse_str(s).map_err(|e| HrError::Internal(format!("Bad uuid '{}': {}", s, e)))
}

fn parse_opt_uuid(s: Option<String>) -> Result<Option<Uuid>, HrError> {
    s.as_deref().map(parse_uuid).transpose()
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, HrError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| HrError::Internal(e.to_string()))
}

fn parse_date(s: &str) -> Result<NaiveDate, HrError> {
    s.parse::<NaiveDate>()
        .map_err(|e| HrError::Internal(format!("Bad date '{}': {}", s, e)))
}

fn parse_enum<T: std::str::FromStr<Err = String>>(s: &str) -> Result<T, HrError> {
    s.parse().map_err(HrError::Internal)
}

/// Database row for companies table.
#[derive(Debug, Clone, FromRow)]
pub struct CompanyRow {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub rut: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<CompanyRow> for Company {
    type Error = HrError;

    fn try_from(row: CompanyRow) -> Result<Self, Self::Error> {
        Ok(Company {
            id: parse_uuid(&row.id)?,
            name: row.name,
            slug: row.slug,
            rut: row.rut,
            address: row.address,
            phone: row.phone,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

/// Database row for users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: String,
    pub company_id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub password_hash: String,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<UserRow> for User {
    type Error = HrError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: parse_uuid(&row.id)?,
            company_id: parse_uuid(&row.company_id)?,
            email: row.email,
            name: row.name,
            role: parse_enum(&row.role)?,
            password_hash: row.password_hash,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

/// Database row for departments table.
#[derive(Debug, Clone, FromRow)]
pub struct DepartmentRow {
    pub id: String,
    pub company_id: String,
    pub name: String,
    pub created_at: String,
}

impl TryFrom<DepartmentRow> for Department {
    type Error = HrError;

    fn try_from(row: DepartmentRow) -> Result<Self, Self::Error> {
        Ok(Department {
            id: parse_uuid(&row.id)?,
            company_id: parse_uuid(&row.company_id)?,
            name: row.name,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

/// Database row for positions table.
#[derive(Debug, Clone, FromRow)]
pub struct PositionRow {
    pub id: String,
    pub department_id: String,
    pub name: String,
    pub created_at: String,
}

impl TryFrom<PositionRow> for Position {
    type Error = HrError;

    fn try_from(row: PositionRow) -> Result<Self, Self::Error> {
        Ok(Position {
            id: parse_uuid(&row.id)?,
            department_id: parse_uuid(&row.department_id)?,
            name: row.name,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

/// Row shape shared by the afps and isapres tables.
#[derive(Debug, Clone, FromRow)]
pub struct NamedRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

impl TryFrom<NamedRow> for Afp {
    type Error = HrError;

    fn try_from(row: NamedRow) -> Result<Self, Self::Error> {
        Ok(Afp {
            id: parse_uuid(&row.id)?,
            name: row.name,
            description: row.description,
        })
    }
}

impl TryFrom<NamedRow> for Isapre {
    type Error = HrError;

    fn try_from(row: NamedRow) -> Result<Self, Self::Error> {
        Ok(Isapre {
            id: parse_uuid(&row.id)?,
            name: row.name,
            description: row.description,
        })
    }
}

/// Database row for work_schedules table.
#[derive(Debug, Clone, FromRow)]
pub struct WorkScheduleRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub weekly_hours: i64,
}

impl TryFrom<WorkScheduleRow> for WorkSchedule {
    type Error = HrError;

    fn try_from(row: WorkScheduleRow) -> Result<Self, Self::Error> {
        Ok(WorkSchedule {
            id: parse_uuid(&row.id)?,
            name: row.name,
            description: row.description,
            weekly_hours: row.weekly_hours,
        })
    }
}

/// Database row for contract_types table.
#[derive(Debug, Clone, FromRow)]
pub struct ContractTypeRow {
    pub id: String,
    pub name: String,
    pub indefinite: bool,
}

impl TryFrom<ContractTypeRow> for ContractType {
    type Error = HrError;

    fn try_from(row: ContractTypeRow) -> Result<Self, Self::Error> {
        Ok(ContractType {
            id: parse_uuid(&row.id)?,
            name: row.name,
            indefinite: row.indefinite,
        })
    }
}

/// Database row for communes table.
#[derive(Debug, Clone, FromRow)]
pub struct CommuneRow {
    pub id: String,
    pub name: String,
    pub city: String,
}

impl TryFrom<CommuneRow> for Commune {
    type Error = HrError;

    fn try_from(row: CommuneRow) -> Result<Self, Self::Error> {
        Ok(Commune {
            id: parse_uuid(&row.id)?,
            name: row.name,
            city: row.city,
        })
    }
}

/// Database row for workers table.
#[derive(Debug, Clone, FromRow)]
pub struct WorkerRow {
    pub id: String,
    pub company_id: String,
    pub rut: String,
    pub first_name: String,
    pub last_names: String,
    pub email: String,
    pub phone: Option<String>,
    pub birth_date: String,
    pub marital_status: String,
    pub children: i64,
    pub address: String,
    pub address_detail: Option<String>,
    pub commune_id: Option<String>,
    pub city: String,
    pub department_id: String,
    pub position_id: String,
    pub cv_path: Option<String>,
    pub background_certificate_path: Option<String>,
    pub afp_certificate_path: Option<String>,
    pub fun_form_path: Option<String>,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<WorkerRow> for Worker {
    type Error = HrError;

    fn try_from(row: WorkerRow) -> Result<Self, Self::Error> {
        Ok(Worker {
            id: parse_uuid(&row.id)?,
            company_id: parse_uuid(&row.company_id)?,
            rut: row.rut,
            first_name: row.first_name,
            last_names: row.last_names,
            email: row.email,
            phone: row.phone,
            birth_date: parse_date(&row.birth_date)?,
            marital_status: parse_enum(&row.marital_status)?,
            children: row.children,
            address: row.address,
            address_detail: row.address_detail,
            commune_id: parse_opt_uuid(row.commune_id)?,
            city: row.city,
            department_id: parse_uuid(&row.department_id)?,
            position_id: parse_uuid(&row.position_id)?,
            documents: WorkerDocuments {
                cv: row.cv_path,
                background_certificate: row.background_certificate_path,
                afp_certificate: row.afp_certificate_path,
                fun_form: row.fun_form_path,
            },
            active: row.active,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

/// Database row for contracts table.
#[derive(Debug, Clone, FromRow)]
pub struct ContractRow {
    pub id: String,
    pub worker_id: String,
    pub contract_type_id: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub work_schedule_id: String,
    pub department_id: String,
    pub position_id: String,
    pub job_description: Option<String>,
    pub base_salary: i64,
    pub meal_allowance: i64,
    pub transport_allowance: i64,
    pub other_bonuses: i64,
    pub gratification_kind: String,
    pub gratification_amount: Option<i64>,
    pub afp_id: Option<String>,
    pub isapre_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<ContractRow> for Contract {
    type Error = HrError;

    fn try_from(row: ContractRow) -> Result<Self, Self::Error> {
        Ok(Contract {
            id: parse_uuid(&row.id)?,
            worker_id: parse_uuid(&row.worker_id)?,
            contract_type_id: parse_uuid(&row.contract_type_id)?,
            start_date: parse_date(&row.start_date)?,
            end_date: row.end_date.as_deref().map(parse_date).transpose()?,
            work_schedule_id: parse_uuid(&row.work_schedule_id)?,
            department_id: parse_uuid(&row.department_id)?,
            position_id: parse_uuid(&row.position_id)?,
            job_description: row.job_description,
            remuneration: Remuneration {
                base_salary: row.base_salary,
                meal_allowance: row.meal_allowance,
                transport_allowance: row.transport_allowance,
                other_bonuses: row.other_bonuses,
            },
            gratification_kind: parse_enum(&row.gratification_kind)?,
            gratification_amount: row.gratification_amount,
            afp_id: parse_opt_uuid(row.afp_id)?,
            isapre_id: parse_opt_uuid(row.isapre_id)?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

/// Database row for family_dependents table.
#[derive(Debug, Clone, FromRow)]
pub struct DependentRow {
    pub id: String,
    pub worker_id: String,
    pub full_name: String,
    pub rut: Option<String>,
    pub birth_date: String,
    pub relationship: String,
    pub created_at: String,
}

impl TryFrom<DependentRow> for FamilyDependent {
    type Error = HrError;

    fn try_from(row: DependentRow) -> Result<Self, Self::Error> {
        Ok(FamilyDependent {
            id: parse_uuid(&row.id)?,
            worker_id: parse_uuid(&row.worker_id)?,
            full_name: row.full_name,
            rut: row.rut,
            birth_date: parse_date(&row.birth_date)?,
            relationship: parse_enum(&row.relationship)?,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

/// Database row for vacation_leaves table.
#[derive(Debug, Clone, FromRow)]
pub struct VacationLeaveRow {
    pub id: String,
    pub worker_id: String,
    pub start_date: String,
    pub end_date: String,
    pub days: i64,
    pub notes: Option<String>,
    pub created_at: String,
}

impl TryFrom<VacationLeaveRow> for VacationLeave {
    type Error = HrError;

    fn try_from(row: VacationLeaveRow) -> Result<Self, Self::Error> {
        Ok(VacationLeave {
            id: parse_uuid(&row.id)?,
            worker_id: parse_uuid(&row.worker_id)?,
            start_date: parse_date(&row.start_date)?,
            end_date: parse_date(&row.end_date)?,
            days: row.days,
            notes: row.notes,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

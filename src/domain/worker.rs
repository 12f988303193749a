//! Worker domain models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Marital status as recorded on the worker's file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MaritalStatus {
    Single,
    Married,
    Widowed,
    Separated,
    Divorced,
    CivilUnion,
}

impl std::fmt::Display for MaritalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MaritalStatus::Single => "single",
            MaritalStatus::Married => "married",
            MaritalStatus::Widowed => "widowed",
            MaritalStatus::Separated => "separated",
            MaritalStatus::Divorced => "divorced",
            MaritalStatus::CivilUnion => "civil_union",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for MaritalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(MaritalStatus::Single),
            "married" => Ok(MaritalStatus::Married),
            "widowed" => Ok(MaritalStatus::Widowed),
            "separated" => Ok(MaritalStatus::Separated),
            "divorced" => Ok(MaritalStatus::Divorced),
            "civil_union" => Ok(MaritalStatus::CivilUnion),
            _ => Err(format!("Unknown marital status: {}", s)),
        }
    }
}

/// Documents that can be attached to a worker's file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Curriculum vitae.
    Cv,
    /// Criminal background certificate.
    BackgroundCertificate,
    /// Pension fund affiliation certificate.
    AfpCertificate,
    /// Health insurer enrollment form (FUN).
    FunForm,
}

impl DocumentKind {
    /// Column holding the stored path for this document.
    pub fn column(&self) -> &'static str {
        match self {
            DocumentKind::Cv => "cv_path",
            DocumentKind::BackgroundCertificate => "background_certificate_path",
            DocumentKind::AfpCertificate => "afp_certificate_path",
            DocumentKind::FunForm => "fun_form_path",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DocumentKind::Cv => "cv",
            DocumentKind::BackgroundCertificate => "background_certificate",
            DocumentKind::AfpCertificate => "afp_certificate",
            DocumentKind::FunForm => "fun_form",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cv" => Ok(DocumentKind::Cv),
            "background_certificate" => Ok(DocumentKind::BackgroundCertificate),
            "afp_certificate" => Ok(DocumentKind::AfpCertificate),
            "fun_form" => Ok(DocumentKind::FunForm),
            _ => Err(format!("Unknown document kind: {}", s)),
        }
    }
}

/// Stored paths of a worker's attached documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WorkerDocuments {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cv: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_certificate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub afp_certificate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fun_form: Option<String>,
}

impl WorkerDocuments {
    /// Stored path of one document kind.
    pub fn get(&self, kind: DocumentKind) -> Option<&str> {
        match kind {
            DocumentKind::Cv => self.cv.as_deref(),
            DocumentKind::BackgroundCertificate => self.background_certificate.as_deref(),
            DocumentKind::AfpCertificate => self.afp_certificate.as_deref(),
            DocumentKind::FunForm => self.fun_form.as_deref(),
        }
    }
}

/// A worker employed by a company.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Worker {
    pub id: Uuid,
    pub company_id: Uuid,
    /// RUT in canonical form (`12345678-5`).
    pub rut: String,
    pub first_name: String,
    pub last_names: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub birth_date: NaiveDate,
    pub marital_status: MaritalStatus,
    pub children: i64,
    pub address: String,
    /// House, block or apartment number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commune_id: Option<Uuid>,
    pub city: String,
    pub department_id: Uuid,
    pub position_id: Uuid,
    pub documents: WorkerDocuments,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated worker attributes, shared by create and update.
#[derive(Debug, Clone)]
pub struct WorkerFields {
    pub first_name: String,
    pub last_names: String,
    pub email: String,
    pub phone: Option<String>,
    pub birth_date: NaiveDate,
    pub marital_status: MaritalStatus,
    pub children: i64,
    pub address: String,
    pub address_detail: Option<String>,
    pub commune_id: Option<Uuid>,
    pub city: String,
    pub department_id: Uuid,
    pub position_id: Uuid,
}

impl Worker {
    pub fn new(company_id: Uuid, rut: String, fields: WorkerFields) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            company_id,
            rut,
            first_name: fields.first_name,
            last_names: fields.last_names,
            email: fields.email,
            phone: fields.phone,
            birth_date: fields.birth_date,
            marital_status: fields.marital_status,
            children: fields.children,
            address: fields.address,
            address_detail: fields.address_detail,
            commune_id: fields.commune_id,
            city: fields.city,
            department_id: fields.department_id,
            position_id: fields.position_id,
            documents: WorkerDocuments::default(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Normalize a Chilean mobile number to `+569XXXXXXXX`.
///
/// Accepts `+56 9 1234 5678`, `56912345678`, `9 1234 5678` and similar.
pub fn normalize_mobile_phone(input: &str) -> Option<String> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let local = compact
        .strip_prefix("+56")
        .or_else(|| compact.strip_prefix("56"))
        .unwrap_or(&compact);

    if local.len() == 9 && local.starts_with('9') && local.chars().all(|c| c.is_ascii_digit()) {
        Some(format!("+56{}", local))
    } else {
        None
    }
}

/// Minimal shape check for an email address.
pub fn looks_like_email(input: &str) -> bool {
    match input.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !input.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

//! Departments and the positions inside them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// An organizational unit of a company.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Department {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Department {
    pub fn new(company_id: Uuid, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            company_id,
            name,
            created_at: Utc::now(),
        }
    }
}

/// A job title that exists within one department.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Position {
    pub id: Uuid,
    pub department_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Position {
    pub fn new(department_id: Uuid, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            department_id,
            name,
            created_at: Utc::now(),
        }
    }
}

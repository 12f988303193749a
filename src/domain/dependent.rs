//! Family dependents (cargas familiares) of a worker.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Relationship of the dependent to the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    Spouse,
    CivilPartner,
    Child,
    Parent,
    Other,
}

impl std::fmt::Display for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Relationship::Spouse => "spouse",
            Relationship::CivilPartner => "civil_partner",
            Relationship::Child => "child",
            Relationship::Parent => "parent",
            Relationship::Other => "other",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for Relationship {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spouse" => Ok(Relationship::Spouse),
            "civil_partner" => Ok(Relationship::CivilPartner),
            "child" => Ok(Relationship::Child),
            "parent" => Ok(Relationship::Parent),
            "other" => Ok(Relationship::Other),
            _ => Err(format!("Unknown relationship: {}", s)),
        }
    }
}

/// A person registered as a family dependent of a worker.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FamilyDependent {
    pub id: Uuid,
    pub worker_id: Uuid,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rut: Option<String>,
    pub birth_date: NaiveDate,
    pub relationship: Relationship,
    pub created_at: DateTime<Utc>,
}

impl FamilyDependent {
    pub fn new(
        worker_id: Uuid,
        full_name: String,
        rut: Option<String>,
        birth_date: NaiveDate,
        relationship: Relationship,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            worker_id,
            full_name,
            rut,
            birth_date,
            relationship,
            created_at: Utc::now(),
        }
    }
}

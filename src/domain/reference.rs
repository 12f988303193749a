//! Reference tables shared by every company.
//!
//! Pension funds, health insurers, work schedules, contract types and
//! communes are national catalogs, not tenant data.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A pension fund administrator (AFP).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Afp {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A private health insurer (Isapre).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Isapre {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A working-hours arrangement.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkSchedule {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub weekly_hours: i64,
}

/// Legal ceiling on ordinary weekly hours.
pub const MAX_WEEKLY_HOURS: i64 = 45;

/// A kind of employment contract.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContractType {
    pub id: Uuid,
    pub name: String,
    /// Indefinite contracts carry no end date.
    pub indefinite: bool,
}

/// A commune (comuna) and the city it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Commune {
    pub id: Uuid,
    pub name: String,
    pub city: String,
}

/// Rows inserted on schema init so a fresh database is usable.
pub mod seed {
    pub const AFPS: &[&str] = &[
        "Capital", "Cuprum", "Habitat", "Modelo", "PlanVital", "ProVida", "Uno",
    ];

    pub const ISAPRES: &[&str] = &[
        "Banmédica",
        "Colmena",
        "Consalud",
        "Cruz Blanca",
        "Esencial",
        "Nueva Masvida",
        "Vida Tres",
    ];

    /// Name and whether the type is indefinite.
    pub const CONTRACT_TYPES: &[(&str, bool)] = &[
        ("Plazo Fijo", false),
        ("Indefinido", true),
        ("Por Obra", false),
        ("Honorarios", false),
    ];

    /// Name, description and weekly hours.
    pub const WORK_SCHEDULES: &[(&str, &str, i64)] = &[
        ("Jornada Completa", "Lunes a viernes", 44),
        ("Jornada Parcial", "Hasta 30 horas semanales", 30),
    ];
}


//! Company domain models.
//!
//! A company is the tenant: every worker, department and user belongs to
//! exactly one, and API callers only ever see data of their own company.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// An employer registered in the system.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Company {
    /// Unique identifier.
    pub id: Uuid,
    /// Legal name.
    pub name: String,
    /// URL-friendly slug.
    pub slug: String,
    /// Company RUT, canonical form.
    pub rut: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    /// Create a new company.
    pub fn new(name: String, rut: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            slug: Self::slugify(&name),
            name,
            rut,
            address: None,
            phone: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Generate a slug from a name.
    pub fn slugify(name: &str) -> String {
        name.to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '-' })
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(Company::slugify("Constructora Andes"), "constructora-andes");
        assert_eq!(Company::slugify("Servicios  S.A.  2024"), "servicios-s-a-2024");
        assert_eq!(Company::slugify("Panadería Ñuñoa"), "panadería-ñuñoa");
    }

    #[test]
    fn test_new_company_derives_slug() {
        let company = Company::new("Transportes Sur".to_string(), "76086428-5".to_string());
        assert_eq!(company.slug, "transportes-sur");
        assert_eq!(company.created_at, company.updated_at);
    }
}

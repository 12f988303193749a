//! User domain types.
//!
//! Users are the people operating the HR console for one company.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::hash_password;

/// User role within its company.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Read-only access.
    #[default]
    Viewer,
    /// Can register and edit workers, contracts and dependents.
    Editor,
    /// Full access including users and reference tables.
    Admin,
}

impl UserRole {
    /// Check if this role may modify HR records.
    pub fn can_edit(&self) -> bool {
        matches!(self, UserRole::Editor | UserRole::Admin)
    }

    /// Check if this role has admin privileges.
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Viewer => write!(f, "viewer"),
            UserRole::Editor => write!(f, "editor"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "viewer" => Ok(UserRole::Viewer),
            "editor" => Ok(UserRole::Editor),
            "admin" => Ok(UserRole::Admin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// A console user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub company_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user, hashing the given password.
    pub fn new(company_id: Uuid, email: String, name: String, password: &str, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            company_id,
            email: email.trim().to_lowercase(),
            name,
            role,
            password_hash: hash_password(password),
            created_at: now,
            updated_at: now,
        }
    }

    /// Verify a password against the stored hash.
    pub fn verify_password(&self, password: &str) -> bool {
        crate::auth::verify_password(password, &self.password_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_round_trip() {
        for role in [UserRole::Viewer, UserRole::Editor, UserRole::Admin] {
            assert_eq!(role.to_string().parse::<UserRole>().unwrap(), role);
        }
        assert!("owner".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_role_permissions() {
        assert!(!UserRole::Viewer.can_edit());
        assert!(UserRole::Editor.can_edit());
        assert!(UserRole::Admin.can_edit());
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::Editor.is_admin());
    }

    #[test]
    fn test_password_verification() {
        let user = User::new(
            Uuid::new_v4(),
            " RRHH@Example.cl ".to_string(),
            "Ana".to_string(),
            "admin123",
            UserRole::Admin,
        );
        assert_eq!(user.email, "rrhh@example.cl");
        assert!(user.verify_password("admin123"));
        assert!(!user.verify_password("wrong"));
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new(Uuid::new_v4(), "a@b.cl".into(), "A".into(), "secret99", UserRole::Viewer);
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
    }
}

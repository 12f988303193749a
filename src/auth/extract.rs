//! Request extractors that resolve the caller and enforce roles.
//!
//! They read the [`Claims`] that [`require_jwt`](crate::auth::require_jwt)
//! placed in the request extensions, so they only work behind it.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::auth::Claims;
use crate::error::HrError;

fn claims_from(parts: &Parts) -> Result<Claims, HrError> {
    parts
        .extensions
        .get::<Claims>()
        .cloned()
        .ok_or_else(|| HrError::Unauthorized("Authentication required".to_string()))
}

/// Any authenticated user.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Claims);

impl CurrentUser {
    pub fn company_id(&self) -> Uuid {
        self.0.company_id
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = HrError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        claims_from(parts).map(CurrentUser)
    }
}

/// A user allowed to modify HR records (editor or admin).
#[derive(Debug, Clone)]
pub struct Editor(pub Claims);

impl Editor {
    pub fn company_id(&self) -> Uuid {
        self.0.company_id
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Editor {
    type Rejection = HrError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = claims_from(parts)?;
        if !claims.role.can_edit() {
            return Err(HrError::Forbidden(
                "Read-only users cannot modify records".to_string(),
            ));
        }
        Ok(Editor(claims))
    }
}

/// A company administrator.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

impl AdminUser {
    pub fn company_id(&self) -> Uuid {
        self.0.company_id
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AdminUser {
    type Rejection = HrError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = claims_from(parts)?;
        if !claims.role.is_admin() {
            return Err(HrError::Forbidden(
                "Administrator role required".to_string(),
            ));
        }
        Ok(AdminUser(claims))
    }
}

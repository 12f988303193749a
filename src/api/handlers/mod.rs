//! HTTP request handlers, one module per resource.

pub mod auth;
pub mod catalog;
pub mod company;
pub mod contracts;
pub mod dependents;
pub mod health;
pub mod organization;
pub mod vacations;
pub mod workers;

use uuid::Uuid;

use crate::domain::{PageRequest, Rut};
use crate::error::{HrError, HrResult, Validator};
use crate::storage::HrRepository;
use crate::AppState;

/// Normalize page/limit query values with the configured limits.
pub(crate) fn page_request(state: &AppState, page: Option<i64>, limit: Option<i64>) -> PageRequest {
    PageRequest::new(page, limit, state.listing)
}

/// Require at least `min_chars` characters after trimming.
pub(crate) fn check_text(v: &mut Validator, field: &str, value: &str, min_chars: usize) {
    let len = value.trim().chars().count();
    if len == 0 {
        v.push(field, "is required");
    } else if len < min_chars {
        v.push(field, format!("must have at least {} characters", min_chars));
    }
}

/// Parse a RUT, recording a field error on failure.
pub(crate) fn check_rut(v: &mut Validator, field: &str, value: &str) -> Option<Rut> {
    match Rut::parse(value) {
        Ok(rut) => Some(rut),
        Err(e) => {
            v.push(field, e.to_string());
            None
        }
    }
}

/// Check that a department and position exist in the company and that the
/// position belongs to the department.
pub(crate) async fn check_placement(
    v: &mut Validator,
    repo: &HrRepository,
    company_id: Uuid,
    department_id: Uuid,
    position_id: Uuid,
) -> HrResult<()> {
    let department = found(repo.get_department(company_id, department_id).await)?;
    if department.is_none() {
        v.push("department_id", "department does not exist");
    }

    match found(repo.get_position(company_id, position_id).await)? {
        None => {
            v.push("position_id", "position does not exist");
        }
        Some(position) if department.is_some() && position.department_id != department_id => {
            v.push("position_id", "position does not belong to the department");
        }
        Some(_) => {}
    }

    Ok(())
}

/// Turn a `NotFound` into `None`, passing other errors through.
pub(crate) fn found<T>(result: HrResult<T>) -> HrResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(HrError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

//! Vacation leave and accrual.
//!
//! Workers earn 15 vacation days per completed year of service, counted
//! from the start date of their current contract.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Days earned per completed year of service.
pub const DAYS_PER_YEAR: i64 = 15;

/// A block of vacation days taken by a worker.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VacationLeave {
    pub id: Uuid,
    pub worker_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Working days charged against the balance.
    pub days: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl VacationLeave {
    pub fn new(
        worker_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        days: i64,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            worker_id,
            start_date,
            end_date,
            days,
            notes,
            created_at: Utc::now(),
        }
    }
}

/// Vacation position of a worker on a given date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct VacationBalance {
    pub worker_id: Uuid,
    pub contract_start: NaiveDate,
    pub as_of: NaiveDate,
    pub years_of_service: i64,
    pub accrued_days: i64,
    pub consumed_days: i64,
    pub remaining_days: i64,
}

impl VacationBalance {
    pub fn compute(
        worker_id: Uuid,
        contract_start: NaiveDate,
        as_of: NaiveDate,
        consumed_days: i64,
    ) -> Self {
        let years_of_service = completed_years(contract_start, as_of);
        let accrued_days = years_of_service * DAYS_PER_YEAR;
        Self {
            worker_id,
            contract_start,
            as_of,
            years_of_service,
            accrued_days,
            consumed_days,
            remaining_days: (accrued_days - consumed_days).max(0),
        }
    }
}

/// Whole years between `start` and `as_of`, never negative.
///
/// A year only counts once its anniversary (month and day) has been reached.
pub fn completed_years(start: NaiveDate, as_of: NaiveDate) -> i64 {
    let mut years = i64::from(as_of.year() - start.year());
    if (as_of.month(), as_of.day()) < (start.month(), start.day()) {
        years -= 1;
    }
    years.max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_completed_years_respects_anniversary() {
        assert_eq!(completed_years(date(2020, 6, 15), date(2023, 6, 14)), 2);
        assert_eq!(completed_years(date(2020, 6, 15), date(2023, 6, 15)), 3);
        assert_eq!(completed_years(date(2020, 6, 15), date(2020, 12, 31)), 0);
    }

    #[test]
    fn test_future_start_is_zero() {
        assert_eq!(completed_years(date(2025, 1, 1), date(2024, 1, 1)), 0);
    }

    #[test]
    fn test_leap_day_start() {
        assert_eq!(completed_years(date(2020, 2, 29), date(2021, 2, 28)), 0);
        assert_eq!(completed_years(date(2020, 2, 29), date(2021, 3, 1)), 1);
    }

    #[test]
    fn test_balance_accrual_and_floor() {
        let id = Uuid::new_v4();
        let balance = VacationBalance::compute(id, date(2019, 3, 1), date(2024, 3, 1), 20);
        assert_eq!(balance.years_of_service, 5);
        assert_eq!(balance.accrued_days, 75);
        assert_eq!(balance.remaining_days, 55);

        let overdrawn = VacationBalance::compute(id, date(2023, 3, 1), date(2024, 3, 1), 30);
        assert_eq!(overdrawn.accrued_days, 15);
        assert_eq!(overdrawn.remaining_days, 0);
    }
}

//! Employment contract domain models.

use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// How the legal gratification is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GratificationKind {
    /// A fixed monthly amount agreed in the contract.
    Fixed,
    /// 25% of monthly remuneration, capped by law.
    #[serde(rename = "annual_25_percent")]
    Annual25Percent,
    /// Share of yearly profits.
    ProfitSharing,
}

impl GratificationKind {
    pub fn requires_amount(&self) -> bool {
        matches!(self, GratificationKind::Fixed)
    }
}

impl std::fmt::Display for GratificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GratificationKind::Fixed => write!(f, "fixed"),
            GratificationKind::Annual25Percent => write!(f, "annual_25_percent"),
            GratificationKind::ProfitSharing => write!(f, "profit_sharing"),
        }
    }
}

impl std::str::FromStr for GratificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(GratificationKind::Fixed),
            "annual_25_percent" => Ok(GratificationKind::Annual25Percent),
            "profit_sharing" => Ok(GratificationKind::ProfitSharing),
            _ => Err(format!("Unknown gratification kind: {}", s)),
        }
    }
}

/// Unit of a fixed-term contract duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DurationUnit {
    Days,
    Months,
}

/// Length of a fixed-term contract, used when no explicit end date is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ContractDuration {
    pub amount: u32,
    pub unit: DurationUnit,
}

impl ContractDuration {
    /// Last day covered by a contract of this length starting on `start`.
    ///
    /// A 30-day contract starting on the 1st ends on the 30th.
    pub fn end_date(&self, start: NaiveDate) -> Option<NaiveDate> {
        if self.amount == 0 {
            return None;
        }
        let after = match self.unit {
            DurationUnit::Days => start.checked_add_days(Days::new(u64::from(self.amount))),
            DurationUnit::Months => start.checked_add_months(Months::new(self.amount)),
        }?;
        after.pred_opt()
    }
}

/// Monthly remuneration agreed in a contract, in whole Chilean pesos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Remuneration {
    pub base_salary: i64,
    #[serde(default)]
    pub meal_allowance: i64,
    #[serde(default)]
    pub transport_allowance: i64,
    #[serde(default)]
    pub other_bonuses: i64,
}

impl Remuneration {
    /// Sum of salary and allowances.
    pub fn monthly_total(&self) -> i64 {
        self.base_salary + self.meal_allowance + self.transport_allowance + self.other_bonuses
    }

    /// Names of the components that are negative.
    pub fn negative_components(&self) -> Vec<&'static str> {
        [
            ("base_salary", self.base_salary),
            ("meal_allowance", self.meal_allowance),
            ("transport_allowance", self.transport_allowance),
            ("other_bonuses", self.other_bonuses),
        ]
        .into_iter()
        .filter(|(_, v)| *v < 0)
        .map(|(name, _)| name)
        .collect()
    }
}

/// An employment contract between a worker and the company.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Contract {
    pub id: Uuid,
    pub worker_id: Uuid,
    pub contract_type_id: Uuid,
    pub start_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub work_schedule_id: Uuid,
    pub department_id: Uuid,
    pub position_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
    pub remuneration: Remuneration,
    pub gratification_kind: GratificationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gratification_amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub afp_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isapre_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated contract attributes, shared by create and update.
#[derive(Debug, Clone)]
pub struct ContractTerms {
    pub contract_type_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub work_schedule_id: Uuid,
    pub department_id: Uuid,
    pub position_id: Uuid,
    pub job_description: Option<String>,
    pub remuneration: Remuneration,
    pub gratification_kind: GratificationKind,
    pub gratification_amount: Option<i64>,
    pub afp_id: Option<Uuid>,
    pub isapre_id: Option<Uuid>,
}

impl Contract {
    pub fn new(worker_id: Uuid, terms: ContractTerms) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            worker_id,
            contract_type_id: terms.contract_type_id,
            start_date: terms.start_date,
            end_date: terms.end_date,
            work_schedule_id: terms.work_schedule_id,
            department_id: terms.department_id,
            position_id: terms.position_id,
            job_description: terms.job_description,
            remuneration: terms.remuneration,
            gratification_kind: terms.gratification_kind,
            gratification_amount: terms.gratification_amount,
            afp_id: terms.afp_id,
            isapre_id: terms.isapre_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the contract covers `date`.
    pub fn is_in_force(&self, date: NaiveDate) -> bool {
        self.start_date <= date && self.end_date.map_or(true, |end| date <= end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_duration_in_days() {
        let d = ContractDuration {
            amount: 30,
            unit: DurationUnit::Days,
        };
        assert_eq!(d.end_date(date(2024, 4, 1)), Some(date(2024, 4, 30)));
    }

    #[test]
    fn test_duration_in_months_clamps_month_end() {
        let d = ContractDuration {
            amount: 3,
            unit: DurationUnit::Months,
        };
        assert_eq!(d.end_date(date(2024, 1, 1)), Some(date(2024, 3, 31)));
        assert_eq!(d.end_date(date(2023, 11, 30)), Some(date(2024, 2, 28)));
    }

    #[test]
    fn test_zero_duration_has_no_end() {
        let d = ContractDuration {
            amount: 0,
            unit: DurationUnit::Months,
        };
        assert_eq!(d.end_date(date(2024, 1, 1)), None);
    }

    #[test]
    fn test_remuneration_totals() {
        let r = Remuneration {
            base_salary: 650_000,
            meal_allowance: 40_000,
            transport_allowance: 30_000,
            other_bonuses: -1,
        };
        assert_eq!(r.monthly_total(), 719_999);
        assert_eq!(r.negative_components(), vec!["other_bonuses"]);
    }

    #[test]
    fn test_gratification_amount_rule() {
        assert!(GratificationKind::Fixed.requires_amount());
        assert!(!GratificationKind::ProfitSharing.requires_amount());
        assert_eq!(
            "annual_25_percent".parse::<GratificationKind>().unwrap(),
            GratificationKind::Annual25Percent
        );
    }
}

//! Employment contract persistence.

use uuid::Uuid;

use crate::domain::{Contract, ContractTerms, PageRequest};
use crate::error::{HrError, HrResult};
use crate::storage::models::ContractRow;
use crate::storage::repository::HrRepository;

impl HrRepository {
    /// Create a contract.
    pub async fn create_contract(&self, contract: &Contract) -> HrResult<()> {
        sqlx::query(
            r#"
            INSERT INTO contracts (
                id, worker_id, contract_type_id, start_date, end_date, work_schedule_id,
                department_id, position_id, job_description, base_salary, meal_allowance,
                transport_allowance, other_bonuses, gratification_kind, gratification_amount,
                afp_id, isapre_id, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(contract.id.to_string())
        .bind(contract.worker_id.to_string())
        .bind(contract.contract_type_id.to_string())
        .bind(contract.start_date.to_string())
        .bind(contract.end_date.map(|d| d.to_string()))
        .bind(contract.work_schedule_id.to_string())
        .bind(contract.department_id.to_string())
        .bind(contract.position_id.to_string())
        .bind(&contract.job_description)
        .bind(contract.remuneration.base_salary)
        .bind(contract.remuneration.meal_allowance)
        .bind(contract.remuneration.transport_allowance)
        .bind(contract.remuneration.other_bonuses)
        .bind(contract.gratification_kind.to_string())
        .bind(contract.gratification_amount)
        .bind(contract.afp_id.map(|id| id.to_string()))
        .bind(contract.isapre_id.map(|id| id.to_string()))
        .bind(contract.created_at.to_rfc3339())
        .bind(contract.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| HrError::on_constraint(e, "Contract references a missing record"))?;

        Ok(())
    }

    /// Get a contract whose worker belongs to the company.
    pub async fn get_contract(&self, company_id: Uuid, id: Uuid) -> HrResult<Contract> {
        let row: ContractRow = sqlx::query_as(
            r#"
            SELECT c.* FROM contracts c
            JOIN workers w ON w.id = c.worker_id
            WHERE c.id = ? AND w.company_id = ?
            "#,
        )
        .bind(id.to_string())
        .bind(company_id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| HrError::NotFound(format!("Contract {} not found", id)))?;

        row.try_into()
    }

    /// List contracts in a company, newest start date first.
    pub async fn list_contracts(
        &self,
        company_id: Uuid,
        worker_id: Option<Uuid>,
        page: PageRequest,
    ) -> HrResult<(Vec<Contract>, i64)> {
        let worker_id = worker_id.map(|id| id.to_string());

        let (total,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM contracts c
            JOIN workers w ON w.id = c.worker_id
            WHERE w.company_id = ? AND (? IS NULL OR c.worker_id = ?)
            "#,
        )
        .bind(company_id.to_string())
        .bind(&worker_id)
        .bind(&worker_id)
        .fetch_one(&self.pool)
        .await?;

        let rows: Vec<ContractRow> = sqlx::query_as(
            r#"
            SELECT c.* FROM contracts c
            JOIN workers w ON w.id = c.worker_id
            WHERE w.company_id = ? AND (? IS NULL OR c.worker_id = ?)
            ORDER BY c.start_date DESC, c.created_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(company_id.to_string())
        .bind(&worker_id)
        .bind(&worker_id)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let contracts = rows
            .into_iter()
            .map(|r| r.try_into())
            .collect::<HrResult<Vec<Contract>>>()?;

        Ok((contracts, total))
    }

    /// All contracts of one worker, newest start date first.
    pub async fn worker_contracts(&self, worker_id: Uuid) -> HrResult<Vec<Contract>> {
        let rows: Vec<ContractRow> = sqlx::query_as(
            "SELECT * FROM contracts WHERE worker_id = ? ORDER BY start_date DESC, created_at DESC",
        )
        .bind(worker_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    /// Replace a contract's terms. The worker cannot change.
    pub async fn update_contract(
        &self,
        company_id: Uuid,
        id: Uuid,
        terms: &ContractTerms,
    ) -> HrResult<Contract> {
        let result = sqlx::query(
            r#"
            UPDATE contracts SET
                contract_type_id = ?, start_date = ?, end_date = ?, work_schedule_id = ?,
                department_id = ?, position_id = ?, job_description = ?, base_salary = ?,
                meal_allowance = ?, transport_allowance = ?, other_bonuses = ?,
                gratification_kind = ?, gratification_amount = ?, afp_id = ?, isapre_id = ?,
                updated_at = ?
            WHERE id = ?
              AND worker_id IN (SELECT id FROM workers WHERE company_id = ?)
            "#,
        )
        .bind(terms.contract_type_id.to_string())
        .bind(terms.start_date.to_string())
        .bind(terms.end_date.map(|d| d.to_string()))
        .bind(terms.work_schedule_id.to_string())
        .bind(terms.department_id.to_string())
        .bind(terms.position_id.to_string())
        .bind(&terms.job_description)
        .bind(terms.remuneration.base_salary)
        .bind(terms.remuneration.meal_allowance)
        .bind(terms.remuneration.transport_allowance)
        .bind(terms.remuneration.other_bonuses)
        .bind(terms.gratification_kind.to_string())
        .bind(terms.gratification_amount)
        .bind(terms.afp_id.map(|id| id.to_string()))
        .bind(terms.isapre_id.map(|id| id.to_string()))
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(id.to_string())
        .bind(company_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| HrError::on_constraint(e, "Contract references a missing record"))?;

        if result.rows_affected() == 0 {
            return Err(HrError::NotFound(format!("Contract {} not found", id)));
        }

        self.get_contract(company_id, id).await
    }

    /// Delete a contract.
    pub async fn delete_contract(&self, company_id: Uuid, id: Uuid) -> HrResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM contracts
            WHERE id = ? AND worker_id IN (SELECT id FROM workers WHERE company_id = ?)
            "#,
        )
        .bind(id.to_string())
        .bind(company_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(HrError::NotFound(format!("Contract {} not found", id)));
        }

        Ok(())
    }
}

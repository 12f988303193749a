//! Worker records and the data hanging off them: family dependents and
//! vacation leave.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{
    DocumentKind, FamilyDependent, PageRequest, Relationship, VacationLeave, Worker, WorkerFields,
};
use crate::error::{HrError, HrResult};
use crate::storage::models::{DependentRow, VacationLeaveRow, WorkerRow};
use crate::storage::repository::{like_pattern, HrRepository};

impl HrRepository {
    // ==================== Workers ====================

    /// Create a worker.
    pub async fn create_worker(&self, worker: &Worker) -> HrResult<()> {
        sqlx::query(
            r#"
            INSERT INTO workers (
                id, company_id, rut, first_name, last_names, email, phone, birth_date,
                marital_status, children, address, address_detail, commune_id, city,
                department_id, position_id, search_name, active, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(worker.id.to_string())
        .bind(worker.company_id.to_string())
        .bind(&worker.rut)
        .bind(&worker.first_name)
        .bind(&worker.last_names)
        .bind(&worker.email)
        .bind(&worker.phone)
        .bind(worker.birth_date.to_string())
        .bind(worker.marital_status.to_string())
        .bind(worker.children)
        .bind(&worker.address)
        .bind(&worker.address_detail)
        .bind(worker.commune_id.map(|id| id.to_string()))
        .bind(&worker.city)
        .bind(worker.department_id.to_string())
        .bind(worker.position_id.to_string())
        .bind(search_name(&worker.first_name, &worker.last_names))
        .bind(worker.active)
        .bind(worker.created_at.to_rfc3339())
        .bind(worker.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            HrError::on_constraint(e, &format!("A worker with RUT {} already exists", worker.rut))
        })?;

        Ok(())
    }

    /// Get an active worker of a company.
    pub async fn get_worker(&self, company_id: Uuid, id: Uuid) -> HrResult<Worker> {
        let row: WorkerRow = sqlx::query_as(
            "SELECT * FROM workers WHERE id = ? AND company_id = ? AND active = 1",
        )
        .bind(id.to_string())
        .bind(company_id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| HrError::NotFound(format!("Worker {} not found", id)))?;

        row.try_into()
    }

    /// List active workers of a company, optionally filtered by name or RUT.
    ///
    /// Names are compared lowercased on both sides, since SQLite `LIKE` only
    /// folds ASCII. The filter matches the RUT with or without thousands
    /// separators.
    pub async fn list_workers(
        &self,
        company_id: Uuid,
        filter: Option<&str>,
        page: PageRequest,
    ) -> HrResult<(Vec<Worker>, i64)> {
        let filter = filter.map(str::trim).unwrap_or_default();
        let name_pattern = like_pattern(&filter.to_lowercase());
        let rut_pattern = like_pattern(&filter.replace('.', ""));

        let where_clause = r#"
            WHERE company_id = ? AND active = 1
              AND (? = ''
                   OR search_name LIKE ? ESCAPE '\'
                   OR rut LIKE ? ESCAPE '\')
        "#;

        let (total,): (i64,) =
            sqlx::query_as(&format!("SELECT COUNT(*) FROM workers {}", where_clause))
                .bind(company_id.to_string())
                .bind(filter)
                .bind(&name_pattern)
                .bind(&rut_pattern)
                .fetch_one(&self.pool)
                .await?;

        let rows: Vec<WorkerRow> = sqlx::query_as(&format!(
            "SELECT * FROM workers {} ORDER BY last_names, first_name LIMIT ? OFFSET ?",
            where_clause
        ))
        .bind(company_id.to_string())
        .bind(filter)
        .bind(&name_pattern)
        .bind(&rut_pattern)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let workers = rows
            .into_iter()
            .map(|r| r.try_into())
            .collect::<HrResult<Vec<Worker>>>()?;

        Ok((workers, total))
    }

    /// Update an active worker. The RUT is not editable.
    pub async fn update_worker(
        &self,
        company_id: Uuid,
        id: Uuid,
        fields: &WorkerFields,
    ) -> HrResult<Worker> {
        let result = sqlx::query(
            r#"
            UPDATE workers SET
                first_name = ?, last_names = ?, email = ?, phone = ?, birth_date = ?,
                marital_status = ?, children = ?, address = ?, address_detail = ?,
                commune_id = ?, city = ?, department_id = ?, position_id = ?, search_name = ?,
                updated_at = ?
            WHERE id = ? AND company_id = ? AND active = 1
            "#,
        )
        .bind(&fields.first_name)
        .bind(&fields.last_names)
        .bind(&fields.email)
        .bind(&fields.phone)
        .bind(fields.birth_date.to_string())
        .bind(fields.marital_status.to_string())
        .bind(fields.children)
        .bind(&fields.address)
        .bind(&fields.address_detail)
        .bind(fields.commune_id.map(|id| id.to_string()))
        .bind(&fields.city)
        .bind(fields.department_id.to_string())
        .bind(fields.position_id.to_string())
        .bind(search_name(&fields.first_name, &fields.last_names))
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(id.to_string())
        .bind(company_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| HrError::on_constraint(e, "Worker references a missing record"))?;

        if result.rows_affected() == 0 {
            return Err(HrError::NotFound(format!("Worker {} not found", id)));
        }

        self.get_worker(company_id, id).await
    }

    /// Soft-delete a worker. The row and its history stay in place.
    pub async fn deactivate_worker(&self, company_id: Uuid, id: Uuid) -> HrResult<()> {
        let result = sqlx::query(
            "UPDATE workers SET active = 0, updated_at = ? WHERE id = ? AND company_id = ? AND active = 1",
        )
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(id.to_string())
        .bind(company_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(HrError::NotFound(format!("Worker {} not found", id)));
        }

        Ok(())
    }

    /// Record where a worker's document was stored.
    pub async fn set_worker_document(
        &self,
        company_id: Uuid,
        id: Uuid,
        kind: DocumentKind,
        path: &str,
    ) -> HrResult<Worker> {
        // Column names come from a closed enum, never from input.
        let sql = format!(
            "UPDATE workers SET {} = ?, updated_at = ? WHERE id = ? AND company_id = ? AND active = 1",
            kind.column()
        );
        let result = sqlx::query(&sql)
            .bind(path)
            .bind(chrono::Utc::now().to_rfc3339())
            .bind(id.to_string())
            .bind(company_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(HrError::NotFound(format!("Worker {} not found", id)));
        }

        self.get_worker(company_id, id).await
    }

    // ==================== Family dependents ====================

    /// Create a family dependent.
    pub async fn create_dependent(&self, dependent: &FamilyDependent) -> HrResult<()> {
        sqlx::query(
            r#"
            INSERT INTO family_dependents (id, worker_id, full_name, rut, birth_date, relationship, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(dependent.id.to_string())
        .bind(dependent.worker_id.to_string())
        .bind(&dependent.full_name)
        .bind(&dependent.rut)
        .bind(dependent.birth_date.to_string())
        .bind(dependent.relationship.to_string())
        .bind(dependent.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get a dependent whose worker belongs to the company.
    pub async fn get_dependent(&self, company_id: Uuid, id: Uuid) -> HrResult<FamilyDependent> {
        let row: DependentRow = sqlx::query_as(
            r#"
            SELECT d.* FROM family_dependents d
            JOIN workers w ON w.id = d.worker_id
            WHERE d.id = ? AND w.company_id = ?
            "#,
        )
        .bind(id.to_string())
        .bind(company_id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| HrError::NotFound(format!("Dependent {} not found", id)))?;

        row.try_into()
    }

    /// List dependents in a company, optionally for one worker.
    pub async fn list_dependents(
        &self,
        company_id: Uuid,
        worker_id: Option<Uuid>,
        page: PageRequest,
    ) -> HrResult<(Vec<FamilyDependent>, i64)> {
        let worker_id = worker_id.map(|id| id.to_string());

        let (total,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM family_dependents d
            JOIN workers w ON w.id = d.worker_id
            WHERE w.company_id = ? AND (? IS NULL OR d.worker_id = ?)
            "#,
        )
        .bind(company_id.to_string())
        .bind(&worker_id)
        .bind(&worker_id)
        .fetch_one(&self.pool)
        .await?;

        let rows: Vec<DependentRow> = sqlx::query_as(
            r#"
            SELECT d.* FROM family_dependents d
            JOIN workers w ON w.id = d.worker_id
            WHERE w.company_id = ? AND (? IS NULL OR d.worker_id = ?)
            ORDER BY d.full_name
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

        let dependents = rows
            .into_iter()
            .map(|r| r.try_into())
            .collect::<HrResult<Vec<FamilyDependent>>>()?;

        Ok((dependents, total))
    }

    /// Update a dependent's data.
    pub async fn update_dependent(
        &self,
        company_id: Uuid,
        id: Uuid,
        full_name: &str,
        rut: Option<&str>,
        birth_date: NaiveDate,
        relationship: Relationship,
    ) -> HrResult<FamilyDependent> {
        let result = sqlx::query(
            r#"
            UPDATE family_dependents SET full_name = ?, rut = ?, birth_date = ?, relationship = ?
            WHERE id = ?
              AND worker_id IN (SELECT id FROM workers WHERE company_id = ?)
            "#,
        )
        .bind(full_name)
        .bind(rut)
        .bind(birth_date.to_string())
        .bind(relationship.to_string())
        .bind(id.to_string())
        .bind(company_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(HrError::NotFound(format!("Dependent {} not found", id)));
        }

        self.get_dependent(company_id, id).await
    }

    /// Delete a dependent.
    pub async fn delete_dependent(&self, company_id: Uuid, id: Uuid) -> HrResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM family_dependents
            WHERE id = ? AND worker_id IN (SELECT id FROM workers WHERE company_id = ?)
            "#,
        )
        .bind(id.to_string())
        .bind(company_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(HrError::NotFound(format!("Dependent {} not found", id)));
        }

        Ok(())
    }

    // ==================== Vacations ====================

    /// Record vacation days taken by a worker.
    pub async fn create_vacation_leave(&self, leave: &VacationLeave) -> HrResult<()> {
        sqlx::query(
            r#"
            INSERT INTO vacation_leaves (id, worker_id, start_date, end_date, days, notes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(leave.id.to_string())
        .bind(leave.worker_id.to_string())
        .bind(leave.start_date.to_string())
        .bind(leave.end_date.to_string())
        .bind(leave.days)
        .bind(&leave.notes)
        .bind(leave.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// List a worker's vacation leave, most recent first.
    pub async fn list_vacation_leaves(&self, worker_id: Uuid) -> HrResult<Vec<VacationLeave>> {
        let rows: Vec<VacationLeaveRow> = sqlx::query_as(
            "SELECT * FROM vacation_leaves WHERE worker_id = ? ORDER BY start_date DESC",
        )
        .bind(worker_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    /// Days of leave taken since `since` (inclusive).
    pub async fn consumed_vacation_days(&self, worker_id: Uuid, since: NaiveDate) -> HrResult<i64> {
        let (days,): (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(days), 0) FROM vacation_leaves WHERE worker_id = ? AND start_date >= ?",
        )
        .bind(worker_id.to_string())
        .bind(since.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(days)
    }
}

/// Lowercased full name used by the worker filter.
fn search_name(first_name: &str, last_names: &str) -> String {
    format!("{} {}", first_name, last_names).to_lowercase()
}

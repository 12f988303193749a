//! Departments, positions and the shared reference tables.

use uuid::Uuid;

use crate::domain::{Afp, Commune, ContractType, Department, Isapre, Position, WorkSchedule};
use crate::error::{HrError, HrResult};
use crate::storage::models::{
    CommuneRow, ContractTypeRow, DepartmentRow, NamedRow, PositionRow, WorkScheduleRow,
};
use crate::storage::repository::HrRepository;

/// The two reference tables that only carry a name and a description.
#[derive(Debug, Clone, Copy)]
enum NamedTable {
    Afps,
    Isapres,
}

impl NamedTable {
    fn table(self) -> &'static str {
        match self {
            NamedTable::Afps => "afps",
            NamedTable::Isapres => "isapres",
        }
    }

    fn label(self) -> &'static str {
        match self {
            NamedTable::Afps => "AFP",
            NamedTable::Isapres => "Isapre",
        }
    }
}

impl HrRepository {
    // ==================== Departments ====================

    /// Create a department.
    pub async fn create_department(&self, department: &Department) -> HrResult<()> {
        sqlx::query("INSERT INTO departments (id, company_id, name, created_at) VALUES (?, ?, ?, ?)")
            .bind(department.id.to_string())
            .bind(department.company_id.to_string())
            .bind(&department.name)
            .bind(department.created_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                HrError::on_constraint(e, &format!("Department '{}' already exists", department.name))
            })?;

        Ok(())
    }

    /// Get a department of a company.
    pub async fn get_department(&self, company_id: Uuid, id: Uuid) -> HrResult<Department> {
        let row: DepartmentRow =
            sqlx::query_as("SELECT * FROM departments WHERE id = ? AND company_id = ?")
                .bind(id.to_string())
                .bind(company_id.to_string())
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| HrError::NotFound(format!("Department {} not found", id)))?;

        row.try_into()
    }

    /// List the departments of a company by name.
    pub async fn list_departments(&self, company_id: Uuid) -> HrResult<Vec<Department>> {
        let rows: Vec<DepartmentRow> =
            sqlx::query_as("SELECT * FROM departments WHERE company_id = ? ORDER BY name")
                .bind(company_id.to_string())
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    /// Rename a department.
    pub async fn update_department(
        &self,
        company_id: Uuid,
        id: Uuid,
        name: &str,
    ) -> HrResult<Department> {
        let result = sqlx::query("UPDATE departments SET name = ? WHERE id = ? AND company_id = ?")
            .bind(name)
            .bind(id.to_string())
            .bind(company_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| HrError::on_constraint(e, &format!("Department '{}' already exists", name)))?;

        if result.rows_affected() == 0 {
            return Err(HrError::NotFound(format!("Department {} not found", id)));
        }

        self.get_department(company_id, id).await
    }

    /// Delete a department. Fails while positions, workers or contracts
    /// still point at it.
    pub async fn delete_department(&self, company_id: Uuid, id: Uuid) -> HrResult<()> {
        let result = sqlx::query("DELETE FROM departments WHERE id = ? AND company_id = ?")
            .bind(id.to_string())
            .bind(company_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| HrError::on_constraint(e, "Department is still in use"))?;

        if result.rows_affected() == 0 {
            return Err(HrError::NotFound(format!("Department {} not found", id)));
        }

        Ok(())
    }

    // ==================== Positions ====================

    /// Create a position.
    pub async fn create_position(&self, position: &Position) -> HrResult<()> {
        sqlx::query("INSERT INTO positions (id, department_id, name, created_at) VALUES (?, ?, ?, ?)")
            .bind(position.id.to_string())
            .bind(position.department_id.to_string())
            .bind(&position.name)
            .bind(position.created_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                HrError::on_constraint(
                    e,
                    &format!("Position '{}' already exists in this department", position.name),
                )
            })?;

        Ok(())
    }

    /// Get a position whose department belongs to the company.
    pub async fn get_position(&self, company_id: Uuid, id: Uuid) -> HrResult<Position> {
        let row: PositionRow = sqlx::query_as(
            r#"
            SELECT p.* FROM positions p
            JOIN departments d ON d.id = p.department_id
            WHERE p.id = ? AND d.company_id = ?
            "#,
        )
        .bind(id.to_string())
        .bind(company_id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| HrError::NotFound(format!("Position {} not found", id)))?;

        row.try_into()
    }

    /// List the positions of a department by name.
    pub async fn list_positions(&self, department_id: Uuid) -> HrResult<Vec<Position>> {
        let rows: Vec<PositionRow> =
            sqlx::query_as("SELECT * FROM positions WHERE department_id = ? ORDER BY name")
                .bind(department_id.to_string())
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    /// Rename a position or move it to another department.
    ///
    /// A position still held by workers or contracts keeps its department.
    pub async fn update_position(
        &self,
        company_id: Uuid,
        id: Uuid,
        department_id: Uuid,
        name: &str,
    ) -> HrResult<Position> {
        let current = self.get_position(company_id, id).await?;
        if current.department_id != department_id {
            let (in_use,): (i64,) = sqlx::query_as(
                r#"
                SELECT (SELECT COUNT(*) FROM workers WHERE position_id = ?)
                     + (SELECT COUNT(*) FROM contracts WHERE position_id = ?)
                "#,
            )
            .bind(id.to_string())
            .bind(id.to_string())
            .fetch_one(&self.pool)
            .await?;

            if in_use > 0 {
                return Err(HrError::Conflict(format!(
                    "Position {} is in use and cannot change department",
                    id
                )));
            }
        }

        let result = sqlx::query(
            r#"
            UPDATE positions SET department_id = ?, name = ?
            WHERE id = ?
              AND department_id IN (SELECT id FROM departments WHERE company_id = ?)
            "#,
        )
        .bind(department_id.to_string())
        .bind(name)
        .bind(id.to_string())
        .bind(company_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            HrError::on_constraint(e, &format!("Position '{}' already exists in this department", name))
        })?;

        if result.rows_affected() == 0 {
            return Err(HrError::NotFound(format!("Position {} not found", id)));
        }

        self.get_position(company_id, id).await
    }

    /// Delete a position. Fails while workers or contracts point at it.
    pub async fn delete_position(&self, company_id: Uuid, id: Uuid) -> HrResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM positions
            WHERE id = ? AND department_id IN (SELECT id FROM departments WHERE company_id = ?)
            "#,
        )
        .bind(id.to_string())
        .bind(company_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| HrError::on_constraint(e, "Position is still in use"))?;

        if result.rows_affected() == 0 {
            return Err(HrError::NotFound(format!("Position {} not found", id)));
        }

        Ok(())
    }

    // ==================== AFP / Isapre ====================

    async fn insert_named(
        &self,
        table: NamedTable,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> HrResult<()> {
        sqlx::query(&format!(
            "INSERT INTO {} (id, name, description) VALUES (?, ?, ?)",
            table.table()
        ))
        .bind(id.to_string())
        .bind(name)
        .bind(description)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            HrError::on_constraint(e, &format!("{} '{}' already exists", table.label(), name))
        })?;

        Ok(())
    }

    async fn get_named(&self, table: NamedTable, id: Uuid) -> HrResult<NamedRow> {
        sqlx::query_as(&format!("SELECT * FROM {} WHERE id = ?", table.table()))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| HrError::NotFound(format!("{} {} not found", table.label(), id)))
    }

    async fn list_named(&self, table: NamedTable) -> HrResult<Vec<NamedRow>> {
        let rows: Vec<NamedRow> =
            sqlx::query_as(&format!("SELECT * FROM {} ORDER BY name", table.table()))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn update_named(
        &self,
        table: NamedTable,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> HrResult<NamedRow> {
        let result = sqlx::query(&format!(
            "UPDATE {} SET name = ?, description = ? WHERE id = ?",
            table.table()
        ))
        .bind(name)
        .bind(description)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            HrError::on_constraint(e, &format!("{} '{}' already exists", table.label(), name))
        })?;

        if result.rows_affected() == 0 {
            return Err(HrError::NotFound(format!("{} {} not found", table.label(), id)));
        }

        self.get_named(table, id).await
    }

    async fn delete_named(&self, table: NamedTable, id: Uuid) -> HrResult<()> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", table.table()))
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                HrError::on_constraint(e, &format!("{} is referenced by contracts", table.label()))
            })?;

        if result.rows_affected() == 0 {
            return Err(HrError::NotFound(format!("{} {} not found", table.label(), id)));
        }

        Ok(())
    }

    /// Create an AFP.
    pub async fn create_afp(&self, afp: &Afp) -> HrResult<()> {
        self.insert_named(NamedTable::Afps, afp.id, &afp.name, afp.description.as_deref())
            .await
    }

    /// Get an AFP by ID.
    pub async fn get_afp(&self, id: Uuid) -> HrResult<Afp> {
        self.get_named(NamedTable::Afps, id).await?.try_into()
    }

    /// List AFPs by name.
    pub async fn list_afps(&self) -> HrResult<Vec<Afp>> {
        self.list_named(NamedTable::Afps)
            .await?
            .into_iter()
            .map(|r| r.try_into())
            .collect()
    }

    /// Update an AFP.
    pub async fn update_afp(&self, id: Uuid, name: &str, description: Option<&str>) -> HrResult<Afp> {
        self.update_named(NamedTable::Afps, id, name, description)
            .await?
            .try_into()
    }

    /// Delete an AFP.
    pub async fn delete_afp(&self, id: Uuid) -> HrResult<()> {
        self.delete_named(NamedTable::Afps, id).await
    }

    /// Create an Isapre.
    pub async fn create_isapre(&self, isapre: &Isapre) -> HrResult<()> {
        self.insert_named(NamedTable::Isapres, isapre.id, &isapre.name, isapre.description.as_deref())
            .await
    }

    /// Get an Isapre by ID.
    pub async fn get_isapre(&self, id: Uuid) -> HrResult<Isapre> {
        self.get_named(NamedTable::Isapres, id).await?.try_into()
    }

    /// List Isapres by name.
    pub async fn list_isapres(&self) -> HrResult<Vec<Isapre>> {
        self.list_named(NamedTable::Isapres)
            .await?
            .into_iter()
            .map(|r| r.try_into())
            .collect()
    }

    /// Update an Isapre.
    pub async fn update_isapre(
        &self,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> HrResult<Isapre> {
        self.update_named(NamedTable::Isapres, id, name, description)
            .await?
            .try_into()
    }

    /// Delete an Isapre.
    pub async fn delete_isapre(&self, id: Uuid) -> HrResult<()> {
        self.delete_named(NamedTable::Isapres, id).await
    }

    // ==================== Work schedules ====================

    /// Create a work schedule.
    pub async fn create_work_schedule(&self, schedule: &WorkSchedule) -> HrResult<()> {
        sqlx::query(
            "INSERT INTO work_schedules (id, name, description, weekly_hours) VALUES (?, ?, ?, ?)",
        )
        .bind(schedule.id.to_string())
        .bind(&schedule.name)
        .bind(&schedule.description)
        .bind(schedule.weekly_hours)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            HrError::on_constraint(e, &format!("Work schedule '{}' already exists", schedule.name))
        })?;

        Ok(())
    }

    /// Get a work schedule by ID.
    pub async fn get_work_schedule(&self, id: Uuid) -> HrResult<WorkSchedule> {
        let row: WorkScheduleRow = sqlx::query_as("SELECT * FROM work_schedules WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| HrError::NotFound(format!("Work schedule {} not found", id)))?;

        row.try_into()
    }

    /// List work schedules by name.
    pub async fn list_work_schedules(&self) -> HrResult<Vec<WorkSchedule>> {
        let rows: Vec<WorkScheduleRow> =
            sqlx::query_as("SELECT * FROM work_schedules ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    /// Update a work schedule.
    pub async fn update_work_schedule(&self, schedule: &WorkSchedule) -> HrResult<WorkSchedule> {
        let result = sqlx::query(
            "UPDATE work_schedules SET name = ?, description = ?, weekly_hours = ? WHERE id = ?",
        )
        .bind(&schedule.name)
        .bind(&schedule.description)
        .bind(schedule.weekly_hours)
        .bind(schedule.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            HrError::on_constraint(e, &format!("Work schedule '{}' already exists", schedule.name))
        })?;

        if result.rows_affected() == 0 {
            return Err(HrError::NotFound(format!("Work schedule {} not found", schedule.id)));
        }

        self.get_work_schedule(schedule.id).await
    }

    /// Delete a work schedule.
    pub async fn delete_work_schedule(&self, id: Uuid) -> HrResult<()> {
        let result = sqlx::query("DELETE FROM work_schedules WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| HrError::on_constraint(e, "Work schedule is referenced by contracts"))?;

        if result.rows_affected() == 0 {
            return Err(HrError::NotFound(format!("Work schedule {} not found", id)));
        }

        Ok(())
    }

    // ==================== Contract types ====================

    /// Create a contract type.
    pub async fn create_contract_type(&self, contract_type: &ContractType) -> HrResult<()> {
        sqlx::query("INSERT INTO contract_types (id, name, indefinite) VALUES (?, ?, ?)")
            .bind(contract_type.id.to_string())
            .bind(&contract_type.name)
            .bind(contract_type.indefinite)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                HrError::on_constraint(
                    e,
                    &format!("Contract type '{}' already exists", contract_type.name),
                )
            })?;

        Ok(())
    }

    /// Get a contract type by ID.
    pub async fn get_contract_type(&self, id: Uuid) -> HrResult<ContractType> {
        let row: ContractTypeRow = sqlx::query_as("SELECT * FROM contract_types WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| HrError::NotFound(format!("Contract type {} not found", id)))?;

        row.try_into()
    }

    /// List contract types by name.
    pub async fn list_contract_types(&self) -> HrResult<Vec<ContractType>> {
        let rows: Vec<ContractTypeRow> =
            sqlx::query_as("SELECT * FROM contract_types ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    // ==================== Communes ====================

    /// Create a commune.
    pub async fn create_commune(&self, commune: &Commune) -> HrResult<()> {
        sqlx::query("INSERT INTO communes (id, name, city) VALUES (?, ?, ?)")
            .bind(commune.id.to_string())
            .bind(&commune.name)
            .bind(&commune.city)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                HrError::on_constraint(
                    e,
                    &format!("Commune '{}' already exists in {}", commune.name, commune.city),
                )
            })?;

        Ok(())
    }

    /// Get a commune by ID.
    pub async fn get_commune(&self, id: Uuid) -> HrResult<Commune> {
        let row: CommuneRow = sqlx::query_as("SELECT * FROM communes WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| HrError::NotFound(format!("Commune {} not found", id)))?;

        row.try_into()
    }

    /// List communes by name, optionally of one city (case-insensitive).
    pub async fn list_communes(&self, city: Option<&str>) -> HrResult<Vec<Commune>> {
        let rows: Vec<CommuneRow> = sqlx::query_as(
            "SELECT * FROM communes WHERE (? IS NULL OR city = ? COLLATE NOCASE) ORDER BY name",
        )
        .bind(city)
        .bind(city)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }
}

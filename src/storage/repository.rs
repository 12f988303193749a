//! Repository layer for database operations.
//!
//! Schema, tenants and console users live here. Worker, contract and
//! catalog queries are split into sibling modules as further `impl` blocks.

use uuid::Uuid;

use sqlx::sqlite::SqlitePool;

use crate::domain::{seed, Company, User};
use crate::error::{HrError, HrResult};
use crate::storage::models::{CompanyRow, UserRow};

/// Repository for all HR database operations.
#[derive(Clone)]
pub struct HrRepository {
    pub(crate) pool: SqlitePool,
}

impl HrRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check the database answers a trivial query.
    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Initialize the database schema and seed the reference tables.
    pub async fn init_schema(&self) -> HrResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS companies (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                slug TEXT NOT NULL,
                rut TEXT NOT NULL UNIQUE,
                address TEXT,
                phone TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                company_id TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'viewer',
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (company_id) REFERENCES companies(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_users_company_id ON users(company_id);
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Organization
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS departments (
                id TEXT PRIMARY KEY,
                company_id TEXT NOT NULL,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (company_id) REFERENCES companies(id) ON DELETE CASCADE,
                UNIQUE(company_id, name)
            );

            CREATE TABLE IF NOT EXISTS positions (
                id TEXT PRIMARY KEY,
                department_id TEXT NOT NULL,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (department_id) REFERENCES departments(id),
                UNIQUE(department_id, name)
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Reference tables
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS afps (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                description TEXT
            );

            CREATE TABLE IF NOT EXISTS isapres (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                description TEXT
            );

            CREATE TABLE IF NOT EXISTS work_schedules (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                description TEXT,
                weekly_hours INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS contract_types (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                indefinite INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS communes (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                city TEXT NOT NULL,
                UNIQUE(name, city)
            );

            CREATE INDEX IF NOT EXISTS idx_communes_city ON communes(city);
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS workers (
                id TEXT PRIMARY KEY,
                company_id TEXT NOT NULL,
                rut TEXT NOT NULL,
                first_name TEXT NOT NULL,
                last_names TEXT NOT NULL,
                email TEXT NOT NULL,
                phone TEXT,
                birth_date TEXT NOT NULL,
                marital_status TEXT NOT NULL,
                children INTEGER NOT NULL DEFAULT 0,
                address TEXT NOT NULL,
                address_detail TEXT,
                commune_id TEXT,
                city TEXT NOT NULL,
                department_id TEXT NOT NULL,
                position_id TEXT NOT NULL,
                cv_path TEXT,
                background_certificate_path TEXT,
                afp_certificate_path TEXT,
                fun_form_path TEXT,
                search_name TEXT NOT NULL DEFAULT '',
                active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (company_id) REFERENCES companies(id) ON DELETE CASCADE,
                FOREIGN KEY (commune_id) REFERENCES communes(id),
                FOREIGN KEY (department_id) REFERENCES departments(id),
                FOREIGN KEY (position_id) REFERENCES positions(id),
                UNIQUE(company_id, rut)
            );

            CREATE INDEX IF NOT EXISTS idx_workers_company_active ON workers(company_id, active);
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS contracts (
                id TEXT PRIMARY KEY,
                worker_id TEXT NOT NULL,
                contract_type_id TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT,
                work_schedule_id TEXT NOT NULL,
                department_id TEXT NOT NULL,
                position_id TEXT NOT NULL,
                job_description TEXT,
                base_salary INTEGER NOT NULL,
                meal_allowance INTEGER NOT NULL DEFAULT 0,
                transport_allowance INTEGER NOT NULL DEFAULT 0,
                other_bonuses INTEGER NOT NULL DEFAULT 0,
                gratification_kind TEXT NOT NULL,
                gratification_amount INTEGER,
                afp_id TEXT,
                isapre_id TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (worker_id) REFERENCES workers(id),
                FOREIGN KEY (contract_type_id) REFERENCES contract_types(id),
                FOREIGN KEY (work_schedule_id) REFERENCES work_schedules(id),
                FOREIGN KEY (department_id) REFERENCES departments(id),
                FOREIGN KEY (position_id) REFERENCES positions(id),
                FOREIGN KEY (afp_id) REFERENCES afps(id),
                FOREIGN KEY (isapre_id) REFERENCES isapres(id)
            );

            CREATE INDEX IF NOT EXISTS idx_contracts_worker_id ON contracts(worker_id);

            CREATE TABLE IF NOT EXISTS family_dependents (
                id TEXT PRIMARY KEY,
                worker_id TEXT NOT NULL,
                full_name TEXT NOT NULL,
                rut TEXT,
                birth_date TEXT NOT NULL,
                relationship TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (worker_id) REFERENCES workers(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_dependents_worker_id ON family_dependents(worker_id);

            CREATE TABLE IF NOT EXISTS vacation_leaves (
                id TEXT PRIMARY KEY,
                worker_id TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                days INTEGER NOT NULL,
                notes TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (worker_id) REFERENCES workers(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_vacations_worker_id ON vacation_leaves(worker_id);
            "#,
        )
        .execute(&self.pool)
        .await?;

        self.seed_reference_tables().await
    }

    /// Insert the national catalogs. Names are unique, so re-running is a no-op.
    async fn seed_reference_tables(&self) -> HrResult<()> {
        for name in seed::AFPS {
            sqlx::query("INSERT OR IGNORE INTO afps (id, name) VALUES (?, ?)")
                .bind(Uuid::new_v4().to_string())
                .bind(*name)
                .execute(&self.pool)
                .await?;
        }

        for name in seed::ISAPRES {
            sqlx::query("INSERT OR IGNORE INTO isapres (id, name) VALUES (?, ?)")
                .bind(Uuid::new_v4().to_string())
                .bind(*name)
                .execute(&self.pool)
                .await?;
        }

        for (name, indefinite) in seed::CONTRACT_TYPES {
            sqlx::query("INSERT OR IGNORE INTO contract_types (id, name, indefinite) VALUES (?, ?, ?)")
                .bind(Uuid::new_v4().to_string())
                .bind(*name)
                .bind(*indefinite)
                .execute(&self.pool)
                .await?;
        }

        for (name, description, hours) in seed::WORK_SCHEDULES {
            sqlx::query(
                "INSERT OR IGNORE INTO work_schedules (id, name, description, weekly_hours) VALUES (?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(*name)
            .bind(*description)
            .bind(*hours)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    // ==================== Companies ====================

    /// Register a company together with its first administrator.
    pub async fn register_company(&self, company: &Company, admin: &User) -> HrResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO companies (id, name, slug, rut, address, phone, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(company.id.to_string())
        .bind(&company.name)
        .bind(&company.slug)
        .bind(&company.rut)
        .bind(&company.address)
        .bind(&company.phone)
        .bind(company.created_at.to_rfc3339())
        .bind(company.updated_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| HrError::on_constraint(e, "A company with that RUT is already registered"))?;

        insert_user(&mut *tx, admin).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Get a company by ID.
    pub async fn get_company(&self, id: Uuid) -> HrResult<Company> {
        let row: CompanyRow = sqlx::query_as("SELECT * FROM companies WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| HrError::NotFound(format!("Company {} not found", id)))?;

        row.try_into()
    }

    /// Update a company's contact data. The slug follows the name.
    pub async fn update_company(
        &self,
        id: Uuid,
        name: &str,
        address: Option<&str>,
        phone: Option<&str>,
    ) -> HrResult<Company> {
        let result = sqlx::query(
            r#"
            UPDATE companies SET name = ?, slug = ?, address = ?, phone = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(name)
        .bind(Company::slugify(name))
        .bind(address)
        .bind(phone)
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(HrError::NotFound(format!("Company {} not found", id)));
        }

        self.get_company(id).await
    }

    // ==================== Users ====================

    /// Create a user.
    pub async fn create_user(&self, user: &User) -> HrResult<()> {
        insert_user(&self.pool, user).await
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: Uuid) -> HrResult<User> {
        let row: UserRow = sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| HrError::NotFound(format!("User {} not found", id)))?;

        row.try_into()
    }

    /// Get a user by email.
    pub async fn get_user_by_email(&self, email: &str) -> HrResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.try_into()).transpose()
    }

    /// List the users of a company.
    pub async fn list_users(&self, company_id: Uuid) -> HrResult<Vec<User>> {
        let rows: Vec<UserRow> =
            sqlx::query_as("SELECT * FROM users WHERE company_id = ? ORDER BY name")
                .bind(company_id.to_string())
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    /// Delete a user of a company.
    pub async fn delete_user(&self, company_id: Uuid, id: Uuid) -> HrResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ? AND company_id = ?")
            .bind(id.to_string())
            .bind(company_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(HrError::NotFound(format!("User {} not found", id)));
        }

        Ok(())
    }

    /// Number of users across all companies.
    pub async fn count_users(&self) -> HrResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

async fn insert_user<'e, E>(executor: E, user: &User) -> HrResult<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO users (id, company_id, email, name, role, password_hash, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user.id.to_string())
    .bind(user.company_id.to_string())
    .bind(&user.email)
    .bind(&user.name)
    .bind(user.role.to_string())
    .bind(&user.password_hash)
    .bind(user.created_at.to_rfc3339())
    .bind(user.updated_at.to_rfc3339())
    .execute(executor)
    .await
    .map_err(|e| HrError::on_constraint(e, "A user with that email already exists"))?;

    Ok(())
}

/// Escape `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern and wrap it
/// as a substring match.
pub(crate) fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
impl HrRepository {
    /// Fresh in-memory database with schema and seeds.
    ///
    /// Pinned to one connection that never expires, since every SQLite
    /// in-memory connection is a separate database.
    pub(crate) async fn in_memory() -> Self {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");
        let repo = HrRepository::new(pool);
        repo.init_schema().await.expect("Failed to init schema");
        repo
    }

    /// A registered company and its admin.
    pub(crate) async fn seed_company(&self, name: &str, rut: &str, email: &str) -> (Company, User) {
        let company = Company::new(name.to_string(), rut.to_string());
        let admin = User::new(
            company.id,
            email.to_string(),
            "Admin".to_string(),
            "password123",
            crate::domain::UserRole::Admin,
        );
        self.register_company(&company, &admin).await.unwrap();
        (company, admin)
    }
}

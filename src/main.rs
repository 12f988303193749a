//! HR Core - multi-tenant HR administration for Chilean companies.
//!
//! Keeps worker files, employment contracts, family dependents and the
//! national reference tables (AFP, Isapre, communes) behind a JWT-protected
//! REST API.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tokio::net::TcpListener;

mod api;
mod auth;
mod config;
mod domain;
mod error;
mod logging;
mod storage;

use crate::api::build_router;
use crate::auth::JwtManager;
use crate::config::{BootstrapAdmin, Config, ListingConfig};
use crate::domain::{Company, Rut, User, UserRole};
use crate::storage::{DocumentStore, HrRepository};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database repository.
    pub repository: HrRepository,
    /// JWT manager for token operations.
    pub jwt_manager: JwtManager,
    /// Worker document files.
    pub documents: DocumentStore,
    /// Pagination limits.
    pub listing: ListingConfig,
}

/// Create the configured company and administrator in an empty database.
async fn bootstrap_admin(repository: &HrRepository, admin: &BootstrapAdmin) -> anyhow::Result<()> {
    if repository.count_users().await? > 0 {
        return Ok(());
    }

    let rut = Rut::parse(&admin.company_rut)
        .map_err(|e| anyhow::anyhow!("auth.bootstrap.company_rut: {}", e))?;
    let company = Company::new(admin.company_name.clone(), rut.to_string());
    let user = User::new(
        company.id,
        admin.email.clone(),
        admin.name.clone(),
        &admin.password,
        UserRole::Admin,
    );
    repository.register_company(&company, &user).await?;

    tracing::info!(
        company_id = %company.id,
        email = %user.email,
        "Bootstrap administrator created"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is expected in production.
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Note: No .env file loaded ({e})");
    }

    logging::init(logging::LogFormat::from_env());

    tracing::info!("Starting HR Core v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    tracing::info!(
        host = %config.server.host,
        port = %config.server.port,
        database = %config.database.url,
        uploads = %config.uploads.dir,
        "Configuration loaded"
    );

    let options = SqliteConnectOptions::from_str(&config.database.url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect_with(options)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to connect to database");
            anyhow::anyhow!("Database connection error: {}", e)
        })?;

    let repository = HrRepository::new(pool);
    repository.init_schema().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to initialize database schema");
        anyhow::anyhow!("Schema initialization error: {}", e)
    })?;

    tracing::info!("Database connected and schema initialized");

    if let Some(admin) = &config.auth.bootstrap {
        bootstrap_admin(&repository, admin).await?;
    }

    let jwt_manager = JwtManager::new(
        &config.auth.jwt_secret,
        config.auth.jwt_issuer.clone(),
        config.auth.token_duration_hours,
    );

    let state = AppState {
        repository,
        jwt_manager,
        documents: DocumentStore::new(&config.uploads),
        listing: config.listing,
    };

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!(address = %addr, "Server listening");
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> BootstrapAdmin {
        BootstrapAdmin {
            company_name: "Transportes Sur".to_string(),
            company_rut: "76.086.428-5".to_string(),
            name: "Admin".to_string(),
            email: "admin@sur.cl".to_string(),
            password: "cambiar123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_bootstrap_runs_once() {
        let repo = HrRepository::in_memory().await;
        bootstrap_admin(&repo, &admin()).await.unwrap();
        bootstrap_admin(&repo, &admin()).await.unwrap();

        assert_eq!(repo.count_users().await.unwrap(), 1);
        let user = repo.get_user_by_email("admin@sur.cl").await.unwrap().unwrap();
        let company = repo.get_company(user.company_id).await.unwrap();
        assert_eq!(company.rut, "76086428-5");
    }

    #[tokio::test]
    async fn test_bootstrap_rejects_bad_rut() {
        let repo = HrRepository::in_memory().await;
        let mut bad = admin();
        bad.company_rut = "76086428-0".to_string();
        assert!(bootstrap_admin(&repo, &bad).await.is_err());
    }
}

//! HTTP API layer for HR Core.
//!
//! REST endpoints for workers, contracts, the organization chart and the
//! reference tables, all scoped to the caller's company.

pub mod handlers;
mod routes;
mod types;

pub use routes::build_router;

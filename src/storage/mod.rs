//! Storage layer for HR Core.
//!
//! Provides database access via SQLx with SQLite, plus on-disk storage for
//! worker documents.

mod catalog;
mod contracts;
mod files;
mod models;
mod repository;
mod workers;

pub use files::DocumentStore;
pub use repository::HrRepository;

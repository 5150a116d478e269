//! Salon Ops - Operations Backend for a Beauty Salon
//!
//! A Rust library for recording appointments, clients, services, expenses
//! and incoming booking requests over a tabular datastore, and deriving
//! simple revenue/expense metrics from them.
//!
//! # Features
//!
//! - Tabular store adapter with SQLite and in-memory backends
//! - Entity repositories with denormalized joins and a TTL read cache
//! - Revenue and expense aggregation
//! - Booking-request reconciliation (request -> client + appointment)
//! - Export to multiple formats (TXT, CSV, JSON)

/// Revenue and expense aggregation
pub mod analytics;
/// TTL cache of table reads
pub mod cache;
/// Configuration management
pub mod config;
/// Error types
pub mod error;
/// Appointment export
pub mod export;
/// Logging setup and utilities
pub mod logging;
/// Free-text heuristics for booking requests
pub mod matching;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// Repository pattern for data access
pub mod repository;
/// Table schema definitions
pub mod schema;
/// Tabular store adapter and backends
pub mod store;
/// Date and timestamp helpers
pub mod utils;
/// Input validation and sanitization
pub mod validation;
/// Booking-request reconciliation workflow
pub mod workflow;

// Re-export key components for easier access
pub use repository::{
    AppointmentRepo, CategoryRepo, ClientDelete, ClientRepo, FixedExpenseRepo, RequestRepo,
    ServiceRepo, SheetDb, VariableExpenseRepo,
};
pub use store::{MemoryStore, SqliteStore, TabularStore};
pub use workflow::RequestWorkflow;

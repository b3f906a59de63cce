//! Persistence core for the debtor aggregate.
//!
//! A `Debtor` and the `Debt`s it owns are stored in two SQLite tables.
//! Writes happen inside a [`UnitOfWork`] that commits only when marked
//! complete.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{AppConfig, LoggingConfig, StoreConfig};
pub use db::{DbError, ScopeOutcome, UnitOfWork};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::debtor::{Amount, Debt, Debtor, DebtorId};
pub use repo::debtor_repo::{DebtorRepository, SqliteDebtorRepository};
pub use repo::error::{RepoError, RepoResult, WriteOp, WriteTarget};
pub use service::debtor_service::DebtorService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

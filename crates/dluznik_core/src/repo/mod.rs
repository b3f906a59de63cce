//! Repository layer for the debtor aggregate.
//!
//! # Responsibility
//! - Map `Debtor` + `Debt` values onto the two-table schema and back.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Repositories never commit or roll back; the owning `UnitOfWork` does.
//! - Every failure is reported as a `RepoError` naming the entity involved.

pub mod debtor_repo;
pub mod error;

//! Use-case services over repository implementations.
//!
//! # Invariants
//! - Each service call runs inside exactly one `UnitOfWork`.

pub mod debtor_service;

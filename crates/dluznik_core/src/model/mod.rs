//! In-memory debtor aggregate.
//!
//! # Invariants
//! - A `Debt` only exists inside the `Debtor` that owns it.
//! - Model types carry no persistence state.

pub mod debtor;

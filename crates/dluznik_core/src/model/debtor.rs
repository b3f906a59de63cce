//! Debtor aggregate root and its owned debts.
//!
//! # Invariants
//! - `id` is assigned by the caller and never generated here.
//! - `total_amount` is recomputed whenever debts change through the helpers
//!   below. Direct field writes can leave it stale; repositories persist
//!   whatever value is present.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Caller-assigned debtor identity (`Debtor.id`).
pub type DebtorId = i64;

/// Exact decimal amount, matching the `NUMERIC` store columns.
pub type Amount = Decimal;

/// Named monetary obligation owned by exactly one debtor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Debt {
    /// Short label, at most 100 characters in the store schema.
    pub name: String,
    pub amount: Amount,
}

impl Debt {
    pub fn new(name: impl Into<String>, amount: impl Into<Amount>) -> Self {
        Self {
            name: name.into(),
            amount: amount.into(),
        }
    }
}

impl Display for Debt {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "<Debt(name='{}', amount='{}')>", self.name, self.amount)
    }
}

/// Aggregate root: a person together with everything they owe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debtor {
    pub id: DebtorId,
    pub first_name: String,
    pub last_name: String,
    /// Owned debts in insertion order.
    pub debts: Vec<Debt>,
    /// Denormalized sum of `debts[*].amount`, stored alongside the row.
    pub total_amount: Amount,
}

impl Debtor {
    /// Creates a debtor with no debts and a zero total.
    pub fn new(id: DebtorId, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            debts: Vec::new(),
            total_amount: Amount::ZERO,
        }
    }

    /// Replaces the owned debts and recomputes `total_amount`.
    pub fn with_debts(mut self, debts: impl IntoIterator<Item = Debt>) -> Self {
        self.debts = debts.into_iter().collect();
        self.total_amount = self.debts_total();
        self
    }

    /// Appends one debt and recomputes `total_amount`.
    pub fn push_debt(&mut self, debt: Debt) {
        self.debts.push(debt);
        self.total_amount = self.debts_total();
    }

    /// Sum of the owned debts, independent of the cached `total_amount`.
    ///
    /// Saturates at `Decimal::MAX` / `Decimal::MIN` instead of overflowing.
    pub fn debts_total(&self) -> Amount {
        self.debts
            .iter()
            .fold(Amount::ZERO, |total, debt| total.saturating_add(debt.amount))
    }
}

impl Display for Debtor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<Debtor(id='{}', first_name='{}', last_name='{}', total_amount='{}', debts=[",
            self.id, self.first_name, self.last_name, self.total_amount
        )?;
        for (index, debt) in self.debts.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{debt}")?;
        }
        f.write_str("])>")
    }
}

//! Debtor repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist a debtor aggregate across the `Debtor` and `Debt` tables.
//! - Rebuild the aggregate from two queries on read.
//!
//! # Invariants
//! - Debt rows are deleted before their `Debtor` row (foreign key order).
//! - `add` stores the caller's `total_amount` as-is; it is not recomputed.
//! - `update` is delete-then-add. It is not a diff, and across concurrent
//!   scopes it is not atomic: two scopes updating one id can interleave.
//! - Debts are returned in insertion order (`rowid`).
//! - Amounts are bound as `INTEGER` when integral, as decimal text otherwise;
//!   `NUMERIC` affinity decides the stored class. All three classes read back.

use crate::model::debtor::{Amount, Debt, Debtor, DebtorId};
use crate::repo::error::{RepoError, RepoResult, WriteOp, WriteTarget};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use rust_decimal::prelude::ToPrimitive;
use std::str::FromStr;

const INSERT_DEBTOR_SQL: &str = "INSERT INTO Debtor (id, first_name, last_name, total_amount)
    VALUES (?1, ?2, ?3, ?4);";
const INSERT_DEBT_SQL: &str = "INSERT INTO Debt (name, amount, debtor_id) VALUES (?1, ?2, ?3);";
const SELECT_DEBTOR_SQL: &str = "SELECT id, first_name, last_name, total_amount
    FROM Debtor
    WHERE id = ?1;";
const SELECT_DEBTS_SQL: &str = "SELECT name, amount
    FROM Debt
    WHERE debtor_id = ?1
    ORDER BY rowid ASC;";

/// Repository interface for the debtor aggregate.
pub trait DebtorRepository {
    /// Inserts the debtor row, then one row per owned debt.
    ///
    /// Stops at the first failing insert. Rows already written stay in the
    /// current transaction until the scope rolls back.
    fn add(&self, debtor: &Debtor) -> RepoResult<()>;

    /// Deletes the debtor's debts, then the debtor. Missing rows are not an
    /// error.
    fn delete(&self, debtor: &Debtor) -> RepoResult<()>;

    /// Loads one debtor with all of its debts, or `None` when absent.
    fn get_by_id(&self, id: DebtorId) -> RepoResult<Option<Debtor>>;

    /// Replaces the stored aggregate wholesale with `debtor`.
    ///
    /// Anything not present in `debtor` is lost. A debtor that does not exist
    /// yet is simply added.
    fn update(&self, debtor: &Debtor) -> RepoResult<()> {
        let wrap = |err: RepoError| {
            RepoError::write(WriteOp::Update, WriteTarget::Debtor(debtor.id), err)
        };

        if self.get_by_id(debtor.id).map_err(wrap)?.is_some() {
            self.delete(debtor).map_err(wrap)?;
        }
        self.add(debtor).map_err(wrap)
    }
}

/// SQLite-backed debtor repository bound to one scope's connection.
pub struct SqliteDebtorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDebtorRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn load_debts(&self, id: DebtorId) -> rusqlite::Result<Vec<Debt>> {
        let mut stmt = self.conn.prepare_cached(SELECT_DEBTS_SQL)?;
        let debts = stmt
            .query_map([id], parse_debt_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(debts)
    }
}

impl DebtorRepository for SqliteDebtorRepository<'_> {
    fn add(&self, debtor: &Debtor) -> RepoResult<()> {
        let debtor_failed = |err: rusqlite::Error| {
            RepoError::write(WriteOp::Add, WriteTarget::Debtor(debtor.id), err)
        };

        self.conn
            .execute(
                INSERT_DEBTOR_SQL,
                params![
                    debtor.id,
                    debtor.first_name.as_str(),
                    debtor.last_name.as_str(),
                    SqlAmount(debtor.total_amount),
                ],
            )
            .map_err(debtor_failed)?;

        let mut stmt = self
            .conn
            .prepare_cached(INSERT_DEBT_SQL)
            .map_err(debtor_failed)?;
        for debt in &debtor.debts {
            stmt.execute(params![debt.name.as_str(), SqlAmount(debt.amount), debtor.id])
                .map_err(|err| {
                    RepoError::write(
                        WriteOp::Add,
                        WriteTarget::Debt {
                            debt: debt.clone(),
                            debtor_id: debtor.id,
                        },
                        err,
                    )
                })?;
        }

        Ok(())
    }

    fn delete(&self, debtor: &Debtor) -> RepoResult<()> {
        let failed = |err: rusqlite::Error| {
            RepoError::write(WriteOp::Delete, WriteTarget::Debtor(debtor.id), err)
        };

        self.conn
            .execute("DELETE FROM Debt WHERE debtor_id = ?1;", [debtor.id])
            .map_err(failed)?;
        self.conn
            .execute("DELETE FROM Debtor WHERE id = ?1;", [debtor.id])
            .map_err(failed)?;

        Ok(())
    }

    fn get_by_id(&self, id: DebtorId) -> RepoResult<Option<Debtor>> {
        let read_failed = |source: rusqlite::Error| RepoError::Read { id, source };

        let Some(mut debtor) = self
            .conn
            .query_row(SELECT_DEBTOR_SQL, [id], parse_debtor_row)
            .optional()
            .map_err(read_failed)?
        else {
            return Ok(None);
        };

        debtor.debts = self.load_debts(id).map_err(read_failed)?;
        Ok(Some(debtor))
    }
}

/// Debtor columns only; debts are attached by the caller.
fn parse_debtor_row(row: &Row<'_>) -> rusqlite::Result<Debtor> {
    Ok(Debtor {
        id: row.get("id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        debts: Vec::new(),
        // Stored value, which may differ from the sum of the stored debts.
        total_amount: row.get::<_, SqlAmount>("total_amount")?.0,
    })
}

fn parse_debt_row(row: &Row<'_>) -> rusqlite::Result<Debt> {
    Ok(Debt {
        name: row.get::<_, Option<String>>("name")?.unwrap_or_default(),
        amount: row.get::<_, SqlAmount>("amount")?.0,
    })
}

/// Column adapter for [`Amount`] over a `NUMERIC` column.
struct SqlAmount(Amount);

impl ToSql for SqlAmount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        if self.0.fract().is_zero() {
            if let Some(whole) = self.0.to_i64() {
                return Ok(ToSqlOutput::from(whole));
            }
        }
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

impl FromSql for SqlAmount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Integer(whole) => Ok(Self(Amount::from(whole))),
            // Shortest round-trip form, so 99.99 reads back as 99.99.
            ValueRef::Real(real) => parse_amount(&real.to_string()),
            ValueRef::Text(_) => parse_amount(value.as_str()?.trim()),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

fn parse_amount(text: &str) -> FromSqlResult<SqlAmount> {
    Amount::from_str(text)
        .map(SqlAmount)
        .map_err(|err| FromSqlError::Other(Box::new(err)))
}

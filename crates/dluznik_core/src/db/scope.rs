//! Scoped unit of work over one store connection.
//!
//! # Responsibility
//! - Own exactly one connection and one open transaction per scope.
//! - Commit when the scope was marked complete, roll back otherwise.
//! - Close the connection as the last step, whatever happened before.
//!
//! # Invariants
//! - Finalization runs exactly once: through [`UnitOfWork::close`] or, if the
//!   scope is dropped without it (early `?` return, panic), through `Drop`.
//! - A failed commit/rollback never skips the close attempt.
//! - Scopes begin `IMMEDIATE`: the write lock is taken at open, so a second
//!   scope on the same file waits up to the busy timeout instead of failing
//!   late with `SQLITE_BUSY` on its first write or at commit.

use super::{open_db, open_db_in_memory};
use crate::config::StoreConfig;
use crate::repo::error::{RepoError, RepoResult};
use log::{debug, error, warn};
use rusqlite::Connection;
use std::fmt::{Display, Formatter};

/// How a scope ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeOutcome {
    Committed,
    RolledBack,
}

impl Display for ScopeOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Committed => f.write_str("commit"),
            Self::RolledBack => f.write_str("rollback"),
        }
    }
}

/// One connection plus one transaction, finalized exactly once.
///
/// ```no_run
/// use dluznik_core::{Debtor, DebtorRepository, SqliteDebtorRepository, StoreConfig, UnitOfWork};
///
/// # fn main() -> dluznik_core::RepoResult<()> {
/// let mut scope = UnitOfWork::open(&StoreConfig::new("dluznik.db"))?;
/// SqliteDebtorRepository::new(scope.connection()).add(&Debtor::new(1, "Jan", "Kowalski"))?;
/// scope.mark_complete();
/// scope.close()?;
/// # Ok(())
/// # }
/// ```
pub struct UnitOfWork {
    conn: Option<Connection>,
    complete: bool,
}

impl UnitOfWork {
    /// Opens the configured store and begins the scope transaction.
    ///
    /// Any failure is reported as [`RepoError::Connection`].
    pub fn open(config: &StoreConfig) -> RepoResult<Self> {
        let conn = open_db(&config.db_path)?;
        Self::begin(conn)
    }

    /// Opens a private in-memory store. Writes never outlive the scope.
    pub fn open_in_memory() -> RepoResult<Self> {
        Self::begin(open_db_in_memory()?)
    }

    fn begin(conn: Connection) -> RepoResult<Self> {
        conn.execute_batch("BEGIN IMMEDIATE;")
            .map_err(|err| RepoError::Connection(err.into()))?;
        debug!("event=scope_open module=db status=ok");
        Ok(Self {
            conn: Some(conn),
            complete: false,
        })
    }

    /// Connection for repositories bound to this scope.
    pub fn connection(&self) -> &Connection {
        match &self.conn {
            Some(conn) => conn,
            // `conn` is only taken by `finalize`, which consumes or drops `self`.
            None => unreachable!("unit of work used after finalization"),
        }
    }

    /// Marks the unit of work as successful; it will commit on release.
    /// Calling it more than once has no further effect.
    pub fn mark_complete(&mut self) {
        self.complete = true;
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Releases the scope: commit or rollback, then close the connection.
    pub fn close(mut self) -> RepoResult<ScopeOutcome> {
        self.finalize()
    }

    fn finalize(&mut self) -> RepoResult<ScopeOutcome> {
        let Some(conn) = self.conn.take() else {
            return Ok(if self.complete {
                ScopeOutcome::Committed
            } else {
                ScopeOutcome::RolledBack
            });
        };

        let (outcome, sql) = if self.complete {
            (ScopeOutcome::Committed, "COMMIT;")
        } else {
            (ScopeOutcome::RolledBack, "ROLLBACK;")
        };

        let finish = conn.execute_batch(sql).err();
        let close = conn.close().err().map(|(_conn, err)| err);

        if finish.is_none() && close.is_none() {
            debug!("event=scope_close module=db status=ok outcome={outcome}");
            return Ok(outcome);
        }

        let err = RepoError::Finalization {
            outcome,
            finish,
            close,
        };
        error!("event=scope_close module=db status=error outcome={outcome} error={err}");
        Err(err)
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        if self.conn.is_none() {
            return;
        }

        warn!(
            "event=scope_drop module=db status=start complete={}",
            self.complete
        );
        if let Err(err) = self.finalize() {
            error!("event=scope_finalize_failed module=db status=error error={err}");
        }
    }
}

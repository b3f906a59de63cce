//! Repository-level error kind shared by scopes and repositories.
//!
//! Every failure surfaced to repository callers is a [`RepoError`]. Variants
//! are discriminated by the stage that failed and keep the underlying cause
//! reachable through [`std::error::Error::source`].

use crate::db::{DbError, ScopeOutcome};
use crate::model::debtor::{Debt, DebtorId};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Write operation that was running when a write failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Add,
    Delete,
    Update,
}

impl WriteOp {
    fn verb(self) -> &'static str {
        match self {
            Self::Add => "adding",
            Self::Delete => "deleting",
            Self::Update => "updating",
        }
    }
}

/// Entity whose write failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteTarget {
    Debtor(DebtorId),
    Debt { debt: Debt, debtor_id: DebtorId },
}

#[derive(Debug)]
pub enum RepoError {
    /// The store connection could not be acquired or bootstrapped.
    Connection(DbError),
    /// An insert or delete failed; `source` is the nested cause.
    Write {
        op: WriteOp,
        target: WriteTarget,
        source: Box<RepoError>,
    },
    /// Lookup of a debtor by id failed.
    Read {
        id: DebtorId,
        source: rusqlite::Error,
    },
    /// Commit/rollback and/or connection close failed at scope exit.
    /// Both errors are kept when both steps fail.
    Finalization {
        outcome: ScopeOutcome,
        finish: Option<rusqlite::Error>,
        close: Option<rusqlite::Error>,
    },
    /// Raw statement failure, only ever seen as a nested cause.
    Sqlite(rusqlite::Error),
}

impl RepoError {
    pub(crate) fn write(op: WriteOp, target: WriteTarget, source: impl Into<RepoError>) -> Self {
        Self::Write {
            op,
            target,
            source: Box::new(source.into()),
        }
    }

    /// Innermost SQLite error in the cause chain, if any.
    pub fn sqlite_cause(&self) -> Option<&rusqlite::Error> {
        match self {
            Self::Connection(DbError::Sqlite(err)) => Some(err),
            Self::Connection(DbError::UnsupportedSchemaVersion { .. }) => None,
            Self::Write { source, .. } => source.sqlite_cause(),
            Self::Read { source, .. } => Some(source),
            Self::Finalization { finish, close, .. } => finish.as_ref().or(close.as_ref()),
            Self::Sqlite(err) => Some(err),
        }
    }

    /// Whether the innermost cause is a SQLite constraint violation
    /// (primary key, foreign key, not null).
    pub fn is_constraint_violation(&self) -> bool {
        self.sqlite_cause()
            .and_then(rusqlite::Error::sqlite_error_code)
            == Some(rusqlite::ErrorCode::ConstraintViolation)
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection(err) => write!(f, "error getting store connection: {err}"),
            Self::Write {
                op,
                target: WriteTarget::Debtor(id),
                ..
            } => write!(f, "error {} debtor {id}", op.verb()),
            Self::Write {
                op,
                target: WriteTarget::Debt { debt, debtor_id },
                ..
            } => write!(f, "error {} debt {debt} to debtor {debtor_id}", op.verb()),
            Self::Read { id, .. } => write!(f, "error getting debtor by id {id}"),
            Self::Finalization {
                outcome,
                finish,
                close,
            } => {
                write!(f, "error finalizing scope ({outcome})")?;
                if let Some(err) = finish {
                    write!(f, "; {outcome} failed: {err}")?;
                }
                if let Some(err) = close {
                    write!(f, "; close failed: {err}")?;
                }
                Ok(())
            }
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Connection(err) => Some(err),
            Self::Write { source, .. } => Some(source.as_ref()),
            Self::Read { source, .. } => Some(source),
            Self::Finalization { finish, close, .. } => finish
                .as_ref()
                .or(close.as_ref())
                .map(|err| err as &(dyn Error + 'static)),
            Self::Sqlite(err) => Some(err),
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Connection(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

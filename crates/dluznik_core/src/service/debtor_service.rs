//! Debtor use-case service.
//!
//! # Responsibility
//! - Open a scope per call, run the repository operation, release the scope.
//! - Commit only when the operation succeeded.

use crate::config::StoreConfig;
use crate::db::UnitOfWork;
use crate::model::debtor::{Debtor, DebtorId};
use crate::repo::debtor_repo::{DebtorRepository, SqliteDebtorRepository};
use crate::repo::error::RepoResult;
use log::error;

/// Entry point for callers that want one unit of work per operation.
#[derive(Debug, Clone)]
pub struct DebtorService {
    config: StoreConfig,
}

impl DebtorService {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Runs `work` in a fresh scope.
    ///
    /// `Ok` marks the scope complete and commits; `Err` rolls back. When the
    /// rollback itself fails, that failure is logged and the error from
    /// `work` is returned.
    pub fn in_scope<T>(
        &self,
        work: impl FnOnce(&SqliteDebtorRepository<'_>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let mut scope = UnitOfWork::open(&self.config)?;
        let result = work(&SqliteDebtorRepository::new(scope.connection()));

        match result {
            Ok(value) => {
                scope.mark_complete();
                scope.close()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(close_err) = scope.close() {
                    error!(
                        "event=scope_close module=service status=error error={close_err} cause={err}"
                    );
                }
                Err(err)
            }
        }
    }

    pub fn add(&self, debtor: &Debtor) -> RepoResult<()> {
        self.in_scope(|repo| repo.add(debtor))
    }

    pub fn delete(&self, debtor: &Debtor) -> RepoResult<()> {
        self.in_scope(|repo| repo.delete(debtor))
    }

    /// Returns `Ok(None)` for an unknown id.
    pub fn get_by_id(&self, id: DebtorId) -> RepoResult<Option<Debtor>> {
        self.in_scope(|repo| repo.get_by_id(id))
    }

    pub fn update(&self, debtor: &Debtor) -> RepoResult<()> {
        self.in_scope(|repo| repo.update(debtor))
    }
}

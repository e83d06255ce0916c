use std::time::{Duration, Instant};

use db_infra::{ConnectionProvider, DbInfraError, OpsLogger, RowShape};
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::SchemaMigration;

/// Lifecycle of a single migration inside one runner call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationState {
    Pending,
    Applying,
    Applied,
    Failed,
}

/// Outcome of one applied migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub name: String,
    pub state: MigrationState,
    pub elapsed: Duration,
}

/// Applies migrations one at a time, each in its own scope.
///
/// A migration that succeeds is committed before the next one starts. A
/// failure rolls back that migration only, is reported to the ops logger as
/// critical, and is returned to the caller.
pub struct MigrationRunner<'a> {
    provider: &'a ConnectionProvider,
    logger: &'a dyn OpsLogger,
}

impl<'a> MigrationRunner<'a> {
    pub fn new(provider: &'a ConnectionProvider, logger: &'a dyn OpsLogger) -> Self {
        Self { provider, logger }
    }

    /// Applies one migration and commits it.
    pub async fn upgrade(
        &self,
        migration: &dyn SchemaMigration,
    ) -> Result<MigrationReport, DbInfraError> {
        let name = migration.name().to_owned();
        let mut state = MigrationState::Pending;
        debug!(migration = %name, state = ?state);

        let scope = match self.provider.acquire_with(RowShape::Tuple).await {
            Ok(scope) => scope,
            Err(e) => {
                self.logger
                    .critical(&format!("migration {name} failed: {e}"));
                return Err(e);
            }
        };

        state = MigrationState::Applying;
        debug!(migration = %name, state = ?state);
        let started = Instant::now();

        let outcome = match migration.up(&scope).await {
            Ok(()) => scope.commit().await,
            Err(e) => {
                if let Err(rollback_err) = scope.rollback().await {
                    warn!(migration = %name, error = %rollback_err, "migration=rollback_failed");
                }
                Err(e)
            }
        };
        let elapsed = started.elapsed();

        match outcome {
            Ok(()) => {
                state = MigrationState::Applied;
                let elapsed_ms = elapsed_millis(elapsed);
                info!(migration = %name, state = ?state, elapsed_ms);
                self.logger
                    .info(&format!("migration {name} applied in {elapsed_ms}ms"));
                Ok(MigrationReport {
                    name,
                    state,
                    elapsed,
                })
            }
            Err(e) => {
                state = MigrationState::Failed;
                debug!(migration = %name, state = ?state);
                self.logger
                    .critical(&format!("migration {name} failed: {e}"));
                Err(e)
            }
        }
    }

    /// Applies the named catalog migrations in the order given.
    ///
    /// Every name is resolved before anything runs; an unknown name applies
    /// nothing.
    pub async fn upgrade_named<S>(
        &self,
        catalog: &Catalog,
        names: &[S],
    ) -> Result<Vec<MigrationReport>, DbInfraError>
    where
        S: AsRef<str>,
    {
        let mut selected = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            match catalog.get(name) {
                Some(migration) => selected.push(migration),
                None => {
                    let e = DbInfraError::config(format!("unknown migration '{name}'"));
                    self.logger.critical(&e.to_string());
                    return Err(e);
                }
            }
        }
        self.run_all(selected).await
    }

    /// Applies the whole catalog in order, stopping at the first failure.
    pub async fn upgrade_all(
        &self,
        catalog: &Catalog,
    ) -> Result<Vec<MigrationReport>, DbInfraError> {
        self.run_all(catalog.iter()).await
    }

    async fn run_all<'m, I>(&self, migrations: I) -> Result<Vec<MigrationReport>, DbInfraError>
    where
        I: IntoIterator<Item = &'m dyn SchemaMigration>,
    {
        let mut reports = Vec::new();
        for migration in migrations {
            reports.push(self.upgrade(migration).await?);
        }
        info!(applied = reports.len(), "migration=batch_done");
        Ok(reports)
    }
}

fn elapsed_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

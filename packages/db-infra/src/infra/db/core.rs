use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, TransactionTrait};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::diagnostics::{ScopeCounters, ScopeStats};
use super::scope::Scope;
use crate::config::db::{ConnectionParams, DbKind, RowShape};
use crate::error::DbInfraError;
use crate::logger::OpsLogger;

/// Future returned by a [`ConnectionProvider::with_scope`] body.
pub type ScopeFuture<'c, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'c>>;

/// Hands out scoped (connection, transaction) pairs.
///
/// Built once at startup, configured once with [`ConnectionProvider::init`],
/// then cloned into every component that needs the database. Clones share
/// parameters, pool and counters.
#[derive(Clone, Default)]
pub struct ConnectionProvider {
    inner: Arc<ProviderInner>,
}

#[derive(Default)]
struct ProviderInner {
    params: OnceLock<ConnectionParams>,
    pool: OnceCell<DatabaseConnection>,
    counters: Arc<ScopeCounters>,
}

impl ConnectionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and records the connection parameters for the process.
    ///
    /// Repeating the call with equal parameters is a no-op; different
    /// parameters are rejected. No connection is opened here.
    pub fn init(
        &self,
        params: ConnectionParams,
        logger: &dyn OpsLogger,
    ) -> Result<(), DbInfraError> {
        if let Err(e) = params.validate() {
            logger.critical(&format!("database configuration rejected: {e}"));
            return Err(e);
        }

        let url = params.redacted_url();
        match self.inner.params.set(params) {
            Ok(()) => {
                logger.info(&format!("database configured: {url}"));
                info!(url = %url, "provider=init");
                Ok(())
            }
            Err(rejected) => {
                let current = self.inner.params.get();
                if current == Some(&rejected) {
                    logger.info(&format!("database already configured: {url}"));
                    return Ok(());
                }
                let current_url = current.map(|p| p.redacted_url()).unwrap_or_default();
                let e = DbInfraError::config(format!(
                    "connection provider already initialized for {current_url}; refusing {url}"
                ));
                logger.critical(&e.to_string());
                Err(e)
            }
        }
    }

    /// Reads [`ConnectionParams::from_env`] and initializes with it.
    pub fn init_from_env(&self, logger: &dyn OpsLogger) -> Result<(), DbInfraError> {
        let params = match ConnectionParams::from_env() {
            Ok(params) => params,
            Err(e) => {
                logger.critical(&format!("database configuration rejected: {e}"));
                return Err(e);
            }
        };
        self.init(params, logger)
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.params.get().is_some()
    }

    pub fn params(&self) -> Result<&ConnectionParams, DbInfraError> {
        self.inner
            .params
            .get()
            .ok_or_else(|| DbInfraError::config("connection provider used before init"))
    }

    pub fn stats(&self) -> ScopeStats {
        self.inner.counters.snapshot()
    }

    pub fn log_stats(&self, label: &str) {
        self.inner.counters.log_snapshot(label);
    }

    async fn pool(&self) -> Result<&DatabaseConnection, DbInfraError> {
        let params = self.params()?;
        self.inner
            .pool
            .get_or_try_init(|| build_pool(params))
            .await
    }

    /// Opens a scope with the configured default row shape.
    pub async fn acquire(&self) -> Result<Scope, DbInfraError> {
        let shape = self.params()?.row_shape;
        self.acquire_with(shape).await
    }

    pub async fn acquire_with(&self, shape: RowShape) -> Result<Scope, DbInfraError> {
        let pool = self.pool().await?;
        let txn = pool.begin().await?;
        debug!(scope = "acquired", shape = ?shape);
        Ok(Scope::new(txn, shape, self.inner.counters.clone()))
    }

    /// Runs `f` inside a fresh scope: commit on `Ok`, rollback on `Err`.
    ///
    /// The body's error is returned unchanged even if the rollback itself fails.
    pub async fn with_scope<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: for<'c> FnOnce(&'c Scope) -> ScopeFuture<'c, T, E>,
        E: From<DbInfraError>,
    {
        let shape = self.params()?.row_shape;
        self.with_scope_as(shape, f).await
    }

    pub async fn with_scope_as<T, E, F>(&self, shape: RowShape, f: F) -> Result<T, E>
    where
        F: for<'c> FnOnce(&'c Scope) -> ScopeFuture<'c, T, E>,
        E: From<DbInfraError>,
    {
        let scope = self.acquire_with(shape).await?;
        let out = f(&scope).await;

        match out {
            Ok(value) => {
                scope.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = scope.rollback().await {
                    warn!(error = %rollback_err, "scope=rollback_failed");
                }
                Err(err)
            }
        }
    }
}

/// Opens the pool described by `params`. Connection failures are not retried.
pub async fn build_pool(params: &ConnectionParams) -> Result<DatabaseConnection, DbInfraError> {
    let url = params.redacted_url();
    let max_connections = params.effective_max_connections();

    let mut opt = ConnectOptions::new(params.url());
    opt.max_connections(max_connections)
        .acquire_timeout(params.pool.acquire_timeout)
        .sqlx_logging(false);
    if matches!(params.kind, DbKind::SqliteMemory) {
        // The database lives and dies with its only connection.
        opt.min_connections(1);
    }

    info!(
        db_kind = ?params.kind,
        url = %url,
        max_connections = max_connections,
        "pool=connect"
    );

    let pool = Database::connect(opt)
        .await
        .map_err(|e| DbInfraError::connection(format!("failed to connect to {url}: {e}")))?;

    if matches!(params.kind, DbKind::SqliteFile) {
        setup_sqlite_file_prerequisites(&pool).await?;
    }

    Ok(pool)
}

async fn setup_sqlite_file_prerequisites(pool: &DatabaseConnection) -> Result<(), DbInfraError> {
    pool.execute_unprepared("PRAGMA journal_mode = WAL;")
        .await
        .map_err(|e| DbInfraError::connection(format!("failed to set journal_mode: {e}")))?;
    Ok(())
}

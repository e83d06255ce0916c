//! Schema migrations for the inventory database and the runner that applies
//! them through a [`ConnectionProvider`](db_infra::ConnectionProvider).
//!
//! There is no applied-migrations ledger: every migration must be safe to
//! run again (`IF NOT EXISTS` throughout).

use async_trait::async_trait;
use db_infra::{DbInfraError, Scope};
use sea_orm_migration::sea_orm::StatementBuilder;

mod catalog;
mod runner;
mod source;

mod m0001_create_users;
mod m0002_create_suppliers_and_items;
mod m0003_create_purchasing;
mod m0004_create_production;
mod m0005_create_import_batches;

pub use catalog::Catalog;
pub use runner::{MigrationReport, MigrationRunner, MigrationState};
pub use source::{EmbeddedSql, SqlFileMigration};

/// A named, idempotent unit of schema change.
#[async_trait]
pub trait SchemaMigration: Send + Sync {
    fn name(&self) -> &str;

    /// Applies the change inside the runner's scope. Must not commit.
    async fn up(&self, scope: &Scope) -> Result<(), DbInfraError>;
}

/// Renders a sea-query schema statement for the scope's backend and runs it.
pub(crate) async fn apply<S>(scope: &Scope, stmt: &S) -> Result<(), DbInfraError>
where
    S: StatementBuilder + Sync,
{
    let statement = scope.backend().build(stmt);
    scope.execute_statement(statement).await?;
    Ok(())
}

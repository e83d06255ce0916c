//! Database session and migration access layer for the inventory tracker.
//!
//! [`ConnectionProvider`] hands out scoped connections; the `migration`
//! crate drives schema changes through it.

pub mod config;
pub mod error;
pub mod infra;
pub mod logger;
pub mod response;

pub use config::db::{ConnectionParams, DbKind, PoolSettings, RowShape};
pub use error::DbInfraError;
pub use infra::db::core::{build_pool, ConnectionProvider, ScopeFuture};
pub use infra::db::diagnostics::ScopeStats;
pub use infra::db::scope::{Row, Scope};
pub use logger::{OpsLogger, TracingOpsLogger};
pub use response::ListResponse;
pub use sea_orm::{DatabaseBackend, Statement, Value};

//! Operator tooling for the inventory database: schema migrations and the
//! item usage report.

pub mod cli;
pub mod commands;
pub mod telemetry;
pub mod usage;

pub use cli::{Args, Command, MigrateAction};
pub use commands::run;
pub use usage::{usage_report, ItemUsage};

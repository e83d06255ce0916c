//! Test support for the database layer
//!
//! Shared logging bootstrap, unique data helpers, a recording [`OpsLogger`]
//! and ready-made providers backed by SQLite.
//!
//! [`OpsLogger`]: db_infra::OpsLogger

pub mod logging;
pub mod providers;
pub mod recording_logger;
pub mod unique;

pub use providers::{memory_provider, sqlite_file_provider};
pub use recording_logger::{LogLine, RecordingLogger, Severity};
pub use unique::{unique_sku, unique_str};

//! Operator-facing logging capability.
//!
//! Initialization and migrations report through an injected [`OpsLogger`]
//! so entry points decide where operator messages go. [`TracingOpsLogger`]
//! forwards them to `tracing`.

use std::sync::Arc;

use tracing::{error, info};

/// Minimal two-severity logger required by provider initialization and the
/// migration runner.
pub trait OpsLogger: Send + Sync {
    fn info(&self, message: &str);
    fn critical(&self, message: &str);
}

/// Forwards operator messages to the installed `tracing` subscriber under
/// this module's target, so a `db_infra=info` directive keeps them.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingOpsLogger;

impl OpsLogger for TracingOpsLogger {
    fn info(&self, message: &str) {
        info!("{message}");
    }

    fn critical(&self, message: &str) {
        error!(severity = "critical", "{message}");
    }
}

impl<L: OpsLogger + ?Sized> OpsLogger for &L {
    fn info(&self, message: &str) {
        (**self).info(message)
    }

    fn critical(&self, message: &str) {
        (**self).critical(message)
    }
}

impl<L: OpsLogger + ?Sized> OpsLogger for Arc<L> {
    fn info(&self, message: &str) {
        (**self).info(message)
    }

    fn critical(&self, message: &str) {
        (**self).critical(message)
    }
}

pub mod core;
pub mod diagnostics;
pub mod scope;

pub use core::{build_pool, ConnectionProvider, ScopeFuture};
pub use diagnostics::{ScopeCounters, ScopeStats};
pub use scope::{Row, Scope};

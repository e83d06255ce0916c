//! Tracing bootstrap for database tests.
//!
//! Integration test binaries call [`init`] from a `#[ctor::ctor]` hook in
//! their `support` module; unit tests may call it directly.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

/// Checked before `RUST_LOG` so test runs can be tuned without touching the
/// filter an operator exported for the CLI.
pub const TEST_LOG: &str = "TEST_LOG";

// sqlx logs every statement at info; provider and runner lines are enough.
const DEFAULT_FILTER: &str = "warn,sqlx=error";

static SUBSCRIBER: OnceCell<()> = OnceCell::new();

fn filter() -> EnvFilter {
    [TEST_LOG, "RUST_LOG"]
        .into_iter()
        .find_map(|name| std::env::var(name).ok())
        .map(EnvFilter::new)
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs a test-captured fmt subscriber once per process.
///
/// Safe to call from any number of tests; a subscriber installed by
/// someone else is left in place.
pub fn init() {
    SUBSCRIBER.get_or_init(|| {
        let _ = fmt()
            .with_env_filter(filter())
            .with_test_writer()
            .without_time()
            .with_target(true)
            .try_init();
    });
}

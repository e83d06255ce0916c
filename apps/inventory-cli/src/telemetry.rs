use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "inventory=info,db_infra=info,migration=info,sqlx=warn";

/// `RUST_LOG` when set, otherwise the operator default.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the fmt subscriber. Logs go to stderr so stdout stays parseable.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_line_number(false)
        .with_file(false)
        .with_env_filter(env_filter())
        .try_init();
}

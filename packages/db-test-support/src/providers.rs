use std::path::Path;
use std::time::Duration;

use db_infra::{ConnectionParams, ConnectionProvider, RowShape, TracingOpsLogger};

/// Initialized provider over a private in-memory SQLite database.
pub fn memory_provider(shape: RowShape) -> ConnectionProvider {
    let provider = ConnectionProvider::new();
    let params = ConnectionParams::sqlite_memory()
        .with_row_shape(shape)
        .with_acquire_timeout(Duration::from_secs(10));
    provider
        .init(params, &TracingOpsLogger)
        .expect("sqlite memory params are valid");
    provider
}

/// Initialized provider over a SQLite file with a pool of `max_connections`.
pub fn sqlite_file_provider(path: &Path, max_connections: u32) -> ConnectionProvider {
    let provider = ConnectionProvider::new();
    let params = ConnectionParams::sqlite_file(path)
        .with_max_connections(max_connections)
        .with_acquire_timeout(Duration::from_secs(10));
    provider
        .init(params, &TracingOpsLogger)
        .expect("sqlite file params are valid");
    provider
}

//! Scoped acquisition against real SQLite databases: commit, rollback,
//! release accounting and connection exclusivity.

mod support;

use std::sync::Arc;
use std::time::Duration;

use db_infra::{ConnectionParams, ConnectionProvider, DbInfraError, Row, RowShape, Value};
use db_test_support::{
    memory_provider, sqlite_file_provider, unique_sku, unique_str, RecordingLogger,
};
use serde_json::{json, Value as JsonValue};
use tokio::sync::Barrier;
use tokio::task::JoinSet;

const CREATE_ITEMS: &str = "CREATE TABLE IF NOT EXISTS items (\
    id INTEGER PRIMARY KEY, \
    sku TEXT NOT NULL, \
    quantity INTEGER NOT NULL)";

async fn create_items(provider: &ConnectionProvider) {
    let scope = provider.acquire().await.expect("acquire");
    scope.execute_batch(CREATE_ITEMS).await.expect("create items");
    scope.commit().await.expect("commit");
}

async fn item_skus(provider: &ConnectionProvider) -> Vec<String> {
    let scope = provider
        .acquire_with(RowShape::Tuple)
        .await
        .expect("acquire");
    let rows = scope
        .fetch_all("SELECT sku FROM items ORDER BY id", [])
        .await
        .expect("select");
    scope.rollback().await.expect("rollback");
    rows.into_iter()
        .filter_map(|row| row.get(0).and_then(|v| v.as_str()).map(str::to_string))
        .collect()
}

#[tokio::test]
async fn acquire_before_init_is_config_error() {
    let provider = ConnectionProvider::new();

    let err = provider.acquire().await.err().expect("must fail");
    assert!(err.is_config(), "unexpected error: {err}");
    assert!(!provider.is_initialized());
    assert_eq!(provider.stats().acquired, 0);
}

#[tokio::test]
async fn init_twice_with_same_params_is_safe() {
    let provider = ConnectionProvider::new();
    let logger = RecordingLogger::new();
    let params = ConnectionParams::sqlite_memory();

    provider.init(params.clone(), &logger).expect("first init");
    provider.init(params, &logger).expect("second init");

    assert_eq!(logger.infos().len(), 2);
    assert!(logger.criticals().is_empty());

    create_items(&provider).await;
    assert!(item_skus(&provider).await.is_empty());
}

#[tokio::test]
async fn init_with_different_params_is_rejected() {
    let provider = ConnectionProvider::new();
    let logger = RecordingLogger::new();

    provider
        .init(ConnectionParams::sqlite_memory(), &logger)
        .expect("first init");
    let err = provider
        .init(
            ConnectionParams::sqlite_memory().with_row_shape(RowShape::Mapping),
            &logger,
        )
        .unwrap_err();

    assert!(err.is_config());
    assert_eq!(logger.criticals().len(), 1);
    assert_eq!(provider.params().unwrap().row_shape, RowShape::Tuple);
}

#[tokio::test]
async fn init_with_missing_name_fails_fast() {
    let provider = ConnectionProvider::new();
    let logger = RecordingLogger::new();
    let params = ConnectionParams::postgres("localhost", 5432, "", "inventory_app", "secret");

    let err = provider.init(params, &logger).unwrap_err();

    assert!(err.is_config());
    assert!(!provider.is_initialized());
    assert_eq!(logger.criticals().len(), 1);
    assert!(!logger.criticals()[0].contains("secret"));
}

#[tokio::test]
async fn init_log_line_redacts_password() {
    let provider = ConnectionProvider::new();
    let logger = RecordingLogger::new();
    let params = ConnectionParams::postgres("db.internal", 5432, "inventory", "app", "hunter2");

    provider.init(params, &logger).expect("init");

    let infos = logger.infos();
    assert_eq!(infos.len(), 1);
    assert!(infos[0].contains("app:***@db.internal"));
    assert!(!infos[0].contains("hunter2"));
}

#[tokio::test]
async fn commit_persists_writes() {
    let provider = memory_provider(RowShape::Tuple);
    create_items(&provider).await;

    let sku = unique_sku("BOLT");
    let scope = provider.acquire().await.expect("acquire");
    let affected = scope
        .execute(
            "INSERT INTO items (sku, quantity) VALUES (?, ?)",
            [Value::from(sku.clone()), Value::from(40i32)],
        )
        .await
        .expect("insert");
    assert_eq!(affected, 1);
    scope.commit().await.expect("commit");

    assert_eq!(item_skus(&provider).await, vec![sku]);

    let stats = provider.stats();
    assert_eq!(stats.acquired, stats.released);
    assert_eq!(stats.in_flight, 0);
}

#[tokio::test]
async fn failing_body_rolls_back_and_releases_once() {
    let provider = memory_provider(RowShape::Tuple);
    create_items(&provider).await;
    let before = provider.stats();

    let result: Result<(), DbInfraError> = provider
        .with_scope(|scope| {
            Box::pin(async move {
                scope
                    .execute(
                        "INSERT INTO items (sku, quantity) VALUES (?, ?)",
                        [Value::from("NUT-M6"), Value::from(10i32)],
                    )
                    .await?;
                Err::<(), _>(DbInfraError::query("receiving dock rejected the batch"))
            })
        })
        .await;

    let err = result.unwrap_err();
    assert!(err.message().contains("receiving dock"));
    assert!(item_skus(&provider).await.is_empty());

    let after = provider.stats();
    // The body's scope plus the read in `item_skus`.
    assert_eq!(after.acquired - before.acquired, 2);
    assert_eq!(after.released - before.released, 2);
    assert_eq!(after.committed, before.committed);
    assert_eq!(after.in_flight, 0);
}

#[tokio::test]
async fn successful_body_commits() {
    let provider = memory_provider(RowShape::Tuple);
    create_items(&provider).await;

    let inserted = provider
        .with_scope(|scope| {
            Box::pin(async move {
                let n = scope
                    .execute(
                        "INSERT INTO items (sku, quantity) VALUES (?, ?), (?, ?)",
                        [
                            Value::from("WASHER-M6"),
                            Value::from(100i32),
                            Value::from("WASHER-M8"),
                            Value::from(80i32),
                        ],
                    )
                    .await?;
                Ok::<_, DbInfraError>(n)
            })
        })
        .await
        .expect("with_scope");

    assert_eq!(inserted, 2);
    assert_eq!(item_skus(&provider).await.len(), 2);
}

#[tokio::test]
async fn invalid_sql_is_query_error_and_rolls_back() {
    let provider = memory_provider(RowShape::Tuple);
    create_items(&provider).await;

    let result = provider
        .with_scope(|scope| {
            Box::pin(async move {
                scope
                    .execute(
                        "INSERT INTO items (sku, quantity) VALUES (?, ?)",
                        [Value::from("GEAR-12T"), Value::from(5i32)],
                    )
                    .await?;
                scope
                    .execute("INSERT INTO no_such_table (sku) VALUES (?)", [Value::from("x")])
                    .await?;
                Ok::<_, DbInfraError>(())
            })
        })
        .await;

    assert!(result.unwrap_err().is_query());
    assert!(item_skus(&provider).await.is_empty());
}

#[tokio::test]
async fn dropped_scope_rolls_back_and_releases() {
    let provider = memory_provider(RowShape::Tuple);
    create_items(&provider).await;

    {
        let scope = provider.acquire().await.expect("acquire");
        scope
            .execute(
                "INSERT INTO items (sku, quantity) VALUES (?, ?)",
                [Value::from("SPRING-04"), Value::from(12i32)],
            )
            .await
            .expect("insert");
        assert_eq!(provider.stats().in_flight, 1);
    }

    let stats = provider.stats();
    assert_eq!(stats.in_flight, 0);
    assert_eq!(stats.acquired, stats.released);
    assert!(item_skus(&provider).await.is_empty());
}

#[tokio::test]
async fn unopenable_database_is_connection_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("missing").join("nested").join("inventory.db");
    let provider = ConnectionProvider::new();
    provider
        .init(ConnectionParams::sqlite_file(path), &RecordingLogger::new())
        .expect("params are valid");

    let err = provider.acquire().await.err().expect("must fail");
    assert!(err.is_connection(), "unexpected error: {err}");
    assert_eq!(provider.stats().acquired, 0);
}

#[tokio::test]
async fn rows_follow_requested_shape() {
    let provider = memory_provider(RowShape::Mapping);
    create_items(&provider).await;

    let scope = provider.acquire().await.expect("acquire");
    assert_eq!(scope.shape(), RowShape::Mapping);
    scope
        .execute(
            "INSERT INTO items (id, sku, quantity) VALUES (?, ?, ?)",
            [Value::from(1i32), Value::from("BOLT-M8"), Value::from(7i32)],
        )
        .await
        .expect("insert");
    scope.commit().await.expect("commit");

    let mapped = provider.acquire().await.expect("acquire");
    let rows = mapped
        .fetch_all("SELECT id, sku, quantity FROM items", [])
        .await
        .expect("select");
    mapped.rollback().await.expect("rollback");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get_named("sku"), Some(&json!("BOLT-M8")));
    assert_eq!(
        serde_json::to_value(&rows[0]).unwrap(),
        json!({"id": 1, "sku": "BOLT-M8", "quantity": 7})
    );

    let positional = provider
        .acquire_with(RowShape::Tuple)
        .await
        .expect("acquire");
    let row = positional
        .fetch_optional(
            "SELECT id, sku, quantity FROM items WHERE sku = ?",
            [Value::from("BOLT-M8")],
        )
        .await
        .expect("select")
        .expect("row present");
    positional.rollback().await.expect("rollback");
    assert_eq!(row, Row::Tuple(vec![json!(1), json!("BOLT-M8"), json!(7)]));
}

#[tokio::test]
async fn computed_columns_keep_their_positions() {
    let provider = memory_provider(RowShape::Tuple);

    let scope = provider.acquire().await.expect("acquire");
    let row = scope
        .fetch_optional("SELECT 1 AS id, 2 AS id, 'x' AS sku, 2.5 AS qty, NULL AS note", [])
        .await
        .expect("select")
        .expect("row present");
    scope.rollback().await.expect("rollback");

    assert_eq!(
        row,
        Row::Tuple(vec![json!(1), json!(2), json!("x"), json!(2.5), JsonValue::Null])
    );
}

#[tokio::test]
async fn literal_columns_appear_in_mapping_rows() {
    let provider = memory_provider(RowShape::Mapping);

    let scope = provider.acquire().await.expect("acquire");
    let rows = scope
        .fetch_all("SELECT 1 AS a, 'x' AS b, 3 AS a", [])
        .await
        .expect("select");
    scope.rollback().await.expect("rollback");

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get_named("b"), Some(&json!("x")));
    // Repeated names keep the last value.
    assert_eq!(rows[0].get_named("a"), Some(&json!(3)));
    assert_eq!(rows[0].len(), 2);
}

#[tokio::test]
async fn aggregates_are_returned_in_both_shapes() {
    let provider = memory_provider(RowShape::Mapping);
    create_items(&provider).await;
    provider
        .with_scope(|scope| {
            Box::pin(async move {
                scope
                    .execute(
                        "INSERT INTO items (sku, quantity) VALUES (?, ?), (?, ?)",
                        [
                            Value::from("BOLT-M6"),
                            Value::from(40i32),
                            Value::from("NUT-M6"),
                            Value::from(2i32),
                        ],
                    )
                    .await?;
                Ok::<_, DbInfraError>(())
            })
        })
        .await
        .expect("seed");

    const TOTALS: &str = "SELECT COUNT(*) AS n, SUM(quantity) AS total, AVG(quantity) AS mean \
        FROM items";

    let mapped = provider.acquire().await.expect("acquire");
    let row = mapped
        .fetch_optional(TOTALS, [])
        .await
        .expect("select")
        .expect("row present");
    mapped.rollback().await.expect("rollback");
    assert_eq!(row.into_json(), json!({"n": 2, "total": 42, "mean": 21.0}));

    let positional = provider
        .acquire_with(RowShape::Tuple)
        .await
        .expect("acquire");
    let rows = positional.fetch_all(TOTALS, []).await.expect("select");
    positional.rollback().await.expect("rollback");
    assert_eq!(rows, vec![Row::Tuple(vec![json!(2), json!(42), json!(21.0)])]);
}

#[tokio::test]
async fn fetch_optional_returns_none_for_no_rows() {
    let provider = memory_provider(RowShape::Tuple);
    create_items(&provider).await;

    let scope = provider.acquire().await.expect("acquire");
    let row = scope
        .fetch_optional("SELECT id FROM items WHERE sku = ?", [Value::from("NOPE")])
        .await
        .expect("select");
    scope.rollback().await.expect("rollback");

    assert!(row.is_none());
}

#[tokio::test]
async fn parallel_scopes_do_not_lose_updates() {
    let provider = memory_provider(RowShape::Tuple);
    let scope = provider.acquire().await.expect("acquire");
    scope
        .execute_batch(
            "CREATE TABLE counters (id INTEGER PRIMARY KEY, value INTEGER NOT NULL); \
             INSERT INTO counters (id, value) VALUES (1, 0);",
        )
        .await
        .expect("setup");
    scope.commit().await.expect("commit");

    let mut tasks = JoinSet::new();
    for _ in 0..8 {
        let provider = provider.clone();
        tasks.spawn(async move {
            provider
                .with_scope(|scope| {
                    Box::pin(async move {
                        let row = scope
                            .fetch_optional("SELECT value FROM counters WHERE id = 1", [])
                            .await?
                            .ok_or_else(|| DbInfraError::query("counter row missing"))?;
                        let value = row.get(0).and_then(|v| v.as_i64()).unwrap_or_default();
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        scope
                            .execute(
                                "UPDATE counters SET value = ? WHERE id = 1",
                                [Value::from(value + 1)],
                            )
                            .await?;
                        Ok::<_, DbInfraError>(())
                    })
                })
                .await
        });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.expect("task panicked").expect("scope failed");
    }

    let scope = provider.acquire().await.expect("acquire");
    let row = scope
        .fetch_optional("SELECT value FROM counters WHERE id = 1", [])
        .await
        .expect("select")
        .expect("row");
    scope.rollback().await.expect("rollback");
    assert_eq!(row.get(0), Some(&json!(8)));

    let stats = provider.stats();
    assert_eq!(stats.peak_in_flight, 1);
    assert_eq!(stats.in_flight, 0);
}

#[tokio::test]
async fn concurrent_scopes_hold_distinct_connections() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(format!("{}.db", unique_str("inventory")));
    let provider = sqlite_file_provider(&path, 4);
    create_items(&provider).await;

    let barrier = Arc::new(Barrier::new(4));
    let mut tasks = JoinSet::new();
    for _ in 0..4 {
        let provider = provider.clone();
        let barrier = barrier.clone();
        tasks.spawn(async move {
            let scope = provider.acquire().await?;
            scope.fetch_all("SELECT id FROM items", []).await?;
            // All four scopes are open at this point.
            barrier.wait().await;
            scope.rollback().await
        });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.expect("task panicked").expect("scope failed");
    }

    let stats = provider.stats();
    assert_eq!(stats.peak_in_flight, 4);
    assert_eq!(stats.acquired, stats.released);
}

use std::sync::Arc;

use sea_orm::prelude::{DateTime, DateTimeWithTimeZone, Decimal, Uuid};
use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseTransaction, JsonValue, QueryResult, Statement,
    TryGetable, Value,
};
use serde::Serialize;
use serde_json::Map;
use tracing::{debug, trace, warn};

use super::diagnostics::ScopeCounters;
use crate::config::db::RowShape;
use crate::error::DbInfraError;

/// A fetched row in the shape requested when the scope was acquired.
///
/// `Tuple` keeps SELECT column order. `Mapping` is keyed by column name, so
/// duplicate column names collapse to the last one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Row {
    Tuple(Vec<JsonValue>),
    Mapping(Map<String, JsonValue>),
}

impl Row {
    /// Builds a row from `(column, value)` pairs in SELECT order.
    pub fn from_columns(columns: Vec<(String, JsonValue)>, shape: RowShape) -> Self {
        match shape {
            RowShape::Tuple => Row::Tuple(columns.into_iter().map(|(_, v)| v).collect()),
            RowShape::Mapping => Row::Mapping(columns.into_iter().collect()),
        }
    }

    fn from_query_result(result: &QueryResult, shape: RowShape) -> Result<Self, DbInfraError> {
        let columns = result
            .column_names()
            .into_iter()
            .enumerate()
            .map(|(idx, name)| {
                let value = decode_column(result, idx, &name)?;
                Ok((name, value))
            })
            .collect::<Result<Vec<_>, DbInfraError>>()?;
        Ok(Self::from_columns(columns, shape))
    }

    /// Value at a column position. Works for both shapes.
    pub fn get(&self, index: usize) -> Option<&JsonValue> {
        match self {
            Row::Tuple(values) => values.get(index),
            Row::Mapping(columns) => columns.values().nth(index),
        }
    }

    /// Value by column name. Tuple rows carry no names.
    pub fn get_named(&self, column: &str) -> Option<&JsonValue> {
        match self {
            Row::Tuple(_) => None,
            Row::Mapping(columns) => columns.get(column),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Row::Tuple(values) => values.len(),
            Row::Mapping(columns) => columns.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_json(self) -> JsonValue {
        match self {
            Row::Tuple(values) => JsonValue::Array(values),
            Row::Mapping(columns) => JsonValue::Object(columns),
        }
    }
}

fn try_decode<T>(result: &QueryResult, idx: usize) -> Option<Option<T>>
where
    T: TryGetable,
{
    result.try_get_by_index::<Option<T>>(idx).ok()
}

/// Decodes one column by position, trying driver types from narrowest to
/// widest. Columns without a declared type (literals, aggregates) are typed
/// by their runtime value, so they decode like any other column.
fn decode_column(
    result: &QueryResult,
    idx: usize,
    name: &str,
) -> Result<JsonValue, DbInfraError> {
    fn json<T: Into<JsonValue>>(value: Option<T>) -> JsonValue {
        value.map(Into::into).unwrap_or(JsonValue::Null)
    }

    if let Some(v) = try_decode::<i64>(result, idx) {
        return Ok(json(v));
    }
    if let Some(v) = try_decode::<i32>(result, idx) {
        return Ok(json(v));
    }
    if let Some(v) = try_decode::<i16>(result, idx) {
        return Ok(json(v));
    }
    if let Some(v) = try_decode::<f64>(result, idx) {
        return Ok(json(v));
    }
    if let Some(v) = try_decode::<f32>(result, idx) {
        return Ok(json(v.map(f64::from)));
    }
    if let Some(v) = try_decode::<bool>(result, idx) {
        return Ok(json(v));
    }
    if let Some(v) = try_decode::<String>(result, idx) {
        return Ok(json(v));
    }
    if let Some(v) = try_decode::<JsonValue>(result, idx) {
        return Ok(v.unwrap_or(JsonValue::Null));
    }
    if let Some(v) = try_decode::<DateTimeWithTimeZone>(result, idx) {
        return Ok(json(v.map(|t| t.to_rfc3339())));
    }
    if let Some(v) = try_decode::<DateTime>(result, idx) {
        return Ok(json(v.map(|t| t.to_string())));
    }
    if let Some(v) = try_decode::<Decimal>(result, idx) {
        return Ok(json(v.map(|d| d.to_string())));
    }
    if let Some(v) = try_decode::<Uuid>(result, idx) {
        return Ok(json(v.map(|u| u.to_string())));
    }
    if let Some(v) = try_decode::<Vec<u8>>(result, idx) {
        return Ok(json(v.map(|bytes| String::from_utf8_lossy(&bytes).into_owned())));
    }
    Err(DbInfraError::query(format!(
        "column {idx} ({name}) has a type rows cannot represent"
    )))
}

/// Scoped connection handle: one pooled connection holding one open
/// transaction, plus the row shape used for fetches.
///
/// Finish with [`Scope::commit`] or [`Scope::rollback`]. Dropping an
/// unfinished scope rolls the transaction back and returns the connection
/// to the pool.
pub struct Scope {
    txn: Option<DatabaseTransaction>,
    backend: DatabaseBackend,
    shape: RowShape,
    counters: Arc<ScopeCounters>,
}

impl Scope {
    pub(crate) fn new(
        txn: DatabaseTransaction,
        shape: RowShape,
        counters: Arc<ScopeCounters>,
    ) -> Self {
        counters.scope_acquired();
        let backend = txn.get_database_backend();
        Self {
            txn: Some(txn),
            backend,
            shape,
            counters,
        }
    }

    pub fn shape(&self) -> RowShape {
        self.shape
    }

    pub fn backend(&self) -> DatabaseBackend {
        self.backend
    }

    /// Underlying sea-orm transaction, for entity and raw-statement APIs.
    pub fn connection(&self) -> Result<&DatabaseTransaction, DbInfraError> {
        self.txn
            .as_ref()
            .ok_or_else(|| DbInfraError::query("scope already released"))
    }

    /// Runs one statement with bound parameters; returns rows affected.
    pub async fn execute<I>(&self, sql: &str, values: I) -> Result<u64, DbInfraError>
    where
        I: IntoIterator<Item = Value>,
    {
        let stmt = Statement::from_sql_and_values(self.backend, sql, values);
        self.execute_statement(stmt).await
    }

    pub async fn execute_statement(&self, stmt: Statement) -> Result<u64, DbInfraError> {
        trace!(sql = %stmt.sql, "scope=execute");
        let result = self.connection()?.execute(stmt).await?;
        Ok(result.rows_affected())
    }

    /// Runs `sql` verbatim as one unprepared batch; may hold several statements.
    pub async fn execute_batch(&self, sql: &str) -> Result<(), DbInfraError> {
        trace!(bytes = sql.len(), "scope=execute_batch");
        self.connection()?.execute_unprepared(sql).await?;
        Ok(())
    }

    pub async fn fetch_all<I>(&self, sql: &str, values: I) -> Result<Vec<Row>, DbInfraError>
    where
        I: IntoIterator<Item = Value>,
    {
        let stmt = Statement::from_sql_and_values(self.backend, sql, values);
        let rows = self.connection()?.query_all(stmt).await?;
        rows.iter()
            .map(|row| Row::from_query_result(row, self.shape))
            .collect()
    }

    pub async fn fetch_optional<I>(
        &self,
        sql: &str,
        values: I,
    ) -> Result<Option<Row>, DbInfraError>
    where
        I: IntoIterator<Item = Value>,
    {
        let stmt = Statement::from_sql_and_values(self.backend, sql, values);
        let row = self.connection()?.query_one(stmt).await?;
        row.map(|row| Row::from_query_result(&row, self.shape))
            .transpose()
    }

    pub async fn commit(mut self) -> Result<(), DbInfraError> {
        let Some(txn) = self.txn.take() else {
            return Ok(());
        };
        let result = txn.commit().await;
        match &result {
            Ok(()) => self.counters.scope_committed(),
            Err(e) => {
                warn!(error = %e, "scope=commit_failed");
                self.counters.scope_rolled_back();
            }
        }
        self.counters.scope_released();
        debug!(scope = "released", outcome = "commit");
        result.map_err(DbInfraError::from)
    }

    pub async fn rollback(mut self) -> Result<(), DbInfraError> {
        let Some(txn) = self.txn.take() else {
            return Ok(());
        };
        let result = txn.rollback().await;
        self.counters.scope_rolled_back();
        self.counters.scope_released();
        debug!(scope = "released", outcome = "rollback");
        result.map_err(DbInfraError::from)
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        // The transaction's own drop queues the rollback on its connection.
        if let Some(txn) = self.txn.take() {
            drop(txn);
            self.counters.scope_rolled_back();
            self.counters.scope_released();
            debug!(scope = "released", outcome = "dropped");
        }
    }
}

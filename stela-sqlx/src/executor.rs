use sqlx::any::{AnyArguments, AnyRow};
use sqlx::query::Query;
use sqlx::{Any, AnyPool, Row};

use stela::{DataError, FieldKind, QueryExecutor, SqlRow, SqlValue};

use crate::error::SqlxErrorExt;

/// The engine's query-execution facility over an `sqlx::AnyPool`.
///
/// Binds `SqlValue`s positionally and adapts fetched `AnyRow`s to the
/// engine's [`SqlRow`] view. The pool is constructed and owned by the caller;
/// this wrapper adds no pooling or transaction behavior of its own.
///
/// # Example
///
/// ```ignore
/// let executor = SqlxExecutor::new(pool.clone());
/// let repo = SqlRepository::<UserEntity, _>::new(executor);
/// ```
#[derive(Clone)]
pub struct SqlxExecutor {
    pool: AnyPool,
}

impl SqlxExecutor {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    /// Get the underlying pool reference.
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }
}

fn bind_params<'q>(
    mut query: Query<'q, Any, AnyArguments<'q>>,
    params: &[SqlValue],
) -> Query<'q, Any, AnyArguments<'q>> {
    for param in params {
        query = match param {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Int(v) => query.bind(*v),
            SqlValue::Float(v) => query.bind(*v),
            SqlValue::Text(v) => query.bind(v.clone()),
            SqlValue::Bool(v) => query.bind(*v),
        };
    }
    query
}

impl QueryExecutor for SqlxExecutor {
    type Row = SqlxRow;

    async fn fetch(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<SqlxRow>, DataError> {
        let query = bind_params(sqlx::query(sql), params);
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.into_data_error())?;
        Ok(rows.into_iter().map(SqlxRow).collect())
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64, DataError> {
        let query = bind_params(sqlx::query(sql), params);
        let result = query
            .execute(&self.pool)
            .await
            .map_err(|e| e.into_data_error())?;
        Ok(result.rows_affected())
    }
}

/// One fetched row, extracted per coercion-category hint.
pub struct SqlxRow(AnyRow);

impl SqlRow for SqlxRow {
    fn value(&self, column: &str, kind: FieldKind) -> Result<SqlValue, DataError> {
        let value = match kind {
            FieldKind::Text
            | FieldKind::CalendarDate
            | FieldKind::Wrapped
            | FieldKind::Identified => self
                .0
                .try_get::<Option<String>, _>(column)
                .map(|v| v.map(SqlValue::Text)),
            FieldKind::Int | FieldKind::EpochDate => self
                .0
                .try_get::<Option<i64>, _>(column)
                .map(|v| v.map(SqlValue::Int)),
            FieldKind::Float => self
                .0
                .try_get::<Option<f64>, _>(column)
                .map(|v| v.map(SqlValue::Float)),
            // Some drivers surface booleans as integers; fall back.
            FieldKind::Bool => self
                .0
                .try_get::<Option<bool>, _>(column)
                .map(|v| v.map(SqlValue::Bool))
                .or_else(|_| {
                    self.0
                        .try_get::<Option<i64>, _>(column)
                        .map(|v| v.map(SqlValue::Int))
                }),
        };
        value
            .map(|v| v.unwrap_or(SqlValue::Null))
            .map_err(|e| e.into_data_error())
    }
}

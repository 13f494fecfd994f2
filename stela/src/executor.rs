use std::future::Future;

use crate::error::DataError;
use crate::row::SqlRow;
use crate::value::SqlValue;

/// The externally supplied query-execution facility.
///
/// Executes parameterized SQL text with positional bind values and returns
/// either a row list (for reads) or an affected-row count (for writes).
/// Connection pooling, transactions, and timeouts are the implementor's
/// concern; the engine is synchronous-per-call on top of it and holds no
/// state of its own between calls.
pub trait QueryExecutor: Send + Sync {
    type Row: SqlRow;

    fn fetch(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> impl Future<Output = Result<Vec<Self::Row>, DataError>> + Send;

    fn execute(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> impl Future<Output = Result<u64, DataError>> + Send;
}

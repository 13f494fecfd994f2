use std::marker::PhantomData;

use crate::entity::{Entity, HardDelete};
use crate::error::DataError;
use crate::executor::QueryExecutor;
use crate::page::{Page, Pageable};
use crate::query::{Criteria, Dialect, UpdateBuilder};
use crate::row::{map_row, DecodePolicy};
use crate::schema::Schema;
use crate::value::SqlValue;

/// Alias every aggregate expression renders under, so backends can fetch the
/// single result column by name.
const AGGREGATE_ALIAS: &str = "agg";

/// Repository construction options.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepoConfig {
    pub dialect: Dialect,
    pub decode_policy: DecodePolicy,
}

/// The outcome of a write operation: the subject's identifier paired with the
/// number of rows the statement affected.
///
/// Lets a caller tell "updated 0 rows" (stale or missing record) from
/// "updated 1 row" without a separate existence check.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationResult {
    pub id: SqlValue,
    pub rows_affected: u64,
}

impl OperationResult {
    pub fn touched(&self) -> bool {
        self.rows_affected > 0
    }
}

/// A generic SQL repository for one entity type over any query-execution
/// facility.
///
/// Composes the cached [`Schema`], the [`Criteria`] fragments, and the row
/// codec into the operation surface every entity-specific layer builds on.
///
/// # Example
///
/// ```ignore
/// let repo = SqlRepository::<UserEntity, _>::new(executor);
/// let active = repo.find_by(&Criteria::new().eq("status", "active")).await?;
/// ```
pub struct SqlRepository<T, X> {
    executor: X,
    config: RepoConfig,
    _marker: PhantomData<T>,
}

impl<T, X: Clone> Clone for SqlRepository<T, X> {
    fn clone(&self) -> Self {
        Self {
            executor: self.executor.clone(),
            config: self.config,
            _marker: PhantomData,
        }
    }
}

impl<T, X> SqlRepository<T, X>
where
    T: Entity,
    X: QueryExecutor,
{
    pub fn new(executor: X) -> Self {
        Self::with_config(executor, RepoConfig::default())
    }

    pub fn with_config(executor: X, config: RepoConfig) -> Self {
        Self {
            executor,
            config,
            _marker: PhantomData,
        }
    }

    /// Get the underlying execution facility.
    pub fn executor(&self) -> &X {
        &self.executor
    }

    /// Single-row fetch by identifier. A missing row is `Ok(None)`.
    pub async fn find_by_id(&self, id: &T::Id) -> Result<Option<T>, DataError> {
        let schema = Schema::of::<T>();
        let criteria = Criteria::new()
            .eq(schema.id_column, id.clone())
            .rows(1);
        Ok(self.select(&criteria).await?.into_iter().next())
    }

    /// Single-row fetch by criteria.
    ///
    /// Fails fast if the criteria's row limit exceeds 1 — that is a caller
    /// contract violation, checked before any statement executes. A limit of
    /// 1 is forced when unset. Zero rows is `Ok(None)`.
    pub async fn find_one(&self, criteria: Criteria) -> Result<Option<T>, DataError> {
        if criteria.row_limit().is_some_and(|rows| rows > 1) {
            return Err(DataError::contract(format!(
                "find_one with a row limit of {}",
                criteria.row_limit().unwrap_or_default()
            )));
        }
        let criteria = criteria.rows(1);
        Ok(self.select(&criteria).await?.into_iter().next())
    }

    /// Every row of the table. Callers relying on an unbounded list do so
    /// deliberately.
    pub async fn find_all(&self) -> Result<Vec<T>, DataError> {
        self.select(&Criteria::new()).await
    }

    /// Zero or more rows matching the criteria; an empty result is a valid,
    /// non-error outcome.
    pub async fn find_by(&self, criteria: &Criteria) -> Result<Vec<T>, DataError> {
        self.select(criteria).await
    }

    /// One page of rows matching the criteria, with the total count.
    pub async fn find_page(
        &self,
        criteria: Criteria,
        pageable: &Pageable,
    ) -> Result<Page<T>, DataError> {
        let total = self.count(&criteria).await?;
        let content = self.select(&criteria.page(pageable)).await?;
        Ok(Page::new(content, pageable, total as u64))
    }

    /// Insert the entity. Requires an already-assigned identifier.
    pub async fn insert(&self, entity: &T) -> Result<OperationResult, DataError> {
        self.insert_inner(entity, false).await
    }

    /// Insert with the storage-engine deferred-write hint (`INSERT DELAYED`,
    /// MySQL only; a plain insert elsewhere). No correctness effect.
    pub async fn insert_delayed(&self, entity: &T) -> Result<OperationResult, DataError> {
        self.insert_inner(entity, true).await
    }

    async fn insert_inner(&self, entity: &T, delayed: bool) -> Result<OperationResult, DataError> {
        let id = self.require_id(entity)?;
        let schema = Schema::of::<T>();
        let values = self.field_values(entity)?;
        let delayed_kw = if delayed && self.config.dialect == Dialect::MySql {
            "DELAYED "
        } else {
            ""
        };
        let sql = format!(
            "INSERT {}INTO {} ({}) VALUES ({})",
            delayed_kw,
            schema.table,
            schema.insert_columns.join(", "),
            schema.insert_placeholders(self.config.dialect),
        );
        tracing::debug!(table = schema.table, sql = %sql, "insert");
        let rows_affected = self
            .executor
            .execute(&sql, &values)
            .await
            .map_err(|e| e.at_table(schema.table))?;
        Ok(OperationResult { id, rows_affected })
    }

    /// Update every mapped non-identifier column by identifier match.
    ///
    /// Affecting zero rows (identifier not present) is a no-op, not an
    /// error; inspect [`OperationResult::rows_affected`] to tell the cases
    /// apart. Last writer wins; there is no optimistic-concurrency check.
    pub async fn update(&self, entity: &T) -> Result<OperationResult, DataError> {
        let id = self.require_id(entity)?;
        let schema = Schema::of::<T>();
        let mut builder = UpdateBuilder::new(schema.table);
        for field in T::fields() {
            if field.column == schema.id_column {
                continue;
            }
            let value = crate::row::encode(field.kind, (field.get)(entity)).map_err(|message| {
                DataError::Decode {
                    table: T::table_name(),
                    column: field.column,
                    message,
                }
            })?;
            builder = builder.set(field.column, value);
        }
        let builder = builder.filter(Criteria::new().eq(schema.id_column, id.clone()));
        let (sql, values) = builder.build(self.config.dialect)?;
        tracing::debug!(table = schema.table, sql = %sql, "update");
        let rows_affected = self
            .executor
            .execute(&sql, &values)
            .await
            .map_err(|e| e.at_table(schema.table))?;
        Ok(OperationResult { id, rows_affected })
    }

    /// Number of rows matching the criteria; zero for an empty table.
    pub async fn count(&self, criteria: &Criteria) -> Result<i64, DataError> {
        self.aggregate("COUNT(*)".to_string(), criteria).await
    }

    /// Sum of a column over the matching rows; zero when no row matches.
    pub async fn sum(&self, column: &str, criteria: &Criteria) -> Result<i64, DataError> {
        self.aggregate(format!("SUM({})", self.mapped_column(column)?), criteria)
            .await
    }

    /// Minimum of a column over the matching rows; zero when no row matches.
    pub async fn min(&self, column: &str, criteria: &Criteria) -> Result<i64, DataError> {
        self.aggregate(format!("MIN({})", self.mapped_column(column)?), criteria)
            .await
    }

    /// Maximum of a column over the matching rows; zero when no row matches.
    pub async fn max(&self, column: &str, criteria: &Criteria) -> Result<i64, DataError> {
        self.aggregate(format!("MAX({})", self.mapped_column(column)?), criteria)
            .await
    }

    /// Add `amount` to a column server-side, in one relative update — no
    /// read-modify-write, so concurrent increments cannot lose writes.
    pub async fn increment(
        &self,
        entity: &T,
        column: &str,
        amount: i64,
    ) -> Result<OperationResult, DataError> {
        self.bump(entity, column, amount).await
    }

    /// Subtract `amount` from a column server-side; see
    /// [`SqlRepository::increment`].
    pub async fn decrement(
        &self,
        entity: &T,
        column: &str,
        amount: i64,
    ) -> Result<OperationResult, DataError> {
        self.bump(entity, column, -amount).await
    }

    async fn bump(&self, entity: &T, column: &str, delta: i64) -> Result<OperationResult, DataError> {
        let id = self.require_id(entity)?;
        let schema = Schema::of::<T>();
        let column = self.mapped_column(column)?;
        let (sql, values) = UpdateBuilder::new(schema.table)
            .add(&column, delta)
            .filter(Criteria::new().eq(schema.id_column, id.clone()))
            .build(self.config.dialect)?;
        tracing::debug!(table = schema.table, sql = %sql, "relative update");
        let rows_affected = self
            .executor
            .execute(&sql, &values)
            .await
            .map_err(|e| e.at_table(schema.table))?;
        Ok(OperationResult { id, rows_affected })
    }

    async fn select(&self, criteria: &Criteria) -> Result<Vec<T>, DataError> {
        let schema = Schema::of::<T>();
        let where_clause = criteria.to_where(self.config.dialect)?;
        let sql = format!(
            "SELECT {} FROM {}{}{}{}",
            schema.select_list,
            schema.table,
            where_clause.sql(),
            criteria.to_order(self.config.dialect)?,
            criteria.to_limit().sql(),
        );
        tracing::debug!(table = schema.table, sql = %sql, "select");
        let rows = self
            .executor
            .fetch(&sql, where_clause.values())
            .await
            .map_err(|e| e.at_table(schema.table))?;
        let mut entities = Vec::with_capacity(rows.len());
        for row in &rows {
            entities.push(map_row::<T, _>(row, self.config.decode_policy)?);
        }
        Ok(entities)
    }

    async fn aggregate(&self, expr: String, criteria: &Criteria) -> Result<i64, DataError> {
        use crate::entity::FieldKind;
        use crate::row::SqlRow;

        let schema = Schema::of::<T>();
        let where_clause = criteria.to_where(self.config.dialect)?;
        let sql = format!(
            "SELECT {expr} AS {AGGREGATE_ALIAS} FROM {}{}",
            schema.table,
            where_clause.sql(),
        );
        tracing::debug!(table = schema.table, sql = %sql, "aggregate");
        let rows = self
            .executor
            .fetch(&sql, where_clause.values())
            .await
            .map_err(|e| e.at_table(schema.table))?;
        // An empty aggregate (no row, or a NULL over no matches) is zero.
        let value = match rows.first() {
            Some(row) => row.value(AGGREGATE_ALIAS, FieldKind::Int)?,
            None => SqlValue::Null,
        };
        match value {
            SqlValue::Null => Ok(0),
            SqlValue::Int(v) => Ok(v),
            SqlValue::Float(v) => Ok(v as i64),
            other => Err(DataError::Decode {
                table: schema.table,
                column: "agg",
                message: format!("non-numeric aggregate result: {other:?}"),
            }),
        }
    }

    fn field_values(&self, entity: &T) -> Result<Vec<SqlValue>, DataError> {
        T::fields()
            .iter()
            .map(|field| {
                crate::row::encode(field.kind, (field.get)(entity)).map_err(|message| {
                    DataError::Decode {
                        table: T::table_name(),
                        column: field.column,
                        message,
                    }
                })
            })
            .collect()
    }

    fn require_id(&self, entity: &T) -> Result<SqlValue, DataError> {
        let id = entity.id_value();
        if id.is_null() {
            return Err(DataError::contract(format!(
                "write on {} with no identifier assigned",
                T::table_name()
            )));
        }
        Ok(id)
    }

    fn mapped_column(&self, column: &str) -> Result<String, DataError> {
        let schema = Schema::of::<T>();
        if !schema.has_column(column) {
            return Err(DataError::contract(format!(
                "{column} is not a mapped column of {}",
                schema.table
            )));
        }
        Ok(column.to_string())
    }
}

impl<T, X> SqlRepository<T, X>
where
    T: HardDelete,
    X: QueryExecutor,
{
    /// Hard-delete the entity's row. Only available for entity types that
    /// opted into [`HardDelete`].
    pub async fn delete(&self, entity: &T) -> Result<OperationResult, DataError> {
        self.require_id(entity)?;
        self.delete_by_id(entity.id()).await
    }

    /// Hard-delete by identifier; zero affected rows is a non-error outcome.
    pub async fn delete_by_id(&self, id: &T::Id) -> Result<OperationResult, DataError> {
        let schema = Schema::of::<T>();
        let id_value: SqlValue = id.clone().into();
        let where_clause = Criteria::new()
            .eq(schema.id_column, id_value.clone())
            .to_where(self.config.dialect)?;
        let sql = format!("DELETE FROM {}{}", schema.table, where_clause.sql());
        tracing::debug!(table = schema.table, sql = %sql, "delete");
        let rows_affected = self
            .executor
            .execute(&sql, where_clause.values())
            .await
            .map_err(|e| e.at_table(schema.table))?;
        Ok(OperationResult {
            id: id_value,
            rows_affected,
        })
    }
}

use std::any::TypeId;
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;

use crate::entity::Entity;
use crate::query::Dialect;

/// The persisted shape of an entity type: its column mapping plus the derived
/// statement fragments every operation reuses.
///
/// Computed from the entity's field descriptor table on first access and
/// cached for the process lifetime (the schema is assumed static at runtime).
/// Concurrent first use may build the value more than once; the results are
/// equal, and exactly one ends up in the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub table: &'static str,
    pub id_column: &'static str,
    /// Ordered column list, identifier included.
    pub columns: Vec<&'static str>,
    /// Comma-joined SELECT field list.
    pub select_list: String,
    /// SELECT field list with each column table-prefixed, for joins.
    pub qualified_select_list: String,
    /// Columns written by INSERT (all of them, in descriptor order).
    pub insert_columns: Vec<&'static str>,
    /// Columns written by UPDATE (identifier excluded).
    pub update_columns: Vec<&'static str>,
}

static SCHEMAS: LazyLock<DashMap<TypeId, Arc<Schema>>> = LazyLock::new(DashMap::new);

impl Schema {
    /// The cached schema for an entity type, computed on first use.
    pub fn of<T: Entity>() -> Arc<Schema> {
        if let Some(schema) = SCHEMAS.get(&TypeId::of::<T>()) {
            return schema.clone();
        }
        let built = Arc::new(Self::build::<T>());
        SCHEMAS
            .entry(TypeId::of::<T>())
            .or_insert(built)
            .clone()
    }

    fn build<T: Entity>() -> Schema {
        let table = T::table_name();
        let id_column = T::id_column();
        let columns: Vec<&'static str> = T::fields().iter().map(|f| f.column).collect();
        let select_list = columns.join(", ");
        let qualified_select_list = columns
            .iter()
            .map(|c| format!("{table}.{c}"))
            .collect::<Vec<_>>()
            .join(", ");
        let update_columns = columns
            .iter()
            .copied()
            .filter(|c| *c != id_column)
            .collect();
        Schema {
            table,
            id_column,
            insert_columns: columns.clone(),
            update_columns,
            select_list,
            qualified_select_list,
            columns,
        }
    }

    /// The placeholder list for an INSERT over [`Schema::insert_columns`],
    /// e.g. `?, ?, ?` or `$1, $2, $3`.
    pub fn insert_placeholders(&self, dialect: Dialect) -> String {
        (1..=self.insert_columns.len())
            .map(|i| dialect.placeholder(i))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Whether a column belongs to this schema's mapping.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| *c == column)
    }
}

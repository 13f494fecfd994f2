use crate::entity::Keyed;
use crate::error::DataError;
use crate::page::Pageable;
use crate::value::SqlValue;

/// The SQL dialect statements are rendered for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Dialect {
    /// Generic SQL using `?` placeholders (default).
    #[default]
    Generic,
    /// SQLite-style `?` placeholders.
    Sqlite,
    /// MySQL-style `?` placeholders.
    MySql,
    /// Postgres-style `$1, $2, ...` placeholders.
    Postgres,
}

impl Dialect {
    pub(crate) fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${index}"),
            Dialect::Generic | Dialect::Sqlite | Dialect::MySql => "?".to_string(),
        }
    }

    fn random_fn(self) -> &'static str {
        match self {
            Dialect::MySql => "RAND()",
            Dialect::Generic | Dialect::Sqlite | Dialect::Postgres => "RANDOM()",
        }
    }
}

/// A fluent description of filter, sort, and pagination intent, independent
/// of any entity type.
///
/// A criteria is mutable while it is being built and is rendered exactly once
/// into its SQL fragments by the repository: a [`Where`] (conditions plus
/// bind values), an ORDER BY fragment, and a [`Limit`].
///
/// # Example
///
/// ```ignore
/// let c = Criteria::new()
///     .eq("status", "active")
///     .like("name", "ali*")
///     .order_by("id", true)
///     .rows(10);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    conditions: Vec<Condition>,
    order: Vec<Order>,
    rows: Option<u64>,
    offset: Option<u64>,
}

#[derive(Debug, Clone)]
enum Condition {
    Eq(String, SqlValue),
    Ne(String, SqlValue),
    Gt(String, SqlValue),
    Lt(String, SqlValue),
    Like(String, String),
    In(String, Vec<SqlValue>),
    IsNull(String),
    IsNotNull(String),
    /// A parenthesized OR-group, ANDed into the outer conditions.
    Any(Vec<Condition>),
}

#[derive(Debug, Clone)]
enum Order {
    Column(String, bool),
    Random,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.conditions
            .push(Condition::Eq(column.to_string(), value.into()));
        self
    }

    pub fn ne(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.conditions
            .push(Condition::Ne(column.to_string(), value.into()));
        self
    }

    pub fn gt(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.conditions
            .push(Condition::Gt(column.to_string(), value.into()));
        self
    }

    pub fn lt(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.conditions
            .push(Condition::Lt(column.to_string(), value.into()));
        self
    }

    /// Pattern match. Caller-facing `*` wildcards are translated to SQL `%`
    /// before binding; the pattern is always a bind value, never spliced into
    /// the statement text.
    pub fn like(mut self, column: &str, pattern: &str) -> Self {
        self.conditions.push(Condition::Like(
            column.to_string(),
            pattern.replace('*', "%"),
        ));
        self
    }

    pub fn in_(mut self, column: &str, values: impl IntoIterator<Item = impl Into<SqlValue>>) -> Self {
        self.conditions.push(Condition::In(
            column.to_string(),
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn null(mut self, column: &str) -> Self {
        self.conditions.push(Condition::IsNull(column.to_string()));
        self
    }

    pub fn not_null(mut self, column: &str) -> Self {
        self.conditions
            .push(Condition::IsNotNull(column.to_string()));
        self
    }

    /// Equality against the column implied by the value itself; used for
    /// foreign-key-style filtering.
    pub fn eq_key<K: Keyed>(self, value: &K) -> Self {
        self.eq(K::column(), value.key())
    }

    /// AND in a parenthesized group whose conditions are joined with `OR`.
    ///
    /// The sub-criteria contributes conditions only; any ordering or
    /// pagination set on it is ignored.
    pub fn any(mut self, sub: Criteria) -> Self {
        if !sub.conditions.is_empty() {
            self.conditions.push(Condition::Any(sub.conditions));
        }
        self
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.order.push(Order::Column(column.to_string(), ascending));
        self
    }

    pub fn order_random(mut self) -> Self {
        self.order.push(Order::Random);
        self
    }

    pub fn rows(mut self, rows: u64) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Apply a [`Pageable`]: `offset = page * size`, `rows = size`, plus its
    /// sort directive if present.
    pub fn page(mut self, pageable: &Pageable) -> Self {
        self.rows = Some(pageable.size);
        self.offset = Some(pageable.offset());
        if let Some((column, ascending)) = pageable.order() {
            self.order.push(Order::Column(column, ascending));
        }
        self
    }

    /// The row limit, if one has been set.
    pub fn row_limit(&self) -> Option<u64> {
        self.rows
    }

    /// Render the conditions into a `WHERE` fragment with its bind values.
    ///
    /// The fragment is empty when there are no conditions (matches all rows);
    /// otherwise it starts with a leading ` WHERE `. The value list is in
    /// condition declaration order and its length always equals the number of
    /// placeholders in the fragment.
    pub fn to_where(&self, dialect: Dialect) -> Result<Where, DataError> {
        let mut sql = String::new();
        let mut values = Vec::new();
        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            let mut index = 1usize;
            render_conditions(&self.conditions, " AND ", dialect, &mut sql, &mut values, &mut index)?;
        }
        Ok(Where { sql, values })
    }

    /// Render the ordering into an ` ORDER BY` fragment, or an empty string.
    pub fn to_order(&self, dialect: Dialect) -> Result<String, DataError> {
        if self.order.is_empty() {
            return Ok(String::new());
        }
        let mut clauses = Vec::with_capacity(self.order.len());
        for order in &self.order {
            match order {
                Order::Column(column, ascending) => {
                    check_identifier(column)?;
                    clauses.push(if *ascending {
                        format!("{column} ASC")
                    } else {
                        format!("{column} DESC")
                    });
                }
                Order::Random => clauses.push(dialect.random_fn().to_string()),
            }
        }
        Ok(format!(" ORDER BY {}", clauses.join(", ")))
    }

    /// Render the pagination bounds into a [`Limit`].
    pub fn to_limit(&self) -> Limit {
        let mut sql = String::new();
        if let Some(rows) = self.rows {
            sql.push_str(&format!(" LIMIT {rows}"));
        }
        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }
        Limit { sql }
    }
}

fn render_conditions(
    conditions: &[Condition],
    joiner: &str,
    dialect: Dialect,
    sql: &mut String,
    values: &mut Vec<SqlValue>,
    index: &mut usize,
) -> Result<(), DataError> {
    let mut first = true;
    for cond in conditions {
        if !first {
            sql.push_str(joiner);
        }
        first = false;
        match cond {
            Condition::Eq(col, val) => render_binary(col, "=", val, dialect, sql, values, index)?,
            Condition::Ne(col, val) => render_binary(col, "!=", val, dialect, sql, values, index)?,
            Condition::Gt(col, val) => render_binary(col, ">", val, dialect, sql, values, index)?,
            Condition::Lt(col, val) => render_binary(col, "<", val, dialect, sql, values, index)?,
            Condition::Like(col, pattern) => {
                check_identifier(col)?;
                let placeholder = dialect.placeholder(*index);
                *index += 1;
                sql.push_str(&format!("{col} LIKE {placeholder}"));
                values.push(SqlValue::Text(pattern.clone()));
            }
            Condition::In(col, vals) => {
                check_identifier(col)?;
                let placeholders: Vec<_> = vals
                    .iter()
                    .map(|_| {
                        let placeholder = dialect.placeholder(*index);
                        *index += 1;
                        placeholder
                    })
                    .collect();
                sql.push_str(&format!("{col} IN ({})", placeholders.join(", ")));
                values.extend(vals.iter().cloned());
            }
            Condition::IsNull(col) => {
                check_identifier(col)?;
                sql.push_str(&format!("{col} IS NULL"));
            }
            Condition::IsNotNull(col) => {
                check_identifier(col)?;
                sql.push_str(&format!("{col} IS NOT NULL"));
            }
            Condition::Any(group) => {
                sql.push('(');
                render_conditions(group, " OR ", dialect, sql, values, index)?;
                sql.push(')');
            }
        }
    }
    Ok(())
}

fn render_binary(
    col: &str,
    op: &str,
    val: &SqlValue,
    dialect: Dialect,
    sql: &mut String,
    values: &mut Vec<SqlValue>,
    index: &mut usize,
) -> Result<(), DataError> {
    check_identifier(col)?;
    let placeholder = dialect.placeholder(*index);
    *index += 1;
    sql.push_str(&format!("{col} {op} {placeholder}"));
    values.push(val.clone());
    Ok(())
}

/// An immutable `WHERE` fragment paired with its positional bind values.
#[derive(Debug, Clone, PartialEq)]
pub struct Where {
    sql: String,
    values: Vec<SqlValue>,
}

impl Where {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<SqlValue> {
        self.values
    }
}

/// An immutable `LIMIT`/`OFFSET` fragment; empty when unbounded.
#[derive(Debug, Clone, PartialEq)]
pub struct Limit {
    sql: String,
}

impl Limit {
    pub fn sql(&self) -> &str {
        &self.sql
    }
}

/// Builder for `UPDATE` statements.
///
/// Carries both absolute assignments (`set`) and relative ones (`add`,
/// rendered as `col = col + ?`), so plain updates and server-side
/// increment/decrement share one SQL-building path.
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: String,
    assignments: Vec<Assignment>,
    criteria: Criteria,
}

#[derive(Debug, Clone)]
enum Assignment {
    Set(String, SqlValue),
    Add(String, i64),
}

impl UpdateBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            assignments: Vec::new(),
            criteria: Criteria::new(),
        }
    }

    pub fn set(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.assignments
            .push(Assignment::Set(column.to_string(), value.into()));
        self
    }

    /// Relative assignment applied server-side in a single statement; pass a
    /// negative delta to decrement.
    pub fn add(mut self, column: &str, delta: i64) -> Self {
        self.assignments
            .push(Assignment::Add(column.to_string(), delta));
        self
    }

    pub fn filter(mut self, criteria: Criteria) -> Self {
        self.criteria = criteria;
        self
    }

    /// Render into `(sql, bind_values)`. Assignment values come first, then
    /// the filter's values, matching placeholder order.
    pub fn build(&self, dialect: Dialect) -> Result<(String, Vec<SqlValue>), DataError> {
        check_identifier(&self.table)?;
        if self.assignments.is_empty() {
            return Err(DataError::contract("update with no assignments"));
        }
        let mut values = Vec::with_capacity(self.assignments.len());
        let mut index = 1usize;
        let mut clauses = Vec::with_capacity(self.assignments.len());
        for assignment in &self.assignments {
            match assignment {
                Assignment::Set(col, val) => {
                    check_identifier(col)?;
                    let placeholder = dialect.placeholder(index);
                    index += 1;
                    clauses.push(format!("{col} = {placeholder}"));
                    values.push(val.clone());
                }
                Assignment::Add(col, delta) => {
                    check_identifier(col)?;
                    let placeholder = dialect.placeholder(index);
                    index += 1;
                    clauses.push(format!("{col} = {col} + {placeholder}"));
                    values.push(SqlValue::Int(*delta));
                }
            }
        }
        let mut sql = format!("UPDATE {} SET {}", self.table, clauses.join(", "));
        if !self.criteria.conditions.is_empty() {
            sql.push_str(" WHERE ");
            render_conditions(
                &self.criteria.conditions,
                " AND ",
                dialect,
                &mut sql,
                &mut values,
                &mut index,
            )?;
        }
        Ok((sql, values))
    }
}

/// Reject identifiers that could smuggle SQL into the statement text.
///
/// Table and column names come from compile-time descriptor tables in normal
/// use, but criteria columns are plain strings, so every identifier is
/// validated against a conservative `[A-Za-z_][A-Za-z0-9_]*` pattern
/// (dot-separated segments allowed for table-prefixed columns).
pub(crate) fn check_identifier(ident: &str) -> Result<(), DataError> {
    if ident.is_empty() || !ident.split('.').all(is_valid_segment) {
        return Err(DataError::contract(format!("invalid identifier: {ident}")));
    }
    Ok(())
}

fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Errors that can occur in the data layer.
#[derive(Debug)]
pub enum DataError {
    /// Absence reported by the execution facility. `find_by_id` and
    /// `find_one` never produce this themselves; a missing row is `Ok(None)`.
    NotFound(String),
    /// A failure surfaced by the underlying execution facility, tagged with
    /// the table the statement targeted.
    Database {
        table: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// A column could not be coerced into its entity field.
    Decode {
        table: &'static str,
        column: &'static str,
        message: String,
    },
    /// A caller-contract violation: a programming error, not a data
    /// condition. Fails before any statement executes.
    Contract(String),
}

impl DataError {
    /// Construct a `Database` variant from any error type.
    ///
    /// Used by backend crates to wrap driver-specific errors; the repository
    /// fills in the table name via [`DataError::at_table`].
    pub fn database(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        DataError::Database {
            table: String::new(),
            source: Box::new(err),
        }
    }

    pub fn contract(message: impl Into<String>) -> Self {
        DataError::Contract(message.into())
    }

    /// Attach the originating table name to a database failure.
    pub fn at_table(self, table: &str) -> Self {
        match self {
            DataError::Database { source, .. } => DataError::Database {
                table: table.to_string(),
                source,
            },
            other => other,
        }
    }
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::NotFound(msg) => write!(f, "Not found: {msg}"),
            DataError::Database { table, source } if table.is_empty() => {
                write!(f, "Database error: {source}")
            }
            DataError::Database { table, source } => {
                write!(f, "Database error on {table}: {source}")
            }
            DataError::Decode {
                table,
                column,
                message,
            } => write!(f, "Decode error on {table}.{column}: {message}"),
            DataError::Contract(msg) => write!(f, "Contract violation: {msg}"),
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Database { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

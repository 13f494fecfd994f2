use chrono::{DateTime, NaiveDate, Utc};

use crate::entity::FieldError;

/// A raw scalar as it travels to and from the database.
///
/// This is the shape of every bind parameter and every fetched column; the
/// richer [`FieldValue`] representation is converted to and from it per
/// coercion category by the row codec.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl std::fmt::Display for SqlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Int(v) => write!(f, "{v}"),
            SqlValue::Float(v) => write!(f, "{v}"),
            SqlValue::Text(v) => write!(f, "{v}"),
            SqlValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<i16> for SqlValue {
    fn from(v: i16) -> Self {
        SqlValue::Int(v as i64)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v as i64)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}

/// A field value in its rich, entity-side representation.
///
/// Entity getters produce these and entity setters consume them; the codec in
/// [`crate::row`] handles the persisted form (epoch milliseconds, hyphenated
/// calendar dates, identifier strings).
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
}

impl FieldValue {
    /// Extract a text value, mapping `Null` to `None`.
    pub fn into_text(self) -> Result<Option<String>, FieldError> {
        match self {
            FieldValue::Null => Ok(None),
            FieldValue::Text(s) => Ok(Some(s)),
            _ => Err(FieldError::mismatch("text")),
        }
    }

    pub fn into_bool(self) -> Result<Option<bool>, FieldError> {
        match self {
            FieldValue::Null => Ok(None),
            FieldValue::Bool(b) => Ok(Some(b)),
            _ => Err(FieldError::mismatch("bool")),
        }
    }

    pub fn into_int(self) -> Result<Option<i64>, FieldError> {
        match self {
            FieldValue::Null => Ok(None),
            FieldValue::Int(i) => Ok(Some(i)),
            _ => Err(FieldError::mismatch("integer")),
        }
    }

    pub fn into_float(self) -> Result<Option<f64>, FieldError> {
        match self {
            FieldValue::Null => Ok(None),
            FieldValue::Float(v) => Ok(Some(v)),
            FieldValue::Int(i) => Ok(Some(i as f64)),
            _ => Err(FieldError::mismatch("float")),
        }
    }

    pub fn into_datetime(self) -> Result<Option<DateTime<Utc>>, FieldError> {
        match self {
            FieldValue::Null => Ok(None),
            FieldValue::DateTime(dt) => Ok(Some(dt)),
            _ => Err(FieldError::mismatch("datetime")),
        }
    }

    pub fn into_date(self) -> Result<Option<NaiveDate>, FieldError> {
        match self {
            FieldValue::Null => Ok(None),
            FieldValue::Date(d) => Ok(Some(d)),
            _ => Err(FieldError::mismatch("date")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(v as i64)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        FieldValue::DateTime(v)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(v: NaiveDate) -> Self {
        FieldValue::Date(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(FieldValue::Null, Into::into)
    }
}

//! Row-to-entity population and the per-category value codec.

use chrono::{DateTime, NaiveDate};

use crate::entity::{Entity, FieldError, FieldKind};
use crate::error::DataError;
use crate::value::{FieldValue, SqlValue};

/// One fetched result row, as exposed by the query-execution facility.
///
/// The `kind` hint tells the backend what scalar shape to extract, so a
/// driver does not need to guess column types: an `EpochDate` column is read
/// as an integer, a `CalendarDate` column as text.
pub trait SqlRow {
    fn value(&self, column: &str, kind: FieldKind) -> Result<SqlValue, DataError>;
}

/// How strictly row population treats values a field cannot absorb.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodePolicy {
    /// Null into a required numeric field becomes zero, other rejected
    /// values leave the field at its default; both are logged. The entity
    /// returned is best-effort complete.
    #[default]
    Lenient,
    /// Every rejected value surfaces as [`DataError::Decode`].
    Strict,
}

/// Populate a fresh entity from one result row, column by column.
pub fn map_row<T: Entity, R: SqlRow>(row: &R, policy: DecodePolicy) -> Result<T, DataError> {
    let mut entity = T::default();
    for field in T::fields() {
        let raw = row.value(field.column, field.kind)?;
        let value = decode(field.kind, raw).map_err(|message| DataError::Decode {
            table: T::table_name(),
            column: field.column,
            message,
        })?;
        if let Err(err) = (field.set)(&mut entity, value) {
            absorb_field_error::<T>(&mut entity, field, err, policy)?;
        }
    }
    Ok(entity)
}

fn absorb_field_error<T: Entity>(
    entity: &mut T,
    field: &crate::entity::FieldDef<T>,
    err: FieldError,
    policy: DecodePolicy,
) -> Result<(), DataError> {
    if policy == DecodePolicy::Strict {
        return Err(DataError::Decode {
            table: T::table_name(),
            column: field.column,
            message: err.to_string(),
        });
    }
    if err == FieldError::Null {
        if let Some(zero) = field.kind.zero() {
            tracing::warn!(
                table = T::table_name(),
                column = field.column,
                "null column coerced to zero for a required field"
            );
            // The zero value matches the field's kind, so this cannot reject.
            let _ = (field.set)(entity, zero);
            return Ok(());
        }
    }
    tracing::warn!(
        table = T::table_name(),
        column = field.column,
        error = %err,
        "column skipped during row population, field left at its default"
    );
    Ok(())
}

/// Coerce a raw column scalar into its rich field value per category.
pub fn decode(kind: FieldKind, raw: SqlValue) -> Result<FieldValue, String> {
    if raw.is_null() {
        return Ok(FieldValue::Null);
    }
    match (kind, raw) {
        (FieldKind::Text | FieldKind::Wrapped | FieldKind::Identified, SqlValue::Text(s)) => {
            Ok(FieldValue::Text(s))
        }
        (FieldKind::Bool, SqlValue::Bool(b)) => Ok(FieldValue::Bool(b)),
        (FieldKind::Bool, SqlValue::Int(i)) => Ok(FieldValue::Bool(i != 0)),
        (FieldKind::Int, SqlValue::Int(i)) => Ok(FieldValue::Int(i)),
        (FieldKind::Float, SqlValue::Float(v)) => Ok(FieldValue::Float(v)),
        (FieldKind::Float, SqlValue::Int(i)) => Ok(FieldValue::Float(i as f64)),
        (FieldKind::EpochDate, SqlValue::Int(millis)) => DateTime::from_timestamp_millis(millis)
            .map(FieldValue::DateTime)
            .ok_or_else(|| format!("epoch milliseconds out of range: {millis}")),
        (FieldKind::CalendarDate, SqlValue::Text(s)) => parse_calendar_date(&s).map(FieldValue::Date),
        (kind, raw) => Err(format!("cannot coerce {raw:?} into a {kind:?} field")),
    }
}

/// Coerce a rich field value into its persisted scalar per category.
pub fn encode(kind: FieldKind, value: FieldValue) -> Result<SqlValue, String> {
    match (kind, value) {
        (_, FieldValue::Null) => Ok(SqlValue::Null),
        (FieldKind::Text | FieldKind::Wrapped | FieldKind::Identified, FieldValue::Text(s)) => {
            Ok(SqlValue::Text(s))
        }
        (FieldKind::Bool, FieldValue::Bool(b)) => Ok(SqlValue::Bool(b)),
        (FieldKind::Int, FieldValue::Int(i)) => Ok(SqlValue::Int(i)),
        (FieldKind::Float, FieldValue::Float(v)) => Ok(SqlValue::Float(v)),
        (FieldKind::Float, FieldValue::Int(i)) => Ok(SqlValue::Float(i as f64)),
        (FieldKind::EpochDate, FieldValue::DateTime(dt)) => {
            Ok(SqlValue::Int(dt.timestamp_millis()))
        }
        (FieldKind::CalendarDate, FieldValue::Date(d)) => {
            Ok(SqlValue::Text(d.format("%Y-%m-%d").to_string()))
        }
        (kind, value) => Err(format!("cannot store {value:?} as a {kind:?} column")),
    }
}

/// Parse the hyphen-joined `year-month-day` storage form.
fn parse_calendar_date(s: &str) -> Result<NaiveDate, String> {
    let mut parts = s.splitn(3, '-');
    let (y, m, d) = match (parts.next(), parts.next(), parts.next()) {
        (Some(y), Some(m), Some(d)) => (y, m, d),
        _ => return Err(format!("malformed calendar date: {s}")),
    };
    let parse = |p: &str| p.parse::<u32>().map_err(|_| format!("malformed calendar date: {s}"));
    let year = parse(y)? as i32;
    NaiveDate::from_ymd_opt(year, parse(m)?, parse(d)?)
        .ok_or_else(|| format!("calendar date out of range: {s}"))
}

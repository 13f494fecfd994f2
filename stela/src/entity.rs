use crate::value::{FieldValue, SqlValue};

/// Trait representing a database entity with a table name, id column, and a
/// field descriptor table.
///
/// The descriptor table replaces runtime introspection: each persisted field
/// declares its column name, its coercion category, and a getter/setter pair,
/// all resolved at compile time. Fields that should not be persisted
/// (computed values, in-memory collections) are simply left out of the table.
///
/// # Example
///
/// ```ignore
/// impl Entity for UserEntity {
///     type Id = i64;
///     fn table_name() -> &'static str { "user" }
///     fn id_column() -> &'static str { "id" }
///     fn fields() -> &'static [FieldDef<Self>] { &USER_FIELDS }
///     fn id(&self) -> &i64 { &self.id }
/// }
/// ```
pub trait Entity: Default + Send + Sync + Unpin + 'static {
    type Id: Clone + Into<SqlValue> + Send + Sync + 'static;

    fn table_name() -> &'static str;
    fn id_column() -> &'static str;
    fn fields() -> &'static [FieldDef<Self>];
    fn id(&self) -> &Self::Id;

    /// The identifier as a bind value. `SqlValue::Null` means "not assigned",
    /// which every write operation rejects up front.
    fn id_value(&self) -> SqlValue {
        self.id().clone().into()
    }
}

/// Marker for entity types that allow hard `DELETE` statements.
///
/// Deletion is opt-in per entity type: most callers keep rows around and flip
/// a status column instead. Without this marker the repository's `delete`
/// methods do not exist for the type, so an accidental hard delete is a
/// compile error rather than a runtime surprise.
pub trait HardDelete: Entity {}

/// The coercion category of a persisted field.
///
/// Determines the raw column shape ([`SqlValue`]) a field is stored as and
/// how it is converted back into its rich [`FieldValue`] form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Plain text, passed through unchanged.
    Text,
    Bool,
    Int,
    Float,
    /// Date-time stored as an epoch-millisecond integer.
    EpochDate,
    /// Date-only value stored as a hyphen-joined `year-month-day` string.
    CalendarDate,
    /// From-string-constructible wrapper (typed identifiers and the like),
    /// stored as its string form.
    Wrapped,
    /// Enum resolved by its own identifier string, see [`Identified`].
    Identified,
}

impl FieldKind {
    /// Whether a null column can be coerced to a zero value when the
    /// destination field cannot represent absence.
    pub(crate) fn zero(self) -> Option<FieldValue> {
        match self {
            FieldKind::Int => Some(FieldValue::Int(0)),
            FieldKind::Float => Some(FieldValue::Float(0.0)),
            FieldKind::Bool => Some(FieldValue::Bool(false)),
            _ => None,
        }
    }
}

/// Why a setter rejected a decoded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    /// Null arrived for a field that cannot represent absence.
    Null,
    /// The decoded value's shape does not match the field's type.
    Mismatch { expected: &'static str },
}

impl FieldError {
    pub fn mismatch(expected: &'static str) -> Self {
        FieldError::Mismatch { expected }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldError::Null => write!(f, "null value for a required field"),
            FieldError::Mismatch { expected } => write!(f, "expected {expected} value"),
        }
    }
}

impl std::error::Error for FieldError {}

/// One entry of an entity's column mapping.
pub struct FieldDef<T> {
    pub column: &'static str,
    pub kind: FieldKind,
    pub get: fn(&T) -> FieldValue,
    pub set: fn(&mut T, FieldValue) -> Result<(), FieldError>,
}

/// An enum whose variants are persisted by their own identifier string.
pub trait Identified: Sized {
    fn ident(&self) -> &'static str;
    fn from_ident(id: &str) -> Option<Self>;
}

/// A value that knows which column it filters on.
///
/// Typed foreign-key identifiers implement this so a criteria can say
/// "rows whose `account_id` equals this account's id" without the caller
/// repeating the column name, see [`crate::query::Criteria::eq_key`].
pub trait Keyed {
    fn column() -> &'static str;
    fn key(&self) -> SqlValue;
}

/// Encode an [`Identified`] enum for storage.
pub fn encode_identified<E: Identified>(value: Option<&E>) -> FieldValue {
    match value {
        Some(e) => FieldValue::Text(e.ident().to_string()),
        None => FieldValue::Null,
    }
}

/// Decode an [`Identified`] enum from its stored identifier string.
pub fn decode_identified<E: Identified>(value: FieldValue) -> Result<Option<E>, FieldError> {
    match value.into_text()? {
        None => Ok(None),
        Some(s) => match E::from_ident(&s) {
            Some(e) => Ok(Some(e)),
            None => Err(FieldError::mismatch("known variant identifier")),
        },
    }
}

/// Encode a from-string-constructible wrapper for storage.
pub fn encode_wrapped<W: std::fmt::Display>(value: Option<&W>) -> FieldValue {
    match value {
        Some(w) => FieldValue::Text(w.to_string()),
        None => FieldValue::Null,
    }
}

/// Decode a from-string-constructible wrapper from its stored string.
pub fn decode_wrapped<W: std::str::FromStr>(value: FieldValue) -> Result<Option<W>, FieldError> {
    match value.into_text()? {
        None => Ok(None),
        Some(s) => match s.parse::<W>() {
            Ok(w) => Ok(Some(w)),
            Err(_) => Err(FieldError::mismatch("parseable wrapper string")),
        },
    }
}

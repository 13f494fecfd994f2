//! # stela — a descriptor-driven entity-relational mapping engine
//!
//! Maps record types to relational tables through compile-time field
//! descriptor tables instead of runtime reflection, builds parameterized SQL
//! from a fluent [`Criteria`] DSL, and coerces result columns back into typed
//! entity fields by coercion category. Statement execution is delegated to an
//! externally supplied [`QueryExecutor`] (see the `stela-sqlx` crate for the
//! SQLx-backed one); connection pooling and transaction boundaries stay with
//! the caller.

pub mod crud;
pub mod entity;
pub mod error;
pub mod executor;
pub mod naming;
pub mod page;
pub mod query;
pub mod repository;
pub mod row;
pub mod schema;
pub mod value;

pub use crud::{OperationResult, RepoConfig, SqlRepository};
pub use entity::{Entity, FieldDef, FieldError, FieldKind, HardDelete, Identified, Keyed};
pub use error::DataError;
pub use executor::QueryExecutor;
pub use page::{Page, Pageable};
pub use query::{Criteria, Dialect, Limit, UpdateBuilder, Where};
pub use repository::Repository;
pub use row::{DecodePolicy, SqlRow};
pub use schema::Schema;
pub use value::{FieldValue, SqlValue};

pub mod prelude {
    //! Re-exports of the most commonly used data types.
    pub use crate::{
        Criteria, DataError, DecodePolicy, Entity, FieldDef, FieldKind, FieldValue, OperationResult,
        Page, Pageable, RepoConfig, Repository, SqlRepository, SqlValue,
    };
}

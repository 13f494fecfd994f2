//! # stela-sqlx — SQLx backend for the stela mapping engine
//!
//! This crate provides the [SQLx](https://github.com/launchbadge/sqlx)-backed
//! implementation of `stela`'s query-execution facility. It depends on
//! [`stela`] for the engine (entity descriptors, criteria DSL, row codec,
//! repository) and adds the pool wrapper and error bridging needed to talk to
//! a real database through `sqlx::Any`.
//!
//! # What's in this crate
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SqlxExecutor`] | `QueryExecutor` implementation wrapping an `sqlx::AnyPool` |
//! | [`SqlxRow`] | `SqlRow` adapter over `sqlx::any::AnyRow` |
//! | [`SqlxErrorExt`] | Extension trait to convert `sqlx::Error` → `DataError` (`.into_data_error()`) |
//! | [`SqlxResult<T>`] | Type alias for `Result<T, DataError>` |
//!
//! # Feature flags
//!
//! Enable the driver(s) the `Any` pool should be able to reach:
//!
//! | Feature    | Driver |
//! |------------|--------|
//! | `sqlite`   | SQLite via `sqlx/sqlite` |
//! | `postgres` | PostgreSQL via `sqlx/postgres` |
//! | `mysql`    | MySQL via `sqlx/mysql` |
//!
//! # Quick start
//!
//! ```ignore
//! use stela::{Criteria, Dialect, RepoConfig, SqlRepository};
//! use stela_sqlx::SqlxExecutor;
//!
//! sqlx::any::install_default_drivers();
//! let pool = sqlx::AnyPool::connect("sqlite://app.db").await?;
//! let repo = SqlRepository::<UserEntity, _>::with_config(
//!     SqlxExecutor::new(pool),
//!     RepoConfig { dialect: Dialect::Sqlite, ..Default::default() },
//! );
//! let user = repo.find_by_id(&42).await?;
//! ```
//!
//! Transactions and pool lifecycle stay with the caller: construct the
//! `AnyPool` yourself and hand it in.

pub mod error;
pub mod executor;

pub use error::{SqlxErrorExt, SqlxResult};
pub use executor::{SqlxExecutor, SqlxRow};

/// Re-exports of the most commonly used types from both `stela` and this
/// crate.
pub mod prelude {
    pub use crate::{SqlxErrorExt, SqlxExecutor};
    pub use stela::prelude::*;
}

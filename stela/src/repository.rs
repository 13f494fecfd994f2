use std::future::Future;

use crate::crud::{OperationResult, SqlRepository};
use crate::entity::Entity;
use crate::error::DataError;
use crate::executor::QueryExecutor;
use crate::page::{Page, Pageable};
use crate::query::Criteria;

/// Generic async repository trait for CRUD operations.
///
/// The abstraction Manager-layer callers program against; implemented by
/// [`SqlRepository`]. Uses RPITIT (return-position `impl Trait` in traits) —
/// no `async-trait` needed. Hard deletion is deliberately absent: it is a
/// per-entity capability, see [`crate::entity::HardDelete`].
pub trait Repository<T, Id>: Send + Sync
where
    T: Send + Sync + 'static,
    Id: Send + Sync + 'static,
{
    fn find_by_id(&self, id: &Id) -> impl Future<Output = Result<Option<T>, DataError>> + Send;
    fn find_all(&self) -> impl Future<Output = Result<Vec<T>, DataError>> + Send;
    fn find_all_paged(
        &self,
        pageable: &Pageable,
    ) -> impl Future<Output = Result<Page<T>, DataError>> + Send;
    fn insert(&self, entity: &T) -> impl Future<Output = Result<OperationResult, DataError>> + Send;
    fn update(&self, entity: &T) -> impl Future<Output = Result<OperationResult, DataError>> + Send;
    fn count_all(&self) -> impl Future<Output = Result<i64, DataError>> + Send;
}

impl<T, X> Repository<T, T::Id> for SqlRepository<T, X>
where
    T: Entity,
    X: QueryExecutor,
{
    async fn find_by_id(&self, id: &T::Id) -> Result<Option<T>, DataError> {
        SqlRepository::find_by_id(self, id).await
    }

    async fn find_all(&self) -> Result<Vec<T>, DataError> {
        SqlRepository::find_all(self).await
    }

    async fn find_all_paged(&self, pageable: &Pageable) -> Result<Page<T>, DataError> {
        SqlRepository::find_page(self, Criteria::new(), pageable).await
    }

    async fn insert(&self, entity: &T) -> Result<OperationResult, DataError> {
        SqlRepository::insert(self, entity).await
    }

    async fn update(&self, entity: &T) -> Result<OperationResult, DataError> {
        SqlRepository::update(self, entity).await
    }

    async fn count_all(&self) -> Result<i64, DataError> {
        SqlRepository::count(self, &Criteria::new()).await
    }
}

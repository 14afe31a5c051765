//! # Rule Store Contract
//!
//! [`RuleStore`] is the key-indexed CRUD contract the engines and the admin
//! catalog are written against. Hosts plug in whatever persistence they run;
//! [`MemoryStore`](crate::MemoryStore) is the bundled implementation.
//!
//! Writes are atomic per call and per entity kind. Nothing is atomic across
//! kinds: callers that write several kinds must tolerate a partial result.
//!
//! [`TimedStore`] bounds every operation of an inner store with a deadline.

use std::future::Future;
use std::time::Duration;

use crate::error::StoreError;
use crate::kind::{IndexName, StoreRecord};

/// Async CRUD and indexed lookup, scoped per entity kind.
///
/// Any operation may fail with [`StoreError::Unavailable`].
pub trait RuleStore: Send + Sync {
    /// Every record of kind `R`, active or not.
    fn get_all<R: StoreRecord>(&self) -> impl Future<Output = Result<Vec<R>, StoreError>> + Send;

    /// The record with `id`, if stored.
    fn get_by_id<R: StoreRecord>(
        &self,
        id: R::Id,
    ) -> impl Future<Output = Result<Option<R>, StoreError>> + Send;

    /// Records whose `index` value equals `value`.
    fn get_by_index<R: StoreRecord>(
        &self,
        index: IndexName,
        value: &str,
    ) -> impl Future<Output = Result<Vec<R>, StoreError>> + Send;

    /// Insert or replace one record.
    fn put<R: StoreRecord>(&self, record: R) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Insert or replace many records of one kind. Either all are written or
    /// none are.
    fn put_batch<R: StoreRecord>(
        &self,
        records: Vec<R>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Hard-delete one record. [`StoreError::NotFound`] if absent.
    fn delete<R: StoreRecord>(&self, id: R::Id)
        -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Number of stored records of kind `R`.
    fn count<R: StoreRecord>(&self) -> impl Future<Output = Result<usize, StoreError>> + Send;

    /// Remove every record of every kind.
    fn clear_all(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Default per-operation deadline for [`TimedStore`].
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Wraps a store and fails any operation that outlives `timeout` with
/// [`StoreError::Timeout`].
#[derive(Debug, Clone)]
pub struct TimedStore<S> {
    inner: S,
    timeout: Duration,
}

impl<S: RuleStore> TimedStore<S> {
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "rule store operation timed out"
                );
                Err(StoreError::Timeout {
                    operation,
                    after_ms: self.timeout.as_millis() as u64,
                })
            }
        }
    }
}

impl<S: RuleStore> RuleStore for TimedStore<S> {
    async fn get_all<R: StoreRecord>(&self) -> Result<Vec<R>, StoreError> {
        self.bounded("get_all", self.inner.get_all::<R>()).await
    }

    async fn get_by_id<R: StoreRecord>(&self, id: R::Id) -> Result<Option<R>, StoreError> {
        self.bounded("get_by_id", self.inner.get_by_id::<R>(id)).await
    }

    async fn get_by_index<R: StoreRecord>(
        &self,
        index: IndexName,
        value: &str,
    ) -> Result<Vec<R>, StoreError> {
        self.bounded("get_by_index", self.inner.get_by_index::<R>(index, value))
            .await
    }

    async fn put<R: StoreRecord>(&self, record: R) -> Result<(), StoreError> {
        self.bounded("put", self.inner.put(record)).await
    }

    async fn put_batch<R: StoreRecord>(&self, records: Vec<R>) -> Result<(), StoreError> {
        self.bounded("put_batch", self.inner.put_batch(records)).await
    }

    async fn delete<R: StoreRecord>(&self, id: R::Id) -> Result<(), StoreError> {
        self.bounded("delete", self.inner.delete::<R>(id)).await
    }

    async fn count<R: StoreRecord>(&self) -> Result<usize, StoreError> {
        self.bounded("count", self.inner.count::<R>()).await
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        self.bounded("clear_all", self.inner.clear_all()).await
    }
}

impl<S: RuleStore> RuleStore for std::sync::Arc<S> {
    async fn get_all<R: StoreRecord>(&self) -> Result<Vec<R>, StoreError> {
        (**self).get_all::<R>().await
    }

    async fn get_by_id<R: StoreRecord>(&self, id: R::Id) -> Result<Option<R>, StoreError> {
        (**self).get_by_id::<R>(id).await
    }

    async fn get_by_index<R: StoreRecord>(
        &self,
        index: IndexName,
        value: &str,
    ) -> Result<Vec<R>, StoreError> {
        (**self).get_by_index::<R>(index, value).await
    }

    async fn put<R: StoreRecord>(&self, record: R) -> Result<(), StoreError> {
        (**self).put(record).await
    }

    async fn put_batch<R: StoreRecord>(&self, records: Vec<R>) -> Result<(), StoreError> {
        (**self).put_batch(records).await
    }

    async fn delete<R: StoreRecord>(&self, id: R::Id) -> Result<(), StoreError> {
        (**self).delete::<R>(id).await
    }

    async fn count<R: StoreRecord>(&self) -> Result<usize, StoreError> {
        (**self).count::<R>().await
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        (**self).clear_all().await
    }
}

use crate::{
    Entity, Result, Value,
    stream::{Stream, StreamExt},
};
use futures::{FutureExt, TryFutureExt};
use std::{future::Future, pin::pin, sync::Arc};

/// Metadata about modify operations (INSERT/UPDATE/DELETE).
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsAffected {
    /// Total number of rows impacted.
    pub rows_affected: u64,
    /// Backend-specific last inserted identifier when available.
    pub last_affected_id: Option<i64>,
}

impl RowsAffected {
    pub fn new(rows_affected: u64) -> Self {
        Self {
            rows_affected,
            last_affected_id: None,
        }
    }
}

/// The statement execution engine.
///
/// Every operand is an [`Entity`] already tagged with its table name. The
/// executor owns the translation into its own query language, the parameter
/// binding and the connection handling. Errors are returned as they are, the
/// callers do not retry nor translate them.
pub trait Executor: Send + Sync {
    /// Insert the entity as a new row.
    fn insert(&self, entity: &Entity) -> impl Future<Output = Result<RowsAffected>> + Send;

    /// Insert the entity and return every key generated by the backend.
    fn insert_for_generated_keys(
        &self,
        entity: &Entity,
    ) -> impl Future<Output = Result<Vec<Value>>> + Send {
        self.insert_for_generated_key(entity)
            .map_ok(|v| v.into_iter().map(Value::from).collect())
    }

    /// Insert the entity and return the auto increment key, if the backend generated one.
    fn insert_for_generated_key(
        &self,
        entity: &Entity,
    ) -> impl Future<Output = Result<Option<i64>>> + Send {
        self.insert(entity).map_ok(|v| v.last_affected_id)
    }

    /// Delete the rows matching the condition.
    fn delete(&self, condition: &Entity) -> impl Future<Output = Result<RowsAffected>> + Send;

    /// Assign the fields of `record` to the rows matching the condition.
    fn update(
        &self,
        record: &Entity,
        condition: &Entity,
    ) -> impl Future<Output = Result<RowsAffected>> + Send;

    /// Stream the rows matching the condition. An empty `columns` slice selects every column.
    fn find(
        &self,
        columns: &[&str],
        condition: &Entity,
        limit: Option<u32>,
    ) -> impl Stream<Item = Result<Entity>> + Send;

    /// First row matching the condition.
    fn find_one(
        &self,
        columns: &[&str],
        condition: &Entity,
    ) -> impl Future<Output = Result<Option<Entity>>> + Send {
        let stream = self.find(columns, condition, Some(1));
        async move { pin!(stream).into_future().map(|(v, _)| v).await.transpose() }
    }

    /// Number of rows matching the condition.
    fn count(&self, condition: &Entity) -> impl Future<Output = Result<u64>> + Send;
}

macro_rules! impl_executor_forward {
    ($wrapper:ty) => {
        impl<X: Executor> Executor for $wrapper {
            fn insert(&self, entity: &Entity) -> impl Future<Output = Result<RowsAffected>> + Send {
                (**self).insert(entity)
            }
            fn insert_for_generated_keys(
                &self,
                entity: &Entity,
            ) -> impl Future<Output = Result<Vec<Value>>> + Send {
                (**self).insert_for_generated_keys(entity)
            }
            fn insert_for_generated_key(
                &self,
                entity: &Entity,
            ) -> impl Future<Output = Result<Option<i64>>> + Send {
                (**self).insert_for_generated_key(entity)
            }
            fn delete(
                &self,
                condition: &Entity,
            ) -> impl Future<Output = Result<RowsAffected>> + Send {
                (**self).delete(condition)
            }
            fn update(
                &self,
                record: &Entity,
                condition: &Entity,
            ) -> impl Future<Output = Result<RowsAffected>> + Send {
                (**self).update(record, condition)
            }
            fn find(
                &self,
                columns: &[&str],
                condition: &Entity,
                limit: Option<u32>,
            ) -> impl Stream<Item = Result<Entity>> + Send {
                (**self).find(columns, condition, limit)
            }
            fn find_one(
                &self,
                columns: &[&str],
                condition: &Entity,
            ) -> impl Future<Output = Result<Option<Entity>>> + Send {
                (**self).find_one(columns, condition)
            }
            fn count(&self, condition: &Entity) -> impl Future<Output = Result<u64>> + Send {
                (**self).count(condition)
            }
        }
    };
}

impl_executor_forward!(&X);
impl_executor_forward!(Arc<X>);

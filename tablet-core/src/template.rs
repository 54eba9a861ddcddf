use crate::{Entity, Executor, Result, TemplateError, Value, stream::TryStreamExt, truncate_long};

/// Primary key field used by [`DaoTemplate::new`].
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// Data access template bound to a single table.
///
/// The table name and the primary key field are given once at construction,
/// every operation then fills them in on the entities it builds or receives
/// before handing them over to the [`Executor`].
///
/// An entity that already declares a table name keeps it, this lets a
/// template occasionally target a related table. The only exception is
/// [`DaoTemplate::update`], which always addresses the template's own table
/// because the condition is built from the template's primary key.
///
/// The template holds no mutable state: it can be shared between tasks as long
/// as the executor can.
///
/// # Example
/// ```rust,ignore
/// let users = DaoTemplate::new("users", executor);
/// let id = users
///     .add_for_generated_key(&mut Entity::new().set("name", "Alice"))
///     .await?;
/// let alice = users.get(id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct DaoTemplate<X: Executor> {
    table_name: String,
    primary_key_field: String,
    executor: X,
}

impl<X: Executor> DaoTemplate<X> {
    /// Template for `table_name` using `id` as primary key.
    pub fn new(table_name: impl Into<String>, executor: X) -> Self {
        Self::with_primary_key(table_name, DEFAULT_PRIMARY_KEY, executor)
    }

    pub fn with_primary_key(
        table_name: impl Into<String>,
        primary_key_field: impl Into<String>,
        executor: X,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            primary_key_field: primary_key_field.into(),
            executor,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn primary_key_field(&self) -> &str {
        &self.primary_key_field
    }

    pub fn executor(&self) -> &X {
        &self.executor
    }

    fn condition(&self, field: &str, value: Value) -> Entity {
        Entity::create(&self.table_name).set(field, value)
    }

    /// Primary key value carried by `entity`, a null value counts as missing.
    fn primary_key(&self, entity: &Entity) -> Option<Value> {
        entity
            .get(&self.primary_key_field)
            .filter(|v| !v.is_null())
            .cloned()
    }

    // Create

    /// Insert the entity, returns the number of inserted rows.
    pub async fn add(&self, entity: &mut Entity) -> Result<u64> {
        entity.normalize_table_name(&self.table_name);
        log::trace!("Insert {}", truncate_long(&entity.to_string()));
        Ok(self.executor.insert(entity).await?.rows_affected)
    }

    /// Insert the entity, returns the keys generated by the executor.
    ///
    /// The entity itself is left without the generated keys.
    pub async fn add_for_generated_keys(&self, entity: &mut Entity) -> Result<Vec<Value>> {
        entity.normalize_table_name(&self.table_name);
        log::trace!("Insert {}", truncate_long(&entity.to_string()));
        self.executor.insert_for_generated_keys(entity).await
    }

    /// Insert the entity, returns the auto increment key when the executor generated one.
    ///
    /// The entity itself is left without the generated key.
    pub async fn add_for_generated_key(&self, entity: &mut Entity) -> Result<Option<i64>> {
        entity.normalize_table_name(&self.table_name);
        log::trace!("Insert {}", truncate_long(&entity.to_string()));
        self.executor.insert_for_generated_key(entity).await
    }

    // Delete

    /// Delete the row having `primary_key` as primary key.
    ///
    /// A null key deletes nothing and returns 0 without reaching the executor.
    pub async fn del(&self, primary_key: impl Into<Value>) -> Result<u64> {
        let primary_key = primary_key.into();
        if primary_key.is_null() {
            log::debug!(
                "Delete from `{}` skipped: null primary key",
                self.table_name
            );
            return Ok(0);
        }
        self.del_where(self.condition(&self.primary_key_field, primary_key))
            .await
    }

    /// Delete the rows where `field` equals `value`.
    ///
    /// A blank field name deletes nothing and returns 0 without reaching the executor.
    pub async fn del_by(&self, field: &str, value: impl Into<Value>) -> Result<u64> {
        if field.trim().is_empty() {
            log::debug!("Delete from `{}` skipped: blank field", self.table_name);
            return Ok(0);
        }
        self.del_where(self.condition(field, value.into())).await
    }

    /// Delete the rows matching the condition.
    ///
    /// A missing or empty condition deletes nothing and returns 0 without
    /// reaching the executor: a whole table can never be wiped from here.
    pub async fn del_where(&self, condition: impl Into<Option<Entity>>) -> Result<u64> {
        let Some(mut condition) = condition.into().filter(|v| !v.is_empty()) else {
            log::debug!(
                "Delete from `{}` skipped: empty condition",
                self.table_name
            );
            return Ok(0);
        };
        condition.normalize_table_name(&self.table_name);
        log::trace!("Delete {}", truncate_long(&condition.to_string()));
        Ok(self.executor.delete(&condition).await?.rows_affected)
    }

    // Update

    /// Update the row identified by the primary key carried by the entity.
    ///
    /// The primary key is used only in the condition, it is never part of the
    /// assigned fields. Fails with [`TemplateError::MissingPrimaryKey`] before
    /// reaching the executor when the entity has no value for it.
    pub async fn update(&self, entity: &mut Entity) -> Result<u64> {
        entity.set_table_name(&self.table_name);
        let Some(primary_key) = self.primary_key(entity) else {
            return Err(TemplateError::MissingPrimaryKey(self.primary_key_field.clone()).into());
        };
        let condition = self.condition(&self.primary_key_field, primary_key);
        let mut record = entity.clone();
        record.remove(&self.primary_key_field);
        log::trace!(
            "Update {} where {}",
            truncate_long(&record.to_string()),
            condition
        );
        Ok(self
            .executor
            .update(&record, &condition)
            .await?
            .rows_affected)
    }

    /// Insert the entity when it has no primary key, update it otherwise.
    ///
    /// The decision looks only at the entity, the table is not queried. After
    /// an insert the generated key (if any) is written back into the entity
    /// and 1 is returned. After an update the number of updated rows is returned.
    pub async fn add_or_update(&self, entity: &mut Entity) -> Result<u64> {
        if self.primary_key(entity).is_some() {
            return self.update(entity).await;
        }
        if let Some(key) = self.add_for_generated_key(entity).await? {
            entity.put(&self.primary_key_field, key);
        }
        Ok(1)
    }

    // Get

    /// Row having `primary_key` as primary key.
    pub async fn get(&self, primary_key: impl Into<Value>) -> Result<Option<Entity>> {
        self.get_by(&self.primary_key_field, primary_key).await
    }

    /// First row where `field` equals `value`. Better used with unique fields.
    pub async fn get_by(&self, field: &str, value: impl Into<Value>) -> Result<Option<Entity>> {
        self.get_where(self.condition(field, value.into())).await
    }

    /// First row matching the condition, a missing condition matches any row.
    ///
    /// When more rows match, only the first one is returned.
    pub async fn get_where(&self, condition: impl Into<Option<Entity>>) -> Result<Option<Entity>> {
        let mut condition = condition
            .into()
            .unwrap_or_else(|| Entity::create(&self.table_name));
        condition.normalize_table_name(&self.table_name);
        log::trace!("Get {}", truncate_long(&condition.to_string()));
        self.executor.find_one(&[], &condition).await
    }

    // Find

    /// Rows where `field` equals `value`.
    pub async fn find_by(&self, field: &str, value: impl Into<Value>) -> Result<Vec<Entity>> {
        self.find_where(self.condition(field, value.into())).await
    }

    /// Every row of the table.
    pub async fn find_all(&self) -> Result<Vec<Entity>> {
        self.find_where(Entity::create(&self.table_name)).await
    }

    /// Rows matching the condition, empty when none does.
    pub async fn find_where(&self, mut condition: Entity) -> Result<Vec<Entity>> {
        condition.normalize_table_name(&self.table_name);
        log::trace!("Find {}", truncate_long(&condition.to_string()));
        self.executor
            .find(&[], &condition, None)
            .try_collect()
            .await
    }

    /// Number of rows matching the condition.
    pub async fn count(&self, mut condition: Entity) -> Result<u64> {
        condition.normalize_table_name(&self.table_name);
        log::trace!("Count {}", truncate_long(&condition.to_string()));
        self.executor.count(&condition).await
    }

    /// Whether at least one row matches the condition.
    pub async fn exist(&self, condition: Entity) -> Result<bool> {
        Ok(self.count(condition).await? > 0)
    }
}

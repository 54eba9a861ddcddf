use crate::MemoryTable;
use async_stream::try_stream;
use std::collections::HashMap;
use tablet_core::{
    Context, Entity, Error, Executor, Result, RowsAffected,
    stream::Stream,
};
use tokio::sync::RwLock;
use url::Url;

/// Executor keeping every table in memory.
///
/// Tables are declared upfront, either with [`MemoryExecutor::create_table`]
/// or through the connection URL:
///
/// ```text
/// memory://?table=users:id&table=books
/// ```
///
/// Each `table` parameter declares a table, the optional part after `:` names
/// its auto increment column.
#[derive(Debug, Default)]
pub struct MemoryExecutor {
    tables: RwLock<HashMap<String, MemoryTable>>,
}

impl MemoryExecutor {
    pub const PREFIX: &'static str = "memory://";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(url: &str) -> Result<Self> {
        if !url.starts_with(Self::PREFIX) {
            return Err(Error::msg(format!(
                "Memory connection url must start with `{}`",
                Self::PREFIX
            )));
        }
        let context = || format!("While trying to connect to `{}`", url);
        let url = Url::parse(url).with_context(context)?;
        let mut tables = HashMap::new();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "table" => {
                    let (name, auto_increment) = match value.split_once(':') {
                        Some((name, column)) => (name, Some(column).filter(|v| !v.is_empty())),
                        None => (value.as_ref(), None),
                    };
                    if name.trim().is_empty() {
                        return Err(Error::msg("Table name cannot be empty")).with_context(context);
                    }
                    log::debug!("Declaring table `{}`", name);
                    tables.insert(name.to_string(), MemoryTable::new(name, auto_increment));
                }
                _ => {
                    return Err(Error::msg(format!("Unknown parameter `{}`", key)))
                        .with_context(context);
                }
            }
        }
        Ok(Self {
            tables: RwLock::new(tables),
        })
    }

    /// Declare a table, fails if it exists already.
    pub async fn create_table(&self, name: &str, auto_increment: Option<&str>) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.contains_key(name) {
            return Err(Error::msg(format!("Table `{}` already exists", name)));
        }
        log::debug!("Creating table `{}`", name);
        tables.insert(name.into(), MemoryTable::new(name, auto_increment));
        Ok(())
    }

    /// Remove a table and its rows, returns whether it existed.
    pub async fn drop_table(&self, name: &str) -> bool {
        log::debug!("Dropping table `{}`", name);
        self.tables.write().await.remove(name).is_some()
    }

    pub async fn table_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.tables.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    fn table_name(entity: &Entity) -> Result<&str> {
        match entity.table_name() {
            Some(v) if !v.trim().is_empty() => Ok(v),
            _ => {
                let error = Error::msg(format!("Entity {} does not declare a table", entity));
                log::debug!("{:#}", error);
                Err(error)
            }
        }
    }

    fn table<'t>(
        tables: &'t HashMap<String, MemoryTable>,
        entity: &Entity,
    ) -> Result<&'t MemoryTable> {
        let name = Self::table_name(entity)?;
        tables.get(name).ok_or_else(|| missing_table(name))
    }

    fn table_mut<'t>(
        tables: &'t mut HashMap<String, MemoryTable>,
        entity: &Entity,
    ) -> Result<&'t mut MemoryTable> {
        let name = Self::table_name(entity)?;
        tables.get_mut(name).ok_or_else(|| missing_table(name))
    }
}

fn missing_table(name: &str) -> Error {
    let error = Error::msg(format!("Table `{}` does not exist", name));
    log::debug!("{:#}", error);
    error
}

impl Executor for MemoryExecutor {
    async fn insert(&self, entity: &Entity) -> Result<RowsAffected> {
        let mut tables = self.tables.write().await;
        Self::table_mut(&mut tables, entity)?.insert(entity)
    }

    async fn delete(&self, condition: &Entity) -> Result<RowsAffected> {
        let mut tables = self.tables.write().await;
        Ok(Self::table_mut(&mut tables, condition)?.delete(condition))
    }

    async fn update(&self, record: &Entity, condition: &Entity) -> Result<RowsAffected> {
        let mut tables = self.tables.write().await;
        Self::table_mut(&mut tables, condition)?.update(record, condition)
    }

    fn find(
        &self,
        columns: &[&str],
        condition: &Entity,
        limit: Option<u32>,
    ) -> impl Stream<Item = Result<Entity>> + Send {
        try_stream! {
            let rows = {
                let tables = self.tables.read().await;
                Self::table(&tables, condition)?.select(columns, condition, limit)
            };
            for row in rows {
                yield row;
            }
        }
    }

    async fn count(&self, condition: &Entity) -> Result<u64> {
        let tables = self.tables.read().await;
        Ok(Self::table(&tables, condition)?.count(condition))
    }
}

use tablet_core::{Entity, Error, Result, RowsAffected, Value};

/// Rows of a single table, kept in insertion order.
#[derive(Debug, Clone)]
pub struct MemoryTable {
    pub(crate) name: String,
    pub(crate) auto_increment: Option<String>,
    pub(crate) next_id: i64,
    pub(crate) rows: Vec<Entity>,
}

impl MemoryTable {
    pub fn new(name: impl Into<String>, auto_increment: Option<&str>) -> Self {
        Self {
            name: name.into(),
            auto_increment: auto_increment.map(Into::into),
            next_id: 1,
            rows: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn auto_increment(&self) -> Option<&str> {
        self.auto_increment.as_deref()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every condition field must be loosely equal to the row field, a null
    /// condition value matches a null or missing field.
    pub fn matches(row: &Entity, condition: &Entity) -> bool {
        condition.iter().all(|(field, expected)| match row.get(field) {
            Some(v) => v.loosely_eq(expected),
            None => expected.is_null(),
        })
    }

    pub(crate) fn insert(&mut self, entity: &Entity) -> Result<RowsAffected> {
        if entity.is_empty() {
            return Err(Error::msg(format!(
                "Cannot insert an entity without fields into `{}`",
                self.name
            )));
        }
        let mut row = Entity::create(&self.name);
        row.extend(entity.iter().map(|(k, v)| (k, v.clone())));
        let mut last_affected_id = None;
        if let Some(column) = &self.auto_increment {
            match row.get(column).filter(|v| !v.is_null()) {
                Some(key) => {
                    let id = self.explicit_key(column, key)?;
                    if self
                        .rows
                        .iter()
                        .any(|r| r.get(column).is_some_and(|v| v.loosely_eq(key)))
                    {
                        return Err(self.duplicate_key(column, key));
                    }
                    self.next_id = self.next_id.max(id.saturating_add(1));
                }
                None => {
                    let id = self.next_id;
                    self.next_id += 1;
                    row.put(column, id);
                    last_affected_id = Some(id);
                }
            }
        }
        self.rows.push(row);
        Ok(RowsAffected {
            rows_affected: 1,
            last_affected_id,
        })
    }

    pub(crate) fn update(&mut self, record: &Entity, condition: &Entity) -> Result<RowsAffected> {
        if record.is_empty() {
            return Err(Error::msg(format!(
                "Nothing to update in `{}`: the record has no fields",
                self.name
            )));
        }
        if let Some(column) = &self.auto_increment
            && let Some(key) = record.get(column)
        {
            let id = self.explicit_key(column, key)?;
            let mut targets = 0;
            for row in &self.rows {
                if Self::matches(row, condition) {
                    targets += 1;
                } else if row.get(column).is_some_and(|v| v.loosely_eq(key)) {
                    return Err(self.duplicate_key(column, key));
                }
            }
            if targets > 1 {
                return Err(self.duplicate_key(column, key));
            }
            if targets == 1 {
                self.next_id = self.next_id.max(id.saturating_add(1));
            }
        }
        let mut result = RowsAffected::default();
        for row in self.rows.iter_mut().filter(|r| Self::matches(r, condition)) {
            for (field, value) in record.iter() {
                row.put(field, value.clone());
            }
            result.rows_affected += 1;
        }
        Ok(result)
    }

    pub(crate) fn delete(&mut self, condition: &Entity) -> RowsAffected {
        let before = self.rows.len();
        self.rows.retain(|r| !Self::matches(r, condition));
        RowsAffected::new((before - self.rows.len()) as u64)
    }

    pub(crate) fn select(
        &self,
        columns: &[&str],
        condition: &Entity,
        limit: Option<u32>,
    ) -> Vec<Entity> {
        self.rows
            .iter()
            .filter(|r| Self::matches(r, condition))
            .take(limit.map_or(usize::MAX, |v| v as usize))
            .map(|r| {
                if columns.is_empty() {
                    return r.clone();
                }
                let mut projected = columns
                    .iter()
                    .map(|c| (*c, r.get(c).cloned().unwrap_or_default()))
                    .collect::<Entity>();
                projected.set_table_name(&self.name);
                projected
            })
            .collect()
    }

    fn explicit_key(&self, column: &str, key: &Value) -> Result<i64> {
        key.as_integer()
            .and_then(|v| i64::try_from(v).ok())
            .ok_or_else(|| {
                Error::msg(format!(
                    "Column `{}.{}` expects an integer key, found {}",
                    self.name, column, key
                ))
            })
    }

    fn duplicate_key(&self, column: &str, key: &Value) -> Error {
        Error::msg(format!(
            "Duplicate key {} for column `{}.{}`",
            key, self.name, column
        ))
    }

    pub(crate) fn count(&self, condition: &Entity) -> u64 {
        self.rows
            .iter()
            .filter(|r| Self::matches(r, condition))
            .count() as u64
    }
}

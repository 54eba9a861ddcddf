use crate::{AsValue, Error, Result, Value, separated_by};
use std::fmt::{self, Display, Formatter};

/// A loosely typed record: ordered `field -> value` pairs plus an optional table name.
///
/// The same type is used as the record to write and as the condition to match.
/// Fields keep their insertion order, overwriting a field keeps its original
/// position, so the column order of the generated statements is deterministic.
///
/// A missing field and a field holding a null [`Value`] are different things:
/// `get` returns `None` for the former and `Some(Value::Null)` (or a typed null)
/// for the latter.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Entity {
    table_name: Option<String>,
    fields: Vec<(String, Value)>,
}

impl Entity {
    /// Empty entity without a table name.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty entity targeting `table_name`.
    pub fn create(table_name: impl Into<String>) -> Self {
        Self {
            table_name: Some(table_name.into()),
            fields: Vec::new(),
        }
    }

    pub fn table_name(&self) -> Option<&str> {
        self.table_name.as_deref()
    }

    pub fn set_table_name(&mut self, table_name: impl Into<String>) -> &mut Self {
        self.table_name = Some(table_name.into());
        self
    }

    /// Tag the entity with `table_name` unless it already declares a (non blank) one.
    pub fn normalize_table_name(&mut self, table_name: &str) -> &mut Self {
        if self.table_name().is_none_or(|v| v.trim().is_empty()) {
            self.table_name = Some(table_name.into());
        }
        self
    }

    /// Assign a field and return the entity, for chaining.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.put(field, value);
        self
    }

    /// Assign a field in place, returning the previous value if the field was present.
    pub fn put(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let field = field.into();
        let value = value.into();
        match self.position(&field) {
            Some(i) => Some(std::mem::replace(&mut self.fields[i].1, value)),
            None => {
                self.fields.push((field, value));
                None
            }
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.position(field).map(|i| &self.fields[i].1)
    }

    /// Read a field converting it to `T`.
    ///
    /// Missing fields are an error, use `Option<T>` to accept nulls.
    pub fn get_as<T: AsValue>(&self, field: &str) -> Result<T> {
        let value = self.get(field).ok_or_else(|| {
            Error::msg(format!(
                "Field `{}` is not present in {}",
                field,
                self.table_name().unwrap_or("entity")
            ))
        })?;
        T::try_from_value(value.clone())
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.position(field).map(|i| self.fields.remove(i).1)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.position(field).is_some()
    }

    /// Present and not null.
    pub fn has_value(&self, field: &str) -> bool {
        self.get(field).is_some_and(|v| !v.is_null())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn field_names(&self) -> impl ExactSizeIterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn position(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|(k, _)| k == field)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Entity {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut entity = Entity::new();
        entity.extend(iter);
        entity
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Entity {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl IntoIterator for Entity {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;
    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl Display for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut out = String::with_capacity(64);
        out.push_str(self.table_name().unwrap_or_default());
        out.push('{');
        separated_by(
            &mut out,
            self.iter(),
            |out, (k, v)| {
                out.push_str(k);
                out.push_str(": ");
                out.push_str(&v.to_string());
            },
            ", ",
        );
        out.push('}');
        f.write_str(&out)
    }
}

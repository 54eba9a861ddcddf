use rust_decimal::{Decimal, prelude::ToPrimitive};
use std::fmt::{self, Display, Formatter};
use time::{Date, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Dynamically typed field value stored inside an [`Entity`](crate::Entity).
///
/// Every typed variant wraps an `Option`: `None` is a typed NULL, it keeps the
/// information about the column type while still being null.
#[derive(Default, Debug, Clone)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int8(Option<i8>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    UInt8(Option<u8>),
    UInt16(Option<u16>),
    UInt32(Option<u32>),
    UInt64(Option<u64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Decimal(Option<Decimal>),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
    Date(Option<Date>),
    Time(Option<Time>),
    Timestamp(Option<PrimitiveDateTime>),
    Uuid(Option<Uuid>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(l), Self::Boolean(r)) => l == r,
            (Self::Int8(l), Self::Int8(r)) => l == r,
            (Self::Int16(l), Self::Int16(r)) => l == r,
            (Self::Int32(l), Self::Int32(r)) => l == r,
            (Self::Int64(l), Self::Int64(r)) => l == r,
            (Self::UInt8(l), Self::UInt8(r)) => l == r,
            (Self::UInt16(l), Self::UInt16(r)) => l == r,
            (Self::UInt32(l), Self::UInt32(r)) => l == r,
            (Self::UInt64(l), Self::UInt64(r)) => l == r,
            (Self::Float32(l), Self::Float32(r)) => l == r,
            (Self::Float64(l), Self::Float64(r)) => l == r,
            (Self::Decimal(l), Self::Decimal(r)) => l == r,
            (Self::Varchar(l), Self::Varchar(r)) => l == r,
            (Self::Blob(l), Self::Blob(r)) => l == r,
            (Self::Date(l), Self::Date(r)) => l == r,
            (Self::Time(l), Self::Time(r)) => l == r,
            (Self::Timestamp(l), Self::Timestamp(r)) => l == r,
            (Self::Uuid(l), Self::Uuid(r)) => l == r,
            _ => self.same_type(other),
        }
    }
}

impl Value {
    pub fn same_type(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// True for `Value::Null` and for every typed variant holding `None`.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Boolean(v) => v.is_none(),
            Value::Int8(v) => v.is_none(),
            Value::Int16(v) => v.is_none(),
            Value::Int32(v) => v.is_none(),
            Value::Int64(v) => v.is_none(),
            Value::UInt8(v) => v.is_none(),
            Value::UInt16(v) => v.is_none(),
            Value::UInt32(v) => v.is_none(),
            Value::UInt64(v) => v.is_none(),
            Value::Float32(v) => v.is_none(),
            Value::Float64(v) => v.is_none(),
            Value::Decimal(v) => v.is_none(),
            Value::Varchar(v) => v.is_none(),
            Value::Blob(v) => v.is_none(),
            Value::Date(v) => v.is_none(),
            Value::Time(v) => v.is_none(),
            Value::Timestamp(v) => v.is_none(),
            Value::Uuid(v) => v.is_none(),
        }
    }

    /// Integer content widened to `i128`, `None` for non integer or null values.
    pub fn as_integer(&self) -> Option<i128> {
        match *self {
            Value::Int8(Some(v)) => Some(v as _),
            Value::Int16(Some(v)) => Some(v as _),
            Value::Int32(Some(v)) => Some(v as _),
            Value::Int64(Some(v)) => Some(v as _),
            Value::UInt8(Some(v)) => Some(v as _),
            Value::UInt16(Some(v)) => Some(v as _),
            Value::UInt32(Some(v)) => Some(v as _),
            Value::UInt64(Some(v)) => Some(v as _),
            _ => None,
        }
    }

    /// Numeric content as `f64`, integers and decimals included.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float32(Some(v)) => Some(*v as _),
            Value::Float64(Some(v)) => Some(*v),
            Value::Decimal(Some(v)) => v.to_f64(),
            _ => self.as_integer().map(|v| v as _),
        }
    }

    /// Equality that ignores the width of numeric values: `Int32(5)` and `UInt64(5)` are equal.
    /// Two nulls are equal regardless of their type.
    pub fn loosely_eq(&self, other: &Self) -> bool {
        if self.is_null() || other.is_null() {
            return self.is_null() && other.is_null();
        }
        if let (Some(l), Some(r)) = (self.as_integer(), other.as_integer()) {
            return l == r;
        }
        let numeric = |v: &Value| {
            matches!(
                v,
                Value::Float32(..) | Value::Float64(..) | Value::Decimal(..)
            ) || v.as_integer().is_some()
        };
        if numeric(self) && numeric(other) {
            return self.as_float() == other.as_float();
        }
        self == other
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("NULL");
        }
        match self {
            Value::Boolean(Some(v)) => write!(f, "{}", v),
            Value::Int8(Some(v)) => write!(f, "{}", v),
            Value::Int16(Some(v)) => write!(f, "{}", v),
            Value::Int32(Some(v)) => write!(f, "{}", v),
            Value::Int64(Some(v)) => write!(f, "{}", v),
            Value::UInt8(Some(v)) => write!(f, "{}", v),
            Value::UInt16(Some(v)) => write!(f, "{}", v),
            Value::UInt32(Some(v)) => write!(f, "{}", v),
            Value::UInt64(Some(v)) => write!(f, "{}", v),
            Value::Float32(Some(v)) => write!(f, "{}", v),
            Value::Float64(Some(v)) => write!(f, "{}", v),
            Value::Decimal(Some(v)) => write!(f, "{}", v),
            Value::Varchar(Some(v)) => write!(f, "'{}'", v.replace('\'', "''")),
            Value::Blob(Some(v)) => {
                f.write_str("'")?;
                for b in v.iter() {
                    write!(f, "\\x{:02X}", b)?;
                }
                f.write_str("'")
            }
            Value::Date(Some(v)) => write!(f, "'{}'", v),
            Value::Time(Some(v)) => write!(f, "'{}'", v),
            Value::Timestamp(Some(v)) => write!(f, "'{}'", v),
            Value::Uuid(Some(v)) => write!(f, "'{}'", v),
            _ => f.write_str("NULL"),
        }
    }
}

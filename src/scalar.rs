use std::fmt::{self, Display};

use chrono::NaiveDate;
use ordered_float::OrderedFloat;
use serde_json::Value;

/// A predicate value. Closed on purpose: every variant the engine can carry
/// is one the backends know how to compare.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Scalar {
    Str(String),
    Int(i64),
    Float(OrderedFloat<f64>),
    Bool(bool),
    Date(NaiveDate),
}

impl Scalar {
    /// Projects the scalar into the JSON value space rows live in.
    /// Dates become ISO-8601 strings (`YYYY-MM-DD`).
    pub fn to_json(&self) -> Value {
        match self {
            Scalar::Str(s) => Value::String(s.clone()),
            Scalar::Int(i) => Value::Number((*i).into()),
            Scalar::Float(f) => serde_json::Number::from_f64(f.into_inner())
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Scalar::Bool(b) => Value::Bool(*b),
            Scalar::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
        }
    }
}

impl Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Str(s) => write!(f, "\"{}\"", s),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(n) => write!(f, "{}", n.into_inner()),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl fmt::Debug for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Str(_) => write!(f, "Str({})", self),
            Scalar::Int(_) => write!(f, "Int({})", self),
            Scalar::Float(_) => write!(f, "Float({})", self),
            Scalar::Bool(_) => write!(f, "Bool({})", self),
            Scalar::Date(_) => write!(f, "Date({})", self),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Str(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Str(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(value as i64)
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Scalar::Int(value as i64)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(OrderedFloat(value))
    }
}

impl From<f32> for Scalar {
    fn from(value: f32) -> Self {
        Scalar::Float(OrderedFloat(value as f64))
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<NaiveDate> for Scalar {
    fn from(value: NaiveDate) -> Self {
        Scalar::Date(value)
    }
}

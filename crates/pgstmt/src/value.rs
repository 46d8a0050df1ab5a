//! Bound parameter values.
//!
//! [`Value`] is what ends up in the positional argument list of a compiled
//! statement. Raw SQL text is deliberately not a `Value`: it lives in
//! [`Operand::Raw`](crate::Operand::Raw) and [`FieldValue::Raw`](crate::FieldValue::Raw)
//! and never consumes a placeholder.

use bytes::BytesMut;
use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use uuid::Uuid;

/// A value bound to a `$n` placeholder.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// SQL NULL.
    Null,
    /// A boolean value.
    Bool(bool),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit floating-point number.
    Float(f64),
    /// A UTF-8 string.
    Text(String),
    /// A point in time, UTC.
    Timestamp(DateTime<Utc>),
    /// A UUID value.
    Uuid(Uuid),
    /// A JSON document.
    Json(serde_json::Value),
    /// Operand list for `IN` / `NOT IN`; expanded to one placeholder per element.
    List(Vec<Value>),
}

impl Value {
    /// Whether this is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Timestamp(dt) => write!(f, "{dt}"),
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Json(j) => write!(f, "{j}"),
            Self::List(vals) => {
                write!(f, "[")?;
                for (i, v) in vals.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}

// ── From implementations ───────────────────────────────────────────────

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Self::Text(v.clone())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Self::Uuid(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

// ── Driver encoding ────────────────────────────────────────────────────

/// Largest integer magnitude an `f64` holds exactly.
const F64_EXACT_INT: u64 = 1 << f64::MANTISSA_DIGITS;

/// Encodes according to the parameter type Postgres inferred for the
/// placeholder, so one `Int` works against `int2`, `int4` and `int8` columns.
///
/// Every other pairing must be one the wrapped Rust type accepts itself;
/// anything else is rejected instead of shipping bytes the server would
/// read as a different value. `Float` bound to `float4` is rounded to the
/// nearest `f32`.
impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Self::Null => Ok(IsNull::Yes),
            Self::Bool(v) => bind("Bool", v, ty, out),
            Self::Int(v) => match *ty {
                Type::INT2 => i16::try_from(*v)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*v)?.to_sql(ty, out),
                Type::FLOAT8 if v.unsigned_abs() <= F64_EXACT_INT => (*v as f64).to_sql(ty, out),
                Type::FLOAT8 => Err(format!("Int {v} is not exact as float8").into()),
                Type::TEXT | Type::VARCHAR => v.to_string().to_sql(ty, out),
                _ => bind("Int", v, ty, out),
            },
            Self::Float(v) => match *ty {
                Type::FLOAT4 => {
                    let narrowed = *v as f32;
                    if narrowed.is_infinite() && v.is_finite() {
                        return Err(format!("Float {v} is out of range for float4").into());
                    }
                    narrowed.to_sql(ty, out)
                }
                _ => bind("Float", v, ty, out),
            },
            Self::Text(s) => match *ty {
                // snowflake-style ids travel as text but are stored as integers
                Type::INT2 => s.parse::<i16>()?.to_sql(ty, out),
                Type::INT4 => s.parse::<i32>()?.to_sql(ty, out),
                Type::INT8 => s.parse::<i64>()?.to_sql(ty, out),
                _ => bind("Text", &s.as_str(), ty, out),
            },
            Self::Timestamp(dt) => match *ty {
                Type::TIMESTAMP => dt.naive_utc().to_sql(ty, out),
                _ => bind("Timestamp", dt, ty, out),
            },
            Self::Uuid(u) => bind("Uuid", u, ty, out),
            Self::Json(j) => bind("Json", j, ty, out),
            Self::List(_) => Err("list values are only valid as IN operands".into()),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn bind<T: ToSql>(
    variant: &str,
    value: &T,
    ty: &Type,
    out: &mut BytesMut,
) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
    if !T::accepts(ty) {
        return Err(format!("cannot bind {variant} to parameter of type {ty}").into());
    }
    value.to_sql(ty, out)
}

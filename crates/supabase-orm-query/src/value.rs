use std::fmt;

use serde_json::Value as JsonValue;

/// A value on the right-hand side of a filter, rendered as a PostgREST literal.
///
/// | variant | rendered as |
/// |---|---|
/// | `Text("x")` | `"x"` (with `"` and `\` backslash-escaped) |
/// | `Bool(true)` | `true` |
/// | `Int(-3)` / `UInt(3)` | `-3` / `3` |
/// | `Float(1.5)` | `1.5` |
/// | `List([..])` | `{a,b,c}`, each element rendered recursively |
/// | `Null` | `null` |
/// | `Raw(s)` | `s` verbatim |
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    List(Vec<FilterValue>),
    Null,
    /// Passed through without quoting or escaping.
    Raw(String),
}

impl FilterValue {
    /// A value that is emitted exactly as given.
    pub fn raw(value: impl Into<String>) -> Self {
        Self::Raw(value.into())
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => {
                f.write_str("\"")?;
                for c in s.chars() {
                    if c == '"' || c == '\\' {
                        f.write_str("\\")?;
                    }
                    write!(f, "{}", c)?;
                }
                f.write_str("\"")
            }
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(n) => write!(f, "{}", n),
            Self::UInt(n) => write!(f, "{}", n),
            Self::Float(n) => write!(f, "{}", n),
            Self::List(items) => {
                f.write_str("{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("}")
            }
            Self::Null => f.write_str("null"),
            Self::Raw(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&String> for FilterValue {
    fn from(s: &String) -> Self {
        Self::Text(s.clone())
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for FilterValue {
            fn from(n: $t) -> Self {
                Self::Int(n as i64)
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for FilterValue {
            fn from(n: $t) -> Self {
                Self::UInt(n as u64)
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for FilterValue {
    fn from(n: f32) -> Self {
        // Go through the shortest f32 text so 0.1f32 stays "0.1".
        Self::Float(n.to_string().parse().unwrap_or(n as f64))
    }
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FilterValue> + Clone> From<&[T]> for FilterValue {
    fn from(items: &[T]) -> Self {
        Self::List(items.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<FilterValue>, const N: usize> From<[T; N]> for FilterValue {
    fn from(items: [T; N]) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<JsonValue> for FilterValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Self::UInt(u)
                } else {
                    n.as_f64().map_or_else(|| Self::Raw(n.to_string()), Self::Float)
                }
            }
            JsonValue::String(s) => Self::Text(s),
            JsonValue::Array(items) => Self::List(items.into_iter().map(Into::into).collect()),
            JsonValue::Object(_) => Self::Raw(value.to_string()),
        }
    }
}

//! Dynamic values flowing into and out of param coercion.
//!
//! A [`Value`] is what callers hand to [`ParamValues::set_param`] (a raw
//! value from a config file, a CLI flag, or Rust code) and also what the
//! coercion step stores afterwards. Symbols are the canonical form of enum
//! values; lists and maps are the "enumerable" shapes that scalar types
//! reject.
//!
//! [`ParamValues::set_param`]: crate::ParamValues::set_param

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use url::Url;

/// Mapping of param name to value.
///
/// Used both as an instance's value store and as the bulk input map for
/// [`ParamValues::set_params`](crate::ParamValues::set_params).
pub type ValueMap = BTreeMap<String, Value>;

/// A raw or coerced param value.
///
/// # Examples
///
/// ```
/// use param_schema_core::Value;
///
/// assert_eq!(Value::from(42), Value::Integer(42));
/// assert_eq!(Value::from("abc"), Value::String("abc".into()));
/// assert_eq!(Value::symbol("fast").as_symbol(), Some("fast"));
/// assert!(Value::Nil.is_nil());
/// ```
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent value.
    #[default]
    Nil,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Integer(i64),
    /// Floating point number.
    Float(f64),
    /// Text.
    String(String),
    /// Symbolic name (canonical enum value).
    Symbol(String),
    /// Compiled regular expression.
    Regex(Regex),
    /// Parsed URI.
    Uri(Url),
    /// Ordered collection.
    List(Vec<Value>),
    /// Keyed collection.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Creates a symbol value.
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(name.into())
    }

    /// Returns `true` for [`Value::Nil`].
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Returns `true` for lists and maps.
    pub fn is_enumerable(&self) -> bool {
        matches!(self, Self::List(_) | Self::Map(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Self::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_regex(&self) -> Option<&Regex> {
        match self {
            Self::Regex(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_uri(&self) -> Option<&Url> {
        match self {
            Self::Uri(u) => Some(u),
            _ => None,
        }
    }

    /// Short name of the value's shape, used in help output and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Symbol(_) => "symbol",
            Self::Regex(_) => "regex",
            Self::Uri(_) => "uri",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    /// Plain text form used when a value is stringified.
    ///
    /// Unlike [`Display`](fmt::Display) this does not quote strings or mark
    /// symbols.
    ///
    /// # Examples
    ///
    /// ```
    /// use param_schema_core::Value;
    ///
    /// assert_eq!(Value::from("abc").to_plain_string(), "abc");
    /// assert_eq!(Value::symbol("fast").to_plain_string(), "fast");
    /// assert_eq!(Value::Nil.to_plain_string(), "");
    /// assert_eq!(Value::from(1.5).to_plain_string(), "1.5");
    /// ```
    pub fn to_plain_string(&self) -> String {
        match self {
            Self::Nil => String::new(),
            Self::String(s) | Self::Symbol(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Converts into a JSON value for printing or serialization.
    ///
    /// Symbols, regexes and URIs become strings; non-finite floats become
    /// `null`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Self::Nil => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::Integer(i) => Json::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Self::String(s) | Self::Symbol(s) => Json::String(s.clone()),
            Self::Regex(r) => Json::String(format!("/{}/", r.as_str())),
            Self::Uri(u) => Json::String(u.to_string()),
            Self::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Self::Map(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Symbol(a), Self::Symbol(b)) => a == b,
            (Self::Regex(a), Self::Regex(b)) => a.as_str() == b.as_str(),
            (Self::Uri(a), Self::Uri(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            _ => false,
        }
    }
}

/// Inspect-style rendering used inside error messages.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Symbol(s) => write!(f, ":{s}"),
            Self::Regex(r) => write!(f, "/{}/", r.as_str()),
            Self::Uri(u) => write!(f, "{u}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Regex> for Value {
    fn from(value: Regex) -> Self {
        Self::Regex(value)
    }
}

impl From<Url> for Value {
    fn from(value: Url) -> Self {
        Self::Uri(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Nil)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match value {
            Json::Null => Self::Nil,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => n.as_f64().map(Self::Float).unwrap_or(Self::Nil),
            },
            Json::String(s) => Self::String(s),
            Json::Array(items) => Self::List(items.into_iter().map(Value::from).collect()),
            Json::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

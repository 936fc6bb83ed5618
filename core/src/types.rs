//! Param type variants and their coercion rules.
//!
//! Every variant implements one operation, [`ParamType::coerce`], which
//! either returns the canonical value for the type or a [`ValidationError`]
//! explaining why the raw value was rejected.
//!
//! # Examples
//!
//! ```
//! use param_schema_core::{ParamType, Value};
//!
//! assert_eq!(ParamType::boolean().coerce(&Value::from("yes")), Ok(Value::Bool(true)));
//!
//! let mode = ParamType::enumeration(["fast", "slow"]).unwrap();
//! assert_eq!(mode.coerce(&Value::from("slow")), Ok(Value::symbol("slow")));
//! assert!(mode.coerce(&Value::from("medium")).is_err());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::error::{DeclarationError, ValidationError};
use crate::numeric::{FloatType, IntegerType};
use crate::value::Value;

static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]+:").expect("static regex must compile"));

/// The type of a param.
#[derive(Debug, Clone)]
pub enum ParamType {
    /// `true`/`false`, with `yes`/`no`/`on`/`off` spellings.
    Boolean,
    /// Signed integer with base inference and bounds.
    Integer(IntegerType),
    /// Decimal number with bounds.
    Float(FloatType),
    /// Text with optional format and emptiness rules.
    String(StringType),
    /// Regular expression written as `/.../`.
    Regexp,
    /// URI starting with a `scheme:`.
    Uri,
    /// One of a fixed set of symbolic values.
    Enum(EnumType),
}

impl ParamType {
    pub fn boolean() -> Self {
        Self::Boolean
    }

    pub fn integer() -> Self {
        Self::Integer(IntegerType::new())
    }

    pub fn float() -> Self {
        Self::Float(FloatType::new())
    }

    pub fn string() -> Self {
        Self::String(StringType::new())
    }

    pub fn regexp() -> Self {
        Self::Regexp
    }

    pub fn uri() -> Self {
        Self::Uri
    }

    /// Creates an enum type.
    ///
    /// # Errors
    ///
    /// Returns [`DeclarationError::EmptyEnum`] when `values` is empty.
    pub fn enumeration<I, S>(values: I) -> Result<Self, DeclarationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EnumType::new(values).map(Self::Enum)
    }

    /// Display name of the variant, as shown in help output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Integer(_) => "Integer",
            Self::Float(_) => "Float",
            Self::String(_) => "String",
            Self::Regexp => "Regexp",
            Self::Uri => "URI",
            Self::Enum(_) => "Enum",
        }
    }

    /// Coerces a raw value into this type's canonical value.
    pub fn coerce(&self, value: &Value) -> Result<Value, ValidationError> {
        match self {
            Self::Boolean => coerce_boolean(value),
            Self::Integer(ty) => ty.coerce(value),
            Self::Float(ty) => ty.coerce(value),
            Self::String(ty) => ty.coerce(value),
            Self::Regexp => coerce_regexp(value),
            Self::Uri => coerce_uri(value),
            Self::Enum(ty) => ty.coerce(value),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(IntegerType { bounds }) if !bounds.is_unbounded() => {
                write!(f, "Integer({bounds})")
            }
            Self::Float(FloatType { bounds }) if !bounds.is_unbounded() => {
                write!(f, "Float({bounds})")
            }
            Self::String(StringType {
                format: Some(format),
                ..
            }) => write!(f, "String(/{}/)", format.as_str()),
            Self::Enum(ty) => write!(f, "Enum[{}]", ty.values.join(", ")),
            other => f.write_str(other.name()),
        }
    }
}

impl From<IntegerType> for ParamType {
    fn from(ty: IntegerType) -> Self {
        Self::Integer(ty)
    }
}

impl From<FloatType> for ParamType {
    fn from(ty: FloatType) -> Self {
        Self::Float(ty)
    }
}

impl From<StringType> for ParamType {
    fn from(ty: StringType) -> Self {
        Self::String(ty)
    }
}

impl From<EnumType> for ParamType {
    fn from(ty: EnumType) -> Self {
        Self::Enum(ty)
    }
}

fn coerce_boolean(value: &Value) -> Result<Value, ValidationError> {
    match value {
        Value::Nil => Ok(Value::Bool(false)),
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "on" => Ok(Value::Bool(true)),
            "false" | "no" | "n" | "off" => Ok(Value::Bool(false)),
            _ => Err(ValidationError::new(format!(
                "value must be true or false ({value})"
            ))),
        },
        other => Err(ValidationError::new(format!(
            "value must be true or false ({other})"
        ))),
    }
}

fn coerce_regexp(value: &Value) -> Result<Value, ValidationError> {
    match value {
        Value::Regex(regex) => Ok(Value::Regex(regex.clone())),
        Value::String(s) => {
            let inner = s
                .strip_prefix('/')
                .and_then(|rest| rest.strip_suffix('/'))
                .filter(|inner| !inner.is_empty())
                .ok_or_else(|| {
                    ValidationError::new(format!("value must be of the format '/.../' ({value})"))
                })?;
            Regex::new(inner)
                .map(Value::Regex)
                .map_err(|_| ValidationError::new(format!("value is not a valid Regexp ({value})")))
        }
        other => Err(ValidationError::new(format!(
            "value must be a Regexp or a String ({other})"
        ))),
    }
}

fn coerce_uri(value: &Value) -> Result<Value, ValidationError> {
    match value {
        Value::Uri(uri) => Ok(Value::Uri(uri.clone())),
        Value::String(s) if s.is_empty() => Err(ValidationError::new("value must not be empty")),
        Value::String(s) => {
            if !SCHEME_RE.is_match(s) {
                return Err(ValidationError::new(format!(
                    "value must start with a 'scheme:' ({value})"
                )));
            }
            Url::parse(s)
                .map(Value::Uri)
                .map_err(|_| ValidationError::new(format!("value is not a valid URI ({value})")))
        }
        other => Err(ValidationError::new(format!(
            "value must be a URI or a String ({other})"
        ))),
    }
}

/// String coercion with optional format and emptiness rules.
///
/// # Examples
///
/// ```
/// use param_schema_core::{StringType, Value};
///
/// let ty = StringType::new();
/// assert_eq!(ty.coerce(&Value::from(42)), Ok(Value::from("42")));
/// assert!(ty.coerce(&Value::from("")).is_err());
/// assert!(ty.coerce(&Value::from("   ")).is_err());
///
/// let lenient = StringType::new().allow_empty(true).allow_blank(true);
/// assert!(lenient.coerce(&Value::from("   ")).is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StringType {
    /// Pattern the stringified value must match (unanchored).
    pub format: Option<Regex>,
    /// Accept `""`.
    pub allow_empty: bool,
    /// Accept values made only of whitespace.
    pub allow_blank: bool,
}

impl StringType {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(mut self, format: Regex) -> Self {
        self.format = Some(format);
        self
    }

    pub fn allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = allow;
        self
    }

    pub fn allow_blank(mut self, allow: bool) -> Self {
        self.allow_blank = allow;
        self
    }

    pub fn coerce(&self, value: &Value) -> Result<Value, ValidationError> {
        if value.is_enumerable() {
            return Err(ValidationError::new(format!(
                "cannot convert an Enumerable into a String ({value})"
            )));
        }

        let string = value.to_plain_string();

        if let Some(format) = &self.format {
            if !format.is_match(&string) {
                return Err(ValidationError::new(format!(
                    "does not match the format ({string:?})"
                )));
            }
        }

        if string.is_empty() {
            if !self.allow_empty {
                return Err(ValidationError::new("value cannot be empty"));
            }
        } else if string.trim().is_empty() && !self.allow_blank {
            return Err(ValidationError::new(
                "value cannot contain all whitespace characters",
            ));
        }

        Ok(Value::String(string))
    }
}

/// Enum coercion over a fixed, ordered set of symbolic values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    values: Vec<String>,
    lookup: HashMap<String, String>,
}

impl EnumType {
    /// Creates an enum type.
    ///
    /// # Errors
    ///
    /// Returns [`DeclarationError::EmptyEnum`] when `values` is empty.
    pub fn new<I, S>(values: I) -> Result<Self, DeclarationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ordered: Vec<String> = Vec::new();
        for value in values {
            let value = value.into();
            if !ordered.contains(&value) {
                ordered.push(value);
            }
        }

        if ordered.is_empty() {
            return Err(DeclarationError::EmptyEnum);
        }

        let lookup = ordered
            .iter()
            .map(|value| (value.to_string(), value.clone()))
            .collect();

        Ok(Self {
            values: ordered,
            lookup,
        })
    }

    /// Canonical values in declaration order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn coerce(&self, value: &Value) -> Result<Value, ValidationError> {
        match value {
            Value::Symbol(sym) if self.values.contains(sym) => Ok(Value::Symbol(sym.clone())),
            Value::String(s) => match self.lookup.get(s) {
                Some(canonical) => Ok(Value::Symbol(canonical.clone())),
                None => Err(ValidationError::new(format!("unknown value ({value})"))),
            },
            Value::Symbol(_) => Err(ValidationError::new(format!("unknown value ({value})"))),
            other => Err(ValidationError::new(format!(
                "value must be either a Symbol or a String ({other})"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_spellings() {
        let ty = ParamType::boolean();
        for raw in ["true", "YES", "y", "On"] {
            assert_eq!(ty.coerce(&Value::from(raw)), Ok(Value::Bool(true)), "{raw}");
        }
        for raw in ["false", "No", "N", "OFF"] {
            assert_eq!(ty.coerce(&Value::from(raw)), Ok(Value::Bool(false)), "{raw}");
        }
        assert_eq!(ty.coerce(&Value::Nil), Ok(Value::Bool(false)));
        assert_eq!(ty.coerce(&Value::Bool(true)), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_boolean_rejects_other_values() {
        let ty = ParamType::boolean();
        assert!(ty.coerce(&Value::from("maybe")).is_err());
        assert!(ty.coerce(&Value::from(1)).is_err());
        assert!(ty.coerce(&Value::symbol("true")).is_err());
    }

    #[test]
    fn test_boolean_idempotent() {
        let ty = ParamType::boolean();
        let once = ty.coerce(&Value::from("on")).unwrap();
        assert_eq!(ty.coerce(&once).unwrap(), once);
    }

    #[test]
    fn test_regexp_requires_slashes() {
        let ty = ParamType::regexp();
        let Value::Regex(regex) = ty.coerce(&Value::from("/a+b/")).unwrap() else {
            panic!("expected a regex");
        };
        assert!(regex.is_match("xaab"));

        let err = ty.coerce(&Value::from("a+b")).unwrap_err();
        assert_eq!(err.message(), "value must be of the format '/.../' (\"a+b\")");
        assert!(ty.coerce(&Value::from("//")).is_err());
        assert!(ty.coerce(&Value::from("/a+b")).is_err());
    }

    #[test]
    fn test_regexp_compile_failure() {
        let err = ParamType::regexp()
            .coerce(&Value::from("/(unclosed/"))
            .unwrap_err();
        assert!(err.message().starts_with("value is not a valid Regexp"));
    }

    #[test]
    fn test_regexp_passes_native_regex() {
        let regex = Regex::new("^x$").unwrap();
        let coerced = ParamType::regexp().coerce(&Value::Regex(regex)).unwrap();
        assert_eq!(coerced.as_regex().map(Regex::as_str), Some("^x$"));
        assert!(ParamType::regexp().coerce(&Value::from(1)).is_err());
    }

    #[test]
    fn test_uri_rules() {
        let ty = ParamType::uri();
        let coerced = ty.coerce(&Value::from("https://example.com/path")).unwrap();
        assert_eq!(coerced.as_uri().map(Url::host_str), Some(Some("example.com")));

        assert_eq!(
            ty.coerce(&Value::from("")).unwrap_err().message(),
            "value must not be empty"
        );
        assert!(
            ty.coerce(&Value::from("example.com"))
                .unwrap_err()
                .message()
                .contains("must start with a 'scheme:'")
        );
        assert!(
            ty.coerce(&Value::from("http://[::1"))
                .unwrap_err()
                .message()
                .contains("not a valid URI")
        );
        assert!(ty.coerce(&Value::from(5)).is_err());
    }

    #[test]
    fn test_string_rejects_enumerables() {
        let ty = StringType::new();
        let err = ty.coerce(&Value::from(vec!["a"])).unwrap_err();
        assert!(err.message().starts_with("cannot convert an Enumerable into a String"));
        assert!(ty.coerce(&Value::Map(Default::default())).is_err());
    }

    #[test]
    fn test_string_stringifies_scalars() {
        let ty = StringType::new();
        assert_eq!(ty.coerce(&Value::Bool(true)), Ok(Value::from("true")));
        assert_eq!(ty.coerce(&Value::symbol("abc")), Ok(Value::from("abc")));
        assert_eq!(ty.coerce(&Value::from(1.5)), Ok(Value::from("1.5")));
    }

    #[test]
    fn test_string_format() {
        let ty = StringType::new().with_format(Regex::new(r"^[a-z]+$").unwrap());
        assert_eq!(ty.coerce(&Value::from("abc")), Ok(Value::from("abc")));
        let err = ty.coerce(&Value::from("ABC")).unwrap_err();
        assert_eq!(err.message(), "does not match the format (\"ABC\")");
    }

    #[test]
    fn test_string_empty_and_blank() {
        let strict = StringType::new();
        assert_eq!(
            strict.coerce(&Value::from("")).unwrap_err().message(),
            "value cannot be empty"
        );
        assert_eq!(
            strict.coerce(&Value::from(" \t")).unwrap_err().message(),
            "value cannot contain all whitespace characters"
        );

        let empty_ok = StringType::new().allow_empty(true);
        assert!(empty_ok.coerce(&Value::from("")).is_ok());
        assert!(empty_ok.coerce(&Value::from("  ")).is_err());

        let blank_ok = StringType::new().allow_blank(true);
        assert!(blank_ok.coerce(&Value::from("  ")).is_ok());
        assert!(blank_ok.coerce(&Value::from("")).is_err());
    }

    #[test]
    fn test_enum_round_trip() {
        let ty = ParamType::enumeration(["one", "two"]).unwrap();
        assert_eq!(ty.coerce(&Value::symbol("one")), Ok(Value::symbol("one")));
        assert_eq!(ty.coerce(&Value::from("two")), Ok(Value::symbol("two")));
        assert_eq!(
            ty.coerce(&Value::from("three")).unwrap_err().message(),
            "unknown value (\"three\")"
        );
        assert!(ty.coerce(&Value::symbol("three")).is_err());
        assert_eq!(
            ty.coerce(&Value::from(1)).unwrap_err().message(),
            "value must be either a Symbol or a String (1)"
        );
    }

    #[test]
    fn test_enum_idempotent() {
        let ty = ParamType::enumeration(["one", "two"]).unwrap();
        let once = ty.coerce(&Value::from("one")).unwrap();
        assert_eq!(ty.coerce(&once).unwrap(), once);
    }

    #[test]
    fn test_enum_requires_values() {
        let empty: [&str; 0] = [];
        assert_eq!(
            ParamType::enumeration(empty).unwrap_err(),
            DeclarationError::EmptyEnum
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(ParamType::integer().to_string(), "Integer");
        assert_eq!(
            ParamType::enumeration(["fast", "slow"]).unwrap().to_string(),
            "Enum[fast, slow]"
        );
        assert_eq!(ParamType::uri().name(), "URI");
    }
}

//! Integer and Float coercion with shared bounds checking.
//!
//! Both numeric types carry a [`NumericBounds`]. When a `range` is set it is
//! the only bound consulted; otherwise `min` and `max` are checked
//! independently.

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{DeclarationError, ValidationError};
use crate::value::Value;

static DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+$").expect("static regex must compile"));
static BINARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?0b[01]+$").expect("static regex must compile"));
static HEX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(0x)?[0-9A-Fa-f]+$").expect("static regex must compile")
});
static FLOAT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?[0-9]+(\.[0-9]+)?$").expect("static regex must compile")
});

/// Optional bounds shared by the numeric types.
///
/// # Examples
///
/// ```
/// use param_schema_core::NumericBounds;
///
/// let bounds = NumericBounds::default().with_range(1..=10).with_min(50);
/// assert_eq!(bounds.check(5), Ok(5));
/// // The range takes precedence over `min`.
/// let err = bounds.check(50).unwrap_err();
/// assert!(err.message().contains("not within the range"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NumericBounds<T> {
    /// Inclusive lower bound, ignored when `range` is set.
    pub min: Option<T>,
    /// Inclusive upper bound, ignored when `range` is set.
    pub max: Option<T>,
    /// Closed interval of acceptable values.
    pub range: Option<RangeInclusive<T>>,
}

impl<T> Default for NumericBounds<T> {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            range: None,
        }
    }
}

impl<T> NumericBounds<T>
where
    T: Copy + PartialOrd + fmt::Display,
{
    pub fn with_min(mut self, min: T) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: T) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_range(mut self, range: RangeInclusive<T>) -> Self {
        self.range = Some(range);
        self
    }

    /// Returns `true` when no bound is configured.
    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none() && self.range.is_none()
    }

    /// Rejects bounds that no value could satisfy.
    pub fn validate(&self) -> Result<(), DeclarationError> {
        if let Some(range) = &self.range {
            if range.start() > range.end() {
                return Err(DeclarationError::InvalidTypeOption {
                    option: "range".to_string(),
                    reason: format!("start {} is greater than end {}", range.start(), range.end()),
                });
            }
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(DeclarationError::InvalidTypeOption {
                    option: "min".to_string(),
                    reason: format!("{min} is greater than max {max}"),
                });
            }
        }
        Ok(())
    }

    /// Checks `value` against the configured bounds.
    pub fn check(&self, value: T) -> Result<T, ValidationError> {
        if let Some(range) = &self.range {
            if !range.contains(&value) {
                return Err(ValidationError::new(format!(
                    "value is not within the range of acceptable values {}-{} ({value})",
                    range.start(),
                    range.end()
                )));
            }
            return Ok(value);
        }

        if let Some(min) = self.min {
            if value < min {
                return Err(ValidationError::new(format!(
                    "value is below minimum value of {min} ({value})"
                )));
            }
        }

        if let Some(max) = self.max {
            if value > max {
                return Err(ValidationError::new(format!(
                    "value is above maximum value of {max} ({value})"
                )));
            }
        }

        Ok(value)
    }
}

impl<T: fmt::Display> fmt::Display for NumericBounds<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(range) = &self.range {
            return write!(f, "{}..={}", range.start(), range.end());
        }
        match (&self.min, &self.max) {
            (Some(min), Some(max)) => write!(f, "min: {min}, max: {max}"),
            (Some(min), None) => write!(f, "min: {min}"),
            (None, Some(max)) => write!(f, "max: {max}"),
            (None, None) => Ok(()),
        }
    }
}

/// Integer coercion with base inference.
///
/// Strings are read as decimal, `0b` binary, or hexadecimal (with or without
/// a `0x` prefix), in that order.
///
/// # Examples
///
/// ```
/// use param_schema_core::{IntegerType, Value};
///
/// let ty = IntegerType::new();
/// assert_eq!(ty.coerce(&Value::from("42")), Ok(Value::Integer(42)));
/// assert_eq!(ty.coerce(&Value::from("-0x2A")), Ok(Value::Integer(-42)));
/// assert_eq!(ty.coerce(&Value::from("0b101010")), Ok(Value::Integer(42)));
/// assert!(ty.coerce(&Value::from("zz")).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegerType {
    pub bounds: NumericBounds<i64>,
}

impl IntegerType {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bounds(bounds: NumericBounds<i64>) -> Self {
        Self { bounds }
    }

    pub fn coerce(&self, value: &Value) -> Result<Value, ValidationError> {
        let int = match value {
            Value::Integer(i) => *i,
            Value::String(s) => parse_integer(s)?,
            Value::Float(f) if f.is_finite() => truncate_float(*f)?,
            other => {
                return Err(ValidationError::new(format!(
                    "value does not define a conversion to Integer ({other})"
                )));
            }
        };

        self.bounds.check(int).map(Value::Integer)
    }
}

fn truncate_float(f: f64) -> Result<i64, ValidationError> {
    let truncated = f.trunc();
    // i64::MAX as f64 rounds up to 2^63, so the upper end is exclusive.
    if (i64::MIN as f64..i64::MAX as f64).contains(&truncated) {
        Ok(truncated as i64)
    } else {
        Err(ValidationError::new(format!(
            "value is too large to be an Integer ({f:?})"
        )))
    }
}

fn parse_integer(s: &str) -> Result<i64, ValidationError> {
    let (negative, unsigned) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let magnitude = if DECIMAL_RE.is_match(s) {
        i128::from_str_radix(unsigned, 10)
    } else if BINARY_RE.is_match(s) {
        i128::from_str_radix(&unsigned[2..], 2)
    } else if HEX_RE.is_match(s) {
        let digits = unsigned.strip_prefix("0x").unwrap_or(unsigned);
        i128::from_str_radix(digits, 16)
    } else {
        return Err(ValidationError::new(format!(
            "value contains non-numeric characters ({s:?})"
        )));
    };

    let too_large = || ValidationError::new(format!("value is too large to be an Integer ({s:?})"));
    let magnitude = magnitude.map_err(|_| too_large())?;
    let signed = if negative { -magnitude } else { magnitude };
    i64::try_from(signed).map_err(|_| too_large())
}

/// Float coercion from decimal strings and integers.
///
/// # Examples
///
/// ```
/// use param_schema_core::{FloatType, NumericBounds, Value};
///
/// let ty = FloatType::with_bounds(NumericBounds::default().with_max(1.0));
/// assert_eq!(ty.coerce(&Value::from("0.5")), Ok(Value::Float(0.5)));
/// assert!(ty.coerce(&Value::from("1.5")).is_err());
/// assert!(ty.coerce(&Value::from("1e3")).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloatType {
    pub bounds: NumericBounds<f64>,
}

impl FloatType {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bounds(bounds: NumericBounds<f64>) -> Self {
        Self { bounds }
    }

    pub fn coerce(&self, value: &Value) -> Result<Value, ValidationError> {
        let float = match value {
            Value::Float(f) if f.is_finite() => *f,
            Value::Float(f) => {
                return Err(ValidationError::new(format!(
                    "value is not a finite Float ({f:?})"
                )));
            }
            Value::Integer(i) => *i as f64,
            Value::String(s) => {
                if !FLOAT_RE.is_match(s) {
                    return Err(ValidationError::new(format!(
                        "value contains non-numeric characters ({s:?})"
                    )));
                }
                s.parse::<f64>().map_err(|_| {
                    ValidationError::new(format!("value is not a valid Float ({s:?})"))
                })?
            }
            other => {
                return Err(ValidationError::new(format!(
                    "value does not define a conversion to Float ({other})"
                )));
            }
        };

        self.bounds.check(float).map(Value::Float)
    }
}

//! Name and native-type lookup for param types.
//!
//! Declarations usually name their type (`"Integer"`, `"i64"`, `"URI"`) or
//! point at a Rust type (`i64`, [`Url`]) instead of building a
//! [`ParamType`] by hand. The [`TypeTable`] maps those names and
//! [`TypeId`]s to constructors and forwards [`TypeOptions`] to them.
//!
//! # Examples
//!
//! ```
//! use param_schema_core::{TypeOptions, TypeTable, Value};
//!
//! let table = TypeTable::standard();
//! let options = TypeOptions { min: Some(Value::from(1)), ..Default::default() };
//! let ty = table.build("int", &options).unwrap();
//! assert_eq!(ty.name(), "Integer");
//! assert!(ty.coerce(&Value::from(0)).is_err());
//!
//! assert!(table.build("Money", &TypeOptions::default()).is_err());
//! assert_eq!(table.build_native::<f64>(&TypeOptions::default()).unwrap().name(), "Float");
//! ```

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use url::Url;

use crate::error::DeclarationError;
use crate::numeric::{FloatType, IntegerType, NumericBounds};
use crate::types::{EnumType, ParamType, StringType};
use crate::value::Value;

/// Constructor registered under a type name.
pub type TypeBuilder = fn(&TypeOptions) -> Result<ParamType, DeclarationError>;

static STANDARD: LazyLock<TypeTable> = LazyLock::new(TypeTable::with_standard_types);

/// Options forwarded to a type constructor.
///
/// Numeric options are given as [`Value`]s and coerced by the numeric type
/// itself, so `"0x10"` is as good a `min` as `16`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeOptions {
    pub min: Option<Value>,
    pub max: Option<Value>,
    /// Closed interval `(start, end)`.
    pub range: Option<(Value, Value)>,
    /// Regex source the string form must match.
    pub format: Option<String>,
    pub allow_empty: Option<bool>,
    pub allow_blank: Option<bool>,
    /// Enum values.
    pub values: Option<Vec<String>>,
}

impl TypeOptions {
    /// Returns `true` when no option is set.
    pub fn is_empty(&self) -> bool {
        self.given().is_empty()
    }

    /// Names of the options that are set.
    pub fn given(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.min.is_some() {
            names.push("min");
        }
        if self.max.is_some() {
            names.push("max");
        }
        if self.range.is_some() {
            names.push("range");
        }
        if self.format.is_some() {
            names.push("format");
        }
        if self.allow_empty.is_some() {
            names.push("allow_empty");
        }
        if self.allow_blank.is_some() {
            names.push("allow_blank");
        }
        if self.values.is_some() {
            names.push("values");
        }
        names
    }

    fn accept_only(&self, ty: &str, accepted: &[&str]) -> Result<(), DeclarationError> {
        match self.given().into_iter().find(|name| !accepted.contains(name)) {
            Some(option) => Err(DeclarationError::UnsupportedTypeOption {
                ty: ty.to_string(),
                option: option.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Registry of type names and native type aliases.
#[derive(Clone, Default)]
pub struct TypeTable {
    builders: HashMap<String, TypeBuilder>,
    natives: HashMap<TypeId, String>,
}

impl fmt::Debug for TypeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeTable")
            .field("names", &self.names())
            .field("natives", &self.natives.len())
            .finish()
    }
}

impl TypeTable {
    /// Creates a table with no types registered.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The shared table holding the standard types.
    pub fn standard() -> &'static TypeTable {
        &STANDARD
    }

    /// Creates a table populated with the standard types and aliases.
    pub fn with_standard_types() -> Self {
        let mut table = Self::empty();

        table.register("Boolean", build_boolean);
        table.register("Integer", build_integer);
        table.register("Float", build_float);
        table.register("String", build_string);
        table.register("Regexp", build_regexp);
        table.register("URI", build_uri);
        table.register("Enum", build_enum);

        for (alias, target) in [
            ("bool", "Boolean"),
            ("int", "Integer"),
            ("i64", "Integer"),
            ("float", "Float"),
            ("f64", "Float"),
            ("str", "String"),
            ("Regex", "Regexp"),
            ("Url", "URI"),
        ] {
            table.insert_alias(alias, target);
        }

        table.insert_native::<bool>("Boolean");
        table.insert_native::<i64>("Integer");
        table.insert_native::<i32>("Integer");
        table.insert_native::<u32>("Integer");
        table.insert_native::<f64>("Float");
        table.insert_native::<f32>("Float");
        table.insert_native::<String>("String");
        table.insert_native::<&'static str>("String");
        table.insert_native::<Regex>("Regexp");
        table.insert_native::<Url>("URI");

        table
    }

    /// Registers a constructor under `name`, replacing any previous one.
    pub fn register(&mut self, name: &str, builder: TypeBuilder) {
        self.builders.insert(name.to_string(), builder);
    }

    /// Makes `alias` resolve to the constructor registered as `target`.
    ///
    /// # Errors
    ///
    /// Returns [`DeclarationError::UnknownType`] if `target` is not
    /// registered.
    pub fn alias(&mut self, alias: &str, target: &str) -> Result<(), DeclarationError> {
        let builder = self.lookup(target)?;
        self.builders.insert(alias.to_string(), builder);
        Ok(())
    }

    /// Maps the Rust type `T` to the type registered as `target`.
    ///
    /// # Errors
    ///
    /// Returns [`DeclarationError::UnknownType`] if `target` is not
    /// registered.
    pub fn register_native<T: 'static>(&mut self, target: &str) -> Result<(), DeclarationError> {
        self.lookup(target)?;
        self.insert_native::<T>(target);
        Ok(())
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.builders.contains_key(name)
    }

    /// Registered names (including aliases), sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Builds the type registered as `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DeclarationError::UnknownType`] for unregistered names, or
    /// the constructor's error when `options` do not fit the type.
    pub fn build(&self, name: &str, options: &TypeOptions) -> Result<ParamType, DeclarationError> {
        let builder = self.lookup(name)?;
        debug!(ty = name, options = ?options.given(), "Building param type");
        builder(options)
    }

    /// Builds the type mapped to the Rust type `T`.
    ///
    /// # Errors
    ///
    /// Returns [`DeclarationError::UnknownType`] if `T` has no mapping.
    pub fn build_native<T: 'static>(
        &self,
        options: &TypeOptions,
    ) -> Result<ParamType, DeclarationError> {
        self.build_type_id(TypeId::of::<T>(), std::any::type_name::<T>(), options)
    }

    pub(crate) fn build_type_id(
        &self,
        id: TypeId,
        type_name: &str,
        options: &TypeOptions,
    ) -> Result<ParamType, DeclarationError> {
        match self.natives.get(&id) {
            Some(name) => self.build(name, options),
            None => Err(DeclarationError::UnknownType(type_name.to_string())),
        }
    }

    fn lookup(&self, name: &str) -> Result<TypeBuilder, DeclarationError> {
        self.builders
            .get(name)
            .copied()
            .ok_or_else(|| DeclarationError::UnknownType(name.to_string()))
    }

    fn insert_alias(&mut self, alias: &str, target: &str) {
        if let Some(builder) = self.builders.get(target).copied() {
            self.builders.insert(alias.to_string(), builder);
        }
    }

    fn insert_native<T: 'static>(&mut self, target: &str) {
        self.natives.insert(TypeId::of::<T>(), target.to_string());
    }
}

fn build_boolean(options: &TypeOptions) -> Result<ParamType, DeclarationError> {
    options.accept_only("Boolean", &[])?;
    Ok(ParamType::Boolean)
}

fn build_regexp(options: &TypeOptions) -> Result<ParamType, DeclarationError> {
    options.accept_only("Regexp", &[])?;
    Ok(ParamType::Regexp)
}

fn build_uri(options: &TypeOptions) -> Result<ParamType, DeclarationError> {
    options.accept_only("URI", &[])?;
    Ok(ParamType::Uri)
}

fn build_integer(options: &TypeOptions) -> Result<ParamType, DeclarationError> {
    options.accept_only("Integer", &["min", "max", "range"])?;
    let bound = |option: &str, value: &Value| -> Result<i64, DeclarationError> {
        IntegerType::new()
            .coerce(value)
            .ok()
            .and_then(|v| v.as_integer())
            .ok_or_else(|| invalid_option(option, format!("{value} is not an Integer")))
    };

    let mut bounds = NumericBounds::default();
    if let Some(min) = &options.min {
        bounds = bounds.with_min(bound("min", min)?);
    }
    if let Some(max) = &options.max {
        bounds = bounds.with_max(bound("max", max)?);
    }
    if let Some((start, end)) = &options.range {
        bounds = bounds.with_range(bound("range", start)?..=bound("range", end)?);
    }
    bounds.validate()?;

    Ok(ParamType::Integer(IntegerType::with_bounds(bounds)))
}

fn build_float(options: &TypeOptions) -> Result<ParamType, DeclarationError> {
    options.accept_only("Float", &["min", "max", "range"])?;
    let bound = |option: &str, value: &Value| -> Result<f64, DeclarationError> {
        FloatType::new()
            .coerce(value)
            .ok()
            .and_then(|v| v.as_float())
            .ok_or_else(|| invalid_option(option, format!("{value} is not a Float")))
    };

    let mut bounds = NumericBounds::default();
    if let Some(min) = &options.min {
        bounds = bounds.with_min(bound("min", min)?);
    }
    if let Some(max) = &options.max {
        bounds = bounds.with_max(bound("max", max)?);
    }
    if let Some((start, end)) = &options.range {
        bounds = bounds.with_range(bound("range", start)?..=bound("range", end)?);
    }
    bounds.validate()?;

    Ok(ParamType::Float(FloatType::with_bounds(bounds)))
}

fn build_string(options: &TypeOptions) -> Result<ParamType, DeclarationError> {
    options.accept_only("String", &["format", "allow_empty", "allow_blank"])?;
    let mut ty = StringType::new()
        .allow_empty(options.allow_empty.unwrap_or(false))
        .allow_blank(options.allow_blank.unwrap_or(false));
    if let Some(format) = &options.format {
        let regex = Regex::new(format).map_err(|e| invalid_option("format", e.to_string()))?;
        ty = ty.with_format(regex);
    }
    Ok(ParamType::String(ty))
}

fn build_enum(options: &TypeOptions) -> Result<ParamType, DeclarationError> {
    options.accept_only("Enum", &["values"])?;
    let values = options.values.clone().unwrap_or_default();
    EnumType::new(values).map(ParamType::Enum)
}

fn invalid_option(option: &str, reason: String) -> DeclarationError {
    DeclarationError::InvalidTypeOption {
        option: option.to_string(),
        reason,
    }
}

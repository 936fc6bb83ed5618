//! Param definitions and their declaration builder.
//!
//! A [`ParamDefinition`] binds a name to a [`ParamType`], a required flag,
//! an optional [`DefaultValue`] and a description. Definitions are built
//! through [`ParamDeclaration`], which resolves type names against a
//! [`TypeTable`] and forwards type options.
//!
//! # Examples
//!
//! ```
//! use param_schema_core::{ParamDeclaration, TypeTable, Value};
//!
//! let def = ParamDeclaration::new("port")
//!     .type_name("Integer")
//!     .range(1, 65535)
//!     .default(8080)
//!     .desc("Port to listen on")
//!     .build(TypeTable::standard())
//!     .unwrap();
//!
//! assert_eq!(def.default_value(), Some(Value::Integer(8080)));
//! assert_eq!(def.coerce(&Value::from("0x50")), Ok(Value::Integer(80)));
//! assert!(def.coerce(&Value::from(0)).is_err());
//! ```

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use crate::error::{DeclarationError, ValidationError};
use crate::type_table::{TypeOptions, TypeTable};
use crate::types::ParamType;
use crate::value::Value;

/// Zero-argument callable producing a default on demand.
pub type LazyDefault = Arc<dyn Fn() -> Value + Send + Sync>;

/// Default value of a param.
#[derive(Clone)]
pub enum DefaultValue {
    /// Fixed value, cloned for every instance.
    Static(Value),
    /// Computed on every resolution.
    Lazy(LazyDefault),
}

impl DefaultValue {
    /// Wraps a closure as a lazy default.
    pub fn lazy<F>(f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Self::Lazy(Arc::new(f))
    }

    /// Produces the default value.
    pub fn resolve(&self) -> Value {
        match self {
            Self::Static(value) => value.clone(),
            Self::Lazy(f) => f(),
        }
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self, Self::Lazy(_))
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Self::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

/// A declared param.
#[derive(Debug, Clone)]
pub struct ParamDefinition {
    name: String,
    param_type: ParamType,
    required: bool,
    default: Option<DefaultValue>,
    desc: String,
}

impl ParamDefinition {
    /// Creates a definition directly from a type.
    ///
    /// # Errors
    ///
    /// Returns [`DeclarationError::MissingDescription`] if `desc` is blank.
    pub fn new(
        name: impl Into<String>,
        param_type: ParamType,
        desc: impl Into<String>,
    ) -> Result<Self, DeclarationError> {
        let name = name.into();
        let desc = desc.into();
        if desc.trim().is_empty() {
            return Err(DeclarationError::MissingDescription(name));
        }
        Ok(Self {
            name,
            param_type,
            required: false,
            default: None,
            desc,
        })
    }

    /// Marks the param as required.
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the default.
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn param_type(&self) -> &ParamType {
        &self.param_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn desc(&self) -> &str {
        &self.desc
    }

    pub fn default(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    /// Returns `true` if a default was given and it is not nil.
    ///
    /// Lazy defaults always count, since their value is unknown until they
    /// run.
    pub fn has_default(&self) -> bool {
        match &self.default {
            Some(DefaultValue::Static(value)) => !value.is_nil(),
            Some(DefaultValue::Lazy(_)) => true,
            None => false,
        }
    }

    /// Resolves the default.
    ///
    /// Lazy defaults are invoked on every call; static defaults are returned
    /// as an independent copy.
    pub fn default_value(&self) -> Option<Value> {
        self.default.as_ref().map(DefaultValue::resolve)
    }

    /// Coerces a raw value through the param's type.
    ///
    /// A nil value passes through unchanged for optional params and is
    /// rejected for required ones.
    pub fn coerce(&self, value: &Value) -> Result<Value, ValidationError> {
        if value.is_nil() {
            if self.required {
                return Err(ValidationError::new("param requires a non-nil value"));
            }
            return Ok(Value::Nil);
        }
        self.param_type.coerce(value)
    }
}

/// How a declaration names its type.
#[derive(Debug, Clone)]
pub enum TypeSpec {
    /// A name or alias looked up in the [`TypeTable`].
    Named(String),
    /// A Rust type looked up in the [`TypeTable`].
    Native { id: TypeId, name: &'static str },
    /// A ready-made type; type options are not accepted alongside it.
    Variant(ParamType),
}

impl Default for TypeSpec {
    fn default() -> Self {
        Self::Named("String".to_string())
    }
}

/// Builder for [`ParamDefinition`], mirroring
/// `param(name, type = String, required: false, default: None, desc:, **type_options)`.
#[derive(Debug, Clone)]
pub struct ParamDeclaration {
    name: String,
    ty: TypeSpec,
    required: bool,
    default: Option<DefaultValue>,
    desc: Option<String>,
    options: TypeOptions,
}

impl ParamDeclaration {
    /// Starts a declaration of a `String` param named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: TypeSpec::default(),
            required: false,
            default: None,
            desc: None,
            options: TypeOptions::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names the type (`"Integer"`, `"i64"`, `"URI"`, ...).
    pub fn type_name(mut self, name: impl Into<String>) -> Self {
        self.ty = TypeSpec::Named(name.into());
        self
    }

    /// Uses the type mapped to the Rust type `T`.
    pub fn native<T: 'static>(mut self) -> Self {
        self.ty = TypeSpec::Native {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        };
        self
    }

    /// Uses a ready-made type.
    pub fn param_type(mut self, ty: impl Into<ParamType>) -> Self {
        self.ty = TypeSpec::Variant(ty.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets a static default.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Static(value.into()));
        self
    }

    /// Sets a default computed on every resolution.
    pub fn lazy_default<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultValue::lazy(f));
        self
    }

    pub fn desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = Some(desc.into());
        self
    }

    pub fn min(mut self, min: impl Into<Value>) -> Self {
        self.options.min = Some(min.into());
        self
    }

    pub fn max(mut self, max: impl Into<Value>) -> Self {
        self.options.max = Some(max.into());
        self
    }

    pub fn range(mut self, start: impl Into<Value>, end: impl Into<Value>) -> Self {
        self.options.range = Some((start.into(), end.into()));
        self
    }

    pub fn format(mut self, pattern: impl Into<String>) -> Self {
        self.options.format = Some(pattern.into());
        self
    }

    pub fn allow_empty(mut self, allow: bool) -> Self {
        self.options.allow_empty = Some(allow);
        self
    }

    pub fn allow_blank(mut self, allow: bool) -> Self {
        self.options.allow_blank = Some(allow);
        self
    }

    pub fn values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Replaces all type options at once.
    pub fn options(mut self, options: TypeOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolves the type and builds the definition.
    ///
    /// # Errors
    ///
    /// - [`DeclarationError::MissingDescription`] if no non-blank description
    ///   was given.
    /// - [`DeclarationError::UnknownType`] if the type name is not in `types`.
    /// - [`DeclarationError::UnsupportedTypeOption`] if options were given
    ///   with a ready-made type, or do not apply to the named type.
    pub fn build(self, types: &TypeTable) -> Result<ParamDefinition, DeclarationError> {
        let desc = match self.desc {
            Some(desc) if !desc.trim().is_empty() => desc,
            _ => return Err(DeclarationError::MissingDescription(self.name)),
        };

        let param_type = match self.ty {
            TypeSpec::Named(name) => types.build(&name, &self.options)?,
            TypeSpec::Native { id, name } => types.build_type_id(id, name, &self.options)?,
            TypeSpec::Variant(ty) => {
                if let Some(option) = self.options.given().first() {
                    return Err(DeclarationError::UnsupportedTypeOption {
                        ty: ty.name().to_string(),
                        option: option.to_string(),
                    });
                }
                ty
            }
        };

        let mut definition =
            ParamDefinition::new(self.name, param_type, desc)?.with_required(self.required);
        if let Some(default) = self.default {
            definition = definition.with_default(default);
        }
        Ok(definition)
    }
}

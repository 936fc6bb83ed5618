//! Error types for declaration, coercion and assignment.
//!
//! Nothing in this crate recovers from these errors internally; they are
//! always handed back to the caller.

use thiserror::Error;

/// A value failed a type's coercion rule.
///
/// # Examples
///
/// ```
/// use param_schema_core::{ParamType, Value};
///
/// let err = ParamType::integer().coerce(&Value::from("zz")).unwrap_err();
/// assert_eq!(err.to_string(), "value contains non-numeric characters (\"zz\")");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    /// Creates a validation error with a human-readable reason.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the reason.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors raised while assigning or validating an instance's params.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    /// A supplied value failed coercion for the named param.
    #[error("invalid param value for param '{name}': {source}")]
    InvalidValue {
        name: String,
        #[source]
        source: ValidationError,
    },
    /// A required param has no value.
    #[error("param '{0}' requires a value")]
    RequiredParam(String),
    /// The name is not declared in the schema.
    #[error("unknown param: {0}")]
    UnknownParam(String),
}

impl ParamError {
    /// Name of the param the error refers to.
    pub fn param_name(&self) -> &str {
        match self {
            Self::InvalidValue { name, .. } => name,
            Self::RequiredParam(name) | Self::UnknownParam(name) => name,
        }
    }
}

/// Errors raised while declaring types, params or classes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    /// The type name is not present in the type table.
    #[error("unknown param type: {0}")]
    UnknownType(String),
    /// A param was declared without a description.
    #[error("param '{0}' must have a description")]
    MissingDescription(String),
    /// A type option was given to a type that does not accept it.
    #[error("type {ty} does not accept the '{option}' option")]
    UnsupportedTypeOption { ty: String, option: String },
    /// A type option has an unusable value.
    #[error("invalid '{option}' option: {reason}")]
    InvalidTypeOption { option: String, reason: String },
    /// An enum type was declared with no values.
    #[error("enum type requires at least one value")]
    EmptyEnum,
    /// The class name is not registered.
    #[error("unknown class: {0}")]
    UnknownClass(String),
    /// The class name is already registered.
    #[error("class already registered: {0}")]
    DuplicateClass(String),
}

/// Errors from building an instance of a registered class.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The class could not be resolved.
    #[error(transparent)]
    Declaration(#[from] DeclarationError),
    /// The supplied params were rejected.
    #[error(transparent)]
    Param(#[from] ParamError),
}

/// Convenience alias for results with [`ParamError`].
pub type Result<T> = std::result::Result<T, ParamError>;

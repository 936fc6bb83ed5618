//! Typed param definitions, coercion and validation.
//!
//! This crate lets a class declare named, typed configuration values
//! ("params") and lets each instance collect concrete values for them:
//!
//! - [`ParamType`]: the type variants (Boolean, Integer, Float, String,
//!   Regexp, URI, Enum) and their coercion rules.
//! - [`ParamDeclaration`] / [`ParamDefinition`]: a declared param with its type,
//!   required flag, static or lazy default, description.
//! - [`ParamSchema`]: the ordered params of one class.
//! - [`SchemaRegistry`]: class schemas with explicit parent links and
//!   copy-on-first-touch inheritance.
//! - [`ParamValues`]: an instance's value store, with bulk assignment and
//!   required-param validation. The [`Params`] trait exposes the same API on
//!   types that embed one.
//! - [`TypeTable`]: type names and Rust types mapped to type constructors.
//!
//! # Example
//!
//! ```
//! use param_schema_core::*;
//!
//! let mut registry = SchemaRegistry::new();
//! registry.register_class("C", None).unwrap();
//! registry
//!     .declare("C", ParamDeclaration::new("count").type_name("Integer").default(42).desc("n"))
//!     .unwrap();
//! registry
//!     .declare("C", ParamDeclaration::new("name").required().desc("id"))
//!     .unwrap();
//!
//! let mut params = ValueMap::new();
//! params.insert("name".into(), Value::from("abc"));
//! let c = registry.instantiate_with("C", params).unwrap();
//! assert_eq!(c.get_integer("count"), Some(42));
//! assert_eq!(c.get_str("name"), Some("abc"));
//!
//! let err = registry.instantiate_with("C", ValueMap::new()).unwrap_err();
//! assert_eq!(err.to_string(), "param 'name' requires a value");
//! ```

mod definition;
mod error;
mod numeric;
mod registry;
mod schema;
mod type_table;
mod types;
mod value;
mod values;

pub use definition::{DefaultValue, LazyDefault, ParamDeclaration, ParamDefinition, TypeSpec};
pub use error::{DeclarationError, ParamError, RegistryError, Result, ValidationError};
pub use numeric::{FloatType, IntegerType, NumericBounds};
pub use registry::SchemaRegistry;
pub use schema::ParamSchema;
pub use type_table::{TypeBuilder, TypeOptions, TypeTable};
pub use types::{EnumType, ParamType, StringType};
pub use value::{Value, ValueMap};
pub use values::{ParamValues, Params};

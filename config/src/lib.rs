//! Descriptor and value files for param schemas.
//!
//! This crate reads YAML or JSON files that declare classes and their params,
//! and builds a [`SchemaRegistry`](param_schema_core::SchemaRegistry) from
//! them. It also reads flat value files that are fed into an instance's bulk
//! assignment.
//!
//! # Quick start
//!
//! ```no_run
//! use param_schema_config::{SchemaFile, build_registry, load_values};
//!
//! let file = SchemaFile::load("params.yml").unwrap();
//! let mut registry = build_registry(&file).unwrap();
//!
//! let values = load_values("values.yml").unwrap();
//! let instance = registry.instantiate_with("Child", values).unwrap();
//! for (name, value) in instance.params() {
//!     println!("{name} = {value}");
//! }
//! ```

mod config;
mod error;
mod loader;

pub use config::{ClassSpec, FileFormat, ParamSpec, SchemaFile};
pub use error::{ConfigError, Result};
pub use loader::{build_registry, load_values, parse_values};

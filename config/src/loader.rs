//! Turning descriptors into registries and reading value files.
//!
//! ```no_run
//! use param_schema_config::{SchemaFile, build_registry, load_values};
//!
//! let file = SchemaFile::load("params.yml").unwrap();
//! let mut registry = build_registry(&file).unwrap();
//! let values = load_values("job.yml").unwrap();
//! let job = registry.instantiate_with("Job", values).unwrap();
//! println!("{:?}", job.params());
//! ```

use std::path::Path;

use param_schema_core::{
    DeclarationError, DefaultValue, ParamDeclaration, ParamDefinition, SchemaRegistry, Value, ValueMap,
};
use tracing::{debug, warn};

use crate::config::{FileFormat, ParamSpec, SchemaFile};
use crate::error::{ConfigError, Result};

/// Builds a registry holding every class in `file`.
///
/// Classes are registered in file order, so parents must come first. Static
/// defaults are coerced through their param's type; `default_env` becomes a
/// lazy default that reads the variable on every resolution.
///
/// # Errors
///
/// - [`ConfigError::Declaration`] for unknown parents, duplicate classes,
///   unknown types, bad type options or missing descriptions.
/// - [`ConfigError::InvalidDefault`] when a static default fails coercion.
/// - [`ConfigError::ConflictingDefaults`] when both default kinds are set.
///
/// # Examples
///
/// ```
/// use param_schema_config::{FileFormat, SchemaFile, build_registry};
///
/// let yaml = r#"
/// version: "1.0"
/// classes:
///   - name: C
///     params:
///       - { name: count, type: Integer, default: "0x2A", desc: n }
/// "#;
/// let file = SchemaFile::parse(yaml, FileFormat::Yaml).unwrap();
/// let mut registry = build_registry(&file).unwrap();
/// let c = registry.instantiate("C").unwrap();
/// assert_eq!(c.get_integer("count"), Some(42));
/// ```
pub fn build_registry(file: &SchemaFile) -> Result<SchemaRegistry> {
    let mut registry = SchemaRegistry::new();

    for class in &file.classes {
        let declaration_error = |source: DeclarationError| ConfigError::Declaration {
            class: class.name.clone(),
            source,
        };

        registry
            .register_class(&class.name, class.parent.as_deref())
            .map_err(declaration_error)?;

        for spec in &class.params {
            let definition = build_definition(&class.name, spec, &registry)?;
            registry
                .define(&class.name, definition)
                .map_err(declaration_error)?;
        }

        debug!(
            class = %class.name,
            params = class.params.len(),
            "Loaded class from descriptor"
        );
    }

    Ok(registry)
}

fn build_definition(
    class: &str,
    spec: &ParamSpec,
    registry: &SchemaRegistry,
) -> Result<ParamDefinition> {
    if spec.default.as_ref().is_some_and(|raw| !raw.is_null()) && spec.default_env.is_some() {
        return Err(ConfigError::ConflictingDefaults {
            class: class.to_string(),
            param: spec.name.clone(),
        });
    }

    let mut decl = ParamDeclaration::new(&spec.name)
        .type_name(&spec.ty)
        .options(spec.type_options());
    if spec.required {
        decl = decl.required();
    }
    if let Some(desc) = &spec.desc {
        decl = decl.desc(desc);
    }

    let definition = decl
        .build(registry.types())
        .map_err(|source| ConfigError::Declaration {
            class: class.to_string(),
            source,
        })?;

    if let Some(raw) = spec.default.as_ref().filter(|raw| !raw.is_null()) {
        let coerced = definition
            .param_type()
            .coerce(&Value::from(raw.clone()))
            .map_err(|source| ConfigError::InvalidDefault {
                class: class.to_string(),
                param: spec.name.clone(),
                source,
            })?;
        return Ok(definition.with_default(DefaultValue::Static(coerced)));
    }

    if let Some(var) = &spec.default_env {
        let var = var.clone();
        let param_type = definition.param_type().clone();
        let param = spec.name.clone();
        let lazy = DefaultValue::lazy(move || match std::env::var(&var) {
            Ok(raw) => param_type.coerce(&Value::from(raw)).unwrap_or_else(|err| {
                warn!(param = %param, var = %var, error = %err, "Ignoring environment default");
                Value::Nil
            }),
            Err(_) => Value::Nil,
        });
        return Ok(definition.with_default(lazy));
    }

    Ok(definition)
}

/// Loads a value file (a mapping of param name to value).
///
/// # Errors
///
/// Returns an I/O or parse error, or [`ConfigError::InvalidValues`] if the
/// top level is not a mapping.
pub fn load_values(path: impl AsRef<Path>) -> Result<ValueMap> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    parse_values(&text, FileFormat::from_path(path))
}

/// Parses a value mapping from text.
///
/// An empty document yields an empty map.
///
/// # Errors
///
/// Returns a parse error, or [`ConfigError::InvalidValues`] if the top
/// level is not a mapping.
///
/// # Examples
///
/// ```
/// use param_schema_config::{FileFormat, parse_values};
/// use param_schema_core::Value;
///
/// let values = parse_values("name: abc\ncount: 5\n", FileFormat::Yaml).unwrap();
/// assert_eq!(values["count"], Value::Integer(5));
/// ```
pub fn parse_values(text: &str, format: FileFormat) -> Result<ValueMap> {
    if text.trim().is_empty() {
        return Ok(ValueMap::new());
    }

    let raw: serde_json::Value = match format {
        FileFormat::Json => serde_json::from_str(text)?,
        FileFormat::Yaml => serde_yaml::from_str(text)?,
    };

    match Value::from(raw) {
        Value::Map(map) => Ok(map),
        Value::Nil => Ok(ValueMap::new()),
        _ => Err(ConfigError::InvalidValues),
    }
}

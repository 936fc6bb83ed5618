//! Schema descriptor files.
//!
//! A descriptor lists classes, their parents, and the params each declares.
//! It is read from YAML or JSON (chosen by file extension) and turned into a
//! [`SchemaRegistry`](param_schema_core::SchemaRegistry) by
//! [`build_registry`](crate::build_registry).
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! classes:
//!   - name: Base
//!     params:
//!       - name: count
//!         type: Integer
//!         default: 42
//!         min: 0
//!         desc: Number of items
//!   - name: Child
//!     parent: Base
//!     params:
//!       - name: name
//!         required: true
//!         desc: Identifier
//!       - name: mode
//!         type: Enum
//!         values: [fast, slow]
//!         default: fast
//!         desc: Processing mode
//!       - name: home
//!         default_env: HOME
//!         desc: Home directory
//! ```

use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use param_schema_core::{TypeOptions, Value};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Serialization format of a descriptor or value file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
}

impl FileFormat {
    /// Picks the format from the file extension.
    ///
    /// `.json` is JSON; anything else is read as YAML, which also accepts
    /// JSON documents.
    ///
    /// # Examples
    ///
    /// ```
    /// use param_schema_config::FileFormat;
    ///
    /// assert_eq!(FileFormat::from_path("params.json"), FileFormat::Json);
    /// assert_eq!(FileFormat::from_path("params.yml"), FileFormat::Yaml);
    /// assert_eq!(FileFormat::from_path("params"), FileFormat::Yaml);
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// One declared param.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Param name.
    pub name: String,
    /// Type name or alias (defaults to `String`).
    #[serde(rename = "type", default = "default_type")]
    pub ty: String,
    /// Whether a value must be present after assignment.
    #[serde(default)]
    pub required: bool,
    /// Static default, coerced through the param's type at load time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// Environment variable read on every default resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_env: Option<String>,
    /// Human description (mandatory).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<serde_json::Value>,
    /// Closed interval `[start, end]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<(serde_json::Value, serde_json::Value)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_empty: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_blank: Option<bool>,
    /// Enum values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
}

fn default_type() -> String {
    "String".to_string()
}

impl ParamSpec {
    /// Type options carried by this spec.
    pub fn type_options(&self) -> TypeOptions {
        TypeOptions {
            min: self.min.clone().map(Value::from),
            max: self.max.clone().map(Value::from),
            range: self
                .range
                .clone()
                .map(|(start, end)| (Value::from(start), Value::from(end))),
            format: self.format.clone(),
            allow_empty: self.allow_empty,
            allow_blank: self.allow_blank,
            values: self.values.clone(),
        }
    }
}

/// One class and the params it declares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSpec {
    /// Class name.
    pub name: String,
    /// Parent class; must appear earlier in the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Params declared by this class (inherited ones are not repeated).
    #[serde(default)]
    pub params: Vec<ParamSpec>,
}

/// Top-level descriptor.
///
/// # Examples
///
/// ```no_run
/// use param_schema_config::SchemaFile;
///
/// let file = SchemaFile::load("params.yml").unwrap();
/// for class in &file.classes {
///     println!("{} declares {} params", class.name, class.params.len());
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaFile {
    /// Descriptor format version (e.g., `"1.0"`).
    pub version: String,
    /// Classes in declaration order.
    #[serde(default)]
    pub classes: Vec<ClassSpec>,
}

impl SchemaFile {
    /// Loads a descriptor, choosing YAML or JSON by extension.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::ConfigError::IoError) if the file cannot
    /// be read, or a [`JsonError`](crate::ConfigError::JsonError) /
    /// [`YamlError`](crate::ConfigError::YamlError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let descriptor = match FileFormat::from_path(path) {
            FileFormat::Json => serde_json::from_reader(reader)?,
            FileFormat::Yaml => serde_yaml::from_reader(reader)?,
        };
        Ok(descriptor)
    }

    /// Saves the descriptor, choosing YAML or JSON by extension.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::ConfigError::IoError) if the file cannot
    /// be written, or a serialization error.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path)?;
        let mut writer = BufWriter::new(file);
        match FileFormat::from_path(path) {
            FileFormat::Json => serde_json::to_writer_pretty(&mut writer, self)?,
            FileFormat::Yaml => serde_yaml::to_writer(&mut writer, self)?,
        }
        writer.flush()?;
        Ok(())
    }

    /// Parses a descriptor from text.
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed input.
    pub fn parse(text: &str, format: FileFormat) -> Result<Self> {
        let descriptor = match format {
            FileFormat::Json => serde_json::from_str(text)?,
            FileFormat::Yaml => serde_yaml::from_str(text)?,
        };
        Ok(descriptor)
    }

    /// Finds a class by name.
    pub fn class(&self, name: &str) -> Option<&ClassSpec> {
        self.classes.iter().find(|c| c.name == name)
    }
}

//! Per-class schemas with explicit inheritance.
//!
//! Classes are registered with an explicit parent reference. A class's
//! schema is created on first touch: reading it or declaring into it seeds
//! the schema with a duplicate of the parent's *current* schema, after which
//! the two evolve independently. Parent declarations made after a child was
//! first touched are not seen by that child.
//!
//! # Examples
//!
//! ```
//! use param_schema_core::{ParamDeclaration, SchemaRegistry};
//!
//! let mut registry = SchemaRegistry::new();
//! registry.register_class("Base", None).unwrap();
//! registry.register_class("Child", Some("Base")).unwrap();
//!
//! registry.declare("Base", ParamDeclaration::new("foo").desc("a foo")).unwrap();
//! registry.declare("Child", ParamDeclaration::new("bar").desc("a bar")).unwrap();
//!
//! assert_eq!(registry.schema("Child").unwrap().names(), vec!["foo", "bar"]);
//! assert_eq!(registry.schema("Base").unwrap().names(), vec!["foo"]);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::definition::{ParamDeclaration, ParamDefinition};
use crate::error::{DeclarationError, RegistryError};
use crate::schema::ParamSchema;
use crate::type_table::TypeTable;
use crate::value::ValueMap;
use crate::values::ParamValues;

#[derive(Debug, Clone)]
struct ClassEntry {
    parent: Option<String>,
    schema: Option<Arc<ParamSchema>>,
}

/// Registry of class schemas.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    classes: HashMap<String, ClassEntry>,
    order: Vec<String>,
    types: TypeTable,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaRegistry {
    /// Creates a registry resolving type names with the standard types.
    pub fn new() -> Self {
        Self::with_types(TypeTable::standard().clone())
    }

    /// Creates a registry resolving type names with `types`.
    pub fn with_types(types: TypeTable) -> Self {
        Self {
            classes: HashMap::new(),
            order: Vec::new(),
            types,
        }
    }

    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    /// Registers a class, optionally as a subclass of `parent`.
    ///
    /// # Errors
    ///
    /// - [`DeclarationError::DuplicateClass`] if `name` is already
    ///   registered.
    /// - [`DeclarationError::UnknownClass`] if `parent` is not registered.
    pub fn register_class(
        &mut self,
        name: &str,
        parent: Option<&str>,
    ) -> Result<(), DeclarationError> {
        if self.classes.contains_key(name) {
            return Err(DeclarationError::DuplicateClass(name.to_string()));
        }
        if let Some(parent) = parent {
            if !self.classes.contains_key(parent) {
                return Err(DeclarationError::UnknownClass(parent.to_string()));
            }
        }

        debug!(class = name, parent = ?parent, "Registering class");
        self.classes.insert(
            name.to_string(),
            ClassEntry {
                parent: parent.map(String::from),
                schema: None,
            },
        );
        self.order.push(name.to_string());
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Class names in registration order.
    pub fn class_names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Parent of a registered class.
    ///
    /// # Errors
    ///
    /// Returns [`DeclarationError::UnknownClass`] if `name` is not
    /// registered.
    pub fn parent(&self, name: &str) -> Result<Option<&str>, DeclarationError> {
        self.entry(name).map(|entry| entry.parent.as_deref())
    }

    /// Returns the class's schema, creating it on first touch.
    ///
    /// # Errors
    ///
    /// Returns [`DeclarationError::UnknownClass`] if `name` is not
    /// registered.
    pub fn schema(&mut self, name: &str) -> Result<Arc<ParamSchema>, DeclarationError> {
        self.touch(name)
    }

    /// Declares a param on a class.
    ///
    /// # Errors
    ///
    /// Returns [`DeclarationError::UnknownClass`] for unregistered classes,
    /// or the declaration's build error.
    pub fn declare(&mut self, class: &str, decl: ParamDeclaration) -> Result<(), DeclarationError> {
        let definition = decl.build(&self.types)?;
        self.define(class, definition)
    }

    /// Adds a prebuilt definition to a class.
    ///
    /// # Errors
    ///
    /// Returns [`DeclarationError::UnknownClass`] for unregistered classes.
    pub fn define(&mut self, class: &str, definition: ParamDefinition) -> Result<(), DeclarationError> {
        self.touch(class)?;
        debug!(class, param = definition.name(), "Declaring class param");
        let entry = self.entry_mut(class)?;
        let schema = entry.schema.get_or_insert_with(Default::default);
        // Instances built earlier keep the snapshot they were created with.
        Arc::make_mut(schema).define(definition);
        Ok(())
    }

    /// Creates an instance value store populated with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`DeclarationError::UnknownClass`] if `class` is not
    /// registered.
    pub fn instantiate(&mut self, class: &str) -> Result<ParamValues, DeclarationError> {
        Ok(ParamValues::new(self.touch(class)?))
    }

    /// Creates an instance and bulk-assigns `params`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Declaration`] for unknown classes, or
    /// [`RegistryError::Param`] when assignment or validation fails.
    pub fn instantiate_with(
        &mut self,
        class: &str,
        params: ValueMap,
    ) -> Result<ParamValues, RegistryError> {
        let schema = self.touch(class)?;
        Ok(ParamValues::with_params(schema, params)?)
    }

    fn touch(&mut self, name: &str) -> Result<Arc<ParamSchema>, DeclarationError> {
        let entry = self.entry(name)?;
        if let Some(schema) = &entry.schema {
            return Ok(Arc::clone(schema));
        }

        let seeded = match entry.parent.clone() {
            Some(parent) => {
                let parent_schema = self.touch(&parent)?;
                debug!(class = name, parent = %parent, "Seeding schema from parent");
                ParamSchema::inherit(&parent_schema)
            }
            None => ParamSchema::new(),
        };

        let seeded = Arc::new(seeded);
        self.entry_mut(name)?.schema = Some(Arc::clone(&seeded));
        Ok(seeded)
    }

    fn entry(&self, name: &str) -> Result<&ClassEntry, DeclarationError> {
        self.classes
            .get(name)
            .ok_or_else(|| DeclarationError::UnknownClass(name.to_string()))
    }

    fn entry_mut(&mut self, name: &str) -> Result<&mut ClassEntry, DeclarationError> {
        self.classes
            .get_mut(name)
            .ok_or_else(|| DeclarationError::UnknownClass(name.to_string()))
    }
}

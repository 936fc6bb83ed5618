//! Ordered param schemas.
//!
//! A [`ParamSchema`] is the set of params one class declares, in declaration
//! order and unique by name. Definitions are shared by reference
//! ([`Arc`]), so duplicating a schema for a subclass is cheap and the copy
//! can diverge without touching the original.

use std::sync::Arc;

use tracing::debug;

use crate::definition::{ParamDeclaration, ParamDefinition};
use crate::error::DeclarationError;
use crate::type_table::TypeTable;
use crate::value::ValueMap;

/// Ordered mapping of param name to definition.
///
/// # Examples
///
/// ```
/// use param_schema_core::{ParamDeclaration, ParamSchema};
///
/// let mut base = ParamSchema::new();
/// base.declare(ParamDeclaration::new("foo").desc("a foo")).unwrap();
///
/// let mut child = ParamSchema::inherit(&base);
/// child.declare(ParamDeclaration::new("bar").desc("a bar")).unwrap();
///
/// assert_eq!(child.names(), vec!["foo", "bar"]);
/// assert!(!base.contains("bar"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ParamSchema {
    definitions: Vec<Arc<ParamDefinition>>,
}

impl ParamSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Duplicates `parent`: same definitions by reference, independent
    /// container.
    pub fn inherit(parent: &ParamSchema) -> Self {
        parent.clone()
    }

    /// Builds and adds a declaration using the standard [`TypeTable`].
    ///
    /// # Errors
    ///
    /// Returns the declaration's build error.
    pub fn declare(&mut self, decl: ParamDeclaration) -> Result<&mut Self, DeclarationError> {
        self.declare_with(decl, TypeTable::standard())
    }

    /// Builds and adds a declaration, resolving its type in `types`.
    ///
    /// # Errors
    ///
    /// Returns the declaration's build error.
    pub fn declare_with(
        &mut self,
        decl: ParamDeclaration,
        types: &TypeTable,
    ) -> Result<&mut Self, DeclarationError> {
        let definition = decl.build(types)?;
        Ok(self.define(definition))
    }

    /// Adds a definition, replacing one with the same name in place.
    pub fn define(&mut self, definition: ParamDefinition) -> &mut Self {
        let definition = Arc::new(definition);
        match self
            .definitions
            .iter_mut()
            .find(|d| d.name() == definition.name())
        {
            Some(slot) => {
                debug!(param = definition.name(), "Overriding param definition");
                *slot = definition;
            }
            None => {
                debug!(
                    param = definition.name(),
                    ty = definition.param_type().name(),
                    "Declaring param"
                );
                self.definitions.push(definition);
            }
        }
        self
    }

    /// Definitions in declaration order.
    pub fn definitions(&self) -> impl Iterator<Item = &ParamDefinition> {
        self.definitions.iter().map(Arc::as_ref)
    }

    pub fn get(&self, name: &str) -> Option<&ParamDefinition> {
        self.definitions
            .iter()
            .find(|d| d.name() == name)
            .map(Arc::as_ref)
    }

    /// Shared handle to a definition, for identity comparisons.
    pub fn get_shared(&self, name: &str) -> Option<&Arc<ParamDefinition>> {
        self.definitions.iter().find(|d| d.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.definitions.iter().map(|d| d.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// One entry per definition that has a default, freshly resolved.
    pub fn defaults(&self) -> ValueMap {
        self.definitions()
            .filter(|d| d.has_default())
            .filter_map(|d| d.default_value().map(|v| (d.name().to_string(), v)))
            .collect()
    }
}

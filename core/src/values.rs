//! Per-instance param values.
//!
//! [`ParamValues`] is the value store an object carries next to its class
//! schema. It starts from the schema's defaults, accepts individual
//! assignments through [`set_param`](ParamValues::set_param) and bulk
//! replacement through [`set_params`](ParamValues::set_params), and checks
//! required params with [`validate_params`](ParamValues::validate_params).
//!
//! Bulk replacement is atomic: the new store is staged from the defaults,
//! every entry is coerced and the required check runs before anything is
//! committed. On error the previous values are left untouched.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use param_schema_core::{ParamDeclaration, ParamSchema, ParamValues, Value, ValueMap};
//!
//! let mut schema = ParamSchema::new();
//! schema
//!     .declare(ParamDeclaration::new("count").type_name("Integer").default(42).desc("n"))
//!     .unwrap()
//!     .declare(ParamDeclaration::new("name").required().desc("id"))
//!     .unwrap();
//! let schema = Arc::new(schema);
//!
//! let mut params = ValueMap::new();
//! params.insert("name".into(), Value::from("abc"));
//! params.insert("count".into(), Value::from("0xFF"));
//!
//! let values = ParamValues::with_params(schema, params).unwrap();
//! assert_eq!(values.get_integer("count"), Some(255));
//! assert_eq!(values.get_str("name"), Some("abc"));
//! ```

use std::sync::Arc;

use tracing::debug;

use crate::error::{ParamError, Result};
use crate::schema::ParamSchema;
use crate::value::{Value, ValueMap};

/// Value store of one instance.
#[derive(Debug, Clone)]
pub struct ParamValues {
    schema: Arc<ParamSchema>,
    values: ValueMap,
}

impl ParamValues {
    /// Creates a store holding only the schema's defaults.
    pub fn new(schema: Arc<ParamSchema>) -> Self {
        let values = schema.defaults();
        Self { schema, values }
    }

    /// Creates a store and bulk-assigns `params`.
    ///
    /// # Errors
    ///
    /// Fails like [`set_params`](Self::set_params).
    pub fn with_params(schema: Arc<ParamSchema>, params: ValueMap) -> Result<Self> {
        let mut values = Self::new(schema);
        values.set_params(params)?;
        Ok(values)
    }

    /// Schema the values are checked against.
    pub fn schema(&self) -> &ParamSchema {
        &self.schema
    }

    /// Shared handle to the schema.
    pub fn shared_schema(&self) -> &Arc<ParamSchema> {
        &self.schema
    }

    /// Current values.
    pub fn params(&self) -> &ValueMap {
        &self.values
    }

    /// Consumes the store, returning the values.
    pub fn into_params(self) -> ValueMap {
        self.values
    }

    /// Replaces all values.
    ///
    /// The store is reset to the defaults, each entry is applied as by
    /// [`set_param`](Self::set_param), and required params are checked. The
    /// replacement only takes effect if all of that succeeds.
    ///
    /// Undeclared names are rejected before anything is coerced. Entries are
    /// then applied in the schema's declaration order, so with several bad
    /// values the error names the earliest declared param.
    ///
    /// # Errors
    ///
    /// - [`ParamError::UnknownParam`] for an undeclared name.
    /// - [`ParamError::InvalidValue`] when a value fails coercion.
    /// - [`ParamError::RequiredParam`] when a required param ends up without
    ///   a value.
    pub fn set_params(&mut self, mut params: ValueMap) -> Result<()> {
        if let Some(unknown) = params.keys().find(|name| !self.schema.contains(name)) {
            return Err(ParamError::UnknownParam(unknown.clone()));
        }

        let mut staged = Self::new(Arc::clone(&self.schema));
        debug!(count = params.len(), "Assigning params");
        for definition in self.schema.definitions() {
            if let Some(value) = params.remove(definition.name()) {
                staged.set_param(definition.name(), value)?;
            }
        }
        staged.validate_params()?;
        self.values = staged.values;
        Ok(())
    }

    /// Coerces and stores a single value.
    ///
    /// # Errors
    ///
    /// - [`ParamError::UnknownParam`] if `name` is not declared.
    /// - [`ParamError::InvalidValue`] if the value fails coercion.
    pub fn set_param(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let definition = self
            .schema
            .get(name)
            .ok_or_else(|| ParamError::UnknownParam(name.to_string()))?;

        let coerced = definition
            .coerce(&value.into())
            .map_err(|source| ParamError::InvalidValue {
                name: name.to_string(),
                source,
            })?;

        self.values.insert(name.to_string(), coerced);
        Ok(())
    }

    /// Checks that every required param has a non-nil value.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::RequiredParam`] for the first missing param in
    /// declaration order.
    pub fn validate_params(&self) -> Result<()> {
        match self
            .schema
            .definitions()
            .find(|d| d.is_required() && self.get(d.name()).is_none_or(Value::is_nil))
        {
            Some(missing) => Err(ParamError::RequiredParam(missing.name().to_string())),
            None => Ok(()),
        }
    }

    /// Drops all assigned values and restores the defaults.
    pub fn reset(&mut self) {
        self.values = self.schema.defaults();
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn get_integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_integer)
    }

    pub fn get_float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_float)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_symbol(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_symbol)
    }
}

/// Params API for types that embed a [`ParamValues`].
///
/// Implementors only provide access to the embedded store; the rest is
/// forwarded.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, LazyLock};
/// use param_schema_core::{ParamDeclaration, ParamSchema, ParamValues, Params};
///
/// static SCHEMA: LazyLock<Arc<ParamSchema>> = LazyLock::new(|| {
///     let mut schema = ParamSchema::new();
///     schema
///         .declare(ParamDeclaration::new("verbose").type_name("Boolean").default(false).desc("chatty"))
///         .unwrap();
///     Arc::new(schema)
/// });
///
/// struct Scanner {
///     params: ParamValues,
/// }
///
/// impl Params for Scanner {
///     fn param_values(&self) -> &ParamValues {
///         &self.params
///     }
///     fn param_values_mut(&mut self) -> &mut ParamValues {
///         &mut self.params
///     }
/// }
///
/// let mut scanner = Scanner { params: ParamValues::new(Arc::clone(&SCHEMA)) };
/// scanner.set_param("verbose", "yes").unwrap();
/// assert_eq!(scanner.param_values().get_bool("verbose"), Some(true));
/// ```
pub trait Params {
    fn param_values(&self) -> &ParamValues;

    fn param_values_mut(&mut self) -> &mut ParamValues;

    fn param_schema(&self) -> &ParamSchema {
        self.param_values().schema()
    }

    fn params(&self) -> &ValueMap {
        self.param_values().params()
    }

    fn set_params(&mut self, params: ValueMap) -> Result<()> {
        self.param_values_mut().set_params(params)
    }

    fn set_param(&mut self, name: &str, value: impl Into<Value>) -> Result<()>
    where
        Self: Sized,
    {
        self.param_values_mut().set_param(name, value)
    }

    fn validate_params(&self) -> Result<()> {
        self.param_values().validate_params()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::ParamDeclaration;

    fn sample_schema() -> Arc<ParamSchema> {
        let mut schema = ParamSchema::new();
        schema
            .declare(
                ParamDeclaration::new("count")
                    .type_name("Integer")
                    .default(42)
                    .desc("n"),
            )
            .unwrap()
            .declare(ParamDeclaration::new("name").required().desc("id"))
            .unwrap()
            .declare(ParamDeclaration::new("verbose").type_name("Boolean").desc("v"))
            .unwrap();
        Arc::new(schema)
    }

    fn map(entries: &[(&str, Value)]) -> ValueMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_new_holds_only_defaults() {
        let values = ParamValues::new(sample_schema());
        assert_eq!(values.params(), &map(&[("count", Value::Integer(42))]));
    }

    #[test]
    fn test_end_to_end() {
        let values =
            ParamValues::with_params(sample_schema(), map(&[("name", Value::from("abc"))])).unwrap();
        assert_eq!(
            values.params(),
            &map(&[("name", Value::from("abc")), ("count", Value::Integer(42))])
        );

        let err = ParamValues::with_params(sample_schema(), ValueMap::new()).unwrap_err();
        assert_eq!(err, ParamError::RequiredParam("name".to_string()));
        assert_eq!(err.to_string(), "param 'name' requires a value");

        let values = ParamValues::with_params(
            sample_schema(),
            map(&[("name", Value::from("abc")), ("count", Value::from("0xFF"))]),
        )
        .unwrap();
        assert_eq!(values.get_integer("count"), Some(255));
    }

    #[test]
    fn test_required_check_after_new() {
        let values = ParamValues::new(sample_schema());
        assert_eq!(
            values.validate_params(),
            Err(ParamError::RequiredParam("name".to_string()))
        );

        let mut values = values;
        values.set_param("name", "x").unwrap();
        assert!(values.validate_params().is_ok());
    }

    #[test]
    fn test_required_value_cannot_be_nil() {
        let mut values = ParamValues::new(sample_schema());
        let err = values.set_param("name", Value::Nil).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid param value for param 'name': param requires a non-nil value"
        );
    }

    #[test]
    fn test_set_param_unknown() {
        let mut values = ParamValues::new(sample_schema());
        assert_eq!(
            values.set_param("nope", 1),
            Err(ParamError::UnknownParam("nope".to_string()))
        );
    }

    #[test]
    fn test_set_param_wraps_validation_error() {
        let mut values = ParamValues::new(sample_schema());
        let err = values.set_param("count", "zz").unwrap_err();
        assert_eq!(err.param_name(), "count");
        assert_eq!(
            err.to_string(),
            "invalid param value for param 'count': value contains non-numeric characters (\"zz\")"
        );
        assert_eq!(values.get_integer("count"), Some(42));
    }

    #[test]
    fn test_optional_nil_is_stored() {
        let mut values = ParamValues::new(sample_schema());
        values.set_param("count", Value::Nil).unwrap();
        assert_eq!(values.get("count"), Some(&Value::Nil));
    }

    #[test]
    fn test_set_params_discards_previous_values() {
        let mut values = ParamValues::new(sample_schema());
        values.set_param("verbose", true).unwrap();
        values.set_param("count", 7).unwrap();

        values
            .set_params(map(&[("name", Value::from("abc"))]))
            .unwrap();
        assert_eq!(values.get_integer("count"), Some(42));
        assert_eq!(values.get("verbose"), None);
    }

    #[test]
    fn test_set_params_is_atomic() {
        let mut values = ParamValues::with_params(
            sample_schema(),
            map(&[("name", Value::from("first")), ("count", Value::from(1))]),
        )
        .unwrap();
        let before = values.params().clone();

        let err = values
            .set_params(map(&[
                ("name", Value::from("second")),
                ("count", Value::from(2)),
                ("verbose", Value::from("perhaps")),
            ]))
            .unwrap_err();
        assert!(matches!(err, ParamError::InvalidValue { ref name, .. } if name == "verbose"));
        assert_eq!(values.params(), &before);

        let err = values
            .set_params(map(&[("count", Value::from(3))]))
            .unwrap_err();
        assert_eq!(err, ParamError::RequiredParam("name".to_string()));
        assert_eq!(values.params(), &before);
    }

    #[test]
    fn test_set_params_reports_earliest_declared_error() {
        let mut schema = ParamSchema::new();
        schema
            .declare(ParamDeclaration::new("zeta").type_name("Integer").desc("z"))
            .unwrap()
            .declare(ParamDeclaration::new("alpha").type_name("Integer").desc("a"))
            .unwrap();
        let mut values = ParamValues::new(Arc::new(schema));

        let err = values
            .set_params(map(&[("alpha", Value::from("zz")), ("zeta", Value::from("zz"))]))
            .unwrap_err();
        assert_eq!(err.param_name(), "zeta");

        let err = values
            .set_params(map(&[("zeta", Value::from("zz")), ("omega", Value::from(1))]))
            .unwrap_err();
        assert_eq!(err, ParamError::UnknownParam("omega".to_string()));
    }

    #[test]
    fn test_lazy_defaults_resolved_per_instance() {
        use std::sync::atomic::{AtomicI64, Ordering};

        let counter = Arc::new(AtomicI64::new(100));
        let next = Arc::clone(&counter);
        let mut schema = ParamSchema::new();
        schema
            .declare(
                ParamDeclaration::new("id")
                    .type_name("Integer")
                    .lazy_default(move || Value::from(next.fetch_add(1, Ordering::SeqCst)))
                    .desc("id"),
            )
            .unwrap();
        let schema = Arc::new(schema);

        let a = ParamValues::new(Arc::clone(&schema));
        let b = ParamValues::new(schema);
        assert_eq!(a.get_integer("id"), Some(100));
        assert_eq!(b.get_integer("id"), Some(101));
    }

    #[test]
    fn test_static_defaults_not_shared_between_instances() {
        let mut schema = ParamSchema::new();
        schema
            .declare(ParamDeclaration::new("tag").default("x").desc("t"))
            .unwrap();
        let schema = Arc::new(schema);

        let mut a = ParamValues::new(Arc::clone(&schema));
        let b = ParamValues::new(schema);
        a.set_param("tag", "changed").unwrap();
        assert_eq!(b.get_str("tag"), Some("x"));
        a.reset();
        assert_eq!(a.get_str("tag"), Some("x"));
    }

    struct Widget {
        params: ParamValues,
    }

    impl Params for Widget {
        fn param_values(&self) -> &ParamValues {
            &self.params
        }

        fn param_values_mut(&mut self) -> &mut ParamValues {
            &mut self.params
        }
    }

    #[test]
    fn test_params_trait_forwards() {
        let mut widget = Widget {
            params: ParamValues::new(sample_schema()),
        };
        assert!(widget.validate_params().is_err());
        widget.set_param("name", "w").unwrap();
        widget.set_param("verbose", "on").unwrap();
        assert!(widget.validate_params().is_ok());
        assert_eq!(widget.params().get("verbose"), Some(&Value::Bool(true)));
        assert_eq!(widget.param_schema().len(), 3);

        widget.set_params(ValueMap::new()).unwrap_err();
        assert_eq!(widget.params().get("name"), Some(&Value::from("w")));
    }
}

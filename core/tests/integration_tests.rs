use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use param_schema_core::{
    DeclarationError, ParamDeclaration, ParamError, ParamType, ParamValues, Params,
    RegistryError, SchemaRegistry, Value, ValueMap,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn params(entries: &[(&str, Value)]) -> ValueMap {
    entries
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

/// `C` declares `count: Integer = 42` and a required `name: String`.
fn registry_with_c() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry.register_class("C", None).unwrap();
    registry
        .declare(
            "C",
            ParamDeclaration::new("count")
                .type_name("Integer")
                .default(42)
                .desc("n"),
        )
        .unwrap();
    registry
        .declare("C", ParamDeclaration::new("name").required().desc("id"))
        .unwrap();
    registry
}

// ---------------------------------------------------------------------------
// End-to-end
// ---------------------------------------------------------------------------

#[test]
fn test_end_to_end_scenario() {
    let mut registry = registry_with_c();

    let c = registry
        .instantiate_with("C", params(&[("name", Value::from("abc"))]))
        .unwrap();
    assert_eq!(
        c.params(),
        &params(&[("name", Value::from("abc")), ("count", Value::Integer(42))])
    );

    let err = registry.instantiate_with("C", ValueMap::new()).unwrap_err();
    assert_eq!(
        err,
        RegistryError::Param(ParamError::RequiredParam("name".to_string()))
    );

    let c = registry
        .instantiate_with(
            "C",
            params(&[("name", Value::from("abc")), ("count", Value::from("0xFF"))]),
        )
        .unwrap();
    assert_eq!(c.params()["count"], Value::Integer(255));
}

#[test]
fn test_required_without_default() {
    let mut registry = SchemaRegistry::new();
    registry.register_class("Job", None).unwrap();
    registry
        .declare(
            "Job",
            ParamDeclaration::new("retries")
                .type_name("Integer")
                .required()
                .desc("retry count"),
        )
        .unwrap();

    let job = registry.instantiate("Job").unwrap();
    assert_eq!(
        job.validate_params(),
        Err(ParamError::RequiredParam("retries".to_string()))
    );

    let job = registry
        .instantiate_with("Job", params(&[("retries", Value::from(5))]))
        .unwrap();
    assert!(job.validate_params().is_ok());
    assert_eq!(job.get_integer("retries"), Some(5));
}

#[test]
fn test_unknown_param_in_bulk_map() {
    let mut registry = registry_with_c();
    let err = registry
        .instantiate_with(
            "C",
            params(&[("name", Value::from("abc")), ("colour", Value::from("red"))]),
        )
        .unwrap_err();
    assert_eq!(
        err,
        RegistryError::Param(ParamError::UnknownParam("colour".to_string()))
    );
}

// ---------------------------------------------------------------------------
// Inheritance
// ---------------------------------------------------------------------------

#[test]
fn test_schema_isolation() {
    let mut registry = SchemaRegistry::new();
    registry.register_class("Base", None).unwrap();
    registry.register_class("Child", Some("Base")).unwrap();
    registry
        .declare("Base", ParamDeclaration::new("foo").desc("base foo"))
        .unwrap();
    registry
        .declare("Child", ParamDeclaration::new("bar").desc("child bar"))
        .unwrap();
    registry
        .declare(
            "Child",
            ParamDeclaration::new("foo")
                .type_name("Integer")
                .desc("child foo"),
        )
        .unwrap();

    let base = registry.schema("Base").unwrap();
    assert!(!base.contains("bar"));
    assert_eq!(base.get("foo").unwrap().desc(), "base foo");
    assert_eq!(base.get("foo").unwrap().param_type().name(), "String");

    let child = registry.schema("Child").unwrap();
    assert_eq!(child.names(), vec!["foo", "bar"]);
    assert_eq!(child.get("foo").unwrap().desc(), "child foo");

    // Instances of the parent still reject the child's params.
    let mut base_instance = registry.instantiate("Base").unwrap();
    assert_eq!(
        base_instance.set_param("bar", "x"),
        Err(ParamError::UnknownParam("bar".to_string()))
    );
}

#[test]
fn test_parent_changes_do_not_reach_touched_child() {
    let mut registry = SchemaRegistry::new();
    registry.register_class("Base", None).unwrap();
    registry.register_class("Child", Some("Base")).unwrap();
    registry
        .declare("Base", ParamDeclaration::new("foo").desc("foo"))
        .unwrap();

    let child_before = registry.schema("Child").unwrap();
    registry
        .declare(
            "Base",
            ParamDeclaration::new("foo")
                .type_name("Integer")
                .desc("redeclared"),
        )
        .unwrap();

    assert_eq!(
        registry.schema("Child").unwrap().get("foo").unwrap().desc(),
        "foo"
    );
    assert_eq!(child_before.get("foo").unwrap().desc(), "foo");
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

#[test]
fn test_lazy_default_freshness() {
    let ticks = Arc::new(AtomicU64::new(0));
    let source = Arc::clone(&ticks);

    let mut registry = SchemaRegistry::new();
    registry.register_class("Session", None).unwrap();
    registry
        .declare(
            "Session",
            ParamDeclaration::new("nonce")
                .type_name("Integer")
                .lazy_default(move || {
                    Value::from(source.fetch_add(1, Ordering::SeqCst) as i64 * 7919)
                })
                .desc("per-session nonce"),
        )
        .unwrap();
    registry
        .declare(
            "Session",
            ParamDeclaration::new("region")
                .lazy_default(|| Value::from("eu-west"))
                .desc("region"),
        )
        .unwrap();

    let schema = registry.schema("Session").unwrap();
    let nonce = schema.get("nonce").unwrap();
    assert_ne!(nonce.default_value(), nonce.default_value());

    let region = schema.get("region").unwrap();
    assert_eq!(region.default_value(), region.default_value());
    assert_eq!(ticks.load(Ordering::SeqCst), 2);
}

#[test]
fn test_env_backed_lazy_default() {
    let mut registry = SchemaRegistry::new();
    registry.register_class("Tool", None).unwrap();
    registry
        .declare(
            "Tool",
            ParamDeclaration::new("home")
                .lazy_default(|| Value::from(std::env::var("PARAM_SCHEMA_TEST_UNSET_VAR").ok()))
                .allow_empty(true)
                .desc("home directory"),
        )
        .unwrap();

    let tool = registry.instantiate("Tool").unwrap();
    assert_eq!(tool.get("home"), Some(&Value::Nil));
}

// ---------------------------------------------------------------------------
// Declaration errors
// ---------------------------------------------------------------------------

#[test]
fn test_declaration_errors() {
    let mut registry = SchemaRegistry::new();
    registry.register_class("X", None).unwrap();

    assert_eq!(
        registry.declare("X", ParamDeclaration::new("a").type_name("Decimal").desc("d")),
        Err(DeclarationError::UnknownType("Decimal".to_string()))
    );
    assert_eq!(
        registry.declare("X", ParamDeclaration::new("a")),
        Err(DeclarationError::MissingDescription("a".to_string()))
    );
    assert_eq!(
        registry.declare("Y", ParamDeclaration::new("a").desc("d")),
        Err(DeclarationError::UnknownClass("Y".to_string()))
    );
    assert!(ParamType::enumeration(Vec::<String>::new()).is_err());
    assert!(registry.schema("X").unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Embedding
// ---------------------------------------------------------------------------

struct Exporter {
    params: ParamValues,
}

impl Exporter {
    fn new(registry: &mut SchemaRegistry, params: ValueMap) -> Result<Self, RegistryError> {
        Ok(Self {
            params: registry.instantiate_with("Exporter", params)?,
        })
    }
}

impl Params for Exporter {
    fn param_values(&self) -> &ParamValues {
        &self.params
    }

    fn param_values_mut(&mut self) -> &mut ParamValues {
        &mut self.params
    }
}

#[test]
fn test_embedded_params() {
    let mut registry = SchemaRegistry::new();
    registry.register_class("Exporter", None).unwrap();
    registry
        .declare(
            "Exporter",
            ParamDeclaration::new("format")
                .type_name("Enum")
                .values(["json", "yaml"])
                .default(Value::symbol("json"))
                .desc("output format"),
        )
        .unwrap();
    registry
        .declare(
            "Exporter",
            ParamDeclaration::new("endpoint")
                .type_name("URI")
                .required()
                .desc("upload target"),
        )
        .unwrap();

    let mut exporter = Exporter::new(
        &mut registry,
        params(&[("endpoint", Value::from("https://upload.example.com/v1"))]),
    )
    .unwrap();
    assert_eq!(exporter.params()["format"], Value::symbol("json"));

    exporter.set_param("format", "yaml").unwrap();
    assert_eq!(exporter.params()["format"], Value::symbol("yaml"));

    let err = exporter.set_param("format", "xml").unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid param value for param 'format': unknown value (\"xml\")"
    );
}

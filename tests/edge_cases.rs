use ruleform::{
    BuildError, ConfigSource, Document, FormatProfile, FormatRegistry, Path, ReadError,
    RulesBuilder, RulesSchemaReader, Segment, Value,
};
use serde_json::json;

fn registry(profile: FormatProfile) -> FormatRegistry {
    FormatRegistry::builder().format(profile).build().unwrap()
}

#[test]
fn deeply_nested_options() {
    // 20 levels of single-element list wrapping, each flattened.
    let mut flatten_paths = Vec::new();
    let mut path = "deep".to_owned();
    let mut options = json!({"leaf": "x"});
    for i in (0..20).rev() {
        options = json!({ format!("level_{i}"): [options] });
    }
    for i in 0..20 {
        path = format!("{path}.level_{i}");
        flatten_paths.push(path.clone());
    }

    let profile = flatten_paths
        .iter()
        .fold(FormatProfile::new("v1"), |p, path| p.flatten(path));
    let registry = registry(profile);

    let doc = Document::from(json!({
        "rules_v1": [{"name": "default", "behavior": [{"deep": [options]}]}]
    }));
    let rule = RulesBuilder::new(&doc, &registry, "v1")
        .unwrap()
        .build()
        .unwrap();

    let mut current = Value::Map(rule.behaviors[0].options.clone());
    for i in 0..20 {
        current = current.as_map().unwrap()[&format!("level{i}")].clone();
    }
    assert_eq!(current.as_map().unwrap()["leaf"], Value::from("x"));
}

#[test]
fn many_slots_preserve_order() {
    let slots: Vec<serde_json::Value> = (0..100)
        .map(|i| json!({ format!("b{i}"): [{"n": i}] }))
        .collect();
    let doc = Document::from(json!({
        "rules_v1": [{"name": "default", "behavior": slots}]
    }));
    let registry = registry(FormatProfile::new("v1"));
    let rule = RulesBuilder::new(&doc, &registry, "v1")
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(rule.behaviors.len(), 100);
    for (i, item) in rule.behaviors.iter().enumerate() {
        assert_eq!(item.name, format!("b{i}"));
        assert_eq!(item.options["n"], Value::Int(i64::try_from(i).unwrap()));
    }
}

#[test]
fn empty_behavior_list() {
    let doc = Document::from(json!({"rules_v1": [{"name": "default", "behavior": []}]}));
    let registry = registry(FormatProfile::new("v1"));
    let rule = RulesBuilder::new(&doc, &registry, "v1")
        .unwrap()
        .build()
        .unwrap();
    assert!(rule.behaviors.is_empty());
}

#[test]
fn null_slot_is_skipped() {
    let doc = Document::from(json!({
        "rules_v1": [{"name": "default", "behavior": [null, {"gzip": [{}]}]}]
    }));
    let registry = registry(FormatProfile::new("v1"));
    let rule = RulesBuilder::new(&doc, &registry, "v1")
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(rule.behaviors.len(), 1);
}

#[test]
fn behavior_list_of_wrong_type() {
    let doc = Document::from(json!({"rules_v1": [{"name": "default", "behavior": "gzip"}]}));
    let registry = registry(FormatProfile::new("v1"));
    let err = RulesBuilder::new(&doc, &registry, "v1")
        .unwrap()
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        BuildError::Read(ReadError::TypeMismatch { wanted, got, .. }) if wanted == "list" && got == "string"
    ));
}

#[test]
fn children_of_wrong_type() {
    let doc = Document::from(json!({"rules_v1": [{"name": "default", "children": [{"name": "x"}]}]}));
    let registry = registry(FormatProfile::new("v1"));
    let err = RulesBuilder::new(&doc, &registry, "v1")
        .unwrap()
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        BuildError::Read(ReadError::TypeMismatch { path, .. }) if path == "rules_v1.0.children.0"
    ));
}

#[test]
fn scalar_flatten_target_is_contract_violation() {
    let registry = registry(FormatProfile::new("v1").flatten("cache.timeout"));
    let doc = Document::from(json!({
        "rules_v1": [{"name": "default", "behavior": [{"cache": [{"timeout": "30s"}]}]}]
    }));
    let err = RulesBuilder::new(&doc, &registry, "v1")
        .unwrap()
        .build()
        .unwrap_err();
    assert!(err.is_invariant_violation());
}

#[test]
fn unicode_and_empty_strings() {
    let registry = registry(FormatProfile::new("v1").map_type("header.value", "", "EMPTY"));
    let doc = Document::from(json!({
        "rules_v1": [{
            "name": "default",
            "comments": "règle par défaut ✓",
            "behavior": [{"header": [{"value": "", "name": "X-Ünïcode"}]}]
        }]
    }));
    let rule = RulesBuilder::new(&doc, &registry, "v1")
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(rule.comments.as_deref(), Some("règle par défaut ✓"));
    assert_eq!(rule.behaviors[0].options["value"], Value::from("EMPTY"));
    assert_eq!(rule.behaviors[0].options["name"], Value::from("X-Ünïcode"));
}

#[test]
fn numeric_and_bool_literals_are_mappable() {
    let registry = registry(
        FormatProfile::new("v1")
            .map_type("limit.max", "0", Value::Null)
            .map_type("limit.enabled", "false", "OFF"),
    );
    let doc = Document::from(json!({
        "rules_v1": [{"name": "default", "behavior": [{"limit": [{"max": 0, "enabled": false}]}]}]
    }));
    let rule = RulesBuilder::new(&doc, &registry, "v1")
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(rule.behaviors[0].options["max"], Value::Null);
    assert_eq!(rule.behaviors[0].options["enabled"], Value::from("OFF"));
}

/// A source that exposes a value tree under a fixed prefix, the way a host
/// schema system might.
struct Prefixed {
    prefix: Path,
    inner: Value,
}

impl ConfigSource for Prefixed {
    fn lookup(&self, path: &Path) -> Option<&Value> {
        let rest = path.segments().strip_prefix(self.prefix.segments())?;
        let rest = rest.iter().fold(Path::default(), |p, s| match s {
            Segment::Key(k) => p.key(k.as_str()),
            Segment::Index(i) => p.index(*i),
        });
        self.inner.lookup(&rest)
    }
}

#[test]
fn custom_config_source() {
    let source = Prefixed {
        prefix: Path::parse("resource.rules").unwrap(),
        inner: Value::from(json!({"name": "default", "comments": "hosted"})),
    };
    let registry = registry(FormatProfile::new("v1"));
    let profile = registry.profile_for("v1").unwrap();
    let reader = RulesSchemaReader::with_root(&source, Path::parse("resource.rules").unwrap());
    let rule = RulesBuilder::with_reader(reader, profile).build().unwrap();
    assert_eq!(rule.comments.as_deref(), Some("hosted"));
}

use std::sync::Arc;
use std::thread;

use ruleform::{Document, FormatProfile, FormatRegistry, RulesBuilder, Value};
use serde_json::json;

#[test]
fn independent_builders_across_threads() {
    let registry = Arc::new(
        FormatRegistry::builder()
            .format(FormatProfile::new("v2023-01-05").flatten("cache.timeout"))
            .format(FormatProfile::new("v2024-02-12").remap_name("cache.timeout", "ttl"))
            .build()
            .unwrap(),
    );

    let mut handles = vec![];

    // One builder per resource, each with its own snapshot and format.
    for i in 0..8_i64 {
        let reg = Arc::clone(&registry);
        handles.push(thread::spawn(move || {
            let (version, key, timeout) = if i % 2 == 0 {
                ("v2023-01-05", "rules_v2023_01_05", json!([format!("{i}s")]))
            } else {
                ("v2024-02-12", "rules_v2024_02_12", json!(format!("{i}s")))
            };
            let doc = Document::from(json!({
                key: [{"name": "default", "behavior": [{"cache": [{"timeout": timeout}]}]}]
            }));
            let rule = RulesBuilder::new(&doc, &reg, version)
                .unwrap()
                .build()
                .unwrap();
            (i, rule)
        }));
    }

    for handle in handles {
        let (i, rule) = handle.join().unwrap();
        let options = &rule.behaviors[0].options;
        let expected = Value::from(format!("{i}s"));
        if i % 2 == 0 {
            assert_eq!(options["timeout"], expected);
        } else {
            assert_eq!(options["ttl"], expected);
        }
    }
}

#[test]
fn registry_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<FormatRegistry>();
    assert_send_sync::<Document>();
}

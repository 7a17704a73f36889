use crate::parse::{Path, Segment};

use super::Value;

/// Read access to a host-supplied configuration tree.
///
/// `lookup` returns `None` when nothing is present at `path`. Implementations
/// must never mutate the underlying tree.
pub trait ConfigSource {
    fn lookup(&self, path: &Path) -> Option<&Value>;
}

impl<T: ConfigSource + ?Sized> ConfigSource for &T {
    fn lookup(&self, path: &Path) -> Option<&Value> {
        (**self).lookup(path)
    }
}

impl ConfigSource for Value {
    fn lookup(&self, path: &Path) -> Option<&Value> {
        walk(self, path.segments())
    }
}

/// An in-memory configuration snapshot rooted at a single [`Value`].
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
}

impl Document {
    #[must_use]
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if `input` is not valid JSON.
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        let root: Value = serde_json::from_str(input)?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Value {
        &self.root
    }
}

impl From<Value> for Document {
    fn from(root: Value) -> Self {
        Self { root }
    }
}

impl From<serde_json::Value> for Document {
    fn from(json: serde_json::Value) -> Self {
        Self {
            root: Value::from(json),
        }
    }
}

impl ConfigSource for Document {
    fn lookup(&self, path: &Path) -> Option<&Value> {
        walk(&self.root, path.segments())
    }
}

fn walk<'a>(root: &'a Value, segments: &[Segment]) -> Option<&'a Value> {
    segments.iter().try_fold(root, |current, segment| match (current, segment) {
        (Value::Map(map), Segment::Key(key)) => map.get(key),
        (Value::Map(map), Segment::Index(i)) => map.get(&i.to_string()),
        (Value::List(items), Segment::Index(i)) => items.get(*i),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn path(s: &str) -> Path {
        Path::parse(s).unwrap()
    }

    #[test]
    fn lookup_nested_key() {
        let doc = Document::from(json!({"a": {"b": {"c": 1}}}));
        assert_eq!(doc.lookup(&path("a.b.c")), Some(&Value::Int(1)));
    }

    #[test]
    fn lookup_list_index() {
        let doc = Document::from(json!({"a": [{"name": "x"}, {"name": "y"}]}));
        assert_eq!(doc.lookup(&path("a.1.name")), Some(&Value::from("y")));
        assert_eq!(doc.lookup(&path("a[0].name")), Some(&Value::from("x")));
    }

    #[test]
    fn lookup_out_of_range_is_absent() {
        let doc = Document::from(json!({"a": [1]}));
        assert_eq!(doc.lookup(&path("a.5")), None);
    }

    #[test]
    fn lookup_through_scalar_is_absent() {
        let doc = Document::from(json!({"a": "leaf"}));
        assert_eq!(doc.lookup(&path("a.b")), None);
    }

    #[test]
    fn index_segment_on_map_uses_string_key() {
        let doc = Document::from(json!({"a": {"0": true}}));
        assert_eq!(doc.lookup(&path("a.0")), Some(&Value::Bool(true)));
    }

    #[test]
    fn explicit_null_is_present() {
        let doc = Document::from(json!({"a": null}));
        assert_eq!(doc.lookup(&path("a")), Some(&Value::Null));
    }

    #[test]
    fn empty_path_is_root() {
        let doc = Document::from(json!({"a": 1}));
        assert_eq!(doc.lookup(&Path::default()), Some(doc.root()));
    }

    #[test]
    fn from_json_text() {
        let doc = Document::from_json(r#"{"a": [true]}"#).unwrap();
        assert_eq!(doc.lookup(&path("a.0")), Some(&Value::Bool(true)));
        assert!(Document::from_json("{").is_err());
    }
}

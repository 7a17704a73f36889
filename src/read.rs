//! Typed extraction over a dynamic configuration tree.
//!
//! [`RulesSchemaReader`] resolves paths relative to one rule's root in the
//! config tree and returns typed values, distinguishing a value that is
//! absent ([`ReadError::NotFound`]) from one that has the wrong shape
//! ([`ReadError::TypeMismatch`]). It also resolves "pick one of N named
//! blocks" slots into [`RuleItem`]s.

use tracing::trace;

use crate::parse::Path;
use crate::types::{ConfigSource, CustomOverride, Map, ReadError, RuleItem, Value, Variable};

const LOCKED: &str = "locked";
const UUID: &str = "uuid";
const TEMPLATE_UUID: &str = "template_uuid";

/// Typed reader rooted at one rule inside a [`ConfigSource`].
#[derive(Debug)]
pub struct RulesSchemaReader<'a, S: ?Sized> {
    source: &'a S,
    root: Path,
}

impl<S: ?Sized> Clone for RulesSchemaReader<'_, S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source,
            root: self.root.clone(),
        }
    }
}

impl<'a, S: ConfigSource + ?Sized> RulesSchemaReader<'a, S> {
    /// A reader over the rule stored at `rules_key.0`, the layout the host
    /// schema uses for a single-element rule block.
    pub fn new(source: &'a S, rules_key: &str) -> Self {
        Self::with_root(source, Path::default().key(rules_key).index(0))
    }

    /// A reader whose relative paths resolve under `root`.
    pub fn with_root(source: &'a S, root: Path) -> Self {
        Self { source, root }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<Path, ReadError> {
        Ok(self.root.clone().join(&Path::parse(path)?))
    }

    /// Absent and explicit null are both `NotFound`.
    fn value_at(&self, path: &Path) -> Result<&'a Value, ReadError> {
        match self.source.lookup(path) {
            None | Some(Value::Null) => Err(ReadError::not_found(path)),
            Some(value) => Ok(value),
        }
    }

    fn string_at(&self, path: &Path) -> Result<String, ReadError> {
        match self.value_at(path)? {
            Value::String(s) => Ok(s.clone()),
            other => Err(ReadError::mismatch("string", other.kind(), path)),
        }
    }

    fn bool_at(&self, path: &Path) -> Result<bool, ReadError> {
        match self.value_at(path)? {
            Value::Bool(b) => Ok(*b),
            other => Err(ReadError::mismatch("bool", other.kind(), path)),
        }
    }

    fn list_at(&self, path: &Path) -> Result<&'a [Value], ReadError> {
        match self.value_at(path)? {
            Value::List(items) => Ok(items),
            other => Err(ReadError::mismatch("list", other.kind(), path)),
        }
    }

    fn map_at(&self, path: &Path) -> Result<&'a Map, ReadError> {
        match self.value_at(path)? {
            Value::Map(map) => Ok(map),
            other => Err(ReadError::mismatch("map", other.kind(), path)),
        }
    }

    /// The raw value at `path`.
    ///
    /// # Errors
    ///
    /// [`ReadError::NotFound`] when absent or null.
    pub fn get_value(&self, path: &str) -> Result<&'a Value, ReadError> {
        self.value_at(&self.resolve(path)?)
    }

    /// # Errors
    ///
    /// [`ReadError::NotFound`] when absent or null, [`ReadError::TypeMismatch`]
    /// when not a string.
    pub fn get_string(&self, path: &str) -> Result<String, ReadError> {
        self.string_at(&self.resolve(path)?)
    }

    /// # Errors
    ///
    /// [`ReadError::NotFound`] when absent or null, [`ReadError::TypeMismatch`]
    /// when not a bool.
    pub fn get_bool(&self, path: &str) -> Result<bool, ReadError> {
        self.bool_at(&self.resolve(path)?)
    }

    /// # Errors
    ///
    /// [`ReadError::NotFound`] when absent or null, [`ReadError::TypeMismatch`]
    /// when not a list.
    pub fn get_list(&self, path: &str) -> Result<&'a [Value], ReadError> {
        self.list_at(&self.resolve(path)?)
    }

    /// A list whose every element is a map.
    ///
    /// # Errors
    ///
    /// [`ReadError::TypeMismatch`] names the first offending element.
    pub fn get_list_of_maps(&self, path: &str) -> Result<Vec<&'a Map>, ReadError> {
        let path = self.resolve(path)?;
        self.list_at(&path)?
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Map(map) => Ok(map),
                other => Err(ReadError::mismatch(
                    "map",
                    other.kind(),
                    path.clone().index(i),
                )),
            })
            .collect()
    }

    /// A list of strings, e.g. serialized child rules.
    ///
    /// # Errors
    ///
    /// [`ReadError::TypeMismatch`] names the first element that is not a string.
    pub fn get_strings(&self, path: &str) -> Result<Vec<String>, ReadError> {
        let path = self.resolve(path)?;
        self.list_at(&path)?
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(ReadError::mismatch(
                    "string",
                    other.kind(),
                    path.clone().index(i),
                )),
            })
            .collect()
    }

    /// A map whose values are all lists (a null value counts as an empty list).
    ///
    /// # Errors
    ///
    /// [`ReadError::TypeMismatch`] when the map or any of its values has the wrong shape.
    pub fn get_map_of_sequences(&self, path: &str) -> Result<&'a Map, ReadError> {
        self.map_of_sequences_at(&self.resolve(path)?)
    }

    fn map_of_sequences_at(&self, path: &Path) -> Result<&'a Map, ReadError> {
        let map = self.map_at(path)?;
        for (key, value) in map {
            if !matches!(value, Value::List(_) | Value::Null) {
                return Err(ReadError::mismatch(
                    "list",
                    value.kind(),
                    path.clone().key(key.as_str()),
                ));
            }
        }
        Ok(map)
    }

    /// The first element of a `[{name, override_id}]` list.
    ///
    /// # Errors
    ///
    /// [`ReadError::NotFound`] when absent, null or empty;
    /// [`ReadError::TypeMismatch`] when the element or its fields have the wrong shape.
    pub fn get_custom_override(&self, path: &str) -> Result<CustomOverride, ReadError> {
        let path = self.resolve(path)?;
        let items = self.list_at(&path)?;
        if items.is_empty() {
            return Err(ReadError::not_found(&path));
        }
        let first = path.index(0);
        self.map_at(&first).map_err(|e| match e {
            ReadError::NotFound { .. } => ReadError::mismatch("map", "null", &first),
            other => other,
        })?;
        Ok(CustomOverride {
            name: self.string_at(&first.clone().key("name"))?,
            override_id: self.string_at(&first.key("override_id"))?,
        })
    }

    /// Every element of a `[{name, description, value, sensitive, hidden}]` list.
    /// All five fields are required.
    ///
    /// # Errors
    ///
    /// [`ReadError::NotFound`] when the list or any field is missing.
    pub fn get_variables(&self, path: &str) -> Result<Vec<Variable>, ReadError> {
        let path = self.resolve(path)?;
        let count = self.list_at(&path)?.len();
        (0..count)
            .map(|i| -> Result<Variable, ReadError> {
                let base = path.clone().index(i);
                self.map_at(&base).map_err(|e| match e {
                    ReadError::NotFound { .. } => ReadError::mismatch("map", "null", &base),
                    other => other,
                })?;
                Ok(Variable {
                    name: self.string_at(&base.clone().key("name"))?,
                    description: self.string_at(&base.clone().key("description"))?,
                    value: self.string_at(&base.clone().key("value"))?,
                    sensitive: self.bool_at(&base.clone().key("sensitive"))?,
                    hidden: self.bool_at(&base.key("hidden"))?,
                })
            })
            .collect()
    }

    /// Resolve a list of "one of N named blocks" slots into rule items, in
    /// input order.
    ///
    /// Each slot maps item names to a list holding zero or one option map.
    /// A slot with no populated name is skipped. The returned options are raw:
    /// the `locked`, `uuid` and `template_uuid` entries have been lifted into
    /// the item, nothing else has been remapped.
    ///
    /// # Errors
    ///
    /// [`ReadError::TooManyElements`] when a slot populates more than one name.
    pub fn list_rule_items(&self, path: &str) -> Result<Vec<RuleItem>, ReadError> {
        let path = self.resolve(path)?;
        let slots = self.list_at(&path)?;
        let mut items = Vec::with_capacity(slots.len());

        for i in 0..slots.len() {
            let slot_path = path.clone().index(i);
            let slot = match self.map_of_sequences_at(&slot_path) {
                Ok(slot) => slot,
                Err(ReadError::NotFound { .. }) => continue,
                Err(e) => return Err(e),
            };

            let populated: Vec<(&String, &Value)> = slot
                .iter()
                .filter_map(|(name, blocks)| match blocks {
                    Value::List(list) => list.first().map(|first| (name, first)),
                    _ => None,
                })
                .collect();

            match populated.as_slice() {
                [] => {
                    trace!(slot = %slot_path, "skipping empty rule item slot");
                }
                [(name, block)] => {
                    let block_path = slot_path.clone().key(name.as_str()).index(0);
                    let item = rule_item(name, block, &block_path)?;
                    trace!(slot = %slot_path, item = %item.name, "resolved rule item");
                    items.push(item);
                }
                many => {
                    return Err(ReadError::TooManyElements {
                        candidates: many.iter().map(|(name, _)| (*name).clone()).collect(),
                        expected: 1,
                    });
                }
            }
        }
        Ok(items)
    }
}

fn rule_item(name: &str, block: &Value, path: &Path) -> Result<RuleItem, ReadError> {
    let mut options = match block {
        Value::Null => Map::new(),
        Value::Map(map) => map.clone(),
        other => return Err(ReadError::mismatch("map", other.kind(), path)),
    };

    let locked = match options.remove(LOCKED) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => b,
        Some(other) => {
            return Err(ReadError::mismatch(
                "bool",
                other.kind(),
                path.clone().key(LOCKED),
            ));
        }
    };
    let uuid = take_string(&mut options, UUID, path)?;
    let template_uuid = take_string(&mut options, TEMPLATE_UUID, path)?;

    Ok(RuleItem {
        name: name.to_owned(),
        options,
        locked,
        uuid,
        template_uuid,
    })
}

fn take_string(options: &mut Map, key: &str, path: &Path) -> Result<String, ReadError> {
    match options.remove(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(ReadError::mismatch(
            "string",
            other.kind(),
            path.clone().key(key),
        )),
    }
}

//! Recursive option remapping driven by a [`RuleFormat`].
//!
//! Configuration wraps every singleton object in a one-element list and
//! sometimes spells literal values differently from the rules API. The
//! remapper undoes both, at any nesting depth, and renames option keys to
//! their canonical API names.

use tracing::trace;

use crate::types::{InvariantViolation, Map, RuleFormat, RuleItem, Value};

/// Remap the options of one behavior or criterion.
///
/// `item_path` is the qualified path of the map being remapped (the item
/// name at the top level). For every `(name, value)` entry, with
/// `path = item_path.name`:
///
/// 1. the key becomes `format.name_remap(path)` or else `to_lower_camel(name)`;
/// 2. if `format.should_flatten(path)`, a one-element list is replaced by
///    its element and an empty list drops the key; otherwise a type mapping
///    for `path.<literal>` replaces the value;
/// 3. map elements of a list value are remapped under `path`;
/// 4. a map value is remapped under `path`.
///
/// # Errors
///
/// A flatten target that is not a list, or that holds more than one element,
/// means the profile disagrees with the schema and is reported as an
/// [`InvariantViolation`].
pub fn remap<F: RuleFormat + ?Sized>(
    format: &F,
    item_path: &str,
    options: Map,
) -> Result<Map, InvariantViolation> {
    let mut out = Map::new();
    for (name, value) in options {
        let path = format!("{item_path}.{name}");
        let key = match format.name_remap(&path) {
            Some(canonical) => canonical.to_owned(),
            None => to_lower_camel(&name),
        };

        let value = if format.should_flatten(&path) {
            match flatten(&path, value)? {
                Some(v) => v,
                None => continue,
            }
        } else {
            map_literal(format, &path, value)
        };

        out.insert(key, descend(format, &path, value)?);
    }
    Ok(out)
}

/// Remap an item's options in place of its raw ones.
///
/// # Errors
///
/// See [`remap`].
pub fn remap_item<F: RuleFormat + ?Sized>(
    format: &F,
    item: RuleItem,
) -> Result<RuleItem, InvariantViolation> {
    let options = remap(format, &item.name, item.options)?;
    Ok(RuleItem { options, ..item })
}

fn flatten(path: &str, value: Value) -> Result<Option<Value>, InvariantViolation> {
    match value {
        Value::List(mut items) => match items.len() {
            0 => Ok(None),
            1 => Ok(items.pop()),
            len => Err(InvariantViolation::FlattenTooManyElements {
                path: path.to_owned(),
                len,
            }),
        },
        other => Err(InvariantViolation::FlattenTargetNotSequence {
            path: path.to_owned(),
            got: other.kind().to_owned(),
        }),
    }
}

fn map_literal<F: RuleFormat + ?Sized>(format: &F, path: &str, value: Value) -> Value {
    let Some(literal) = value.literal() else {
        return value;
    };
    match format.type_mapping(&format!("{path}.{literal}")) {
        Some(mapped) => {
            trace!(path, literal = %literal, to = %mapped, "type mapping applied");
            mapped.clone()
        }
        None => value,
    }
}

fn descend<F: RuleFormat + ?Sized>(
    format: &F,
    path: &str,
    value: Value,
) -> Result<Value, InvariantViolation> {
    match value {
        Value::List(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Map(map) => remap(format, path, map).map(Value::Map),
                other => Ok(other),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        Value::Map(map) => remap(format, path, map).map(Value::Map),
        scalar => Ok(scalar),
    }
}

/// Convert a `snake_case`, `kebab-case` or spaced name to `lowerCamelCase`.
///
/// Names that are already lower-camel are returned unchanged.
#[must_use]
pub fn to_lower_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if matches!(c, '_' | '-' | ' ') {
            upper_next = !out.is_empty();
            continue;
        }
        if out.is_empty() {
            out.extend(c.to_lowercase());
        } else if upper_next {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        upper_next = false;
    }
    if out.is_empty() {
        return name.to_owned();
    }
    out
}

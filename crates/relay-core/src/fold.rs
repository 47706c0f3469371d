//! Case-insensitive key matching for schema decoding.
//!
//! Producers are not consistent about key casing (`Metadata` vs `metadata`),
//! so before a payload is handed to serde its keys are rewritten onto the
//! field names a schema declares. An exact key always wins over one that
//! only matches after case folding. Keys no field claims are dropped; serde
//! would ignore them anyway.

use serde_json::{Map, Value};

/// A field a schema reads, with the fields of its nested object (or of the
/// objects inside it, when the field is a list).
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub nested: &'static [Field],
}

fn folds_to(key: &str, name: &str) -> bool {
    key.chars()
        .flat_map(char::to_lowercase)
        .eq(name.chars().flat_map(char::to_lowercase))
}

/// Rewrites the keys of `object` onto `fields`, recursing into nested shapes.
pub fn fold_keys(object: Map<String, Value>, fields: &[Field]) -> Map<String, Value> {
    let mut folded = Map::new();
    let mut loose = Vec::new();

    for (key, value) in object {
        match fields.iter().find(|f| f.name == key) {
            Some(field) => {
                folded.insert(key, fold_value(value, field.nested));
            }
            None => loose.push((key, value)),
        }
    }

    for (key, value) in loose {
        if let Some(field) = fields.iter().find(|f| folds_to(&key, f.name)) {
            if !folded.contains_key(field.name) {
                folded.insert(field.name.to_string(), fold_value(value, field.nested));
            }
        }
    }

    folded
}

fn fold_value(value: Value, nested: &[Field]) -> Value {
    if nested.is_empty() {
        return value;
    }
    match value {
        Value::Object(object) => Value::Object(fold_keys(object, nested)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| fold_value(item, nested))
                .collect(),
        ),
        other => other,
    }
}

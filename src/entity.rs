//! Uniform attribute access over dynamic entities.
//!
//! Entities are `serde_json::Value`s: map-like inputs are `Value::Object`,
//! and struct inputs arrive through Serde serialization (see
//! [`crate::flatten_serialize`]), so by the time the engine sees them every
//! entity is an object. These helpers are the only structural contract the
//! engine places on its inputs; anything that is not an object simply has
//! no attributes.

use serde_json::Value;

/// Checks whether the entity carries an attribute with the given name.
pub fn has(entity: &Value, name: &str) -> bool {
    entity.as_object().is_some_and(|map| map.contains_key(name))
}

/// Reads an attribute. `None` when the entity is not an object or the
/// attribute is absent.
pub fn get<'a>(entity: &'a Value, name: &str) -> Option<&'a Value> {
    entity.as_object().and_then(|map| map.get(name))
}

/// Writes an attribute. A no-op on non-object entities.
pub fn set(entity: &mut Value, name: &str, value: Value) {
    if let Some(map) = entity.as_object_mut() {
        map.insert(name.to_string(), value);
    }
}

/// Deletes an attribute, preserving the order of the remaining ones.
pub fn remove(entity: &mut Value, name: &str) -> Option<Value> {
    entity.as_object_mut().and_then(|map| map.shift_remove(name))
}

/// Attribute names in the entity's own iteration order.
pub fn keys(entity: &Value) -> Vec<&str> {
    match entity.as_object() {
        Some(map) => map.keys().map(String::as_str).collect(),
        None => Vec::new(),
    }
}

/// An entity is anything with named attributes.
pub fn is_entity(value: &Value) -> bool {
    value.is_object()
}

/// To-many relations are ordered sequences.
pub fn is_list(value: &Value) -> bool {
    value.is_array()
}

/// Human-readable name of a value's shape, for error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_attribute_access() {
        let mut entity = json!({"name": "order1", "total": 10});
        assert!(has(&entity, "name"));
        assert!(!has(&entity, "missing"));
        assert_eq!(get(&entity, "total"), Some(&json!(10)));
        assert_eq!(get(&entity, "missing"), None);

        set(&mut entity, "state", json!("open"));
        assert_eq!(keys(&entity), vec!["name", "total", "state"]);

        assert_eq!(remove(&mut entity, "total"), Some(json!(10)));
        assert_eq!(keys(&entity), vec!["name", "state"]);
    }

    #[test]
    fn scalars_have_no_attributes() {
        let mut scalar = json!(42);
        assert!(!has(&scalar, "name"));
        assert_eq!(get(&scalar, "name"), None);
        set(&mut scalar, "name", json!("x"));
        assert_eq!(scalar, json!(42));
        assert!(keys(&scalar).is_empty());
    }

    #[test]
    fn shape_classification() {
        assert!(is_entity(&json!({})));
        assert!(!is_entity(&json!([])));
        assert!(is_list(&json!([1, 2])));
        assert!(!is_list(&json!("abc")));
    }
}

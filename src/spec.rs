//! The declarative flattening specification.
//!
//! A spec maps source attribute names to either a destination field name
//! (leaf: copy the scalar value) or a nested spec (descend into a to-one or
//! to-many relation). Written as JSON it looks like:
//!
//! ```json
//! {"name": "name", "items": {"sku": "item_sku"}}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity;
use crate::error::FlattenError;

/// What to do with one source attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldRule {
    /// Copy the attribute's value onto the record under this name.
    Leaf(String),
    /// Descend into the related entity (or each element of a related
    /// collection) with this spec.
    Nested(FlattenSpec),
}

/// Mapping from source attribute name to [`FieldRule`].
///
/// Attributes absent from an instance are silently skipped during
/// flattening; list-valued attributes absent from the spec are still
/// expanded, just without any field mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlattenSpec {
    rules: BTreeMap<String, FieldRule>,
}

impl FlattenSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form: map `source` to the destination name `dest`.
    pub fn field(mut self, source: &str, dest: &str) -> Self {
        self.rules
            .insert(source.to_string(), FieldRule::Leaf(dest.to_string()));
        self
    }

    /// Builder form: descend into `source` with the given sub-spec.
    pub fn nested(mut self, source: &str, spec: FlattenSpec) -> Self {
        self.rules
            .insert(source.to_string(), FieldRule::Nested(spec));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn rule(&self, name: &str) -> Option<&FieldRule> {
        self.rules.get(name)
    }

    /// The sub-spec registered for `name`, if that rule descends.
    pub fn nested_rule(&self, name: &str) -> Option<&FlattenSpec> {
        match self.rules.get(name) {
            Some(FieldRule::Nested(spec)) => Some(spec),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldRule)> {
        self.rules.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Parses a spec from a plain JSON mapping of string-or-mapping values.
    pub fn from_value(value: &Value) -> Result<Self, FlattenError> {
        Self::parse(value, "<root>")
    }

    fn parse(value: &Value, field: &str) -> Result<Self, FlattenError> {
        let Some(map) = value.as_object() else {
            return Err(FlattenError::InvalidSpec {
                field: field.to_string(),
                found: entity::type_name(value),
            });
        };
        let mut rules = BTreeMap::new();
        for (key, value) in map {
            let rule = match value {
                Value::String(dest) => FieldRule::Leaf(dest.clone()),
                Value::Object(_) => FieldRule::Nested(Self::parse(value, key)?),
                other => {
                    return Err(FlattenError::InvalidSpec {
                        field: key.clone(),
                        found: entity::type_name(other),
                    })
                }
            };
            rules.insert(key.clone(), rule);
        }
        Ok(Self { rules })
    }

    /// Merges `extension` into a copy of this spec, recursing where both
    /// sides descend. Existing entries are kept unless `override_existing`
    /// is set.
    pub fn extended(&self, extension: &FlattenSpec, override_existing: bool) -> FlattenSpec {
        let mut result = self.clone();
        for (key, value) in &extension.rules {
            if !override_existing && result.rules.contains_key(key) {
                continue;
            }
            let merged = match (result.rules.get(key), value) {
                (Some(FieldRule::Nested(base)), FieldRule::Nested(ext)) => {
                    FieldRule::Nested(base.extended(ext, override_existing))
                }
                _ => value.clone(),
            };
            result.rules.insert(key.clone(), merged);
        }
        result
    }

    /// A copy of this spec with the given source names removed.
    pub fn without(&self, keys: &[&str]) -> FlattenSpec {
        let mut result = self.clone();
        for key in keys {
            result.rules.remove(*key);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_nested_json_spec() {
        let spec = FlattenSpec::from_value(&json!({
            "name": "name",
            "items": {"sku": "item_sku"}
        }))
        .unwrap();

        assert_eq!(spec.rule("name"), Some(&FieldRule::Leaf("name".into())));
        let items = spec.nested_rule("items").unwrap();
        assert_eq!(items.rule("sku"), Some(&FieldRule::Leaf("item_sku".into())));
    }

    #[test]
    fn deserializes_through_serde() {
        let spec: FlattenSpec =
            serde_json::from_value(json!({"a": "a", "b": {"c": "bc"}})).unwrap();
        assert_eq!(spec.len(), 2);
        assert!(spec.nested_rule("b").is_some());
    }

    #[test]
    fn rejects_non_string_non_map_rules() {
        let err = FlattenSpec::from_value(&json!({"count": 3})).unwrap_err();
        assert!(err.to_string().contains("count"));

        let err = FlattenSpec::from_value(&json!("not a map")).unwrap_err();
        assert!(err.to_string().contains("<root>"));
    }

    #[test]
    fn extend_respects_override_flag() {
        let base = FlattenSpec::new().field("name", "name");
        let ext = FlattenSpec::new()
            .field("name", "full_name")
            .field("state", "state");

        let kept = base.extended(&ext, false);
        assert_eq!(kept.rule("name"), Some(&FieldRule::Leaf("name".into())));
        assert_eq!(kept.rule("state"), Some(&FieldRule::Leaf("state".into())));

        let overridden = base.extended(&ext, true);
        assert_eq!(
            overridden.rule("name"),
            Some(&FieldRule::Leaf("full_name".into()))
        );
    }

    #[test]
    fn extend_recurses_into_nested_rules() {
        let base =
            FlattenSpec::new().nested("items", FlattenSpec::new().field("sku", "item_sku"));
        let ext =
            FlattenSpec::new().nested("items", FlattenSpec::new().field("qty", "item_qty"));

        let merged = base.extended(&ext, true);
        let items = merged.nested_rule("items").unwrap();
        assert_eq!(items.rule("sku"), Some(&FieldRule::Leaf("item_sku".into())));
        assert_eq!(items.rule("qty"), Some(&FieldRule::Leaf("item_qty".into())));
    }

    #[test]
    fn without_drops_entries() {
        let spec = FlattenSpec::new()
            .field("name", "name")
            .field("state", "state");
        let trimmed = spec.without(&["state", "missing"]);
        assert_eq!(trimmed.len(), 1);
        assert!(trimmed.rule("state").is_none());
    }
}

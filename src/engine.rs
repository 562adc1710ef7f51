//! The flattening engine: to-one field collection, cartesian expansion of
//! to-many relations, staged propagation of nested fields, and schema
//! uniformization.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::entity;
use crate::error::FlattenError;
use crate::spec::{FieldRule, FlattenSpec};

/// One flat output row. Every record returned by [`flatten`] has the same
/// key set; fields with no value on a given expansion path are `Null`.
pub type Record = Map<String, Value>;

/// A partial row mid-expansion. `fields` holds the owning instance's own
/// to-one results; `staged` carries destination values produced below an
/// expansion point until the product completes, and is merged into the
/// record (and discarded) by the flush pass. Keeping it beside the record
/// instead of under a reserved attribute name means it can never collide
/// with a real destination field.
struct Partial {
    fields: Record,
    staged: Record,
}

/// Flattens one instance, or a list of instances, into a uniform list of
/// records according to `spec`.
///
/// Objects are treated as a one-element list; lists pass through; any
/// other input is rejected before any recursion. The caller's data is
/// consumed, never mutated: output rows are fresh records holding only
/// destination fields.
///
/// ```
/// use record_flattener::{flatten, FlattenSpec};
/// use serde_json::json;
///
/// let spec = FlattenSpec::new()
///     .field("name", "name")
///     .nested("items", FlattenSpec::new().field("sku", "item_sku"));
///
/// let records = flatten(
///     json!({"name": "order1", "items": [{"sku": "A"}, {"sku": "B"}]}),
///     &spec,
/// )
/// .unwrap();
///
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[0]["item_sku"], json!("A"));
/// assert_eq!(records[1]["item_sku"], json!("B"));
/// ```
pub fn flatten(instance: Value, spec: &FlattenSpec) -> Result<Vec<Record>, FlattenError> {
    let instances = match instance {
        Value::Object(_) => vec![instance],
        Value::Array(items) => items,
        other => {
            return Err(FlattenError::InvalidInstance {
                found: entity::type_name(&other),
            })
        }
    };

    let roots = instances.len();
    let mut records = flush(expand(&instances, spec));
    uniformize(&mut records);
    debug!(roots, records = records.len(), "flattened instance list");
    Ok(records)
}

/// [`flatten`] for struct inputs: the instance is serialized into a
/// dynamic value first, so any `Serialize` type can act as an entity.
pub fn flatten_serialize<T: Serialize>(
    instance: &T,
    spec: &FlattenSpec,
) -> Result<Vec<Record>, FlattenError> {
    flatten(serde_json::to_value(instance)?, spec)
}

/// Collects to-one leaf values from `current` into `out`, descending
/// through nested rules so that every leaf lands on the same top-level
/// record. Absent and null source attributes are skipped; list-valued
/// attributes never resolve here (an array has no named attributes), which
/// leaves to-many relations to [`expand`].
fn collect_to_one(current: &Value, spec: &FlattenSpec, out: &mut Record) {
    for (source, rule) in spec.iter() {
        let Some(value) = entity::get(current, source) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        match rule {
            FieldRule::Leaf(dest) => {
                out.insert(dest.clone(), value.clone());
            }
            FieldRule::Nested(sub) => collect_to_one(value, sub, out),
        }
    }
}

/// Expands every to-many relation of every instance, bottom-up.
///
/// Each instance starts a bucket at multiplicity 1 (its own to-one
/// fields). Every list-valued attribute, spec'd or not, is recursively
/// expanded and multiplied into the bucket, so an instance with to-many
/// branches of sizes n1..nk yields n1 * .. * nk partial rows. An empty
/// nested collection empties the bucket and the instance contributes no
/// rows at all.
fn expand(instances: &[Value], spec: &FlattenSpec) -> Vec<Partial> {
    let empty = FlattenSpec::new();
    let mut out = Vec::with_capacity(instances.len());

    for instance in instances {
        let mut fields = Record::new();
        collect_to_one(instance, spec, &mut fields);

        let mut bucket = vec![Partial {
            fields,
            staged: Record::new(),
        }];

        for name in entity::keys(instance) {
            let Some(Value::Array(items)) = entity::get(instance, name) else {
                continue;
            };
            // Unmapped collections still multiply, just without labels.
            let sub = spec.nested_rule(name).unwrap_or(&empty);
            let nested = expand(items, sub);
            trace!(
                attribute = name,
                nested = nested.len(),
                bucket = bucket.len(),
                "expanding to-many attribute"
            );
            bucket = product(bucket, &nested);
            if bucket.is_empty() {
                break;
            }
        }

        out.extend(bucket);
    }

    out
}

/// Restricted cartesian product of a bucket against an expanded nested
/// list; the bucket varies slowest, no sorting is applied.
///
/// Each pairing clones the base row and re-stages: values the base already
/// carried, then the nested row's own staged values, then the nested row's
/// own fields; later writers win. Carrying the base's staged values
/// forward is what lets independent to-many branches each contribute their
/// mapped fields to every combined row.
fn product(base: Vec<Partial>, nested: &[Partial]) -> Vec<Partial> {
    let mut out = Vec::with_capacity(base.len() * nested.len());
    for b in &base {
        for n in nested {
            let mut staged = b.staged.clone();
            for (key, value) in &n.staged {
                staged.insert(key.clone(), value.clone());
            }
            for (key, value) in &n.fields {
                staged.insert(key.clone(), value.clone());
            }
            out.push(Partial {
                fields: b.fields.clone(),
                staged,
            });
        }
    }
    out
}

/// Merges each row's staged values onto the row itself once expansion has
/// completed. Staged values are applied last, so on a (spec-chosen) name
/// collision the staged value wins.
fn flush(bucket: Vec<Partial>) -> Vec<Record> {
    bucket
        .into_iter()
        .map(|partial| {
            let mut record = partial.fields;
            for (key, value) in partial.staged {
                record.insert(key, value);
            }
            record
        })
        .collect()
}

/// Back-fills every record with `Null` for any key present on some other
/// record, so the output can be consumed as a homogeneous table. The key
/// union keeps first-seen order. Running this twice is a no-op.
pub fn uniformize(records: &mut [Record]) {
    let mut seen = ahash::AHashSet::new();
    let mut all_keys: Vec<String> = Vec::new();
    for record in records.iter() {
        for key in record.keys() {
            if seen.insert(key.clone()) {
                all_keys.push(key.clone());
            }
        }
    }
    for record in records.iter_mut() {
        for key in &all_keys {
            if !record.contains_key(key) {
                record.insert(key.clone(), Value::Null);
            }
        }
    }
}

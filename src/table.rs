//! Export helpers over flattened records: columnar materialization and
//! partition grouping. Purely in-memory; writing the result anywhere is
//! the caller's business.

use ahash::{AHashMap, AHashSet};
use serde_json::Value;

use crate::engine::Record;

/// A homogeneous, column-ordered view of a record list.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Union of all record keys, in first-seen order. For output produced by
/// [`crate::flatten`] every record already carries the full set.
pub fn columns(records: &[Record]) -> Vec<String> {
    let mut seen = AHashSet::new();
    let mut columns = Vec::new();
    for record in records {
        for key in record.keys() {
            if seen.insert(key.clone()) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

/// Materializes records as rows under the unified column set, filling
/// `Null` where a record lacks a column.
pub fn to_table(records: &[Record]) -> Table {
    let columns = columns(records);
    let rows = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| record.get(column).cloned().unwrap_or(Value::Null))
                .collect()
        })
        .collect();
    Table { columns, rows }
}

/// Groups records by the values of the given key fields. The key is the
/// JSON rendering of each field value, so records with a missing key field
/// group under `null`.
pub fn partition_by(records: Vec<Record>, keys: &[&str]) -> AHashMap<Vec<String>, Vec<Record>> {
    let mut partitions: AHashMap<Vec<String>, Vec<Record>> = AHashMap::new();
    for record in records {
        let key = keys
            .iter()
            .map(|name| {
                record
                    .get(*name)
                    .cloned()
                    .unwrap_or(Value::Null)
                    .to_string()
            })
            .collect();
        partitions.entry(key).or_default().push(record);
    }
    partitions
}

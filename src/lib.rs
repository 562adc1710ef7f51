//! Denormalizes hierarchical object graphs into flat, uniform records.
//!
//! Given an entity connected through to-one and to-many relations (an
//! order with line items, each with a product, say) and a declarative
//! [`FlattenSpec`], [`flatten`] produces one record per combination of
//! leaf values: to-one fields are copied onto the row, to-many relations
//! expand by cartesian product, and every output record ends up with the
//! same key set (missing fields back-filled with null).
//!
//! ```
//! use record_flattener::{flatten, FlattenSpec};
//! use serde_json::json;
//!
//! let spec = FlattenSpec::new()
//!     .field("name", "name")
//!     .nested("items", FlattenSpec::new().field("sku", "item_sku"));
//!
//! let records = flatten(
//!     json!({"name": "order1", "items": [{"sku": "A"}, {"sku": "B"}]}),
//!     &spec,
//! )
//! .unwrap();
//! assert_eq!(records.len(), 2);
//! ```
//!
//! Expansion is combinatorial by design, not streamed: a root with
//! to-many branches of sizes n1..nk yields n1 * .. * nk rows, and an
//! empty required collection yields none. Recursion depth follows the
//! relation graph; cyclic graphs are the caller's responsibility.

pub mod engine;
pub mod entity;
pub mod error;
pub mod spec;
pub mod table;

pub use engine::{flatten, flatten_serialize, uniformize, Record};
pub use error::FlattenError;
pub use spec::{FieldRule, FlattenSpec};

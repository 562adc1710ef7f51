use thiserror::Error;

/// Errors surfaced by the flattening entry points.
///
/// Anything else (missing attributes, null values, empty nested
/// collections) is a silent skip, not an error.
#[derive(Debug, Error)]
pub enum FlattenError {
    /// The top-level input was neither an object nor a list of objects.
    #[error("invalid instance type: expected an object or a list of objects, found {found}")]
    InvalidInstance { found: &'static str },

    /// A spec value parsed from JSON was neither a destination name
    /// (string) nor a nested mapping.
    #[error("invalid flattening spec for `{field}`: expected a destination name or a nested mapping, found {found}")]
    InvalidSpec { field: String, found: &'static str },

    /// Serializing a struct instance into a dynamic value failed.
    #[error("failed to serialize instance: {0}")]
    Serialize(#[from] serde_json::Error),
}

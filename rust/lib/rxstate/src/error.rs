use thiserror::Error;

use crate::path::Path;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Nothing has been written at (or above) this path.
    #[error("no state at path '{0}'")]
    NotFound(Path),

    /// A write would have to descend through a value that is not an object.
    #[error("cannot write '{path}': '{at}' holds a non-object value")]
    LeafConflict { path: Path, at: Path },

    #[error("failed to encode value for '{path}': {source}")]
    Encode {
        path: Path,
        #[source]
        source: serde_json::Error,
    },

    #[error("value at '{path}' does not match the expected type: {source}")]
    Decode {
        path: Path,
        #[source]
        source: serde_json::Error,
    },

    /// A rule received an envelope whose payload is not the type its action declared.
    #[error("action '{tag}' carried a payload that is not {expected}")]
    PayloadType {
        tag: &'static str,
        expected: &'static str,
    },

    /// The path is already bound by a reducer holding a different value type.
    #[error("path '{path}' is already bound to a reducer of another type (requested {expected})")]
    BindingType { path: Path, expected: &'static str },

    /// Nested change notifications went deeper than the configured limit.
    #[error("change notifications nested deeper than {limit} levels while writing '{path}'")]
    DepthExceeded { path: Path, limit: usize },
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

//! Error types for the editing core.
//!
//! Validation failures are not errors: they live on the node that failed
//! (see `state::row::EditableText::error`). Everything here is something a
//! caller has to react to.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::state::node::NodeId;

/// Result type for editor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for editor operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The document is not valid JSON or does not match the dataset schema.
    #[error("could not decode dataset: {0}")]
    Decode(#[from] serde_json::Error),

    /// The dataset or one of its exports could not be serialised.
    #[error("could not encode dataset: {0}")]
    Encode(#[source] serde_json::Error),

    /// Reading or writing a file failed.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The node id does not exist in this tree (or was removed).
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// The node has no text of its own (question groups).
    #[error("node {0} has no editable text")]
    NotEditable(NodeId),

    /// The operation does not apply to this node.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A dataset name that cannot become a file name.
    #[error("invalid dataset name: {0:?}")]
    InvalidName(String),

    /// Another save of the same session has not finished yet.
    #[error("a save is already in progress")]
    SaveInProgress,
}

impl Error {
    /// Wrap an I/O error together with the path it happened on.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create an invalid operation error.
    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Error::InvalidOperation(msg.into())
    }

    /// True for failures that came from the file system.
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io { .. })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn json_error() -> serde_json::Error {
        serde_json::from_str::<u8>("x").unwrap_err()
    }

    #[test]
    fn test_encode_and_decode_messages_differ() {
        let encode = Error::Encode(json_error()).to_string();
        let decode = Error::from(json_error()).to_string();
        assert!(encode.starts_with("could not encode dataset"));
        assert!(decode.starts_with("could not decode dataset"));
    }

    #[test]
    fn test_only_io_is_io() {
        let io = Error::io("a.json", std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
        assert!(io.is_io());
        assert!(io.to_string().contains("a.json"));
        assert!(!Error::Encode(json_error()).is_io());
        assert!(!Error::SaveInProgress.is_io());
    }
}

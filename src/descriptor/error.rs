//! Descriptor parse and serialization errors.

use thiserror::Error;

/// Result type alias for descriptor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while reading or writing a descriptor tree
#[derive(Error, Debug)]
pub enum Error {
    /// Underlying reader/writer error from quick-xml
    #[error("XML error at byte {position}: {source}")]
    Xml {
        /// Byte offset where the reader stopped
        position: u64,
        /// Error reported by quick-xml
        #[source]
        source: quick_xml::Error,
    },

    /// Malformed attribute list on an element
    #[error("invalid attribute at byte {position}: {source}")]
    Attribute {
        /// Byte offset of the owning element
        position: u64,
        /// Error reported by quick-xml
        #[source]
        source: quick_xml::events::attributes::AttrError,
    },

    /// Document is not valid UTF-8
    #[error("descriptor is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Document is well-tokenized but not a well-formed tree
    #[error("malformed document at byte {position}: {reason}")]
    Malformed {
        /// Byte offset where the problem was detected
        position: u64,
        /// What was wrong
        reason: String,
    },

    /// IO error while loading the descriptor file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization failure
    #[error("failed to serialize descriptor: {0}")]
    Serialize(String),
}

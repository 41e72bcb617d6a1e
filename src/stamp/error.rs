//! Error types for descriptor version stamping.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for stamping operations
pub type Result<T> = std::result::Result<T, StampError>;

/// Failure of a stamp run. Every variant aborts the whole operation.
#[derive(Error, Debug)]
pub enum StampError {
    /// Wrong command line arguments
    #[error("Usage: installermsi stamp input.xml output.xml VERSION_FEATURE VERSION_NUMBER VERSION_NUMBER_FOUR_POSITIONS ({reason})")]
    Usage {
        /// What was wrong with the arguments
        reason: String,
    },

    /// Source descriptor does not exist
    #[error("specified input file does not exist, path: [{}]", .path.display())]
    InputNotFound {
        /// Path that was checked
        path: PathBuf,
    },

    /// Source descriptor could not be read or is not well-formed XML
    #[error("failed to parse descriptor, path: [{}]: {source}", .path.display())]
    Parse {
        /// Source descriptor path
        path: PathBuf,
        /// Underlying parse failure
        #[source]
        source: crate::descriptor::Error,
    },

    /// Required element or attribute missing from the descriptor
    #[error(transparent)]
    Structure(#[from] StructureError),

    /// Destination could not be written
    #[error("failed to write descriptor, path: [{}]: {source}", .path.display())]
    Write {
        /// Destination path
        path: PathBuf,
        /// Underlying IO failure
        #[source]
        source: std::io::Error,
    },
}

/// A required node was absent where the stamper expected it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructureError {
    /// No `Wix/Product` element at the top of the document
    #[error("Product node not found")]
    ProductNotFound,

    /// No immediate child carrying the requested `Id`
    #[error("Child node not found, id: [{id}]")]
    ChildNotFound {
        /// `Id` value that was sought
        id: String,
    },

    /// No `RegistryValue` child with the requested `Name`
    #[error("Registry value not found, name: [{name}]")]
    RegistryValueNotFound {
        /// `Name` value that was sought
        name: String,
    },

    /// Target element lacks the attribute to substitute into
    #[error("Attribute not found, element: [{element}], attribute: [{attribute}]")]
    AttributeNotFound {
        /// Identifying key of the element (its `Id`, or its name)
        element: String,
        /// Missing attribute name
        attribute: String,
    },
}

impl StructureError {
    /// The identifying key that was sought when the lookup failed.
    pub fn key(&self) -> &str {
        match self {
            Self::ProductNotFound => "Product",
            Self::ChildNotFound { id } => id,
            Self::RegistryValueNotFound { name } => name,
            Self::AttributeNotFound { attribute, .. } => attribute,
        }
    }
}

//! Owned, mutable XML tree for WiX installer descriptors.
//!
//! Descriptors are parsed with `quick-xml` into a single-owner tree, edited
//! in place and serialized back without the XML declaration.
//!
//! # Module Organization
//!
//! - `tree` - `Document`, `Element` and `Node` types plus child lookups
//! - `parse` - event-driven tree construction
//! - `write` - serialization back to XML text

mod error;
mod parse;
mod tree;
mod write;

pub use error::{Error, Result};
pub use tree::{Attribute, Document, Element, Node};

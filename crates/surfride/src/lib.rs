//! Surfride - codec library for Surfboard scene containers.
//!
//! This crate provides a unified interface to the Surfride crates.
//!
//! # Crates
//!
//! - [`surfride_common`] - Common utilities (binary reading and writing, type tags)
//! - [`surfride_vtbf`] - VTBF container framing, property codec and tree rebuilding
//!
//! # Example
//!
//! ```no_run
//! use surfride::prelude::*;
//!
//! let dict = Dictionary::standard()?;
//! let doc = Document::open("scene.swif", &dict)?;
//!
//! // Change the root name and write it back
//! let mut doc = doc;
//! if let Value::Map(root) = &mut doc.tree.root {
//!     root.insert("Name", Value::from("renamed"));
//! }
//! doc.write("renamed.swif", &dict)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use surfride_common as common;
pub use surfride_vtbf as vtbf;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use surfride_common::{BinaryReader, BinaryWriter, TypeTag};
    pub use surfride_vtbf::{
        Dictionary, Document, FlatNode, Map, PropertyType, PropertyValue, Tree, Value,
        VtbfContainer, VtbfHeader,
    };
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

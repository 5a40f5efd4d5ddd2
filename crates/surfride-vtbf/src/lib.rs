//! VTBF scene container codec.
//!
//! VTBF files store a scene graph as a flat, pre-order sequence of chunks.
//! Each chunk is one node: a four-character kind tag, the number of subtrees
//! that follow it, and a list of typed properties. This crate decodes such a
//! file into a generic, order-preserving [`Value`] tree and encodes that tree
//! back into a byte-identical file.
//!
//! The pipeline, leaf first:
//!
//! - [`container`] - magic header and `vtc0` chunk framing
//! - [`codec`] - one property: type byte, tuples, repetition
//! - [`chunk`] - one node: header, properties or record lists
//! - [`tree`] - pre-order sequence to nested tree and back
//! - [`document`] - all of the above for a whole file
//!
//! Code tables and per-kind layouts are collected in a [`Dictionary`], built
//! once and passed by reference.
//!
//! # Example
//!
//! ```no_run
//! use surfride_vtbf::{Dictionary, Document};
//!
//! let dict = Dictionary::standard()?;
//! let doc = Document::open("scene.swif", &dict)?;
//!
//! let value = doc.to_value(&dict);
//! println!("{}", value);
//!
//! assert_eq!(doc.to_bytes(&dict)?, std::fs::read("scene.swif")?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod chunk;
pub mod codec;
pub mod container;
pub mod dictionary;
pub mod document;
mod error;
pub mod header;
pub mod kind;
pub mod property;
pub mod tree;
pub mod value;

pub use chunk::{decode_chunk, encode_chunk, NodeBody, PropertyMap, RawNode};
pub use codec::{Layout, PropertyValue, Scalar};
pub use container::{encode_container, write_container_file, VtbfContainer};
pub use dictionary::{ChunkLayout, Dictionary, LayoutRegistry, ListEncoding, ListHints};
pub use document::{decode_chunks, encode_tree, Document};
pub use error::{Error, Result};
pub use header::{ChunkHeader, NodeHeader, VtbfHeader};
pub use kind::KindTable;
pub use property::{PropertyDescriptor, PropertyTable, PropertyType};
pub use tree::{FlatNode, Tree};
pub use value::{Map, Value};

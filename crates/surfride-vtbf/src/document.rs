//! Whole-file decoding and encoding.

use std::fs;
use std::path::Path;

use surfride_common::TypeTag;

use crate::chunk::{decode_chunk, encode_chunk};
use crate::container::{encode_container, write_container_file, VtbfContainer};
use crate::dictionary::Dictionary;
use crate::header::{NodeHeader, VtbfHeader};
use crate::tree::{FlatNode, Tree};
use crate::value::Value;
use crate::Result;

/// A decoded VTBF file: the container tag and the scene tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub type_tag: TypeTag,
    pub tree: Tree,
}

impl Document {
    pub fn new(type_tag: TypeTag, tree: Tree) -> Self {
        Self { type_tag, tree }
    }

    /// Decode a complete VTBF file.
    pub fn parse(data: &[u8], dict: &Dictionary) -> Result<Self> {
        let container = VtbfContainer::parse(data)?;
        let tree = decode_chunks(container.chunks(), dict)?;
        Ok(Self::new(container.type_tag(), tree))
    }

    /// Read and decode the file at `path`.
    pub fn open<P: AsRef<Path>>(path: P, dict: &Dictionary) -> Result<Self> {
        let data = fs::read(path)?;
        Self::parse(&data, dict)
    }

    /// Encode into a complete VTBF file.
    pub fn to_bytes(&self, dict: &Dictionary) -> Result<Vec<u8>> {
        let chunks = encode_tree(&self.tree, dict)?;
        encode_container(self.type_tag, &chunks)
    }

    /// Encode and write to `path`.
    pub fn write<P: AsRef<Path>>(&self, path: P, dict: &Dictionary) -> Result<()> {
        let chunks = encode_tree(&self.tree, dict)?;
        write_container_file(path, self.type_tag, &chunks)
    }

    /// Tree form for serialization, `{ kindName: root }`.
    pub fn to_value(&self, dict: &Dictionary) -> Value {
        self.tree.to_value(dict)
    }

    /// Rebuild from the tree form; the container tag is not part of it.
    pub fn from_value(value: Value, type_tag: TypeTag, dict: &Dictionary) -> Result<Self> {
        Ok(Self::new(type_tag, Tree::from_value(value, dict)?))
    }

    /// Rebuild from the tree form with the default container tag.
    pub fn from_value_default(value: Value, dict: &Dictionary) -> Result<Self> {
        Self::from_value(value, VtbfHeader::DEFAULT_TAG, dict)
    }
}

/// Decode chunk payloads and rebuild the tree they describe.
///
/// Errors raised inside a chunk are wrapped in [`Error::Chunk`].
pub fn decode_chunks<C: AsRef<[u8]>>(chunks: &[C], dict: &Dictionary) -> Result<Tree> {
    let _span = tracing::debug_span!("decode_chunks", chunks = chunks.len()).entered();

    let mut nodes = Vec::with_capacity(chunks.len());
    for (index, chunk) in chunks.iter().enumerate() {
        let chunk = chunk.as_ref();
        let node = decode_chunk(chunk, dict).map_err(|e| e.in_chunk(index, chunk_tag(chunk)))?;
        nodes.push(FlatNode::new(node.tag, node.child_count, node.body.to_value()));
    }

    let tree = Tree::from_nodes(nodes, dict)?;
    tracing::debug!(root = %tree.tag, "tree rebuilt");
    Ok(tree)
}

/// Flatten a tree and encode every node into a chunk payload.
pub fn encode_tree(tree: &Tree, dict: &Dictionary) -> Result<Vec<Vec<u8>>> {
    let _span = tracing::debug_span!("encode_tree", root = %tree.tag).entered();

    let nodes = tree.to_nodes(dict)?;
    let mut chunks = Vec::with_capacity(nodes.len());
    for (index, node) in nodes.iter().enumerate() {
        let chunk = encode_chunk(node.tag, node.child_count, &node.value, dict)
            .map_err(|e| e.in_chunk(index, node.tag))?;
        chunks.push(chunk);
    }

    tracing::debug!(chunks = chunks.len(), "tree encoded");
    Ok(chunks)
}

/// Tag of a chunk for error context, even if the chunk is too short to decode.
fn chunk_tag(chunk: &[u8]) -> TypeTag {
    match chunk.get(..NodeHeader::SIZE / 2) {
        Some(&[a, b, c, d]) => TypeTag::new([a, b, c, d]),
        _ => TypeTag::new(*b"????"),
    }
}

//! Fixed-layout VTBF headers.

use surfride_common::TypeTag;
use zerocopy::byteorder::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// VTBF file header.
///
/// The file starts with the 8-byte magic, a free-form container tag and a
/// fixed 4-byte constant. Chunks follow immediately.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct VtbfHeader {
    /// Always [`VtbfHeader::MAGIC`].
    pub magic: [u8; 8],
    /// Container type tag (not validated on read).
    pub type_tag: TypeTag,
    /// Always [`VtbfHeader::CONSTANT`].
    pub constant: [u8; 4],
}

impl VtbfHeader {
    /// The magic bytes at the start of a VTBF file.
    pub const MAGIC: [u8; 8] = *b"VTBF\x10\x00\x00\x00";

    /// The constant following the type tag.
    pub const CONSTANT: [u8; 4] = [0x01, 0x00, 0x00, 0x4C];

    /// Size of the header in bytes.
    pub const SIZE: usize = 16;

    /// Container tag written for re-encoded files unless told otherwise.
    pub const DEFAULT_TAG: TypeTag = TypeTag::new(*b"SRFF");

    /// Build a header for the given container tag.
    pub fn new(type_tag: TypeTag) -> Self {
        Self {
            magic: Self::MAGIC,
            type_tag,
            constant: Self::CONSTANT,
        }
    }
}

/// Framing header preceding every chunk payload.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct ChunkHeader {
    /// Always [`ChunkHeader::MARKER`].
    pub marker: [u8; 4],
    /// Payload length in bytes.
    pub length: U32,
}

impl ChunkHeader {
    /// The `vtc0` chunk marker.
    pub const MARKER: [u8; 4] = *b"vtc0";

    /// Size of the header in bytes.
    pub const SIZE: usize = 8;
}

/// Header at the start of every chunk payload.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct NodeHeader {
    /// Node kind.
    pub tag: TypeTag,
    /// Number of subtrees that follow this node in pre-order.
    pub child_count: U16,
    /// Number of property entries, sentinels included for array-record kinds.
    pub property_count: U16,
}

impl NodeHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = 8;

    pub fn new(tag: TypeTag, child_count: u16, property_count: u16) -> Self {
        Self {
            tag,
            child_count: U16::new(child_count),
            property_count: U16::new(property_count),
        }
    }
}

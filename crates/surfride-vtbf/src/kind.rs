//! Node kinds: chunk type tags and their tree key names.

use rustc_hash::FxHashMap;
use surfride_common::TypeTag;

use crate::{Error, Result};

/// Bijective mapping between chunk type tags and node-kind names.
///
/// Tags missing from the table are not an error; see
/// [`Dictionary::key_for`](crate::Dictionary::key_for) for the keys they get.
#[derive(Debug, Clone)]
pub struct KindTable {
    by_tag: FxHashMap<TypeTag, &'static str>,
    by_name: FxHashMap<&'static str, TypeTag>,
}

impl KindTable {
    /// Build a table from `(tag, name)` entries.
    pub fn new(entries: &[(TypeTag, &'static str)]) -> Result<Self> {
        let mut by_tag = FxHashMap::default();
        let mut by_name = FxHashMap::default();

        for &(tag, name) in entries {
            if by_tag.insert(tag, name).is_some() {
                return Err(Error::DuplicateTableEntry {
                    table: "kind tag",
                    key: tag.to_string(),
                });
            }
            if by_name.insert(name, tag).is_some() {
                return Err(Error::DuplicateTableEntry {
                    table: "kind name",
                    key: name.to_string(),
                });
            }
        }

        Ok(Self { by_tag, by_name })
    }

    /// Build the table of every node kind the scene format defines.
    pub fn standard() -> Result<Self> {
        Self::new(STANDARD_KINDS)
    }

    /// Name for a known tag.
    pub fn name(&self, tag: TypeTag) -> Option<&'static str> {
        self.by_tag.get(&tag).copied()
    }

    /// Tag for a known name.
    pub fn tag(&self, name: &str) -> Option<TypeTag> {
        self.by_name.get(name).copied()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.by_tag.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }
}

/// Spell every byte of `tag` as `\xHH`.
///
/// The result is 16 characters long and starts with a backslash, so it can
/// never equal a kind name, a property name or the plain text of a tag.
pub fn escape_tag(tag: TypeTag) -> String {
    tag.as_bytes().iter().map(|b| format!("\\x{:02x}", b)).collect()
}

/// Inverse of [`escape_tag`]; `None` unless `key` has exactly that shape.
pub fn unescape_tag(key: &str) -> Option<TypeTag> {
    let bytes = key.as_bytes();
    if bytes.len() != 16 {
        return None;
    }

    let mut out = [0u8; 4];
    for (slot, group) in out.iter_mut().zip(bytes.chunks_exact(4)) {
        if &group[..2] != b"\\x" {
            return None;
        }
        let hex = std::str::from_utf8(&group[2..]).ok()?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        *slot = u8::from_str_radix(hex, 16).ok()?;
    }
    Some(TypeTag::new(out))
}

const fn tag(bytes: &[u8; 4]) -> TypeTag {
    TypeTag::new(*bytes)
}

/// Node kinds of the scene format.
pub const STANDARD_KINDS: &[(TypeTag, &str)] = &[
    (tag(b"SRCK"), "SurfBoard"),
    (tag(b"PROJ"), "Project"),
    (tag(b"SCN "), "Scene"),
    (tag(b"TEX "), "Texture"),
    (tag(b"TEXL"), "TexList"),
    (tag(b"CROP"), "Crop"),
    (tag(b"CAM "), "Camera"),
    (tag(b"FONT"), "Font"),
    (tag(b"CHAR"), "Character"),
    (tag(b"LAYR"), "Layer"),
    (tag(b"CAST"), "Cast"),
    (tag(b"ANIM"), "Animation"),
    (tag(b"MOT "), "Motion"),
    (tag(b"TRK "), "Track"),
    (tag(b"KEY "), "Key"),
    (tag(b"CIMG"), "CropImage"),
    (tag(b"CREF"), "CropR"),
    (tag(b"TRS2"), "Transform2D"),
    (tag(b"TRS3"), "Transform3D"),
    (tag(b"NODE"), "Node"),
    (tag(b"DATA"), "CastData"),
    (tag(b"NCAT"), "NodeCast"),
];

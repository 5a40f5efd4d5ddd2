//! The node-type dictionary handed to the codec.

use std::borrow::Cow;

use rustc_hash::FxHashMap;
use surfride_common::TypeTag;

use crate::kind::{escape_tag, unescape_tag, KindTable};
use crate::property::PropertyTable;
use crate::Result;

/// How a chunk payload is laid out after its [`NodeHeader`](crate::header::NodeHeader).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkLayout {
    /// `property_count` consecutive property entries.
    Properties,
    /// Fixed-schema records between `FC 00` and `FD 00`, separated by `FE 00`.
    Records,
}

/// Registry choosing a payload layout per chunk tag.
///
/// Tags without an entry use [`ChunkLayout::Properties`]. Other container
/// families plug in here with their own registry instead of adding cases to
/// the chunk decoder.
#[derive(Debug, Clone, Default)]
pub struct LayoutRegistry {
    layouts: FxHashMap<TypeTag, ChunkLayout>,
}

impl LayoutRegistry {
    /// Registry with no overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry for the scene format: `NODE`, `TRS2` and `NCAT` are record lists.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for tag in [*b"NODE", *b"TRS2", *b"NCAT"] {
            registry.register(TypeTag::new(tag), ChunkLayout::Records);
        }
        registry
    }

    /// Set the layout for a tag, returning the previous one.
    pub fn register(&mut self, tag: TypeTag, layout: ChunkLayout) -> Option<ChunkLayout> {
        self.layouts.insert(tag, layout)
    }

    /// Layout used for chunks with `tag`.
    pub fn layout(&self, tag: TypeTag) -> ChunkLayout {
        self.layouts
            .get(&tag)
            .copied()
            .unwrap_or(ChunkLayout::Properties)
    }

    /// Check if chunks with `tag` hold record lists.
    pub fn is_record_list(&self, tag: TypeTag) -> bool {
        self.layout(tag) == ChunkLayout::Records
    }
}

/// How a list value under a property is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEncoding {
    /// One entry with the dimension flag set.
    Tuple,
    /// One entry per element, each with its own code and type byte.
    Repeated,
}

/// Per-property overrides for list values whose shape the declared type
/// cannot decide on its own.
#[derive(Debug, Clone, Default)]
pub struct ListHints {
    by_name: FxHashMap<&'static str, ListEncoding>,
}

impl ListHints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hints pinned for the scene format.
    pub fn standard() -> Self {
        let mut hints = Self::new();
        hints.register("CropIndex", ListEncoding::Repeated);
        hints.register("CropRefCount", ListEncoding::Repeated);
        hints.register("CropRef", ListEncoding::Tuple);
        hints.register("Rectangle", ListEncoding::Tuple);
        hints
    }

    pub fn register(&mut self, name: &'static str, encoding: ListEncoding) -> Option<ListEncoding> {
        self.by_name.insert(name, encoding)
    }

    pub fn get(&self, name: &str) -> Option<ListEncoding> {
        self.by_name.get(name).copied()
    }
}

/// Everything the codec needs to interpret chunks: property codes, node kinds,
/// payload layouts and list hints.
///
/// Built once and shared by reference; it is never mutated while decoding, so
/// one dictionary can serve any number of threads.
#[derive(Debug, Clone)]
pub struct Dictionary {
    pub properties: PropertyTable,
    pub kinds: KindTable,
    pub layouts: LayoutRegistry,
    pub list_hints: ListHints,
}

impl Dictionary {
    pub fn new(
        properties: PropertyTable,
        kinds: KindTable,
        layouts: LayoutRegistry,
        list_hints: ListHints,
    ) -> Self {
        Self {
            properties,
            kinds,
            layouts,
            list_hints,
        }
    }

    /// Dictionary for the scene format.
    ///
    /// Fails only if the built-in tables are not bijective.
    pub fn standard() -> Result<Self> {
        Ok(Self::new(
            PropertyTable::standard()?,
            KindTable::standard()?,
            LayoutRegistry::standard(),
            ListHints::standard(),
        ))
    }

    /// Tree key for a chunk tag.
    ///
    /// Known kinds use their name. Other tags use their own text when it is
    /// printable and cannot be mistaken for a kind or property name, and the
    /// [`escape_tag`] form otherwise, so [`Dictionary::tag_for_key`] always
    /// gets the original bytes back.
    pub fn key_for(&self, tag: TypeTag) -> Cow<'static, str> {
        if let Some(name) = self.kinds.name(tag) {
            return Cow::Borrowed(name);
        }

        let text = tag.to_string();
        let plain = tag.is_printable()
            && !tag.as_bytes().contains(&b'\\')
            && self.kinds.tag(&text).is_none()
            && self.properties.by_name(&text).is_none();

        if plain {
            Cow::Owned(text)
        } else {
            Cow::Owned(escape_tag(tag))
        }
    }

    /// Chunk tag for a tree key; inverse of [`Dictionary::key_for`].
    ///
    /// Returns `None` if the key is not a kind name, an escaped tag or
    /// exactly four bytes.
    pub fn tag_for_key(&self, key: &str) -> Option<TypeTag> {
        self.kinds
            .tag(key)
            .or_else(|| unescape_tag(key))
            .or_else(|| key.parse().ok())
    }
}

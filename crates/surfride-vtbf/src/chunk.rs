//! Chunk payload decoding and encoding.
//!
//! A payload starts with a [`NodeHeader`]. Most kinds follow it with
//! `property_count` property entries. Array-record kinds instead hold a list
//! of fixed-schema records:
//!
//! ```text
//! FC 00 <record> FE 00 <record> ... FE 00 <record> FD 00
//! ```
//!
//! The sentinels count as properties in the header, so a list of `N` records
//! of `k` entries each declares `N * k + N + 1` properties.

use surfride_common::memchr::memmem;
use surfride_common::{BinaryReader, BinaryWriter, TypeTag};

use crate::codec::{decode_value, encode_value, resolve_value, Layout, PropertyValue};
use crate::dictionary::{ChunkLayout, Dictionary};
use crate::header::NodeHeader;
use crate::property::PropertyTable;
use crate::value::{Map, Value};
use crate::{Error, Result};

/// Opens a record list.
pub const RECORD_START: [u8; 2] = [0xFC, 0x00];

/// Separates two records.
pub const RECORD_SEPARATOR: [u8; 2] = [0xFE, 0x00];

/// Closes a record list.
pub const RECORD_END: [u8; 2] = [0xFD, 0x00];

/// Decoded properties of one node or record, in file order.
///
/// A name seen more than once is promoted to [`PropertyValue::Repeated`] at
/// its first position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyMap {
    entries: Vec<(&'static str, PropertyValue)>,
    entry_count: usize,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one decoded entry.
    pub fn push(&mut self, name: &'static str, value: PropertyValue) {
        self.entry_count += 1;
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, PropertyValue::Repeated(items))) => items.push(value),
            Some((_, slot)) => {
                let first = std::mem::replace(slot, PropertyValue::Repeated(Vec::new()));
                *slot = PropertyValue::Repeated(vec![first, value]);
            }
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.entries.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries read, counting every repetition.
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &PropertyValue)> {
        self.entries.iter().map(|(n, v)| (*n, v))
    }

    pub fn to_map(&self) -> Map {
        let mut map = Map::with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            map.insert(*name, value.to_value());
        }
        map
    }
}

/// Payload of a decoded chunk.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeBody {
    Properties(PropertyMap),
    Records(Vec<PropertyMap>),
}

impl NodeBody {
    /// Tree form: a map of properties, or a list of record maps.
    pub fn to_value(&self) -> Value {
        match self {
            NodeBody::Properties(props) => Value::Map(props.to_map()),
            NodeBody::Records(records) => {
                Value::List(records.iter().map(|r| Value::Map(r.to_map())).collect())
            }
        }
    }
}

/// One decoded chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct RawNode {
    pub tag: TypeTag,
    pub child_count: u16,
    pub property_count: u16,
    pub body: NodeBody,
}

/// Decode one chunk payload.
///
/// A header or property running past the end of `data` is reported as
/// [`Error::TruncatedFile`] with the offset inside the chunk.
pub fn decode_chunk(data: &[u8], dict: &Dictionary) -> Result<RawNode> {
    decode_node(data, dict).map_err(Error::truncated)
}

fn decode_node(data: &[u8], dict: &Dictionary) -> Result<RawNode> {
    let mut reader = BinaryReader::new(data);
    let header: NodeHeader = reader.read_struct()?;
    let tag = header.tag;
    let child_count = header.child_count.get();
    let property_count = header.property_count.get();

    let body = match dict.layouts.layout(tag) {
        ChunkLayout::Properties => {
            let mut props = PropertyMap::new();
            for _ in 0..property_count {
                read_property(&mut reader, tag, &dict.properties, &mut props)?;
            }
            if !reader.is_empty() {
                tracing::warn!(%tag, trailing = reader.remaining(), "ignoring bytes after the last property");
            }
            NodeBody::Properties(props)
        }
        ChunkLayout::Records => {
            NodeBody::Records(read_records(&mut reader, tag, property_count, &dict.properties)?)
        }
    };

    tracing::trace!(%tag, child_count, property_count, "chunk decoded");

    Ok(RawNode {
        tag,
        child_count,
        property_count,
        body,
    })
}

fn read_property(
    reader: &mut BinaryReader<'_>,
    tag: TypeTag,
    table: &PropertyTable,
    props: &mut PropertyMap,
) -> Result<()> {
    let offset = reader.position();
    let code = reader.read_u8()?;
    let desc = table
        .by_code(code)
        .ok_or(Error::UnknownPropertyCode { tag, code, offset })?;

    let layout = Layout::read(reader, code)?;
    if layout.ty != desc.ty {
        tracing::warn!(
            %tag,
            property = desc.name,
            declared = %desc.ty,
            actual = %layout.ty,
            "type byte disagrees with the property table"
        );
    }

    props.push(desc.name, decode_value(reader, layout)?);
    Ok(())
}

/// Parse the sentinel-delimited record region that follows the node header.
fn read_records(
    reader: &mut BinaryReader<'_>,
    tag: TypeTag,
    property_count: u16,
    table: &PropertyTable,
) -> Result<Vec<PropertyMap>> {
    let region_offset = reader.position();
    let skipped = memmem::find(reader.remaining_bytes(), &RECORD_START).ok_or(
        Error::MalformedRecordList {
            tag,
            offset: region_offset,
            reason: "missing start sentinel",
        },
    )?;
    if skipped > 0 {
        tracing::warn!(%tag, skipped, "skipping bytes before the record list");
    }
    reader.seek(region_offset + skipped + RECORD_START.len());

    let mut records = vec![PropertyMap::new()];
    loop {
        let offset = reader.position();
        let next = reader.peek_bytes(2).map_err(|_| Error::MalformedRecordList {
            tag,
            offset,
            reason: "missing end sentinel",
        })?;

        if next == RECORD_END {
            reader.seek(offset + RECORD_END.len());
            break;
        }
        if next == RECORD_SEPARATOR {
            reader.seek(offset + RECORD_SEPARATOR.len());
            records.push(PropertyMap::new());
            continue;
        }

        // `records` always holds the record being filled
        if let Some(current) = records.last_mut() {
            read_property(reader, tag, table, current)?;
        }
    }

    if !reader.is_empty() {
        tracing::warn!(%tag, trailing = reader.remaining(), "ignoring bytes after the record list");
    }

    let inconsistent = || Error::InconsistentRecordCount {
        tag,
        property_count: property_count as usize,
        record_count: records.len(),
    };

    let n = records.len();
    let declared = property_count as usize;
    if declared < n + 1 || (declared - n - 1) % n != 0 {
        return Err(inconsistent());
    }
    let per_record = (declared - n - 1) / n;
    if records.iter().any(|r| r.entry_count() != per_record) {
        return Err(inconsistent());
    }

    tracing::trace!(%tag, records = n, per_record, "record list decoded");

    Ok(records)
}

/// Encode one node into a chunk payload.
///
/// `value` is a map of properties for ordinary kinds and a list of record
/// maps for array-record kinds. Child keys must already have been removed.
pub fn encode_chunk(tag: TypeTag, child_count: u16, value: &Value, dict: &Dictionary) -> Result<Vec<u8>> {
    let mut writer = BinaryWriter::new();
    writer.write_struct(&NodeHeader::new(tag, child_count, 0));

    let property_count = match dict.layouts.layout(tag) {
        ChunkLayout::Properties => {
            let map = value.as_map().ok_or_else(|| {
                Error::InvalidTree(format!("{} node must be a map, got {}", tag, value.type_name()))
            })?;
            write_properties(&mut writer, map, dict)?
        }
        ChunkLayout::Records => write_records(&mut writer, tag, value, dict)?,
    };

    let property_count = u16::try_from(property_count).map_err(|_| Error::CountOverflow {
        what: "property",
        count: property_count,
        limit: u16::MAX as usize,
    })?;
    writer.patch_u16(6, property_count);

    Ok(writer.into_inner())
}

fn write_properties(writer: &mut BinaryWriter, map: &Map, dict: &Dictionary) -> Result<usize> {
    let mut written = 0;
    for (name, value) in map.iter() {
        let desc = dict
            .properties
            .by_name(name)
            .ok_or_else(|| Error::UnknownPropertyName(name.to_string()))?;
        let resolved = resolve_value(desc, value, &dict.list_hints)?;
        written += encode_value(writer, desc, &resolved)?;
    }
    Ok(written)
}

fn write_records(writer: &mut BinaryWriter, tag: TypeTag, value: &Value, dict: &Dictionary) -> Result<usize> {
    let records = value.as_list().ok_or_else(|| {
        Error::InvalidTree(format!("{} record list must be a list, got {}", tag, value.type_name()))
    })?;
    if records.is_empty() {
        return Err(Error::InconsistentRecordCount {
            tag,
            property_count: 0,
            record_count: 0,
        });
    }

    writer.write_bytes(&RECORD_START);
    let mut per_record = None;
    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            writer.write_bytes(&RECORD_SEPARATOR);
        }
        let map = record.as_map().ok_or_else(|| {
            Error::InvalidTree(format!("{} record {} must be a map, got {}", tag, i, record.type_name()))
        })?;
        let written = write_properties(writer, map, dict)?;
        if *per_record.get_or_insert(written) != written {
            return Err(Error::InconsistentRecordCount {
                tag,
                property_count: written,
                record_count: i + 1,
            });
        }
    }
    writer.write_bytes(&RECORD_END);

    let n = records.len();
    Ok(n * per_record.unwrap_or(0) + n + 1)
}

//! VTBF chunk framing.
//!
//! A VTBF file is a [`VtbfHeader`] followed by any number of chunks, each a
//! [`ChunkHeader`] (`vtc0` marker + little-endian u32 length) and that many
//! payload bytes. The framer treats payloads as opaque.

use std::fs;
use std::path::Path;

use surfride_common::{BinaryReader, BinaryWriter, TypeTag};
use zerocopy::byteorder::little_endian::U32;

use crate::header::{ChunkHeader, VtbfHeader};
use crate::{Error, Result};

/// A parsed VTBF container borrowing its chunk payloads from the input buffer.
#[derive(Debug, Clone)]
pub struct VtbfContainer<'a> {
    type_tag: TypeTag,
    chunks: Vec<&'a [u8]>,
}

impl<'a> VtbfContainer<'a> {
    /// Check if data starts with the VTBF magic.
    pub fn is_vtbf(data: &[u8]) -> bool {
        data.len() >= VtbfHeader::MAGIC.len() && data[..VtbfHeader::MAGIC.len()] == VtbfHeader::MAGIC
    }

    /// Split a VTBF file into its chunk payloads.
    ///
    /// Reads until the cursor reaches the end of `data`; any partial chunk
    /// header or body is reported as [`Error::TruncatedFile`].
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let _span = tracing::debug_span!("vtbf_read", len = data.len()).entered();

        // A wrong prefix is a bad header even when the file is too short to hold one
        let prefix = data.len().min(VtbfHeader::MAGIC.len());
        BinaryReader::new(&data[..prefix])
            .expect_magic(&VtbfHeader::MAGIC[..prefix])
            .map_err(Error::framing)?;

        let mut reader = BinaryReader::new(data);
        let header: VtbfHeader = reader.read_struct().map_err(Error::framing)?;

        reader.seek(VtbfHeader::SIZE - VtbfHeader::CONSTANT.len());
        reader
            .expect_magic(&VtbfHeader::CONSTANT)
            .map_err(Error::framing)?;

        let mut chunks = Vec::new();
        while !reader.is_empty() {
            let offset = reader.position();
            let chunk_header: ChunkHeader = reader.read_struct().map_err(Error::framing)?;

            if chunk_header.marker != ChunkHeader::MARKER {
                return Err(Error::MalformedChunkMarker {
                    offset,
                    actual: chunk_header.marker,
                });
            }

            let length = chunk_header.length.get() as usize;
            chunks.push(reader.read_bytes(length).map_err(Error::framing)?);
        }

        tracing::debug!(type_tag = %header.type_tag, chunks = chunks.len(), "vtbf container read");

        Ok(Self {
            type_tag: header.type_tag,
            chunks,
        })
    }

    /// The container type tag from the header.
    pub fn type_tag(&self) -> TypeTag {
        self.type_tag
    }

    /// The chunk payloads in file order.
    pub fn chunks(&self) -> &[&'a [u8]] {
        &self.chunks
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Check if the container holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Frame chunk payloads into a complete VTBF file.
pub fn encode_container<C: AsRef<[u8]>>(type_tag: TypeTag, chunks: &[C]) -> Result<Vec<u8>> {
    let body_len: usize = chunks
        .iter()
        .map(|c| ChunkHeader::SIZE + c.as_ref().len())
        .sum();
    let mut writer = BinaryWriter::with_capacity(VtbfHeader::SIZE + body_len);

    writer.write_struct(&VtbfHeader::new(type_tag));

    for chunk in chunks {
        let chunk = chunk.as_ref();
        let length = u32::try_from(chunk.len()).map_err(|_| Error::CountOverflow {
            what: "chunk byte",
            count: chunk.len(),
            limit: u32::MAX as usize,
        })?;
        writer.write_struct(&ChunkHeader {
            marker: ChunkHeader::MARKER,
            length: U32::new(length),
        });
        writer.write_bytes(chunk);
    }

    tracing::debug!(%type_tag, chunks = chunks.len(), len = writer.position(), "vtbf container written");

    Ok(writer.into_inner())
}

/// Frame chunk payloads and write them to a file at `path`.
pub fn write_container_file<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    type_tag: TypeTag,
    chunks: &[C],
) -> Result<()> {
    let bytes = encode_container(type_tag, chunks)?;
    fs::write(path, bytes)?;
    Ok(())
}

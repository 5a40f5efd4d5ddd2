//! Binary writer counterpart to [`BinaryReader`](crate::BinaryReader).

use byteorder::{ByteOrder, LittleEndian};
use zerocopy::{Immutable, IntoBytes};

/// A little-endian writer over a growable byte buffer.
///
/// Writes into memory cannot fail, so the methods return nothing. Values that
/// are only known after their dependents have been written (counts, lengths)
/// can be reserved with a placeholder and filled in with the `patch_*` methods.
#[derive(Debug, Default, Clone)]
pub struct BinaryWriter {
    buffer: Vec<u8>,
}

impl BinaryWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty writer with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Current length of the output, which is also the offset of the next write.
    #[inline]
    pub fn position(&self) -> usize {
        self.buffer.len()
    }

    /// Borrow the bytes written so far.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Consume the writer and return the output buffer.
    #[inline]
    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }

    /// Write raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    #[inline]
    pub fn write_u16(&mut self, value: u16) {
        let mut bytes = [0u8; 2];
        LittleEndian::write_u16(&mut bytes, value);
        self.write_bytes(&bytes);
    }

    #[inline]
    pub fn write_u32(&mut self, value: u32) {
        let mut bytes = [0u8; 4];
        LittleEndian::write_u32(&mut bytes, value);
        self.write_bytes(&bytes);
    }

    #[inline]
    pub fn write_f32(&mut self, value: f32) {
        let mut bytes = [0u8; 4];
        LittleEndian::write_f32(&mut bytes, value);
        self.write_bytes(&bytes);
    }

    #[inline]
    pub fn write_f64(&mut self, value: f64) {
        let mut bytes = [0u8; 8];
        LittleEndian::write_f64(&mut bytes, value);
        self.write_bytes(&bytes);
    }

    /// Write a struct using its zerocopy byte representation.
    #[inline]
    pub fn write_struct<T: IntoBytes + Immutable>(&mut self, value: &T) {
        self.write_bytes(value.as_bytes());
    }

    /// Overwrite a previously written little-endian u16 at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset + 2` is past the end of the written data.
    pub fn patch_u16(&mut self, offset: usize, value: u16) {
        LittleEndian::write_u16(&mut self.buffer[offset..offset + 2], value);
    }
}

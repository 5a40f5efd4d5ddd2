//! Common utilities for Surfride.
//!
//! This crate provides foundational types used across the Surfride crates:
//!
//! - [`BinaryReader`] - Zero-copy little-endian reading from byte slices
//! - [`BinaryWriter`] - Little-endian writing into a growable buffer
//! - [`TypeTag`] - Four-character codes naming chunk and container kinds

mod error;
mod reader;
mod tag;
mod writer;

pub use error::{Error, Result};
pub use reader::BinaryReader;
pub use tag::TypeTag;
pub use writer::BinaryWriter;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Re-export memchr for SIMD-accelerated byte searching
pub use memchr;

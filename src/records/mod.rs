//! # Schema-Driven Record Packing
//!
//! This module turns a typed Rust record into a fixed-size run of bytes and
//! back. The layout of each record type is compiled once into a [`Schema`];
//! a [`Writer`] and a [`Reader`] share that schema and move records in and out
//! of a [`MemoryStore`](crate::memory::MemoryStore) at slot granularity.
//!
//! ## Alignment Policies
//!
//! | Policy | Field width | Used when |
//! |--------|-------------|-----------|
//! | **Byte aligned** | whole bytes, `ceil(bit_width / 8)` per element | fields are read by byte offset |
//! | **Bit packed** | exactly `bit_width` per element | density matters more than access cost |
//!
//! ## Wire Layout
//!
//! Byte aligned, schema `{a: i32 w25, c: i32 w32, d: bool}` holding
//! `(1, -1, true)`:
//!
//! ```text
//! +-------------+-------------+----+
//! | 00 00 00 01 | FF FF FF FF | 01 |
//! +-------------+-------------+----+
//!   a (4 bytes)   c (4 bytes)   d
//! ```
//!
//! The same schema bit packed occupies 25 + 32 + 1 = 58 bits (8 bytes),
//! filled most-significant-bit first with trailing bits zero.
//!
//! | Wire type | Byte-aligned encoding |
//! |-----------|----------------------|
//! | Bit | one byte, `0x00` / `0x01` |
//! | Byte8 .. Word64, Char16 | big endian, shrunk to `bit_width`, `byte_width` bytes |
//! | Uuid | 16 bytes, high 64 bits first |
//! | FixedString | u32 BE character count, then `element_count` characters of 1 or 2 bytes |
//! | Boolean arrays | one byte per element |
//! | Double / Float | IEEE-754 bit pattern, 8 / 4 bytes |
//! | Void | zero bytes, never written |
//!
//! ## Module Structure
//!
//! - `types`: wire types, value types and the `FieldType` conversion trait
//! - `binder`: per-field accessor table
//! - `schema`: record declarations and the schema compiler
//! - `writer`: record to bytes
//! - `reader`: bytes to record

pub mod binder;
pub mod reader;
pub mod schema;
pub mod types;
pub mod writer;

#[cfg(test)]
mod tests;

use smallvec::SmallVec;
use zerocopy::big_endian::{U32, U64};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

pub use binder::{FieldAccessor, FieldBinder};
pub use reader::Reader;
pub use schema::{DeclKind, FieldDecl, FieldDescriptor, PackRecord, RecordDecl, Schema};
pub use types::{FieldType, FieldValue, ValueType, WireType};
pub use writer::Writer;

/// Render buffer for one record. Small records stay on the stack.
pub type Scratch = SmallVec<[u8; 64]>;

/// Element-count header ahead of a fixed string.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub(crate) struct StringHeader {
    pub(crate) count: U32,
}

/// Big-endian form of a UUID: most significant half first.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub(crate) struct UuidHalves {
    pub(crate) high: U64,
    pub(crate) low: U64,
}

impl From<uuid::Uuid> for UuidHalves {
    fn from(uuid: uuid::Uuid) -> Self {
        let value = uuid.as_u128();
        Self {
            high: U64::new((value >> 64) as u64),
            low: U64::new(value as u64),
        }
    }
}

impl From<UuidHalves> for uuid::Uuid {
    fn from(halves: UuidHalves) -> Self {
        let value = ((halves.high.get() as u128) << 64) | halves.low.get() as u128;
        uuid::Uuid::from_u128(value)
    }
}

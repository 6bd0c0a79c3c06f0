//! # packrec - Schema-Driven Record Packing
//!
//! packrec lays typed records out in a simulated flat word-addressable
//! memory, either byte aligned or packed to the bit, and builds a
//! fixed-capacity double-ended queue on top of that storage:
//!
//! - **Exact layouts**: every field has a declared width and a fixed offset
//! - **No allocation per record**: slots are reused, never grown
//! - **Fail before write**: a rejected record never touches the store
//!
//! ## Quick Start
//!
//! ```ignore
//! use packrec::{PackRecord, PackedList, RecordDecl};
//!
//! #[derive(Default)]
//! struct Job {
//!     id: i32,
//!     urgent: bool,
//! }
//!
//! impl PackRecord for Job {
//!     fn declare() -> RecordDecl<Self> {
//!         RecordDecl::<Self>::bit_packed()
//!             .field("id", 0, 20, |j| j.id, |j, v| j.id = v)
//!             .field("urgent", 1, 1, |j| j.urgent, |j, v| j.urgent = v)
//!     }
//! }
//!
//! let mut queue = PackedList::<Job>::for_record(1024)?;
//! queue.add_last(&Job { id: 7, urgent: true })?;
//! let job = queue.remove_first()?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │  Collections (PackedArray/List)     │
//! ├─────────────────────────────────────┤
//! │  Record Manager (slot table)        │
//! ├─────────────────────────────────────┤
//! │  Writer / Reader  │  Schema Compiler│
//! ├───────────────────┴─────────────────┤
//! │  Bit Codec (insert_bits / unpack)   │
//! ├─────────────────────────────────────┤
//! │  Memory Store (wrap-around words)   │
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//!
//! Nothing here is synchronized. Every store, schema user and collection is
//! owned by one caller; wrap it in a lock to share it. The deque's
//! generation counter only catches iterate-while-mutate bugs in a single
//! thread.
//!
//! ## Module Overview
//!
//! - [`memory`]: `MemoryStore` trait and the `Vec<u32>` backed store
//! - [`bits`]: shrink/extend and MSB-first bit splicing
//! - [`records`]: declarations, schema compiler, writer and reader
//! - [`storage`]: `RecordManager` slot table
//! - [`collections`]: `PackedArray` and the `PackedList` arena deque
//! - [`config`]: limits and sentinels
//! - [`error`]: `PackError` taxonomy

pub mod bits;
pub mod collections;
pub mod config;
pub mod error;
pub mod memory;
pub mod records;
pub mod storage;

pub use collections::{Cursor, PackedArray, PackedList};
pub use error::{error_kind, ErrorKind, PackError};
pub use memory::{ArrayMemoryStore, MemoryStore};
pub use records::{
    FieldDescriptor, FieldType, FieldValue, PackRecord, Reader, RecordDecl, Schema, ValueType,
    WireType, Writer,
};
pub use storage::RecordManager;

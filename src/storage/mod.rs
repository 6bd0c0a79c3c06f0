//! # Record Storage
//!
//! A [`RecordManager`] turns a [`MemoryStore`](crate::memory::MemoryStore)
//! into a fixed table of record slots for one schema. It sizes the store when
//! it is built and owns the writer/reader pair every slot access goes through.
//!
//! ## Table Geometry
//!
//! ```text
//! slot:      0            1            2                 slot_count - 1
//!       +------------+------------+------------+ ... +------------+--pad--+
//!       | record     | record     | record     |     | record     |       |
//!       +------------+------------+------------+ ... +------------+-------+
//!       ^ 0          ^ total_bytes ^ 2 * total_bytes                      ^ words * 4
//! ```
//!
//! Records always start on a byte boundary, even when the schema is bit
//! packed internally. The store is rounded up to whole words.

mod manager;

pub use manager::RecordManager;

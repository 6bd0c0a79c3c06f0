//! # Packed Collections
//!
//! Collections whose elements live as packed records inside a
//! [`RecordManager`](crate::storage::RecordManager) table instead of on the
//! heap.
//!
//! - [`PackedArray`]: fixed-length table indexed by position
//! - [`PackedList`]: fixed-capacity double-ended queue threaded through the
//!   table's slots with index links
//!
//! ## Arena Links
//!
//! The deque keeps three index arrays the same length as the table:
//!
//! ```text
//!            head                     tail
//!             v                        v
//! slot:       3  ───forward──>  0  ──>  5  ──> BACK_SENTINEL
//! FRONT_SENTINEL <──backward──  3  <──  0
//!
//! free:  next_free -> 1 -> 2 -> 4 -> 6 -> 7 -> BACK_SENTINEL
//! ```
//!
//! Adding takes the slot at the head of the free list; removing pushes the
//! slot back onto it. Nothing is allocated after construction and the deque
//! never grows.

mod packed_array;
mod packed_list;

pub use packed_array::PackedArray;
pub use packed_list::{Cursor, Iter, PackedList};

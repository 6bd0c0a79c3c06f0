//! # Simulated Word-Addressable Memory
//!
//! Records are packed into a flat block of 32-bit words that stands in for
//! RAM. All addresses handed to the store are **byte** addresses, even though
//! the backing storage is word based, so unaligned accesses cost a second word
//! read (and a read-modify-write on stores).
//!
//! ## Layout
//!
//! ```text
//! byte address:  0  1  2  3 | 4  5  6  7 | 8 ...
//!               +-----------+-----------+-----
//! word:         |  word 0   |  word 1   | ...
//!               +-----------+-----------+-----
//!                MSB     LSB
//! ```
//!
//! Byte 0 of a word is its most significant byte, so multi-byte values read
//! back in big-endian order regardless of where they start.
//!
//! ## Wrap-Around
//!
//! Every address is reduced modulo the store size before use. A read at
//! `bytes + k` returns the byte at `k`, and an access that runs off the last
//! word continues at word 0. Negative addresses are rejected.
//!
//! ## Interface
//!
//! [`MemoryStore`] is the seam the packing engine writes through; the crate
//! ships [`ArrayMemoryStore`], backed by a `Vec<u32>`.

mod store;

pub use store::{ArrayMemoryStore, MemoryStore};

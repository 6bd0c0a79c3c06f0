//! # Bit-Level Primitives
//!
//! Stateless helpers used by the packing engine when a schema is bit packed,
//! and by both alignment modes when an integer is narrowed to its declared
//! width.
//!
//! - `twiddle`: [`BitWidth::shrink`] / [`BitWidth::extend`] narrowing and sign
//!   extension backed by precomputed mask tables
//! - `codec`: [`insert_bits`] splices a right-aligned big-endian value into a
//!   left-aligned bit buffer; [`unpack`] / [`unpack32`] / [`unpack64`] read it
//!   back
//!
//! ## Bit Order
//!
//! Buffers are filled most-significant-bit first. Bit offset `n` lives in
//! byte `n / 8` at bit position `7 - n % 8`:
//!
//! ```text
//! offset:  0 1 2 3 4 5 6 7 | 8 9 ...
//! byte 0:  7 6 5 4 3 2 1 0 | byte 1 ...
//! ```

mod codec;
mod twiddle;

pub use codec::{insert_bits, unpack, unpack32, unpack64};
pub use twiddle::{BitWidth, EXTEND32, EXTEND64, SHRINK32, SHRINK64};

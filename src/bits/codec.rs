//! Bit splicing between byte-oriented values and bit-packed buffers.

use eyre::{ensure, Result};

use crate::config::BITS_PER_WORD;

const BIT_SET: [u8; 8] = [0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80];
const BIT_TEST: [u8; 8] = [0x80, 0x40, 0x20, 0x10, 0x08, 0x04, 0x02, 0x01];

/// Copies the low `bit_length` bits of `source` into `target` at `bit_offset`.
///
/// `source` holds a right-aligned big-endian value. Bits are emitted most
/// significant first. `target` is expected to be zero in the destination
/// range; only 1-bits are written.
pub fn insert_bits(source: &[u8], target: &mut [u8], bit_offset: usize, bit_length: usize) -> Result<()> {
    ensure!(
        bit_length <= source.len() * 8,
        "source holds {} bits, {} requested",
        source.len() * 8,
        bit_length
    );
    ensure!(
        bit_offset + bit_length <= target.len() * 8,
        "bit range {}..{} exceeds target of {} bits",
        bit_offset,
        bit_offset + bit_length,
        target.len() * 8
    );

    let last = source.len().saturating_sub(1);
    let mut write = bit_offset;
    for bit in (0..bit_length).rev() {
        let read_byte = last - (bit >> 3);
        if source[read_byte] & BIT_SET[bit & 0x07] != 0 {
            target[write >> 3] |= BIT_SET[7 - (write & 0x07)];
        }
        write += 1;
    }
    Ok(())
}

/// Reads `bit_length` (at most one word) bits starting at `bit_offset`.
pub fn unpack(source: &[u8], bit_offset: usize, bit_length: usize) -> Result<u32> {
    ensure!(
        bit_length <= BITS_PER_WORD,
        "cannot unpack {} bits into {}",
        bit_length,
        BITS_PER_WORD
    );
    ensure!(
        bit_offset + bit_length <= source.len() * 8,
        "bit range {}..{} exceeds source of {} bits",
        bit_offset,
        bit_offset + bit_length,
        source.len() * 8
    );

    let mut target = 0u32;
    let mut read = bit_offset;
    for _ in 0..bit_length {
        // shift before OR so a 32-bit read never overflows
        target <<= 1;
        if source[read >> 3] & BIT_TEST[read & 0x07] != 0 {
            target |= 0x01;
        }
        read += 1;
    }
    Ok(target)
}

pub fn unpack32(source: &[u8], bit_offset: usize) -> Result<u32> {
    unpack(source, bit_offset, BITS_PER_WORD)
}

/// Reads up to 64 bits. Wider than 32 bits is assembled from two reads: the
/// `bit_length - 32` high bits, then the 32 low bits.
pub fn unpack64(source: &[u8], bit_offset: usize, bit_length: usize) -> Result<u64> {
    ensure!(bit_length <= 64, "cannot unpack {} bits into 64", bit_length);
    if bit_length <= BITS_PER_WORD {
        return Ok(unpack(source, bit_offset, bit_length)? as u64);
    }
    let upper = bit_length - BITS_PER_WORD;
    let high = unpack(source, bit_offset, upper)? as u64;
    let low = unpack32(source, bit_offset + upper)? as u64;
    Ok((high << BITS_PER_WORD) | low)
}

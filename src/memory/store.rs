//! Word-array memory store with byte addressing.

use std::fmt;

use eyre::Result;

use crate::config::{BYTES_PER_WORD, MAX_WORDS, MIN_WORDS};
use crate::error::PackError;

/// Byte-addressed access to a block of 32-bit words.
///
/// Implementations wrap every address modulo [`MemoryStore::bytes`] and must
/// preserve bytes outside the range being written.
pub trait MemoryStore {
    /// Allocates `words` zeroed words, replacing any previous contents.
    fn build(&mut self, words: usize) -> Result<()>;

    /// Zeroes every word.
    fn reset(&mut self);

    fn words(&self) -> usize;

    fn bytes(&self) -> usize;

    fn get_byte(&self, address: i64) -> Result<u8>;
    fn get_short(&self, address: i64) -> Result<u16>;
    fn get_word24(&self, address: i64) -> Result<u32>;
    fn get_word(&self, address: i64) -> Result<u32>;
    fn get_long_word(&self, address: i64) -> Result<u64>;
    fn get_byte_array(&self, address: i64, length: usize) -> Result<Vec<u8>>;

    fn set_byte(&mut self, address: i64, value: u8) -> Result<()>;
    fn set_short(&mut self, address: i64, value: u16) -> Result<()>;
    /// Only the low 24 bits of `value` are stored.
    fn set_word24(&mut self, address: i64, value: u32) -> Result<()>;
    fn set_word(&mut self, address: i64, value: u32) -> Result<()>;
    fn set_long_word(&mut self, address: i64, value: u64) -> Result<()>;
    fn set_byte_array(&mut self, address: i64, values: &[u8]) -> Result<()>;

    /// Returns the index of the word holding `address` after wrap-around.
    fn validate_and_wrap_address(&self, address: i64) -> Result<usize> {
        if address < 0 {
            return Err(PackError::invalid(format!("address {} out of range", address)));
        }
        let bytes = self.bytes();
        if bytes == 0 {
            return Err(PackError::invalid("memory store has not been built"));
        }
        Ok((address as u64 % bytes as u64) as usize / BYTES_PER_WORD)
    }
}

#[inline]
fn span_mask(len: usize) -> u64 {
    (1u64 << (8 * len)) - 1
}

#[derive(Default)]
pub struct ArrayMemoryStore {
    core: Vec<u32>,
}

impl ArrayMemoryStore {
    pub fn new(words: usize) -> Result<Self> {
        let mut store = Self::default();
        store.build(words)?;
        Ok(store)
    }

    /// Validates `address` and reduces it modulo the store size, so offsets
    /// added afterwards stay small.
    fn wrap(&self, address: i64) -> Result<i64> {
        self.validate_and_wrap_address(address)?;
        Ok((address as u64 % self.bytes() as u64) as i64)
    }

    /// Reads `len` (1..=4) bytes starting at `address` as a right-aligned value.
    fn read_span(&self, address: i64, len: usize) -> Result<u32> {
        let address = self.wrap(address)?;
        let word = address as usize / BYTES_PER_WORD;
        let offset = (address & 0x03) as usize;
        let next = (word + 1) % self.core.len();

        let pair = ((self.core[word] as u64) << 32) | self.core[next] as u64;
        let shift = 64 - 8 * (offset + len);
        Ok(((pair >> shift) & span_mask(len)) as u32)
    }

    /// Writes the low `len` (1..=4) bytes of `value` starting at `address`.
    fn write_span(&mut self, address: i64, len: usize, value: u32) -> Result<()> {
        let address = self.wrap(address)?;
        let word = address as usize / BYTES_PER_WORD;
        let offset = (address & 0x03) as usize;
        let value = value as u64 & span_mask(len);

        if offset + len <= BYTES_PER_WORD {
            let shift = 32 - 8 * (offset + len);
            let mask = (span_mask(len) << shift) as u32;
            self.core[word] = (self.core[word] & !mask) | ((value << shift) as u32);
            return Ok(());
        }

        let next = (word + 1) % self.core.len();
        if next == word {
            // single-word store: the tail of the span lands back on byte 0
            for i in 0..len {
                let byte = (value >> (8 * (len - 1 - i))) as u8;
                self.write_span(address + i as i64, 1, byte as u32)?;
            }
            return Ok(());
        }

        let shift = 64 - 8 * (offset + len);
        let mask = span_mask(len) << shift;
        let pair = ((self.core[word] as u64) << 32) | self.core[next] as u64;
        let pair = (pair & !mask) | (value << shift);
        self.core[word] = (pair >> 32) as u32;
        self.core[next] = pair as u32;
        Ok(())
    }
}

impl MemoryStore for ArrayMemoryStore {
    fn build(&mut self, words: usize) -> Result<()> {
        if !(MIN_WORDS..=MAX_WORDS).contains(&words) {
            return Err(PackError::OutOfBounds {
                index: words,
                limit: MAX_WORDS + 1,
            }
            .into());
        }
        self.core = vec![0u32; words];
        tracing::debug!(words, bytes = words * BYTES_PER_WORD, "built memory store");
        Ok(())
    }

    fn reset(&mut self) {
        self.core.fill(0);
        tracing::debug!(words = self.core.len(), "reset memory store");
    }

    fn words(&self) -> usize {
        self.core.len()
    }

    fn bytes(&self) -> usize {
        self.core.len() * BYTES_PER_WORD
    }

    fn get_byte(&self, address: i64) -> Result<u8> {
        Ok(self.read_span(address, 1)? as u8)
    }

    fn get_short(&self, address: i64) -> Result<u16> {
        Ok(self.read_span(address, 2)? as u16)
    }

    fn get_word24(&self, address: i64) -> Result<u32> {
        self.read_span(address, 3)
    }

    fn get_word(&self, address: i64) -> Result<u32> {
        self.read_span(address, 4)
    }

    fn get_long_word(&self, address: i64) -> Result<u64> {
        let address = self.wrap(address)?;
        let high = self.get_word(address)? as u64;
        let low = self.get_word(address + 4)? as u64;
        Ok((high << 32) | low)
    }

    fn get_byte_array(&self, address: i64, length: usize) -> Result<Vec<u8>> {
        let address = self.wrap(address)?;
        let mut out = Vec::with_capacity(length);
        for i in 0..length {
            out.push(self.get_byte(address + i as i64)?);
        }
        Ok(out)
    }

    fn set_byte(&mut self, address: i64, value: u8) -> Result<()> {
        self.write_span(address, 1, value as u32)
    }

    fn set_short(&mut self, address: i64, value: u16) -> Result<()> {
        self.write_span(address, 2, value as u32)
    }

    fn set_word24(&mut self, address: i64, value: u32) -> Result<()> {
        self.write_span(address, 3, value & 0x00FF_FFFF)
    }

    fn set_word(&mut self, address: i64, value: u32) -> Result<()> {
        self.write_span(address, 4, value)
    }

    fn set_long_word(&mut self, address: i64, value: u64) -> Result<()> {
        let address = self.wrap(address)?;
        self.set_word(address, (value >> 32) as u32)?;
        self.set_word(address + 4, value as u32)
    }

    fn set_byte_array(&mut self, address: i64, values: &[u8]) -> Result<()> {
        let address = self.wrap(address)?;
        for (i, &value) in values.iter().enumerate() {
            self.set_byte(address + i as i64, value)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ArrayMemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview: Vec<String> = self
            .core
            .iter()
            .take(8)
            .map(|w| format!("{:08X}", w))
            .collect();
        f.debug_struct("ArrayMemoryStore")
            .field("words", &self.words())
            .field("bytes", &self.bytes())
            .field("head", &preview.join(" "))
            .finish()
    }
}

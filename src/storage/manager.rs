//! # Record Manager - Slot Table
//!
//! A `RecordManager` sizes a memory store for a fixed number of record slots
//! and moves records in and out of it by slot index.
//!
//! ```text
//! slot:     0              1              2
//!           ├──────────────┼──────────────┼──────────────┼─ ...
//! address:  0              total_bytes    2*total_bytes
//! ```
//!
//! The store holds `ceil(slot_count * total_bytes / 4)` words. Slot indices
//! are checked against `slot_count` here; the writer and reader only check
//! that a slot fits inside the store. The table never grows: `slot_count`
//! must be at least [`MIN_SLOTS`] and the table may not exceed
//! [`MAX_STORAGE_BYTES`], both checked as configuration errors.

use std::any::Any;
use std::sync::Arc;

use eyre::Result;
use tracing::debug;

use crate::config::{BYTES_PER_WORD, MIN_SLOTS, MAX_STORAGE_BYTES};
use crate::error::PackError;
use crate::memory::{ArrayMemoryStore, MemoryStore};
use crate::records::{PackRecord, Reader, Schema, Writer};

/// Fixed table of `slot_count` records of type `T` over a memory store.
pub struct RecordManager<T, S = ArrayMemoryStore> {
    store: S,
    slot_count: usize,
    length_in_bytes: usize,
    writer: Writer<T>,
    reader: Reader<T>,
}

impl<T: Default + 'static> RecordManager<T, ArrayMemoryStore> {
    pub fn new(slot_count: usize, schema: Arc<Schema<T>>) -> Result<Self> {
        Self::build(ArrayMemoryStore::default(), slot_count, schema)
    }
}

impl<T: PackRecord> RecordManager<T, ArrayMemoryStore> {
    /// Table for a record type that declares its own layout.
    pub fn for_record(slot_count: usize) -> Result<Self> {
        Self::new(slot_count, Schema::of()?)
    }
}

impl<T: Default + 'static, S: MemoryStore> RecordManager<T, S> {
    /// Sizes `store` for `slot_count` records of `schema` and takes ownership
    /// of it. Any previous contents of the store are discarded.
    pub fn build(mut store: S, slot_count: usize, schema: Arc<Schema<T>>) -> Result<Self> {
        if slot_count < MIN_SLOTS {
            return Err(PackError::config(format!(
                "a record table needs at least {} slots, got {}",
                MIN_SLOTS, slot_count
            )));
        }
        let length_in_bytes = schema
            .total_bytes()
            .checked_mul(slot_count)
            .filter(|&bytes| bytes <= MAX_STORAGE_BYTES)
            .ok_or_else(|| {
                PackError::config(format!(
                    "{} slots of {} bytes exceed the {} byte storage ceiling",
                    slot_count,
                    schema.total_bytes(),
                    MAX_STORAGE_BYTES
                ))
            })?;
        let words = ((length_in_bytes - 1) / BYTES_PER_WORD) + 1;
        store.build(words)?;

        debug!(
            record = schema.type_name(),
            slot_count,
            record_bytes = schema.total_bytes(),
            words,
            "built record table"
        );

        Ok(Self {
            store,
            slot_count,
            length_in_bytes,
            writer: Writer::new(Arc::clone(&schema)),
            reader: Reader::new(schema),
        })
    }

    pub fn get(&self, slot: usize) -> Result<T> {
        self.check_slot(slot)?;
        self.reader.get(&self.store, slot)
    }

    pub fn put(&mut self, slot: usize, record: &T) -> Result<()> {
        self.check_slot(slot)?;
        self.writer.put(&mut self.store, slot, record)
    }

    /// Writes a type-erased record; anything but a `T` is a type mismatch.
    pub fn put_any(&mut self, slot: usize, record: &dyn Any) -> Result<()> {
        self.check_slot(slot)?;
        self.writer.put_any(&mut self.store, slot, record)
    }

    /// Zeroes every slot.
    pub fn clear(&mut self) {
        self.store.reset();
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Width of the whole table, `record bytes * slot_count`, in bits.
    pub fn length_in_bits(&self) -> usize {
        self.length_in_bytes * 8
    }

    pub fn length_in_bytes(&self) -> usize {
        self.length_in_bytes
    }

    pub fn length_in_words(&self) -> usize {
        self.store.words()
    }

    pub fn schema(&self) -> &Arc<Schema<T>> {
        self.writer.schema()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn check_slot(&self, slot: usize) -> Result<()> {
        if slot >= self.slot_count {
            return Err(PackError::OutOfBounds {
                index: slot,
                limit: self.slot_count,
            }
            .into());
        }
        Ok(())
    }
}

impl<T, S: std::fmt::Debug> std::fmt::Debug for RecordManager<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordManager")
            .field("slot_count", &self.slot_count)
            .field("length_in_bytes", &self.length_in_bytes)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

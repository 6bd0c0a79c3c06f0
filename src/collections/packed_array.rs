//! # PackedArray - Fixed-Length Table
//!
//! A thin facade over [`RecordManager`] for callers that want array-style
//! `get`/`put`/`len` on one record type and nothing more. Every index in
//! `0..len` is always readable; an unwritten slot decodes as the all-zero
//! record.

use std::any::Any;
use std::sync::Arc;

use eyre::Result;

use crate::memory::{ArrayMemoryStore, MemoryStore};
use crate::records::{PackRecord, Schema};
use crate::storage::RecordManager;

pub struct PackedArray<T, S = ArrayMemoryStore> {
    manager: RecordManager<T, S>,
}

impl<T: Default + 'static> PackedArray<T, ArrayMemoryStore> {
    pub fn new(len: usize, schema: Arc<Schema<T>>) -> Result<Self> {
        Ok(Self::from_manager(RecordManager::new(len, schema)?))
    }
}

impl<T: PackRecord> PackedArray<T, ArrayMemoryStore> {
    pub fn for_record(len: usize) -> Result<Self> {
        Ok(Self::from_manager(RecordManager::for_record(len)?))
    }
}

impl<T: Default + 'static, S: MemoryStore> PackedArray<T, S> {
    pub fn from_manager(manager: RecordManager<T, S>) -> Self {
        Self { manager }
    }

    pub fn get(&self, index: usize) -> Result<T> {
        self.manager.get(index)
    }

    pub fn put(&mut self, index: usize, value: &T) -> Result<()> {
        self.manager.put(index, value)
    }

    pub fn put_any(&mut self, index: usize, value: &dyn Any) -> Result<()> {
        self.manager.put_any(index, value)
    }

    pub fn len(&self) -> usize {
        self.manager.slot_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn schema(&self) -> &Arc<Schema<T>> {
        self.manager.schema()
    }

    pub fn manager(&self) -> &RecordManager<T, S> {
        &self.manager
    }
}

impl<T, S: std::fmt::Debug> std::fmt::Debug for PackedArray<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PackedArray").field(&self.manager).finish()
    }
}

//! # PackedList - Arena Deque over Record Slots
//!
//! A fixed-capacity double-ended queue whose elements are packed records in a
//! [`PackedArray`]. Order is kept in three index arrays parallel to the
//! table:
//!
//! | Array | Entry for slot `i` |
//! |-------|--------------------|
//! | `forward` | slot after `i`, or `BACK_SENTINEL` |
//! | `backward` | slot before `i`, or `FRONT_SENTINEL` |
//! | `free` | next free slot after `i`, or `BACK_SENTINEL` |
//!
//! Every end operation is O(1). There is no positional access: `get(index)`,
//! `sort`, membership tests and removal from the middle are deliberately
//! absent.
//!
//! ## Structural Changes
//!
//! Each add and remove bumps a generation counter. A [`Cursor`] captures the
//! generation when it is created and refuses to advance once it has moved:
//!
//! ```ignore
//! let mut cursor = list.cursor();
//! list.add_last(&item)?;
//! assert!(cursor.next(&list).is_err()); // ConcurrentModification
//! ```

use std::any::Any;
use std::borrow::Borrow;
use std::sync::Arc;

use eyre::Result;
use tracing::{debug, trace};

use crate::collections::PackedArray;
use crate::config::{BACK_SENTINEL, FRONT_SENTINEL, MAX_DEQUE_CAPACITY};
use crate::error::PackError;
use crate::memory::{ArrayMemoryStore, MemoryStore};
use crate::records::{PackRecord, Schema};

#[inline]
fn is_sentinel(idx: u32) -> bool {
    idx == FRONT_SENTINEL || idx == BACK_SENTINEL
}

pub struct PackedList<T, S = ArrayMemoryStore> {
    array: PackedArray<T, S>,
    forward: Vec<u32>,
    backward: Vec<u32>,
    free: Vec<u32>,
    head: u32,
    tail: u32,
    len: usize,
    next_free: u32,
    generation: u64,
}

impl<T: Default + 'static> PackedList<T, ArrayMemoryStore> {
    pub fn new(capacity: usize, schema: Arc<Schema<T>>) -> Result<Self> {
        Self::with_array(PackedArray::new(capacity, schema)?)
    }
}

impl<T: PackRecord> PackedList<T, ArrayMemoryStore> {
    pub fn for_record(capacity: usize) -> Result<Self> {
        Self::with_array(PackedArray::for_record(capacity)?)
    }
}

impl<T: Default + 'static, S: MemoryStore> PackedList<T, S> {
    /// Threads an empty deque through every slot of `array`. Existing
    /// contents of the array are ignored.
    pub fn with_array(array: PackedArray<T, S>) -> Result<Self> {
        let capacity = array.len();
        if capacity > MAX_DEQUE_CAPACITY {
            return Err(PackError::config(format!(
                "deque capacity {} exceeds {}",
                capacity, MAX_DEQUE_CAPACITY
            )));
        }

        let mut free: Vec<u32> = (1..=capacity as u32).collect();
        if let Some(last) = free.last_mut() {
            *last = BACK_SENTINEL;
        }

        debug!(
            record = array.schema().type_name(),
            capacity,
            "created packed list"
        );

        Ok(Self {
            array,
            forward: vec![BACK_SENTINEL; capacity],
            backward: vec![FRONT_SENTINEL; capacity],
            free,
            head: FRONT_SENTINEL,
            tail: BACK_SENTINEL,
            len: 0,
            next_free: if capacity == 0 { BACK_SENTINEL } else { 0 },
            generation: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    pub fn capacity(&self) -> usize {
        self.array.len()
    }

    /// Counter bumped by every add and remove.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn add_first(&mut self, value: &T) -> Result<()> {
        let slot = self.claim_slot(value)?;
        let s = slot as usize;
        if self.len == 0 {
            self.forward[s] = BACK_SENTINEL;
            self.tail = slot;
        } else {
            self.forward[s] = self.head;
            self.backward[self.head as usize] = slot;
        }
        self.backward[s] = FRONT_SENTINEL;
        self.head = slot;
        self.commit_claim(slot);
        trace!(slot, len = self.len, generation = self.generation, "add_first");
        Ok(())
    }

    pub fn add_last(&mut self, value: &T) -> Result<()> {
        let slot = self.claim_slot(value)?;
        let s = slot as usize;
        if self.len == 0 {
            self.backward[s] = FRONT_SENTINEL;
            self.head = slot;
        } else {
            self.forward[self.tail as usize] = slot;
            self.backward[s] = self.tail;
        }
        self.forward[s] = BACK_SENTINEL;
        self.tail = slot;
        self.commit_claim(slot);
        trace!(slot, len = self.len, generation = self.generation, "add_last");
        Ok(())
    }

    /// [`add_first`](Self::add_first) for a possibly absent, type-erased value.
    pub fn add_first_any(&mut self, value: Option<&dyn Any>) -> Result<()> {
        let value = self.admit(value)?;
        self.add_first(value)
    }

    /// [`add_last`](Self::add_last) for a possibly absent, type-erased value.
    pub fn add_last_any(&mut self, value: Option<&dyn Any>) -> Result<()> {
        let value = self.admit(value)?;
        self.add_last(value)
    }

    /// Like [`add_first`](Self::add_first), but a full deque yields `Ok(false)`.
    pub fn offer_first(&mut self, value: &T) -> Result<bool> {
        if self.is_full() {
            return Ok(false);
        }
        self.add_first(value).map(|()| true)
    }

    /// Like [`add_last`](Self::add_last), but a full deque yields `Ok(false)`.
    pub fn offer_last(&mut self, value: &T) -> Result<bool> {
        if self.is_full() {
            return Ok(false);
        }
        self.add_last(value).map(|()| true)
    }

    pub fn push(&mut self, value: &T) -> Result<()> {
        self.add_first(value)
    }

    pub fn pop(&mut self) -> Result<T> {
        self.remove_first()
    }

    pub fn remove_first(&mut self) -> Result<T> {
        if self.len == 0 {
            return Err(PackError::Empty.into());
        }
        let slot = self.head;
        let value = self.array.get(slot as usize)?;

        self.release_slot(slot);
        if self.len == 1 {
            self.head = FRONT_SENTINEL;
            self.tail = BACK_SENTINEL;
        } else {
            self.head = self.forward[slot as usize];
            self.backward[self.head as usize] = FRONT_SENTINEL;
        }
        self.len -= 1;
        self.generation += 1;
        trace!(slot, len = self.len, generation = self.generation, "remove_first");
        Ok(value)
    }

    pub fn remove_last(&mut self) -> Result<T> {
        if self.len == 0 {
            return Err(PackError::Empty.into());
        }
        let slot = self.tail;
        let value = self.array.get(slot as usize)?;

        self.release_slot(slot);
        if self.len == 1 {
            self.head = FRONT_SENTINEL;
            self.tail = BACK_SENTINEL;
        } else {
            self.tail = self.backward[slot as usize];
            self.forward[self.tail as usize] = BACK_SENTINEL;
        }
        self.len -= 1;
        self.generation += 1;
        trace!(slot, len = self.len, generation = self.generation, "remove_last");
        Ok(value)
    }

    pub fn poll_first(&mut self) -> Result<Option<T>> {
        if self.is_empty() {
            return Ok(None);
        }
        self.remove_first().map(Some)
    }

    pub fn poll_last(&mut self) -> Result<Option<T>> {
        if self.is_empty() {
            return Ok(None);
        }
        self.remove_last().map(Some)
    }

    pub fn get_first(&self) -> Result<T> {
        if self.is_empty() {
            return Err(PackError::Empty.into());
        }
        self.array.get(self.head as usize)
    }

    pub fn get_last(&self) -> Result<T> {
        if self.is_empty() {
            return Err(PackError::Empty.into());
        }
        self.array.get(self.tail as usize)
    }

    /// Front element, `None` when empty. Errors only if the slot cannot be
    /// decoded.
    pub fn peek_first(&self) -> Result<Option<T>> {
        if self.is_empty() {
            return Ok(None);
        }
        self.get_first().map(Some)
    }

    pub fn peek_last(&self) -> Result<Option<T>> {
        if self.is_empty() {
            return Ok(None);
        }
        self.get_last().map(Some)
    }

    /// Appends every value in order. Stops at the first failure; values
    /// added before it stay.
    pub fn extend_from<I, B>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = B>,
        B: Borrow<T>,
    {
        for value in values {
            self.add_last(value.borrow())?;
        }
        Ok(())
    }

    // Queue-order aliases: enter at the back, leave from the front.

    pub fn add(&mut self, value: &T) -> Result<()> {
        self.add_last(value)
    }

    pub fn offer(&mut self, value: &T) -> Result<bool> {
        self.offer_last(value)
    }

    pub fn remove(&mut self) -> Result<T> {
        self.remove_first()
    }

    pub fn poll(&mut self) -> Result<Option<T>> {
        self.poll_first()
    }

    pub fn element(&self) -> Result<T> {
        self.get_first()
    }

    pub fn peek(&self) -> Result<Option<T>> {
        self.peek_first()
    }

    /// Removes from the front until empty.
    pub fn clear(&mut self) -> Result<()> {
        while !self.is_empty() {
            self.remove_first()?;
        }
        Ok(())
    }

    /// Cursor positioned before the first element.
    pub fn cursor(&self) -> Cursor {
        Cursor {
            generation: self.generation,
            left: FRONT_SENTINEL,
            right: self.head,
        }
    }

    /// Cursor positioned after the last element.
    pub fn cursor_back(&self) -> Cursor {
        Cursor {
            generation: self.generation,
            left: self.tail,
            right: BACK_SENTINEL,
        }
    }

    pub fn iter(&self) -> Iter<'_, T, S> {
        Iter {
            list: self,
            cursor: self.cursor(),
            reverse: false,
            done: false,
        }
    }

    pub fn iter_rev(&self) -> Iter<'_, T, S> {
        Iter {
            list: self,
            cursor: self.cursor_back(),
            reverse: true,
            done: false,
        }
    }

    pub fn array(&self) -> &PackedArray<T, S> {
        &self.array
    }

    fn ensure_room(&self) -> Result<()> {
        if self.is_full() {
            return Err(PackError::Capacity {
                capacity: self.capacity(),
            }
            .into());
        }
        Ok(())
    }

    fn admit<'v>(&self, value: Option<&'v dyn Any>) -> Result<&'v T> {
        self.ensure_room()?;
        let value = value
            .ok_or_else(|| PackError::invalid("deque does not permit null elements"))?;
        value.downcast_ref::<T>().ok_or_else(|| {
            PackError::TypeMismatch {
                expected: self.array.schema().type_name(),
                actual: format!("{:?}", value.type_id()),
            }
            .into()
        })
    }

    /// Writes `value` into the free-list head. Links are untouched until the
    /// write has succeeded.
    fn claim_slot(&mut self, value: &T) -> Result<u32> {
        self.ensure_room()?;
        let slot = self.next_free;
        self.array.put(slot as usize, value)?;
        Ok(slot)
    }

    fn commit_claim(&mut self, slot: u32) {
        self.next_free = self.free[slot as usize];
        self.len += 1;
        self.generation += 1;
    }

    fn release_slot(&mut self, slot: u32) {
        self.free[slot as usize] = self.next_free;
        self.next_free = slot;
    }

    fn check_generation(&self, captured: u64) -> Result<()> {
        if captured != self.generation {
            return Err(PackError::ConcurrentModification {
                expected: captured,
                actual: self.generation,
            }
            .into());
        }
        Ok(())
    }
}

impl<T, S: std::fmt::Debug> std::fmt::Debug for PackedList<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackedList")
            .field("len", &self.len)
            .field("head", &self.head)
            .field("tail", &self.tail)
            .field("next_free", &self.next_free)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

/// Bidirectional position between two elements of a [`PackedList`].
///
/// A cursor does not borrow the list, so the list can change while the cursor
/// is alive. Any add or remove after the cursor was created makes the next
/// `next`/`previous` call fail with `ConcurrentModification`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    generation: u64,
    left: u32,
    right: u32,
}

impl Cursor {
    pub fn has_next(&self) -> bool {
        !is_sentinel(self.right)
    }

    pub fn has_previous(&self) -> bool {
        !is_sentinel(self.left)
    }

    /// Steps forward, returning the element passed over. `Ok(None)` at the
    /// back.
    pub fn next<T, S>(&mut self, list: &PackedList<T, S>) -> Result<Option<T>>
    where
        T: Default + 'static,
        S: MemoryStore,
    {
        list.check_generation(self.generation)?;
        if !self.has_next() {
            return Ok(None);
        }
        let slot = self.right;
        let value = list.array.get(slot as usize)?;
        self.left = slot;
        self.right = list.forward[slot as usize];
        Ok(Some(value))
    }

    /// Steps backward, returning the element passed over. `Ok(None)` at the
    /// front.
    pub fn previous<T, S>(&mut self, list: &PackedList<T, S>) -> Result<Option<T>>
    where
        T: Default + 'static,
        S: MemoryStore,
    {
        list.check_generation(self.generation)?;
        if !self.has_previous() {
            return Ok(None);
        }
        let slot = self.left;
        let value = list.array.get(slot as usize)?;
        self.right = slot;
        self.left = list.backward[slot as usize];
        Ok(Some(value))
    }
}

/// Borrowing iterator over a [`PackedList`], front to back or back to front.
pub struct Iter<'a, T, S = ArrayMemoryStore> {
    list: &'a PackedList<T, S>,
    cursor: Cursor,
    reverse: bool,
    done: bool,
}

impl<T, S> Iterator for Iter<'_, T, S>
where
    T: Default + 'static,
    S: MemoryStore,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let step = if self.reverse {
            self.cursor.previous(self.list)
        } else {
            self.cursor.next(self.list)
        };
        match step {
            Ok(Some(value)) => Some(Ok(value)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            (0, Some(0))
        } else {
            (0, Some(self.list.len()))
        }
    }
}

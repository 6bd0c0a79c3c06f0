//! # Writer - Record to Bytes
//!
//! The writer walks the schema's fields in order, pulls each value through the
//! field binder and renders it into a zeroed [`Scratch`] buffer of
//! `total_bytes`. Only once every field has rendered is the buffer copied into
//! the store, so a rejected record leaves the slot untouched.
//!
//! Byte-aligned fields are written at `bit_offset / 8` directly. Bit-packed
//! fields are first rendered to a right-aligned big-endian form and then
//! spliced in with [`insert_bits`].

use std::any::Any;
use std::sync::Arc;

use eyre::Result;
use smallvec::{smallvec, SmallVec};
use zerocopy::big_endian::U32;
use zerocopy::IntoBytes;

use crate::bits::{insert_bits, BitWidth, SHRINK64};
use crate::config::{LENGTH_HEADER_BITS, LENGTH_HEADER_BYTES};
use crate::error::PackError;
use crate::memory::MemoryStore;
use crate::records::schema::{FieldDescriptor, Schema};
use crate::records::types::{FieldValue, WireType};
use crate::records::{Scratch, StringHeader, UuidHalves};

pub struct Writer<T> {
    schema: Arc<Schema<T>>,
}

impl<T> Clone for Writer<T> {
    fn clone(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
        }
    }
}

impl<T: 'static> Writer<T> {
    pub fn new(schema: Arc<Schema<T>>) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &Arc<Schema<T>> {
        &self.schema
    }

    /// Writes `record` into `slot`, at byte address `slot * total_bytes`.
    pub fn put<S: MemoryStore + ?Sized>(&self, store: &mut S, slot: usize, record: &T) -> Result<()> {
        let address = slot_address(store.bytes(), self.schema.total_bytes(), slot)?;
        let buffer = self.pack(record)?;
        store.set_byte_array(address, &buffer)
    }

    /// Like [`put`](Self::put) for a type-erased record. Anything but a `T`
    /// is a type mismatch.
    pub fn put_any<S: MemoryStore + ?Sized>(
        &self,
        store: &mut S,
        slot: usize,
        record: &dyn Any,
    ) -> Result<()> {
        let record = record.downcast_ref::<T>().ok_or_else(|| {
            eyre::Report::from(PackError::TypeMismatch {
                expected: self.schema.type_name(),
                actual: format!("{:?}", record.type_id()),
            })
        })?;
        self.put(store, slot, record)
    }

    /// Renders `record` to its packed bytes without touching a store.
    pub fn pack(&self, record: &T) -> Result<Scratch> {
        let schema = &*self.schema;
        let mut buffer: Scratch = smallvec![0u8; schema.total_bytes()];
        let binder = schema.binder();

        for (idx, field) in schema.fields().iter().enumerate() {
            if field.wire_type == WireType::Void {
                continue;
            }
            let value = binder.accessor(idx).get(record).ok_or_else(|| {
                PackError::invalid(format!(
                    "{}.{} is null",
                    schema.type_name(),
                    field.name
                ))
            })?;
            if value.wire_type() != field.wire_type {
                return Err(PackError::TypeMismatch {
                    expected: field.wire_type.name(),
                    actual: value.type_name().to_string(),
                }
                .into());
            }

            if schema.is_byte_aligned() {
                let start = field.byte_offset();
                let end = start + field.span_bits(true) / 8;
                encode_aligned(field, &value, &mut buffer[start..end])?;
            } else {
                encode_packed(field, &value, &mut buffer)?;
            }
        }

        Ok(buffer)
    }
}

/// Byte address of `slot`, or `OutOfBounds` if the record would overrun the
/// store.
pub(crate) fn slot_address(store_bytes: usize, record_bytes: usize, slot: usize) -> Result<i64> {
    let limit = store_bytes.checked_div(record_bytes).unwrap_or(0);
    if slot >= limit {
        return Err(PackError::OutOfBounds { index: slot, limit }.into());
    }
    Ok((slot * record_bytes) as i64)
}

/// Raw bits of a scalar value, shrunk to `bits` where the type is narrowable.
fn scalar_bits(value: &FieldValue, bits: usize) -> Option<u64> {
    Some(match *value {
        FieldValue::Bit(b) => b as u64,
        FieldValue::Byte(v) => v.shrink(bits) as u8 as u64,
        FieldValue::Short(v) => v.shrink(bits) as u16 as u64,
        FieldValue::Int(v) => v.shrink(bits) as u32 as u64,
        FieldValue::Long(v) => v.shrink(bits) as u64,
        FieldValue::Char(c) => c as u64 & SHRINK64[bits],
        FieldValue::Double(v) => v.to_bits(),
        FieldValue::Float(v) => v.to_bits() as u64,
        _ => return None,
    })
}

fn utf16_units(field: &FieldDescriptor, value: &str) -> Result<SmallVec<[u16; 32]>> {
    let units: SmallVec<[u16; 32]> = value.encode_utf16().collect();
    if units.len() > field.element_count {
        return Err(PackError::invalid(format!(
            "{}: string of {} characters exceeds capacity {}",
            field.name,
            units.len(),
            field.element_count
        )));
    }
    let max = SHRINK64[field.bit_width];
    if let Some(unit) = units.iter().find(|&&unit| unit as u64 > max) {
        return Err(PackError::invalid(format!(
            "{}: character U+{:04X} does not fit in {} bits",
            field.name, unit, field.bit_width
        )));
    }
    Ok(units)
}

fn check_array_len(field: &FieldDescriptor, len: usize) -> Result<()> {
    if len != field.element_count {
        return Err(PackError::invalid(format!(
            "{}: array of {} elements, expected {}",
            field.name, len, field.element_count
        )));
    }
    Ok(())
}

fn null_element(field: &FieldDescriptor, idx: usize) -> eyre::Report {
    PackError::invalid(format!("{}[{}] is null", field.name, idx))
}

fn encode_aligned(field: &FieldDescriptor, value: &FieldValue, out: &mut [u8]) -> Result<()> {
    match value {
        FieldValue::Uuid(uuid) => {
            out.copy_from_slice(UuidHalves::from(*uuid).as_bytes());
        }
        FieldValue::Str(s) => {
            let units = utf16_units(field, s)?;
            let header = StringHeader {
                count: U32::new(units.len() as u32),
            };
            out[..LENGTH_HEADER_BYTES].copy_from_slice(header.as_bytes());
            let chars = &mut out[LENGTH_HEADER_BYTES..];
            for (i, &unit) in units.iter().enumerate() {
                if field.byte_width == 1 {
                    chars[i] = unit as u8;
                } else {
                    chars[i * 2..i * 2 + 2].copy_from_slice(&unit.to_be_bytes());
                }
            }
        }
        FieldValue::BoolArray(values) => {
            check_array_len(field, values.len())?;
            for (i, v) in values.iter().enumerate() {
                out[i] = v.ok_or_else(|| null_element(field, i))? as u8;
            }
        }
        FieldValue::PrimitiveBoolArray(values) => {
            check_array_len(field, values.len())?;
            for (slot, v) in out.iter_mut().zip(values) {
                *slot = *v as u8;
            }
        }
        scalar => {
            if let Some(raw) = scalar_bits(scalar, field.bit_width) {
                let be = raw.to_be_bytes();
                out.copy_from_slice(&be[be.len() - out.len()..]);
            }
        }
    }
    Ok(())
}

fn encode_packed(field: &FieldDescriptor, value: &FieldValue, buffer: &mut [u8]) -> Result<()> {
    let offset = field.bit_offset;
    match value {
        FieldValue::Uuid(uuid) => {
            insert_bits(UuidHalves::from(*uuid).as_bytes(), buffer, offset, field.bit_width)?;
        }
        FieldValue::Str(s) => {
            let units = utf16_units(field, s)?;
            let header = StringHeader {
                count: U32::new(units.len() as u32),
            };
            insert_bits(header.as_bytes(), buffer, offset, LENGTH_HEADER_BITS)?;
            let mut at = offset + LENGTH_HEADER_BITS;
            for unit in units {
                insert_bits(&unit.to_be_bytes(), buffer, at, field.bit_width)?;
                at += field.bit_width;
            }
        }
        FieldValue::BoolArray(values) => {
            check_array_len(field, values.len())?;
            for (i, v) in values.iter().enumerate() {
                if v.ok_or_else(|| null_element(field, i))? {
                    insert_bits(&[1], buffer, offset + i, 1)?;
                }
            }
        }
        FieldValue::PrimitiveBoolArray(values) => {
            check_array_len(field, values.len())?;
            for (i, v) in values.iter().enumerate() {
                if *v {
                    insert_bits(&[1], buffer, offset + i, 1)?;
                }
            }
        }
        scalar => {
            if let Some(raw) = scalar_bits(scalar, field.bit_width) {
                insert_bits(&raw.to_be_bytes(), buffer, offset, field.bit_width)?;
            }
        }
    }
    Ok(())
}

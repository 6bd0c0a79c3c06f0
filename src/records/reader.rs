//! # Reader - Bytes to Record
//!
//! Inverse of the [`Writer`](crate::records::Writer): reads `total_bytes` at
//! the slot, decodes every field in schema order and binds it onto a fresh
//! `T::default()`. Narrowed integers are widened back with `extend` so their
//! sign survives.

use std::sync::Arc;

use eyre::Result;
use zerocopy::FromBytes;

use crate::bits::{unpack, unpack32, unpack64, BitWidth};
use crate::config::{LENGTH_HEADER_BITS, UUID_BITS};
use crate::error::PackError;
use crate::memory::MemoryStore;
use crate::records::schema::{FieldDescriptor, Schema};
use crate::records::types::{FieldValue, WireType};
use crate::records::writer::slot_address;
use crate::records::{StringHeader, UuidHalves};

pub struct Reader<T> {
    schema: Arc<Schema<T>>,
}

impl<T> Clone for Reader<T> {
    fn clone(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
        }
    }
}

impl<T: Default + 'static> Reader<T> {
    pub fn new(schema: Arc<Schema<T>>) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &Arc<Schema<T>> {
        &self.schema
    }

    pub fn get<S: MemoryStore + ?Sized>(&self, store: &S, slot: usize) -> Result<T> {
        let record_bytes = self.schema.total_bytes();
        let address = slot_address(store.bytes(), record_bytes, slot)?;
        let buffer = store.get_byte_array(address, record_bytes)?;
        self.unpack(&buffer)
    }

    /// Decodes one packed record.
    pub fn unpack(&self, buffer: &[u8]) -> Result<T> {
        let schema = &*self.schema;
        if buffer.len() < schema.total_bytes() {
            return Err(PackError::invalid(format!(
                "{} needs {} bytes, got {}",
                schema.type_name(),
                schema.total_bytes(),
                buffer.len()
            )));
        }

        let mut record = T::default();
        let binder = schema.binder();
        for (idx, field) in schema.fields().iter().enumerate() {
            if field.wire_type == WireType::Void {
                continue;
            }
            let value = if schema.is_byte_aligned() {
                let start = field.byte_offset();
                let end = start + field.span_bits(true) / 8;
                decode_aligned(field, &buffer[start..end])?
            } else {
                decode_packed(field, buffer)?
            };
            binder.accessor(idx).set(&mut record, Some(value))?;
        }
        Ok(record)
    }
}

/// Rebuilds a scalar of `field`'s wire type from its raw, zero-extended bits.
fn scalar_value(field: &FieldDescriptor, raw: u64) -> Option<FieldValue> {
    let signed = if field.wire_type.is_signed_integer() {
        (raw as i64).extend(field.bit_width)
    } else {
        raw as i64
    };
    Some(match field.wire_type {
        WireType::Bit => FieldValue::Bit(raw & 1 != 0),
        WireType::Byte8 => FieldValue::Byte(signed as i8),
        WireType::Short16 => FieldValue::Short(signed as i16),
        WireType::Word32 => FieldValue::Int(signed as i32),
        WireType::Word64 => FieldValue::Long(signed),
        WireType::Char16 => FieldValue::Char(raw as u16),
        WireType::Double => FieldValue::Double(f64::from_bits(raw)),
        WireType::Float => FieldValue::Float(f32::from_bits(raw as u32)),
        _ => return None,
    })
}

fn string_length(field: &FieldDescriptor, count: u32) -> Result<usize> {
    let count = count as usize;
    if count > field.element_count {
        return Err(PackError::invalid(format!(
            "{}: stored length {} exceeds capacity {}",
            field.name, count, field.element_count
        )));
    }
    Ok(count)
}

fn decode_utf16(field: &FieldDescriptor, units: &[u16]) -> Result<FieldValue> {
    String::from_utf16(units)
        .map(FieldValue::Str)
        .map_err(|e| PackError::invalid(format!("{}: {}", field.name, e)))
}

fn decode_aligned(field: &FieldDescriptor, bytes: &[u8]) -> Result<FieldValue> {
    match field.wire_type {
        WireType::Uuid => {
            let halves = UuidHalves::read_from_bytes(bytes)
                .map_err(|_| PackError::invalid(format!("{}: bad uuid width", field.name)))?;
            Ok(FieldValue::Uuid(halves.into()))
        }
        WireType::FixedString => {
            let (header, chars) = StringHeader::read_from_prefix(bytes)
                .map_err(|_| PackError::invalid(format!("{}: truncated header", field.name)))?;
            let count = string_length(field, header.count.get())?;
            let units: Vec<u16> = if field.byte_width == 1 {
                chars[..count].iter().map(|&b| b as u16).collect()
            } else {
                chars[..count * 2]
                    .chunks_exact(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                    .collect()
            };
            decode_utf16(field, &units)
        }
        WireType::BooleanArray => Ok(FieldValue::BoolArray(
            bytes.iter().map(|&b| Some(b != 0)).collect(),
        )),
        WireType::PrimitiveBooleanArray => Ok(FieldValue::PrimitiveBoolArray(
            bytes.iter().map(|&b| b != 0).collect(),
        )),
        _ => {
            let raw = bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64);
            scalar_value(field, raw).ok_or_else(|| unsupported(field))
        }
    }
}

fn decode_packed(field: &FieldDescriptor, buffer: &[u8]) -> Result<FieldValue> {
    let offset = field.bit_offset;
    match field.wire_type {
        WireType::Uuid => {
            let high = unpack64(buffer, offset, 64)?;
            let low = unpack64(buffer, offset + UUID_BITS / 2, 64)?;
            let value = ((high as u128) << 64) | low as u128;
            Ok(FieldValue::Uuid(uuid::Uuid::from_u128(value)))
        }
        WireType::FixedString => {
            let count = string_length(field, unpack32(buffer, offset)?)?;
            let mut units = Vec::with_capacity(count);
            let mut at = offset + LENGTH_HEADER_BITS;
            for _ in 0..count {
                units.push(unpack(buffer, at, field.bit_width)? as u16);
                at += field.bit_width;
            }
            decode_utf16(field, &units)
        }
        WireType::BooleanArray => {
            let values = (0..field.element_count)
                .map(|i| unpack(buffer, offset + i, 1).map(|b| Some(b != 0)))
                .collect::<Result<Vec<_>>>()?;
            Ok(FieldValue::BoolArray(values))
        }
        WireType::PrimitiveBooleanArray => {
            let values = (0..field.element_count)
                .map(|i| unpack(buffer, offset + i, 1).map(|b| b != 0))
                .collect::<Result<Vec<_>>>()?;
            Ok(FieldValue::PrimitiveBoolArray(values))
        }
        _ => {
            let raw = unpack64(buffer, offset, field.bit_width)?;
            scalar_value(field, raw).ok_or_else(|| unsupported(field))
        }
    }
}

fn unsupported(field: &FieldDescriptor) -> eyre::Report {
    PackError::config(format!(
        "{}: {} cannot be decoded",
        field.name,
        field.wire_type.name()
    ))
}

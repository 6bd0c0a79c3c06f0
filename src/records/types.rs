//! # Wire Types, Value Types and Field Values
//!
//! Three vocabularies meet in a schema:
//!
//! | Vocabulary | Role |
//! |------------|------|
//! | [`ValueType`] | the Rust type a record field is declared with |
//! | [`WireType`] | the packed representation the compiler resolves it to |
//! | [`FieldValue`] | a decoded value travelling between a record and the packer |
//!
//! ## Type Table
//!
//! | Rust type | ValueType | WireType | Max bits |
//! |-----------|-----------|----------|----------|
//! | `bool` | Bool | Bit | 1 |
//! | `i8` | Byte | Byte8 | 8 |
//! | `i16` | Short | Short16 | 16 |
//! | `i32` | Int | Word32 | 32 |
//! | `i64` | Long | Word64 | 64 |
//! | `u16` | Char | Char16 | 16 |
//! | `()` | Unit | Void | 64 |
//! | `uuid::Uuid` | Uuid | Uuid | 128 (fixed) |
//! | `String` | String | FixedString | 16 per char |
//! | `Vec<Option<bool>>` | BoolArray | BooleanArray | 1 per element |
//! | `Vec<bool>` | PrimitiveBoolArray | PrimitiveBooleanArray | 1 per element |
//! | `f64` | Double | Double | 64 (fixed) |
//! | `f32` | Float | Float | 32 (fixed) |
//!
//! `Option<V>` declares a nullable `V`. A null payload is rejected when the
//! record is written.

use eyre::Result;
use uuid::Uuid;

use crate::config::UUID_BITS;
use crate::error::PackError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    Bit,
    Byte8,
    Short16,
    Word32,
    Word64,
    Char16,
    Void,
    Uuid,
    FixedString,
    BooleanArray,
    PrimitiveBooleanArray,
    Double,
    Float,
}

impl WireType {
    /// Largest bit width a field (or string/array element) of this type can take.
    pub fn max_bits(&self) -> usize {
        match self {
            WireType::Bit | WireType::BooleanArray | WireType::PrimitiveBooleanArray => 1,
            WireType::Byte8 => 8,
            WireType::Short16 | WireType::Char16 | WireType::FixedString => 16,
            WireType::Word32 | WireType::Float => 32,
            WireType::Word64 | WireType::Void | WireType::Double => 64,
            WireType::Uuid => UUID_BITS,
        }
    }

    /// Width of types that ignore the requested bit count.
    pub fn fixed_bits(&self) -> Option<usize> {
        match self {
            WireType::Uuid => Some(UUID_BITS),
            WireType::Double => Some(64),
            WireType::Float => Some(32),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, WireType::BooleanArray | WireType::PrimitiveBooleanArray)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, WireType::FixedString)
    }

    pub fn name(&self) -> &'static str {
        match self {
            WireType::Bit => "Bit",
            WireType::Byte8 => "Byte8",
            WireType::Short16 => "Short16",
            WireType::Word32 => "Word32",
            WireType::Word64 => "Word64",
            WireType::Char16 => "Char16",
            WireType::Void => "Void",
            WireType::Uuid => "Uuid",
            WireType::FixedString => "FixedString",
            WireType::BooleanArray => "BooleanArray",
            WireType::PrimitiveBooleanArray => "PrimitiveBooleanArray",
            WireType::Double => "Double",
            WireType::Float => "Float",
        }
    }

    /// Integer types narrowed with `shrink` and widened with `extend`.
    pub fn is_signed_integer(&self) -> bool {
        matches!(
            self,
            WireType::Byte8 | WireType::Short16 | WireType::Word32 | WireType::Word64
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Bool,
    Byte,
    Short,
    Int,
    Long,
    Char,
    Unit,
    Uuid,
    String,
    BoolArray,
    PrimitiveBoolArray,
    Double,
    Float,
    /// A type with no wire mapping; rejected at compile time.
    Other(&'static str),
}

impl ValueType {
    pub fn wire_type(&self) -> Option<WireType> {
        Some(match self {
            ValueType::Bool => WireType::Bit,
            ValueType::Byte => WireType::Byte8,
            ValueType::Short => WireType::Short16,
            ValueType::Int => WireType::Word32,
            ValueType::Long => WireType::Word64,
            ValueType::Char => WireType::Char16,
            ValueType::Unit => WireType::Void,
            ValueType::Uuid => WireType::Uuid,
            ValueType::String => WireType::FixedString,
            ValueType::BoolArray => WireType::BooleanArray,
            ValueType::PrimitiveBoolArray => WireType::PrimitiveBooleanArray,
            ValueType::Double => WireType::Double,
            ValueType::Float => WireType::Float,
            ValueType::Other(_) => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::Byte => "i8",
            ValueType::Short => "i16",
            ValueType::Int => "i32",
            ValueType::Long => "i64",
            ValueType::Char => "u16",
            ValueType::Unit => "()",
            ValueType::Uuid => "Uuid",
            ValueType::String => "String",
            ValueType::BoolArray => "Vec<Option<bool>>",
            ValueType::PrimitiveBoolArray => "Vec<bool>",
            ValueType::Double => "f64",
            ValueType::Float => "f32",
            ValueType::Other(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Bit(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Char(u16),
    Uuid(Uuid),
    Str(String),
    BoolArray(Vec<Option<bool>>),
    PrimitiveBoolArray(Vec<bool>),
    Double(f64),
    Float(f32),
}

impl FieldValue {
    pub fn wire_type(&self) -> WireType {
        match self {
            FieldValue::Bit(_) => WireType::Bit,
            FieldValue::Byte(_) => WireType::Byte8,
            FieldValue::Short(_) => WireType::Short16,
            FieldValue::Int(_) => WireType::Word32,
            FieldValue::Long(_) => WireType::Word64,
            FieldValue::Char(_) => WireType::Char16,
            FieldValue::Uuid(_) => WireType::Uuid,
            FieldValue::Str(_) => WireType::FixedString,
            FieldValue::BoolArray(_) => WireType::BooleanArray,
            FieldValue::PrimitiveBoolArray(_) => WireType::PrimitiveBooleanArray,
            FieldValue::Double(_) => WireType::Double,
            FieldValue::Float(_) => WireType::Float,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Bit(_) => "bool",
            FieldValue::Byte(_) => "i8",
            FieldValue::Short(_) => "i16",
            FieldValue::Int(_) => "i32",
            FieldValue::Long(_) => "i64",
            FieldValue::Char(_) => "u16",
            FieldValue::Uuid(_) => "Uuid",
            FieldValue::Str(_) => "String",
            FieldValue::BoolArray(_) => "Vec<Option<bool>>",
            FieldValue::PrimitiveBoolArray(_) => "Vec<bool>",
            FieldValue::Double(_) => "f64",
            FieldValue::Float(_) => "f32",
        }
    }
}

/// A Rust type that can be bound to a record field.
///
/// `into_value` returns `None` for a null payload; `from_value` receives
/// `None` only for nullable types.
pub trait FieldType: Sized {
    const VALUE_TYPE: ValueType;

    fn into_value(self) -> Option<FieldValue>;

    fn from_value(value: Option<FieldValue>) -> Result<Self>;
}

fn mismatch(expected: ValueType, actual: Option<&FieldValue>) -> eyre::Report {
    match actual {
        Some(value) => PackError::TypeMismatch {
            expected: expected.name(),
            actual: value.type_name().to_string(),
        }
        .into(),
        None => PackError::invalid(format!("null value for non-nullable {}", expected.name())),
    }
}

macro_rules! field_type {
    ($($ty:ty => $value_type:ident, $variant:ident;)*) => {
        $(
            impl FieldType for $ty {
                const VALUE_TYPE: ValueType = ValueType::$value_type;

                fn into_value(self) -> Option<FieldValue> {
                    Some(FieldValue::$variant(self))
                }

                fn from_value(value: Option<FieldValue>) -> Result<Self> {
                    match value {
                        Some(FieldValue::$variant(v)) => Ok(v),
                        other => Err(mismatch(Self::VALUE_TYPE, other.as_ref())),
                    }
                }
            }
        )*
    };
}

field_type! {
    bool => Bool, Bit;
    i8 => Byte, Byte;
    i16 => Short, Short;
    i32 => Int, Int;
    i64 => Long, Long;
    u16 => Char, Char;
    Uuid => Uuid, Uuid;
    String => String, Str;
    Vec<Option<bool>> => BoolArray, BoolArray;
    Vec<bool> => PrimitiveBoolArray, PrimitiveBoolArray;
    f64 => Double, Double;
    f32 => Float, Float;
}

impl FieldType for () {
    const VALUE_TYPE: ValueType = ValueType::Unit;

    fn into_value(self) -> Option<FieldValue> {
        None
    }

    fn from_value(_value: Option<FieldValue>) -> Result<Self> {
        Ok(())
    }
}

impl<V: FieldType> FieldType for Option<V> {
    const VALUE_TYPE: ValueType = V::VALUE_TYPE;

    fn into_value(self) -> Option<FieldValue> {
        self.and_then(V::into_value)
    }

    fn from_value(value: Option<FieldValue>) -> Result<Self> {
        match value {
            None => Ok(None),
            some => V::from_value(some).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{error_kind, ErrorKind};

    #[test]
    fn every_value_type_but_other_has_a_wire_type() {
        assert_eq!(ValueType::Int.wire_type(), Some(WireType::Word32));
        assert_eq!(ValueType::Char.wire_type(), Some(WireType::Char16));
        assert_eq!(ValueType::Unit.wire_type(), Some(WireType::Void));
        assert_eq!(ValueType::Other("Decimal").wire_type(), None);
        assert_eq!(ValueType::Other("Decimal").name(), "Decimal");
    }

    #[test]
    fn fixed_width_types() {
        assert_eq!(WireType::Uuid.fixed_bits(), Some(128));
        assert_eq!(WireType::Double.fixed_bits(), Some(64));
        assert_eq!(WireType::Float.fixed_bits(), Some(32));
        assert_eq!(WireType::Word64.fixed_bits(), None);
        assert_eq!(WireType::Word64.max_bits(), 64);
        assert_eq!(WireType::Bit.max_bits(), 1);
    }

    #[test]
    fn only_sized_integers_are_sign_extended() {
        for wire in [WireType::Byte8, WireType::Short16, WireType::Word32, WireType::Word64] {
            assert!(wire.is_signed_integer(), "{}", wire.name());
        }
        for wire in [WireType::Bit, WireType::Char16, WireType::Float, WireType::Double] {
            assert!(!wire.is_signed_integer(), "{}", wire.name());
        }
    }

    #[test]
    fn option_maps_none_to_null() {
        assert_eq!(Option::<i32>::None.into_value(), None);
        assert_eq!(Some(5i32).into_value(), Some(FieldValue::Int(5)));
        assert_eq!(Option::<i32>::from_value(None).unwrap(), None);
        assert_eq!(
            Option::<i32>::from_value(Some(FieldValue::Int(3))).unwrap(),
            Some(3)
        );
    }

    #[test]
    fn wrong_variant_is_type_mismatch() {
        let err = i32::from_value(Some(FieldValue::Long(1))).unwrap_err();
        assert_eq!(error_kind(&err), Some(ErrorKind::TypeMismatch));

        let err = i32::from_value(None).unwrap_err();
        assert_eq!(error_kind(&err), Some(ErrorKind::InvalidArgument));
    }
}

//! # Record Declarations and the Schema Compiler
//!
//! A record type describes itself with a [`RecordDecl`]: an alignment policy
//! plus a list of field declarations, each carrying a name, an explicit order
//! key, a requested width and a typed getter/setter pair. [`Schema::compile`]
//! turns that description into an immutable layout.
//!
//! ```ignore
//! impl PackRecord for Sample {
//!     fn declare() -> RecordDecl<Self> {
//!         RecordDecl::<Self>::byte_aligned()
//!             .field("a", 0, 25, |r| r.a, |r, v| r.a = v)
//!             .field("c", 1, 32, |r| r.c, |r, v| r.c = v)
//!             .field("d", 2, 1, |r| r.d, |r, v| r.d = v)
//!     }
//! }
//! ```
//!
//! ## Compilation Steps
//!
//! 1. Resolve each declared value type to a [`WireType`]; unknown types fail.
//! 2. Check the declaration kind against the type: padding must be void,
//!    payload must not be, arrays and strings need their own declarations.
//! 3. Reject widths below 1, then clamp to the type's natural maximum.
//!    UUID, Float and Double are fixed width.
//! 4. Stable-sort by order key; duplicate keys or names fail.
//! 5. Assign bit offsets and accumulate the record width.
//!
//! ## Field Widths
//!
//! | Mode | Field bits |
//! |------|-----------|
//! | byte aligned | `byte_width * 8 * element_count` |
//! | bit packed | `bit_width * element_count` |
//!
//! FixedString fields add a 32-bit element-count header in both modes.
//! `total_bytes = ceil(total_bits / 8)`.

use std::any::{type_name, TypeId};
use std::sync::Arc;

use eyre::Result;
use hashbrown::HashSet;
use tracing::debug;

use crate::config::LENGTH_HEADER_BITS;
use crate::error::PackError;
use crate::records::binder::{FieldAccessor, FieldBinder};
use crate::records::types::{FieldType, ValueType, WireType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Field,
    Padding,
    Array,
    String,
}

/// One entry of a record declaration, before validation.
#[derive(Debug)]
pub struct FieldDecl<T> {
    name: &'static str,
    order: i32,
    kind: DeclKind,
    bits: usize,
    elements: usize,
    accessor: FieldAccessor<T>,
}

impl<T> FieldDecl<T> {
    pub fn field<V, G, S>(name: &'static str, order: i32, bits: usize, get: G, set: S) -> Self
    where
        V: FieldType + 'static,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        Self {
            name,
            order,
            kind: DeclKind::Field,
            bits,
            elements: 1,
            accessor: FieldAccessor::new(get, set),
        }
    }

    pub fn padding(name: &'static str, order: i32, bits: usize) -> Self {
        Self::padding_of(name, order, bits, ValueType::Unit)
    }

    /// Padding over an arbitrary value type. Only `ValueType::Unit` compiles.
    pub fn padding_of(name: &'static str, order: i32, bits: usize, value_type: ValueType) -> Self {
        Self {
            name,
            order,
            kind: DeclKind::Padding,
            bits,
            elements: 1,
            accessor: FieldAccessor::unbound(value_type),
        }
    }

    pub fn array<V, G, S>(name: &'static str, order: i32, elements: usize, get: G, set: S) -> Self
    where
        V: FieldType + 'static,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        Self {
            name,
            order,
            kind: DeclKind::Array,
            bits: 1,
            elements,
            accessor: FieldAccessor::new(get, set),
        }
    }

    /// `bits` is the width of one character.
    pub fn string<V, G, S>(
        name: &'static str,
        order: i32,
        elements: usize,
        bits: usize,
        get: G,
        set: S,
    ) -> Self
    where
        V: FieldType + 'static,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        Self {
            name,
            order,
            kind: DeclKind::String,
            bits,
            elements,
            accessor: FieldAccessor::new(get, set),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn kind(&self) -> DeclKind {
        self.kind
    }
}

/// Declarative description of a record type.
#[derive(Debug)]
pub struct RecordDecl<T> {
    byte_aligned: bool,
    fields: Vec<FieldDecl<T>>,
}

impl<T> RecordDecl<T> {
    pub fn byte_aligned() -> Self {
        Self {
            byte_aligned: true,
            fields: Vec::new(),
        }
    }

    pub fn bit_packed() -> Self {
        Self {
            byte_aligned: false,
            fields: Vec::new(),
        }
    }

    pub fn is_byte_aligned(&self) -> bool {
        self.byte_aligned
    }

    pub fn declare(mut self, decl: FieldDecl<T>) -> Self {
        self.fields.push(decl);
        self
    }

    pub fn field<V, G, S>(self, name: &'static str, order: i32, bits: usize, get: G, set: S) -> Self
    where
        V: FieldType + 'static,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.declare(FieldDecl::field(name, order, bits, get, set))
    }

    pub fn padding(self, name: &'static str, order: i32, bits: usize) -> Self {
        self.declare(FieldDecl::padding(name, order, bits))
    }

    pub fn array<V, G, S>(self, name: &'static str, order: i32, elements: usize, get: G, set: S) -> Self
    where
        V: FieldType + 'static,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.declare(FieldDecl::array(name, order, elements, get, set))
    }

    /// Fixed string of up to `elements` UTF-16 units, each stored in `bits`
    /// bits (clamped to 16). Writing a string with a unit wider than `bits`,
    /// e.g. `'€'` into 8-bit characters, fails with InvalidArgument.
    pub fn string<V, G, S>(
        self,
        name: &'static str,
        order: i32,
        elements: usize,
        bits: usize,
        get: G,
        set: S,
    ) -> Self
    where
        V: FieldType + 'static,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.declare(FieldDecl::string(name, order, elements, bits, get, set))
    }
}

/// A record type that can describe its own layout.
pub trait PackRecord: Default + Sized + 'static {
    fn declare() -> RecordDecl<Self>;
}

/// Compiled layout of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub wire_type: WireType,
    pub order: i32,
    /// Bits per element after clamping.
    pub bit_width: usize,
    /// `ceil(bit_width / 8)`.
    pub byte_width: usize,
    pub element_count: usize,
    /// Offset of the field's first bit within the record.
    pub bit_offset: usize,
    pub padding: bool,
}

impl FieldDescriptor {
    /// Bits the field occupies under the given alignment policy.
    pub fn span_bits(&self, byte_aligned: bool) -> usize {
        let unit = if byte_aligned {
            self.byte_width * 8
        } else {
            self.bit_width
        };
        let header = if self.wire_type.is_string() {
            LENGTH_HEADER_BITS
        } else {
            0
        };
        header + unit * self.element_count
    }

    pub fn byte_offset(&self) -> usize {
        self.bit_offset / 8
    }
}

pub struct Schema<T> {
    type_name: &'static str,
    type_id: TypeId,
    byte_aligned: bool,
    fields: Vec<FieldDescriptor>,
    binder: FieldBinder<T>,
    total_bits: usize,
    total_bytes: usize,
}

impl<T: 'static> Schema<T> {
    pub fn compile(decl: RecordDecl<T>) -> Result<Self> {
        let RecordDecl {
            byte_aligned,
            fields: decls,
        } = decl;
        let type_name = type_name::<T>();

        let mut resolved = Vec::with_capacity(decls.len());
        for decl in decls {
            let descriptor = resolve(type_name, &decl)?;
            resolved.push((descriptor, decl.accessor));
        }

        if resolved.iter().all(|(field, _)| field.padding) {
            return Err(PackError::config(format!(
                "{} declares no payload fields",
                type_name
            )));
        }

        resolved.sort_by_key(|(field, _)| field.order);

        let mut names = HashSet::with_capacity(resolved.len());
        for pair in resolved.windows(2) {
            if pair[0].0.order == pair[1].0.order {
                return Err(PackError::config(format!(
                    "{}: fields '{}' and '{}' share order key {}",
                    type_name, pair[0].0.name, pair[1].0.name, pair[0].0.order
                )));
            }
        }
        for (field, _) in &resolved {
            if !names.insert(field.name) {
                return Err(PackError::config(format!(
                    "{}: field '{}' declared twice",
                    type_name, field.name
                )));
            }
        }

        let mut fields = Vec::with_capacity(resolved.len());
        let mut entries = Vec::with_capacity(resolved.len());
        let mut total_bits = 0usize;
        for (mut field, accessor) in resolved {
            field.bit_offset = total_bits;
            total_bits += field.span_bits(byte_aligned);
            entries.push((field.name, accessor));
            fields.push(field);
        }
        let total_bytes = total_bits.div_ceil(8);

        debug!(
            record = type_name,
            byte_aligned,
            fields = fields.len(),
            total_bits,
            total_bytes,
            "compiled record schema"
        );

        Ok(Self {
            type_name,
            type_id: TypeId::of::<T>(),
            byte_aligned,
            fields,
            binder: FieldBinder::new(entries),
            total_bits,
            total_bytes,
        })
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }
}

impl<T: PackRecord> Schema<T> {
    /// Compiles the declaration `T` provides, ready to share between a writer
    /// and a reader.
    pub fn of() -> Result<Arc<Self>> {
        Self::compile(T::declare()).map(Arc::new)
    }
}

impl<T> Schema<T> {
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is_byte_aligned(&self) -> bool {
        self.byte_aligned
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.binder.position(name).map(|idx| &self.fields[idx])
    }

    pub fn binder(&self) -> &FieldBinder<T> {
        &self.binder
    }

    pub fn total_bits(&self) -> usize {
        self.total_bits
    }

    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }
}

impl<T> std::fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("type_name", &self.type_name)
            .field("byte_aligned", &self.byte_aligned)
            .field("fields", &self.fields)
            .field("total_bits", &self.total_bits)
            .field("total_bytes", &self.total_bytes)
            .finish()
    }
}

fn resolve<T>(record: &str, decl: &FieldDecl<T>) -> Result<FieldDescriptor> {
    let value_type = decl.accessor.value_type();
    let wire_type = value_type.wire_type().ok_or_else(|| {
        PackError::config(format!(
            "{}.{}: unsupported field type {}",
            record,
            decl.name,
            value_type.name()
        ))
    })?;

    let misuse = match decl.kind {
        DeclKind::Padding if wire_type != WireType::Void => Some("padding must be void"),
        DeclKind::Field if wire_type == WireType::Void => Some("payload field cannot be void"),
        DeclKind::Field if wire_type.is_array() => Some("array type needs an array declaration"),
        DeclKind::Field if wire_type.is_string() => Some("string type needs a string declaration"),
        DeclKind::Array if !wire_type.is_array() => Some("array declaration on a non-array type"),
        DeclKind::String if !wire_type.is_string() => {
            Some("string declaration on a non-string type")
        }
        _ => None,
    };
    if let Some(reason) = misuse {
        return Err(PackError::config(format!(
            "{}.{}: {}",
            record, decl.name, reason
        )));
    }

    if decl.bits < 1 {
        return Err(PackError::config(format!(
            "{}.{}: bit width must be at least 1",
            record, decl.name
        )));
    }
    if decl.elements < 1 {
        return Err(PackError::config(format!(
            "{}.{}: element count must be at least 1",
            record, decl.name
        )));
    }

    let bit_width = wire_type
        .fixed_bits()
        .unwrap_or_else(|| decl.bits.min(wire_type.max_bits()));

    Ok(FieldDescriptor {
        name: decl.name,
        wire_type,
        order: decl.order,
        bit_width,
        byte_width: bit_width.div_ceil(8),
        element_count: decl.elements,
        bit_offset: 0,
        padding: decl.kind == DeclKind::Padding,
    })
}

//! # Field Binding
//!
//! A record type exposes its fields to the packer through a table of
//! [`FieldAccessor`]s, one per declared field, built once when the schema is
//! compiled. Each accessor erases a typed getter/setter pair into closures that
//! speak [`FieldValue`], so the writer and reader dispatch by position and never
//! look a field up by name while packing.
//!
//! [`FieldBinder`] owns the table and adds the by-name view used for
//! introspection:
//!
//! ```ignore
//! let binder = schema.binder();
//! binder.set_field(&mut record, "count", Some(FieldValue::Int(7)))?;
//! assert_eq!(binder.get_field(&record, "count")?, Some(FieldValue::Int(7)));
//! ```

use eyre::Result;
use hashbrown::HashMap;

use crate::error::PackError;
use crate::records::types::{FieldType, FieldValue, ValueType};

type Getter<T> = Box<dyn Fn(&T) -> Option<FieldValue> + Send + Sync>;
type Setter<T> = Box<dyn Fn(&mut T, Option<FieldValue>) -> Result<()> + Send + Sync>;

pub struct FieldAccessor<T> {
    value_type: ValueType,
    get: Getter<T>,
    set: Setter<T>,
}

impl<T> FieldAccessor<T> {
    pub fn new<V, G, S>(get: G, set: S) -> Self
    where
        V: FieldType + 'static,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        Self {
            value_type: V::VALUE_TYPE,
            get: Box::new(move |record| get(record).into_value()),
            set: Box::new(move |record, value| {
                set(record, V::from_value(value)?);
                Ok(())
            }),
        }
    }

    /// Accessor with no backing field. Reads yield null, writes are dropped.
    pub fn unbound(value_type: ValueType) -> Self {
        Self {
            value_type,
            get: Box::new(|_| None),
            set: Box::new(|_, _| Ok(())),
        }
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    #[inline]
    pub fn get(&self, record: &T) -> Option<FieldValue> {
        (self.get)(record)
    }

    #[inline]
    pub fn set(&self, record: &mut T, value: Option<FieldValue>) -> Result<()> {
        (self.set)(record, value)
    }
}

impl<T> std::fmt::Debug for FieldAccessor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldAccessor")
            .field("value_type", &self.value_type)
            .finish_non_exhaustive()
    }
}

pub struct FieldBinder<T> {
    names: Vec<&'static str>,
    accessors: Vec<FieldAccessor<T>>,
    by_name: HashMap<&'static str, usize>,
}

impl<T> FieldBinder<T> {
    pub(crate) fn new(entries: Vec<(&'static str, FieldAccessor<T>)>) -> Self {
        let mut names = Vec::with_capacity(entries.len());
        let mut accessors = Vec::with_capacity(entries.len());
        let mut by_name = HashMap::with_capacity(entries.len());
        for (idx, (name, accessor)) in entries.into_iter().enumerate() {
            by_name.insert(name, idx);
            names.push(name);
            accessors.push(accessor);
        }
        Self {
            names,
            accessors,
            by_name,
        }
    }

    pub fn len(&self) -> usize {
        self.accessors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accessors.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, idx: usize) -> Option<&'static str> {
        self.names.get(idx).copied()
    }

    #[inline]
    pub fn accessor(&self, idx: usize) -> &FieldAccessor<T> {
        &self.accessors[idx]
    }

    pub fn get_field(&self, record: &T, name: &str) -> Result<Option<FieldValue>> {
        let idx = self.lookup(name)?;
        Ok(self.accessors[idx].get(record))
    }

    pub fn set_field(&self, record: &mut T, name: &str, value: Option<FieldValue>) -> Result<()> {
        let idx = self.lookup(name)?;
        self.accessors[idx].set(record, value)
    }

    fn lookup(&self, name: &str) -> Result<usize> {
        self.position(name)
            .ok_or_else(|| PackError::invalid(format!("no field named '{}'", name)))
    }
}

impl<T> std::fmt::Debug for FieldBinder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldBinder")
            .field("fields", &self.names)
            .finish()
    }
}

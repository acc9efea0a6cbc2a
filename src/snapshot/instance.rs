//! Instances and arrays.

use std::sync::Arc;

use crate::hprof::{ArrayValues, BasicType, ObjectId, Value};

use super::reference::{ClassIdx, Reference};

/// Decoded value of one instance field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
    /// Field name
    pub name: Arc<str>,
    /// Class that declares the field
    pub declared_by: ClassIdx,
    /// Field value
    pub value: Value<Reference>,
}

/// Payload of an [`Instance`].
#[derive(Debug, Clone, PartialEq)]
pub enum InstanceKind {
    /// A plain object
    Object {
        /// Raw field bytes as dumped
        data: Vec<u8>,
        /// Field values decoded from `data`: the class's own fields first, then each
        /// superclass's. Empty when field decoding is disabled or the class is unknown.
        fields: Vec<FieldValue>,
    },
    /// An array of references
    ObjectArray {
        /// Elements
        elements: Vec<Reference>,
    },
    /// An array of primitives
    PrimitiveArray {
        /// Element type
        element_type: BasicType,
        /// Element count
        length: u32,
        /// Packed big-endian element data; `None` for arrays dumped without data
        data: Option<Vec<u8>>,
    },
}

/// An instance or array of the dump.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    /// Object id
    pub id: ObjectId,
    /// Heap the instance was read in
    pub heap: u32,
    /// Absolute file offset of the instance's sub-record
    pub offset: u64,
    /// Class of the object; for primitive arrays the matching array class (`"int[]"`...)
    /// when the dump contains one, [`Reference::Null`] otherwise
    pub class: Reference,
    /// Stack trace serial number
    pub stack_serial: u32,
    /// Payload
    pub kind: InstanceKind,
    pub(crate) size: u64,
}

impl Instance {
    /// Shallow size in bytes: the class's instance size for objects, element count times
    /// element size for arrays.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns `true` for object and primitive arrays.
    #[must_use]
    pub fn is_array(&self) -> bool {
        !matches!(self.kind, InstanceKind::Object { .. })
    }

    /// Element count for arrays.
    #[must_use]
    pub fn array_length(&self) -> Option<usize> {
        match &self.kind {
            InstanceKind::Object { .. } => None,
            InstanceKind::ObjectArray { elements } => Some(elements.len()),
            InstanceKind::PrimitiveArray { length, .. } => Some(*length as usize),
        }
    }

    /// Decoded field values of an object, own class first.
    #[must_use]
    pub fn fields(&self) -> &[FieldValue] {
        match &self.kind {
            InstanceKind::Object { fields, .. } => fields,
            _ => &[],
        }
    }

    /// First decoded field called `name`, searching the object's own class before its
    /// superclasses.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value<Reference>> {
        self.fields()
            .iter()
            .find(|f| &*f.name == name)
            .map(|f| &f.value)
    }

    /// Elements of an object array.
    #[must_use]
    pub fn elements(&self) -> Option<&[Reference]> {
        match &self.kind {
            InstanceKind::ObjectArray { elements } => Some(elements),
            _ => None,
        }
    }

    /// Decoded elements of a primitive array dumped with its data.
    #[must_use]
    pub fn array_values(&self) -> Option<ArrayValues> {
        match &self.kind {
            InstanceKind::PrimitiveArray {
                element_type,
                data: Some(data),
                ..
            } => ArrayValues::decode(*element_type, data),
            _ => None,
        }
    }

    /// Every outgoing reference of the instance: field values or array elements.
    pub fn references(&self) -> impl Iterator<Item = &Reference> {
        let fields = self.fields().iter().filter_map(|f| f.value.as_object());
        let elements = self.elements().unwrap_or(&[]).iter();
        fields.chain(elements)
    }
}

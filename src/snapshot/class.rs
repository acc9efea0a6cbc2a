//! Class objects.

use std::sync::Arc;

use crate::hprof::{BasicType, ObjectId, Value};

use super::reference::{ClassIdx, InstanceIdx, Reference};

/// Instance field descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Id of the name string
    pub name_id: ObjectId,
    /// Field name, shared with every decoded value of this field
    pub name: Arc<str>,
    /// Field type
    pub ty: BasicType,
}

impl Field {
    /// Size in bytes of one value of this field.
    #[must_use]
    pub fn size(&self, id_size: usize) -> usize {
        self.ty.size(id_size)
    }
}

/// Static field with its value.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticField {
    /// Id of the name string
    pub name_id: ObjectId,
    /// Field name
    pub name: Arc<str>,
    /// Field value
    pub value: Value<Reference>,
}

/// A class object of the dump.
#[derive(Debug, Clone)]
pub struct ClassObj {
    /// Class object id
    pub id: ObjectId,
    /// Class name as registered by LOAD CLASS, or `"<unnamed class 0x..>"`
    pub name: String,
    /// Heap the class dump was read in
    pub heap: u32,
    /// Absolute file offset of the class dump
    pub offset: u64,
    /// Class serial number from LOAD CLASS, if the class was loaded by one
    pub serial: Option<u32>,
    /// Stack trace serial number
    pub stack_serial: u32,
    /// Superclass
    pub super_class: Reference,
    /// Defining class loader
    pub class_loader: Reference,
    /// Signers object id
    pub signers_id: ObjectId,
    /// Protection domain object id
    pub protection_domain_id: ObjectId,
    /// Instance size in bytes
    pub instance_size: u32,
    /// Constant pool entries (index, value)
    pub constants: Vec<(u16, Value<Reference>)>,
    /// Static fields
    pub statics: Vec<StaticField>,
    /// Instance fields declared by this class, declaration order
    pub fields: Vec<Field>,
    pub(crate) subclasses: Vec<ClassIdx>,
    pub(crate) instances: Vec<InstanceIdx>,
}

impl ClassObj {
    /// Direct subclasses present in the dump.
    #[must_use]
    pub fn subclasses(&self) -> &[ClassIdx] {
        &self.subclasses
    }

    /// Instances whose class is exactly this class.
    #[must_use]
    pub fn instances(&self) -> &[InstanceIdx] {
        &self.instances
    }

    /// Number of instances whose class is exactly this class.
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Returns `true` for array classes.
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.name.ends_with("[]") || self.name.starts_with('[')
    }

    /// Size in bytes of the field data this class itself contributes to an instance.
    #[must_use]
    pub fn fields_size(&self, id_size: usize) -> usize {
        self.fields.iter().map(|f| f.size(id_size)).sum()
    }

    /// Looks up a declared instance field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| &*f.name == name)
    }

    /// Looks up a static field value by name.
    #[must_use]
    pub fn static_value(&self, name: &str) -> Option<&Value<Reference>> {
        self.statics
            .iter()
            .find(|f| &*f.name == name)
            .map(|f| &f.value)
    }
}

/// Canonical dotted form of a class name.
///
/// Accepts source names (`java.lang.String`, `int[]`), internal names (`java/lang/String`)
/// and array descriptors (`[I`, `[[Ljava/lang/Object;`).
#[must_use]
pub fn normalize_class_name(name: &str) -> String {
    let dims = name.bytes().take_while(|&b| b == b'[').count();
    if dims == 0 {
        return name.replace('/', ".");
    }

    let element = &name[dims..];
    let base = match element {
        "Z" => "boolean".to_string(),
        "C" => "char".to_string(),
        "F" => "float".to_string(),
        "D" => "double".to_string(),
        "B" => "byte".to_string(),
        "S" => "short".to_string(),
        "I" => "int".to_string(),
        "J" => "long".to_string(),
        _ => match element.strip_prefix('L').and_then(|e| e.strip_suffix(';')) {
            Some(class) => class.replace('/', "."),
            None => return name.replace('/', "."),
        },
    };

    let mut normalized = base;
    for _ in 0..dims {
        normalized.push_str("[]");
    }
    normalized
}

//! Basic types and values stored in heap dumps.

use std::fmt;

use strum::{EnumIter, FromRepr};

use crate::{file::parser::Parser, Result};

/// Object identifier as written in the dump, widened to 64 bits.
///
/// The value `0` is the null reference.
pub type ObjectId = u64;

/// Basic type codes used by field descriptors, static values and primitive arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumIter)]
#[repr(u8)]
pub enum BasicType {
    /// Object reference, `id_size` bytes wide
    Object = 2,
    /// `boolean`, 1 byte
    Boolean = 4,
    /// `char`, 2 bytes (UTF-16 code unit)
    Char = 5,
    /// `float`, 4 bytes
    Float = 6,
    /// `double`, 8 bytes
    Double = 7,
    /// `byte`, 1 byte
    Byte = 8,
    /// `short`, 2 bytes
    Short = 9,
    /// `int`, 4 bytes
    Int = 10,
    /// `long`, 8 bytes
    Long = 11,
}

impl BasicType {
    /// Look up a type by its on-disk code.
    #[must_use]
    pub fn from_code(code: u8) -> Option<BasicType> {
        BasicType::from_repr(code)
    }

    /// Size in bytes of one value of this type, given the dump's id size.
    #[must_use]
    pub fn size(self, id_size: usize) -> usize {
        match self {
            BasicType::Object => id_size,
            BasicType::Boolean | BasicType::Byte => 1,
            BasicType::Char | BasicType::Short => 2,
            BasicType::Float | BasicType::Int => 4,
            BasicType::Double | BasicType::Long => 8,
        }
    }

    /// Java source name of the type (`"int"`, `"boolean"`, ...).
    #[must_use]
    pub fn java_name(self) -> &'static str {
        match self {
            BasicType::Object => "java.lang.Object",
            BasicType::Boolean => "boolean",
            BasicType::Char => "char",
            BasicType::Float => "float",
            BasicType::Double => "double",
            BasicType::Byte => "byte",
            BasicType::Short => "short",
            BasicType::Int => "int",
            BasicType::Long => "long",
        }
    }

    /// Class name under which the runtime registers arrays of this type, e.g. `"int[]"`.
    #[must_use]
    pub fn array_class_name(self) -> String {
        format!("{}[]", self.java_name())
    }
}

impl fmt::Display for BasicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.java_name())
    }
}

/// A single typed value.
///
/// The reference representation is generic: decoded records carry raw [`ObjectId`]s, while
/// a built snapshot carries [`crate::Reference`]s resolved against its object table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<R = ObjectId> {
    /// Object reference
    Object(R),
    /// `boolean`
    Boolean(bool),
    /// `char`
    Char(u16),
    /// `float`
    Float(f32),
    /// `double`
    Double(f64),
    /// `byte`
    Byte(i8),
    /// `short`
    Short(i16),
    /// `int`
    Int(i32),
    /// `long`
    Long(i64),
}

impl Value<ObjectId> {
    /// Decode one value of type `ty` from `parser`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the parser runs out of data.
    pub fn decode(parser: &mut Parser<'_>, ty: BasicType, id_size: usize) -> Result<Self> {
        Ok(match ty {
            BasicType::Object => Value::Object(parser.read_id(id_size)?),
            BasicType::Boolean => Value::Boolean(parser.read_be::<u8>()? != 0),
            BasicType::Char => Value::Char(parser.read_be()?),
            BasicType::Float => Value::Float(parser.read_be()?),
            BasicType::Double => Value::Double(parser.read_be()?),
            BasicType::Byte => Value::Byte(parser.read_be()?),
            BasicType::Short => Value::Short(parser.read_be()?),
            BasicType::Int => Value::Int(parser.read_be()?),
            BasicType::Long => Value::Long(parser.read_be()?),
        })
    }
}

impl<R> Value<R> {
    /// The basic type of this value.
    pub fn basic_type(&self) -> BasicType {
        match self {
            Value::Object(_) => BasicType::Object,
            Value::Boolean(_) => BasicType::Boolean,
            Value::Char(_) => BasicType::Char,
            Value::Float(_) => BasicType::Float,
            Value::Double(_) => BasicType::Double,
            Value::Byte(_) => BasicType::Byte,
            Value::Short(_) => BasicType::Short,
            Value::Int(_) => BasicType::Int,
            Value::Long(_) => BasicType::Long,
        }
    }

    /// Returns the reference if this is an object value.
    pub fn as_object(&self) -> Option<&R> {
        match self {
            Value::Object(reference) => Some(reference),
            _ => None,
        }
    }

    /// Convert the reference representation, leaving primitive values untouched.
    pub fn map_object<S>(self, f: impl FnOnce(R) -> S) -> Value<S> {
        match self {
            Value::Object(reference) => Value::Object(f(reference)),
            Value::Boolean(v) => Value::Boolean(v),
            Value::Char(v) => Value::Char(v),
            Value::Float(v) => Value::Float(v),
            Value::Double(v) => Value::Double(v),
            Value::Byte(v) => Value::Byte(v),
            Value::Short(v) => Value::Short(v),
            Value::Int(v) => Value::Int(v),
            Value::Long(v) => Value::Long(v),
        }
    }

    /// Widen an integral value (`byte`, `char`, `short`, `int`, `long`) to `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(v) => Some(i64::from(*v)),
            Value::Char(v) => Some(i64::from(*v)),
            Value::Short(v) => Some(i64::from(*v)),
            Value::Int(v) => Some(i64::from(*v)),
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }
}

impl<R: fmt::Display> fmt::Display for Value<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Object(reference) => write!(f, "{reference}"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Char(v) => match char::from_u32(u32::from(*v)) {
                Some(c) => write!(f, "'{c}'"),
                None => write!(f, "'\\u{v:04x}'"),
            },
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Byte(v) => write!(f, "{v}"),
            Value::Short(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
        }
    }
}

/// Decoded contents of a primitive array.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayValues {
    /// `boolean[]`
    Boolean(Vec<bool>),
    /// `char[]`
    Char(Vec<u16>),
    /// `float[]`
    Float(Vec<f32>),
    /// `double[]`
    Double(Vec<f64>),
    /// `byte[]`
    Byte(Vec<i8>),
    /// `short[]`
    Short(Vec<i16>),
    /// `int[]`
    Int(Vec<i32>),
    /// `long[]`
    Long(Vec<i64>),
}

impl ArrayValues {
    /// Decode `data` as a packed big-endian array of `element_type`.
    ///
    /// Returns `None` for [`BasicType::Object`], which is not a primitive element type, or if
    /// `data` is not a whole number of elements.
    #[must_use]
    pub fn decode(element_type: BasicType, data: &[u8]) -> Option<ArrayValues> {
        fn collect<T>(data: &[u8], size: usize, f: impl Fn(&[u8]) -> T) -> Vec<T> {
            data.chunks_exact(size).map(f).collect()
        }

        let size = element_type.size(0);
        if element_type == BasicType::Object || data.len() % size != 0 {
            return None;
        }

        // chunks_exact guarantees each chunk has exactly `size` bytes
        Some(match element_type {
            BasicType::Boolean => ArrayValues::Boolean(collect(data, 1, |c| c[0] != 0)),
            BasicType::Byte => ArrayValues::Byte(collect(data, 1, |c| i8::from_be_bytes([c[0]]))),
            BasicType::Char => {
                ArrayValues::Char(collect(data, 2, |c| u16::from_be_bytes([c[0], c[1]])))
            }
            BasicType::Short => {
                ArrayValues::Short(collect(data, 2, |c| i16::from_be_bytes([c[0], c[1]])))
            }
            BasicType::Int => ArrayValues::Int(collect(data, 4, |c| {
                i32::from_be_bytes([c[0], c[1], c[2], c[3]])
            })),
            BasicType::Float => ArrayValues::Float(collect(data, 4, |c| {
                f32::from_be_bytes([c[0], c[1], c[2], c[3]])
            })),
            BasicType::Long => ArrayValues::Long(collect(data, 8, |c| {
                i64::from_be_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]])
            })),
            BasicType::Double => ArrayValues::Double(collect(data, 8, |c| {
                f64::from_be_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]])
            })),
            BasicType::Object => return None,
        })
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            ArrayValues::Boolean(v) => v.len(),
            ArrayValues::Char(v) => v.len(),
            ArrayValues::Float(v) => v.len(),
            ArrayValues::Double(v) => v.len(),
            ArrayValues::Byte(v) => v.len(),
            ArrayValues::Short(v) => v.len(),
            ArrayValues::Int(v) => v.len(),
            ArrayValues::Long(v) => v.len(),
        }
    }

    /// Returns `true` if the array has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

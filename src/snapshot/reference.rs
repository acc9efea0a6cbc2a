//! Arena indices and object references.

use std::fmt;

use crate::hprof::ObjectId;

/// Index of a class in the snapshot's class arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassIdx(pub(crate) usize);

/// Index of an instance in the snapshot's instance arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceIdx(pub(crate) usize);

impl ClassIdx {
    /// Position in [`crate::Snapshot::classes`].
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl InstanceIdx {
    /// Position in [`crate::Snapshot::instances`].
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle to an object held by a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectRef {
    /// A class object
    Class(ClassIdx),
    /// An instance or array
    Instance(InstanceIdx),
}

impl ObjectRef {
    /// The class index, if this refers to a class object.
    #[must_use]
    pub fn as_class(self) -> Option<ClassIdx> {
        match self {
            ObjectRef::Class(idx) => Some(idx),
            ObjectRef::Instance(_) => None,
        }
    }

    /// The instance index, if this refers to an instance or array.
    #[must_use]
    pub fn as_instance(self) -> Option<InstanceIdx> {
        match self {
            ObjectRef::Instance(idx) => Some(idx),
            ObjectRef::Class(_) => None,
        }
    }
}

/// A reference from one object (or root) to another.
///
/// Every reference starts out [`Reference::Unresolved`] while the record stream is read.
/// Resolution turns it into [`Reference::Resolved`] when the id names an object in the dump
/// and into [`Reference::Unknown`] otherwise, so a built snapshot never holds unresolved
/// references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reference {
    /// The null reference (id 0)
    Null,
    /// Not looked up yet
    Unresolved(ObjectId),
    /// Points to an object of the snapshot
    Resolved {
        /// Object id as written in the dump
        id: ObjectId,
        /// The referenced object
        target: ObjectRef,
    },
    /// Points to an id that no object in the dump defines
    Unknown(ObjectId),
}

impl Reference {
    /// Unresolved reference to `id`, or [`Reference::Null`] for id 0.
    #[must_use]
    pub fn from_id(id: ObjectId) -> Self {
        if id == 0 {
            Reference::Null
        } else {
            Reference::Unresolved(id)
        }
    }

    /// The referenced object id (0 for null).
    #[must_use]
    pub fn id(&self) -> ObjectId {
        match self {
            Reference::Null => 0,
            Reference::Unresolved(id) | Reference::Unknown(id) | Reference::Resolved { id, .. } => {
                *id
            }
        }
    }

    /// The referenced object, if the reference resolved.
    #[must_use]
    pub fn target(&self) -> Option<ObjectRef> {
        match self {
            Reference::Resolved { target, .. } => Some(*target),
            _ => None,
        }
    }

    /// The referenced class, if the reference resolved to a class object.
    #[must_use]
    pub fn class(&self) -> Option<ClassIdx> {
        self.target().and_then(ObjectRef::as_class)
    }

    /// The referenced instance, if the reference resolved to an instance or array.
    #[must_use]
    pub fn instance(&self) -> Option<InstanceIdx> {
        self.target().and_then(ObjectRef::as_instance)
    }

    /// Returns `true` for the null reference.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Reference::Null)
    }

    /// Returns `true` if the reference points to an object of the snapshot.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Reference::Resolved { .. })
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Null => f.write_str("null"),
            Reference::Unknown(id) => write!(f, "0x{id:x} (unknown)"),
            Reference::Unresolved(id) | Reference::Resolved { id, .. } => write!(f, "0x{id:x}"),
        }
    }
}

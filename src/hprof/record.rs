//! Decoded record types.

use strum::{Display, EnumIter};

use super::types::{BasicType, ObjectId, Value};

/// One decoded unit of the record stream.
///
/// Heap dump sub-records are yielded as records of their own, in file order, right after the
/// [`RecordKind::HeapDumpStart`] of the segment that contains them.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Absolute file offset of the record's tag byte
    pub offset: u64,
    /// Microseconds since the header timestamp; `None` for heap dump sub-records
    pub time: Option<u32>,
    /// The decoded payload
    pub kind: RecordKind,
}

/// Decoded payload of a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordKind {
    /// String definition
    String {
        /// String id
        id: ObjectId,
        /// Content, decoded lossily as UTF-8
        value: String,
    },
    /// Class load event
    LoadClass {
        /// Class serial number
        serial: u32,
        /// Class object id
        class_id: ObjectId,
        /// Stack trace serial number
        stack_serial: u32,
        /// Id of the class name string
        name_id: ObjectId,
    },
    /// Class unload event
    UnloadClass {
        /// Class serial number
        serial: u32,
    },
    /// Stack frame definition
    StackFrame(StackFrameRecord),
    /// Stack trace definition
    StackTrace(StackTraceRecord),
    /// Thread start event
    StartThread(StartThreadRecord),
    /// Thread end event
    EndThread {
        /// Thread serial number
        serial: u32,
    },
    /// Start of a heap dump or heap dump segment; its sub-records follow
    HeapDumpStart {
        /// `true` for HEAP DUMP SEGMENT, `false` for a monolithic HEAP DUMP
        segment: bool,
        /// Payload length of the segment
        length: u64,
    },
    /// End of a segmented heap dump
    HeapDumpEnd,
    /// Heap context switch
    HeapDumpInfo {
        /// Heap id
        heap_id: u32,
        /// Id of the heap name string
        name_id: ObjectId,
    },
    /// GC root sub-record
    Root(RootRecord),
    /// Class object sub-record
    ClassDump(ClassDump),
    /// Instance sub-record
    InstanceDump(InstanceDump),
    /// Object array sub-record
    ObjectArrayDump(ObjectArrayDump),
    /// Primitive array sub-record
    PrimitiveArrayDump(PrimitiveArrayDump),
    /// A record whose payload was skipped without interpretation
    Skipped {
        /// Raw tag byte
        tag: u8,
        /// Payload length
        length: u64,
    },
}

/// Stack frame definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrameRecord {
    /// Frame id
    pub frame_id: ObjectId,
    /// Id of the method name string
    pub method_name_id: ObjectId,
    /// Id of the method signature string
    pub signature_id: ObjectId,
    /// Id of the source file name string
    pub source_file_id: ObjectId,
    /// Serial number of the declaring class
    pub class_serial: u32,
    /// Line number; `0` or negative values encode unknown, compiled or native frames
    pub line: i32,
}

/// Stack trace definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackTraceRecord {
    /// Stack trace serial number
    pub serial: u32,
    /// Serial number of the thread the trace belongs to
    pub thread_serial: u32,
    /// Frame ids, innermost first
    pub frame_ids: Vec<ObjectId>,
}

/// Thread start event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartThreadRecord {
    /// Thread serial number
    pub serial: u32,
    /// Thread object id
    pub thread_id: ObjectId,
    /// Stack trace serial number
    pub stack_serial: u32,
    /// Id of the thread name string
    pub name_id: ObjectId,
    /// Id of the thread group name string
    pub group_name_id: ObjectId,
    /// Id of the parent thread group name string
    pub parent_group_name_id: ObjectId,
}

/// Kinds of GC roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
pub enum RootKind {
    /// Root of unknown origin
    #[strum(serialize = "Unknown")]
    Unknown,
    /// JNI global reference
    #[strum(serialize = "JNI Global")]
    JniGlobal,
    /// JNI local reference
    #[strum(serialize = "JNI Local")]
    JniLocal,
    /// Java stack frame
    #[strum(serialize = "Java Frame")]
    JavaFrame,
    /// Native stack
    #[strum(serialize = "Native Stack")]
    NativeStack,
    /// System class
    #[strum(serialize = "System Class")]
    SystemClass,
    /// Thread block
    #[strum(serialize = "Thread Block")]
    ThreadBlock,
    /// Object used as a monitor
    #[strum(serialize = "Busy Monitor")]
    BusyMonitor,
    /// Thread object
    #[strum(serialize = "Thread Object")]
    ThreadObject,
    /// Interned string
    #[strum(serialize = "Interned String")]
    InternedString,
    /// Awaiting finalization
    #[strum(serialize = "Finalizing")]
    Finalizing,
    /// Held by the debugger
    #[strum(serialize = "Debugger")]
    Debugger,
    /// Held by reference cleanup
    #[strum(serialize = "Reference Cleanup")]
    ReferenceCleanup,
    /// Held by the VM
    #[strum(serialize = "VM Internal")]
    VmInternal,
    /// Monitor held through JNI
    #[strum(serialize = "JNI Monitor")]
    JniMonitor,
    /// Unreachable object
    #[strum(serialize = "Unreachable")]
    Unreachable,
}

/// GC root sub-record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootRecord {
    /// Root kind
    pub kind: RootKind,
    /// Id of the rooted object
    pub object_id: ObjectId,
    /// Thread serial number, for thread-related roots
    pub thread_serial: Option<u32>,
    /// Frame number in the thread's stack trace (or stack depth for JNI monitors)
    pub frame: Option<u32>,
    /// Stack trace serial number, for thread objects
    pub stack_serial: Option<u32>,
    /// JNI global reference id, for JNI globals
    pub jni_ref: Option<ObjectId>,
}

impl RootRecord {
    /// A root carrying nothing but its object id.
    #[must_use]
    pub fn simple(kind: RootKind, object_id: ObjectId) -> Self {
        RootRecord {
            kind,
            object_id,
            thread_serial: None,
            frame: None,
            stack_serial: None,
            jni_ref: None,
        }
    }
}

/// Instance field descriptor in a class dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRecord {
    /// Id of the field name string
    pub name_id: ObjectId,
    /// Field type
    pub ty: BasicType,
}

/// Static field with its value in a class dump.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticFieldRecord {
    /// Id of the field name string
    pub name_id: ObjectId,
    /// Field value
    pub value: Value,
}

/// Class object sub-record.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDump {
    /// Class object id
    pub class_id: ObjectId,
    /// Stack trace serial number
    pub stack_serial: u32,
    /// Superclass object id (`0` for `java.lang.Object`)
    pub super_id: ObjectId,
    /// Class loader object id (`0` for the bootstrap loader)
    pub loader_id: ObjectId,
    /// Signers object id
    pub signers_id: ObjectId,
    /// Protection domain object id
    pub protection_domain_id: ObjectId,
    /// Instance size in bytes
    pub instance_size: u32,
    /// Constant pool entries (index, value)
    pub constants: Vec<(u16, Value)>,
    /// Static fields
    pub statics: Vec<StaticFieldRecord>,
    /// Instance field descriptors, declaration order
    pub fields: Vec<FieldRecord>,
}

/// Instance sub-record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDump {
    /// Object id
    pub object_id: ObjectId,
    /// Stack trace serial number
    pub stack_serial: u32,
    /// Class object id
    pub class_id: ObjectId,
    /// Raw field values: this class's fields, then the superclass's, and so on
    pub data: Vec<u8>,
}

/// Object array sub-record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectArrayDump {
    /// Object id
    pub object_id: ObjectId,
    /// Stack trace serial number
    pub stack_serial: u32,
    /// Array class object id
    pub class_id: ObjectId,
    /// Element ids
    pub elements: Vec<ObjectId>,
}

/// Primitive array sub-record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimitiveArrayDump {
    /// Object id
    pub object_id: ObjectId,
    /// Stack trace serial number
    pub stack_serial: u32,
    /// Element type
    pub element_type: BasicType,
    /// Element count
    pub length: u32,
    /// Packed big-endian element data; `None` when dumped without data
    pub data: Option<Vec<u8>>,
}

impl RecordKind {
    /// The object id a sub-record defines or roots, if any.
    #[must_use]
    pub fn object_id(&self) -> Option<ObjectId> {
        match self {
            RecordKind::Root(root) => Some(root.object_id),
            RecordKind::ClassDump(class) => Some(class.class_id),
            RecordKind::InstanceDump(instance) => Some(instance.object_id),
            RecordKind::ObjectArrayDump(array) => Some(array.object_id),
            RecordKind::PrimitiveArrayDump(array) => Some(array.object_id),
            _ => None,
        }
    }

    /// Returns `true` for kinds that only occur inside a heap dump segment.
    #[must_use]
    pub fn is_sub_record(&self) -> bool {
        matches!(
            self,
            RecordKind::HeapDumpInfo { .. }
                | RecordKind::Root(_)
                | RecordKind::ClassDump(_)
                | RecordKind::InstanceDump(_)
                | RecordKind::ObjectArrayDump(_)
                | RecordKind::PrimitiveArrayDump(_)
        )
    }
}

//! Record and sub-record tags.

use strum::{Display, EnumIter, FromRepr};

/// Tags of top-level records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumIter, Display)]
#[repr(u8)]
pub enum Tag {
    /// UTF-8 string definition
    #[strum(serialize = "STRING IN UTF8")]
    String = 0x01,
    /// Class load event, binds a class object id to a name string
    #[strum(serialize = "LOAD CLASS")]
    LoadClass = 0x02,
    /// Class unload event
    #[strum(serialize = "UNLOAD CLASS")]
    UnloadClass = 0x03,
    /// Stack frame definition
    #[strum(serialize = "STACK FRAME")]
    StackFrame = 0x04,
    /// Stack trace definition
    #[strum(serialize = "STACK TRACE")]
    StackTrace = 0x05,
    /// Allocation sites
    #[strum(serialize = "ALLOC SITES")]
    AllocSites = 0x06,
    /// Heap summary
    #[strum(serialize = "HEAP SUMMARY")]
    HeapSummary = 0x07,
    /// Thread start event
    #[strum(serialize = "START THREAD")]
    StartThread = 0x0A,
    /// Thread end event
    #[strum(serialize = "END THREAD")]
    EndThread = 0x0B,
    /// Complete heap dump, payload is a sequence of sub-records
    #[strum(serialize = "HEAP DUMP")]
    HeapDump = 0x0C,
    /// CPU samples
    #[strum(serialize = "CPU SAMPLES")]
    CpuSamples = 0x0D,
    /// Control settings
    #[strum(serialize = "CONTROL SETTINGS")]
    ControlSettings = 0x0E,
    /// One segment of a heap dump, payload is a sequence of sub-records
    #[strum(serialize = "HEAP DUMP SEGMENT")]
    HeapDumpSegment = 0x1C,
    /// Marks the end of a segmented heap dump
    #[strum(serialize = "HEAP DUMP END")]
    HeapDumpEnd = 0x2C,
}

/// Tags of heap dump sub-records.
///
/// Tags `0x89..=0x90`, `0xC3` and `0xFE` are Android extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumIter, Display)]
#[repr(u8)]
pub enum SubTag {
    /// Root held by a JNI global reference
    RootJniGlobal = 0x01,
    /// Root held by a JNI local reference
    RootJniLocal = 0x02,
    /// Root held by a Java stack frame
    RootJavaFrame = 0x03,
    /// Root held by a native stack
    RootNativeStack = 0x04,
    /// System class that can never be unloaded
    RootStickyClass = 0x05,
    /// Root held by a thread block
    RootThreadBlock = 0x06,
    /// Object used as a monitor
    RootMonitorUsed = 0x07,
    /// Thread object
    RootThreadObject = 0x08,
    /// Class object dump
    ClassDump = 0x20,
    /// Instance dump
    InstanceDump = 0x21,
    /// Object array dump
    ObjectArrayDump = 0x22,
    /// Primitive array dump
    PrimitiveArrayDump = 0x23,
    /// Interned string
    RootInternedString = 0x89,
    /// Object awaiting finalization
    RootFinalizing = 0x8A,
    /// Object held by the debugger
    RootDebugger = 0x8B,
    /// Object held by reference cleanup
    RootReferenceCleanup = 0x8C,
    /// Object held by the VM internally
    RootVmInternal = 0x8D,
    /// Monitor held through JNI
    RootJniMonitor = 0x8E,
    /// Unreachable object kept for analysis
    RootUnreachable = 0x90,
    /// Primitive array dumped without its element data
    PrimitiveArrayNoData = 0xC3,
    /// Switches the heap subsequent objects are attributed to
    HeapDumpInfo = 0xFE,
    /// Root of unknown origin
    RootUnknown = 0xFF,
}

impl Tag {
    /// Look up a tag by its on-disk code.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Tag> {
        Tag::from_repr(code)
    }

    /// Returns `true` for tags whose payload is a sequence of heap dump sub-records.
    #[must_use]
    pub fn is_heap_dump(self) -> bool {
        matches!(self, Tag::HeapDump | Tag::HeapDumpSegment)
    }
}

impl SubTag {
    /// Look up a sub-record tag by its on-disk code.
    #[must_use]
    pub fn from_code(code: u8) -> Option<SubTag> {
        SubTag::from_repr(code)
    }
}

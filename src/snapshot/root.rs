//! GC roots.

use crate::hprof::{ObjectId, RootKind};

use super::reference::Reference;

/// An object the garbage collector treats as live by definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GcRoot {
    /// Root kind
    pub kind: RootKind,
    /// Id of the rooted object
    pub id: ObjectId,
    /// The rooted object
    pub target: Reference,
    /// Heap that was current when the root was read
    pub heap: u32,
    /// Thread serial number, for thread-related roots
    pub thread_serial: Option<u32>,
    /// Frame number in the thread's stack trace (stack depth for JNI monitors)
    pub frame: Option<u32>,
    /// JNI global reference id, for JNI globals
    pub jni_ref: Option<ObjectId>,
    /// Absolute file offset of the root's sub-record
    pub offset: u64,
}

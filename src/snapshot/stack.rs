//! Stack frames, stack traces and threads.

use std::fmt;

use crate::hprof::ObjectId;

/// Line number of a stack frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineNumber {
    /// A source line
    Line(u32),
    /// No line information
    Unknown,
    /// Compiled method
    Compiled,
    /// Native method
    Native,
}

impl From<i32> for LineNumber {
    fn from(line: i32) -> Self {
        match line {
            -2 => LineNumber::Compiled,
            -3 => LineNumber::Native,
            line if line > 0 => LineNumber::Line(line.unsigned_abs()),
            _ => LineNumber::Unknown,
        }
    }
}

/// One frame of a stack trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    /// Frame id
    pub id: ObjectId,
    /// Method name
    pub method: String,
    /// Method signature
    pub signature: String,
    /// Source file name
    pub source_file: String,
    /// Serial number of the declaring class
    pub class_serial: u32,
    /// Line information
    pub line: LineNumber,
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} (", self.method, self.signature)?;
        match self.line {
            LineNumber::Line(line) => write!(f, "{}:{line})", self.source_file),
            LineNumber::Unknown => f.write_str("Unknown Source)"),
            LineNumber::Compiled => f.write_str("Compiled method)"),
            LineNumber::Native => f.write_str("Native method)"),
        }
    }
}

/// A stack trace: frame ids, innermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackTrace {
    /// Stack trace serial number
    pub serial: u32,
    /// Serial number of the thread the trace belongs to
    pub thread_serial: u32,
    /// Frame ids, look them up with [`crate::Snapshot::stack_frame`]
    pub frames: Vec<ObjectId>,
}

/// A thread known from START THREAD records or thread-object roots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadObj {
    /// Thread serial number
    pub serial: u32,
    /// Thread object id
    pub id: ObjectId,
    /// Serial number of the thread's stack trace
    pub stack_serial: u32,
    /// Thread name, when a START THREAD record named it
    pub name: Option<String>,
    /// Thread group name
    pub group_name: Option<String>,
    /// Parent thread group name
    pub parent_group_name: Option<String>,
}

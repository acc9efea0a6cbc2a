//! # heapscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types from the
//! heapscope library. Import this module to get quick access to the essential types for heap
//! dump analysis.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all heapscope operations
pub use crate::Error;

/// The result type used throughout heapscope
pub use crate::Result;

/// Configuration for mapping and parsing a dump
pub use crate::ParseOptions;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Main entry point for heap dump analysis
pub use crate::Snapshot;

/// Low-level file access
pub use crate::{Parser, ShardManager};

/// Streaming access to the record sequence
pub use crate::hprof::{Header, Record, RecordKind, RecordReader};

// ================================================================================================
// Heap Graph
// ================================================================================================

/// Objects of the graph
pub use crate::snapshot::{
    ClassObj, Field, FieldValue, GcRoot, HeapObject, HeapView, Instance, InstanceKind,
    StaticField,
};

/// Handles and references between objects
pub use crate::snapshot::{ClassIdx, InstanceIdx, ObjectRef, Reference};

/// Threads and stacks
pub use crate::snapshot::{LineNumber, StackFrame, StackTrace, ThreadObj};

/// Values and identifiers
pub use crate::hprof::{ArrayValues, BasicType, ObjectId, RootKind, Value};

// ================================================================================================
// Diagnostics
// ================================================================================================

/// Non-fatal findings
pub use crate::diagnostics::{
    Diagnostic, DiagnosticCategory, DiagnosticSeverity, DiagnosticSink, Diagnostics, LogSink,
};

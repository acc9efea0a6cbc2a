// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(clippy::too_many_arguments)]
//#![deny(unsafe_code)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # heapscope
//!
//! A parser for HPROF heap dumps, as written by the JVM (`jmap`, `HeapDumpOnOutOfMemoryError`)
//! and by Android runtimes (`am dumpheap`, including the Android-specific heap partitioning).
//! `heapscope` turns a dump of any size into a fully resolved, immutable object graph.
//!
//! ## Features
//!
//! - **📦 Sharded memory mapping** - Dumps larger than a single mapping are served through
//!   bounded, overlapping windows mapped on demand
//! - **🔍 Complete record coverage** - Strings, class loads, stack frames and traces, threads,
//!   every root kind and every heap dump sub-record, Android extensions included
//! - **🧩 Resolved object graph** - Classes, instances and arrays cross-linked by index, with
//!   decoded instance fields and per-heap views
//! - **🛡️ Diagnostics instead of panics** - Dangling references and inconsistent records are
//!   collected, not fatal
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use heapscope::prelude::*;
//!
//! let snapshot = Snapshot::from_file("app.hprof")?;
//! println!(
//!     "{} classes, {} instances, {} roots",
//!     snapshot.class_count(),
//!     snapshot.instance_count(),
//!     snapshot.gc_roots().len()
//! );
//! # Ok::<(), heapscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `heapscope` is organized in three layers:
//!
//! - [`file`] - Sharded, memory-mapped access to the dump by absolute offset
//! - [`hprof`] - Lazy decoding of the record stream into typed [`hprof::Record`]s
//! - [`snapshot`] - Assembly of records into a resolved [`Snapshot`]
//!
//! Alongside them, [`ParseOptions`] controls window geometry and strictness, and
//! [`Diagnostics`] collects every non-fatal finding of a parse.
//!
//! ### Custom Window Geometry
//!
//! ```rust,no_run
//! use heapscope::{ParseOptions, Snapshot};
//!
//! // 256 MiB windows with 4 KiB of overlap
//! let options = ParseOptions::sharded(256 << 20, 4096);
//! let snapshot = Snapshot::from_file_with_options("app.hprof", &options)?;
//!
//! for heap in snapshot.heaps() {
//!     println!("{}: {} instances", heap.name(), heap.instance_count());
//! }
//! # Ok::<(), heapscope::Error>(())
//! ```
//!
//! ### Streaming Records
//!
//! Consumers that do not need the graph can walk the records directly; see
//! [`hprof::RecordReader`].
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`]. Structural problems (bad header, unknown
//! tags, truncation, length mismatches) abort the parse with an [`Error`]; everything else is
//! reported through [`Snapshot::diagnostics`].

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Parse configuration.
pub mod config;

/// Non-fatal findings collected while parsing.
pub mod diagnostics;

/// Sharded, memory-mapped file access.
pub mod file;

/// HPROF record decoding.
pub mod hprof;

/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust,no_run
/// use heapscope::prelude::*;
///
/// let snapshot = Snapshot::from_file("app.hprof")?;
/// let strings = snapshot.find_class("java.lang.String").map_or(0, ClassObj::instance_count);
/// # Ok::<(), heapscope::Error>(())
/// ```
pub mod prelude;

/// The resolved heap graph.
pub mod snapshot;

/// `heapscope` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `heapscope` Error type
///
/// # Example
///
/// ```rust,no_run
/// use heapscope::{Error, Snapshot};
///
/// match Snapshot::from_file("app.hprof") {
///     Ok(snapshot) => println!("{} objects", snapshot.instance_count()),
///     Err(Error::InvalidHeader(reason)) => println!("not a heap dump: {reason}"),
///     Err(Error::Truncated { offset, .. }) => println!("dump cut off at {offset}"),
///     Err(e) => println!("Error: {e}"),
/// }
/// ```
pub use error::Error;

/// Main entry point for working with heap dumps.
pub use snapshot::Snapshot;

/// Graph handles used throughout the snapshot API.
pub use snapshot::{ClassIdx, InstanceIdx, ObjectRef, Reference};

/// Parse configuration.
pub use config::ParseOptions;

/// Diagnostics collection and forwarding.
pub use diagnostics::{
    Diagnostic, DiagnosticCategory, DiagnosticSeverity, DiagnosticSink, Diagnostics, LogSink,
};

/// Low-level byte access.
///
/// [`Parser`] decodes big-endian values from a slice; [`ShardManager`] serves absolute file
/// offsets across mapping windows.
pub use file::{parser::Parser, ShardManager};

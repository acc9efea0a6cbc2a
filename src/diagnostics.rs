//! Diagnostics collection for heap dump parsing.
//!
//! Not every inconsistency in a heap dump is worth aborting for. Object ids that never
//! resolve, classes without a name, duplicate definitions and field layouts that disagree
//! with an instance's data are all common in dumps taken from live processes. This module
//! collects such observations so the parse can continue while still reporting them.
//!
//! # Architecture
//!
//! The diagnostics system is shared across the parsing pipeline:
//! - **SnapshotBuilder**: Reports stream-level observations (skipped records, duplicate ids)
//! - **Resolution pass**: Reports references that never resolve and field layout problems
//!
//! The [`Diagnostics`] container uses `boxcar::Vec` for thread-safe, lock-free append
//! operations, so the parallel resolution pass reports without synchronization. Every entry
//! can additionally be forwarded to a caller-supplied [`DiagnosticSink`] as it is recorded.
//!
//! # Key Components
//!
//! - [`Diagnostics`] - Thread-safe container for diagnostic entries
//! - [`Diagnostic`] - Individual diagnostic entry with severity and context
//! - [`DiagnosticSeverity`] - Severity level (Info, Warning, Error)
//! - [`DiagnosticCategory`] - Category of the diagnostic source
//! - [`DiagnosticSink`] - Receiver for diagnostics as they are reported
//! - [`LogSink`] - Sink that forwards to the `log` facade
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use heapscope::{DiagnosticCategory, LogSink, ParseOptions, Snapshot};
//! use std::sync::Arc;
//!
//! let shards = heapscope::file::ShardManager::open("app.hprof", 1 << 30, 1024)?;
//! let snapshot =
//!     Snapshot::from_shards(&shards, &ParseOptions::default(), Some(Arc::new(LogSink)))?;
//!
//! let unresolved = snapshot
//!     .diagnostics()
//!     .by_category(DiagnosticCategory::Reference)
//!     .len();
//! println!("{unresolved} dangling references");
//! # Ok::<(), heapscope::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! All types in this module are [`Send`] and [`Sync`]. Multiple threads can safely add
//! diagnostics simultaneously without coordination.

use std::{
    fmt::{self, Write},
    sync::Arc,
};

use crate::hprof::ObjectId;

/// Severity level of a diagnostic entry.
///
/// Determines how the diagnostic should be treated and displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    /// Informational message, not indicating a problem.
    Info,

    /// Warning about a graph anomaly.
    ///
    /// The snapshot is still complete, but some references point nowhere, some names are
    /// placeholders, or some field values are missing.
    Warning,

    /// Error indicating corrupt data that was worked around.
    Error,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Info => write!(f, "INFO"),
            DiagnosticSeverity::Warning => write!(f, "WARN"),
            DiagnosticSeverity::Error => write!(f, "ERROR"),
        }
    }
}

/// Category indicating the source or type of diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    /// Issues with the record stream.
    ///
    /// Examples: skipped unknown records, records outside a heap dump.
    Record,

    /// Issues with heap attribution.
    ///
    /// Examples: heap names that are not in the string table.
    Heap,

    /// Issues with class objects.
    ///
    /// Examples: classes without a LOAD CLASS name, duplicate class ids.
    Class,

    /// Issues with instances and arrays.
    ///
    /// Examples: duplicate object ids, field layouts disagreeing with instance data.
    Instance,

    /// Issues with GC roots.
    Root,

    /// Object ids that do not resolve to any object in the dump.
    Reference,

    /// General issues not fitting other categories.
    General,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Record => write!(f, "Record"),
            DiagnosticCategory::Heap => write!(f, "Heap"),
            DiagnosticCategory::Class => write!(f, "Class"),
            DiagnosticCategory::Instance => write!(f, "Instance"),
            DiagnosticCategory::Root => write!(f, "Root"),
            DiagnosticCategory::Reference => write!(f, "Reference"),
            DiagnosticCategory::General => write!(f, "General"),
        }
    }
}

/// A single diagnostic entry with context information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity level of this diagnostic.
    pub severity: DiagnosticSeverity,

    /// Category indicating the source of this diagnostic.
    pub category: DiagnosticCategory,

    /// Human-readable description of the issue.
    pub message: String,

    /// Optional file offset of the record the issue was found in.
    pub offset: Option<u64>,

    /// Optional object id the issue concerns.
    pub object_id: Option<ObjectId>,
}

impl Diagnostic {
    /// Creates a new diagnostic entry.
    ///
    /// # Arguments
    ///
    /// * `severity` - Severity level of the diagnostic
    /// * `category` - Category of the diagnostic source
    /// * `message` - Human-readable description
    pub fn new(
        severity: DiagnosticSeverity,
        category: DiagnosticCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
            offset: None,
            object_id: None,
        }
    }

    /// Adds file offset information to the diagnostic.
    #[must_use]
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Adds the object id the diagnostic concerns.
    #[must_use]
    pub fn with_object(mut self, id: ObjectId) -> Self {
        self.object_id = Some(id);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.category, self.message)?;

        if let Some(offset) = self.offset {
            write!(f, " (offset: 0x{offset:08x})")?;
        }

        if let Some(id) = self.object_id {
            write!(f, " (object: 0x{id:x})")?;
        }

        Ok(())
    }
}

/// Receiver for diagnostics as they are reported.
///
/// Implementations must tolerate concurrent calls: the resolution pass reports from
/// several worker threads at once.
pub trait DiagnosticSink: Send + Sync {
    /// Called once for every recorded diagnostic.
    fn report(&self, diagnostic: &Diagnostic);
}

/// A [`DiagnosticSink`] that forwards to the `log` facade.
///
/// Errors are logged with `log::error!`, warnings with `log::warn!` and informational
/// entries with `log::info!`, all under the `heapscope` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, diagnostic: &Diagnostic) {
        match diagnostic.severity {
            DiagnosticSeverity::Error => log::error!(target: "heapscope", "{diagnostic}"),
            DiagnosticSeverity::Warning => log::warn!(target: "heapscope", "{diagnostic}"),
            DiagnosticSeverity::Info => log::info!(target: "heapscope", "{diagnostic}"),
        }
    }
}

/// Thread-safe container for collecting diagnostic entries.
///
/// Uses `boxcar::Vec` internally for lock-free concurrent append operations.
/// Multiple threads can safely add diagnostics simultaneously.
///
/// # Example
///
/// ```rust
/// use heapscope::{DiagnosticCategory, Diagnostics};
/// use std::sync::Arc;
///
/// let diagnostics = Arc::new(Diagnostics::new());
///
/// let diag_clone = Arc::clone(&diagnostics);
/// std::thread::spawn(move || {
///     diag_clone.warning(DiagnosticCategory::Reference, "Unresolved object id 0x1234");
/// })
/// .join()
/// .unwrap();
///
/// diagnostics.info(DiagnosticCategory::Record, "Skipped CPU SAMPLES record");
/// assert_eq!(diagnostics.count(), 2);
/// ```
pub struct Diagnostics {
    entries: boxcar::Vec<Diagnostic>,
    sink: Option<Arc<dyn DiagnosticSink>>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagnostics {
    /// Creates a new empty diagnostics container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: boxcar::Vec::new(),
            sink: None,
        }
    }

    /// Creates a container that forwards every entry to `sink` as it is recorded.
    #[must_use]
    pub fn with_sink(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            entries: boxcar::Vec::new(),
            sink: Some(sink),
        }
    }

    /// Adds an informational diagnostic.
    ///
    /// # Arguments
    ///
    /// * `category` - Category of the diagnostic
    /// * `message` - Description of the observation
    pub fn info(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(DiagnosticSeverity::Info, category, message));
    }

    /// Adds a warning diagnostic.
    ///
    /// # Arguments
    ///
    /// * `category` - Category of the diagnostic
    /// * `message` - Description of the issue
    pub fn warning(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(
            DiagnosticSeverity::Warning,
            category,
            message,
        ));
    }

    /// Adds an error diagnostic.
    ///
    /// # Arguments
    ///
    /// * `category` - Category of the diagnostic
    /// * `message` - Description of the error
    pub fn error(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(
            DiagnosticSeverity::Error,
            category,
            message,
        ));
    }

    /// Adds a diagnostic entry directly.
    ///
    /// Use this for diagnostics that need additional context like an offset or object id.
    pub fn push(&self, diagnostic: Diagnostic) {
        if let Some(sink) = &self.sink {
            sink.report(&diagnostic);
        }
        self.entries.push(diagnostic);
    }

    /// Returns true if any diagnostics have been collected.
    pub fn has_any(&self) -> bool {
        self.entries.count() > 0
    }

    /// Returns true if any error-level diagnostics have been collected.
    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, d)| d.severity == DiagnosticSeverity::Error)
    }

    /// Returns true if any warning-level diagnostics have been collected.
    pub fn has_warnings(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, d)| d.severity == DiagnosticSeverity::Warning)
    }

    /// Returns the total number of diagnostics.
    pub fn count(&self) -> usize {
        self.entries.count()
    }

    /// Returns the number of error-level diagnostics.
    pub fn error_count(&self) -> usize {
        self.count_severity(DiagnosticSeverity::Error)
    }

    /// Returns the number of warning-level diagnostics.
    pub fn warning_count(&self) -> usize {
        self.count_severity(DiagnosticSeverity::Warning)
    }

    /// Returns the number of info-level diagnostics.
    pub fn info_count(&self) -> usize {
        self.count_severity(DiagnosticSeverity::Info)
    }

    fn count_severity(&self, severity: DiagnosticSeverity) -> usize {
        self.entries
            .iter()
            .filter(|(_, d)| d.severity == severity)
            .count()
    }

    /// Returns an iterator over all diagnostics, in the order they were recorded.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().map(|(_, d)| d)
    }

    /// Returns all errors as a vector.
    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.iter()
            .filter(|d| d.severity == DiagnosticSeverity::Error)
            .collect()
    }

    /// Returns all warnings as a vector.
    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.iter()
            .filter(|d| d.severity == DiagnosticSeverity::Warning)
            .collect()
    }

    /// Returns diagnostics filtered by category.
    pub fn by_category(&self, category: DiagnosticCategory) -> Vec<&Diagnostic> {
        self.iter().filter(|d| d.category == category).collect()
    }

    /// Returns the diagnostics that concern object `id`.
    pub fn by_object(&self, id: ObjectId) -> Vec<&Diagnostic> {
        self.iter().filter(|d| d.object_id == Some(id)).collect()
    }

    /// Formats a summary of all diagnostics for display.
    ///
    /// Groups diagnostics by severity for readable output.
    pub fn summary(&self) -> String {
        let mut output = String::new();

        let error_count = self.error_count();
        let warning_count = self.warning_count();
        let info_count = self.info_count();

        let _ = writeln!(
            output,
            "Diagnostics: {error_count} error(s), {warning_count} warning(s), {info_count} info(s)"
        );

        if error_count > 0 {
            output.push_str("\nErrors:\n");
            for diag in self.errors() {
                let _ = writeln!(output, "  {diag}");
            }
        }

        if warning_count > 0 {
            output.push_str("\nWarnings:\n");
            for diag in self.warnings() {
                let _ = writeln!(output, "  {diag}");
            }
        }

        output
    }
}

impl DiagnosticSink for Diagnostics {
    fn report(&self, diagnostic: &Diagnostic) {
        self.push(diagnostic.clone());
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("count", &self.count())
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_diagnostic_creation() {
        let diag = Diagnostic::new(
            DiagnosticSeverity::Warning,
            DiagnosticCategory::Heap,
            "Test message",
        );

        assert_eq!(diag.severity, DiagnosticSeverity::Warning);
        assert_eq!(diag.category, DiagnosticCategory::Heap);
        assert_eq!(diag.message, "Test message");
        assert!(diag.offset.is_none());
        assert!(diag.object_id.is_none());
    }

    #[test]
    fn test_diagnostic_with_context() {
        let diag = Diagnostic::new(
            DiagnosticSeverity::Error,
            DiagnosticCategory::Instance,
            "Duplicate object",
        )
        .with_offset(0x1000)
        .with_object(0x7f00_1234);

        assert_eq!(diag.offset, Some(0x1000));
        assert_eq!(diag.object_id, Some(0x7f00_1234));
    }

    #[test]
    fn test_diagnostics_container() {
        let diagnostics = Diagnostics::new();

        diagnostics.info(DiagnosticCategory::General, "Info message");
        diagnostics.warning(DiagnosticCategory::Heap, "Warning message");
        diagnostics.error(DiagnosticCategory::Record, "Error message");

        assert_eq!(diagnostics.count(), 3);
        assert_eq!(diagnostics.error_count(), 1);
        assert_eq!(diagnostics.warning_count(), 1);
        assert_eq!(diagnostics.info_count(), 1);
        assert!(diagnostics.has_errors());
        assert!(diagnostics.has_warnings());
        assert!(diagnostics.has_any());
    }

    #[test]
    fn test_diagnostics_thread_safety() {
        let diagnostics = Arc::new(Diagnostics::new());
        let mut handles = vec![];

        for i in 0..10 {
            let diag_clone = Arc::clone(&diagnostics);
            handles.push(thread::spawn(move || {
                diag_clone.warning(DiagnosticCategory::Reference, format!("Thread {i} warning"));
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(diagnostics.count(), 10);
    }

    #[test]
    fn test_diagnostics_filters() {
        let diagnostics = Diagnostics::new();

        diagnostics.push(
            Diagnostic::new(
                DiagnosticSeverity::Warning,
                DiagnosticCategory::Reference,
                "dangling",
            )
            .with_object(5),
        );
        diagnostics.warning(DiagnosticCategory::Reference, "dangling");
        diagnostics.warning(DiagnosticCategory::Class, "unnamed");

        assert_eq!(diagnostics.by_category(DiagnosticCategory::Reference).len(), 2);
        assert_eq!(diagnostics.by_category(DiagnosticCategory::Root).len(), 0);
        assert_eq!(diagnostics.by_object(5).len(), 1);
    }

    #[test]
    fn test_sink_forwarding() {
        let collector = Arc::new(Diagnostics::new());
        let diagnostics = Diagnostics::with_sink(collector.clone());

        diagnostics.warning(DiagnosticCategory::Class, "unnamed class");
        diagnostics.info(DiagnosticCategory::Record, "skipped");

        assert_eq!(diagnostics.count(), 2);
        assert_eq!(collector.count(), 2);
        assert_eq!(collector.warnings()[0].message, "unnamed class");

        // Logging without an installed logger is a no-op
        LogSink.report(&collector.warnings()[0].clone());
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::new(
            DiagnosticSeverity::Warning,
            DiagnosticCategory::Reference,
            "Unresolved reference",
        )
        .with_offset(0x1234)
        .with_object(0xabc);

        let display = format!("{diag}");
        assert!(display.contains("WARN"));
        assert!(display.contains("Reference"));
        assert!(display.contains("Unresolved reference"));
        assert!(display.contains("0x00001234"));
        assert!(display.contains("0xabc"));

        let diagnostics = Diagnostics::new();
        diagnostics.push(diag);
        assert!(diagnostics.summary().contains("1 warning(s)"));
    }
}

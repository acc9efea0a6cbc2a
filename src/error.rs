use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($offset:expr, $msg:expr) => {
        crate::Error::Malformed {
            offset: $offset,
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($offset:expr, $fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            offset: $offset,
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every error returned by this crate is fatal to the parse that produced it: no partial
/// [`crate::Snapshot`] is ever handed out. Non-fatal inconsistencies, such as object ids that
/// never resolve, are not errors; they are collected as [`crate::Diagnostic`] entries instead.
///
/// # Error Categories
///
/// ## I/O boundary errors
/// - [`Error::FileError`] - Filesystem errors while opening or mapping the dump
/// - [`Error::OutOfBounds`] - A byte range beyond the end of the file was requested
///
/// ## Format errors
/// - [`Error::InvalidHeader`] - The file does not start with a supported HPROF header
/// - [`Error::UnknownTag`] - A record or sub-record tag outside the known set
/// - [`Error::UnknownType`] - A basic-type code outside the known set
/// - [`Error::LengthMismatch`] - Declared and consumed payload sizes disagree
/// - [`Error::Truncated`] - The file ends in the middle of a record
/// - [`Error::Malformed`] - Any other framing violation
///
/// ## Configuration errors
/// - [`Error::InvalidOptions`] - Rejected shard size / padding combination
///
/// # Examples
///
/// ```rust,no_run
/// use heapscope::{Error, Snapshot};
/// use std::path::Path;
///
/// match Snapshot::from_file(Path::new("app.hprof")) {
///     Ok(snapshot) => println!("{} roots", snapshot.gc_roots().len()),
///     Err(Error::Truncated { offset, .. }) => eprintln!("dump cut short at 0x{offset:x}"),
///     Err(e) => eprintln!("failed: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur while opening or memory-mapping the dump.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// An out of bound access was attempted on the shard manager.
    ///
    /// Raised when `offset + len` exceeds the size of the underlying file.
    #[error("Out of bound read of {len} bytes at offset {offset} (file size {size})")]
    OutOfBounds {
        /// Absolute offset of the requested range
        offset: u64,
        /// Length of the requested range
        len: u64,
        /// Size of the underlying file
        size: u64,
    },

    /// The header at offset 0 is not a supported HPROF header.
    #[error("Invalid HPROF header - {0}")]
    InvalidHeader(String),

    /// An unknown record or sub-record tag was encountered.
    ///
    /// The stream framing cannot be recovered past an unknown sub-record, because
    /// sub-records carry no length of their own.
    #[error("Unknown tag 0x{tag:02x} at offset {offset}")]
    UnknownTag {
        /// The tag byte
        tag: u8,
        /// Absolute offset of the tag byte
        offset: u64,
    },

    /// An unknown basic-type code was encountered in a field or array descriptor.
    #[error("Unknown basic type {type_code} at offset {offset}")]
    UnknownType {
        /// The type code
        type_code: u8,
        /// Absolute offset of the type byte
        offset: u64,
    },

    /// The bytes consumed by a record's grammar disagree with its declared length.
    #[error("Length mismatch in record at offset {offset}: declared {declared}, consumed {consumed}")]
    LengthMismatch {
        /// Absolute offset of the offending record
        offset: u64,
        /// Declared payload length
        declared: u64,
        /// Bytes the record grammar consumed (or would have consumed)
        consumed: u64,
    },

    /// The file ended in the middle of a record.
    #[error("Truncated record at offset {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        /// Absolute offset of the truncated record
        offset: u64,
        /// Bytes the record requires
        needed: u64,
        /// Bytes left in the file
        available: u64,
    },

    /// The file is damaged and could not be parsed.
    ///
    /// The error includes the byte offset of the failing record and the source
    /// location where the malformation was detected.
    #[error("Malformed - {file}:{line}: {message} (offset {offset})")]
    Malformed {
        /// Absolute offset of the failing record
        offset: u64,
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// The provided parse options are invalid.
    #[error("Invalid options - {0}")]
    InvalidOptions(String),
}

impl Error {
    /// Returns the absolute file offset the error refers to, if it has one.
    #[must_use]
    pub fn offset(&self) -> Option<u64> {
        match self {
            Error::OutOfBounds { offset, .. }
            | Error::UnknownTag { offset, .. }
            | Error::UnknownType { offset, .. }
            | Error::LengthMismatch { offset, .. }
            | Error::Truncated { offset, .. }
            | Error::Malformed { offset, .. } => Some(*offset),
            Error::FileError(_) | Error::InvalidHeader(_) | Error::InvalidOptions(_) => None,
        }
    }
}

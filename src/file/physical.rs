//! Physical file backend for memory-mapped I/O.
//!
//! This module provides the [`crate::file::Physical`] backend that implements the
//! [`crate::file::Backend`] trait for heap dumps on disk. Unlike a single whole-file mapping,
//! the backend maps one window at a time on request, which keeps each mapping below the
//! platform's mapping-size ceiling no matter how large the dump is.
//!
//! # Usage Examples
//!
//! ```rust,ignore
//! use heapscope::file::{Backend, Physical};
//! use std::path::Path;
//!
//! let physical = Physical::new(Path::new("app.hprof"))?;
//! let header = physical.map(0, 18)?;
//! assert_eq!(&header[..12], b"JAVA PROFILE");
//! # Ok::<(), heapscope::Error>(())
//! ```

use super::{Backend, Window};
use crate::{Error, Result};

use memmap2::MmapOptions;
use std::{fs, path::Path};

/// A file backend that maps windows of a file on disk with read-only memory mappings.
///
/// The file handle stays open for the lifetime of the backend; every window produced by
/// [`Backend::map`] is an independent mapping released when the window is dropped.
#[derive(Debug)]
pub struct Physical {
    /// Open handle to the dump
    file: fs::File,
    /// File size captured when the backend was created
    len: u64,
}

impl Physical {
    /// Create a new physical file backend for the file at `path`.
    ///
    /// No mapping is created here; windows are mapped lazily by [`Backend::map`].
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or its size queried.
    pub fn new(path: impl AsRef<Path>) -> Result<Physical> {
        let file = fs::File::open(path)?;
        Self::from_std_file(file)
    }

    /// Creates a new physical file backend from an opened [`std::fs::File`].
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file size cannot be queried.
    pub fn from_std_file(file: fs::File) -> Result<Physical> {
        let len = file.metadata()?.len();
        Ok(Physical { file, len })
    }
}

impl Backend for Physical {
    fn len(&self) -> u64 {
        self.len
    }

    fn map(&self, offset: u64, len: usize) -> Result<Window> {
        let Some(end) = offset.checked_add(len as u64) else {
            return Err(Error::OutOfBounds {
                offset,
                len: len as u64,
                size: self.len,
            });
        };
        if end > self.len {
            return Err(Error::OutOfBounds {
                offset,
                len: len as u64,
                size: self.len,
            });
        }

        // Safety: read-only mapping; the dump must not be truncated while it is mapped.
        let mmap = unsafe { MmapOptions::new().offset(offset).len(len).map(&self.file)? };

        log::trace!("mapped window of {len} bytes at offset {offset}");
        Ok(Window::Mapped(mmap))
    }
}

//! Sharded file access for heap dumps.
//!
//! Heap dumps routinely exceed the size a platform can memory-map in a single piece. This
//! module hides that limit behind the [`crate::file::ShardManager`], which splits the file
//! into bounded windows, maps each one lazily, and stitches reads that straddle window
//! boundaries so callers only ever deal with absolute file offsets.
//!
//! # Architecture
//!
//! - **Backend system** - Pluggable data sources behind the [`crate::file::Backend`] trait
//! - **Windowing** - [`crate::file::ShardManager`] partitions the source into windows of
//!   `shard_size + padding` bytes, where the padding duplicates the head of the next window
//! - **Decoding helpers** - [`crate::file::io`] for big-endian primitives and
//!   [`crate::file::parser::Parser`] for cursor-based slice decoding
//!
//! # Key Components
//!
//! ## Core Types
//! - [`crate::file::ShardManager`] - Windowed random-access byte source
//! - [`crate::file::Backend`] - Trait for different data sources (disk files, memory buffers)
//! - [`crate::file::Window`] - One mapped window handed out by a backend
//!
//! ## Backend Implementations
//! - [`crate::file::Physical`] - Memory-mapped file backend for disk access
//! - [`crate::file::Memory`] - In-memory buffer backend
//!
//! # Examples
//!
//! ```rust,no_run
//! use heapscope::file::ShardManager;
//! use std::path::Path;
//!
//! // 64 KiB windows with 256 bytes of overlap
//! let shards = ShardManager::open(Path::new("app.hprof"), 64 * 1024, 256)?;
//!
//! // Reads are addressed by absolute offset, whatever window they land in
//! let id_size: u32 = shards.read_be(19)?;
//! let bytes = shards.read_bytes(65_530, 16)?;
//! assert_eq!(bytes.len(), 16);
//! # Ok::<(), heapscope::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! Backends and the shard manager are [`Send`] and [`Sync`]. Windows are mapped read-only
//! and at most once, so independent parses can share a manager.

pub mod io;
pub mod parser;

mod memory;
mod physical;
mod shard;

use std::{fmt, ops::Deref, sync::Arc};

use memmap2::Mmap;

use crate::Result;

pub use memory::Memory;
pub use physical::Physical;
pub use shard::{ShardManager, DEFAULT_PADDING, DEFAULT_SHARD_SIZE};

/// Backend trait for the data sources a [`ShardManager`] can window over.
///
/// A backend knows its total length and can produce an immutable [`Window`] over any
/// in-bounds byte range. The shard manager guarantees it only requests non-empty ranges
/// that lie entirely inside the source.
pub trait Backend: Send + Sync + fmt::Debug {
    /// Total length of the source in bytes.
    fn len(&self) -> u64;

    /// Returns `true` if the source holds no data.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Produce a window covering `len` bytes starting at absolute `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range exceeds the source, or
    /// [`crate::Error::FileError`] if the range could not be mapped.
    fn map(&self, offset: u64, len: usize) -> Result<Window>;
}

/// An immutable view over one window of a backend.
///
/// Dereferences to the window's bytes.
pub enum Window {
    /// A read-only memory mapping of a file range
    Mapped(Mmap),
    /// A range of a shared in-memory buffer
    Shared {
        /// Backing buffer
        data: Arc<[u8]>,
        /// First byte of the window inside `data`
        start: usize,
        /// Window length
        len: usize,
    },
}

impl Deref for Window {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Window::Mapped(mmap) => mmap.as_ref(),
            Window::Shared { data, start, len } => &data[*start..*start + *len],
        }
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Window::Mapped(mmap) => write!(f, "Window::Mapped({} bytes)", mmap.len()),
            Window::Shared { start, len, .. } => {
                write!(f, "Window::Shared({len} bytes at {start})")
            }
        }
    }
}

//! Windowed, lazily mapped byte source with padding overlap.
//!
//! The [`ShardManager`] partitions a backend of length `L` into `ceil(L / S)` windows. Window
//! `i` starts at `i * S` and spans `min(S + P, L - i * S)` bytes, so its last `P` bytes (the
//! padding) duplicate the head of window `i + 1`. A read is served from the window that
//! contains its first byte:
//!
//! - if it fits inside that window, padding included, the caller gets a borrowed slice;
//! - otherwise the pieces are copied out of consecutive windows and concatenated, for as many
//!   window boundaries as the range crosses.
//!
//! Windows are selected with `offset / S`, so an offset can never be negative relative to
//! its window. Any read no longer than `P + 1` bytes is always served without copying.

use std::{
    borrow::Cow,
    path::Path,
    sync::{
        atomic::{AtomicUsize, Ordering},
        OnceLock,
    },
};

use super::{
    io::{read_id_at, HprofIO},
    Backend, Memory, Physical, Window,
};
use crate::{Error, Result};

/// Default primary window length: 1 GiB.
pub const DEFAULT_SHARD_SIZE: usize = 1 << 30;

/// Default padding overlap between adjacent windows: 1 KiB.
pub const DEFAULT_PADDING: usize = 1024;

/// Random-access byte source that shards its backend into bounded windows.
///
/// # Examples
///
/// ```rust
/// use heapscope::file::ShardManager;
///
/// let data: Vec<u8> = (0..64).collect();
/// let shards = ShardManager::from_mem(data, 16, 4)?;
/// assert_eq!(shards.shard_count(), 4);
///
/// // Crosses the boundary at 16 but fits in window 0's padding: borrowed
/// assert_eq!(&*shards.read_bytes(14, 4)?, &[14, 15, 16, 17]);
///
/// // Crosses two boundaries: stitched
/// let wide = shards.read_bytes(10, 30)?;
/// assert_eq!(wide.len(), 30);
/// assert_eq!(wide[29], 39);
/// # Ok::<(), heapscope::Error>(())
/// ```
///
/// # Thread Safety
///
/// [`ShardManager`] is [`Send`] and [`Sync`]. Each window is mapped at most once and stays
/// mapped until the manager is dropped.
#[derive(Debug)]
pub struct ShardManager {
    backend: Box<dyn Backend>,
    len: u64,
    shard_size: usize,
    padding: usize,
    windows: Vec<OnceLock<Window>>,
    mapped: AtomicUsize,
}

impl ShardManager {
    /// Create a shard manager over an arbitrary backend.
    ///
    /// # Arguments
    /// * `backend` - The data source
    /// * `shard_size` - Primary window length `S`, must be non-zero
    /// * `padding` - Overlap `P`, must be smaller than `S`
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidOptions`] for a rejected `S`/`P` combination.
    pub fn new(backend: Box<dyn Backend>, shard_size: usize, padding: usize) -> Result<Self> {
        if shard_size == 0 {
            return Err(Error::InvalidOptions("shard size must be non-zero".to_string()));
        }
        if padding >= shard_size {
            return Err(Error::InvalidOptions(format!(
                "padding ({padding}) must be smaller than the shard size ({shard_size})"
            )));
        }
        if shard_size.checked_add(padding).is_none() {
            return Err(Error::InvalidOptions(
                "shard size plus padding overflows".to_string(),
            ));
        }

        let len = backend.len();
        let count = usize::try_from(len.div_ceil(shard_size as u64)).map_err(|_| {
            Error::InvalidOptions(format!("{len} bytes need too many shards of {shard_size}"))
        })?;

        log::debug!(
            "sharding {len} bytes into {count} window(s) of {shard_size} + {padding} bytes"
        );

        Ok(ShardManager {
            backend,
            len,
            shard_size,
            padding,
            windows: (0..count).map(|_| OnceLock::new()).collect(),
            mapped: AtomicUsize::new(0),
        })
    }

    /// Open the file at `path` with memory-mapped windows.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened, or
    /// [`crate::Error::InvalidOptions`] for a rejected `S`/`P` combination.
    pub fn open(path: impl AsRef<Path>, shard_size: usize, padding: usize) -> Result<Self> {
        Self::new(Box::new(Physical::new(path)?), shard_size, padding)
    }

    /// Create a shard manager over an in-memory buffer.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidOptions`] for a rejected `S`/`P` combination.
    pub fn from_mem(data: Vec<u8>, shard_size: usize, padding: usize) -> Result<Self> {
        Self::new(Box::new(Memory::new(data)), shard_size, padding)
    }

    /// Total length of the underlying file.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns `true` if the underlying file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Primary window length `S`.
    #[must_use]
    pub fn shard_size(&self) -> usize {
        self.shard_size
    }

    /// Padding overlap `P`.
    #[must_use]
    pub fn padding(&self) -> usize {
        self.padding
    }

    /// Number of windows the file is partitioned into.
    #[must_use]
    pub fn shard_count(&self) -> usize {
        self.windows.len()
    }

    /// Number of windows mapped so far.
    #[must_use]
    pub fn mapped_shards(&self) -> usize {
        self.mapped.load(Ordering::Relaxed)
    }

    /// Returns exactly `length` bytes starting at absolute `offset`.
    ///
    /// The result borrows from a window when the range lies inside a single window (padding
    /// included) and is an owned, stitched copy otherwise.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `offset + length` exceeds the file size, or
    /// [`crate::Error::FileError`] if a window could not be mapped.
    pub fn read_bytes(&self, offset: u64, length: usize) -> Result<Cow<'_, [u8]>> {
        let end = self.check_range(offset, length)?;
        if length == 0 {
            return Ok(Cow::Borrowed(&[][..]));
        }

        let (index, local) = self.locate(offset);
        let window = self.window(index)?;
        if local + length <= window.len() {
            return Ok(Cow::Borrowed(&window[local..local + length]));
        }

        let mut buffer = Vec::with_capacity(length);
        let mut position = offset;
        while position < end {
            let (index, local) = self.locate(position);
            let window = self.window(index)?;
            let available = window.len() - local;
            let take = usize::try_from(end - position).map_or(available, |rest| rest.min(available));

            buffer.extend_from_slice(&window[local..local + take]);
            position += take as u64;
        }

        Ok(Cow::Owned(buffer))
    }

    /// Reads a fixed-width big-endian value at absolute `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the value extends beyond the file.
    pub fn read_be<T: HprofIO>(&self, offset: u64) -> Result<T> {
        let bytes = self.read_bytes(offset, std::mem::size_of::<T>())?;
        let slice: &[u8] = &bytes;
        let Ok(array) = slice.try_into() else {
            return Err(Error::OutOfBounds {
                offset,
                len: std::mem::size_of::<T>() as u64,
                size: self.len,
            });
        };
        Ok(T::from_be_bytes(array))
    }

    /// Reads an unsigned big-endian integer of `width` bytes (1, 2, 4 or 8) at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the value extends beyond the file, or
    /// [`crate::Error::Malformed`] for an unsupported width.
    pub fn read_uint(&self, offset: u64, width: usize) -> Result<u64> {
        let bytes = self.read_bytes(offset, width)?;
        let mut cursor = 0;
        read_id_at(&bytes, &mut cursor, width)
    }

    fn check_range(&self, offset: u64, length: usize) -> Result<u64> {
        match offset.checked_add(length as u64) {
            Some(end) if end <= self.len => Ok(end),
            _ => Err(Error::OutOfBounds {
                offset,
                len: length as u64,
                size: self.len,
            }),
        }
    }

    /// Window index and window-relative offset of an in-bounds absolute offset.
    fn locate(&self, offset: u64) -> (usize, usize) {
        let size = self.shard_size as u64;
        // Both values are bounded by `windows.len()` and `shard_size`, which fit in usize.
        ((offset / size) as usize, (offset % size) as usize)
    }

    fn window(&self, index: usize) -> Result<&Window> {
        let Some(slot) = self.windows.get(index) else {
            return Err(Error::OutOfBounds {
                offset: index as u64 * self.shard_size as u64,
                len: 0,
                size: self.len,
            });
        };

        if let Some(window) = slot.get() {
            return Ok(window);
        }

        let start = index as u64 * self.shard_size as u64;
        let span = (self.shard_size + self.padding) as u64;
        let len = span.min(self.len - start) as usize;
        let window = self.backend.map(start, len)?;

        let mut installed = false;
        let window = slot.get_or_init(|| {
            installed = true;
            window
        });
        if installed {
            self.mapped.fetch_add(1, Ordering::Relaxed);
            log::trace!("window {index} mapped ({len} bytes at {start})");
        }

        Ok(window)
    }
}

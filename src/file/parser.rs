//! Cursor-based parser over an in-memory byte slice.
//!
//! This module provides the [`crate::file::parser::Parser`] type, a bounds-checked cursor used
//! wherever a complete byte range is already at hand: decoding the raw field block of an
//! instance dump against its class layout, and decoding the element data of primitive arrays.
//! Streaming access to the dump file itself goes through [`crate::hprof::Cursor`], which reads
//! through the shard manager instead of a slice.
//!
//! # Examples
//!
//! ```rust
//! use heapscope::Parser;
//!
//! let data = [0x00, 0x00, 0x00, 0x2A, 0x00, 0x07];
//! let mut parser = Parser::new(&data);
//!
//! let value: i32 = parser.read_be()?;
//! assert_eq!(value, 42);
//! assert_eq!(parser.read_be::<u16>()?, 7);
//! assert!(!parser.has_more_data());
//! # Ok::<(), heapscope::Error>(())
//! ```

use crate::{
    file::io::{read_be_at, read_id_at, HprofIO},
    Error, Result,
};

/// A bounds-checked binary cursor over a byte slice.
///
/// All multi-byte reads are big-endian, as mandated by the HPROF format. Errors report the
/// absolute file offset when the parser was created with [`Parser::with_base`].
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
    /// Absolute file offset of `data[0]`, used for error reporting
    base: u64,
}

impl<'a> Parser<'a> {
    /// Create a new [`crate::file::parser::Parser`] from a byte slice.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use heapscope::Parser;
    /// let data = [0x01, 0x02, 0x03, 0x04];
    /// let parser = Parser::new(&data);
    /// assert_eq!(parser.len(), 4);
    /// ```
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser {
            data,
            position: 0,
            base: 0,
        }
    }

    /// Create a parser whose errors report offsets relative to `base`, the absolute file
    /// position of the first byte of `data`.
    #[must_use]
    pub fn with_base(data: &'a [u8], base: u64) -> Self {
        Parser {
            data,
            position: 0,
            base,
        }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there is more data available to parse.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Number of bytes left between the cursor and the end of the buffer.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Get the current position of the parser within the data buffer.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Absolute file offset of the cursor.
    #[must_use]
    pub fn absolute_pos(&self) -> u64 {
        self.base + self.position as u64
    }

    /// Move the current position to the specified index.
    ///
    /// Seeking to `len()` is allowed and leaves the parser exhausted.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if position is beyond the data length.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(self.out_of_bounds(pos.saturating_sub(self.position)));
        }

        self.position = pos;
        Ok(())
    }

    /// Move the position forward by the specified number of bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if advancing by step would exceed the data length.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        if step > self.remaining() {
            return Err(self.out_of_bounds(step));
        }

        self.position += step;
        Ok(())
    }

    /// Peek at the next byte without advancing the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if position is at or beyond the data length.
    pub fn peek_byte(&self) -> Result<u8> {
        self.data
            .get(self.position)
            .copied()
            .ok_or_else(|| self.out_of_bounds(1))
    }

    /// Read a type `T` from the current position in big-endian format and advance the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length.
    pub fn read_be<T: HprofIO>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        read_be_at::<T>(self.data, &mut self.position).map_err(|_| self.out_of_bounds(size))
    }

    /// Read an object id of `width` bytes and advance the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length.
    pub fn read_id(&mut self, width: usize) -> Result<u64> {
        match read_id_at(self.data, &mut self.position, width) {
            Err(Error::OutOfBounds { .. }) => Err(self.out_of_bounds(width)),
            other => other,
        }
    }

    /// Borrow the next `len` bytes and advance past them.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `len` bytes remain.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(self.out_of_bounds(len));
        }

        let data = self.data;
        let start = self.position;
        self.position += len;
        Ok(&data[start..self.position])
    }

    /// Execute a closure transactionally, rolling back the position on failure.
    ///
    /// # Errors
    /// Returns any error produced by the closure `f`.
    pub fn transactional<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let saved_position = self.position;
        let result = f(self);
        if result.is_err() {
            self.position = saved_position;
        }
        result
    }

    fn out_of_bounds(&self, len: usize) -> Error {
        Error::OutOfBounds {
            offset: self.absolute_pos(),
            len: len as u64,
            size: self.base + self.data.len() as u64,
        }
    }
}

use std::sync::Arc;

use super::{Backend, Window};
use crate::{Error, Result};

/// Input source backed by memory.
///
/// Windows are ranges of one shared buffer, so windowing behaves exactly as it does for a
/// mapped file without touching the filesystem.
#[derive(Debug)]
pub struct Memory {
    data: Arc<[u8]>,
}

impl Memory {
    /// Create a new memory backend
    ///
    /// ## Arguments
    /// * 'data' - The data buffer to consume
    pub fn new(data: Vec<u8>) -> Memory {
        Memory { data: data.into() }
    }
}

impl Backend for Memory {
    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    fn map(&self, offset: u64, len: usize) -> Result<Window> {
        let out_of_bounds = || Error::OutOfBounds {
            offset,
            len: len as u64,
            size: self.data.len() as u64,
        };

        let start = usize::try_from(offset).map_err(|_| out_of_bounds())?;
        let Some(end) = start.checked_add(len) else {
            return Err(out_of_bounds());
        };

        if end > self.data.len() {
            return Err(out_of_bounds());
        }

        Ok(Window::Shared {
            data: Arc::clone(&self.data),
            start,
            len,
        })
    }
}

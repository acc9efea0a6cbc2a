//! Shared helpers for unit and integration tests: a byte-level dump writer and a ready-made
//! sample dump.
//!
//! The helper files only reach the crate through `super::hprof`, so `tests/common` can mount
//! them with `#[path]` next to its own `hprof` import.

mod sample;

use crate::hprof;

pub use sample::*;
pub use writer::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_width() {
        let mut narrow = Encoder::new(4);
        narrow.id(0x0102_0304);
        assert_eq!(narrow.into_bytes(), vec![1, 2, 3, 4]);

        let mut wide = Encoder::new(8);
        wide.id(0x0102_0304);
        assert_eq!(wide.into_bytes(), vec![0, 0, 0, 0, 1, 2, 3, 4]);
    }

    #[test]
    fn header_layout() {
        let data = HprofWriter::new(8).finish();
        assert_eq!(data.len(), 19 + 4 + 8);
        assert_eq!(&data[19..23], &[0, 0, 0, 8]);
    }
}

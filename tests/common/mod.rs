//! Dump writer shared with the unit tests.
#![allow(dead_code)]

use heapscope::hprof;

#[path = "../../src/test/sample.rs"]
mod sample;
#[path = "../../src/test/writer.rs"]
mod writer;

pub use sample::*;
pub use writer::*;

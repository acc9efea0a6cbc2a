//! HPROF record stream decoding.
//!
//! This module turns the bytes served by a [`crate::file::ShardManager`] into a sequence of
//! typed [`Record`]s. It knows the binary layout of every record and sub-record but nothing
//! about the object graph they describe; assembling that graph is the job of
//! [`crate::snapshot`].
//!
//! # Format
//!
//! ```text
//! header     "JAVA PROFILE 1.0.x\0"  u4 id_size  u8 timestamp_ms
//! record     u1 tag  u4 time_delta_us  u4 length  [length bytes]
//! sub-record u1 tag  [layout fixed by the tag]      (inside HEAP DUMP / HEAP DUMP SEGMENT)
//! ```
//!
//! All integers are big-endian and object ids are `id_size` bytes wide.
//!
//! # Key Components
//!
//! - [`Header`] - Validated file header
//! - [`RecordReader`] - Lazy, single-pass iterator over the records of a file
//! - [`Record`] / [`RecordKind`] - One decoded record or sub-record
//! - [`Tag`] / [`SubTag`] - Known record codes
//! - [`BasicType`] / [`Value`] - Field and array element types and their values
//!
//! # Examples
//!
//! ```rust,no_run
//! use heapscope::{file::ShardManager, hprof::{RecordKind, RecordReader}};
//!
//! let shards = ShardManager::open("app.hprof", 1 << 30, 1024)?;
//! let reader = RecordReader::new(&shards)?;
//! println!("{} with {}-byte ids", reader.header().format, reader.header().id_size);
//!
//! for record in reader {
//!     if let RecordKind::String { id, value } = record?.kind {
//!         println!("0x{id:x} = {value}");
//!     }
//! }
//! # Ok::<(), heapscope::Error>(())
//! ```

mod cursor;
mod header;
mod reader;
mod record;
mod tag;
mod types;

pub use header::{Header, FORMAT_PREFIX};
pub use reader::RecordReader;
pub use record::{
    ClassDump, FieldRecord, InstanceDump, ObjectArrayDump, PrimitiveArrayDump, Record,
    RecordKind, RootKind, RootRecord, StackFrameRecord, StackTraceRecord, StartThreadRecord,
    StaticFieldRecord,
};
pub use tag::{SubTag, Tag};
pub use types::{ArrayValues, BasicType, ObjectId, Value};

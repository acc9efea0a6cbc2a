//! Lazy, single-pass record sequence.

use crate::{file::ShardManager, Error, Result};

use super::{
    cursor::Cursor,
    header::Header,
    record::{
        ClassDump, FieldRecord, InstanceDump, ObjectArrayDump, PrimitiveArrayDump, Record,
        RecordKind, RootKind, RootRecord, StackFrameRecord, StackTraceRecord, StartThreadRecord,
        StaticFieldRecord,
    },
    tag::{SubTag, Tag},
    types::BasicType,
};

/// Size of a top-level record header: tag, time delta and payload length.
const RECORD_HEADER_LEN: u64 = 9;

/// Decodes the records of a heap dump one at a time.
///
/// The reader validates the file header on construction and then walks the file with an
/// explicit offset. Heap dump segments are entered rather than skipped: the
/// [`RecordKind::HeapDumpStart`] record is followed by every sub-record of the segment, and
/// the sequence resumes with top-level records once the segment is exhausted.
///
/// The sequence is finite and single pass. After the first error, or once the end of the file
/// is reached, it yields nothing further.
///
/// # Examples
///
/// ```rust,no_run
/// use heapscope::{file::ShardManager, hprof::{RecordKind, RecordReader}};
///
/// let shards = ShardManager::open("app.hprof", 1 << 30, 1024)?;
/// let mut instances = 0;
/// for record in RecordReader::new(&shards)? {
///     if let RecordKind::InstanceDump(_) = record?.kind {
///         instances += 1;
///     }
/// }
/// println!("{instances} instances");
/// # Ok::<(), heapscope::Error>(())
/// ```
pub struct RecordReader<'a> {
    shards: &'a ShardManager,
    header: Header,
    position: u64,
    segment_end: Option<u64>,
    skip_unknown: bool,
    finished: bool,
    records: usize,
}

impl<'a> RecordReader<'a> {
    /// Validate the header and position the reader on the first record.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidHeader`] or [`crate::Error::Truncated`] if the header is
    /// rejected.
    pub fn new(shards: &'a ShardManager) -> Result<Self> {
        let header = Header::read(shards)?;
        Ok(RecordReader {
            shards,
            position: header.length,
            header,
            segment_end: None,
            skip_unknown: false,
            finished: false,
            records: 0,
        })
    }

    /// Yield unknown top-level tags as [`RecordKind::Skipped`] instead of failing.
    ///
    /// Unknown sub-record tags stay fatal: sub-records carry no length, so the stream cannot
    /// be resynchronised past one.
    #[must_use]
    pub fn skip_unknown_records(mut self, skip: bool) -> Self {
        self.skip_unknown = skip;
        self
    }

    /// The validated file header.
    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Absolute offset of the next record.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Number of records yielded so far.
    #[must_use]
    pub fn records_read(&self) -> usize {
        self.records
    }

    /// Decode the next record.
    ///
    /// Returns `Ok(None)` at the end of the file.
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if a record runs past the end of the file,
    /// [`crate::Error::LengthMismatch`] if a record disagrees with its declared length,
    /// [`crate::Error::UnknownTag`] or [`crate::Error::UnknownType`] for codes outside the
    /// format, and [`crate::Error::FileError`] if a window could not be mapped.
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        if self.finished {
            return Ok(None);
        }

        match self.advance() {
            Ok(Some(record)) => {
                self.records += 1;
                Ok(Some(record))
            }
            Ok(None) => {
                self.finished = true;
                log::debug!("record stream exhausted after {} records", self.records);
                Ok(None)
            }
            Err(error) => {
                self.finished = true;
                Err(error)
            }
        }
    }

    fn advance(&mut self) -> Result<Option<Record>> {
        if let Some(end) = self.segment_end {
            if self.position < end {
                return self.sub_record(end).map(Some);
            }
            self.segment_end = None;
        }

        let file_len = self.shards.len();
        if self.position >= file_len {
            return Ok(None);
        }

        let offset = self.position;
        let available = file_len - offset;
        if available < RECORD_HEADER_LEN {
            return Err(Error::Truncated {
                offset,
                needed: RECORD_HEADER_LEN,
                available,
            });
        }

        let tag: u8 = self.shards.read_be(offset)?;
        let time: u32 = self.shards.read_be(offset + 1)?;
        let length = u64::from(self.shards.read_be::<u32>(offset + 5)?);
        let payload = offset + RECORD_HEADER_LEN;
        if RECORD_HEADER_LEN + length > available {
            return Err(Error::Truncated {
                offset,
                needed: RECORD_HEADER_LEN + length,
                available,
            });
        }
        let end = payload + length;

        let kind = match Tag::from_code(tag) {
            Some(tag) if tag.is_heap_dump() => {
                self.position = payload;
                self.segment_end = Some(end);
                log::trace!("{tag} of {length} bytes at {offset}");
                RecordKind::HeapDumpStart {
                    segment: tag == Tag::HeapDumpSegment,
                    length,
                }
            }
            Some(tag) => {
                self.position = end;
                self.top_level(tag, offset, payload, end)?
            }
            None if self.skip_unknown => {
                self.position = end;
                RecordKind::Skipped { tag, length }
            }
            None => return Err(Error::UnknownTag { tag, offset }),
        };

        Ok(Some(Record {
            offset,
            time: Some(time),
            kind,
        }))
    }

    fn top_level(&self, tag: Tag, offset: u64, payload: u64, end: u64) -> Result<RecordKind> {
        let id_size = self.header.id_size;
        let mut cursor = Cursor::new(self.shards, id_size, offset, payload, end);

        let kind = match tag {
            Tag::String => {
                let id = cursor.read_id()?;
                let len = usize::try_from(end - cursor.position())
                    .map_err(|_| malformed_error!(offset, "string record is too large"))?;
                let bytes = cursor.read_bytes(len)?;
                RecordKind::String {
                    id,
                    value: String::from_utf8_lossy(&bytes).into_owned(),
                }
            }
            Tag::LoadClass => RecordKind::LoadClass {
                serial: cursor.read()?,
                class_id: cursor.read_id()?,
                stack_serial: cursor.read()?,
                name_id: cursor.read_id()?,
            },
            Tag::UnloadClass => RecordKind::UnloadClass {
                serial: cursor.read()?,
            },
            Tag::StackFrame => RecordKind::StackFrame(StackFrameRecord {
                frame_id: cursor.read_id()?,
                method_name_id: cursor.read_id()?,
                signature_id: cursor.read_id()?,
                source_file_id: cursor.read_id()?,
                class_serial: cursor.read()?,
                line: cursor.read()?,
            }),
            Tag::StackTrace => {
                let serial = cursor.read()?;
                let thread_serial = cursor.read()?;
                let count: u32 = cursor.read()?;
                RecordKind::StackTrace(StackTraceRecord {
                    serial,
                    thread_serial,
                    frame_ids: cursor.read_ids(count)?,
                })
            }
            Tag::StartThread => RecordKind::StartThread(StartThreadRecord {
                serial: cursor.read()?,
                thread_id: cursor.read_id()?,
                stack_serial: cursor.read()?,
                name_id: cursor.read_id()?,
                group_name_id: cursor.read_id()?,
                parent_group_name_id: cursor.read_id()?,
            }),
            Tag::EndThread => RecordKind::EndThread {
                serial: cursor.read()?,
            },
            Tag::HeapDumpEnd => RecordKind::HeapDumpEnd,
            Tag::AllocSites
            | Tag::HeapSummary
            | Tag::CpuSamples
            | Tag::ControlSettings
            | Tag::HeapDump
            | Tag::HeapDumpSegment => {
                return Ok(RecordKind::Skipped {
                    tag: tag as u8,
                    length: end - payload,
                })
            }
        };

        if cursor.position() != end {
            return Err(Error::LengthMismatch {
                offset,
                declared: end - payload,
                consumed: cursor.consumed(),
            });
        }
        Ok(kind)
    }

    fn sub_record(&mut self, end: u64) -> Result<Record> {
        let offset = self.position;
        let id_size = self.header.id_size;
        let mut cursor = Cursor::new(self.shards, id_size, offset, offset, end);

        let code: u8 = cursor.read()?;
        let Some(tag) = SubTag::from_code(code) else {
            return Err(Error::UnknownTag { tag: code, offset });
        };

        let kind = match tag {
            SubTag::HeapDumpInfo => RecordKind::HeapDumpInfo {
                heap_id: cursor.read()?,
                name_id: cursor.read_id()?,
            },
            SubTag::ClassDump => RecordKind::ClassDump(read_class_dump(&mut cursor)?),
            SubTag::InstanceDump => {
                let object_id = cursor.read_id()?;
                let stack_serial = cursor.read()?;
                let class_id = cursor.read_id()?;
                let len: u32 = cursor.read()?;
                RecordKind::InstanceDump(InstanceDump {
                    object_id,
                    stack_serial,
                    class_id,
                    data: cursor.read_array(len, 1)?.into_owned(),
                })
            }
            SubTag::ObjectArrayDump => {
                let object_id = cursor.read_id()?;
                let stack_serial = cursor.read()?;
                let count: u32 = cursor.read()?;
                let class_id = cursor.read_id()?;
                RecordKind::ObjectArrayDump(ObjectArrayDump {
                    object_id,
                    stack_serial,
                    class_id,
                    elements: cursor.read_ids(count)?,
                })
            }
            SubTag::PrimitiveArrayDump | SubTag::PrimitiveArrayNoData => {
                let object_id = cursor.read_id()?;
                let stack_serial = cursor.read()?;
                let length: u32 = cursor.read()?;
                let type_offset = cursor.position();
                let element_type = cursor.read_type()?;
                if element_type == BasicType::Object {
                    return Err(Error::UnknownType {
                        type_code: BasicType::Object as u8,
                        offset: type_offset,
                    });
                }

                let data = if tag == SubTag::PrimitiveArrayDump {
                    let size = element_type.size(id_size);
                    Some(cursor.read_array(length, size)?.into_owned())
                } else {
                    None
                };
                RecordKind::PrimitiveArrayDump(PrimitiveArrayDump {
                    object_id,
                    stack_serial,
                    element_type,
                    length,
                    data,
                })
            }
            root => RecordKind::Root(read_root(&mut cursor, root)?),
        };

        self.position = cursor.position();
        Ok(Record {
            offset,
            time: None,
            kind,
        })
    }
}

impl Iterator for RecordReader<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

impl std::iter::FusedIterator for RecordReader<'_> {}

fn read_root(cursor: &mut Cursor<'_>, tag: SubTag) -> Result<RootRecord> {
    let object_id = cursor.read_id()?;

    let kind = match tag {
        SubTag::RootUnknown => RootKind::Unknown,
        SubTag::RootJniGlobal => {
            let jni_ref = cursor.read_id()?;
            return Ok(RootRecord {
                jni_ref: Some(jni_ref),
                ..RootRecord::simple(RootKind::JniGlobal, object_id)
            });
        }
        SubTag::RootJniLocal | SubTag::RootJavaFrame | SubTag::RootJniMonitor => {
            let kind = match tag {
                SubTag::RootJniLocal => RootKind::JniLocal,
                SubTag::RootJavaFrame => RootKind::JavaFrame,
                _ => RootKind::JniMonitor,
            };
            let thread_serial = cursor.read()?;
            let frame = cursor.read()?;
            return Ok(RootRecord {
                thread_serial: Some(thread_serial),
                frame: Some(frame),
                ..RootRecord::simple(kind, object_id)
            });
        }
        SubTag::RootNativeStack | SubTag::RootThreadBlock => {
            let kind = if tag == SubTag::RootNativeStack {
                RootKind::NativeStack
            } else {
                RootKind::ThreadBlock
            };
            let thread_serial = cursor.read()?;
            return Ok(RootRecord {
                thread_serial: Some(thread_serial),
                ..RootRecord::simple(kind, object_id)
            });
        }
        SubTag::RootThreadObject => {
            let thread_serial = cursor.read()?;
            let stack_serial = cursor.read()?;
            return Ok(RootRecord {
                thread_serial: Some(thread_serial),
                stack_serial: Some(stack_serial),
                ..RootRecord::simple(RootKind::ThreadObject, object_id)
            });
        }
        SubTag::RootStickyClass => RootKind::SystemClass,
        SubTag::RootMonitorUsed => RootKind::BusyMonitor,
        SubTag::RootInternedString => RootKind::InternedString,
        SubTag::RootFinalizing => RootKind::Finalizing,
        SubTag::RootDebugger => RootKind::Debugger,
        SubTag::RootReferenceCleanup => RootKind::ReferenceCleanup,
        SubTag::RootVmInternal => RootKind::VmInternal,
        SubTag::RootUnreachable => RootKind::Unreachable,
        SubTag::ClassDump
        | SubTag::InstanceDump
        | SubTag::ObjectArrayDump
        | SubTag::PrimitiveArrayDump
        | SubTag::PrimitiveArrayNoData
        | SubTag::HeapDumpInfo => {
            return Err(malformed_error!(
                cursor.position(),
                "sub-record {} is not a root",
                tag
            ))
        }
    };

    Ok(RootRecord::simple(kind, object_id))
}

fn read_class_dump(cursor: &mut Cursor<'_>) -> Result<ClassDump> {
    let class_id = cursor.read_id()?;
    let stack_serial = cursor.read()?;
    let super_id = cursor.read_id()?;
    let loader_id = cursor.read_id()?;
    let signers_id = cursor.read_id()?;
    let protection_domain_id = cursor.read_id()?;
    // Two reserved ids
    cursor.read_id()?;
    cursor.read_id()?;
    let instance_size = cursor.read()?;

    let count: u16 = cursor.read()?;
    let mut constants = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        let index: u16 = cursor.read()?;
        let ty = cursor.read_type()?;
        constants.push((index, cursor.read_value(ty)?));
    }

    let count: u16 = cursor.read()?;
    let mut statics = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        let name_id = cursor.read_id()?;
        let ty = cursor.read_type()?;
        statics.push(StaticFieldRecord {
            name_id,
            value: cursor.read_value(ty)?,
        });
    }

    let count: u16 = cursor.read()?;
    let mut fields = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        fields.push(FieldRecord {
            name_id: cursor.read_id()?,
            ty: cursor.read_type()?,
        });
    }

    Ok(ClassDump {
        class_id,
        stack_serial,
        super_id,
        loader_id,
        signers_id,
        protection_domain_id,
        instance_size,
        constants,
        statics,
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{HprofWriter, SAMPLE_CLASS_ID};

    fn reader_over(data: Vec<u8>) -> ShardManager {
        ShardManager::from_mem(data, 64, 8).unwrap()
    }

    #[test]
    fn top_level_records() {
        let mut writer = HprofWriter::new(4);
        writer.string(0x10, "java.lang.String");
        writer.load_class(1, 0x100, 0x10);
        writer.stack_frame(0x40, 0x10, 0x10, 0x10, 1, 42);
        writer.stack_trace(7, 1, &[0x40]);
        writer.start_thread(3, 0x200, 7, 0x10);
        writer.record(0x0D, &[1, 2, 3]);

        let shards = reader_over(writer.finish());
        let records: Vec<Record> = RecordReader::new(&shards)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records.len(), 6);

        assert_eq!(
            records[0].kind,
            RecordKind::String {
                id: 0x10,
                value: "java.lang.String".to_string()
            }
        );
        assert_eq!(
            records[1].kind,
            RecordKind::LoadClass {
                serial: 1,
                class_id: 0x100,
                stack_serial: 0,
                name_id: 0x10
            }
        );
        match &records[2].kind {
            RecordKind::StackFrame(frame) => assert_eq!(frame.line, 42),
            other => panic!("unexpected {other:?}"),
        }
        match &records[3].kind {
            RecordKind::StackTrace(trace) => assert_eq!(trace.frame_ids, vec![0x40]),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(records[4].kind, RecordKind::StartThread(_)));
        assert_eq!(
            records[5].kind,
            RecordKind::Skipped {
                tag: 0x0D,
                length: 3
            }
        );
        assert!(records.iter().all(|r| r.time.is_some()));
    }

    #[test]
    fn segments_are_entered() {
        let mut writer = HprofWriter::new(8);
        writer.string(0x10, "Thing");
        writer.load_class(1, SAMPLE_CLASS_ID, 0x10);
        let mut segment = writer.segment();
        segment.heap_dump_info(65, 0x10);
        segment.class_dump(SAMPLE_CLASS_ID, 0, 8, &[]);
        segment.instance_dump(0x500, SAMPLE_CLASS_ID, &[0; 8]);
        segment.root_unknown(0x500);
        writer.heap_dump_segment(segment);
        writer.heap_dump_end();

        let shards = reader_over(writer.finish());
        let mut reader = RecordReader::new(&shards).unwrap();
        let kinds: Vec<RecordKind> = reader.by_ref().map(|r| r.unwrap().kind).collect();

        assert!(matches!(
            kinds[2],
            RecordKind::HeapDumpStart { segment: true, .. }
        ));
        assert!(matches!(
            kinds[3],
            RecordKind::HeapDumpInfo {
                heap_id: 65,
                name_id: 0x10
            }
        ));
        assert!(matches!(kinds[4], RecordKind::ClassDump(_)));
        assert!(matches!(kinds[5], RecordKind::InstanceDump(_)));
        assert_eq!(kinds[6].object_id(), Some(0x500));
        assert!(kinds[6].is_sub_record());
        assert_eq!(kinds[7], RecordKind::HeapDumpEnd);
        assert_eq!(kinds.len(), 8);
        assert_eq!(reader.records_read(), 8);
        assert!(reader.next().is_none());
    }

    #[test]
    fn all_root_layouts() {
        let mut writer = HprofWriter::new(4);
        let mut segment = writer.segment();
        segment.root_jni_global(1, 99);
        segment.root_thread_frame(0x02, 2, 5, 6);
        segment.root_thread_frame(0x03, 3, 5, 7);
        segment.root_thread_frame(0x8E, 4, 5, 8);
        segment.root_thread(0x04, 5, 5);
        segment.root_thread(0x06, 6, 5);
        segment.root_thread_object(7, 5, 11);
        for tag in [0x05, 0x07, 0x89, 0x8A, 0x8B, 0x8C, 0x8D, 0x90, 0xFF] {
            segment.root(tag, 8);
        }
        writer.heap_dump_segment(segment);

        let shards = reader_over(writer.finish());
        let roots: Vec<RootRecord> = RecordReader::new(&shards)
            .unwrap()
            .filter_map(|r| match r.unwrap().kind {
                RecordKind::Root(root) => Some(root),
                _ => None,
            })
            .collect();

        assert_eq!(roots.len(), 16);
        assert_eq!(roots[0].kind, RootKind::JniGlobal);
        assert_eq!(roots[0].jni_ref, Some(99));
        assert_eq!(roots[2].kind, RootKind::JavaFrame);
        assert_eq!(roots[2].frame, Some(7));
        assert_eq!(roots[3].kind, RootKind::JniMonitor);
        assert_eq!(roots[5].kind, RootKind::ThreadBlock);
        assert_eq!(roots[5].thread_serial, Some(5));
        assert_eq!(roots[6].stack_serial, Some(11));
        assert_eq!(roots[7].kind, RootKind::SystemClass);
        assert_eq!(roots[15].kind, RootKind::Unknown);
    }

    #[test]
    fn primitive_arrays() {
        let mut writer = HprofWriter::new(4);
        let mut segment = writer.segment();
        segment.primitive_array(0x30, BasicType::Short, &[0, 1, 0, 2, 0, 3]);
        segment.primitive_array_no_data(0x31, BasicType::Long, 100);
        writer.heap_dump(segment);

        let shards = reader_over(writer.finish());
        let arrays: Vec<PrimitiveArrayDump> = RecordReader::new(&shards)
            .unwrap()
            .filter_map(|r| match r.unwrap().kind {
                RecordKind::PrimitiveArrayDump(array) => Some(array),
                _ => None,
            })
            .collect();

        assert_eq!(arrays[0].length, 3);
        assert_eq!(arrays[0].data.as_deref(), Some(&[0, 1, 0, 2, 0, 3][..]));
        assert_eq!(arrays[1].length, 100);
        assert_eq!(arrays[1].element_type, BasicType::Long);
        assert!(arrays[1].data.is_none());
    }

    #[test]
    fn unknown_tags() {
        let mut writer = HprofWriter::new(4);
        writer.record(0x42, &[0; 4]);
        writer.string(0x10, "after");
        let data = writer.finish();

        let shards = reader_over(data.clone());
        let mut reader = RecordReader::new(&shards).unwrap();
        let offset = reader.position();
        assert!(matches!(
            reader.next(),
            Some(Err(Error::UnknownTag { tag: 0x42, offset: o })) if o == offset
        ));
        assert!(reader.next().is_none());

        let shards = reader_over(data);
        let kinds: Vec<RecordKind> = RecordReader::new(&shards)
            .unwrap()
            .skip_unknown_records(true)
            .map(|r| r.unwrap().kind)
            .collect();
        assert_eq!(kinds.len(), 2);
        assert_eq!(kinds[0], RecordKind::Skipped { tag: 0x42, length: 4 });
    }

    #[test]
    fn unknown_sub_tag() {
        let mut writer = HprofWriter::new(4);
        let mut segment = writer.segment();
        segment.raw(&[0x77, 0, 0, 0, 1]);
        writer.heap_dump_segment(segment);

        let shards = reader_over(writer.finish());
        let result: Result<Vec<Record>> = RecordReader::new(&shards).unwrap().collect();
        assert!(matches!(result, Err(Error::UnknownTag { tag: 0x77, .. })));
    }

    #[test]
    fn length_mismatch() {
        // LOAD CLASS declares one byte more than its layout
        let mut writer = HprofWriter::new(4);
        writer.record(0x02, &[0; 17]);
        let shards = reader_over(writer.finish());
        let result: Result<Vec<Record>> = RecordReader::new(&shards).unwrap().collect();
        assert!(matches!(
            result,
            Err(Error::LengthMismatch {
                declared: 17,
                consumed: 16,
                ..
            })
        ));

        // An instance dump overrunning its segment
        let mut writer = HprofWriter::new(4);
        let mut segment = writer.segment();
        segment.raw(&[0x21, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0, 16, 1, 2]);
        writer.heap_dump_segment(segment);
        let shards = reader_over(writer.finish());
        let result: Result<Vec<Record>> = RecordReader::new(&shards).unwrap().collect();
        assert!(matches!(result, Err(Error::LengthMismatch { .. })));
    }

    #[test]
    fn heap_dump_end_must_be_empty() {
        let mut writer = HprofWriter::new(4);
        writer.record(0x2C, &[1, 2, 3, 4]);
        let shards = reader_over(writer.finish());
        let result: Result<Vec<Record>> = RecordReader::new(&shards).unwrap().collect();
        assert!(matches!(
            result,
            Err(Error::LengthMismatch {
                declared: 4,
                consumed: 0,
                ..
            })
        ));

        let mut writer = HprofWriter::new(4);
        writer.heap_dump_end();
        let shards = reader_over(writer.finish());
        let records: Vec<Record> = RecordReader::new(&shards)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, RecordKind::HeapDumpEnd);
    }

    #[test]
    fn truncated_records() {
        let mut writer = HprofWriter::new(4);
        writer.string(0x10, "truncated string");
        let mut data = writer.finish();
        data.truncate(data.len() - 4);

        let shards = reader_over(data.clone());
        let result: Result<Vec<Record>> = RecordReader::new(&shards).unwrap().collect();
        assert!(matches!(result, Err(Error::Truncated { .. })));

        // Cut inside the nine-byte record header
        let header_len = HprofWriter::new(4).finish().len();
        data.truncate(header_len + 5);
        let shards = reader_over(data);
        let result: Result<Vec<Record>> = RecordReader::new(&shards).unwrap().collect();
        assert!(matches!(
            result,
            Err(Error::Truncated {
                needed: 9,
                available: 5,
                ..
            })
        ));
    }
}

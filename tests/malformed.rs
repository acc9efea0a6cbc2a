mod common;

use std::collections::BTreeSet;

use common::*;
use heapscope::{
    hprof::{BasicType, RecordReader, Value},
    Error, ParseOptions, ShardManager, Snapshot,
};

fn small_dump() -> Vec<u8> {
    let mut writer = HprofWriter::new(4);
    writer.string(1, "Pair").string(2, "left").load_class(1, 0x10, 1);
    let mut segment = writer.segment();
    segment
        .class_dump(0x10, 0, 4, &[(2, BasicType::Object)])
        .instance_dump(0x20, 0x10, &field_data(4, &[Value::Object(0x21)]))
        .primitive_array(0x21, BasicType::Char, &[0, 0x61, 0, 0x62])
        .root_unknown(0x20);
    writer.heap_dump_segment(segment).heap_dump_end();
    writer.finish()
}

/// Offsets at which a cut leaves only complete top-level records behind.
fn record_boundaries(data: &[u8]) -> BTreeSet<usize> {
    let shards = ShardManager::from_mem(data.to_vec(), 4096, 0).unwrap();
    let reader = RecordReader::new(&shards).unwrap();
    let mut boundaries: BTreeSet<usize> = BTreeSet::new();
    boundaries.insert(reader.header().length as usize);
    for record in reader {
        let record = record.unwrap();
        if record.time.is_some() {
            boundaries.insert(record.offset as usize);
        }
    }
    boundaries.insert(data.len());
    boundaries
}

#[test]
fn truncation_is_always_fatal() {
    let data = small_dump();
    let boundaries = record_boundaries(&data);

    for cut in 0..data.len() {
        let result = Snapshot::from_mem_with_options(data[..cut].to_vec(), &ParseOptions::sharded(16, 4));
        if boundaries.contains(&cut) {
            assert!(result.is_ok(), "cut at {cut} is a record boundary");
        } else {
            assert!(
                matches!(result, Err(Error::Truncated { .. })),
                "cut at {cut}: {result:?}"
            );
        }
    }
}

#[test]
fn rejected_headers() {
    let mut data = small_dump();
    data[0] = b'X';
    assert!(matches!(Snapshot::from_mem(data), Err(Error::InvalidHeader(_))));

    // Identifier size 3
    let mut data = small_dump();
    let body = "JAVA PROFILE 1.0.3\0".len();
    data[body..body + 4].copy_from_slice(&3u32.to_be_bytes());
    assert!(matches!(Snapshot::from_mem(data), Err(Error::InvalidHeader(_))));

    assert!(matches!(
        Snapshot::from_mem(Vec::new()),
        Err(Error::Truncated { .. })
    ));
}

#[test]
fn unknown_tags() {
    let mut writer = HprofWriter::new(8);
    writer.record(0x55, &[9; 12]).string(1, "still read");
    let data = writer.finish();

    let strict = Snapshot::from_mem(data.clone());
    assert!(matches!(strict, Err(Error::UnknownTag { tag: 0x55, .. })));

    let lenient = Snapshot::from_mem_with_options(data, &ParseOptions::lenient()).unwrap();
    assert_eq!(lenient.string(1), Some("still read"));
    assert_eq!(lenient.diagnostics().warning_count(), 1);

    // Unknown sub-record tags are fatal even in lenient mode
    let mut writer = HprofWriter::new(8);
    let mut segment = writer.segment();
    segment.raw(&[0x99]);
    writer.heap_dump_segment(segment);
    assert!(matches!(
        Snapshot::from_mem_with_options(writer.finish(), &ParseOptions::lenient()),
        Err(Error::UnknownTag { tag: 0x99, .. })
    ));
}

#[test]
fn bad_type_codes() {
    let mut writer = HprofWriter::new(4);
    let mut segment = writer.segment();
    // Class dump with one instance field of type 3
    segment.raw(&[0x20]);
    segment.raw(&[0, 0, 0, 0x10, 0, 0, 0, 0]);
    segment.raw(&[0; 24]);
    segment.raw(&[0, 0, 0, 4, 0, 0, 0, 0, 0, 1, 0, 0, 0, 2, 3]);
    writer.heap_dump_segment(segment);
    assert!(matches!(
        Snapshot::from_mem(writer.finish()),
        Err(Error::UnknownType { type_code: 3, .. })
    ));
}

#[test]
fn segment_overrun() {
    // Object array claiming more elements than the segment holds
    let mut writer = HprofWriter::new(4);
    let mut segment = writer.segment();
    segment.raw(&[0x22, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 9, 0, 0, 0, 0x10, 0, 0, 0, 2]);
    writer.heap_dump_segment(segment);
    assert!(matches!(
        Snapshot::from_mem(writer.finish()),
        Err(Error::LengthMismatch { .. })
    ));
}

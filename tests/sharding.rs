mod common;

use std::io::Write;

use common::*;
use heapscope::{
    hprof::{RecordKind, RecordReader},
    ParseOptions, ShardManager, Snapshot,
};
use tempfile::NamedTempFile;

/// Everything a consumer can observe about a snapshot, in a comparable form.
fn fingerprint(snapshot: &Snapshot) -> Vec<String> {
    let mut out = Vec::new();
    for heap in snapshot.heaps() {
        out.push(format!(
            "heap {} {} classes={} instances={}",
            heap.id(),
            heap.name(),
            heap.class_count(),
            heap.instance_count()
        ));
    }
    for root in snapshot.gc_roots() {
        out.push(format!("root {} 0x{:x} {}", root.kind, root.id, root.target));
    }
    for class in snapshot.classes() {
        out.push(format!(
            "class {} heap={} super={} instances={}",
            class.name,
            class.heap,
            class.super_class,
            class.instance_count()
        ));
    }
    for instance in snapshot.instances() {
        out.push(format!(
            "instance 0x{:x} class={} size={} {:?}",
            instance.id,
            instance.class,
            instance.size(),
            instance.kind
        ));
    }
    out.push(snapshot.diagnostics().summary());
    out
}

#[test]
fn shard_geometry_does_not_change_results() {
    for id_size in [4, 8] {
        let data = sample_dump(id_size);
        let reference = fingerprint(&Snapshot::from_mem(data.clone()).unwrap());

        for (shard_size, padding) in [(4096, 128), (9973, 8), (64, 16), (31, 30), (1, 0)] {
            let options = ParseOptions::sharded(shard_size, padding);
            let snapshot = Snapshot::from_mem_with_options(data.clone(), &options).unwrap();
            assert_eq!(
                fingerprint(&snapshot),
                reference,
                "id size {id_size}, shards ({shard_size}, {padding})"
            );
        }
    }
}

#[test]
fn file_backed_parse_matches_memory() {
    let data = sample_dump(8);
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&data).unwrap();
    file.flush().unwrap();

    let from_mem = Snapshot::from_mem(data).unwrap();
    let from_file = Snapshot::from_file(file.path()).unwrap();
    assert_eq!(fingerprint(&from_file), fingerprint(&from_mem));

    let sharded =
        Snapshot::from_file_with_options(file.path(), &ParseOptions::sharded(4096, 128)).unwrap();
    assert_eq!(fingerprint(&sharded), fingerprint(&from_mem));
}

#[test]
fn stitched_reads_match_single_window() {
    let data = sample_dump(4);
    let whole = ShardManager::from_mem(data.clone(), data.len(), 0).unwrap();
    let small = ShardManager::from_mem(data.clone(), 97, 13).unwrap();
    assert!(small.shard_count() > 1);

    for (offset, len) in [(0, 31), (90, 20), (96, 300), (1000, 4000), (0, data.len())] {
        let len = len.min(data.len() - offset);
        let expected = &data[offset..offset + len];
        assert_eq!(&*whole.read_bytes(offset as u64, len).unwrap(), expected);
        assert_eq!(&*small.read_bytes(offset as u64, len).unwrap(), expected);
    }
}

#[test]
fn reader_yields_same_records_for_any_geometry() {
    let data = sample_dump(8);
    let collect = |shards: &ShardManager| -> Vec<RecordKind> {
        RecordReader::new(shards)
            .unwrap()
            .map(|record| record.unwrap().kind)
            .collect()
    };

    let whole = collect(&ShardManager::from_mem(data.clone(), data.len(), 0).unwrap());
    let small = collect(&ShardManager::from_mem(data, 50, 7).unwrap());
    assert_eq!(whole, small);
    assert!(matches!(whole.last(), Some(RecordKind::HeapDumpEnd)));
}

#[test]
fn parsing_twice_is_stable() {
    let first = Snapshot::from_mem(sample_dump(8)).unwrap();
    let second = Snapshot::from_mem(sample_dump(8)).unwrap();
    assert_eq!(first.gc_roots(), second.gc_roots());
    assert_eq!(first.class_count(), second.class_count());
    assert_eq!(first.instance_count(), second.instance_count());
}

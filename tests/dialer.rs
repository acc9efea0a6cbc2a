use std::path::PathBuf;

use heapscope::{ParseOptions, Snapshot};

fn fixture() -> Option<PathBuf> {
    let path =
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/samples/dialer.android-hprof");
    path.exists().then_some(path)
}

fn verify(snapshot: &Snapshot) {
    assert_eq!(snapshot.gc_roots().len(), 11182);

    let app = snapshot.heap(65).unwrap();
    assert_eq!(app.name(), "app");
    assert_eq!(app.class_count(), 38);
    assert_eq!(app.instance_count(), 1406);

    let zygote = snapshot.heap(90).unwrap();
    assert_eq!(zygote.name(), "zygote");
    assert_eq!(zygote.class_count(), 3533);
    assert_eq!(zygote.instance_count(), 38710);

    let string = snapshot.find_class("java.lang.String").unwrap();
    assert!(string.instance_count() > 0);
    assert!(snapshot
        .superclasses(string)
        .any(|c| c.name == "java.lang.Object"));
}

#[test]
fn dialer() {
    let Some(path) = fixture() else {
        return;
    };

    let whole = Snapshot::from_file(&path).unwrap();
    verify(&whole);

    for (shard_size, padding) in [(4096, 128), (9973, 8)] {
        let options = ParseOptions::sharded(shard_size, padding);
        let sharded = Snapshot::from_file_with_options(&path, &options).unwrap();
        verify(&sharded);
        assert_eq!(sharded.gc_roots(), whole.gc_roots());
        assert_eq!(sharded.heap_ids().collect::<Vec<_>>(), whole.heap_ids().collect::<Vec<_>>());
    }
}

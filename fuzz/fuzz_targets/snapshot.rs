#![no_main]

use libfuzzer_sys::fuzz_target;
use heapscope::{ParseOptions, Snapshot};

fuzz_target!(|data: &[u8]| {
    let _ = Snapshot::from_mem(data.to_vec());
    let _ = Snapshot::from_mem_with_options(data.to_vec(), &ParseOptions::sharded(61, 7));
});

//! A small two-heap dump shaped like an Android app dump.
//!
//! Zygote heap (90): `java.lang.Object`, `int[]` and `java.lang.Object[]` plus a large `int[]`
//! instance. App heap (65): `com.example.Node` with two linked instances, an object array,
//! a large `byte[]` (no `byte[]` class is dumped) and a root pointing at an id nobody defines.
//! The large arrays make records straddle small shard boundaries.

use super::hprof::{BasicType, ObjectId, Value};

use super::writer::{field_data, HprofWriter};

pub const OBJECT_CLASS_ID: ObjectId = 0x1000;
pub const SAMPLE_CLASS_ID: ObjectId = 0x1100;
pub const INT_ARRAY_CLASS_ID: ObjectId = 0x1200;
pub const OBJECT_ARRAY_CLASS_ID: ObjectId = 0x1300;

pub const FIRST_NODE_ID: ObjectId = 0x3000;
pub const SECOND_NODE_ID: ObjectId = 0x3001;
pub const NODE_ARRAY_ID: ObjectId = 0x3100;
pub const BYTES_ID: ObjectId = 0x3200;
pub const INTS_ID: ObjectId = 0x2000;
pub const DANGLING_ID: ObjectId = 0xDEAD;

pub const INT_ARRAY_LEN: usize = 1000;
pub const BYTE_ARRAY_LEN: usize = 3000;

pub fn sample_dump(id_size: usize) -> Vec<u8> {
    let mut writer = HprofWriter::new(id_size);
    writer
        .string(1, "app")
        .string(2, "zygote")
        .string(3, "java.lang.Object")
        .string(4, "com.example.Node")
        .string(5, "value")
        .string(6, "next")
        .string(7, "count")
        .string(8, "int[]")
        .string(9, "java.lang.Object[]")
        .load_class(1, OBJECT_CLASS_ID, 3)
        .load_class(2, SAMPLE_CLASS_ID, 4)
        .load_class(3, INT_ARRAY_CLASS_ID, 8)
        .load_class(4, OBJECT_ARRAY_CLASS_ID, 9);

    let ints: Vec<u8> = (0..INT_ARRAY_LEN as u32).flat_map(u32::to_be_bytes).collect();
    let mut zygote = writer.segment();
    zygote
        .heap_dump_info(90, 2)
        .class_dump(OBJECT_CLASS_ID, 0, 0, &[])
        .class_dump(INT_ARRAY_CLASS_ID, OBJECT_CLASS_ID, 0, &[])
        .class_dump(OBJECT_ARRAY_CLASS_ID, OBJECT_CLASS_ID, 0, &[])
        .root(0x05, OBJECT_CLASS_ID)
        .primitive_array(INTS_ID, BasicType::Int, &ints);
    writer.heap_dump_segment(zygote);

    let bytes: Vec<u8> = (0..BYTE_ARRAY_LEN).map(|i| (i % 251) as u8).collect();
    let mut app = writer.segment();
    app.heap_dump_info(65, 1)
        .class_dump_full(
            SAMPLE_CLASS_ID,
            OBJECT_CLASS_ID,
            0,
            (4 + id_size) as u32,
            &[],
            &[(7, Value::Int(2))],
            &[(5, BasicType::Int), (6, BasicType::Object)],
        )
        .instance_dump(
            FIRST_NODE_ID,
            SAMPLE_CLASS_ID,
            &field_data(id_size, &[Value::Int(1), Value::Object(SECOND_NODE_ID)]),
        )
        .instance_dump(
            SECOND_NODE_ID,
            SAMPLE_CLASS_ID,
            &field_data(id_size, &[Value::Int(2), Value::Object(0)]),
        )
        .object_array(
            NODE_ARRAY_ID,
            OBJECT_ARRAY_CLASS_ID,
            &[FIRST_NODE_ID, SECOND_NODE_ID, 0],
        )
        .primitive_array(BYTES_ID, BasicType::Byte, &bytes)
        .root_jni_global(FIRST_NODE_ID, 0x77)
        .root_unknown(DANGLING_ID);
    writer.heap_dump_segment(app);
    writer.heap_dump_end();

    writer.finish()
}

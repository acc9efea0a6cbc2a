//! Snapshot construction from the record stream.

use std::{
    collections::{hash_map::Entry, BTreeMap, HashMap},
    sync::Arc,
};

use crate::{
    config::ParseOptions,
    diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSeverity, DiagnosticSink, Diagnostics},
    file::ShardManager,
    hprof::{
        ClassDump, Header, InstanceDump, ObjectArrayDump, ObjectId, PrimitiveArrayDump, Record,
        RecordKind, RecordReader, RootKind, RootRecord, StackFrameRecord, StartThreadRecord,
        Tag,
    },
    Result,
};

use super::{
    class::{ClassObj, Field, StaticField},
    heap::Heap,
    instance::{Instance, InstanceKind},
    reference::{ClassIdx, InstanceIdx, ObjectRef, Reference},
    resolve,
    root::GcRoot,
    stack::{LineNumber, StackFrame, StackTrace, ThreadObj},
    Snapshot,
};

/// What a LOAD CLASS record says about a class object.
#[derive(Debug, Clone, Copy)]
struct LoadedClass {
    serial: u32,
    name_id: ObjectId,
}

/// Assembles a [`Snapshot`] from decoded records.
///
/// Records are fed in file order with [`SnapshotBuilder::push`]. Classes, instances and
/// roots are created immediately in the heap that is current at that point, with every
/// reference left [`Reference::Unresolved`]; [`SnapshotBuilder::finish`] names them and runs
/// the resolution pass.
///
/// # Examples
///
/// ```rust,no_run
/// use heapscope::{file::ShardManager, hprof::RecordReader, Diagnostics, ParseOptions};
/// use heapscope::snapshot::SnapshotBuilder;
/// use std::sync::Arc;
///
/// let shards = ShardManager::open("app.hprof", 1 << 30, 1024)?;
/// let reader = RecordReader::new(&shards)?;
/// let mut builder = SnapshotBuilder::new(
///     reader.header().clone(),
///     &ParseOptions::default(),
///     Arc::new(Diagnostics::new()),
/// );
/// for record in reader {
///     builder.push(record?);
/// }
/// let snapshot = builder.finish();
/// # Ok::<(), heapscope::Error>(())
/// ```
pub struct SnapshotBuilder {
    options: ParseOptions,
    header: Header,
    diagnostics: Arc<Diagnostics>,
    current_heap: u32,
    heaps: BTreeMap<u32, Heap>,
    classes: Vec<ClassObj>,
    instances: Vec<Instance>,
    objects: HashMap<ObjectId, ObjectRef>,
    roots: Vec<GcRoot>,
    strings: HashMap<ObjectId, String>,
    loaded: HashMap<ObjectId, LoadedClass>,
    frames: Vec<StackFrameRecord>,
    traces: HashMap<u32, StackTrace>,
    started: Vec<StartThreadRecord>,
    threads: BTreeMap<u32, ThreadObj>,
    heap_dumps: usize,
}

impl SnapshotBuilder {
    /// Creates an empty builder for a dump with the given header.
    #[must_use]
    pub fn new(header: Header, options: &ParseOptions, diagnostics: Arc<Diagnostics>) -> Self {
        SnapshotBuilder {
            options: *options,
            header,
            diagnostics,
            current_heap: 0,
            heaps: BTreeMap::new(),
            classes: Vec::new(),
            instances: Vec::new(),
            objects: HashMap::new(),
            roots: Vec::new(),
            strings: HashMap::new(),
            loaded: HashMap::new(),
            frames: Vec::new(),
            traces: HashMap::new(),
            started: Vec::new(),
            threads: BTreeMap::new(),
            heap_dumps: 0,
        }
    }

    /// Heap id objects are currently attributed to.
    #[must_use]
    pub fn current_heap(&self) -> u32 {
        self.current_heap
    }

    /// Applies one record.
    pub fn push(&mut self, record: Record) {
        let offset = record.offset;
        match record.kind {
            RecordKind::String { id, value } => {
                self.strings.insert(id, value);
            }
            RecordKind::LoadClass {
                serial,
                class_id,
                name_id,
                ..
            } => {
                self.loaded.insert(class_id, LoadedClass { serial, name_id });
            }
            RecordKind::UnloadClass { serial } => {
                log::trace!("class serial {serial} unloaded at {offset}");
            }
            RecordKind::StackFrame(frame) => self.frames.push(frame),
            RecordKind::StackTrace(trace) => {
                self.traces.insert(
                    trace.serial,
                    StackTrace {
                        serial: trace.serial,
                        thread_serial: trace.thread_serial,
                        frames: trace.frame_ids,
                    },
                );
            }
            RecordKind::StartThread(thread) => {
                let entry = self.threads.entry(thread.serial).or_default();
                entry.serial = thread.serial;
                entry.id = thread.thread_id;
                entry.stack_serial = thread.stack_serial;
                self.started.push(thread);
            }
            RecordKind::EndThread { serial } => {
                log::trace!("thread {serial} ended at {offset}");
            }
            RecordKind::HeapDumpStart { segment, length } => {
                self.heap_dumps += 1;
                log::trace!(
                    "heap dump {} of {length} bytes at {offset}",
                    if segment { "segment" } else { "record" }
                );
            }
            RecordKind::HeapDumpEnd => {}
            RecordKind::HeapDumpInfo { heap_id, name_id } => {
                self.current_heap = heap_id;
                self.heap_mut().name_id = Some(name_id);
            }
            RecordKind::Root(root) => self.add_root(root, offset),
            RecordKind::ClassDump(class) => self.add_class(class, offset),
            RecordKind::InstanceDump(instance) => self.add_instance(instance, offset),
            RecordKind::ObjectArrayDump(array) => self.add_object_array(array, offset),
            RecordKind::PrimitiveArrayDump(array) => self.add_primitive_array(array, offset),
            RecordKind::Skipped { tag, length } => match Tag::from_code(tag) {
                Some(known) => log::debug!("skipped {known} record of {length} bytes at {offset}"),
                None => self.diagnostics.push(
                    Diagnostic::new(
                        DiagnosticSeverity::Warning,
                        DiagnosticCategory::Record,
                        format!("skipped record with unknown tag 0x{tag:02x} ({length} bytes)"),
                    )
                    .with_offset(offset),
                ),
            },
        }
    }

    /// Names every entity, resolves every reference and returns the finished snapshot.
    #[must_use]
    pub fn finish(mut self) -> Snapshot {
        let options = self.options;
        self.name_heaps();
        self.name_classes();
        let frames = self.stack_frames();
        self.name_threads();
        self.check_thread_roots();
        if self.heap_dumps == 0 {
            self.diagnostics
                .info(DiagnosticCategory::General, "dump contains no heap dump records");
        }

        log::debug!(
            "read {} classes, {} instances and {} roots in {} heap(s)",
            self.classes.len(),
            self.instances.len(),
            self.roots.len(),
            self.heaps.len()
        );

        let mut snapshot = Snapshot {
            header: self.header,
            heaps: self.heaps,
            classes: self.classes,
            instances: self.instances,
            objects: self.objects,
            roots: self.roots,
            strings: self.strings,
            classes_by_name: HashMap::new(),
            frames,
            traces: self.traces,
            threads: self.threads,
            diagnostics: self.diagnostics,
        };
        resolve::resolve(&mut snapshot, &options);
        snapshot
    }

    fn heap_mut(&mut self) -> &mut Heap {
        let id = self.current_heap;
        self.heaps.entry(id).or_insert_with(|| Heap::new(id))
    }

    /// Registers `id` in the object table; a second definition of an id is reported and
    /// dropped.
    fn claim_id(&mut self, id: ObjectId, target: ObjectRef, offset: u64) -> bool {
        match self.objects.entry(id) {
            Entry::Vacant(slot) => {
                slot.insert(target);
                true
            }
            Entry::Occupied(_) => {
                let category = match target {
                    ObjectRef::Class(_) => DiagnosticCategory::Class,
                    ObjectRef::Instance(_) => DiagnosticCategory::Instance,
                };
                self.diagnostics.push(
                    Diagnostic::new(
                        DiagnosticSeverity::Warning,
                        category,
                        format!("duplicate object id 0x{id:x}, keeping the first definition"),
                    )
                    .with_offset(offset)
                    .with_object(id),
                );
                false
            }
        }
    }

    fn add_root(&mut self, root: RootRecord, offset: u64) {
        if root.kind == RootKind::ThreadObject {
            if let Some(serial) = root.thread_serial {
                let thread = self.threads.entry(serial).or_default();
                thread.serial = serial;
                thread.id = root.object_id;
                thread.stack_serial = root.stack_serial.unwrap_or(thread.stack_serial);
            }
        }

        let index = self.roots.len();
        self.roots.push(GcRoot {
            kind: root.kind,
            id: root.object_id,
            target: Reference::from_id(root.object_id),
            heap: self.current_heap,
            thread_serial: root.thread_serial,
            frame: root.frame,
            jni_ref: root.jni_ref,
            offset,
        });
        self.heap_mut().roots.push(index);
    }

    fn add_class(&mut self, class: ClassDump, offset: u64) {
        let idx = ClassIdx(self.classes.len());
        if !self.claim_id(class.class_id, ObjectRef::Class(idx), offset) {
            return;
        }

        let heap = self.current_heap;
        let unnamed: Arc<str> = Arc::from("");
        self.classes.push(ClassObj {
            id: class.class_id,
            name: String::new(),
            heap,
            offset,
            serial: None,
            stack_serial: class.stack_serial,
            super_class: Reference::from_id(class.super_id),
            class_loader: Reference::from_id(class.loader_id),
            signers_id: class.signers_id,
            protection_domain_id: class.protection_domain_id,
            instance_size: class.instance_size,
            constants: class
                .constants
                .into_iter()
                .map(|(index, value)| (index, value.map_object(Reference::from_id)))
                .collect(),
            statics: class
                .statics
                .into_iter()
                .map(|s| StaticField {
                    name_id: s.name_id,
                    name: unnamed.clone(),
                    value: s.value.map_object(Reference::from_id),
                })
                .collect(),
            fields: class
                .fields
                .into_iter()
                .map(|f| Field {
                    name_id: f.name_id,
                    name: unnamed.clone(),
                    ty: f.ty,
                })
                .collect(),
            subclasses: Vec::new(),
            instances: Vec::new(),
        });
        self.heap_mut().classes.push(idx);
    }

    fn push_instance(&mut self, instance: Instance) {
        let idx = InstanceIdx(self.instances.len());
        if !self.claim_id(instance.id, ObjectRef::Instance(idx), instance.offset) {
            return;
        }
        self.instances.push(instance);
        self.heap_mut().instances.push(idx);
    }

    fn add_instance(&mut self, instance: InstanceDump, offset: u64) {
        self.push_instance(Instance {
            id: instance.object_id,
            heap: self.current_heap,
            offset,
            class: Reference::from_id(instance.class_id),
            stack_serial: instance.stack_serial,
            kind: InstanceKind::Object {
                data: instance.data,
                fields: Vec::new(),
            },
            size: 0,
        });
    }

    fn add_object_array(&mut self, array: ObjectArrayDump, offset: u64) {
        self.push_instance(Instance {
            id: array.object_id,
            heap: self.current_heap,
            offset,
            class: Reference::from_id(array.class_id),
            stack_serial: array.stack_serial,
            kind: InstanceKind::ObjectArray {
                elements: array.elements.into_iter().map(Reference::from_id).collect(),
            },
            size: 0,
        });
    }

    fn add_primitive_array(&mut self, array: PrimitiveArrayDump, offset: u64) {
        self.push_instance(Instance {
            id: array.object_id,
            heap: self.current_heap,
            offset,
            class: Reference::Null,
            stack_serial: array.stack_serial,
            kind: InstanceKind::PrimitiveArray {
                element_type: array.element_type,
                length: array.length,
                data: array.data,
            },
            size: 0,
        });
    }

    fn name_heaps(&mut self) {
        for heap in self.heaps.values_mut() {
            let Some(name_id) = heap.name_id else {
                continue;
            };
            match self.strings.get(&name_id) {
                Some(name) => heap.name.clone_from(name),
                None => self.diagnostics.push(
                    Diagnostic::new(
                        DiagnosticSeverity::Warning,
                        DiagnosticCategory::Heap,
                        format!(
                            "name string 0x{name_id:x} of heap {} is missing, using '{}'",
                            heap.id, heap.name
                        ),
                    )
                    .with_object(name_id),
                ),
            }
        }
    }

    fn name_classes(&mut self) {
        let mut names: HashMap<ObjectId, Arc<str>> = HashMap::new();
        let strings = &self.strings;
        let mut intern = |id: ObjectId| -> Arc<str> {
            names
                .entry(id)
                .or_insert_with(|| match strings.get(&id) {
                    Some(name) => Arc::from(name.as_str()),
                    None => Arc::from(format!("<unnamed field 0x{id:x}>")),
                })
                .clone()
        };

        for class in &mut self.classes {
            let loaded = self.loaded.get(&class.id);
            match loaded.and_then(|l| strings.get(&l.name_id)) {
                Some(name) => class.name.clone_from(name),
                None => {
                    class.name = format!("<unnamed class 0x{:x}>", class.id);
                    self.diagnostics.push(
                        Diagnostic::new(
                            DiagnosticSeverity::Warning,
                            DiagnosticCategory::Class,
                            format!("class 0x{:x} has no name", class.id),
                        )
                        .with_offset(class.offset)
                        .with_object(class.id),
                    );
                }
            }
            class.serial = loaded.map(|l| l.serial);

            for field in &mut class.fields {
                field.name = intern(field.name_id);
            }
            for field in &mut class.statics {
                field.name = intern(field.name_id);
            }
        }
    }

    fn stack_frames(&mut self) -> HashMap<ObjectId, StackFrame> {
        let strings = &self.strings;
        let string = |id: ObjectId| strings.get(&id).cloned().unwrap_or_default();
        self.frames
            .drain(..)
            .map(|frame| {
                (
                    frame.frame_id,
                    StackFrame {
                        id: frame.frame_id,
                        method: string(frame.method_name_id),
                        signature: string(frame.signature_id),
                        source_file: string(frame.source_file_id),
                        class_serial: frame.class_serial,
                        line: LineNumber::from(frame.line),
                    },
                )
            })
            .collect()
    }

    /// Thread-object roots whose stack trace serial names no STACK TRACE record.
    fn check_thread_roots(&self) {
        for root in &self.roots {
            if root.kind != RootKind::ThreadObject {
                continue;
            }
            let Some(thread) = root.thread_serial.and_then(|s| self.threads.get(&s)) else {
                continue;
            };
            if thread.stack_serial != 0 && !self.traces.contains_key(&thread.stack_serial) {
                self.diagnostics.push(
                    Diagnostic::new(
                        DiagnosticSeverity::Warning,
                        DiagnosticCategory::Root,
                        format!(
                            "thread {} refers to missing stack trace {}",
                            thread.serial, thread.stack_serial
                        ),
                    )
                    .with_offset(root.offset)
                    .with_object(root.id),
                );
            }
        }
    }

    fn name_threads(&mut self) {
        for started in &self.started {
            if let Some(thread) = self.threads.get_mut(&started.serial) {
                thread.name = self.strings.get(&started.name_id).cloned();
                thread.group_name = self.strings.get(&started.group_name_id).cloned();
                thread.parent_group_name =
                    self.strings.get(&started.parent_group_name_id).cloned();
            }
        }
    }
}

/// Reads every record of `shards` and builds the snapshot.
pub(crate) fn build(
    shards: &ShardManager,
    options: &ParseOptions,
    sink: Option<Arc<dyn DiagnosticSink>>,
) -> Result<Snapshot> {
    let diagnostics = Arc::new(match sink {
        Some(sink) => Diagnostics::with_sink(sink),
        None => Diagnostics::new(),
    });

    let reader = RecordReader::new(shards)?.skip_unknown_records(options.skip_unknown_records);
    let mut builder = SnapshotBuilder::new(reader.header().clone(), options, diagnostics);
    for record in reader {
        builder.push(record?);
    }

    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hprof::BasicType;
    use crate::test::HprofWriter;

    fn build_from(writer: HprofWriter) -> Snapshot {
        let shards = ShardManager::from_mem(writer.finish(), 256, 16).unwrap();
        build(&shards, &ParseOptions::default(), None).unwrap()
    }

    #[test]
    fn heaps_are_created_lazily() {
        let mut writer = HprofWriter::new(4);
        writer.string(1, "app");
        writer.string(2, "Thing");
        writer.load_class(1, 0x100, 2);
        let mut segment = writer.segment();
        segment.heap_dump_info(65, 1);
        segment.class_dump(0x100, 0, 0, &[]);
        segment.instance_dump(0x200, 0x100, &[]);
        writer.heap_dump_segment(segment);

        let snapshot = build_from(writer);
        assert_eq!(snapshot.heap_ids().collect::<Vec<_>>(), vec![65]);
        assert!(snapshot.heap(0).is_none());

        let heap = snapshot.heap(65).unwrap();
        assert_eq!(heap.name(), "app");
        assert_eq!(heap.class_count(), 1);
        assert_eq!(heap.instance_count(), 1);
    }

    #[test]
    fn heap_survives_segment_boundaries() {
        let mut writer = HprofWriter::new(4);
        writer.string(1, "zygote");
        let mut segment = writer.segment();
        segment.primitive_array(0x10, BasicType::Byte, &[1, 2]);
        segment.heap_dump_info(90, 1);
        segment.primitive_array(0x11, BasicType::Byte, &[1, 2]);
        writer.heap_dump_segment(segment);
        let mut segment = writer.segment();
        segment.primitive_array(0x12, BasicType::Byte, &[1, 2]);
        writer.heap_dump_segment(segment);

        let snapshot = build_from(writer);
        assert_eq!(snapshot.heap(0).unwrap().name(), "default");
        assert_eq!(snapshot.heap(0).unwrap().instance_count(), 1);
        assert_eq!(snapshot.heap(90).unwrap().instance_count(), 2);
        assert_eq!(snapshot.instance(0x12).unwrap().heap, 90);
    }

    #[test]
    fn roots_create_their_heap() {
        let mut writer = HprofWriter::new(4);
        writer.string(1, "app");
        let mut segment = writer.segment();
        segment.root_unknown(0x10);
        segment.heap_dump_info(65, 1);
        segment.root_unknown(0x11).root_unknown(0x12);
        writer.heap_dump_segment(segment);

        let snapshot = build_from(writer);
        assert_eq!(snapshot.heap_ids().collect::<Vec<_>>(), vec![0, 65]);

        let default = snapshot.heap(0).unwrap();
        assert_eq!(default.name(), "default");
        assert_eq!(default.class_count(), 0);
        assert_eq!(default.instance_count(), 0);
        assert_eq!(default.roots().map(|r| r.id).collect::<Vec<_>>(), vec![0x10]);

        let app = snapshot.heap(65).unwrap();
        assert_eq!(app.root_count(), 2);
        assert!(snapshot.gc_roots().iter().all(|r| snapshot.heap(r.heap).is_some()));
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let mut writer = HprofWriter::new(4);
        let mut segment = writer.segment();
        segment.primitive_array(0x10, BasicType::Int, &[0, 0, 0, 1]);
        segment.primitive_array(0x10, BasicType::Byte, &[1]);
        writer.heap_dump_segment(segment);

        let snapshot = build_from(writer);
        assert_eq!(snapshot.instance_count(), 1);
        assert_eq!(snapshot.instance(0x10).unwrap().size(), 4);
        assert_eq!(
            snapshot
                .diagnostics()
                .by_category(DiagnosticCategory::Instance)
                .len(),
            1
        );
    }

    #[test]
    fn unknown_records_are_reported() {
        let mut writer = HprofWriter::new(4);
        writer.record(0x42, &[1, 2, 3]);
        writer.record(0x0E, &[0; 6]);
        let shards = ShardManager::from_mem(writer.finish(), 256, 16).unwrap();

        assert!(build(&shards, &ParseOptions::default(), None).is_err());

        let snapshot = build(&shards, &ParseOptions::lenient(), None).unwrap();
        let skipped = snapshot.diagnostics().by_category(DiagnosticCategory::Record);
        assert_eq!(skipped.len(), 1);
        assert!(skipped[0].message.contains("0x42"));
    }

    #[test]
    fn threads_and_frames() {
        let mut writer = HprofWriter::new(8);
        writer.string(1, "main");
        writer.string(2, "run");
        writer.string(3, "()V");
        writer.string(4, "Main.java");
        writer.stack_frame(0x50, 2, 3, 4, 1, 12);
        writer.stack_trace(9, 1, &[0x50]);
        writer.start_thread(1, 0x300, 9, 1);
        let mut segment = writer.segment();
        segment.root_thread_object(0x300, 1, 9);
        writer.heap_dump_segment(segment);

        let snapshot = build_from(writer);
        let thread = snapshot.thread(1).unwrap();
        assert_eq!(thread.name.as_deref(), Some("main"));
        assert_eq!(thread.id, 0x300);

        let trace = snapshot.stack_trace(thread.stack_serial).unwrap();
        let frame = snapshot.stack_frame(trace.frames[0]).unwrap();
        assert_eq!(frame.to_string(), "run()V (Main.java:12)");
        assert!(snapshot
            .diagnostics()
            .by_category(DiagnosticCategory::Root)
            .is_empty());
    }

    #[test]
    fn thread_root_with_missing_trace() {
        let mut writer = HprofWriter::new(4);
        let mut segment = writer.segment();
        segment.root_thread_object(0x300, 1, 4);
        segment.root_thread_object(0x301, 2, 0);
        writer.heap_dump_segment(segment);

        let snapshot = build_from(writer);
        let roots = snapshot.diagnostics().by_category(DiagnosticCategory::Root);
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].object_id, Some(0x300));
        assert!(roots[0].message.contains("stack trace 4"));
    }

    #[test]
    fn dump_without_heap_records() {
        let mut writer = HprofWriter::new(4);
        writer.string(1, "lonely");

        let snapshot = build_from(writer);
        let general = snapshot.diagnostics().by_category(DiagnosticCategory::General);
        assert_eq!(general.len(), 1);
        assert_eq!(snapshot.diagnostics().info_count(), 1);
        assert!(!snapshot.diagnostics().has_warnings());
        assert_eq!(snapshot.heap_ids().count(), 0);
    }
}

//! Heap graph model and builder.
//!
//! A [`Snapshot`] is the fully resolved object graph of one heap dump: its heaps, the classes
//! and instances in them, the GC roots, and the supporting string, stack and thread tables.
//!
//! # Architecture
//!
//! The object graph is cyclic (classes reference their instances' classes, instances
//! reference each other freely), so objects live in two arenas owned by the snapshot and
//! refer to each other by index:
//!
//! - [`ClassObj`]s are addressed by [`ClassIdx`], [`Instance`]s by [`InstanceIdx`]
//! - [`ObjectRef`] is either of the two; the object table maps every dumped id to one
//! - [`Reference`] is what fields, array elements, roots and class links hold
//!
//! Construction happens in two phases. [`SnapshotBuilder`] consumes the record stream and
//! creates every entity in the heap that is current at that point, leaving its references
//! unresolved. Once the stream is exhausted the resolution pass looks every reference up,
//! decodes instance fields, and links subclass and per-class instance lists. The snapshot is
//! immutable afterwards.
//!
//! # Examples
//!
//! ```rust,no_run
//! use heapscope::Snapshot;
//! use std::path::Path;
//!
//! let snapshot = Snapshot::from_file(Path::new("app.hprof"))?;
//! for heap in snapshot.heaps() {
//!     println!(
//!         "{} ({}): {} classes, {} instances",
//!         heap.name(),
//!         heap.id(),
//!         heap.class_count(),
//!         heap.instance_count()
//!     );
//! }
//!
//! if let Some(string) = snapshot.find_class("java.lang.String") {
//!     println!("{} strings", string.instance_count());
//! }
//! # Ok::<(), heapscope::Error>(())
//! ```

mod builder;
mod class;
mod heap;
mod instance;
mod reference;
mod resolve;
mod root;
mod stack;

use std::{
    collections::{BTreeMap, HashMap},
    path::Path,
    sync::Arc,
};

use crate::{
    config::ParseOptions,
    diagnostics::{DiagnosticSink, Diagnostics},
    file::ShardManager,
    hprof::{Header, ObjectId},
    Result,
};

pub use builder::SnapshotBuilder;
pub use class::{normalize_class_name, ClassObj, Field, StaticField};
pub use heap::{Heap, HeapView, DEFAULT_HEAP_NAME};
pub use instance::{FieldValue, Instance, InstanceKind};
pub use reference::{ClassIdx, InstanceIdx, ObjectRef, Reference};
pub use root::GcRoot;
pub use stack::{LineNumber, StackFrame, StackTrace, ThreadObj};

/// A borrowed class or instance.
#[derive(Debug, Clone, Copy)]
pub enum HeapObject<'a> {
    /// A class object
    Class(&'a ClassObj),
    /// An instance or array
    Instance(&'a Instance),
}

impl HeapObject<'_> {
    /// Object id.
    #[must_use]
    pub fn id(&self) -> ObjectId {
        match self {
            HeapObject::Class(class) => class.id,
            HeapObject::Instance(instance) => instance.id,
        }
    }

    /// Heap the object was read in.
    #[must_use]
    pub fn heap(&self) -> u32 {
        match self {
            HeapObject::Class(class) => class.heap,
            HeapObject::Instance(instance) => instance.heap,
        }
    }
}

/// The resolved object graph of a heap dump.
///
/// # Thread Safety
///
/// [`Snapshot`] is [`Send`] and [`Sync`] and never changes after it is built.
#[derive(Debug)]
pub struct Snapshot {
    header: Header,
    heaps: BTreeMap<u32, Heap>,
    classes: Vec<ClassObj>,
    instances: Vec<Instance>,
    objects: HashMap<ObjectId, ObjectRef>,
    roots: Vec<GcRoot>,
    strings: HashMap<ObjectId, String>,
    classes_by_name: HashMap<String, Vec<ClassIdx>>,
    frames: HashMap<ObjectId, StackFrame>,
    traces: HashMap<u32, StackTrace>,
    threads: BTreeMap<u32, ThreadObj>,
    diagnostics: Arc<Diagnostics>,
}

impl Snapshot {
    /// Parses the heap dump at `path` with default options.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or mapped, and any of
    /// the format errors of [`crate::hprof::RecordReader`] for malformed dumps.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Snapshot> {
        Self::from_file_with_options(path, &ParseOptions::default())
    }

    /// Parses the heap dump at `path`.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidOptions`] for rejected options, otherwise as
    /// [`Snapshot::from_file`].
    pub fn from_file_with_options(
        path: impl AsRef<Path>,
        options: &ParseOptions,
    ) -> Result<Snapshot> {
        options.validate()?;
        let shards = ShardManager::open(path, options.shard_size, options.padding)?;
        Self::from_shards(&shards, options, None)
    }

    /// Parses a heap dump held in memory, with default options.
    ///
    /// # Errors
    /// Returns the format errors of [`crate::hprof::RecordReader`] for malformed dumps.
    pub fn from_mem(data: Vec<u8>) -> Result<Snapshot> {
        Self::from_mem_with_options(data, &ParseOptions::default())
    }

    /// Parses a heap dump held in memory.
    ///
    /// The buffer is windowed exactly like a file would be, so `options` can be used to
    /// exercise small shard geometries.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidOptions`] for rejected options, otherwise as
    /// [`Snapshot::from_mem`].
    pub fn from_mem_with_options(data: Vec<u8>, options: &ParseOptions) -> Result<Snapshot> {
        options.validate()?;
        let shards = ShardManager::from_mem(data, options.shard_size, options.padding)?;
        Self::from_shards(&shards, options, None)
    }

    /// Parses the heap dump served by `shards`.
    ///
    /// The window geometry of `shards` is used as is; only the stream options of `options`
    /// apply. Every diagnostic is collected in [`Snapshot::diagnostics`] and, when `sink` is
    /// given, forwarded to it as it is reported.
    ///
    /// # Errors
    /// Returns the format errors of [`crate::hprof::RecordReader`] for malformed dumps.
    pub fn from_shards(
        shards: &ShardManager,
        options: &ParseOptions,
        sink: Option<Arc<dyn DiagnosticSink>>,
    ) -> Result<Snapshot> {
        builder::build(shards, options, sink)
    }

    /// The file header.
    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Width of object ids in bytes.
    #[must_use]
    pub fn id_size(&self) -> usize {
        self.header.id_size
    }

    /// Diagnostics collected while parsing.
    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// All heaps, ordered by id.
    pub fn heaps(&self) -> impl Iterator<Item = HeapView<'_>> {
        self.heaps.values().map(move |heap| HeapView::new(self, heap))
    }

    /// Ids of all heaps, ascending.
    pub fn heap_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.heaps.keys().copied()
    }

    /// The heap with id `id`.
    #[must_use]
    pub fn heap(&self, id: u32) -> Option<HeapView<'_>> {
        self.heaps.get(&id).map(|heap| HeapView::new(self, heap))
    }

    /// The first heap called `name`.
    #[must_use]
    pub fn heap_by_name(&self, name: &str) -> Option<HeapView<'_>> {
        self.heaps
            .values()
            .find(|heap| heap.name == name)
            .map(|heap| HeapView::new(self, heap))
    }

    /// All GC roots, in file order.
    #[must_use]
    pub fn gc_roots(&self) -> &[GcRoot] {
        &self.roots
    }

    /// All classes, in file order.
    #[must_use]
    pub fn classes(&self) -> &[ClassObj] {
        &self.classes
    }

    /// All instances and arrays, in file order.
    #[must_use]
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// Number of classes across all heaps.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Number of instances and arrays across all heaps.
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Looks up an object id.
    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<ObjectRef> {
        self.objects.get(&id).copied()
    }

    /// Borrows the object behind a handle.
    #[must_use]
    pub fn get(&self, object: ObjectRef) -> HeapObject<'_> {
        match object {
            ObjectRef::Class(idx) => HeapObject::Class(self.class_at(idx)),
            ObjectRef::Instance(idx) => HeapObject::Instance(self.instance_at(idx)),
        }
    }

    /// Borrows the object a reference points to, if it resolved.
    #[must_use]
    pub fn resolve(&self, reference: &Reference) -> Option<HeapObject<'_>> {
        reference.target().map(|target| self.get(target))
    }

    /// The class at `idx`.
    ///
    /// # Panics
    /// Panics if `idx` was not produced by this snapshot.
    #[must_use]
    pub fn class_at(&self, idx: ClassIdx) -> &ClassObj {
        &self.classes[idx.0]
    }

    /// The instance at `idx`.
    ///
    /// # Panics
    /// Panics if `idx` was not produced by this snapshot.
    #[must_use]
    pub fn instance_at(&self, idx: InstanceIdx) -> &Instance {
        &self.instances[idx.0]
    }

    /// The class object with id `id`.
    #[must_use]
    pub fn class(&self, id: ObjectId) -> Option<&ClassObj> {
        self.object(id)?.as_class().map(|idx| self.class_at(idx))
    }

    /// The instance or array with id `id`.
    #[must_use]
    pub fn instance(&self, id: ObjectId) -> Option<&Instance> {
        self.object(id)?.as_instance().map(|idx| self.instance_at(idx))
    }

    /// The class of an instance, if it resolved to a class object.
    #[must_use]
    pub fn class_of(&self, instance: &Instance) -> Option<&ClassObj> {
        instance.class.class().map(|idx| self.class_at(idx))
    }

    /// The first class called `name`.
    ///
    /// Source names (`java.util.HashMap`, `int[]`), internal names (`java/util/HashMap`) and
    /// array descriptors (`[I`) are all accepted and match each other.
    #[must_use]
    pub fn find_class(&self, name: &str) -> Option<&ClassObj> {
        self.classes_by_name
            .get(&normalize_class_name(name))?
            .first()
            .map(|&idx| self.class_at(idx))
    }

    /// Every class called `name`; one per defining class loader.
    #[must_use]
    pub fn find_classes(&self, name: &str) -> Vec<&ClassObj> {
        self.classes_by_name
            .get(&normalize_class_name(name))
            .map(|list| list.iter().map(|&idx| self.class_at(idx)).collect())
            .unwrap_or_default()
    }

    /// Superclasses of `class`, nearest first.
    pub fn superclasses<'a>(&'a self, class: &'a ClassObj) -> impl Iterator<Item = &'a ClassObj> {
        let limit = self.classes.len();
        std::iter::successors(Some(class), move |c| {
            c.super_class.class().map(|idx| self.class_at(idx))
        })
        .skip(1)
        .take(limit)
    }

    /// Instances whose class is `class` or one of its subclasses.
    #[must_use]
    pub fn instances_of(&self, class: &ClassObj) -> Vec<&Instance> {
        let mut found = Vec::new();
        let mut pending = vec![class];
        let mut seen = 0;
        while let Some(current) = pending.pop() {
            seen += 1;
            if seen > self.classes.len() {
                break;
            }
            found.extend(current.instances().iter().map(|&idx| self.instance_at(idx)));
            pending.extend(current.subclasses().iter().map(|&idx| self.class_at(idx)));
        }
        found
    }

    /// A string from the string table.
    #[must_use]
    pub fn string(&self, id: ObjectId) -> Option<&str> {
        self.strings.get(&id).map(String::as_str)
    }

    /// A stack frame by frame id.
    #[must_use]
    pub fn stack_frame(&self, id: ObjectId) -> Option<&StackFrame> {
        self.frames.get(&id)
    }

    /// A stack trace by serial number.
    #[must_use]
    pub fn stack_trace(&self, serial: u32) -> Option<&StackTrace> {
        self.traces.get(&serial)
    }

    /// A thread by serial number.
    #[must_use]
    pub fn thread(&self, serial: u32) -> Option<&ThreadObj> {
        self.threads.get(&serial)
    }

    /// All threads, ordered by serial number.
    pub fn threads(&self) -> impl Iterator<Item = &ThreadObj> {
        self.threads.values()
    }
}

//! Heaps and heap views.

use crate::hprof::ObjectId;

use super::{
    class::ClassObj,
    instance::Instance,
    reference::{ClassIdx, InstanceIdx, ObjectRef},
    root::GcRoot,
    Snapshot,
};

/// Name of heap 0, the heap objects belong to until a heap dump info record names another.
pub const DEFAULT_HEAP_NAME: &str = "default";

/// A named partition of the dumped objects.
///
/// Android runtimes split their dumps into the `zygote`, `image` and `app` heaps; other
/// runtimes put everything into heap 0.
#[derive(Debug, Clone)]
pub struct Heap {
    pub(crate) id: u32,
    pub(crate) name: String,
    pub(crate) name_id: Option<ObjectId>,
    pub(crate) classes: Vec<ClassIdx>,
    pub(crate) instances: Vec<InstanceIdx>,
    pub(crate) roots: Vec<usize>,
}

impl Heap {
    pub(crate) fn new(id: u32) -> Self {
        Heap {
            id,
            name: if id == 0 {
                DEFAULT_HEAP_NAME.to_string()
            } else {
                format!("heap-{id}")
            },
            name_id: None,
            classes: Vec::new(),
            instances: Vec::new(),
            roots: Vec::new(),
        }
    }
}

/// Read access to one heap of a [`Snapshot`].
#[derive(Debug, Clone, Copy)]
pub struct HeapView<'a> {
    snapshot: &'a Snapshot,
    heap: &'a Heap,
}

impl<'a> HeapView<'a> {
    pub(crate) fn new(snapshot: &'a Snapshot, heap: &'a Heap) -> Self {
        HeapView { snapshot, heap }
    }

    /// Heap id.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.heap.id
    }

    /// Heap name.
    #[must_use]
    pub fn name(&self) -> &'a str {
        &self.heap.name
    }

    /// Number of classes dumped in this heap.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.heap.classes.len()
    }

    /// Number of instances and arrays dumped in this heap.
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.heap.instances.len()
    }

    /// Number of GC roots read while this heap was current.
    #[must_use]
    pub fn root_count(&self) -> usize {
        self.heap.roots.len()
    }

    /// GC roots attributed to this heap, in file order.
    pub fn roots(&self) -> impl Iterator<Item = &'a GcRoot> + 'a {
        let roots = self.snapshot.gc_roots();
        self.heap.roots.iter().map(move |&i| &roots[i])
    }

    /// Classes of this heap, in file order.
    pub fn classes(&self) -> impl Iterator<Item = &'a ClassObj> + 'a {
        let snapshot = self.snapshot;
        self.heap
            .classes
            .iter()
            .map(move |&idx| snapshot.class_at(idx))
    }

    /// Instances and arrays of this heap, in file order.
    pub fn instances(&self) -> impl Iterator<Item = &'a Instance> + 'a {
        let snapshot = self.snapshot;
        self.heap
            .instances
            .iter()
            .map(move |&idx| snapshot.instance_at(idx))
    }

    /// The class with object id `id`, if it belongs to this heap.
    #[must_use]
    pub fn class(&self, id: ObjectId) -> Option<&'a ClassObj> {
        match self.snapshot.object(id)? {
            ObjectRef::Class(idx) => {
                Some(self.snapshot.class_at(idx)).filter(|c| c.heap == self.heap.id)
            }
            ObjectRef::Instance(_) => None,
        }
    }

    /// The instance with object id `id`, if it belongs to this heap.
    #[must_use]
    pub fn instance(&self, id: ObjectId) -> Option<&'a Instance> {
        match self.snapshot.object(id)? {
            ObjectRef::Instance(idx) => {
                Some(self.snapshot.instance_at(idx)).filter(|i| i.heap == self.heap.id)
            }
            ObjectRef::Class(_) => None,
        }
    }
}

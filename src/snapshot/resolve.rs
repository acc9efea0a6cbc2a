//! Reference resolution.
//!
//! Runs once, after the whole record stream has been read. Every [`Reference::Unresolved`]
//! in the snapshot is looked up in the object table and becomes either
//! [`Reference::Resolved`] or [`Reference::Unknown`]; each unknown one is reported as exactly
//! one [`DiagnosticCategory::Reference`] diagnostic. A class reference whose id names an
//! instance counts as unknown too. Instance field data is decoded in the
//! same pass, in parallel over the instance arena.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::{
    config::ParseOptions,
    diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSeverity, Diagnostics},
    file::parser::Parser,
    hprof::{BasicType, ObjectId, Value},
};

use super::{
    class::{normalize_class_name, ClassObj},
    instance::{FieldValue, Instance, InstanceKind},
    reference::{ClassIdx, InstanceIdx, ObjectRef, Reference},
    Snapshot,
};

/// Looks ids up in the object table and reports the ones that are missing.
struct Resolver<'a> {
    objects: &'a HashMap<ObjectId, ObjectRef>,
    diagnostics: &'a Diagnostics,
}

impl Resolver<'_> {
    fn reference(
        &self,
        reference: Reference,
        offset: u64,
        from: impl FnOnce() -> String,
    ) -> Reference {
        let Reference::Unresolved(id) = reference else {
            return reference;
        };

        match self.objects.get(&id) {
            Some(&target) => Reference::Resolved { id, target },
            None => {
                self.diagnostics.push(
                    Diagnostic::new(
                        DiagnosticSeverity::Warning,
                        DiagnosticCategory::Reference,
                        format!("unresolved reference 0x{id:x} from {}", from()),
                    )
                    .with_offset(offset)
                    .with_object(id),
                );
                Reference::Unknown(id)
            }
        }
    }

    /// Resolves a reference that must name a class.
    ///
    /// An id that resolves to an instance is reported and becomes [`Reference::Unknown`].
    fn class_reference(
        &self,
        reference: Reference,
        offset: u64,
        from: impl FnOnce() -> String,
    ) -> Reference {
        let Reference::Unresolved(id) = reference else {
            return reference;
        };

        match self.objects.get(&id) {
            Some(&ObjectRef::Class(idx)) => Reference::Resolved {
                id,
                target: ObjectRef::Class(idx),
            },
            Some(&ObjectRef::Instance(_)) => {
                self.diagnostics.push(
                    Diagnostic::new(
                        DiagnosticSeverity::Warning,
                        DiagnosticCategory::Reference,
                        format!("0x{id:x} is an instance, not a class, in {}", from()),
                    )
                    .with_offset(offset)
                    .with_object(id),
                );
                Reference::Unknown(id)
            }
            None => self.reference(reference, offset, from),
        }
    }

    fn value(
        &self,
        value: Value<Reference>,
        offset: u64,
        from: impl FnOnce() -> String,
    ) -> Value<Reference> {
        match value {
            Value::Object(reference) => Value::Object(self.reference(reference, offset, from)),
            primitive => primitive,
        }
    }

    fn class(&self, class: &mut ClassObj) {
        let offset = class.offset;
        let name = &class.name;

        class.super_class = self.class_reference(class.super_class, offset, || {
            format!("superclass of {name}")
        });
        class.class_loader = self.reference(class.class_loader, offset, || {
            format!("class loader of {name}")
        });
        for (index, value) in &mut class.constants {
            *value = self.value(*value, offset, || {
                format!("constant pool entry {index} of {name}")
            });
        }
        for field in &mut class.statics {
            let field_name = &field.name;
            field.value = self.value(field.value, offset, || {
                format!("static field {field_name} of {name}")
            });
        }
    }

    fn instance(&self, instance: &mut Instance, ctx: &InstanceContext<'_>) {
        let id = instance.id;
        let offset = instance.offset;

        match &mut instance.kind {
            InstanceKind::Object { data, fields } => {
                instance.class = self.class_reference(instance.class, offset, || {
                    format!("class of instance 0x{id:x}")
                });
                let class = instance.class.class();
                instance.size = class.map_or(data.len() as u64, |idx| {
                    u64::from(ctx.classes[idx.0].instance_size)
                });
                if let (Some(idx), true) = (class, ctx.decode_fields) {
                    *fields = self.fields(idx, data, id, offset, ctx);
                }
            }
            InstanceKind::ObjectArray { elements } => {
                instance.class = self.class_reference(instance.class, offset, || {
                    format!("class of array 0x{id:x}")
                });
                for (i, element) in elements.iter_mut().enumerate() {
                    *element = self.reference(*element, offset, || {
                        format!("element {i} of array 0x{id:x}")
                    });
                }
                instance.size = elements.len() as u64 * ctx.id_size as u64;
            }
            InstanceKind::PrimitiveArray {
                element_type,
                length,
                ..
            } => {
                let ty = *element_type;
                instance.class = ctx
                    .array_classes
                    .get(&ty)
                    .copied()
                    .unwrap_or(Reference::Null);
                instance.size = u64::from(*length) * ty.size(ctx.id_size) as u64;
            }
        }
    }

    /// Decodes `data` against the field layout of `class` and its superclasses.
    fn fields(
        &self,
        class: ClassIdx,
        data: &[u8],
        id: ObjectId,
        offset: u64,
        ctx: &InstanceContext<'_>,
    ) -> Vec<FieldValue> {
        let mut parser = Parser::new(data);
        let mut values = Vec::new();
        let mut current = Some(class);
        let mut depth = 0;

        while let Some(idx) = current {
            let declaring = &ctx.classes[idx.0];
            for field in &declaring.fields {
                let Ok(raw) = Value::decode(&mut parser, field.ty, ctx.id_size) else {
                    self.diagnostics.push(
                        Diagnostic::new(
                            DiagnosticSeverity::Warning,
                            DiagnosticCategory::Instance,
                            format!(
                                "instance 0x{id:x} has {} bytes of field data, too few for field {} of {}",
                                data.len(),
                                field.name,
                                declaring.name
                            ),
                        )
                        .with_offset(offset)
                        .with_object(id),
                    );
                    return values;
                };

                let value = self.value(raw.map_object(Reference::from_id), offset, || {
                    format!("field {} of instance 0x{id:x}", field.name)
                });
                values.push(FieldValue {
                    name: field.name.clone(),
                    declared_by: idx,
                    value,
                });
            }

            depth += 1;
            if depth > ctx.classes.len() {
                self.diagnostics.push(
                    Diagnostic::new(
                        DiagnosticSeverity::Error,
                        DiagnosticCategory::Class,
                        format!("superclass chain of {} is cyclic", ctx.classes[class.0].name),
                    )
                    .with_object(ctx.classes[class.0].id),
                );
                return values;
            }
            current = declaring.super_class.class();
        }

        if parser.has_more_data() {
            self.diagnostics.push(
                Diagnostic::new(
                    DiagnosticSeverity::Warning,
                    DiagnosticCategory::Instance,
                    format!(
                        "instance 0x{id:x} has {} bytes of field data beyond its field layout",
                        parser.remaining()
                    ),
                )
                .with_offset(offset)
                .with_object(id),
            );
        }
        values
    }
}

/// Read-only state shared by the instance workers.
struct InstanceContext<'a> {
    classes: &'a [ClassObj],
    array_classes: HashMap<BasicType, Reference>,
    id_size: usize,
    decode_fields: bool,
}

/// Resolves every reference of `snapshot` in place and links the class hierarchy.
pub(crate) fn resolve(snapshot: &mut Snapshot, options: &ParseOptions) {
    index_class_names(snapshot);

    let resolver = Resolver {
        objects: &snapshot.objects,
        diagnostics: &snapshot.diagnostics,
    };

    for class in &mut snapshot.classes {
        resolver.class(class);
    }

    let array_classes = [
        BasicType::Boolean,
        BasicType::Char,
        BasicType::Float,
        BasicType::Double,
        BasicType::Byte,
        BasicType::Short,
        BasicType::Int,
        BasicType::Long,
    ]
    .into_iter()
    .filter_map(|ty| {
        let idx = *snapshot.classes_by_name.get(&ty.array_class_name())?.first()?;
        let class = &snapshot.classes[idx.0];
        Some((
            ty,
            Reference::Resolved {
                id: class.id,
                target: ObjectRef::Class(idx),
            },
        ))
    })
    .collect();

    {
        let ctx = InstanceContext {
            classes: &snapshot.classes,
            array_classes,
            id_size: snapshot.header.id_size,
            decode_fields: options.resolve_fields,
        };
        snapshot
            .instances
            .par_iter_mut()
            .for_each(|instance| resolver.instance(instance, &ctx));
    }

    for root in &mut snapshot.roots {
        let kind = root.kind;
        root.target = resolver.reference(root.target, root.offset, || format!("{kind} root"));
    }

    link(snapshot);

    log::debug!(
        "resolution finished: {} unknown reference(s)",
        snapshot
            .diagnostics
            .by_category(DiagnosticCategory::Reference)
            .len()
    );
}

fn index_class_names(snapshot: &mut Snapshot) {
    let mut index: HashMap<String, Vec<ClassIdx>> = HashMap::new();
    for (i, class) in snapshot.classes.iter().enumerate() {
        index
            .entry(normalize_class_name(&class.name))
            .or_default()
            .push(ClassIdx(i));
    }
    snapshot.classes_by_name = index;
}

/// Fills the subclass and per-class instance lists.
fn link(snapshot: &mut Snapshot) {
    for i in 0..snapshot.classes.len() {
        if let Some(parent) = snapshot.classes[i].super_class.class() {
            snapshot.classes[parent.0].subclasses.push(ClassIdx(i));
        }
    }

    for (i, instance) in snapshot.instances.iter().enumerate() {
        if let Some(class) = instance.class.class() {
            snapshot.classes[class.0]
                .instances
                .push(InstanceIdx(i));
        }
    }
}

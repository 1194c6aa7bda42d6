//! Phase 3: finished types.
//!
//! Named nodes get their ids reserved before anything is built, so a shape
//! that reaches back to a named type through a pointer refers to the
//! reserved id and the named type is installed once its underlying type
//! exists. Anonymous shapes are interned by their finished structure and
//! collapse onto any equal type already in the table.

use rustc_hash::{FxHashMap, FxHashSet};

use knot_stack::ensure_sufficient_stack;

use super::render::Rendered;
use super::MethodSets;
use crate::graph::{Content, TypeGraph, Ty};
use crate::table::{Facts, RType};
use crate::{layout, Method, Shape, TypeId};

/// Ids assigned in one batch.
#[derive(Debug, Default)]
pub(super) struct Realized {
    ids: FxHashMap<Ty, TypeId>,
    /// Named nodes whose types were created by this batch.
    pub fresh: FxHashSet<Ty>,
}

impl Realized {
    pub fn id(&self, ty: Ty) -> TypeId {
        self.ids
            .get(&ty)
            .copied()
            .unwrap_or_else(|| panic!("{ty:?} was not realized"))
    }
}

pub(super) fn realize_all(
    graph: &TypeGraph,
    order: &[Ty],
    rendered: &Rendered,
    sets: &MethodSets,
) -> Realized {
    let pending: Vec<Ty> = order
        .iter()
        .copied()
        .filter(|&ty| {
            graph.is_named(ty) && !matches!(graph.node(ty).content, Content::Realized(_))
        })
        .collect();

    let mut realizer = Realizer {
        graph,
        rendered,
        sets,
        out: Realized::default(),
    };
    let reserved = graph.table().reserve(pending.len());
    for (&ty, &id) in pending.iter().zip(&reserved) {
        realizer.out.ids.insert(ty, id);
        realizer.out.fresh.insert(ty);
    }

    for &ty in order {
        realizer.realize(ty);
    }
    for (&ty, &id) in pending.iter().zip(&reserved) {
        realizer.install_named(ty, id);
    }
    realizer.out
}

struct Realizer<'g> {
    graph: &'g TypeGraph,
    rendered: &'g Rendered,
    sets: &'g MethodSets,
    out: Realized,
}

impl<'g> Realizer<'g> {
    fn realize(&mut self, ty: Ty) -> TypeId {
        if let Some(&id) = self.out.ids.get(&ty) {
            return id;
        }
        ensure_sufficient_stack(|| {
            let graph = self.graph;
            let node = graph.node(ty);
            let id = match &node.content {
                Content::Realized(id) => *id,
                Content::Shape(shape) if node.named.is_none() => self.intern(ty, shape),
                _ => panic!("`{}` reached realization without a definition", graph.display(ty)),
            };
            self.out.ids.insert(ty, id);
            id
        })
    }

    /// Finished type of `shape`, the definition of node `owner`.
    fn intern(&mut self, owner: Ty, shape: &'g Shape<Ty>) -> TypeId {
        let (graph, sets) = (self.graph, self.sets);
        let key = shape.map(|child| self.realize(*child));

        let node = graph.node(owner);
        let layout = node
            .layout
            .unwrap_or_else(|| panic!("`{}` has no layout", graph.display(owner)));
        let comparable = node
            .comparable
            .known()
            .unwrap_or_else(|| panic!("`{}` has unknown comparability", graph.display(owner)));

        let offsets = match shape {
            Shape::Struct(fields) => {
                let packed = layout::structure(
                    graph.table().target(),
                    fields.iter().map(|field| {
                        graph.layout(field.ty).unwrap_or_else(|| {
                            panic!("field `{}` has no layout", field.name)
                        })
                    }),
                )
                .unwrap_or_else(|| panic!("`{}` no longer fits", graph.display(owner)));
                packed.offsets.into_boxed_slice()
            }
            _ => Box::default(),
        };

        let interface_methods = match shape {
            Shape::Interface { .. } => sets
                .get(&owner)
                .unwrap_or_else(|| panic!("no method set for {owner:?}"))
                .iter()
                .map(|method| Method {
                    name: method.name.clone(),
                    scope: method.scope.clone(),
                    ty: self.realize(method.ty),
                })
                .collect(),
            _ => Box::default(),
        };

        let rendering = self.rendered.shape(owner);
        let facts = Facts {
            layout,
            hash: rendering.hash,
            comparable,
            string: rendering.string.clone(),
            offsets,
            interface_methods,
        };
        graph
            .table()
            .intern(key, move |key| RType::anonymous(key, facts))
    }

    fn install_named(&mut self, ty: Ty, id: TypeId) {
        let graph = self.graph;
        let end = graph.chain_end(ty);
        let underlying = match &graph.node(end).content {
            Content::Shape(shape) => self.intern(end, shape),
            Content::Underlying(id) => *id,
            Content::Realized(id) => graph
                .table()
                .get(*id)
                .and_then(|rtype| rtype.underlying())
                .unwrap_or(*id),
            content => panic!("`{}` is bound to {content:?}", graph.display(ty)),
        };
        let underlying_type = graph
            .table()
            .get(underlying)
            .unwrap_or_else(|| panic!("underlying type {} is not installed", underlying.raw()));

        let node = graph.node(ty);
        let Some(named) = node.named.as_deref() else {
            panic!("{ty:?} lost its name");
        };
        let methods: Vec<Method<TypeId>> = named
            .methods
            .iter()
            .map(|method| Method {
                name: method.name.clone(),
                scope: method.scope.clone(),
                ty: self.realize(method.ty),
            })
            .collect();
        let hash = self.rendered.ty(ty).hash;

        graph.table().install(
            id,
            RType::named(named.qname.clone(), hash, underlying, &underlying_type, methods),
        );
        tracing::trace!(ty = %named.display, id = id.raw(), "installed named type");
    }
}

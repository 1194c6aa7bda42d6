//! Phase 2: hashes and display strings.

use rustc_hash::FxHashMap;

use knot_stack::ensure_sufficient_stack;

use super::MethodSets;
use crate::graph::{Content, TypeGraph, Ty};
use crate::hash::{named_hash, shape_hash};
use crate::{Method, Shape};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct Rendering {
    pub hash: u32,
    pub string: String,
}

/// Renderings of one batch.
#[derive(Debug, Default)]
pub(super) struct Rendered {
    /// Every node as a type: named nodes by name, the rest by structure.
    types: FxHashMap<Ty, Rendering>,
    /// Every node with a shape, by structure. For a named node this is its
    /// underlying type.
    shapes: FxHashMap<Ty, Rendering>,
}

impl Rendered {
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn ty(&self, ty: Ty) -> &Rendering {
        self.types
            .get(&ty)
            .unwrap_or_else(|| panic!("{ty:?} was not rendered"))
    }

    pub fn shape(&self, ty: Ty) -> &Rendering {
        self.shapes
            .get(&ty)
            .unwrap_or_else(|| panic!("shape of {ty:?} was not rendered"))
    }
}

pub(super) fn render_all(graph: &TypeGraph, order: &[Ty], sets: &MethodSets) -> Rendered {
    let mut renderer = Renderer {
        graph,
        sets,
        out: Rendered::default(),
    };
    for &ty in order {
        renderer.render(ty);
        if graph.is_named(ty) {
            if let Content::Shape(shape) = &graph.node(ty).content {
                let rendering = renderer.describe(ty, shape);
                renderer.out.shapes.insert(ty, rendering);
            }
        }
    }
    renderer.out
}

struct Renderer<'g> {
    graph: &'g TypeGraph,
    sets: &'g MethodSets,
    out: Rendered,
}

impl<'g> Renderer<'g> {
    /// Render `ty`, returning its hash.
    fn render(&mut self, ty: Ty) -> u32 {
        if let Some(done) = self.out.types.get(&ty) {
            return done.hash;
        }
        ensure_sufficient_stack(|| {
            let graph = self.graph;
            let node = graph.node(ty);
            let rendering = match (&node.content, node.named.as_deref()) {
                (Content::Realized(id), _) => {
                    let rtype = graph
                        .table()
                        .get(*id)
                        .unwrap_or_else(|| panic!("finished type {} is not installed", id.raw()));
                    Rendering {
                        hash: rtype.hash(),
                        string: rtype.string().to_owned(),
                    }
                }
                (_, Some(named)) => Rendering {
                    hash: named_hash(&named.display, graph.id().raw(), ty.index()),
                    string: named.display.clone(),
                },
                (Content::Shape(shape), None) => {
                    let rendering = self.describe(ty, shape);
                    self.out.shapes.insert(ty, rendering.clone());
                    rendering
                }
                (content, None) => panic!("anonymous node {ty:?} has no shape: {content:?}"),
            };
            let hash = rendering.hash;
            self.out.types.insert(ty, rendering);
            hash
        })
    }

    /// Structural rendering of `shape`, owned by `owner`.
    fn describe(&mut self, owner: Ty, shape: &'g Shape<Ty>) -> Rendering {
        let hashes = shape.map(|child| self.render(*child));
        let string = shape.render(|child| self.string(*child));

        let hash = if let Shape::Interface { .. } = shape {
            let set = self
                .sets
                .get(&owner)
                .unwrap_or_else(|| panic!("no method set for {owner:?}"));
            let methods: Vec<Method<u32>> = set
                .iter()
                .map(|method| Method {
                    name: method.name.clone(),
                    scope: method.scope.clone(),
                    ty: self.render(method.ty),
                })
                .collect();
            shape_hash(&Shape::Interface {
                embedded: Box::default(),
                methods: methods.into_boxed_slice(),
            })
        } else {
            shape_hash(&hashes)
        };
        Rendering { hash, string }
    }

    fn string(&self, ty: Ty) -> String {
        self.out
            .types
            .get(&ty)
            .map(|done| done.string.clone())
            .unwrap_or_else(|| panic!("{ty:?} rendered before its children"))
    }
}

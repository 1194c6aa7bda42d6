//! Incomplete type graphs.
//!
//! A [`TypeGraph`] is one construction session. Types are nodes in an arena
//! addressed by [`Ty`] handles, so a named placeholder can be referenced by
//! other shapes long before it is bound. A node is, at any time, exactly one
//! of:
//!
//! - a named placeholder with no definition yet,
//! - a shape whose children are other nodes,
//! - a named type defined directly as a finished type,
//! - a finished type from the session's [`TypeTable`](crate::TypeTable).
//!
//! Construction is single-threaded per session; the table it completes into
//! may be shared with other sessions.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use rustc_hash::FxHashMap;

use crate::shape::validate::Inspect;
use crate::{
    Error, Kind, Layout, Method, NodeFlags, QualifiedName, Shape, SharedTypeTable,
    StructuralError, Tribool, TypeId,
};

mod construct;
mod cycle;
mod format;
mod named;
mod size;

static NEXT_GRAPH: AtomicU32 = AtomicU32::new(0);

/// Identity of one graph session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphId(u32);

impl GraphId {
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Handle to a node of a [`TypeGraph`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ty {
    graph: GraphId,
    index: u32,
}

impl Ty {
    #[inline]
    pub const fn graph(self) -> GraphId {
        self.graph
    }

    #[inline]
    pub const fn index(self) -> u32 {
        self.index
    }
}

impl fmt::Debug for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ty({}.{})", self.graph.0, self.index)
    }
}

/// Name binding of a named node.
#[derive(Debug)]
pub(crate) struct Named {
    pub qname: QualifiedName,
    pub display: String,
    pub methods: Vec<Method<Ty>>,
}

/// What a node currently is.
#[derive(Debug)]
pub(crate) enum Content {
    /// Named placeholder, not yet bound.
    Empty,
    /// Named type bound to another named type that has no definition yet.
    Alias(Ty),
    Shape(Shape<Ty>),
    /// Named type bound to a finished, unnamed (or basic) type.
    Underlying(TypeId),
    /// The node is this finished type.
    Realized(TypeId),
}

#[derive(Debug)]
pub(crate) struct Node {
    pub named: Option<Box<Named>>,
    pub content: Content,
    pub comparable: Tribool,
    pub flags: NodeFlags,
    /// Set together with [`NodeFlags::SIZED`].
    pub layout: Option<Layout>,
}

/// One type-construction session.
pub struct TypeGraph {
    id: GraphId,
    table: SharedTypeTable,
    nodes: Vec<Node>,
    /// Anonymous shapes with at least one incomplete child.
    shapes: FxHashMap<Shape<Ty>, Ty>,
    /// Leaf nodes wrapping finished types.
    realized: FxHashMap<TypeId, Ty>,
}

impl TypeGraph {
    pub fn new(table: SharedTypeTable) -> Self {
        TypeGraph {
            id: GraphId(NEXT_GRAPH.fetch_add(1, Ordering::Relaxed)),
            table,
            nodes: Vec::new(),
            shapes: FxHashMap::default(),
            realized: FxHashMap::default(),
        }
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    pub fn table(&self) -> &SharedTypeTable {
        &self.table
    }

    /// Number of nodes created so far.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Wrap a finished type as a graph leaf.
    ///
    /// Repeated calls return the same node. A named finished type carries its
    /// method set into the graph.
    pub fn of(&mut self, id: TypeId) -> Result<Ty, Error> {
        if let Some(&ty) = self.realized.get(&id) {
            return Ok(ty);
        }
        let rtype = self
            .table
            .get(id)
            .ok_or(StructuralError::UnknownType(id.raw()))?;
        let named = rtype.name().map(|qname| {
            Box::new(Named {
                qname: qname.clone(),
                display: rtype.string().to_owned(),
                methods: Vec::new(),
            })
        });
        let is_named = named.is_some();
        let ty = self.push(Node {
            named,
            content: Content::Realized(id),
            comparable: Tribool::from_bool(rtype.comparable()),
            flags: NodeFlags::COMPLETE,
            layout: Some(rtype.layout()),
        });
        self.realized.insert(id, ty);

        // Converted after the cache entry exists: signatures may mention `id`.
        if is_named {
            let methods = self
                .table
                .methods(id)
                .into_iter()
                .map(|method| -> Result<Method<Ty>, Error> {
                    Ok(Method {
                        ty: self.of(method.ty)?,
                        name: method.name,
                        scope: method.scope,
                    })
                })
                .collect::<Result<Vec<_>, Error>>()?;
            if let Some(named) = self.node_mut(ty).named.as_deref_mut() {
                named.methods = methods;
            }
        }
        Ok(ty)
    }

    /// Kind of a node, once its definition is known.
    pub fn kind(&self, ty: Ty) -> Option<Kind> {
        match &self.get(ty)?.content {
            Content::Empty => None,
            Content::Alias(target) => self.kind(*target),
            Content::Shape(shape) => Some(shape.kind()),
            Content::Underlying(id) | Content::Realized(id) => self.table.get(*id).map(|t| t.kind()),
        }
    }

    /// Layout, once size resolution has succeeded for the node.
    pub fn layout(&self, ty: Ty) -> Option<Layout> {
        self.get(ty).and_then(|node| node.layout)
    }

    pub fn comparable(&self, ty: Ty) -> Tribool {
        self.get(ty).map_or(Tribool::Unknown, |node| node.comparable)
    }

    pub fn flags(&self, ty: Ty) -> NodeFlags {
        self.get(ty).map_or(NodeFlags::empty(), |node| node.flags)
    }

    pub fn is_named(&self, ty: Ty) -> bool {
        self.get(ty).is_some_and(|node| node.named.is_some())
    }

    /// Methods declared on (or, for finished named types, reported by) a
    /// named node.
    pub fn methods(&self, ty: Ty) -> &[Method<Ty>] {
        self.get(ty)
            .and_then(|node| node.named.as_deref())
            .map(|named| named.methods.as_slice())
            .unwrap_or_default()
    }

    /// The finished type of a node, once it has been completed.
    pub fn finished(&self, ty: Ty) -> Option<TypeId> {
        match self.get(ty)?.content {
            Content::Realized(id) => Some(id),
            _ => None,
        }
    }

    /// Fail unless `ty` is a node of this graph.
    pub(crate) fn check(&self, ty: Ty) -> Result<(), StructuralError> {
        if self.get(ty).is_some() {
            Ok(())
        } else {
            Err(StructuralError::ForeignType)
        }
    }

    fn get(&self, ty: Ty) -> Option<&Node> {
        if ty.graph != self.id {
            return None;
        }
        self.nodes.get(ty.index as usize)
    }

    /// # Panics
    /// Panics if `ty` is not a node of this graph; callers [`check`](Self::check) first.
    pub(crate) fn node(&self, ty: Ty) -> &Node {
        self.get(ty)
            .unwrap_or_else(|| panic!("{ty:?} is not a node of graph {}", self.id.0))
    }

    pub(crate) fn node_mut(&mut self, ty: Ty) -> &mut Node {
        let id = self.id;
        assert!(ty.graph == id, "{ty:?} is not a node of graph {}", id.0);
        self.nodes
            .get_mut(ty.index as usize)
            .unwrap_or_else(|| panic!("{ty:?} is not a node of graph {}", id.0))
    }

    /// Record that `ty` is now the node for finished type `id`.
    pub(crate) fn remember(&mut self, id: TypeId, ty: Ty) {
        self.realized.entry(id).or_insert(ty);
    }

    fn push(&mut self, node: Node) -> Ty {
        let index = u32::try_from(self.nodes.len())
            .unwrap_or_else(|_| panic!("graph {} exceeded u32::MAX nodes", self.id.0));
        self.nodes.push(node);
        Ty {
            graph: self.id,
            index,
        }
    }
}

impl fmt::Debug for TypeGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeGraph")
            .field("id", &self.id.0)
            .field("nodes", &self.nodes.len())
            .finish_non_exhaustive()
    }
}

impl Inspect<Ty> for TypeGraph {
    fn kind(&self, ty: &Ty) -> Option<Kind> {
        TypeGraph::kind(self, *ty)
    }

    fn is_named(&self, ty: &Ty) -> bool {
        TypeGraph::is_named(self, *ty)
    }

    fn embedded_name(&self, ty: &Ty) -> Option<String> {
        let node = self.get(*ty)?;
        if let Some(named) = &node.named {
            return Some(named.qname.name.clone());
        }
        match &node.content {
            Content::Shape(Shape::Ptr(elem)) => {
                self.get(*elem)?.named.as_ref().map(|named| named.qname.name.clone())
            }
            Content::Realized(id) => {
                let rtype = self.table.get(*id)?;
                let Some(Shape::Ptr(elem)) = rtype.shape() else {
                    return None;
                };
                Some(self.table.get(*elem)?.name()?.name.clone())
            }
            _ => None,
        }
    }

    fn comparable(&self, ty: &Ty) -> Tribool {
        TypeGraph::comparable(self, *ty)
    }

    fn display(&self, ty: &Ty) -> String {
        TypeGraph::display(self, *ty)
    }
}

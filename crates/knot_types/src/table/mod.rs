//! Finished-type table.
//!
//! The table owns every finished type of a universe: the pre-installed basic
//! types, anonymous composites (canonicalized by structure, so each distinct
//! shape has one id), and named types (one id per declaration). It is shared
//! by every [`TypeGraph`](crate::TypeGraph) session that completes into it
//! and is safe to use from many threads.
//!
//! # Locking
//! The canonical cache's shard lock may be held while `types` is locked,
//! never the reverse.

use std::any::Any;
use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::hash::{basic_hash, shape_hash};
use crate::shape::validate::{validate, Inspect};
use crate::{
    layout, Canonical, ConstructionError, Error, Field, Kind, Layout, Method, QualifiedName,
    Shape, StructuralError, Target, Tribool, TypeId,
};

/// Opaque, clonable implementation attached to a method of a finished type.
#[derive(Clone)]
pub struct MethodImpl(Arc<dyn Any + Send + Sync>);

impl MethodImpl {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        MethodImpl(Arc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl fmt::Debug for MethodImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MethodImpl(..)")
    }
}

/// A method of a finished named type and its implementation slot.
#[derive(Debug)]
pub struct MethodEntry {
    method: Method<TypeId>,
    imp: OnceLock<MethodImpl>,
}

impl MethodEntry {
    pub fn method(&self) -> &Method<TypeId> {
        &self.method
    }

    /// The implementation, once completion has installed it.
    pub fn implementation(&self) -> Option<&MethodImpl> {
        self.imp.get()
    }

    /// Install the implementation. Returns `false` if one was already set.
    pub(crate) fn install(&self, imp: MethodImpl) -> bool {
        self.imp.set(imp).is_ok()
    }
}

/// Everything about a finished type except its shape and name.
#[derive(Clone, Debug)]
pub(crate) struct Facts {
    pub layout: Layout,
    pub hash: u32,
    pub comparable: bool,
    pub string: String,
    pub offsets: Box<[u64]>,
    pub interface_methods: Box<[Method<TypeId>]>,
}

/// A finished type.
#[derive(Debug)]
pub struct RType {
    kind: Kind,
    layout: Layout,
    hash: u32,
    comparable: bool,
    string: String,
    name: Option<QualifiedName>,
    underlying: Option<TypeId>,
    shape: Option<Shape<TypeId>>,
    offsets: Box<[u64]>,
    interface_methods: Box<[Method<TypeId>]>,
    methods: Box<[MethodEntry]>,
}

impl RType {
    fn basic(target: Target, kind: Kind) -> Option<Self> {
        let layout = target.primitive_layout(kind)?;
        let name = match kind {
            Kind::UnsafePointer => QualifiedName::new("Pointer", "unsafe"),
            _ => QualifiedName::new(kind.name(), ""),
        };
        Some(RType {
            kind,
            layout,
            hash: basic_hash(kind),
            comparable: true,
            string: kind.name().to_owned(),
            name: Some(name),
            underlying: None,
            shape: None,
            offsets: Box::default(),
            interface_methods: Box::default(),
            methods: Box::default(),
        })
    }

    pub(crate) fn anonymous(shape: Shape<TypeId>, facts: Facts) -> Self {
        RType {
            kind: shape.kind(),
            layout: facts.layout,
            hash: facts.hash,
            comparable: facts.comparable,
            string: facts.string,
            name: None,
            underlying: None,
            shape: Some(shape),
            offsets: facts.offsets,
            interface_methods: facts.interface_methods,
            methods: Box::default(),
        }
    }

    /// A named type defined as `underlying`, with `methods` sorted by name.
    pub(crate) fn named(
        name: QualifiedName,
        hash: u32,
        underlying_id: TypeId,
        underlying: &RType,
        mut methods: Vec<Method<TypeId>>,
    ) -> Self {
        methods.sort_by(|a, b| a.name.cmp(&b.name));
        RType {
            kind: underlying.kind,
            layout: underlying.layout,
            hash,
            comparable: underlying.comparable,
            string: name.to_string(),
            name: Some(name),
            underlying: Some(underlying_id),
            shape: underlying.shape.clone(),
            offsets: underlying.offsets.clone(),
            interface_methods: underlying.interface_methods.clone(),
            methods: methods
                .into_iter()
                .map(|method| MethodEntry {
                    method,
                    imp: OnceLock::new(),
                })
                .collect(),
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn size(&self) -> u64 {
        self.layout.size
    }

    pub fn align(&self) -> u8 {
        self.layout.align
    }

    pub fn ptr_data(&self) -> u64 {
        self.layout.ptr_data
    }

    pub fn hash(&self) -> u32 {
        self.hash
    }

    pub fn comparable(&self) -> bool {
        self.comparable
    }

    /// Display string, e.g. `*main.List` or `map[string][]int`.
    pub fn string(&self) -> &str {
        &self.string
    }

    pub fn name(&self) -> Option<&QualifiedName> {
        self.name.as_ref()
    }

    /// Underlying type of a declared named type. Basic and anonymous types
    /// are their own underlying type and return `None`.
    pub fn underlying(&self) -> Option<TypeId> {
        self.underlying
    }

    /// Structure of composite types, including named ones.
    pub fn shape(&self) -> Option<&Shape<TypeId>> {
        self.shape.as_ref()
    }

    pub fn elem(&self) -> Option<TypeId> {
        self.shape.as_ref()?.elem().copied()
    }

    pub fn key(&self) -> Option<TypeId> {
        match self.shape.as_ref()? {
            Shape::Map { key, .. } => Some(*key),
            _ => None,
        }
    }

    /// Length of an array type.
    pub fn len(&self) -> Option<u64> {
        match self.shape.as_ref()? {
            Shape::Array { len, .. } => Some(*len),
            _ => None,
        }
    }

    pub fn fields(&self) -> &[Field<TypeId>] {
        match &self.shape {
            Some(Shape::Struct(fields)) => fields,
            _ => &[],
        }
    }

    /// Byte offset of every struct field, in declaration order.
    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    /// Full method set of an interface type, sorted by (scope, name).
    pub fn interface_methods(&self) -> &[Method<TypeId>] {
        &self.interface_methods
    }

    /// Methods declared on a named type, sorted by name.
    pub fn methods(&self) -> &[MethodEntry] {
        &self.methods
    }
}

/// The finished-type universe.
pub struct TypeTable {
    target: Target,
    /// Slots are `None` between reservation and installation of named types.
    types: RwLock<Vec<Option<Arc<RType>>>>,
    canonical: Canonical<Shape<TypeId>, TypeId>,
}

impl TypeTable {
    /// A table for `target`, holding only the basic types.
    pub fn new(target: Target) -> Self {
        let types = Kind::BASIC
            .iter()
            .map(|&kind| RType::basic(target, kind).map(Arc::new))
            .collect();
        TypeTable {
            target,
            types: RwLock::new(types),
            canonical: Canonical::new(),
        }
    }

    pub fn target(&self) -> Target {
        self.target
    }

    /// Number of ids handed out, including reserved ones.
    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    /// Always `false`: the basic types are pre-installed.
    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }

    pub fn get(&self, id: TypeId) -> Option<Arc<RType>> {
        self.types.read().get(id.index()).cloned().flatten()
    }

    /// The canonical id of a finished shape, if it has been realized.
    pub fn lookup(&self, shape: &Shape<TypeId>) -> Option<TypeId> {
        self.canonical.load(shape)
    }

    /// Realize a shape all of whose children are finished.
    ///
    /// Structurally equal shapes realize to the same id, no matter which
    /// thread or session asks first.
    pub fn realize(&self, shape: Shape<TypeId>) -> Result<TypeId, Error> {
        if let Some(id) = self.canonical.load(&shape) {
            return Ok(id);
        }
        if let Some(missing) = shape.children().into_iter().find(|id| self.get(*id).is_none()) {
            return Err(StructuralError::UnknownType(missing.raw()).into());
        }
        let shape = validate(shape, self)?;
        let children = shape.try_map(|id| {
            self.get(*id)
                .ok_or(StructuralError::UnknownType(id.raw()))
        })?;
        let facts = self.facts(&shape, &children)?;
        let string = facts.string.clone();
        let id = self.intern(shape, move |shape| RType::anonymous(shape, facts));
        tracing::trace!(ty = %string, id = id.raw(), "realized complete shape");
        Ok(id)
    }

    /// Method set of a finished type: the declared methods of a named type,
    /// or the full method set of an interface.
    pub fn methods(&self, id: TypeId) -> Vec<Method<TypeId>> {
        let Some(rtype) = self.get(id) else {
            return Vec::new();
        };
        if rtype.methods.is_empty() {
            rtype.interface_methods.to_vec()
        } else {
            rtype.methods.iter().map(|entry| entry.method.clone()).collect()
        }
    }

    /// Implementation of the `index`th method of a named type.
    pub fn method_impl(&self, id: TypeId, index: usize) -> Option<MethodImpl> {
        self.get(id)?.methods.get(index)?.implementation().cloned()
    }

    /// Reserve `count` consecutive ids for named types built later with
    /// [`install`](Self::install).
    pub(crate) fn reserve(&self, count: usize) -> Vec<TypeId> {
        let mut types = self.types.write();
        let first = types.len();
        types.resize_with(first + count, || None);
        (first..first + count).map(to_id).collect()
    }

    /// Fill a reserved slot.
    ///
    /// # Panics
    /// Panics if `id` was not reserved or is already filled.
    pub(crate) fn install(&self, id: TypeId, rtype: RType) {
        let mut types = self.types.write();
        match types.get_mut(id.index()) {
            Some(slot @ None) => *slot = Some(Arc::new(rtype)),
            Some(Some(existing)) => {
                panic!("type slot {} already holds `{}`", id.raw(), existing.string)
            }
            None => panic!("type slot {} was never reserved", id.raw()),
        }
    }

    /// The canonical id of `shape`, building and storing its type if absent.
    ///
    /// `build` runs under the cache's shard lock and must not call back into
    /// the table.
    pub(crate) fn intern(&self, shape: Shape<TypeId>, build: impl FnOnce(Shape<TypeId>) -> RType) -> TypeId {
        let key = shape.clone();
        self.canonical.load_or_insert_with(key, || {
            let rtype = Arc::new(build(shape));
            let mut types = self.types.write();
            let id = to_id(types.len());
            types.push(Some(rtype));
            id
        })
    }

    fn facts(
        &self,
        shape: &Shape<TypeId>,
        children: &Shape<Arc<RType>>,
    ) -> Result<Facts, ConstructionError> {
        let string = children.render(|child| child.string.clone());
        let mut offsets: Box<[u64]> = Box::default();
        let mut interface_methods: Box<[Method<TypeId>]> = Box::default();

        let (layout, comparable) = match children {
            Shape::Array { elem, len } => {
                let layout = layout::array(self.target, elem.layout, *len).ok_or_else(|| {
                    ConstructionError::ArrayTooLarge {
                        elem: elem.string.clone(),
                        len: *len,
                    }
                })?;
                (layout, elem.comparable)
            }
            Shape::Struct(fields) => {
                let packed = layout::structure(self.target, fields.iter().map(|f| f.ty.layout))
                    .ok_or_else(|| ConstructionError::StructTooLarge(string.clone()))?;
                offsets = packed.offsets.into_boxed_slice();
                (packed.layout, fields.iter().all(|f| f.ty.comparable))
            }
            _ => {
                let layout = shape
                    .fixed_layout(self.target)
                    .unwrap_or_else(|| unreachable!("indirect kinds have fixed layouts"));
                (layout, shape.fixed_comparable().unwrap_or(false))
            }
        };

        let hash = if let Shape::Interface { embedded, methods } = shape {
            let inherited: Vec<Vec<Method<TypeId>>> =
                embedded.iter().map(|id| self.methods(*id)).collect();
            let all = Method::merge(
                std::iter::once(&methods[..]).chain(inherited.iter().map(Vec::as_slice)),
            )?;
            let hashes: Vec<Method<u32>> = all
                .iter()
                .map(|m| m.map(|id| self.get(*id).map_or(0, |t| t.hash)))
                .collect();
            interface_methods = all.into_boxed_slice();
            shape_hash(&Shape::Interface {
                embedded: Box::default(),
                methods: hashes.into_boxed_slice(),
            })
        } else {
            shape_hash(&children.map(|child| child.hash))
        };

        Ok(Facts {
            layout,
            hash,
            comparable,
            string,
            offsets,
            interface_methods,
        })
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new(Target::host())
    }
}

impl fmt::Debug for TypeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeTable")
            .field("target", &self.target)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl Inspect<TypeId> for TypeTable {
    fn kind(&self, ty: &TypeId) -> Option<Kind> {
        self.get(*ty).map(|t| t.kind)
    }

    fn is_named(&self, ty: &TypeId) -> bool {
        self.get(*ty).is_some_and(|t| t.name.is_some())
    }

    fn embedded_name(&self, ty: &TypeId) -> Option<String> {
        let rtype = self.get(*ty)?;
        if let Some(name) = rtype.name() {
            return Some(name.name.clone());
        }
        match rtype.shape()? {
            Shape::Ptr(elem) => Some(self.get(*elem)?.name()?.name.clone()),
            _ => None,
        }
    }

    fn comparable(&self, ty: &TypeId) -> Tribool {
        self.get(*ty)
            .map_or(Tribool::Unknown, |t| Tribool::from_bool(t.comparable))
    }

    fn display(&self, ty: &TypeId) -> String {
        self.get(*ty)
            .map_or_else(|| format!("{ty:?}"), |t| t.string.clone())
    }
}

fn to_id(index: usize) -> TypeId {
    let raw = u32::try_from(index).unwrap_or_else(|_| panic!("type table exceeded u32::MAX types"));
    TypeId::from_raw(raw)
}

/// A [`TypeTable`] shared between sessions and threads.
#[derive(Clone, Default)]
pub struct SharedTypeTable(Arc<TypeTable>);

impl SharedTypeTable {
    pub fn new(table: TypeTable) -> Self {
        SharedTypeTable(Arc::new(table))
    }

    /// A fresh table for `target`.
    pub fn with_target(target: Target) -> Self {
        Self::new(TypeTable::new(target))
    }
}

impl Deref for SharedTypeTable {
    type Target = TypeTable;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Debug for SharedTypeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedTypeTable")
            .field("len", &self.0.len())
            .finish()
    }
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "Test code uses expect for clarity")]
mod tests;

//! Size and layout resolution.
//!
//! `resolve_size` memoizes through [`NodeFlags::SIZED`]. A size that depends
//! on a named type not yet bound is simply unknown (`Ok(None)`) and may be
//! resolved later. A size that depends on itself is an error: the work set
//! holds every node whose size is being computed further up the stack.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use knot_stack::ensure_sufficient_stack;

use super::{Content, TypeGraph, Ty};
use crate::{layout, ConstructionError, Error, Layout, NodeFlags, Shape, StructuralError, Tribool, TypeId};

/// How to size one node, captured before recursing into children.
enum Plan {
    Alias(Ty),
    Finished(TypeId),
    Fixed(Layout, bool),
    Array(Ty, u64),
    Struct(SmallVec<[Ty; 8]>),
}

impl TypeGraph {
    /// Resolve the layout and comparability of `ty` and of everything its
    /// size depends on.
    ///
    /// Returns `Ok(None)` while some named type it depends on is unbound.
    pub fn resolve_size(&mut self, ty: Ty) -> Result<Option<Layout>, Error> {
        self.check(ty)?;
        let mut work = FxHashSet::default();
        self.size_of(ty, &mut work)
    }

    fn size_of(&mut self, ty: Ty, work: &mut FxHashSet<Ty>) -> Result<Option<Layout>, Error> {
        ensure_sufficient_stack(|| {
            let node = self.node(ty);
            if node.flags.is_sized() {
                return Ok(node.layout);
            }
            if !work.insert(ty) {
                let name = self.display(ty);
                tracing::debug!(ty = %name, "invalid recursive type");
                return Err(StructuralError::InvalidRecursion(name).into());
            }
            let resolved = self.compute_size(ty, work);
            work.remove(&ty);

            let Some((layout, comparable)) = resolved? else {
                return Ok(None);
            };
            let node = self.node_mut(ty);
            node.layout = Some(layout);
            node.comparable = comparable;
            node.flags |= NodeFlags::SIZED;
            Ok(Some(layout))
        })
    }

    fn compute_size(
        &mut self,
        ty: Ty,
        work: &mut FxHashSet<Ty>,
    ) -> Result<Option<(Layout, Tribool)>, Error> {
        let target = self.table.target();
        let plan = match &self.node(ty).content {
            Content::Empty => return Ok(None),
            Content::Alias(next) => Plan::Alias(*next),
            Content::Underlying(id) | Content::Realized(id) => Plan::Finished(*id),
            Content::Shape(Shape::Array { elem, len }) => Plan::Array(*elem, *len),
            Content::Shape(Shape::Struct(fields)) => {
                Plan::Struct(fields.iter().map(|field| field.ty).collect())
            }
            Content::Shape(shape) => match (shape.fixed_layout(target), shape.fixed_comparable()) {
                (Some(layout), Some(comparable)) => Plan::Fixed(layout, comparable),
                _ => unreachable!("{:?} has a fixed layout", shape.kind()),
            },
        };

        match plan {
            Plan::Alias(next) => {
                let layout = self.size_of(next, work)?;
                Ok(layout.map(|layout| (layout, self.node(next).comparable)))
            }
            Plan::Finished(id) => {
                let rtype = self
                    .table
                    .get(id)
                    .ok_or(StructuralError::UnknownType(id.raw()))?;
                Ok(Some((rtype.layout(), Tribool::from_bool(rtype.comparable()))))
            }
            Plan::Fixed(layout, comparable) => Ok(Some((layout, Tribool::from_bool(comparable)))),
            Plan::Array(elem, len) => {
                let Some(elem_layout) = self.size_of(elem, work)? else {
                    return Ok(None);
                };
                let layout = layout::array(target, elem_layout, len).ok_or_else(|| {
                    ConstructionError::ArrayTooLarge {
                        elem: self.display(elem),
                        len,
                    }
                })?;
                Ok(Some((layout, self.node(elem).comparable)))
            }
            Plan::Struct(fields) => {
                let mut layouts: SmallVec<[Layout; 8]> = SmallVec::with_capacity(fields.len());
                let mut comparable = Tribool::True;
                let mut known = true;
                // Every field is visited so recursion behind an unbound
                // field is still found.
                for field in fields {
                    match self.size_of(field, work)? {
                        Some(field_layout) => {
                            layouts.push(field_layout);
                            comparable = comparable.and(self.node(field).comparable);
                        }
                        None => known = false,
                    }
                }
                if !known {
                    return Ok(None);
                }
                let packed = layout::structure(target, layouts)
                    .ok_or_else(|| ConstructionError::StructTooLarge(self.display(ty)))?;
                Ok(Some((packed.layout, comparable)))
            }
        }
    }
}

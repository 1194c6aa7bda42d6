//! Composite constructors.
//!
//! A composite whose children are all finished is realized directly in the
//! table and enters the graph as a leaf. Only a composite with at least one
//! incomplete child becomes a shape node; those are deduplicated per session
//! by structure.

use super::{Content, Node, TypeGraph, Ty};
use crate::shape::validate::validate;
use crate::{ChanDir, ConstructionError, Error, Field, Method, NodeFlags, Shape, Tribool};

impl TypeGraph {
    /// `[len]elem`.
    pub fn array(&mut self, elem: Ty, len: i64) -> Result<Ty, Error> {
        let len = u64::try_from(len).map_err(|_| ConstructionError::NegativeLength(len))?;
        self.compose(Shape::Array { elem, len })
    }

    /// `chan elem`, `<-chan elem` or `chan<- elem`, by `dir`.
    pub fn chan(&mut self, elem: Ty, dir: ChanDir) -> Result<Ty, Error> {
        self.compose(Shape::Chan { elem, dir })
    }

    /// `func(params...) (results...)`. If `variadic`, the last parameter must
    /// be an unnamed slice.
    pub fn func(&mut self, params: &[Ty], results: &[Ty], variadic: bool) -> Result<Ty, Error> {
        self.compose(Shape::Func {
            params: params.into(),
            results: results.into(),
            variadic,
        })
    }

    /// Interface embedding the named interfaces `embedded` and declaring
    /// `methods`.
    pub fn interface(&mut self, embedded: &[Ty], methods: Vec<Method<Ty>>) -> Result<Ty, Error> {
        self.compose(Shape::Interface {
            embedded: embedded.into(),
            methods: methods.into_boxed_slice(),
        })
    }

    /// `map[key]elem`. A key that is already known to be incomparable is
    /// rejected here; otherwise the key is checked again at completion.
    pub fn map(&mut self, key: Ty, elem: Ty) -> Result<Ty, Error> {
        self.compose(Shape::Map { key, elem })
    }

    /// `*elem`.
    pub fn ptr(&mut self, elem: Ty) -> Result<Ty, Error> {
        self.compose(Shape::Ptr(elem))
    }

    /// `[]elem`.
    pub fn slice(&mut self, elem: Ty) -> Result<Ty, Error> {
        self.compose(Shape::Slice(elem))
    }

    /// `struct { fields... }`, fields in declaration order.
    pub fn struct_of(&mut self, fields: Vec<Field<Ty>>) -> Result<Ty, Error> {
        self.compose(Shape::Struct(fields.into_boxed_slice()))
    }

    fn compose(&mut self, shape: Shape<Ty>) -> Result<Ty, Error> {
        for child in shape.children() {
            self.check(child)?;
        }
        let shape = validate(shape, &*self)?;

        let complete = shape
            .try_map(|child| self.finished(*child).ok_or(()))
            .ok();
        if let Some(complete) = complete {
            let id = self.table.realize(complete)?;
            return self.of(id);
        }

        if let Some(&ty) = self.shapes.get(&shape) {
            tracing::trace!(ty = %self.display(ty), "canonical shape hit");
            return Ok(ty);
        }

        let target = self.table.target();
        let mut node = Node {
            named: None,
            content: Content::Shape(shape.clone()),
            comparable: Tribool::Unknown,
            flags: NodeFlags::DEFINED,
            layout: None,
        };
        if let (Some(layout), Some(comparable)) =
            (shape.fixed_layout(target), shape.fixed_comparable())
        {
            node.layout = Some(layout);
            node.comparable = Tribool::from_bool(comparable);
            node.flags |= NodeFlags::SIZED;
        }
        let ty = self.push(node);

        // Arrays and structs of already-sized children get their layout now;
        // an oversized one is rejected before it can be shared.
        if !shape.kind().is_indirect() {
            self.resolve_size(ty)?;
        }
        self.shapes.insert(shape, ty);
        Ok(ty)
    }
}

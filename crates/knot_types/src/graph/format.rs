//! Display strings of graph nodes.

use knot_stack::ensure_sufficient_stack;

use super::{Content, TypeGraph, Ty};

impl TypeGraph {
    /// Display string of a node: the qualified name of a named type, the
    /// rendered shape of an anonymous composite.
    pub fn display(&self, ty: Ty) -> String {
        let Some(node) = self.get(ty) else {
            return format!("<foreign {ty:?}>");
        };
        if let Some(named) = &node.named {
            return named.display.clone();
        }
        match &node.content {
            Content::Shape(shape) => {
                ensure_sufficient_stack(|| shape.render(|child| self.display(*child)))
            }
            Content::Underlying(id) | Content::Realized(id) => self
                .table
                .get(*id)
                .map_or_else(|| format!("{id:?}"), |rtype| rtype.string().to_owned()),
            Content::Empty | Content::Alias(_) => format!("<undefined {ty:?}>"),
        }
    }
}

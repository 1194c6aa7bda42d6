//! Named placeholders: declare, bind, add methods.

use super::{Content, Named, Node, TypeGraph, Ty};
use crate::name::is_valid_ident;
use crate::shape::validate::check_method;
use crate::{ConstructionError, Error, Method, NodeFlags, QualifiedName, StructuralError, Tribool};

impl TypeGraph {
    /// Declare a named type with no definition yet.
    ///
    /// `scope` is the declaring package path; its last segment qualifies the
    /// display name (`my/pkg/geom` + `Point` displays as `geom.Point`).
    pub fn named(&mut self, name: &str, scope: &str) -> Result<Ty, Error> {
        if name.is_empty() {
            return Err(ConstructionError::EmptyName.into());
        }
        if !is_valid_ident(name) {
            return Err(ConstructionError::InvalidName(name.to_owned()).into());
        }
        let qname = QualifiedName::new(name, scope);
        let display = qname.to_string();
        Ok(self.push(Node {
            named: Some(Box::new(Named {
                qname,
                display,
                methods: Vec::new(),
            })),
            content: Content::Empty,
            comparable: Tribool::Unknown,
            flags: NodeFlags::empty(),
            layout: None,
        }))
    }

    /// Define named type `ty` as `underlying`.
    ///
    /// `ty` takes `underlying`'s definition: its shape, its finished
    /// underlying type, or, if `underlying` is a named type not yet bound
    /// itself, a link to it. Named-type loops and unbounded recursion are
    /// rejected here; on error `ty` stays unbound.
    pub fn bind(&mut self, ty: Ty, underlying: Ty) -> Result<(), Error> {
        self.check(ty)?;
        self.check(underlying)?;
        let node = self.node(ty);
        if node.named.is_none() {
            return Err(StructuralError::NotNamed(self.display(ty)).into());
        }
        match node.content {
            Content::Empty => {}
            Content::Realized(_) => {
                return Err(StructuralError::AlreadyRealized(self.display(ty)).into());
            }
            _ => return Err(StructuralError::AlreadyDefined(self.display(ty)).into()),
        }

        let content = self.definition_of(underlying);
        self.node_mut(ty).content = content;
        if let Err(err) = self.settle(ty) {
            self.node_mut(ty).content = Content::Empty;
            tracing::debug!(ty = %self.display(ty), error = %err, "bind rejected");
            return Err(err);
        }
        self.node_mut(ty).flags |= NodeFlags::DEFINED;
        tracing::trace!(ty = %self.display(ty), underlying = %self.display(underlying), "bound");
        Ok(())
    }

    /// Declare a method on named type `ty`.
    pub fn add_method(&mut self, ty: Ty, method: Method<Ty>) -> Result<(), Error> {
        self.check(ty)?;
        self.check(method.ty)?;
        let node = self.node(ty);
        let Some(named) = node.named.as_deref() else {
            return Err(StructuralError::NotNamed(self.display(ty)).into());
        };
        if matches!(node.content, Content::Realized(_)) {
            return Err(StructuralError::AlreadyRealized(named.display.clone()).into());
        }
        check_method(&method, &*self)?;
        if named.methods.iter().any(|m| m.name == method.name) {
            return Err(StructuralError::MethodRedeclared {
                ty: named.display.clone(),
                name: method.name,
            }
            .into());
        }
        if !method.scope.is_empty() {
            let other = named
                .methods
                .iter()
                .find(|m| !m.scope.is_empty() && m.scope != method.scope);
            if let Some(other) = other {
                return Err(StructuralError::ScopeMismatch {
                    ty: named.display.clone(),
                    name: method.name,
                    expected: other.scope.clone(),
                    found: method.scope,
                }
                .into());
            }
        }

        if let Some(named) = self.node_mut(ty).named.as_deref_mut() {
            named.methods.push(method);
        }
        Ok(())
    }

    /// The content a named type bound to `underlying` takes.
    fn definition_of(&self, underlying: Ty) -> Content {
        match &self.node(underlying).content {
            Content::Empty => Content::Alias(underlying),
            Content::Alias(target) => Content::Alias(*target),
            Content::Shape(shape) => Content::Shape(shape.clone()),
            Content::Underlying(id) => Content::Underlying(*id),
            Content::Realized(id) => Content::Underlying(
                self.table
                    .get(*id)
                    .and_then(|rtype| rtype.underlying())
                    .unwrap_or(*id),
            ),
        }
    }

    /// Check a freshly bound node and resolve what can be resolved.
    fn settle(&mut self, ty: Ty) -> Result<(), Error> {
        self.detect_loop(ty)?;
        let end = self.chain_end(ty);
        if end != ty {
            let content = match self.node(end).content {
                Content::Empty => Content::Alias(end),
                _ => self.definition_of(end),
            };
            self.node_mut(ty).content = content;
        }
        match self.resolve_size(ty) {
            Err(Error::Structural(StructuralError::InvalidRecursion(_))) => {
                Err(StructuralError::InvalidRecursion(self.display(ty)).into())
            }
            other => other.map(|_| ()),
        }
    }
}

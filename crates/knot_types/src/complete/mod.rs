//! Batch completion.
//!
//! [`TypeGraph::complete`] turns a list of root nodes, and everything they
//! reach, into finished types in four passes over the closure:
//!
//! 1. **check**: resolve every size and validate everything that can still
//!    fail: unbound named types, map keys, interface method sets, method
//!    receivers. This is the only phase that returns errors.
//! 2. **render**: compute hash and display string of every node.
//! 3. **realize**: build a finished type for every node, children first;
//!    named types get reserved ids up front so cycles through them resolve.
//! 4. **finalize**: mark nodes complete and install method implementations.
//!
//! Phases 2 and 3 only read the graph and write into per-batch maps, so a
//! batch either completes as a whole or leaves every node unfinalized.
//! Inconsistencies found after phase 1 are bugs and panic.

use std::iter;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::graph::{Content, TypeGraph, Ty};
use crate::{
    CompletionError, ConstructionError, Error, Kind, Method, MethodImpl, NodeFlags, Shape,
    StructuralError, Tribool, TypeId,
};

mod realize;
mod render;

/// Builds the implementation of one method of a completed named type.
///
/// Called with the finished roots of the batch, the index of the receiver
/// among them, and the method.
pub type MethodFactory<'f> = dyn FnMut(&[TypeId], usize, &Method<TypeId>) -> MethodImpl + 'f;

/// Complete method set of every interface node in a batch, sorted by
/// (scope, name).
pub(crate) type MethodSets = FxHashMap<Ty, Vec<Method<Ty>>>;

/// A node of the batch closure and the index of the first root reaching it.
#[derive(Copy, Clone, Debug)]
struct Reached {
    ty: Ty,
    root: usize,
}

/// Where an interface's methods come from.
enum Source {
    Declared(Vec<Ty>, Vec<Method<Ty>>),
    Finished(TypeId),
    Invalid,
}

impl TypeGraph {
    /// Complete `roots`, returning their finished types in the same order.
    ///
    /// `factory` is called once per method of every named root completed
    /// by this call.
    #[tracing::instrument(level = "debug", skip_all, fields(roots = roots.len()))]
    pub fn complete<F>(&mut self, roots: &[Ty], mut factory: F) -> Result<Vec<TypeId>, Error>
    where
        F: FnMut(&[TypeId], usize, &Method<TypeId>) -> MethodImpl,
    {
        let factory: &mut MethodFactory<'_> = &mut factory;
        self.complete_batch(roots, Some(factory))
    }

    /// Complete `roots`, none of which may carry methods.
    #[tracing::instrument(level = "debug", skip_all, fields(roots = roots.len()))]
    pub fn complete_plain(&mut self, roots: &[Ty]) -> Result<Vec<TypeId>, Error> {
        self.complete_batch(roots, None)
    }

    fn complete_batch(
        &mut self,
        roots: &[Ty],
        factory: Option<&mut MethodFactory<'_>>,
    ) -> Result<Vec<TypeId>, Error> {
        for &root in roots {
            self.check(root)?;
        }
        let closure = self.closure(roots);

        let sets = self.check_batch(roots, &closure, factory.is_some())?;
        tracing::debug!(nodes = closure.len(), "sizes resolved");

        let order: Vec<Ty> = closure.iter().map(|reached| reached.ty).collect();
        let rendered = render::render_all(self, &order, &sets);
        tracing::debug!(rendered = rendered.len(), "hashes rendered");

        let realized = realize::realize_all(self, &order, &rendered, &sets);
        tracing::debug!(reserved = realized.fresh.len(), "types realized");

        let finished = self.finalize(roots, &order, &realized, factory);
        tracing::debug!(finished = finished.len(), "batch complete");
        Ok(finished)
    }

    /// Every node reachable from `roots`, children before parents except
    /// along cycles.
    fn closure(&self, roots: &[Ty]) -> Vec<Reached> {
        let mut seen = FxHashSet::default();
        let mut order = Vec::new();
        for (root_index, &root) in roots.iter().enumerate() {
            if !seen.insert(root) {
                continue;
            }
            let mut stack = vec![(root, self.edges(root), 0usize)];
            while let Some((ty, edges, next)) = stack.last_mut() {
                if let Some(&child) = edges.get(*next) {
                    *next += 1;
                    if seen.insert(child) {
                        let edges = self.edges(child);
                        stack.push((child, edges, 0));
                    }
                } else {
                    order.push(Reached {
                        ty: *ty,
                        root: root_index,
                    });
                    stack.pop();
                }
            }
        }
        order
    }

    fn edges(&self, ty: Ty) -> SmallVec<[Ty; 4]> {
        let node = self.node(ty);
        let mut edges = match &node.content {
            Content::Alias(target) => smallvec::smallvec![*target],
            Content::Shape(shape) => shape.children(),
            Content::Empty | Content::Underlying(_) | Content::Realized(_) => SmallVec::new(),
        };
        if !matches!(node.content, Content::Realized(_)) {
            if let Some(named) = &node.named {
                edges.extend(named.methods.iter().map(|method| method.ty));
            }
        }
        edges
    }

    /// Phase 1. Nothing is finalized if this fails.
    fn check_batch(
        &mut self,
        roots: &[Ty],
        closure: &[Reached],
        has_factory: bool,
    ) -> Result<MethodSets, Error> {
        for reached in closure {
            if matches!(self.node(self.chain_end(reached.ty)).content, Content::Empty) {
                let name = self.display(self.chain_end(reached.ty));
                tracing::debug!(index = reached.root, ty = %name, "undefined named type");
                return Err(CompletionError::Undefined {
                    index: reached.root,
                    name,
                }
                .into());
            }
        }

        for reached in closure {
            if self.resolve_size(reached.ty)?.is_none() {
                let name = self.display(reached.ty);
                tracing::debug!(index = reached.root, ty = %name, "size unresolved");
                return Err(CompletionError::Undefined {
                    index: reached.root,
                    name,
                }
                .into());
            }
        }

        let mut sets = MethodSets::default();
        for reached in closure {
            let end = self.chain_end(reached.ty);
            let (key, interface) = match &self.node(end).content {
                Content::Shape(Shape::Map { key, .. }) => (Some(*key), false),
                Content::Shape(Shape::Interface { .. }) => (None, true),
                _ => (None, false),
            };
            if let Some(key) = key {
                if self.comparable(key) != Tribool::True {
                    return Err(CompletionError::IncomparableKey {
                        index: reached.root,
                        key: self.display(key),
                    }
                    .into());
                }
            }
            if interface {
                let set = self.method_set(reached.ty, &mut sets, &mut FxHashSet::default())?;
                sets.insert(reached.ty, set);
            }
            self.check_receiver(roots, reached.ty, has_factory)?;
        }
        Ok(sets)
    }

    fn check_receiver(&self, roots: &[Ty], ty: Ty, has_factory: bool) -> Result<(), Error> {
        let node = self.node(ty);
        let Some(named) = node.named.as_deref() else {
            return Ok(());
        };
        if named.methods.is_empty() || matches!(node.content, Content::Realized(_)) {
            return Ok(());
        }
        let Some(index) = roots.iter().position(|root| *root == ty) else {
            return Err(CompletionError::UnlistedReceiver {
                name: named.display.clone(),
            }
            .into());
        };
        if !self.kind(ty).is_some_and(Kind::accepts_methods) {
            return Err(CompletionError::InvalidReceiver {
                index,
                name: named.display.clone(),
            }
            .into());
        }
        if !has_factory {
            return Err(CompletionError::MissingMethodFactory {
                name: named.display.clone(),
            }
            .into());
        }
        for method in &named.methods {
            if self.kind(method.ty) != Some(Kind::Func) {
                return Err(ConstructionError::MethodNotFunc {
                    name: method.name.clone(),
                    ty: self.display(method.ty),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Complete method set of the interface `ty`: its declared methods and
    /// those of every interface it embeds, transitively.
    fn method_set(
        &mut self,
        ty: Ty,
        sets: &mut MethodSets,
        visiting: &mut FxHashSet<Ty>,
    ) -> Result<Vec<Method<Ty>>, Error> {
        if let Some(set) = sets.get(&ty) {
            return Ok(set.clone());
        }
        let end = self.chain_end(ty);
        let source = match &self.node(end).content {
            Content::Shape(Shape::Interface { embedded, methods }) => {
                Source::Declared(embedded.to_vec(), methods.to_vec())
            }
            Content::Underlying(id) | Content::Realized(id) => Source::Finished(*id),
            _ => Source::Invalid,
        };
        let (embedded, declared) = match source {
            Source::Declared(embedded, declared) => (embedded, declared),
            Source::Finished(id) if self.kind(end) == Some(Kind::Interface) => {
                return self
                    .table()
                    .methods(id)
                    .into_iter()
                    .map(|method| -> Result<Method<Ty>, Error> {
                        Ok(Method {
                            ty: self.of(method.ty)?,
                            name: method.name,
                            scope: method.scope,
                        })
                    })
                    .collect();
            }
            Source::Finished(_) | Source::Invalid => {
                return Err(ConstructionError::EmbeddedNotInterface(self.display(ty)).into());
            }
        };

        if !visiting.insert(end) {
            let name = self.display(ty);
            tracing::debug!(ty = %name, "interface embeds itself");
            return Err(StructuralError::InvalidRecursion(name).into());
        }
        let mut inherited = Vec::with_capacity(embedded.len());
        for embed in embedded {
            inherited.push(self.method_set(embed, sets, visiting)?);
        }
        visiting.remove(&end);

        let set = Method::merge(
            iter::once(declared.as_slice()).chain(inherited.iter().map(Vec::as_slice)),
        )?;
        sets.insert(end, set.clone());
        Ok(set)
    }

    /// Phase 4.
    fn finalize(
        &mut self,
        roots: &[Ty],
        order: &[Ty],
        realized: &realize::Realized,
        factory: Option<&mut MethodFactory<'_>>,
    ) -> Vec<TypeId> {
        for &ty in order {
            let id = realized.id(ty);
            let node = self.node_mut(ty);
            if matches!(node.content, Content::Realized(_)) {
                continue;
            }
            node.content = Content::Realized(id);
            node.flags |= NodeFlags::COMPLETE;
            self.remember(id, ty);
        }

        let finished: Vec<TypeId> = roots.iter().map(|&root| realized.id(root)).collect();

        if let Some(factory) = factory {
            let mut installed = FxHashSet::default();
            for (index, &root) in roots.iter().enumerate() {
                if !realized.fresh.contains(&root) || !installed.insert(root) {
                    continue;
                }
                let id = realized.id(root);
                let rtype = self
                    .table()
                    .get(id)
                    .unwrap_or_else(|| panic!("completed type {} is not installed", id.raw()));
                for entry in rtype.methods() {
                    let imp = factory(&finished, index, entry.method());
                    assert!(
                        entry.install(imp),
                        "method `{}` of `{}` already has an implementation",
                        entry.method().name,
                        rtype.string()
                    );
                }
            }
        }
        finished
    }
}

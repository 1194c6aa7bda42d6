//! Named-type loop detection.
//!
//! Binding a named type to another named type that has no definition yet
//! leaves an alias link. A chain of such links that returns to its start has
//! no shape anywhere along it, so no indirection bounds its size: the type
//! would need infinite storage.

use super::{Content, TypeGraph, Ty};
use crate::StructuralError;

impl TypeGraph {
    fn alias_target(&self, ty: Ty) -> Option<Ty> {
        match self.node(ty).content {
            Content::Alias(target) => Some(target),
            _ => None,
        }
    }

    /// Tortoise-and-hare walk over the alias chain starting at `start`.
    pub(super) fn detect_loop(&self, start: Ty) -> Result<(), StructuralError> {
        let mut slow = start;
        let mut fast = start;
        loop {
            let Some(step) = self.alias_target(fast) else {
                return Ok(());
            };
            let Some(next) = self.alias_target(step) else {
                return Ok(());
            };
            fast = next;
            let Some(behind) = self.alias_target(slow) else {
                return Ok(());
            };
            slow = behind;
            if slow == fast {
                let name = self.display(start);
                tracing::debug!(ty = %name, "invalid type loop");
                return Err(StructuralError::InvalidLoop(name));
            }
        }
    }

    /// Last node of the alias chain starting at `start`.
    ///
    /// Chains are checked by [`detect_loop`](Self::detect_loop) when bound, so
    /// this terminates.
    pub(crate) fn chain_end(&self, start: Ty) -> Ty {
        let mut ty = start;
        while let Some(next) = self.alias_target(ty) {
            ty = next;
        }
        ty
    }
}

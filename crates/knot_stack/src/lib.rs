//! Stack growth for recursive type-graph walks.
//!
//! Size resolution, rendering and realization all recurse along element and
//! field edges. A caller can legally build a chain of thousands of nested
//! arrays or structs, so every recursive step runs under
//! [`ensure_sufficient_stack`], which grows the stack on demand instead of
//! overflowing it.
//!
//! On `wasm32` the guard is a plain call.

/// Remaining stack below which a new segment is allocated.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment.
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone is left.
///
/// ```text
/// fn depth(graph: &TypeGraph, ty: Ty) -> usize {
///     ensure_sufficient_stack(|| match graph.elem(ty) {
///         Some(elem) => depth(graph, elem) + 1,
///         None => 0,
///     })
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// `wasm32` manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

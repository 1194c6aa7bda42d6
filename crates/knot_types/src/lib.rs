//! Incomplete type graphs.
//!
//! Types that refer to each other (a list node pointing at its own type, two
//! structs pointing at each other) cannot be built bottom-up. This crate
//! builds them in stages:
//!
//! 1. declare named placeholders with [`TypeGraph::named`],
//! 2. build composite shapes over them ([`TypeGraph::ptr`],
//!    [`TypeGraph::struct_of`], ...) and [`bind`](TypeGraph::bind) each
//!    placeholder to its definition,
//! 3. [`complete`](TypeGraph::complete) the roots into finished types in a
//!    shared [`TypeTable`].
//!
//! # Identity
//!
//! - [`Ty`]: a node of one graph session. Cheap to copy, meaningless outside
//!   the session that created it.
//! - [`TypeId`]: a finished type in a [`TypeTable`]. Anonymous composites are
//!   canonical: structurally equal types have equal ids.
//!
//! ```text
//! let table = SharedTypeTable::default();
//! let mut graph = TypeGraph::new(table.clone());
//! let list = graph.named("List", "main")?;
//! let int = graph.of(TypeId::INT)?;
//! let node = graph.struct_of(vec![Field::new("Value", int), Field::new("Next", list)])?;
//! let ptr = graph.ptr(node)?;
//! graph.bind(list, ptr)?;
//! let finished = graph.complete_plain(&[list])?;
//! assert_eq!(table.get(finished[0]).map(|t| t.size()), Some(8));
//! ```

mod cache;
mod complete;
mod error;
mod flags;
mod graph;
pub mod hash;
mod id;
mod kind;
pub mod layout;
pub mod name;
mod shape;
mod table;
mod target;

pub use cache::Canonical;
pub use complete::MethodFactory;
pub use error::{CompletionError, ConstructionError, Error, StructuralError};
pub use flags::{NodeFlags, Tribool};
pub use graph::{GraphId, Ty, TypeGraph};
pub use id::TypeId;
pub use kind::{ChanDir, Kind};
pub use name::QualifiedName;
pub use shape::{Field, Method, Shape};
pub use table::{MethodEntry, MethodImpl, RType, SharedTypeTable, TypeTable};
pub use target::{Layout, PointerWidth, Target};

// Handles are copied through every map in the completion engine.
mod size_asserts {
    use super::{Ty, TypeId};
    const _: () = assert!(std::mem::size_of::<Ty>() == 8);
    const _: () = assert!(std::mem::size_of::<TypeId>() == 4);
}

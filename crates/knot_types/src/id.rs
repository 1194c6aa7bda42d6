//! Handle for finished types.
//!
//! A `TypeId` indexes the [`TypeTable`](crate::TypeTable). Two finished
//! types are the same type iff their ids are equal: anonymous composites are
//! canonicalized before an id is handed out, and every named type gets its
//! own id.

use std::fmt;

use crate::Kind;

/// A 32-bit index into the finished-type table.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    // === Basic types (0-17) ===
    // Pre-installed by every table at these fixed indices, in `Kind` order.

    pub const BOOL: Self = Self(0);
    pub const INT: Self = Self(1);
    pub const INT8: Self = Self(2);
    pub const INT16: Self = Self(3);
    pub const INT32: Self = Self(4);
    pub const INT64: Self = Self(5);
    pub const UINT: Self = Self(6);
    pub const UINT8: Self = Self(7);
    pub const UINT16: Self = Self(8);
    pub const UINT32: Self = Self(9);
    pub const UINT64: Self = Self(10);
    pub const UINTPTR: Self = Self(11);
    pub const FLOAT32: Self = Self(12);
    pub const FLOAT64: Self = Self(13);
    pub const COMPLEX64: Self = Self(14);
    pub const COMPLEX128: Self = Self(15);
    pub const STRING: Self = Self(16);
    pub const UNSAFE_POINTER: Self = Self(17);

    /// Number of pre-installed basic types.
    pub const BASIC_COUNT: u32 = 18;

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The pre-installed id of a basic kind.
    pub const fn basic(kind: Kind) -> Option<Self> {
        if kind.is_basic() {
            Some(Self(kind as u32))
        } else {
            None
        }
    }

    #[inline]
    pub const fn is_basic(self) -> bool {
        self.0 < Self::BASIC_COUNT
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Kind::BASIC.get(self.index()) {
            Some(kind) => write!(f, "TypeId::{}", kind.name()),
            None => write!(f, "TypeId({})", self.0),
        }
    }
}

const _: () = assert!(std::mem::size_of::<TypeId>() == 4);

#[cfg(test)]
mod tests;

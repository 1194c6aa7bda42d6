//! Node completion state.
//!
//! Flags only ever advance: once set, a flag is never cleared.

use bitflags::bitflags;

bitflags! {
    /// Completion progress of a graph node.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct NodeFlags: u8 {
        /// Content is known: an anonymous shape, or a bound named type.
        const DEFINED = 1 << 0;
        /// Layout and comparability are known.
        const SIZED = 1 << 1;
        /// Hash and display string are known.
        const RENDERED = 1 << 2;
        /// Realized into the table; the node is immutable.
        const FINALIZED = 1 << 3;
    }
}

impl NodeFlags {
    /// Flags of a node wrapping an already-finished type.
    pub const COMPLETE: Self = Self::all();

    #[inline]
    pub const fn is_sized(self) -> bool {
        self.contains(Self::SIZED)
    }

    #[inline]
    pub const fn is_finalized(self) -> bool {
        self.contains(Self::FINALIZED)
    }
}

/// Three-valued truth for properties that depend on children not yet bound.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub enum Tribool {
    False,
    True,
    #[default]
    Unknown,
}

impl Tribool {
    #[inline]
    pub const fn from_bool(value: bool) -> Self {
        if value {
            Tribool::True
        } else {
            Tribool::False
        }
    }

    /// Conjunction where `Unknown` absorbs both other values.
    #[inline]
    #[must_use]
    pub const fn and(self, other: Self) -> Self {
        match (self, other) {
            (Tribool::Unknown, _) | (_, Tribool::Unknown) => Tribool::Unknown,
            (Tribool::True, Tribool::True) => Tribool::True,
            _ => Tribool::False,
        }
    }

    #[inline]
    pub const fn known(self) -> Option<bool> {
        match self {
            Tribool::False => Some(false),
            Tribool::True => Some(true),
            Tribool::Unknown => None,
        }
    }

    #[inline]
    pub const fn is_false(self) -> bool {
        matches!(self, Tribool::False)
    }
}

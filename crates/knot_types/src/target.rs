//! Platform configuration and memory layouts.
//!
//! Word size is a property of the [`TypeTable`](crate::TypeTable) a graph
//! realizes into, never a constant baked into the resolver. Every fixed
//! layout (pointers, slices, interfaces, machine integers) is derived from
//! the table's [`Target`].

use crate::Kind;

/// Width of a machine word.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointerWidth {
    /// 4-byte words.
    W32,
    /// 8-byte words.
    W64,
}

impl PointerWidth {
    /// The word width of the machine this crate was compiled for.
    pub const fn host() -> Self {
        if cfg!(target_pointer_width = "32") {
            PointerWidth::W32
        } else {
            PointerWidth::W64
        }
    }

    /// Word size in bytes.
    #[inline]
    pub const fn bytes(self) -> u64 {
        match self {
            PointerWidth::W32 => 4,
            PointerWidth::W64 => 8,
        }
    }
}

/// Layout parameters for one realization target.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Target {
    pub pointer_width: PointerWidth,
}

impl Target {
    /// The host machine.
    pub const fn host() -> Self {
        Self::with_pointer_width(PointerWidth::host())
    }

    pub const fn with_pointer_width(pointer_width: PointerWidth) -> Self {
        Target { pointer_width }
    }

    /// Word size in bytes.
    #[inline]
    pub const fn word(self) -> u64 {
        self.pointer_width.bytes()
    }

    /// Largest object the target can address.
    #[inline]
    pub const fn max_size(self) -> u64 {
        match self.pointer_width {
            PointerWidth::W32 => (1 << 32) - 1,
            PointerWidth::W64 => u64::MAX,
        }
    }

    /// Layout of `words` machine words, the first `pointers` of which may
    /// hold pointers.
    pub fn words(self, words: u64, pointers: u64) -> Layout {
        let word = self.word();
        Layout::scalar(words * word, word).with_ptr_data(pointers * word)
    }

    /// Layout of a basic kind, or `None` for composite kinds.
    pub fn primitive_layout(self, kind: Kind) -> Option<Layout> {
        let word = self.word();
        let layout = match kind {
            Kind::Bool | Kind::Int8 | Kind::Uint8 => Layout::scalar(1, 1),
            Kind::Int16 | Kind::Uint16 => Layout::scalar(2, 2),
            Kind::Int32 | Kind::Uint32 | Kind::Float32 => Layout::scalar(4, 4),
            Kind::Int64 | Kind::Uint64 | Kind::Float64 => Layout::scalar(8, word.min(8)),
            Kind::Complex64 => Layout::scalar(8, 4),
            Kind::Complex128 => Layout::scalar(16, word.min(8)),
            Kind::Int | Kind::Uint | Kind::Uintptr => Layout::scalar(word, word),
            Kind::String => self.words(2, 1),
            Kind::UnsafePointer => self.words(1, 1),
            _ => return None,
        };
        Some(layout)
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::host()
    }
}

/// Memory layout of a type.
///
/// `ptr_data` is the length of the prefix of the object that can contain
/// pointers; a garbage collector never needs to scan past it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Layout {
    pub size: u64,
    pub align: u8,
    pub field_align: u8,
    pub ptr_data: u64,
}

impl Layout {
    /// Zero-sized layout with byte alignment.
    pub const EMPTY: Layout = Layout {
        size: 0,
        align: 1,
        field_align: 1,
        ptr_data: 0,
    };

    /// Pointer-free layout whose field alignment equals its alignment.
    ///
    /// # Panics
    /// Panics if `align` does not fit in a byte.
    pub fn scalar(size: u64, align: u64) -> Self {
        let align = u8::try_from(align)
            .unwrap_or_else(|_| panic!("alignment {align} does not fit in a byte"));
        Layout {
            size,
            align,
            field_align: align,
            ptr_data: 0,
        }
    }

    #[must_use]
    pub const fn with_ptr_data(mut self, ptr_data: u64) -> Self {
        self.ptr_data = ptr_data;
        self
    }

    /// The (size, alignment, field alignment) triple.
    pub const fn triple(self) -> (u64, u8, u8) {
        (self.size, self.align, self.field_align)
    }
}

#[cfg(test)]
mod tests;

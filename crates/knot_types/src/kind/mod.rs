//! Type kind discriminant.
//!
//! Every node and every finished type reports one `Kind`. The set is closed:
//! basic kinds occupy 0-17 and are realized up front by the
//! [`TypeTable`](crate::TypeTable); composite kinds occupy 32-39 and are
//! described by a [`Shape`](crate::Shape).

use std::fmt;

/// Kind of a type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Kind {
    // === Basic (0-17) ===
    Bool = 0,
    Int = 1,
    Int8 = 2,
    Int16 = 3,
    Int32 = 4,
    Int64 = 5,
    Uint = 6,
    Uint8 = 7,
    Uint16 = 8,
    Uint32 = 9,
    Uint64 = 10,
    Uintptr = 11,
    Float32 = 12,
    Float64 = 13,
    Complex64 = 14,
    Complex128 = 15,
    String = 16,
    UnsafePointer = 17,

    // === Composite (32-39) ===
    Array = 32,
    Chan = 33,
    Func = 34,
    Interface = 35,
    Map = 36,
    Ptr = 37,
    Slice = 38,
    Struct = 39,
}

impl Kind {
    /// All basic kinds, in discriminant order.
    pub const BASIC: [Kind; 18] = [
        Kind::Bool,
        Kind::Int,
        Kind::Int8,
        Kind::Int16,
        Kind::Int32,
        Kind::Int64,
        Kind::Uint,
        Kind::Uint8,
        Kind::Uint16,
        Kind::Uint32,
        Kind::Uint64,
        Kind::Uintptr,
        Kind::Float32,
        Kind::Float64,
        Kind::Complex64,
        Kind::Complex128,
        Kind::String,
        Kind::UnsafePointer,
    ];

    #[inline]
    pub const fn is_basic(self) -> bool {
        (self as u8) < 32
    }

    /// Whether a type of this kind may be used as a method receiver's
    /// underlying type.
    #[inline]
    pub const fn accepts_methods(self) -> bool {
        !matches!(self, Self::Ptr | Self::Interface)
    }

    /// Size of this kind does not depend on its children.
    #[inline]
    pub const fn is_indirect(self) -> bool {
        matches!(
            self,
            Self::Chan | Self::Func | Self::Interface | Self::Map | Self::Ptr | Self::Slice
        )
    }

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint => "uint",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Uintptr => "uintptr",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Complex64 => "complex64",
            Self::Complex128 => "complex128",
            Self::String => "string",
            Self::UnsafePointer => "unsafe.Pointer",
            Self::Array => "array",
            Self::Chan => "chan",
            Self::Func => "func",
            Self::Interface => "interface",
            Self::Map => "map",
            Self::Ptr => "ptr",
            Self::Slice => "slice",
            Self::Struct => "struct",
        }
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Kind::{}", self.name())
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Direction of a channel.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ChanDir {
    /// `<-chan T`
    Recv = 1,
    /// `chan<- T`
    Send = 2,
    /// `chan T`
    Both = 3,
}

impl ChanDir {
    /// Rendering prefix, including the trailing space.
    #[inline]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Recv => "<-chan ",
            Self::Send => "chan<- ",
            Self::Both => "chan ",
        }
    }
}

const _: () = assert!(std::mem::size_of::<Kind>() == 1);

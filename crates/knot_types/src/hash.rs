//! Stable structural hashes.
//!
//! Hashes are FNV-1 over a byte encoding of the shape, mixed with the hashes
//! of the children. They depend only on structure and child hashes, never on
//! table ids or allocation order, so independently built equal shapes hash
//! equally.

use crate::{Kind, Method, Shape};

/// FNV-1 offset basis.
pub const FNV_OFFSET: u32 = 2_166_136_261;

const FNV_PRIME: u32 = 16_777_619;

/// Mix `bytes` into `x`.
#[inline]
pub fn fnv1(mut x: u32, bytes: &[u8]) -> u32 {
    for &b in bytes {
        x = x.wrapping_mul(FNV_PRIME) ^ u32::from(b);
    }
    x
}

/// Mix a 32-bit value into `x`, big-endian.
#[inline]
pub fn fnv4(x: u32, y: u32) -> u32 {
    fnv1(x, &y.to_be_bytes())
}

/// Hash of a basic type.
pub fn basic_hash(kind: Kind) -> u32 {
    fnv1(FNV_OFFSET, kind.name().as_bytes())
}

/// Hash of a named type. Named types are distinct per declaration, so the
/// declaring session and slot take part.
pub fn named_hash(display: &str, session: u32, slot: u32) -> u32 {
    fnv4(fnv4(fnv1(FNV_OFFSET, display.as_bytes()), session), slot)
}

/// Hash of a composite whose children have been replaced by their hashes.
///
/// For interfaces, `methods` must be the complete (flattened) method set;
/// embedded entries are ignored since their methods are already included.
pub fn shape_hash(shape: &Shape<u32>) -> u32 {
    match shape {
        Shape::Array { elem, len } => {
            let mut h = fnv1(*elem, b"[");
            let mut n = *len;
            while n > 0 {
                h = fnv1(h, &[n.to_le_bytes()[0]]);
                n >>= 8;
            }
            fnv1(h, b"]")
        }
        Shape::Chan { elem, dir } => fnv1(*elem, &[b'c', *dir as u8]),
        Shape::Func {
            params,
            results,
            variadic,
        } => {
            let mut h = 0;
            for param in params.iter() {
                h = fnv4(h, *param);
            }
            if *variadic {
                h = fnv1(h, b"v");
            }
            h = fnv1(h, b".");
            for result in results.iter() {
                h = fnv4(h, *result);
            }
            h
        }
        Shape::Interface { methods, .. } => {
            let mut sorted: Vec<&Method<u32>> = methods.iter().collect();
            sorted.sort_by(|a, b| (&a.scope, &a.name).cmp(&(&b.scope, &b.name)));
            let mut h = fnv1(FNV_OFFSET, b"interface {");
            for method in sorted {
                h = fnv1(h, method.scope.as_bytes());
                h = fnv1(h, method.name.as_bytes());
                h = fnv4(h, method.ty);
            }
            fnv1(h, b"}")
        }
        Shape::Map { key, elem } => fnv4(fnv1(*elem, b"m"), *key),
        Shape::Ptr(elem) => fnv1(*elem, b"*"),
        Shape::Slice(elem) => fnv1(*elem, b"["),
        Shape::Struct(fields) => {
            let mut h = fnv1(0, b"struct {");
            for field in fields.iter() {
                h = fnv1(h, field.name.as_bytes());
                h = fnv4(h, field.ty);
                h = fnv1(h, field.tag.as_bytes());
                if field.embedded {
                    h = fnv1(h, b"*");
                }
            }
            fnv1(h, b"}")
        }
    }
}

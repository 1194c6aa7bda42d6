//! Array sizing and struct packing.
//!
//! Both return `None` when the result would not fit in the target's address
//! space.

use crate::{Layout, Target};

/// Round `offset` up to a multiple of `align`, a power of two.
#[inline]
pub fn align_up(offset: u64, align: u64) -> Option<u64> {
    debug_assert!(align.is_power_of_two());
    Some(offset.checked_add(align - 1)? & !(align - 1))
}

/// Layout of `[len]elem`.
pub fn array(target: Target, elem: Layout, len: u64) -> Option<Layout> {
    let size = elem
        .size
        .checked_mul(len)
        .filter(|size| *size <= target.max_size())?;
    let ptr_data = if len == 0 || elem.ptr_data == 0 {
        0
    } else {
        (len - 1) * elem.size + elem.ptr_data
    };
    Some(Layout {
        size,
        align: elem.align,
        field_align: elem.field_align,
        ptr_data,
    })
}

/// Packed struct layout and the offset of every field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructLayout {
    pub layout: Layout,
    pub offsets: Vec<u64>,
}

/// Lay out fields in declaration order.
///
/// Each field is placed at the next multiple of its alignment. A non-empty
/// struct whose last field is zero-sized gets one byte of trailing padding,
/// so a pointer to that field never points at the next object. The total is
/// rounded up to the struct's alignment, the largest field alignment.
pub fn structure(target: Target, fields: impl IntoIterator<Item = Layout>) -> Option<StructLayout> {
    let mut offset: u64 = 0;
    let mut align: u8 = 1;
    let mut ptr_data = 0;
    let mut last_zero = false;
    let mut offsets = Vec::new();

    for field in fields {
        let field_align = field.align.max(1);
        offset = align_up(offset, u64::from(field_align))?;
        if field.ptr_data > 0 {
            ptr_data = offset + field.ptr_data;
        }
        offsets.push(offset);
        offset = offset.checked_add(field.size)?;
        align = align.max(field_align);
        last_zero = field.size == 0;
    }

    if offset > 0 && last_zero {
        offset = offset.checked_add(1)?;
    }
    let size = align_up(offset, u64::from(align)).filter(|size| *size <= target.max_size())?;

    Some(StructLayout {
        layout: Layout {
            size,
            align,
            field_align: align,
            ptr_data,
        },
        offsets,
    })
}

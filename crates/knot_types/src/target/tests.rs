use super::*;
use pretty_assertions::assert_eq;

#[test]
fn word_sizes() {
    assert_eq!(PointerWidth::W32.bytes(), 4);
    assert_eq!(PointerWidth::W64.bytes(), 8);
    assert_eq!(Target::with_pointer_width(PointerWidth::W32).max_size(), u64::from(u32::MAX));
}

#[test]
fn primitive_layouts_follow_word_size() {
    let t32 = Target::with_pointer_width(PointerWidth::W32);
    let t64 = Target::with_pointer_width(PointerWidth::W64);

    assert_eq!(t32.primitive_layout(Kind::Int).map(Layout::triple), Some((4, 4, 4)));
    assert_eq!(t64.primitive_layout(Kind::Int).map(Layout::triple), Some((8, 8, 8)));
    assert_eq!(t32.primitive_layout(Kind::Int64).map(Layout::triple), Some((8, 4, 4)));
    assert_eq!(t64.primitive_layout(Kind::Complex128).map(Layout::triple), Some((16, 8, 8)));
    assert_eq!(t64.primitive_layout(Kind::Bool).map(Layout::triple), Some((1, 1, 1)));
}

#[test]
fn string_holds_one_pointer() {
    let t64 = Target::with_pointer_width(PointerWidth::W64);
    let layout = t64.primitive_layout(Kind::String);
    assert_eq!(layout.map(|l| (l.size, l.ptr_data)), Some((16, 8)));
}

#[test]
fn composite_kinds_have_no_primitive_layout() {
    let target = Target::host();
    for kind in [Kind::Array, Kind::Struct, Kind::Ptr, Kind::Map] {
        assert_eq!(target.primitive_layout(kind), None);
    }
}

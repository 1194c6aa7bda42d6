use super::*;

#[test]
fn basic_ids_match_kinds() {
    for kind in Kind::BASIC {
        let id = TypeId::basic(kind);
        assert_eq!(id.map(TypeId::raw), Some(kind as u32));
    }
    assert_eq!(TypeId::basic(Kind::Ptr), None);
    assert_eq!(TypeId::basic(Kind::String), Some(TypeId::STRING));
}

#[test]
fn basic_range() {
    assert!(TypeId::UNSAFE_POINTER.is_basic());
    assert!(!TypeId::from_raw(TypeId::BASIC_COUNT).is_basic());
}

#[test]
fn debug_names_basic_types() {
    assert_eq!(format!("{:?}", TypeId::INT), "TypeId::int");
    assert_eq!(format!("{:?}", TypeId::from_raw(40)), "TypeId(40)");
}

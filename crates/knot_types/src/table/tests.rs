use super::*;
use crate::{ChanDir, PointerWidth};
use pretty_assertions::assert_eq;

fn table64() -> TypeTable {
    TypeTable::new(Target::with_pointer_width(PointerWidth::W64))
}

fn string_of(table: &TypeTable, id: TypeId) -> String {
    table.get(id).map(|t| t.string().to_owned()).unwrap_or_default()
}

#[test]
fn basic_types_are_preinstalled() {
    let table = table64();
    assert_eq!(table.len(), TypeId::BASIC_COUNT as usize);
    assert!(!table.is_empty());

    let int = table.get(TypeId::INT).expect("int should exist");
    assert_eq!(int.kind(), Kind::Int);
    assert_eq!(int.string(), "int");
    assert_eq!(int.size(), 8);
    assert!(int.comparable());
    assert_eq!(int.underlying(), None);

    let ptr = table.get(TypeId::UNSAFE_POINTER).expect("unsafe.Pointer should exist");
    assert_eq!(ptr.name().map(ToString::to_string), Some("unsafe.Pointer".to_owned()));
    assert_eq!(ptr.ptr_data(), 8);
}

#[test]
fn realize_canonicalizes() {
    let table = table64();
    let a = table.realize(Shape::Ptr(TypeId::INT)).expect("should realize");
    let b = table.realize(Shape::Ptr(TypeId::INT)).expect("should realize");
    assert_eq!(a, b);
    assert_eq!(table.lookup(&Shape::Ptr(TypeId::INT)), Some(a));

    let c = table.realize(Shape::Slice(TypeId::INT)).expect("should realize");
    assert_ne!(a, c);
    assert_eq!(string_of(&table, a), "*int");
    assert_eq!(string_of(&table, c), "[]int");
}

#[test]
fn realize_computes_struct_layout() {
    let table = table64();
    let id = table
        .realize(Shape::Struct(Box::new([
            Field::new("Flag", TypeId::BOOL),
            Field::new("Count", TypeId::INT32),
            Field::new("Name", TypeId::STRING),
        ])))
        .expect("should realize");
    let rtype = table.get(id).expect("struct should exist");

    assert_eq!(rtype.kind(), Kind::Struct);
    assert_eq!(rtype.offsets(), &[0, 4, 8]);
    assert_eq!(rtype.layout().triple(), (24, 8, 8));
    assert_eq!(rtype.ptr_data(), 16);
    assert!(rtype.comparable());
    assert_eq!(rtype.string(), "struct { Flag bool; Count int32; Name string }");
    assert_eq!(rtype.fields().len(), 3);
}

#[test]
fn realize_rejects_bad_shapes() {
    let table = table64();
    let slice = table.realize(Shape::Slice(TypeId::INT)).expect("should realize");

    assert_eq!(
        table.realize(Shape::Map {
            key: slice,
            elem: TypeId::INT
        }),
        Err(Error::Construction(ConstructionError::IncomparableKey("[]int".to_owned())))
    );
    assert_eq!(
        table.realize(Shape::Func {
            params: Box::new([TypeId::INT]),
            results: Box::new([]),
            variadic: true,
        }),
        Err(Error::Construction(ConstructionError::BadVariadic))
    );
    assert_eq!(
        table.realize(Shape::Struct(Box::new([
            Field::new("A", TypeId::INT),
            Field::new("A", TypeId::BOOL),
        ]))),
        Err(Error::Construction(ConstructionError::DuplicateField("A".to_owned())))
    );
    assert_eq!(
        table.realize(Shape::Ptr(TypeId::from_raw(999))),
        Err(Error::Structural(StructuralError::UnknownType(999)))
    );
}

#[test]
fn array_too_large_for_target() {
    let table = TypeTable::new(Target::with_pointer_width(PointerWidth::W32));
    let result = table.realize(Shape::Array {
        elem: TypeId::INT64,
        len: 1 << 30,
    });
    assert_eq!(
        result,
        Err(Error::Construction(ConstructionError::ArrayTooLarge {
            elem: "int64".to_owned(),
            len: 1 << 30,
        }))
    );
}

#[test]
fn embedded_struct_field_takes_type_name() {
    let table = table64();
    let id = table
        .realize(Shape::Struct(Box::new([Field::embedded(TypeId::STRING)])))
        .expect("should realize");
    let rtype = table.get(id).expect("struct should exist");
    assert_eq!(rtype.fields()[0].name, "string");
    assert_eq!(rtype.string(), "struct { string }");
}

#[test]
fn channel_and_func_strings() {
    let table = table64();
    let recv = table
        .realize(Shape::Chan {
            elem: TypeId::INT,
            dir: ChanDir::Recv,
        })
        .expect("should realize");
    let chan = table
        .realize(Shape::Chan {
            elem: recv,
            dir: ChanDir::Both,
        })
        .expect("should realize");
    assert_eq!(string_of(&table, chan), "chan (<-chan int)");

    let strings = table.realize(Shape::Slice(TypeId::STRING)).expect("should realize");
    let func = table
        .realize(Shape::Func {
            params: Box::new([TypeId::INT, strings]),
            results: Box::new([TypeId::BOOL]),
            variadic: true,
        })
        .expect("should realize");
    assert_eq!(string_of(&table, func), "func(int, ...string) bool");
    assert!(!table.get(func).expect("func should exist").comparable());
}

#[test]
fn interface_method_set_is_sorted() {
    let table = table64();
    let sig = table
        .realize(Shape::Func {
            params: Box::new([]),
            results: Box::new([TypeId::INT]),
            variadic: false,
        })
        .expect("should realize");
    let id = table
        .realize(Shape::Interface {
            embedded: Box::new([]),
            methods: Box::new([Method::new("Len", sig), Method::new("Cap", sig)]),
        })
        .expect("should realize");
    let names: Vec<String> = table.methods(id).into_iter().map(|m| m.name).collect();
    assert_eq!(names, vec!["Cap".to_owned(), "Len".to_owned()]);
    assert_eq!(string_of(&table, id), "interface{ Cap() int; Len() int }");

    let same = table
        .realize(Shape::Interface {
            embedded: Box::new([]),
            methods: Box::new([Method::new("Cap", sig), Method::new("Len", sig)]),
        })
        .expect("should realize");
    assert_eq!(id, same);
}

#[test]
fn unnamed_embedded_interface_is_rejected() {
    let table = table64();
    let empty = table
        .realize(Shape::Interface {
            embedded: Box::new([]),
            methods: Box::new([]),
        })
        .expect("should realize");
    assert_eq!(
        table.realize(Shape::Interface {
            embedded: Box::new([empty]),
            methods: Box::new([]),
        }),
        Err(Error::Construction(ConstructionError::UnnamedEmbedded("interface{}".to_owned())))
    );
}

#[test]
fn reserve_then_install() {
    let table = table64();
    let ids = table.reserve(2);
    assert_eq!(ids.len(), 2);
    assert!(table.get(ids[0]).is_none());

    let int = table.get(TypeId::INT).expect("int should exist");
    table.install(
        ids[0],
        RType::named(
            QualifiedName::new("Celsius", "weather"),
            7,
            TypeId::INT,
            &int,
            vec![],
        ),
    );
    let named = table.get(ids[0]).expect("installed type should exist");
    assert_eq!(named.string(), "weather.Celsius");
    assert_eq!(named.kind(), Kind::Int);
    assert_eq!(named.underlying(), Some(TypeId::INT));
    assert_eq!(named.hash(), 7);
}

#[test]
#[should_panic(expected = "already holds")]
fn install_twice_panics() {
    let table = table64();
    let ids = table.reserve(1);
    let int = table.get(TypeId::INT).expect("int should exist");
    let make = || RType::named(QualifiedName::new("T", ""), 1, TypeId::INT, &int, vec![]);
    table.install(ids[0], make());
    table.install(ids[0], make());
}

#[test]
fn method_impls_are_set_once() {
    let table = table64();
    let ids = table.reserve(1);
    let int = table.get(TypeId::INT).expect("int should exist");
    let sig = table
        .realize(Shape::Func {
            params: Box::new([]),
            results: Box::new([]),
            variadic: false,
        })
        .expect("should realize");
    table.install(
        ids[0],
        RType::named(
            QualifiedName::new("Counter", ""),
            1,
            TypeId::INT,
            &int,
            vec![Method::new("Reset", sig), Method::new("Add", sig)],
        ),
    );

    let rtype = table.get(ids[0]).expect("installed type should exist");
    assert_eq!(rtype.methods()[0].method().name, "Add");
    assert!(table.method_impl(ids[0], 0).is_none());

    assert!(rtype.methods()[0].install(MethodImpl::new("add")));
    assert!(!rtype.methods()[0].install(MethodImpl::new("again")));

    let imp = table.method_impl(ids[0], 0).expect("implementation should be set");
    assert_eq!(imp.downcast_ref::<&str>(), Some(&"add"));
    assert_eq!(table.methods(ids[0]).len(), 2);
}

#[test]
fn concurrent_realize_yields_one_id() {
    let table = SharedTypeTable::with_target(Target::host());
    let ids: Vec<TypeId> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let table = table.clone();
                scope.spawn(move || {
                    let slice = table.realize(Shape::Slice(TypeId::UINT8)).expect("should realize");
                    table
                        .realize(Shape::Map {
                            key: TypeId::STRING,
                            elem: slice,
                        })
                        .expect("should realize")
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread should not panic"))
            .collect()
    });
    assert!(ids.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(table.len(), TypeId::BASIC_COUNT as usize + 2);
}

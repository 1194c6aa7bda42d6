use super::*;
use crate::PointerWidth;
use pretty_assertions::assert_eq;

fn show(shape: &Shape<&'static str>) -> String {
    shape.render(|child| (*child).to_owned())
}

#[test]
fn render_simple_composites() {
    assert_eq!(show(&Shape::Ptr("int")), "*int");
    assert_eq!(show(&Shape::Slice("byte")), "[]byte");
    assert_eq!(show(&Shape::Array { elem: "int", len: 3 }), "[3]int");
    assert_eq!(
        show(&Shape::Map {
            key: "string",
            elem: "[]int"
        }),
        "map[string][]int"
    );
}

#[test]
fn render_channels() {
    let chan = |elem, dir| show(&Shape::Chan { elem, dir });
    assert_eq!(chan("int", ChanDir::Both), "chan int");
    assert_eq!(chan("int", ChanDir::Recv), "<-chan int");
    assert_eq!(chan("int", ChanDir::Send), "chan<- int");
    assert_eq!(chan("<-chan int", ChanDir::Both), "chan (<-chan int)");
    assert_eq!(chan("<-chan int", ChanDir::Send), "chan<- <-chan int");
}

#[test]
fn render_functions() {
    let func = |params: &[&'static str], results: &[&'static str], variadic| {
        show(&Shape::Func {
            params: params.into(),
            results: results.into(),
            variadic,
        })
    };
    assert_eq!(func(&[], &[], false), "func()");
    assert_eq!(func(&["int"], &["bool"], false), "func(int) bool");
    assert_eq!(
        func(&["int", "[]string"], &["int", "error"], true),
        "func(int, ...string) (int, error)"
    );
}

#[test]
fn render_interfaces() {
    assert_eq!(
        show(&Shape::Interface {
            embedded: Box::new([]),
            methods: Box::new([]),
        }),
        "interface{}"
    );
    assert_eq!(
        show(&Shape::Interface {
            embedded: Box::new(["io.Reader"]),
            methods: Box::new([
                Method::new("Close", "func() error"),
                Method::new("Len", "func() int"),
            ]),
        }),
        "interface{ io.Reader; Close() error; Len() int }"
    );
}

#[test]
fn render_structs() {
    assert_eq!(show(&Shape::Struct(Box::new([]))), "struct {}");
    assert_eq!(
        show(&Shape::Struct(Box::new([
            Field::new("Value", "int"),
            Field::new("Next", "List").with_tag("json:\"next\""),
            Field::embedded("Base").with_name("Base"),
        ]))),
        r#"struct { Value int; Next List "json:\"next\""; Base }"#
    );
}

#[test]
fn fixed_layouts() {
    let target = Target::with_pointer_width(PointerWidth::W64);
    let size = |shape: Shape<&'static str>| shape.fixed_layout(target).map(|l| l.size);

    assert_eq!(size(Shape::Ptr("T")), Some(8));
    assert_eq!(size(Shape::Slice("T")), Some(24));
    assert_eq!(size(Shape::Map { key: "K", elem: "V" }), Some(8));
    assert_eq!(
        size(Shape::Interface {
            embedded: Box::new([]),
            methods: Box::new([]),
        }),
        Some(16)
    );
    assert_eq!(size(Shape::Array { elem: "T", len: 1 }), None);
    assert_eq!(size(Shape::Struct(Box::new([]))), None);
}

#[test]
fn fixed_comparability() {
    assert_eq!(Shape::Ptr("T").fixed_comparable(), Some(true));
    assert_eq!(Shape::Slice("T").fixed_comparable(), Some(false));
    assert_eq!(Shape::Map { key: "K", elem: "V" }.fixed_comparable(), Some(false));
    assert_eq!(Shape::Array { elem: "T", len: 2 }.fixed_comparable(), None);
}

#[test]
fn children_in_declaration_order() {
    let shape = Shape::Func {
        params: Box::new([1, 2]),
        results: Box::new([3]),
        variadic: false,
    };
    assert_eq!(shape.children().as_slice(), &[1, 2, 3]);

    let shape = Shape::Interface {
        embedded: Box::new([7]),
        methods: Box::new([Method::new("M", 8)]),
    };
    assert_eq!(shape.children().as_slice(), &[7, 8]);
}

#[test]
fn map_preserves_structure() {
    let shape = Shape::Struct(Box::new([
        Field::new("A", 1_u32).with_tag("t"),
        Field::new("B", 2_u32),
    ]));
    let mapped = shape.map(|child| child * 10);
    assert_eq!(
        mapped,
        Shape::Struct(Box::new([
            Field::new("A", 10_u32).with_tag("t"),
            Field::new("B", 20_u32),
        ]))
    );
}

#[test]
fn try_map_stops_at_first_error() {
    let shape = Shape::Map { key: 1, elem: 2 };
    let mut seen = Vec::new();
    let result = shape.try_map(|child| {
        seen.push(*child);
        if *child == 1 {
            Err("bad key")
        } else {
            Ok(*child)
        }
    });
    assert_eq!(result, Err("bad key"));
    assert_eq!(seen, vec![1]);
}

#[test]
fn merge_sorts_and_deduplicates() {
    let a = [Method::new("Read", 1), Method::new("Close", 2)];
    let b = [Method::new("Close", 2), Method::new("Write", 3).with_scope("io")];
    let merged = Method::merge([&a[..], &b[..]]).expect("should merge");
    let names: Vec<_> = merged.iter().map(|m| (m.scope.as_str(), m.name.as_str())).collect();
    assert_eq!(names, vec![("", "Close"), ("", "Read"), ("io", "Write")]);
}

#[test]
fn merge_rejects_conflicting_signatures() {
    let a = [Method::new("Close", 1)];
    let b = [Method::new("Close", 2)];
    assert_eq!(
        Method::merge([&a[..], &b[..]]),
        Err(ConstructionError::DuplicateMethod("Close".to_owned()))
    );
}

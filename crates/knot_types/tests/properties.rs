//! Property tests for size resolution, canonicalization, and struct packing.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use knot_types::{
    ChanDir, Field, Layout, PointerWidth, SharedTypeTable, Shape, Target, Ty, TypeGraph, TypeId,
};
use proptest::prelude::*;

const BASICS: [TypeId; 10] = [
    TypeId::BOOL,
    TypeId::INT8,
    TypeId::INT16,
    TypeId::INT32,
    TypeId::INT64,
    TypeId::FLOAT32,
    TypeId::COMPLEX128,
    TypeId::STRING,
    TypeId::UNSAFE_POINTER,
    TypeId::INT,
];

fn basic() -> impl Strategy<Value = TypeId> {
    prop::sample::select(BASICS.to_vec())
}

fn width() -> impl Strategy<Value = PointerWidth> {
    prop_oneof![Just(PointerWidth::W32), Just(PointerWidth::W64)]
}

/// One step of wrapping: the composite built around the previous type.
#[derive(Clone, Debug)]
enum Wrap {
    Array(i64),
    Chan(ChanDir),
    Map,
    Ptr,
    Slice,
    Func,
}

fn wrap() -> impl Strategy<Value = Wrap> {
    prop_oneof![
        (0i64..4).prop_map(Wrap::Array),
        prop::sample::select(vec![ChanDir::Recv, ChanDir::Send, ChanDir::Both]).prop_map(Wrap::Chan),
        Just(Wrap::Map),
        Just(Wrap::Ptr),
        Just(Wrap::Slice),
        Just(Wrap::Func),
    ]
}

fn apply(graph: &mut TypeGraph, wrap: &Wrap, inner: Ty) -> Ty {
    match wrap {
        Wrap::Array(len) => graph.array(inner, *len),
        Wrap::Chan(dir) => graph.chan(inner, *dir),
        Wrap::Map => {
            let key = graph.of(TypeId::STRING).unwrap();
            graph.map(key, inner)
        }
        Wrap::Ptr => graph.ptr(inner),
        Wrap::Slice => graph.slice(inner),
        Wrap::Func => graph.func(&[inner], &[inner], false),
    }
    .unwrap()
}

fn session(width: PointerWidth) -> TypeGraph {
    TypeGraph::new(SharedTypeTable::with_target(Target::with_pointer_width(width)))
}

proptest! {
    #[test]
    fn resolve_size_is_idempotent(
        width in width(),
        fields in prop::collection::vec(basic(), 0..6),
        wraps in prop::collection::vec(wrap(), 0..4),
    ) {
        let mut graph = session(width);
        let t = graph.named("T", "main").unwrap();
        let mut body: Vec<Field<Ty>> = fields
            .iter()
            .enumerate()
            .map(|(i, id)| Field::new(format!("F{i}"), graph.of(*id).unwrap()))
            .collect();
        let mut link = t;
        for step in &wraps {
            link = apply(&mut graph, step, link);
        }
        let link = graph.ptr(link).unwrap();
        body.push(Field::new("Link", link));
        let body = graph.struct_of(body).unwrap();
        graph.bind(t, body).unwrap();

        let first = graph.resolve_size(t).unwrap();
        let second = graph.resolve_size(t).unwrap();
        prop_assert!(first.is_some());
        prop_assert_eq!(first.map(Layout::triple), second.map(Layout::triple));
        prop_assert_eq!(graph.layout(t), first);

        let finished = graph.complete_plain(&[t]).unwrap();
        let rtype = graph.table().get(finished[0]).unwrap();
        prop_assert_eq!(Some(rtype.layout()), first);
    }

    #[test]
    fn equal_shapes_are_shared(
        wraps in prop::collection::vec(wrap(), 1..4),
        elem in basic(),
    ) {
        let mut graph = session(PointerWidth::W64);
        let t = graph.named("T", "main").unwrap();
        let build = |graph: &mut TypeGraph, inner: Ty| {
            wraps.iter().fold(inner, |ty, step| apply(graph, step, ty))
        };

        let a = build(&mut graph, t);
        let b = build(&mut graph, t);
        prop_assert_eq!(a, b);
        prop_assert_eq!(graph.finished(a), None);

        let leaf = graph.of(elem).unwrap();
        let c = build(&mut graph, leaf);
        let d = build(&mut graph, leaf);
        prop_assert_eq!(c, d);
        prop_assert!(graph.finished(c).is_some());
    }

    #[test]
    fn struct_packing_invariants(
        width in width(),
        fields in prop::collection::vec(basic(), 0..8),
    ) {
        let table = SharedTypeTable::with_target(Target::with_pointer_width(width));
        let shape = Shape::Struct(
            fields
                .iter()
                .enumerate()
                .map(|(i, id)| Field::new(format!("F{i}"), *id))
                .collect(),
        );
        let id = table.realize(shape).unwrap();
        let rtype = table.get(id).unwrap();
        let align = u64::from(rtype.align());
        prop_assert_eq!(rtype.size() % align, 0);

        let mut end = 0;
        for (field, offset) in rtype.fields().iter().zip(rtype.offsets()) {
            let field = table.get(field.ty).unwrap();
            prop_assert_eq!(offset % u64::from(field.align()), 0);
            prop_assert!(*offset >= end);
            prop_assert!(field.align() <= rtype.align());
            end = offset + field.size();
        }
        prop_assert!(rtype.size() >= end);
        prop_assert!(rtype.ptr_data() <= rtype.size());
    }
}

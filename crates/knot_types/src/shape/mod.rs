//! Composite shape descriptors.
//!
//! A [`Shape`] is the structural definition of one composite type. It is
//! generic over the handle used for its children: graph nodes
//! ([`Ty`](crate::Ty)) while a type is incomplete, finished ids
//! ([`TypeId`](crate::TypeId)) once it is realized, and child hashes while
//! hashing. Every per-kind operation (kind, children, fixed layout,
//! comparability, rendering) is a single `match` over the closed variant set.

use std::convert::Infallible;

use smallvec::SmallVec;

use crate::{ChanDir, ConstructionError, Kind, Layout, Target};

pub(crate) mod validate;

/// One struct field.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Field<T> {
    pub name: String,
    /// Declaring scope; empty for exported fields.
    pub scope: String,
    pub ty: T,
    pub tag: String,
    pub embedded: bool,
}

impl<T> Field<T> {
    pub fn new(name: impl Into<String>, ty: T) -> Self {
        Field {
            name: name.into(),
            scope: String::new(),
            ty,
            tag: String::new(),
            embedded: false,
        }
    }

    /// An embedded field. Its name is taken from its named type when the
    /// struct is built.
    pub fn embedded(ty: T) -> Self {
        Field {
            embedded: true,
            ..Field::new("", ty)
        }
    }

    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// A method: name, declaring scope, and function type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Method<T> {
    pub name: String,
    pub scope: String,
    pub ty: T,
}

impl<T> Method<T> {
    pub fn new(name: impl Into<String>, ty: T) -> Self {
        Method {
            name: name.into(),
            scope: String::new(),
            ty,
        }
    }

    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn map<U>(&self, f: impl FnOnce(&T) -> U) -> Method<U> {
        Method {
            name: self.name.clone(),
            scope: self.scope.clone(),
            ty: f(&self.ty),
        }
    }
}

impl<T: Clone + Eq> Method<T> {
    /// Union of several method sets, sorted by (scope, name).
    ///
    /// A method reachable through more than one set is kept once if every
    /// occurrence has the same type, and is an error otherwise.
    pub fn merge<'a>(
        sets: impl IntoIterator<Item = &'a [Method<T>]>,
    ) -> Result<Vec<Method<T>>, ConstructionError>
    where
        T: 'a,
    {
        let mut all: Vec<Method<T>> = sets.into_iter().flatten().cloned().collect();
        all.sort_by(|a, b| (&a.scope, &a.name).cmp(&(&b.scope, &b.name)));

        let mut merged: Vec<Method<T>> = Vec::with_capacity(all.len());
        for method in all {
            match merged.last() {
                Some(prev) if prev.scope == method.scope && prev.name == method.name => {
                    if prev.ty != method.ty {
                        return Err(ConstructionError::DuplicateMethod(method.name));
                    }
                }
                _ => merged.push(method),
            }
        }
        Ok(merged)
    }
}

/// Structure of a composite type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Shape<T> {
    Array {
        elem: T,
        len: u64,
    },
    Chan {
        elem: T,
        dir: ChanDir,
    },
    Func {
        params: Box<[T]>,
        results: Box<[T]>,
        variadic: bool,
    },
    Interface {
        /// Named interface types whose methods are included.
        embedded: Box<[T]>,
        /// Declared methods, sorted by name.
        methods: Box<[Method<T>]>,
    },
    Map {
        key: T,
        elem: T,
    },
    Ptr(T),
    Slice(T),
    Struct(Box<[Field<T>]>),
}

impl<T> Shape<T> {
    pub fn kind(&self) -> Kind {
        match self {
            Shape::Array { .. } => Kind::Array,
            Shape::Chan { .. } => Kind::Chan,
            Shape::Func { .. } => Kind::Func,
            Shape::Interface { .. } => Kind::Interface,
            Shape::Map { .. } => Kind::Map,
            Shape::Ptr(_) => Kind::Ptr,
            Shape::Slice(_) => Kind::Slice,
            Shape::Struct(_) => Kind::Struct,
        }
    }

    /// Element type of arrays, channels, maps, pointers, and slices.
    pub fn elem(&self) -> Option<&T> {
        match self {
            Shape::Array { elem, .. }
            | Shape::Chan { elem, .. }
            | Shape::Map { elem, .. }
            | Shape::Ptr(elem)
            | Shape::Slice(elem) => Some(elem),
            Shape::Func { .. } | Shape::Interface { .. } | Shape::Struct(_) => None,
        }
    }

    /// Layout of kinds whose size does not depend on their children.
    pub fn fixed_layout(&self, target: Target) -> Option<Layout> {
        match self {
            Shape::Chan { .. } | Shape::Func { .. } | Shape::Map { .. } | Shape::Ptr(_) => {
                Some(target.words(1, 1))
            }
            Shape::Slice(_) => Some(target.words(3, 1)),
            Shape::Interface { .. } => Some(target.words(2, 2)),
            Shape::Array { .. } | Shape::Struct(_) => None,
        }
    }

    /// Comparability of kinds for which it does not depend on children.
    pub fn fixed_comparable(&self) -> Option<bool> {
        match self {
            Shape::Chan { .. } | Shape::Interface { .. } | Shape::Ptr(_) => Some(true),
            Shape::Func { .. } | Shape::Map { .. } | Shape::Slice(_) => Some(false),
            Shape::Array { .. } | Shape::Struct(_) => None,
        }
    }

    /// Convert every child handle, stopping at the first error.
    pub fn try_map<U, E>(&self, mut f: impl FnMut(&T) -> Result<U, E>) -> Result<Shape<U>, E> {
        let mut all = |items: &[T]| items.iter().map(&mut f).collect::<Result<Box<[U]>, E>>();
        Ok(match self {
            Shape::Array { elem, len } => Shape::Array {
                elem: f(elem)?,
                len: *len,
            },
            Shape::Chan { elem, dir } => Shape::Chan {
                elem: f(elem)?,
                dir: *dir,
            },
            Shape::Func {
                params,
                results,
                variadic,
            } => Shape::Func {
                params: all(params)?,
                results: all(results)?,
                variadic: *variadic,
            },
            Shape::Interface { embedded, methods } => {
                let embedded = all(embedded)?;
                let methods = methods
                    .iter()
                    .map(|m| -> Result<Method<U>, E> {
                        Ok(Method {
                            name: m.name.clone(),
                            scope: m.scope.clone(),
                            ty: f(&m.ty)?,
                        })
                    })
                    .collect::<Result<_, E>>()?;
                Shape::Interface { embedded, methods }
            }
            Shape::Map { key, elem } => Shape::Map {
                key: f(key)?,
                elem: f(elem)?,
            },
            Shape::Ptr(elem) => Shape::Ptr(f(elem)?),
            Shape::Slice(elem) => Shape::Slice(f(elem)?),
            Shape::Struct(fields) => Shape::Struct(
                fields
                    .iter()
                    .map(|field| -> Result<Field<U>, E> {
                        Ok(Field {
                            name: field.name.clone(),
                            scope: field.scope.clone(),
                            ty: f(&field.ty)?,
                            tag: field.tag.clone(),
                            embedded: field.embedded,
                        })
                    })
                    .collect::<Result<_, E>>()?,
            ),
        })
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Shape<U> {
        match self.try_map(|child| Ok::<U, Infallible>(f(child))) {
            Ok(shape) => shape,
            Err(never) => match never {},
        }
    }

    /// Display string, given the display strings of the children.
    pub fn render(&self, mut child: impl FnMut(&T) -> String) -> String {
        match self {
            Shape::Array { elem, len } => format!("[{len}]{}", child(elem)),
            Shape::Chan { elem, dir } => {
                let elem = child(elem);
                if *dir == ChanDir::Both && elem.starts_with("<-") {
                    format!("chan ({elem})")
                } else {
                    format!("{}{elem}", dir.prefix())
                }
            }
            Shape::Func {
                params,
                results,
                variadic,
            } => render_signature("func", params, results, *variadic, child),
            Shape::Interface { embedded, methods } => {
                let mut items: Vec<String> = embedded.iter().map(&mut child).collect();
                for method in methods.iter() {
                    let sig = child(&method.ty);
                    let sig = sig.strip_prefix("func").unwrap_or(&sig);
                    items.push(format!("{}{sig}", method.name));
                }
                if items.is_empty() {
                    "interface{}".to_owned()
                } else {
                    format!("interface{{ {} }}", items.join("; "))
                }
            }
            Shape::Map { key, elem } => format!("map[{}]{}", child(key), child(elem)),
            Shape::Ptr(elem) => format!("*{}", child(elem)),
            Shape::Slice(elem) => format!("[]{}", child(elem)),
            Shape::Struct(fields) => {
                if fields.is_empty() {
                    return "struct {}".to_owned();
                }
                let fields: Vec<String> = fields
                    .iter()
                    .map(|field| {
                        let ty = child(&field.ty);
                        let mut out = if field.embedded {
                            ty
                        } else {
                            format!("{} {ty}", field.name)
                        };
                        if !field.tag.is_empty() {
                            out.push_str(&format!(" {:?}", field.tag));
                        }
                        out
                    })
                    .collect();
                format!("struct {{ {} }}", fields.join("; "))
            }
        }
    }
}

impl<T: Copy> Shape<T> {
    /// Every child handle, in declaration order.
    pub fn children(&self) -> SmallVec<[T; 4]> {
        match self {
            Shape::Array { elem, .. }
            | Shape::Chan { elem, .. }
            | Shape::Ptr(elem)
            | Shape::Slice(elem) => smallvec::smallvec![*elem],
            Shape::Map { key, elem } => smallvec::smallvec![*key, *elem],
            Shape::Func {
                params, results, ..
            } => params.iter().chain(results.iter()).copied().collect(),
            Shape::Interface { embedded, methods } => embedded
                .iter()
                .copied()
                .chain(methods.iter().map(|m| m.ty))
                .collect(),
            Shape::Struct(fields) => fields.iter().map(|f| f.ty).collect(),
        }
    }
}

fn render_signature<T>(
    keyword: &str,
    params: &[T],
    results: &[T],
    variadic: bool,
    mut child: impl FnMut(&T) -> String,
) -> String {
    let mut out = format!("{keyword}(");
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let param = child(param);
        if variadic && i + 1 == params.len() {
            out.push_str("...");
            out.push_str(param.strip_prefix("[]").unwrap_or(&param));
        } else {
            out.push_str(&param);
        }
    }
    out.push(')');
    match results {
        [] => {}
        [single] => {
            out.push(' ');
            out.push_str(&child(single));
        }
        _ => {
            let results: Vec<String> = results.iter().map(child).collect();
            out.push_str(" (");
            out.push_str(&results.join(", "));
            out.push(')');
        }
    }
    out
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "Test code uses expect for clarity")]
mod tests;

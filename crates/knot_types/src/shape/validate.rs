//! Constructor argument checks shared by graph nodes and finished types.

use rustc_hash::FxHashSet;

use crate::name::is_valid_ident;
use crate::{ConstructionError, Field, Kind, Method, Shape, Tribool};

/// What validation needs to know about a child handle.
///
/// Implemented by the graph for incomplete nodes, where most answers may
/// still be unknown, and by the table for finished types.
pub(crate) trait Inspect<T> {
    /// Kind, if already known.
    fn kind(&self, ty: &T) -> Option<Kind>;

    fn is_named(&self, ty: &T) -> bool;

    /// Name an embedded field of this type takes: the unqualified name of a
    /// named type, or of the named type an unnamed pointer points to.
    fn embedded_name(&self, ty: &T) -> Option<String>;

    fn comparable(&self, ty: &T) -> Tribool;

    fn display(&self, ty: &T) -> String;
}

/// Check a shape and normalize it: embedded fields get their implied names
/// and interface methods are sorted by name.
pub(crate) fn validate<T, I>(shape: Shape<T>, inspect: &I) -> Result<Shape<T>, ConstructionError>
where
    I: Inspect<T> + ?Sized,
{
    match shape {
        Shape::Map { key, elem } => {
            if inspect.comparable(&key).is_false() {
                return Err(ConstructionError::IncomparableKey(inspect.display(&key)));
            }
            Ok(Shape::Map { key, elem })
        }
        Shape::Func {
            params,
            results,
            variadic,
        } => {
            if variadic {
                let last_is_slice = params.last().is_some_and(|last| {
                    inspect.kind(last) == Some(Kind::Slice) && !inspect.is_named(last)
                });
                if !last_is_slice {
                    return Err(ConstructionError::BadVariadic);
                }
            }
            Ok(Shape::Func {
                params,
                results,
                variadic,
            })
        }
        Shape::Interface { embedded, methods } => {
            for ty in embedded.iter() {
                if !inspect.is_named(ty) {
                    return Err(ConstructionError::UnnamedEmbedded(inspect.display(ty)));
                }
                if inspect.kind(ty).is_some_and(|kind| kind != Kind::Interface) {
                    return Err(ConstructionError::EmbeddedNotInterface(inspect.display(ty)));
                }
            }
            let methods = sorted_methods(methods.into_vec(), inspect)?;
            Ok(Shape::Interface {
                embedded,
                methods: methods.into_boxed_slice(),
            })
        }
        Shape::Struct(fields) => {
            let fields = named_fields(fields.into_vec(), inspect)?;
            Ok(Shape::Struct(fields.into_boxed_slice()))
        }
        shape @ (Shape::Array { .. } | Shape::Chan { .. } | Shape::Ptr(_) | Shape::Slice(_)) => {
            Ok(shape)
        }
    }
}

/// Check one method declaration.
pub(crate) fn check_method<T, I>(method: &Method<T>, inspect: &I) -> Result<(), ConstructionError>
where
    I: Inspect<T> + ?Sized,
{
    if !is_valid_ident(&method.name) {
        return Err(ConstructionError::InvalidMethodName(method.name.clone()));
    }
    if inspect
        .kind(&method.ty)
        .is_some_and(|kind| kind != Kind::Func)
    {
        return Err(ConstructionError::MethodNotFunc {
            name: method.name.clone(),
            ty: inspect.display(&method.ty),
        });
    }
    Ok(())
}

fn sorted_methods<T, I>(
    mut methods: Vec<Method<T>>,
    inspect: &I,
) -> Result<Vec<Method<T>>, ConstructionError>
where
    I: Inspect<T> + ?Sized,
{
    let mut seen = FxHashSet::default();
    for method in &methods {
        check_method(method, inspect)?;
        if !seen.insert(method.name.as_str()) {
            return Err(ConstructionError::DuplicateMethod(method.name.clone()));
        }
    }
    methods.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(methods)
}

fn named_fields<T, I>(
    mut fields: Vec<Field<T>>,
    inspect: &I,
) -> Result<Vec<Field<T>>, ConstructionError>
where
    I: Inspect<T> + ?Sized,
{
    let mut seen: FxHashSet<String> = FxHashSet::default();
    for (index, field) in fields.iter_mut().enumerate() {
        if field.name.is_empty() && field.embedded {
            if let Some(name) = inspect.embedded_name(&field.ty) {
                field.name = name;
            }
        }
        if field.name.is_empty() {
            return Err(ConstructionError::EmptyFieldName { index });
        }
        if !is_valid_ident(&field.name) {
            return Err(ConstructionError::InvalidFieldName(field.name.clone()));
        }
        if !seen.insert(field.name.clone()) {
            return Err(ConstructionError::DuplicateField(field.name.clone()));
        }
    }
    Ok(fields)
}

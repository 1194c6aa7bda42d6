//! Errors reported by graph construction, binding, and completion.
//!
//! Each enum is one class of failure:
//! - [`ConstructionError`]: a constructor was given bad input. Nothing was
//!   created; the caller can retry with different arguments.
//! - [`StructuralError`]: the graph was misused (double bind, illegal
//!   recursion). The session should be abandoned.
//! - [`CompletionError`]: a batch could not be completed. No type in the
//!   batch was finalized.
//!
//! Inconsistencies found after completion validation are bugs in this crate
//! and panic instead.

/// Invalid arguments to a constructor.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConstructionError {
    #[error("type name must not be empty")]
    EmptyName,

    #[error("invalid type name `{0}`")]
    InvalidName(String),

    #[error("array length must not be negative, got {0}")]
    NegativeLength(i64),

    /// `len * elem.size` does not fit in the target's address space.
    #[error("array type `[{len}]{elem}` is too large")]
    ArrayTooLarge { elem: String, len: u64 },

    #[error("struct type `{0}` is too large")]
    StructTooLarge(String),

    #[error("struct field {index} has no name")]
    EmptyFieldName { index: usize },

    #[error("invalid struct field name `{0}`")]
    InvalidFieldName(String),

    #[error("duplicate struct field `{0}`")]
    DuplicateField(String),

    #[error("invalid map key type `{0}`")]
    IncomparableKey(String),

    #[error("last parameter of a variadic function must be an unnamed slice")]
    BadVariadic,

    #[error("embedded interface type must be named, got `{0}`")]
    UnnamedEmbedded(String),

    #[error("embedded type `{0}` is not an interface")]
    EmbeddedNotInterface(String),

    #[error("invalid method name `{0}`")]
    InvalidMethodName(String),

    #[error("method `{name}` must have a function type, got `{ty}`")]
    MethodNotFunc { name: String, ty: String },

    /// Two methods of one interface share a name but not a signature.
    #[error("duplicate method `{0}`")]
    DuplicateMethod(String),
}

/// Misuse of a graph session.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StructuralError {
    #[error("type handle belongs to a different graph")]
    ForeignType,

    #[error("type id {0} is not in the table")]
    UnknownType(u32),

    #[error("`{0}` is not a named type")]
    NotNamed(String),

    #[error("`{0}` already has an underlying type")]
    AlreadyDefined(String),

    #[error("`{0}` is already complete")]
    AlreadyRealized(String),

    /// A named type is defined, through other named types only, as itself.
    #[error("invalid type loop: `{0}` is defined in terms of itself")]
    InvalidLoop(String),

    /// Computing the size of a type requires its own size.
    #[error("invalid recursive type `{0}`")]
    InvalidRecursion(String),

    #[error("method `{name}` redeclared on `{ty}`")]
    MethodRedeclared { ty: String, name: String },

    #[error("method `{name}` of `{ty}` declared in scope `{found}`, expected `{expected}`")]
    ScopeMismatch {
        ty: String,
        name: String,
        expected: String,
        found: String,
    },
}

/// A batch of roots that cannot be completed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    #[error("type {index} depends on a named type with no underlying type: `{name}`")]
    Undefined { index: usize, name: String },

    #[error("type {index} uses invalid map key type `{key}`")]
    IncomparableKey { index: usize, key: String },

    /// Methods were added to a named type that is not one of the roots.
    #[error("`{name}` has methods but is not in the list of types to complete")]
    UnlistedReceiver { name: String },

    #[error("type {index} (`{name}`) cannot have methods: its underlying type is a pointer or interface")]
    InvalidReceiver { index: usize, name: String },

    #[error("`{name}` has methods but no method factory was supplied")]
    MissingMethodFactory { name: String },
}

/// Any error this crate reports.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error(transparent)]
    Completion(#[from] CompletionError),
}

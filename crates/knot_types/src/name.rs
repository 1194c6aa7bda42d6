//! Identifiers and qualified names.

use std::fmt;

/// Whether `s` is a valid identifier: a letter or `_`, followed by letters,
/// digits, and `_`.
pub fn is_valid_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}

/// Name of a declared type: the identifier and the scope (package path) that
/// declares it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub name: String,
    pub scope: String,
}

impl QualifiedName {
    pub fn new(name: impl Into<String>, scope: impl Into<String>) -> Self {
        QualifiedName {
            name: name.into(),
            scope: scope.into(),
        }
    }

    /// Last segment of the scope path, used as the display qualifier.
    pub fn qualifier(&self) -> &str {
        self.scope.rsplit('/').next().unwrap_or_default()
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let qualifier = self.qualifier();
        if qualifier.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{qualifier}.{}", self.name)
        }
    }
}

//! Representation and interning utilities for identifiers that appear
//! within a source. Identifiers are interned into a global map and are
//! referred to by a unique index thereafter, which makes comparing two
//! identifiers as cheap as comparing two integers.

use std::fmt;

use dashmap::DashMap;
use fnv::FnvBuildHasher;
use lazy_static::lazy_static;
use sable_utils::counter;

counter! {
    name: Identifier,
    counter_name: IDENTIFIER_COUNTER,
    visibility: pub,
    method_visibility:,
    derives: (Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd),
}

impl Identifier {
    /// Resolve the identifier to the string it was interned from.
    pub fn value(self) -> &'static str {
        IDENTIFIER_MAP.get_ident(self)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(out, "{}", self.value())
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(out, "{:?}", self.value())
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        IDENTIFIER_MAP.create_ident(name)
    }
}

impl From<String> for Identifier {
    fn from(name: String) -> Self {
        IDENTIFIER_MAP.create_ident(&name)
    }
}

impl From<Identifier> for &str {
    fn from(ident: Identifier) -> Self {
        ident.value()
    }
}

impl From<Identifier> for String {
    fn from(ident: Identifier) -> Self {
        ident.value().to_owned()
    }
}

/// Identifiers that the compiler reserves a meaning for, interned ahead of
/// time so that they can be compared against without repeated lookups.
pub struct CoreIdentifiers {
    pub adhoc: Identifier,
    pub all: Identifier,
    pub cpp: Identifier,
    pub export: Identifier,
    pub r#extern: Identifier,
    pub foreign: Identifier,
    pub inline: Identifier,
    pub llvm: Identifier,
    pub underscore: Identifier,
}

impl CoreIdentifiers {
    fn from_ident_map(map: &IdentifierMap) -> Self {
        Self {
            adhoc: map.create_ident("adhoc"),
            all: map.create_ident("all"),
            cpp: map.create_ident("cpp"),
            export: map.create_ident("export"),
            r#extern: map.create_ident("extern"),
            foreign: map.create_ident("foreign"),
            inline: map.create_ident("inline"),
            llvm: map.create_ident("llvm"),
            underscore: map.create_ident("_"),
        }
    }
}

lazy_static! {
    pub static ref IDENTIFIER_MAP: IdentifierMap = IdentifierMap::new();
    pub static ref IDENTS: CoreIdentifiers = CoreIdentifiers::from_ident_map(&IDENTIFIER_MAP);
}

/// A map that stores the interned identifiers of the current compiler
/// session in both directions.
#[derive(Debug, Default)]
pub struct IdentifierMap {
    /// Maps the string variant of an identifier to its id.
    reverse_identifiers: DashMap<&'static str, Identifier, FnvBuildHasher>,
    /// Maps the id of an identifier to its string variant.
    identifiers: DashMap<Identifier, &'static str, FnvBuildHasher>,
}

impl IdentifierMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern the given name, returning the existing id if the name has
    /// been interned before.
    pub fn create_ident(&self, name: &str) -> Identifier {
        if let Some(ident) = self.reverse_identifiers.get(name) {
            return *ident;
        }

        // The identifier table lives for the whole session, so the backing
        // string is simply leaked to get a stable address.
        let value: &'static str = Box::leak(name.to_owned().into_boxed_str());
        let ident = Identifier::new();

        self.reverse_identifiers.insert(value, ident);
        self.identifiers.insert(ident, value);
        ident
    }

    /// Resolve an id that was previously created by
    /// [`IdentifierMap::create_ident`].
    pub fn get_ident(&self, ident: Identifier) -> &'static str {
        self.identifiers.get(&ident).map(|entry| *entry).unwrap()
    }
}

#[cfg(test)]
mod test_super {
    use super::*;

    #[test]
    fn test_interning_is_idempotent() {
        let first = Identifier::from("vec_push");
        let second = Identifier::from("vec_push");

        assert_eq!(first, second);
        assert_eq!(first.value(), "vec_push");
    }

    #[test]
    fn test_core_identifiers_are_pre_interned() {
        assert_eq!(IDENTS.r#extern, Identifier::from("extern"));
        assert_eq!(IDENTS.all.value(), "all");
    }
}

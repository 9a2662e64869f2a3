//! Interning for string constants that appear within a source, for example
//! the symbol names carried by foreign binding attributes. Interned strings
//! follow the same scheme as identifiers, a global map hands out stable
//! indices for the lifetime of the session.

use std::fmt;

use dashmap::DashMap;
use fnv::FnvBuildHasher;
use lazy_static::lazy_static;
use sable_utils::counter;

counter! {
    name: InternedStr,
    counter_name: STR_LIT_COUNTER,
    visibility: pub,
    method_visibility:,
}

impl InternedStr {
    /// Resolve the interned string to its contents.
    pub fn value(self) -> &'static str {
        CONSTANT_MAP.lookup_string(self)
    }
}

impl fmt::Display for InternedStr {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(out, "{}", self.value())
    }
}

impl fmt::Debug for InternedStr {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(out, "{:?}", self.value())
    }
}

impl From<&str> for InternedStr {
    fn from(value: &str) -> Self {
        CONSTANT_MAP.create_string(value)
    }
}

impl From<String> for InternedStr {
    fn from(value: String) -> Self {
        CONSTANT_MAP.create_string(&value)
    }
}

impl From<InternedStr> for &str {
    fn from(value: InternedStr) -> Self {
        value.value()
    }
}

impl From<InternedStr> for String {
    fn from(value: InternedStr) -> Self {
        value.value().to_owned()
    }
}

/// A map that stores the string constants of the current compiler session
/// in both directions.
#[derive(Debug, Default)]
pub struct ConstantMap {
    /// Maps the contents of a string to its interned id.
    reverse_string_table: DashMap<&'static str, InternedStr, FnvBuildHasher>,
    /// Maps the id of an interned string to its contents.
    string_table: DashMap<InternedStr, &'static str, FnvBuildHasher>,
}

impl ConstantMap {
    /// Intern the given string, returning the existing id if the contents
    /// have been interned before.
    pub fn create_string(&self, value: &str) -> InternedStr {
        if let Some(id) = self.reverse_string_table.get(value) {
            return *id;
        }

        let value_copy: &'static str = Box::leak(value.to_owned().into_boxed_str());
        let id = InternedStr::new();

        self.reverse_string_table.insert(value_copy, id);
        self.string_table.insert(id, value_copy);
        id
    }

    /// Resolve an id that was previously created by
    /// [`ConstantMap::create_string`].
    pub fn lookup_string(&self, id: InternedStr) -> &'static str {
        self.string_table.get(&id).map(|entry| *entry).unwrap()
    }
}

lazy_static! {
    pub static ref CONSTANT_MAP: ConstantMap = ConstantMap::default();
}

#[cfg(test)]
mod test_super {
    use super::*;

    #[test]
    fn test_string_interning_is_idempotent() {
        let first = InternedStr::from("lean_nat_add");
        let second = InternedStr::from(String::from("lean_nat_add"));

        assert_eq!(first, second);
        assert_eq!(first.value(), "lean_nat_add");
    }

    #[test]
    fn test_empty_string_interning() {
        let empty = InternedStr::from("");
        assert_eq!(empty.value(), "");
    }
}

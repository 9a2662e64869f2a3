//! The object model for attribute payloads. An attribute stores its parsed
//! arguments as a small tree of constructor tagged values, which gives
//! every payload a uniform shape that can be hashed, printed and written
//! into a module file without knowing which attribute produced it.
//!
//! Objects are immutable once built and are shared by reference counting,
//! so cloning an [`ObjectRef`] never copies the underlying tree.

pub mod alloc;

use std::{
    fmt,
    hash::{Hash, Hasher},
    rc::Rc,
};

use sable_source::constant::InternedStr;
use thin_vec::ThinVec;

/// A single payload object. The representation is kept private so that
/// every object is built through [`ObjectRef`] constructors, which keeps
/// the allocation accounting in [`alloc`] exact.
pub struct Object {
    kind: ObjectKind,
}

#[derive(PartialEq, Eq)]
enum ObjectKind {
    /// A natural number.
    Nat(u64),
    /// An interned string.
    Str(InternedStr),
    /// A constructor application, a tag plus the constructor fields.
    Ctor { tag: u32, fields: ThinVec<ObjectRef> },
}

impl Object {
    fn new(kind: ObjectKind) -> Self {
        alloc::note_alloc();
        Self { kind }
    }
}

impl Drop for Object {
    fn drop(&mut self) {
        alloc::note_dealloc();
    }
}

/// A shared reference to an [`Object`].
#[derive(Clone)]
pub struct ObjectRef(Rc<Object>);

/// A borrowed view of an object, used to match on the shape of a payload
/// without exposing the underlying representation.
#[derive(Debug, Clone, Copy)]
pub enum ObjectView<'o> {
    Nat(u64),
    Str(InternedStr),
    Ctor { tag: u32, fields: &'o [ObjectRef] },
}

impl ObjectRef {
    fn alloc(kind: ObjectKind) -> Self {
        Self(Rc::new(Object::new(kind)))
    }

    /// Create a natural number object.
    pub fn nat(value: u64) -> Self {
        Self::alloc(ObjectKind::Nat(value))
    }

    /// Create a string object.
    pub fn string(value: impl Into<InternedStr>) -> Self {
        Self::alloc(ObjectKind::Str(value.into()))
    }

    /// Create a constructor object with the given tag and fields.
    pub fn ctor(tag: u32, fields: impl IntoIterator<Item = ObjectRef>) -> Self {
        Self::alloc(ObjectKind::Ctor { tag, fields: fields.into_iter().collect() })
    }

    /// The unit object, a nullary constructor with tag `0`. An empty list
    /// and a missing optional value share this representation, the
    /// surrounding schema decides how it is read.
    pub fn unit() -> Self {
        Self::ctor(0, [])
    }

    /// The empty list object, see [`ObjectRef::unit`].
    pub fn nil() -> Self {
        Self::unit()
    }

    /// A cons cell holding the given head and tail.
    pub fn cons(head: ObjectRef, tail: ObjectRef) -> Self {
        Self::ctor(1, [head, tail])
    }

    /// Build a cons list out of the given items.
    pub fn list(items: impl IntoIterator<Item = ObjectRef>) -> Self {
        let items: Vec<_> = items.into_iter().collect();

        items.into_iter().rev().fold(Self::nil(), |tail, head| Self::cons(head, tail))
    }

    /// A missing optional value, see [`ObjectRef::unit`].
    pub fn none() -> Self {
        Self::unit()
    }

    /// A present optional value.
    pub fn some(value: ObjectRef) -> Self {
        Self::ctor(1, [value])
    }

    /// View the object for matching on its shape.
    pub fn view(&self) -> ObjectView<'_> {
        match &self.0.kind {
            ObjectKind::Nat(value) => ObjectView::Nat(*value),
            ObjectKind::Str(value) => ObjectView::Str(*value),
            ObjectKind::Ctor { tag, fields } => ObjectView::Ctor { tag: *tag, fields },
        }
    }

    pub fn as_nat(&self) -> Option<u64> {
        match self.view() {
            ObjectView::Nat(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<InternedStr> {
        match self.view() {
            ObjectView::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn ctor_tag(&self) -> Option<u32> {
        match self.view() {
            ObjectView::Ctor { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn fields(&self) -> Option<&[ObjectRef]> {
        match self.view() {
            ObjectView::Ctor { fields, .. } => Some(fields),
            _ => None,
        }
    }

    /// Whether this object is the unit object.
    pub fn is_unit(&self) -> bool {
        matches!(self.view(), ObjectView::Ctor { tag: 0, fields } if fields.is_empty())
    }

    /// Read the object as an optional value. Returns [`None`] when the
    /// object is not shaped like an option.
    pub fn as_option(&self) -> Option<Option<ObjectRef>> {
        match self.view() {
            ObjectView::Ctor { tag: 0, fields } if fields.is_empty() => Some(None),
            ObjectView::Ctor { tag: 1, fields } if fields.len() == 1 => {
                Some(Some(fields[0].clone()))
            }
            _ => None,
        }
    }

    /// Collect the items of a cons list. Returns [`None`] when the object
    /// is not shaped like a list.
    pub fn list_items(&self) -> Option<Vec<ObjectRef>> {
        let mut items = vec![];
        let mut current = self.clone();

        loop {
            let tail = match current.view() {
                ObjectView::Ctor { tag: 0, fields } if fields.is_empty() => return Some(items),
                ObjectView::Ctor { tag: 1, fields } if fields.len() == 2 => {
                    items.push(fields[0].clone());
                    fields[1].clone()
                }
                _ => return None,
            };

            current = tail;
        }
    }

    /// Whether two references point at the same allocation.
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        // Shared subtrees compare without being walked.
        self.ptr_eq(other) || self.0.kind == other.0.kind
    }
}

impl Eq for ObjectRef {}

impl Hash for ObjectRef {
    /// Objects hash by structure, interned strings contribute their
    /// contents rather than their intern ids so that equal payloads hash
    /// identically across sessions.
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.view() {
            ObjectView::Nat(value) => {
                state.write_u8(1);
                state.write_u64(value);
            }
            ObjectView::Str(value) => {
                state.write_u8(2);
                let contents = value.value();
                state.write_usize(contents.len());
                state.write(contents.as_bytes());
            }
            ObjectView::Ctor { tag, fields } => {
                state.write_u8(3);
                state.write_u32(tag);
                state.write_usize(fields.len());

                for field in fields {
                    field.hash(state);
                }
            }
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.view() {
            ObjectView::Nat(value) => write!(out, "{value}"),
            ObjectView::Str(value) => write!(out, "{value:?}"),
            ObjectView::Ctor { tag, fields } => {
                write!(out, "#{tag}")?;

                if !fields.is_empty() {
                    write!(out, "(")?;

                    for (index, field) in fields.iter().enumerate() {
                        if index > 0 {
                            write!(out, ", ")?;
                        }

                        write!(out, "{field}")?;
                    }

                    write!(out, ")")?;
                }

                Ok(())
            }
        }
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(out, "{self}")
    }
}

#[cfg(test)]
mod test_super {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_object_accessors() {
        let nat = ObjectRef::nat(7);
        let string = ObjectRef::string("vec_push");
        let ctor = ObjectRef::ctor(2, [nat.clone(), string.clone()]);

        assert_eq!(nat.as_nat(), Some(7));
        assert_eq!(string.as_str(), Some("vec_push".into()));
        assert_eq!(ctor.ctor_tag(), Some(2));
        assert_eq!(ctor.fields().map(<[ObjectRef]>::len), Some(2));
        assert_eq!(ctor.as_nat(), None);
    }

    #[test]
    fn test_structural_equality() {
        let left = ObjectRef::ctor(1, [ObjectRef::nat(2), ObjectRef::string("a")]);
        let right = ObjectRef::ctor(1, [ObjectRef::nat(2), ObjectRef::string("a")]);

        assert_eq!(left, right);
        assert!(!left.ptr_eq(&right));
        assert!(left.ptr_eq(&left.clone()));

        assert_ne!(left, ObjectRef::ctor(2, [ObjectRef::nat(2), ObjectRef::string("a")]));
    }

    #[test]
    fn test_unit_and_nil_share_a_shape() {
        assert_eq!(ObjectRef::unit(), ObjectRef::nil());
        assert!(ObjectRef::none().is_unit());
        assert_eq!(ObjectRef::nil().list_items(), Some(vec![]));
    }

    #[test]
    fn test_list_round_trip() {
        let items = vec![ObjectRef::nat(1), ObjectRef::nat(2), ObjectRef::nat(3)];
        let list = ObjectRef::list(items.clone());

        assert_eq!(list.list_items(), Some(items));
        assert_eq!(ObjectRef::nat(1).list_items(), None);
    }

    #[test]
    fn test_option_round_trip() {
        let some = ObjectRef::some(ObjectRef::nat(4));

        assert_eq!(some.as_option(), Some(Some(ObjectRef::nat(4))));
        assert_eq!(ObjectRef::none().as_option(), Some(None));
        assert_eq!(ObjectRef::string("a").as_option(), None);
    }

    #[test]
    fn test_display() {
        let payload = ObjectRef::ctor(0, [
            ObjectRef::some(ObjectRef::nat(2)),
            ObjectRef::list([ObjectRef::string("vec_push")]),
        ]);

        assert_eq!(payload.to_string(), "#0(#1(2), #1(\"vec_push\", #0))");
    }

    #[test]
    fn test_allocation_balance() {
        let baseline = alloc::live_objects();

        {
            let list = ObjectRef::list([ObjectRef::nat(1), ObjectRef::string("a")]);
            let _shared = list.clone();

            assert!(alloc::live_objects() > baseline);
        }

        assert_eq!(alloc::live_objects(), baseline);
    }
}

//! Adapters connect strongly typed attribute payloads to the untyped
//! [`ObjectRef`] encoding that the rest of the compiler stores, hashes and
//! serialises. The registry holds one [`AttrAdapter`] per attribute and
//! never needs to know the payload type behind it.

use std::{
    fmt,
    hash::{Hash, Hasher},
    io,
    marker::PhantomData,
};

use sable_modfile::{
    value::{read_value, write_value},
    CorruptKind, ModfileError, ModfileResult,
};
use sable_object::ObjectRef;
use sable_utils::fxhash::FxHasher;

use crate::{diagnostics::ParseResult, parser::AttrParser};

/// The typed payload of an attribute. Implementing this for a type and
/// registering it through [`TypedAttrAdapter`] gives the attribute a
/// parser, a printer, a stable hash and a module file encoding in one go.
pub trait AttrPayload: fmt::Display + Sized {
    /// The surface name of the attribute this payload belongs to.
    const NAME: &'static str;

    /// Parse the payload from an attribute argument stream.
    fn parse(gen: &AttrParser<'_>) -> ParseResult<Self>;

    /// Lower the payload into its object encoding.
    fn to_object(&self) -> ObjectRef;

    /// Rebuild the payload from its object encoding. Returns [`None`] when
    /// the object does not have the expected shape.
    fn from_object(object: &ObjectRef) -> Option<Self>;
}

/// The object safe interface that the registry stores per attribute.
pub trait AttrAdapter: Send + Sync {
    /// Parse the attribute arguments into an object payload.
    fn parse(&self, gen: &AttrParser<'_>) -> ParseResult<ObjectRef>;

    /// Print the payload in its surface syntax.
    fn print(&self, payload: &ObjectRef, out: &mut dyn fmt::Write) -> fmt::Result;

    /// Hash the payload. The result is stable across compiler sessions and
    /// feeds into the module content digest.
    fn hash(&self, payload: &ObjectRef) -> u64;

    /// Write the payload into a module stream.
    fn write(&self, payload: &ObjectRef, writer: &mut dyn io::Write) -> ModfileResult<()>;

    /// Read a payload back out of a module stream, validating its shape.
    fn read(&self, reader: &mut dyn io::Read) -> ModfileResult<ObjectRef>;
}

/// An [`AttrAdapter`] derived from an [`AttrPayload`] implementation.
pub struct TypedAttrAdapter<P> {
    _payload: PhantomData<fn() -> P>,
}

impl<P> TypedAttrAdapter<P> {
    pub fn new() -> Self {
        Self { _payload: PhantomData }
    }
}

impl<P> Default for TypedAttrAdapter<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: AttrPayload> AttrAdapter for TypedAttrAdapter<P> {
    fn parse(&self, gen: &AttrParser<'_>) -> ParseResult<ObjectRef> {
        Ok(P::parse(gen)?.to_object())
    }

    fn print(&self, payload: &ObjectRef, out: &mut dyn fmt::Write) -> fmt::Result {
        match P::from_object(payload) {
            Some(payload) => write!(out, "{payload}"),
            // A payload the schema cannot decode is printed raw.
            None => write!(out, "{payload}"),
        }
    }

    fn hash(&self, payload: &ObjectRef) -> u64 {
        let mut hasher = FxHasher::default();
        payload.hash(&mut hasher);
        hasher.finish()
    }

    fn write(&self, payload: &ObjectRef, mut writer: &mut dyn io::Write) -> ModfileResult<()> {
        write_value(&mut writer, payload)
    }

    fn read(&self, mut reader: &mut dyn io::Read) -> ModfileResult<ObjectRef> {
        let value = read_value(&mut reader)?;

        if P::from_object(&value).is_none() {
            return Err(ModfileError::Corrupt(CorruptKind::MalformedPayload(P::NAME)));
        }

        Ok(value)
    }
}

#[cfg(test)]
mod test_super {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::export::ExportAttr;

    fn adapter() -> TypedAttrAdapter<ExportAttr> {
        TypedAttrAdapter::new()
    }

    #[test]
    fn typed_adapters_round_trip_through_a_stream() {
        let payload = ExportAttr { symbol: "vec_push".into() }.to_object();

        let mut buffer = vec![];
        adapter().write(&payload, &mut buffer).unwrap();

        let read_back = adapter().read(&mut buffer.as_slice()).unwrap();
        assert_eq!(read_back, payload);
    }

    #[test]
    fn typed_adapters_reject_malformed_payloads() {
        // An `export` payload must be a string, a bare nat is not one.
        let mut buffer = vec![];
        adapter().write(&ObjectRef::nat(2), &mut buffer).unwrap();

        let error = adapter().read(&mut buffer.as_slice()).unwrap_err();
        assert!(matches!(
            error,
            ModfileError::Corrupt(CorruptKind::MalformedPayload("export"))
        ));
    }

    #[test]
    fn typed_adapters_hash_is_structural() {
        let left = ExportAttr { symbol: "vec_push".into() }.to_object();
        let right = ExportAttr { symbol: "vec_push".into() }.to_object();
        let other = ExportAttr { symbol: "vec_pop".into() }.to_object();

        assert_eq!(adapter().hash(&left), adapter().hash(&right));
        assert_ne!(adapter().hash(&left), adapter().hash(&other));
    }

    #[test]
    fn typed_adapters_print_the_surface_syntax() {
        let payload = ExportAttr { symbol: "vec_push".into() }.to_object();

        let mut printed = String::new();
        adapter().print(&payload, &mut printed).unwrap();

        assert_eq!(printed, "vec_push");
    }
}

//! The attribute registry, a write-once table mapping attribute names to
//! their adapters and validators. A registry is assembled up front through
//! an [`AttrRegistryBuilder`] and is immutable from then on, so it can be
//! shared freely across the checking and code generation stages.

use sable_object::ObjectRef;
use sable_source::{identifier::Identifier, location::Span};
use sable_token::{Token, TokenKind};
use sable_utils::{
    fxhash::FxHashMap,
    index_vec::{define_index_type, IndexVec},
};

use crate::{
    adapter::{AttrAdapter, AttrPayload, TypedAttrAdapter},
    diagnostics::{AttrError, AttrResult, ExpectedItem, ParseErrorKind},
    env::{AttrEntry, ModuleEnv},
    parser::AttrParser,
    target::AttrTarget,
};

define_index_type! {
    /// A unique identifier for a registered attribute.
    pub struct AttrId = u32;

    MAX_INDEX = u32::MAX as usize;
    DISABLE_MAX_INDEX_CHECK = cfg!(not(debug_assertions));
    DEBUG_FORMAT = "attr:{}";
}

/// A check that runs after an attribute payload has been parsed, before
/// the entry lands in the environment.
pub type AttrValidator = fn(&AttrContext<'_>) -> AttrResult<()>;

/// Everything a validator can see about the attachment it is vetting.
pub struct AttrContext<'env> {
    pub env: &'env ModuleEnv,
    /// The attribute being attached.
    pub name: Identifier,
    /// The declaration it is being attached to.
    pub decl: Identifier,
    /// The parsed payload.
    pub payload: &'env ObjectRef,
    /// Whether the declaration is persistent, that is, whether it is part
    /// of the module's public artifact.
    pub persistent: bool,
    pub origin: Span,
}

/// A single attribute registration.
pub struct AttrRegistration {
    pub name: Identifier,
    /// The kinds of declaration the attribute may be applied to.
    pub subject: AttrTarget,
    pub adapter: Box<dyn AttrAdapter>,
    pub validator: AttrValidator,
}

impl AttrRegistration {
    /// Create a registration for a typed payload, deriving the adapter
    /// and name from the payload implementation.
    pub fn new<P: AttrPayload + 'static>(subject: AttrTarget, validator: AttrValidator) -> Self {
        Self {
            name: P::NAME.into(),
            subject,
            adapter: Box::new(TypedAttrAdapter::<P>::new()),
            validator,
        }
    }
}

/// Builder for an [`AttrRegistry`].
#[derive(Default)]
pub struct AttrRegistryBuilder {
    map: IndexVec<AttrId, AttrRegistration>,
    name_map: FxHashMap<Identifier, AttrId>,
}

impl AttrRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an attribute. Registering a name twice is refused and
    /// leaves the original registration in place.
    pub fn register(&mut self, registration: AttrRegistration) -> AttrResult<AttrId> {
        let name = registration.name;

        if self.name_map.contains_key(&name) {
            return Err(AttrError::Duplicate { name });
        }

        let id = self.map.push(registration);
        self.name_map.insert(name, id);
        Ok(id)
    }

    pub fn build(self) -> AttrRegistry {
        AttrRegistry { map: self.map, name_map: self.name_map }
    }
}

/// The finished registry. See the module documentation.
pub struct AttrRegistry {
    map: IndexVec<AttrId, AttrRegistration>,
    name_map: FxHashMap<Identifier, AttrId>,
}

impl AttrRegistry {
    pub fn get(&self, id: AttrId) -> &AttrRegistration {
        &self.map[id]
    }

    pub fn get_id_by_name(&self, name: Identifier) -> Option<AttrId> {
        self.name_map.get(&name).copied()
    }

    pub fn get_by_name(&self, name: Identifier) -> Option<&AttrRegistration> {
        self.get_id_by_name(name).map(|id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Parse and attach a single attribute onto a declaration. The parser
    /// is expected to sit right after the attribute name, and the
    /// attribute's arguments must extend to the end of the stream or up
    /// to a separating `,`.
    ///
    /// On success the entry is recorded in the environment. A repeated
    /// attachment of the same attribute is not an error, the first entry
    /// wins and a warning is recorded instead.
    pub fn attach(
        &self,
        env: &mut ModuleEnv,
        decl: Identifier,
        name: Identifier,
        origin: Span,
        gen: &AttrParser<'_>,
        persistent: bool,
    ) -> AttrResult<()> {
        let Some(registration) = self.get_by_name(name) else {
            return Err(AttrError::UnknownAttr { name, origin });
        };

        let Some(kind) = env.decl_kind(decl) else {
            return Err(AttrError::UnknownDecl { decl, origin });
        };

        if !registration.subject.contains(kind.target()) {
            return Err(AttrError::InvalidSubject {
                name,
                origin,
                target: kind.target(),
                subject: registration.subject,
            });
        }

        let payload = registration.adapter.parse(gen)?;
        gen.expect_end()?;

        let ctx = AttrContext { env, name, decl, payload: &payload, persistent, origin };
        (registration.validator)(&ctx)?;

        env.attach_entry(decl, AttrEntry { name, payload, persistent, origin: Some(origin) });
        Ok(())
    }

    /// Parse a comma separated attribute list, as found within `@[...]`,
    /// attaching every attribute in it onto the declaration.
    pub fn attach_list(
        &self,
        env: &mut ModuleEnv,
        decl: Identifier,
        gen: &AttrParser<'_>,
        persistent: bool,
    ) -> AttrResult<()> {
        loop {
            let (name, range) = match gen.peek() {
                Some(Token { kind: TokenKind::Ident(name), span }) => {
                    let parsed = (*name, *span);
                    gen.skip_token();
                    parsed
                }
                _ => {
                    return gen
                        .unexpected(ParseErrorKind::ExpectedAttrName, ExpectedItem::Ident)
                        .map_err(AttrError::from);
                }
            };

            self.attach(env, decl, name, gen.make_span(range), gen, persistent)?;

            if gen.parse_token_fast(TokenKind::Comma).is_none() {
                break;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test_super {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{checks, export::ExportAttr, foreign::ExternAttr};

    #[test]
    fn registration_is_write_once() {
        let mut builder = AttrRegistryBuilder::new();

        let id = builder
            .register(AttrRegistration::new::<ExternAttr>(AttrTarget::Fn, checks::accept))
            .unwrap();

        let error = builder
            .register(AttrRegistration::new::<ExternAttr>(AttrTarget::Item, checks::accept))
            .unwrap_err();
        assert!(matches!(error, AttrError::Duplicate { .. }));

        let registry = builder.build();

        // The original registration is untouched by the refused one.
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get_id_by_name("extern".into()), Some(id));
        assert_eq!(registry.get(id).subject, AttrTarget::Fn);
    }

    #[test]
    fn lookups_fall_through_for_unknown_names() {
        let mut builder = AttrRegistryBuilder::new();
        builder
            .register(AttrRegistration::new::<ExportAttr>(AttrTarget::Fn, checks::accept))
            .unwrap();

        let registry = builder.build();

        assert!(registry.get_by_name("export".into()).is_some());
        assert!(registry.get_by_name("inline".into()).is_none());
    }
}

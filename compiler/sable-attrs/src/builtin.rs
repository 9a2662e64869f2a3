//! Registrations for the attributes that the compiler itself defines.

use crate::{
    adapter::AttrPayload,
    checks,
    export::ExportAttr,
    foreign::ExternAttr,
    registry::{AttrRegistration, AttrRegistry, AttrRegistryBuilder, AttrValidator},
    target::AttrTarget,
};

impl AttrRegistry {
    /// Build the registry of builtin attributes. Every compiler session
    /// starts from this table, further attributes are layered on through
    /// an [`AttrRegistryBuilder`] before the registry is built.
    pub fn builtin() -> AttrRegistry {
        let mut builder = AttrRegistryBuilder::new();

        // Code generation attributes
        // ~~~~~~~~~~~~~~~~~~~~~~~~~~
        builtin_attr::<ExternAttr>(
            &mut builder,
            AttrTarget::Fn | AttrTarget::Const,
            checks::require_persistent,
        );
        builtin_attr::<ExportAttr>(
            &mut builder,
            AttrTarget::Fn | AttrTarget::Const,
            checks::require_persistent,
        );

        builder.build()
    }
}

/// Register a builtin attribute. The builtins are all declared above, so a
/// colliding name is a bug in this module rather than a user error.
fn builtin_attr<P: AttrPayload + 'static>(
    builder: &mut AttrRegistryBuilder,
    subject: AttrTarget,
    validator: AttrValidator,
) {
    if builder.register(AttrRegistration::new::<P>(subject, validator)).is_err() {
        panic!("duplicate builtin attribute name: `{}`", P::NAME);
    }
}

#[cfg(test)]
mod test_super {
    use pretty_assertions::assert_eq;
    use sable_source::identifier::IDENTS;

    use super::*;

    #[test]
    fn builtins_are_registered() {
        let registry = AttrRegistry::builtin();

        let extern_attr = registry.get_by_name(IDENTS.r#extern).unwrap();
        assert_eq!(extern_attr.subject, AttrTarget::Fn | AttrTarget::Const);

        let export_attr = registry.get_by_name(IDENTS.export).unwrap();
        assert_eq!(export_attr.name, IDENTS.export);

        assert_eq!(registry.len(), 2);
    }
}

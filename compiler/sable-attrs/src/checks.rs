//! Validators shared by the builtin attribute registrations.
use crate::{
    diagnostics::{AttrError, AttrResult},
    registry::AttrContext,
};

/// Accepts any attachment. Used by attributes whose parse is the only
/// check they need.
pub fn accept(_ctx: &AttrContext<'_>) -> AttrResult<()> {
    Ok(())
}

/// Requires the subject declaration to be persistent. Attributes whose
/// payload is recorded into the module artifact use this, since a record
/// for a local declaration could never be resolved again when the module
/// is loaded.
pub fn require_persistent(ctx: &AttrContext<'_>) -> AttrResult<()> {
    if ctx.persistent {
        return Ok(());
    }

    Err(AttrError::NonPersistent { name: ctx.name, origin: ctx.origin })
}

#[cfg(test)]
mod test_super {
    use sable_object::ObjectRef;
    use sable_source::{
        location::{ByteRange, Span},
        SourceId,
    };

    use super::*;
    use crate::env::{DeclKind, ModuleEnv};

    #[test]
    fn persistence_is_required() {
        let mut env = ModuleEnv::new();
        env.declare("vec_push".into(), DeclKind::Fn);

        let payload = ObjectRef::unit();
        let origin = Span::new(ByteRange::new(0, 6), SourceId::from_usize(0));

        let ctx = AttrContext {
            env: &env,
            name: "extern".into(),
            decl: "vec_push".into(),
            payload: &payload,
            persistent: true,
            origin,
        };
        assert!(require_persistent(&ctx).is_ok());
        assert!(accept(&ctx).is_ok());

        let local = AttrContext { persistent: false, ..ctx };
        assert!(matches!(
            require_persistent(&local),
            Err(AttrError::NonPersistent { .. })
        ));
    }
}

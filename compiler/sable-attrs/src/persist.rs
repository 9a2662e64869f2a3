//! Writing attribute records into module files and loading them back.
//! Only persistent entries are recorded. On the way back in, records for
//! attributes this compiler has no registration for are skipped rather
//! than rejected, so a module built by a newer compiler still loads.

use std::{
    hash::Hasher,
    io::{Read, Write},
};

use sable_modfile::{
    module::{ModuleHeader, ModuleReader, ModuleWriter},
    CorruptKind, ModfileError, ModfileResult,
};
use sable_source::identifier::Identifier;
use sable_utils::{fxhash::FxHasher, log};

use crate::{
    env::{AttrEntry, Attrs, DeclKind, ModuleEnv},
    registry::{AttrRegistration, AttrRegistry},
};

/// The records of a declaration that are written into a module file, the
/// persistent entries that the registry has a schema for.
fn persistent_records<'e>(
    attrs: &'e Attrs,
    registry: &'e AttrRegistry,
) -> impl Iterator<Item = (&'e AttrEntry, &'e AttrRegistration)> + 'e {
    attrs.entries().iter().filter_map(move |entry| {
        if !entry.persistent {
            return None;
        }

        registry.get_by_name(entry.name).map(|registration| (entry, registration))
    })
}

/// Compute the content digest that is folded into the module header. The
/// digest covers every record that [`write_module`] would emit, in
/// emission order, so any change to the persistent attributes of a module
/// changes its digest.
pub fn module_digest(env: &ModuleEnv, registry: &AttrRegistry) -> u64 {
    let mut hasher = FxHasher::default();

    for (name, kind, attrs) in env.decls() {
        for (entry, registration) in persistent_records(attrs, registry) {
            hasher.write(name.value().as_bytes());
            hasher.write_u8(kind.to_raw());
            hasher.write(entry.name.value().as_bytes());
            hasher.write_u64(registration.adapter.hash(&entry.payload));
        }
    }

    hasher.finish()
}

/// Write the persistent attribute records of the environment into a
/// module stream.
pub fn write_module<W: Write>(
    env: &ModuleEnv,
    registry: &AttrRegistry,
    writer: W,
) -> ModfileResult<()> {
    let mut writer = ModuleWriter::new(writer);
    writer.write_header(module_digest(env, registry))?;

    let decls: Vec<_> = env
        .decls()
        .filter(|(_, _, attrs)| persistent_records(attrs, registry).next().is_some())
        .collect();
    let decl_count = decls.len();

    writer.write_decl_count(decl_count as u32)?;

    let mut records = 0usize;
    for (name, kind, attrs) in decls {
        let count = persistent_records(attrs, registry).count();
        writer.begin_decl(name.value(), kind.to_raw(), count as u32)?;

        for (entry, registration) in persistent_records(attrs, registry) {
            writer.write_record_name(entry.name.value())?;
            registration.adapter.write(&entry.payload, writer.inner_mut())?;
            records += 1;
        }
    }

    log::debug!("wrote {records} attribute record(s) across {decl_count} declaration(s)");
    Ok(())
}

/// Load the attribute records of a module stream into a fresh
/// environment. Payloads are validated against their registered schema as
/// they are read, records for unknown attribute names are skipped.
pub fn read_module<R: Read>(
    reader: R,
    registry: &AttrRegistry,
) -> ModfileResult<(ModuleHeader, ModuleEnv)> {
    let mut reader = ModuleReader::open(reader)?;
    let mut env = ModuleEnv::new();

    let decl_count = reader.read_decl_count()?;

    for _ in 0..decl_count {
        let (decl_name, raw_kind, records) = reader.begin_decl()?;

        let Some(kind) = DeclKind::from_raw(raw_kind) else {
            return Err(ModfileError::Corrupt(CorruptKind::UnknownDeclKind(raw_kind)));
        };

        let decl = Identifier::from(decl_name);
        env.declare(decl, kind);

        for _ in 0..records {
            let attr_name = Identifier::from(reader.read_record_name()?);

            match registry.get_by_name(attr_name) {
                Some(registration) => {
                    let payload = registration.adapter.read(reader.inner_mut())?;
                    env.attach_entry(
                        decl,
                        AttrEntry { name: attr_name, payload, persistent: true, origin: None },
                    );
                }
                None => {
                    log::warn!("skipping record for unknown attribute `{attr_name}`");
                    reader.skip_record_value()?;
                }
            }
        }
    }

    Ok((reader.header(), env))
}

#[cfg(test)]
mod test_super {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{adapter::AttrPayload, foreign::ExternAttr};

    fn env_with(symbol: &str, persistent: bool) -> ModuleEnv {
        let mut env = ModuleEnv::new();
        env.declare("vec_push".into(), DeclKind::Fn);
        env.attach_entry("vec_push".into(), AttrEntry {
            name: "extern".into(),
            payload: ExternAttr::standard(symbol).to_object(),
            persistent,
            origin: None,
        });

        env
    }

    #[test]
    fn digest_is_stable_across_identical_environments() {
        let registry = AttrRegistry::builtin();

        assert_eq!(
            module_digest(&env_with("lean_vec_push", true), &registry),
            module_digest(&env_with("lean_vec_push", true), &registry),
        );
    }

    #[test]
    fn digest_tracks_payload_changes() {
        let registry = AttrRegistry::builtin();

        assert_ne!(
            module_digest(&env_with("lean_vec_push", true), &registry),
            module_digest(&env_with("lean_vec_pop", true), &registry),
        );
    }

    #[test]
    fn local_entries_do_not_reach_the_digest() {
        let registry = AttrRegistry::builtin();

        assert_eq!(
            module_digest(&env_with("lean_vec_push", false), &registry),
            module_digest(&ModuleEnv::new(), &registry),
        );
    }

    #[test]
    fn written_digest_matches_the_header() {
        let registry = AttrRegistry::builtin();
        let env = env_with("lean_vec_push", true);

        let mut buffer = vec![];
        write_module(&env, &registry, &mut buffer).unwrap();

        let (header, _) = read_module(buffer.as_slice(), &registry).unwrap();
        assert_eq!(header.digest, module_digest(&env, &registry));

        // Local entries are not part of the artifact at all.
        let mut buffer = vec![];
        write_module(&env_with("lean_vec_push", false), &registry, &mut buffer).unwrap();

        let (_, loaded) = read_module(buffer.as_slice(), &registry).unwrap();
        assert_eq!(loaded.decls().count(), 0);
    }

    #[test]
    fn unknown_decl_kinds_are_corrupt() {
        let registry = AttrRegistry::builtin();

        let mut buffer = vec![];
        write_module(&env_with("lean_vec_push", true), &registry, &mut buffer).unwrap();

        // The kind byte sits right after the header, the declaration count
        // and the length prefixed declaration name.
        let kind_at = 4 + 2 + 8 + 4 + 4 + "vec_push".len();
        buffer[kind_at] = 9;

        let error = read_module(buffer.as_slice(), &registry).unwrap_err();
        assert!(matches!(
            error,
            ModfileError::Corrupt(CorruptKind::UnknownDeclKind(9))
        ));
    }
}

//! The per-module attribute environment. Declarations are introduced into
//! a [`ModuleEnv`] as the module is checked, attributes are attached onto
//! them through [`crate::registry::AttrRegistry::attach`], and later
//! stages query the environment for the payloads they care about.

use std::fmt;

use sable_object::ObjectRef;
use sable_source::{
    identifier::{Identifier, IDENTS},
    location::Span,
};
use sable_utils::{fxhash::FxBuildHasher, indexmap::IndexMap};

use crate::{
    adapter::AttrPayload,
    diagnostics::AttrWarning,
    export::ExportAttr,
    foreign::{Backend, ExternAttr, ExternEntry},
    target::AttrTarget,
};

/// The kinds of declaration that can carry attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Fn,
    Const,
    TyDef,
}

impl DeclKind {
    /// The [`AttrTarget`] flag that a declaration of this kind matches.
    pub fn target(self) -> AttrTarget {
        match self {
            DeclKind::Fn => AttrTarget::Fn,
            DeclKind::Const => AttrTarget::Const,
            DeclKind::TyDef => AttrTarget::TyDef,
        }
    }

    /// Stable tag used in the module file encoding.
    pub(crate) fn to_raw(self) -> u8 {
        match self {
            DeclKind::Fn => 0,
            DeclKind::Const => 1,
            DeclKind::TyDef => 2,
        }
    }

    pub(crate) fn from_raw(kind: u8) -> Option<Self> {
        match kind {
            0 => Some(DeclKind::Fn),
            1 => Some(DeclKind::Const),
            2 => Some(DeclKind::TyDef),
            _ => None,
        }
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DeclKind::Fn => write!(out, "function"),
            DeclKind::Const => write!(out, "constant"),
            DeclKind::TyDef => write!(out, "type definition"),
        }
    }
}

/// One attachment of an attribute onto a declaration.
#[derive(Debug, Clone)]
pub struct AttrEntry {
    pub name: Identifier,
    /// The parsed payload in its object encoding.
    pub payload: ObjectRef,
    /// Whether the record is written into the module artifact.
    pub persistent: bool,
    /// Where the attribute was written. Absent for entries that were
    /// loaded back out of a module file.
    pub origin: Option<Span>,
}

/// The attributes attached to a single declaration, in attachment order.
#[derive(Debug, Clone, Default)]
pub struct Attrs {
    entries: Vec<AttrEntry>,
}

impl Attrs {
    pub fn entries(&self) -> &[AttrEntry] {
        &self.entries
    }

    pub fn get(&self, name: Identifier) -> Option<&AttrEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn has(&self, name: Identifier) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A declaration together with everything attached to it.
#[derive(Debug, Clone)]
struct Decl {
    kind: DeclKind,
    attrs: Attrs,
}

/// The declarations of a module and the attributes attached to them.
/// Iteration orders follow declaration order.
#[derive(Debug, Default)]
pub struct ModuleEnv {
    decls: IndexMap<Identifier, Decl, FxBuildHasher>,
    /// Warnings accumulated whilst attaching, drained by the caller once
    /// the attachment pass is over.
    warnings: Vec<AttrWarning>,
}

impl ModuleEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Introduce a declaration. Re-declaring an existing name keeps the
    /// original kind and attributes.
    pub fn declare(&mut self, name: Identifier, kind: DeclKind) {
        self.decls.entry(name).or_insert_with(|| Decl { kind, attrs: Attrs::default() });
    }

    pub fn decl_kind(&self, name: Identifier) -> Option<DeclKind> {
        self.decls.get(&name).map(|decl| decl.kind)
    }

    pub fn attrs_of(&self, name: Identifier) -> Option<&Attrs> {
        self.decls.get(&name).map(|decl| &decl.attrs)
    }

    /// Iterate over the declarations in declaration order.
    pub fn decls(&self) -> impl Iterator<Item = (Identifier, DeclKind, &Attrs)> {
        self.decls.iter().map(|(name, decl)| (*name, decl.kind, &decl.attrs))
    }

    pub fn has_attr(&self, decl: Identifier, name: Identifier) -> bool {
        self.attrs_of(decl).is_some_and(|attrs| attrs.has(name))
    }

    pub fn attr_payload(&self, decl: Identifier, name: Identifier) -> Option<&ObjectRef> {
        self.attrs_of(decl)?.get(name).map(|entry| &entry.payload)
    }

    pub fn warnings(&self) -> &[AttrWarning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<AttrWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// Attach a checked entry onto a declaration. When the declaration
    /// already carries the attribute, the first attachment wins and the
    /// new one is recorded as unused.
    pub(crate) fn attach_entry(&mut self, decl: Identifier, entry: AttrEntry) {
        let Some(decl) = self.decls.get_mut(&decl) else {
            return;
        };

        if let Some(preceding) = decl.attrs.get(entry.name) {
            self.warnings.push(AttrWarning::Unused {
                name: entry.name,
                origin: entry.origin,
                preceding: preceding.origin,
            });
            return;
        }

        decl.attrs.entries.push(entry);
    }

    /// Decode the `extern` payload of a declaration, if it carries one.
    pub fn extern_attr(&self, decl: Identifier) -> Option<ExternAttr> {
        self.attr_payload(decl, IDENTS.r#extern).and_then(ExternAttr::from_object)
    }

    /// The foreign binding that code generation for `backend` should use
    /// for the declaration.
    pub fn extern_binding(&self, decl: Identifier, backend: Backend) -> Option<ExternEntry> {
        self.extern_attr(decl).and_then(|attr| attr.entry_for(backend).cloned())
    }

    /// The arity override carried by the declaration's `extern` attribute.
    pub fn extern_arity(&self, decl: Identifier) -> Option<u32> {
        self.extern_attr(decl).and_then(|attr| attr.arity)
    }

    /// The symbol that the declaration is exported under, if any.
    pub fn export_symbol(&self, decl: Identifier) -> Option<Identifier> {
        self.attr_payload(decl, IDENTS.export)
            .and_then(ExportAttr::from_object)
            .map(|attr| attr.symbol)
    }
}

#[cfg(test)]
mod test_super {
    use pretty_assertions::assert_eq;

    use super::*;

    fn entry(name: &str, payload: ObjectRef) -> AttrEntry {
        AttrEntry { name: name.into(), payload, persistent: true, origin: None }
    }

    #[test]
    fn declarations_keep_attachment_order() {
        let mut env = ModuleEnv::new();
        env.declare("vec_push".into(), DeclKind::Fn);

        env.attach_entry("vec_push".into(), entry("extern", ObjectRef::unit()));
        env.attach_entry("vec_push".into(), entry("export", ObjectRef::string("vp")));

        let attrs = env.attrs_of("vec_push".into()).unwrap();
        let names: Vec<_> = attrs.entries().iter().map(|entry| entry.name).collect();

        assert_eq!(names, vec!["extern".into(), "export".into()]);
        assert!(env.has_attr("vec_push".into(), "extern".into()));
        assert!(!env.has_attr("vec_push".into(), "inline".into()));
    }

    #[test]
    fn repeated_attachment_keeps_the_first_entry() {
        let mut env = ModuleEnv::new();
        env.declare("vec_push".into(), DeclKind::Fn);

        env.attach_entry("vec_push".into(), entry("export", ObjectRef::string("first")));
        env.attach_entry("vec_push".into(), entry("export", ObjectRef::string("second")));

        let payload = env.attr_payload("vec_push".into(), "export".into()).unwrap();
        assert_eq!(payload.as_str(), Some("first".into()));

        assert_eq!(env.take_warnings().len(), 1);
        assert!(env.warnings().is_empty());
    }

    #[test]
    fn extern_queries_decode_the_payload() {
        let mut env = ModuleEnv::new();
        env.declare("vec_push".into(), DeclKind::Fn);

        let mut attr = ExternAttr::standard("lean_vec_push");
        attr.arity = Some(2);
        env.attach_entry("vec_push".into(), entry("extern", attr.to_object()));

        assert_eq!(env.extern_arity("vec_push".into()), Some(2));
        assert_eq!(
            env.extern_binding("vec_push".into(), "cpp".into()),
            Some(ExternEntry::Standard {
                backend: Backend::all(),
                symbol: "lean_vec_push".into()
            })
        );

        assert_eq!(env.extern_attr("missing".into()), None);
        assert_eq!(env.export_symbol("vec_push".into()), None);
    }

    #[test]
    fn export_symbol_is_decoded() {
        let mut env = ModuleEnv::new();
        env.declare("vec_push".into(), DeclKind::Fn);
        env.attach_entry("vec_push".into(), entry("export", ObjectRef::string("vp_sym")));

        assert_eq!(env.export_symbol("vec_push".into()), Some("vp_sym".into()));
    }

    #[test]
    fn decl_kind_raw_tags_round_trip() {
        for kind in [DeclKind::Fn, DeclKind::Const, DeclKind::TyDef] {
            assert_eq!(DeclKind::from_raw(kind.to_raw()), Some(kind));
        }

        assert_eq!(DeclKind::from_raw(9), None);
    }
}

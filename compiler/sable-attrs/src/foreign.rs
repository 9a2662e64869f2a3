//! The `extern` attribute. A declaration marked with `extern` is backed by
//! a foreign binding per backend rather than by compiled Sable code, and
//! the payload parsed here tells code generation which binding to use.
//!
//! The supported surface forms are:
//!
//! ```text
//! @[extern]                              ad hoc binding for every backend
//! @[extern "sym"]                        standard binding for every backend
//! @[extern 2 "sym"]                      as above, unboxed at arity 2
//! @[extern cpp "sym" llvm "sym2"]        per backend standard bindings
//! @[extern cpp inline "#1 + #2"]         pattern expanded at call sites
//! @[extern llvm foreign "sym"]           binding with a foreign ABI
//! ```

use std::fmt;

use sable_object::{ObjectRef, ObjectView};
use sable_source::{
    constant::InternedStr,
    identifier::{Identifier, IDENTS},
};
use sable_token::{Token, TokenKind};
use sable_utils::thin_vec::{thin_vec, ThinVec};

use crate::{
    adapter::AttrPayload,
    diagnostics::{ExpectedItem, ParseErrorKind, ParseResult},
    parser::AttrParser,
};

/// The backend that a binding applies to. Backends are referred to by
/// name, with [`Backend::all`] acting as the wildcard that every backend
/// matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Backend(Identifier);

impl Backend {
    pub fn new(name: Identifier) -> Self {
        Self(name)
    }

    /// The wildcard backend.
    pub fn all() -> Self {
        Self(IDENTS.all)
    }

    pub fn name(self) -> Identifier {
        self.0
    }

    pub fn is_all(self) -> bool {
        self.0 == IDENTS.all
    }
}

impl From<Identifier> for Backend {
    fn from(name: Identifier) -> Self {
        Self::new(name)
    }
}

impl From<&str> for Backend {
    fn from(name: &str) -> Self {
        Self::new(name.into())
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        write!(out, "{}", self.0)
    }
}

/// Constructor tags of the [`ExternEntry`] object encoding.
const TAG_ADHOC: u32 = 0;
const TAG_INLINE: u32 = 1;
const TAG_STANDARD: u32 = 2;
const TAG_FOREIGN: u32 = 3;

/// A single foreign binding of an `extern` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternEntry {
    /// The backend provides the implementation itself, looked up by the
    /// declaration's own name.
    AdHoc { backend: Backend },

    /// The binding is a pattern that is expanded at every call site, with
    /// `#1`, `#2`, ... standing in for the arguments.
    Inline { backend: Backend, pattern: InternedStr },

    /// The binding is a symbol that follows the standard calling
    /// convention of the backend.
    Standard { backend: Backend, symbol: InternedStr },

    /// The binding is a symbol with a foreign calling convention, which
    /// takes every argument boxed.
    Foreign { backend: Backend, symbol: InternedStr },
}

impl ExternEntry {
    pub fn backend(&self) -> Backend {
        match self {
            ExternEntry::AdHoc { backend }
            | ExternEntry::Inline { backend, .. }
            | ExternEntry::Standard { backend, .. }
            | ExternEntry::Foreign { backend, .. } => *backend,
        }
    }

    fn to_object(&self) -> ObjectRef {
        let backend = ObjectRef::string(self.backend().name().value());

        match self {
            ExternEntry::AdHoc { .. } => ObjectRef::ctor(TAG_ADHOC, [backend]),
            ExternEntry::Inline { pattern, .. } => {
                ObjectRef::ctor(TAG_INLINE, [backend, ObjectRef::string(*pattern)])
            }
            ExternEntry::Standard { symbol, .. } => {
                ObjectRef::ctor(TAG_STANDARD, [backend, ObjectRef::string(*symbol)])
            }
            ExternEntry::Foreign { symbol, .. } => {
                ObjectRef::ctor(TAG_FOREIGN, [backend, ObjectRef::string(*symbol)])
            }
        }
    }

    fn from_object(object: &ObjectRef) -> Option<Self> {
        let ObjectView::Ctor { tag, fields } = object.view() else {
            return None;
        };

        let backend = Backend::from(fields.first()?.as_str()?.value());

        match (tag, fields.len()) {
            (TAG_ADHOC, 1) => Some(ExternEntry::AdHoc { backend }),
            (TAG_INLINE, 2) => {
                Some(ExternEntry::Inline { backend, pattern: fields[1].as_str()? })
            }
            (TAG_STANDARD, 2) => {
                Some(ExternEntry::Standard { backend, symbol: fields[1].as_str()? })
            }
            (TAG_FOREIGN, 2) => {
                Some(ExternEntry::Foreign { backend, symbol: fields[1].as_str()? })
            }
            _ => None,
        }
    }
}

impl fmt::Display for ExternEntry {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExternEntry::AdHoc { backend } => write!(out, "{backend} adhoc"),
            ExternEntry::Inline { backend, pattern } => {
                write!(out, "{backend} inline {pattern:?}")
            }
            ExternEntry::Standard { backend, symbol } => write!(out, "{backend} {symbol:?}"),
            ExternEntry::Foreign { backend, symbol } => {
                write!(out, "{backend} foreign {symbol:?}")
            }
        }
    }
}

/// The payload of the `extern` attribute, an optional arity override plus
/// one binding per backend. The entries are kept in the order they were
/// written and are never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternAttr {
    /// Overrides the arity that code generation compiles the declaration
    /// at. Without it, the arity is taken from the declaration's type.
    pub arity: Option<u32>,
    pub entries: ThinVec<ExternEntry>,
}

impl ExternAttr {
    /// The payload of a bare `@[extern]`, an ad hoc binding for every
    /// backend.
    pub fn adhoc() -> Self {
        Self { arity: None, entries: thin_vec![ExternEntry::AdHoc { backend: Backend::all() }] }
    }

    /// A standard binding to `symbol` for every backend.
    pub fn standard(symbol: impl Into<InternedStr>) -> Self {
        Self {
            arity: None,
            entries: thin_vec![ExternEntry::Standard {
                backend: Backend::all(),
                symbol: symbol.into(),
            }],
        }
    }

    /// Look up the binding that serves the given backend. An exact match
    /// wins over the `all` wildcard, regardless of the order the entries
    /// were written in.
    pub fn entry_for(&self, backend: Backend) -> Option<&ExternEntry> {
        self.entries
            .iter()
            .find(|entry| entry.backend() == backend)
            .or_else(|| self.entries.iter().find(|entry| entry.backend().is_all()))
    }

    /// Parse one `backend clause` entry, with the backend name already
    /// consumed.
    fn parse_entry(gen: &AttrParser<'_>, backend: Backend) -> ParseResult<ExternEntry> {
        match gen.peek().map(|token| token.kind) {
            Some(TokenKind::Ident(name)) if name == IDENTS.adhoc => {
                gen.skip_token();
                Ok(ExternEntry::AdHoc { backend })
            }
            Some(TokenKind::Ident(name)) if name == IDENTS.inline => {
                gen.skip_token();
                let pattern = gen.parse_str_lit_in(ParseErrorKind::ExpectedPattern)?;
                Ok(ExternEntry::Inline { backend, pattern })
            }
            Some(TokenKind::Ident(name)) if name == IDENTS.foreign => {
                gen.skip_token();
                let symbol = gen.parse_str_lit_in(ParseErrorKind::ExpectedSymbol)?;
                Ok(ExternEntry::Foreign { backend, symbol })
            }
            Some(TokenKind::Str(symbol)) => {
                gen.skip_token();
                Ok(ExternEntry::Standard { backend, symbol })
            }
            _ => gen.unexpected(
                ParseErrorKind::ExpectedBinding,
                ExpectedItem::Ident | ExpectedItem::StrLit,
            ),
        }
    }
}

impl fmt::Display for ExternAttr {
    /// Prints in the surface syntax. Every entry carries its backend
    /// explicitly, so the output re-parses to the same payload even when
    /// the attribute was written in one of the abbreviated forms.
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        if let Some(arity) = self.arity {
            write!(out, "{arity} ")?;
        }

        for (index, entry) in self.entries.iter().enumerate() {
            if index > 0 {
                write!(out, " ")?;
            }

            write!(out, "{entry}")?;
        }

        Ok(())
    }
}

impl AttrPayload for ExternAttr {
    const NAME: &'static str = "extern";

    fn parse(gen: &AttrParser<'_>) -> ParseResult<Self> {
        let mut arity = None;

        if let Some(Token { kind: TokenKind::Int(_), .. }) = gen.peek() {
            let value = gen.parse_numeral()?;

            arity = match u32::try_from(value) {
                Ok(value) => Some(value),
                Err(_) => {
                    return gen.err_with_location(
                        ParseErrorKind::ArityOutOfRange,
                        ExpectedItem::empty(),
                        Some(TokenKind::Int(value)),
                        gen.current_pos(),
                    );
                }
            };
        }

        if gen.at_end() {
            return match arity {
                // A bare `@[extern]` marks the declaration ad hoc for
                // every backend.
                None => Ok(Self::adhoc()),
                // An arity with nothing to apply it to is rejected.
                Some(_) => gen.unexpected(
                    ParseErrorKind::ExpectedEntry,
                    ExpectedItem::Ident | ExpectedItem::StrLit,
                ),
            };
        }

        // A bare symbol string is a standard binding for every backend.
        if let Some(Token { kind: TokenKind::Str(_), .. }) = gen.peek() {
            let symbol = gen.parse_str_lit()?;
            let mut payload = Self::standard(symbol);
            payload.arity = arity;

            return Ok(payload);
        }

        // Otherwise, a sequence of `backend clause` entries.
        let mut entries = thin_vec![];

        loop {
            let backend = match gen.peek() {
                Some(Token { kind: TokenKind::Ident(name), .. }) => {
                    let name = *name;
                    gen.skip_token();
                    Backend::new(name)
                }
                _ if entries.is_empty() => {
                    return gen.unexpected(
                        ParseErrorKind::UnExpected,
                        ExpectedItem::Ident | ExpectedItem::StrLit,
                    );
                }
                _ => break,
            };

            entries.push(Self::parse_entry(gen, backend)?);

            // Entries are juxtaposed, the next identifier begins another
            // one.
            if !matches!(gen.peek().map(|token| token.kind), Some(TokenKind::Ident(_))) {
                break;
            }
        }

        Ok(Self { arity, entries })
    }

    fn to_object(&self) -> ObjectRef {
        let arity = match self.arity {
            Some(arity) => ObjectRef::some(ObjectRef::nat(u64::from(arity))),
            None => ObjectRef::none(),
        };
        let entries = ObjectRef::list(self.entries.iter().map(ExternEntry::to_object));

        ObjectRef::ctor(0, [arity, entries])
    }

    fn from_object(object: &ObjectRef) -> Option<Self> {
        let ObjectView::Ctor { tag: 0, fields } = object.view() else {
            return None;
        };
        let [arity, entries] = fields else {
            return None;
        };

        let arity = match arity.as_option()? {
            Some(value) => Some(u32::try_from(value.as_nat()?).ok()?),
            None => None,
        };

        let entries = entries
            .list_items()?
            .iter()
            .map(ExternEntry::from_object)
            .collect::<Option<ThinVec<_>>>()?;

        if entries.is_empty() {
            return None;
        }

        Some(Self { arity, entries })
    }
}

#[cfg(test)]
mod test_super {
    use pretty_assertions::assert_eq;
    use sable_lexer::Lexer;
    use sable_source::{location::SpannedSource, SourceId};

    use super::*;
    use crate::diagnostics::ParseError;

    fn parse_extern(source: &str) -> Result<ExternAttr, ParseError> {
        let mut lexer = Lexer::new(SpannedSource::from_string(source), SourceId::from_usize(0));
        let tokens = lexer.tokenise();
        assert!(!lexer.diagnostics().has_errors(), "failed to lex `{source}`");

        let gen = AttrParser::from_stream(&tokens, SourceId::from_usize(0));
        let payload = ExternAttr::parse(&gen)?;
        gen.expect_end()?;

        Ok(payload)
    }

    #[test]
    fn bare_extern_is_adhoc_everywhere() {
        assert_eq!(parse_extern("").unwrap(), ExternAttr::adhoc());
    }

    #[test]
    fn bare_symbol_is_a_standard_binding_everywhere() {
        let payload = parse_extern(r#""vec_push""#).unwrap();

        assert_eq!(payload, ExternAttr::standard("vec_push"));
        assert_eq!(payload.entry_for("cpp".into()), Some(&ExternEntry::Standard {
            backend: Backend::all(),
            symbol: "vec_push".into(),
        }));
    }

    #[test]
    fn arity_precedes_the_symbol() {
        let payload = parse_extern(r#"2 "vec_push""#).unwrap();

        assert_eq!(payload.arity, Some(2));
        assert_eq!(payload.entries.len(), 1);
    }

    #[test]
    fn backends_bind_separately() {
        let payload = parse_extern(r#"cpp "vec_push_cpp" llvm "vec_push_ll""#).unwrap();

        assert_eq!(payload.entries.as_slice(), [
            ExternEntry::Standard { backend: "cpp".into(), symbol: "vec_push_cpp".into() },
            ExternEntry::Standard { backend: "llvm".into(), symbol: "vec_push_ll".into() },
        ]);
    }

    #[test]
    fn inline_bindings_take_a_pattern() {
        let payload = parse_extern(r##"cpp inline "#1 + #2""##).unwrap();

        assert_eq!(payload.entries.as_slice(), [ExternEntry::Inline {
            backend: "cpp".into(),
            pattern: "#1 + #2".into(),
        }]);
    }

    #[test]
    fn adhoc_bindings_take_no_argument() {
        let payload = parse_extern(r#"cpp "vec_push" llvm adhoc"#).unwrap();

        assert_eq!(payload.entries.as_slice(), [
            ExternEntry::Standard { backend: "cpp".into(), symbol: "vec_push".into() },
            ExternEntry::AdHoc { backend: "llvm".into() },
        ]);
    }

    #[test]
    fn foreign_bindings_take_a_symbol() {
        let payload = parse_extern(r#"llvm foreign "vec_push_boxed""#).unwrap();

        assert_eq!(payload.entries.as_slice(), [ExternEntry::Foreign {
            backend: "llvm".into(),
            symbol: "vec_push_boxed".into(),
        }]);
    }

    #[test]
    fn arity_without_a_binding_is_rejected() {
        let error = parse_extern("2").unwrap_err();
        assert_eq!(error.kind, ParseErrorKind::ExpectedEntry);
    }

    #[test]
    fn oversized_arity_is_rejected() {
        let error = parse_extern(r#"4294967296 "vec_push""#).unwrap_err();
        assert_eq!(error.kind, ParseErrorKind::ArityOutOfRange);
    }

    #[test]
    fn backend_without_a_binding_is_rejected() {
        // `llvm` is a backend name here, not a binding clause for `cpp`.
        let error = parse_extern("cpp llvm").unwrap_err();
        assert_eq!(error.kind, ParseErrorKind::ExpectedBinding);
    }

    #[test]
    fn inline_without_a_pattern_is_rejected() {
        let error = parse_extern("cpp inline").unwrap_err();
        assert_eq!(error.kind, ParseErrorKind::ExpectedPattern);
    }

    #[test]
    fn exact_backend_wins_over_the_wildcard() {
        let payload = parse_extern(r#""generic" cpp "specific""#);

        // A string binding is terminal, mixing the bare form with entries
        // is rejected.
        assert!(payload.is_err());

        let payload = parse_extern(r#"cpp "specific" all "generic""#).unwrap();

        assert_eq!(
            payload.entry_for("cpp".into()),
            Some(&ExternEntry::Standard { backend: "cpp".into(), symbol: "specific".into() })
        );
        assert_eq!(
            payload.entry_for("llvm".into()),
            Some(&ExternEntry::Standard { backend: Backend::all(), symbol: "generic".into() })
        );
    }

    #[test]
    fn unknown_backends_resolve_to_nothing_without_a_wildcard() {
        let payload = parse_extern(r#"cpp "vec_push""#).unwrap();

        assert_eq!(payload.entry_for("llvm".into()), None);
    }

    #[test]
    fn printing_round_trips() {
        let sources = [
            "",
            r#""vec_push""#,
            r#"2 "vec_push""#,
            r#"cpp "vec_push_cpp" llvm "vec_push_ll""#,
            r##"cpp inline "#1 + #2""##,
            r#"cpp "vec_push" llvm adhoc"#,
            r#"llvm foreign "vec_push_boxed""#,
        ];

        for source in sources {
            let payload = parse_extern(source).unwrap();
            let printed = payload.to_string();

            assert_eq!(parse_extern(&printed).unwrap(), payload, "printed as `{printed}`");
        }
    }

    #[test]
    fn objects_round_trip() {
        let payload =
            parse_extern(r##"2 cpp "vec_push" llvm inline "#1" all adhoc"##).unwrap();

        assert_eq!(ExternAttr::from_object(&payload.to_object()), Some(payload));
    }

    #[test]
    fn malformed_objects_are_rejected() {
        assert_eq!(ExternAttr::from_object(&ObjectRef::nat(2)), None);

        // An empty entry list violates the payload invariant.
        let empty = ObjectRef::ctor(0, [ObjectRef::none(), ObjectRef::nil()]);
        assert_eq!(ExternAttr::from_object(&empty), None);

        // An entry with an unknown constructor tag.
        let bogus = ObjectRef::ctor(0, [
            ObjectRef::none(),
            ObjectRef::list([ObjectRef::ctor(9, [ObjectRef::string("cpp")])]),
        ]);
        assert_eq!(ExternAttr::from_object(&bogus), None);
    }
}

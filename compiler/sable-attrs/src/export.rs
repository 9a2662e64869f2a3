//! The `export` attribute, which makes a declaration visible to foreign
//! code under a chosen symbol, the mirror image of [`crate::foreign`].

use std::fmt;

use sable_object::ObjectRef;
use sable_source::identifier::Identifier;

use crate::{adapter::AttrPayload, diagnostics::ParseResult, parser::AttrParser};

/// The payload of an `export` attribute, as in `@[export vec_push]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportAttr {
    /// The symbol that the declaration is published under.
    pub symbol: Identifier,
}

impl fmt::Display for ExportAttr {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        write!(out, "{}", self.symbol)
    }
}

impl AttrPayload for ExportAttr {
    const NAME: &'static str = "export";

    fn parse(gen: &AttrParser<'_>) -> ParseResult<Self> {
        let symbol = gen.parse_ident()?;
        Ok(Self { symbol })
    }

    fn to_object(&self) -> ObjectRef {
        ObjectRef::string(self.symbol.value())
    }

    fn from_object(object: &ObjectRef) -> Option<Self> {
        let symbol = object.as_str()?;
        Some(Self { symbol: symbol.value().into() })
    }
}

#[cfg(test)]
mod test_super {
    use pretty_assertions::assert_eq;
    use sable_lexer::Lexer;
    use sable_source::{location::SpannedSource, SourceId};

    use super::*;
    use crate::diagnostics::{ExpectedItem, ParseError};

    fn parse_export(source: &str) -> Result<ExportAttr, ParseError> {
        let mut lexer = Lexer::new(SpannedSource::from_string(source), SourceId::from_usize(0));
        let tokens = lexer.tokenise();
        assert!(!lexer.diagnostics().has_errors());

        let gen = AttrParser::from_stream(&tokens, SourceId::from_usize(0));
        let payload = ExportAttr::parse(&gen)?;
        gen.expect_end()?;

        Ok(payload)
    }

    #[test]
    fn export_takes_a_symbol() {
        let payload = parse_export("vec_push").unwrap();

        assert_eq!(payload.symbol, "vec_push".into());
        assert_eq!(payload.to_string(), "vec_push");
    }

    #[test]
    fn export_without_a_symbol_is_rejected() {
        let error = parse_export("").unwrap_err();
        assert_eq!(error.expected, ExpectedItem::Ident);
    }

    #[test]
    fn export_rejects_a_string() {
        // Exported symbols are identifiers, not arbitrary strings.
        assert!(parse_export(r#""vec_push""#).is_err());
    }

    #[test]
    fn objects_round_trip() {
        let payload = parse_export("vec_push").unwrap();

        assert_eq!(ExportAttr::from_object(&payload.to_object()), Some(payload));
        assert_eq!(ExportAttr::from_object(&ObjectRef::nat(2)), None);
    }
}

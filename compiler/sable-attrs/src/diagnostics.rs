//! Error and warning definitions for the attribute subsystem, and the
//! machinery to lower them into [`Report`]s.
//!
//! [`Report`]: sable_reporting::report::Report

use std::fmt;

use derive_more::Constructor;
use sable_reporting::reporter::Reporter;
use sable_source::{identifier::Identifier, location::Span};
use sable_token::TokenKind;
use sable_utils::{bitflags::bitflags, printing::SequenceDisplay};

use crate::target::AttrTarget;

pub type AttrResult<T = ()> = Result<T, AttrError>;

pub type ParseResult<T> = Result<T, ParseError>;

bitflags! {
    /// The set of token shapes that a parse step would have accepted, used
    /// to phrase the `help` note of a [`ParseError`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ExpectedItem: u32 {
        const Ident = 1 << 1;
        const StrLit = 1 << 2;
        const IntLit = 1 << 3;
        const Comma = 1 << 4;
        const At = 1 << 5;
        const LeftBracket = 1 << 6;
    }
}

impl From<TokenKind> for ExpectedItem {
    fn from(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Ident(_) => ExpectedItem::Ident,
            TokenKind::Str(_) => ExpectedItem::StrLit,
            TokenKind::Int(_) => ExpectedItem::IntLit,
            TokenKind::Comma => ExpectedItem::Comma,
            TokenKind::At => ExpectedItem::At,
            _ => ExpectedItem::empty(),
        }
    }
}

impl fmt::Display for ExpectedItem {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        let mut items = vec![];

        if self.contains(ExpectedItem::Ident) {
            items.push("identifier");
        }
        if self.contains(ExpectedItem::StrLit) {
            items.push("string literal");
        }
        if self.contains(ExpectedItem::IntLit) {
            items.push("numeral");
        }
        if self.contains(ExpectedItem::Comma) {
            items.push(",");
        }
        if self.contains(ExpectedItem::At) {
            items.push("@");
        }
        if self.contains(ExpectedItem::LeftBracket) {
            items.push("[");
        }

        write!(out, "{}", SequenceDisplay::either(&items))
    }
}

/// An error that occurred whilst parsing the argument stream of an
/// attribute.
#[derive(Debug, Clone, Constructor)]
pub struct ParseError {
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// Where it went wrong.
    pub location: Span,
    /// What the parser would have accepted at [`Self::location`].
    pub expected: ExpectedItem,
    /// The token that was actually there, [`None`] at the end of the
    /// stream.
    pub received: Option<TokenKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Generic failure, the phrasing comes from `expected` and `received`
    /// alone.
    UnExpected,
    /// An attribute list must begin with the name of an attribute.
    ExpectedAttrName,
    /// An arity numeral must be followed by at least one binding.
    ExpectedEntry,
    /// A backend name must be followed by a binding clause.
    ExpectedBinding,
    /// `inline` must be followed by the pattern string it expands to.
    ExpectedPattern,
    /// `foreign` must be followed by the symbol string it binds to.
    ExpectedSymbol,
    /// Arity numerals are limited to 32 bits.
    ArityOutOfRange,
    /// Leftover tokens after the arguments of an attribute were fully
    /// consumed.
    TrailingTokens,
}

impl ParseError {
    /// Lower the error into a [`Report`] on the given reporter.
    ///
    /// [`Report`]: sable_reporting::report::Report
    pub fn add_to_reporter(&self, reporter: &mut Reporter) {
        let received = match self.received {
            Some(kind) => format!("unexpectedly encountered {}", kind.as_error_string()),
            None => "unexpectedly reached the end of the attribute".to_string(),
        };

        let title = match self.kind {
            ParseErrorKind::UnExpected | ParseErrorKind::TrailingTokens => received,
            ParseErrorKind::ExpectedAttrName => {
                format!("expected the name of an attribute, but {received}")
            }
            ParseErrorKind::ExpectedEntry => {
                format!("expected a binding after the arity, but {received}")
            }
            ParseErrorKind::ExpectedBinding => {
                format!("expected a binding after the backend name, but {received}")
            }
            ParseErrorKind::ExpectedPattern => {
                format!("expected the pattern of an `inline` binding, but {received}")
            }
            ParseErrorKind::ExpectedSymbol => {
                format!("expected the symbol of a `foreign` binding, but {received}")
            }
            ParseErrorKind::ArityOutOfRange => {
                "the arity of a binding must fit within 32 bits".to_string()
            }
        };

        let report = reporter.error();
        report.title(title).add_labelled_span(self.location, "here");

        if !self.expected.is_empty() {
            report.add_help(format!("consider adding {} here", self.expected));
        }
    }
}

/// Errors produced when attaching an attribute to a declaration, or when
/// populating the attribute registry.
#[derive(Debug, Clone)]
pub enum AttrError {
    /// The argument stream of the attribute did not parse.
    Parse(ParseError),

    /// Reference to an attribute that is not in the registry.
    UnknownAttr { name: Identifier, origin: Span },

    /// The subject declaration was never introduced to the environment.
    UnknownDecl { decl: Identifier, origin: Span },

    /// The attribute cannot be applied to this kind of declaration.
    InvalidSubject {
        name: Identifier,
        origin: Span,
        /// The kind of the subject declaration.
        target: AttrTarget,
        /// The kinds the attribute accepts.
        subject: AttrTarget,
    },

    /// The attribute must be recorded into the module artifact, but the
    /// subject declaration is not persistent.
    NonPersistent { name: Identifier, origin: Span },

    /// Two registrations were made under the same attribute name.
    Duplicate { name: Identifier },
}

impl From<ParseError> for AttrError {
    fn from(error: ParseError) -> Self {
        AttrError::Parse(error)
    }
}

impl AttrError {
    /// Lower the error into a [`Report`] on the given reporter.
    ///
    /// [`Report`]: sable_reporting::report::Report
    pub fn add_to_reporter(&self, reporter: &mut Reporter) {
        match self {
            AttrError::Parse(error) => error.add_to_reporter(reporter),
            AttrError::UnknownAttr { name, origin } => {
                reporter
                    .error()
                    .title(format!("unknown attribute `{name}`"))
                    .add_labelled_span(*origin, "not a registered attribute");
            }
            AttrError::UnknownDecl { decl, origin } => {
                reporter
                    .error()
                    .title(format!("attribute applied to unknown declaration `{decl}`"))
                    .add_labelled_span(*origin, "the subject of this attribute was never declared");
            }
            AttrError::InvalidSubject { name, origin, target, subject } => {
                reporter
                    .error()
                    .title(format!("the `{name}` attribute cannot be applied to {target}"))
                    .add_labelled_span(*origin, format!("cannot apply `{name}` here"))
                    .add_note(format!("`{name}` can only be applied to {subject}"));
            }
            AttrError::NonPersistent { name, origin } => {
                reporter
                    .error()
                    .title(format!(
                        "the `{name}` attribute can only be applied to persistent declarations"
                    ))
                    .add_labelled_span(*origin, "this declaration is not persistent")
                    .add_note(format!(
                        "`{name}` is recorded into the module artifact, which local \
                         declarations never reach"
                    ));
            }
            AttrError::Duplicate { name } => {
                reporter
                    .error()
                    .title(format!("the attribute name `{name}` is already registered"));
            }
        }
    }
}

/// Warnings produced when attaching attributes. Unlike [`AttrError`]s,
/// these do not stop the attachment pass.
#[derive(Debug, Clone)]
pub enum AttrWarning {
    /// The same attribute was applied to a declaration more than once. The
    /// first application wins, later ones are dropped.
    Unused {
        name: Identifier,
        origin: Option<Span>,
        /// The application that won.
        preceding: Option<Span>,
    },
}

impl AttrWarning {
    /// Lower the warning into a [`Report`] on the given reporter.
    ///
    /// [`Report`]: sable_reporting::report::Report
    pub fn add_to_reporter(&self, reporter: &mut Reporter) {
        match self {
            AttrWarning::Unused { name, origin, preceding } => {
                let report = reporter.warning();
                report.title(format!("the `{name}` attribute is applied more than once"));

                if let Some(origin) = origin {
                    report.add_labelled_span(*origin, "this application has no effect");
                }
                if let Some(preceding) = preceding {
                    report.add_labelled_span(*preceding, "the attribute was first applied here");
                }
            }
        }
    }
}

#[cfg(test)]
mod test_super {
    use pretty_assertions::assert_eq;
    use sable_source::location::ByteRange;
    use sable_source::SourceId;

    use super::*;

    #[test]
    fn expected_items_display_as_alternatives() {
        let expected = ExpectedItem::Ident | ExpectedItem::StrLit;
        assert_eq!(format!("{expected}"), "either a `identifier` or `string literal`");

        assert_eq!(format!("{}", ExpectedItem::Comma), "a `,`");
        assert_eq!(format!("{}", ExpectedItem::empty()), "");
    }

    #[test]
    fn parse_error_reports_received_token() {
        let error = ParseError::new(
            ParseErrorKind::ExpectedBinding,
            Span::new(ByteRange::new(4, 7), SourceId::from_usize(0)),
            ExpectedItem::Ident | ExpectedItem::StrLit,
            Some(TokenKind::Int(3)),
        );

        let mut reporter = Reporter::new();
        error.add_to_reporter(&mut reporter);

        assert!(reporter.has_errors());
        let report = &reporter.reports()[0];
        assert!(report.title.contains("expected a binding after the backend name"));
        assert!(report.title.contains("the numeral `3`"));
    }
}

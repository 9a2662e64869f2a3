//! Token definitions for the Sable attribute grammar, along with the
//! cursor that parsers use to walk over a lexed token stream.

pub mod cursor;
pub mod delimiter;

use std::fmt;

use sable_source::{constant::InternedStr, identifier::Identifier, location::ByteRange};

use crate::delimiter::Delimiter;

/// A single lexed token, its kind and the byte range it covers within the
/// source it was lexed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: ByteRange,
}

impl Token {
    pub fn new(kind: TokenKind, span: ByteRange) -> Self {
        Self { kind, span }
    }

    /// Check if the token is of the given kind.
    pub fn has_kind(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Check if the token is a tree delimited by brackets.
    pub fn is_bracket_tree(&self) -> bool {
        matches!(self.kind, TokenKind::Tree(Delimiter::Bracket, _))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(out, "{}", self.kind)
    }
}

/// The kinds of token that the lexer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `=`
    Eq,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// `@`
    At,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// A decimal numeral.
    Int(u64),
    /// A string literal, with escape sequences already applied.
    Str(InternedStr),
    /// An identifier.
    Ident(Identifier),
    /// A token tree enclosed by the given [`Delimiter`]. The second field
    /// is the index of the child stream within the side table that the
    /// lexer builds up.
    Tree(Delimiter, u32),
    /// A character that the lexer does not know how to deal with.
    Unexpected(char),
    /// A token that could not be lexed, a more specific error will have
    /// been recorded alongside it.
    Err,
}

impl TokenKind {
    /// Turn the token kind into a fragment of an error message, describing
    /// what was encountered.
    pub fn as_error_string(&self) -> String {
        match self {
            TokenKind::Unexpected(ch) => format!("an unknown character `{ch}`"),
            TokenKind::Int(value) => format!("the numeral `{value}`"),
            TokenKind::Str(value) => format!("the string {value:?}"),
            TokenKind::Ident(ident) => format!("the identifier `{ident}`"),
            kind => format!("a `{kind}`"),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Eq => write!(out, "="),
            TokenKind::Colon => write!(out, ":"),
            TokenKind::Comma => write!(out, ","),
            TokenKind::At => write!(out, "@"),
            TokenKind::Plus => write!(out, "+"),
            TokenKind::Minus => write!(out, "-"),
            TokenKind::Star => write!(out, "*"),
            TokenKind::Slash => write!(out, "/"),
            TokenKind::Int(value) => write!(out, "{value}"),
            TokenKind::Str(value) => write!(out, "{value:?}"),
            TokenKind::Ident(ident) => write!(out, "{ident}"),
            TokenKind::Tree(delimiter, _) => {
                write!(out, "{}...{}", delimiter.left(), delimiter.right())
            }
            TokenKind::Unexpected(ch) => write!(out, "{ch}"),
            TokenKind::Err => write!(out, "<error>"),
        }
    }
}

#[cfg(test)]
mod test_super {
    use super::*;

    #[test]
    fn test_error_strings() {
        assert_eq!(TokenKind::Comma.as_error_string(), "a `,`");
        assert_eq!(TokenKind::Int(2).as_error_string(), "the numeral `2`");
        assert_eq!(
            TokenKind::Ident("cpp".into()).as_error_string(),
            "the identifier `cpp`"
        );
    }
}

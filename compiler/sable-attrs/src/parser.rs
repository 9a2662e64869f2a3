//! Recursive descent machinery for attribute argument streams. The
//! [`AttrParser`] wraps a [`TokenCursor`] over the tokens inside an
//! `@[...]` invocation, and attribute payloads pull their arguments from
//! it through the primitives defined here.

use std::ops::Deref;

use sable_source::{
    constant::InternedStr,
    identifier::Identifier,
    location::{ByteRange, Span},
    SourceId,
};
use sable_token::{cursor::TokenCursor, delimiter::Delimiter, Token, TokenKind};

use crate::diagnostics::{ExpectedItem, ParseError, ParseErrorKind, ParseResult};

/// Strip the `@[...]` framing from an attribute invocation. On success,
/// this returns the argument stream within the brackets together with the
/// byte range that the bracket tree covers.
///
/// The token trees side table is the one produced by the lexer that lexed
/// `stream`.
pub fn invocation_stream<'s>(
    stream: &'s [Token],
    token_trees: &'s [Vec<Token>],
    source: SourceId,
) -> ParseResult<(&'s [Token], ByteRange)> {
    match stream.first() {
        Some(token) if token.has_kind(TokenKind::At) => {}
        token => {
            let range = token.map_or_else(ByteRange::default, |token| token.span);

            return Err(ParseError::new(
                ParseErrorKind::UnExpected,
                Span::new(range, source),
                ExpectedItem::At,
                token.map(|token| token.kind),
            ));
        }
    }

    match stream.get(1) {
        Some(Token { kind: TokenKind::Tree(Delimiter::Bracket, index), span }) => {
            Ok((&token_trees[*index as usize], *span))
        }
        token => {
            let range = token
                .map_or_else(|| ByteRange::singleton(stream[0].span.end()), |token| token.span);

            Err(ParseError::new(
                ParseErrorKind::UnExpected,
                Span::new(range, source),
                ExpectedItem::LeftBracket,
                token.map(|token| token.kind),
            ))
        }
    }
}

/// Parser over the argument stream of a single attribute invocation.
///
/// The parser dereferences to its [`TokenCursor`], so all of the cursor
/// peeking and backtracking primitives are available on it directly.
pub struct AttrParser<'s> {
    cursor: TokenCursor<'s>,
    source: SourceId,
}

impl<'s> Deref for AttrParser<'s> {
    type Target = TokenCursor<'s>;

    fn deref(&self) -> &Self::Target {
        &self.cursor
    }
}

impl<'s> AttrParser<'s> {
    pub fn new(stream: &'s [Token], span: ByteRange, source: SourceId) -> Self {
        Self { cursor: TokenCursor::new(stream, span), source }
    }

    /// Create a parser over a stream, computing the covering range from
    /// the first and last tokens.
    pub fn from_stream(stream: &'s [Token], source: SourceId) -> Self {
        Self { cursor: TokenCursor::from_stream(stream), source }
    }

    pub fn source(&self) -> SourceId {
        self.source
    }

    /// Attach the parser's source to a byte range.
    pub fn make_span(&self, range: ByteRange) -> Span {
        Span::new(range, self.source)
    }

    /// Whether the cursor sits at the end of the current attribute's
    /// arguments. A `,` separates attributes within a list, so it also
    /// terminates the arguments of the attribute before it.
    pub fn at_end(&self) -> bool {
        matches!(self.peek().map(|token| token.kind), None | Some(TokenKind::Comma))
    }

    /// Error unless the current attribute's arguments are fully consumed.
    pub fn expect_end(&self) -> ParseResult<()> {
        match self.peek() {
            Some(token) if !token.has_kind(TokenKind::Comma) => self.err_with_location(
                ParseErrorKind::TrailingTokens,
                ExpectedItem::Comma,
                Some(token.kind),
                token.span,
            ),
            _ => Ok(()),
        }
    }

    pub fn parse_ident(&self) -> ParseResult<Identifier> {
        match self.peek() {
            Some(Token { kind: TokenKind::Ident(ident), .. }) => {
                let ident = *ident;
                self.skip_token();
                Ok(ident)
            }
            _ => self.unexpected(ParseErrorKind::UnExpected, ExpectedItem::Ident),
        }
    }

    pub fn parse_str_lit(&self) -> ParseResult<InternedStr> {
        self.parse_str_lit_in(ParseErrorKind::UnExpected)
    }

    /// Parse a string literal, failing with the given error kind. Payload
    /// grammars use this to keep "what was being parsed" in the error.
    pub(crate) fn parse_str_lit_in(&self, kind: ParseErrorKind) -> ParseResult<InternedStr> {
        match self.peek() {
            Some(Token { kind: TokenKind::Str(value), .. }) => {
                let value = *value;
                self.skip_token();
                Ok(value)
            }
            _ => self.unexpected(kind, ExpectedItem::StrLit),
        }
    }

    pub fn parse_numeral(&self) -> ParseResult<u64> {
        match self.peek() {
            Some(Token { kind: TokenKind::Int(value), .. }) => {
                let value = *value;
                self.skip_token();
                Ok(value)
            }
            _ => self.unexpected(ParseErrorKind::UnExpected, ExpectedItem::IntLit),
        }
    }

    /// Consume a token of the given kind, or error.
    pub fn parse_token(&self, kind: TokenKind) -> ParseResult<()> {
        if self.peek_kind(kind) {
            self.skip_token();
            return Ok(());
        }

        self.unexpected(ParseErrorKind::UnExpected, ExpectedItem::from(kind))
    }

    /// Consume a token of the given kind if it is next, reporting whether
    /// it was.
    pub fn parse_token_fast(&self, kind: TokenKind) -> Option<()> {
        if self.peek_kind(kind) {
            self.skip_token();
            return Some(());
        }

        None
    }

    /// Error at the next token, recording what it was and what would have
    /// been accepted instead.
    pub(crate) fn unexpected<T>(
        &self,
        kind: ParseErrorKind,
        expected: ExpectedItem,
    ) -> ParseResult<T> {
        let received = self.peek().map(|token| token.kind);
        self.err_with_location(kind, expected, received, self.next_pos())
    }

    pub(crate) fn err_with_location<T>(
        &self,
        kind: ParseErrorKind,
        expected: ExpectedItem,
        received: Option<TokenKind>,
        range: ByteRange,
    ) -> ParseResult<T> {
        Err(ParseError::new(kind, self.make_span(range), expected, received))
    }
}

//! A cursor over a lexed token stream. The cursor only hands out shared
//! references and tracks its position through a [`Cell`], which lets
//! parsing routines compose without threading mutable borrows around.

use std::cell::Cell;

use sable_source::location::ByteRange;

use crate::{Token, TokenKind};

/// A movable position within a borrowed token stream.
#[derive(Debug)]
pub struct TokenCursor<'s> {
    /// The current position within the stream.
    position: Cell<usize>,
    /// The byte range that the whole stream covers within its source.
    span: ByteRange,
    /// The underlying tokens.
    stream: &'s [Token],
}

impl<'s> TokenCursor<'s> {
    pub fn new(stream: &'s [Token], span: ByteRange) -> Self {
        Self { position: Cell::new(0), span, stream }
    }

    /// Create a cursor over a stream, computing the covering range from
    /// the first and last tokens.
    pub fn from_stream(stream: &'s [Token]) -> Self {
        let span = match (stream.first(), stream.last()) {
            (Some(first), Some(last)) => first.span.join(last.span),
            _ => ByteRange::default(),
        };

        Self::new(stream, span)
    }

    /// The byte range that the whole stream covers.
    pub fn span(&self) -> ByteRange {
        self.span
    }

    pub fn stream(&self) -> &'s [Token] {
        self.stream
    }

    pub fn position(&self) -> usize {
        self.position.get()
    }

    /// Reset the cursor to a previously saved position.
    pub fn set_position(&self, position: usize) {
        self.position.set(position);
    }

    /// Whether there are tokens left to consume.
    pub fn has_token(&self) -> bool {
        self.position.get() < self.stream.len()
    }

    pub fn peek(&self) -> Option<&Token> {
        self.peek_nth(0)
    }

    pub fn peek_second(&self) -> Option<&Token> {
        self.peek_nth(1)
    }

    pub fn peek_nth(&self, at: usize) -> Option<&Token> {
        self.stream.get(self.position.get() + at)
    }

    /// Check whether the next token has the given kind, without advancing.
    pub fn peek_kind(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|token| token.has_kind(kind))
    }

    /// Advance the cursor by a single token.
    pub fn skip_token(&self) {
        self.position.set(self.position.get() + 1);
    }

    /// Advance the cursor, returning the consumed token.
    pub fn next_token(&self) -> Option<&Token> {
        let token = self.stream.get(self.position.get());

        if token.is_some() {
            self.skip_token();
        }

        token
    }

    /// The token that was most recently consumed.
    ///
    /// Panics if no token has been consumed yet.
    pub fn current_token(&self) -> &Token {
        &self.stream[self.position.get() - 1]
    }

    /// The range of the most recently consumed token, falling back to the
    /// stream range when nothing has been consumed.
    pub fn current_pos(&self) -> ByteRange {
        if self.stream.is_empty() || self.position.get() == 0 {
            return self.span;
        }

        self.current_token().span
    }

    /// The range of the next token to be consumed, or a range just past
    /// the end of the stream when it is exhausted.
    pub fn next_pos(&self) -> ByteRange {
        match self.peek() {
            Some(token) => token.span,
            None => ByteRange::singleton(self.span.end()),
        }
    }
}

#[cfg(test)]
mod test_super {
    use super::*;

    fn stream() -> Vec<Token> {
        vec![
            Token::new(TokenKind::Ident("cpp".into()), ByteRange::new(0, 3)),
            Token::new(TokenKind::Comma, ByteRange::new(3, 4)),
            Token::new(TokenKind::Int(7), ByteRange::new(5, 6)),
        ]
    }

    #[test]
    fn test_cursor_walks_the_stream() {
        let tokens = stream();
        let cursor = TokenCursor::from_stream(&tokens);

        assert_eq!(cursor.span(), ByteRange::new(0, 6));
        assert!(cursor.peek_kind(TokenKind::Ident("cpp".into())));

        cursor.skip_token();
        assert!(cursor.peek_kind(TokenKind::Comma));
        assert_eq!(cursor.current_pos(), ByteRange::new(0, 3));

        cursor.skip_token();
        cursor.skip_token();
        assert!(!cursor.has_token());
        assert_eq!(cursor.next_pos(), ByteRange::new(6, 7));
    }

    #[test]
    fn test_cursor_backtracking() {
        let tokens = stream();
        let cursor = TokenCursor::from_stream(&tokens);

        cursor.skip_token();
        let saved = cursor.position();

        cursor.skip_token();
        cursor.set_position(saved);
        assert!(cursor.peek_kind(TokenKind::Comma));
    }
}

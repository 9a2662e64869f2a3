//! Sable compiler lexer. This crate turns a hunk of source text into a
//! stream of [`Token`]s, grouping any bracketed regions into token trees
//! that are stored in a side table and referred to by index.

pub mod error;

use std::cell::Cell;

use sable_source::{
    location::{ByteRange, Span, SpannedSource},
    SourceId,
};
use sable_token::{delimiter::Delimiter, Token, TokenKind};

use crate::error::{LexerDiagnostics, LexerError, LexerErrorKind};

/// Character representing the end of input, handed out by [`Lexer::peek`]
/// once the source is exhausted.
const EOF_CHAR: char = '\0';

fn is_id_start(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphabetic()
}

fn is_id_continue(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphanumeric()
}

fn is_whitespace(ch: char) -> bool {
    ch.is_ascii_whitespace()
}

/// The lexer for a single source.
pub struct Lexer<'a> {
    /// The current byte offset into the source.
    offset: Cell<usize>,
    /// The contents that are being lexed.
    contents: SpannedSource<'a>,
    /// The id of the source, used when recording error locations.
    source_id: SourceId,
    /// The closing delimiter that most recently terminated a token tree,
    /// consulted by the enclosing [`Lexer::eat_token_tree`] call.
    previous_delimiter: Cell<Option<char>>,
    /// Whether the lexer is currently within a token tree.
    within_token_tree: Cell<bool>,
    /// The token trees that have been collected so far. A
    /// [`TokenKind::Tree`] refers to its children by index into this
    /// table.
    token_trees: Vec<Vec<Token>>,
    /// Diagnostics accumulated whilst lexing.
    diagnostics: LexerDiagnostics,
}

impl<'a> Lexer<'a> {
    pub fn new(contents: SpannedSource<'a>, source_id: SourceId) -> Self {
        Self {
            offset: Cell::new(0),
            contents,
            source_id,
            previous_delimiter: Cell::new(None),
            within_token_tree: Cell::new(false),
            token_trees: vec![],
            diagnostics: LexerDiagnostics::default(),
        }
    }

    /// Lex the entire source into a flat stream of tokens. Bracketed
    /// regions appear as single [`TokenKind::Tree`] tokens within the
    /// stream.
    pub fn tokenise(&mut self) -> Vec<Token> {
        std::iter::from_fn(|| self.advance_token()).collect()
    }

    pub fn diagnostics(&self) -> &LexerDiagnostics {
        &self.diagnostics
    }

    /// Take the accumulated diagnostics out of the lexer.
    pub fn take_diagnostics(&mut self) -> LexerDiagnostics {
        std::mem::take(&mut self.diagnostics)
    }

    /// Consume the lexer, returning the token tree side table that the
    /// produced stream refers into.
    pub fn into_token_trees(self) -> Vec<Vec<Token>> {
        self.token_trees
    }

    /// Lex the next token from the source, returning [`None`] once the
    /// source is exhausted, a fatal error has occurred, or the enclosing
    /// token tree has been closed.
    fn advance_token(&mut self) -> Option<Token> {
        self.eat_trivia();

        let offset = self.offset.get();
        let ch = self.next()?;

        let kind = match ch {
            '=' => TokenKind::Eq,
            ':' => TokenKind::Colon,
            ',' => TokenKind::Comma,
            '@' => TokenKind::At,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '(' => return self.eat_token_tree(Delimiter::Paren, offset),
            '{' => return self.eat_token_tree(Delimiter::Brace, offset),
            '[' => return self.eat_token_tree(Delimiter::Bracket, offset),
            ch @ (')' | '}' | ']') => {
                if self.within_token_tree.get() {
                    // Hand control back to the enclosing `eat_token_tree`
                    // call, which checks that the delimiter matches.
                    self.previous_delimiter.set(Some(ch));
                    return None;
                }

                TokenKind::Unexpected(ch)
            }
            '"' => self.string(offset),
            ch if is_id_start(ch) => self.ident(offset),
            '0'..='9' => self.number(offset),
            ch => TokenKind::Unexpected(ch),
        };

        if self.diagnostics.has_fatal_error.get() {
            return None;
        }

        Some(Token::new(kind, ByteRange::new(offset, self.offset.get())))
    }

    /// Lex a token tree, collecting the child tokens until the matching
    /// closing delimiter is found.
    fn eat_token_tree(&mut self, delimiter: Delimiter, start: usize) -> Option<Token> {
        self.previous_delimiter.set(None);
        let was_within = self.within_token_tree.replace(true);

        let mut children = vec![];
        while let Some(token) = self.advance_token() {
            children.push(token);
        }

        self.within_token_tree.set(was_within);

        if self.diagnostics.has_fatal_error.get() {
            return None;
        }

        match self.previous_delimiter.take() {
            Some(closer) if closer == delimiter.right() => {
                self.token_trees.push(children);
                let index = (self.token_trees.len() - 1) as u32;

                Some(Token::new(
                    TokenKind::Tree(delimiter, index),
                    ByteRange::new(start, self.offset.get()),
                ))
            }
            _ => {
                let kind = self.emit_error(
                    LexerErrorKind::Unclosed(delimiter),
                    ByteRange::singleton(start),
                );

                Some(Token::new(kind, ByteRange::new(start, self.offset.get())))
            }
        }
    }

    /// Lex an identifier. The first character has already been consumed.
    fn ident(&mut self, start: usize) -> TokenKind {
        self.eat_while_and_discard(is_id_continue);

        let name = self.contents.hunk(ByteRange::new(start, self.offset.get()));
        TokenKind::Ident(name.into())
    }

    /// Lex a decimal numeral. The first digit has already been consumed.
    fn number(&mut self, start: usize) -> TokenKind {
        self.eat_while_and_discard(|ch| matches!(ch, '0'..='9' | '_'));

        // A trailing identifier would be a literal suffix, which the
        // attribute grammar has no use for.
        if is_id_start(self.peek()) {
            self.eat_while_and_discard(is_id_continue);
            return self.emit_error(
                LexerErrorKind::MalformedNumericalLit,
                ByteRange::new(start, self.offset.get()),
            );
        }

        let digits = self.contents.hunk(ByteRange::new(start, self.offset.get()));

        match digits.replace('_', "").parse::<u64>() {
            Ok(value) => TokenKind::Int(value),
            Err(_) => self.emit_error(
                LexerErrorKind::MalformedNumericalLit,
                ByteRange::new(start, self.offset.get()),
            ),
        }
    }

    /// Lex a string literal, applying any escape sequences. The opening
    /// quote has already been consumed.
    fn string(&mut self, start: usize) -> TokenKind {
        let mut value = String::new();

        loop {
            match self.next() {
                Some('"') => break,
                Some('\\') => match self.char_from_escape_seq() {
                    Ok(ch) => value.push(ch),
                    Err(Some(error)) => {
                        self.diagnostics.add_error(error);
                    }
                    Err(None) => {
                        return self.emit_fatal_error(
                            LexerErrorKind::UnclosedStringLit,
                            ByteRange::new(start, self.offset.get()),
                        );
                    }
                },
                Some(ch) => value.push(ch),
                None => {
                    return self.emit_fatal_error(
                        LexerErrorKind::UnclosedStringLit,
                        ByteRange::new(start, self.offset.get()),
                    );
                }
            }
        }

        TokenKind::Str(value.as_str().into())
    }

    /// Lex the character of an escape sequence, after the `\` has been
    /// consumed. Returns `Err(None)` if the source ended within the
    /// sequence.
    fn char_from_escape_seq(&mut self) -> Result<char, Option<LexerError>> {
        let start = self.offset.get() - 1;

        match self.next() {
            Some('0') => Ok('\0'),
            Some('n') => Ok('\n'),
            Some('t') => Ok('\t'),
            Some('r') => Ok('\r'),
            Some('\\') => Ok('\\'),
            Some('"') => Ok('"'),
            Some('\'') => Ok('\''),
            Some(ch) => Err(Some(LexerError::new(
                LexerErrorKind::UnknownEscapeSequence(ch),
                Span::new(ByteRange::new(start, self.offset.get()), self.source_id),
            ))),
            None => Err(None),
        }
    }

    /// Skip over any whitespace and line comments.
    fn eat_trivia(&self) {
        loop {
            let ch = self.peek();

            if is_whitespace(ch) {
                self.eat_while_and_discard(is_whitespace);
            } else if ch == '/' && self.peek_second() == '/' {
                self.eat_while_and_discard(|ch| ch != '\n');
            } else {
                break;
            }
        }
    }

    /// Record an error at the given range, producing a [`TokenKind::Err`]
    /// placeholder token.
    fn emit_error(&mut self, kind: LexerErrorKind, range: ByteRange) -> TokenKind {
        self.diagnostics
            .add_error(LexerError::new(kind, Span::new(range, self.source_id)));

        TokenKind::Err
    }

    /// Record an error that lexing cannot continue past.
    fn emit_fatal_error(&mut self, kind: LexerErrorKind, range: ByteRange) -> TokenKind {
        self.diagnostics.has_fatal_error.set(true);
        self.emit_error(kind, range)
    }

    fn is_eof(&self) -> bool {
        self.offset.get() >= self.contents.0.len()
    }

    /// Look at the next character without consuming it.
    fn peek(&self) -> char {
        self.contents.0[self.offset.get()..].chars().next().unwrap_or(EOF_CHAR)
    }

    fn peek_second(&self) -> char {
        self.contents.0[self.offset.get()..].chars().nth(1).unwrap_or(EOF_CHAR)
    }

    /// Consume the next character.
    fn next(&self) -> Option<char> {
        let ch = self.contents.0[self.offset.get()..].chars().next()?;
        self.offset.set(self.offset.get() + ch.len_utf8());
        Some(ch)
    }

    /// Consume characters for as long as the condition holds.
    fn eat_while_and_discard(&self, condition: impl Fn(char) -> bool) {
        while !self.is_eof() && condition(self.peek()) {
            self.next();
        }
    }
}

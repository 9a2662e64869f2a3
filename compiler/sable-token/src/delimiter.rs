//! Definitions of the bracketing delimiters that group tokens into trees.

use std::fmt;

/// A delimiter that encloses a token tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimiter {
    /// `(` or `)`
    Paren,
    /// `{` or `}`
    Brace,
    /// `[` or `]`
    Bracket,
}

impl Delimiter {
    /// Get the delimiter that the given opening character corresponds to.
    pub fn from_left(ch: char) -> Option<Delimiter> {
        match ch {
            '(' => Some(Delimiter::Paren),
            '{' => Some(Delimiter::Brace),
            '[' => Some(Delimiter::Bracket),
            _ => None,
        }
    }

    /// Get the delimiter that the given closing character corresponds to.
    pub fn from_right(ch: char) -> Option<Delimiter> {
        match ch {
            ')' => Some(Delimiter::Paren),
            '}' => Some(Delimiter::Brace),
            ']' => Some(Delimiter::Bracket),
            _ => None,
        }
    }

    /// The opening character of this delimiter.
    pub fn left(&self) -> char {
        match self {
            Delimiter::Paren => '(',
            Delimiter::Brace => '{',
            Delimiter::Bracket => '[',
        }
    }

    /// The closing character of this delimiter.
    pub fn right(&self) -> char {
        match self {
            Delimiter::Paren => ')',
            Delimiter::Brace => '}',
            Delimiter::Bracket => ']',
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(out, "{}", self.right())
    }
}

//! Terminal colour and modifier definitions that are used to highlight
//! messages that the compiler emits.

use std::fmt;

/// ANSI escape code to reset the current styling.
const RESET: &str = "\u{001b}[0m";

/// Terminal colours that are supported by the report renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colour {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Colour {
    /// The ANSI escape code for this colour.
    fn escape_code(self) -> &'static str {
        match self {
            Colour::Black => "\u{001b}[30m",
            Colour::Red => "\u{001b}[31m",
            Colour::Green => "\u{001b}[32m",
            Colour::Yellow => "\u{001b}[33m",
            Colour::Blue => "\u{001b}[34m",
            Colour::Magenta => "\u{001b}[35m",
            Colour::Cyan => "\u{001b}[36m",
            Colour::White => "\u{001b}[37m",
        }
    }
}

/// Additional text styling that can be combined with a [`Colour`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Bold,
    Underline,
    Inverted,
}

impl Modifier {
    fn escape_code(self) -> &'static str {
        match self {
            Modifier::Bold => "\u{001b}[1m",
            Modifier::Underline => "\u{001b}[4m",
            Modifier::Inverted => "\u{001b}[7m",
        }
    }
}

/// A combination of a [`Colour`] and a [`Modifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoration {
    pub colour: Colour,
    pub modifier: Modifier,
}

impl std::ops::BitOr<Modifier> for Colour {
    type Output = Decoration;

    fn bitor(self, modifier: Modifier) -> Self::Output {
        Decoration { colour: self, modifier }
    }
}

impl std::ops::BitOr<Colour> for Modifier {
    type Output = Decoration;

    fn bitor(self, colour: Colour) -> Self::Output {
        Decoration { colour, modifier: self }
    }
}

/// Anything that can be rendered as a terminal styling prefix.
pub trait Highlighter {
    fn prefix(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl Highlighter for Colour {
    fn prefix(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        out.write_str(self.escape_code())
    }
}

impl Highlighter for Modifier {
    fn prefix(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        out.write_str(self.escape_code())
    }
}

impl Highlighter for Decoration {
    fn prefix(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        out.write_str(self.colour.escape_code())?;
        out.write_str(self.modifier.escape_code())
    }
}

struct Highlighted<'m, H> {
    highlighter: H,
    message: &'m str,
}

impl<H: Highlighter> fmt::Display for Highlighted<'_, H> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.highlighter.prefix(out)?;
        out.write_str(self.message)?;
        out.write_str(RESET)
    }
}

/// Wrap the given message in the escape codes of the provided highlighter,
/// terminated by a style reset.
pub fn highlight(highlighter: impl Highlighter, message: impl AsRef<str>) -> String {
    Highlighted { highlighter, message: message.as_ref() }.to_string()
}

#[cfg(test)]
mod test_super {
    use super::*;

    #[test]
    fn test_highlight_applies_reset() {
        let message = highlight(Colour::Red, "failure");

        assert!(message.starts_with("\u{001b}[31m"));
        assert!(message.ends_with(RESET));
    }

    #[test]
    fn test_decoration_combines_codes() {
        let message = highlight(Colour::Red | Modifier::Bold, "failure");

        assert!(message.contains("\u{001b}[31m"));
        assert!(message.contains("\u{001b}[1m"));
    }
}

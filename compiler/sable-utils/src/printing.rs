//! Utilities for printing sequences of items within diagnostic messages,
//! for example when listing the tokens that a parser expected to see.

use std::fmt;

/// The mode in which a [`SequenceDisplay`] joins its items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceJoinMode {
    /// Items in the sequence are exclusive of one another, joined by "or".
    Either,
    /// All items in the sequence are expected, joined by "and".
    All,
}

impl SequenceJoinMode {
    fn conjunction(self) -> &'static str {
        match self {
            SequenceJoinMode::Either => "or",
            SequenceJoinMode::All => "and",
        }
    }
}

/// Display helper that renders a slice of items as an English sequence,
/// quoting each item in backticks. An `Either` sequence of `[",", "]"]`
/// renders as ``either a `,` or `]```.
pub struct SequenceDisplay<'a, T> {
    items: &'a [T],
    mode: SequenceJoinMode,
}

impl<'a, T> SequenceDisplay<'a, T> {
    pub fn new(items: &'a [T], mode: SequenceJoinMode) -> Self {
        Self { items, mode }
    }

    /// Create a [`SequenceDisplay`] joined by "or".
    pub fn either(items: &'a [T]) -> Self {
        Self::new(items, SequenceJoinMode::Either)
    }

    /// Create a [`SequenceDisplay`] joined by "and".
    pub fn all(items: &'a [T]) -> Self {
        Self::new(items, SequenceJoinMode::All)
    }
}

impl<T: fmt::Display> fmt::Display for SequenceDisplay<'_, T> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.items {
            [] => Ok(()),
            [item] => match self.mode {
                SequenceJoinMode::Either => write!(out, "a `{item}`"),
                SequenceJoinMode::All => write!(out, "`{item}`"),
            },
            items => {
                if self.mode == SequenceJoinMode::Either {
                    write!(out, "either a ")?;
                }

                for (index, item) in items.iter().enumerate() {
                    if index == items.len() - 1 {
                        write!(out, "{} `{item}`", self.mode.conjunction())?;
                    } else {
                        if index > 0 {
                            write!(out, ", ")?;
                        }

                        write!(out, "`{item}`")?;

                        if index == items.len() - 2 {
                            write!(out, " ")?;
                        }
                    }
                }

                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod test_super {
    use super::*;

    #[test]
    fn test_display_of_empty_and_single_sequences() {
        assert_eq!(format!("{}", SequenceDisplay::either(&[","])), "a `,`");
        assert_eq!(format!("{}", SequenceDisplay::all(&[","])), "`,`");
        assert_eq!(format!("{}", SequenceDisplay::<&str>::either(&[])), "");
    }

    #[test]
    fn test_display_of_longer_sequences() {
        assert_eq!(
            format!("{}", SequenceDisplay::either(&["identifier", "string"])),
            "either a `identifier` or `string`"
        );
        assert_eq!(
            format!("{}", SequenceDisplay::all(&["a", "b", "c"])),
            "`a`, `b` and `c`"
        );
    }
}

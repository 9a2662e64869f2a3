//! Error definitions for the lexer, and the conversions that turn them
//! into renderable reports.

use std::cell::Cell;

use derive_more::Constructor;
use sable_reporting::report::{Report, ReportKind, Reports};
use sable_source::location::Span;
use sable_token::delimiter::Delimiter;

pub type LexerResult<T> = Result<T, LexerError>;

/// An error that occurred during lexing.
#[derive(Debug, Clone, Constructor)]
pub struct LexerError {
    /// The kind of error that occurred.
    pub kind: LexerErrorKind,
    /// The location of the erroneous hunk of source.
    pub location: Span,
}

/// The kinds of error that the lexer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexerErrorKind {
    /// Encountered a string literal that is missing its closing quote, as
    /// in `"vec_push`.
    UnclosedStringLit,
    /// Encountered an escape sequence within a string literal that the
    /// lexer does not recognise, as in `"\q"`.
    UnknownEscapeSequence(char),
    /// Encountered a numeral that does not fit into the value range the
    /// compiler supports.
    MalformedNumericalLit,
    /// Encountered a token tree that is missing its closing delimiter, as
    /// in `@[extern`.
    Unclosed(Delimiter),
}

impl From<LexerError> for Report {
    fn from(err: LexerError) -> Self {
        let mut report = Report::new();
        report.kind(ReportKind::Error);

        match err.kind {
            LexerErrorKind::UnclosedStringLit => {
                report
                    .title("encountered an unclosed string literal")
                    .add_labelled_span(err.location, "the string starting here is never closed");
            }
            LexerErrorKind::UnknownEscapeSequence(ch) => {
                report
                    .title(format!("unknown escape sequence `\\{ch}`"))
                    .add_labelled_span(err.location, "invalid escape sequence")
                    .add_help(
                        "valid escape sequences are `\\0`, `\\n`, `\\t`, `\\r`, `\\\\`, `\\\"` and `\\'`",
                    );
            }
            LexerErrorKind::MalformedNumericalLit => {
                report
                    .title("malformed numeral")
                    .add_labelled_span(err.location, "this numeral is out of range")
                    .add_note("numerals within attributes must fit into 64 bits");
            }
            LexerErrorKind::Unclosed(delimiter) => {
                report
                    .title(format!("encountered an unclosed `{}`", delimiter.left()))
                    .add_labelled_span(err.location, "this delimiter is never closed")
                    .add_help(format!("add a closing `{}`", delimiter.right()));
            }
        }

        report
    }
}

/// Accumulated diagnostics from lexing a source.
#[derive(Debug, Default)]
pub struct LexerDiagnostics {
    /// The errors that were encountered.
    errors: Vec<LexerError>,
    /// Whether the lexer encountered an error that it could not continue
    /// past.
    pub(crate) has_fatal_error: Cell<bool>,
}

impl LexerDiagnostics {
    pub(crate) fn add_error(&mut self, error: LexerError) {
        self.errors.push(error);
    }

    pub fn errors(&self) -> &[LexerError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty() || self.has_fatal_error.get()
    }

    /// Convert all of the collected diagnostics into reports.
    pub fn into_reports(self) -> Reports {
        self.errors.into_iter().map(Report::from).collect()
    }
}

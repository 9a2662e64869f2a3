//! Data types that diagnostic producing passes use to build up reports.
//! A [`Report`] is assembled through a fluent interface and later turned
//! into text by the [`crate::writer::ReportWriter`].

use std::{cell::Cell, fmt};

use derive_more::Constructor;
use sable_source::location::{RowCol, Span};
use sable_utils::highlight::{highlight, Colour, Modifier};

/// A collection of reports, the result of converting the errors of some
/// compiler stage.
pub type Reports = Vec<Report>;

/// The severity of a [`Report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportKind {
    /// The report describes an error that blocks compilation.
    #[default]
    Error,
    /// The report describes something suspicious that does not block
    /// compilation.
    Warning,
    /// General information that is attached to some other report.
    Info,
    /// An internal invariant was broken, this always denotes a compiler
    /// bug.
    Internal,
}

impl ReportKind {
    pub(crate) fn as_colour(&self) -> Colour {
        match self {
            ReportKind::Error | ReportKind::Internal => Colour::Red,
            ReportKind::Warning => Colour::Yellow,
            ReportKind::Info => Colour::Blue,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            ReportKind::Error => "error",
            ReportKind::Warning => "warn",
            ReportKind::Info => "info",
            ReportKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(out, "{}", highlight(self.as_colour() | Modifier::Bold, self.message()))
    }
}

/// The kind of a note that is attached to the end of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportNoteKind {
    Note,
    Help,
    Info,
}

impl fmt::Display for ReportNoteKind {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportNoteKind::Note => write!(out, "note"),
            ReportNoteKind::Help => write!(out, "help"),
            ReportNoteKind::Info => write!(out, "info"),
        }
    }
}

/// A freestanding message at the end of a report.
#[derive(Debug, Clone, Constructor)]
pub struct ReportNote {
    pub kind: ReportNoteKind,
    pub message: String,
}

/// Cached rendering information for a [`ReportCodeBlock`], computed once
/// per block when the report is written.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReportCodeBlockInfo {
    /// The width of the line number gutter.
    pub indent_width: usize,
    /// Position of the first byte of the span.
    pub start: RowCol,
    /// Position of the last byte of the span.
    pub end: RowCol,
}

/// A report element that renders a hunk of source with the span of
/// interest marked, optionally labelled with a message.
#[derive(Debug, Clone)]
pub struct ReportCodeBlock {
    pub span: Span,
    pub code_message: String,
    pub(crate) info: Cell<Option<ReportCodeBlockInfo>>,
}

impl ReportCodeBlock {
    pub fn new(span: Span, code_message: impl ToString) -> Self {
        Self { span, code_message: code_message.to_string(), info: Cell::new(None) }
    }
}

/// An element of the body of a [`Report`].
#[derive(Debug, Clone)]
pub enum ReportElement {
    CodeBlock(ReportCodeBlock),
    Note(ReportNote),
}

/// A single diagnostic report, a severity, a title and a body of code
/// blocks and notes.
#[derive(Debug, Default)]
pub struct Report {
    pub kind: ReportKind,
    pub title: String,
    pub contents: Vec<ReportElement>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the report describes an error.
    pub fn is_error(&self) -> bool {
        matches!(self.kind, ReportKind::Error | ReportKind::Internal)
    }

    /// Set the severity of the report.
    pub fn kind(&mut self, kind: ReportKind) -> &mut Self {
        self.kind = kind;
        self
    }

    /// Set the title of the report.
    pub fn title(&mut self, title: impl ToString) -> &mut Self {
        self.title = title.to_string();
        self
    }

    /// Append an arbitrary element to the report body.
    pub fn add_element(&mut self, element: ReportElement) -> &mut Self {
        self.contents.push(element);
        self
    }

    /// Append a code block that marks the given span with a label.
    pub fn add_labelled_span(&mut self, span: Span, message: impl ToString) -> &mut Self {
        self.add_element(ReportElement::CodeBlock(ReportCodeBlock::new(span, message)))
    }

    /// Append a code block that marks the given span without a label.
    pub fn add_span(&mut self, span: Span) -> &mut Self {
        self.add_labelled_span(span, "")
    }

    /// Append a `note: ...` line to the report body.
    pub fn add_note(&mut self, message: impl ToString) -> &mut Self {
        self.add_element(ReportElement::Note(ReportNote::new(
            ReportNoteKind::Note,
            message.to_string(),
        )))
    }

    /// Append a `help: ...` line to the report body.
    pub fn add_help(&mut self, message: impl ToString) -> &mut Self {
        self.add_element(ReportElement::Note(ReportNote::new(
            ReportNoteKind::Help,
            message.to_string(),
        )))
    }

    /// Append an `info: ...` line to the report body.
    pub fn add_info(&mut self, message: impl ToString) -> &mut Self {
        self.add_element(ReportElement::Note(ReportNote::new(
            ReportNoteKind::Info,
            message.to_string(),
        )))
    }
}

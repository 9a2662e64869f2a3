//! Rendering of individual report elements into their textual form.

use std::fmt;

use sable_source::{location::row_col_of, SourceMap};
use sable_utils::highlight::{highlight, Colour, Modifier};

use crate::report::{
    ReportCodeBlock, ReportCodeBlockInfo, ReportElement, ReportKind, ReportNote,
};

impl ReportCodeBlock {
    /// Compute the rendering information for this block, caching it so
    /// that repeated renders do not re-scan the source.
    pub(crate) fn info(&self, sources: &SourceMap) -> ReportCodeBlockInfo {
        if let Some(info) = self.info.get() {
            return info;
        }

        let range = self.span.range;
        let contents = sources.contents(self.span.id).0;

        let start = row_col_of(range.start(), contents);
        let end = row_col_of(range.end().saturating_sub(1).max(range.start()), contents);
        let indent_width = (end.row + 1).to_string().len();

        let info = ReportCodeBlockInfo { indent_width, start, end };
        self.info.set(Some(info));
        info
    }

    /// Render the block, marking every line that the span touches with
    /// carets underneath the offending columns.
    pub(crate) fn render(
        &self,
        out: &mut fmt::Formatter<'_>,
        sources: &SourceMap,
        indent_width: usize,
        kind: ReportKind,
    ) -> fmt::Result {
        let ReportCodeBlockInfo { start, end, .. } = self.info(sources);

        writeln!(
            out,
            "{}{} {}",
            " ".repeat(indent_width),
            highlight(Colour::Blue | Modifier::Bold, "-->"),
            highlight(
                Modifier::Underline,
                format!(
                    "{}:{}:{}",
                    sources.path(self.span.id).display(),
                    start.row + 1,
                    start.col + 1
                )
            ),
        )?;

        let contents = sources.contents(self.span.id).0;

        for (row, line) in contents.split('\n').enumerate() {
            if row < start.row || row > end.row {
                continue;
            }

            let line_number = format!("{:>indent_width$}", row + 1);
            writeln!(
                out,
                "{} {}   {line}",
                highlight(kind.as_colour(), line_number),
                highlight(Colour::Blue | Modifier::Bold, "|"),
            )?;

            // Caret row underneath, covering the columns of this line that
            // fall within the span.
            let col_from = if row == start.row { start.col } else { 0 };
            let col_to = if row == end.row { end.col } else { line.len().saturating_sub(1) };
            let carets = "^".repeat((col_to + 1).saturating_sub(col_from).max(1));

            write!(
                out,
                "{} {}   {}{}",
                " ".repeat(indent_width),
                highlight(Colour::Blue | Modifier::Bold, "|"),
                " ".repeat(col_from),
                highlight(kind.as_colour(), carets),
            )?;

            if row == end.row && !self.code_message.is_empty() {
                write!(out, " {}", highlight(kind.as_colour(), &self.code_message))?;
            }

            writeln!(out)?;
        }

        Ok(())
    }
}

impl ReportNote {
    pub(crate) fn render(&self, out: &mut fmt::Formatter<'_>, indent_width: usize) -> fmt::Result {
        writeln!(
            out,
            "{} {} {}: {}",
            " ".repeat(indent_width),
            highlight(Colour::Blue | Modifier::Bold, "="),
            highlight(Modifier::Bold, self.kind.to_string()),
            self.message
        )
    }
}

impl ReportElement {
    pub(crate) fn render(
        &self,
        out: &mut fmt::Formatter<'_>,
        sources: &SourceMap,
        indent_width: usize,
        kind: ReportKind,
    ) -> fmt::Result {
        match self {
            ReportElement::CodeBlock(block) => block.render(out, sources, indent_width, kind),
            ReportElement::Note(note) => note.render(out, indent_width),
        }
    }
}

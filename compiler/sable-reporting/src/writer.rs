//! Report writer, turns accumulated [`Reports`] into their final textual
//! form against the sources they refer to.

use std::fmt;

use sable_source::SourceMap;
use sable_utils::highlight::{highlight, Modifier};

use crate::report::{Report, ReportElement, Reports};

/// Formats a collection of reports against a [`SourceMap`].
pub struct ReportWriter<'m> {
    reports: Reports,
    sources: &'m SourceMap,
}

impl<'m> ReportWriter<'m> {
    pub fn new(reports: Reports, sources: &'m SourceMap) -> Self {
        Self { reports, sources }
    }

    pub fn single(report: Report, sources: &'m SourceMap) -> Self {
        Self { reports: vec![report], sources }
    }
}

impl fmt::Display for ReportWriter<'_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        for report in &self.reports {
            // Compute the widest line number gutter over all of the code
            // blocks so that the whole report lines up.
            let indent_width = report
                .contents
                .iter()
                .map(|element| match element {
                    ReportElement::CodeBlock(block) => block.info(self.sources).indent_width,
                    ReportElement::Note(_) => 0,
                })
                .max()
                .unwrap_or(0);

            writeln!(out, "{}: {}", report.kind, highlight(Modifier::Bold, &report.title))?;

            for element in &report.contents {
                element.render(out, self.sources, indent_width, report.kind)?;
            }

            writeln!(out)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test_super {
    use sable_source::location::{ByteRange, Span};

    use super::*;
    use crate::reporter::Reporter;

    #[test]
    fn test_report_rendering() {
        let mut sources = SourceMap::new();
        let id = sources.add_source(
            "vec.sb",
            "push := fn (v, x) => ()\n@[extern cpp \"vec_push\"]\n".to_owned(),
        );

        let mut reporter = Reporter::new();
        reporter
            .error()
            .title("something went wrong with this attribute")
            .add_labelled_span(Span::new(ByteRange::new(26, 32), id), "relevant hunk")
            .add_note("additional context");

        let output = ReportWriter::new(reporter.into_reports(), &sources).to_string();

        assert!(output.contains("something went wrong"));
        assert!(output.contains("vec.sb:2:3"));
        assert!(output.contains("2"));
        assert!(output.contains("^^^^^^"));
        assert!(output.contains("relevant hunk"));
        assert!(output.contains("note"));
    }

    #[test]
    fn test_reporter_error_tracking() {
        let mut reporter = Reporter::new();
        assert!(!reporter.has_errors());

        reporter.warning().title("just a warning");
        assert!(!reporter.has_errors());

        reporter.error().title("a real problem");
        assert!(reporter.has_errors());
    }
}

//! Convenience builder for accumulating [`Report`]s from a compiler
//! stage.

use crate::report::{Report, ReportKind, Reports};

/// A collector that diagnostic producers push their reports into.
#[derive(Debug, Default)]
pub struct Reporter {
    reports: Reports,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a report of the given kind, returning a mutable reference so
    /// that the caller can continue to build it in place.
    pub fn report(&mut self, kind: ReportKind) -> &mut Report {
        self.reports.push(Report::new());

        let report = self.reports.last_mut().unwrap();
        report.kind(kind);
        report
    }

    /// Begin an error report.
    pub fn error(&mut self) -> &mut Report {
        self.report(ReportKind::Error)
    }

    /// Begin a warning report.
    pub fn warning(&mut self) -> &mut Report {
        self.report(ReportKind::Warning)
    }

    /// Begin an informational report.
    pub fn info(&mut self) -> &mut Report {
        self.report(ReportKind::Info)
    }

    /// Begin an internal report, used for broken compiler invariants.
    pub fn internal(&mut self) -> &mut Report {
        self.report(ReportKind::Internal)
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn has_errors(&self) -> bool {
        self.reports.iter().any(Report::is_error)
    }

    pub fn into_reports(self) -> Reports {
        self.reports
    }
}

//! Sable compiler diagnostic reporting. Errors and warnings from other
//! stages are converted into [`report::Report`]s, which are then rendered
//! against the sources they refer to by the [`writer::ReportWriter`].

mod render;
pub mod report;
pub mod reporter;
pub mod writer;

//! Sable compiler source management. This crate holds the building blocks
//! that the rest of the compiler uses to refer to sources and locations
//! within them, as well as the global interning tables for identifiers and
//! string constants.

pub mod constant;
pub mod identifier;
pub mod location;

use std::path::{Path, PathBuf};

use index_vec::{define_index_type, IndexVec};

use crate::location::{row_col_of, RowColSpan, Span, SpannedSource};

define_index_type! {
    /// A unique identifier for a registered source.
    pub struct SourceId = u32;

    MAX_INDEX = u32::MAX as usize;
    DISABLE_MAX_INDEX_CHECK = cfg!(not(debug_assertions));
    DEBUG_FORMAT = "source:{}";
}

/// A single registered source, its path and its contents.
#[derive(Debug)]
pub struct Source {
    path: PathBuf,
    contents: String,
}

impl Source {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contents(&self) -> SpannedSource<'_> {
        SpannedSource::from_string(&self.contents)
    }
}

/// Stores all of the sources that the compiler has been given to work
/// with, keyed by [`SourceId`].
#[derive(Debug, Default)]
pub struct SourceMap {
    sources: IndexVec<SourceId, Source>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source with the map, returning the id that refers to it.
    pub fn add_source(&mut self, path: impl Into<PathBuf>, contents: String) -> SourceId {
        self.sources.push(Source { path: path.into(), contents })
    }

    pub fn source(&self, id: SourceId) -> &Source {
        &self.sources[id]
    }

    pub fn contents(&self, id: SourceId) -> SpannedSource<'_> {
        self.source(id).contents()
    }

    pub fn path(&self, id: SourceId) -> &Path {
        self.source(id).path()
    }

    /// Compute the row and column span that the given [`Span`] covers
    /// within its source.
    pub fn row_col_span(&self, span: Span) -> RowColSpan {
        let source = &self.source(span.id).contents;
        let range = span.range;

        let start = row_col_of(range.start(), source);
        let end = row_col_of(range.end().saturating_sub(1).max(range.start()), source);

        RowColSpan { start, end }
    }

    /// Format a [`Span`] as a `path:row:col` style location string.
    pub fn fmt_location(&self, span: Span) -> String {
        format!("{}:{}", self.path(span.id).display(), self.row_col_span(span))
    }
}

#[cfg(test)]
mod test_super {
    use super::*;
    use crate::location::ByteRange;

    #[test]
    fn test_source_map_locations() {
        let mut sources = SourceMap::new();
        let id = sources.add_source("lib.sb", "min := 2\nmax := 4\n".to_owned());

        let span = Span::new(ByteRange::new(9, 12), id);
        assert_eq!(sources.fmt_location(span), "lib.sb:2:1-2:3");

        let single = Span::new(ByteRange::new(0, 1), id);
        assert_eq!(sources.fmt_location(single), "lib.sb:1:1");
    }
}

use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanResolution {
    Preamble,
    AppendedTo { section_line: usize },
    Unnumbered,
}

/// A condition the parser recovered from instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recovery {
    HierarchyConflict {
        char_offset: usize,
        matched_text: String,
        kept_level: String,
        dropped_level: String,
    },
    TocSuppressed {
        first_line: usize,
        last_line: usize,
        entry_count: usize,
    },
    SuppressedHeader {
        line_number: usize,
        matched_text: String,
    },
    PatternMatchGap {
        char_offset: usize,
        line_number: usize,
        matched_text: String,
    },
    OrphanContent {
        first_line: usize,
        last_line: usize,
        resolution: OrphanResolution,
    },
    DuplicateCitation {
        citation: String,
        canonical_id: String,
        duplicate_id: String,
        merged_chars: usize,
    },
}

/// The single channel every recoverable event goes through: logged with
/// its context and kept for the caller.
#[derive(Debug, Default)]
pub struct Diagnostics {
    events: Vec<Recovery>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: Recovery) {
        match &event {
            Recovery::HierarchyConflict {
                char_offset,
                matched_text,
                kept_level,
                dropped_level,
            } => warn!(
                char_offset,
                matched_text = %matched_text,
                kept_level = %kept_level,
                dropped_level = %dropped_level,
                "overlapping header patterns resolved"
            ),
            Recovery::TocSuppressed {
                first_line,
                last_line,
                entry_count,
            } => debug!(
                first_line,
                last_line, entry_count, "table of contents block suppressed"
            ),
            Recovery::SuppressedHeader {
                line_number,
                matched_text,
            } => debug!(
                line_number,
                matched_text = %matched_text,
                "header inside table of contents ignored"
            ),
            Recovery::PatternMatchGap {
                char_offset,
                line_number,
                matched_text,
            } => warn!(
                char_offset,
                line_number,
                matched_text = %matched_text,
                "header occurrence could not be aligned to a line; dropped"
            ),
            Recovery::OrphanContent {
                first_line,
                last_line,
                resolution,
            } => debug!(
                first_line,
                last_line,
                resolution = ?resolution,
                "unclaimed content captured"
            ),
            Recovery::DuplicateCitation {
                citation,
                canonical_id,
                duplicate_id,
                merged_chars,
            } => warn!(
                citation = %citation,
                canonical_id = %canonical_id,
                duplicate_id = %duplicate_id,
                merged_chars,
                "duplicate citation merged"
            ),
        }

        self.events.push(event);
    }

    pub fn events(&self) -> &[Recovery] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Recovery> {
        self.events
    }
}

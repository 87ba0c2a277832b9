use std::collections::BTreeSet;

use regex::Regex;

use crate::error::ParseError;

use super::diagnostics::{Diagnostics, Recovery};

/// Finds table-of-contents blocks so their entries are not mistaken for
/// real headers. Only a block introduced by an explicit contents heading
/// is ever suppressed.
#[derive(Debug)]
pub struct TocFilter {
    heading: Regex,
    leader_entry: Regex,
    page_entry: Regex,
    window: usize,
    min_entries: usize,
}

impl TocFilter {
    pub fn new(window: usize, min_entries: usize) -> Result<Self, ParseError> {
        Ok(Self {
            heading: compile(r"(?i)^\s*(?:table\s+of\s+contents|contents)\s*:?\s*$")?,
            leader_entry: compile(r"(?:\.{2,}|…|\t)")?,
            page_entry: compile(r"\S[ \t]{2,}(?:\d{1,4}|[ivxlc]{1,6})[ \t]*$")?,
            window,
            min_entries: min_entries.max(1),
        })
    }

    /// Returns 0-based indices of lines to ignore when aligning headers.
    pub fn suppressed_lines(&self, lines: &[&str], diagnostics: &mut Diagnostics) -> BTreeSet<usize> {
        let mut suppressed = BTreeSet::new();
        let mut index = 0usize;

        while index < lines.len() {
            if !self.heading.is_match(lines[index]) {
                index += 1;
                continue;
            }

            let window_end = index.saturating_add(self.window).min(lines.len().saturating_sub(1));
            let entries = ((index + 1)..=window_end)
                .filter(|&line_index| self.is_entry(lines[line_index]))
                .collect::<Vec<usize>>();

            let Some(&last_entry) = entries.last() else {
                index += 1;
                continue;
            };
            if entries.len() < self.min_entries {
                index += 1;
                continue;
            }

            suppressed.extend(index..=last_entry);
            diagnostics.record(Recovery::TocSuppressed {
                first_line: index + 1,
                last_line: last_entry + 1,
                entry_count: entries.len(),
            });
            index = last_entry + 1;
        }

        suppressed
    }

    fn is_entry(&self, line: &str) -> bool {
        let trimmed = line.trim_end();
        if trimmed.trim().is_empty() {
            return false;
        }

        self.leader_entry.is_match(trimmed) || self.page_entry.is_match(trimmed)
    }
}

fn compile(pattern: &str) -> Result<Regex, ParseError> {
    Regex::new(pattern).map_err(|source| ParseError::InvalidLevelPattern {
        level_type: "table_of_contents".to_string(),
        source,
    })
}

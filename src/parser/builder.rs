use std::collections::BTreeSet;

use crate::model::{HeaderOccurrence, RawSection};

use super::diagnostics::{Diagnostics, Recovery};

const MAX_TITLE_CHARS: usize = 140;
const TITLE_SEPARATORS: [&str; 4] = [": ", " - ", " – ", " — "];

/// A header occurrence tied to the document line it starts.
#[derive(Debug, Clone, Copy)]
pub struct AlignedHeader<'a> {
    pub line_index: usize,
    pub header_end: usize,
    pub occurrence: &'a HeaderOccurrence,
}

pub fn line_start_offsets(lines: &[&str]) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(lines.len());
    let mut offset = 0usize;
    for line in lines {
        offsets.push(offset);
        offset += line.len() + 1;
    }
    offsets
}

/// Ties each occurrence to a line. The line its offset falls on wins when
/// that line starts with the occurrence's text (case- and
/// whitespace-insensitive); otherwise the first unclaimed line that does
/// is taken, since upstream normalization may have shifted offsets.
pub fn align_occurrences<'a>(
    lines: &[&str],
    occurrences: &'a [HeaderOccurrence],
    suppressed: &BTreeSet<usize>,
    diagnostics: &mut Diagnostics,
) -> Vec<AlignedHeader<'a>> {
    let starts = line_start_offsets(lines);
    let mut aligned = Vec::with_capacity(occurrences.len());
    let mut cursor = 0usize;

    for occurrence in occurrences {
        let origin_line = starts
            .partition_point(|&start| start <= occurrence.char_offset)
            .saturating_sub(1);

        if suppressed.contains(&origin_line) {
            diagnostics.record(Recovery::SuppressedHeader {
                line_number: origin_line + 1,
                matched_text: occurrence.matched_text.clone(),
            });
            continue;
        }

        let on_origin = (origin_line >= cursor)
            .then(|| lines.get(origin_line))
            .flatten()
            .and_then(|line| header_end(line, &occurrence.matched_text))
            .map(|end| (origin_line, end));

        let found = on_origin.or_else(|| {
            (cursor..lines.len())
                .filter(|line_index| !suppressed.contains(line_index))
                .find_map(|line_index| {
                    header_end(lines[line_index], &occurrence.matched_text)
                        .map(|end| (line_index, end))
                })
        });

        match found {
            Some((line_index, header_end)) => {
                aligned.push(AlignedHeader {
                    line_index,
                    header_end,
                    occurrence,
                });
                cursor = line_index + 1;
            }
            None => diagnostics.record(Recovery::PatternMatchGap {
                char_offset: occurrence.char_offset,
                line_number: origin_line + 1,
                matched_text: occurrence.matched_text.clone(),
            }),
        }
    }

    aligned
}

/// Byte index in `line` just past `matched`, if the line opens with it
/// after leading blanks, the same anchoring the header patterns use. Case
/// and inner whitespace are ignored.
pub fn header_end(line: &str, matched: &str) -> Option<usize> {
    let expected = matched.trim();
    if expected.is_empty() {
        return None;
    }

    let body = line.trim_start();
    let start = line.len() - body.len();
    let mut line_chars = body.char_indices().peekable();
    let mut end = start;

    for want in expected.chars().filter(|ch| !ch.is_whitespace()) {
        while line_chars.next_if(|(_, ch)| ch.is_whitespace()).is_some() {}
        let (index, got) = line_chars.next()?;
        if !want.to_lowercase().eq(got.to_lowercase()) {
            return None;
        }
        end = start + index + got.len_utf8();
    }

    let ends_alphanumeric = expected.chars().last().is_some_and(char::is_alphanumeric);
    let next_alphanumeric = line[end..].chars().next().is_some_and(char::is_alphanumeric);
    if ends_alphanumeric && next_alphanumeric {
        return None;
    }

    Some(end)
}

#[derive(Debug, PartialEq, Eq)]
pub struct InlineHeader {
    pub heading: String,
    pub title: Option<String>,
    pub trailing: Option<String>,
}

/// Splits a header line into heading text, inline title and any trailing
/// body text ("Title: body", "Title - body", "Title – trailing text").
pub fn split_inline_title(line: &str, header_end: usize) -> InlineHeader {
    let rest = &line[header_end..];
    let lead = rest.len()
        - rest
            .trim_start_matches(|ch: char| {
                ch.is_whitespace() || matches!(ch, '.' | ':' | ')' | '-' | '–' | '—')
            })
            .len();
    let content_start = header_end + lead;
    let content = line[content_start..].trim_end();

    if content.is_empty() {
        return InlineHeader {
            heading: line.trim().to_string(),
            title: None,
            trailing: None,
        };
    }

    let separator = TITLE_SEPARATORS
        .iter()
        .filter_map(|separator| content.find(separator).map(|position| (position, *separator)))
        .min_by_key(|(position, _)| *position);

    if let Some((position, separator)) = separator {
        let title = content[..position].trim();
        let trailing = content[position + separator.len()..].trim();
        if !title.is_empty() && !trailing.is_empty() {
            let heading_end = content_start + position + separator.trim_end().len();
            return InlineHeader {
                heading: line[..heading_end].trim().to_string(),
                title: Some(title.to_string()),
                trailing: Some(trailing.to_string()),
            };
        }
    }

    if let Some(title) = content.strip_suffix(':') {
        return InlineHeader {
            heading: line.trim().to_string(),
            title: non_empty(strip_toc_leader(title)),
            trailing: None,
        };
    }

    if content.chars().count() > MAX_TITLE_CHARS {
        return InlineHeader {
            heading: line[..content_start].trim().to_string(),
            title: None,
            trailing: Some(content.to_string()),
        };
    }

    InlineHeader {
        heading: line.trim().to_string(),
        title: non_empty(strip_toc_leader(content)),
        trailing: None,
    }
}

fn strip_toc_leader(title: &str) -> &str {
    let cut = [title.find(".."), title.find('…'), title.find('\t')]
        .into_iter()
        .flatten()
        .min();
    match cut {
        Some(index) => title[..index].trim_end(),
        None => title.trim(),
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Collapses blank-line runs and trims surrounding whitespace.
pub fn clean_text<S: AsRef<str>>(lines: &[S]) -> String {
    let mut out = Vec::<&str>::with_capacity(lines.len());
    let mut previous_blank = true;

    for line in lines {
        let line = line.as_ref().trim_end();
        let blank = line.trim().is_empty();
        if blank && previous_blank {
            continue;
        }
        out.push(if blank { "" } else { line });
        previous_blank = blank;
    }

    while out.last().is_some_and(|line| line.is_empty()) {
        out.pop();
    }

    out.join("\n")
}

#[derive(Debug)]
struct OpenSection {
    level_type: String,
    schema_index: usize,
    number: String,
    prefix: String,
    heading: String,
    title: Option<String>,
    body_lines: Vec<String>,
    line_number: usize,
    last_line: usize,
}

impl OpenSection {
    fn open(line_index: usize, line: &str, header: &AlignedHeader<'_>) -> Self {
        let inline = split_inline_title(line, header.header_end);
        let occurrence = header.occurrence;

        Self {
            level_type: occurrence.level_type.clone(),
            schema_index: occurrence.schema_index,
            number: occurrence.raw_number.clone(),
            prefix: occurrence.prefix.clone(),
            heading: inline.heading,
            title: inline.title,
            body_lines: inline.trailing.into_iter().collect(),
            line_number: line_index + 1,
            last_line: line_index + 1,
        }
    }

    fn push_line(&mut self, line_index: usize, line: &str) {
        self.body_lines.push(line.to_string());
        self.last_line = line_index + 1;
    }

    fn finish(self) -> RawSection {
        RawSection {
            level_type: self.level_type,
            schema_index: Some(self.schema_index),
            number: self.number,
            prefix: self.prefix,
            title: self.title,
            heading: self.heading,
            body_text: clean_text(&self.body_lines),
            line_number: self.line_number,
            last_line: self.last_line,
        }
    }
}

#[derive(Debug)]
enum BuilderState {
    Preamble,
    InSection(OpenSection),
}

/// Walks the document line by line, opening a section at every aligned
/// header. Lines before the first header are left unclaimed for orphan
/// capture.
pub fn build_sections(lines: &[&str], aligned: &[AlignedHeader<'_>]) -> Vec<RawSection> {
    let mut headers = aligned.iter().peekable();
    let mut sections = Vec::with_capacity(aligned.len());
    let mut state = BuilderState::Preamble;

    for (line_index, line) in lines.iter().enumerate() {
        let header = headers.next_if(|header| header.line_index == line_index);

        state = match (state, header) {
            (BuilderState::InSection(open), Some(header)) => {
                sections.push(open.finish());
                BuilderState::InSection(OpenSection::open(line_index, line, header))
            }
            (BuilderState::Preamble, Some(header)) => {
                BuilderState::InSection(OpenSection::open(line_index, line, header))
            }
            (BuilderState::InSection(mut open), None) => {
                open.push_line(line_index, line);
                BuilderState::InSection(open)
            }
            (BuilderState::Preamble, None) => BuilderState::Preamble,
        };
    }

    if let BuilderState::InSection(open) = state {
        sections.push(open.finish());
    }

    sections
}

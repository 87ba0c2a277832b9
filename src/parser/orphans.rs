use crate::model::{PREAMBLE_LEVEL, RawSection, UNNUMBERED_LEVEL};

use super::builder::clean_text;
use super::diagnostics::{Diagnostics, OrphanResolution, Recovery};

/// Reconciles lines no section claimed. Text before the first header
/// becomes a synthetic preamble; any later unclaimed span is appended to
/// the nearest preceding section, or kept as its own unnumbered section
/// when nothing precedes it. No non-blank line is ever dropped.
pub fn capture_orphans(
    lines: &[&str],
    mut sections: Vec<RawSection>,
    diagnostics: &mut Diagnostics,
) -> Vec<RawSection> {
    let mut claimed = vec![false; lines.len()];
    for section in &sections {
        let first = section.line_number.saturating_sub(1);
        let last = section.last_line.min(lines.len());
        for flag in claimed.iter_mut().take(last).skip(first) {
            *flag = true;
        }
    }

    let spans = unclaimed_spans(lines, &claimed);
    if spans.is_empty() {
        return sections;
    }

    let mut synthetic = Vec::<RawSection>::new();

    for (first, last) in spans {
        let body = clean_text(&lines[first..=last]);
        let first_line = first + 1;
        let last_line = last + 1;

        let preceding = sections
            .iter_mut()
            .filter(|section| section.line_number < first_line)
            .max_by_key(|section| section.line_number);

        let resolution = match preceding {
            Some(section) => {
                if section.body_text.is_empty() {
                    section.body_text = body;
                } else {
                    section.body_text = format!("{}\n\n{}", section.body_text, body);
                }
                OrphanResolution::AppendedTo {
                    section_line: section.line_number,
                }
            }
            None if synthetic.is_empty() => {
                synthetic.push(RawSection::synthetic(PREAMBLE_LEVEL, body, first_line, last_line));
                OrphanResolution::Preamble
            }
            None => {
                synthetic.push(RawSection::synthetic(UNNUMBERED_LEVEL, body, first_line, last_line));
                OrphanResolution::Unnumbered
            }
        };

        diagnostics.record(Recovery::OrphanContent {
            first_line,
            last_line,
            resolution,
        });
    }

    sections.extend(synthetic);
    sections.sort_by_key(|section| section.line_number);
    sections
}

/// Maximal runs of unclaimed lines that carry content, trimmed of
/// surrounding blank lines. 0-based, inclusive.
fn unclaimed_spans(lines: &[&str], claimed: &[bool]) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut current: Option<(usize, usize)> = None;

    for (index, line) in lines.iter().enumerate() {
        if claimed[index] {
            if let Some(span) = current.take() {
                spans.push(span);
            }
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }

        current = match current {
            Some((first, _)) => Some((first, index)),
            None => Some((index, index)),
        };
    }

    if let Some(span) = current {
        spans.push(span);
    }

    spans
}

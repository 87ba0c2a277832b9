use std::cmp::Reverse;

use crate::model::HeaderOccurrence;
use crate::schema::CompiledSchema;

use super::diagnostics::{Diagnostics, Recovery};

/// Scans `text` with every level matcher and merges the hits into one
/// offset-ordered, non-overlapping stream.
///
/// When two levels claim the same offset the longer literal prefix wins,
/// then the coarser level (lower schema index).
pub fn detect_headers(
    text: &str,
    schema: &CompiledSchema,
    diagnostics: &mut Diagnostics,
) -> Vec<HeaderOccurrence> {
    let mut candidates = Vec::<HeaderOccurrence>::new();

    for matcher in schema.matchers() {
        let Some(level) = schema.level(matcher.schema_index) else {
            continue;
        };

        for captures in matcher.pattern.captures_iter(text) {
            let Some(header) = captures.name("header") else {
                continue;
            };
            if header.as_str().trim().is_empty() {
                continue;
            }

            candidates.push(HeaderOccurrence {
                level_type: level.level_type.clone(),
                schema_index: matcher.schema_index,
                raw_number: captures
                    .name("number")
                    .map(|value| value.as_str().to_string())
                    .unwrap_or_default(),
                prefix: captures
                    .name("prefix")
                    .map(|value| value.as_str().to_string())
                    .unwrap_or_default(),
                char_offset: header.start(),
                end_offset: header.end(),
                matched_text: header.as_str().to_string(),
            });
        }
    }

    candidates.sort_by_key(|candidate| {
        (
            candidate.char_offset,
            Reverse(candidate.prefix.chars().count()),
            candidate.schema_index,
        )
    });

    let mut occurrences = Vec::<HeaderOccurrence>::with_capacity(candidates.len());
    for candidate in candidates {
        if let Some(kept) = occurrences.last() {
            if candidate.char_offset < kept.end_offset {
                diagnostics.record(Recovery::HierarchyConflict {
                    char_offset: candidate.char_offset,
                    matched_text: candidate.matched_text.clone(),
                    kept_level: kept.level_type.clone(),
                    dropped_level: candidate.level_type.clone(),
                });
                continue;
            }
        }
        occurrences.push(candidate);
    }

    occurrences
}

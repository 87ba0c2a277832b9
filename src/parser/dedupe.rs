use std::collections::HashMap;

use crate::model::Section;

use super::diagnostics::{Diagnostics, Recovery};

/// Collapses sections that share a citation into the first one in
/// document order. The duplicate's body (and its heading, when worded
/// differently) is appended to the canonical text; its children are
/// re-parented to the canonical section. Running it twice changes nothing.
pub fn dedupe_sections(sections: Vec<Section>, diagnostics: &mut Diagnostics) -> Vec<Section> {
    let mut kept = Vec::<Section>::with_capacity(sections.len());
    let mut by_citation = HashMap::<String, usize>::new();
    let mut redirects = HashMap::<String, String>::new();

    for mut section in sections {
        if let Some(parent_id) = section.parent_id.as_ref() {
            if let Some(canonical_id) = redirects.get(parent_id) {
                section.parent_id = Some(canonical_id.clone());
            }
        }

        let Some(&position) = by_citation.get(&section.citation) else {
            by_citation.insert(section.citation.clone(), kept.len());
            kept.push(section);
            continue;
        };

        let canonical = &mut kept[position];
        let merged = merge_text(canonical, &section);
        diagnostics.record(Recovery::DuplicateCitation {
            citation: section.citation.clone(),
            canonical_id: canonical.id.clone(),
            duplicate_id: section.id.clone(),
            merged_chars: merged,
        });
        redirects.insert(section.id, canonical.id.clone());
    }

    kept
}

fn merge_text(canonical: &mut Section, duplicate: &Section) -> usize {
    let mut pieces = Vec::<&str>::new();
    if !duplicate.heading.is_empty() && normalize(&duplicate.heading) != normalize(&canonical.heading) {
        pieces.push(duplicate.heading.as_str());
    }
    let body = duplicate.body();
    if !body.is_empty() {
        pieces.push(body);
    }
    if pieces.is_empty() {
        return 0;
    }

    let addition = pieces.join("\n\n");
    if canonical.text.is_empty() {
        canonical.text = addition.clone();
    } else {
        canonical.text = format!("{}\n\n{}", canonical.text, addition);
    }
    addition.chars().count()
}

/// Whitespace-insensitive only; a heading that differs in case is still
/// distinct source text.
fn normalize(value: &str) -> String {
    value.split_whitespace().collect::<Vec<&str>>().join(" ")
}

use std::collections::HashMap;

use super::{FlatTocEntry, NumberedSection, TocMetadata, TocNode};

/// Position of each section's parent, if it resolves.
///
/// Any known id resolves regardless of where it sits in the list. Links
/// that would close a cycle (including a section naming itself) are cut
/// at the cycle's earliest member, which is then shown as a root and
/// counted as a demoted orphan along with unknown parents.
pub(super) fn resolve_parents(sections: &[NumberedSection]) -> Vec<Option<usize>> {
    let positions = sections
        .iter()
        .enumerate()
        .map(|(position, numbered)| (numbered.section.id.as_str(), position))
        .collect::<HashMap<&str, usize>>();

    let mut parents = sections
        .iter()
        .map(|numbered| {
            numbered
                .section
                .parent_id
                .as_deref()
                .and_then(|parent_id| positions.get(parent_id).copied())
        })
        .collect::<Vec<Option<usize>>>();

    break_cycles(&mut parents);
    parents
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Walk {
    Unvisited,
    OnPath,
    Settled,
}

/// Follows each parent chain once; a chain that comes back to a node on
/// the current path is a cycle.
fn break_cycles(parents: &mut [Option<usize>]) {
    let mut state = vec![Walk::Unvisited; parents.len()];

    for start in 0..parents.len() {
        let mut path = Vec::<usize>::new();
        let mut cursor = Some(start);

        while let Some(node) = cursor {
            match state[node] {
                Walk::Settled => break,
                Walk::OnPath => {
                    if let Some(from) = path.iter().position(|&member| member == node) {
                        if let Some(&earliest) = path[from..].iter().min() {
                            parents[earliest] = None;
                        }
                    }
                    break;
                }
                Walk::Unvisited => {
                    state[node] = Walk::OnPath;
                    path.push(node);
                    cursor = parents[node];
                }
            }
        }

        for node in path {
            state[node] = Walk::Settled;
        }
    }
}

fn content_length(numbered: &NumberedSection) -> usize {
    numbered.section.text.chars().count()
}

fn has_content(numbered: &NumberedSection) -> bool {
    !numbered.section.text.trim().is_empty()
}

/// Builds the nested TOC. Children keep input order; nodes whose parent
/// does not resolve become roots.
pub fn generate_hierarchical_toc(sections: &[NumberedSection]) -> Vec<TocNode> {
    let parents = resolve_parents(sections);

    let mut children = vec![Vec::<usize>::new(); sections.len()];
    let mut roots = Vec::<usize>::new();
    for (position, parent) in parents.iter().enumerate() {
        match parent {
            Some(parent) => children[*parent].push(position),
            None => roots.push(position),
        }
    }

    // Post-order over the forest, so every child node is finished before
    // its parent collects it. Parents may sit anywhere in the list.
    let mut order = Vec::<usize>::with_capacity(sections.len());
    let mut stack = roots
        .iter()
        .rev()
        .map(|&root| (root, false))
        .collect::<Vec<(usize, bool)>>();
    while let Some((position, expanded)) = stack.pop() {
        if expanded {
            order.push(position);
            continue;
        }
        stack.push((position, true));
        stack.extend(children[position].iter().rev().map(|&child| (child, false)));
    }

    let mut built = Vec::<Option<TocNode>>::with_capacity(sections.len());
    built.resize_with(sections.len(), || None);

    for position in order {
        let numbered = &sections[position];
        let child_nodes = children[position]
            .iter()
            .filter_map(|&child| built[child].take())
            .collect::<Vec<TocNode>>();

        built[position] = Some(TocNode {
            section_id: numbered.section.id.clone(),
            number: numbered.number,
            anchor_id: numbered.anchor_id.clone(),
            citation: numbered.section.citation.clone(),
            title: numbered.section.title.clone(),
            level_type: numbered.section.level_type.clone(),
            depth: numbered.section.depth_ordinal,
            subsection_count: child_nodes.len(),
            children: child_nodes,
            has_content: has_content(numbered),
            content_length: content_length(numbered),
            is_locked: numbered.is_locked,
        });
    }

    roots
        .into_iter()
        .filter_map(|root| built[root].take())
        .collect()
}

pub fn generate_flat_toc(sections: &[NumberedSection]) -> Vec<FlatTocEntry> {
    sections
        .iter()
        .map(|numbered| FlatTocEntry {
            section_id: numbered.section.id.clone(),
            number: numbered.number,
            anchor_id: numbered.anchor_id.clone(),
            citation: numbered.section.citation.clone(),
            title: numbered.section.title.clone(),
            level_type: numbered.section.level_type.clone(),
            depth: numbered.section.depth_ordinal,
            indent_level: numbered.section.depth_ordinal,
            parent_id: numbered.section.parent_id.clone(),
            has_content: has_content(numbered),
            is_locked: numbered.is_locked,
        })
        .collect()
}

pub fn generate_metadata(sections: &[NumberedSection]) -> TocMetadata {
    let parents = resolve_parents(sections);
    let demoted_orphans = sections
        .iter()
        .zip(&parents)
        .filter(|(numbered, parent)| numbered.section.parent_id.is_some() && parent.is_none())
        .count();

    TocMetadata {
        total_sections: sections.len(),
        max_depth: sections
            .iter()
            .map(|numbered| numbered.section.depth_ordinal)
            .max()
            .unwrap_or(0),
        root_sections: parents.iter().filter(|parent| parent.is_none()).count(),
        sections_with_content: sections.iter().filter(|numbered| has_content(numbered)).count(),
        locked_sections: sections.iter().filter(|numbered| numbered.is_locked).count(),
        demoted_orphans,
    }
}

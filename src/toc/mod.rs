//! Read-side projections over a finalized section list: sequential
//! numbering, hierarchical and flat tables of contents, prev/next/parent
//! navigation and aggregate metadata.
//!
//! Everything here is pure and works on copies; persisted sections are
//! never mutated.

use std::collections::HashSet;

use serde::Serialize;

use crate::model::Section;

mod navigation;
mod tree;

pub use navigation::get_section_navigation;
pub use tree::{generate_flat_toc, generate_hierarchical_toc, generate_metadata};

/// Lock state supplied by the approval workflow.
pub trait LockState {
    fn is_locked(&self, section_id: &str) -> bool;
}

impl LockState for HashSet<String> {
    fn is_locked(&self, section_id: &str) -> bool {
        self.contains(section_id)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocks;

impl LockState for NoLocks {
    fn is_locked(&self, _section_id: &str) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberedSection {
    #[serde(flatten)]
    pub section: Section,
    pub number: usize,
    pub anchor_id: String,
    pub is_locked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TocNode {
    pub section_id: String,
    pub number: usize,
    pub anchor_id: String,
    pub citation: String,
    pub title: Option<String>,
    pub level_type: String,
    pub depth: usize,
    pub children: Vec<TocNode>,
    /// Immediate children only.
    pub subsection_count: usize,
    pub has_content: bool,
    pub content_length: usize,
    pub is_locked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatTocEntry {
    pub section_id: String,
    pub number: usize,
    pub anchor_id: String,
    pub citation: String,
    pub title: Option<String>,
    pub level_type: String,
    pub depth: usize,
    pub indent_level: usize,
    pub parent_id: Option<String>,
    pub has_content: bool,
    pub is_locked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavLink {
    pub section_id: String,
    pub number: usize,
    pub anchor_id: String,
    pub citation: String,
    pub title: Option<String>,
}

impl From<&NumberedSection> for NavLink {
    fn from(numbered: &NumberedSection) -> Self {
        Self {
            section_id: numbered.section.id.clone(),
            number: numbered.number,
            anchor_id: numbered.anchor_id.clone(),
            citation: numbered.section.citation.clone(),
            title: numbered.section.title.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionNavigation {
    pub current: Option<NavLink>,
    pub previous: Option<NavLink>,
    pub next: Option<NavLink>,
    pub parent: Option<NavLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TocMetadata {
    pub total_sections: usize,
    pub max_depth: usize,
    pub root_sections: usize,
    pub sections_with_content: usize,
    pub locked_sections: usize,
    /// Sections whose parent could not be resolved and were shown as roots.
    pub demoted_orphans: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TocResult {
    pub sections: Vec<NumberedSection>,
    #[serde(rename = "hierarchicalTOC")]
    pub hierarchical_toc: Vec<TocNode>,
    #[serde(rename = "flatTOC")]
    pub flat_toc: Vec<FlatTocEntry>,
    pub metadata: TocMetadata,
}

pub fn anchor_id(number: usize) -> String {
    format!("section-{number}")
}

/// Numbers sections 1..=n in the order given; ordering is the caller's
/// responsibility.
pub fn assign_section_numbers(sections: Vec<Section>, locks: &dyn LockState) -> Vec<NumberedSection> {
    sections
        .into_iter()
        .enumerate()
        .map(|(index, section)| {
            let number = index + 1;
            let is_locked = locks.is_locked(&section.id);
            NumberedSection {
                section,
                number,
                anchor_id: anchor_id(number),
                is_locked,
            }
        })
        .collect()
}

/// Full read-side projection. The input is copied before numbering.
pub fn process_for_toc(sections: &[Section], locks: &dyn LockState) -> TocResult {
    let numbered = assign_section_numbers(sections.to_vec(), locks);
    let hierarchical_toc = generate_hierarchical_toc(&numbered);
    let flat_toc = generate_flat_toc(&numbered);
    let metadata = generate_metadata(&numbered);

    TocResult {
        sections: numbered,
        hierarchical_toc,
        flat_toc,
        metadata,
    }
}

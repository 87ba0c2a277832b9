use super::tree::resolve_parents;
use super::{NavLink, NumberedSection, SectionNavigation};

/// Prev/next by list position and parent by id, for the section carrying
/// `current_number`. The parent follows the same resolution as the
/// hierarchical TOC. Unknown numbers yield an empty navigation.
pub fn get_section_navigation(sections: &[NumberedSection], current_number: usize) -> SectionNavigation {
    let Some(position) = sections
        .iter()
        .position(|numbered| numbered.number == current_number)
    else {
        return SectionNavigation::default();
    };

    let parent = resolve_parents(sections)[position]
        .and_then(|parent| sections.get(parent))
        .map(NavLink::from);

    SectionNavigation {
        current: Some(NavLink::from(&sections[position])),
        previous: position
            .checked_sub(1)
            .and_then(|previous| sections.get(previous))
            .map(NavLink::from),
        next: sections.get(position + 1).map(NavLink::from),
        parent,
    }
}

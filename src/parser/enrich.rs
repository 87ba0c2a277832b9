use crate::model::{PREAMBLE_LEVEL, RawSection, Section};
use crate::schema::CompiledSchema;

pub fn section_id(document_order: usize) -> String {
    format!("s{document_order:04}")
}

/// Assigns ids, depth, parent links and citations in one pass.
///
/// The stack holds `(schema_index, position)` of the open ancestors. For
/// each section, entries that are not strictly coarser than it are
/// popped; the remaining top is the parent and the stack height is the
/// depth. Equal levels therefore become siblings, and skipped levels
/// simply produce a shallower tree.
pub fn enrich_sections(raw_sections: Vec<RawSection>, schema: &CompiledSchema) -> Vec<Section> {
    let mut sections = Vec::<Section>::with_capacity(raw_sections.len());
    let mut stack = Vec::<(usize, usize)>::new();
    let mut unnumbered = 0usize;

    for (document_order, raw) in raw_sections.into_iter().enumerate() {
        let id = section_id(document_order);
        let text = compose_text(&raw.heading, &raw.body_text);

        let Some(schema_index) = raw.schema_index else {
            let citation = if raw.level_type == PREAMBLE_LEVEL {
                "Preamble".to_string()
            } else {
                unnumbered += 1;
                format!("Unnumbered {unnumbered}")
            };

            sections.push(Section {
                id,
                citation,
                level_type: raw.level_type,
                depth_ordinal: 0,
                parent_id: None,
                document_order,
                heading: raw.heading,
                title: raw.title,
                text,
                is_synthetic: true,
            });
            continue;
        };

        while stack
            .last()
            .is_some_and(|&(ancestor_index, _)| ancestor_index >= schema_index)
        {
            stack.pop();
        }

        let fragment = schema.citation_fragment(schema_index, &raw.number);
        let (parent_id, citation) = match stack.last() {
            Some(&(_, position)) => {
                let parent = &sections[position];
                (
                    Some(parent.id.clone()),
                    format!("{}, {}", parent.citation, fragment),
                )
            }
            None => (None, fragment),
        };

        sections.push(Section {
            id,
            citation,
            level_type: raw.level_type,
            depth_ordinal: stack.len(),
            parent_id,
            document_order,
            heading: raw.heading,
            title: raw.title,
            text,
            is_synthetic: false,
        });
        stack.push((schema_index, sections.len() - 1));
    }

    sections
}

fn compose_text(heading: &str, body: &str) -> String {
    match (heading.is_empty(), body.is_empty()) {
        (true, _) => body.to_string(),
        (false, true) => heading.to_string(),
        (false, false) => format!("{heading}\n\n{body}"),
    }
}

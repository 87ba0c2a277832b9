use anyhow::{Result, bail};
use tracing::info;

use crate::cli::{NavArgs, TocArgs};
use crate::store::{SectionStore, SqliteSectionStore};
use crate::toc::{NoLocks, assign_section_numbers, get_section_navigation, process_for_toc};
use crate::util::print_json_pretty;

pub fn run(args: TocArgs) -> Result<()> {
    let Some(store) = SqliteSectionStore::open_existing(&args.db_path)? else {
        return Ok(());
    };
    let sections = store.load_sections(&args.document_id)?;
    if sections.is_empty() {
        info!(document_id = %args.document_id, "no sections stored for document");
    }

    let mut locks = store.locked_section_ids(&args.document_id)?;
    locks.extend(args.locked.iter().cloned());

    let result = process_for_toc(&sections, &locks);
    info!(
        document_id = %args.document_id,
        sections = result.metadata.total_sections,
        max_depth = result.metadata.max_depth,
        demoted_orphans = result.metadata.demoted_orphans,
        "table of contents generated"
    );

    print_json_pretty(&result)
}

pub fn run_navigation(args: NavArgs) -> Result<()> {
    let Some(store) = SqliteSectionStore::open_existing(&args.db_path)? else {
        return Ok(());
    };
    let sections = store.load_sections(&args.document_id)?;
    let numbered = assign_section_numbers(sections, &NoLocks);

    let navigation = get_section_navigation(&numbered, args.number);
    if navigation.current.is_none() {
        bail!(
            "section number {} not found in {} ({} sections)",
            args.number,
            args.document_id,
            numbered.len()
        );
    }

    print_json_pretty(&navigation)
}

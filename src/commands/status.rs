use anyhow::Result;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::store::SqliteSectionStore;

pub fn run(args: StatusArgs) -> Result<()> {
    info!(path = %args.db_path.display(), "status requested");

    let Some(store) = SqliteSectionStore::open_existing(&args.db_path)? else {
        return Ok(());
    };
    let summaries = store.document_summaries()?;
    if summaries.is_empty() {
        warn!(path = %args.db_path.display(), "no documents stored");
    }

    for summary in summaries {
        info!(
            document_id = %summary.document_id,
            file_name = %summary.file_name.unwrap_or_default(),
            parsed_at = %summary.parsed_at,
            sections = summary.section_count,
            locked = summary.locked_count,
            "document status"
        );
    }

    Ok(())
}

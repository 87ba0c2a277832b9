use std::collections::HashMap;
use std::io;
use std::path::Path;

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::cli::ParseArgs;
use crate::config::{load_config, load_override};
use crate::model::ParseResult;
use crate::parser::parse_document;
use crate::source::{FileSource, SourceFormat, TextSource};
use crate::store::{DocumentRecord, SectionStore, SqliteSectionStore};
use crate::util::{ensure_directory, print_json_pretty, write_json_pretty};

pub fn run(args: ParseArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(override_path) = &args.override_path {
        config = config.merged(&load_override(override_path)?);
    }
    if let Some(mode) = args.toc_filter {
        config.toc_filter.mode = mode;
    }

    info!(
        inputs = args.inputs.len(),
        levels = config.hierarchy.len(),
        toc_filter = ?config.toc_filter.mode,
        "starting parse"
    );

    let format = args.format.explicit();
    let stdin_text = if args.inputs.iter().any(|path| is_stdin(path)) {
        Some(io::read_to_string(io::stdin()).context("failed to read document from stdin")?)
    } else {
        None
    };

    let results = args
        .inputs
        .par_iter()
        .map(|path| match stdin_text.as_deref() {
            Some(text) if is_stdin(path) => parse_document(
                &TextSource::new(text, format.unwrap_or(SourceFormat::PlainText))
                    .with_file_name("stdin"),
                &config,
            ),
            _ => parse_document(&FileSource::new(path, format), &config),
        })
        .collect::<Vec<ParseResult>>();

    ensure_unique_document_ids(&results)?;

    if let Some(db_path) = &args.db_path {
        let mut store = SqliteSectionStore::open(db_path)?;
        for result in results.iter().filter(|result| result.success) {
            store.replace_sections(&DocumentRecord::from_result(result), &result.sections)?;
        }
    }

    match &args.output_dir {
        Some(output_dir) => {
            ensure_directory(output_dir)?;
            for result in &results {
                let path = output_dir.join(format!("{}.sections.json", result.document_id));
                write_json_pretty(&path, result)?;
                info!(path = %path.display(), "wrote parse result");
            }
        }
        None if results.len() == 1 => print_json_pretty(&results[0])?,
        None => print_json_pretty(&results)?,
    }

    let failed = results.iter().filter(|result| !result.success).count();
    for result in results.iter().filter(|result| !result.success) {
        if let Some(error) = &result.error {
            warn!(
                source = %result.metadata.source,
                kind = %error.kind,
                message = %error.message,
                "parse failed"
            );
        }
    }
    if failed > 0 {
        bail!("{failed} of {} documents failed to parse", results.len());
    }

    info!(documents = results.len(), "parse completed");
    Ok(())
}

/// Inputs sharing a file stem would overwrite each other's sections and
/// output file, so they are refused before anything is written.
fn ensure_unique_document_ids(results: &[ParseResult]) -> Result<()> {
    let mut seen = HashMap::<&str, &str>::with_capacity(results.len());
    for result in results {
        if let Some(previous) = seen.insert(&result.document_id, &result.metadata.source) {
            bail!(
                "inputs {} and {} both map to document id '{}'; rename one of them",
                previous,
                result.metadata.source,
                result.document_id
            );
        }
    }
    Ok(())
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

#[cfg(test)]
mod tests;

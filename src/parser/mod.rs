//! Turns governance document text into a validated section tree.
//!
//! Stages run strictly in order: header detection, optional TOC noise
//! suppression, line-based section building, orphan capture, depth and
//! citation enrichment, and citation deduplication.

use tracing::{info, warn};

use crate::config::ParserConfig;
use crate::error::ParseError;
use crate::model::{ParseFailure, ParseMetadata, ParseResult, Section};
use crate::schema::{CompiledSchema, HierarchySchema};
use crate::source::{DocumentSource, SourceDocument, SourceFormat, strip_markdown_headings};
use crate::util::{now_utc_string, sanitize_id, sha256_hex};

pub mod builder;
pub mod dedupe;
pub mod detect;
pub mod diagnostics;
pub mod enrich;
pub mod orphans;
pub mod toc_filter;

use builder::{align_occurrences, build_sections};
use dedupe::dedupe_sections;
use detect::detect_headers;
use diagnostics::{Diagnostics, Recovery};
use enrich::enrich_sections;
use orphans::capture_orphans;
use toc_filter::TocFilter;

#[derive(Debug)]
pub struct ParseOutcome {
    pub sections: Vec<Section>,
    pub recoveries: Vec<Recovery>,
}

/// A parser bound to one compiled schema. Construct one per call; it
/// holds no state between parses.
#[derive(Debug)]
pub struct DocumentParser {
    schema: CompiledSchema,
    toc_filter: Option<TocFilter>,
}

impl DocumentParser {
    pub fn new(schema: &HierarchySchema) -> Result<Self, ParseError> {
        Ok(Self {
            schema: CompiledSchema::compile(schema)?,
            toc_filter: None,
        })
    }

    pub fn with_toc_filter(mut self, window: usize, min_entries: usize) -> Result<Self, ParseError> {
        self.toc_filter = Some(TocFilter::new(window, min_entries)?);
        Ok(self)
    }

    pub fn schema(&self) -> &CompiledSchema {
        &self.schema
    }

    pub fn parse(&self, text: &str) -> ParseOutcome {
        let mut diagnostics = Diagnostics::new();
        let lines = text.split('\n').collect::<Vec<&str>>();

        let occurrences = detect_headers(text, &self.schema, &mut diagnostics);
        let suppressed = match &self.toc_filter {
            Some(filter) => filter.suppressed_lines(&lines, &mut diagnostics),
            None => Default::default(),
        };

        let aligned = align_occurrences(&lines, &occurrences, &suppressed, &mut diagnostics);
        let raw_sections = build_sections(&lines, &aligned);
        let raw_sections = capture_orphans(&lines, raw_sections, &mut diagnostics);
        let sections = enrich_sections(raw_sections, &self.schema);
        let sections = dedupe_sections(sections, &mut diagnostics);

        ParseOutcome {
            sections,
            recoveries: diagnostics.into_events(),
        }
    }
}

/// Reads one document and parses it under `config`. Never fails: errors
/// are reported inside the returned envelope with empty sections.
pub fn parse_document(source: &dyn DocumentSource, config: &ParserConfig) -> ParseResult {
    let document = match source.read() {
        Ok(document) => document,
        Err(err) => {
            return failure_envelope(source.location(), source.file_name(), None, &err);
        }
    };

    match parse_source_document(&document, config) {
        Ok((outcome, document_id)) => {
            info!(
                document_id = %document_id,
                source = %document.source,
                sections = outcome.sections.len(),
                recoveries = outcome.recoveries.len(),
                "document parsed"
            );

            ParseResult {
                success: true,
                document_id,
                metadata: ParseMetadata {
                    source: document.source.clone(),
                    file_name: document.file_name.clone(),
                    format: Some(document.format),
                    parsed_at: now_utc_string(),
                    section_count: outcome.sections.len(),
                    source_sha256: Some(sha256_hex(document.text.as_bytes())),
                },
                sections: outcome.sections,
                error: None,
                recoveries: outcome.recoveries,
            }
        }
        Err(err) => failure_envelope(
            document.source.clone(),
            document.file_name.clone(),
            Some(document.format),
            &err,
        ),
    }
}

fn parse_source_document(
    document: &SourceDocument,
    config: &ParserConfig,
) -> Result<(ParseOutcome, String), ParseError> {
    let mut parser = DocumentParser::new(&config.schema())?;
    if config.toc_filter.enabled_for(document.format) {
        parser = parser.with_toc_filter(config.toc_filter.window, config.toc_filter.min_entries)?;
    }

    let text = match document.format {
        SourceFormat::Markdown => strip_markdown_headings(&document.text, parser.schema()),
        _ => document.text.clone(),
    };

    Ok((parser.parse(&text), document_id_for(document.file_name.as_deref())))
}

pub fn document_id_for(file_name: Option<&str>) -> String {
    let stem = file_name
        .map(|name| name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name))
        .map(sanitize_id)
        .unwrap_or_default();
    if stem.is_empty() {
        "document".to_string()
    } else {
        stem
    }
}

fn failure_envelope(
    source: String,
    file_name: Option<String>,
    format: Option<SourceFormat>,
    err: &ParseError,
) -> ParseResult {
    warn!(kind = err.kind(), source = %source, error = %err, "document parse failed");

    ParseResult {
        success: false,
        document_id: document_id_for(file_name.as_deref()),
        sections: Vec::new(),
        error: Some(ParseFailure {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }),
        metadata: ParseMetadata {
            source,
            file_name,
            format,
            parsed_at: now_utc_string(),
            section_count: 0,
            source_sha256: None,
        },
        recoveries: Vec::new(),
    }
}

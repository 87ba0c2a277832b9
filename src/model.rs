use serde::{Deserialize, Serialize};

use crate::parser::diagnostics::Recovery;
use crate::source::SourceFormat;

pub const PREAMBLE_LEVEL: &str = "preamble";
pub const UNNUMBERED_LEVEL: &str = "unnumbered";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderOccurrence {
    pub level_type: String,
    pub schema_index: usize,
    pub raw_number: String,
    pub prefix: String,
    pub char_offset: usize,
    pub end_offset: usize,
    pub matched_text: String,
}

/// A recognized header and the body text gathered under it, before depth
/// and citation are known. Lives only for one parse pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSection {
    pub level_type: String,
    /// `None` for synthetic preamble and orphan sections.
    pub schema_index: Option<usize>,
    pub number: String,
    pub prefix: String,
    pub title: Option<String>,
    pub heading: String,
    pub body_text: String,
    /// 1-based line of the header (first content line for synthetic sections).
    pub line_number: usize,
    /// 1-based, inclusive.
    pub last_line: usize,
}

impl RawSection {
    pub fn synthetic(level_type: &str, body_text: String, line_number: usize, last_line: usize) -> Self {
        Self {
            level_type: level_type.to_string(),
            schema_index: None,
            number: String::new(),
            prefix: String::new(),
            title: None,
            heading: String::new(),
            body_text,
            line_number,
            last_line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub citation: String,
    pub level_type: String,
    pub depth_ordinal: usize,
    pub parent_id: Option<String>,
    pub document_order: usize,
    pub heading: String,
    pub title: Option<String>,
    pub text: String,
    pub is_synthetic: bool,
}

impl Section {
    /// Text following the heading line.
    pub fn body(&self) -> &str {
        self.text
            .strip_prefix(self.heading.as_str())
            .unwrap_or(&self.text)
            .trim()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseFailure {
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseMetadata {
    pub source: String,
    pub file_name: Option<String>,
    pub format: Option<SourceFormat>,
    pub parsed_at: String,
    pub section_count: usize,
    pub source_sha256: Option<String>,
}

/// Envelope handed to every caller of `parse_document`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub success: bool,
    pub document_id: String,
    pub sections: Vec<Section>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ParseFailure>,
    pub metadata: ParseMetadata,
    pub recoveries: Vec<Recovery>,
}

use std::path::PathBuf;

/// Failures that abort a parse. Every other irregularity in the input is
/// recovered and reported through `parser::diagnostics` instead.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to read document source {path}: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported document source {path}: {reason}")]
    UnsupportedSource { path: PathBuf, reason: String },

    #[error("no hierarchy levels configured")]
    SchemaMissing,

    #[error("invalid pattern for level '{level_type}': {source}")]
    InvalidLevelPattern {
        level_type: String,
        #[source]
        source: regex::Error,
    },
}

impl ParseError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SourceRead { .. } => "source_read",
            Self::UnsupportedSource { .. } => "unsupported_source",
            Self::SchemaMissing => "schema_missing",
            Self::InvalidLevelPattern { .. } => "invalid_level_pattern",
        }
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::schema::CompiledSchema;

const WORD_PROCESSOR_EXTENSIONS: [&str; 5] = ["doc", "docx", "odt", "rtf", "pages"];

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    PlainText,
    Markdown,
    /// Text already extracted from a word-processor original.
    WordProcessor,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("md" | "markdown") => Self::Markdown,
            _ => Self::PlainText,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub text: String,
    pub format: SourceFormat,
    pub file_name: Option<String>,
    pub source: String,
}

pub trait DocumentSource {
    fn read(&self) -> Result<SourceDocument, ParseError>;

    /// Where the bytes come from, for envelopes and logs.
    fn location(&self) -> String;

    fn file_name(&self) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    format: Option<SourceFormat>,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>, format: Option<SourceFormat>) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }
}

impl DocumentSource for FileSource {
    fn read(&self) -> Result<SourceDocument, ParseError> {
        let is_binary_original = self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| WORD_PROCESSOR_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if is_binary_original {
            return Err(ParseError::UnsupportedSource {
                path: self.path.clone(),
                reason: "word-processor originals must be converted to text upstream".to_string(),
            });
        }

        let raw = fs::read_to_string(&self.path).map_err(|source| ParseError::SourceRead {
            path: self.path.clone(),
            source,
        })?;

        Ok(SourceDocument {
            text: normalize_line_endings(&raw),
            format: self
                .format
                .unwrap_or_else(|| SourceFormat::from_path(&self.path)),
            file_name: self.file_name(),
            source: self.location(),
        })
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn file_name(&self) -> Option<String> {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .map(ToOwned::to_owned)
    }
}

/// In-memory text, already decoded.
#[derive(Debug, Clone)]
pub struct TextSource {
    text: String,
    format: SourceFormat,
    file_name: Option<String>,
}

impl TextSource {
    pub fn new(text: impl Into<String>, format: SourceFormat) -> Self {
        Self {
            text: text.into(),
            format,
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }
}

impl DocumentSource for TextSource {
    fn read(&self) -> Result<SourceDocument, ParseError> {
        Ok(SourceDocument {
            text: normalize_line_endings(&self.text),
            format: self.format,
            file_name: self.file_name.clone(),
            source: self.location(),
        })
    }

    fn location(&self) -> String {
        "inline".to_string()
    }

    fn file_name(&self) -> Option<String> {
        self.file_name.clone()
    }
}

pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Drops leading `#` markers from Markdown headings whose content is a
/// configured hierarchy header. Other headings are left untouched.
pub fn strip_markdown_headings(text: &str, schema: &CompiledSchema) -> String {
    text.split('\n')
        .map(|line| {
            let trimmed = line.trim_start();
            if !trimmed.starts_with('#') {
                return line;
            }
            let content = trimmed.trim_start_matches('#').trim_start();
            if schema.matches_line(content) {
                content
            } else {
                line
            }
        })
        .collect::<Vec<&str>>()
        .join("\n")
}

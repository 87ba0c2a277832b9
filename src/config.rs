use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::schema::{HierarchySchema, LevelDefinition};
use crate::source::SourceFormat;

pub const DEFAULT_TOC_WINDOW: usize = 100;
pub const DEFAULT_TOC_MIN_ENTRIES: usize = 3;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TocFilterMode {
    /// Enabled for word-processor sources only.
    #[default]
    Auto,
    On,
    Off,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TocFilterSettings {
    pub mode: TocFilterMode,
    pub window: usize,
    pub min_entries: usize,
}

impl Default for TocFilterSettings {
    fn default() -> Self {
        Self {
            mode: TocFilterMode::Auto,
            window: DEFAULT_TOC_WINDOW,
            min_entries: DEFAULT_TOC_MIN_ENTRIES,
        }
    }
}

impl TocFilterSettings {
    pub fn enabled_for(&self, format: SourceFormat) -> bool {
        match self.mode {
            TocFilterMode::On => true,
            TocFilterMode::Off => false,
            TocFilterMode::Auto => format == SourceFormat::WordProcessor,
        }
    }
}

/// Effective organization configuration handed to the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParserConfig {
    #[serde(default)]
    pub hierarchy: Vec<LevelDefinition>,
    #[serde(default)]
    pub toc_filter: TocFilterSettings,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            hierarchy: HierarchySchema::default_bylaws().levels().to_vec(),
            toc_filter: TocFilterSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TocFilterOverride {
    pub mode: Option<TocFilterMode>,
    pub window: Option<usize>,
    pub min_entries: Option<usize>,
}

/// Per-document adjustments layered on top of the organization config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentOverride {
    pub hierarchy: Vec<LevelDefinition>,
    pub toc_filter: TocFilterOverride,
}

impl ParserConfig {
    pub fn schema(&self) -> HierarchySchema {
        HierarchySchema::new(self.hierarchy.clone())
    }

    /// A non-empty override hierarchy replaces the organization one
    /// wholesale; TOC settings override field by field.
    pub fn merged(mut self, overrides: &DocumentOverride) -> Self {
        if !overrides.hierarchy.is_empty() {
            self.hierarchy = overrides.hierarchy.clone();
        }
        if let Some(mode) = overrides.toc_filter.mode {
            self.toc_filter.mode = mode;
        }
        if let Some(window) = overrides.toc_filter.window {
            self.toc_filter.window = window;
        }
        if let Some(min_entries) = overrides.toc_filter.min_entries {
            self.toc_filter.min_entries = min_entries;
        }
        self
    }
}

/// Loads the organization config, falling back to the built-in schema
/// when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<ParserConfig> {
    let Some(path) = path else {
        return Ok(ParserConfig::default());
    };

    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

pub fn load_override(path: &Path) -> Result<DocumentOverride> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

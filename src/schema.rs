use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberingStyle {
    Roman,
    Numeric,
    Alpha,
    Literal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDefinition {
    pub level_type: String,
    pub prefix: String,
    pub numbering: NumberingStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation_label: Option<String>,
    /// Position in the owning schema, coarse to fine. Assigned by
    /// `HierarchySchema::new`, never read from configuration.
    #[serde(skip)]
    pub schema_index: usize,
}

impl LevelDefinition {
    pub fn new(level_type: &str, prefix: &str, numbering: NumberingStyle) -> Self {
        Self {
            level_type: level_type.to_string(),
            prefix: prefix.to_string(),
            numbering,
            citation_label: None,
            schema_index: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HierarchySchema {
    levels: Vec<LevelDefinition>,
}

impl HierarchySchema {
    pub fn new(levels: Vec<LevelDefinition>) -> Self {
        let levels = levels
            .into_iter()
            .enumerate()
            .map(|(index, level)| LevelDefinition {
                schema_index: index,
                ..level
            })
            .collect();
        Self { levels }
    }

    /// Article (roman) > Section (numeric) > Subsection "(a)".
    pub fn default_bylaws() -> Self {
        Self::new(vec![
            LevelDefinition::new("article", "Article ", NumberingStyle::Roman),
            LevelDefinition::new("section", "Section ", NumberingStyle::Numeric),
            LevelDefinition {
                citation_label: Some("(".to_string()),
                ..LevelDefinition::new("subsection", "(", NumberingStyle::Alpha)
            },
        ])
    }

    pub fn levels(&self) -> &[LevelDefinition] {
        &self.levels
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MatcherKind {
    LiteralPrefix,
    Roman,
    Arabic,
    Alpha,
}

impl From<NumberingStyle> for MatcherKind {
    fn from(style: NumberingStyle) -> Self {
        match style {
            NumberingStyle::Roman => Self::Roman,
            NumberingStyle::Numeric => Self::Arabic,
            NumberingStyle::Alpha => Self::Alpha,
            NumberingStyle::Literal => Self::LiteralPrefix,
        }
    }
}

impl MatcherKind {
    fn number_pattern(self) -> Option<&'static str> {
        match self {
            Self::LiteralPrefix => None,
            Self::Roman => Some(r"(?:[IVXLCDM]+|[ivxlcdm]+)"),
            Self::Arabic => Some(r"\d+(?:\.\d+)*"),
            Self::Alpha => Some(r"[A-Za-z]"),
        }
    }
}

/// One compiled header pattern. Matches are anchored at line starts and
/// expose the `header`, `prefix` and `number` capture groups.
#[derive(Debug)]
pub struct LevelMatcher {
    pub pattern: Regex,
    pub schema_index: usize,
}

impl LevelMatcher {
    pub fn compile(level: &LevelDefinition) -> Result<Self, ParseError> {
        let kind = MatcherKind::from(level.numbering);
        let source = build_level_pattern(level, kind);
        let pattern = Regex::new(&source).map_err(|source| ParseError::InvalidLevelPattern {
            level_type: level.level_type.clone(),
            source,
        })?;

        Ok(Self {
            pattern,
            schema_index: level.schema_index,
        })
    }
}

fn build_level_pattern(level: &LevelDefinition, kind: MatcherKind) -> String {
    let trimmed = level.prefix.trim();
    let prefix = if trimmed.is_empty() {
        String::from("(?P<prefix>)")
    } else {
        format!("(?P<prefix>(?i:{}))", regex::escape(trimmed))
    };

    match kind.number_pattern() {
        Some(number) => {
            let gap = if !trimmed.is_empty() && level.prefix.ends_with(char::is_whitespace) {
                r"[ \t]+"
            } else {
                r"[ \t]*"
            };
            format!(r"(?m)^[ \t]*(?P<header>{prefix}{gap}(?P<number>{number})\b[.):]?)")
        }
        None => {
            let boundary = if trimmed.ends_with(|ch: char| ch.is_alphanumeric()) {
                r"\b"
            } else {
                ""
            };
            format!(r"(?m)^[ \t]*(?P<header>{prefix}{boundary})")
        }
    }
}

/// A schema with its matchers compiled once. Built per parse call and
/// never shared mutably.
#[derive(Debug)]
pub struct CompiledSchema {
    schema: HierarchySchema,
    matchers: Vec<LevelMatcher>,
}

impl CompiledSchema {
    pub fn compile(schema: &HierarchySchema) -> Result<Self, ParseError> {
        if schema.is_empty() {
            return Err(ParseError::SchemaMissing);
        }

        let matchers = schema
            .levels()
            .iter()
            .map(LevelMatcher::compile)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            schema: schema.clone(),
            matchers,
        })
    }

    pub fn matchers(&self) -> &[LevelMatcher] {
        &self.matchers
    }

    pub fn level(&self, schema_index: usize) -> Option<&LevelDefinition> {
        self.schema.levels().get(schema_index)
    }

    /// True when `content` begins with a header of any configured level.
    pub fn matches_line(&self, content: &str) -> bool {
        self.matchers
            .iter()
            .any(|matcher| matcher.pattern.is_match(content))
    }

    /// Renders the citation piece a level contributes, e.g. `Article IV`
    /// or `(b)`.
    pub fn citation_fragment(&self, schema_index: usize, number: &str) -> String {
        let Some(level) = self.level(schema_index) else {
            return number.to_string();
        };

        let label = level
            .citation_label
            .as_deref()
            .unwrap_or_else(|| level.prefix.trim());

        if level.numbering == NumberingStyle::Literal || number.is_empty() {
            return label.to_string();
        }
        if label.is_empty() {
            return number.to_string();
        }

        match label.chars().last() {
            Some(last) if last.is_alphanumeric() => format!("{label} {number}"),
            Some('(') => format!("{label}{number})"),
            Some('[') => format!("{label}{number}]"),
            _ => format!("{label}{number}"),
        }
    }
}

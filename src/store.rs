use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags, params};
use tracing::{debug, info, warn};

use crate::model::{ParseResult, Section};
use crate::util::now_utc_string;

const DB_SCHEMA_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    pub document_id: String,
    pub file_name: Option<String>,
    pub source: String,
    pub source_sha256: Option<String>,
    pub parsed_at: String,
}

impl DocumentRecord {
    pub fn from_result(result: &ParseResult) -> Self {
        Self {
            document_id: result.document_id.clone(),
            file_name: result.metadata.file_name.clone(),
            source: result.metadata.source.clone(),
            source_sha256: result.metadata.source_sha256.clone(),
            parsed_at: result.metadata.parsed_at.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSummary {
    pub document_id: String,
    pub file_name: Option<String>,
    pub parsed_at: String,
    pub section_count: i64,
    pub locked_count: i64,
}

/// Durable home of each document's section set.
pub trait SectionStore {
    /// Swaps the document's whole section set for `sections`. Readers see
    /// the old set or the new one, never a mix; a failed write keeps the
    /// old set.
    fn replace_sections(&mut self, document: &DocumentRecord, sections: &[Section]) -> Result<()>;

    /// Sections in document order.
    fn load_sections(&self, document_id: &str) -> Result<Vec<Section>>;

    fn locked_section_ids(&self, document_id: &str) -> Result<HashSet<String>>;
}

#[derive(Debug)]
pub struct SqliteSectionStore {
    connection: Connection,
}

impl SqliteSectionStore {
    pub fn open(path: &Path) -> Result<Self> {
        let connection =
            Connection::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        configure_connection(&connection)?;
        ensure_schema(&connection)?;
        Ok(Self { connection })
    }

    /// Read-side open: never creates the file or touches the schema. A
    /// missing database is logged and reported as `None`.
    pub fn open_existing(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            warn!(path = %path.display(), "database file missing");
            return Ok(None);
        }

        let connection = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .with_context(|| format!("failed to open {} read-only", path.display()))?;
        let version = connection
            .query_row(
                "SELECT value FROM metadata WHERE key = 'db_schema_version'",
                [],
                |row| row.get::<_, String>(0),
            )
            .with_context(|| format!("{} is not a section store", path.display()))?;
        if version != DB_SCHEMA_VERSION {
            warn!(path = %path.display(), found = %version, expected = DB_SCHEMA_VERSION, "schema version mismatch");
        } else {
            debug!(path = %path.display(), version = %version, "opened section store read-only");
        }

        Ok(Some(Self { connection }))
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let connection = Connection::open_in_memory().context("failed to open in-memory db")?;
        ensure_schema(&connection)?;
        Ok(Self { connection })
    }

    pub fn document_summaries(&self) -> Result<Vec<DocumentSummary>> {
        let mut statement = self.connection.prepare(
            "
            SELECT
              d.document_id,
              d.file_name,
              d.parsed_at,
              (SELECT COUNT(*) FROM sections s WHERE s.document_id = d.document_id),
              (SELECT COUNT(*) FROM section_locks l WHERE l.document_id = d.document_id)
            FROM documents d
            ORDER BY d.document_id
            ",
        )?;

        let mut rows = statement.query([])?;
        let mut summaries = Vec::new();
        while let Some(row) = rows.next()? {
            summaries.push(DocumentSummary {
                document_id: row.get(0)?,
                file_name: row.get(1)?,
                parsed_at: row.get(2)?,
                section_count: row.get(3)?,
                locked_count: row.get(4)?,
            });
        }

        Ok(summaries)
    }
}

impl SectionStore for SqliteSectionStore {
    fn replace_sections(&mut self, document: &DocumentRecord, sections: &[Section]) -> Result<()> {
        let tx = self
            .connection
            .transaction()
            .context("failed to begin section replace transaction")?;

        tx.execute(
            "
            INSERT INTO documents(document_id, file_name, source, source_sha256, parsed_at)
            VALUES(?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(document_id) DO UPDATE SET
              file_name=excluded.file_name,
              source=excluded.source,
              source_sha256=excluded.source_sha256,
              parsed_at=excluded.parsed_at
            ",
            params![
                document.document_id,
                document.file_name,
                document.source,
                document.source_sha256,
                document.parsed_at,
            ],
        )
        .with_context(|| format!("failed to upsert document {}", document.document_id))?;

        tx.execute(
            "DELETE FROM sections WHERE document_id = ?1",
            params![document.document_id],
        )
        .with_context(|| format!("failed to clear sections for {}", document.document_id))?;

        {
            let mut statement = tx.prepare(
                "
                INSERT INTO sections(
                  document_id, section_id, citation, level_type, depth_ordinal,
                  parent_id, document_order, heading, title, text, is_synthetic
                )
                VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                ",
            )?;

            for section in sections {
                statement
                    .execute(params![
                        document.document_id,
                        section.id,
                        section.citation,
                        section.level_type,
                        section.depth_ordinal as i64,
                        section.parent_id,
                        section.document_order as i64,
                        section.heading,
                        section.title,
                        section.text,
                        section.is_synthetic,
                    ])
                    .with_context(|| {
                        format!(
                            "failed to insert section {} ({}) for {}",
                            section.id, section.citation, document.document_id
                        )
                    })?;
            }
        }

        tx.commit()
            .with_context(|| format!("failed to commit sections for {}", document.document_id))?;

        info!(
            document_id = %document.document_id,
            sections = sections.len(),
            "replaced section set"
        );

        Ok(())
    }

    fn load_sections(&self, document_id: &str) -> Result<Vec<Section>> {
        let mut statement = self.connection.prepare(
            "
            SELECT
              section_id, citation, level_type, depth_ordinal, parent_id,
              document_order, heading, title, text, is_synthetic
            FROM sections
            WHERE document_id = ?1
            ORDER BY document_order
            ",
        )?;

        let mut rows = statement.query(params![document_id])?;
        let mut sections = Vec::new();
        while let Some(row) = rows.next()? {
            sections.push(Section {
                id: row.get(0)?,
                citation: row.get(1)?,
                level_type: row.get(2)?,
                depth_ordinal: row.get::<_, i64>(3)? as usize,
                parent_id: row.get(4)?,
                document_order: row.get::<_, i64>(5)? as usize,
                heading: row.get(6)?,
                title: row.get(7)?,
                text: row.get(8)?,
                is_synthetic: row.get(9)?,
            });
        }

        Ok(sections)
    }

    fn locked_section_ids(&self, document_id: &str) -> Result<HashSet<String>> {
        let mut statement = self
            .connection
            .prepare("SELECT section_id FROM section_locks WHERE document_id = ?1")?;
        let ids = statement
            .query_map(params![document_id], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<HashSet<String>>>()?;
        Ok(ids)
    }
}

fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

fn ensure_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(
            "
            CREATE TABLE IF NOT EXISTS metadata (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS documents (
              document_id TEXT PRIMARY KEY,
              file_name TEXT,
              source TEXT NOT NULL,
              source_sha256 TEXT,
              parsed_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS sections (
              document_id TEXT NOT NULL,
              section_id TEXT NOT NULL,
              citation TEXT NOT NULL,
              level_type TEXT NOT NULL,
              depth_ordinal INTEGER NOT NULL,
              parent_id TEXT,
              document_order INTEGER NOT NULL,
              heading TEXT NOT NULL,
              title TEXT,
              text TEXT NOT NULL,
              is_synthetic INTEGER NOT NULL DEFAULT 0,
              PRIMARY KEY(document_id, section_id),
              UNIQUE(document_id, citation),
              FOREIGN KEY(document_id) REFERENCES documents(document_id)
            );

            CREATE TABLE IF NOT EXISTS section_locks (
              document_id TEXT NOT NULL,
              section_id TEXT NOT NULL,
              locked_by TEXT,
              locked_at TEXT,
              PRIMARY KEY(document_id, section_id)
            );

            CREATE INDEX IF NOT EXISTS idx_sections_doc_order ON sections(document_id, document_order);
            CREATE INDEX IF NOT EXISTS idx_sections_doc_parent ON sections(document_id, parent_id);
            ",
        )
        .context("failed to initialize section store schema")?;

    let now = now_utc_string();
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('db_schema_version', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![DB_SCHEMA_VERSION],
    )?;
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('schema_updated_at', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![now],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests;

use rusqlite::params;
use tempfile::tempdir;

use super::*;
use crate::config::ParserConfig;
use crate::parser::parse_document;
use crate::source::{SourceFormat, TextSource};

fn record(document_id: &str) -> DocumentRecord {
    DocumentRecord {
        document_id: document_id.to_string(),
        file_name: Some(format!("{document_id}.txt")),
        source: "inline".to_string(),
        source_sha256: None,
        parsed_at: "2024-01-01T00:00:00Z".to_string(),
    }
}

fn parsed(text: &str) -> Vec<Section> {
    let result = parse_document(
        &TextSource::new(text, SourceFormat::PlainText),
        &ParserConfig::default(),
    );
    assert!(result.success);
    result.sections
}

#[test]
fn replaced_sections_load_back_in_document_order() {
    let mut store = SqliteSectionStore::open_in_memory().expect("store opens");
    let sections = parsed("Intro\nArticle I Name\nSection 1. Short - Body.\nSection 2. Long\nArticle II");

    store
        .replace_sections(&record("bylaws"), &sections)
        .expect("replace succeeds");

    let loaded = store.load_sections("bylaws").expect("load succeeds");
    assert_eq!(loaded, sections);
    assert!(store.load_sections("other").expect("load succeeds").is_empty());
}

#[test]
fn replacement_discards_previous_set() {
    let mut store = SqliteSectionStore::open_in_memory().expect("store opens");
    store
        .replace_sections(&record("bylaws"), &parsed("Article I\nSection 1.\nSection 2."))
        .expect("first replace");

    let second = parsed("Article I\nSection 1. Only");
    store
        .replace_sections(&record("bylaws"), &second)
        .expect("second replace");

    assert_eq!(store.load_sections("bylaws").expect("load"), second);
}

#[test]
fn failed_replacement_keeps_previous_set() {
    let mut store = SqliteSectionStore::open_in_memory().expect("store opens");
    let original = parsed("Article I\nSection 1. Text");
    store
        .replace_sections(&record("bylaws"), &original)
        .expect("first replace");

    // Two sections with one citation violate the per-document uniqueness.
    let mut broken = parsed("Article I\nSection 1. Text\nSection 2. More");
    broken[2].citation = broken[1].citation.clone();

    assert!(store.replace_sections(&record("bylaws"), &broken).is_err());
    assert_eq!(store.load_sections("bylaws").expect("load"), original);
}

#[test]
fn locks_and_summaries_are_reported_per_document() {
    let dir = tempdir().expect("tempdir");
    let db_path = dir.path().join("govdoc.sqlite");

    {
        let mut store = SqliteSectionStore::open(&db_path).expect("store opens");
        store
            .replace_sections(&record("bylaws"), &parsed("Article I\nSection 1. Text\nSection 2. More"))
            .expect("replace bylaws");
        store
            .replace_sections(&record("charter"), &parsed("Article I\nArticle II"))
            .expect("replace charter");
        store
            .connection
            .execute(
                "INSERT INTO section_locks(document_id, section_id, locked_by, locked_at)
                 VALUES(?1, ?2, ?3, ?4)",
                params!["bylaws", "s0001", "secretary", "2024-01-02T00:00:00Z"],
            )
            .expect("lock inserted");
    }

    let store = SqliteSectionStore::open(&db_path).expect("store reopens");
    assert_eq!(
        store.locked_section_ids("bylaws").expect("locks"),
        HashSet::from(["s0001".to_string()])
    );
    assert!(store.locked_section_ids("charter").expect("locks").is_empty());

    let summaries = store.document_summaries().expect("summaries");
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].document_id, "bylaws");
    assert_eq!(summaries[0].section_count, 3);
    assert_eq!(summaries[0].locked_count, 1);
    assert_eq!(summaries[1].document_id, "charter");
    assert_eq!(summaries[1].section_count, 2);
    assert_eq!(summaries[1].file_name.as_deref(), Some("charter.txt"));
}

#[test]
fn record_copies_envelope_metadata() {
    let result = parse_document(
        &TextSource::new("Article I", SourceFormat::PlainText).with_file_name("policy.txt"),
        &ParserConfig::default(),
    );
    let document = DocumentRecord::from_result(&result);

    assert_eq!(document.document_id, "policy");
    assert_eq!(document.file_name.as_deref(), Some("policy.txt"));
    assert_eq!(document.source, "inline");
    assert_eq!(document.source_sha256.as_ref().map(String::len), Some(64));
}

#[test]
fn read_side_open_never_creates_database() {
    let dir = tempdir().expect("tempdir");
    let db_path = dir.path().join("missing.sqlite");

    let store = SqliteSectionStore::open_existing(&db_path).expect("missing file is not an error");

    assert!(store.is_none());
    assert!(!db_path.exists());
}

#[test]
fn read_side_open_leaves_metadata_untouched() {
    let dir = tempdir().expect("tempdir");
    let db_path = dir.path().join("govdoc.sqlite");
    let sections = parsed("Article I\nSection 1. Text");

    let updated_at = {
        let mut store = SqliteSectionStore::open(&db_path).expect("store opens");
        store
            .replace_sections(&record("bylaws"), &sections)
            .expect("replace succeeds");
        store
            .connection
            .execute(
                "UPDATE metadata SET value = 'sentinel' WHERE key = 'schema_updated_at'",
                [],
            )
            .expect("metadata updated");
        "sentinel".to_string()
    };

    let store = SqliteSectionStore::open_existing(&db_path)
        .expect("store opens")
        .expect("file exists");
    assert_eq!(store.load_sections("bylaws").expect("load"), sections);

    let stored: String = store
        .connection
        .query_row(
            "SELECT value FROM metadata WHERE key = 'schema_updated_at'",
            [],
            |row| row.get(0),
        )
        .expect("metadata row");
    assert_eq!(stored, updated_at);
}

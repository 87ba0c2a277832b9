use std::fs;

use tempfile::tempdir;

use super::*;
use crate::config::ParserConfig;

fn parse_file(path: &Path) -> ParseResult {
    parse_document(&FileSource::new(path, None), &ParserConfig::default())
}

#[test]
fn same_stem_in_different_directories_is_refused() {
    let dir = tempdir().expect("tempdir");
    let first = dir.path().join("a").join("bylaws.txt");
    let second = dir.path().join("b").join("bylaws.md");
    for path in [&first, &second] {
        fs::create_dir_all(path.parent().expect("has parent")).expect("dir created");
        fs::write(path, "Article I\nSection 1. Text").expect("input written");
    }

    let results = vec![parse_file(&first), parse_file(&second)];
    assert_eq!(results[0].document_id, results[1].document_id);

    let err = ensure_unique_document_ids(&results).expect_err("collision is refused");
    let message = err.to_string();
    assert!(message.contains("'bylaws'"), "{message}");
    assert!(message.contains("bylaws.txt") && message.contains("bylaws.md"), "{message}");
}

#[test]
fn distinct_stems_pass() {
    let dir = tempdir().expect("tempdir");
    let bylaws = dir.path().join("bylaws.txt");
    let charter = dir.path().join("charter.txt");
    fs::write(&bylaws, "Article I").expect("input written");
    fs::write(&charter, "Article I").expect("input written");

    let results = vec![parse_file(&bylaws), parse_file(&charter)];
    assert!(ensure_unique_document_ids(&results).is_ok());
}

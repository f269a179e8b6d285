use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use organizer_engine::{write_enrichment_report, write_file, EnrichmentReport, PersistError};
use tempfile::TempDir;

#[test]
fn rewriting_the_document_replaces_it() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("podcasts.md");

    let first = write_file(&target, "# My Podcasts\n").unwrap();
    assert_eq!(first, target);
    assert_eq!(fs::read_to_string(&first).unwrap(), "# My Podcasts\n");

    let second = write_file(&target, "# Updated\n").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "# Updated\n");

    let leftovers: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
    assert_eq!(leftovers.len(), 1);
}

#[test]
fn file_in_place_of_directory_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let result = write_file(&file_path.join("podcasts.md"), "data");

    assert!(matches!(result, Err(PersistError::OutputDir { .. })));
    assert_eq!(fs::read_to_string(&file_path).unwrap(), "x");
}

#[test]
fn path_without_file_name_is_rejected() {
    assert!(matches!(
        write_file(Path::new("/"), "data"),
        Err(PersistError::NoFileName(_))
    ));
}

#[test]
fn write_file_creates_parent_directories() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("docs").join("podcasts.md");

    let written = write_file(&target, "hello").unwrap();

    assert_eq!(written, target);
    assert_eq!(fs::read_to_string(&target).unwrap(), "hello");
}

#[test]
fn enrichment_report_is_pretty_json() {
    let temp = TempDir::new().unwrap();
    let mut categories = BTreeMap::new();
    categories.insert("Technology".to_string(), vec![0, 2]);
    let report = EnrichmentReport {
        provider: "claude".into(),
        categories,
        categorized: 2,
        uncategorized: 1,
        failed_batches: 0,
        ..EnrichmentReport::default()
    };

    let path = write_enrichment_report(&temp.path().join("report.json"), &report).unwrap();

    let text = fs::read_to_string(path).unwrap();
    assert!(text.contains("\n  \"provider\": \"claude\""));
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["categories"]["Technology"], serde_json::json!([0, 2]));
    assert_eq!(value["uncategorized"], 1);
    assert_eq!(value["tags"]["fallback"], 0);
}

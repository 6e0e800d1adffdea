//! Integration tests for `FsDocumentRepository` against a real directory.

use std::fs;

use mapcampaigner_core::error::DomainError;
use mapcampaigner_core::repository::DocumentRepository;
use mapcampaigner_store::{FsDocumentRepository, StoreConfig};
use tempfile::TempDir;

fn repository() -> (FsDocumentRepository, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let repo = FsDocumentRepository::open(&StoreConfig::new(temp_dir.path())).unwrap();
    (repo, temp_dir)
}

#[test]
fn test_open_creates_campaign_directory() {
    let temp_dir = TempDir::new().unwrap();
    let config = StoreConfig::new(temp_dir.path().join("data"));

    let repo = FsDocumentRepository::open(&config).unwrap();

    assert!(repo.dir().is_dir());
    assert_eq!(repo.dir(), config.campaign_dir());
}

#[test]
fn test_create_writes_named_json_file() {
    // Arrange
    let (repo, _temp_dir) = repository();

    // Act
    repo.create_document("c1", "{\"uuid\":\"c1\"}").unwrap();

    // Assert
    let written = fs::read_to_string(repo.dir().join("c1.json")).unwrap();
    assert_eq!(written, "{\"uuid\":\"c1\"}");
}

#[test]
fn test_load_returns_contents_and_modification_time() {
    let (repo, _temp_dir) = repository();
    let written_at = repo.create_document("c1", "{}").unwrap();

    let stored = repo.load_document("c1").unwrap();

    assert_eq!(stored.id, "c1");
    assert_eq!(stored.contents, "{}");
    assert_eq!(stored.modified_at, written_at);
}

#[test]
fn test_load_missing_document_returns_does_not_exist() {
    let (repo, _temp_dir) = repository();

    match repo.load_document("missing") {
        Err(DomainError::DoesNotExist(id)) => assert_eq!(id, "missing"),
        other => panic!("expected DoesNotExist, got {other:?}"),
    }
}

#[test]
fn test_create_refuses_to_overwrite() {
    let (repo, _temp_dir) = repository();
    repo.create_document("c1", "first").unwrap();

    let result = repo.create_document("c1", "second");

    assert!(matches!(result, Err(DomainError::AlreadyExists(_))));
    assert_eq!(repo.load_document("c1").unwrap().contents, "first");
}

#[test]
fn test_concurrent_creates_admit_a_single_winner() {
    // Arrange
    let (repo, _temp_dir) = repository();

    // Act
    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|n| {
                let repo = &repo;
                scope.spawn(move || repo.create_document("c1", &format!("writer {n}")))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    // Assert
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, DomainError::AlreadyExists(_)))
    );
    let names: Vec<String> = fs::read_dir(repo.dir())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, vec!["c1.json".to_owned()]);
}

#[test]
fn test_refused_create_leaves_no_temp_files() {
    let (repo, _temp_dir) = repository();
    repo.create_document("c1", "first").unwrap();

    let _ = repo.create_document("c1", "second");

    assert_eq!(fs::read_dir(repo.dir()).unwrap().count(), 1);
}

#[test]
fn test_load_non_utf8_document_reports_corruption() {
    let (repo, _temp_dir) = repository();
    fs::write(repo.dir().join("c1.json"), [0xFF, 0xFE, b'{']).unwrap();

    match repo.load_document("c1") {
        Err(DomainError::CorruptedFile { id, .. }) => assert_eq!(id, "c1"),
        other => panic!("expected CorruptedFile, got {other:?}"),
    }
}

#[test]
fn test_save_replaces_contents_without_leaving_temp_files() {
    let (repo, _temp_dir) = repository();
    repo.create_document("c1", "first").unwrap();

    repo.save_document("c1", "second").unwrap();

    assert_eq!(repo.load_document("c1").unwrap().contents, "second");
    let names: Vec<String> = fs::read_dir(repo.dir())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, vec!["c1.json".to_owned()]);
}

#[test]
fn test_list_ids_returns_sorted_json_stems_only() {
    // Arrange
    let (repo, _temp_dir) = repository();
    repo.create_document("b", "{}").unwrap();
    repo.create_document("a", "{}").unwrap();
    fs::write(repo.dir().join("notes.txt"), "ignored").unwrap();
    fs::write(repo.dir().join(".pending.tmp"), "ignored").unwrap();
    fs::create_dir(repo.dir().join("nested.json")).unwrap();

    // Act
    let ids = repo.list_ids().unwrap();

    // Assert
    assert_eq!(ids, vec!["a".to_owned(), "b".to_owned()]);
}

#[test]
fn test_list_ids_on_missing_directory_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let repo = FsDocumentRepository::new(temp_dir.path().join("absent"));

    assert!(repo.list_ids().unwrap().is_empty());
}

#[test]
fn test_identifiers_cannot_escape_directory() {
    let (repo, _temp_dir) = repository();

    let result = repo.save_document("../escape", "{}");

    assert!(matches!(result, Err(DomainError::InvalidIdentifier(_))));
}

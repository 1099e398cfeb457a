use serde_json::json;
use std::fs;
use subject_catalog::store::{CollectionRef, Fields};
use subject_catalog::{
    delete_themes_for_subject, import_subjects, import_themes, load_subjects, load_themes,
    CatalogError, MemoryStore,
};
use tempfile::{tempdir, TempDir};

fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn seed_theme(store: &MemoryStore, id: &str, subject_id: &str) {
    let mut fields = Fields::new();
    fields.insert("name".to_string(), json!(format!("Theme {}", id)));
    fields.insert("subjectId".to_string(), json!(subject_id));
    store.insert(&CollectionRef::new("themes").doc(id).unwrap(), fields);
}

#[tokio::test]
async fn test_subject_import_round_trip() {
    let dir = tempdir().unwrap();
    let path = write_file(
        &dir,
        "subjects.json",
        r##"[
            {"id": "math", "name": "Mathematics", "description": "Numbers", "color": "#1e88e5"},
            {"id": "history", "name": "History", "description": "The past"},
            {"id": "biology", "name": "Biology", "levels": [1, 2, 3]}
        ]"##,
    );
    let store = MemoryStore::new();

    let subjects = load_subjects(&path).await.unwrap();
    let report = import_subjects(&store, &subjects, 500).await.unwrap();

    assert_eq!(report.written, 3);
    assert_eq!(store.count("subjects"), 3);
    assert_eq!(
        serde_json::Value::Object(store.get("subjects", "math").unwrap()),
        json!({
            "id": "math",
            "name": "Mathematics",
            "description": "Numbers",
            "color": "#1e88e5"
        })
    );
    assert_eq!(
        store.get("subjects", "biology").unwrap().get("levels"),
        Some(&json!([1, 2, 3]))
    );
}

#[tokio::test]
async fn test_subject_reimport_is_idempotent() {
    let dir = tempdir().unwrap();
    let path = write_file(
        &dir,
        "subjects.json",
        r#"[{"id": "math", "name": "Mathematics"}, {"id": "art", "name": "Art"}]"#,
    );
    let store = MemoryStore::new();
    let subjects = load_subjects(&path).await.unwrap();

    import_subjects(&store, &subjects, 500).await.unwrap();
    import_subjects(&store, &subjects, 500).await.unwrap();

    assert_eq!(store.count("subjects"), 2);
    assert_eq!(store.commit_count(), 2);
}

#[tokio::test]
async fn test_theme_import_references_subjects() {
    let dir = tempdir().unwrap();
    let path = write_file(
        &dir,
        "themes.json",
        r#"[
            {"subjectId": "math", "themes": [
                {"id": "fractions", "name": "Fractions"},
                {"id": "geometry", "name": "Geometry"}
            ]},
            {"subjectId": "history", "themes": [
                {"id": "romans", "name": "Romans"}
            ]}
        ]"#,
    );
    let store = MemoryStore::new();

    let themes = load_themes(&path).await.unwrap();
    let report = import_themes(&store, &themes, 500).await.unwrap();

    assert_eq!(report.written, 3);
    assert_eq!(store.count("themes"), 3);
    for (id, subject) in [("fractions", "math"), ("geometry", "math"), ("romans", "history")] {
        assert_eq!(
            store.get("themes", id).unwrap().get("subjectId"),
            Some(&json!(subject)),
            "theme {}",
            id
        );
    }
}

#[tokio::test]
async fn test_delete_removes_only_matching_themes() {
    let store = MemoryStore::new();
    for i in 0..7 {
        seed_theme(&store, &format!("math-{}", i), "math");
    }
    seed_theme(&store, "romans", "history");
    seed_theme(&store, "cells", "biology");

    let report = delete_themes_for_subject(&store, "math", 3).await.unwrap();

    assert_eq!(report.matched, 7);
    assert_eq!(report.deleted, 7);
    assert_eq!(report.batches, 3);
    assert_eq!(store.count("themes"), 2);
    assert!(store.get("themes", "romans").is_some());
    assert!(store.get("themes", "cells").is_some());
}

#[tokio::test]
async fn test_delete_with_no_matches() {
    let store = MemoryStore::new();
    seed_theme(&store, "romans", "history");

    let report = delete_themes_for_subject(&store, "chemistry", 500).await.unwrap();

    assert!(report.nothing_found());
    assert_eq!(report.deleted, 0);
    assert_eq!(store.commit_count(), 0);
    assert_eq!(store.count("themes"), 1);
}

#[tokio::test]
async fn test_delete_after_import() {
    let store = MemoryStore::new();
    let dir = tempdir().unwrap();
    let path = write_file(
        &dir,
        "themes.json",
        r#"{"math": [{"name": "Fractions"}, {"name": "Algebra"}], "art": [{"name": "Colour"}]}"#,
    );

    let themes = load_themes(&path).await.unwrap();
    import_themes(&store, &themes, 500).await.unwrap();
    let report = delete_themes_for_subject(&store, "math", 500).await.unwrap();

    assert_eq!(report.deleted, 2);
    let left = store.documents("themes");
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].fields.get("subjectId"), Some(&json!("art")));
}

#[tokio::test]
async fn test_malformed_files_write_nothing() {
    let dir = tempdir().unwrap();
    let subjects = write_file(&dir, "subjects.json", r#"[{"id": "math", "name": "Math"},"#);
    let themes = write_file(&dir, "themes.json", r#"{"math": [{"name": "Fractions"}"#);

    assert!(matches!(
        load_subjects(&subjects).await,
        Err(CatalogError::MalformedJson(_))
    ));
    assert!(matches!(
        load_themes(&themes).await,
        Err(CatalogError::MalformedJson(_))
    ));
}

#[tokio::test]
async fn test_invalid_record_fails_before_any_write() {
    let dir = tempdir().unwrap();
    let path = write_file(
        &dir,
        "themes.json",
        r#"[{"name": "Fractions", "subjectId": "math"}, {"name": "Orphan"}]"#,
    );

    let err = load_themes(&path).await.unwrap_err();
    assert!(matches!(err, CatalogError::InvalidRecord { index: 1, .. }));
}

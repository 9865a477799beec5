use std::io::Write;
use std::path::Path;

use marquee_api::db::{CatalogStore, LoadError};
use marquee_api::services::recommend;
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn test_load_and_recommend_from_artifacts() {
    let dir = TempDir::new().unwrap();
    let catalog = write_file(
        &dir,
        "movie_list.json",
        r#"[
            {"movie_id": 1, "title": "A"},
            {"movie_id": 2, "title": "B"},
            {"movie_id": 3, "title": "C"},
            {"movie_id": 4, "title": "D"}
        ]"#,
    );
    let similarity = write_file(
        &dir,
        "similarity.json",
        "[[1.0, 0.9, 0.5, 0.2], [0.9, 1.0, 0.3, 0.4], [0.5, 0.3, 1.0, 0.7], [0.2, 0.4, 0.7, 1.0]]",
    );

    let store = CatalogStore::load(&catalog, &similarity).unwrap();
    assert_eq!(store.catalog().len(), 4);

    let titles: Vec<String> = recommend("A", store.catalog(), store.matrix())
        .into_iter()
        .map(|r| r.title)
        .collect();
    assert_eq!(titles, vec!["B", "C", "D"]);
}

#[test]
fn test_load_fails_when_matrix_has_more_rows_than_catalog() {
    let dir = TempDir::new().unwrap();
    let catalog = write_file(
        &dir,
        "movie_list.csv",
        "movie_id,title\n1,A\n2,B\n3,C\n",
    );
    let similarity = write_file(
        &dir,
        "similarity.json",
        "[[1.0, 0.1, 0.2, 0.3], [0.1, 1.0, 0.4, 0.5], [0.2, 0.4, 1.0, 0.6], [0.3, 0.5, 0.6, 1.0]]",
    );

    let err = CatalogStore::load(&catalog, &similarity).unwrap_err();
    assert!(matches!(
        err,
        LoadError::DimensionMismatch { rows: 4, movies: 3 }
    ));
}

#[test]
fn test_load_fails_when_similarity_artifact_missing() {
    let dir = TempDir::new().unwrap();
    let catalog = write_file(&dir, "movie_list.json", r#"[{"movie_id": 1, "title": "A"}]"#);

    let err = CatalogStore::load(&catalog, Path::new("/nonexistent/similarity.json")).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
    assert!(err.to_string().contains("/nonexistent/similarity.json"));
}

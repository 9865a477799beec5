use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::{Catalog, LoadError, SimilarityMatrix};

/// One row of the movie table. Either `movie_id` or `id` names the identifier;
/// `movie_id` wins when both are present.
#[derive(Debug, Deserialize)]
struct CatalogRecord {
    #[serde(default)]
    movie_id: Option<i64>,
    #[serde(default)]
    id: Option<i64>,
    title: String,
}

/// Column-oriented table, `{ column: { row_key: value } }`
#[derive(Debug, Deserialize)]
struct ColumnTable {
    #[serde(default)]
    movie_id: Option<HashMap<String, i64>>,
    #[serde(default)]
    id: Option<HashMap<String, i64>>,
    title: HashMap<String, String>,
}

fn open(path: &Path) -> Result<BufReader<File>, LoadError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn malformed(path: &Path, reason: impl Into<String>) -> LoadError {
    LoadError::MalformedCatalog {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

pub(super) fn read_catalog(path: &Path) -> Result<Catalog, LoadError> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    let entries = if is_csv {
        read_csv_records(path)?
    } else {
        read_json_records(path)?
    };

    if entries.is_empty() {
        return Err(LoadError::EmptyCatalog);
    }

    Ok(Catalog::new(entries))
}

fn records_to_entries(
    path: &Path,
    records: Vec<CatalogRecord>,
) -> Result<Vec<(i64, String)>, LoadError> {
    records
        .into_iter()
        .enumerate()
        .map(|(row, record)| {
            record
                .movie_id
                .or(record.id)
                .map(|id| (id, record.title))
                .ok_or_else(|| malformed(path, format!("row {row} has no movie_id or id")))
        })
        .collect()
}

fn read_csv_records(path: &Path) -> Result<Vec<(i64, String)>, LoadError> {
    let mut reader = csv::Reader::from_reader(open(path)?);
    let records = reader
        .deserialize::<CatalogRecord>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    records_to_entries(path, records)
}

fn read_json_records(path: &Path) -> Result<Vec<(i64, String)>, LoadError> {
    let json_err = |source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    };

    let document: Value = serde_json::from_reader(open(path)?).map_err(json_err)?;

    match document {
        Value::Array(_) => {
            let records: Vec<CatalogRecord> =
                serde_json::from_value(document).map_err(json_err)?;
            records_to_entries(path, records)
        }
        Value::Object(_) => {
            let table: ColumnTable = serde_json::from_value(document).map_err(json_err)?;
            column_table_to_entries(path, table)
        }
        _ => Err(malformed(path, "expected a JSON array or object")),
    }
}

/// Rows of a column table are ordered by their numeric row key.
fn column_table_to_entries(
    path: &Path,
    table: ColumnTable,
) -> Result<Vec<(i64, String)>, LoadError> {
    let ids = table
        .movie_id
        .or(table.id)
        .ok_or_else(|| malformed(path, "missing movie_id or id column"))?;

    if ids.len() != table.title.len() {
        return Err(malformed(
            path,
            format!("{} ids but {} titles", ids.len(), table.title.len()),
        ));
    }

    let mut rows = Vec::with_capacity(ids.len());
    for (key, title) in table.title {
        let position: u64 = key
            .parse()
            .map_err(|_| malformed(path, format!("row key {key:?} is not an integer")))?;
        let id = *ids
            .get(&key)
            .ok_or_else(|| malformed(path, format!("row {key} has a title but no id")))?;
        rows.push((position, id, title));
    }
    rows.sort_by_key(|(position, _, _)| *position);

    // "1" and "01" parse to the same row
    if let Some(pair) = rows.windows(2).find(|pair| pair[0].0 == pair[1].0) {
        return Err(malformed(path, format!("duplicate row position {}", pair[0].0)));
    }

    Ok(rows.into_iter().map(|(_, id, title)| (id, title)).collect())
}

pub(super) fn read_matrix(path: &Path) -> Result<SimilarityMatrix, LoadError> {
    let rows: Vec<Vec<f64>> =
        serde_json::from_reader(open(path)?).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    SimilarityMatrix::from_rows(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn ids_and_titles(catalog: &Catalog) -> Vec<(i64, String)> {
        catalog
            .movies()
            .iter()
            .map(|m| (m.id, m.title.clone()))
            .collect()
    }

    #[test]
    fn test_read_catalog_json_records() {
        let file = write_temp(
            ".json",
            r#"[
                {"movie_id": 19995, "title": "Avatar", "tags": "future space"},
                {"movie_id": 285, "title": "Pirates of the Caribbean: At World's End"}
            ]"#,
        );

        let catalog = read_catalog(file.path()).unwrap();
        assert_eq!(
            ids_and_titles(&catalog),
            vec![
                (19995, "Avatar".to_string()),
                (285, "Pirates of the Caribbean: At World's End".to_string())
            ]
        );
    }

    #[test]
    fn test_read_catalog_accepts_id_column() {
        let file = write_temp(".json", r#"[{"id": 7, "title": "Seven"}]"#);
        let catalog = read_catalog(file.path()).unwrap();
        assert_eq!(catalog.find_by_title("Seven").map(|m| m.id), Some(7));
    }

    #[test]
    fn test_read_catalog_prefers_movie_id_over_id() {
        let file = write_temp(".json", r#"[{"id": 0, "movie_id": 42, "title": "Answer"}]"#);
        let catalog = read_catalog(file.path()).unwrap();
        assert_eq!(catalog.movies()[0].id, 42);
    }

    #[test]
    fn test_read_catalog_column_table_orders_by_numeric_key() {
        let file = write_temp(
            ".json",
            r#"{
                "movie_id": {"0": 100, "2": 300, "10": 1100, "1": 200},
                "title": {"0": "Zero", "2": "Two", "10": "Ten", "1": "One"},
                "tags": {"0": "a", "1": "b", "2": "c", "10": "d"}
            }"#,
        );

        let catalog = read_catalog(file.path()).unwrap();
        let titles: Vec<&str> = catalog.movies().iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Zero", "One", "Two", "Ten"]);
        assert_eq!(catalog.get(3).map(|m| m.id), Some(1100));
    }

    #[test]
    fn test_read_catalog_column_table_length_mismatch() {
        let file = write_temp(
            ".json",
            r#"{"movie_id": {"0": 1, "1": 2}, "title": {"0": "A"}}"#,
        );
        let err = read_catalog(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::MalformedCatalog { .. }));
    }

    #[test]
    fn test_read_catalog_column_table_duplicate_position() {
        let file = write_temp(
            ".json",
            r#"{
                "movie_id": {"1": 10, "01": 20},
                "title": {"1": "First", "01": "Also First"}
            }"#,
        );
        let err = read_catalog(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::MalformedCatalog { .. }));
        assert!(err.to_string().contains("duplicate row position 1"));
    }

    #[test]
    fn test_read_catalog_csv() {
        let file = write_temp(
            ".csv",
            "movie_id,title,tags\n19995,Avatar,space\n285,\"Pirates, Part 3\",sea\n",
        );

        let catalog = read_catalog(file.path()).unwrap();
        assert_eq!(
            ids_and_titles(&catalog),
            vec![
                (19995, "Avatar".to_string()),
                (285, "Pirates, Part 3".to_string())
            ]
        );
    }

    #[test]
    fn test_read_catalog_record_without_id() {
        let file = write_temp(".json", r#"[{"title": "Nameless"}]"#);
        let err = read_catalog(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::MalformedCatalog { .. }));
    }

    #[test]
    fn test_read_catalog_missing_file() {
        let err = read_catalog(Path::new("/nonexistent/movie_list.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_read_catalog_malformed_json() {
        let file = write_temp(".json", "[{\"movie_id\": 1, ");
        let err = read_catalog(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Json { .. }));
    }

    #[test]
    fn test_read_catalog_empty_array() {
        let file = write_temp(".json", "[]");
        let err = read_catalog(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::EmptyCatalog));
    }

    #[test]
    fn test_read_matrix() {
        let file = write_temp(".json", "[[1.0, 0.5], [0.5, 1.0]]");
        let matrix = read_matrix(file.path()).unwrap();
        assert_eq!(matrix.dimension(), 2);
        assert_eq!(matrix.row(0), Some(&[1.0, 0.5][..]));
    }

    #[test]
    fn test_read_matrix_rejects_non_numeric() {
        let file = write_temp(".json", r#"[[1.0, "x"], [0.5, 1.0]]"#);
        let err = read_matrix(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Json { .. }));
    }
}

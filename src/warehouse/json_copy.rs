//! Bulk copy of JSON records from the local filesystem into a SQLite table.
//!
//! This is the local engine's stand-in for the warehouse's native `COPY ...
//! JSON` loader. Sources are read the way the warehouse reads an object-store
//! prefix: every file below the location, each holding one or more
//! concatenated JSON objects.

use crate::statements::{CopySpec, JsonFormat};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};
use serde::Deserialize;
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum CopyError {
    #[error("Unsupported source location {0}: the local engine only reads filesystem paths")]
    UnsupportedLocation(String),

    #[error("No source files match {0}")]
    NoSourceFiles(String),

    #[error("IO error reading {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path:?}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Record {record} in {path:?} is not a JSON object")]
    NotAnObject { path: PathBuf, record: usize },

    #[error("Invalid jsonpaths document {location}: {reason}")]
    InvalidJsonPaths { location: String, reason: String },

    #[error("jsonpaths document has {paths} expressions but table {table} has {columns} columns")]
    ColumnCountMismatch {
        table: String,
        paths: usize,
        columns: usize,
    },

    #[error("Cannot load {value} into {affinity} column {column} (record {record} in {path:?})")]
    Conversion {
        path: PathBuf,
        record: usize,
        column: String,
        affinity: &'static str,
        value: String,
    },

    #[error("Table {0} does not exist")]
    MissingTable(String),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

// =============================================================================
// JSONPath expressions
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    Key(String),
    Index(usize),
}

/// The subset of JSONPath a jsonpaths document may use: `$['key']`,
/// `$["key"]`, `$.key` and `[n]`, chained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    segments: Vec<PathSegment>,
}

impl JsonPath {
    pub fn parse(expression: &str) -> Result<Self, String> {
        let rest = expression
            .trim()
            .strip_prefix('$')
            .ok_or_else(|| format!("{} does not start with $", expression))?;
        let chars: Vec<char> = rest.chars().collect();
        let mut segments = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            match chars[i] {
                '.' => {
                    let start = i + 1;
                    let mut end = start;
                    while end < chars.len() && chars[end] != '.' && chars[end] != '[' {
                        end += 1;
                    }
                    if end == start {
                        return Err(format!("empty key in {}", expression));
                    }
                    segments.push(PathSegment::Key(chars[start..end].iter().collect()));
                    i = end;
                }
                '[' if matches!(chars.get(i + 1), Some(&'\'') | Some(&'"')) => {
                    // The key ends at the matching quote, so it may contain ']'.
                    let quote = chars[i + 1];
                    let start = i + 2;
                    let end = chars[start..]
                        .iter()
                        .position(|c| *c == quote)
                        .map(|p| p + start)
                        .ok_or_else(|| format!("unterminated quote in {}", expression))?;
                    if chars.get(end + 1) != Some(&']') {
                        return Err(format!("expected ] after quoted key in {}", expression));
                    }
                    segments.push(PathSegment::Key(chars[start..end].iter().collect()));
                    i = end + 2;
                }
                '[' => {
                    let close = chars[i..]
                        .iter()
                        .position(|c| *c == ']')
                        .map(|p| p + i)
                        .ok_or_else(|| format!("unclosed [ in {}", expression))?;
                    let inner: String = chars[i + 1..close].iter().collect();
                    let index = inner
                        .parse::<usize>()
                        .map_err(|_| format!("invalid subscript [{}] in {}", inner, expression))?;
                    segments.push(PathSegment::Index(index));
                    i = close + 1;
                }
                other => return Err(format!("unexpected '{}' in {}", other, expression)),
            }
        }

        if segments.is_empty() {
            return Err(format!("{} selects the whole record", expression));
        }
        Ok(Self { segments })
    }

    pub fn select<'a>(&self, record: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(record, |current, segment| match segment {
                PathSegment::Key(key) => current.get(key.as_str()),
                PathSegment::Index(index) => current.get(*index),
            })
    }
}

#[derive(Deserialize)]
struct JsonPathsDocument {
    jsonpaths: Vec<String>,
}

fn load_jsonpaths(location: &str) -> Result<Vec<JsonPath>, CopyError> {
    let path = local_path(location)?;
    let content = std::fs::read_to_string(&path).map_err(|source| CopyError::Io {
        path: path.clone(),
        source,
    })?;
    let document: JsonPathsDocument =
        serde_json::from_str(&content).map_err(|e| CopyError::InvalidJsonPaths {
            location: location.to_string(),
            reason: e.to_string(),
        })?;
    document
        .jsonpaths
        .iter()
        .map(|expression| {
            JsonPath::parse(expression).map_err(|reason| CopyError::InvalidJsonPaths {
                location: location.to_string(),
                reason,
            })
        })
        .collect()
}

// =============================================================================
// Source files
// =============================================================================

fn local_path(location: &str) -> Result<PathBuf, CopyError> {
    if let Some(rest) = location.strip_prefix("file://") {
        if rest.trim().is_empty() {
            return Err(CopyError::UnsupportedLocation(location.to_string()));
        }
        return Ok(PathBuf::from(rest));
    }
    if location.contains("://") {
        return Err(CopyError::UnsupportedLocation(location.to_string()));
    }
    Ok(PathBuf::from(location))
}

fn walk_files(root: &Path) -> Result<Vec<PathBuf>, CopyError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| CopyError::Io {
            path: e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf()),
            source: e.into(),
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Lists the files a location stands for: the file itself, everything below
/// a directory, or every file whose path starts with the location.
pub fn source_files(location: &str) -> Result<Vec<PathBuf>, CopyError> {
    let path = local_path(location)?;
    let mut files = if path.is_file() {
        vec![path]
    } else if path.is_dir() {
        walk_files(&path)?
    } else {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let prefix = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if parent.is_dir() {
            walk_files(parent)?
                .into_iter()
                .filter(|f| {
                    f.strip_prefix(parent)
                        .map(|rel| rel.to_string_lossy().starts_with(&prefix))
                        .unwrap_or(false)
                })
                .collect()
        } else {
            Vec::new()
        }
    };
    files.sort();

    if files.is_empty() {
        return Err(CopyError::NoSourceFiles(location.to_string()));
    }
    Ok(files)
}

// =============================================================================
// Column affinity and value conversion
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Affinity {
    Integer,
    Real,
    Text,
}

impl Affinity {
    fn from_declared_type(declared: &str) -> Self {
        let declared = declared.to_ascii_uppercase();
        if declared.contains("INT") {
            Affinity::Integer
        } else if declared.contains("REAL") || declared.contains("FLOA") || declared.contains("DOUB")
        {
            Affinity::Real
        } else {
            Affinity::Text
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Affinity::Integer => "INTEGER",
            Affinity::Real => "REAL",
            Affinity::Text => "TEXT",
        }
    }
}

struct TableColumn {
    name: String,
    affinity: Affinity,
}

fn table_columns(conn: &Connection, table: &str) -> Result<Vec<TableColumn>, CopyError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", table))?;
    let columns = stmt
        .query_map([], |row| {
            let name: String = row.get(1)?;
            let declared: String = row.get(2)?;
            Ok(TableColumn {
                name,
                affinity: Affinity::from_declared_type(&declared),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    if columns.is_empty() {
        return Err(CopyError::MissingTable(table.to_string()));
    }
    Ok(columns)
}

fn integral(f: f64) -> Option<i64> {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Converts one JSON value for a column, `None` when it cannot be loaded.
fn to_sql_value(value: Option<&Value>, affinity: Affinity) -> Option<SqlValue> {
    let value = match value {
        None | Some(Value::Null) => return Some(SqlValue::Null),
        Some(v) => v,
    };
    match affinity {
        Affinity::Integer => match value {
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(SqlValue::Integer(i)),
                None => n.as_f64().and_then(integral).map(SqlValue::Integer),
            },
            Value::String(s) if s.trim().is_empty() => Some(SqlValue::Null),
            Value::String(s) => {
                let s = s.trim();
                if let Ok(i) = s.parse::<i64>() {
                    Some(SqlValue::Integer(i))
                } else {
                    s.parse::<f64>().ok().and_then(integral).map(SqlValue::Integer)
                }
            }
            Value::Bool(b) => Some(SqlValue::Integer(*b as i64)),
            _ => None,
        },
        Affinity::Real => match value {
            Value::Number(n) => n.as_f64().map(SqlValue::Real),
            Value::String(s) if s.trim().is_empty() => Some(SqlValue::Null),
            Value::String(s) => s.trim().parse::<f64>().ok().map(SqlValue::Real),
            _ => None,
        },
        Affinity::Text => match value {
            Value::String(s) => Some(SqlValue::Text(s.clone())),
            other => Some(SqlValue::Text(other.to_string())),
        },
    }
}

// =============================================================================
// Copy
// =============================================================================

/// Loads every record of `spec.source` into `table`, returning the row count.
pub fn copy_into(conn: &Connection, table: &str, spec: &CopySpec) -> Result<usize, CopyError> {
    let columns = table_columns(conn, table)?;

    let paths = match &spec.format {
        JsonFormat::Auto => None,
        JsonFormat::JsonPaths(location) => {
            let paths = load_jsonpaths(location)?;
            if paths.len() != columns.len() {
                return Err(CopyError::ColumnCountMismatch {
                    table: table.to_string(),
                    paths: paths.len(),
                    columns: columns.len(),
                });
            }
            Some(paths)
        }
    };

    let files = source_files(&spec.source)?;

    let column_list = columns
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=columns.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    let mut insert = conn.prepare(&format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table, column_list, placeholders
    ))?;

    let mut rows = 0;
    for file_path in &files {
        let file = File::open(file_path).map_err(|source| CopyError::Io {
            path: file_path.clone(),
            source,
        })?;
        let stream = serde_json::Deserializer::from_reader(BufReader::new(file)).into_iter::<Value>();
        let mut file_rows = 0;

        for (index, record) in stream.enumerate() {
            let record_number = index + 1;
            let record = record.map_err(|source| CopyError::Json {
                path: file_path.clone(),
                source,
            })?;
            if !record.is_object() {
                return Err(CopyError::NotAnObject {
                    path: file_path.clone(),
                    record: record_number,
                });
            }

            let mut values = Vec::with_capacity(columns.len());
            for (position, column) in columns.iter().enumerate() {
                let raw = match &paths {
                    Some(paths) => paths[position].select(&record),
                    None => record.get(column.name.as_str()),
                };
                let value = to_sql_value(raw, column.affinity).ok_or_else(|| {
                    CopyError::Conversion {
                        path: file_path.clone(),
                        record: record_number,
                        column: column.name.clone(),
                        affinity: column.affinity.name(),
                        value: raw.map(|v| v.to_string()).unwrap_or_default(),
                    }
                })?;
                values.push(value);
            }

            insert.execute(params_from_iter(values))?;
            file_rows += 1;
        }

        debug!("Read {} records from {:?}", file_rows, file_path);
        rows += file_rows;
    }

    info!(
        "Copied {} rows into {} from {} file(s) under {}",
        rows,
        table,
        files.len(),
        spec.source
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn spec(source: &Path, format: JsonFormat) -> CopySpec {
        CopySpec {
            source: source.to_string_lossy().to_string(),
            format,
            iam_role_arn: String::new(),
            region: "us-west-2".to_string(),
        }
    }

    #[test]
    fn test_parse_bracket_and_dot_paths() {
        let record = json!({"artist": "A", "meta": {"tags": ["x", "y"]}, "first name": "Ada"});

        let path = JsonPath::parse("$['artist']").unwrap();
        assert_eq!(path.select(&record), Some(&json!("A")));

        let path = JsonPath::parse("$.meta.tags[1]").unwrap();
        assert_eq!(path.select(&record), Some(&json!("y")));

        let path = JsonPath::parse("$[\"first name\"]").unwrap();
        assert_eq!(path.select(&record), Some(&json!("Ada")));

        let path = JsonPath::parse("$['missing']").unwrap();
        assert_eq!(path.select(&record), None);
    }

    #[test]
    fn test_parse_rejects_invalid_paths() {
        assert!(JsonPath::parse("artist").is_err());
        assert!(JsonPath::parse("$").is_err());
        assert!(JsonPath::parse("$['artist'").is_err());
        assert!(JsonPath::parse("$[abc]").is_err());
        assert!(JsonPath::parse("$..x").is_err());
        assert!(JsonPath::parse("$['a'x]").is_err());
    }

    #[test]
    fn test_quoted_key_may_contain_brackets() {
        let record = json!({"a]b": 1, "c[d]": {"e": 2}});

        let path = JsonPath::parse("$['a]b']").unwrap();
        assert_eq!(path.select(&record), Some(&json!(1)));

        let path = JsonPath::parse("$[\"c[d]\"].e").unwrap();
        assert_eq!(path.select(&record), Some(&json!(2)));
    }

    #[test]
    fn test_integer_conversion() {
        let to_int = |v: Value| to_sql_value(Some(&v), Affinity::Integer);
        assert_eq!(to_int(json!(7)), Some(SqlValue::Integer(7)));
        assert_eq!(to_int(json!("7")), Some(SqlValue::Integer(7)));
        assert_eq!(to_int(json!("")), Some(SqlValue::Null));
        assert_eq!(
            to_int(json!(1540919166796.0)),
            Some(SqlValue::Integer(1540919166796))
        );
        assert_eq!(to_int(json!("abc")), None);
        assert_eq!(to_int(json!(1.5)), None);
        assert_eq!(to_int(json!("1.5")), None);
        assert_eq!(to_int(json!([1])), None);
        assert_eq!(to_sql_value(None, Affinity::Integer), Some(SqlValue::Null));
    }

    #[test]
    fn test_real_and_text_conversion() {
        assert_eq!(
            to_sql_value(Some(&json!("2.5")), Affinity::Real),
            Some(SqlValue::Real(2.5))
        );
        assert_eq!(
            to_sql_value(Some(&json!(null)), Affinity::Real),
            Some(SqlValue::Null)
        );
        assert_eq!(
            to_sql_value(Some(&json!("")), Affinity::Text),
            Some(SqlValue::Text(String::new()))
        );
        assert_eq!(
            to_sql_value(Some(&json!(42)), Affinity::Text),
            Some(SqlValue::Text("42".to_string()))
        );
    }

    #[test]
    fn test_source_files_directory_and_prefix() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("song_data/A/B")).unwrap();
        fs::write(dir.path().join("song_data/A/B/TRAAA.json"), "{}").unwrap();
        fs::write(dir.path().join("song_data/A/TRAAB.json"), "{}").unwrap();
        fs::write(dir.path().join("log_data-2018-11-01.json"), "{}").unwrap();
        fs::write(dir.path().join("log_data-2018-11-02.json"), "{}").unwrap();
        fs::write(dir.path().join("other.json"), "{}").unwrap();

        let files = source_files(&dir.path().join("song_data").to_string_lossy()).unwrap();
        assert_eq!(files.len(), 2);

        let prefix = dir.path().join("log_data");
        let files = source_files(&format!("file://{}", prefix.to_string_lossy())).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("log_data-2018-11-01.json"));
    }

    #[test]
    fn test_source_files_errors() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            source_files("s3://udacity-dend/song_data"),
            Err(CopyError::UnsupportedLocation(_))
        ));
        assert!(matches!(
            source_files(&dir.path().join("nothing").to_string_lossy()),
            Err(CopyError::NoSourceFiles(_))
        ));
        assert!(matches!(
            source_files("file://"),
            Err(CopyError::UnsupportedLocation(_))
        ));
    }

    #[test]
    fn test_copy_auto_matches_column_names() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("songs.json");
        fs::write(
            &source,
            r#"{"song_id": "S1", "title": "One", "extra": true}
               {"title": "Two", "song_id": "S2", "duration": 12.5}"#,
        )
        .unwrap();

        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (song_id TEXT, title TEXT, duration REAL)")
            .unwrap();

        let rows = copy_into(&conn, "t", &spec(&source, JsonFormat::Auto)).unwrap();
        assert_eq!(rows, 2);

        let missing: i64 = conn
            .query_row("SELECT COUNT(*) FROM t WHERE duration IS NULL", [], |r| r.get(0))
            .unwrap();
        assert_eq!(missing, 1);
    }

    #[test]
    fn test_copy_jsonpaths_maps_by_position() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("events.json");
        fs::write(&source, r#"{"userId": "", "firstName": "Ada"}"#).unwrap();
        let jsonpaths = dir.path().join("paths.json");
        fs::write(
            &jsonpaths,
            r#"{"jsonpaths": ["$['firstName']", "$['userId']"]}"#,
        )
        .unwrap();

        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (first_name TEXT, user_id INTEGER)")
            .unwrap();

        let format = JsonFormat::JsonPaths(jsonpaths.to_string_lossy().to_string());
        copy_into(&conn, "t", &spec(&source, format)).unwrap();

        let (name, user_id): (String, Option<i64>) = conn
            .query_row("SELECT first_name, user_id FROM t", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(name, "Ada");
        assert_eq!(user_id, None);
    }

    #[test]
    fn test_copy_jsonpaths_column_count_mismatch() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("events.json");
        fs::write(&source, "{}").unwrap();
        let jsonpaths = dir.path().join("paths.json");
        fs::write(&jsonpaths, r#"{"jsonpaths": ["$['a']"]}"#).unwrap();

        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (a TEXT, b TEXT)").unwrap();

        let format = JsonFormat::JsonPaths(jsonpaths.to_string_lossy().to_string());
        let err = copy_into(&conn, "t", &spec(&source, format)).unwrap_err();
        assert!(matches!(
            err,
            CopyError::ColumnCountMismatch {
                paths: 1,
                columns: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_copy_rejects_non_object_records_and_bad_values() {
        let dir = TempDir::new().unwrap();
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (year INTEGER)").unwrap();

        let source = dir.path().join("array.json");
        fs::write(&source, "[1, 2]").unwrap();
        let err = copy_into(&conn, "t", &spec(&source, JsonFormat::Auto)).unwrap_err();
        assert!(matches!(err, CopyError::NotAnObject { record: 1, .. }));

        let source = dir.path().join("bad.json");
        fs::write(&source, r#"{"year": "nineteen"}"#).unwrap();
        let err = copy_into(&conn, "t", &spec(&source, JsonFormat::Auto)).unwrap_err();
        assert!(matches!(err, CopyError::Conversion { .. }));
        assert!(err.to_string().contains("year"));
    }

    #[test]
    fn test_copy_into_missing_table() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("songs.json");
        fs::write(&source, "{}").unwrap();

        let conn = Connection::open_in_memory().unwrap();
        let err = copy_into(&conn, "staging_songs", &spec(&source, JsonFormat::Auto)).unwrap_err();
        assert!(matches!(err, CopyError::MissingTable(_)));
    }
}

//! Dataset File Round-Trip Tests
//!
//! Saves datasets to scratch files, reads them back and checks that schema
//! and values survive, and that malformed files are rejected with the
//! right error.

use chrono::NaiveDate;
use kuntadata::{load_dataset, save_dataset, Column, ColumnType, Dataset, Error, Value};

fn all_types() -> Dataset {
    let mut ds = Dataset::new(vec![
        Column::new("id", ColumnType::Int64),
        Column::new("share", ColumnType::Float64),
        Column::new("name", ColumnType::Object),
        Column::new("coastal", ColumnType::Bool),
        Column::new("updated", ColumnType::DateTime),
        Column::new("kind", ColumnType::Category),
    ])
    .unwrap();
    let ts = NaiveDate::from_ymd_opt(2024, 3, 31)
        .unwrap()
        .and_hms_milli_opt(12, 30, 5, 250)
        .unwrap();
    ds.push_row(vec![
        Value::Int(91),
        Value::Float(0.1 + 0.2),
        "Helsinki".into(),
        Value::Bool(true),
        Value::DateTime(ts),
        "city".into(),
    ])
    .unwrap();
    ds.push_row(vec![
        Value::Int(-7),
        Value::Float(1.0e-12),
        "Ähtäri".into(),
        Value::Bool(false),
        Value::Null,
        "town".into(),
    ])
    .unwrap();
    ds.push_row(vec![
        Value::Int(i64::MAX),
        Value::Null,
        Value::Null,
        Value::Null,
        Value::DateTime(NaiveDate::from_ymd_opt(1999, 12, 31).unwrap().and_hms_opt(0, 0, 0).unwrap()),
        Value::Null,
    ])
    .unwrap();
    ds
}

#[test]
fn test_round_trip_preserves_schema_and_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("all_types.csv");
    let original = all_types();

    save_dataset(&path, &original).unwrap();
    let loaded = load_dataset(&path).unwrap();

    assert_eq!(loaded.columns(), original.columns(), "column order, names and types");
    assert_eq!(loaded, original, "every cell survives the round trip");
}

#[test]
fn test_file_has_two_header_lines_plus_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("all_types.csv");
    save_dataset(&path, &all_types()).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2 + 3);
    assert_eq!(lines[0], "int64,float64,object,bool,datetime64[ns],category");
    assert_eq!(lines[1], "id,share,name,coastal,updated,kind");
    assert!(lines[2].starts_with("91,0.30000000000000004,Helsinki,True,2024-03-31 12:30:05.250,city"));
    assert!(text.ends_with('\n'));
}

#[test]
fn test_documented_example() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("towns.csv");

    let mut towns = Dataset::new(vec![
        Column::new("id", ColumnType::Int64),
        Column::new("name", ColumnType::Object),
    ])
    .unwrap();
    towns.push_row(vec![Value::Int(1), "Helsinki".into()]).unwrap();
    towns.push_row(vec![Value::Int(2), "Turku".into()]).unwrap();

    save_dataset(&path, &towns).unwrap();
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "int64,object\nid,name\n1,Helsinki\n2,Turku\n"
    );
    assert_eq!(load_dataset(&path).unwrap(), towns);
}

#[test]
fn test_empty_dataset_keeps_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    let empty = Dataset::new(all_types().columns().to_vec()).unwrap();

    save_dataset(&path, &empty).unwrap();
    let loaded = load_dataset(&path).unwrap();
    assert!(loaded.is_empty());
    assert_eq!(loaded.columns(), empty.columns());
}

#[test]
fn test_save_overwrites_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("towns.csv");
    std::fs::write(&path, "stale contents that are much longer than the new file\n".repeat(10)).unwrap();

    let mut ds = Dataset::new(vec![Column::new("id", ColumnType::Int64)]).unwrap();
    ds.push_row(vec![Value::Int(5)]).unwrap();
    save_dataset(&path, &ds).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "int64\nid\n5\n");
}

#[test]
fn test_malformed_files_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let cases = [
        ("header_mismatch.csv", "int64,object\nid\n1\n", 2),
        ("short_row.csv", "int64,object\nid,name\n1,Oulu\n2\n", 4),
        ("unknown_tag.csv", "int32,object\nid,name\n", 1),
        ("one_line.csv", "int64,object\n", 2),
        ("no_lines.csv", "", 1),
    ];
    for (name, contents, expected_line) in cases {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        match load_dataset(&path) {
            Err(Error::Format { line, .. }) => {
                assert_eq!(line, expected_line, "{} reported the wrong line", name)
            }
            other => panic!("{} should be a format error, got {:?}", name, other),
        }
    }
}

#[test]
fn test_bad_value_names_column_and_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad_int.csv");
    std::fs::write(&path, "int64,object\nid,name\n1,Vaasa\nkaksi,Pori\n").unwrap();

    match load_dataset(&path).unwrap_err() {
        Error::TypeCoercion { column, dtype, value, line } => {
            assert_eq!(column, "id");
            assert_eq!(dtype, ColumnType::Int64);
            assert_eq!(value, "kaksi");
            assert_eq!(line, 4);
        }
        other => panic!("expected a coercion error, got {:?}", other),
    }
}

#[test]
fn test_missing_file_is_io_error_with_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.csv");
    match load_dataset(&path).unwrap_err() {
        Error::Io { path: Some(p), .. } => assert_eq!(p, path),
        other => panic!("expected an I/O error, got {:?}", other),
    }
}

#[test]
fn test_markdown_preview_of_loaded_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("towns.csv");
    std::fs::write(&path, "int64,object\nid,name\n1,Helsinki\n22,Turku\n").unwrap();

    let table = load_dataset(&path).unwrap().to_markdown(&["name", "id"]).unwrap();
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines[0], "| name     | id |");
    assert_eq!(lines[1], "|:---------|---:|");
    assert_eq!(lines[3], "| Turku    | 22 |");
}

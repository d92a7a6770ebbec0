use std::fs;
use std::str::FromStr;

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::ConnectOptions;
use tempfile::tempdir;

use super::builder::parse_override;
use super::sources::cell_from_data;
use super::*;

fn table(source: &str, headers: &[&str], rows: Vec<Vec<Cell>>) -> RawTable {
    let mut t = RawTable::new(source, headers.iter().map(|h| h.to_string()).collect());
    for row in rows {
        t.push_row(row);
    }
    t
}

fn nums(values: &[f64]) -> Vec<Cell> {
    values.iter().map(|v| Cell::Number(*v)).collect()
}

#[test]
fn test_build_concatenates_sources() {
    let sheet = table(
        "sheet",
        &[" Grade", "ATTENDANCE ", "violations", "Allowance", "Sibling Count", "name"],
        vec![
            vec![
                Cell::Number(70.0),
                Cell::Number(90.0),
                Cell::Number(1.0),
                Cell::Number(30000.0),
                Cell::Number(2.0),
                Cell::Text("Budi".into()),
            ],
        ],
    );

    let built = FeatureBuilder::new().build(vec![demo_table(), sheet]).unwrap();

    assert_eq!(built.len(), 11);
    assert_eq!(built.sources.len(), 2);
    assert_eq!(built.sources[0].rows, 10);

    // Columns bound by header name, not position
    let last = built.rows.last().unwrap().features;
    assert_eq!(last, FeatureVector::new(90.0, 70.0, 1.0, 30000.0, 2.0));
    assert_eq!(built.overrides(), 0);
}

#[test]
fn test_legacy_headers_accepted() {
    let legacy = table(
        "legacy",
        &["kehadiran", "nilai", "pelanggaran", "uang_saku", "jml_saudara"],
        vec![nums(&[80.0, 60.0, 3.0, 12000.0, 2.0])],
    );

    let built = FeatureBuilder::new().build(vec![legacy]).unwrap();
    assert_eq!(built.rows[0].features.grade, 60.0);
    assert_eq!(built.rows[0].features.sibling_count, 2.0);
}

#[test]
fn test_source_missing_columns_is_skipped() {
    let partial = table("partial", &["attendance", "grade"], vec![nums(&[90.0, 80.0])]);

    let built = FeatureBuilder::new().build(vec![partial, demo_table()]).unwrap();
    assert_eq!(built.len(), 10);
    assert_eq!(built.sources.len(), 1);
    assert_eq!(built.sources[0].source, "demo data");
}

#[test]
fn test_no_rows_is_configuration_error() {
    let err = FeatureBuilder::new().build(vec![]).unwrap_err();
    assert!(matches!(err, FeatureError::Configuration(_)));

    let empty = table("empty", FEATURE_LAYOUT, vec![]);
    let partial = table("partial", &["attendance"], vec![nums(&[90.0])]);
    let err = FeatureBuilder::new().build(vec![empty, partial]).unwrap_err();
    match err {
        FeatureError::Configuration(msg) => {
            assert!(msg.contains("empty"));
            assert!(msg.contains("partial"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_non_numeric_cell_is_data_error() {
    let bad = table(
        "bad",
        FEATURE_LAYOUT,
        vec![
            nums(&[90.0, 80.0, 0.0, 20000.0, 1.0]),
            vec![
                Cell::Number(90.0),
                Cell::Text("eighty".into()),
                Cell::Number(0.0),
                Cell::Number(20000.0),
                Cell::Number(1.0),
            ],
        ],
    );

    match FeatureBuilder::new().build(vec![bad]).unwrap_err() {
        FeatureError::Data { origin, row, column, .. } => {
            assert_eq!(origin, "bad");
            assert_eq!(row, 2);
            assert_eq!(column, "grade");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_short_row_reports_empty_cell() {
    let short = table("short", FEATURE_LAYOUT, vec![nums(&[90.0, 80.0, 0.0])]);
    match FeatureBuilder::new().build(vec![short]).unwrap_err() {
        FeatureError::Data { column, reason, .. } => {
            assert_eq!(column, "allowance");
            assert_eq!(reason, "is empty");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_label_override_column() {
    let mut headers: Vec<&str> = FEATURE_LAYOUT.to_vec();
    headers.push(" Label ");

    let mut safe_but_flagged = nums(&[95.0, 90.0, 0.0, 50000.0, 1.0]);
    safe_but_flagged.push(Cell::Number(1.0));
    let mut no_override = nums(&[95.0, 90.0, 0.0, 50000.0, 1.0]);
    no_override.push(Cell::Empty);
    let mut text_override = nums(&[40.0, 30.0, 12.0, 1000.0, 5.0]);
    text_override.push(Cell::Text("no".into()));

    let sheet = table("labels", &headers, vec![safe_but_flagged, no_override, text_override]);
    let built = FeatureBuilder::new().build(vec![sheet]).unwrap();

    assert_eq!(built.rows[0].label_override, Some(true));
    assert_eq!(built.rows[1].label_override, None);
    assert_eq!(built.rows[2].label_override, Some(false));
    assert_eq!(built.overrides(), 2);
}

#[test]
fn test_label_column_disabled() {
    let mut headers: Vec<&str> = FEATURE_LAYOUT.to_vec();
    headers.push("label");
    let mut row = nums(&[95.0, 90.0, 0.0, 50000.0, 1.0]);
    row.push(Cell::Number(1.0));

    let built = FeatureBuilder::new()
        .with_label_column(None)
        .build(vec![table("labels", &headers, vec![row])])
        .unwrap();
    assert_eq!(built.rows[0].label_override, None);
}

#[test]
fn test_parse_override_values() {
    assert_eq!(parse_override(&Cell::Empty), Ok(None));
    assert_eq!(parse_override(&Cell::Bool(false)), Ok(Some(false)));
    assert_eq!(parse_override(&Cell::Number(0.0)), Ok(Some(false)));
    assert_eq!(parse_override(&Cell::Text("TRUE".into())), Ok(Some(true)));
    assert_eq!(parse_override(&Cell::Text("  ".into())), Ok(None));
    assert!(parse_override(&Cell::Number(2.0)).is_err());
    assert!(parse_override(&Cell::Text("maybe".into())).is_err());
}

#[test]
fn test_cell_from_spreadsheet_data() {
    use calamine::Data;

    assert_eq!(cell_from_data(&Data::Int(7)), Cell::Number(7.0));
    assert_eq!(cell_from_data(&Data::Float(7.5)), Cell::Number(7.5));
    assert_eq!(cell_from_data(&Data::String(" 12 ".into())), Cell::Number(12.0));
    assert_eq!(cell_from_data(&Data::String("".into())), Cell::Empty);
    assert_eq!(cell_from_data(&Data::Empty), Cell::Empty);
    assert_eq!(cell_from_data(&Data::Bool(true)), Cell::Bool(true));
}

#[test]
fn test_read_csv_spreadsheet() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("training_data.csv");
    fs::write(
        &path,
        "Attendance,Grade,Violations,Allowance,Sibling Count,Label\n\
         90,80,0,20000,2,\n\
         60,50,4,8000,4,1\n\
         ,,,,,\n",
    )
    .unwrap();

    let raw = read_spreadsheet(&path).unwrap();
    assert_eq!(raw.headers.len(), 6);
    assert_eq!(raw.len(), 2);

    let built = FeatureBuilder::new().build(vec![raw]).unwrap();
    assert_eq!(built.rows[0].features.attendance, 90.0);
    assert_eq!(built.rows[0].label_override, None);
    assert_eq!(built.rows[1].label_override, Some(true));
}

#[test]
fn test_read_missing_spreadsheet_fails() {
    let dir = tempdir().unwrap();
    let err = read_spreadsheet(&dir.path().join("nope.xlsx")).unwrap_err();
    assert!(matches!(err, SourceError::Spreadsheet { .. }));
}

#[tokio::test]
async fn test_read_record_store() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("students.db");
    let url = format!("sqlite://{}", db_path.display());

    let mut conn = SqliteConnectOptions::from_str(&url)
        .unwrap()
        .create_if_missing(true)
        .connect()
        .await
        .unwrap();
    sqlx::query(
        "CREATE TABLE students (id INTEGER PRIMARY KEY, attendance INTEGER, grade INTEGER, \
         violations INTEGER, allowance INTEGER, sibling_count INTEGER)",
    )
    .execute(&mut conn)
    .await
    .unwrap();
    sqlx::query("INSERT INTO students (attendance, grade, violations, allowance, sibling_count) VALUES (88, 77, 1, 25000, 2)")
        .execute(&mut conn)
        .await
        .unwrap();
    drop(conn);

    let raw = read_record_store(&url).await.unwrap().expect("database exists");
    assert_eq!(raw.len(), 1);

    let built = FeatureBuilder::new().build(vec![raw]).unwrap();
    assert_eq!(built.rows[0].features, FeatureVector::new(88.0, 77.0, 1.0, 25000.0, 2.0));
}

#[tokio::test]
async fn test_missing_record_store_is_skipped() {
    let dir = tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("absent.db").display());
    assert!(read_record_store(&url).await.unwrap().is_none());
}

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use std::str::FromStr;

use tabimport::IngestError;
use tabimport::error::IngestResult;
use tabimport::loader::{BATCH_ROW_LIMIT, RowSink, create_table_sql, load_rows};
use tabimport::source::Rows;
use tabimport::types::{CellValue, ColumnInfo, ColumnType, TypeTable};

#[derive(Default)]
struct RecordingSink {
    batch_sizes: Vec<usize>,
    rows: Vec<Vec<CellValue>>,
}

#[async_trait]
impl RowSink for RecordingSink {
    async fn write_batch(&mut self, batch: &[Vec<CellValue>]) -> IngestResult<()> {
        self.batch_sizes.push(batch.len());
        self.rows.extend_from_slice(batch);
        Ok(())
    }
}

fn int_schema() -> Vec<ColumnInfo> {
    vec![ColumnInfo::new("id", ColumnType::Integer)]
}

fn int_rows(count: usize) -> Rows {
    Rows::buffered((0..count).map(|i| vec![i.to_string()]).collect())
}

#[tokio::test]
async fn exactly_one_batch_at_the_limit() {
    let schema = int_schema();
    let mut sink = RecordingSink::default();
    let written = load_rows(
        int_rows(BATCH_ROW_LIMIT),
        &schema,
        &TypeTable::default(),
        &mut sink,
    )
    .await
    .unwrap();

    assert_eq!(written, BATCH_ROW_LIMIT as u64);
    assert_eq!(sink.batch_sizes, vec![BATCH_ROW_LIMIT]);
}

#[tokio::test]
async fn one_row_over_the_limit_makes_a_second_batch() {
    let schema = int_schema();
    let mut sink = RecordingSink::default();
    let written = load_rows(
        int_rows(BATCH_ROW_LIMIT + 1),
        &schema,
        &TypeTable::default(),
        &mut sink,
    )
    .await
    .unwrap();

    assert_eq!(written, (BATCH_ROW_LIMIT + 1) as u64);
    assert_eq!(sink.batch_sizes, vec![BATCH_ROW_LIMIT, 1]);
}

#[tokio::test]
async fn remainder_flushes_as_a_final_smaller_batch() {
    let schema = int_schema();
    let mut sink = RecordingSink::default();
    let written = load_rows(int_rows(5), &schema, &TypeTable::default(), &mut sink)
        .await
        .unwrap();

    assert_eq!(written, 5);
    assert_eq!(sink.batch_sizes, vec![5]);
    assert_eq!(sink.rows[4], vec![CellValue::Int(4)]);
}

#[tokio::test]
async fn conversion_failure_aborts_with_row_and_column() {
    let schema = vec![
        ColumnInfo::new("id", ColumnType::Integer),
        ColumnInfo::new("score", ColumnType::Floating),
    ];
    let rows = Rows::buffered(vec![
        vec!["1".to_string(), "9.5".to_string()],
        vec!["oops".to_string(), "8.0".to_string()],
    ]);

    let mut sink = RecordingSink::default();
    let err = load_rows(rows, &schema, &TypeTable::default(), &mut sink)
        .await
        .unwrap_err();

    match err {
        IngestError::Conversion { row, column, raw, .. } => {
            assert_eq!(row, 2);
            assert_eq!(column, "id");
            assert_eq!(raw, "oops");
        }
        other => panic!("expected Conversion, got {other:?}"),
    }
    // The in-flight batch was never submitted.
    assert!(sink.batch_sizes.is_empty());
}

#[tokio::test]
async fn empty_cells_load_as_null() {
    let schema = vec![
        ColumnInfo::new("id", ColumnType::Integer),
        ColumnInfo::new("when", ColumnType::Date),
    ];
    let rows = Rows::buffered(vec![vec!["1".to_string(), String::new()]]);

    let mut sink = RecordingSink::default();
    load_rows(rows, &schema, &TypeTable::default(), &mut sink)
        .await
        .unwrap();

    assert_eq!(sink.rows[0], vec![CellValue::Int(1), CellValue::Null]);
}

#[tokio::test]
async fn short_rows_treat_missing_trailing_cells_as_null() {
    let schema = vec![
        ColumnInfo::new("id", ColumnType::Integer),
        ColumnInfo::new("name", ColumnType::Text),
    ];
    let rows = Rows::buffered(vec![vec!["7".to_string()]]);

    let mut sink = RecordingSink::default();
    load_rows(rows, &schema, &TypeTable::default(), &mut sink)
        .await
        .unwrap();

    assert_eq!(sink.rows[0], vec![CellValue::Int(7), CellValue::Null]);
}

#[tokio::test]
async fn converters_produce_typed_values() {
    let schema = vec![
        ColumnInfo::new("flag", ColumnType::Boolean),
        ColumnInfo::new("n", ColumnType::Integer),
        ColumnInfo::new("x", ColumnType::Floating),
        ColumnInfo::new("d", ColumnType::Date),
        ColumnInfo::new("t", ColumnType::Time),
        ColumnInfo::new("ts", ColumnType::DateTime),
        ColumnInfo::new("s", ColumnType::Text),
    ];
    let rows = Rows::buffered(vec![vec![
        "true".to_string(),
        "42".to_string(),
        "98.5".to_string(),
        "2021-01-01".to_string(),
        "10:30:00".to_string(),
        "2021-01-01 10:30:00".to_string(),
        "hello".to_string(),
    ]]);

    let mut sink = RecordingSink::default();
    load_rows(rows, &schema, &TypeTable::default(), &mut sink)
        .await
        .unwrap();

    let row = &sink.rows[0];
    assert_eq!(row[0], CellValue::Bool(true));
    assert_eq!(row[1], CellValue::Int(42));
    assert_eq!(row[2], CellValue::Decimal(BigDecimal::from_str("98.5").unwrap()));
    assert!(matches!(row[3], CellValue::Date(_)));
    assert!(matches!(row[4], CellValue::Time(_)));
    assert!(matches!(row[5], CellValue::Timestamp(_)));
    assert_eq!(row[6], CellValue::Text("hello".to_string()));
}

#[test]
fn converted_values_round_trip_their_literals() {
    let table = TypeTable::default();
    let cases = [
        (ColumnType::Boolean, "true"),
        (ColumnType::Boolean, "false"),
        (ColumnType::Integer, "42"),
        (ColumnType::Floating, "98.5"),
        (ColumnType::Date, "2021-01-01"),
        (ColumnType::Time, "10:30:00"),
        (ColumnType::DateTime, "2021-01-01 10:30:00"),
        (ColumnType::Text, "free text"),
    ];

    for (column_type, literal) in cases {
        let spec = table.spec_for(column_type).unwrap();
        assert!(spec.matches(literal), "{literal} should match {column_type:?}");
        let value = spec.convert(literal).unwrap();
        assert_eq!(value.to_string(), literal, "round trip for {column_type:?}");
    }
}

#[test]
fn create_table_sql_maps_every_type() {
    let schema = vec![
        ColumnInfo::new("flag", ColumnType::Boolean),
        ColumnInfo::new("n", ColumnType::Integer),
        ColumnInfo::new("x", ColumnType::Floating),
        ColumnInfo::new("d", ColumnType::Date),
        ColumnInfo::new("t", ColumnType::Time),
        ColumnInfo::new("ts", ColumnType::DateTime),
        ColumnInfo::new("s", ColumnType::Text),
    ];
    assert_eq!(
        create_table_sql("dataset_abc", &schema),
        "CREATE TABLE \"dataset_abc\" (\"flag\" boolean, \"n\" bigint, \"x\" numeric, \
         \"d\" date, \"t\" time, \"ts\" timestamp, \"s\" text)"
    );
}

#[test]
fn create_table_sql_quotes_awkward_identifiers() {
    let schema = vec![ColumnInfo::new("weird \"name\"", ColumnType::Text)];
    assert_eq!(
        create_table_sql("t", &schema),
        "CREATE TABLE \"t\" (\"weird \"\"name\"\"\" text)"
    );
}

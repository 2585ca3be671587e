//! Chunked bulk loading of converted rows into a relational sink.
//!
//! The inferred schema is authoritative for the full load: a cell that fails its
//! column's converter aborts the whole load with row and column context; there is
//! no partial-row skip policy. Converted rows accumulate into batches of
//! [`BATCH_ROW_LIMIT`] and each batch is submitted to the [`RowSink`] as one bulk
//! write, with the final partial batch flushed at end of sequence.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::{IngestError, IngestResult};
use crate::source::Rows;
use crate::types::{CellValue, ColumnInfo, ColumnType, TypeTable};

/// Rows accumulated before a bulk write is submitted to the sink.
pub const BATCH_ROW_LIMIT: usize = 9000;

/// Postgres caps bind parameters at `u16::MAX` per statement; wide schemas split a
/// batch into several statements inside one transaction to stay under it.
const MAX_BIND_PARAMS: usize = 65_535;

/// Destination for converted row batches.
///
/// A bulk write is atomic per batch; the load as a whole is not wrapped in a
/// cross-batch transaction. Destination-table lifecycle (teardown on failure) is
/// the caller's responsibility.
#[async_trait]
pub trait RowSink {
    /// Submit one batch as a single bulk write.
    async fn write_batch(&mut self, batch: &[Vec<CellValue>]) -> IngestResult<()>;
}

/// Convert and load the full row sequence into `sink` in fixed-size batches.
///
/// Returns the number of rows written. Rows reach the sink in source order.
pub async fn load_rows<S: RowSink>(
    rows: Rows,
    schema: &[ColumnInfo],
    table: &TypeTable,
    sink: &mut S,
) -> IngestResult<u64> {
    let mut batch: Vec<Vec<CellValue>> = Vec::with_capacity(BATCH_ROW_LIMIT);
    let mut written: u64 = 0;

    for (index, row) in rows.enumerate() {
        let row = row?;
        batch.push(convert_row(index + 1, &row, schema, table)?);
        if batch.len() == BATCH_ROW_LIMIT {
            sink.write_batch(&batch).await?;
            written += batch.len() as u64;
            batch.clear();
        }
    }
    if !batch.is_empty() {
        sink.write_batch(&batch).await?;
        written += batch.len() as u64;
    }
    Ok(written)
}

/// Convert one row's cells according to the schema; empty cells become NULL.
fn convert_row(
    row_no: usize,
    cells: &[String],
    schema: &[ColumnInfo],
    table: &TypeTable,
) -> IngestResult<Vec<CellValue>> {
    schema
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let raw = cells.get(i).map(String::as_str).unwrap_or("");
            if raw.is_empty() {
                return Ok(CellValue::Null);
            }
            let spec = table.spec_for(column.column_type).ok_or_else(|| {
                IngestError::Conversion {
                    row: row_no,
                    column: column.name.clone(),
                    raw: raw.to_owned(),
                    message: format!("no converter for type {:?}", column.column_type),
                }
            })?;
            spec.convert(raw).map_err(|message| IngestError::Conversion {
                row: row_no,
                column: column.name.clone(),
                raw: raw.to_owned(),
                message,
            })
        })
        .collect()
}

/// `CREATE TABLE` statement for an inferred schema, one column per descriptor.
pub fn create_table_sql(table: &str, schema: &[ColumnInfo]) -> String {
    let columns = schema
        .iter()
        .map(|c| format!("{} {}", quote_ident(&c.name), c.column_type.sql_type()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE {} ({})", quote_ident(table), columns)
}

/// Drop the destination table; used before create and for teardown on failure.
pub async fn drop_table(pool: &PgPool, table: &str) -> IngestResult<()> {
    sqlx::query(&format!("DROP TABLE IF EXISTS {}", quote_ident(table)))
        .execute(pool)
        .await?;
    Ok(())
}

/// Double-quote an identifier, escaping embedded quotes.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// PostgreSQL sink: one multi-row parameterized `INSERT` per batch.
pub struct PgTableSink<'a> {
    pool: &'a PgPool,
    table: String,
    schema: &'a [ColumnInfo],
}

impl<'a> PgTableSink<'a> {
    pub fn new(pool: &'a PgPool, table: impl Into<String>, schema: &'a [ColumnInfo]) -> Self {
        Self {
            pool,
            table: table.into(),
            schema,
        }
    }

    /// Create the destination table from the inferred schema, replacing any
    /// previous table of the same name.
    pub async fn create_table(&self) -> IngestResult<()> {
        drop_table(self.pool, &self.table).await?;
        sqlx::query(&create_table_sql(&self.table, self.schema))
            .execute(self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl RowSink for PgTableSink<'_> {
    async fn write_batch(&mut self, batch: &[Vec<CellValue>]) -> IngestResult<()> {
        if batch.is_empty() || self.schema.is_empty() {
            return Ok(());
        }

        let rows_per_statement = (MAX_BIND_PARAMS / self.schema.len()).max(1);
        // push_values appends the VALUES keyword itself.
        let insert_prefix = format!("INSERT INTO {} ", quote_ident(&self.table));

        let mut tx = self.pool.begin().await?;
        for chunk in batch.chunks(rows_per_statement) {
            let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(insert_prefix.as_str());
            builder.push_values(chunk.iter(), |mut b, row| {
                for (column, cell) in self.schema.iter().zip(row.iter()) {
                    match column.column_type {
                        ColumnType::Boolean => b.push_bind(cell.clone().into_bool()),
                        ColumnType::Integer => b.push_bind(cell.clone().into_int()),
                        ColumnType::Floating => b.push_bind(cell.clone().into_decimal()),
                        ColumnType::Date => b.push_bind(cell.clone().into_date()),
                        ColumnType::Time => b.push_bind(cell.clone().into_time()),
                        ColumnType::DateTime => b.push_bind(cell.clone().into_timestamp()),
                        ColumnType::Text => b.push_bind(cell.clone().into_text()),
                    };
                }
            });
            builder.build().execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

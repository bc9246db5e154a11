// src/output/mod.rs

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Date32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::{
    fs::{self, File},
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::info;

use crate::aggregate::AggregateTable;
use crate::process::Status;

/// Arrow schema of an exported table: date, name, official, status.
pub fn record_schema() -> Schema {
    Schema::new(vec![
        Field::new("date", DataType::Date32, false),
        Field::new("name", DataType::Utf8, false),
        Field::new("official", DataType::Utf8, false),
        Field::new("status", DataType::Utf8, false),
    ])
}

pub fn to_record_batch(table: &AggregateTable) -> Result<RecordBatch> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).context("unix epoch")?;
    let records = table.records();

    let dates = Date32Array::from(
        records
            .iter()
            .map(|r| (r.date - epoch).num_days() as i32)
            .collect::<Vec<_>>(),
    );
    let names = StringArray::from_iter_values(records.iter().map(|r| r.name.as_str()));
    let officials = StringArray::from_iter_values(records.iter().map(|r| r.official.as_str()));
    let statuses = StringArray::from_iter_values(records.iter().map(|r| r.status.as_str()));

    RecordBatch::try_new(
        Arc::new(record_schema()),
        vec![
            Arc::new(dates) as ArrayRef,
            Arc::new(names) as ArrayRef,
            Arc::new(officials) as ArrayRef,
            Arc::new(statuses) as ArrayRef,
        ],
    )
    .context("building record batch")
}

/// Write `table` as a single Snappy-compressed Parquet file.
pub fn write_parquet(table: &AggregateTable, path: &Path) -> Result<()> {
    let batch = to_record_batch(table)?;
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
        .context("creating Arrow writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

pub fn write_json(table: &AggregateTable, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(table)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Write `<status>.parquet` and `<status>.json` under `dir`.
pub fn write_outputs(table: &AggregateTable, dir: &Path, status: Status) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let parquet_path = dir.join(format!("{}.parquet", status));
    let json_path = dir.join(format!("{}.json", status));

    write_parquet(table, &parquet_path)?;
    write_json(table, &json_path)?;
    info!(
        %status,
        records = table.len(),
        parquet = %parquet_path.display(),
        json = %json_path.display(),
        "wrote outputs"
    );
    Ok(vec![parquet_path, json_path])
}

//! CSV exports built on Arrow: the full tracker file and the tracked-bills file.

use std::fs::File;
use std::io::{BufReader, Seek};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, StringArray};
use arrow::csv::reader::Format;
use arrow::csv::{ReaderBuilder, WriterBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use legitrack_core::flatten::COLUMNS;
use legitrack_core::jurisdiction::guess_from_bill_number;
use legitrack_core::{BillNotes, FlatRow, TrackedBills, export};
use tracing::{debug, info};

use crate::StoreError;
use crate::fsutil::write_atomic;

/// The tracker CSV: header plus one row per (bill, keyword).
#[derive(Debug, Clone)]
pub struct TrackerExport {
    path: PathBuf,
}

impl TrackerExport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every row. A missing file yields no rows.
    ///
    /// Columns are matched by header name, so files written with an older,
    /// shorter column set still load; absent columns read as empty strings.
    /// Files without the jurisdiction columns get them guessed from the bill number.
    pub fn read(&self) -> Result<Vec<FlatRow>, StoreError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };
        let batches = read_utf8_batches(file).map_err(|e| match e {
            ReadError::Io(source) => StoreError::io(&self.path, source),
            ReadError::Arrow(err) => StoreError::Arrow(err),
        })?;

        let mut rows = Vec::new();
        for batch in &batches {
            rows.extend(rows_from_batch(batch));
        }
        debug!(rows = rows.len(), path = %self.path.display(), "read tracker export");
        Ok(rows)
    }

    /// Replace the file with exactly `rows`.
    pub fn write(&self, rows: &[FlatRow]) -> Result<(), StoreError> {
        let batch = rows_to_batch(rows)?;
        write_atomic(&self.path, &batch_to_csv(&batch)?)?;
        info!(rows = rows.len(), path = %self.path.display(), "wrote tracker export");
        Ok(())
    }

    /// Merge `new_rows` into the existing file and rewrite it.
    ///
    /// Returns the number of rows in the rewritten file.
    pub fn merge(&self, new_rows: &[FlatRow]) -> Result<usize, StoreError> {
        let merged = merge_rows(self.read()?, new_rows);
        self.write(&merged)?;
        Ok(merged.len())
    }
}

/// Upsert `new_rows` into `existing`, keyed by `(bill_id, keyword)`.
///
/// Replaced rows keep their position; unseen keys are appended in order.
pub fn merge_rows(mut existing: Vec<FlatRow>, new_rows: &[FlatRow]) -> Vec<FlatRow> {
    for row in new_rows {
        match existing
            .iter_mut()
            .find(|r| r.bill_id == row.bill_id && r.keyword == row.keyword)
        {
            Some(slot) => *slot = row.clone(),
            None => existing.push(row.clone()),
        }
    }
    existing
}

/// Write tracked rows plus their annotations to `path`.
///
/// Includes every export row whose bill number is tracked, regardless of
/// any browsing filter. Returns the number of rows written.
pub fn write_tracked_export(
    path: &Path,
    rows: &[FlatRow],
    tracked: &TrackedBills,
    notes: &BillNotes,
) -> Result<usize, StoreError> {
    let selected: Vec<&FlatRow> = rows
        .iter()
        .filter(|r| tracked.contains(&r.bill_number))
        .collect();

    let mut columns: Vec<ArrayRef> = (0..COLUMNS.len())
        .map(|i| string_column(selected.iter().map(|r| r.values()[i].to_string())))
        .collect();

    let note_for = |r: &FlatRow| notes.get(&r.bill_number).cloned().unwrap_or_default();
    columns.push(string_column(selected.iter().map(|r| note_for(r).comment)));
    columns.push(string_column(
        selected.iter().map(|r| note_for(r).links.join(", ")),
    ));
    columns.push(string_column(
        selected.iter().map(|r| note_for(r).file_names().join("; ")),
    ));
    columns.push(string_column(
        selected.iter().map(|r| note_for(r).position.to_string()),
    ));
    columns.push(string_column(
        selected.iter().map(|r| note_for(r).priority.to_string()),
    ));

    let batch = RecordBatch::try_new(Arc::new(export::tracked_schema()), columns)?;
    write_atomic(path, &batch_to_csv(&batch)?)?;
    info!(rows = selected.len(), path = %path.display(), "wrote tracked bills export");
    Ok(selected.len())
}

fn string_column(values: impl Iterator<Item = String>) -> ArrayRef {
    Arc::new(StringArray::from_iter_values(values))
}

fn rows_to_batch(rows: &[FlatRow]) -> Result<RecordBatch, StoreError> {
    let columns: Vec<ArrayRef> = (0..COLUMNS.len())
        .map(|i| string_column(rows.iter().map(|r| r.values()[i].to_string())))
        .collect();
    Ok(RecordBatch::try_new(
        Arc::new(export::tracker_schema()),
        columns,
    )?)
}

fn batch_to_csv(batch: &RecordBatch) -> Result<Vec<u8>, StoreError> {
    let mut buf = Vec::new();
    {
        let mut writer = WriterBuilder::new().with_header(true).build(&mut buf);
        writer.write(batch)?;
    }
    Ok(buf)
}

enum ReadError {
    Io(std::io::Error),
    Arrow(arrow::error::ArrowError),
}

/// Read a headed CSV with every column typed as nullable Utf8.
fn read_utf8_batches(file: File) -> Result<Vec<RecordBatch>, ReadError> {
    let mut reader = BufReader::new(file);
    let (inferred, _) = Format::default()
        .with_header(true)
        .infer_schema(&mut reader, Some(0))
        .map_err(ReadError::Arrow)?;
    reader.rewind().map_err(ReadError::Io)?;

    if inferred.fields().is_empty() {
        return Ok(Vec::new());
    }
    let schema = Schema::new(
        inferred
            .fields()
            .iter()
            .map(|f| Field::new(f.name(), DataType::Utf8, true))
            .collect::<Vec<_>>(),
    );

    let csv = ReaderBuilder::new(Arc::new(schema))
        .with_header(true)
        .build(reader)
        .map_err(ReadError::Arrow)?;
    csv.collect::<Result<Vec<_>, _>>().map_err(ReadError::Arrow)
}

fn get_string(col: Option<&StringArray>, row: usize) -> String {
    match col {
        Some(arr) if !arr.is_null(row) => arr.value(row).to_string(),
        _ => String::new(),
    }
}

fn rows_from_batch(batch: &RecordBatch) -> Vec<FlatRow> {
    let columns: Vec<Option<&StringArray>> = COLUMNS
        .iter()
        .map(|name| {
            batch
                .column_by_name(name)
                .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        })
        .collect();

    let has_jurisdiction = batch.column_by_name("jurisdiction_level").is_some()
        && batch.column_by_name("jurisdiction_name").is_some();

    (0..batch.num_rows())
        .map(|row| {
            let mut flat = FlatRow::from_values(columns.iter().map(|c| get_string(*c, row)));
            if !has_jurisdiction {
                let (level, name) = guess_from_bill_number(&flat.bill_number);
                flat.jurisdiction_level = level.to_string();
                flat.jurisdiction_name = name.to_string();
            }
            flat
        })
        .collect()
}

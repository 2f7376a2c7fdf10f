//! CSV round-trip for dense expression tables.
//!
//! Layout: one header row (`cell` followed by gene names), then one row per
//! cell with the cell name in the first column. This is the interchange
//! format the notebooks export; heavyweight container formats (h5ad, zarr)
//! stay external.

use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use lexome_core::{LexomeError, Result};

use crate::single_cell::{MatrixData, ScDataset};

/// Read a dense expression CSV into an [`ScDataset`].
pub fn read_expression_csv(path: impl AsRef<Path>) -> Result<ScDataset> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        LexomeError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| LexomeError::Parse(e.to_string()))?;
    if headers.is_empty() {
        return Err(LexomeError::Parse("expression CSV has no header row".into()));
    }
    let var_names: Vec<String> = headers.iter().skip(1).map(|s| s.to_string()).collect();
    let n_vars = var_names.len();

    let mut obs_names = Vec::new();
    let mut rows = Vec::new();

    for (line, result) in reader.records().enumerate() {
        let record = result.map_err(|e| LexomeError::Parse(e.to_string()))?;
        if record.len() != n_vars + 1 {
            return Err(LexomeError::Parse(format!(
                "row {} has {} fields, expected {}",
                line + 2,
                record.len(),
                n_vars + 1
            )));
        }
        let mut iter = record.iter();
        let cell = iter.next().unwrap_or_default().to_string();
        let mut values = Vec::with_capacity(n_vars);
        for field in iter {
            let v: f64 = field.parse().map_err(|_| {
                LexomeError::Parse(format!(
                    "row {}: cannot parse '{}' as a number",
                    line + 2,
                    field
                ))
            })?;
            values.push(v);
        }
        obs_names.push(cell);
        rows.push(values);
    }

    ScDataset::new(MatrixData::Dense(rows), obs_names, var_names)
}

/// Write an [`ScDataset`]'s primary matrix as a dense expression CSV.
pub fn write_expression_csv(ds: &ScDataset, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| {
        LexomeError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;
    let mut writer = WriterBuilder::new().from_writer(file);

    let mut header = Vec::with_capacity(ds.n_vars() + 1);
    header.push("cell".to_string());
    header.extend(ds.var_names().iter().cloned());
    writer
        .write_record(&header)
        .map_err(|e| LexomeError::Parse(e.to_string()))?;

    for (i, cell) in ds.obs_names().iter().enumerate() {
        let mut record = Vec::with_capacity(ds.n_vars() + 1);
        record.push(cell.clone());
        for v in ds.x().row_dense(i) {
            record.push(format_value(v));
        }
        writer
            .write_record(&record)
            .map_err(|e| LexomeError::Parse(e.to_string()))?;
    }

    writer.flush()?;
    Ok(())
}

/// Render a value without trailing-zero noise for round numbers.
fn format_value(v: f64) -> String {
    if v == v.trunc() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

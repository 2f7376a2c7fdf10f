//! On-disk artifacts: fitted parameters, sentence corpora, vocabularies.
//!
//! Three small formats cover everything a benchmarking run needs to persist:
//!
//! - fitted (slope, intercept, R²) per run as a CSV table,
//! - sentences as plain text, one cell per line,
//! - the vocabulary as a two-column TSV (`gene`, `n_cells`).

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use lexome_core::{LexomeError, Result};
use serde::{Deserialize, Serialize};

use crate::vocab::Vocabulary;

/// One fitted rank-to-expression model, tagged with its run label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitRecord {
    /// Label of the benchmarking run (dataset name, sample id, ...).
    pub run: String,
    /// Fitted slope.
    pub slope: f64,
    /// Fitted intercept.
    pub intercept: f64,
    /// Goodness of fit.
    pub r_squared: f64,
}

fn open_err(path: &Path, e: std::io::Error) -> LexomeError {
    LexomeError::Io(std::io::Error::new(
        e.kind(),
        format!("{}: {}", path.display(), e),
    ))
}

/// Write fit records as a CSV table with a header row.
pub fn write_fit_records(path: impl AsRef<Path>, records: &[FitRecord]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| open_err(path, e))?;
    let mut writer = WriterBuilder::new().from_writer(file);
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| LexomeError::Parse(e.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

/// Read fit records back from a CSV table.
pub fn read_fit_records(path: impl AsRef<Path>) -> Result<Vec<FitRecord>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| open_err(path, e))?;
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);
    let mut records = Vec::new();
    for result in reader.deserialize() {
        let record: FitRecord = result.map_err(|e| LexomeError::Parse(e.to_string()))?;
        records.push(record);
    }
    Ok(records)
}

/// Write sentences as plain text, one per line.
///
/// Sentences must not contain newlines (gene names never do).
pub fn write_sentences(path: impl AsRef<Path>, sentences: &[String]) -> Result<()> {
    let path = path.as_ref();
    for (i, s) in sentences.iter().enumerate() {
        if s.contains('\n') {
            return Err(LexomeError::InvalidInput(format!(
                "sentence {} contains a newline",
                i,
            )));
        }
    }
    let file = File::create(path).map_err(|e| open_err(path, e))?;
    let mut writer = BufWriter::new(file);
    for s in sentences {
        writeln!(writer, "{}", s)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read sentences from a plain text file, one per line.
///
/// Lines are kept verbatim, including empty lines (cells with no expressed
/// genes persist as empty sentences).
pub fn read_sentences(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| open_err(path, e))?;
    let reader = BufReader::new(file);
    let mut sentences = Vec::new();
    for line in reader.lines() {
        sentences.push(line?);
    }
    Ok(sentences)
}

/// Write a vocabulary as a two-column TSV (`gene`, `n_cells`).
pub fn write_vocabulary(path: impl AsRef<Path>, vocab: &Vocabulary) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| open_err(path, e))?;
    let mut writer = WriterBuilder::new().delimiter(b'\t').from_writer(file);
    writer
        .write_record(["gene", "n_cells"])
        .map_err(|e| LexomeError::Parse(e.to_string()))?;
    for (name, count) in vocab.iter() {
        let count = count.to_string();
        writer
            .write_record([name, count.as_str()])
            .map_err(|e| LexomeError::Parse(e.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a vocabulary back from a two-column TSV.
pub fn read_vocabulary(path: impl AsRef<Path>) -> Result<Vocabulary> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| open_err(path, e))?;
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_reader(file);

    let mut names = Vec::new();
    let mut counts = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = result.map_err(|e| LexomeError::Parse(e.to_string()))?;
        if record.len() != 2 {
            return Err(LexomeError::Parse(format!(
                "vocabulary row {} has {} fields, expected 2",
                line + 2,
                record.len(),
            )));
        }
        let count: usize = record[1].parse().map_err(|_| {
            LexomeError::Parse(format!(
                "vocabulary row {}: cannot parse '{}' as a count",
                line + 2,
                &record[1],
            ))
        })?;
        names.push(record[0].to_string());
        counts.push(count);
    }

    Vocabulary::from_counts(names, counts)
}

use crate::dates::parse_partial_date;
use crate::models::{DATE_COLUMN, Dataset, Record};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column 'Date'")]
    MissingDateColumn,

    #[error("line {line}: date '{value}' does not match <month>月<day>日")]
    InvalidDate { line: u64, value: String },

    #[error("line {line}: column '{column}' has non-numeric value '{value}'")]
    InvalidCount {
        line: u64,
        column: String,
        value: String,
    },
}

pub async fn load_dataset(path: &Path, year: i32) -> Result<Dataset, LoadError> {
    let bytes = fs::read(path).await.map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = parse_dataset(&decode_lossy(&bytes), year)?;
    info!(
        path = %path.display(),
        rows = dataset.records.len(),
        columns = dataset.columns.len(),
        "loaded dataset"
    );
    Ok(dataset)
}

/// Decodes UTF-8, dropping invalid byte sequences and a leading BOM.
pub fn decode_lossy(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    }
}

pub fn parse_dataset(text: &str, year: i32) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();
    let date_idx = headers
        .iter()
        .position(|header| header == DATE_COLUMN)
        .ok_or(LoadError::MissingDateColumn)?;
    let value_idx: Vec<usize> = (0..headers.len()).filter(|&idx| idx != date_idx).collect();

    let mut records = Vec::new();
    let mut dropped = 0usize;
    for result in reader.records() {
        let row = result?;
        let line = row.position().map(|pos| pos.line()).unwrap_or_default();

        if row.iter().all(|field| field.trim().is_empty()) {
            dropped += 1;
            continue;
        }
        let raw_date = row.get(date_idx).unwrap_or("").trim();
        if raw_date.is_empty() {
            dropped += 1;
            continue;
        }

        let date = parse_partial_date(raw_date, year).map_err(|_| LoadError::InvalidDate {
            line,
            value: raw_date.to_string(),
        })?;

        let mut values = Vec::with_capacity(value_idx.len());
        for &idx in &value_idx {
            let cell = row.get(idx).unwrap_or("");
            let value = parse_count(cell).ok_or_else(|| LoadError::InvalidCount {
                line,
                column: headers[idx].clone(),
                value: cell.to_string(),
            })?;
            values.push(value);
        }

        records.push(Record { date, values });
    }

    records.sort_by_key(|record| record.date);
    debug!(kept = records.len(), dropped, "cleaned rows");

    Ok(Dataset {
        columns: value_idx.iter().map(|&idx| headers[idx].clone()).collect(),
        records,
    })
}

/// `Some(None)` for an empty cell, `None` when the cell is not a whole number.
fn parse_count(cell: &str) -> Option<Option<i64>> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Some(None);
    }
    if let Ok(value) = cell.parse::<i64>() {
        return Some(Some(value));
    }
    // `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive.
    const LIMIT: f64 = i64::MAX as f64;
    match cell.parse::<f64>() {
        Ok(value) if value.fract() == 0.0 && (-LIMIT..LIMIT).contains(&value) => {
            Some(Some(value as i64))
        }
        _ => None,
    }
}

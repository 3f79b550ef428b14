//! File data source (C7): CSV/TSV, JSON, and JSON-Lines, unified behind `DataSource`.
//! Grounded on `graflo/data_source/file.py`'s three concrete file types.

use crate::json_bridge::object_to_record;
use async_trait::async_trait;
use graflo_core::{DataSource, Record, Value};
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Tsv,
    Json,
    Jsonl,
}

impl FileFormat {
    /// Guesses a format from a file extension; unknown extensions default to CSV.
    pub fn from_extension(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()).map(|e| e.to_lowercase()) {
            Some(ext) if ext == "tsv" => FileFormat::Tsv,
            Some(ext) if ext == "json" => FileFormat::Json,
            Some(ext) if ext == "jsonl" || ext == "ndjson" => FileFormat::Jsonl,
            _ => FileFormat::Csv,
        }
    }
}

enum FileState {
    Delimited {
        reader: csv::Reader<File>,
        headers: csv::StringRecord,
    },
    Buffered {
        records: Vec<Record>,
        cursor: usize,
    },
}

/// Reads one file in one of the four supported formats and yields `Record` batches.
pub struct FileDataSource {
    name: String,
    state: FileState,
}

impl FileDataSource {
    pub fn open(path: impl AsRef<Path>, format: FileFormat) -> anyhow::Result<Self> {
        let path: PathBuf = path.as_ref().to_path_buf();
        let name = path.display().to_string();

        let state = match format {
            FileFormat::Csv | FileFormat::Tsv => {
                let delimiter = if format == FileFormat::Tsv { b'\t' } else { b',' };
                let mut reader = csv::ReaderBuilder::new()
                    .delimiter(delimiter)
                    .has_headers(true)
                    .from_path(&path)?;
                let headers = reader.headers()?.clone();
                FileState::Delimited { reader, headers }
            }
            FileFormat::Json => {
                let text = std::fs::read_to_string(&path)?;
                let value: serde_json::Value = serde_json::from_str(&text)?;
                let records = match value {
                    serde_json::Value::Array(items) => items.iter().map(object_to_record).collect(),
                    other => vec![object_to_record(&other)],
                };
                FileState::Buffered { records, cursor: 0 }
            }
            FileFormat::Jsonl => {
                let text = std::fs::read_to_string(&path)?;
                let mut records = Vec::new();
                for line in text.lines() {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let value: serde_json::Value = serde_json::from_str(line)?;
                    records.push(object_to_record(&value));
                }
                FileState::Buffered { records, cursor: 0 }
            }
        };

        Ok(Self { name, state })
    }
}

#[async_trait]
impl DataSource for FileDataSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn next_batch(&mut self, batch_size: usize) -> anyhow::Result<Option<Vec<Record>>> {
        match &mut self.state {
            FileState::Delimited { reader, headers } => {
                let mut batch = Vec::new();
                for row in reader.records().take(batch_size) {
                    let row = row?;
                    let mut record = Record::new();
                    for (key, val) in headers.iter().zip(row.iter()) {
                        record.insert(key.to_string(), Value::String(val.to_string()));
                    }
                    batch.push(record);
                }
                if batch.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(batch))
                }
            }
            FileState::Buffered { records, cursor } => {
                if *cursor >= records.len() {
                    return Ok(None);
                }
                let end = (*cursor + batch_size).min(records.len());
                let batch = records[*cursor..end].to_vec();
                *cursor = end;
                Ok(Some(batch))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn reads_csv_in_batches() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id,name").unwrap();
        writeln!(file, "1,Alice").unwrap();
        writeln!(file, "2,Bob").unwrap();
        writeln!(file, "3,Carol").unwrap();

        let mut source = FileDataSource::open(file.path(), FileFormat::Csv).unwrap();
        let first = source.next_batch(2).await.unwrap().unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].get("name"), Some(&Value::String("Alice".to_string())));

        let second = source.next_batch(2).await.unwrap().unwrap();
        assert_eq!(second.len(), 1);

        assert!(source.next_batch(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reads_jsonl() {
        let mut file = tempfile::NamedTempFile::with_suffix(".jsonl").unwrap();
        writeln!(file, r#"{{"id": 1, "name": "Alice"}}"#).unwrap();
        writeln!(file, r#"{{"id": 2, "name": "Bob"}}"#).unwrap();

        let mut source = FileDataSource::open(file.path(), FileFormat::Jsonl).unwrap();
        let batch = source.next_batch(10).await.unwrap().unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].get("id"), Some(&Value::Int(1)));
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{ReportError, Result};
use crate::sources::RowSource;
use crate::types::RawRow;

/// Row source backed by a CSV export of the scheduling spreadsheet.
pub struct CsvRowSource {
    path: PathBuf,
    name: String,
}

impl CsvRowSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path.display().to_string();
        Self { path, name }
    }
}

impl RowSource for CsvRowSource {
    fn source_name(&self) -> &str {
        &self.name
    }

    fn fetch_rows(&self) -> Result<Vec<RawRow>> {
        let text = fs::read_to_string(&self.path).map_err(|e| {
            ReportError::Source(format!("cannot read '{}': {}", self.path.display(), e))
        })?;
        // Strip UTF-8 BOM if present
        let text = text.trim_start_matches('\u{FEFF}');

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| ReportError::Source(format!("cannot read CSV headers: {}", e)))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    warn!(source = %self.name, "skipping malformed CSV record: {}", e);
                    continue;
                }
            };
            let row: RawRow = headers
                .iter()
                .enumerate()
                .map(|(i, header)| {
                    (header.clone(), record.get(i).unwrap_or_default().to_string())
                })
                .collect();
            rows.push(row);
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("visits.csv");
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn reads_rows_keyed_by_header() {
        let (_dir, path) = write_csv("Cliente,Valor\nAna,\"R$ 50,00\"\nBeto,\"R$ 30,00\"\n");
        let rows = CsvRowSource::new(&path).fetch_rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Cliente"], "Ana");
        assert_eq!(rows[1]["Valor"], "R$ 30,00");
    }

    #[test]
    fn strips_utf8_bom_before_headers() {
        let (_dir, path) = write_csv("\u{FEFF}Cliente,Valor\nAna,10\n");
        let rows = CsvRowSource::new(&path).fetch_rows().unwrap();
        assert!(rows[0].contains_key("Cliente"));
    }

    #[test]
    fn short_records_fill_missing_cells_with_empty() {
        let (_dir, path) = write_csv("Cliente,Valor,Data\nAna,10\n");
        let rows = CsvRowSource::new(&path).fetch_rows().unwrap();
        assert_eq!(rows[0]["Data"], "");
    }

    #[test]
    fn missing_file_is_source_unavailable() {
        let source = CsvRowSource::new("definitely/not/here.csv");
        match source.fetch_rows() {
            Err(ReportError::Source(msg)) => assert!(msg.contains("not/here.csv")),
            other => panic!("expected source error, got {:?}", other.map(|r| r.len())),
        }
    }
}

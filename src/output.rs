//! File persistence: intermediate record files and the merged CSV table.
//!
//! Intermediate files are a JSON array holding one record per line.

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::merge::table::MergedTable;
use crate::records::ExtractedRecord;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;

/// Deletes files left by a previous run. Missing files are not an error.
pub fn remove_stale(paths: &[&Path]) {
    for path in paths {
        match fs::remove_file(path) {
            Ok(()) => debug!(path = %path.display(), "Removed stale file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Could not remove stale file"),
        }
    }
}

pub fn write_records(path: &Path, records: &[ExtractedRecord]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writer.write_all(b"[")?;
    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            writer.write_all(b",")?;
        }
        writer.write_all(b"\n")?;
        serde_json::to_writer(&mut writer, record)?;
    }
    writer.write_all(b"\n]\n")?;
    writer.flush()?;

    info!(path = %path.display(), records = records.len(), "Records written");
    Ok(())
}

pub fn read_records(path: &Path) -> Result<Vec<ExtractedRecord>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let records: Vec<ExtractedRecord> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", path.display()))?;

    debug!(path = %path.display(), records = records.len(), "Records read");
    Ok(records)
}

/// Writes the merged table as UTF-8 CSV with a header row.
pub fn write_table(path: &Path, table: &MergedTable) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;

    writer.write_record(table.headers())?;
    for record in table.records() {
        writer.write_record(&record)?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = table.len(), "Merged table written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{AccessibilityRecord, LineRecord};
    use std::env;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn sample_records() -> Vec<ExtractedRecord> {
        vec![
            ExtractedRecord::Line(LineRecord {
                line_code: "1".to_string(),
                line_name: "L 1".to_string(),
                stations: vec!["4_1".to_string(), "4_2".to_string()],
            }),
            ExtractedRecord::Accessibility(AccessibilityRecord {
                station_code: "4_1".to_string(),
                sentences: vec!["Estación accesible".to_string()],
            }),
        ]
    }

    #[test]
    fn test_write_records_one_per_line() {
        let path = temp_path("metro_spyder_test_lines.json");

        write_records(Path::new(&path), &sample_records()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        // opening bracket, two records, closing bracket
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains(r#""kind":"line""#));
        assert!(lines[2].contains("Estación accesible"));

        let read = read_records(Path::new(&path)).unwrap();
        assert_eq!(read, sample_records());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_empty_record_file_is_valid() {
        let path = temp_path("metro_spyder_test_empty.json");

        write_records(Path::new(&path), &[]).unwrap();

        assert!(read_records(Path::new(&path)).unwrap().is_empty());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_remove_stale_ignores_missing_files() {
        let present = temp_path("metro_spyder_test_stale.json");
        let missing = temp_path("metro_spyder_test_missing.json");
        fs::write(&present, "[]").unwrap();
        let _ = fs::remove_file(&missing);

        remove_stale(&[Path::new(&missing), Path::new(&present)]);

        assert!(!Path::new(&present).exists());
    }

    #[test]
    fn test_write_table_header_and_rows() {
        let path = temp_path("metro_spyder_test_table.csv");
        let table = MergedTable {
            static_headers: vec!["stop_id".to_string()],
            joined: vec![],
            aggregates: vec![vec!["est_90_1".to_string()]],
        };

        write_table(Path::new(&path), &table).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("stop_id,order_id,line_name,line_id,"));
        assert!(lines[1].starts_with("est_90_1,,,"));

        fs::remove_file(&path).unwrap();
    }
}

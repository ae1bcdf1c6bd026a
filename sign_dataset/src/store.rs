//! Append-only CSV dataset.
//!
//! One row per sample: 63 coordinate columns (`x0,y0,z0,…,z20`) then
//! `label`.  The header is written by whichever flush first creates the
//! file.  That is decided by looking at the filesystem on every write, never
//! by a flag cached at start-up, so a later session appending to an existing
//! file never repeats it.

use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::buffer::Sample;
use crate::error::StorageError;
use crate::label::Label;
use crate::landmarks::{FEATURE_LEN, LANDMARK_COUNT};

/// Durable sink for flushed samples.
pub trait DatasetStore {
    /// Persist `samples` in order; returns the number of rows written.
    fn write_rows(&mut self, samples: &[Sample]) -> Result<usize, StorageError>;
}

/// `x0,y0,z0,…,x20,y20,z20,label`
pub fn csv_header() -> String {
    let mut cols: Vec<String> = (0..LANDMARK_COUNT)
        .flat_map(|i| [format!("x{}", i), format!("y{}", i), format!("z{}", i)])
        .collect();
    cols.push("label".to_string());
    cols.join(",")
}

// ════════════════════════════════════════════════════════════════════════════
// CsvDatasetStore
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct CsvDatasetStore {
    path: PathBuf,
}

impl CsvDatasetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvDatasetStore { path: path.into() }
    }

    fn write_err(&self, source: std::io::Error) -> StorageError {
        StorageError::Write { path: self.path.clone(), source }
    }
}

impl DatasetStore for CsvDatasetStore {
    fn write_rows(&mut self, samples: &[Sample]) -> Result<usize, StorageError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| self.write_err(e))?;
        }

        let write_header = !self.path.exists();

        let mut text = String::new();
        if write_header {
            text.push_str(&csv_header());
            text.push('\n');
        }
        for sample in samples {
            for v in sample.features.iter() {
                // f32 Display is the shortest string that parses back exactly.
                let _ = write!(text, "{},", v);
            }
            text.push_str(sample.label.as_str());
            text.push('\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.write_err(e))?;
        file.write_all(text.as_bytes()).map_err(|e| self.write_err(e))?;
        file.flush().map_err(|e| self.write_err(e))?;

        if write_header {
            log::info!("created dataset {}", self.path.display());
        }
        Ok(samples.len())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// read_dataset
// ════════════════════════════════════════════════════════════════════════════

/// Parse a dataset written by [`CsvDatasetStore`].  A first line starting
/// with `x0,` is taken as the header and skipped.
pub fn read_dataset(path: impl AsRef<Path>) -> Result<Vec<Sample>, StorageError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|source| StorageError::Read { path: path.to_path_buf(), source })?;

    let mut samples = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        if line.is_empty() || (i == 0 && line.starts_with("x0,")) {
            continue;
        }
        samples.push(parse_row(line, line_no)?);
    }
    Ok(samples)
}

fn parse_row(line: &str, line_no: usize) -> Result<Sample, StorageError> {
    let malformed = |reason: String| StorageError::Malformed { line: line_no, reason };

    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != FEATURE_LEN + 1 {
        return Err(malformed(format!("expected {} fields, got {}", FEATURE_LEN + 1, fields.len())));
    }

    let mut features = [0.0f32; FEATURE_LEN];
    for (slot, field) in features.iter_mut().zip(&fields[..FEATURE_LEN]) {
        *slot = field
            .trim()
            .parse()
            .map_err(|_| malformed(format!("bad coordinate {:?}", field)))?;
    }
    let raw_label = fields[FEATURE_LEN].trim();
    let label = Label::parse(raw_label)
        .ok_or_else(|| malformed(format!("bad label {:?}", raw_label)))?;

    Ok(Sample::new(features, label))
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{FlushPolicy, SampleRecorder};
    use tempfile::TempDir;

    fn sample(v: f32, label: &str) -> Sample {
        Sample::new([v; FEATURE_LEN], Label::parse(label).unwrap())
    }

    fn header_count(text: &str) -> usize {
        text.lines().filter(|l| l.starts_with("x0,")).count()
    }

    #[test]
    fn header_has_64_columns() {
        let h = csv_header();
        let cols: Vec<&str> = h.split(',').collect();
        assert_eq!(cols.len(), 64);
        assert_eq!(cols[0], "x0");
        assert_eq!(cols[62], "z20");
        assert_eq!(cols[63], "label");
    }

    #[test]
    fn first_write_creates_file_with_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("landmarks.csv");
        let mut store = CsvDatasetStore::new(&path);

        store.write_rows(&[sample(0.5, "A"), sample(0.25, "A")]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], csv_header());
        assert!(lines[1].ends_with(",A"));
        assert_eq!(lines[1].split(',').count(), 64);
    }

    #[test]
    fn header_written_once_across_sessions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("landmarks.csv");

        CsvDatasetStore::new(&path).write_rows(&[sample(0.1, "A")]).unwrap();
        CsvDatasetStore::new(&path).write_rows(&[sample(0.2, "B")]).unwrap();
        let mut third = CsvDatasetStore::new(&path);
        third.write_rows(&[sample(0.3, "C")]).unwrap();
        third.write_rows(&[sample(0.4, "C")]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(header_count(&text), 1);
        assert_eq!(text.lines().count(), 5);
    }

    #[test]
    fn header_rewritten_if_file_removed_mid_session() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("landmarks.csv");
        let mut store = CsvDatasetStore::new(&path);

        store.write_rows(&[sample(0.1, "A")]).unwrap();
        fs::remove_file(&path).unwrap();
        store.write_rows(&[sample(0.2, "A")]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(header_count(&text), 1);
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn read_back_matches_written() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("landmarks.csv");
        let mut features = [0.0f32; FEATURE_LEN];
        for (i, f) in features.iter_mut().enumerate() {
            *f = i as f32 * 0.0137 - 0.3;
        }
        let written = vec![
            Sample::new(features, Label::parse("L").unwrap()),
            sample(1e-7, "HOLA"),
        ];
        CsvDatasetStore::new(&path).write_rows(&written).unwrap();

        let read = read_dataset(&path).unwrap();
        assert_eq!(read, written);
    }

    #[test]
    fn read_rejects_short_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, format!("{}\n0.1,0.2,A\n", csv_header())).unwrap();
        let err = read_dataset(&path).unwrap_err();
        assert!(matches!(err, StorageError::Malformed { line: 2, .. }));
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = TempDir::new().unwrap();
        let err = read_dataset(dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, StorageError::Read { .. }));
    }

    #[test]
    fn twenty_five_samples_through_recorder() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("landmarks.csv");
        let mut rec = SampleRecorder::new(CsvDatasetStore::new(&path), FlushPolicy::default());

        for i in 0..25 {
            rec.append([i as f32; FEATURE_LEN], Label::default());
            rec.maybe_flush().unwrap();

            if i + 1 == 10 {
                let text = fs::read_to_string(&path).unwrap();
                assert_eq!(text.lines().count(), 11);
            }
            if i + 1 == 20 {
                let text = fs::read_to_string(&path).unwrap();
                assert_eq!(text.lines().count(), 21);
                assert_eq!(header_count(&text), 1);
            }
        }
        assert!(path.exists());
        rec.final_flush().unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(header_count(&text), 1);
        let rows: Vec<&str> = text.lines().skip(1).collect();
        assert_eq!(rows.len(), 25);
        assert!(rows.iter().all(|r| r.split(',').count() == 64 && r.ends_with(",A")));
    }
}

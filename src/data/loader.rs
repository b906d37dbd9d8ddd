//! CSV loading for waveform recordings
//!
//! One file holds one waveform as rows of (elapsed time, amplitude).
//! Elapsed time is formatted `M:SS.mmm`, optionally wrapped in single
//! quotes by the exporting tool. Multi-lead exports carry one amplitude
//! column per lead; the reader takes a single configured column.

use super::types::{Waveform, WaveformReading};
use crate::error::{ClassifierError, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Reader for waveform CSV files
#[derive(Debug, Clone)]
pub struct WaveformCsvReader {
    has_header: bool,
    amplitude_column: usize,
}

impl Default for WaveformCsvReader {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveformCsvReader {
    /// Create a reader for headerless files with the amplitude in column 1
    pub fn new() -> Self {
        Self {
            has_header: false,
            amplitude_column: 1,
        }
    }

    /// Set whether files start with a header line
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Set the zero-based column holding the amplitude
    pub fn with_amplitude_column(mut self, column: usize) -> Self {
        self.amplitude_column = column;
        self
    }

    /// Read one waveform from a single CSV file
    pub fn read_waveform<P: AsRef<Path>>(&self, path: P) -> Result<Waveform> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ClassifierError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(self.has_header)
            .trim(csv::Trim::All)
            .from_reader(file);

        let first_data_line = if self.has_header { 2 } else { 1 };
        let mut waveform = Waveform::new();

        for (idx, record) in reader.records().enumerate() {
            let line = first_data_line + idx;
            let parse_err = |message: String| ClassifierError::Parse {
                path: path.to_path_buf(),
                line,
                message,
            };

            let record = record.map_err(|e| parse_err(e.to_string()))?;

            let time_token = record
                .get(0)
                .ok_or_else(|| parse_err("missing elapsed time column".into()))?;
            let elapsed = parse_elapsed(time_token).map_err(parse_err)?;

            let amplitude_token = record.get(self.amplitude_column).ok_or_else(|| {
                parse_err(format!(
                    "missing amplitude column {}",
                    self.amplitude_column
                ))
            })?;
            let millivolts: f64 = amplitude_token
                .parse()
                .map_err(|_| parse_err(format!("invalid amplitude {amplitude_token:?}")))?;

            waveform.push(WaveformReading::new(elapsed, millivolts));
        }

        Ok(waveform)
    }

    /// Read every file in a directory as one waveform each
    ///
    /// Files are taken in sorted filename order so repeated runs see the
    /// same sequence.
    pub fn load_directory<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<Waveform>> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|source| ClassifierError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut files: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| ClassifierError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        files
            .iter()
            .map(|path| self.read_waveform(path))
            .collect()
    }
}

/// Parse an `M:SS.mmm` elapsed-time token, tolerating single quotes
fn parse_elapsed(token: &str) -> std::result::Result<Duration, String> {
    let cleaned = token.trim().trim_matches('\'');

    let (minutes, seconds) = cleaned
        .split_once(':')
        .ok_or_else(|| format!("expected M:SS.mmm elapsed time, got {token:?}"))?;

    let minutes: u64 = minutes
        .parse()
        .map_err(|_| format!("invalid minutes in {token:?}"))?;
    let seconds: f64 = seconds
        .parse()
        .map_err(|_| format!("invalid seconds in {token:?}"))?;

    if !(0.0..60.0).contains(&seconds) {
        return Err(format!("seconds out of range in {token:?}"));
    }

    Ok(Duration::from_secs_f64(minutes as f64 * 60.0 + seconds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_parse_elapsed_formats() {
        assert_eq!(parse_elapsed("0:00.003").unwrap().as_millis(), 3);
        assert_eq!(parse_elapsed("'0:01.500'").unwrap().as_millis(), 1500);
        assert_eq!(parse_elapsed("2:30.000").unwrap().as_secs(), 150);

        assert!(parse_elapsed("12.5").is_err());
        assert!(parse_elapsed("0:61.0").is_err());
    }

    #[test]
    fn test_read_waveform() {
        let dir = tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "record.csv",
            "'0:00.000',-0.145\n'0:00.003',-0.120\n'0:00.006',-0.135\n",
        );

        let wave = WaveformCsvReader::new().read_waveform(&path).unwrap();

        assert_eq!(wave.len(), 3);
        assert_eq!(wave.readings[1].elapsed.as_millis(), 3);
        assert_eq!(wave.readings[1].millivolts, -0.120);
    }

    #[test]
    fn test_header_and_column_selection() {
        let dir = tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "leads.csv",
            "time,lead_i,lead_ii\n0:00.000,0.1,0.9\n0:00.003,0.2,0.8\n",
        );

        let wave = WaveformCsvReader::new()
            .with_header(true)
            .with_amplitude_column(2)
            .read_waveform(&path)
            .unwrap();

        assert_eq!(wave.len(), 2);
        assert_eq!(wave.readings[0].millivolts, 0.9);
        assert_eq!(wave.readings[1].millivolts, 0.8);
    }

    #[test]
    fn test_parse_error_reports_line() {
        let dir = tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "bad.csv",
            "0:00.000,0.1\n0:00.003,not-a-number\n",
        );

        let err = WaveformCsvReader::new().read_waveform(&path).unwrap_err();

        match err {
            ClassifierError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_directory_sorted() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), "b.csv", "0:00.000,2.0\n");
        write_file(dir.path(), "a.csv", "0:00.000,1.0\n");

        let waves = WaveformCsvReader::new().load_directory(dir.path()).unwrap();

        assert_eq!(waves.len(), 2);
        assert_eq!(waves[0].readings[0].millivolts, 1.0);
        assert_eq!(waves[1].readings[0].millivolts, 2.0);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = WaveformCsvReader::new()
            .read_waveform("/no/such/file.csv")
            .unwrap_err();

        assert!(matches!(err, ClassifierError::Io { .. }));
    }
}

use crate::error::AppError;
use csv::{ReaderBuilder, StringRecord};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Dataset file names probed in the working directory, most complete first.
pub const CSV_CANDIDATES: &[&str] = &[
    "aram_participants_with_full_runes_merged_plus.csv",
    "aram_participants_with_full_runes_merged.csv",
    "aram_participants_with_full_runes.csv",
    "aram_participants_clean_preprocessed.csv",
    "aram_participants_clean_no_dupe_items.csv",
    "aram_participants_with_items.csv",
];

/// SHA-256 of the dataset bytes. Identifies a loaded table for memoization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        Fingerprint(digest.iter().map(|b| format!("{:02x}", b)).collect())
    }

    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct RawTable {
    pub source: String,
    pub headers: Vec<String>,
    pub records: Vec<StringRecord>,
    pub fingerprint: Fingerprint,
}

impl RawTable {
    /// Parses delimited text with a header row. Short rows are tolerated; missing
    /// trailing cells read as empty.
    pub fn from_bytes(source: &str, bytes: &[u8]) -> Result<Self, AppError> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(bytes);

        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect::<Vec<_>>();

        let mut records = Vec::new();
        for (line, record) in reader.records().enumerate() {
            match record {
                Ok(record) => records.push(record),
                Err(e) => log::warn!("Skipping unreadable row {} in {}: {}", line + 2, source, e),
            }
        }

        log::debug!("Loaded {} rows x {} columns from {}", records.len(), headers.len(), source);

        Ok(RawTable {
            source: source.to_string(),
            headers,
            records,
            fingerprint: Fingerprint::of(bytes),
        })
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&path.display().to_string(), &bytes)
    }

    /// Cell text at `column` of record `row`, empty when the row is short.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.records
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or("")
    }
}

/// Picks the dataset path: an explicit path wins, then the first candidate
/// present in `dir`.
pub fn discover_csv(explicit: Option<&Path>, dir: &Path) -> Result<PathBuf, AppError> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(AppError::DatasetNotFound(path.display().to_string()));
    }

    CSV_CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
        .ok_or_else(|| AppError::DatasetNotFound(CSV_CANDIDATES.join(", ")))
}

use super::resolver::IconSource;
use crate::analysis::canonical::normalize_key;
use crate::error::AppError;
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Two-column side table: name, icon reference. A header row is optional.
#[derive(Debug, Clone, Default)]
pub struct IconTable {
    exact: HashMap<String, String>,
    normalized: HashMap<String, String>,
}

impl IconTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, icon: &str) {
        let (name, icon) = (name.trim(), icon.trim());
        if name.is_empty() || icon.is_empty() {
            return;
        }
        self.exact.insert(name.to_string(), icon.to_string());
        self.normalized
            .entry(normalize_key(name))
            .or_insert_with(|| icon.to_string());
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, AppError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut table = IconTable::new();
        for (line, record) in rdr.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    log::warn!("Icon table line {} unreadable: {}", line + 1, e);
                    continue;
                }
            };
            let (Some(name), Some(icon)) = (record.get(0), record.get(1)) else {
                continue;
            };
            if line == 0 && name.trim().eq_ignore_ascii_case("name") {
                continue;
            }
            table.insert(name, icon);
        }
        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let file = std::fs::File::open(path)?;
        let table = Self::from_reader(file)?;
        log::debug!("Loaded {} icon references from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.exact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }
}

impl IconSource for IconTable {
    fn exact(&self, name: &str) -> Option<String> {
        self.exact.get(name).cloned()
    }

    fn normalized(&self, name: &str) -> Option<String> {
        self.normalized.get(&normalize_key(name)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_with_and_without_header() {
        let with = IconTable::from_reader("name,icon\nFlash,flash.png\n".as_bytes()).unwrap();
        assert_eq!(with.len(), 1);
        assert_eq!(with.exact("Flash").as_deref(), Some("flash.png"));

        let without = IconTable::from_reader("Flash,flash.png\nHeal,heal.png\nbroken\n".as_bytes()).unwrap();
        assert_eq!(without.len(), 2);
    }

    #[test]
    fn normalized_lookup_ignores_case_and_spaces() {
        let table = IconTable::from_reader("Luden's Companion,luden.png\n".as_bytes()).unwrap();
        assert_eq!(table.exact("ludens companion"), None);
        assert_eq!(table.normalized(" LUDEN'S  Companion").as_deref(), Some("luden.png"));
    }
}

use crate::error::AppError;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_JUNK_ITEMS: &[&str] = &["Poro-Snax", "2052"];

#[derive(Debug, Clone)]
pub struct Config {
    pub csv_path: Option<PathBuf>,
    pub icon_table: Option<PathBuf>,
    pub ddragon_version: Option<String>,
    pub junk_items: Vec<String>,
    pub cache_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let csv_path = env::var("ARAM_CSV").ok().filter(|v| !v.trim().is_empty()).map(PathBuf::from);
        let icon_table = env::var("ARAM_ICON_TABLE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        let ddragon_version = env::var("ARAM_DDRAGON_VERSION")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        if let Some(version) = &ddragon_version {
            validate_version(version)?;
        }

        let junk_items = match env::var("ARAM_JUNK_ITEMS") {
            Ok(raw) => parse_token_list(&raw),
            Err(_) => DEFAULT_JUNK_ITEMS.iter().map(|s| s.to_string()).collect(),
        };

        let cache_dir = match env::var("ARAM_CACHE_DIR") {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".aram_dashboard"),
        };

        Ok(Config {
            csv_path,
            icon_table,
            ddragon_version,
            junk_items,
            cache_dir,
        })
    }
}

/// Data Dragon versions are dot-separated numbers; they end up in cache file names.
pub fn validate_version(version: &str) -> Result<(), AppError> {
    let valid = !version.is_empty()
        && version
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));
    if valid {
        Ok(())
    } else {
        Err(AppError::ConfigError(format!(
            "Data Dragon version must look like 14.1.1, got '{}'",
            version
        )))
    }
}

fn parse_token_list(raw: &str) -> Vec<String> {
    raw.split(|c| c == ',' || c == '|')
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;

use crate::error::{ReportError, Result};

/// Date the business switched from one-row-per-visit to
/// one-row-per-service-line. Used as the default when config.toml is absent.
pub const DEFAULT_CUTOVER: &str = "2023-09-01";

const DEFAULT_EXCLUDED_EXACT: &[&str] = &["sem nome", "cliente", "desconhecido", "teste"];
const DEFAULT_EXCLUDED_MARKERS: &[&str] = &["avulso", "teste"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reports: ReportsConfig,
    #[serde(default)]
    pub exclusions: ExclusionsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportsConfig {
    /// Visit-dedup cutover date, ISO format.
    pub cutover_date: NaiveDate,
    pub overdue_threshold_days: i64,
    pub top_n: usize,
    /// Optional path to the client -> family/status mapping file.
    pub families_file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExclusionsConfig {
    /// Client names dropped from rankings on exact case-insensitive match.
    pub exact: Vec<String>,
    /// Marker words dropped on substring match.
    pub markers: Vec<String>,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            cutover_date: DEFAULT_CUTOVER
                .parse()
                .unwrap_or_else(|_| NaiveDate::from_ymd_opt(2023, 9, 1).unwrap()),
            overdue_threshold_days: 60,
            top_n: 10,
            families_file: None,
        }
    }
}

impl Default for ExclusionsConfig {
    fn default() -> Self {
        Self {
            exact: DEFAULT_EXCLUDED_EXACT.iter().map(|s| s.to_string()).collect(),
            markers: DEFAULT_EXCLUDED_MARKERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Config {
    /// Loads `config.toml` from the working directory. A missing file falls
    /// back to built-in defaults; a malformed file is a hard error.
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| {
            ReportError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reports: ReportsConfig::default(),
            exclusions: ExclusionsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply_when_file_is_missing() {
        let config = Config::load_from("no-such-config.toml").unwrap();
        assert_eq!(config.reports.top_n, 10);
        assert_eq!(config.reports.overdue_threshold_days, 60);
        assert!(config.exclusions.exact.contains(&"sem nome".to_string()));
    }

    #[test]
    fn partial_file_fills_missing_sections_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            "[reports]\ncutover_date = \"2025-05-11\"\noverdue_threshold_days = 45\ntop_n = 5"
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.reports.cutover_date, NaiveDate::from_ymd_opt(2025, 5, 11).unwrap());
        assert_eq!(config.reports.overdue_threshold_days, 45);
        assert!(!config.exclusions.markers.is_empty());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[reports\nbroken").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::filter::DEFAULT_OCCUPATION_PRESELECTION;
use crate::error::ConfigError;

/// Dashboard settings. Every field has a default, so a config file only
/// needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Customer table opened at start-up.
    pub data_path: Option<PathBuf>,
    /// Bins of the age histograms.
    pub age_bins: usize,
    /// Bins of the income, credit card balance and loan histograms.
    pub value_bins: usize,
    /// Bars in the top occupations chart.
    pub top_occupations: usize,
    /// Occupations pre-selected in the data explorer.
    pub default_occupations: usize,
    /// Suggested file name for the filtered-data download.
    pub export_file_name: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            age_bins: 30,
            value_bins: 20,
            top_occupations: 10,
            default_occupations: DEFAULT_OCCUPATION_PRESELECTION,
            export_file_name: "filtered_banking_data.csv".to_string(),
        }
    }
}

impl DashboardConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = DashboardConfig::from_json(r#"{ "age_bins": 12 }"#).expect("config");
        assert_eq!(config.age_bins, 12);
        assert_eq!(config.top_occupations, 10);
        assert_eq!(config.default_occupations, 3);
        assert_eq!(config.export_file_name, "filtered_banking_data.csv");
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(matches!(
            DashboardConfig::from_json("{ age_bins: }"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            DashboardConfig::load(Path::new("/nonexistent/dashboard.json")),
            Err(ConfigError::Io { .. })
        ));
    }
}

// Application configuration: optional JSON file, then command-line overrides.
use crate::cli::Cli;
use crate::error::{Error, Result};
use crate::insights::rules::DEFAULT_OVERLOAD_HOURS;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_path: String,
    pub cache_ttl_secs: u64,
    pub synthetic_rows: usize,
    pub seed: u64,
    pub export_dir: String,
    pub overload_hours: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: "timesheets.csv".to_string(),
            cache_ttl_secs: 300,
            synthetic_rows: 400,
            seed: 42,
            export_dir: ".".to_string(),
            overload_hours: DEFAULT_OVERLOAD_HOURS,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let config: AppConfig = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// Config file named by `--config` (or defaults), with the remaining
    /// flags laid over it.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(data) = &cli.data {
            config.data_path = data.clone();
        }
        if let Some(seed) = cli.seed {
            config.seed = seed;
        }
        if let Some(dir) = &cli.export_dir {
            config.export_dir = dir.clone();
        }
        Ok(config)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn cli(list: &[&str]) -> Cli {
        Cli::try_parse_from(list).unwrap()
    }

    #[test]
    fn defaults_without_flags() {
        let c = AppConfig::from_cli(&cli(&["bizpulse"])).unwrap();
        assert_eq!(c, AppConfig::default());
        assert_eq!(c.cache_ttl(), Duration::from_secs(300));
    }

    #[test]
    fn file_then_flags_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"data_path": "a.csv", "seed": 7, "overload_hours": 160}}"#).unwrap();
        let path = file.path().to_string_lossy().to_string();

        let c = AppConfig::from_cli(&cli(&["bizpulse", "--config", &path, "--seed", "9"])).unwrap();
        assert_eq!(c.data_path, "a.csv");
        assert_eq!(c.seed, 9);
        assert_eq!(c.overload_hours, 160.0);
        assert_eq!(c.synthetic_rows, 400);
    }

    #[test]
    fn flags_alone_override_defaults() {
        let c = AppConfig::from_cli(&cli(&["bizpulse", "--data", "x.csv", "--export-dir", "out"])).unwrap();
        assert_eq!(c.data_path, "x.csv");
        assert_eq!(c.export_dir, "out");
        assert_eq!(c.seed, 42);
    }

    #[test]
    fn missing_config_file_is_a_config_error() {
        assert!(matches!(
            AppConfig::from_cli(&cli(&["bizpulse", "--config", "/no/such/file.json"])),
            Err(Error::Config(_))
        ));
    }
}

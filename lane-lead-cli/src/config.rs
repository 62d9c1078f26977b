//! Configuration loading and parsing

use anyhow::{Context, Result};
use lane_lead_tracker::{DiagnosticsConfig, TrackerConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReplayConfig {
    /// Pace cycles at this period instead of replaying as fast as possible
    pub period_ms: Option<u64>,
    /// Stop after this many cycles
    pub max_cycles: Option<usize>,
}

/// Command-line values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub hold_cycles: Option<u32>,
    pub diagnostics_interval_ms: Option<u64>,
    pub period_ms: Option<u64>,
    pub max_cycles: Option<usize>,
}

impl AppConfig {
    /// Build a configuration from command-line values alone
    ///
    /// `hold_cycles` has no safe platform-independent default, so it must be
    /// given explicitly when no config file is used.
    pub fn from_overrides(overrides: &Overrides) -> Result<Self> {
        let hold_cycles = overrides
            .hold_cycles
            .context("hold cycles must be set with --hold-cycles or a config file")?;

        let mut config = AppConfig {
            tracker: TrackerConfig::new().with_hold_cycles(hold_cycles),
            diagnostics: DiagnosticsConfig::default(),
            replay: ReplayConfig::default(),
        };
        config.apply(overrides);
        Ok(config)
    }

    /// Apply command-line overrides
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(hold_cycles) = overrides.hold_cycles {
            self.tracker.hold_cycles = hold_cycles;
        }
        if let Some(interval) = overrides.diagnostics_interval_ms {
            self.diagnostics.interval_ms = interval;
        }
        if overrides.period_ms.is_some() {
            self.replay.period_ms = overrides.period_ms;
        }
        if overrides.max_cycles.is_some() {
            self.replay.max_cycles = overrides.max_cycles;
        }
    }

    /// Reject configurations the tracker must not start with
    pub fn validate(&self) -> Result<()> {
        self.tracker
            .validate()
            .context("Invalid [tracker] configuration")?;
        if self.diagnostics.interval_ms == 0 {
            anyhow::bail!("diagnostics interval must be greater than zero");
        }
        Ok(())
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            [tracker]
            lane_boundary = 1.8
            max_lateral = 5.5
            hold_cycles = 3
            distance_scale = 10.0

            [tracker.plausibility]
            min_distance = 0.75
            max_distance = 200.0

            [diagnostics]
            interval_ms = 1000
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.tracker.hold_cycles, 3);
        assert_eq!(config.tracker.lateral_constant, 80);
        assert!(config.tracker.plausibility.is_some());
        assert_eq!(config.diagnostics.interval_ms, 1000);
        assert!(config.diagnostics.list_tracks);
        assert_eq!(config.replay.period_ms, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_hold_cycles_required() {
        let toml_content = r#"
            [tracker]
            lane_boundary = 1.8
        "#;
        assert!(toml::from_str::<AppConfig>(toml_content).is_err());

        let negative = r#"
            [tracker]
            hold_cycles = -2
        "#;
        assert!(toml::from_str::<AppConfig>(negative).is_err());
    }

    #[test]
    fn test_invalid_thresholds_fail_validation() {
        let toml_content = r#"
            [tracker]
            lane_boundary = 5.5
            max_lateral = 1.8
            hold_cycles = 3
        "#;
        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[tracker]\nhold_cycles = 5\n\n[replay]\nmax_cycles = 20").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.tracker.hold_cycles, 5);
        assert_eq!(config.replay.max_cycles, Some(20));

        assert!(load_config(Path::new("/nonexistent/config.toml")).is_err());
    }

    #[test]
    fn test_overrides() {
        assert!(AppConfig::from_overrides(&Overrides::default()).is_err());

        let overrides = Overrides {
            hold_cycles: Some(2),
            diagnostics_interval_ms: Some(500),
            ..Overrides::default()
        };
        let config = AppConfig::from_overrides(&overrides).unwrap();
        assert_eq!(config.tracker.hold_cycles, 2);
        assert_eq!(config.diagnostics.interval_ms, 500);

        let zero_interval = Overrides {
            hold_cycles: Some(2),
            diagnostics_interval_ms: Some(0),
            ..Overrides::default()
        };
        let config = AppConfig::from_overrides(&zero_interval).unwrap();
        assert!(config.validate().is_err());
    }
}

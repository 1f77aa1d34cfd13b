use crate::params::RateParameters;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// Configuration for the sampling source and the run bound
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SamplingConfig {
    /// Optional RNG seed for reproducible runs. Omit to seed from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    /// The run loop pauses once this many samples have accumulated.
    #[serde(default = "default_target_total_points")]
    pub target_total_points: u64,
}

// Configuration for the cadence control defaults
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CadenceConfig {
    /// Initial position of the speed control, 1-100.
    #[serde(default = "default_initial_speed")]
    pub initial_speed: u32,
    /// Marker diameter in pixels, 1-10.
    #[serde(default = "default_marker_size")]
    pub marker_size: u32,
    /// Marker opacity, 0.1-1.0.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

// Configuration for result export, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OutputConfig {
    /// Root directory for exports. Defaults to the platform downloads folder.
    #[serde(default)]
    pub export_root: Option<PathBuf>,
    /// Subdirectory name for this run. Prompted for interactively when absent.
    #[serde(default)]
    pub directory_name: Option<String>,
    #[serde(default = "default_save_history")]
    pub save_history: bool,
    /// History format: "json", "bincode", "messagepack"
    pub format: Option<String>,
    #[serde(default = "default_save_history_csv")]
    pub save_history_csv: bool,
    /// A metrics snapshot is recorded every this many ticks.
    #[serde(default = "default_record_interval_ticks")]
    pub record_interval_ticks: u32,
}

fn default_target_total_points() -> u64 {
    200_000
}

fn default_initial_speed() -> u32 {
    10
}

fn default_marker_size() -> u32 {
    1
}

fn default_opacity() -> f64 {
    0.6
}

fn default_save_history() -> bool {
    true
}

fn default_save_history_csv() -> bool {
    true
}

fn default_record_interval_ticks() -> u32 {
    10
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            seed: None,
            target_total_points: default_target_total_points(),
        }
    }
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            initial_speed: default_initial_speed(),
            marker_size: default_marker_size(),
            opacity: default_opacity(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            export_root: None,
            directory_name: None,
            save_history: default_save_history(),
            format: None,
            save_history_csv: default_save_history_csv(),
            record_interval_ticks: default_record_interval_ticks(),
        }
    }
}

// Main estimator configuration structure, loaded from config.toml.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct EstimatorConfig {
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub cadence: CadenceConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl EstimatorConfig {
    /// Loads the estimator configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e))?;
        let config: EstimatorConfig = toml::from_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML from '{}': {}", path_ref.display(), e))?;

        config.validate()?;
        Ok(config)
    }

    /// Loads the configuration if the file exists, otherwise falls back to
    /// the built-in defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        if self.sampling.target_total_points == 0 {
            anyhow::bail!("target_total_points must be greater than 0.");
        }
        if self.cadence.initial_speed < RateParameters::MIN_SPEED
            || self.cadence.initial_speed > RateParameters::MAX_SPEED
        {
            anyhow::bail!(
                "initial_speed must be in {}..={}.",
                RateParameters::MIN_SPEED,
                RateParameters::MAX_SPEED
            );
        }
        if self.cadence.marker_size < RateParameters::MIN_MARKER_SIZE
            || self.cadence.marker_size > RateParameters::MAX_MARKER_SIZE
        {
            anyhow::bail!(
                "marker_size must be in {}..={}.",
                RateParameters::MIN_MARKER_SIZE,
                RateParameters::MAX_MARKER_SIZE
            );
        }
        if self.cadence.opacity < RateParameters::MIN_OPACITY
            || self.cadence.opacity > RateParameters::MAX_OPACITY
        {
            anyhow::bail!(
                "opacity must be in {}..={}.",
                RateParameters::MIN_OPACITY,
                RateParameters::MAX_OPACITY
            );
        }
        if let Some(format) = self.output.format.as_deref() {
            if !matches!(format, "json" | "bincode" | "messagepack") {
                anyhow::bail!("Unknown history format: '{}'.", format);
            }
        }
        if self.output.record_interval_ticks == 0 {
            anyhow::bail!("record_interval_ticks must be greater than 0.");
        }
        Ok(())
    }

    /// Converts the configured cadence defaults into the runtime rate
    /// parameters used by the controller.
    pub fn rate_parameters(&self) -> RateParameters {
        let mut params = RateParameters::from_speed(self.cadence.initial_speed);
        params.set_marker_size(self.cadence.marker_size);
        params.set_opacity(self.cadence.opacity);
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_control_ranges() {
        let config = EstimatorConfig::default();
        assert_eq!(config.cadence.initial_speed, 10);
        assert_eq!(config.cadence.marker_size, 1);
        assert_eq!(config.cadence.opacity, 0.6);
        assert_eq!(config.sampling.target_total_points, 200_000);
        assert!(config.sampling.seed.is_none());

        let params = config.rate_parameters();
        assert_eq!(params.batch_size, 100);
        assert_eq!(params.tick_delay_ms, 100);
    }

    #[test]
    fn parses_full_document() {
        let doc = r#"
            [sampling]
            seed = 42
            target_total_points = 5000

            [cadence]
            initial_speed = 100
            marker_size = 3
            opacity = 0.8

            [output]
            export_root = "/tmp/results"
            directory_name = "run1"
            save_history = false
            format = "bincode"
            save_history_csv = false
            record_interval_ticks = 5
        "#;
        let config: EstimatorConfig = toml::from_str(doc).unwrap();
        config.validate().unwrap();
        assert_eq!(config.sampling.seed, Some(42));
        assert_eq!(config.cadence.initial_speed, 100);
        assert_eq!(config.output.format.as_deref(), Some("bincode"));
        assert_eq!(config.output.directory_name.as_deref(), Some("run1"));

        let params = config.rate_parameters();
        assert_eq!(params.batch_size, 1000);
        assert_eq!(params.tick_delay_ms, 10);
        assert_eq!(params.marker_size, 3);
        assert_eq!(params.opacity, 0.8);
    }

    #[test]
    fn missing_sections_use_defaults() {
        let config: EstimatorConfig = toml::from_str("[sampling]\nseed = 7\n").unwrap();
        assert_eq!(config.sampling.seed, Some(7));
        assert_eq!(config.cadence.initial_speed, 10);
        assert!(config.output.save_history);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut config = EstimatorConfig::default();
        config.cadence.initial_speed = 0;
        assert!(config.validate().is_err());

        let mut config = EstimatorConfig::default();
        config.cadence.opacity = 1.5;
        assert!(config.validate().is_err());

        let mut config = EstimatorConfig::default();
        config.sampling.target_total_points = 0;
        assert!(config.validate().is_err());

        let mut config = EstimatorConfig::default();
        config.output.format = Some("yaml".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_or_default_handles_missing_file() {
        let config = EstimatorConfig::load_or_default("definitely/not/a/config.toml").unwrap();
        assert_eq!(config.cadence.initial_speed, 10);
    }
}

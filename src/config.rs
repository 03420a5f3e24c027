//! Configuration management for hdrbracket
//!
//! Provides configuration loading, saving, and validation for the exposure
//! plan, retry policy, fusion parameters, and output preferences. All values
//! are validated before any hardware interaction.

use crate::bracket::BracketOptions;
use crate::fusion::{FusionConfig, FusionOperator, BIAS_MAX, BIAS_MIN, DEFAULT_BIAS};
use crate::types::ExposurePlan;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HdrConfig {
    pub capture: CaptureConfig,
    pub fusion: FusionSettings,
    pub output: OutputConfig,
}

/// Capture loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Ordered exposure durations in microseconds, one shot each
    pub exposures_us: Vec<u64>,
    /// Retries per shot after the first failed attempt
    pub max_retries_per_shot: u32,
    /// Delay between exposure change and capture in milliseconds
    pub settle_delay_ms: u64,
    /// Minimum exposures a plan must contain (1 allows single-shot runs)
    pub min_exposures: usize,
}

/// Fusion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionSettings {
    /// Merge operator: radiance tone-mapping or direct exposure fusion
    #[serde(default)]
    pub operator: FusionOperator,
    /// Tone-mapping bias control (0.05-1.0)
    pub bias: f32,
}

/// Output and file management configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory artifacts are written into
    pub directory: String,
    /// Persist each bracket frame alongside the fused result
    pub save_brackets: bool,
    /// Identifier prefix for stored artifacts
    pub prefix: String,
}

impl Default for HdrConfig {
    fn default() -> Self {
        Self {
            capture: CaptureConfig {
                exposures_us: vec![1_000, 4_000, 16_000],
                max_retries_per_shot: 3,
                settle_delay_ms: 100,
                min_exposures: 2,
            },
            fusion: FusionSettings {
                operator: FusionOperator::RadianceToneMap,
                bias: DEFAULT_BIAS,
            },
            output: OutputConfig {
                directory: "./captures".to_string(),
                save_brackets: true,
                prefix: "image".to_string(),
            },
        }
    }
}

impl HdrConfig {
    /// Load configuration from TOML file, falling back to defaults when the
    /// file does not exist.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents =
            fs::read_to_string(path).map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: HdrConfig =
            toml::from_str(&contents).map_err(|e| format!("Failed to parse config file: {}", e))?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let toml_string =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(path, toml_string).map_err(|e| format!("Failed to write config file: {}", e))?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> PathBuf {
        PathBuf::from("hdrbracket.toml")
    }

    /// Load from default location or create with defaults
    pub fn load_or_default() -> Self {
        Self::load_from_file(Self::default_path()).unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Validate configuration values. Runs before any capture is attempted.
    pub fn validate(&self) -> Result<(), String> {
        if self.capture.exposures_us.is_empty() {
            return Err("Exposure plan must not be empty".to_string());
        }
        if let Some(pos) = self.capture.exposures_us.iter().position(|&d| d == 0) {
            return Err(format!("Exposure duration at index {} must be positive", pos));
        }
        if self.capture.min_exposures == 0 {
            return Err("Minimum exposure count must be at least 1".to_string());
        }
        if self.capture.exposures_us.len() < self.capture.min_exposures {
            return Err(format!(
                "Exposure plan has {} entries, minimum is {}",
                self.capture.exposures_us.len(),
                self.capture.min_exposures
            ));
        }

        if !self.fusion.bias.is_finite()
            || self.fusion.bias < BIAS_MIN
            || self.fusion.bias > BIAS_MAX
        {
            return Err(format!(
                "Tone-mapping bias must be between {} and {}",
                BIAS_MIN, BIAS_MAX
            ));
        }

        if self.output.directory.is_empty() {
            return Err("Output directory must not be empty".to_string());
        }
        if self.output.prefix.is_empty() {
            return Err("Output prefix must not be empty".to_string());
        }

        Ok(())
    }

    /// Build the validated exposure plan from this configuration.
    pub fn exposure_plan(&self) -> Result<ExposurePlan, crate::errors::HdrError> {
        ExposurePlan::new(self.capture.exposures_us.clone())
    }

    /// Scheduler options derived from this configuration.
    pub fn bracket_options(&self) -> BracketOptions {
        BracketOptions {
            max_retries_per_shot: self.capture.max_retries_per_shot,
            settle_delay_ms: self.capture.settle_delay_ms,
        }
    }

    /// Fusion engine configuration derived from this configuration.
    pub fn fusion_config(&self) -> FusionConfig {
        FusionConfig {
            operator: self.fusion.operator,
            bias: self.fusion.bias,
        }
    }
}

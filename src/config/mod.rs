//! Configuration for lexscan
//!
//! A TOML file with a tuning profile and optional `[detector]` and
//! `[extractor]` tables. Missing tables take the profile's defaults; in a
//! partial table the verdict rule and minimum document length still follow
//! the profile unless set explicitly.

use crate::detect::{DetectorConfig, VerdictRule};
use crate::extract::ExtractorConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tuning profile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Dual-threshold verdict, 2000 character minimum
    #[default]
    Strict,
    /// Single 0.3 threshold, 500 character minimum
    Lax,
}

impl Profile {
    pub fn verdict(&self) -> VerdictRule {
        match self {
            Profile::Strict => VerdictRule::dual(),
            Profile::Lax => VerdictRule::single(),
        }
    }

    pub fn min_document_length(&self) -> usize {
        match self {
            Profile::Strict => 2000,
            Profile::Lax => 500,
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Profile::Strict => write!(f, "strict"),
            Profile::Lax => write!(f, "lax"),
        }
    }
}

/// Effective configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub profile: Profile,
    pub detector: DetectorConfig,
    pub extractor: ExtractorConfig,
}

/// On-disk shape; every table is optional
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    profile: Option<Profile>,
    detector: Option<toml::Table>,
    extractor: Option<toml::Table>,
}

impl Default for Config {
    fn default() -> Self {
        Self::for_profile(Profile::Strict)
    }
}

impl Config {
    /// Defaults for a profile
    pub fn for_profile(profile: Profile) -> Self {
        let mut config = Self {
            profile,
            detector: DetectorConfig::default(),
            extractor: ExtractorConfig::default(),
        };
        config.apply_profile(profile);
        config
    }

    /// Overwrite the profile-specific knobs
    pub fn apply_profile(&mut self, profile: Profile) {
        self.profile = profile;
        self.detector.verdict = profile.verdict();
        self.extractor.min_document_length = profile.min_document_length();
    }

    /// Parse a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content).context("Invalid configuration")?;
        let profile = file.profile.unwrap_or_default();
        let base = Self::for_profile(profile);

        // profile knobs left out of a partial table follow the profile
        let detector = match file.detector {
            Some(table) => {
                let has_verdict = table.contains_key("verdict");
                let mut detector: DetectorConfig = toml::Value::Table(table)
                    .try_into()
                    .context("Invalid [detector] table")?;
                if !has_verdict {
                    detector.verdict = profile.verdict();
                }
                detector
            }
            None => base.detector,
        };

        let extractor = match file.extractor {
            Some(table) => {
                let has_min_length = table.contains_key("min_document_length");
                let mut extractor: ExtractorConfig = toml::Value::Table(table)
                    .try_into()
                    .context("Invalid [extractor] table")?;
                if !has_min_length {
                    extractor.min_document_length = profile.min_document_length();
                }
                extractor
            }
            None => base.extractor,
        };

        let config = Self {
            profile,
            detector,
            extractor,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path` or return defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.detector.validate()?;
        self.extractor.chunking.validate()?;
        Ok(())
    }

    /// `<config_dir>/lexscan/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(crate::APP_NAME).join("config.toml"))
    }
}

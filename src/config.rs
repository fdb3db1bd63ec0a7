//! Configuration file handling.
//!
//! Settings live in `config.toml` under the platform config directory
//! (`~/.config/markwav/` on Linux), or wherever `MARKWAV_CONFIG` points.
//! Every field has a default, so a missing file or a partial one is fine.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::bwf::{bext, BextInfo, BwfEncoder, TimeReferencePolicy, WavFormat};
use crate::files::filename::DEFAULT_TEMPLATE;
use crate::timecode::Timecode;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "MARKWAV_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub encoder: EncoderConfig,
    pub csv: CsvConfig,
    pub output: OutputConfig,
    pub hook: HookConfig,
}

/// `[encoder]`: what goes into the `bext` chunk and how large files may get.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Overrides the generated "markwav <version> marker export" text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub originator: String,
    pub time_reference: TimeReferencePolicy,
    /// Longest timeline (in seconds) to encode; unlimited when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_duration_secs: Option<u64>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            description: None,
            originator: crate::ORIGINATOR.to_string(),
            time_reference: TimeReferencePolicy::Zero,
            max_duration_secs: None,
        }
    }
}

/// `[csv]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    /// Frame rate for `HH:MM:SS:FF` cells; auto-detected when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<f64>,
}

/// `[output]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output filename template; tags: `{stem}`, `{date}`, `{time}`.
    pub filename_template: String,
    /// Maximum length of the `{stem}` part.
    pub stem_max_length: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            filename_template: DEFAULT_TEMPLATE.to_string(),
            stem_max_length: 50,
        }
    }
}

/// `[hook]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HookConfig {
    /// Program and arguments run after a file is written. `{path}` and
    /// `{session_start}` are substituted. Empty disables the hook.
    pub command: Vec<String>,
}

impl Config {
    /// Path of the config file.
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.is_empty() {
                return Ok(PathBuf::from(path));
            }
        }
        let dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(dir.join("markwav").join("config.toml"))
    }

    /// Load from the default location, falling back to defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write to the default location, creating the directory.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, self.to_toml()?)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(path)
    }

    /// Encoder stamped with the current time and this config's bext fields.
    pub fn encoder(&self, session_start: Option<Timecode>) -> BwfEncoder {
        let description = self
            .encoder
            .description
            .clone()
            .unwrap_or_else(bext::default_description);
        let info = BextInfo::now(description, self.encoder.originator.as_str());
        let samples = self
            .encoder
            .time_reference
            .samples(session_start, WavFormat::default().sample_rate);

        BwfEncoder::new(info.with_time_reference(samples))
            .with_max_duration(self.encoder.max_duration_secs)
    }
}

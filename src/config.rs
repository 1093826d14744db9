use crate::format::VideoFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Manager configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GrabConfig {
    /// Delay between simulated progress ticks (ms).
    pub tick_interval_ms: u64,
    /// Percentage added per tick.
    pub progress_step: u8,
    /// Capacity of the event broadcast channel.
    pub event_capacity: usize,
    /// Start with the dashboard's sample entries.
    pub seed_demo_entries: bool,
    /// Overrides the catalog's initial enabled flags when set.
    pub enabled_formats: Option<Vec<VideoFormat>>,
    pub debug: bool,
}

impl Default for GrabConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 500,
            progress_step: 10,
            event_capacity: 100,
            seed_demo_entries: false,
            enabled_formats: None,
            debug: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GrabConfigBuilder {
    inner: GrabConfig,
}

impl GrabConfigBuilder {
    pub fn new() -> Self {
        Self {
            inner: GrabConfig::default(),
        }
    }

    pub fn tick_interval_ms(mut self, ms: u64) -> Self {
        self.inner.tick_interval_ms = ms;
        self
    }

    pub fn progress_step(mut self, step: u8) -> Self {
        self.inner.progress_step = step;
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.inner.event_capacity = capacity;
        self
    }

    pub fn seed_demo_entries(mut self, seed: bool) -> Self {
        self.inner.seed_demo_entries = seed;
        self
    }

    pub fn enabled_formats(mut self, formats: Vec<VideoFormat>) -> Self {
        self.inner.enabled_formats = Some(formats);
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.inner.debug = debug;
        self
    }

    pub fn build(self) -> Result<GrabConfig, GrabConfigError> {
        self.inner.validate()?;
        Ok(self.inner)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GrabConfigError {
    #[error("Tick interval must be positive, got {0}ms")]
    InvalidTickInterval(u64),
    #[error("Progress step must be within 1..=100, got {0}")]
    InvalidProgressStep(u8),
    #[error("Event channel capacity must be positive")]
    InvalidEventCapacity,
}

impl GrabConfig {
    pub fn validate(&self) -> Result<(), GrabConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(GrabConfigError::InvalidTickInterval(self.tick_interval_ms));
        }

        if self.progress_step == 0 || self.progress_step > 100 {
            return Err(GrabConfigError::InvalidProgressStep(self.progress_step));
        }

        if self.event_capacity == 0 {
            return Err(GrabConfigError::InvalidEventCapacity);
        }

        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Loads a TOML config file; missing keys fall back to defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, crate::GrabError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = content.parse()?;
        config.validate()?;
        Ok(config)
    }
}

impl FromStr for GrabConfig {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_reference_timing() {
        let config = GrabConfig::default();
        assert_eq!(config.tick_interval(), Duration::from_millis(500));
        assert_eq!(config.progress_step, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_rejects_bad_values() {
        assert_eq!(
            GrabConfigBuilder::new().tick_interval_ms(0).build().unwrap_err(),
            GrabConfigError::InvalidTickInterval(0)
        );
        assert_eq!(
            GrabConfigBuilder::new().progress_step(0).build().unwrap_err(),
            GrabConfigError::InvalidProgressStep(0)
        );
        assert_eq!(
            GrabConfigBuilder::new().progress_step(101).build().unwrap_err(),
            GrabConfigError::InvalidProgressStep(101)
        );
        assert_eq!(
            GrabConfigBuilder::new().event_capacity(0).build().unwrap_err(),
            GrabConfigError::InvalidEventCapacity
        );
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config: GrabConfig = "progress_step = 25\nenabled_formats = [\"mp4\", \"flv\"]"
            .parse()
            .unwrap();
        assert_eq!(config.progress_step, 25);
        assert_eq!(config.tick_interval_ms, 500);
        assert_eq!(
            config.enabled_formats,
            Some(vec![VideoFormat::Mp4, VideoFormat::Flv])
        );
    }

    #[test]
    fn from_file_validates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tick_interval_ms = 0").unwrap();
        let err = GrabConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, crate::GrabError::ConfigError(_)));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tick_interval_ms = 100\nseed_demo_entries = true").unwrap();
        let config = GrabConfig::from_file(file.path()).unwrap();
        assert_eq!(config.tick_interval_ms, 100);
        assert!(config.seed_demo_entries);
    }
}

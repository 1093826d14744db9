use crate::format::VideoFormat;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOption {
    pub id: u32,
    pub format: VideoFormat,
    pub name: String,
    pub extension: String,
    pub description: String,
    pub quality_label: String,
    pub size_label: String,
    pub enabled: bool,
}

impl FormatOption {
    fn builtin(
        id: u32,
        format: VideoFormat,
        name: &str,
        description: &str,
        quality_label: &str,
        size_label: &str,
        enabled: bool,
    ) -> Self {
        Self {
            id,
            format,
            name: name.to_string(),
            extension: format.extension().to_string(),
            description: description.to_string(),
            quality_label: quality_label.to_string(),
            size_label: size_label.to_string(),
            enabled,
        }
    }
}

/// Fixed list of supported containers. Only the `enabled` flags change after construction.
#[derive(Debug, Clone)]
pub struct FormatCatalog {
    options: Vec<FormatOption>,
}

impl Default for FormatCatalog {
    fn default() -> Self {
        Self {
            options: vec![
                FormatOption::builtin(
                    1,
                    VideoFormat::Mp4,
                    "MP4",
                    "Universal format with wide compatibility",
                    "High",
                    "Medium",
                    true,
                ),
                FormatOption::builtin(
                    2,
                    VideoFormat::Avi,
                    "AVI",
                    "Classic Windows format",
                    "Excellent",
                    "Large",
                    true,
                ),
                FormatOption::builtin(
                    3,
                    VideoFormat::Mkv,
                    "MKV",
                    "Open container with multi-track support",
                    "Maximum",
                    "Large",
                    true,
                ),
                FormatOption::builtin(
                    4,
                    VideoFormat::Mov,
                    "MOV",
                    "Apple QuickTime format",
                    "High",
                    "Medium",
                    false,
                ),
                FormatOption::builtin(
                    5,
                    VideoFormat::Webm,
                    "WebM",
                    "Optimized for web playback",
                    "High",
                    "Small",
                    true,
                ),
                FormatOption::builtin(
                    6,
                    VideoFormat::Flv,
                    "FLV",
                    "Flash Video for streaming",
                    "Medium",
                    "Small",
                    false,
                ),
            ],
        }
    }
}

impl FormatCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in catalog with exactly `enabled` switched on.
    pub fn with_enabled(enabled: &[VideoFormat]) -> Self {
        let mut catalog = Self::default();
        for option in catalog.options.iter_mut() {
            option.enabled = enabled.contains(&option.format);
        }
        catalog
    }

    pub fn options(&self) -> &[FormatOption] {
        &self.options
    }

    pub fn get(&self, id: u32) -> Option<&FormatOption> {
        self.options.iter().find(|o| o.id == id)
    }

    pub fn enabled(&self) -> impl Iterator<Item = &FormatOption> {
        self.options.iter().filter(|o| o.enabled)
    }

    pub fn is_enabled(&self, format: VideoFormat) -> bool {
        self.options
            .iter()
            .any(|o| o.format == format && o.enabled)
    }

    /// Flips `enabled` and returns the new value; unknown ids return `None`.
    pub fn toggle(&mut self, id: u32) -> Option<bool> {
        let option = self.options.iter_mut().find(|o| o.id == id)?;
        option.enabled = !option.enabled;
        debug!(
            "[Catalog] {} is now {}",
            option.name,
            if option.enabled { "enabled" } else { "disabled" }
        );
        Some(option.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_matches_shipped_flags() {
        let catalog = FormatCatalog::default();
        assert_eq!(catalog.options().len(), 6);
        let enabled: Vec<&str> = catalog.enabled().map(|o| o.name.as_str()).collect();
        assert_eq!(enabled, vec!["MP4", "AVI", "MKV", "WebM"]);
        assert_eq!(catalog.get(5).unwrap().extension, ".webm");
    }

    #[test]
    fn toggle_is_self_inverse() {
        let mut catalog = FormatCatalog::default();
        for option in catalog.options().to_vec() {
            catalog.toggle(option.id);
            catalog.toggle(option.id);
            assert_eq!(catalog.get(option.id).unwrap().enabled, option.enabled);
        }
    }

    #[test]
    fn toggle_touches_only_the_target() {
        let mut catalog = FormatCatalog::default();
        let before = catalog.options().to_vec();
        assert_eq!(catalog.toggle(4), Some(true));
        for (old, new) in before.iter().zip(catalog.options()) {
            if old.id == 4 {
                assert!(new.enabled);
            } else {
                assert_eq!(old, new);
            }
        }
    }

    #[test]
    fn toggle_unknown_id_is_noop() {
        let mut catalog = FormatCatalog::default();
        let before = catalog.options().to_vec();
        assert_eq!(catalog.toggle(42), None);
        assert_eq!(catalog.options(), before.as_slice());
    }

    #[test]
    fn with_enabled_overrides_flags() {
        let catalog = FormatCatalog::with_enabled(&[VideoFormat::Flv]);
        assert!(catalog.is_enabled(VideoFormat::Flv));
        assert!(!catalog.is_enabled(VideoFormat::Mp4));
        assert_eq!(catalog.enabled().count(), 1);
    }
}

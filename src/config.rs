//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section is optional; missing sections and keys fall back to the
//! defaults below, so an empty file is a valid configuration.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{PresenterError, Result};
use crate::gamepad::profile::ButtonLayout;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub presentation: PresentationConfig,
    #[serde(default)]
    pub gamepad: GamepadConfig,
    #[serde(default)]
    pub document: DocumentConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Presentation mode configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PresentationConfig {
    #[serde(default = "default_controls_hide_delay_ms")]
    pub controls_hide_delay_ms: u64,

    #[serde(default = "default_swipe_min_distance_px")]
    pub swipe_min_distance_px: f64,

    #[serde(default = "default_swipe_angle_threshold_deg")]
    pub swipe_angle_threshold_deg: f64,

    #[serde(default = "default_auto_start")]
    pub auto_start: bool,
}

/// Gamepad configuration
#[derive(Debug, Deserialize, Clone)]
pub struct GamepadConfig {
    #[serde(default = "default_gamepad_enabled")]
    pub enabled: bool,

    #[serde(default = "default_refresh_rate_hz")]
    pub refresh_rate_hz: u32,

    #[serde(default)]
    pub button_layout: ButtonLayout,

    #[serde(default = "default_input_dir")]
    pub input_dir: String,

    #[serde(default = "default_rescan_interval_ms")]
    pub rescan_interval_ms: u64,
}

/// Headless document configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DocumentConfig {
    #[serde(default = "default_page_count")]
    pub page_count: u32,

    #[serde(default = "default_equal_page_sizes")]
    pub equal_page_sizes: bool,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub log_dir: Option<String>,
}

// Default value functions
fn default_controls_hide_delay_ms() -> u64 { 3000 }
fn default_swipe_min_distance_px() -> f64 { 50.0 }
fn default_swipe_angle_threshold_deg() -> f64 { 30.0 }
fn default_auto_start() -> bool { true }

fn default_gamepad_enabled() -> bool { true }
fn default_refresh_rate_hz() -> u32 { 60 }
fn default_input_dir() -> String { "/dev/input".to_string() }
fn default_rescan_interval_ms() -> u64 { 1000 }

fn default_page_count() -> u32 { 20 }
fn default_equal_page_sizes() -> bool { true }

fn default_log_level() -> String { "info".to_string() }

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            controls_hide_delay_ms: default_controls_hide_delay_ms(),
            swipe_min_distance_px: default_swipe_min_distance_px(),
            swipe_angle_threshold_deg: default_swipe_angle_threshold_deg(),
            auto_start: default_auto_start(),
        }
    }
}

impl Default for GamepadConfig {
    fn default() -> Self {
        Self {
            enabled: default_gamepad_enabled(),
            refresh_rate_hz: default_refresh_rate_hz(),
            button_layout: ButtonLayout::default(),
            input_dir: default_input_dir(),
            rescan_interval_ms: default_rescan_interval_ms(),
        }
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            page_count: default_page_count(),
            equal_page_sizes: default_equal_page_sizes(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: None,
        }
    }
}

fn invalid(message: impl std::fmt::Display) -> PresenterError {
    PresenterError::Config(toml::de::Error::custom(message))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pdf_presenter::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        let presentation = &self.presentation;

        if presentation.controls_hide_delay_ms == 0 || presentation.controls_hide_delay_ms > 60000 {
            return Err(invalid("controls_hide_delay_ms must be between 1 and 60000"));
        }

        if !(presentation.swipe_min_distance_px > 0.0) || presentation.swipe_min_distance_px > 1000.0 {
            return Err(invalid("swipe_min_distance_px must be greater than 0 and at most 1000"));
        }

        // Above 45 degrees the horizontal and vertical sectors would overlap
        if !(presentation.swipe_angle_threshold_deg > 0.0) || presentation.swipe_angle_threshold_deg >= 45.0 {
            return Err(invalid("swipe_angle_threshold_deg must be greater than 0 and below 45"));
        }

        if self.gamepad.refresh_rate_hz == 0 || self.gamepad.refresh_rate_hz > 1000 {
            return Err(invalid("refresh_rate_hz must be between 1 and 1000"));
        }

        if self.gamepad.enabled && self.gamepad.input_dir.is_empty() {
            return Err(invalid("gamepad input_dir cannot be empty when enabled"));
        }

        if self.gamepad.rescan_interval_ms == 0 || self.gamepad.rescan_interval_ms > 60000 {
            return Err(invalid("rescan_interval_ms must be between 1 and 60000"));
        }

        if self.document.page_count == 0 {
            return Err(invalid("page_count must be greater than 0"));
        }

        if !["trace", "debug", "info", "warn", "error"].contains(&self.logging.level.as_str()) {
            return Err(invalid("log level must be one of: trace, debug, info, warn, error"));
        }

        if matches!(&self.logging.log_dir, Some(dir) if dir.is_empty()) {
            return Err(invalid("log_dir cannot be empty when set"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.presentation.controls_hide_delay_ms, 3000);
        assert_eq!(config.presentation.swipe_min_distance_px, 50.0);
        assert_eq!(config.presentation.swipe_angle_threshold_deg, 30.0);
        assert_eq!(config.gamepad.refresh_rate_hz, 60);
        assert_eq!(config.gamepad.button_layout, ButtonLayout::Standard);
        assert!(config.logging.log_dir.is_none());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = Config::from_toml("").expect("empty config should be valid");
        assert_eq!(config.document.page_count, 20);
        assert!(config.gamepad.enabled);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = Config::from_toml(
            r#"
            [gamepad]
            button_layout = "safari"
            refresh_rate_hz = 120
            "#,
        )
        .expect("partial config should be valid");

        assert_eq!(config.gamepad.button_layout, ButtonLayout::Safari);
        assert_eq!(config.gamepad.refresh_rate_hz, 120);
        assert_eq!(config.gamepad.input_dir, "/dev/input");

        let config = Config::from_toml(
            r#"
            [gamepad]
            button_layout = "evdev"
            "#,
        )
        .expect("evdev layout should parse");
        assert_eq!(config.gamepad.button_layout, ButtonLayout::Evdev);
    }

    #[test]
    fn test_invalid_hide_delay() {
        let mut config = Config::default();
        config.presentation.controls_hide_delay_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_swipe_angle() {
        let mut config = Config::default();
        config.presentation.swipe_angle_threshold_deg = 45.0;
        assert!(config.validate().is_err(), "Overlapping swipe sectors should be rejected");

        config.presentation.swipe_angle_threshold_deg = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_refresh_rate() {
        let mut config = Config::default();
        config.gamepad.refresh_rate_hz = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let result = Config::from_toml(
            r#"
            [logging]
            level = "verbose"
            "#,
        );
        assert!(matches!(result, Err(PresenterError::Config(_))));
    }

    #[test]
    fn test_unknown_button_layout_is_parse_error() {
        let result = Config::from_toml(
            r#"
            [gamepad]
            button_layout = "gecko"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [presentation]
            controls_hide_delay_ms = 1500

            [document]
            page_count = 3
            "#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.presentation.controls_hide_delay_ms, 1500);
        assert_eq!(config.document.page_count, 3);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/pdf-presenter.toml");
        assert!(matches!(result, Err(PresenterError::Io(_))));
    }

    #[test]
    fn test_shipped_default_config_is_valid() {
        let contents = include_str!("../config/default.toml");
        assert!(Config::from_toml(contents).is_ok());
    }
}

//! Editor configuration: hit tolerances, size limits and decoration colors.
//!
//! The host may pass a JSON object to [`EditorConfig::from_json`]; every key
//! is optional and falls back to the values in [`crate::consts`].

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::Deserialize;

use crate::consts::{
    ACCENT_COLOR, DUPLICATE_OFFSET, HANDLE_SIZE, HANDLE_THRESHOLD, HISTORY_LIMIT, HOVER_COLOR, MIN_FONT_SIZE,
    MIN_SIZE, ROTATE_HANDLE_OFFSET, ROTATE_HANDLE_RADIUS,
};

/// Errors produced while building an [`EditorConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The JSON payload could not be parsed.
    #[error("config parse failed: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value was present but out of range.
    #[error("invalid config value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Minimum shape width/height after a resize.
    pub min_size: f64,
    /// Minimum font size after a text resize.
    pub min_font_size: f64,
    /// Grab distance for corner and edge handles.
    pub handle_threshold: f64,
    /// Distance of the rotate handle above the bounding box.
    pub rotate_handle_offset: f64,
    /// Radius of the rotate handle hotspot.
    pub rotate_handle_radius: f64,
    /// Drawn size of a resize handle.
    pub handle_size: f64,
    /// Position offset for duplicated elements.
    pub duplicate_offset: f64,
    /// Maximum retained snapshots; `0` keeps every snapshot.
    pub history_limit: usize,
    pub accent_color: String,
    pub hover_color: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_size: MIN_SIZE,
            min_font_size: MIN_FONT_SIZE,
            handle_threshold: HANDLE_THRESHOLD,
            rotate_handle_offset: ROTATE_HANDLE_OFFSET,
            rotate_handle_radius: ROTATE_HANDLE_RADIUS,
            handle_size: HANDLE_SIZE,
            duplicate_offset: DUPLICATE_OFFSET,
            history_limit: HISTORY_LIMIT,
            accent_color: ACCENT_COLOR.to_owned(),
            hover_color: HOVER_COLOR.to_owned(),
        }
    }
}

impl EditorConfig {
    /// Build a config from a JSON object, filling absent keys with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] when a size is not positive or a color is empty.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every tolerance is positive and every color is set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("min_size", self.min_size)?;
        positive("min_font_size", self.min_font_size)?;
        positive("handle_threshold", self.handle_threshold)?;
        positive("rotate_handle_offset", self.rotate_handle_offset)?;
        positive("rotate_handle_radius", self.rotate_handle_radius)?;
        positive("handle_size", self.handle_size)?;
        if !self.duplicate_offset.is_finite() {
            return Err(ConfigError::Invalid { key: "duplicate_offset", reason: "must be finite".into() });
        }
        non_empty("accent_color", &self.accent_color)?;
        non_empty("hover_color", &self.hover_color)?;
        Ok(())
    }
}

fn positive(key: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid { key, reason: format!("expected a positive number, got {value}") })
    }
}

fn non_empty(key: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::Invalid { key, reason: "must not be empty".into() })
    } else {
        Ok(())
    }
}

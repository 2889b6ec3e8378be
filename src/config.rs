//! Overlay rendering options and their JSON persistence.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::{CaretHeight, Direction};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no data directory on this platform")]
    NoConfigDir,
}

/// Rendering options for carets and selection highlights.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Draw the caret of non-empty ranges too.
    pub show_cursor_when_selecting: bool,
    /// Carets span the whole logical line instead of one wrapped row.
    pub single_cursor_height_per_line: bool,
    /// Scale applied to the primary caret height.
    pub cursor_height: f32,
    /// Milliseconds per blink phase. Zero keeps the caret steady, negative
    /// hides it.
    pub cursor_blink_rate: i64,
    /// Max vertical drift, in px, for two edges to count as one visual row.
    pub row_tolerance: f32,
    /// Max vertical drift, in px, for a folded join to count as one row.
    pub join_tolerance: f32,
    /// Horizontal inset of highlights on region-tagged lines.
    pub region_inset: f32,
    pub direction: Direction,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            show_cursor_when_selecting: false,
            single_cursor_height_per_line: true,
            cursor_height: 1.0,
            cursor_blink_rate: 530,
            row_tolerance: 3.0,
            join_tolerance: 2.0,
            region_inset: 4.0,
            direction: Direction::Ltr,
        }
    }
}

impl OverlayConfig {
    pub fn blink_mode(&self) -> BlinkMode {
        BlinkMode::from_millis(self.cursor_blink_rate)
    }

    pub fn caret_height(&self) -> CaretHeight {
        if self.single_cursor_height_per_line {
            CaretHeight::Line
        } else {
            CaretHeight::Row
        }
    }
}

/// Caret blinking behaviour derived from the sign-significant blink rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlinkMode {
    Blink(Duration),
    Steady,
    Hidden,
}

impl BlinkMode {
    pub fn from_millis(rate: i64) -> Self {
        match rate {
            0 => BlinkMode::Steady,
            r if r < 0 => BlinkMode::Hidden,
            r => BlinkMode::Blink(Duration::from_millis(r.unsigned_abs())),
        }
    }
}

pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dir = dirs::data_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(dir.join("selection-overlay").join("config.json"))
}

pub fn load_config_from(path: &Path) -> Result<OverlayConfig, ConfigError> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

pub fn save_config_to(path: &Path, config: &OverlayConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Loads the user config, falling back to defaults when it is missing or
/// unreadable.
pub fn load_config() -> OverlayConfig {
    let path = match config_path() {
        Ok(path) => path,
        Err(err) => {
            tracing::debug!(%err, "using default overlay config");
            return OverlayConfig::default();
        }
    };
    match load_config_from(&path) {
        Ok(config) => {
            tracing::debug!(path = %path.display(), "loaded overlay config");
            config
        }
        Err(ConfigError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
            OverlayConfig::default()
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "ignoring unreadable overlay config");
            OverlayConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blink_rate_sign_selects_mode() {
        assert_eq!(
            BlinkMode::from_millis(530),
            BlinkMode::Blink(Duration::from_millis(530))
        );
        assert_eq!(BlinkMode::from_millis(0), BlinkMode::Steady);
        assert_eq!(BlinkMode::from_millis(-1), BlinkMode::Hidden);
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.json");
        let config = OverlayConfig {
            cursor_blink_rate: -1,
            direction: Direction::Rtl,
            region_inset: 6.0,
            ..OverlayConfig::default()
        };
        save_config_to(&path, &config).expect("save");
        assert_eq!(load_config_from(&path).expect("load"), config);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "cursor_height": 0.5, "direction": "rtl" }"#).expect("write");
        let config = load_config_from(&path).expect("load");
        assert_eq!(config.cursor_height, 0.5);
        assert_eq!(config.direction, Direction::Rtl);
        assert_eq!(config.row_tolerance, 3.0);
        assert!(config.single_cursor_height_per_line);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").expect("write");
        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));
    }
}

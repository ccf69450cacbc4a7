//! # Configuration
//!
//! Reader settings loaded from YAML (kebab-case keys, every key optional).
//!
//! ## Example
//! ```yaml
//! text-dir: ./bible
//! rate: 1.2
//! pitch: 1.0
//! voice-lang: ko
//! voice-timeout-ms: 2000
//! pacing:
//!   base-wpm: 170
//!   min-tick-ms: 40
//!   min-steps: 8
//! line-format:
//!   header: "{book} {chapter}장 {verse}절. "
//!   missing: "(구절 없음)"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ReaderError;
use crate::narration::LineFormat;
use crate::speech::PacingConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ReaderConfig {
    /// Directory holding `<canonical name>.txt` files.
    pub text_dir: PathBuf,
    pub rate: f32,
    pub pitch: f32,
    /// Preferred voice language tag prefix, e.g. `ko` or `en`.
    pub voice_lang: String,
    /// How long to wait for the backend to enumerate voices.
    pub voice_timeout_ms: u64,
    pub pacing: PacingConfig,
    pub line_format: LineFormat,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            text_dir: PathBuf::from("bible"),
            rate: 1.0,
            pitch: 1.0,
            voice_lang: "ko".to_string(),
            voice_timeout_ms: 2000,
            pacing: PacingConfig::default(),
            line_format: LineFormat::default(),
        }
    }
}

impl ReaderConfig {
    pub fn from_yaml(content: &str) -> Result<Self, ReaderError> {
        let config: ReaderConfig =
            serde_yaml::from_str(content).map_err(|e| ReaderError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ReaderError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ReaderError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> Result<(), ReaderError> {
        validate_voice_params(self.rate, self.pitch)?;
        self.pacing.validate()
    }

    pub fn voice_timeout(&self) -> Duration {
        Duration::from_millis(self.voice_timeout_ms)
    }
}

/// Rate and pitch must be positive, finite multipliers.
pub fn validate_voice_params(rate: f32, pitch: f32) -> Result<(), ReaderError> {
    if !(rate.is_finite() && rate > 0.0) {
        return Err(ReaderError::Config(format!("rate must be positive, got {}", rate)));
    }
    if !(pitch.is_finite() && pitch > 0.0) {
        return Err(ReaderError::Config(format!("pitch must be positive, got {}", pitch)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_gives_defaults() {
        let config = ReaderConfig::from_yaml("{}").unwrap();
        assert_eq!(config, ReaderConfig::default());
        assert_eq!(config.voice_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_partial_yaml_overrides() {
        let config = ReaderConfig::from_yaml(
            r#"
text-dir: /srv/texts
rate: 1.5
pacing:
  base-wpm: 200
line-format:
  missing: "[none]"
"#,
        )
        .unwrap();
        assert_eq!(config.text_dir, PathBuf::from("/srv/texts"));
        assert_eq!(config.rate, 1.5);
        assert_eq!(config.pitch, 1.0);
        assert_eq!(config.pacing.base_wpm, 200.0);
        assert_eq!(config.pacing.min_tick_ms, 40);
        assert_eq!(config.line_format.missing, "[none]");
        assert_eq!(config.line_format.header, LineFormat::default().header);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(ReaderConfig::from_yaml("rate: 0"), Err(ReaderError::Config(_))));
        assert!(matches!(ReaderConfig::from_yaml("pitch: -1"), Err(ReaderError::Config(_))));
        assert!(matches!(
            ReaderConfig::from_yaml("pacing:\n  min-tick-ms: 0"),
            Err(ReaderError::Config(_))
        ));
        assert!(matches!(ReaderConfig::from_yaml("rate: [1, 2]"), Err(ReaderError::Config(_))));
    }

    #[test]
    fn test_validate_voice_params() {
        assert!(validate_voice_params(1.0, 1.0).is_ok());
        assert!(validate_voice_params(f32::NAN, 1.0).is_err());
        assert!(validate_voice_params(1.0, f32::INFINITY).is_err());
    }
}

//! Session configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::SpeedProfile;

fn default_limit() -> String {
    "*1.0".to_string()
}

fn default_indentation_speed() -> f64 {
    1.0
}

fn default_frame_rate() -> u32 {
    24
}

fn default_language() -> String {
    "python".to_string()
}

fn default_resolution() -> (u32, u32) {
    (1920, 1080)
}

fn default_max_concurrency() -> usize {
    50
}

fn default_close_up_fraction() -> f64 {
    0.3
}

fn default_overview_fraction() -> f64 {
    0.05
}

/// Top-level session configuration.
///
/// The source text itself is passed separately; everything here is
/// serde-friendly so sessions can be described in JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Directory receiving the video, the preview image and the working dir.
    pub output_dir: PathBuf,
    /// Output video file name (e.g. `"output.mp4"`).
    pub output_name: String,
    /// Typing speed function.
    #[serde(default)]
    pub speed: SpeedProfile,
    /// Limit spec: `"*scale"` fixed speed scale, `"-seconds"` target duration.
    #[serde(default = "default_limit")]
    pub limit: String,
    /// Per-indent-level speed multiplier (>1 types indented code faster).
    #[serde(default = "default_indentation_speed")]
    pub indentation_speed: f64,
    /// Hold time before typing starts, seconds.
    #[serde(default)]
    pub start_rest: f64,
    /// Hold time after typing ends, seconds.
    #[serde(default)]
    pub end_rest: f64,
    /// Output video frame rate.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    /// Optional background image (PAM); must match `resolution` exactly.
    #[serde(default)]
    pub background_image: Option<PathBuf>,
    /// Header line shown above the code; defaults to the output stem.
    #[serde(default)]
    pub header_text: Option<String>,
    /// Language tag for the tokenizer.
    #[serde(default = "default_language")]
    pub language: String,
    /// Video resolution (width, height) in pixels.
    #[serde(default = "default_resolution")]
    pub resolution: (u32, u32),
    /// Maximum in-flight render tasks.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Fraction of the frame width a sample line occupies at the initial
    /// (closest) zoom.
    #[serde(default = "default_close_up_fraction")]
    pub close_up_fraction: f64,
    /// Fraction of the frame width the same sample occupies fully zoomed out;
    /// also fixes the logical line height.
    #[serde(default = "default_overview_fraction")]
    pub overview_fraction: f64,
    /// Camera spring tuning.
    #[serde(default)]
    pub camera: CameraTuning,
}

/// Spring-damper camera parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CameraTuning {
    /// Spring constant pulling the camera center toward its target.
    pub spring_k: f64,
    /// Linear damping opposing the camera velocity.
    pub damping: f64,
    /// Maximum per-axis camera speed in screen pixels per second.
    pub max_velocity: f64,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            spring_k: 1.40,
            damping: 0.85,
            max_velocity: 50.0,
        }
    }
}

/// Parsed limit spec.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LimitSpec {
    /// Run the timeline once with this fixed speed scale.
    Scale(f64),
    /// Search for the scale that hits this total duration in seconds.
    Duration(f64),
}

impl LimitSpec {
    /// Parse `"*scale"` or `"-seconds"`.
    pub fn parse(spec: &str) -> Result<Self, ConfigError> {
        let bad = || ConfigError::InvalidLimitSpec(spec.to_string());
        let rest = spec.get(1..).ok_or_else(bad)?;
        match spec.chars().next() {
            Some('*') => rest.parse().map(LimitSpec::Scale).map_err(|_| bad()),
            Some('-') => rest.parse().map(LimitSpec::Duration).map_err(|_| bad()),
            _ => Err(bad()),
        }
    }
}

impl SessionConfig {
    /// Parsed limit spec.
    pub fn limit_spec(&self) -> Result<LimitSpec, ConfigError> {
        LimitSpec::parse(&self.limit)
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolution.0 == 0 || self.resolution.1 == 0 {
            return Err(ConfigError::InvalidResolution);
        }
        if self.frame_rate == 0 {
            return Err(ConfigError::InvalidFrameRate);
        }
        if self.indentation_speed <= 0.0 {
            return Err(ConfigError::InvalidIndentationSpeed);
        }
        if self.start_rest < 0.0 || self.end_rest < 0.0 {
            return Err(ConfigError::InvalidRest);
        }
        if self.max_concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency);
        }
        if !(0.0 < self.overview_fraction && self.overview_fraction <= self.close_up_fraction) {
            return Err(ConfigError::InvalidFontFractions);
        }
        match self.limit_spec()? {
            LimitSpec::Scale(s) if s <= 0.0 => {
                return Err(ConfigError::InvalidLimitSpec(self.limit.clone()));
            }
            LimitSpec::Duration(t) if t <= 0.0 => {
                return Err(ConfigError::InvalidLimitSpec(self.limit.clone()));
            }
            _ => {}
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown limit spec {0:?}: expected \"*scale\" or \"-seconds\"")]
    InvalidLimitSpec(String),
    #[error("resolution must be non-zero in both dimensions")]
    InvalidResolution,
    #[error("frame rate must be non-zero")]
    InvalidFrameRate,
    #[error("indentation speed factor must be positive")]
    InvalidIndentationSpeed,
    #[error("rest durations must be non-negative")]
    InvalidRest,
    #[error("max concurrency must be non-zero")]
    InvalidConcurrency,
    #[error("font fractions must satisfy 0 < overview <= close-up")]
    InvalidFontFractions,
    #[error(
        "background image is {found_w}x{found_h} but the target resolution is {want_w}x{want_h}"
    )]
    BackgroundMismatch {
        found_w: u32,
        found_h: u32,
        want_w: u32,
        want_h: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> SessionConfig {
        serde_json::from_str(r#"{ "output_dir": "/tmp/out", "output_name": "demo.mp4" }"#)
            .unwrap()
    }

    #[test]
    fn test_defaults_validate() {
        let cfg = base();
        assert_eq!(cfg.frame_rate, 24);
        assert_eq!(cfg.limit, "*1.0");
        cfg.validate().unwrap();
    }

    #[test]
    fn test_limit_spec_parse() {
        assert_eq!(LimitSpec::parse("*2.5").unwrap(), LimitSpec::Scale(2.5));
        assert_eq!(LimitSpec::parse("-10").unwrap(), LimitSpec::Duration(10.0));
        assert!(matches!(
            LimitSpec::parse("10"),
            Err(ConfigError::InvalidLimitSpec(_))
        ));
        assert!(matches!(
            LimitSpec::parse(""),
            Err(ConfigError::InvalidLimitSpec(_))
        ));
        assert!(matches!(
            LimitSpec::parse("*x"),
            Err(ConfigError::InvalidLimitSpec(_))
        ));
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut cfg = base();
        cfg.frame_rate = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidFrameRate)));

        let mut cfg = base();
        cfg.limit = "-0".into();
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidLimitSpec(_))
        ));

        let mut cfg = base();
        cfg.overview_fraction = 0.5;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidFontFractions)
        ));
    }
}

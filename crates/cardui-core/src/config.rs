#![forbid(unsafe_code)]

//! Page configuration as data.
//!
//! [`PageConfig`] captures every tunable the page controller reads. It can be
//! supplied as JSON by the embedding page; every field defaults to the value
//! the page script has always used, so `PageConfig::default()` reproduces the
//! stock behavior.
//!
//! ```json
//! {
//!   "card_max_width": 520,
//!   "chaos": { "jitter": 24, "z_index_base": 1000 },
//!   "labels": { "active": "LOVE HTML", "inactive": "HATE HTML" },
//!   "hand": { "arc_deg": 35 }
//! }
//! ```
//!
//! Root CSS custom properties (`--card-max`, `--hand-*`) override the
//! corresponding fields at runtime; see `cardui-web`.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Errors raised while loading a [`PageConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: &'static str,
    },
}

/// Toggle-control wording pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToggleLabels {
    /// Label shown while chaos mode is active.
    pub active: String,
    /// Label shown while chaos mode is inactive.
    pub inactive: String,
}

impl Default for ToggleLabels {
    fn default() -> Self {
        Self {
            active: "LOVE HTML".to_owned(),
            inactive: "HATE HTML".to_owned(),
        }
    }
}

impl ToggleLabels {
    #[must_use]
    pub fn for_state(&self, active: bool) -> &str {
        if active { &self.active } else { &self.inactive }
    }
}

/// Largest accepted `chaos.jitter`, in px.
pub const MAX_JITTER_PX: f64 = 1.0e6;

/// Chaos-mode tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaosPolicy {
    /// Uniform positional jitter range in px applied on enter. `0` disables.
    pub jitter: f64,
    /// Starting value of the z-index counter; the first card gets `base + 1`.
    pub z_index_base: i64,
}

impl Default for ChaosPolicy {
    fn default() -> Self {
        Self {
            jitter: 0.0,
            z_index_base: 1000,
        }
    }
}

/// Hand-rotation tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandPolicy {
    /// Rotation applied at rest, in degrees.
    pub rest_rotation_deg: f64,
    /// Translation applied at rest, in px.
    pub rest_offset_px: f64,
    /// Pivot position as a fraction of the element width.
    pub pivot_x: f64,
    /// Pivot position as a fraction of the element height.
    pub pivot_y: f64,
    /// Half-width of the allowed rotation arc, in degrees.
    pub arc_deg: f64,
}

impl Default for HandPolicy {
    fn default() -> Self {
        Self {
            rest_rotation_deg: 0.0,
            rest_offset_px: 0.0,
            pivot_x: 0.5,
            pivot_y: 1.0,
            arc_deg: 35.0,
        }
    }
}

/// Top-level configuration for the page controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Viewport width (px) below which single-column grids switch to the
    /// stacked layout. Overridden by `--card-max`.
    pub card_max_width: f64,
    pub chaos: ChaosPolicy,
    pub labels: ToggleLabels,
    pub hand: HandPolicy,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            card_max_width: 480.0,
            chaos: ChaosPolicy::default(),
            labels: ToggleLabels::default(),
            hand: HandPolicy::default(),
        }
    }
}

impl PageConfig {
    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).inspect_err(|err| {
            debug!(%err, "config rejected: malformed JSON");
        })?;
        config.validate().inspect_err(|err| {
            debug!(%err, "config rejected");
        })?;
        Ok(config)
    }

    /// Reject values the controller cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.card_max_width.is_finite() || self.card_max_width < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "card_max_width",
                reason: "must be a finite, non-negative width",
            });
        }
        if !(0.0..=MAX_JITTER_PX).contains(&self.chaos.jitter) {
            return Err(ConfigError::InvalidValue {
                field: "chaos.jitter",
                reason: "must lie within 0..=1e6 px",
            });
        }
        if !self.hand.arc_deg.is_finite() || !(0.0..=180.0).contains(&self.hand.arc_deg) {
            return Err(ConfigError::InvalidValue {
                field: "hand.arc_deg",
                reason: "must lie within 0..=180",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, PageConfig};
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_object_is_default() {
        let config = PageConfig::from_json_str("{}").expect("empty config should load");
        assert_eq!(config, PageConfig::default());
    }

    #[test]
    fn partial_sections_keep_sibling_defaults() {
        let config = PageConfig::from_json_str(r#"{"chaos": {"jitter": 24}}"#)
            .expect("partial config should load");
        assert_eq!(config.chaos.jitter, 24.0);
        assert_eq!(config.chaos.z_index_base, 1000);
        assert_eq!(config.labels.for_state(true), "LOVE HTML");
        assert_eq!(config.labels.for_state(false), "HATE HTML");
    }

    #[test]
    fn negative_jitter_is_rejected() {
        let err = PageConfig::from_json_str(r#"{"chaos": {"jitter": -1}}"#)
            .expect_err("negative jitter must be rejected");
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "chaos.jitter",
                ..
            }
        ));
    }

    #[test]
    fn oversized_jitter_is_rejected() {
        for json in [r#"{"chaos": {"jitter": 1e308}}"#, r#"{"chaos": {"jitter": 1000001}}"#] {
            let err = PageConfig::from_json_str(json).expect_err("huge jitter must be rejected");
            assert!(matches!(
                err,
                ConfigError::InvalidValue {
                    field: "chaos.jitter",
                    ..
                }
            ));
        }
        assert!(PageConfig::from_json_str(r#"{"chaos": {"jitter": 1e6}}"#).is_ok());
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let err = PageConfig::from_json_str("{not json").expect_err("must fail");
        assert!(matches!(err, ConfigError::Json(_)));
        assert!(err.to_string().starts_with("invalid config JSON"));
    }
}

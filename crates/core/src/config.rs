use serde::{Deserialize, Serialize};

use crate::color::DEFAULT_FADE;
use crate::error::Error;

/// Knobs for [`crate::view::compute_view`]. Every field has a default, so a
/// partial JSON document only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Gutter taken off the right and bottom edge of every tile.
    pub inset: f64,
    /// Fraction of the viewport height given to the treemap.
    pub treemap_share: f64,
    /// Space between the treemap and the legend.
    pub legend_gap: f64,
    /// Pull of the palette toward white, 0 keeps the base colors.
    pub fade: f64,
    pub legend: LegendConfig,
    pub tooltip: TooltipConfig,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            inset: 1.0,
            treemap_share: 6.0 / 7.0,
            legend_gap: 8.0,
            fade: DEFAULT_FADE,
            legend: LegendConfig::default(),
            tooltip: TooltipConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegendConfig {
    pub rows: usize,
    /// Side of a swatch; a row is two swatches tall.
    pub swatch: f64,
    /// Space between a swatch and its label.
    pub label_gap: f64,
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            rows: 3,
            swatch: 16.0,
            label_gap: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TooltipConfig {
    /// Subtracted from the pointer position to place the tooltip.
    pub offset_x: f64,
    pub offset_y: f64,
    pub hover_opacity: f32,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            offset_x: 120.0,
            offset_y: 100.0,
            hover_opacity: 0.75,
        }
    }
}

impl ViewConfig {
    pub fn from_json(text: &str) -> crate::Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would put tiles or the legend outside the
    /// viewport or produce meaningless colors.
    pub fn validate(&self) -> crate::Result<()> {
        let share = self.treemap_share;
        if !(share > 0.0 && share <= 1.0) {
            return Err(invalid(format!("treemap_share {share} is outside (0, 1]")));
        }
        if !(0.0..=1.0).contains(&self.fade) {
            return Err(invalid(format!("fade {} is outside [0, 1]", self.fade)));
        }
        for (name, value) in [("inset", self.inset), ("legend_gap", self.legend_gap)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(format!("{name} {value} must be finite and not negative")));
            }
        }
        let swatch = self.legend.swatch;
        if !(swatch.is_finite() && swatch > 0.0) {
            return Err(invalid(format!("legend swatch {swatch} must be positive")));
        }
        Ok(())
    }
}

fn invalid(reason: String) -> Error {
    Error::InvalidConfig(reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = ViewConfig::from_json(r#"{"inset": 2.0, "legend": {"rows": 4}}"#).unwrap();
        assert_eq!(cfg.inset, 2.0);
        assert_eq!(cfg.legend.rows, 4);
        assert_eq!(cfg.legend.swatch, 16.0);
        assert_eq!(cfg.tooltip, TooltipConfig::default());
    }

    #[test]
    fn out_of_range_share_is_rejected() {
        for share in [1.5, 0.0, -0.25, f64::NAN] {
            let cfg = ViewConfig {
                treemap_share: share,
                ..ViewConfig::default()
            };
            assert!(matches!(cfg.validate(), Err(Error::InvalidConfig(_))), "{share}");
        }
        let err = ViewConfig::from_json(r#"{"treemap_share": 2.0}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(ViewConfig::from_json(r#"{"treemap_share": 1.0}"#).is_ok());
    }

    #[test]
    fn bad_fade_and_gutters_are_rejected() {
        assert!(ViewConfig::from_json(r#"{"fade": 1.5}"#).is_err());
        assert!(ViewConfig::from_json(r#"{"inset": -1.0}"#).is_err());
        assert!(ViewConfig::from_json(r#"{"legend": {"swatch": 0.0}}"#).is_err());
        assert!(ViewConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_json_is_default() {
        assert_eq!(ViewConfig::from_json("{}").unwrap(), ViewConfig::default());
    }
}

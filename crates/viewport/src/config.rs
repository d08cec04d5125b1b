use serde::{Deserialize, Serialize};

use crate::types::Size;

pub const CELL_WIDTH: f64 = 240.0;
pub const CELL_HEIGHT: f64 = 96.0;
pub const PAD_X: f64 = 24.0;
pub const PAD_Y: f64 = 18.0;

pub const MIN_SCALE: f64 = 0.2;
pub const MAX_SCALE: f64 = 2.0;
pub const DEFAULT_SCALE: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub cell: Size,
    pub padding: Size,
    pub min_scale: f64,
    pub max_scale: f64,
    pub default_scale: f64,
    pub wheel_sensitivity: f64,
    pub button_step: f64,
    pub pan_divisor: f64,
    pub snap_threshold: f64,
    pub reveal_margin: f64,
    pub include_root_edges: bool,
    pub cull_offscreen: bool,
    pub creator_size: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            cell: Size::new(CELL_WIDTH, CELL_HEIGHT),
            padding: Size::new(PAD_X, PAD_Y),
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            default_scale: DEFAULT_SCALE,
            wheel_sensitivity: 0.0025,
            button_step: 0.1,
            pan_divisor: 5.0,
            snap_threshold: 4.0,
            reveal_margin: 32.0,
            include_root_edges: false,
            cull_offscreen: false,
            creator_size: 28.0,
        }
    }
}

impl ViewportConfig {
    /// Repair values that would make the transform non-finite or the scale
    /// range empty. Invalid fields fall back to their defaults.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        let positive = |v: f64| v.is_finite() && v > 0.0;

        if !positive(self.cell.width) || !positive(self.cell.height) {
            self.cell = defaults.cell;
        }
        if !self.padding.width.is_finite() || !self.padding.height.is_finite() {
            self.padding = defaults.padding;
        }
        if !positive(self.min_scale) || !positive(self.max_scale) {
            self.min_scale = defaults.min_scale;
            self.max_scale = defaults.max_scale;
        }
        if self.min_scale > self.max_scale {
            std::mem::swap(&mut self.min_scale, &mut self.max_scale);
        }
        if !positive(self.default_scale) {
            self.default_scale = defaults.default_scale;
        }
        self.default_scale = self.default_scale.clamp(self.min_scale, self.max_scale);
        if !self.wheel_sensitivity.is_finite() {
            self.wheel_sensitivity = defaults.wheel_sensitivity;
        }
        if !positive(self.button_step) {
            self.button_step = defaults.button_step;
        }
        if !positive(self.pan_divisor) || self.pan_divisor < 1.0 {
            self.pan_divisor = defaults.pan_divisor;
        }
        if !positive(self.snap_threshold) {
            self.snap_threshold = defaults.snap_threshold;
        }
        if !self.reveal_margin.is_finite() || self.reveal_margin < 0.0 {
            self.reveal_margin = defaults.reveal_margin;
        }
        if !positive(self.creator_size) {
            self.creator_size = defaults.creator_size;
        }
        self
    }

    pub fn clamp_scale(&self, scale: f64) -> f64 {
        if scale.is_nan() {
            return self.default_scale;
        }
        scale.clamp(self.min_scale, self.max_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg: ViewportConfig = serde_json::from_str(r#"{ "max_scale": 3.0 }"#).unwrap();
        assert_eq!(cfg.max_scale, 3.0);
        assert_eq!(cfg.min_scale, MIN_SCALE);
        assert_eq!(cfg.cell, Size::new(CELL_WIDTH, CELL_HEIGHT));
    }

    #[test]
    fn validated_swaps_inverted_bounds() {
        let cfg = ViewportConfig {
            min_scale: 3.0,
            max_scale: 0.5,
            default_scale: 10.0,
            ..Default::default()
        }
        .validated();
        assert_eq!(cfg.min_scale, 0.5);
        assert_eq!(cfg.max_scale, 3.0);
        assert_eq!(cfg.default_scale, 3.0);
    }

    #[test]
    fn validated_replaces_non_finite_values() {
        let cfg = ViewportConfig {
            cell: Size::new(f64::NAN, 10.0),
            pan_divisor: 0.0,
            snap_threshold: f64::INFINITY,
            ..Default::default()
        }
        .validated();
        let defaults = ViewportConfig::default();
        assert_eq!(cfg.cell, defaults.cell);
        assert_eq!(cfg.pan_divisor, defaults.pan_divisor);
        assert_eq!(cfg.snap_threshold, defaults.snap_threshold);
    }

    #[test]
    fn clamp_scale_handles_nan() {
        let cfg = ViewportConfig::default();
        assert_eq!(cfg.clamp_scale(f64::NAN), DEFAULT_SCALE);
        assert_eq!(cfg.clamp_scale(100.0), MAX_SCALE);
        assert_eq!(cfg.clamp_scale(0.0), MIN_SCALE);
    }
}

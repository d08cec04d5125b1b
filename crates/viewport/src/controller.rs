use tracing::{debug, trace};

use crate::config::ViewportConfig;
use crate::transform::{GridMetrics, Transform};
use crate::types::{Bounds, Position};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Idle,
    Panning { last: Position },
    Zooming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

#[derive(Debug, Clone)]
pub struct ViewportController {
    config: ViewportConfig,
    metrics: GridMetrics,
    scale: f64,
    offset: Position,
    bounds: Bounds,
    gesture: Gesture,
    pan_target: Option<Position>,
}

impl ViewportController {
    pub fn new(config: ViewportConfig) -> Self {
        let config = config.validated();
        Self {
            metrics: GridMetrics::from_config(&config),
            scale: config.default_scale,
            offset: Position::default(),
            bounds: Bounds::default(),
            gesture: Gesture::Idle,
            pan_target: None,
            config,
        }
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn metrics(&self) -> &GridMetrics {
        &self.metrics
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> Position {
        self.offset
    }

    pub fn transform(&self) -> Transform {
        Transform::new(self.scale, self.offset)
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn pan_target(&self) -> Option<Position> {
        self.pan_target
    }

    pub fn is_animating(&self) -> bool {
        self.pan_target.is_some()
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        if bounds.origin.is_finite() && bounds.size.width.is_finite() && bounds.size.height.is_finite()
        {
            self.bounds = bounds;
        }
    }

    pub fn set_offset(&mut self, offset: Position) {
        if offset.is_finite() {
            self.offset = offset;
            self.pan_target = None;
        }
    }

    pub fn pointer_down(&mut self, client: Position, over_node: bool) -> bool {
        if over_node || !client.is_finite() {
            return false;
        }
        self.gesture = Gesture::Panning { last: client };
        self.pan_target = None;
        trace!(x = client.x, y = client.y, "pan started");
        true
    }

    pub fn pointer_move(&mut self, client: Position) -> bool {
        match self.gesture {
            Gesture::Panning { last } if client.is_finite() => {
                self.gesture = Gesture::Panning { last: client };
                let delta = self
                    .transform()
                    .delta_to_unscaled(client.x - last.x, client.y - last.y);
                if delta.x == 0.0 && delta.y == 0.0 {
                    return false;
                }
                self.offset.x += delta.x;
                self.offset.y += delta.y;
                true
            }
            Gesture::Zooming => {
                self.gesture = Gesture::Idle;
                false
            }
            _ => false,
        }
    }

    pub fn pointer_up(&mut self) {
        self.gesture = Gesture::Idle;
    }

    pub fn pointer_leave(&mut self) {
        self.gesture = Gesture::Idle;
    }

    /// Cursor-anchored wheel zoom. Positive `delta_y` zooms out.
    pub fn wheel(&mut self, client: Position, delta_y: f64) -> bool {
        if matches!(self.gesture, Gesture::Panning { .. }) || !delta_y.is_finite() || delta_y == 0.0 {
            return false;
        }
        self.gesture = Gesture::Zooming;
        let requested = self.scale * (-delta_y * self.config.wheel_sensitivity).exp();
        self.zoom_at(requested, client)
    }

    /// Set the scale while keeping the logical point under `client` fixed on
    /// screen. Returns false when the clamped scale is unchanged.
    pub fn zoom_at(&mut self, requested: f64, client: Position) -> bool {
        if !client.is_finite() {
            return false;
        }
        let new_scale = self.config.clamp_scale(requested);
        if (new_scale - self.scale).abs() <= f64::EPSILON * self.scale {
            return false;
        }
        let before = self.transform().to_logical(&self.metrics, client, &self.bounds);
        let after = Transform::new(new_scale, self.offset).to_logical(&self.metrics, client, &self.bounds);
        self.offset.x += (after.column - before.column) * self.metrics.cell.width;
        self.offset.y += (after.row - before.row) * self.metrics.cell.height;
        debug!(from = self.scale, to = new_scale, "zoom");
        self.scale = new_scale;
        self.pan_target = None;
        true
    }

    pub fn zoom_step(&mut self, direction: ZoomDirection) -> bool {
        let default = self.config.default_scale;
        let step = self.config.button_step * (1.0 + (self.scale - default).abs() / default);
        let requested = match direction {
            ZoomDirection::In => self.scale + step,
            ZoomDirection::Out => self.scale - step,
        };
        self.zoom_at(requested, self.bounds.center())
    }

    pub fn zoom_in(&mut self) -> bool {
        self.zoom_step(ZoomDirection::In)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.zoom_step(ZoomDirection::Out)
    }

    pub fn reset_zoom(&mut self) -> bool {
        self.zoom_at(self.config.default_scale, self.bounds.center())
    }

    pub fn pan_to(&mut self, target: Position) {
        if target.is_finite() {
            self.pan_target = Some(target);
        }
    }

    /// Advance the smooth pan by one animation frame. Returns true while the
    /// animation still has distance to cover.
    pub fn tick(&mut self) -> bool {
        let Some(target) = self.pan_target else {
            return false;
        };
        let divisor = self.config.pan_divisor;
        let threshold = self.config.snap_threshold;
        self.offset.x = step_towards(self.offset.x, target.x, divisor, threshold);
        self.offset.y = step_towards(self.offset.y, target.y, divisor, threshold);
        if self.offset == target {
            self.pan_target = None;
            trace!("smooth pan arrived");
            return false;
        }
        true
    }

    /// Make sure `column` is fully visible on the right-hand side. Only ever
    /// pulls the view left. Returns true when a smooth pan was started.
    pub fn reveal_column(&mut self, column: f64) -> bool {
        if self.bounds.is_empty() || !column.is_finite() {
            return false;
        }
        let base = self.pan_target.unwrap_or(self.offset);
        let visible = (self.bounds.size.width - self.config.reveal_margin).max(0.0) / self.scale;
        let right_edge = (column + 1.0) * self.metrics.cell.width;
        let wanted = visible - right_edge;
        if wanted >= base.x {
            return false;
        }
        debug!(column, from = base.x, to = wanted, "revealing column");
        self.pan_to(Position::new(wanted, base.y));
        true
    }
}

fn step_towards(current: f64, target: f64, divisor: f64, threshold: f64) -> f64 {
    let remaining = target - current;
    if remaining.abs() < threshold {
        return target;
    }
    let step = (remaining.abs() / divisor).ceil().min(remaining.abs());
    current + step.copysign(remaining)
}

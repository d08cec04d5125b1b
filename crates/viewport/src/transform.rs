use crate::config::ViewportConfig;
use crate::types::{Bounds, GridPosition, Position, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaddingMode {
    #[default]
    Padded,
    FullHeight,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMetrics {
    pub cell: Size,
    pub padding: Size,
}

impl GridMetrics {
    pub fn from_config(config: &ViewportConfig) -> Self {
        Self {
            cell: config.cell,
            padding: config.padding,
        }
    }

    fn pad_y(&self, mode: PaddingMode) -> f64 {
        match mode {
            PaddingMode::Padded => self.padding.height,
            PaddingMode::FullHeight => 0.0,
        }
    }
}

impl Default for GridMetrics {
    fn default() -> Self {
        Self::from_config(&ViewportConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f64,
    pub offset: Position,
}

impl Transform {
    pub fn new(scale: f64, offset: Position) -> Self {
        Self { scale, offset }
    }

    pub fn to_screen(&self, metrics: &GridMetrics, logical: GridPosition) -> Position {
        self.to_screen_with(metrics, logical, PaddingMode::Padded)
    }

    pub fn to_screen_with(
        &self,
        metrics: &GridMetrics,
        logical: GridPosition,
        mode: PaddingMode,
    ) -> Position {
        Position::new(
            (self.offset.x + logical.column * metrics.cell.width + metrics.padding.width)
                * self.scale,
            (self.offset.y + logical.row * metrics.cell.height + metrics.pad_y(mode)) * self.scale,
        )
    }

    /// Inverse of [`Transform::to_screen`] for a client point inside `viewport`.
    pub fn to_logical(
        &self,
        metrics: &GridMetrics,
        client: Position,
        viewport: &Bounds,
    ) -> GridPosition {
        let local_x = (client.x - viewport.origin.x) / self.scale;
        let local_y = (client.y - viewport.origin.y) / self.scale;
        GridPosition::new(
            (local_x - self.offset.x - metrics.padding.width) / metrics.cell.width,
            (local_y - self.offset.y - metrics.padding.height) / metrics.cell.height,
        )
    }

    pub fn delta_to_unscaled(&self, dx: f64, dy: f64) -> Position {
        Position::new(dx / self.scale, dy / self.scale)
    }

    pub fn node_rect(
        &self,
        metrics: &GridMetrics,
        logical: GridPosition,
        mode: PaddingMode,
    ) -> Bounds {
        let origin = self.to_screen_with(metrics, logical, mode);
        let width = (metrics.cell.width - 2.0 * metrics.padding.width).max(0.0);
        let height = (metrics.cell.height - 2.0 * metrics.pad_y(mode)).max(0.0);
        Bounds::new(origin, Size::new(width * self.scale, height * self.scale))
    }

    pub fn marker_rect(&self, metrics: &GridMetrics, logical: GridPosition, size: f64) -> Bounds {
        let center = self.cell_center(metrics, logical);
        let side = size * self.scale;
        Bounds::new(
            Position::new(center.x - side / 2.0, center.y - side / 2.0),
            Size::new(side, side),
        )
    }

    pub fn cell_center(&self, metrics: &GridMetrics, logical: GridPosition) -> Position {
        Position::new(
            (self.offset.x + logical.column * metrics.cell.width + metrics.cell.width / 2.0)
                * self.scale,
            (self.offset.y + logical.row * metrics.cell.height + metrics.cell.height / 2.0)
                * self.scale,
        )
    }
}

use crate::types::{Bounds, Position, Size};

pub fn visible(rect: &Bounds, viewport: &Bounds) -> bool {
    rect.intersects(viewport)
}

pub fn segment_visible(from: Position, to: Position, viewport: &Bounds) -> bool {
    let origin = Position::new(from.x.min(to.x), from.y.min(to.y));
    // A zero-area box never intersects, so horizontal edges get a hairline.
    let size = Size::new(
        (from.x - to.x).abs().max(1.0),
        (from.y - to.y).abs().max(1.0),
    );
    visible(&Bounds::new(origin, size), viewport)
}

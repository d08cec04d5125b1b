use gpui::{Hsla, Path, Pixels, Point, Window, point, px};
use viewport::FrameEdge;

const DASH: f32 = 6.0;
const GAP: f32 = 4.0;

pub(crate) fn push_segment(
    path: &mut Path<Pixels>,
    p1: Point<Pixels>,
    p2: Point<Pixels>,
    half_thickness: f32,
) {
    let dir = point(p2.x - p1.x, p2.y - p1.y);
    let len = dir.magnitude() as f32;
    if len <= 0.0001 {
        return;
    }
    let normal = point(-dir.y, dir.x) * (half_thickness / len);

    let p1a = point(p1.x + normal.x, p1.y + normal.y);
    let p1b = point(p1.x - normal.x, p1.y - normal.y);
    let p2a = point(p2.x + normal.x, p2.y + normal.y);
    let p2b = point(p2.x - normal.x, p2.y - normal.y);

    let st = (point(0., 1.), point(0., 1.), point(0., 1.));
    path.push_triangle((p1a, p1b, p2a), st);
    path.push_triangle((p2a, p1b, p2b), st);
}

pub(crate) fn push_dashed(
    path: &mut Path<Pixels>,
    p1: Point<Pixels>,
    p2: Point<Pixels>,
    half_thickness: f32,
    zoom: f32,
) {
    let dir = point(p2.x - p1.x, p2.y - p1.y);
    let len = dir.magnitude() as f32;
    if len <= 0.0001 {
        return;
    }
    let dash = (DASH * zoom).max(2.0);
    let period = dash + (GAP * zoom).max(1.0);
    let mut start = 0.0f32;
    while start < len {
        let end = (start + dash).min(len);
        let a = point(p1.x + dir.x * (start / len), p1.y + dir.y * (start / len));
        let b = point(p1.x + dir.x * (end / len), p1.y + dir.y * (end / len));
        push_segment(path, a, b, half_thickness);
        start += period;
    }
}

/// Paint all edges of a frame in two batched paths: solid for the tree,
/// dashed for edges that touch a creator.
pub(crate) fn paint_edges(
    edges: &[FrameEdge],
    origin: Point<Pixels>,
    zoom: f32,
    main_color: Hsla,
    creator_color: Hsla,
    window: &mut Window,
) {
    let thickness = (1.0f32 * zoom).max(1.0);
    let to_point = |x: f64, y: f64| point(origin.x + px(x as f32), origin.y + px(y as f32));

    let mut main_path = Path::new(origin);
    let mut creator_path = Path::new(origin);
    for edge in edges {
        let p1 = to_point(edge.from.x, edge.from.y);
        let p2 = to_point(edge.to.x, edge.to.y);
        if edge.creator {
            push_dashed(&mut creator_path, p1, p2, thickness, zoom);
        } else {
            push_segment(&mut main_path, p1, p2, thickness);
        }
    }
    window.paint_path(main_path, main_color);
    window.paint_path(creator_path, creator_color);
}

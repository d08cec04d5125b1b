use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use crate::frame::{Frame, content_size};

const GRID_STEP: f64 = 20.0;

pub fn render_frame(frame: &Frame, show_grid: bool) -> String {
    let size = content_size(frame);
    let width = size.width.max(frame.viewport.size.width).max(1.0);
    let height = size.height.max(frame.viewport.size.height).max(1.0);

    let mut svg = format!(
        r#"<svg width="{width}" height="{height}" xmlns="http://www.w3.org/2000/svg">
<rect width="100%" height="100%" fill="white"/>
"#
    );

    if show_grid {
        let step = GRID_STEP * frame.scale;
        let columns = (width / step).ceil() as usize;
        let rows = (height / step).ceil() as usize;
        for i in 0..=columns {
            let x = i as f64 * step;
            let _ = writeln!(
                svg,
                r#"<line x1="{x}" y1="0" x2="{x}" y2="{height}" stroke="lightgray" stroke-width="0.5"/>"#
            );
        }
        for i in 0..=rows {
            let y = i as f64 * step;
            let _ = writeln!(
                svg,
                r#"<line x1="0" y1="{y}" x2="{width}" y2="{y}" stroke="lightgray" stroke-width="0.5"/>"#
            );
        }
    }

    for edge in &frame.edges {
        let dash = if edge.creator {
            r#" stroke-dasharray="4 3""#
        } else {
            ""
        };
        let _ = writeln!(
            svg,
            r#"<path d="M {} {} L {} {}" stroke="black" stroke-width="2" fill="none"{dash}/>"#,
            edge.from.x, edge.from.y, edge.to.x, edge.to.y
        );
    }

    for node in &frame.nodes {
        let fill = escape(node.flags.color.as_deref().unwrap_or("lightblue"));
        let stroke = if node.selected { "royalblue" } else { "black" };
        let _ = writeln!(
            svg,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}" stroke="{}"/>
<text x="{}" y="{}" font-family="Arial" font-size="{}" text-anchor="middle">{}</text>"#,
            node.rect.origin.x,
            node.rect.origin.y,
            node.rect.size.width,
            node.rect.size.height,
            fill,
            stroke,
            node.rect.center().x,
            node.rect.center().y + 4.0 * frame.scale,
            12.0 * frame.scale,
            escape(&node.name)
        );
    }

    for creator in &frame.creators {
        let center = creator.rect.center();
        let _ = writeln!(
            svg,
            r#"<circle cx="{}" cy="{}" r="{}" fill="white" stroke="gray"/>"#,
            center.x,
            center.y,
            creator.rect.size.width / 2.0
        );
    }

    svg.push_str("</svg>");
    svg
}

pub fn write_frame(frame: &Frame, path: impl AsRef<Path>, show_grid: bool) -> io::Result<()> {
    fs::write(path, render_frame(frame, show_grid))
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

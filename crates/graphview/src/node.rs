use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::ActiveTheme;
use viewport::{FrameCreator, FrameNode, NodeFlags};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodeHints {
    pub accent: Option<Rgba>,
    pub badge: Option<&'static str>,
    pub pending: bool,
    pub open: bool,
}

impl NodeHints {
    pub fn from_flags(flags: &NodeFlags) -> Self {
        let badge = if flags.executable {
            Some("exec")
        } else if flags.device {
            Some("device")
        } else {
            None
        };
        Self {
            accent: flags.color.as_deref().and_then(parse_hex_color),
            badge,
            pending: flags.pending_open || flags.pending_exec,
            open: flags.open,
        }
    }
}

/// `#rrggbb` or `rrggbb`.
fn parse_hex_color(color: &str) -> Option<Rgba> {
    let hex = color.strip_prefix('#').unwrap_or(color);
    if hex.len() != 6 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().map(rgb)
}

fn px64(v: f64) -> Pixels {
    px(v as f32)
}

#[derive(IntoElement)]
pub struct MissionNodeView {
    node: FrameNode,
    zoom: f32,
}

impl MissionNodeView {
    pub fn new(node: FrameNode, zoom: f32) -> Self {
        Self { node, zoom }
    }
}

impl RenderOnce for MissionNodeView {
    fn render(self, _window: &mut Window, cx: &mut App) -> impl IntoElement {
        let hints = NodeHints::from_flags(&self.node.flags);
        let zoom = self.zoom;
        let rect = self.node.rect;

        let theme = cx.theme();
        let text_color = theme.foreground;
        let badge_bg = theme.accent;
        let badge_fg = theme.accent_foreground;
        let border_color = if self.node.selected {
            theme.ring
        } else {
            theme.border
        };
        let bg_color = if self.node.creation_target {
            theme.accent
        } else {
            theme.secondary
        };

        div()
            .absolute()
            .left(px64(rect.origin.x))
            .top(px64(rect.origin.y))
            .w(px64(rect.size.width))
            .h(px64(rect.size.height))
            .bg(bg_color)
            .border(px(if self.node.selected { 2.0 } else { 1.0 }))
            .border_color(border_color)
            .rounded(px(4.0 * zoom))
            .shadow_sm()
            .overflow_hidden()
            .flex()
            .items_center()
            .gap(px(6.0 * zoom))
            .px(px(10.0 * zoom))
            .when(hints.pending, |this| this.opacity(0.6))
            .when_some(hints.accent, |this, accent| {
                this.child(
                    div()
                        .absolute()
                        .left_0()
                        .top_0()
                        .bottom_0()
                        .w(px(4.0 * zoom))
                        .bg(accent),
                )
            })
            .when_some(hints.badge, |this, badge| {
                this.child(
                    div()
                        .px(px(4.0 * zoom))
                        .py(px(1.0 * zoom))
                        .bg(badge_bg)
                        .rounded(px(2.0 * zoom))
                        .text_size(px(9.0 * zoom))
                        .text_color(badge_fg)
                        .child(badge),
                )
            })
            .child(
                div()
                    .flex_1()
                    .text_size(px(12.0 * zoom))
                    .text_color(text_color)
                    .font_weight(FontWeight::MEDIUM)
                    .child(self.node.name),
            )
            .when(hints.open, |this| {
                this.child(
                    div()
                        .text_size(px(10.0 * zoom))
                        .text_color(text_color)
                        .child("▸"),
                )
            })
    }
}

#[derive(IntoElement)]
pub struct CreatorButton {
    creator: FrameCreator,
    zoom: f32,
}

impl CreatorButton {
    pub fn new(creator: FrameCreator, zoom: f32) -> Self {
        Self { creator, zoom }
    }
}

impl RenderOnce for CreatorButton {
    fn render(self, _window: &mut Window, cx: &mut App) -> impl IntoElement {
        let rect = self.creator.rect;
        let theme = cx.theme();
        let ring = theme.primary;
        let hover_bg = theme.secondary;

        div()
            .absolute()
            .left(px64(rect.origin.x))
            .top(px64(rect.origin.y))
            .size(px64(rect.size.width))
            .rounded_full()
            .border(px(1.0))
            .border_color(ring)
            .bg(theme.background)
            .text_color(ring)
            .text_size(px(14.0 * self.zoom))
            .flex()
            .items_center()
            .justify_center()
            .cursor_pointer()
            .hover(|this| this.bg(hover_bg))
            .child("+")
    }
}

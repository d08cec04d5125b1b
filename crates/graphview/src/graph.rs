use std::time::Duration;

use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui::{Context, IntoElement, ParentElement, Render, Styled, Window, canvas, div};
use gpui_component::ActiveTheme;
use tracing::{debug, warn};
use viewport::{
    Bounds as ViewBounds, Gesture, Mission, MissionViewport, NodeId,
    PointerOutcome, Position as ViewPosition, SelectionState, Size as ViewSize, ViewportConfig,
    svg,
};

use crate::edge::paint_edges;
use crate::node::{CreatorButton, MissionNodeView};

const PAN_FRAME: Duration = Duration::from_millis(16);

pub struct MissionGraph {
    mission: Mission,
    viewport: MissionViewport,
    _pan_task: Option<Task<()>>,
    pan_running: bool,
}

#[derive(Clone, Debug)]
pub struct NodeSelected {
    pub node_id: NodeId,
}

#[derive(Clone, Debug)]
pub struct NodeCreated {
    pub node_id: NodeId,
}

impl EventEmitter<NodeSelected> for MissionGraph {}
impl EventEmitter<NodeCreated> for MissionGraph {}

fn to_position(p: Point<Pixels>) -> ViewPosition {
    ViewPosition::new((p.x / px(1.0)) as f64, (p.y / px(1.0)) as f64)
}

fn to_view_bounds(bounds: Bounds<Pixels>) -> ViewBounds {
    ViewBounds::new(
        to_position(bounds.origin),
        ViewSize::new(
            (bounds.size.width / px(1.0)) as f64,
            (bounds.size.height / px(1.0)) as f64,
        ),
    )
}

impl MissionGraph {
    pub fn new(mission: Mission, config: ViewportConfig) -> Self {
        Self {
            mission,
            viewport: MissionViewport::new(config),
            _pan_task: None,
            pan_running: false,
        }
    }

    pub fn mission(&self) -> &Mission {
        &self.mission
    }

    pub fn selection(&self) -> SelectionState {
        self.viewport.selection()
    }

    pub fn scale(&self) -> f64 {
        self.viewport.controller().scale()
    }

    pub fn update_mission(&mut self, cx: &mut Context<Self>, edit: impl FnOnce(&mut Mission)) {
        edit(&mut self.mission);
        cx.notify();
    }

    pub fn select(&mut self, node_id: NodeId, cx: &mut Context<Self>) {
        if self.viewport.on_node_select(&mut self.mission, node_id) {
            cx.emit(NodeSelected { node_id });
            cx.notify();
        }
    }

    pub fn deselect(&mut self, cx: &mut Context<Self>) {
        if self.viewport.on_node_deselect(&mut self.mission) {
            cx.notify();
        }
    }

    pub fn toggle_creation(&mut self, cx: &mut Context<Self>) {
        let changed = if self.viewport.selection().is_creating() {
            self.viewport.on_creation_deactivate(&mut self.mission)
        } else {
            self.viewport.on_creation_activate(&mut self.mission)
        };
        if changed {
            cx.notify();
        }
    }

    pub fn zoom_in(&mut self, cx: &mut Context<Self>) {
        if self.viewport.zoom_in() {
            cx.notify();
        }
    }

    pub fn zoom_out(&mut self, cx: &mut Context<Self>) {
        if self.viewport.zoom_out() {
            cx.notify();
        }
    }

    pub fn reset_zoom(&mut self, cx: &mut Context<Self>) {
        if self.viewport.controller_mut().reset_zoom() {
            cx.notify();
        }
    }

    pub fn snapshot_svg(&mut self) -> String {
        let frame = self.viewport.frame(&mut self.mission);
        svg::render_frame(&frame, false)
    }

    fn set_bounds(&mut self, bounds: Bounds<Pixels>) -> bool {
        let next = to_view_bounds(bounds);
        if self.viewport.controller().bounds() == next {
            return false;
        }
        self.viewport.controller_mut().set_bounds(next);
        true
    }

    /// Start the smooth-pan timer if the controller has a target and no
    /// timer is running. Retargeting an in-flight pan needs no new task: each
    /// tick reads the latest target.
    fn ensure_pan_animation(&mut self, cx: &mut Context<Self>) {
        if self.pan_running || !self.viewport.controller().is_animating() {
            return;
        }
        self.pan_running = true;
        debug!(to = ?self.viewport.controller().pan_target(), "smooth pan started");
        self._pan_task = Some(cx.spawn(async move |this, cx| {
            loop {
                cx.background_executor().timer(PAN_FRAME).await;
                let running = this.update(cx, |graph, cx| {
                    let running = graph.viewport.controller_mut().tick();
                    if !running {
                        graph.pan_running = false;
                    }
                    cx.notify();
                    running
                });
                if !matches!(running, Ok(true)) {
                    break;
                }
            }
        }));
    }

    fn on_left_mouse_down(
        &mut self,
        event: &MouseDownEvent,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        match self
            .viewport
            .pointer_down(&mut self.mission, to_position(event.position))
        {
            Ok(PointerOutcome::Selected(node_id)) => cx.emit(NodeSelected { node_id }),
            Ok(PointerOutcome::Created(node_id)) => {
                cx.emit(NodeCreated { node_id });
                cx.emit(NodeSelected { node_id });
            }
            Ok(PointerOutcome::PanStarted | PointerOutcome::Ignored) => {}
            Err(err) => warn!(error = %err, "node creation rejected"),
        }
        cx.notify();
    }

    // Middle button pans from anywhere, including over nodes.
    fn on_middle_mouse_down(
        &mut self,
        event: &MouseDownEvent,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if self
            .viewport
            .controller_mut()
            .pointer_down(to_position(event.position), false)
        {
            cx.notify();
        }
    }

    fn on_mouse_up(&mut self, _event: &MouseUpEvent, _window: &mut Window, cx: &mut Context<Self>) {
        self.viewport.controller_mut().pointer_up();
        cx.notify();
    }

    fn on_mouse_move(&mut self, event: &MouseMoveEvent, _window: &mut Window, cx: &mut Context<Self>) {
        let controller = self.viewport.controller_mut();
        // The button may have been released outside the element.
        if matches!(controller.gesture(), Gesture::Panning { .. })
            && !event
                .pressed_button
                .is_some_and(|b| b == MouseButton::Left || b == MouseButton::Middle)
        {
            controller.pointer_up();
            cx.notify();
            return;
        }
        if controller.pointer_move(to_position(event.position)) {
            cx.notify();
        }
    }

    fn on_scroll_wheel(
        &mut self,
        event: &ScrollWheelEvent,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let delta = event.delta.pixel_delta(px(16.0));
        let dy = (delta.y / px(1.0)) as f64;
        // gpui reports scrolling down as a negative delta.
        if self
            .viewport
            .controller_mut()
            .wheel(to_position(event.position), -dy)
        {
            cx.notify();
        }
    }

    fn on_hover(&mut self, hovered: &bool, _window: &mut Window, cx: &mut Context<Self>) {
        if !*hovered {
            self.viewport.controller_mut().pointer_leave();
            cx.notify();
        }
    }
}

fn toolbar_button<F>(
    label: impl Into<SharedString>,
    enabled: bool,
    cx: &mut Context<MissionGraph>,
    on_press: F,
) -> Div
where
    F: Fn(&mut MissionGraph, &mut Context<MissionGraph>) + 'static,
{
    let theme = cx.theme();
    let text_color = if enabled {
        theme.foreground
    } else {
        theme.muted_foreground
    };
    let border_color = theme.border;
    let hover_bg = theme.secondary;

    div()
        .child(label.into())
        .px(px(8.0))
        .py(px(4.0))
        .text_color(text_color)
        .border(px(1.0))
        .border_color(border_color)
        .rounded(px(4.0))
        .when(enabled, |this| {
            this.cursor_pointer()
                .hover(|this| this.bg(hover_bg))
                .on_mouse_down(
                    MouseButton::Left,
                    cx.listener(move |this, _event: &MouseDownEvent, _window, cx| {
                        cx.stop_propagation();
                        on_press(this, cx);
                    }),
                )
        })
}

impl Render for MissionGraph {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let frame = self.viewport.frame(&mut self.mission);
        self.ensure_pan_animation(cx);

        // Track where the graph sits in the window; pointer input arrives in
        // window coordinates.
        let graph_entity = cx.entity();
        let bounds_tracker = canvas(
            |_bounds, _window, _cx| (),
            move |bounds, _state, _window, cx| {
                cx.update_entity(&graph_entity, |graph, cx| {
                    if graph.set_bounds(bounds) {
                        cx.notify();
                    }
                });
            },
        )
        .absolute()
        .size_full();

        let zoom = frame.scale as f32;
        let main_color = cx.theme().foreground.opacity(0.7);
        let creator_color = cx.theme().primary;
        let edges = frame.edges;
        let edges_canvas = canvas(
            |_bounds, _window, _cx| (),
            move |bounds, _state, window, _cx| {
                paint_edges(&edges, bounds.origin, zoom, main_color, creator_color, window);
            },
        )
        .absolute()
        .size_full();

        let graph_canvas = div()
            .relative()
            .size_full()
            .child(bounds_tracker)
            .child(edges_canvas)
            .children(frame.nodes.into_iter().map(|n| MissionNodeView::new(n, zoom)))
            .children(
                frame
                    .creators
                    .into_iter()
                    .map(|c| CreatorButton::new(c, zoom)),
            );

        let selection = self.viewport.selection();
        let has_selection = selection.selected().is_some();
        let creating = selection.is_creating();
        let zoom_percent = (frame.scale * 100.0).round() as i32;

        let controls_panel = {
            let zoom_out = toolbar_button("-", true, cx, |this, cx| this.zoom_out(cx));
            let zoom_in = toolbar_button("+", true, cx, |this, cx| this.zoom_in(cx));
            let reset = toolbar_button("1:1", true, cx, |this, cx| this.reset_zoom(cx));
            let create = toolbar_button(
                if creating { "Cancel" } else { "Create" },
                has_selection,
                cx,
                |this, cx| this.toggle_creation(cx),
            );
            let deselect = toolbar_button("Deselect", has_selection && !creating, cx, |this, cx| {
                this.deselect(cx)
            });

            div()
                .absolute()
                .top(px(8.0))
                .left(px(8.0))
                .text_color(cx.theme().foreground)
                .bg(cx.theme().background.opacity(0.9))
                .border(px(1.0))
                .border_color(cx.theme().border)
                .rounded(px(6.0))
                .p(px(8.0))
                .flex()
                .items_center()
                .gap_2()
                // Clicks on the panel itself must not start a pan.
                .on_mouse_down(MouseButton::Left, |_, _, cx| cx.stop_propagation())
                .child(zoom_out)
                .child(format!("{}%", zoom_percent))
                .child(zoom_in)
                .child(reset)
                .child(div().w(px(8.0)))
                .child(create)
                .child(deselect)
        };

        let cursor = match self.viewport.controller().gesture() {
            Gesture::Panning { .. } => CursorStyle::ClosedHand,
            _ => CursorStyle::Arrow,
        };

        div()
            .id("mission-graph")
            .relative()
            .size_full()
            .overflow_hidden()
            .cursor(cursor)
            .on_mouse_down(MouseButton::Left, cx.listener(Self::on_left_mouse_down))
            .on_mouse_down(MouseButton::Middle, cx.listener(Self::on_middle_mouse_down))
            .on_mouse_up(MouseButton::Left, cx.listener(Self::on_mouse_up))
            .on_mouse_up(MouseButton::Middle, cx.listener(Self::on_mouse_up))
            .on_mouse_move(cx.listener(Self::on_mouse_move))
            .on_scroll_wheel(cx.listener(Self::on_scroll_wheel))
            .on_hover(cx.listener(Self::on_hover))
            .child(graph_canvas)
            .child(controls_panel)
    }
}

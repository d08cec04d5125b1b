mod config;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use gpui::*;
use gpui_component::{ActiveTheme, Root};
use gpui_component_assets::Assets;
use graphview::{MissionGraph, NodeCreated, NodeSelected};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use viewport::{
    Bounds as ViewBounds, Mission, MissionModel, MissionTree, MissionViewport, NodeFlags, NodeId,
    Position as ViewPosition, Size as ViewSize, ViewportConfig,
};

const DEFAULT_FILTER: &str = "info,viewport=debug,graphview=debug";

struct MissionWindow {
    graph: Entity<MissionGraph>,
    status: SharedString,
    _subscriptions: Vec<Subscription>,
}

impl MissionWindow {
    fn new(mission: Mission, config: ViewportConfig, cx: &mut Context<Self>) -> Self {
        let graph = cx.new(|_| MissionGraph::new(mission, config));

        let _subscriptions = vec![
            cx.subscribe(&graph, |this, graph, event: &NodeSelected, cx| {
                let name = graph
                    .read(cx)
                    .mission()
                    .tree()
                    .node(event.node_id)
                    .map(|n| n.name.clone())
                    .unwrap_or_default();
                this.status = format!("Selected {} {}", event.node_id, name).into();
                cx.notify();
            }),
            cx.subscribe(&graph, |_this, _graph, event: &NodeCreated, _cx| {
                info!(node = %event.node_id, "node added to mission");
            }),
        ];

        Self {
            graph,
            status: "Click a node to select it".into(),
            _subscriptions,
        }
    }
}

impl Render for MissionWindow {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        div()
            .size_full()
            .flex()
            .flex_col()
            .bg(cx.theme().background)
            .text_color(cx.theme().foreground)
            .child(
                div()
                    .id("graph-preview")
                    .relative()
                    .flex_1()
                    .w_full()
                    .overflow_hidden()
                    .child(self.graph.clone()),
            )
            .child(
                div()
                    .px(px(8.0))
                    .py(px(4.0))
                    .border_t(px(1.0))
                    .border_color(cx.theme().border)
                    .text_size(px(12.0))
                    .child(self.status.clone()),
            )
    }
}

fn set_flags(tree: &mut MissionTree, id: NodeId, edit: impl FnOnce(&mut NodeFlags)) -> Result<()> {
    let mut node = tree
        .node_mut(id)
        .with_context(|| format!("node {id} missing from demo mission"))?;
    edit(node.flags());
    Ok(())
}

fn demo_mission() -> Result<Mission> {
    let mut tree = MissionTree::new("Operation Nightjar");
    let root = tree.root();

    let briefing = tree.add_child(root, "Briefing")?;
    let recon = tree.add_child(briefing, "Recon")?;
    let scan = tree.add_child(recon, "Scan perimeter")?;
    tree.add_child(recon, "Map vents")?;
    let keycard = tree.add_child(briefing, "Acquire keycard")?;

    let infiltration = tree.add_child(root, "Infiltration")?;
    let cameras = tree.add_child(infiltration, "Disable cameras")?;
    let lock = tree.add_child(infiltration, "Bypass lock")?;
    let vault = tree.add_child(lock, "Vault")?;
    tree.add_child(root, "Extraction")?;

    set_flags(&mut tree, briefing, |f| f.open = true)?;
    set_flags(&mut tree, recon, |f| {
        f.device = true;
        f.color = Some("#4488ff".into());
    })?;
    set_flags(&mut tree, scan, |f| f.executable = true)?;
    set_flags(&mut tree, keycard, |f| {
        f.executable = true;
        f.pending_exec = true;
    })?;
    set_flags(&mut tree, cameras, |f| f.device = true)?;
    set_flags(&mut tree, vault, |f| f.color = Some("#ff8844".into()))?;

    Ok(Mission::new(tree))
}

/// `--snapshot <path>` writes an SVG of the initial view instead of opening a
/// window.
fn snapshot_arg() -> Option<PathBuf> {
    let mut args = std::env::args_os().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--snapshot" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}

fn write_snapshot(mut mission: Mission, config: ViewportConfig, path: &Path) -> Result<()> {
    let mut view = MissionViewport::new(config);
    view.controller_mut().set_bounds(ViewBounds::new(
        ViewPosition::default(),
        ViewSize::new(1280.0, 800.0),
    ));
    let frame = view.frame(&mut mission);
    viewport::svg::write_frame(&frame, path, true)
        .with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), nodes = frame.nodes.len(), "wrote snapshot");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .init();

    let config = config::load_config(&config::config_path())?;
    let mission = demo_mission()?;

    if let Some(path) = snapshot_arg() {
        return write_snapshot(mission, config, &path);
    }

    let app = Application::new().with_assets(Assets);

    app.run(move |cx| {
        gpui_component::init(cx);
        cx.activate(true);

        let options = WindowOptions {
            titlebar: Some(TitlebarOptions {
                title: Some("Mission Graph".into()),
                ..Default::default()
            }),
            window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
                None,
                size(px(1280.0), px(800.0)),
                cx,
            ))),
            ..Default::default()
        };

        let opened = cx.open_window(options, |window, cx| {
            let view = cx.new(|cx| MissionWindow::new(mission, config, cx));
            cx.new(|cx| Root::new(view.into(), window, cx))
        });
        if let Err(err) = opened {
            error!(error = %err, "failed to open window");
            cx.quit();
        }
    });

    Ok(())
}

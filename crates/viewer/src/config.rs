use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use kdl::{KdlDocument, KdlNode, KdlValue};
use tracing::{debug, info, warn};
use viewport::ViewportConfig;

pub const DEFAULT_CONFIG_FILE: &str = "mission-viewer.kdl";
pub const CONFIG_ENV: &str = "MISSION_VIEWER_CONFIG";

pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Load the configuration at `path`. A missing file yields the defaults; a
/// file that exists but does not parse is an error.
pub fn load_config(path: &Path) -> Result<ViewportConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "no viewer config, using defaults");
        return Ok(ViewportConfig::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config =
        parse_config(&content).with_context(|| format!("parsing {}", path.display()))?;
    info!(path = %path.display(), "loaded viewer config");
    Ok(config)
}

pub fn parse_config(content: &str) -> Result<ViewportConfig> {
    let doc = KdlDocument::parse(content)?;
    let mut config = ViewportConfig::default();
    let Some(viewport) = doc.get("viewport") else {
        warn!("config has no `viewport` node; using defaults");
        return Ok(config);
    };
    let Some(children) = viewport.children() else {
        return Ok(config);
    };

    for node in children.nodes() {
        let name = node.name().value();
        match name {
            "cell" => {
                set(&mut config.cell.width, node, "width");
                set(&mut config.cell.height, node, "height");
            }
            "padding" => {
                set(&mut config.padding.width, node, "x");
                set(&mut config.padding.height, node, "y");
            }
            "scale" => {
                set(&mut config.min_scale, node, "min");
                set(&mut config.max_scale, node, "max");
                set(&mut config.default_scale, node, "default");
            }
            "wheel-sensitivity" => set_arg(&mut config.wheel_sensitivity, node),
            "button-step" => set_arg(&mut config.button_step, node),
            "smooth-pan" => {
                set(&mut config.pan_divisor, node, "divisor");
                set(&mut config.snap_threshold, node, "snap");
            }
            "reveal-margin" => set_arg(&mut config.reveal_margin, node),
            "creator-size" => set_arg(&mut config.creator_size, node),
            "include-root-edges" => set_flag(&mut config.include_root_edges, node),
            "cull-offscreen" => set_flag(&mut config.cull_offscreen, node),
            other => warn!(key = other, "unknown viewer config key"),
        }
    }

    // Out-of-range values are repaired later by the controller; report them here
    // where the user can still see which file they came from.
    let repaired = config.clone().validated();
    if repaired != config {
        warn!("viewer config has out-of-range values; they will be replaced by defaults");
    }
    Ok(config)
}

fn number(value: &KdlValue) -> Option<f64> {
    value
        .as_float()
        .or_else(|| value.as_integer().map(|i| i as f64))
}

fn set(slot: &mut f64, node: &KdlNode, property: &str) {
    let Some(value) = node.get(property) else {
        return;
    };
    match number(value) {
        Some(v) => *slot = v,
        None => warn!(key = node.name().value(), property, "expected a number"),
    }
}

fn set_arg(slot: &mut f64, node: &KdlNode) {
    match node.get(0usize).map(number) {
        Some(Some(v)) => *slot = v,
        _ => warn!(key = node.name().value(), "expected a numeric argument"),
    }
}

fn set_flag(slot: &mut bool, node: &KdlNode) {
    match node.get(0usize).and_then(KdlValue::as_bool) {
        Some(v) => *slot = v,
        None => warn!(key = node.name().value(), "expected #true or #false"),
    }
}

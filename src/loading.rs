use std::collections::BTreeMap;

use crate::config::UiConfig;
use crate::ui::{Widget, WidgetId, WidgetTree, apply_attributes};

/// Read a whole file, logging a warning on failure.
fn read_file(path: &str) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(c) => Some(c),
        Err(e) => {
            log::warn!("failed to read {}: {}", path, e);
            None
        }
    }
}

/// Load toolkit defaults from a RON file. Falls back to `UiConfig::default()`
/// when the file is missing or malformed.
pub fn load_ui_config(path: &str) -> UiConfig {
    let Some(content) = read_file(path) else {
        log::warn!("using default ui config");
        return UiConfig::default();
    };
    match ron::from_str::<UiConfig>(&content) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("failed to parse RON {}: {}, using default config", path, e);
            UiConfig::default()
        }
    }
}

/// Load a widget tree from a KDL file and install it as the root.
pub fn load_markup(tree: &mut WidgetTree, path: &str) -> Option<WidgetId> {
    let content = read_file(path)?;
    parse_markup(tree, &content)
}

/// Build widgets from KDL text. The first recognised top-level node becomes
/// the tree's root; further top-level nodes are ignored.
///
/// ```kdl
/// column gap=4 padding="8px" {
///     label "Title" text-size=18
///     row { block width="20px" height="20px" background="#F00" }
/// }
/// ```
pub fn parse_markup(tree: &mut WidgetTree, text: &str) -> Option<WidgetId> {
    let doc = match text.parse::<kdl::KdlDocument>() {
        Ok(doc) => doc,
        Err(e) => {
            log::warn!("failed to parse KDL markup: {}", e);
            return None;
        }
    };

    let mut root = None;
    for node in doc.nodes() {
        if root.is_some() {
            log::warn!("ignoring extra top-level node {}", node.name().value());
            continue;
        }
        root = build_node(tree, node);
    }
    let root = root?;
    if let Err(e) = tree.set_root(root) {
        log::warn!("markup root rejected: {}", e);
        return None;
    }
    Some(root)
}

/// Stringify a KDL value for the attribute layer.
fn value_text(value: &kdl::KdlValue) -> Option<String> {
    if let Some(s) = value.as_string() {
        Some(s.to_string())
    } else if let Some(i) = value.as_integer() {
        Some(i.to_string())
    } else if let Some(f) = value.as_float() {
        Some(f.to_string())
    } else {
        value.as_bool().map(|b| b.to_string())
    }
}

/// Create the widget for `node` and its descendants, detached.
fn build_node(tree: &mut WidgetTree, node: &kdl::KdlNode) -> Option<WidgetId> {
    let name = node.name().value();
    let widget = match name {
        "block" => Widget::Block,
        "stack" => Widget::Stack,
        "row" => Widget::row(0),
        "column" => Widget::column(0),
        "label" => {
            let text = node.get(0).and_then(|v| v.as_string()).unwrap_or("");
            tree.default_label(text)
        }
        other => {
            log::warn!("skipping unknown widget kind {}", other);
            return None;
        }
    };
    let id = tree.create(widget);

    let attrs: BTreeMap<String, String> = node
        .entries()
        .iter()
        .filter_map(|entry| {
            let key = entry.name()?.value().to_string();
            match value_text(entry.value()) {
                Some(v) => Some((key, v)),
                None => {
                    log::warn!("ignoring null attribute {} on {}", key, name);
                    None
                }
            }
        })
        .collect();
    apply_attributes(tree, id, &attrs);

    if let Some(children) = node.children() {
        for child in children.nodes() {
            let Some(child_id) = build_node(tree, child) else {
                continue;
            };
            if let Err(e) = tree.attach(id, child_id) {
                log::warn!("cannot nest {} under {}: {}", child.name().value(), name, e);
                tree.remove(child_id);
            }
        }
    }
    Some(id)
}

//! String-keyed attribute application.
//!
//! Markup and style sheets hand widgets a flat set of `key -> text` pairs;
//! [`apply_attributes`] maps the known keys onto tree setters. Values that
//! fail to parse are logged and skipped, never fatal.

use std::collections::{BTreeMap, HashMap};

use super::color::Color;
use super::drawable::{Border, BorderStroke};
use super::flags::Visibility;
use super::length::{EdgeInsets, LayoutSize, Length};
use super::widget::CrossAlign;
use super::{WidgetId, WidgetTree};

/// Read-only view of a widget's attributes.
pub trait AttributeSet {
    fn get(&self, key: &str) -> Option<&str>;
}

impl AttributeSet for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<&str> {
        HashMap::get(self, key).map(String::as_str)
    }
}

impl AttributeSet for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<&str> {
        BTreeMap::get(self, key).map(String::as_str)
    }
}

impl AttributeSet for [(&str, &str)] {
    fn get(&self, key: &str) -> Option<&str> {
        self.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }
}

fn parse_or_warn<T: std::str::FromStr>(key: &str, value: &str) -> Option<T> {
    match value.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("ignoring attribute {key}={value:?}: unparseable value");
            None
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Option<bool> {
    match value.trim() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => {
            log::warn!("ignoring attribute {key}={value:?}: expected a boolean");
            None
        }
    }
}

/// Apply every recognised attribute in `attrs` to widget `id`.
///
/// Lengths use [`Length::parse`] (malformed text becomes `0px`). Keys that
/// do not apply to the widget's kind are silently ignored by the setters.
pub fn apply_attributes<A: AttributeSet + ?Sized>(tree: &mut WidgetTree, id: WidgetId, attrs: &A) {
    let Some(node) = tree.get(id) else {
        return;
    };
    let size = node.size();
    let constraints = node.constraints();

    if let Some(name) = attrs.get("id") {
        tree.set_id(id, name);
    }

    let width = attrs.get("width").map(Length::parse);
    let height = attrs.get("height").map(Length::parse);
    if width.is_some() || height.is_some() {
        tree.set_size(
            id,
            LayoutSize::new(width.unwrap_or(size.width), height.unwrap_or(size.height)),
        );
    }

    let min_w = attrs.get("min-width").map(Length::parse);
    let min_h = attrs.get("min-height").map(Length::parse);
    if min_w.is_some() || min_h.is_some() {
        tree.set_minimum_size(
            id,
            min_w.unwrap_or(constraints.min_width),
            min_h.unwrap_or(constraints.min_height),
        );
    }

    let max_w = attrs.get("max-width").map(Length::parse);
    let max_h = attrs.get("max-height").map(Length::parse);
    if max_w.is_some() || max_h.is_some() {
        tree.set_maximum_size(
            id,
            max_w.unwrap_or(constraints.max_width),
            max_h.unwrap_or(constraints.max_height),
        );
    }

    if let Some(v) = attrs.get("margin") {
        tree.set_margin(id, EdgeInsets::parse(v));
    }
    if let Some(v) = attrs.get("padding") {
        tree.set_padding(id, EdgeInsets::parse(v));
    }

    if let Some(v) = attrs.get("visibility") {
        match Visibility::parse(v.trim()) {
            Some(vis) => tree.set_visibility(id, vis),
            None => log::warn!("ignoring attribute visibility={v:?}"),
        }
    }
    if let Some(v) = attrs.get("opacity").and_then(|v| parse_or_warn::<f32>("opacity", v)) {
        tree.set_opacity(id, v);
    }
    if let Some(c) = attrs.get("background").and_then(|v| parse_or_warn::<Color>("background", v)) {
        tree.set_background_color(id, c);
    }
    if let Some(b) = attrs.get("enabled").and_then(|v| parse_bool("enabled", v)) {
        tree.set_enabled(id, b);
    }
    if let Some(b) = attrs.get("clickable").and_then(|v| parse_bool("clickable", v)) {
        tree.set_clickable(id, b);
    }
    if let Some(b) = attrs.get("focusable").and_then(|v| parse_bool("focusable", v)) {
        tree.set_focusable(id, b);
    }
    if let Some(b) = attrs.get("clip").and_then(|v| parse_bool("clip", v)) {
        tree.set_bounds_clip(id, b);
    }

    apply_border(tree, id, attrs);

    if let Some(text) = attrs.get("text") {
        tree.set_text(id, text);
    }
    if let Some(s) = attrs.get("text-size").and_then(|v| parse_or_warn::<f32>("text-size", v)) {
        if s > 0.0 {
            tree.set_text_size(id, s);
        } else {
            log::warn!("ignoring non-positive text-size {s}");
        }
    }
    if let Some(c) = attrs.get("color").and_then(|v| parse_or_warn::<Color>("color", v)) {
        tree.set_text_color(id, c);
    }
    if let Some(n) = attrs.get("max-lines").and_then(|v| parse_or_warn::<u32>("max-lines", v)) {
        tree.set_max_lines(id, n);
    }
    if let Some(g) = attrs.get("gap").and_then(|v| parse_or_warn::<i32>("gap", v)) {
        tree.set_gap(id, g.max(0));
    }
    if let Some(v) = attrs.get("align") {
        match CrossAlign::parse(v.trim()) {
            Some(a) => tree.set_cross_align(id, a),
            None => log::warn!("ignoring attribute align={v:?}"),
        }
    }
}

/// `border-width`, `border-color` and `border-radius` together describe a
/// uniform border. A missing width defaults to 1px, a missing color to black.
fn apply_border<A: AttributeSet + ?Sized>(tree: &mut WidgetTree, id: WidgetId, attrs: &A) {
    let width = attrs.get("border-width");
    let color = attrs.get("border-color");
    let radius = attrs.get("border-radius");
    if width.is_none() && color.is_none() && radius.is_none() {
        return;
    }

    let width = width
        .and_then(|v| parse_or_warn::<i32>("border-width", v))
        .unwrap_or(1)
        .max(0);
    let color = color
        .and_then(|v| parse_or_warn::<Color>("border-color", v))
        .unwrap_or(Color::BLACK);
    let mut border = Border::uniform(BorderStroke::new(width, color));
    if let Some(r) = radius {
        border.set_radius(Length::parse(r));
    }
    tree.set_border(id, Some(border));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::Widget;

    #[test]
    fn sizes_and_insets() {
        let mut tree = WidgetTree::new();
        let root = tree.insert_root(Widget::Stack);
        let attrs: &[(&str, &str)] = &[
            ("id", "panel"),
            ("width", "100px"),
            ("max-height", "50%"),
            ("padding", "4px 8px"),
        ];
        apply_attributes(&mut tree, root, attrs);

        let node = tree.get(root).expect("root");
        assert_eq!(node.id(), Some("panel"));
        assert_eq!(node.size(), LayoutSize::new(Length::px(100), Length::auto()));
        assert_eq!(node.constraints().max_height, Length::percent(50.0));
        assert_eq!(
            node.padding(),
            EdgeInsets::symmetric(Length::px(4), Length::px(8))
        );
        assert_eq!(tree.find_by_id("panel"), Some(root));
    }

    #[test]
    fn bad_values_are_skipped() {
        let mut tree = WidgetTree::new();
        let root = tree.insert_root(Widget::row(3));
        let mut attrs = HashMap::new();
        attrs.insert("opacity".to_string(), "lots".to_string());
        attrs.insert("background".to_string(), "#nothex".to_string());
        attrs.insert("visibility".to_string(), "sideways".to_string());
        attrs.insert("gap".to_string(), "7".to_string());
        apply_attributes(&mut tree, root, &attrs);

        let node = tree.get(root).expect("root");
        assert_eq!(node.opacity(), 1.0);
        assert_eq!(node.visibility(), Visibility::Visible);
        assert_eq!(
            node.widget(),
            &Widget::Linear {
                orientation: crate::ui::Orientation::Horizontal,
                gap: 7,
                align: CrossAlign::Start,
            }
        );
    }

    #[test]
    fn label_keys() {
        let mut tree = WidgetTree::new();
        let root = tree.insert_root(Widget::label("a"));
        let attrs: &[(&str, &str)] = &[
            ("text", "hello"),
            ("text-size", "20"),
            ("color", "#F00"),
            ("max-lines", "2"),
        ];
        apply_attributes(&mut tree, root, attrs);
        assert_eq!(
            tree.get(root).expect("root").widget(),
            &Widget::Label {
                text: "hello".into(),
                text_size: 20.0,
                color: Color::RED,
                max_lines: Some(2),
            }
        );
    }

    #[test]
    fn border_defaults_fill_missing_parts() {
        let mut tree = WidgetTree::new();
        let root = tree.insert_root(Widget::Stack);
        let attrs: &[(&str, &str)] = &[
            ("border-color", "#00FF00"),
            ("clickable", "yes"),
            ("focusable", "true"),
        ];
        apply_attributes(&mut tree, root, attrs);

        let node = tree.get(root).expect("root");
        let border = node.border().expect("border");
        assert_eq!(border.strokes()[0], BorderStroke::new(1, Color::GREEN));
        assert!(node.flags().is_clickable());
        assert!(node.flags().is_focusable());
    }
}

mod attributes;
mod canvas;
mod color;
mod drawable;
mod flags;
mod geometry;
mod host;
mod input;
mod length;
mod measure;
mod paint;
mod recording;
mod widget;

pub use attributes::{AttributeSet, apply_attributes};
pub use canvas::{Brush, Canvas, CanvasError, DrawResult, Pen, TextMetrics, TextPaint};
pub use color::{Color, ParseColorError};
pub use drawable::{Border, BorderStroke, ColorDrawable, Drawable};
pub use flags::{Visibility, WidgetFlags};
pub use geometry::{CornerRadii, Insets, Line, Point, Rect, RoundRect, Size, Transform};
pub use host::WidgetHost;
pub use input::{MouseButton, UiState};
pub use length::{BoxConstraints, EdgeInsets, LayoutSize, Length, LengthContext, PixelBounds, Unit};
pub use recording::{DrawCommand, DrawList, RecordingCanvas};
pub use widget::{CrossAlign, Orientation, Widget, WidgetNode};

use std::rc::Rc;

use slotmap::{SecondaryMap, SlotMap, new_key_type};

use crate::config::UiConfig;
use crate::error::{LayoutError, Result};

new_key_type! {
    /// Handle into the widget arena. Stable across insertions/removals.
    pub struct WidgetId;
}

/// Click handler. Receives the tree so it can mutate widgets.
pub type ClickCallback = Box<dyn FnMut(&mut WidgetTree, WidgetId)>;

// ---------------------------------------------------------------------------
// WidgetTree
// ---------------------------------------------------------------------------

/// Arena-backed retained widget tree.
///
/// Containers own their children through the arena; each child stores a
/// plain back-reference to its container. A widget is resident in at most
/// one container at a time.
pub struct WidgetTree {
    arena: SlotMap<WidgetId, WidgetNode>,
    root: Option<WidgetId>,
    host: Option<Rc<dyn WidgetHost>>,
    click_handlers: SecondaryMap<WidgetId, Vec<ClickCallback>>,
    /// Density and viewport captured at the start of the last measure.
    ctx: LengthContext,
    config: UiConfig,
}

impl Default for WidgetTree {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetTree {
    pub fn new() -> Self {
        Self::with_config(UiConfig::default())
    }

    pub fn with_config(config: UiConfig) -> Self {
        Self {
            arena: SlotMap::with_key(),
            root: None,
            host: None,
            click_handlers: SecondaryMap::new(),
            ctx: LengthContext::new(config.density, config.viewport.size()),
            config,
        }
    }

    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    /// Density and viewport used to resolve lengths.
    pub fn length_context(&self) -> LengthContext {
        self.ctx
    }

    pub fn set_host(&mut self, host: Rc<dyn WidgetHost>) {
        self.host = Some(host);
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// Create a detached widget.
    pub fn create(&mut self, widget: Widget) -> WidgetId {
        self.arena
            .insert(WidgetNode::new(widget, self.config.bounds_clip))
    }

    /// A label styled with the configured text defaults.
    pub fn default_label(&self, text: impl Into<String>) -> Widget {
        Widget::Label {
            text: text.into(),
            text_size: self.config.text_size,
            color: self.config.text_color,
            max_lines: None,
        }
    }

    /// Create a widget and make it the root. A previous root stays in the
    /// arena, detached.
    pub fn insert_root(&mut self, widget: Widget) -> WidgetId {
        let id = self.create(widget);
        self.root = Some(id);
        id
    }

    /// Make an existing detached widget the root.
    pub fn set_root(&mut self, id: WidgetId) -> Result<()> {
        let node = self.arena.get(id).ok_or(LayoutError::UnknownWidget)?;
        if node.parent.is_some() {
            return Err(LayoutError::AlreadyAttached);
        }
        self.root = Some(id);
        self.request_layout(id);
        Ok(())
    }

    pub fn root(&self) -> Option<WidgetId> {
        self.root
    }

    /// Create a widget and append it to `parent`.
    pub fn insert(&mut self, parent: WidgetId, widget: Widget) -> Result<WidgetId> {
        let len = self.container(parent)?.children.len();
        self.insert_at(parent, len, widget)
    }

    /// Create a widget and insert it at `index` among `parent`'s children.
    pub fn insert_at(&mut self, parent: WidgetId, index: usize, widget: Widget) -> Result<WidgetId> {
        let len = self.container(parent)?.children.len();
        if index > len {
            return Err(LayoutError::IndexOutOfBounds { index, len });
        }
        let id = self.create(widget);
        self.link(parent, index, id);
        Ok(id)
    }

    /// Append an existing detached widget to `parent`.
    pub fn attach(&mut self, parent: WidgetId, child: WidgetId) -> Result<()> {
        let len = self.container(parent)?.children.len();
        self.attach_at(parent, len, child)
    }

    pub fn attach_at(&mut self, parent: WidgetId, index: usize, child: WidgetId) -> Result<()> {
        let len = self.container(parent)?.children.len();
        if index > len {
            return Err(LayoutError::IndexOutOfBounds { index, len });
        }
        let node = self.arena.get(child).ok_or(LayoutError::UnknownWidget)?;
        if node.parent.is_some() || self.root == Some(child) {
            return Err(LayoutError::AlreadyAttached);
        }
        if parent == child || self.ancestors(parent).any(|a| a == child) {
            return Err(LayoutError::Cycle);
        }
        self.link(parent, index, child);
        Ok(())
    }

    fn link(&mut self, parent: WidgetId, index: usize, child: WidgetId) {
        if let Some(node) = self.arena.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(p) = self.arena.get_mut(parent) {
            p.children.insert(index, child);
            p.flags.insert(WidgetFlags::DIRTY_LAYOUT);
        }
        log::debug!("attached {child:?} to {parent:?} at {index}");
    }

    /// Detach `child` from `parent`. The subtree stays in the arena and can
    /// be attached elsewhere; call [`request_layout`](Self::request_layout)
    /// on the parent afterwards.
    pub fn remove_child(&mut self, parent: WidgetId, child: WidgetId) -> Result<()> {
        let index = self
            .container(parent)?
            .children
            .iter()
            .position(|c| *c == child)
            .ok_or(LayoutError::NotAChild)?;
        self.remove_child_at(parent, index).map(|_| ())
    }

    /// Detach the child at `index` and return it.
    pub fn remove_child_at(&mut self, parent: WidgetId, index: usize) -> Result<WidgetId> {
        let len = self.container(parent)?.children.len();
        if index >= len {
            return Err(LayoutError::IndexOutOfBounds { index, len });
        }
        let Some(p) = self.arena.get_mut(parent) else {
            return Err(LayoutError::UnknownWidget);
        };
        let child = p.children.remove(index);
        p.flags.insert(WidgetFlags::DIRTY_LAYOUT);
        if let Some(node) = self.arena.get_mut(child) {
            node.parent = None;
        }
        self.discard_canvas(child);
        self.notify_removed(child);
        Ok(child)
    }

    /// Clears interaction state on a subtree that just left the tree.
    fn notify_removed(&mut self, id: WidgetId) {
        let mut subtree = Vec::new();
        Self::collect_subtree(&self.arena, id, &mut subtree);
        for wid in &subtree {
            if let Some(node) = self.arena.get_mut(*wid) {
                node.flags
                    .remove(WidgetFlags::HOVERED | WidgetFlags::PRESSED | WidgetFlags::IN_PASS);
            }
        }
        log::debug!("removed {id:?} ({} widgets)", subtree.len());
    }

    /// Remove a widget and all its descendants from the arena.
    pub fn remove(&mut self, id: WidgetId) {
        let mut to_remove = Vec::new();
        Self::collect_subtree(&self.arena, id, &mut to_remove);

        if let Some(node) = self.arena.get(id)
            && let Some(parent_id) = node.parent
            && let Some(parent) = self.arena.get_mut(parent_id)
        {
            parent.children.retain(|c| *c != id);
            parent.flags.insert(WidgetFlags::DIRTY_LAYOUT);
        }

        if self.root == Some(id) {
            self.root = None;
        }

        for rid in to_remove {
            self.arena.remove(rid);
            self.click_handlers.remove(rid);
        }
    }

    /// Remove and destroy every child of `parent`.
    pub fn clear_children(&mut self, parent: WidgetId) -> Result<()> {
        let children = std::mem::take(&mut self.container_mut(parent)?.children);
        for child in children {
            if let Some(node) = self.arena.get_mut(child) {
                node.parent = None;
            }
            self.remove(child);
        }
        if let Some(p) = self.arena.get_mut(parent) {
            p.flags.insert(WidgetFlags::DIRTY_LAYOUT);
        }
        Ok(())
    }

    fn collect_subtree(
        arena: &SlotMap<WidgetId, WidgetNode>,
        id: WidgetId,
        out: &mut Vec<WidgetId>,
    ) {
        out.push(id);
        if let Some(node) = arena.get(id) {
            for &child in &node.children {
                Self::collect_subtree(arena, child, out);
            }
        }
    }

    fn container(&self, id: WidgetId) -> Result<&WidgetNode> {
        let node = self.arena.get(id).ok_or(LayoutError::UnknownWidget)?;
        if !node.widget.is_container() {
            return Err(LayoutError::NotAContainer);
        }
        Ok(node)
    }

    fn container_mut(&mut self, id: WidgetId) -> Result<&mut WidgetNode> {
        let node = self.arena.get_mut(id).ok_or(LayoutError::UnknownWidget)?;
        if !node.widget.is_container() {
            return Err(LayoutError::NotAContainer);
        }
        Ok(node)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Get a reference to a widget node.
    pub fn get(&self, id: WidgetId) -> Option<&WidgetNode> {
        self.arena.get(id)
    }

    #[cfg(test)]
    pub(crate) fn get_mut(&mut self, id: WidgetId) -> Option<&mut WidgetNode> {
        self.arena.get_mut(id)
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.arena.contains_key(id)
    }

    /// Number of widgets in the arena, attached or not.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.arena.get(id)?.parent
    }

    pub fn child_at(&self, parent: WidgetId, index: usize) -> Option<WidgetId> {
        self.arena.get(parent)?.children.get(index).copied()
    }

    pub fn child_index(&self, parent: WidgetId, child: WidgetId) -> Option<usize> {
        self.arena
            .get(parent)?
            .children
            .iter()
            .position(|c| *c == child)
    }

    pub fn child_count(&self, parent: WidgetId) -> usize {
        self.arena.get(parent).map_or(0, |n| n.children.len())
    }

    /// Iterates from `id`'s parent up to the top of its tree.
    pub fn ancestors(&self, id: WidgetId) -> impl Iterator<Item = WidgetId> + '_ {
        std::iter::successors(self.parent(id), move |p| self.parent(*p))
    }

    /// True when `id` is the root or hangs below it.
    pub fn is_attached(&self, id: WidgetId) -> bool {
        let Some(root) = self.root else {
            return false;
        };
        id == root || self.ancestors(id).any(|a| a == root)
    }

    /// Depth-first search from the root for a widget with the given `id` attribute.
    pub fn find_by_id(&self, name: &str) -> Option<WidgetId> {
        self.find_by_id_from(self.root?, name)
    }

    pub fn find_by_id_from(&self, start: WidgetId, name: &str) -> Option<WidgetId> {
        let node = self.arena.get(start)?;
        if node.id.as_deref() == Some(name) {
            return Some(start);
        }
        node.children
            .iter()
            .find_map(|&c| self.find_by_id_from(c, name))
    }

    // ------------------------------------------------------------------
    // Dirty propagation
    // ------------------------------------------------------------------

    /// Mark `id` and every ancestor as needing layout and paint, then
    /// notify the host if the chain reaches the root.
    ///
    /// Calling this while a measure or layout pass is running on the chain
    /// is a programming error: it panics in debug builds and is ignored
    /// (with an error log) otherwise.
    pub fn request_layout(&mut self, id: WidgetId) {
        if !self.arena.contains_key(id) {
            return;
        }
        let chain: Vec<WidgetId> = std::iter::once(id).chain(self.ancestors(id)).collect();
        let reentrant = chain
            .iter()
            .any(|w| self.arena.get(*w).is_some_and(|n| n.flags.is_in_pass()));
        debug_assert!(
            !reentrant,
            "request_layout on {id:?} during an active measure/layout pass"
        );
        if reentrant {
            log::error!("ignoring request_layout on {id:?} during an active pass");
            return;
        }

        for w in &chain {
            if let Some(node) = self.arena.get_mut(*w) {
                node.flags.insert(WidgetFlags::DIRTY);
            }
        }
        if self.root.is_some()
            && chain.last().copied() == self.root
            && let Some(host) = &self.host
        {
            host.request_layout();
        }
    }

    /// Mark `id` as needing paint and ask the host for a frame covering it.
    pub fn invalidate(&mut self, id: WidgetId) {
        let Some(node) = self.arena.get_mut(id) else {
            return;
        };
        node.flags.insert(WidgetFlags::DIRTY_PAINT);
        let dirty = node.absolute_rect();
        if self.is_attached(id)
            && let Some(host) = &self.host
        {
            host.schedule_frame(dirty);
        }
    }

    /// Commit a measured size. Negative components are rejected.
    pub fn set_measured_size(&mut self, id: WidgetId, size: Size) -> Result<()> {
        if !size.is_valid() {
            return Err(LayoutError::InvalidSize {
                width: size.width,
                height: size.height,
            });
        }
        let node = self.arena.get_mut(id).ok_or(LayoutError::UnknownWidget)?;
        node.measured = size;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Setters
    // ------------------------------------------------------------------

    /// Apply `f` to a node and request layout if it reports a change.
    fn update_layout(&mut self, id: WidgetId, f: impl FnOnce(&mut WidgetNode) -> bool) {
        if let Some(node) = self.arena.get_mut(id)
            && f(node)
        {
            self.request_layout(id);
        }
    }

    /// Apply `f` to a node and invalidate it if it reports a change.
    fn update_paint(&mut self, id: WidgetId, f: impl FnOnce(&mut WidgetNode) -> bool) {
        if let Some(node) = self.arena.get_mut(id)
            && f(node)
        {
            self.invalidate(id);
        }
    }

    pub fn set_id(&mut self, id: WidgetId, name: impl Into<String>) {
        if let Some(node) = self.arena.get_mut(id) {
            node.id = Some(name.into());
        }
    }

    pub fn set_size(&mut self, id: WidgetId, size: LayoutSize) {
        self.update_layout(id, |n| std::mem::replace(&mut n.size, size) != size);
    }

    pub fn set_width(&mut self, id: WidgetId, width: Length) {
        self.update_layout(id, |n| std::mem::replace(&mut n.size.width, width) != width);
    }

    pub fn set_height(&mut self, id: WidgetId, height: Length) {
        self.update_layout(id, |n| std::mem::replace(&mut n.size.height, height) != height);
    }

    /// Set min size. Ignored (with a warning) when it contradicts an
    /// absolute-pixel max.
    pub fn set_minimum_size(&mut self, id: WidgetId, width: Length, height: Length) {
        self.update_layout(id, |n| {
            let next = BoxConstraints {
                min_width: width,
                min_height: height,
                ..n.constraints
            };
            Self::replace_constraints(n, next)
        });
    }

    /// Set max size. Ignored (with a warning) when it contradicts an
    /// absolute-pixel min.
    pub fn set_maximum_size(&mut self, id: WidgetId, width: Length, height: Length) {
        self.update_layout(id, |n| {
            let next = BoxConstraints {
                max_width: width,
                max_height: height,
                ..n.constraints
            };
            Self::replace_constraints(n, next)
        });
    }

    fn replace_constraints(node: &mut WidgetNode, next: BoxConstraints) -> bool {
        if next.is_contradictory() {
            log::warn!("ignoring contradictory size constraints {next:?}");
            return false;
        }
        std::mem::replace(&mut node.constraints, next) != next
    }

    pub fn set_margin(&mut self, id: WidgetId, margin: EdgeInsets) {
        self.update_layout(id, |n| std::mem::replace(&mut n.margin, margin) != margin);
    }

    pub fn set_padding(&mut self, id: WidgetId, padding: EdgeInsets) {
        self.update_layout(id, |n| std::mem::replace(&mut n.padding, padding) != padding);
    }

    /// Replace the border. Its insets feed into measure, so this re-lays out.
    pub fn set_border(&mut self, id: WidgetId, border: Option<Border>) {
        self.update_layout(id, |n| {
            n.border = border;
            true
        });
    }

    pub fn set_background(&mut self, id: WidgetId, background: Option<Box<dyn Drawable>>) {
        self.update_paint(id, |n| {
            let opaque = background.as_ref().is_some_and(|b| b.is_opaque());
            n.flags.set(WidgetFlags::OPAQUE, opaque);
            n.background = background;
            true
        });
    }

    pub fn set_background_color(&mut self, id: WidgetId, color: Color) {
        self.set_background(id, Some(Box::new(ColorDrawable::new(color))));
    }

    /// Opacity is clamped to `[0, 1]`.
    pub fn set_opacity(&mut self, id: WidgetId, opacity: f32) {
        let opacity = opacity.clamp(0.0, 1.0);
        self.update_paint(id, |n| std::mem::replace(&mut n.opacity, opacity) != opacity);
    }

    /// Transitions into or out of `Collapsed` re-lay out; others repaint.
    pub fn set_visibility(&mut self, id: WidgetId, visibility: Visibility) {
        let Some(node) = self.arena.get_mut(id) else {
            return;
        };
        let old = node.visibility;
        if old == visibility {
            return;
        }
        node.visibility = visibility;
        node.flags
            .set(WidgetFlags::WILL_NOT_DRAW, visibility != Visibility::Visible);
        if old == Visibility::Collapsed || visibility == Visibility::Collapsed {
            self.request_layout(id);
        } else {
            self.invalidate(id);
        }
    }

    pub fn show(&mut self, id: WidgetId) {
        self.set_visibility(id, Visibility::Visible);
    }

    pub fn hide(&mut self, id: WidgetId) {
        self.set_visibility(id, Visibility::Collapsed);
    }

    fn set_flag(&mut self, id: WidgetId, flag: WidgetFlags, on: bool) {
        self.update_paint(id, |n| {
            let changed = n.flags.contains(flag) != on;
            n.flags.set(flag, on);
            changed
        });
    }

    pub fn set_enabled(&mut self, id: WidgetId, enabled: bool) {
        self.set_flag(id, WidgetFlags::DISABLED, !enabled);
    }

    pub fn set_clickable(&mut self, id: WidgetId, clickable: bool) {
        self.set_flag(id, WidgetFlags::CLICKABLE, clickable);
    }

    pub fn set_hovered(&mut self, id: WidgetId, hovered: bool) {
        self.set_flag(id, WidgetFlags::HOVERED, hovered);
    }

    pub(crate) fn set_pressed(&mut self, id: WidgetId, pressed: bool) {
        self.set_flag(id, WidgetFlags::PRESSED, pressed);
    }

    pub fn set_focusable(&mut self, id: WidgetId, focusable: bool) {
        if let Some(node) = self.arena.get_mut(id) {
            node.flags.set(WidgetFlags::FOCUSABLE, focusable);
        }
    }

    pub fn set_bounds_clip(&mut self, id: WidgetId, clip: bool) {
        self.set_flag(id, WidgetFlags::BOUNDS_CLIP, clip);
    }

    /// Replace a label's text. Drops the cached text paint.
    pub fn set_text(&mut self, id: WidgetId, new_text: impl Into<String>) {
        let new_text = new_text.into();
        self.update_layout(id, |n| match &mut n.widget {
            Widget::Label { text, .. } if *text != new_text => {
                *text = new_text;
                n.cache.text_paint = None;
                true
            }
            _ => false,
        });
    }

    pub fn set_text_size(&mut self, id: WidgetId, size: f32) {
        self.update_layout(id, |n| match &mut n.widget {
            Widget::Label { text_size, .. } if *text_size != size => {
                *text_size = size;
                n.cache.text_paint = None;
                true
            }
            _ => false,
        });
    }

    pub fn set_text_color(&mut self, id: WidgetId, new_color: Color) {
        self.update_paint(id, |n| match &mut n.widget {
            Widget::Label { color, .. } if *color != new_color => {
                *color = new_color;
                n.cache.text_brush = None;
                true
            }
            _ => false,
        });
    }

    /// Limit a label to `lines` lines; zero is ignored.
    pub fn set_max_lines(&mut self, id: WidgetId, lines: u32) {
        if lines == 0 {
            return;
        }
        self.update_layout(id, |n| match &mut n.widget {
            Widget::Label { max_lines, .. } if *max_lines != Some(lines) => {
                *max_lines = Some(lines);
                true
            }
            _ => false,
        });
    }

    /// Linear container spacing.
    pub fn set_gap(&mut self, id: WidgetId, new_gap: i32) {
        self.update_layout(id, |n| match &mut n.widget {
            Widget::Linear { gap, .. } if *gap != new_gap => {
                *gap = new_gap;
                true
            }
            _ => false,
        });
    }

    pub fn set_cross_align(&mut self, id: WidgetId, new_align: CrossAlign) {
        self.update_layout(id, |n| match &mut n.widget {
            Widget::Linear { align, .. } if *align != new_align => {
                *align = new_align;
                true
            }
            _ => false,
        });
    }

    // ------------------------------------------------------------------
    // Click handlers
    // ------------------------------------------------------------------

    /// Register a click handler and mark the widget clickable.
    pub fn bind_on_click(
        &mut self,
        id: WidgetId,
        callback: impl FnMut(&mut WidgetTree, WidgetId) + 'static,
    ) {
        if !self.arena.contains_key(id) {
            return;
        }
        self.set_clickable(id, true);
        match self.click_handlers.get_mut(id) {
            Some(handlers) => handlers.push(Box::new(callback)),
            None => {
                self.click_handlers.insert(id, vec![Box::new(callback)]);
            }
        }
    }

    /// Run every click handler of `id`. Handlers registered while running
    /// are kept and run on the next click.
    pub fn fire_click(&mut self, id: WidgetId) {
        let Some(mut handlers) = self.click_handlers.remove(id) else {
            return;
        };
        log::debug!("click on {id:?} ({} handlers)", handlers.len());
        for handler in handlers.iter_mut() {
            handler(self, id);
        }
        if self.arena.contains_key(id) {
            if let Some(added) = self.click_handlers.remove(id) {
                handlers.extend(added);
            }
            self.click_handlers.insert(id, handlers);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[derive(Default)]
    struct CountingHost {
        layouts: Cell<usize>,
        frames: Cell<usize>,
    }

    impl WidgetHost for CountingHost {
        fn request_layout(&self) {
            self.layouts.set(self.layouts.get() + 1);
        }

        fn schedule_frame(&self, _dirty: Rect) {
            self.frames.set(self.frames.get() + 1);
        }
    }

    fn tree_with_host() -> (WidgetTree, Rc<CountingHost>, WidgetId) {
        let mut tree = WidgetTree::new();
        let host = Rc::new(CountingHost::default());
        tree.set_host(host.clone());
        let root = tree.insert_root(Widget::Stack);
        (tree, host, root)
    }

    #[test]
    fn insert_root_and_child() {
        let mut tree = WidgetTree::new();
        let root = tree.insert_root(Widget::Stack);
        let child = tree.insert(root, Widget::label("Hello")).expect("insert");

        let root_node = tree.get(root).expect("root exists");
        assert_eq!(root_node.children(), &[child]);
        assert_eq!(tree.parent(child), Some(root));
        assert!(tree.is_attached(child));
    }

    #[test]
    fn leaves_reject_children() {
        let mut tree = WidgetTree::new();
        let root = tree.insert_root(Widget::Block);
        assert_eq!(
            tree.insert(root, Widget::Block),
            Err(LayoutError::NotAContainer)
        );
    }

    #[test]
    fn insert_at_validates_index() {
        let mut tree = WidgetTree::new();
        let root = tree.insert_root(Widget::Stack);
        let a = tree.insert(root, Widget::Block).expect("insert");
        let b = tree.insert_at(root, 0, Widget::Block).expect("insert");
        assert_eq!(tree.child_index(root, a), Some(1));
        assert_eq!(tree.child_at(root, 0), Some(b));
        assert_eq!(
            tree.insert_at(root, 5, Widget::Block),
            Err(LayoutError::IndexOutOfBounds { index: 5, len: 2 })
        );
        assert_eq!(tree.child_count(root), 2);
    }

    #[test]
    fn attach_rejects_second_parent_and_cycles() {
        let mut tree = WidgetTree::new();
        let root = tree.insert_root(Widget::Stack);
        let inner = tree.insert(root, Widget::Stack).expect("insert");
        let other = tree.create(Widget::Stack);

        assert_eq!(tree.attach(other, inner), Err(LayoutError::AlreadyAttached));
        assert_eq!(tree.attach(inner, root), Err(LayoutError::AlreadyAttached));

        let loose = tree.create(Widget::Stack);
        let below = tree.insert(loose, Widget::Stack).expect("insert");
        assert_eq!(tree.attach(below, loose), Err(LayoutError::Cycle));
        assert_eq!(tree.attach(loose, loose), Err(LayoutError::Cycle));
        tree.attach(root, loose).expect("attach");
        assert!(tree.is_attached(below));
    }

    #[test]
    fn remove_child_detaches_but_keeps_subtree() {
        let mut tree = WidgetTree::new();
        let root = tree.insert_root(Widget::Stack);
        let child = tree.insert(root, Widget::Stack).expect("insert");
        let grandchild = tree.insert(child, Widget::Block).expect("insert");
        tree.set_hovered(grandchild, true);

        tree.remove_child(root, child).expect("remove");
        assert_eq!(tree.child_count(root), 0);
        assert_eq!(tree.parent(child), None);
        assert_eq!(tree.parent(grandchild), Some(child));
        assert!(!tree.get(grandchild).expect("alive").flags().is_hovered());
        assert!(tree.get(root).expect("root").flags().is_dirty_layout());
        assert_eq!(tree.remove_child(root, child), Err(LayoutError::NotAChild));

        tree.attach(root, child).expect("reattach");
        assert!(tree.is_attached(grandchild));
    }

    #[test]
    fn remove_subtree() {
        let mut tree = WidgetTree::new();
        let root = tree.insert_root(Widget::Stack);
        let child = tree.insert(root, Widget::Stack).expect("insert");
        let grandchild = tree.insert(child, Widget::Block).expect("insert");

        tree.remove(child);
        assert!(!tree.contains(child));
        assert!(!tree.contains(grandchild));
        assert_eq!(tree.child_count(root), 0);
    }

    #[test]
    fn clear_children_destroys() {
        let mut tree = WidgetTree::new();
        let root = tree.insert_root(Widget::column(0));
        for _ in 0..3 {
            tree.insert(root, Widget::Block).expect("insert");
        }
        tree.clear_children(root).expect("clear");
        assert_eq!(tree.child_count(root), 0);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn find_by_id_searches_depth_first() {
        let mut tree = WidgetTree::new();
        let root = tree.insert_root(Widget::Stack);
        let row = tree.insert(root, Widget::row(0)).expect("insert");
        let label = tree.insert(row, Widget::label("x")).expect("insert");
        tree.set_id(label, "title");
        assert_eq!(tree.find_by_id("title"), Some(label));
        assert_eq!(tree.find_by_id("missing"), None);
    }

    #[test]
    fn request_layout_marks_chain_and_notifies_once() {
        let (mut tree, host, root) = tree_with_host();
        let child = tree.insert(root, Widget::Stack).expect("insert");
        let leaf = tree.insert(child, Widget::Block).expect("insert");
        for id in [root, child, leaf] {
            tree.get_mut(id).expect("node").flags.remove(WidgetFlags::DIRTY);
        }

        tree.request_layout(leaf);
        for id in [root, child, leaf] {
            assert!(tree.get(id).expect("node").flags().is_dirty_layout());
        }
        assert_eq!(host.layouts.get(), 1);
    }

    #[test]
    fn detached_request_does_not_reach_host() {
        let (mut tree, host, _root) = tree_with_host();
        let loose = tree.create(Widget::Block);
        tree.request_layout(loose);
        tree.invalidate(loose);
        assert_eq!(host.layouts.get(), 0);
        assert_eq!(host.frames.get(), 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "active measure/layout pass")]
    fn request_layout_during_pass_panics() {
        let mut tree = WidgetTree::new();
        let root = tree.insert_root(Widget::Stack);
        let child = tree.insert(root, Widget::Block).expect("insert");
        tree.get_mut(root)
            .expect("root")
            .flags
            .insert(WidgetFlags::IN_LAYOUT);
        tree.request_layout(child);
    }

    #[test]
    fn visibility_transitions() {
        let (mut tree, host, root) = tree_with_host();
        let child = tree.insert(root, Widget::Block).expect("insert");

        tree.set_visibility(child, Visibility::Invisible);
        assert_eq!(host.layouts.get(), 0);
        assert_eq!(host.frames.get(), 1);
        assert!(tree.get(child).expect("child").flags().contains(WidgetFlags::WILL_NOT_DRAW));

        tree.hide(child);
        assert_eq!(host.layouts.get(), 1);
        tree.hide(child);
        assert_eq!(host.layouts.get(), 1);
        tree.show(child);
        assert_eq!(host.layouts.get(), 2);
        assert!(!tree.get(child).expect("child").flags().contains(WidgetFlags::WILL_NOT_DRAW));
    }

    #[test]
    fn negative_measured_size_rejected() {
        let mut tree = WidgetTree::new();
        let root = tree.insert_root(Widget::Block);
        assert_eq!(
            tree.set_measured_size(root, Size::new(-1, 5)),
            Err(LayoutError::InvalidSize { width: -1, height: 5 })
        );
        assert_eq!(tree.get(root).expect("root").measured_size(), Size::UNSET);
        tree.set_measured_size(root, Size::new(3, 4)).expect("valid");
    }

    #[test]
    fn contradictory_min_max_ignored() {
        let mut tree = WidgetTree::new();
        let root = tree.insert_root(Widget::Block);
        tree.set_maximum_size(root, Length::px(10), Length::px(10));
        tree.set_minimum_size(root, Length::px(50), Length::px(5));
        let c = tree.get(root).expect("root").constraints();
        assert_eq!(c.min_width, Length::px(0));
        assert_eq!(c.max_width, Length::px(10));
    }

    #[test]
    fn click_handlers_survive_and_can_mutate_tree() {
        let mut tree = WidgetTree::new();
        let root = tree.insert_root(Widget::Stack);
        let button = tree.insert(root, Widget::label("go")).expect("insert");
        tree.bind_on_click(button, |tree, id| tree.set_text(id, "gone"));
        assert!(tree.get(button).expect("button").flags().is_clickable());

        tree.fire_click(button);
        tree.fire_click(button);
        assert_eq!(
            tree.get(button).expect("button").widget(),
            &Widget::Label {
                text: "gone".into(),
                text_size: 14.0,
                color: Color::BLACK,
                max_lines: None,
            }
        );
    }
}

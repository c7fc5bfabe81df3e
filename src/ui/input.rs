use super::flags::Visibility;
use super::geometry::Point;
use super::{WidgetId, WidgetTree};

/// Mouse button identifier (decoupled from any windowing backend).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Interaction state for the widget tree. Lives on the host, not the tree.
#[derive(Debug, Default)]
pub struct UiState {
    /// Deepest widget currently under the cursor.
    pub hovered: Option<WidgetId>,
    /// Widget being pressed (mouse down, not yet released).
    pressed: Option<WidgetId>,
    /// Mouse button that initiated the press.
    pressed_button: Option<MouseButton>,
    /// Last known cursor position (root coords).
    pub cursor: Point,
    /// Focusable widget that took the last press.
    pub focused: Option<WidgetId>,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pressed(&self) -> Option<WidgetId> {
        self.pressed
    }

    /// Handle cursor movement. Returns true if a widget handled it.
    pub fn handle_cursor_moved(&mut self, tree: &mut WidgetTree, p: Point) -> bool {
        self.cursor = p;
        let handled = tree.dispatch_mouse_move(p);
        self.hovered = tree.hit_test(p);
        handled
    }

    /// Handle mouse button press/release. A left press and release on the
    /// same clickable widget fires its click handlers. Returns true if
    /// consumed.
    pub fn handle_mouse_input(
        &mut self,
        tree: &mut WidgetTree,
        button: MouseButton,
        pressed: bool,
        p: Point,
    ) -> bool {
        self.cursor = p;
        let target = tree.click_target(p);

        if pressed {
            if let Some(id) = tree.focus_at(p) {
                self.focused = Some(id);
            }
            if let Some(id) = target {
                self.pressed = Some(id);
                self.pressed_button = Some(button);
                tree.set_pressed(id, true);
            }
            return target.is_some();
        }

        let Some(pressed_id) = self.pressed.take() else {
            return target.is_some();
        };
        let pressed_button = self.pressed_button.take();
        tree.set_pressed(pressed_id, false);

        if target == Some(pressed_id)
            && pressed_button == Some(button)
            && button == MouseButton::Left
        {
            tree.fire_click(pressed_id);
        }
        true
    }
}

impl WidgetTree {
    /// Deepest visible widget containing `p` (root coordinates). Siblings
    /// are tried in insertion order, first match wins.
    pub fn hit_test(&self, p: Point) -> Option<WidgetId> {
        self.hit_test_node(self.root?, p)
    }

    /// `p` is in the parent's coordinate space.
    fn hit_test_node(&self, id: WidgetId, p: Point) -> Option<WidgetId> {
        let node = self.arena.get(id)?;
        if node.visibility != Visibility::Visible || !node.rect().contains(p) {
            return None;
        }
        let local = p - node.position;
        node.children
            .iter()
            .find_map(|&child| self.hit_test_node(child, local))
            .or(Some(id))
    }

    /// Nearest clickable, enabled widget at or above the hit widget.
    pub fn click_target(&self, p: Point) -> Option<WidgetId> {
        let hit = self.hit_test(p)?;
        std::iter::once(hit)
            .chain(self.ancestors(hit))
            .find(|id| {
                self.arena
                    .get(*id)
                    .is_some_and(|n| n.flags.is_clickable() && n.flags.is_enabled())
            })
    }

    /// Nearest focusable, enabled widget at or above the hit widget. The
    /// host is asked to capture focus for it.
    pub fn focus_at(&self, p: Point) -> Option<WidgetId> {
        let hit = self.hit_test(p)?;
        let id = std::iter::once(hit).chain(self.ancestors(hit)).find(|id| {
            self.arena
                .get(*id)
                .is_some_and(|n| n.flags.is_focusable() && n.flags.is_enabled())
        })?;
        if let Some(host) = &self.host {
            host.capture_focus(id);
        }
        Some(id)
    }

    /// Route a mouse move through the tree, updating hover flags. Returns
    /// true if some widget handled it.
    pub fn dispatch_mouse_move(&mut self, p: Point) -> bool {
        match self.root {
            Some(root) => self.dispatch_mouse_move_node(root, p),
            None => false,
        }
    }

    /// A widget handles the move when the pointer is inside it and it is
    /// clickable and enabled. Otherwise the move goes on to every child that
    /// is hit or was hovered on the last dispatch, stopping at the first
    /// child that handles it. Hovered children outside the pointer get their
    /// leave this way even when the container itself was missed.
    fn dispatch_mouse_move_node(&mut self, id: WidgetId, p: Point) -> bool {
        let Some(node) = self.arena.get(id) else {
            return false;
        };
        let inside = node.visibility == Visibility::Visible && node.rect().contains(p);
        let was_hovered = node.flags.is_hovered();
        let handles = inside && node.flags.is_clickable() && node.flags.is_enabled();
        let local = p - node.position;
        let children = node.children.clone();

        if inside != was_hovered {
            self.set_hovered(id, inside);
        }
        if handles {
            return true;
        }

        children.into_iter().any(|child| {
            let Some(c) = self.arena.get(child) else {
                return false;
            };
            if c.rect().contains(local) || c.flags.is_hovered() {
                self.dispatch_mouse_move_node(child, local)
            } else {
                false
            }
        })
    }
}

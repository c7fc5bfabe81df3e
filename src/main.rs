//! Headless demo: loads `data/ui.ron` and `data/demo.kdl`, runs a few frames
//! against a recording canvas and replays a scripted pointer session.
//! Run with `RUST_LOG=debug` to see the passes.

use std::cell::Cell;
use std::rc::Rc;

use boxwood::loading;
use boxwood::ui::{
    Color, DrawCommand, DrawResult, EdgeInsets, Length, MouseButton, Point, Rect,
    RecordingCanvas, Size, UiState, Widget, WidgetHost, WidgetId, WidgetTree,
};

/// Host that records what the tree asked for until the next frame.
#[derive(Default)]
struct LogHost {
    needs_layout: Cell<bool>,
    needs_frame: Cell<bool>,
}

impl WidgetHost for LogHost {
    fn request_layout(&self) {
        self.needs_layout.set(true);
        self.needs_frame.set(true);
    }

    fn schedule_frame(&self, dirty: Rect) {
        log::trace!("frame requested for {dirty:?}");
        self.needs_frame.set(true);
    }
}

/// Scripted stand-in for a window's event stream.
enum DemoEvent {
    CursorMoved(Point),
    Mouse(MouseButton, bool, Point),
    Resize(Size),
}

struct App {
    tree: WidgetTree,
    ui_state: UiState,
    canvas: RecordingCanvas,
    host: Rc<LogHost>,
    frames: u32,
}

impl App {
    fn handle(&mut self, event: DemoEvent) {
        match event {
            DemoEvent::CursorMoved(p) => {
                self.ui_state.handle_cursor_moved(&mut self.tree, p);
            }
            DemoEvent::Mouse(button, pressed, p) => {
                self.ui_state
                    .handle_mouse_input(&mut self.tree, button, pressed, p);
            }
            DemoEvent::Resize(size) => self.tree.resize(&mut self.canvas, size),
        }
    }

    /// Run a frame if the tree asked for one since the last.
    fn pump(&mut self) {
        if !self.host.needs_frame.replace(false) {
            return;
        }
        if self.host.needs_layout.replace(false) {
            log::debug!("frame {} re-lays out the tree", self.frames + 1);
        }
        match self.tree.run_frame(&mut self.canvas) {
            Ok(DrawResult::Success) => {}
            Ok(other) => log::warn!("frame finished with {other:?}"),
            Err(e) => {
                log::error!("frame failed: {e}");
                return;
            }
        }
        self.frames += 1;
        log::info!(
            "frame {}: {} draw commands",
            self.frames,
            self.canvas.commands().len()
        );
        for cmd in self.canvas.commands() {
            if let DrawCommand::Text { text, origin, .. } = cmd {
                log::info!("  text {text:?} at ({}, {})", origin.x, origin.y);
            }
        }
    }
}

/// Used when `data/demo.kdl` is missing or malformed.
fn fallback_tree(tree: &mut WidgetTree) -> Option<WidgetId> {
    let root = tree.insert_root(Widget::column(6));
    tree.set_padding(root, EdgeInsets::all(Length::px(12)));
    let title = tree.default_label("Boxwood");
    tree.insert(root, title).ok()?;
    let button = tree.insert(root, Widget::Stack).ok()?;
    tree.set_id(button, "button");
    tree.set_padding(button, EdgeInsets::symmetric(Length::px(4), Length::px(10)));
    tree.set_background_color(button, Color::rgb(0x83, 0xA5, 0x98));
    let label = tree.default_label("Click me");
    let label = tree.insert(button, label).ok()?;
    tree.set_id(label, "button-label");
    Some(root)
}

fn main() {
    env_logger::init();

    let config = loading::load_ui_config("data/ui.ron");
    let canvas = RecordingCanvas::new(config.viewport.size()).with_density(config.density);
    let mut tree = WidgetTree::with_config(config);
    if loading::load_markup(&mut tree, "data/demo.kdl").is_none() {
        log::warn!("falling back to the built-in demo tree");
        fallback_tree(&mut tree);
    }

    let host = Rc::new(LogHost::default());
    host.needs_frame.set(true);
    tree.set_host(host.clone());

    if let Some(button) = tree.find_by_id("button") {
        let mut clicks = 0;
        tree.bind_on_click(button, move |tree, _| {
            clicks += 1;
            if let Some(label) = tree.find_by_id("button-label") {
                tree.set_text(label, format!("Clicked {clicks}x"));
            }
            log::info!("button clicked ({clicks})");
        });
    }

    let mut app = App {
        tree,
        ui_state: UiState::new(),
        canvas,
        host,
        frames: 0,
    };
    app.pump();

    let target = app
        .tree
        .find_by_id("button")
        .and_then(|id| app.tree.get(id))
        .map(|n| n.absolute_rect())
        .unwrap_or_default();
    let center = Point::new(
        target.x + target.width / 2,
        target.y + target.height / 2,
    );

    let script = [
        DemoEvent::CursorMoved(Point::new(1, 1)),
        DemoEvent::CursorMoved(center),
        DemoEvent::Mouse(MouseButton::Left, true, center),
        DemoEvent::Mouse(MouseButton::Left, false, center),
        DemoEvent::Mouse(MouseButton::Left, true, center),
        DemoEvent::Mouse(MouseButton::Left, false, center),
        DemoEvent::Resize(Size::new(180, 320)),
    ];
    for event in script {
        app.handle(event);
        app.pump();
    }
    log::info!("ran {} frames", app.frames);
}

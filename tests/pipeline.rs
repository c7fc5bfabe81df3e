//! End-to-end measure/layout/paint scenarios through the public API.

use std::cell::Cell;
use std::rc::Rc;

use boxwood::error::LayoutError;
use boxwood::ui::{
    Color, DrawResult, EdgeInsets, LayoutSize, Length, MouseButton, Point, Rect,
    RecordingCanvas, Size, UiState, Visibility, Widget, WidgetHost, WidgetId, WidgetTree,
};

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

fn fixed(tree: &mut WidgetTree, id: WidgetId, w: i32, h: i32) {
    tree.set_size(id, LayoutSize::new(Length::px(w), Length::px(h)));
}

fn measured(tree: &WidgetTree, id: WidgetId) -> Size {
    tree.get(id).expect("widget").measured_size()
}

#[test]
fn zero_available_space_collapses_everything() {
    let mut tree = WidgetTree::new();
    let root = tree.insert_root(Widget::Stack);
    let column = tree.insert(root, Widget::column(4)).expect("insert");
    let label = tree.insert(column, Widget::label("never measured")).expect("insert");
    let block = tree.insert(column, Widget::Block).expect("insert");
    fixed(&mut tree, block, 10, 10);

    // A label that actually ran its measure logic would need a text paint.
    let mut canvas = RecordingCanvas::new(Size::new(100, 100));
    canvas.fail_resources = true;
    tree.measure(root, &mut canvas, Size::ZERO, Size::UNSET)
        .expect("zero check only");

    for id in [root, column, label, block] {
        assert_eq!(measured(&tree, id), Size::ZERO);
    }
    assert_eq!(canvas.resources_created, 0);
}

#[test]
fn single_fixed_child_plus_padding() {
    let mut tree = WidgetTree::new();
    let root = tree.insert_root(Widget::Stack);
    tree.set_padding(root, EdgeInsets::new(Length::px(1), Length::px(2), Length::px(3), Length::px(4)));
    let child = tree.insert(root, Widget::Block).expect("insert");
    fixed(&mut tree, child, 50, 30);

    let mut canvas = RecordingCanvas::new(Size::new(800, 600));
    tree.measure(root, &mut canvas, Size::new(200, 200), Size::UNSET)
        .expect("measure");
    assert_eq!(measured(&tree, child), Size::new(50, 30));
    assert_eq!(measured(&tree, root), Size::new(54, 36));
}

#[test]
fn percent_child_resolves_against_final_content() {
    let mut tree = WidgetTree::new();
    let root = tree.insert_root(Widget::Stack);
    tree.set_width(root, Length::px(200));
    let child = tree.insert(root, Widget::Block).expect("insert");
    tree.set_size(child, LayoutSize::new(Length::percent(50.0), Length::px(10)));

    let mut canvas = RecordingCanvas::new(Size::new(800, 600));
    tree.measure(root, &mut canvas, Size::new(800, 600), Size::UNSET)
        .expect("measure");
    assert_eq!(measured(&tree, child).width, 100);
    assert_eq!(measured(&tree, root), Size::new(200, 10));
}

#[test]
fn fixed_children_are_stable_across_passes() {
    let mut tree = WidgetTree::new();
    let root = tree.insert_root(Widget::row(3));
    let kids: Vec<WidgetId> = (0..4)
        .map(|i| {
            let id = tree.insert(root, Widget::Block).expect("insert");
            fixed(&mut tree, id, 10 + i, 20 - i);
            tree.set_margin(id, EdgeInsets::all(Length::px(i)));
            id
        })
        .collect();

    let mut canvas = RecordingCanvas::new(Size::new(800, 600));
    tree.measure(root, &mut canvas, Size::new(300, 300), Size::UNSET)
        .expect("measure");
    let first: Vec<Size> = kids.iter().map(|&k| measured(&tree, k)).collect();
    let root_first = measured(&tree, root);

    tree.measure(root, &mut canvas, Size::new(300, 300), Size::UNSET)
        .expect("measure");
    let second: Vec<Size> = kids.iter().map(|&k| measured(&tree, k)).collect();
    assert_eq!(first, second);
    assert_eq!(measured(&tree, root), root_first);
}

#[test]
fn collapse_transitions_request_layout_once_each() {
    let mut tree = WidgetTree::new();
    let host = Rc::new(CountingHost::default());
    tree.set_host(host.clone());
    let root = tree.insert_root(Widget::column(0));
    let a = tree.insert(root, Widget::Block).expect("insert");
    let b = tree.insert(root, Widget::Block).expect("insert");
    fixed(&mut tree, a, 10, 10);
    fixed(&mut tree, b, 10, 10);
    let base = host.layouts.get();

    let mut canvas = RecordingCanvas::new(Size::new(100, 100));
    tree.run_frame(&mut canvas).expect("frame");
    assert_eq!(measured(&tree, root), Size::new(10, 20));

    tree.set_visibility(a, Visibility::Collapsed);
    assert_eq!(host.layouts.get(), base + 1);
    tree.run_frame(&mut canvas).expect("frame");
    assert_eq!(measured(&tree, root), Size::new(10, 10));
    assert_eq!(measured(&tree, a), Size::ZERO);
    assert_eq!(tree.get(b).expect("b").rect(), Rect::new(0, 0, 10, 10));

    tree.set_visibility(a, Visibility::Visible);
    assert_eq!(host.layouts.get(), base + 2);
    tree.run_frame(&mut canvas).expect("frame");
    assert_eq!(measured(&tree, root), Size::new(10, 20));
}

#[test]
fn removed_widget_leaves_layout_and_hit_testing() {
    let mut tree = WidgetTree::new();
    let root = tree.insert_root(Widget::row(0));
    let a = tree.insert(root, Widget::Block).expect("insert");
    let b = tree.insert(root, Widget::Block).expect("insert");
    fixed(&mut tree, a, 20, 20);
    fixed(&mut tree, b, 20, 20);

    let mut canvas = RecordingCanvas::new(Size::new(100, 100));
    tree.run_frame(&mut canvas).expect("frame");
    assert_eq!(tree.hit_test(Point::new(25, 5)), Some(b));

    tree.remove_child(root, a).expect("remove");
    assert_eq!(tree.remove_child(root, a), Err(LayoutError::NotAChild));
    tree.run_frame(&mut canvas).expect("frame");
    assert_eq!(tree.hit_test(Point::new(5, 5)), Some(b));
    assert_eq!(tree.hit_test(Point::new(25, 5)), None);
    assert!(tree.contains(a));
    assert!(!tree.is_attached(a));
}

#[test]
fn click_relabels_button_on_next_frame() {
    let mut tree = WidgetTree::new();
    let host = Rc::new(CountingHost::default());
    tree.set_host(host.clone());
    let root = tree.insert_root(Widget::Stack);
    let button = tree.insert(root, Widget::Stack).expect("insert");
    tree.set_padding(button, EdgeInsets::all(Length::px(2)));
    tree.set_background_color(button, Color::BLUE);
    let label = tree.insert(button, Widget::label("go")).expect("insert");
    tree.bind_on_click(button, move |tree, _| tree.set_text(label, "gone!"));

    let mut canvas = RecordingCanvas::new(Size::new(200, 100));
    tree.run_frame(&mut canvas).expect("frame");
    // 8px glyphs at size 14.
    assert_eq!(measured(&tree, button), Size::new(20, 18));

    let mut ui = UiState::new();
    let p = Point::new(5, 5);
    ui.handle_cursor_moved(&mut tree, p);
    assert!(ui.handle_mouse_input(&mut tree, MouseButton::Left, true, p));
    assert!(ui.handle_mouse_input(&mut tree, MouseButton::Left, false, p));
    assert!(tree.get(root).expect("root").flags().is_dirty_layout());

    assert_eq!(tree.run_frame(&mut canvas), Ok(DrawResult::Success));
    assert_eq!(measured(&tree, button), Size::new(44, 18));
    let texts: Vec<_> = canvas.draw_list.texts().map(|(t, _)| t.to_string()).collect();
    assert_eq!(texts, vec!["gone!".to_string()]);
}

#[test]
fn device_loss_rebuilds_resources() {
    let mut tree = WidgetTree::new();
    let root = tree.insert_root(Widget::Stack);
    tree.set_background_color(root, Color::GREEN);
    tree.insert(root, Widget::label("x")).expect("insert");

    let mut canvas = RecordingCanvas::new(Size::new(50, 50));
    tree.run_frame(&mut canvas).expect("frame");
    let created = canvas.resources_created;

    canvas.next_result = DrawResult::RecreateCanvas;
    assert_eq!(tree.run_frame(&mut canvas), Ok(DrawResult::RecreateCanvas));
    tree.run_frame(&mut canvas).expect("frame");
    assert_eq!(canvas.resources_created, created * 2);
}

use super::WidgetId;
use super::canvas::{Brush, TextPaint};
use super::color::Color;
use super::drawable::{Border, Drawable};
use super::flags::{Visibility, WidgetFlags};
use super::geometry::{Insets, Point, Rect, Size, Transform};
use super::length::{BoxConstraints, EdgeInsets, LayoutSize};

/// Main axis of a [`Widget::Linear`] container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

/// Cross-axis alignment for Linear containers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CrossAlign {
    #[default]
    Start,
    Center,
    End,
}

impl CrossAlign {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "start" => Some(Self::Start),
            "center" => Some(Self::Center),
            "end" => Some(Self::End),
            _ => None,
        }
    }

    /// Offset of a `child`-sized item inside `space`.
    pub(crate) fn offset(self, space: i32, child: i32) -> i32 {
        match self {
            Self::Start => 0,
            Self::Center => ((space - child) / 2).max(0),
            Self::End => (space - child).max(0),
        }
    }
}

/// Flat enum widget identity.
/// Closed set: containers are `Stack` and `Linear`, everything else is a leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    /// Plain box: background, border, size specs.
    Block,

    /// Text leaf that shrinks to its content.
    Label {
        text: String,
        text_size: f32, // pixels
        color: Color,
        max_lines: Option<u32>,
    },

    /// Overlay container: children share the content box, all at its origin.
    Stack,

    /// Children placed one after another along `orientation`, `gap` pixels apart.
    Linear {
        orientation: Orientation,
        gap: i32,
        align: CrossAlign,
    },
}

impl Widget {
    pub fn label(text: impl Into<String>) -> Self {
        Widget::Label {
            text: text.into(),
            text_size: 14.0,
            color: Color::BLACK,
            max_lines: None,
        }
    }

    pub fn row(gap: i32) -> Self {
        Widget::Linear {
            orientation: Orientation::Horizontal,
            gap,
            align: CrossAlign::Start,
        }
    }

    pub fn column(gap: i32) -> Self {
        Widget::Linear {
            orientation: Orientation::Vertical,
            gap,
            align: CrossAlign::Start,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Widget::Stack | Widget::Linear { .. })
    }

    /// Name used in logs and markup.
    pub fn kind(&self) -> &'static str {
        match self {
            Widget::Block => "block",
            Widget::Label { .. } => "label",
            Widget::Stack => "stack",
            Widget::Linear {
                orientation: Orientation::Horizontal,
                ..
            } => "row",
            Widget::Linear {
                orientation: Orientation::Vertical,
                ..
            } => "column",
        }
    }
}

/// Canvas resources owned by a widget, rebuilt lazily after `discard_canvas`.
#[derive(Debug, Default)]
pub(crate) struct PaintCache {
    pub text_brush: Option<Box<dyn Brush>>,
    pub text_paint: Option<Box<dyn TextPaint>>,
    /// Where the label text goes, relative to the widget origin.
    pub text_box: Rect,
}

impl PaintCache {
    pub fn discard(&mut self) {
        self.text_brush = None;
        self.text_paint = None;
    }
}

/// Arena entry pairing a widget with tree, layout and paint state.
#[derive(Debug)]
pub struct WidgetNode {
    pub(crate) widget: Widget,
    pub(crate) id: Option<String>,
    pub(crate) parent: Option<WidgetId>,
    pub(crate) children: Vec<WidgetId>,

    pub(crate) size: LayoutSize,
    pub(crate) constraints: BoxConstraints,
    pub(crate) margin: EdgeInsets,
    pub(crate) padding: EdgeInsets,
    pub(crate) border: Option<Border>,
    pub(crate) background: Option<Box<dyn Drawable>>,
    pub(crate) opacity: f32,
    pub(crate) visibility: Visibility,
    pub(crate) flags: WidgetFlags,

    /// Committed by the measure pass; `UNSET` until the first measure.
    pub(crate) measured: Size,
    /// Top-left relative to the parent's origin, set by layout.
    pub(crate) position: Point,
    /// Accumulated paint transform, set by layout.
    pub(crate) transform: Transform,
    /// Padding plus border insets resolved during the last measure.
    pub(crate) insets: Insets,
    /// Margins resolved during the last measure.
    pub(crate) margins: Insets,

    pub(crate) cache: PaintCache,
}

impl WidgetNode {
    pub(crate) fn new(widget: Widget, bounds_clip: bool) -> Self {
        let mut flags = WidgetFlags::DIRTY;
        flags.set(WidgetFlags::BOUNDS_CLIP, bounds_clip);
        Self {
            widget,
            id: None,
            parent: None,
            children: Vec::new(),
            size: LayoutSize::default(),
            constraints: BoxConstraints::default(),
            margin: EdgeInsets::default(),
            padding: EdgeInsets::default(),
            border: None,
            background: None,
            opacity: 1.0,
            visibility: Visibility::Visible,
            flags,
            measured: Size::UNSET,
            position: Point::default(),
            transform: Transform::IDENTITY,
            insets: Insets::ZERO,
            margins: Insets::ZERO,
            cache: PaintCache::default(),
        }
    }

    pub fn widget(&self) -> &Widget {
        &self.widget
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn parent(&self) -> Option<WidgetId> {
        self.parent
    }

    pub fn children(&self) -> &[WidgetId] {
        &self.children
    }

    pub fn size(&self) -> LayoutSize {
        self.size
    }

    pub fn constraints(&self) -> BoxConstraints {
        self.constraints
    }

    pub fn margin(&self) -> EdgeInsets {
        self.margin
    }

    pub fn padding(&self) -> EdgeInsets {
        self.padding
    }

    pub fn border(&self) -> Option<&Border> {
        self.border.as_ref()
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn flags(&self) -> WidgetFlags {
        self.flags
    }

    pub fn measured_size(&self) -> Size {
        self.measured
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Layout rect relative to the parent's origin.
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.measured.width.max(0),
            self.measured.height.max(0),
        )
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Rect in root coordinates.
    pub fn absolute_rect(&self) -> Rect {
        self.transform.map_rect(Rect::from_size(self.rect().size()))
    }

    /// Border insets, from the border alone (no resolution needed).
    pub(crate) fn border_insets(&self) -> Insets {
        self.border.as_ref().map_or(Insets::ZERO, Border::insets)
    }

    pub(crate) fn discard_canvas(&mut self) {
        self.cache.discard();
        if let Some(border) = &mut self.border {
            border.discard();
        }
        if let Some(bg) = &mut self.background {
            bg.discard();
        }
    }
}

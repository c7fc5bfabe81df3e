use super::canvas::{Brush, Canvas, CanvasError, DrawResult, Pen, TextMetrics, TextPaint};
use super::color::Color;
use super::geometry::{Line, Point, Rect, RoundRect, Size, Transform};

/// Glyph advance relative to the text size.
const GLYPH_WIDTH: f32 = 0.6;

/// Integer pixel advance of one glyph at `size`.
fn glyph_advance(size: f32) -> i32 {
    (size * GLYPH_WIDTH).round() as i32
}

/// One recorded drawing call, in world coordinates (transform applied).
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    FillRect {
        rect: Rect,
        color: Color,
    },
    FillRoundRect {
        shape: RoundRect,
        color: Color,
    },
    StrokeRect {
        rect: Rect,
        color: Color,
        width: f32,
    },
    StrokeRoundRect {
        shape: RoundRect,
        color: Color,
        width: f32,
    },
    Line {
        line: Line,
        color: Color,
        width: f32,
    },
    Text {
        text: String,
        origin: Point,
        color: Color,
        size: f32,
    },
    PushClip(RoundRect),
    PopClip,
}

/// Collects draw commands emitted by the widget tree.
/// Decouples widget logic from any GPU renderer.
#[derive(Debug, Default)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn texts(&self) -> impl Iterator<Item = (&str, Point)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, origin, .. } => Some((text.as_str(), *origin)),
            _ => None,
        })
    }

    pub fn fills(&self) -> impl Iterator<Item = (Rect, Color)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::FillRect { rect, color } => Some((*rect, *color)),
            DrawCommand::FillRoundRect { shape, color } => Some((shape.rect, *color)),
            _ => None,
        })
    }
}

#[derive(Debug)]
struct SolidBrush(Color);

impl Brush for SolidBrush {
    fn color(&self) -> Color {
        self.0
    }

    fn set_color(&mut self, color: Color) {
        self.0 = color;
    }
}

#[derive(Debug)]
struct SolidPen {
    color: Color,
    width: f32,
}

impl Pen for SolidPen {
    fn color(&self) -> Color {
        self.color
    }

    fn width(&self) -> f32 {
        self.width
    }
}

#[derive(Debug)]
struct PlainTextPaint {
    text: String,
    size: f32,
    max: Size,
}

impl TextPaint for PlainTextPaint {
    fn text(&self) -> &str {
        &self.text
    }

    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    fn text_size(&self) -> f32 {
        self.size
    }

    fn set_text_size(&mut self, size: f32) {
        self.size = size;
    }

    fn max_size(&self) -> Size {
        self.max
    }

    fn set_max_size(&mut self, size: Size) {
        self.max = size;
    }
}

/// Headless [`Canvas`] that records every call into a [`DrawList`].
///
/// Text uses fixed-advance metrics (`0.6 * size` rounded per glyph, `size`
/// per line) with greedy character wrapping at the paint's max width.
#[derive(Debug)]
pub struct RecordingCanvas {
    size: Size,
    density: f32,
    transform: Transform,
    clip_depth: usize,
    pub draw_list: DrawList,
    /// Number of brushes, pens and text paints created so far.
    pub resources_created: usize,
    /// When set, every resource factory fails.
    pub fail_resources: bool,
    /// Returned by the next `end_draw`, then reset to `Success`.
    pub next_result: DrawResult,
    /// When false, `push_clip` reports that no clip was applied.
    pub supports_clip: bool,
}

impl RecordingCanvas {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            density: 1.0,
            transform: Transform::IDENTITY,
            clip_depth: 0,
            draw_list: DrawList::new(),
            resources_created: 0,
            fail_resources: false,
            next_result: DrawResult::Success,
            supports_clip: true,
        }
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    /// Clips currently pushed and not yet popped.
    pub fn clip_depth(&self) -> usize {
        self.clip_depth
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.draw_list.commands
    }

    fn push(&mut self, cmd: DrawCommand) {
        self.draw_list.commands.push(cmd);
    }

    fn world_rect(&self, rect: Rect) -> Rect {
        self.transform.map_rect(rect)
    }

    fn world_shape(&self, shape: &RoundRect) -> RoundRect {
        RoundRect::new(self.world_rect(shape.rect), shape.radii)
    }

    fn world_point(&self, p: Point) -> Point {
        let (x, y) = self.transform.transform_point(p);
        Point::new(x.round() as i32, y.round() as i32)
    }

    fn resource<T>(&mut self, what: &'static str, make: impl FnOnce() -> T) -> Result<T, CanvasError> {
        if self.fail_resources {
            log::warn!("recording canvas refusing to create {what}");
            return Err(CanvasError::ResourceCreation(what));
        }
        self.resources_created += 1;
        Ok(make())
    }
}

/// Splits `text` into lines no wider than `max_chars` glyphs (hard breaks on '\n').
fn wrap_lines(text: &str, max_chars: Option<usize>) -> Vec<usize> {
    let mut lines = Vec::new();
    for line in text.split('\n') {
        let n = line.chars().count();
        match max_chars {
            Some(m) if m > 0 && n > m => {
                let mut rest = n;
                while rest > m {
                    lines.push(m);
                    rest -= m;
                }
                lines.push(rest);
            }
            _ => lines.push(n),
        }
    }
    lines
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> Size {
        self.size
    }

    fn density(&self) -> f32 {
        self.density
    }

    fn begin_draw(&mut self) {
        self.draw_list.clear();
        self.transform = Transform::IDENTITY;
        self.clip_depth = 0;
    }

    fn end_draw(&mut self) -> DrawResult {
        if self.clip_depth != 0 {
            log::warn!("end_draw with {} unbalanced clip(s)", self.clip_depth);
        }
        std::mem::replace(&mut self.next_result, DrawResult::Success)
    }

    fn resize(&mut self, size: Size) {
        self.size = size;
    }

    fn clear(&mut self, color: Color) {
        self.push(DrawCommand::Clear(color));
    }

    fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    fn create_color_brush(&mut self, color: Color) -> Result<Box<dyn Brush>, CanvasError> {
        self.resource("brush", || Box::new(SolidBrush(color)) as Box<dyn Brush>)
    }

    fn create_pen(&mut self, color: Color, width: f32) -> Result<Box<dyn Pen>, CanvasError> {
        self.resource("pen", || Box::new(SolidPen { color, width }) as Box<dyn Pen>)
    }

    fn create_text_paint(&mut self) -> Result<Box<dyn TextPaint>, CanvasError> {
        self.resource("text paint", || {
            Box::new(PlainTextPaint {
                text: String::new(),
                size: 14.0,
                max: Size::UNSET,
            }) as Box<dyn TextPaint>
        })
    }

    fn push_clip(&mut self, shape: &RoundRect) -> bool {
        if !self.supports_clip {
            return false;
        }
        self.clip_depth += 1;
        let shape = self.world_shape(shape);
        self.push(DrawCommand::PushClip(shape));
        true
    }

    fn pop_clip(&mut self) {
        if self.clip_depth == 0 {
            log::warn!("pop_clip without matching push_clip");
            return;
        }
        self.clip_depth -= 1;
        self.push(DrawCommand::PopClip);
    }

    fn fill_rect(&mut self, rect: Rect, brush: &dyn Brush) {
        let rect = self.world_rect(rect);
        self.push(DrawCommand::FillRect {
            rect,
            color: brush.color(),
        });
    }

    fn fill_round_rect(&mut self, shape: &RoundRect, brush: &dyn Brush) {
        let shape = self.world_shape(shape);
        self.push(DrawCommand::FillRoundRect {
            shape,
            color: brush.color(),
        });
    }

    fn draw_rect(&mut self, rect: Rect, pen: &dyn Pen) {
        let rect = self.world_rect(rect);
        self.push(DrawCommand::StrokeRect {
            rect,
            color: pen.color(),
            width: pen.width(),
        });
    }

    fn draw_round_rect(&mut self, shape: &RoundRect, pen: &dyn Pen) {
        let shape = self.world_shape(shape);
        self.push(DrawCommand::StrokeRoundRect {
            shape,
            color: pen.color(),
            width: pen.width(),
        });
    }

    fn draw_line(&mut self, line: Line, pen: &dyn Pen) {
        let line = Line::new(self.world_point(line.from), self.world_point(line.to));
        self.push(DrawCommand::Line {
            line,
            color: pen.color(),
            width: pen.width(),
        });
    }

    fn draw_text(&mut self, origin: Point, paint: &dyn TextPaint, brush: &dyn Brush) {
        let origin = self.world_point(origin);
        self.push(DrawCommand::Text {
            text: paint.text().to_string(),
            origin,
            color: brush.color(),
            size: paint.text_size(),
        });
    }

    fn measure_text(&mut self, paint: &dyn TextPaint) -> TextMetrics {
        let glyph = glyph_advance(paint.text_size());
        let line_height = paint.text_size().ceil() as i32;
        let max_w = paint.max_size().width;
        let max_chars = (max_w >= 0 && glyph > 0).then(|| (max_w / glyph) as usize);

        let unwrapped = wrap_lines(paint.text(), None);
        let wrapped = wrap_lines(paint.text(), max_chars);
        let widest = |lines: &[usize]| lines.iter().map(|&n| n as i32 * glyph).max().unwrap_or(0);

        TextMetrics {
            min_width: widest(&wrapped),
            width: widest(&unwrapped),
            height: wrapped.len() as i32 * line_height,
            line_count: wrapped.len() as i32,
        }
    }
}

//! Rendering backend interface consumed by measure and paint.
//!
//! Widgets only talk to the backend through [`Canvas`]. Resources it hands
//! out (brushes, pens, text paints) are cached per widget and dropped by
//! `discard_canvas` when the device is recreated.

use std::fmt;

use super::color::Color;
use super::geometry::{Line, Point, Rect, RoundRect, Size, Transform};

/// Backend failure while creating or using a device resource.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CanvasError {
    #[error("failed to create {0}")]
    ResourceCreation(&'static str),
    #[error("rendering device lost")]
    DeviceLost,
}

/// Outcome of [`Canvas::end_draw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawResult {
    Success,
    Error,
    /// Device resources are gone; every widget must drop its cached resources.
    RecreateCanvas,
}

/// Result of laying out a text paint's content.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextMetrics {
    /// Width of the widest line after wrapping.
    pub min_width: i32,
    /// Width of the content without wrapping.
    pub width: i32,
    pub height: i32,
    pub line_count: i32,
}

pub trait Brush: fmt::Debug {
    fn color(&self) -> Color;
    fn set_color(&mut self, color: Color);
}

pub trait Pen: fmt::Debug {
    fn color(&self) -> Color;
    fn width(&self) -> f32;
}

/// Text content plus formatting, measured and drawn by the canvas.
pub trait TextPaint: fmt::Debug {
    fn text(&self) -> &str;
    fn set_text(&mut self, text: &str);
    fn text_size(&self) -> f32;
    fn set_text_size(&mut self, size: f32);
    /// Layout box; negative components mean unbounded.
    fn max_size(&self) -> Size;
    fn set_max_size(&mut self, size: Size);

    fn set_max_width(&mut self, width: i32) {
        let h = self.max_size().height;
        self.set_max_size(Size::new(width, h));
    }
}

/// 2D drawing surface. Calls are thread-affine and must come from the
/// thread driving the widget tree.
pub trait Canvas {
    /// Surface size in pixels (the viewport for `vw`/`vh`).
    fn size(&self) -> Size;

    /// Pixels per density-independent pixel.
    fn density(&self) -> f32 {
        1.0
    }

    fn begin_draw(&mut self);
    fn end_draw(&mut self) -> DrawResult;
    fn resize(&mut self, size: Size);
    fn clear(&mut self, color: Color);
    fn set_transform(&mut self, transform: Transform);

    fn create_color_brush(&mut self, color: Color) -> Result<Box<dyn Brush>, CanvasError>;
    fn create_pen(&mut self, color: Color, width: f32) -> Result<Box<dyn Pen>, CanvasError>;
    fn create_text_paint(&mut self) -> Result<Box<dyn TextPaint>, CanvasError>;

    /// Returns false when no clip was applied; the matching `pop_clip` must
    /// then be skipped.
    fn push_clip(&mut self, shape: &RoundRect) -> bool;
    fn pop_clip(&mut self);

    fn fill_rect(&mut self, rect: Rect, brush: &dyn Brush);
    fn fill_round_rect(&mut self, shape: &RoundRect, brush: &dyn Brush);
    fn draw_rect(&mut self, rect: Rect, pen: &dyn Pen);
    fn draw_round_rect(&mut self, shape: &RoundRect, pen: &dyn Pen);
    fn draw_line(&mut self, line: Line, pen: &dyn Pen);
    fn draw_text(&mut self, origin: Point, paint: &dyn TextPaint, brush: &dyn Brush);

    fn measure_text(&mut self, paint: &dyn TextPaint) -> TextMetrics;
}

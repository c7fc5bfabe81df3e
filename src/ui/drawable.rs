//! Background drawables and borders. Both cache backend resources and drop
//! them on `discard`.

use std::fmt;

use super::canvas::{Brush, Canvas, CanvasError, Pen};
use super::color::Color;
use super::geometry::{CornerRadii, Insets, Line, Point, Rect, RoundRect};
use super::length::{Length, LengthContext};

/// Something painted into a widget's bounds (usually the background).
pub trait Drawable: fmt::Debug {
    fn draw(
        &mut self,
        canvas: &mut dyn Canvas,
        shape: &RoundRect,
        opacity: f32,
    ) -> Result<(), CanvasError>;

    /// Drops cached backend resources.
    fn discard(&mut self);

    /// True when the drawable fully covers its bounds.
    fn is_opaque(&self) -> bool {
        false
    }
}

/// Solid fill.
#[derive(Debug)]
pub struct ColorDrawable {
    color: Color,
    brush: Option<Box<dyn Brush>>,
}

impl ColorDrawable {
    pub fn new(color: Color) -> Self {
        Self { color, brush: None }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

impl Drawable for ColorDrawable {
    fn draw(
        &mut self,
        canvas: &mut dyn Canvas,
        shape: &RoundRect,
        opacity: f32,
    ) -> Result<(), CanvasError> {
        let color = self.color.with_alpha_f(self.color.alpha_f() * opacity);
        if color.a == 0 {
            return Ok(());
        }
        let brush = match &mut self.brush {
            Some(b) => b,
            slot => slot.insert(canvas.create_color_brush(color)?),
        };
        brush.set_color(color);
        if shape.is_rect() {
            canvas.fill_rect(shape.rect, brush.as_ref());
        } else {
            canvas.fill_round_rect(shape, brush.as_ref());
        }
        Ok(())
    }

    fn discard(&mut self) {
        self.brush = None;
    }

    fn is_opaque(&self) -> bool {
        self.color.a == 255
    }
}

// ---------------------------------------------------------------------------
// Border
// ---------------------------------------------------------------------------

/// One side of a border.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderStroke {
    pub width: i32,
    pub color: Color,
    /// Drawn over the content instead of taking space like padding.
    pub overlay: bool,
}

impl Default for BorderStroke {
    fn default() -> Self {
        Self {
            width: 0,
            color: Color::WHITE,
            overlay: false,
        }
    }
}

impl BorderStroke {
    pub fn new(width: i32, color: Color) -> Self {
        Self {
            width,
            color,
            overlay: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.width > 0 && self.color.a > 0
    }

    /// Space this stroke takes from the content box.
    fn inset(&self) -> i32 {
        if self.overlay { 0 } else { self.width.max(0) }
    }
}

/// Per-side strokes plus a uniform corner radius.
#[derive(Debug)]
pub struct Border {
    left: BorderStroke,
    top: BorderStroke,
    right: BorderStroke,
    bottom: BorderStroke,
    radius: Length,
    /// Pens indexed left, top, right, bottom.
    pens: [Option<Box<dyn Pen>>; 4],
}

impl Default for Border {
    fn default() -> Self {
        Self::uniform(BorderStroke::default())
    }
}

impl Border {
    /// Same stroke on all four sides.
    pub fn uniform(stroke: BorderStroke) -> Self {
        Self {
            left: stroke,
            top: stroke,
            right: stroke,
            bottom: stroke,
            radius: Length::ZERO,
            pens: Default::default(),
        }
    }

    pub fn set_stroke(&mut self, stroke: BorderStroke) -> &mut Self {
        self.left = stroke;
        self.top = stroke;
        self.right = stroke;
        self.bottom = stroke;
        self.discard();
        self
    }

    pub fn set_left(&mut self, stroke: BorderStroke) -> &mut Self {
        self.left = stroke;
        self.pens[0] = None;
        self
    }

    pub fn set_top(&mut self, stroke: BorderStroke) -> &mut Self {
        self.top = stroke;
        self.pens[1] = None;
        self
    }

    pub fn set_right(&mut self, stroke: BorderStroke) -> &mut Self {
        self.right = stroke;
        self.pens[2] = None;
        self
    }

    pub fn set_bottom(&mut self, stroke: BorderStroke) -> &mut Self {
        self.bottom = stroke;
        self.pens[3] = None;
        self
    }

    pub fn set_radius(&mut self, radius: Length) -> &mut Self {
        self.radius = radius;
        self
    }

    pub fn strokes(&self) -> [BorderStroke; 4] {
        [self.left, self.top, self.right, self.bottom]
    }

    pub fn radius(&self) -> Length {
        self.radius
    }

    /// Widths of the non-overlay strokes, added to the owner's padding.
    pub fn insets(&self) -> Insets {
        Insets::new(
            self.left.inset(),
            self.top.inset(),
            self.right.inset(),
            self.bottom.inset(),
        )
    }

    fn is_uniform(&self) -> bool {
        self.left == self.top && self.left == self.right && self.left == self.bottom
    }

    /// Shape of the border's outer edge within `bounds`. The radius resolves
    /// against the shorter side and is capped at half of it.
    pub fn make_rect(&self, bounds: Rect, ctx: &LengthContext) -> RoundRect {
        let short = bounds.width.min(bounds.height).max(0);
        let r = self.radius.try_resolve(ctx, short).unwrap_or(0).clamp(0, short / 2);
        RoundRect::new(bounds, CornerRadii::all(r as f32))
    }

    fn pen(
        &mut self,
        canvas: &mut dyn Canvas,
        side: usize,
        stroke: BorderStroke,
    ) -> Result<&dyn Pen, CanvasError> {
        let pen = match &mut self.pens[side] {
            Some(p) => p,
            slot => slot.insert(canvas.create_pen(stroke.color, stroke.width as f32)?),
        };
        Ok(&**pen)
    }

    /// Strokes the border inside `bounds`.
    pub fn draw(
        &mut self,
        canvas: &mut dyn Canvas,
        bounds: Rect,
        ctx: &LengthContext,
    ) -> Result<(), CanvasError> {
        if bounds.is_empty() {
            return Ok(());
        }

        if self.is_uniform() {
            let stroke = self.left;
            if !stroke.is_visible() {
                return Ok(());
            }
            // Center the stroke on a rect inset by half its width.
            let half = stroke.width / 2;
            let shape = self.make_rect(bounds - Insets::all(half), ctx);
            let pen = self.pen(canvas, 0, stroke)?;
            if shape.is_rect() {
                canvas.draw_rect(shape.rect, pen);
            } else {
                canvas.draw_round_rect(&shape, pen);
            }
            return Ok(());
        }

        let (l, t) = (bounds.x, bounds.y);
        let (r, b) = (bounds.right(), bounds.bottom());
        let x0 = l + self.left.width / 2;
        let y0 = t + self.top.width / 2;
        let x1 = r - self.right.width / 2;
        let y1 = b - self.bottom.width / 2;
        let sides = [
            (self.left, Line::new(Point::new(x0, t), Point::new(x0, b))),
            (self.top, Line::new(Point::new(l, y0), Point::new(r, y0))),
            (self.right, Line::new(Point::new(x1, t), Point::new(x1, b))),
            (self.bottom, Line::new(Point::new(l, y1), Point::new(r, y1))),
        ];
        for (side, (stroke, line)) in sides.into_iter().enumerate() {
            if stroke.is_visible() {
                let pen = self.pen(canvas, side, stroke)?;
                canvas.draw_line(line, pen);
            }
        }
        Ok(())
    }

    pub fn discard(&mut self) {
        self.pens = Default::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::geometry::Size;
    use crate::ui::recording::{DrawCommand, RecordingCanvas};

    #[test]
    fn overlay_strokes_take_no_space() {
        let mut border = Border::uniform(BorderStroke::new(2, Color::BLACK));
        border.set_left(BorderStroke {
            overlay: true,
            ..BorderStroke::new(5, Color::BLACK)
        });
        assert_eq!(border.insets(), Insets::new(0, 2, 2, 2));
    }

    #[test]
    fn radius_capped_at_half_short_side() {
        let mut border = Border::default();
        border.set_radius(Length::px(100));
        let shape = border.make_rect(Rect::new(0, 0, 40, 20), &LengthContext::default());
        assert_eq!(shape.radii, CornerRadii::all(10.0));
    }

    #[test]
    fn pens_are_cached_until_discard() {
        let mut canvas = RecordingCanvas::new(Size::new(50, 50));
        let ctx = LengthContext::default();
        let mut border = Border::uniform(BorderStroke::new(2, Color::RED));
        let bounds = Rect::new(0, 0, 20, 20);

        border.draw(&mut canvas, bounds, &ctx).expect("draw");
        border.draw(&mut canvas, bounds, &ctx).expect("draw");
        assert_eq!(canvas.resources_created, 1);

        border.discard();
        border.draw(&mut canvas, bounds, &ctx).expect("draw");
        assert_eq!(canvas.resources_created, 2);
        assert!(matches!(
            canvas.commands()[0],
            DrawCommand::StrokeRect { rect, .. } if rect == Rect::new(1, 1, 18, 18)
        ));
    }

    #[test]
    fn mixed_sides_draw_lines() {
        let mut canvas = RecordingCanvas::new(Size::new(50, 50));
        let mut border = Border::default();
        border.set_bottom(BorderStroke::new(1, Color::BLUE));
        border
            .draw(&mut canvas, Rect::new(0, 0, 10, 10), &LengthContext::default())
            .expect("draw");
        assert_eq!(canvas.commands().len(), 1);
        assert!(matches!(canvas.commands()[0], DrawCommand::Line { .. }));
    }

    #[test]
    fn color_drawable_applies_opacity() {
        let mut canvas = RecordingCanvas::new(Size::new(50, 50));
        let mut bg = ColorDrawable::new(Color::RED);
        bg.draw(&mut canvas, &RoundRect::from_rect(Rect::new(0, 0, 5, 5)), 0.5)
            .expect("draw");
        let (_, color) = canvas.draw_list.fills().next().expect("one fill");
        assert_eq!(color.a, 128);
    }
}

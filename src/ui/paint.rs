use super::canvas::Canvas;
use super::flags::{Visibility, WidgetFlags};
use super::geometry::{Rect, RoundRect};
use super::widget::Widget;
use super::{WidgetId, WidgetTree};
use crate::error::{LayoutError, Result};

impl WidgetTree {
    /// Paint `id` and its subtree.
    ///
    /// Order per widget: clip (non-root widgets with bounds clipping),
    /// background, own content, border, children, then the matching clip
    /// pop. Hidden, transparent and empty widgets are skipped silently.
    /// Canvas resource failures abort the paint and propagate.
    pub fn paint(&mut self, id: WidgetId, canvas: &mut dyn Canvas) -> Result<()> {
        let ctx = self.ctx;
        let node = self.arena.get(id).ok_or(LayoutError::UnknownWidget)?;
        if node.visibility != Visibility::Visible
            || node.flags.contains(WidgetFlags::WILL_NOT_DRAW)
            || node.opacity <= 0.0
            || node.measured.is_empty()
        {
            return Ok(());
        }

        canvas.set_transform(node.transform);
        let bounds = Rect::from_size(node.measured);
        let shape = node
            .border
            .as_ref()
            .map_or(RoundRect::from_rect(bounds), |b| b.make_rect(bounds, &ctx));
        let clipped =
            node.parent.is_some() && node.flags.is_bounds_clip() && canvas.push_clip(&shape);

        let result = self.paint_contents(id, canvas, &shape);

        if clipped {
            canvas.pop_clip();
        }
        if let Some(node) = self.arena.get_mut(id) {
            node.flags.remove(WidgetFlags::DIRTY_PAINT);
        }
        result
    }

    fn paint_contents(
        &mut self,
        id: WidgetId,
        canvas: &mut dyn Canvas,
        shape: &RoundRect,
    ) -> Result<()> {
        let ctx = self.ctx;
        let node = self.arena.get_mut(id).ok_or(LayoutError::UnknownWidget)?;
        let opacity = node.opacity;

        if let Some(background) = &mut node.background {
            background.draw(canvas, shape, opacity)?;
        }

        if let Widget::Label {
            text,
            text_size,
            color,
            ..
        } = &node.widget
        {
            let cache = &mut node.cache;
            if !text.is_empty() && !cache.text_box.is_empty() {
                let color = color.with_alpha_f(color.alpha_f() * opacity);
                let brush = match &mut cache.text_brush {
                    Some(b) => b,
                    slot => slot.insert(canvas.create_color_brush(color)?),
                };
                brush.set_color(color);
                let paint = match &mut cache.text_paint {
                    Some(p) => p,
                    slot => {
                        let mut p = canvas.create_text_paint()?;
                        p.set_text(text);
                        p.set_text_size(*text_size);
                        p.set_max_size(cache.text_box.size());
                        slot.insert(p)
                    }
                };
                canvas.draw_text(cache.text_box.origin(), paint.as_ref(), brush.as_ref());
            }
        }

        if let Some(border) = &mut node.border {
            border.draw(canvas, shape.rect, &ctx)?;
        }

        let children = node.children.clone();
        for child in children {
            self.paint(child, canvas)?;
        }
        Ok(())
    }

    /// Drop cached canvas resources for `id` and its subtree.
    pub fn discard_canvas(&mut self, id: WidgetId) {
        let mut stack = vec![id];
        while let Some(wid) = stack.pop() {
            if let Some(node) = self.arena.get_mut(wid) {
                node.discard_canvas();
                stack.extend(node.children.iter().copied());
            }
        }
    }

    /// Drop cached canvas resources for every live widget, attached or not.
    pub fn discard_all(&mut self) {
        for node in self.arena.values_mut() {
            node.discard_canvas();
        }
        log::debug!("discarded canvas resources for {} widgets", self.arena.len());
    }
}

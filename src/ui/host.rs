use super::canvas::{Canvas, DrawResult};
use super::geometry::{Rect, Size};
use super::{WidgetId, WidgetTree};
use crate::error::Result;

/// The window or surface that owns a widget tree.
///
/// Widgets reach the host only through these notifications; the host decides
/// when to actually run [`WidgetTree::run_frame`].
pub trait WidgetHost {
    /// The root needs a new measure/layout pass.
    fn request_layout(&self);
    /// `dirty` (root coordinates) needs repainting.
    fn schedule_frame(&self, dirty: Rect);
    /// `widget` was pressed and accepts keyboard focus.
    fn capture_focus(&self, _widget: WidgetId) {}
}

impl WidgetTree {
    /// Run one frame against `canvas`: re-measure and lay out the root if it
    /// is dirty, then clear and paint everything.
    ///
    /// A `RecreateCanvas` result drops every cached canvas resource so the
    /// next frame rebuilds them on the new device.
    pub fn run_frame(&mut self, canvas: &mut dyn Canvas) -> Result<DrawResult> {
        if let Some(root) = self.root
            && self.get(root).is_some_and(|n| n.flags().is_dirty_layout())
        {
            let available = canvas.size();
            self.measure(root, canvas, available, Size::UNSET)?;
            let measured = self.get(root).map_or(Size::ZERO, |n| n.measured_size());
            self.layout(root, Rect::from_size(measured));
            log::debug!("laid out root at {measured:?}");
        }

        canvas.begin_draw();
        canvas.clear(self.config.background);
        let painted = match self.root {
            Some(root) => self.paint(root, canvas),
            None => Ok(()),
        };
        let result = canvas.end_draw();

        if result == DrawResult::RecreateCanvas {
            log::info!("canvas lost its device, discarding widget resources");
            self.discard_all();
            if let Some(root) = self.root {
                self.request_layout(root);
            }
        }
        painted?;
        Ok(result)
    }

    /// Resize the surface and re-lay out the root.
    pub fn resize(&mut self, canvas: &mut dyn Canvas, size: Size) {
        canvas.resize(size.clamp_non_negative());
        if let Some(root) = self.root {
            self.request_layout(root);
        }
    }
}

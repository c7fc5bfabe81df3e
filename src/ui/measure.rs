//! Measure and layout passes.
//!
//! Measure computes every node's size top-down under the parent's available
//! and max sizes. Containers measure in two passes: a provisional pass
//! against their own tentative content box, then a re-measure of the
//! percent/stretch children once the final content box is known. Layout
//! only positions; it never re-measures.

use smallvec::SmallVec;

use super::canvas::Canvas;
use super::flags::{Visibility, WidgetFlags};
use super::geometry::{Insets, Point, Rect, Size, Transform};
use super::length::{Length, LengthContext, PixelBounds};
use super::widget::{Orientation, Widget};
use super::{WidgetId, WidgetTree};
use crate::error::{LayoutError, Result};

/// Pixel size of one axis of a widget's requested size. Stretch takes the
/// whole available extent; auto and infinity defer to content.
fn resolve_axis(len: Length, ctx: &LengthContext, available: i32) -> Option<i32> {
    if len.is_stretch() {
        Some(available.max(0))
    } else if len.is_concrete() {
        Some(len.resolve(ctx, available).max(0))
    } else {
        None
    }
}

/// Applies min first, then max when it is set (non-negative).
fn clamp_axis(value: i32, min: i32, max: i32) -> i32 {
    let v = value.max(min);
    if max >= 0 { v.min(max) } else { v }
}

/// Tighter of two optional limits, where a negative value means "none".
fn tighter(a: i32, b: i32) -> i32 {
    match (a >= 0, b >= 0) {
        (true, true) => a.min(b),
        (true, false) => a,
        (false, true) => b,
        (false, false) => -1,
    }
}

fn clamp_size(size: Size, bounds: &PixelBounds, max: Size) -> Size {
    Size::new(
        clamp_axis(size.width, bounds.min.width, max.width),
        clamp_axis(size.height, bounds.min.height, max.height),
    )
}

/// Requested sizes of a container plus its tentative content box.
struct ContentBox {
    own_width: Option<i32>,
    own_height: Option<i32>,
    pad: Insets,
    provisional: Size,
}

impl ContentBox {
    /// Own size minus insets where the own size is concrete and positive,
    /// the children-driven natural size otherwise.
    fn finalize(&self, natural: Size) -> Size {
        let pick = |own: Option<i32>, pad: i32, natural: i32| {
            own.map(|v| v - pad).filter(|v| *v > 0).unwrap_or(natural)
        };
        Size::new(
            pick(self.own_width, self.pad.horizontal(), natural.width),
            pick(self.own_height, self.pad.vertical(), natural.height),
        )
    }
}

fn main_axis(size: Size, o: Orientation) -> i32 {
    match o {
        Orientation::Horizontal => size.width,
        Orientation::Vertical => size.height,
    }
}

fn cross_axis(size: Size, o: Orientation) -> i32 {
    match o {
        Orientation::Horizontal => size.height,
        Orientation::Vertical => size.width,
    }
}

fn from_axes(main: i32, cross: i32, o: Orientation) -> Size {
    match o {
        Orientation::Horizontal => Size::new(main, cross),
        Orientation::Vertical => Size::new(cross, main),
    }
}

impl WidgetTree {
    /// Measure `id` and its subtree.
    ///
    /// `available` is the space offered by the parent; `max` is an upper
    /// bound where `-1` means unbounded. A zero `available` or `max`, or a
    /// collapsed widget, commits `{0, 0}` for the whole subtree without
    /// running any measure logic.
    pub fn measure(
        &mut self,
        id: WidgetId,
        canvas: &mut dyn Canvas,
        available: Size,
        max: Size,
    ) -> Result<()> {
        self.ctx = LengthContext::from_canvas(canvas);
        self.measure_node(id, canvas, available, max)
    }

    fn measure_node(
        &mut self,
        id: WidgetId,
        canvas: &mut dyn Canvas,
        available: Size,
        max: Size,
    ) -> Result<()> {
        let ctx = self.ctx;
        let node = self.arena.get_mut(id).ok_or(LayoutError::UnknownWidget)?;
        if node.visibility == Visibility::Collapsed || available.is_zero() || max.is_zero() {
            self.collapse(id);
            return Ok(());
        }

        let bounds = node.constraints.resolve(&ctx, available);
        let max = Size::new(
            tighter(max.width, bounds.max.width),
            tighter(max.height, bounds.max.height),
        );
        node.flags.insert(WidgetFlags::IN_MEASURE);
        log::trace!("measure {id:?} {} available {available:?} max {max:?}", node.widget.kind());

        let result = match node.widget {
            Widget::Block => self.measure_leaf(id, available, max, &bounds),
            Widget::Label { .. } => self.measure_label(id, canvas, available, max, &bounds),
            Widget::Stack => self.measure_stack(id, canvas, available, max, &bounds),
            Widget::Linear { orientation, gap, .. } => {
                self.measure_linear(id, canvas, available, max, &bounds, orientation, gap)
            }
        };

        if let Some(node) = self.arena.get_mut(id) {
            node.flags.remove(WidgetFlags::IN_MEASURE);
        }
        result
    }

    /// Commit `{0, 0}` on a whole subtree.
    fn collapse(&mut self, id: WidgetId) {
        let mut stack = vec![id];
        while let Some(wid) = stack.pop() {
            if let Some(node) = self.arena.get_mut(wid) {
                node.measured = Size::ZERO;
                node.cache.text_box = Rect::default();
                stack.extend(node.children.iter().copied());
            }
        }
    }

    /// Padding plus border insets, resolved against `reference`.
    fn resolve_insets(&mut self, id: WidgetId, reference: Size) -> Result<Insets> {
        let ctx = self.ctx;
        let node = self.arena.get_mut(id).ok_or(LayoutError::UnknownWidget)?;
        let pad = node.padding.resolve(&ctx, reference) + node.border_insets();
        node.insets = pad;
        Ok(pad)
    }

    /// Resolve and cache a child's margins against its parent's content size.
    fn resolve_margins(&mut self, child: WidgetId, content: Size) -> Insets {
        let ctx = self.ctx;
        match self.arena.get_mut(child) {
            Some(node) => {
                node.margins = node.margin.resolve(&ctx, content);
                node.margins
            }
            None => Insets::ZERO,
        }
    }

    fn is_collapsed(&self, id: WidgetId) -> bool {
        self.arena
            .get(id)
            .is_some_and(|n| n.visibility == Visibility::Collapsed)
    }

    fn is_relative(&self, id: WidgetId) -> bool {
        self.arena.get(id).is_some_and(|n| n.size.is_relative())
    }

    fn measured(&self, id: WidgetId) -> Size {
        self.arena.get(id).map_or(Size::ZERO, |n| n.measured)
    }

    /// With both axes requested, each resolves against `available` (stretch
    /// takes it whole) and is clamped. If either axis is auto the leaf takes
    /// `available` verbatim.
    fn measure_leaf(
        &mut self,
        id: WidgetId,
        available: Size,
        max: Size,
        bounds: &PixelBounds,
    ) -> Result<()> {
        let ctx = self.ctx;
        self.resolve_insets(id, available)?;
        let node = self.arena.get(id).ok_or(LayoutError::UnknownWidget)?;
        let requested = node.size;
        if requested.width.is_auto() || requested.height.is_auto() {
            return self.set_measured_size(id, available.clamp_non_negative());
        }
        let size = Size::new(
            resolve_axis(requested.width, &ctx, available.width).unwrap_or(available.width),
            resolve_axis(requested.height, &ctx, available.height).unwrap_or(available.height),
        );
        self.set_measured_size(id, clamp_size(size, bounds, max))
    }

    /// Shrink-to-content text measure. Width comes from the widest wrapped
    /// line; height is measured again after the width is constrained.
    fn measure_label(
        &mut self,
        id: WidgetId,
        canvas: &mut dyn Canvas,
        available: Size,
        max: Size,
        bounds: &PixelBounds,
    ) -> Result<()> {
        let ctx = self.ctx;
        let pad = self.resolve_insets(id, available)?;
        let node = self.arena.get_mut(id).ok_or(LayoutError::UnknownWidget)?;
        let Widget::Label {
            text,
            text_size,
            max_lines,
            ..
        } = &node.widget
        else {
            return Ok(());
        };

        if text.is_empty() {
            node.cache.text_box = Rect::default();
            return self.set_measured_size(id, Size::ZERO);
        }

        let mut width = resolve_axis(node.size.width, &ctx, available.width).unwrap_or(-1);
        let mut height = resolve_axis(node.size.height, &ctx, available.height).unwrap_or(-1);

        let mut paint = match node.cache.text_paint.take() {
            Some(p) => p,
            None => canvas.create_text_paint()?,
        };
        paint.set_text(text);
        paint.set_text_size(*text_size);
        let unbounded_or = |v: i32, pad: i32| if v < 0 { -1 } else { (v - pad).max(0) };
        paint.set_max_size(Size::new(
            unbounded_or(width, pad.horizontal()),
            unbounded_or(height, pad.vertical()),
        ));
        let mut metrics = canvas.measure_text(paint.as_ref());

        if width < 0 {
            width = metrics.min_width + pad.horizontal();
        }
        width = width.max(bounds.min.width);
        if available.width >= 0 {
            width = width.min(available.width);
        }
        if max.width >= 0 {
            width = width.min(max.width);
        }
        let text_width = metrics.min_width.min((width - pad.horizontal()).max(0));

        if height < 0 {
            paint.set_max_width(text_width);
            metrics = canvas.measure_text(paint.as_ref());
            let mut text_height = metrics.height;
            if let Some(lines) = max_lines
                && metrics.line_count > *lines as i32
                && metrics.line_count > 0
            {
                text_height = metrics.height / metrics.line_count * *lines as i32;
            }
            metrics.height = text_height;
            height = text_height + pad.vertical();
        }
        height = height.max(bounds.min.height);
        if available.height >= 0 {
            height = height.min(available.height);
        }
        if max.height >= 0 {
            height = height.min(max.height);
        }
        let text_height = metrics.height.min((height - pad.vertical()).max(0));

        let text_box = Rect::new(pad.left, pad.top, text_width, text_height);
        paint.set_max_size(text_box.size());
        node.cache.text_paint = Some(paint);
        node.cache.text_box = text_box;
        self.set_measured_size(id, Size::new(width, height))
    }

    /// Requested size against `available`, minus insets.
    fn content_box(&mut self, id: WidgetId, available: Size) -> Result<ContentBox> {
        let ctx = self.ctx;
        let pad = self.resolve_insets(id, available)?;
        let node = self.arena.get(id).ok_or(LayoutError::UnknownWidget)?;
        let own_width = resolve_axis(node.size.width, &ctx, available.width);
        let own_height = resolve_axis(node.size.height, &ctx, available.height);
        let provisional = Size::new(
            own_width.unwrap_or(available.width),
            own_height.unwrap_or(available.height),
        ) - pad;
        Ok(ContentBox {
            own_width,
            own_height,
            pad,
            provisional,
        })
    }

    /// Overlay container: every child shares the content box.
    fn measure_stack(
        &mut self,
        id: WidgetId,
        canvas: &mut dyn Canvas,
        available: Size,
        max: Size,
        bounds: &PixelBounds,
    ) -> Result<()> {
        let content = self.content_box(id, available)?;
        let children = self.arena.get(id).map(|n| n.children.clone()).unwrap_or_default();

        // Pass 1: provisional.
        let mut natural = Size::ZERO;
        let mut relative: SmallVec<[WidgetId; 4]> = SmallVec::new();
        for &child in &children {
            if self.is_collapsed(child) {
                self.collapse(child);
                continue;
            }
            let margins = self.resolve_margins(child, content.provisional);
            self.measure_node(child, canvas, content.provisional - margins, max)?;
            natural = (natural + margins).max(self.measured(child));
            if self.is_relative(child) {
                relative.push(child);
            }
        }

        let final_content = content.finalize(natural);

        // Pass 2: relatively sized children against the final content box.
        for child in relative {
            let margins = self.resolve_margins(child, final_content);
            self.measure_node(child, canvas, final_content - margins, max)?;
        }

        let size = clamp_size(final_content + content.pad, bounds, max);
        log::trace!("stack {id:?} natural {natural:?} measured {size:?}");
        self.set_measured_size(id, size)
    }

    /// Children one after another along the main axis. Each child gets the
    /// main-axis space its predecessors left over.
    #[allow(clippy::too_many_arguments)]
    fn measure_linear(
        &mut self,
        id: WidgetId,
        canvas: &mut dyn Canvas,
        available: Size,
        max: Size,
        bounds: &PixelBounds,
        orientation: Orientation,
        gap: i32,
    ) -> Result<()> {
        let content = self.content_box(id, available)?;
        let children = self.arena.get(id).map(|n| n.children.clone()).unwrap_or_default();
        let gap = gap.max(0);

        // Pass 1: provisional.
        let mut used_main = 0;
        let mut natural_cross = 0;
        let mut visible = 0;
        let mut relative: SmallVec<[WidgetId; 4]> = SmallVec::new();
        for &child in &children {
            if self.is_collapsed(child) {
                self.collapse(child);
                continue;
            }
            if visible > 0 {
                used_main += gap;
            }
            visible += 1;

            let margins = self.resolve_margins(child, content.provisional);
            let remaining = from_axes(
                (main_axis(content.provisional, orientation) - used_main).max(0),
                cross_axis(content.provisional, orientation),
                orientation,
            );
            self.measure_node(child, canvas, remaining - margins, max)?;
            let outer = self.measured(child) + margins;
            used_main += main_axis(outer, orientation);
            natural_cross = natural_cross.max(cross_axis(outer, orientation));
            if self.is_relative(child) {
                relative.push(child);
            }
        }

        let final_content = content.finalize(from_axes(used_main, natural_cross, orientation));

        // Pass 2: relatively sized children share the main-axis space the
        // other children leave, first come first served.
        if !relative.is_empty() {
            let mut reserved = gap * (visible - 1).max(0);
            for &child in &children {
                if self.is_collapsed(child) || relative.contains(&child) {
                    continue;
                }
                let outer = self.measured(child) + self.arena.get(child).map_or(Insets::ZERO, |n| n.margins);
                reserved += main_axis(outer, orientation);
            }
            let mut free = (main_axis(final_content, orientation) - reserved).max(0);
            for child in relative {
                let margins = self.resolve_margins(child, final_content);
                let space = from_axes(free, cross_axis(final_content, orientation), orientation);
                self.measure_node(child, canvas, space - margins, max)?;
                let outer = self.measured(child) + margins;
                free = (free - main_axis(outer, orientation)).max(0);
            }
        }

        let size = clamp_size(final_content + content.pad, bounds, max);
        log::trace!("linear {id:?} measured {size:?}");
        self.set_measured_size(id, size)
    }

    // ------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------

    /// Position `id` at `rect` (relative to its parent's origin) and lay out
    /// its children. Sizes come from the last measure.
    pub fn layout(&mut self, id: WidgetId, rect: Rect) {
        let parent_transform = self
            .parent(id)
            .and_then(|p| self.arena.get(p))
            .map_or(Transform::IDENTITY, |p| p.transform);
        let Some(node) = self.arena.get_mut(id) else {
            return;
        };
        node.flags.insert(WidgetFlags::IN_LAYOUT);
        node.position = rect.origin();
        node.transform = parent_transform.translate(rect.x as f32, rect.y as f32);

        self.on_layout(id, rect);

        if let Some(node) = self.arena.get_mut(id) {
            node.flags
                .remove(WidgetFlags::IN_LAYOUT | WidgetFlags::DIRTY_LAYOUT);
        }
    }

    fn on_layout(&mut self, id: WidgetId, rect: Rect) {
        let Some(node) = self.arena.get_mut(id) else {
            return;
        };
        let content = Rect::from_size(rect.size()) - node.insets;
        match node.widget {
            Widget::Block => {}
            Widget::Label { .. } => {
                let text_box = node.cache.text_box.size();
                if let Some(paint) = &mut node.cache.text_paint {
                    paint.set_max_size(text_box);
                }
            }
            Widget::Stack => {
                let children = node.children.clone();
                for child in children {
                    let Some(c) = self.arena.get(child) else {
                        continue;
                    };
                    if c.visibility == Visibility::Collapsed {
                        continue;
                    }
                    let at = Point::new(content.x + c.margins.left, content.y + c.margins.top);
                    let size = c.measured.clamp_non_negative();
                    self.layout(child, Rect::new(at.x, at.y, size.width, size.height));
                }
            }
            Widget::Linear {
                orientation,
                gap,
                align,
            } => {
                let children = node.children.clone();
                let gap = gap.max(0);
                let mut cursor = 0;
                for child in children {
                    let Some(c) = self.arena.get(child) else {
                        continue;
                    };
                    if c.visibility == Visibility::Collapsed {
                        continue;
                    }
                    let m = c.margins;
                    let size = c.measured.clamp_non_negative();
                    let (lead, trail, cross_lead, cross_total) = match orientation {
                        Orientation::Horizontal => (m.left, m.right, m.top, m.vertical()),
                        Orientation::Vertical => (m.top, m.bottom, m.left, m.horizontal()),
                    };
                    let cross_space = cross_axis(content.size(), orientation) - cross_total;
                    let cross = cross_lead + align.offset(cross_space, cross_axis(size, orientation));
                    let main = cursor + lead;
                    let at = match orientation {
                        Orientation::Horizontal => Point::new(content.x + main, content.y + cross),
                        Orientation::Vertical => Point::new(content.x + cross, content.y + main),
                    };
                    self.layout(child, Rect::new(at.x, at.y, size.width, size.height));
                    cursor = main + main_axis(size, orientation) + trail + gap;
                }
            }
        }
    }
}

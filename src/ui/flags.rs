bitflags::bitflags! {
    /// Per-widget state bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WidgetFlags: u32 {
        const DISABLED = 1 << 0;
        const CLICKABLE = 1 << 1;
        const DIRTY_PAINT = 1 << 2;
        const DIRTY_LAYOUT = 1 << 3;
        /// Clip children and own drawing to the border shape.
        const BOUNDS_CLIP = 1 << 4;
        const FOCUSABLE = 1 << 5;
        const HOVERED = 1 << 6;
        const PRESSED = 1 << 7;
        /// Set while not visible; paint skips the node.
        const WILL_NOT_DRAW = 1 << 8;
        const OPAQUE = 1 << 9;
        const IN_LAYOUT = 1 << 11;
        const IN_MEASURE = 1 << 12;

        const DIRTY = Self::DIRTY_PAINT.bits() | Self::DIRTY_LAYOUT.bits();
        const IN_PASS = Self::IN_LAYOUT.bits() | Self::IN_MEASURE.bits();
    }
}

impl WidgetFlags {
    pub fn is_enabled(&self) -> bool {
        !self.contains(Self::DISABLED)
    }

    pub fn is_clickable(&self) -> bool {
        self.contains(Self::CLICKABLE)
    }

    pub fn is_dirty_paint(&self) -> bool {
        self.contains(Self::DIRTY_PAINT)
    }

    pub fn is_dirty_layout(&self) -> bool {
        self.contains(Self::DIRTY_LAYOUT)
    }

    pub fn is_bounds_clip(&self) -> bool {
        self.contains(Self::BOUNDS_CLIP)
    }

    pub fn is_focusable(&self) -> bool {
        self.contains(Self::FOCUSABLE)
    }

    pub fn is_hovered(&self) -> bool {
        self.contains(Self::HOVERED)
    }

    pub fn is_pressed(&self) -> bool {
        self.contains(Self::PRESSED)
    }

    /// True while a measure or layout pass is running on the node.
    pub fn is_in_pass(&self) -> bool {
        self.intersects(Self::IN_PASS)
    }
}

/// Participation of a widget in layout and paint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    /// Laid out and painted.
    #[default]
    Visible,
    /// Laid out, not painted.
    Invisible,
    /// Neither laid out nor painted; contributes no size.
    Collapsed,
}

impl Visibility {
    /// Parses `visible`, `invisible` or `collapsed`.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "visible" => Some(Self::Visible),
            "invisible" => Some(Self::Invisible),
            "collapsed" => Some(Self::Collapsed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_pass_covers_both_passes() {
        assert!(WidgetFlags::IN_LAYOUT.is_in_pass());
        assert!(WidgetFlags::IN_MEASURE.is_in_pass());
        assert!(!WidgetFlags::DIRTY.is_in_pass());
    }

    #[test]
    fn default_is_enabled() {
        let f = WidgetFlags::default();
        assert!(f.is_enabled());
        assert!(!(f | WidgetFlags::DISABLED).is_enabled());
    }
}

use serde::Deserialize;

use crate::ui::{Color, Size};

/// Headless surface size used by the demo and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: i32,
    pub height: i32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

impl Viewport {
    pub fn size(&self) -> Size {
        Size::new(self.width.max(0), self.height.max(0))
    }
}

/// Toolkit-wide defaults, loaded from RON.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Pixels per dp.
    pub density: f32,
    pub viewport: Viewport,
    /// Default label text size in pixels.
    pub text_size: f32,
    pub text_color: Color,
    /// Whether new widgets clip to their border shape.
    pub bounds_clip: bool,
    /// Color the frame is cleared to before painting.
    pub background: Color,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            density: 1.0,
            viewport: Viewport::default(),
            text_size: 14.0,
            text_color: Color::BLACK,
            bounds_clip: true,
            background: Color::WHITE,
        }
    }
}

use thiserror::Error;

use crate::ui::CanvasError;

pub type Result<T> = std::result::Result<T, LayoutError>;

#[derive(PartialEq, Eq, Error, Debug, Clone)]
pub enum LayoutError {
    /// A measure pass tried to commit a negative size.
    #[error("invalid measured size {width}x{height}")]
    InvalidSize { width: i32, height: i32 },
    #[error("unknown widget")]
    UnknownWidget,
    #[error("widget is not a container")]
    NotAContainer,
    #[error("widget is not a child of this container")]
    NotAChild,
    #[error("index {index} out of bounds for {len} children")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("widget already has a parent")]
    AlreadyAttached,
    /// Attaching would make a widget its own ancestor.
    #[error("widget cannot contain itself")]
    Cycle,
    #[error("canvas: {0}")]
    Canvas(#[from] CanvasError),
}

/// Rectangle and extent math shared by all transfer operations
///
/// Rectangles follow the emulated GPU convention: the origin is the
/// bottom-left corner, so `top > bottom` for a non-empty rectangle.

/// Axis-aligned rectangle with bottom-left origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Rect {
    pub const fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Full rectangle covering a width x height extent
    pub const fn from_extent(width: u32, height: u32) -> Self {
        Self {
            left: 0,
            top: height,
            right: width,
            bottom: 0,
        }
    }

    pub const fn width(&self) -> u32 {
        self.right - self.left
    }

    pub const fn height(&self) -> u32 {
        self.top - self.bottom
    }

    /// Scale all coordinates by an integral resolution factor
    pub const fn scale(&self, factor: u32) -> Rect {
        Rect {
            left: self.left * factor,
            top: self.top * factor,
            right: self.right * factor,
            bottom: self.bottom * factor,
        }
    }

    pub const fn contains(&self, other: &Rect) -> bool {
        self.left <= other.left
            && other.right <= self.right
            && self.bottom <= other.bottom
            && other.top <= self.top
    }
}

/// 2D offset in texels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Offset {
    pub x: u32,
    pub y: u32,
}

/// 2D extent in texels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

#[cfg(test)]
#[path = "math_tests.rs"]
mod tests;

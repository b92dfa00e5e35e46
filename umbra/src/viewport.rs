//! Viewport rectangle.

/// Rectangle the normalized device coordinates are mapped to.
///
/// Viewports are compared as a whole rectangle.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Viewport {
  /// Lower-left corner, horizontal.
  pub x: i32,
  /// Lower-left corner, vertical.
  pub y: i32,
  /// Width in pixels.
  pub width: u32,
  /// Height in pixels.
  pub height: u32,
}

impl Viewport {
  /// Build a viewport from its corner and size.
  pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
    Viewport {
      x,
      y,
      width,
      height,
    }
  }

  /// Viewport covering a whole surface of the given size.
  pub fn whole(width: u32, height: u32) -> Self {
    Viewport::new(0, 0, width, height)
  }
}

impl From<[i32; 4]> for Viewport {
  fn from([x, y, w, h]: [i32; 4]) -> Self {
    Viewport::new(x, y, w.max(0) as u32, h.max(0) as u32)
  }
}

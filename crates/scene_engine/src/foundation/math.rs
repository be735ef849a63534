//! Math utilities and types
//!
//! Re-exports the fundamental nalgebra types and provides the rectangle
//! type used for atlas coordinates and text bounds.

pub use nalgebra::{Matrix3, Matrix4, Point2, Point3, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Corners of an axis-aligned rectangle, origin at the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RectCorner {
    /// (x, y)
    LeftTop,
    /// (x + width, y)
    RightTop,
    /// (x, y + height)
    LeftBottom,
    /// (x + width, y + height)
    RightBottom,
}

/// Axis-aligned rectangle with top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect<T> {
    /// Left edge
    pub x: T,
    /// Top edge
    pub y: T,
    /// Horizontal extent
    pub width: T,
    /// Vertical extent
    pub height: T,
}

impl<T> Rect<T> {
    /// Create a rectangle from origin and extents
    pub const fn new(x: T, y: T, width: T, height: T) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl Rect<f32> {
    /// The empty rectangle at the origin
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Position of the given corner
    pub fn corner(&self, corner: RectCorner) -> Vec2 {
        match corner {
            RectCorner::LeftTop => Vec2::new(self.x, self.y),
            RectCorner::RightTop => Vec2::new(self.x + self.width, self.y),
            RectCorner::LeftBottom => Vec2::new(self.x, self.y + self.height),
            RectCorner::RightBottom => Vec2::new(self.x + self.width, self.y + self.height),
        }
    }

    /// Whether the rectangle covers no area
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Grow the rectangle to contain `point`
    pub fn extend(&mut self, point: Vec2) {
        let right = (self.x + self.width).max(point.x);
        let bottom = (self.y + self.height).max(point.y);
        self.x = self.x.min(point.x);
        self.y = self.y.min(point.y);
        self.width = right - self.x;
        self.height = bottom - self.y;
    }

    /// Smallest rectangle containing all `points`
    ///
    /// Returns [`Rect::ZERO`] for an empty slice.
    pub fn bounding(points: &[Vec2]) -> Self {
        let Some(first) = points.first() else {
            return Self::ZERO;
        };
        let mut rect = Self::new(first.x, first.y, 0.0, 0.0);
        for point in &points[1..] {
            rect.extend(*point);
        }
        rect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_corners() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(rect.corner(RectCorner::LeftTop), Vec2::new(10.0, 20.0));
        assert_eq!(rect.corner(RectCorner::RightTop), Vec2::new(40.0, 20.0));
        assert_eq!(rect.corner(RectCorner::LeftBottom), Vec2::new(10.0, 60.0));
        assert_eq!(rect.corner(RectCorner::RightBottom), Vec2::new(40.0, 60.0));
    }

    #[test]
    fn test_rect_extend() {
        let mut rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        rect.extend(Vec2::new(-5.0, 20.0));
        assert_eq!(rect, Rect::new(-5.0, 0.0, 15.0, 20.0));
    }

    #[test]
    fn test_bounding_of_points() {
        let bounds = Rect::bounding(&[
            Vec2::new(1.0, 2.0),
            Vec2::new(-3.0, 5.0),
            Vec2::new(4.0, 0.0),
        ]);
        assert_eq!(bounds, Rect::new(-3.0, 0.0, 7.0, 5.0));
    }

    #[test]
    fn test_bounding_empty() {
        assert_eq!(Rect::bounding(&[]), Rect::ZERO);
        assert!(Rect::ZERO.is_empty());
    }
}

#![forbid(unsafe_code)]

/// CSS pixel space of the image an area map is drawn over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CssPx;

pub type PxPoint = euclid::Point2D<i64, CssPx>;
pub type PxSize = euclid::Size2D<i64, CssPx>;
pub type PxRect = euclid::Rect<i64, CssPx>;
pub type PxBox = euclid::Box2D<i64, CssPx>;

pub fn point(x: i64, y: i64) -> PxPoint {
    euclid::point2(x, y)
}

pub fn size(width: i64, height: i64) -> PxSize {
    euclid::size2(width, height)
}

/// Rectangle spanned by two opposite corners, in either order.
///
/// `Box2D::from_points` normalizes to min/max per axis, so the resulting origin is always the
/// top-left corner and the size is never negative.
pub fn rect_from_corners(a: PxPoint, b: PxPoint) -> PxRect {
    PxBox::from_points([a, b]).to_rect()
}

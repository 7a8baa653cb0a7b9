use scenephys_core::{ColliderHandle, Isometry2, Scalar, Vec2};
use scenephys_dynamics::BodyKind;
use scenephys_geom::ShapeGeom;

/// One shape crossed by a segment query.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SegmentHit {
    pub shape: ColliderHandle,
    pub user_data: u64,
    pub point: Vec2,
    pub normal: Vec2,
    /// Fraction along the segment, in `[0, 1]`.
    pub alpha: Scalar,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointHit {
    pub shape: ColliderHandle,
    pub user_data: u64,
    /// Closest point on the shape's surface.
    pub point: Vec2,
    /// Negative inside the shape.
    pub distance: Scalar,
}

/// Read-only view of a live shape, for drawing.
#[derive(Copy, Clone, Debug)]
pub struct ShapeView<'a> {
    pub shape: ColliderHandle,
    pub geom: &'a ShapeGeom,
    pub pose: Isometry2,
    pub kind: BodyKind,
    pub sensor: bool,
}

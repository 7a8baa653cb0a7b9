pub use glam::{Vec2, Mat2, Affine2};

pub type Scalar = f32;

#[inline] pub fn vec2(x: Scalar, y: Scalar) -> Vec2 { Vec2::new(x, y) }
#[inline] pub fn iso2(pos: Vec2, rot: Scalar) -> Isometry2 { Isometry2 { pos, rot } }

/// Rigid 2D pose: translation plus a counter-clockwise angle in radians.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Isometry2 { pub pos: Vec2, pub rot: Scalar }

impl Isometry2 {
    pub const IDENTITY: Self = Self { pos: Vec2::ZERO, rot: 0.0 };

    #[inline] pub fn new(pos: Vec2, rot: Scalar) -> Self { Self { pos, rot } }
    /// Unit (cos, sin) of the angle, usable with `Vec2::rotate`.
    #[inline] pub fn rotation(&self) -> Vec2 { Vec2::from_angle(self.rot) }
    #[inline] pub fn transform_point(&self, p: Vec2) -> Vec2 { self.pos + self.rotation().rotate(p) }
    #[inline] pub fn transform_vector(&self, v: Vec2) -> Vec2 { self.rotation().rotate(v) }
    #[inline] pub fn inverse_transform_point(&self, p: Vec2) -> Vec2 {
        Vec2::from_angle(-self.rot).rotate(p - self.pos)
    }
    #[inline] pub fn inverse_transform_vector(&self, v: Vec2) -> Vec2 { Vec2::from_angle(-self.rot).rotate(v) }
    #[inline] pub fn to_affine(&self) -> Affine2 { Affine2::from_angle_translation(self.rot, self.pos) }
}

impl Default for Isometry2 {
    fn default() -> Self { Self::IDENTITY }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Velocity { pub lin: Vec2, pub ang: Scalar }

/// Axis-aligned rectangle given by its lower-left origin and size.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rect { pub origin: Vec2, pub size: Vec2 }

impl Rect {
    #[inline] pub fn new(x: Scalar, y: Scalar, w: Scalar, h: Scalar) -> Self {
        Self { origin: vec2(x, y), size: vec2(w, h) }
    }
    #[inline] pub fn min(&self) -> Vec2 { self.origin.min(self.origin + self.size) }
    #[inline] pub fn max(&self) -> Vec2 { self.origin.max(self.origin + self.size) }
    #[inline] pub fn contains_point(&self, p: Vec2) -> bool {
        let (mn, mx) = (self.min(), self.max());
        p.x >= mn.x && p.x <= mx.x && p.y >= mn.y && p.y <= mx.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isometry_inverse_undoes_forward() {
        let xf = iso2(vec2(3.0, -1.0), 0.7);
        let p = vec2(1.5, 2.0);
        let back = xf.inverse_transform_point(xf.transform_point(p));
        assert!((back - p).length() < 1.0e-5);
    }

    #[test]
    fn isometry_matches_affine() {
        let xf = iso2(vec2(-2.0, 4.0), -1.2);
        let p = vec2(0.25, -3.0);
        let a = xf.to_affine().transform_point2(p);
        assert!((a - xf.transform_point(p)).length() < 1.0e-5);
    }

    #[test]
    fn rect_with_negative_size_normalizes() {
        let r = Rect::new(2.0, 2.0, -1.0, -1.0);
        assert_eq!(r.min(), vec2(1.0, 1.0));
        assert!(r.contains_point(vec2(1.5, 1.5)));
        assert!(!r.contains_point(vec2(2.5, 1.5)));
    }
}

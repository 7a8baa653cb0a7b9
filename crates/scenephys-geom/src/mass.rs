use core::f32::consts::PI;
use scenephys_core::Vec2;
use crate::shape::{signed_area, ShapeGeom};

/// Per-shape surface material.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material { pub density: f32, pub restitution: f32, pub friction: f32 }

impl Default for Material {
    fn default() -> Self { Self { density: 0.1, restitution: 0.5, friction: 0.5 } }
}

impl Material {
    pub const fn new(density: f32, restitution: f32, friction: f32) -> Self {
        Self { density, restitution, friction }
    }

    /// Pair mixing: geometric-mean friction, max restitution. Symmetric.
    #[inline] pub fn mix(a: &Material, b: &Material) -> (f32, f32) {
        ((a.friction * b.friction).abs().sqrt(), a.restitution.max(b.restitution))
    }
}

/// Mass and moment of inertia about the body origin.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MassProps {
    pub mass: f32,
    pub inv_mass: f32,
    pub moment: f32,
    pub inv_moment: f32,
}

#[inline] fn inv(x: f32) -> f32 { if x > 0.0 && x.is_finite() { 1.0 / x } else { 0.0 } }

impl MassProps {
    pub fn infinite() -> Self {
        Self { mass: f32::INFINITY, inv_mass: 0.0, moment: f32::INFINITY, inv_moment: 0.0 }
    }

    pub fn new(mass: f32, moment: f32) -> Self {
        Self { mass, inv_mass: inv(mass), moment, inv_moment: inv(moment) }
    }

    pub fn from_circle(radius: f32, center: Vec2, density: f32) -> Self {
        let m = density * PI * radius * radius;
        Self::new(m, m * (0.5 * radius * radius + center.length_squared()))
    }

    pub fn from_box(half: Vec2, center: Vec2, density: f32) -> Self {
        let dims = half * 2.0;
        let m = density * dims.x * dims.y;
        let i = (1.0 / 12.0) * m * (dims.x * dims.x + dims.y * dims.y);
        Self::new(m, i + m * center.length_squared())
    }

    /// Box body plus two half-disc caps, all about the segment midpoint, then shifted.
    pub fn from_capsule(a: Vec2, b: Vec2, radius: f32, density: f32) -> Self {
        let len = (b - a).length();
        let mid = (a + b) * 0.5;
        let m_box = density * len * 2.0 * radius;
        let i_box = (1.0 / 12.0) * m_box * (len * len + 4.0 * radius * radius);
        let m_cap = density * PI * radius * radius;
        let i_cap = m_cap * (0.5 * radius * radius + 0.25 * len * len);
        let m = m_box + m_cap;
        Self::new(m, i_box + i_cap + m * mid.length_squared())
    }

    pub fn from_polygon(verts: &[Vec2], density: f32) -> Self {
        let n = verts.len();
        if n < 3 { return Self::new(0.0, 0.0); }
        let mut num = 0.0;
        for i in 0..n {
            let (v0, v1) = (verts[i], verts[(i + 1) % n]);
            num += v0.perp_dot(v1) * (v0.dot(v0) + v0.dot(v1) + v1.dot(v1));
        }
        let m = density * signed_area(verts).abs();
        Self::new(m, (density * num / 12.0).abs())
    }

    pub fn from_geom(geom: &ShapeGeom, density: f32) -> Self {
        match geom {
            ShapeGeom::Circle { center, radius } => Self::from_circle(*radius, *center, density),
            ShapeGeom::Polygon { verts } => Self::from_polygon(verts, density),
            ShapeGeom::Segment { a, b, radius } => Self::from_capsule(*a, *b, *radius, density),
        }
    }

    /// Sum of two distributions about the same origin.
    #[inline] pub fn combine(self, other: MassProps) -> Self {
        Self::new(self.mass + other.mass, self.moment + other.moment)
    }
}

use scenephys_core::{Isometry2, Scalar, Vec2};
use crate::aabb::Aabb;

/// Collision geometry in body-local coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeGeom {
    Circle { center: Vec2, radius: Scalar },
    /// Convex, counter-clockwise winding.
    Polygon { verts: Vec<Vec2> },
    /// Rounded segment; a capsule when `radius > 0`.
    Segment { a: Vec2, b: Vec2, radius: Scalar },
}

/// First hit of a segment query. `alpha` is the fraction along the segment.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit { pub alpha: Scalar, pub point: Vec2, pub normal: Vec2 }

/// Closest surface point; `distance` is negative when the query point is inside.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointProjection { pub distance: Scalar, pub point: Vec2 }

impl ShapeGeom {
    #[inline] pub fn circle(radius: Scalar) -> Self { ShapeGeom::Circle { center: Vec2::ZERO, radius } }

    /// Axis-aligned box centred on the body origin.
    pub fn rect(w: Scalar, h: Scalar) -> Self {
        let (hx, hy) = (w * 0.5, h * 0.5);
        ShapeGeom::Polygon { verts: vec![
            Vec2::new(-hx, -hy), Vec2::new(hx, -hy), Vec2::new(hx, hy), Vec2::new(-hx, hy),
        ] }
    }

    /// Accepts either winding; stores counter-clockwise.
    pub fn polygon(mut verts: Vec<Vec2>) -> Self {
        if signed_area(&verts) < 0.0 { verts.reverse(); }
        ShapeGeom::Polygon { verts }
    }

    #[inline] pub fn segment(a: Vec2, b: Vec2, radius: Scalar) -> Self { ShapeGeom::Segment { a, b, radius } }

    pub fn area(&self) -> Scalar {
        match self {
            ShapeGeom::Circle { radius, .. } => core::f32::consts::PI * radius * radius,
            ShapeGeom::Polygon { verts } => signed_area(verts).abs(),
            ShapeGeom::Segment { a, b, radius } =>
                (*b - *a).length() * 2.0 * radius + core::f32::consts::PI * radius * radius,
        }
    }

    pub fn centroid(&self) -> Vec2 {
        match self {
            ShapeGeom::Circle { center, .. } => *center,
            ShapeGeom::Segment { a, b, .. } => (*a + *b) * 0.5,
            ShapeGeom::Polygon { verts } => {
                let area = signed_area(verts);
                if area.abs() < 1e-12 {
                    return verts.iter().copied().sum::<Vec2>() / verts.len().max(1) as Scalar;
                }
                let mut c = Vec2::ZERO;
                for (i, v0) in verts.iter().enumerate() {
                    let v1 = verts[(i + 1) % verts.len()];
                    c += (*v0 + v1) * v0.perp_dot(v1);
                }
                c / (6.0 * area)
            }
        }
    }

    /// Non-uniform scale about the body origin. Radii follow the x factor.
    pub fn scaled(&self, s: Vec2) -> Self {
        match self {
            ShapeGeom::Circle { center, radius } =>
                ShapeGeom::Circle { center: *center * s, radius: radius * s.x.abs() },
            ShapeGeom::Segment { a, b, radius } =>
                ShapeGeom::Segment { a: *a * s, b: *b * s, radius: radius * s.x.abs() },
            ShapeGeom::Polygon { verts } => {
                let mut v: Vec<Vec2> = verts.iter().map(|p| *p * s).collect();
                if s.x * s.y < 0.0 { v.reverse(); }
                ShapeGeom::Polygon { verts: v }
            }
        }
    }

    /// Same geometry expressed in world coordinates.
    pub fn to_world(&self, xf: &Isometry2) -> Self {
        match self {
            ShapeGeom::Circle { center, radius } =>
                ShapeGeom::Circle { center: xf.transform_point(*center), radius: *radius },
            ShapeGeom::Segment { a, b, radius } => ShapeGeom::Segment {
                a: xf.transform_point(*a), b: xf.transform_point(*b), radius: *radius,
            },
            ShapeGeom::Polygon { verts } =>
                ShapeGeom::Polygon { verts: verts.iter().map(|p| xf.transform_point(*p)).collect() },
        }
    }

    pub fn world_aabb(&self, xf: &Isometry2) -> Aabb {
        match self.to_world(xf) {
            ShapeGeom::Circle { center, radius } => Aabb::from_center_half_extents(center, Vec2::splat(radius)),
            ShapeGeom::Segment { a, b, radius } => {
                let mut bb = Aabb::new(a.min(b), a.max(b));
                bb.expand_by(radius);
                bb
            }
            ShapeGeom::Polygon { verts } => Aabb::from_points(&verts),
        }
    }

    pub fn project_point(&self, xf: &Isometry2, p: Vec2) -> PointProjection {
        match self.to_world(xf) {
            ShapeGeom::Circle { center, radius } => project_rounded(center, radius, p),
            ShapeGeom::Segment { a, b, radius } => {
                let (q, _) = closest_on_segment(a, b, p);
                project_rounded(q, radius, p)
            }
            ShapeGeom::Polygon { verts } => project_polygon(&verts, p),
        }
    }

    #[inline] pub fn contains_point(&self, xf: &Isometry2, p: Vec2) -> bool {
        self.project_point(xf, p).distance <= 0.0
    }

    /// Segment `a -> b` against the shape. A segment that starts inside does not hit.
    pub fn ray_cast(&self, xf: &Isometry2, a: Vec2, b: Vec2) -> Option<RayHit> {
        match self.to_world(xf) {
            ShapeGeom::Circle { center, radius } => ray_vs_circle(a, b, center, radius),
            ShapeGeom::Polygon { verts } => ray_vs_polygon(a, b, &verts),
            ShapeGeom::Segment { a: p, b: q, radius } => {
                if radius <= 1e-6 { return ray_vs_thin_segment(a, b, p, q); }
                let n = (q - p).perp().normalize_or_zero() * radius;
                [
                    ray_vs_circle(a, b, p, radius),
                    ray_vs_circle(a, b, q, radius),
                    ray_vs_thin_segment(a, b, p + n, q + n),
                    ray_vs_thin_segment(a, b, p - n, q - n),
                ]
                .into_iter()
                .flatten()
                .min_by(|x, y| x.alpha.total_cmp(&y.alpha))
            }
        }
    }
}

#[inline] pub fn aabb_of(shape: &ShapeGeom, xf: &Isometry2) -> Aabb { shape.world_aabb(xf) }

/// Closest point on `[a, b]` to `p`, with its parameter in `[0, 1]`.
pub fn closest_on_segment(a: Vec2, b: Vec2, p: Vec2) -> (Vec2, Scalar) {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 < 1e-12 { return (a, 0.0); }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    (a + ab * t, t)
}

pub(crate) fn signed_area(verts: &[Vec2]) -> Scalar {
    let n = verts.len();
    let mut s = 0.0;
    for i in 0..n { s += verts[i].perp_dot(verts[(i + 1) % n]); }
    s * 0.5
}

fn project_rounded(core: Vec2, radius: Scalar, p: Vec2) -> PointProjection {
    let d = p - core;
    let len = d.length();
    let dir = if len > 1e-9 { d / len } else { Vec2::X };
    PointProjection { distance: len - radius, point: core + dir * radius }
}

fn project_polygon(verts: &[Vec2], p: Vec2) -> PointProjection {
    let n = verts.len();
    let mut inside = n >= 3;
    let mut best_sep = f32::NEG_INFINITY;
    let mut best_normal = Vec2::ZERO;
    let mut nearest = (f32::INFINITY, p);
    for i in 0..n {
        let (v0, v1) = (verts[i], verts[(i + 1) % n]);
        let normal = (v1 - v0).perp().normalize_or_zero() * -1.0;
        let sep = normal.dot(p - v0);
        if sep > 0.0 { inside = false; }
        if sep > best_sep { best_sep = sep; best_normal = normal; }
        let (q, _) = closest_on_segment(v0, v1, p);
        let d = (p - q).length();
        if d < nearest.0 { nearest = (d, q); }
    }
    if inside {
        PointProjection { distance: best_sep, point: p - best_normal * best_sep }
    } else {
        PointProjection { distance: nearest.0, point: nearest.1 }
    }
}

fn ray_vs_circle(a: Vec2, b: Vec2, c: Vec2, r: Scalar) -> Option<RayHit> {
    let d = b - a;
    let f = a - c;
    let qa = d.dot(d);
    if qa < 1e-12 { return None; }
    let qb = 2.0 * f.dot(d);
    let qc = f.dot(f) - r * r;
    let disc = qb * qb - 4.0 * qa * qc;
    if disc < 0.0 { return None; }
    let t = (-qb - disc.sqrt()) / (2.0 * qa);
    if !(0.0..=1.0).contains(&t) { return None; }
    let point = a + d * t;
    Some(RayHit { alpha: t, point, normal: (point - c).normalize_or_zero() })
}

fn ray_vs_thin_segment(a: Vec2, b: Vec2, p: Vec2, q: Vec2) -> Option<RayHit> {
    let d = b - a;
    let e = q - p;
    let denom = d.perp_dot(e);
    if denom.abs() < 1e-12 { return None; }
    let ap = p - a;
    let t = ap.perp_dot(e) / denom;
    let u = ap.perp_dot(d) / denom;
    if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&u) { return None; }
    let mut normal = e.perp().normalize_or_zero();
    if normal.dot(d) > 0.0 { normal = -normal; }
    Some(RayHit { alpha: t, point: a + d * t, normal })
}

// Cyrus-Beck clip against the polygon's half-planes.
fn ray_vs_polygon(a: Vec2, b: Vec2, verts: &[Vec2]) -> Option<RayHit> {
    let d = b - a;
    let n = verts.len();
    let (mut t_enter, mut t_exit) = (0.0_f32, 1.0_f32);
    let mut enter_normal = None;
    for i in 0..n {
        let (v0, v1) = (verts[i], verts[(i + 1) % n]);
        let normal = (v1 - v0).perp().normalize_or_zero() * -1.0;
        let num = normal.dot(v0 - a);
        let den = normal.dot(d);
        if den.abs() < 1e-12 {
            if num < 0.0 { return None; }
            continue;
        }
        let t = num / den;
        if den < 0.0 {
            if t >= t_enter { t_enter = t; enter_normal = Some(normal); }
        } else {
            t_exit = t_exit.min(t);
        }
        if t_enter > t_exit { return None; }
    }
    let normal = enter_normal?;
    Some(RayHit { alpha: t_enter, point: a + d * t_enter, normal })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use scenephys_core::{iso2, vec2};

    #[test]
    fn polygon_is_stored_ccw() {
        let cw = vec![vec2(0.0, 0.0), vec2(0.0, 1.0), vec2(1.0, 1.0), vec2(1.0, 0.0)];
        let ShapeGeom::Polygon { verts } = ShapeGeom::polygon(cw) else { unreachable!() };
        assert!(signed_area(&verts) > 0.0);
    }

    #[test]
    fn rect_area_and_centroid() {
        let r = ShapeGeom::rect(4.0, 2.0);
        assert_relative_eq!(r.area(), 8.0);
        assert_relative_eq!(r.centroid().length(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn circle_projection_signs() {
        let c = ShapeGeom::circle(2.0);
        let xf = iso2(vec2(10.0, 0.0), 0.0);
        let outside = c.project_point(&xf, vec2(15.0, 0.0));
        assert_relative_eq!(outside.distance, 3.0, epsilon = 1e-5);
        assert_relative_eq!(outside.point.x, 12.0, epsilon = 1e-5);
        assert!(c.contains_point(&xf, vec2(11.0, 0.5)));
    }

    #[test]
    fn polygon_projection_inside_is_negative() {
        let r = ShapeGeom::rect(2.0, 2.0);
        let p = r.project_point(&Isometry2::IDENTITY, vec2(0.5, 0.0));
        assert_relative_eq!(p.distance, -0.5, epsilon = 1e-5);
        assert_relative_eq!(p.point.x, 1.0, epsilon = 1e-5);
        let q = r.project_point(&Isometry2::IDENTITY, vec2(3.0, 0.0));
        assert_relative_eq!(q.distance, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn rays_hit_front_faces() {
        let xf = iso2(vec2(5.0, 0.0), 0.0);
        let hit = ShapeGeom::rect(2.0, 2.0).ray_cast(&xf, vec2(0.0, 0.0), vec2(10.0, 0.0)).unwrap();
        assert_relative_eq!(hit.alpha, 0.4, epsilon = 1e-5);
        assert_relative_eq!(hit.normal.x, -1.0, epsilon = 1e-5);

        let hit = ShapeGeom::circle(1.0).ray_cast(&xf, vec2(0.0, 0.0), vec2(10.0, 0.0)).unwrap();
        assert_relative_eq!(hit.point.x, 4.0, epsilon = 1e-5);

        let cap = ShapeGeom::segment(vec2(0.0, -3.0), vec2(0.0, 3.0), 0.5);
        let hit = cap.ray_cast(&xf, vec2(0.0, 1.0), vec2(10.0, 1.0)).unwrap();
        assert_relative_eq!(hit.point.x, 4.5, epsilon = 1e-5);
    }

    #[test]
    fn rays_miss_or_start_inside() {
        let r = ShapeGeom::rect(2.0, 2.0);
        assert!(r.ray_cast(&Isometry2::IDENTITY, vec2(-5.0, 3.0), vec2(5.0, 3.0)).is_none());
        assert!(r.ray_cast(&Isometry2::IDENTITY, vec2(0.0, 0.0), vec2(5.0, 0.0)).is_none());
    }

    #[test]
    fn mirrored_scale_keeps_winding() {
        let s = ShapeGeom::rect(2.0, 1.0).scaled(vec2(-2.0, 1.0));
        let ShapeGeom::Polygon { verts } = s else { unreachable!() };
        assert!(signed_area(&verts) > 0.0);
        assert_relative_eq!(signed_area(&verts), 4.0, epsilon = 1e-5);
    }
}

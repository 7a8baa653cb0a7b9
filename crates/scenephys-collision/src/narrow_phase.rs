use scenephys_core::{Isometry2, Vec2};
use scenephys_geom::{closest_on_segment, ShapeGeom};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ContactPoint { pub point: Vec2, pub depth: f32 }

/// Touching pair. `normal` points from shape A towards shape B.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Manifold { pub normal: Vec2, pub points: Vec<ContactPoint> }

impl Manifold {
    #[inline] pub fn flipped(mut self) -> Self { self.normal = -self.normal; self }
    #[inline] pub fn max_depth(&self) -> f32 {
        self.points.iter().map(|p| p.depth).fold(0.0, f32::max)
    }
}

// World-space collision core: rounded shapes reduce to a point/segment plus radius.
enum Core { Rounded { a: Vec2, b: Vec2, r: f32 }, Poly(Vec<Vec2>) }

fn core_of(geom: &ShapeGeom, xf: &Isometry2) -> Core {
    match geom.to_world(xf) {
        ShapeGeom::Circle { center, radius } => Core::Rounded { a: center, b: center, r: radius },
        ShapeGeom::Segment { a, b, radius } => Core::Rounded { a, b, r: radius },
        ShapeGeom::Polygon { verts } => Core::Poly(verts),
    }
}

/// Narrow phase for any pair of shapes. `None` when separated.
pub fn collide(a: &ShapeGeom, xa: &Isometry2, b: &ShapeGeom, xb: &Isometry2) -> Option<Manifold> {
    match (core_of(a, xa), core_of(b, xb)) {
        (Core::Rounded { a: a0, b: a1, r: ra }, Core::Rounded { a: b0, b: b1, r: rb }) =>
            rounded_rounded(a0, a1, ra, b0, b1, rb),
        (Core::Rounded { a: a0, b: a1, r }, Core::Poly(v)) => rounded_poly(a0, a1, r, &v),
        (Core::Poly(v), Core::Rounded { a: b0, b: b1, r }) =>
            rounded_poly(b0, b1, r, &v).map(Manifold::flipped),
        (Core::Poly(va), Core::Poly(vb)) => poly_poly(&va, &vb),
    }
}

#[inline] fn outward_normal(v0: Vec2, v1: Vec2) -> Vec2 { -(v1 - v0).perp().normalize_or_zero() }

/// Closest points `(on_a, on_b)` between two segments; degenerate segments are points.
fn closest_between(a0: Vec2, a1: Vec2, b0: Vec2, b1: Vec2) -> (Vec2, Vec2) {
    let (da, db) = (a1 - a0, b1 - b0);
    let denom = da.perp_dot(db);
    if denom.abs() > 1e-12 {
        let t = (b0 - a0).perp_dot(db) / denom;
        let u = (b0 - a0).perp_dot(da) / denom;
        if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
            let x = a0 + da * t;
            return (x, x);
        }
    }
    let candidates = [
        (a0, closest_on_segment(b0, b1, a0).0),
        (a1, closest_on_segment(b0, b1, a1).0),
        (closest_on_segment(a0, a1, b0).0, b0),
        (closest_on_segment(a0, a1, b1).0, b1),
    ];
    candidates
        .into_iter()
        .min_by(|x, y| (x.1 - x.0).length_squared().total_cmp(&(y.1 - y.0).length_squared()))
        .unwrap_or((a0, b0))
}

fn rounded_rounded(a0: Vec2, a1: Vec2, ra: f32, b0: Vec2, b1: Vec2, rb: f32) -> Option<Manifold> {
    let (p, q) = closest_between(a0, a1, b0, b1);
    let d = q - p;
    let dist = d.length();
    let r = ra + rb;
    if dist >= r { return None; }
    let normal = if dist > 1e-6 {
        d / dist
    } else {
        let n = (a1 - a0).perp().normalize_or_zero();
        if n == Vec2::ZERO { Vec2::Y } else { n }
    };
    let point = (p + normal * ra + q - normal * rb) * 0.5;
    Some(Manifold { normal, points: vec![ContactPoint { point, depth: r - dist }] })
}

fn inside_poly(verts: &[Vec2], p: Vec2) -> bool {
    let n = verts.len();
    n >= 3 && (0..n).all(|i| outward_normal(verts[i], verts[(i + 1) % n]).dot(p - verts[i]) <= 0.0)
}

fn nearest_on_poly(verts: &[Vec2], p: Vec2) -> Vec2 {
    let n = verts.len();
    (0..n)
        .map(|i| closest_on_segment(verts[i], verts[(i + 1) % n], p).0)
        .min_by(|x, y| (*x - p).length_squared().total_cmp(&(*y - p).length_squared()))
        .unwrap_or(p)
}

// Normal runs from the rounded shape to the polygon.
fn rounded_poly(a0: Vec2, a1: Vec2, r: f32, verts: &[Vec2]) -> Option<Manifold> {
    let n = verts.len();
    if n < 3 { return None; }
    let ends: &[Vec2] = if (a1 - a0).length_squared() > 1e-12 { &[a0, a1] } else { &[a0] };

    let mut best = (f32::NEG_INFINITY, 0usize);
    for i in 0..n {
        let nf = outward_normal(verts[i], verts[(i + 1) % n]);
        let sep = ends.iter().map(|e| nf.dot(*e - verts[i])).fold(f32::INFINITY, f32::min);
        if sep > best.0 { best = (sep, i); }
    }
    if best.0 > r { return None; }

    let mut closest = (f32::INFINITY, a0, a0);
    for i in 0..n {
        let (p, q) = closest_between(a0, a1, verts[i], verts[(i + 1) % n]);
        let d = (q - p).length();
        if d < closest.0 { closest = (d, p, q); }
    }
    let (dist, p, q) = closest;
    let penetrating = dist <= 1e-6 || ends.iter().any(|e| inside_poly(verts, *e));

    if !penetrating {
        if dist >= r { return None; }
        let normal = (q - p) / dist;
        let mut points = vec![ContactPoint { point: (p + normal * r + q) * 0.5, depth: r - dist }];
        for e in ends {
            if (*e - p).length() < 1e-4 { continue; }
            let proj = nearest_on_poly(verts, *e);
            let d = (proj - *e).length();
            if d > 1e-6 && d < r && ((proj - *e) / d).dot(normal) > 0.95 {
                points.push(ContactPoint { point: (*e + normal * r + proj) * 0.5, depth: r - d });
            }
        }
        return Some(Manifold { normal, points });
    }

    let (sep, i) = best;
    let nf = outward_normal(verts[i], verts[(i + 1) % n]);
    let mut points: Vec<ContactPoint> = ends
        .iter()
        .filter_map(|e| {
            let s = nf.dot(*e - verts[i]);
            (s < r).then(|| ContactPoint { point: *e - nf * (r + s) * 0.5, depth: r - s })
        })
        .collect();
    if points.is_empty() {
        points.push(ContactPoint { point: p, depth: r - sep });
    }
    Some(Manifold { normal: -nf, points })
}

/// Largest face separation of `b` along the faces of `a`, and that face.
fn max_separation(a: &[Vec2], b: &[Vec2]) -> (f32, usize) {
    let n = a.len();
    let mut best = (f32::NEG_INFINITY, 0usize);
    for i in 0..n {
        let nf = outward_normal(a[i], a[(i + 1) % n]);
        let s = b.iter().map(|v| nf.dot(*v - a[i])).fold(f32::INFINITY, f32::min);
        if s > best.0 { best = (s, i); }
    }
    best
}

// Keeps the part of `seg` with `n . x <= off`.
fn clip(seg: [Vec2; 2], n: Vec2, off: f32) -> Option<[Vec2; 2]> {
    let d0 = n.dot(seg[0]) - off;
    let d1 = n.dot(seg[1]) - off;
    match (d0 <= 0.0, d1 <= 0.0) {
        (true, true) => Some(seg),
        (false, false) => None,
        _ => {
            let x = seg[0] + (seg[1] - seg[0]) * (d0 / (d0 - d1));
            if d0 <= 0.0 { Some([seg[0], x]) } else { Some([x, seg[1]]) }
        }
    }
}

fn clip_contacts(reference: &[Vec2], face: usize, incident: &[Vec2]) -> Vec<ContactPoint> {
    let (rn, m) = (reference.len(), incident.len());
    let (v1, v2) = (reference[face], reference[(face + 1) % rn]);
    let nf = outward_normal(v1, v2);
    let t = (v2 - v1).normalize_or_zero();

    let k = (0..m)
        .min_by(|x, y| {
            let nx = outward_normal(incident[*x], incident[(*x + 1) % m]).dot(nf);
            let ny = outward_normal(incident[*y], incident[(*y + 1) % m]).dot(nf);
            nx.total_cmp(&ny)
        })
        .unwrap_or(0);
    let seg = [incident[k], incident[(k + 1) % m]];

    let Some(seg) = clip(seg, -t, -t.dot(v1)) else { return Vec::new(); };
    let Some(seg) = clip(seg, t, t.dot(v2)) else { return Vec::new(); };
    seg.iter()
        .filter_map(|x| {
            let s = nf.dot(*x - v1);
            (s <= 0.0).then(|| ContactPoint { point: *x - nf * s * 0.5, depth: -s })
        })
        .collect()
}

fn poly_poly(va: &[Vec2], vb: &[Vec2]) -> Option<Manifold> {
    if va.len() < 3 || vb.len() < 3 { return None; }
    let (sa, ia) = max_separation(va, vb);
    if sa > 0.0 { return None; }
    let (sb, ib) = max_separation(vb, va);
    if sb > 0.0 { return None; }

    // A's face wins ties so the reference face stays stable frame to frame.
    let (normal, mut points) = if sb > 0.98 * sa + 0.001 {
        (-outward_normal(vb[ib], vb[(ib + 1) % vb.len()]), clip_contacts(vb, ib, va))
    } else {
        (outward_normal(va[ia], va[(ia + 1) % va.len()]), clip_contacts(va, ia, vb))
    };
    if points.is_empty() {
        let depth = -sa.max(sb);
        let c = va.iter().copied().sum::<Vec2>() / va.len() as f32;
        points.push(ContactPoint { point: c, depth });
    }
    Some(Manifold { normal, points })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use scenephys_core::{iso2, vec2};

    #[test]
    fn circles_overlap_along_centres() {
        let c = ShapeGeom::circle(1.0);
        let m = collide(&c, &Isometry2::IDENTITY, &c, &iso2(vec2(1.5, 0.0), 0.0)).unwrap();
        assert_relative_eq!(m.normal.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(m.points[0].depth, 0.5, epsilon = 1e-6);
        assert!(collide(&c, &Isometry2::IDENTITY, &c, &iso2(vec2(2.5, 0.0), 0.0)).is_none());
    }

    #[test]
    fn box_resting_on_ground_has_two_points() {
        let ground = ShapeGeom::rect(10.0, 2.0);
        let crate_ = ShapeGeom::rect(2.0, 2.0);
        let m = collide(&ground, &Isometry2::IDENTITY, &crate_, &iso2(vec2(0.0, 1.9), 0.0)).unwrap();
        assert_relative_eq!(m.normal.y, 1.0, epsilon = 1e-5);
        assert_eq!(m.points.len(), 2);
        for p in &m.points { assert_relative_eq!(p.depth, 0.1, epsilon = 1e-4); }
    }

    #[test]
    fn circle_against_box_points_into_box() {
        let circle = ShapeGeom::circle(1.0);
        let block = ShapeGeom::rect(2.0, 2.0);
        let at = iso2(vec2(0.0, 1.5), 0.0);
        let m = collide(&circle, &at, &block, &Isometry2::IDENTITY).unwrap();
        assert_relative_eq!(m.normal.y, -1.0, epsilon = 1e-5);
        assert_relative_eq!(m.points[0].depth, 0.5, epsilon = 1e-5);

        let flipped = collide(&block, &Isometry2::IDENTITY, &circle, &at).unwrap();
        assert_relative_eq!(flipped.normal.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn circle_centre_inside_box_uses_nearest_face() {
        let circle = ShapeGeom::circle(0.5);
        let block = ShapeGeom::rect(4.0, 2.0);
        let m = collide(&circle, &iso2(vec2(0.0, 0.8), 0.0), &block, &Isometry2::IDENTITY).unwrap();
        assert_relative_eq!(m.normal.y, -1.0, epsilon = 1e-5);
        assert_relative_eq!(m.points[0].depth, 0.7, epsilon = 1e-5);
    }

    #[test]
    fn capsule_lying_on_box_gets_both_ends() {
        let cap = ShapeGeom::segment(vec2(-1.0, 0.0), vec2(1.0, 0.0), 0.5);
        let ground = ShapeGeom::rect(10.0, 2.0);
        let m = collide(&cap, &iso2(vec2(0.0, 1.4), 0.0), &ground, &Isometry2::IDENTITY).unwrap();
        assert_relative_eq!(m.normal.y, -1.0, epsilon = 1e-5);
        assert_eq!(m.points.len(), 2);
    }

    #[test]
    fn separated_polygons_do_not_touch() {
        let a = ShapeGeom::rect(2.0, 2.0);
        assert!(collide(&a, &Isometry2::IDENTITY, &a, &iso2(vec2(2.5, 0.0), 0.3)).is_none());
    }
}

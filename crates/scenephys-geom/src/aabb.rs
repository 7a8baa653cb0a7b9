use scenephys_core::{Rect, Vec2};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Aabb { pub min: Vec2, pub max: Vec2 }

impl Aabb {
    #[inline] pub fn new(min: Vec2, max: Vec2) -> Self { Self { min, max } }
    #[inline] pub fn from_center_half_extents(c: Vec2, he: Vec2) -> Self {
        Self { min: c - he, max: c + he }
    }
    pub fn from_points(pts: &[Vec2]) -> Self {
        let Some(first) = pts.first() else { return Self::default(); };
        pts.iter().fold(Self::new(*first, *first), |acc, p| Self::new(acc.min.min(*p), acc.max.max(*p)))
    }
    #[inline] pub fn overlaps(&self, other: &Aabb) -> bool {
        !(self.max.x < other.min.x || self.min.x > other.max.x ||
            self.max.y < other.min.y || self.min.y > other.max.y)
    }
    #[inline] pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
    #[inline] pub fn expand_by(&mut self, r: f32) {
        let e = Vec2::splat(r);
        self.min -= e; self.max += e;
    }
    #[inline] pub fn merge(&self, other: &Aabb) -> Aabb {
        Aabb { min: self.min.min(other.min), max: self.max.max(other.max) }
    }

    /// Slab test of the segment `a -> b`. Returns the entry fraction in `[0, 1]`,
    /// or 0 when `a` already lies inside.
    pub fn segment_entry(&self, a: Vec2, b: Vec2) -> Option<f32> {
        let d = b - a;
        let inv = Vec2::new(
            if d.x.abs() > 1e-9 { 1.0 / d.x } else { 1.0e9 },
            if d.y.abs() > 1e-9 { 1.0 / d.y } else { 1.0e9 },
        );
        let t1 = (self.min - a) * inv;
        let t2 = (self.max - a) * inv;
        let tmin = t1.min(t2);
        let tmax = t1.max(t2);
        let t_enter = tmin.x.max(tmin.y);
        let t_exit = tmax.x.min(tmax.y);
        if t_enter <= t_exit && t_exit >= 0.0 && t_enter <= 1.0 { Some(t_enter.max(0.0)) } else { None }
    }
}

impl From<Rect> for Aabb {
    fn from(r: Rect) -> Self { Aabb::new(r.min(), r.max()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenephys_core::vec2;

    #[test]
    fn touching_boxes_overlap() {
        let a = Aabb::new(vec2(0.0, 0.0), vec2(1.0, 1.0));
        let b = Aabb::new(vec2(1.0, 0.5), vec2(2.0, 2.0));
        let c = Aabb::new(vec2(1.01, 0.5), vec2(2.0, 2.0));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn segment_entry_reports_fraction() {
        let a = Aabb::new(vec2(4.0, -1.0), vec2(6.0, 1.0));
        let t = a.segment_entry(vec2(0.0, 0.0), vec2(10.0, 0.0)).unwrap();
        assert!((t - 0.4).abs() < 1e-5);
        assert!(a.segment_entry(vec2(0.0, 5.0), vec2(10.0, 5.0)).is_none());
        assert_eq!(a.segment_entry(vec2(5.0, 0.0), vec2(10.0, 0.0)), Some(0.0));
    }

    #[test]
    fn from_rect_normalizes() {
        let r = Rect::new(3.0, 3.0, -2.0, 1.0);
        let a = Aabb::from(r);
        assert_eq!(a.min, vec2(1.0, 3.0));
        assert_eq!(a.max, vec2(3.0, 4.0));
    }
}

use scenephys_core::{BodyId, Rect, Scalar, ShapeId, Vec2};
use scenephys_geom::Aabb;
use scenephys_solver::Solver;

use crate::world::World;

/// One shape crossed by [`World::ray_cast`]. Only valid inside the callback.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayCastInfo {
    pub shape: ShapeId,
    pub body: BodyId,
    pub start: Vec2,
    pub end: Vec2,
    pub contact: Vec2,
    pub normal: Vec2,
    /// Fraction of `start..end` where the ray enters the shape.
    pub fraction: Scalar,
}

impl<S: Solver> World<S> {
    /// Visits shapes crossed by `p1 -> p2` until `f` returns `false`.
    /// Pending body changes are flushed first.
    pub fn ray_cast(&mut self, p1: Vec2, p2: Vec2, mut f: impl FnMut(&RayCastInfo) -> bool) {
        if p1 == p2 { return; }
        self.flush_bodies();
        let reg = &self.reg;
        self.solver.segment_query(p1, p2, &mut |hit| {
            let Some((shape, body)) = reg.shape_by_handle(hit.shape, hit.user_data) else { return true; };
            f(&RayCastInfo {
                shape, body,
                start: p1, end: p2,
                contact: hit.point,
                normal: hit.normal,
                fraction: hit.alpha,
            })
        });
    }

    /// Shapes whose bounding box overlaps `rect`, until `f` returns `false`.
    pub fn query_rect(&mut self, rect: Rect, mut f: impl FnMut(ShapeId, BodyId) -> bool) {
        self.flush_bodies();
        let reg = &self.reg;
        self.solver.bb_query(Aabb::from(rect), &mut |h, user| {
            match reg.shape_by_handle(h, user) {
                Some((shape, body)) => f(shape, body),
                None => true,
            }
        });
    }

    /// Shapes containing `p`, until `f` returns `false`.
    pub fn query_point(&mut self, p: Vec2, mut f: impl FnMut(ShapeId, BodyId) -> bool) {
        self.flush_bodies();
        let reg = &self.reg;
        self.solver.point_query(p, 0.0, &mut |hit| {
            match reg.shape_by_handle(hit.shape, hit.user_data) {
                Some((shape, body)) => f(shape, body),
                None => true,
            }
        });
    }

    /// The shape containing `p` whose surface is farthest from it, i.e. the most deeply containing one.
    pub fn shape_at(&mut self, p: Vec2) -> Option<ShapeId> {
        self.flush_bodies();
        let hit = self.solver.point_query_nearest(p, 0.0)?;
        self.reg.shape_by_handle(hit.shape, hit.user_data).map(|(s, _)| s)
    }

    /// Every shape containing `p`.
    pub fn shapes_at(&mut self, p: Vec2) -> Vec<ShapeId> {
        let mut out = Vec::new();
        self.query_point(p, |s, _| { out.push(s); true });
        out
    }
}

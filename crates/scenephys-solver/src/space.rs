use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use log::{debug, trace};
use scenephys_articulation::{Constraint, ConstraintDesc, Joints};
use scenephys_collision::{collide, pairs_sap, Manifold};
use scenephys_core::{ColliderHandle, ConstraintHandle, Isometry2, RigidBodyHandle, Scalar, StepStats, Vec2};
use scenephys_dynamics::{Bodies, RigidBody, RigidBodyDesc};
use scenephys_geom::{Aabb, Material, ShapeGeom};
use slotmap::SlotMap;

use crate::handler::{Arbiter, ArbiterState, CollisionHandler};
use crate::query::{PointHit, SegmentHit, ShapeView};
use crate::Solver;

const BOUNCE_THRESHOLD: Scalar = 1.0;
const SLOP: Scalar = 0.05;
const BAUMGARTE: Scalar = 0.2;

#[derive(Clone, Debug)]
struct Collider {
    body: RigidBodyHandle,
    geom: ShapeGeom,
    material: Material,
    sensor: bool,
    in_space: bool,
    user_data: u64,
}

/// Lifetime totals of membership changes and steps.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SpaceCounters {
    pub bodies_added: u32,
    pub bodies_removed: u32,
    pub shapes_added: u32,
    pub shapes_removed: u32,
    pub constraints_added: u32,
    pub constraints_removed: u32,
    pub steps: u32,
}

type PairKey = (ColliderHandle, ColliderHandle);

// Per-point solver scratch, rebuilt every step.
struct PointSolve {
    key: PairKey,
    body_a: RigidBodyHandle,
    body_b: RigidBodyHandle,
    point: Vec2,
    normal: Vec2,
    depth: Scalar,
    share: Scalar,
    normal_mass: Scalar,
    tangent_mass: Scalar,
    bounce: Scalar,
    friction: Scalar,
    surface_velocity: Vec2,
    jn: Scalar,
    jt: Scalar,
}

/// Reference kernel: semi-implicit Euler, SAP broad phase, sequential impulses
/// for contacts and XPBD for joints.
pub struct Space {
    bodies: Bodies,
    colliders: SlotMap<ColliderHandle, Collider>,
    joints: Joints,
    arbiters: BTreeMap<PairKey, Arbiter>,
    gravity: Vec2,
    iterations: u32,
    locked: bool,
    stamp: u64,
    counters: SpaceCounters,
}

impl Default for Space {
    fn default() -> Self { Self::with_capacity(0) }
}

impl Space {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            bodies: Bodies::with_capacity(cap),
            colliders: SlotMap::with_capacity_and_key(cap),
            joints: Joints::new(),
            arbiters: BTreeMap::new(),
            gravity: Vec2::ZERO,
            iterations: 10,
            locked: false,
            stamp: 0,
            counters: SpaceCounters::default(),
        }
    }

    #[inline] pub fn counters(&self) -> SpaceCounters { self.counters }
    #[inline] pub fn iterations(&self) -> u32 { self.iterations }
    #[inline] pub fn arbiter_count(&self) -> usize { self.arbiters.len() }

    fn live_collider(&self, c: &Collider) -> bool { c.in_space && self.bodies.in_space(c.body) }

    fn pose_of(&self, body: RigidBodyHandle) -> Isometry2 { self.bodies.pose(body).unwrap_or_default() }

    fn drop_arbiters_of(&mut self, h: ColliderHandle, mut handler: Option<&mut dyn CollisionHandler>) {
        let keys: Vec<PairKey> = self.arbiters.keys().filter(|(a, b)| *a == h || *b == h).copied().collect();
        for k in keys {
            let Some(arb) = self.arbiters.remove(&k) else { continue; };
            if let Some(handler) = handler.as_deref_mut() { handler.separate(&arb); }
        }
    }

    /* ---------- step stages ---------- */

    fn broad_and_narrow(&mut self, handler: &mut dyn CollisionHandler) -> u32 {
        let live: Vec<ColliderHandle> = self.colliders.iter()
            .filter(|(_, c)| self.live_collider(c))
            .map(|(h, _)| h)
            .collect();
        let boxes: Vec<Aabb> = live.iter()
            .map(|h| { let c = &self.colliders[*h]; c.geom.world_aabb(&self.pose_of(c.body)) })
            .collect();
        let pairs = pairs_sap(&boxes);

        for &(i, k) in &pairs {
            let (ha, hb) = if live[i] < live[k] { (live[i], live[k]) } else { (live[k], live[i]) };
            let (ca, cb) = (&self.colliders[ha], &self.colliders[hb]);
            if ca.body == cb.body { continue; }
            let (Some(ba), Some(bb)) = (self.bodies.get(ca.body), self.bodies.get(cb.body)) else { continue; };
            if !ba.is_dynamic() && !bb.is_dynamic() { continue; }
            let Some(manifold) = collide(&ca.geom, &ba.pose, &cb.geom, &bb.pose) else { continue; };

            match self.arbiters.entry((ha, hb)) {
                Entry::Vacant(slot) => {
                    let (friction, restitution) = Material::mix(&ca.material, &cb.material);
                    let arb = slot.insert(Arbiter {
                        shape_a: ha, shape_b: hb,
                        body_a: ca.body, body_b: cb.body,
                        user_a: ca.user_data, user_b: cb.user_data,
                        manifold,
                        restitution, friction,
                        surface_velocity: Vec2::ZERO,
                        total_impulse: Vec2::ZERO,
                        user_data: None,
                        state: ArbiterState::Accepted,
                        stamp: self.stamp,
                        sensor: ca.sensor || cb.sensor,
                    });
                    if !handler.begin(arb) {
                        trace!("pair {ha} / {hb} ignored until separation");
                        arb.state = ArbiterState::Ignored;
                    }
                }
                Entry::Occupied(slot) => {
                    let arb = slot.into_mut();
                    arb.manifold = manifold;
                    arb.stamp = self.stamp;
                    arb.sensor = ca.sensor || cb.sensor;
                }
            }
        }
        pairs.len() as u32
    }

    fn pre_solve(&mut self, handler: &mut dyn CollisionHandler) -> Vec<PairKey> {
        let mut solving = Vec::new();
        for (key, arb) in self.arbiters.iter_mut() {
            if arb.stamp != self.stamp || arb.state == ArbiterState::Ignored { continue; }
            let (Some(ca), Some(cb)) = (self.colliders.get(key.0), self.colliders.get(key.1)) else { continue; };
            let (friction, restitution) = Material::mix(&ca.material, &cb.material);
            arb.friction = friction;
            arb.restitution = restitution;
            arb.surface_velocity = Vec2::ZERO;
            arb.total_impulse = Vec2::ZERO;
            if handler.pre_solve(arb) && !arb.sensor { solving.push(*key); }
        }
        solving
    }

    fn prepare_points(&self, solving: &[PairKey]) -> Vec<PointSolve> {
        let mut out = Vec::new();
        for key in solving {
            let Some(arb) = self.arbiters.get(key) else { continue; };
            let (Some(ba), Some(bb)) = (self.bodies.get(arb.body_a), self.bodies.get(arb.body_b)) else { continue; };
            let Manifold { normal, points } = &arb.manifold;
            let tangent = normal.perp();
            let share = 1.0 / points.len().max(1) as Scalar;
            for cp in points {
                let (ra, rb) = (cp.point - ba.pose.pos, cp.point - bb.pose.pos);
                let k = |dir: Vec2| {
                    let w = ba.inv_mass() + bb.inv_mass()
                        + ba.inv_moment() * ra.perp_dot(dir).powi(2)
                        + bb.inv_moment() * rb.perp_dot(dir).powi(2);
                    if w > 0.0 { 1.0 / w } else { 0.0 }
                };
                let vn = (bb.velocity_at(cp.point) - ba.velocity_at(cp.point)).dot(*normal);
                out.push(PointSolve {
                    key: *key,
                    body_a: arb.body_a,
                    body_b: arb.body_b,
                    point: cp.point,
                    normal: *normal,
                    depth: cp.depth,
                    share,
                    normal_mass: k(*normal),
                    tangent_mass: k(tangent),
                    bounce: if vn < -BOUNCE_THRESHOLD { -arb.restitution * vn } else { 0.0 },
                    friction: arb.friction,
                    surface_velocity: arb.surface_velocity,
                    jn: 0.0,
                    jt: 0.0,
                });
            }
        }
        out
    }

    fn solve_velocities(bodies: &mut Bodies, points: &mut [PointSolve], iterations: u32) {
        for _ in 0..iterations.max(1) {
            for p in points.iter_mut() {
                let Some([ba, bb]) = bodies.pair_mut(p.body_a, p.body_b) else { continue; };
                let tangent = p.normal.perp();

                let dv = bb.velocity_at(p.point) - ba.velocity_at(p.point);
                let vt = (dv + p.surface_velocity).dot(tangent);
                let max_f = p.friction * p.jn;
                let jt_new = (p.jt - vt * p.tangent_mass).clamp(-max_f, max_f);
                let jt = jt_new - p.jt;
                p.jt = jt_new;
                apply_pair(ba, bb, tangent * jt, p.point);

                let dv = bb.velocity_at(p.point) - ba.velocity_at(p.point);
                let vn = dv.dot(p.normal);
                let jn_new = (p.jn + (p.bounce - vn) * p.normal_mass).max(0.0);
                let jn = jn_new - p.jn;
                p.jn = jn_new;
                apply_pair(ba, bb, p.normal * jn, p.point);
            }
        }
    }

    fn correct_positions(bodies: &mut Bodies, points: &[PointSolve]) {
        for p in points {
            let err = (p.depth - SLOP).max(0.0) * BAUMGARTE * p.share;
            if err <= 0.0 { continue; }
            let Some([ba, bb]) = bodies.pair_mut(p.body_a, p.body_b) else { continue; };
            let w = ba.inv_mass() + bb.inv_mass();
            if w == 0.0 { continue; }
            let push = p.normal * (err / w);
            ba.pose.pos -= push * ba.inv_mass();
            bb.pose.pos += push * bb.inv_mass();
        }
    }
}

#[inline]
fn apply_pair(ba: &mut RigidBody, bb: &mut RigidBody, j: Vec2, at: Vec2) {
    ba.apply_impulse(-j, at);
    bb.apply_impulse(j, at);
}

impl Solver for Space {
    #[inline] fn gravity(&self) -> Vec2 { self.gravity }
    #[inline] fn set_gravity(&mut self, g: Vec2) { self.gravity = g; }
    #[inline] fn set_iterations(&mut self, n: u32) { self.iterations = n.max(1); }
    #[inline] fn is_locked(&self) -> bool { self.locked }

    fn step(&mut self, dt: Scalar, handler: &mut dyn CollisionHandler) -> StepStats {
        if dt <= 0.0 { return StepStats::default(); }
        self.locked = true;
        self.stamp += 1;
        self.counters.steps += 1;

        self.bodies.integrate_velocities(self.gravity, dt);
        let pairs_tested = self.broad_and_narrow(handler);
        let solving = self.pre_solve(handler);

        let mut points = self.prepare_points(&solving);
        Self::solve_velocities(&mut self.bodies, &mut points, self.iterations);
        self.bodies.integrate_positions(dt);
        Self::correct_positions(&mut self.bodies, &points);
        let constraints = self.joints.solve(&mut self.bodies, dt, self.iterations);

        for key in &solving {
            let Some(arb) = self.arbiters.get_mut(key) else { continue; };
            let tangent = arb.manifold.normal.perp();
            arb.total_impulse = points.iter()
                .filter(|p| p.key == *key)
                .fold(Vec2::ZERO, |acc, p| acc + p.normal * p.jn + tangent * p.jt);
            handler.post_solve(arb);
        }

        let stale: Vec<PairKey> = self.arbiters.iter()
            .filter(|(_, a)| a.stamp != self.stamp)
            .map(|(k, _)| *k)
            .collect();
        for key in stale {
            if let Some(arb) = self.arbiters.remove(&key) { handler.separate(&arb); }
        }

        let contacts = self.arbiters.values().filter(|a| a.state == ArbiterState::Accepted).count() as u32;
        self.locked = false;
        StepStats { pairs_tested, contacts, constraints }
    }

    /* ---------- bodies ---------- */

    fn create_body(&mut self, desc: &RigidBodyDesc) -> RigidBodyHandle { self.bodies.add(desc) }

    fn destroy_body(&mut self, h: RigidBodyHandle) {
        let shapes: Vec<ColliderHandle> = self.colliders.iter().filter(|(_, c)| c.body == h).map(|(k, _)| k).collect();
        for s in shapes { self.destroy_shape(s); }
        for c in self.joints.attached_to(h) { self.destroy_constraint(c); }
        if self.bodies.remove(h).is_none() { debug!("destroy_body: unknown {h}"); }
    }

    fn add_body(&mut self, h: RigidBodyHandle) {
        if let Some(b) = self.bodies.get_mut(h) {
            if !b.in_space { b.in_space = true; self.counters.bodies_added += 1; }
        }
    }

    fn remove_body(&mut self, h: RigidBodyHandle) {
        if let Some(b) = self.bodies.get_mut(h) {
            if b.in_space { b.in_space = false; self.counters.bodies_removed += 1; }
        }
    }

    #[inline] fn contains_body(&self, h: RigidBodyHandle) -> bool { self.bodies.in_space(h) }
    #[inline] fn body(&self, h: RigidBodyHandle) -> Option<&RigidBody> { self.bodies.get(h) }
    #[inline] fn body_mut(&mut self, h: RigidBodyHandle) -> Option<&mut RigidBody> { self.bodies.get_mut(h) }

    /* ---------- shapes ---------- */

    fn create_shape(&mut self, body: RigidBodyHandle, geom: ShapeGeom, material: Material, sensor: bool, user_data: u64)
        -> Option<ColliderHandle>
    {
        if !self.bodies.contains(body) { return None; }
        Some(self.colliders.insert(Collider { body, geom, material, sensor, in_space: false, user_data }))
    }

    fn destroy_shape(&mut self, h: ColliderHandle) {
        self.drop_arbiters_of(h, None);
        self.colliders.remove(h);
    }

    fn add_shape(&mut self, h: ColliderHandle) {
        if let Some(c) = self.colliders.get_mut(h) {
            if !c.in_space { c.in_space = true; self.counters.shapes_added += 1; }
        }
    }

    fn remove_shape(&mut self, h: ColliderHandle, handler: &mut dyn CollisionHandler) {
        let Some(c) = self.colliders.get_mut(h) else { return; };
        if !c.in_space { return; }
        c.in_space = false;
        self.counters.shapes_removed += 1;
        self.drop_arbiters_of(h, Some(handler));
    }

    #[inline] fn contains_shape(&self, h: ColliderHandle) -> bool { self.colliders.get(h).is_some_and(|c| c.in_space) }

    fn set_shape_geometry(&mut self, h: ColliderHandle, geom: ShapeGeom) {
        if let Some(c) = self.colliders.get_mut(h) { c.geom = geom; }
    }
    fn set_shape_material(&mut self, h: ColliderHandle, material: Material) {
        if let Some(c) = self.colliders.get_mut(h) { c.material = material; }
    }
    fn set_shape_sensor(&mut self, h: ColliderHandle, sensor: bool) {
        if let Some(c) = self.colliders.get_mut(h) { c.sensor = sensor; }
    }

    /* ---------- constraints ---------- */

    fn create_constraint(&mut self, desc: &ConstraintDesc, a: RigidBodyHandle, b: RigidBodyHandle)
        -> Option<ConstraintHandle>
    {
        if a == b || !desc.is_valid() { return None; }
        if !self.bodies.in_space(a) || !self.bodies.in_space(b) { return None; }
        let (pa, pb) = (self.bodies.pose(a)?, self.bodies.pose(b)?);
        Some(self.joints.insert(Constraint::resolve(desc, a, b, pa, pb)))
    }

    fn destroy_constraint(&mut self, h: ConstraintHandle) { self.joints.remove(h); }

    fn add_constraint(&mut self, h: ConstraintHandle) {
        if let Some(c) = self.joints.get_mut(h) {
            if !c.in_space { c.in_space = true; self.counters.constraints_added += 1; }
        }
    }

    fn remove_constraint(&mut self, h: ConstraintHandle) {
        if let Some(c) = self.joints.get_mut(h) {
            if c.in_space { c.in_space = false; self.counters.constraints_removed += 1; }
        }
    }

    #[inline] fn contains_constraint(&self, h: ConstraintHandle) -> bool { self.joints.get(h).is_some_and(|c| c.in_space) }

    fn set_constraint_enabled(&mut self, h: ConstraintHandle, enabled: bool) {
        if let Some(c) = self.joints.get_mut(h) { c.enabled = enabled; }
    }

    fn constraint_anchors(&self, h: ConstraintHandle) -> Option<(Vec2, Vec2)> {
        let c = self.joints.get(h)?;
        Some(c.world_anchors(&self.bodies.pose(c.a)?, &self.bodies.pose(c.b)?))
    }

    /* ---------- queries ---------- */

    fn segment_query(&self, a: Vec2, b: Vec2, f: &mut dyn FnMut(&SegmentHit) -> bool) {
        let mut hits: Vec<SegmentHit> = Vec::new();
        for (h, c) in self.colliders.iter() {
            if !self.live_collider(c) { continue; }
            let pose = self.pose_of(c.body);
            if c.geom.world_aabb(&pose).segment_entry(a, b).is_none() { continue; }
            if let Some(hit) = c.geom.ray_cast(&pose, a, b) {
                hits.push(SegmentHit { shape: h, user_data: c.user_data, point: hit.point, normal: hit.normal, alpha: hit.alpha });
            }
        }
        hits.sort_by(|x, y| x.alpha.total_cmp(&y.alpha));
        for hit in &hits {
            if !f(hit) { break; }
        }
    }

    fn bb_query(&self, bb: Aabb, f: &mut dyn FnMut(ColliderHandle, u64) -> bool) {
        for (h, c) in self.colliders.iter() {
            if !self.live_collider(c) { continue; }
            if c.geom.world_aabb(&self.pose_of(c.body)).overlaps(&bb) && !f(h, c.user_data) { break; }
        }
    }

    fn point_query(&self, p: Vec2, max_distance: Scalar, f: &mut dyn FnMut(&PointHit) -> bool) {
        for (h, c) in self.colliders.iter() {
            if !self.live_collider(c) { continue; }
            let proj = c.geom.project_point(&self.pose_of(c.body), p);
            if proj.distance > max_distance { continue; }
            let hit = PointHit { shape: h, user_data: c.user_data, point: proj.point, distance: proj.distance };
            if !f(&hit) { break; }
        }
    }

    fn point_query_nearest(&self, p: Vec2, max_distance: Scalar) -> Option<PointHit> {
        let mut best: Option<PointHit> = None;
        self.point_query(p, max_distance, &mut |hit| {
            if best.map_or(true, |b| hit.distance < b.distance) { best = Some(*hit); }
            true
        });
        best
    }

    /* ---------- debug ---------- */

    fn for_each_shape(&self, f: &mut dyn FnMut(&ShapeView<'_>)) {
        for (h, c) in self.colliders.iter() {
            if !self.live_collider(c) { continue; }
            let Some(body) = self.bodies.get(c.body) else { continue; };
            f(&ShapeView { shape: h, geom: &c.geom, pose: body.pose, kind: body.kind, sensor: c.sensor });
        }
    }

    fn for_each_arbiter(&self, f: &mut dyn FnMut(&Arbiter)) {
        for arb in self.arbiters.values() { f(arb); }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::AcceptAll;
    use crate::{BodyKind, ConstraintKind};
    use approx::assert_relative_eq;
    use scenephys_core::{iso2, vec2};

    #[derive(Default)]
    struct Tally { begin: u32, pre: u32, post: u32, separate: u32, reject: bool, skip: bool }

    impl CollisionHandler for Tally {
        fn begin(&mut self, arb: &mut Arbiter) -> bool {
            self.begin += 1;
            arb.user_data = Some(7);
            !self.reject
        }
        fn pre_solve(&mut self, arb: &mut Arbiter) -> bool {
            assert_eq!(arb.user_data, Some(7));
            self.pre += 1;
            !self.skip
        }
        fn post_solve(&mut self, _arb: &Arbiter) { self.post += 1; }
        fn separate(&mut self, _arb: &Arbiter) { self.separate += 1; }
    }

    const DT: Scalar = 1.0 / 60.0;
    const STILL: Material = Material::new(1.0, 0.0, 0.5);

    fn spawn(space: &mut Space, kind: BodyKind, at: Vec2, geom: ShapeGeom) -> (RigidBodyHandle, ColliderHandle) {
        let b = space.create_body(&RigidBodyDesc { kind, pose: iso2(at, 0.0), ..Default::default() });
        let s = space.create_shape(b, geom, STILL, false, 0).unwrap();
        space.add_body(b);
        space.add_shape(s);
        (b, s)
    }

    fn scene() -> (Space, RigidBodyHandle, ColliderHandle, ColliderHandle) {
        let mut space = Space::default();
        space.set_gravity(vec2(0.0, -10.0));
        let (_, ground) = spawn(&mut space, BodyKind::Static, Vec2::ZERO, ShapeGeom::rect(20.0, 2.0));
        let (ball, shape) = spawn(&mut space, BodyKind::Dynamic, vec2(0.0, 2.0), ShapeGeom::circle(0.5));
        (space, ball, ground, shape)
    }

    #[test]
    fn ball_comes_to_rest_on_ground() {
        let (mut space, ball, _, _) = scene();
        let mut tally = Tally::default();
        for _ in 0..240 { space.step(DT, &mut tally); }
        let b = space.body(ball).unwrap();
        assert!((b.pose.pos.y - 1.5).abs() < 0.1, "y = {}", b.pose.pos.y);
        assert!(b.vel.lin.y.abs() < 0.5);
        assert_eq!(tally.begin, 1);
        assert!(tally.pre > 100 && tally.post == tally.pre);
        assert_eq!(tally.separate, 0);
        assert!(!space.is_locked());
    }

    #[test]
    fn rejected_pair_falls_through_until_it_separates() {
        let (mut space, ball, _, _) = scene();
        let mut tally = Tally { reject: true, ..Default::default() };
        for _ in 0..120 { space.step(DT, &mut tally); }
        assert_eq!(tally.begin, 1);
        assert_eq!(tally.pre, 0);
        assert_eq!(tally.separate, 1);
        assert!(space.body(ball).unwrap().pose.pos.y < -1.0);
    }

    #[test]
    fn skipped_pre_solve_has_no_response() {
        let (mut space, ball, _, _) = scene();
        let mut tally = Tally { skip: true, ..Default::default() };
        for _ in 0..120 { space.step(DT, &mut tally); }
        assert!(tally.pre > 0);
        assert_eq!(tally.post, 0);
        assert!(space.body(ball).unwrap().pose.pos.y < 0.0);
    }

    #[test]
    fn removing_a_touching_shape_fires_separate() {
        let (mut space, _, _, shape) = scene();
        let mut tally = Tally::default();
        for _ in 0..60 { space.step(DT, &mut tally); }
        assert_eq!(space.arbiter_count(), 1);
        space.remove_shape(shape, &mut tally);
        assert_eq!(tally.separate, 1);
        assert_eq!(space.arbiter_count(), 0);
        assert!(!space.contains_shape(shape));
    }

    #[test]
    fn segment_query_is_nearest_first_and_stops_early() {
        let mut space = Space::default();
        spawn(&mut space, BodyKind::Static, vec2(10.0, 0.0), ShapeGeom::circle(1.0));
        spawn(&mut space, BodyKind::Static, vec2(5.0, 0.0), ShapeGeom::rect(2.0, 2.0));
        let mut seen = Vec::new();
        space.segment_query(Vec2::ZERO, vec2(20.0, 0.0), &mut |h| { seen.push(h.point.x); true });
        assert_eq!(seen.len(), 2);
        assert_relative_eq!(seen[0], 4.0, epsilon = 1e-4);
        assert_relative_eq!(seen[1], 9.0, epsilon = 1e-4);

        let mut count = 0;
        space.segment_query(Vec2::ZERO, vec2(20.0, 0.0), &mut |_| { count += 1; false });
        assert_eq!(count, 1);
    }

    #[test]
    fn point_queries_respect_membership() {
        let mut space = Space::default();
        let (b, s) = spawn(&mut space, BodyKind::Static, Vec2::ZERO, ShapeGeom::circle(1.0));
        assert_eq!(space.point_query_nearest(vec2(0.5, 0.0), 0.0).map(|h| h.shape), Some(s));
        space.remove_body(b);
        assert!(space.point_query_nearest(vec2(0.5, 0.0), 0.0).is_none());
    }

    #[test]
    fn constraint_creation_is_validated() {
        let mut space = Space::default();
        let (a, _) = spawn(&mut space, BodyKind::Dynamic, Vec2::ZERO, ShapeGeom::circle(1.0));
        let b = space.create_body(&RigidBodyDesc::default());
        let pin = ConstraintDesc { kind: ConstraintKind::Pivot, anchor_a: Vec2::ZERO, anchor_b: Vec2::ZERO };
        assert!(space.create_constraint(&pin, a, a).is_none());
        assert!(space.create_constraint(&pin, a, b).is_none());
        space.add_body(b);
        let c = space.create_constraint(&pin, a, b).unwrap();
        assert!(!space.contains_constraint(c));
        space.add_constraint(c);
        assert!(space.contains_constraint(c));
        assert_eq!(space.counters().constraints_added, 1);
    }

    #[test]
    fn destroying_a_body_drops_its_shapes_silently() {
        let (mut space, ball, _, shape) = scene();
        let mut tally = Tally::default();
        for _ in 0..60 { space.step(DT, &mut tally); }
        space.destroy_body(ball);
        assert!(space.body(ball).is_none());
        assert!(!space.contains_shape(shape));
        assert_eq!(space.arbiter_count(), 0);
        space.step(DT, &mut AcceptAll);
        assert_eq!(tally.separate, 0);
    }
}

use scenephys_core::{ConstraintHandle, Isometry2, RigidBodyHandle, Scalar, Vec2};
use scenephys_dynamics::{Bodies, RigidBody};
use slotmap::SlotMap;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ConstraintKind {
    /// Anchors stay a fixed distance apart; `None` measures it when the constraint is created.
    Pin { distance: Option<Scalar> },
    /// Anchors coincide; free rotation.
    Pivot,
    /// Anchor distance kept inside `[min, max]`.
    Limit { min: Scalar, max: Scalar },
    /// Damped spring towards `rest`.
    Spring { rest: Scalar, stiffness: Scalar, damping: Scalar },
    /// Pivot plus a locked relative angle.
    Fixed,
}

/// Anchors are in each body's local frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ConstraintDesc {
    pub kind: ConstraintKind,
    pub anchor_a: Vec2,
    pub anchor_b: Vec2,
}

impl ConstraintDesc {
    /// Rejects parameter sets the solver cannot honour.
    pub fn is_valid(&self) -> bool {
        match self.kind {
            ConstraintKind::Pin { distance } => distance.map_or(true, |d| d >= 0.0 && d.is_finite()),
            ConstraintKind::Pivot | ConstraintKind::Fixed => true,
            ConstraintKind::Limit { min, max } => min >= 0.0 && min <= max,
            ConstraintKind::Spring { rest, stiffness, damping } =>
                rest >= 0.0 && stiffness > 0.0 && damping >= 0.0,
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Constraint {
    pub a: RigidBodyHandle,
    pub b: RigidBodyHandle,
    pub anchor_a: Vec2,
    pub anchor_b: Vec2,
    pub min: Scalar,
    pub max: Scalar,
    /// XPBD compliance (inverse stiffness); 0 = rigid.
    pub compliance: Scalar,
    pub damping: Scalar,
    /// Locked relative angle `rot_b - rot_a`, if any.
    pub angle: Option<Scalar>,
    pub enabled: bool,
    pub in_space: bool,
}

impl Constraint {
    /// Resolves `desc` against the bodies' current poses.
    pub fn resolve(desc: &ConstraintDesc, a: RigidBodyHandle, b: RigidBodyHandle, pa: Isometry2, pb: Isometry2) -> Self {
        let gap = (pb.transform_point(desc.anchor_b) - pa.transform_point(desc.anchor_a)).length();
        let (min, max, compliance, damping, angle) = match desc.kind {
            ConstraintKind::Pin { distance } => {
                let d = distance.unwrap_or(gap);
                (d, d, 0.0, 0.0, None)
            }
            ConstraintKind::Pivot => (0.0, 0.0, 0.0, 0.0, None),
            ConstraintKind::Limit { min, max } => (min, max, 0.0, 0.0, None),
            ConstraintKind::Spring { rest, stiffness, damping } => (rest, rest, 1.0 / stiffness, damping, None),
            ConstraintKind::Fixed => (0.0, 0.0, 0.0, 0.0, Some(pb.rot - pa.rot)),
        };
        Self {
            a, b,
            anchor_a: desc.anchor_a, anchor_b: desc.anchor_b,
            min, max, compliance, damping, angle,
            enabled: true, in_space: false,
        }
    }

    #[inline] pub fn world_anchors(&self, pa: &Isometry2, pb: &Isometry2) -> (Vec2, Vec2) {
        (pa.transform_point(self.anchor_a), pb.transform_point(self.anchor_b))
    }

    fn solve_distance(&self, ba: &mut RigidBody, bb: &mut RigidBody, dt: Scalar) {
        let (pa, pb) = self.world_anchors(&ba.pose, &bb.pose);
        let d = pb - pa;
        let len = d.length();
        let target = if len < self.min { self.min } else if len > self.max { self.max } else { return; };
        let c_val = len - target;                 // C(p) = |pb-pa| - L
        if c_val.abs() <= 1.0e-6 || len <= 1.0e-6 { return; }

        let n = d / len;
        let (ra, rb) = (pa - ba.pose.pos, pb - bb.pose.pos);
        let wa = ba.inv_mass() + ba.inv_moment() * ra.perp_dot(n).powi(2);
        let wb = bb.inv_mass() + bb.inv_moment() * rb.perp_dot(n).powi(2);
        let alpha = if self.compliance <= 0.0 { 0.0 } else { self.compliance / (dt * dt) };
        if wa + wb + alpha == 0.0 { return; }
        let lambda = -c_val / (wa + wb + alpha);

        let p = n * lambda;
        ba.pose.pos -= p * ba.inv_mass();
        ba.pose.rot -= ra.perp_dot(p) * ba.inv_moment();
        bb.pose.pos += p * bb.inv_mass();
        bb.pose.rot += rb.perp_dot(p) * bb.inv_moment();
    }

    fn solve_angle(&self, ba: &mut RigidBody, bb: &mut RigidBody) {
        let Some(target) = self.angle else { return; };
        let w = ba.inv_moment() + bb.inv_moment();
        if w == 0.0 { return; }
        let lambda = -((bb.pose.rot - ba.pose.rot) - target) / w;
        ba.pose.rot -= lambda * ba.inv_moment();
        bb.pose.rot += lambda * bb.inv_moment();
    }

    fn apply_damping(&self, ba: &mut RigidBody, bb: &mut RigidBody, dt: Scalar) {
        if self.damping <= 0.0 { return; }
        let (pa, pb) = self.world_anchors(&ba.pose, &bb.pose);
        let n = (pb - pa).normalize_or_zero();
        if n == Vec2::ZERO { return; }
        let w = ba.inv_mass() + bb.inv_mass();
        if w == 0.0 { return; }
        let v_rel = (bb.velocity_at(pb) - ba.velocity_at(pa)).dot(n);
        let j = n * (-v_rel * (self.damping * dt).min(1.0) / w);
        ba.apply_impulse(-j, pa);
        bb.apply_impulse(j, pb);
    }
}

#[derive(Default)]
pub struct Joints {
    set: SlotMap<ConstraintHandle, Constraint>,
}

impl Joints {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, c: Constraint) -> ConstraintHandle { self.set.insert(c) }
    pub fn remove(&mut self, h: ConstraintHandle) -> Option<Constraint> { self.set.remove(h) }
    #[inline] pub fn get(&self, h: ConstraintHandle) -> Option<&Constraint> { self.set.get(h) }
    #[inline] pub fn get_mut(&mut self, h: ConstraintHandle) -> Option<&mut Constraint> { self.set.get_mut(h) }
    pub fn iter(&self) -> impl Iterator<Item = (ConstraintHandle, &Constraint)> { self.set.iter() }

    /// Handles of constraints touching body `h`.
    pub fn attached_to(&self, h: RigidBodyHandle) -> Vec<ConstraintHandle> {
        self.set.iter().filter(|(_, c)| c.a == h || c.b == h).map(|(k, _)| k).collect()
    }

    /// XPBD positional solve followed by the matching velocity update.
    /// Returns the number of constraints that took part.
    pub fn solve(&self, bodies: &mut Bodies, dt: Scalar, iterations: u32) -> u32 {
        if dt <= 0.0 { return 0; }
        let active: Vec<&Constraint> = self.set.values()
            .filter(|c| c.enabled && c.in_space && bodies.in_space(c.a) && bodies.in_space(c.b))
            .collect();
        if active.is_empty() { return 0; }

        let mut before: Vec<(RigidBodyHandle, Isometry2)> = Vec::with_capacity(active.len() * 2);
        for c in &active {
            for h in [c.a, c.b] {
                if before.iter().all(|(k, _)| *k != h) {
                    if let Some(p) = bodies.pose(h) { before.push((h, p)); }
                }
            }
        }

        for _ in 0..iterations.max(1) {
            for c in &active {
                let Some([ba, bb]) = bodies.pair_mut(c.a, c.b) else { continue; };
                c.solve_distance(ba, bb, dt);
                c.solve_angle(ba, bb);
            }
        }

        for (h, p0) in before {
            let Some(b) = bodies.get_mut(h) else { continue; };
            if !b.is_dynamic() { continue; }
            b.vel.lin += (b.pose.pos - p0.pos) / dt;
            b.vel.ang += (b.pose.rot - p0.rot) / dt;
        }
        for c in &active {
            if let Some([ba, bb]) = bodies.pair_mut(c.a, c.b) { c.apply_damping(ba, bb, dt); }
        }
        active.len() as u32
    }
}

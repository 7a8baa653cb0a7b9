use scenephys_core::types::{Isometry2, Velocity};
use scenephys_core::{RigidBodyHandle, Scalar, Vec2};
use scenephys_geom::MassProps;
use slotmap::SlotMap;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum BodyKind {
    #[default]
    Dynamic,
    /// Never moves; infinite mass.
    Static,
    /// Moved by its velocity only; infinite mass, ignores forces.
    Kinematic,
}

/// Input descriptor when creating a body.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RigidBodyDesc {
    pub kind: BodyKind,
    pub pose: Isometry2,
    pub vel: Velocity,
    pub mass: Scalar,
    pub moment: Scalar,
    pub gravity_enabled: bool,
}

impl Default for RigidBodyDesc {
    fn default() -> Self {
        Self {
            kind: BodyKind::Dynamic,
            pose: Isometry2::IDENTITY,
            vel: Velocity::default(),
            mass: 1.0,
            moment: 1.0,
            gravity_enabled: true,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RigidBody {
    pub kind: BodyKind,
    pub pose: Isometry2,
    pub vel: Velocity,
    pub mass: MassProps,
    pub force: Vec2,
    pub torque: Scalar,
    pub gravity_enabled: bool,
    /// Whether the body currently takes part in stepping.
    pub in_space: bool,
}

impl RigidBody {
    fn new(desc: &RigidBodyDesc) -> Self {
        let mut body = Self {
            kind: desc.kind,
            pose: desc.pose,
            vel: desc.vel,
            mass: MassProps::infinite(),
            force: Vec2::ZERO,
            torque: 0.0,
            gravity_enabled: desc.gravity_enabled,
            in_space: false,
        };
        body.set_mass(desc.mass, desc.moment);
        body
    }

    #[inline] pub fn is_dynamic(&self) -> bool { self.kind == BodyKind::Dynamic }
    #[inline] pub fn inv_mass(&self) -> Scalar { self.mass.inv_mass }
    #[inline] pub fn inv_moment(&self) -> Scalar { self.mass.inv_moment }

    /// Non-dynamic bodies always report infinite mass to the solver.
    pub fn set_mass(&mut self, mass: Scalar, moment: Scalar) {
        self.mass = if self.is_dynamic() {
            let mass = if mass > 0.0 { mass } else { 1.0 };
            MassProps::new(mass, moment)
        } else {
            MassProps::infinite()
        };
    }

    /// Velocity of a world-space point rigidly attached to the body.
    #[inline] pub fn velocity_at(&self, world_point: Vec2) -> Vec2 {
        self.vel.lin + (world_point - self.pose.pos).perp() * self.vel.ang
    }

    /// Impulse `j` applied at world point `at`.
    #[inline] pub fn apply_impulse(&mut self, j: Vec2, at: Vec2) {
        self.vel.lin += j * self.mass.inv_mass;
        self.vel.ang += (at - self.pose.pos).perp_dot(j) * self.mass.inv_moment;
    }

    /// Force accumulated until the next step, applied at world point `at`.
    #[inline] pub fn apply_force(&mut self, f: Vec2, at: Vec2) {
        self.force += f;
        self.torque += (at - self.pose.pos).perp_dot(f);
    }
}

/// Body storage keyed by generational handle.
#[derive(Default)]
pub struct Bodies {
    set: SlotMap<RigidBodyHandle, RigidBody>,
}

impl Bodies {
    pub fn with_capacity(cap: usize) -> Self {
        Self { set: SlotMap::with_capacity_and_key(cap) }
    }

    pub fn add(&mut self, desc: &RigidBodyDesc) -> RigidBodyHandle { self.set.insert(RigidBody::new(desc)) }
    pub fn remove(&mut self, h: RigidBodyHandle) -> Option<RigidBody> { self.set.remove(h) }

    #[inline] pub fn len(&self) -> usize { self.set.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.set.is_empty() }
    #[inline] pub fn contains(&self, h: RigidBodyHandle) -> bool { self.set.contains_key(h) }
    #[inline] pub fn get(&self, h: RigidBodyHandle) -> Option<&RigidBody> { self.set.get(h) }
    #[inline] pub fn get_mut(&mut self, h: RigidBodyHandle) -> Option<&mut RigidBody> { self.set.get_mut(h) }
    #[inline] pub fn in_space(&self, h: RigidBodyHandle) -> bool { self.set.get(h).is_some_and(|b| b.in_space) }

    pub fn iter(&self) -> impl Iterator<Item = (RigidBodyHandle, &RigidBody)> { self.set.iter() }

    /// Two distinct bodies borrowed mutably at once.
    pub fn pair_mut(&mut self, a: RigidBodyHandle, b: RigidBodyHandle) -> Option<[&mut RigidBody; 2]> {
        self.set.get_disjoint_mut([a, b])
    }

    #[inline] pub fn pose(&self, h: RigidBodyHandle) -> Option<Isometry2> { self.set.get(h).map(|b| b.pose) }
    #[inline] pub fn set_pose(&mut self, h: RigidBodyHandle, iso: Isometry2) {
        if let Some(b) = self.set.get_mut(h) { b.pose = iso; }
    }
    #[inline] pub fn vel(&self, h: RigidBodyHandle) -> Option<Velocity> { self.set.get(h).map(|b| b.vel) }
    #[inline] pub fn set_vel(&mut self, h: RigidBodyHandle, v: Velocity) {
        if let Some(b) = self.set.get_mut(h) { b.vel = v; }
    }

    /// Gravity and accumulated forces into velocity for every dynamic body in the space.
    /// Clears the force accumulators.
    pub fn integrate_velocities(&mut self, gravity: Vec2, dt: Scalar) {
        for (_, b) in self.set.iter_mut() {
            if !b.in_space || !b.is_dynamic() { continue; }
            let g = if b.gravity_enabled { gravity } else { Vec2::ZERO };
            b.vel.lin += (g + b.force * b.mass.inv_mass) * dt;
            b.vel.ang += b.torque * b.mass.inv_moment * dt;
            b.force = Vec2::ZERO;
            b.torque = 0.0;
        }
    }

    /// Velocity into pose for dynamic and kinematic bodies in the space.
    pub fn integrate_positions(&mut self, dt: Scalar) {
        for (_, b) in self.set.iter_mut() {
            if !b.in_space || b.kind == BodyKind::Static { continue; }
            b.pose.pos += b.vel.lin * dt;
            b.pose.rot += b.vel.ang * dt;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use scenephys_core::vec2;

    fn body_in_space(bodies: &mut Bodies, kind: BodyKind) -> RigidBodyHandle {
        let h = bodies.add(&RigidBodyDesc { kind, mass: 2.0, moment: 4.0, ..Default::default() });
        bodies.get_mut(h).unwrap().in_space = true;
        h
    }

    #[test]
    fn gravity_only_moves_dynamic_bodies() {
        let mut bodies = Bodies::with_capacity(4);
        let d = body_in_space(&mut bodies, BodyKind::Dynamic);
        let s = body_in_space(&mut bodies, BodyKind::Static);
        let k = body_in_space(&mut bodies, BodyKind::Kinematic);
        bodies.set_vel(k, Velocity { lin: vec2(1.0, 0.0), ang: 0.0 });
        for _ in 0..10 {
            bodies.integrate_velocities(vec2(0.0, -10.0), 0.1);
            bodies.integrate_positions(0.1);
        }
        assert!(bodies.pose(d).unwrap().pos.y < -5.0);
        assert_eq!(bodies.pose(s).unwrap().pos, Vec2::ZERO);
        assert_relative_eq!(bodies.pose(k).unwrap().pos.x, 1.0, epsilon = 1e-5);
        assert_eq!(bodies.pose(k).unwrap().pos.y, 0.0);
    }

    #[test]
    fn bodies_outside_the_space_stay_put() {
        let mut bodies = Bodies::default();
        let h = bodies.add(&RigidBodyDesc::default());
        bodies.integrate_velocities(vec2(0.0, -10.0), 1.0);
        bodies.integrate_positions(1.0);
        assert_eq!(bodies.pose(h).unwrap().pos, Vec2::ZERO);
    }

    #[test]
    fn off_centre_impulse_spins() {
        let mut bodies = Bodies::default();
        let h = body_in_space(&mut bodies, BodyKind::Dynamic);
        let b = bodies.get_mut(h).unwrap();
        b.apply_impulse(vec2(0.0, 2.0), vec2(1.0, 0.0));
        assert_relative_eq!(b.vel.lin.y, 1.0);
        assert_relative_eq!(b.vel.ang, 0.5);
        assert_relative_eq!(b.velocity_at(vec2(1.0, 0.0)).y, 1.5);
    }

    #[test]
    fn static_mass_is_infinite_regardless_of_request() {
        let mut bodies = Bodies::default();
        let h = body_in_space(&mut bodies, BodyKind::Static);
        assert_eq!(bodies.get(h).unwrap().inv_mass(), 0.0);
        bodies.get_mut(h).unwrap().set_mass(5.0, 5.0);
        assert_eq!(bodies.get(h).unwrap().inv_moment(), 0.0);
    }
}

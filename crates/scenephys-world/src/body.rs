use scenephys_core::{BodyId, JointId, RigidBodyHandle, Scalar, ShapeId, Vec2};
use scenephys_geom::MassProps;
use scenephys_solver::{BodyKind, Solver};

use crate::queue::Membership;
use crate::registry::Registry;

/// Everything needed to create a body. Angles are radians, counter-clockwise.
#[derive(Clone, Debug, PartialEq)]
pub struct BodyDesc {
    pub kind: BodyKind,
    pub position: Vec2,
    pub angle: Scalar,
    pub velocity: Vec2,
    pub angular_velocity: Scalar,
    /// `None` derives mass from the shapes' area and density.
    pub mass: Option<Scalar>,
    pub moment: Option<Scalar>,
    pub tag: i32,
    pub name: String,
    pub gravity_enabled: bool,
    pub rotation_enabled: bool,
    pub linear_damping: Scalar,
    pub angular_damping: Scalar,
    pub velocity_limit: Scalar,
    pub angular_velocity_limit: Scalar,
    /// Body origin relative to its node, in node space.
    pub position_offset: Vec2,
    pub rotation_offset: Scalar,
}

impl Default for BodyDesc {
    fn default() -> Self {
        Self {
            kind: BodyKind::Dynamic,
            position: Vec2::ZERO,
            angle: 0.0,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            mass: None,
            moment: None,
            tag: 0,
            name: String::new(),
            gravity_enabled: true,
            rotation_enabled: true,
            linear_damping: 0.0,
            angular_damping: 0.0,
            velocity_limit: Scalar::INFINITY,
            angular_velocity_limit: Scalar::INFINITY,
            position_offset: Vec2::ZERO,
            rotation_offset: 0.0,
        }
    }
}

impl BodyDesc {
    pub fn dynamic() -> Self { Self::default() }
    pub fn fixed() -> Self { Self { kind: BodyKind::Static, ..Self::default() } }
    pub fn kinematic() -> Self { Self { kind: BodyKind::Kinematic, ..Self::default() } }
    pub fn at(mut self, position: Vec2) -> Self { self.position = position; self }
    pub fn with_tag(mut self, tag: i32) -> Self { self.tag = tag; self }
    pub fn with_name(mut self, name: &str) -> Self { self.name = name.to_owned(); self }
    pub fn with_mass(mut self, mass: Scalar) -> Self { self.mass = Some(mass); self }
    pub fn with_velocity(mut self, v: Vec2) -> Self { self.velocity = v; self }
}

// Last transform exchanged with the node; only differences are pushed or pulled.
#[derive(Copy, Clone, Debug)]
pub(crate) struct SyncRecord {
    pub(crate) position: Vec2,
    /// Cumulative node rotation.
    pub(crate) rotation: Scalar,
    /// Body angle as last seen.
    pub(crate) angle: Scalar,
    pub(crate) scale: Vec2,
}

impl SyncRecord {
    /// Forces the next push of position and rotation.
    pub(crate) fn reset(&mut self) {
        self.position = Vec2::NAN;
        self.rotation = Scalar::NAN;
        self.angle = Scalar::NAN;
    }
}

/// World-level wrapper around one solver body and its shapes.
#[derive(Clone, Debug)]
pub struct Body {
    pub(crate) handle: RigidBodyHandle,
    pub(crate) shapes: Vec<ShapeId>,
    pub(crate) joints: Vec<JointId>,
    pub(crate) state: Membership,
    pub(crate) destroy_mark: bool,
    pub(crate) mass: Option<Scalar>,
    pub(crate) moment: Option<Scalar>,
    pub(crate) rotation_enabled: bool,
    pub(crate) position_offset: Vec2,
    pub(crate) rotation_offset: Scalar,
    pub(crate) sync: SyncRecord,
    pub tag: i32,
    pub name: String,
    pub linear_damping: Scalar,
    pub angular_damping: Scalar,
    /// Limits are read as magnitudes; NaN disables them.
    pub velocity_limit: Scalar,
    pub angular_velocity_limit: Scalar,
}

impl Body {
    pub(crate) fn new(handle: RigidBodyHandle, desc: &BodyDesc) -> Self {
        Self {
            handle,
            shapes: Vec::new(),
            joints: Vec::new(),
            state: Membership::NotInWorld,
            destroy_mark: false,
            mass: desc.mass,
            moment: desc.moment,
            rotation_enabled: desc.rotation_enabled,
            position_offset: desc.position_offset,
            rotation_offset: desc.rotation_offset,
            sync: SyncRecord {
                position: desc.position,
                rotation: desc.angle - desc.rotation_offset,
                angle: desc.angle,
                scale: Vec2::ONE,
            },
            tag: desc.tag,
            name: desc.name.clone(),
            linear_damping: desc.linear_damping,
            angular_damping: desc.angular_damping,
            velocity_limit: desc.velocity_limit,
            angular_velocity_limit: desc.angular_velocity_limit,
        }
    }

    #[inline] pub fn handle(&self) -> RigidBodyHandle { self.handle }
    #[inline] pub fn shapes(&self) -> &[ShapeId] { &self.shapes }
    /// Joints currently linked to this body.
    #[inline] pub fn joints(&self) -> &[JointId] { &self.joints }
    #[inline] pub fn state(&self) -> Membership { self.state }
    #[inline] pub fn is_in_world(&self) -> bool { self.state.is_owned() }
    #[inline] pub fn rotation_enabled(&self) -> bool { self.rotation_enabled }
    #[inline] pub fn position_offset(&self) -> Vec2 { self.position_offset }
    #[inline] pub fn rotation_offset(&self) -> Scalar { self.rotation_offset }
    /// Scale currently applied to the shapes, from the owning node chain.
    #[inline] pub fn applied_scale(&self) -> Vec2 { self.sync.scale }

    /// Per-substep damping and velocity limits.
    pub(crate) fn update<S: Solver>(&self, solver: &mut S, dt: Scalar) {
        let Some(rb) = solver.body_mut(self.handle) else { return; };
        if !rb.is_dynamic() { return; }
        rb.vel.lin *= (1.0 - dt * self.linear_damping).clamp(0.0, 1.0);
        rb.vel.ang *= (1.0 - dt * self.angular_damping).clamp(0.0, 1.0);
        rb.vel.lin = rb.vel.lin.clamp_length_max(bound(self.velocity_limit));
        let w = bound(self.angular_velocity_limit);
        rb.vel.ang = rb.vel.ang.clamp(-w, w);
    }
}

/// Magnitude of a user-set limit; NaN means unlimited.
#[inline]
fn bound(limit: Scalar) -> Scalar {
    if limit.is_nan() { Scalar::INFINITY } else { limit.abs() }
}

/// Re-derives solver mass and moment from the body's shapes unless both were given explicitly.
pub(crate) fn refresh_mass<S: Solver>(reg: &Registry, solver: &mut S, id: BodyId) {
    let Some(body) = reg.bodies.get(id) else { return; };
    let props = body.shapes.iter()
        .filter_map(|s| reg.shapes.get(*s))
        .map(|s| MassProps::from_geom(&s.geom.scaled(body.sync.scale), s.material.density))
        .fold(MassProps::new(0.0, 0.0), MassProps::combine);
    let or_unit = |x: Scalar| if x > 0.0 && x.is_finite() { x } else { 1.0 };
    let mass = body.mass.unwrap_or_else(|| or_unit(props.mass));
    let moment = if body.rotation_enabled {
        body.moment.unwrap_or_else(|| or_unit(props.moment))
    } else {
        Scalar::INFINITY
    };
    if let Some(rb) = solver.body_mut(body.handle) { rb.set_mass(mass, moment); }
}

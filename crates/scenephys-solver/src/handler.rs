use scenephys_collision::Manifold;
use scenephys_core::{ColliderHandle, RigidBodyHandle, Vec2};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ArbiterState { Accepted, Ignored }

/// Kernel-side record of one touching shape pair, alive from first touch to separation.
#[derive(Clone, Debug)]
pub struct Arbiter {
    pub shape_a: ColliderHandle,
    pub shape_b: ColliderHandle,
    pub body_a: RigidBodyHandle,
    pub body_b: RigidBodyHandle,
    /// The shapes' user slots, as given at shape creation.
    pub user_a: u64,
    pub user_b: u64,
    pub manifold: Manifold,
    /// Editable during pre-solve; reset from the shape materials every step.
    pub restitution: f32,
    pub friction: f32,
    pub surface_velocity: Vec2,
    /// Filled in before post-solve.
    pub total_impulse: Vec2,
    /// Opaque per-pair slot owned by the handler.
    pub user_data: Option<u64>,
    pub(crate) state: ArbiterState,
    pub(crate) stamp: u64,
    pub(crate) sensor: bool,
}

impl Arbiter {
    #[inline] pub fn is_sensor(&self) -> bool { self.sensor }
    /// World-space contact points of the current manifold.
    pub fn points(&self) -> impl Iterator<Item = Vec2> + '_ { self.manifold.points.iter().map(|p| p.point) }
}

/// Callbacks the kernel issues while stepping (and when a touching shape is removed).
pub trait CollisionHandler {
    /// First touch. `false` ignores the pair until it separates.
    fn begin(&mut self, arb: &mut Arbiter) -> bool;
    /// Every step while touching. `false` skips the response for this step only.
    fn pre_solve(&mut self, arb: &mut Arbiter) -> bool;
    fn post_solve(&mut self, arb: &Arbiter);
    /// Last callback for the pair. Also fired for pairs ignored in `begin`.
    fn separate(&mut self, arb: &Arbiter);
}

/// Accepts everything and observes nothing.
#[derive(Copy, Clone, Debug, Default)]
pub struct AcceptAll;

impl CollisionHandler for AcceptAll {
    fn begin(&mut self, _arb: &mut Arbiter) -> bool { true }
    fn pre_solve(&mut self, _arb: &mut Arbiter) -> bool { true }
    fn post_solve(&mut self, _arb: &Arbiter) {}
    fn separate(&mut self, _arb: &Arbiter) {}
}

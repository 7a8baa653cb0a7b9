use scenephys_core::{BodyId, ConstraintHandle, Vec2};
use scenephys_solver::ConstraintDesc;

use crate::queue::Membership;

pub use scenephys_solver::ConstraintKind as JointKind;

#[derive(Clone, Debug, PartialEq)]
pub struct JointDesc {
    pub kind: JointKind,
    pub body_a: BodyId,
    pub body_b: BodyId,
    /// Body-local anchors.
    pub anchor_a: Vec2,
    pub anchor_b: Vec2,
    /// Whether the two bodies still collide with each other.
    pub collision_enabled: bool,
    pub enabled: bool,
    pub tag: i32,
}

impl JointDesc {
    pub fn new(kind: JointKind, body_a: BodyId, body_b: BodyId) -> Self {
        Self {
            kind, body_a, body_b,
            anchor_a: Vec2::ZERO, anchor_b: Vec2::ZERO,
            collision_enabled: false,
            enabled: true,
            tag: 0,
        }
    }
    pub fn with_anchors(mut self, a: Vec2, b: Vec2) -> Self { self.anchor_a = a; self.anchor_b = b; self }
    pub fn with_collision(mut self, enabled: bool) -> Self { self.collision_enabled = enabled; self }

    pub(crate) fn constraint(&self) -> ConstraintDesc {
        ConstraintDesc { kind: self.kind, anchor_a: self.anchor_a, anchor_b: self.anchor_b }
    }
}

#[derive(Clone, Debug)]
pub struct Joint {
    pub(crate) desc: JointDesc,
    pub(crate) constraint: Option<ConstraintHandle>,
    pub(crate) state: Membership,
    pub(crate) destroy_mark: bool,
}

impl Joint {
    pub(crate) fn new(desc: JointDesc) -> Self {
        Self { desc, constraint: None, state: Membership::NotInWorld, destroy_mark: false }
    }

    #[inline] pub fn desc(&self) -> &JointDesc { &self.desc }
    #[inline] pub fn body_a(&self) -> BodyId { self.desc.body_a }
    #[inline] pub fn body_b(&self) -> BodyId { self.desc.body_b }
    #[inline] pub fn collision_enabled(&self) -> bool { self.desc.collision_enabled }
    #[inline] pub fn is_enabled(&self) -> bool { self.desc.enabled }
    #[inline] pub fn state(&self) -> Membership { self.state }
    /// Set once the solver has materialized the constraint.
    #[inline] pub fn constraint(&self) -> Option<ConstraintHandle> { self.constraint }
    #[inline] pub fn destroy_requested(&self) -> bool { self.destroy_mark }

    #[inline] pub(crate) fn connects(&self, a: BodyId, b: BodyId) -> bool {
        (self.desc.body_a == a && self.desc.body_b == b) || (self.desc.body_a == b && self.desc.body_b == a)
    }
}

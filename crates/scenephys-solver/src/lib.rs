//! The kernel seam. The world drives any [`Solver`]; [`Space`] is the reference one.

pub mod handler;
pub mod query;
pub mod space;

pub use handler::{AcceptAll, Arbiter, CollisionHandler};
pub use query::{PointHit, SegmentHit, ShapeView};
pub use space::{Space, SpaceCounters};

pub use scenephys_articulation::{ConstraintDesc, ConstraintKind};
pub use scenephys_dynamics::{BodyKind, RigidBody, RigidBodyDesc};

use scenephys_core::{ColliderHandle, ConstraintHandle, RigidBodyHandle, Scalar, StepStats, Vec2};
use scenephys_geom::{Aabb, Material, ShapeGeom};

/// Black-box 2D rigid-body kernel.
///
/// Bodies, shapes and constraints are created detached and only take part in
/// stepping between `add_*` and `remove_*`. The world never calls the mutating
/// methods while [`Solver::is_locked`] is true.
pub trait Solver {
    fn gravity(&self) -> Vec2;
    fn set_gravity(&mut self, g: Vec2);
    fn set_iterations(&mut self, n: u32);
    /// True only while `step` runs.
    fn is_locked(&self) -> bool;
    /// Advances by `dt`, reporting contact phases to `handler`.
    fn step(&mut self, dt: Scalar, handler: &mut dyn CollisionHandler) -> StepStats;

    /* ---------- bodies ---------- */
    fn create_body(&mut self, desc: &RigidBodyDesc) -> RigidBodyHandle;
    fn destroy_body(&mut self, h: RigidBodyHandle);
    fn add_body(&mut self, h: RigidBodyHandle);
    fn remove_body(&mut self, h: RigidBodyHandle);
    /// Whether `h` currently takes part in stepping.
    fn contains_body(&self, h: RigidBodyHandle) -> bool;
    fn body(&self, h: RigidBodyHandle) -> Option<&RigidBody>;
    fn body_mut(&mut self, h: RigidBodyHandle) -> Option<&mut RigidBody>;

    /* ---------- shapes ---------- */
    fn create_shape(
        &mut self,
        body: RigidBodyHandle,
        geom: ShapeGeom,
        material: Material,
        sensor: bool,
        user_data: u64,
    ) -> Option<ColliderHandle>;
    fn destroy_shape(&mut self, h: ColliderHandle);
    fn add_shape(&mut self, h: ColliderHandle);
    /// Detaches `h`, firing `separate` for every pair it was touching.
    fn remove_shape(&mut self, h: ColliderHandle, handler: &mut dyn CollisionHandler);
    fn contains_shape(&self, h: ColliderHandle) -> bool;
    fn set_shape_geometry(&mut self, h: ColliderHandle, geom: ShapeGeom);
    fn set_shape_material(&mut self, h: ColliderHandle, material: Material);
    fn set_shape_sensor(&mut self, h: ColliderHandle, sensor: bool);

    /* ---------- constraints ---------- */
    /// `None` when the kernel refuses the constraint (same body, a body not in
    /// the space, or unusable parameters).
    fn create_constraint(&mut self, desc: &ConstraintDesc, a: RigidBodyHandle, b: RigidBodyHandle)
        -> Option<ConstraintHandle>;
    fn destroy_constraint(&mut self, h: ConstraintHandle);
    fn add_constraint(&mut self, h: ConstraintHandle);
    fn remove_constraint(&mut self, h: ConstraintHandle);
    fn contains_constraint(&self, h: ConstraintHandle) -> bool;
    fn set_constraint_enabled(&mut self, h: ConstraintHandle, enabled: bool);
    /// World-space anchor points.
    fn constraint_anchors(&self, h: ConstraintHandle) -> Option<(Vec2, Vec2)>;

    /* ---------- queries ---------- */
    /// Hits nearest first; the callback returns `false` to stop.
    fn segment_query(&self, a: Vec2, b: Vec2, f: &mut dyn FnMut(&SegmentHit) -> bool);
    /// Shapes whose bounding box overlaps `bb`.
    fn bb_query(&self, bb: Aabb, f: &mut dyn FnMut(ColliderHandle, u64) -> bool);
    /// Shapes within `max_distance` of `p` (0 = containing `p`).
    fn point_query(&self, p: Vec2, max_distance: Scalar, f: &mut dyn FnMut(&PointHit) -> bool);
    fn point_query_nearest(&self, p: Vec2, max_distance: Scalar) -> Option<PointHit>;

    /* ---------- debug ---------- */
    fn for_each_shape(&self, f: &mut dyn FnMut(&ShapeView<'_>));
    fn for_each_arbiter(&self, f: &mut dyn FnMut(&Arbiter));
}

//! Physics world coordinator: scene-bound bodies, deferred membership changes,
//! filtered contact events, and fixed or variable stepping over a [`Solver`].

mod body;
mod config;
mod contact;
mod ctx;
mod debug;
mod flush;
mod joint;
mod query;
mod queue;
mod registry;
mod shape;
mod stepping;
mod sync;
mod world;

pub use body::{Body, BodyDesc};
pub use config::WorldConfig;
pub use contact::{
    filter_contact, Contact, ContactData, ContactEvent, ContactListener, EventBus, EventCode, EventDispatcher,
    FilterVerdict, ListenerId, PostSolve, PreSolve,
};
pub use ctx::WorldCtx;
pub use joint::{Joint, JointDesc, JointKind};
pub use query::RayCastInfo;
pub use queue::{Enqueue, Membership, Mutation, MutationQueue};
pub use registry::Registry;
pub use shape::{Shape, ShapeDesc, ShapeFilter};
pub use world::{World, WorldBuilder};

pub use scenephys_core::{
    vec2, BodyId, ContactId, JointId, NodeId, Rect, Scalar, ShapeId, UpdateStage, UpdateStats, Vec2,
};
pub use scenephys_geom::{Material, ShapeGeom};
pub use scenephys_scene::{Scene, SceneGraph};
pub use scenephys_solver::{BodyKind, Solver, Space};
pub use scenephys_viz::{
    Color, DebugDraw, DebugPrim, DebugRecorder, DEBUG_DRAW_ALL, DEBUG_DRAW_CONTACT, DEBUG_DRAW_JOINT, DEBUG_DRAW_NONE, DEBUG_DRAW_SHAPE,
};

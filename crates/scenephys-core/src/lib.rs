pub mod ids;
pub mod types;
pub mod hash;
pub mod schedule;
pub mod time;

pub use ids::{
    BodyId, ShapeId, JointId, NodeId, ContactId,
    RigidBodyHandle, ColliderHandle, ConstraintHandle,
    key_to_user, key_from_user,
};
pub use types::{Scalar, Vec2, Mat2, Affine2, Isometry2, Velocity, Rect, vec2, iso2};
pub use hash::{StepHasher, hash_vec2, hash_f32};
pub use schedule::{UpdateStage, schedule_digest};
pub use time::{StepStats, UpdateStats};

pub mod aabb;
pub mod shape;
pub mod mass;

pub use aabb::Aabb;
pub use shape::{ShapeGeom, RayHit, PointProjection, aabb_of, closest_on_segment};
pub use mass::{MassProps, Material};

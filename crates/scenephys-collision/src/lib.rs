pub mod broad_phase;
pub mod narrow_phase;

pub use broad_phase::pairs_sap;
pub use narrow_phase::{collide, ContactPoint, Manifold};

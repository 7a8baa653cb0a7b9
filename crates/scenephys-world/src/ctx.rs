use scenephys_core::{BodyId, JointId, NodeId, ShapeId};

use crate::body::Body;
use crate::joint::Joint;
use crate::registry::Registry;
use crate::shape::Shape;

/// What a contact listener may touch mid-step: reads, plus membership changes
/// that are queued and applied at the next flush.
pub struct WorldCtx<'a> {
    pub(crate) reg: &'a mut Registry,
}

impl<'a> WorldCtx<'a> {
    pub(crate) fn new(reg: &'a mut Registry) -> Self { Self { reg } }

    #[inline] pub fn body(&self, id: BodyId) -> Option<&Body> { self.reg.body(id) }
    #[inline] pub fn shape(&self, id: ShapeId) -> Option<&Shape> { self.reg.shape(id) }
    #[inline] pub fn joint(&self, id: JointId) -> Option<&Joint> { self.reg.joint(id) }
    #[inline] pub fn bodies(&self) -> &[BodyId] { self.reg.bodies() }
    #[inline] pub fn body_by_tag(&self, tag: i32) -> Option<BodyId> { self.reg.body_by_tag(tag) }
    #[inline] pub fn node_of(&self, body: BodyId) -> Option<NodeId> { self.reg.node_of(body) }

    pub fn add_body(&mut self, id: BodyId) { self.reg.add_body(id); }
    pub fn remove_body(&mut self, id: BodyId) { self.reg.remove_body(id); }
    pub fn destroy_body(&mut self, id: BodyId) { self.reg.destroy_body(id); }
    pub fn add_joint(&mut self, id: JointId) { self.reg.add_joint(id); }
    pub fn remove_joint(&mut self, id: JointId, destroy: bool) { self.reg.remove_joint(id, destroy); }
}

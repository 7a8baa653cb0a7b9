//! Ownership bookkeeping: arenas, owned lists, pending commands and the body/node association table.

use std::collections::BTreeMap;

use log::warn;
use scenephys_core::{key_from_user, BodyId, ColliderHandle, JointId, NodeId, ShapeId};
use slotmap::SlotMap;

use crate::body::Body;
use crate::joint::Joint;
use crate::queue::{Enqueue, Membership, Mutation, MutationQueue};
use crate::shape::Shape;

#[derive(Default)]
pub struct Registry {
    pub(crate) bodies: SlotMap<BodyId, Body>,
    pub(crate) shapes: SlotMap<ShapeId, Shape>,
    pub(crate) joints: SlotMap<JointId, Joint>,
    pub(crate) body_list: Vec<BodyId>,
    pub(crate) joint_list: Vec<JointId>,
    pub(crate) body_queue: MutationQueue<BodyId>,
    pub(crate) joint_queue: MutationQueue<JointId>,
    pub(crate) body_node: BTreeMap<BodyId, NodeId>,
    pub(crate) node_body: BTreeMap<NodeId, BodyId>,
    /// Destroyed bodies the solver has never seen or no longer holds; reaped at the next flush.
    pub(crate) dead: Vec<BodyId>,
}

impl Registry {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            bodies: SlotMap::with_capacity_and_key(cap),
            shapes: SlotMap::with_capacity_and_key(cap),
            body_list: Vec::with_capacity(cap),
            ..Self::default()
        }
    }

    /* ---------- read access ---------- */

    #[inline] pub fn body(&self, id: BodyId) -> Option<&Body> { self.bodies.get(id) }
    #[inline] pub fn shape(&self, id: ShapeId) -> Option<&Shape> { self.shapes.get(id) }
    #[inline] pub fn joint(&self, id: JointId) -> Option<&Joint> { self.joints.get(id) }
    /// Owned bodies in insertion order, including pending adds.
    #[inline] pub fn bodies(&self) -> &[BodyId] { &self.body_list }
    #[inline] pub fn joints(&self) -> &[JointId] { &self.joint_list }
    #[inline] pub fn node_of(&self, body: BodyId) -> Option<NodeId> { self.body_node.get(&body).copied() }
    #[inline] pub fn body_of(&self, node: NodeId) -> Option<BodyId> { self.node_body.get(&node).copied() }

    /// First owned body with `tag`, in owned order.
    pub fn body_by_tag(&self, tag: i32) -> Option<BodyId> {
        self.body_list.iter().copied().find(|b| self.bodies.get(*b).is_some_and(|x| x.tag == tag))
    }

    pub fn bodies_by_tag(&self, tag: i32) -> Vec<BodyId> {
        self.body_list.iter().copied().filter(|b| self.bodies.get(*b).is_some_and(|x| x.tag == tag)).collect()
    }

    /// Maps a kernel shape's user slot back to world ids.
    pub fn resolve_shape(&self, user: u64) -> Option<(ShapeId, BodyId)> {
        let sid: ShapeId = key_from_user(user);
        self.shapes.get(sid).map(|s| (sid, s.body))
    }

    pub(crate) fn shape_by_handle(&self, h: ColliderHandle, user: u64) -> Option<(ShapeId, BodyId)> {
        self.resolve_shape(user).filter(|(s, _)| self.shapes[*s].handle == h)
    }

    /// A joint between `a` and `b` with collisions off vetoes their contacts.
    pub fn joint_blocks_collision(&self, a: BodyId, b: BodyId) -> bool {
        let Some(body) = self.bodies.get(a) else { return false; };
        body.joints.iter()
            .filter_map(|j| self.joints.get(*j))
            .any(|j| j.connects(a, b) && !j.collision_enabled())
    }

    /* ---------- bodies ---------- */

    pub fn add_body(&mut self, id: BodyId) {
        let Some(body) = self.bodies.get_mut(id) else {
            warn!("add_body: {id} is not tracked by this world");
            return;
        };
        if body.destroy_mark {
            warn!("add_body: {id} is scheduled for destruction");
            return;
        }
        match body.state {
            Membership::PendingAdd | Membership::InWorld => return,
            Membership::PendingRemove => {
                // Still in flight when the remove list was already swapped out.
                body.state = match self.body_queue.push(Mutation::Add(id)) {
                    Enqueue::Cancelled => Membership::InWorld,
                    _ => Membership::PendingAdd,
                };
            }
            Membership::NotInWorld => {
                self.body_queue.push(Mutation::Add(id));
                body.state = Membership::PendingAdd;
            }
        }
        self.body_list.push(id);
    }

    pub fn remove_body(&mut self, id: BodyId) {
        let Some(body) = self.bodies.get(id) else {
            warn!("remove_body: {id} is not tracked by this world");
            return;
        };
        match body.state {
            Membership::PendingRemove => return,
            Membership::NotInWorld => panic!("remove_body: {id} is not owned by this world"),
            _ => {}
        }
        for j in body.joints.clone() {
            if self.joints.get(j).is_some_and(|x| x.state.is_owned()) {
                self.remove_joint(j, true);
            }
        }
        self.body_list.retain(|b| *b != id);
        let Some(body) = self.bodies.get_mut(id) else { return; };
        body.state = match self.body_queue.push(Mutation::Remove(id)) {
            Enqueue::Cancelled => Membership::NotInWorld,
            _ => Membership::PendingRemove,
        };
    }

    pub fn remove_body_by_tag(&mut self, tag: i32) {
        match self.body_by_tag(tag) {
            Some(id) => self.remove_body(id),
            None => warn!("remove_body_by_tag: no body tagged {tag}"),
        }
    }

    pub fn remove_all_bodies(&mut self) {
        for id in self.body_list.clone() { self.remove_body(id); }
    }

    /// Removes the body and frees it once the solver has let go of it.
    pub fn destroy_body(&mut self, id: BodyId) {
        let Some(body) = self.bodies.get(id) else {
            warn!("destroy_body: {id} is not tracked by this world");
            return;
        };
        if body.state.is_owned() { self.remove_body(id); }
        let Some(body) = self.bodies.get_mut(id) else { return; };
        if body.destroy_mark { return; }
        body.destroy_mark = true;
        if body.state == Membership::NotInWorld { self.dead.push(id); }
    }

    /* ---------- joints ---------- */

    pub fn add_joint(&mut self, id: JointId) {
        let Some(joint) = self.joints.get_mut(id) else {
            warn!("add_joint: {id} is not tracked by this world");
            return;
        };
        match joint.state {
            Membership::PendingAdd | Membership::InWorld => return,
            Membership::PendingRemove => {
                joint.destroy_mark = false;
                joint.state = match self.joint_queue.push(Mutation::Add(id)) {
                    Enqueue::Cancelled => Membership::InWorld,
                    _ => Membership::PendingAdd,
                };
            }
            Membership::NotInWorld => {
                self.joint_queue.push(Mutation::Add(id));
                joint.state = Membership::PendingAdd;
            }
        }
        self.joint_list.push(id);
        self.link_joint(id);
    }

    /// Takes `id` out of the world; with `destroy` the joint is freed once the solver lets go.
    pub fn remove_joint(&mut self, id: JointId, destroy: bool) {
        let Some(joint) = self.joints.get_mut(id) else {
            warn!("remove_joint: {id} is not tracked by this world");
            return;
        };
        match joint.state {
            Membership::NotInWorld => {
                if destroy { warn!("remove_joint: can't destroy {id}, it is not in this world"); }
                return;
            }
            Membership::PendingRemove => {
                joint.destroy_mark |= destroy;
                return;
            }
            Membership::PendingAdd | Membership::InWorld => {}
        }
        joint.destroy_mark = destroy;
        joint.state = match self.joint_queue.push(Mutation::Remove(id)) {
            Enqueue::Cancelled => Membership::NotInWorld,
            _ => Membership::PendingRemove,
        };
        let never_materialized = joint.state == Membership::NotInWorld;
        self.joint_list.retain(|j| *j != id);
        if never_materialized {
            self.unlink_joint(id);
            if destroy { self.joints.remove(id); }
        }
    }

    pub fn remove_all_joints(&mut self, destroy: bool) {
        for id in self.joint_list.clone() { self.remove_joint(id, destroy); }
    }

    pub(crate) fn link_joint(&mut self, id: JointId) {
        let Some(joint) = self.joints.get(id) else { return; };
        for b in [joint.desc.body_a, joint.desc.body_b] {
            if let Some(body) = self.bodies.get_mut(b) {
                if !body.joints.contains(&id) { body.joints.push(id); }
            }
        }
    }

    pub(crate) fn unlink_joint(&mut self, id: JointId) {
        let Some(joint) = self.joints.get(id) else { return; };
        for b in [joint.desc.body_a, joint.desc.body_b] {
            if let Some(body) = self.bodies.get_mut(b) { body.joints.retain(|j| *j != id); }
        }
    }

    /// Drops every trace of a joint the solver does not hold.
    pub(crate) fn forget_joint(&mut self, id: JointId) {
        self.unlink_joint(id);
        self.joint_queue.purge(id);
        self.joint_list.retain(|j| *j != id);
        self.joints.remove(id);
    }

    /* ---------- body/node association ---------- */

    pub(crate) fn link_node(&mut self, body: BodyId, node: NodeId) {
        self.unlink_body(body);
        if let Some(prev) = self.node_body.insert(node, body) { self.body_node.remove(&prev); }
        self.body_node.insert(body, node);
    }

    pub(crate) fn unlink_body(&mut self, body: BodyId) -> Option<NodeId> {
        let node = self.body_node.remove(&body)?;
        self.node_body.remove(&node);
        Some(node)
    }
}

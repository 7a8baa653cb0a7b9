//! Applies queued membership changes once the solver is unlocked.

use log::{debug, trace};
use scenephys_core::{BodyId, ContactId, JointId};
use scenephys_solver::Solver;
use slotmap::SlotMap;

use crate::contact::{Contact, Dispatcher, EventDispatcher};
use crate::queue::Membership;
use crate::registry::Registry;

/// Registers pending bodies with their shapes, then detaches pending removes
/// (shapes first) and reaps destroyed bodies. Returns the number of commands applied.
pub(crate) fn flush_bodies<S: Solver>(
    solver: &mut S,
    reg: &mut Registry,
    contacts: &mut SlotMap<ContactId, Contact>,
    events: &mut EventDispatcher,
) -> usize {
    if solver.is_locked() { return 0; }

    let adds = reg.body_queue.take_adds();
    for &id in &adds {
        let Some(body) = reg.bodies.get_mut(id) else { continue; };
        if body.state != Membership::PendingAdd { continue; }
        body.state = Membership::InWorld;
        solver.add_body(body.handle);
        for s in &body.shapes {
            if let Some(shape) = reg.shapes.get(*s) { solver.add_shape(shape.handle); }
        }
    }

    let removes = reg.body_queue.take_removes();
    for &id in &removes {
        let Some(body) = reg.bodies.get(id) else { continue; };
        let handle = body.handle;
        let shapes: Vec<_> = body.shapes.iter().filter_map(|s| reg.shapes.get(*s)).map(|s| s.handle).collect();
        for h in shapes {
            let mut dispatcher = Dispatcher { reg: &mut *reg, contacts: &mut *contacts, events: &mut *events };
            solver.remove_shape(h, &mut dispatcher);
        }
        solver.remove_body(handle);
        let Some(body) = reg.bodies.get_mut(id) else { continue; };
        // A listener may have re-added it while its shapes were coming out.
        if body.state == Membership::PendingRemove { body.state = Membership::NotInWorld; }
        if body.destroy_mark && body.state == Membership::NotInWorld { free_body(solver, reg, id); }
    }

    for id in std::mem::take(&mut reg.dead) {
        if reg.bodies.get(id).is_some_and(|b| b.state == Membership::NotInWorld) { free_body(solver, reg, id); }
    }

    let applied = adds.len() + removes.len();
    if applied > 0 { trace!("flushed {} body adds, {} body removes", adds.len(), removes.len()); }
    applied
}

/// Materializes pending joints and tears down removed ones. Must run after [`flush_bodies`].
pub(crate) fn flush_joints<S: Solver>(solver: &mut S, reg: &mut Registry) -> usize {
    if solver.is_locked() { return 0; }

    let adds = reg.joint_queue.take_adds();
    for &id in &adds {
        let Some(joint) = reg.joints.get(id) else { continue; };
        if joint.state != Membership::PendingAdd { continue; }
        let handles = (
            reg.bodies.get(joint.desc.body_a).map(|b| b.handle),
            reg.bodies.get(joint.desc.body_b).map(|b| b.handle),
        );
        let made = match handles {
            (Some(a), Some(b)) => solver.create_constraint(&joint.desc.constraint(), a, b),
            _ => None,
        };
        let Some(c) = made else {
            debug!("joint {id} could not be materialized, dropping it");
            reg.forget_joint(id);
            continue;
        };
        solver.add_constraint(c);
        solver.set_constraint_enabled(c, joint.desc.enabled);
        let joint = &mut reg.joints[id];
        joint.constraint = Some(c);
        joint.state = Membership::InWorld;
        reg.link_joint(id);
    }

    let removes = reg.joint_queue.take_removes();
    for &id in &removes {
        reg.unlink_joint(id);
        let Some(joint) = reg.joints.get_mut(id) else { continue; };
        if let Some(c) = joint.constraint.take() {
            solver.remove_constraint(c);
            solver.destroy_constraint(c);
        }
        if joint.state == Membership::PendingRemove { joint.state = Membership::NotInWorld; }
        if joint.destroy_mark && joint.state == Membership::NotInWorld { reg.joints.remove(id); }
    }

    let applied = adds.len() + removes.len();
    if applied > 0 { trace!("flushed {} joint adds, {} joint removes", adds.len(), removes.len()); }
    applied
}

/// Frees a body the solver no longer steps, with its shapes and every joint still linked to it.
pub(crate) fn free_body<S: Solver>(solver: &mut S, reg: &mut Registry, id: BodyId) {
    let Some(body) = reg.bodies.remove(id) else { return; };
    for j in &body.joints { free_joint(solver, reg, *j); }
    for s in &body.shapes {
        if let Some(shape) = reg.shapes.remove(*s) { solver.destroy_shape(shape.handle); }
    }
    solver.destroy_body(body.handle);
    reg.body_queue.purge(id);
    reg.body_list.retain(|b| *b != id);
    reg.unlink_body(id);
}

fn free_joint<S: Solver>(solver: &mut S, reg: &mut Registry, id: JointId) {
    let constraint = reg.joints.get(id).and_then(|j| j.constraint);
    reg.forget_joint(id);
    if let Some(c) = constraint {
        solver.remove_constraint(c);
        solver.destroy_constraint(c);
    }
}

//! Node <-> body transform exchange around each physics update.

use scenephys_core::{Affine2, BodyId, NodeId, Scalar, Vec2};
use scenephys_scene::SceneGraph;
use scenephys_solver::Solver;

use crate::body::refresh_mass;
use crate::registry::Registry;

/// Cumulative transform of a node's parent chain.
#[derive(Copy, Clone, Debug)]
struct Parent {
    world: Affine2,
    scale: Vec2,
    rotation: Scalar,
}

/// Drops associations whose body or node is gone.
pub(crate) fn prune_links<G: SceneGraph>(scene: &G, reg: &mut Registry) {
    let stale: Vec<BodyId> = reg.body_node.iter()
        .filter(|(b, n)| !reg.bodies.contains_key(**b) || !scene.contains(**n))
        .map(|(b, _)| *b)
        .collect();
    for b in stale { reg.unlink_body(b); }
}

/// Pushes node transforms into their bodies, pre-order from the root.
/// Returns the root's transform, which [`after_simulation`] must reuse.
pub(crate) fn before_simulation<G: SceneGraph, S: Solver>(scene: &G, solver: &mut S, reg: &mut Registry) -> Affine2 {
    prune_links(scene, reg);
    let root = scene.root();
    let scene_to_world = scene.node_to_parent_transform(root);
    let top = Parent {
        world: scene_to_world,
        scale: Vec2::new(scene.scale_x(root), scene.scale_y(root)),
        rotation: scene.rotation(root),
    };
    if let Some(body) = reg.body_of(root) { push_body(solver, reg, body, &top); }
    for &child in scene.children(root) { push_node(scene, solver, reg, child, top); }
    scene_to_world
}

fn push_node<G: SceneGraph, S: Solver>(scene: &G, solver: &mut S, reg: &mut Registry, node: NodeId, parent: Parent) {
    let here = Parent {
        world: parent.world * scene.node_to_parent_transform(node),
        scale: parent.scale * Vec2::new(scene.scale_x(node), scene.scale_y(node)),
        rotation: parent.rotation + scene.rotation(node),
    };
    if let Some(body) = reg.body_of(node) { push_body(solver, reg, body, &here); }
    for &child in scene.children(node) { push_node(scene, solver, reg, child, here); }
}

fn push_body<S: Solver>(solver: &mut S, reg: &mut Registry, id: BodyId, node: &Parent) {
    let Some(body) = reg.bodies.get_mut(id) else { return; };
    if !body.state.is_owned() { return; }
    let handle = body.handle;

    if node.rotation != body.sync.rotation {
        body.sync.rotation = node.rotation;
        body.sync.angle = node.rotation + body.rotation_offset;
        if let Some(rb) = solver.body_mut(handle) { rb.pose.rot = body.sync.angle; }
    }

    let pos = node.world.transform_point2(body.position_offset);
    if pos != body.sync.position {
        body.sync.position = pos;
        if let Some(rb) = solver.body_mut(handle) { rb.pose.pos = pos; }
    }

    if node.scale != body.sync.scale {
        body.sync.scale = node.scale;
        for s in &body.shapes {
            if let Some(shape) = reg.shapes.get(*s) { solver.set_shape_geometry(shape.handle, shape.geom.scaled(node.scale)); }
        }
        refresh_mass(reg, solver, id);
    }
}

/// Pulls body transforms back into node-local position and rotation, in the same order as the push.
pub(crate) fn after_simulation<G: SceneGraph, S: Solver>(
    scene: &mut G,
    solver: &S,
    reg: &mut Registry,
    scene_to_world: Affine2,
) {
    let root = scene.root();
    let top_rotation = scene.rotation(root);
    if let Some(body) = reg.body_of(root) { pull_body(scene, solver, reg, body, root, Affine2::IDENTITY, 0.0); }
    for child in scene.children(root).to_vec() { pull_node(scene, solver, reg, child, scene_to_world, top_rotation); }
}

fn pull_node<G: SceneGraph, S: Solver>(
    scene: &mut G,
    solver: &S,
    reg: &mut Registry,
    node: NodeId,
    parent_world: Affine2,
    parent_rotation: Scalar,
) {
    if let Some(body) = reg.body_of(node) { pull_body(scene, solver, reg, body, node, parent_world, parent_rotation); }
    let world = parent_world * scene.node_to_parent_transform(node);
    let rotation = parent_rotation + scene.rotation(node);
    for child in scene.children(node).to_vec() { pull_node(scene, solver, reg, child, world, rotation); }
}

fn pull_body<G: SceneGraph, S: Solver>(
    scene: &mut G,
    solver: &S,
    reg: &mut Registry,
    id: BodyId,
    node: NodeId,
    parent_world: Affine2,
    parent_rotation: Scalar,
) {
    let Some(body) = reg.bodies.get_mut(id) else { return; };
    if !body.state.in_solver() { return; }
    let Some(pose) = solver.body(body.handle).map(|rb| rb.pose) else { return; };

    if pose.rot != body.sync.angle {
        body.sync.angle = pose.rot;
        body.sync.rotation = pose.rot - body.rotation_offset;
        scene.set_rotation(node, body.sync.rotation - parent_rotation);
    }

    if pose.pos != body.sync.position {
        body.sync.position = pose.pos;
        let local_scale = Vec2::new(scene.scale_x(node), scene.scale_y(node));
        let offset = Vec2::from_angle(scene.rotation(node)).rotate(local_scale * body.position_offset);
        let local = parent_world.inverse().transform_point2(pose.pos) - offset;
        scene.set_position(node, local);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{Body, BodyDesc};
    use crate::queue::Membership;
    use approx::assert_relative_eq;
    use scenephys_scene::Scene;
    use scenephys_solver::{RigidBodyDesc, Space};

    fn rig(scene: &mut Scene, offset: Vec2) -> (Space, Registry, BodyId, NodeId) {
        let mut space = Space::default();
        let mut reg = Registry::default();
        let parent = scene.create_node(scene.root(), "arm", Vec2::new(10.0, 0.0)).unwrap();
        scene.node_mut(parent).unwrap().rotation = std::f32::consts::FRAC_PI_2;
        let node = scene.create_node(parent, "hand", Vec2::new(2.0, 0.0)).unwrap();
        let handle = space.create_body(&RigidBodyDesc::default());
        space.add_body(handle);
        let desc = BodyDesc { position_offset: offset, ..BodyDesc::dynamic() };
        let id = reg.bodies.insert(Body::new(handle, &desc));
        reg.bodies[id].state = Membership::InWorld;
        reg.bodies[id].sync.reset();
        reg.link_node(id, node);
        (space, reg, id, node)
    }

    #[test]
    fn push_places_body_at_node_world_position() {
        let mut scene = Scene::new();
        let (mut space, mut reg, id, _) = rig(&mut scene, Vec2::ZERO);
        before_simulation(&scene, &mut space, &mut reg);
        let pose = space.body(reg.bodies[id].handle).unwrap().pose;
        assert_relative_eq!(pose.pos.x, 10.0, epsilon = 1e-5);
        assert_relative_eq!(pose.pos.y, 2.0, epsilon = 1e-5);
        assert_relative_eq!(pose.rot, std::f32::consts::FRAC_PI_2, epsilon = 1e-6);
    }

    #[test]
    fn pull_inverts_push_through_parent_and_offset() {
        let mut scene = Scene::new();
        let (mut space, mut reg, id, node) = rig(&mut scene, Vec2::new(1.0, 0.0));
        let s2w = before_simulation(&scene, &mut space, &mut reg);
        let handle = reg.bodies[id].handle;
        let moved = Vec2::new(7.0, 4.0);
        space.body_mut(handle).unwrap().pose.pos = moved;
        space.body_mut(handle).unwrap().pose.rot = 0.0;
        after_simulation(&mut scene, &space, &mut reg, s2w);

        assert_relative_eq!(scene.node(node).unwrap().rotation, -std::f32::consts::FRAC_PI_2, epsilon = 1e-6);
        let at = scene.world_transform(node).transform_point2(Vec2::new(1.0, 0.0));
        assert_relative_eq!(at.x, moved.x, epsilon = 1e-4);
        assert_relative_eq!(at.y, moved.y, epsilon = 1e-4);
    }

    #[test]
    fn stale_links_are_pruned() {
        let mut scene = Scene::new();
        let (mut space, mut reg, id, node) = rig(&mut scene, Vec2::ZERO);
        scene.destroy_node(node);
        before_simulation(&scene, &mut space, &mut reg);
        assert_eq!(reg.node_of(id), None);
        assert_eq!(reg.body_of(node), None);
    }
}

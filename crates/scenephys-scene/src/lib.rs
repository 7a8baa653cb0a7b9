use log::warn;
use scenephys_core::{Affine2, NodeId, Scalar, Vec2};
use slotmap::SlotMap;

/// What the physics world needs from a render tree.
///
/// Rotations are radians, counter-clockwise. Local transforms are
/// translate * rotate * scale, with no skew.
pub trait SceneGraph {
    fn root(&self) -> NodeId;
    fn contains(&self, node: NodeId) -> bool;
    fn node_to_parent_transform(&self, node: NodeId) -> Affine2;
    fn scale_x(&self, node: NodeId) -> Scalar;
    fn scale_y(&self, node: NodeId) -> Scalar;
    fn rotation(&self, node: NodeId) -> Scalar;
    fn children(&self, node: NodeId) -> &[NodeId];
    fn set_position(&mut self, node: NodeId, local: Vec2);
    fn set_rotation(&mut self, node: NodeId, local: Scalar);
}

#[derive(Clone, Debug)]
pub struct Node {
    pub name: String,
    pub position: Vec2,
    pub rotation: Scalar,
    pub scale: Vec2,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(name: &str, position: Vec2) -> Self {
        Self { name: name.to_owned(), position, rotation: 0.0, scale: Vec2::ONE, parent: None, children: Vec::new() }
    }
    #[inline] pub fn parent(&self) -> Option<NodeId> { self.parent }
    #[inline] pub fn local_transform(&self) -> Affine2 {
        Affine2::from_scale_angle_translation(self.scale, self.rotation, self.position)
    }
}

/// Generational node arena with a single root.
pub struct Scene {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
}

impl Default for Scene {
    fn default() -> Self { Self::new() }
}

impl Scene {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new("root", Vec2::ZERO));
        Self { nodes, root }
    }

    #[inline] pub fn len(&self) -> usize { self.nodes.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.nodes.is_empty() }
    #[inline] pub fn node(&self, id: NodeId) -> Option<&Node> { self.nodes.get(id) }
    #[inline] pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> { self.nodes.get_mut(id) }

    /// New node under `parent`; `None` when the parent is gone.
    pub fn create_node(&mut self, parent: NodeId, name: &str, position: Vec2) -> Option<NodeId> {
        if !self.nodes.contains_key(parent) {
            warn!("create_node: parent {parent} does not exist");
            return None;
        }
        let id = self.nodes.insert(Node { parent: Some(parent), ..Node::new(name, position) });
        self.nodes[parent].children.push(id);
        Some(id)
    }

    /// Removes `id` and its whole subtree. The root cannot be destroyed.
    pub fn destroy_node(&mut self, id: NodeId) {
        if id == self.root || !self.nodes.contains_key(id) { return; }
        if let Some(p) = self.nodes[id].parent {
            if let Some(parent) = self.nodes.get_mut(p) { parent.children.retain(|c| *c != id); }
        }
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            if let Some(node) = self.nodes.remove(n) { stack.extend(node.children); }
        }
    }

    /// Moves `id` under `new_parent`, keeping its local transform. Refuses cycles.
    pub fn reparent(&mut self, id: NodeId, new_parent: NodeId) -> bool {
        if id == self.root || !self.nodes.contains_key(id) || !self.nodes.contains_key(new_parent) { return false; }
        let mut cursor = Some(new_parent);
        while let Some(c) = cursor {
            if c == id { return false; }
            cursor = self.nodes[c].parent;
        }
        if let Some(old) = self.nodes[id].parent {
            if let Some(parent) = self.nodes.get_mut(old) { parent.children.retain(|c| *c != id); }
        }
        self.nodes[id].parent = Some(new_parent);
        self.nodes[new_parent].children.push(id);
        true
    }

    pub fn set_scale(&mut self, id: NodeId, scale: Vec2) {
        if let Some(n) = self.nodes.get_mut(id) { n.scale = scale; }
    }

    /// Product of local transforms from the root down to `id`.
    pub fn world_transform(&self, id: NodeId) -> Affine2 {
        let mut xf = Affine2::IDENTITY;
        let mut cursor = Some(id);
        while let Some(c) = cursor {
            let Some(n) = self.nodes.get(c) else { break; };
            xf = n.local_transform() * xf;
            cursor = n.parent;
        }
        xf
    }

    #[inline] pub fn world_position(&self, id: NodeId) -> Vec2 { self.world_transform(id).translation }
}

impl SceneGraph for Scene {
    #[inline] fn root(&self) -> NodeId { self.root }
    #[inline] fn contains(&self, node: NodeId) -> bool { self.nodes.contains_key(node) }
    fn node_to_parent_transform(&self, node: NodeId) -> Affine2 {
        self.nodes.get(node).map_or(Affine2::IDENTITY, Node::local_transform)
    }
    fn scale_x(&self, node: NodeId) -> Scalar { self.nodes.get(node).map_or(1.0, |n| n.scale.x) }
    fn scale_y(&self, node: NodeId) -> Scalar { self.nodes.get(node).map_or(1.0, |n| n.scale.y) }
    fn rotation(&self, node: NodeId) -> Scalar { self.nodes.get(node).map_or(0.0, |n| n.rotation) }
    fn children(&self, node: NodeId) -> &[NodeId] {
        match self.nodes.get(node) {
            Some(n) => &n.children,
            None => &[],
        }
    }
    fn set_position(&mut self, node: NodeId, local: Vec2) {
        if let Some(n) = self.nodes.get_mut(node) { n.position = local; }
    }
    fn set_rotation(&mut self, node: NodeId, local: Scalar) {
        if let Some(n) = self.nodes.get_mut(node) { n.rotation = local; }
    }
}

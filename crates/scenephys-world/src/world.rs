use log::warn;
use scenephys_core::{
    hash_f32, hash_vec2, iso2, key_to_user, BodyId, ColliderHandle, ContactId, JointId, NodeId, Scalar, ShapeId,
    StepHasher, UpdateStage, Vec2, Velocity,
};
use scenephys_geom::Material;
use scenephys_solver::{BodyKind, RigidBody, RigidBodyDesc, Solver, Space};
use scenephys_viz::{DebugDraw, ScheduleRecorder};
use slotmap::SlotMap;

use crate::body::{refresh_mass, Body, BodyDesc};
use crate::config::WorldConfig;
use crate::contact::{Contact, ContactListener, Dispatcher, EventBus, EventDispatcher, ListenerId};
use crate::flush;
use crate::joint::{Joint, JointDesc};
use crate::queue::Membership;
use crate::registry::Registry;
use crate::shape::{Shape, ShapeDesc, ShapeFilter};

/// Owns bodies, shapes and joints bound to scene nodes, and advances them with a [`Solver`].
///
/// Membership changes are deferred: `add_body`/`remove_body` and the joint
/// equivalents are queued and applied at the start of the next
/// [`update`](World::update), or before any query.
pub struct World<S: Solver = Space> {
    pub(crate) solver: S,
    pub(crate) reg: Registry,
    pub(crate) contacts: SlotMap<ContactId, Contact>,
    pub(crate) events: EventDispatcher,
    pub(crate) config: WorldConfig,
    /// Unsimulated time, in seconds.
    pub(crate) accumulator: f64,
    pub(crate) update_count: u32,
    pub(crate) debug_draw: Option<Box<dyn DebugDraw>>,
    pub(crate) schedule: ScheduleRecorder,
}

impl Default for World<Space> {
    fn default() -> Self { Self::new(WorldConfig::default()) }
}

impl World<Space> {
    pub fn new(config: WorldConfig) -> Self { Self::with_solver(Space::default(), config) }
}

impl<S: Solver> World<S> {
    pub fn with_solver(solver: S, config: WorldConfig) -> Self {
        Self::from_parts(solver, Registry::default(), config)
    }

    fn from_parts(mut solver: S, reg: Registry, config: WorldConfig) -> Self {
        solver.set_gravity(config.gravity_vec());
        solver.set_iterations(config.iterations);
        Self {
            solver,
            reg,
            contacts: SlotMap::with_key(),
            events: EventDispatcher::default(),
            config,
            accumulator: 0.0,
            update_count: 0,
            debug_draw: None,
            schedule: ScheduleRecorder::new(),
        }
    }

    /* ---------- configuration ---------- */

    #[inline] pub fn config(&self) -> &WorldConfig { &self.config }

    /// Re-applies a whole config. Pending time is kept.
    pub fn apply_config(&mut self, config: WorldConfig) -> anyhow::Result<()> {
        config.validate()?;
        self.solver.set_gravity(config.gravity_vec());
        self.solver.set_iterations(config.iterations);
        self.config = config;
        Ok(())
    }

    #[inline] pub fn gravity(&self) -> Vec2 { self.solver.gravity() }
    pub fn set_gravity(&mut self, g: Vec2) {
        self.config.gravity = g.to_array();
        self.solver.set_gravity(g);
    }

    #[inline] pub fn speed(&self) -> Scalar { self.config.speed }
    pub fn set_speed(&mut self, speed: Scalar) {
        if speed.is_finite() && speed >= 0.0 { self.config.speed = speed; }
        else { warn!("set_speed: ignoring {speed}"); }
    }

    /// Steps per second; 0 switches to variable stepping.
    pub fn set_fixed_rate(&mut self, rate: u32) {
        self.config.fixed_rate = rate;
        self.accumulator = 0.0;
    }
    pub fn set_update_rate(&mut self, rate: u32) { self.config.update_rate = rate.max(1); }
    pub fn set_substeps(&mut self, n: u32) { self.config.substeps = n.max(1); }
    pub fn set_iterations(&mut self, n: u32) {
        self.config.iterations = n.max(1);
        self.solver.set_iterations(self.config.iterations);
    }
    #[inline] pub fn is_auto_step(&self) -> bool { self.config.auto_step }
    pub fn set_auto_step(&mut self, auto: bool) { self.config.auto_step = auto; }

    #[inline] pub fn debug_draw_mask(&self) -> u32 { self.config.debug_draw_mask }
    pub fn set_debug_draw_mask(&mut self, mask: u32) { self.config.debug_draw_mask = mask; }
    /// Renderer used by the debug-draw pass at the end of each update.
    pub fn set_debug_renderer(&mut self, renderer: Option<Box<dyn DebugDraw>>) { self.debug_draw = renderer; }

    /* ---------- listeners ---------- */

    pub fn add_contact_listener(&mut self, listener: ContactListener) -> ListenerId { self.events.add(Box::new(listener)) }
    pub fn add_event_bus(&mut self, bus: Box<dyn EventBus>) -> ListenerId { self.events.add(bus) }
    pub fn remove_listener(&mut self, id: ListenerId) -> bool { self.events.remove(id) }

    /* ---------- bodies ---------- */

    /// Creates a detached body; it joins the simulation after [`add_body`](Self::add_body) and a flush.
    pub fn create_body(&mut self, desc: &BodyDesc) -> BodyId {
        let handle = self.solver.create_body(&RigidBodyDesc {
            kind: desc.kind,
            pose: iso2(desc.position, desc.angle),
            vel: Velocity { lin: desc.velocity, ang: desc.angular_velocity },
            mass: desc.mass.unwrap_or(1.0),
            moment: if desc.rotation_enabled { desc.moment.unwrap_or(1.0) } else { Scalar::INFINITY },
            gravity_enabled: desc.gravity_enabled,
        });
        self.reg.bodies.insert(Body::new(handle, desc))
    }

    pub fn add_body(&mut self, id: BodyId) { self.reg.add_body(id); }
    pub fn remove_body(&mut self, id: BodyId) { self.reg.remove_body(id); }
    pub fn remove_body_by_tag(&mut self, tag: i32) { self.reg.remove_body_by_tag(tag); }
    pub fn remove_all_bodies(&mut self) { self.reg.remove_all_bodies(); }

    /// Removes the body if needed and frees it with its shapes and joints.
    /// Bodies still held by the solver are freed at the next flush.
    pub fn destroy_body(&mut self, id: BodyId) {
        self.reg.destroy_body(id);
        if self.reg.bodies.get(id).is_some_and(|b| b.state == Membership::NotInWorld) {
            self.reg.dead.retain(|b| *b != id);
            flush::free_body(&mut self.solver, &mut self.reg, id);
        }
    }

    #[inline] pub fn body(&self, id: BodyId) -> Option<&Body> { self.reg.body(id) }
    /// Owned bodies in insertion order, pending adds included.
    #[inline] pub fn bodies(&self) -> &[BodyId] { self.reg.bodies() }
    #[inline] pub fn body_by_tag(&self, tag: i32) -> Option<BodyId> { self.reg.body_by_tag(tag) }
    #[inline] pub fn bodies_by_tag(&self, tag: i32) -> Vec<BodyId> { self.reg.bodies_by_tag(tag) }
    #[inline] pub fn pending_body_adds(&self) -> &[BodyId] { self.reg.body_queue.pending_adds() }
    #[inline] pub fn pending_body_removes(&self) -> &[BodyId] { self.reg.body_queue.pending_removes() }
    #[inline] pub fn pending_joint_adds(&self) -> &[JointId] { self.reg.joint_queue.pending_adds() }
    #[inline] pub fn pending_joint_removes(&self) -> &[JointId] { self.reg.joint_queue.pending_removes() }

    /// Kernel-side state of a body.
    pub fn rigid_body(&self, id: BodyId) -> Option<&RigidBody> {
        self.solver.body(self.reg.bodies.get(id)?.handle)
    }

    fn rigid_body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        let handle = self.reg.bodies.get(id)?.handle;
        self.solver.body_mut(handle)
    }

    #[inline] pub fn position(&self, id: BodyId) -> Option<Vec2> { self.rigid_body(id).map(|b| b.pose.pos) }
    #[inline] pub fn angle(&self, id: BodyId) -> Option<Scalar> { self.rigid_body(id).map(|b| b.pose.rot) }
    #[inline] pub fn velocity(&self, id: BodyId) -> Option<Vec2> { self.rigid_body(id).map(|b| b.vel.lin) }
    #[inline] pub fn angular_velocity(&self, id: BodyId) -> Option<Scalar> { self.rigid_body(id).map(|b| b.vel.ang) }
    #[inline] pub fn body_kind(&self, id: BodyId) -> Option<BodyKind> { self.rigid_body(id).map(|b| b.kind) }
    #[inline] pub fn mass(&self, id: BodyId) -> Option<Scalar> { self.rigid_body(id).map(|b| b.mass.mass) }
    #[inline] pub fn moment(&self, id: BodyId) -> Option<Scalar> { self.rigid_body(id).map(|b| b.mass.moment) }

    /// Moves the body; an attached node follows after the next update.
    pub fn set_position(&mut self, id: BodyId, p: Vec2) {
        if let Some(rb) = self.rigid_body_mut(id) { rb.pose.pos = p; }
    }
    pub fn set_angle(&mut self, id: BodyId, angle: Scalar) {
        if let Some(rb) = self.rigid_body_mut(id) { rb.pose.rot = angle; }
    }
    pub fn set_velocity(&mut self, id: BodyId, v: Vec2) {
        if let Some(rb) = self.rigid_body_mut(id) { rb.vel.lin = v; }
    }
    pub fn set_angular_velocity(&mut self, id: BodyId, w: Scalar) {
        if let Some(rb) = self.rigid_body_mut(id) { rb.vel.ang = w; }
    }
    pub fn set_gravity_enabled(&mut self, id: BodyId, enabled: bool) {
        if let Some(rb) = self.rigid_body_mut(id) { rb.gravity_enabled = enabled; }
    }

    /// Impulse at a world point; `None` applies it at the body origin.
    pub fn apply_impulse(&mut self, id: BodyId, impulse: Vec2, at: Option<Vec2>) {
        if let Some(rb) = self.rigid_body_mut(id) {
            let at = at.unwrap_or(rb.pose.pos);
            rb.apply_impulse(impulse, at);
        }
    }

    /// Force consumed by the next solver step.
    pub fn apply_force(&mut self, id: BodyId, force: Vec2, at: Option<Vec2>) {
        if let Some(rb) = self.rigid_body_mut(id) {
            let at = at.unwrap_or(rb.pose.pos);
            rb.apply_force(force, at);
        }
    }

    pub fn set_body_kind(&mut self, id: BodyId, kind: BodyKind) {
        let Some(rb) = self.rigid_body_mut(id) else { return; };
        rb.kind = kind;
        if kind == BodyKind::Static { rb.vel = Velocity::default(); }
        refresh_mass(&self.reg, &mut self.solver, id);
    }

    /// Explicit mass; `None` goes back to deriving it from the shapes.
    pub fn set_mass(&mut self, id: BodyId, mass: Option<Scalar>) {
        let Some(body) = self.reg.bodies.get_mut(id) else { return; };
        body.mass = mass;
        refresh_mass(&self.reg, &mut self.solver, id);
    }

    pub fn set_moment(&mut self, id: BodyId, moment: Option<Scalar>) {
        let Some(body) = self.reg.bodies.get_mut(id) else { return; };
        body.moment = moment;
        refresh_mass(&self.reg, &mut self.solver, id);
    }

    pub fn set_rotation_enabled(&mut self, id: BodyId, enabled: bool) {
        let Some(body) = self.reg.bodies.get_mut(id) else { return; };
        body.rotation_enabled = enabled;
        refresh_mass(&self.reg, &mut self.solver, id);
        if !enabled {
            if let Some(rb) = self.rigid_body_mut(id) { rb.vel.ang = 0.0; }
        }
    }

    /// Damping and limits, applied after every solver step.
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> { self.reg.bodies.get_mut(id) }

    fn for_each_filter(&mut self, id: BodyId, f: impl Fn(&mut ShapeFilter)) {
        let Some(body) = self.reg.bodies.get(id) else { return; };
        for s in &body.shapes {
            if let Some(shape) = self.reg.shapes.get_mut(*s) { f(&mut shape.filter); }
        }
    }

    pub fn set_category_bitmask(&mut self, id: BodyId, bits: u32) { self.for_each_filter(id, |f| f.category = bits); }
    pub fn set_collision_bitmask(&mut self, id: BodyId, bits: u32) { self.for_each_filter(id, |f| f.collision = bits); }
    pub fn set_contact_test_bitmask(&mut self, id: BodyId, bits: u32) { self.for_each_filter(id, |f| f.contact_test = bits); }
    pub fn set_group(&mut self, id: BodyId, group: i32) { self.for_each_filter(id, |f| f.group = group); }

    /* ---------- shapes ---------- */

    /// Attaches a shape. It is registered at once if the body is already
    /// simulated, otherwise when the body is flushed in.
    pub fn add_shape(&mut self, body: BodyId, desc: ShapeDesc) -> Option<ShapeId> {
        let Some(owner) = self.reg.bodies.get(body) else {
            warn!("add_shape: {body} is not tracked by this world");
            return None;
        };
        let (handle, scale, live) = (owner.handle, owner.sync.scale, owner.state == Membership::InWorld);
        let id = self.reg.shapes.insert(Shape {
            handle: ColliderHandle::default(),
            body,
            geom: desc.geom,
            material: desc.material,
            sensor: desc.sensor,
            filter: desc.filter,
            tag: desc.tag,
        });
        let shape = &mut self.reg.shapes[id];
        let Some(h) = self.solver.create_shape(handle, shape.geom.scaled(scale), shape.material, shape.sensor, key_to_user(id)) else {
            self.reg.shapes.remove(id);
            return None;
        };
        shape.handle = h;
        if live { self.solver.add_shape(h); }
        if let Some(owner) = self.reg.bodies.get_mut(body) { owner.shapes.push(id); }
        refresh_mass(&self.reg, &mut self.solver, body);
        Some(id)
    }

    /// Detaches and frees a shape; live contacts on it get their Separate.
    pub fn remove_shape(&mut self, id: ShapeId) {
        let Some(shape) = self.reg.shapes.get(id) else {
            warn!("remove_shape: {id} is not tracked by this world");
            return;
        };
        let (h, body) = (shape.handle, shape.body);
        let mut dispatcher = Dispatcher { reg: &mut self.reg, contacts: &mut self.contacts, events: &mut self.events };
        self.solver.remove_shape(h, &mut dispatcher);
        self.solver.destroy_shape(h);
        self.reg.shapes.remove(id);
        if let Some(owner) = self.reg.bodies.get_mut(body) { owner.shapes.retain(|s| *s != id); }
        refresh_mass(&self.reg, &mut self.solver, body);
    }

    #[inline] pub fn shape(&self, id: ShapeId) -> Option<&Shape> { self.reg.shape(id) }

    /// Takes effect for pairs that begin touching afterwards.
    pub fn set_shape_filter(&mut self, id: ShapeId, filter: ShapeFilter) {
        if let Some(shape) = self.reg.shapes.get_mut(id) { shape.filter = filter; }
    }

    pub fn set_shape_sensor(&mut self, id: ShapeId, sensor: bool) {
        let Some(shape) = self.reg.shapes.get_mut(id) else { return; };
        shape.sensor = sensor;
        self.solver.set_shape_sensor(shape.handle, sensor);
    }

    pub fn set_shape_material(&mut self, id: ShapeId, material: Material) {
        let Some(shape) = self.reg.shapes.get_mut(id) else { return; };
        shape.material = material;
        self.solver.set_shape_material(shape.handle, material);
        let body = shape.body;
        refresh_mass(&self.reg, &mut self.solver, body);
    }

    /* ---------- joints ---------- */

    /// Creates a detached joint, linked to both bodies right away.
    pub fn create_joint(&mut self, desc: JointDesc) -> Option<JointId> {
        if !self.reg.bodies.contains_key(desc.body_a) || !self.reg.bodies.contains_key(desc.body_b) {
            warn!("create_joint: unknown body");
            return None;
        }
        let id = self.reg.joints.insert(Joint::new(desc));
        self.reg.link_joint(id);
        Some(id)
    }

    pub fn add_joint(&mut self, id: JointId) { self.reg.add_joint(id); }
    pub fn remove_joint(&mut self, id: JointId, destroy: bool) { self.reg.remove_joint(id, destroy); }
    pub fn remove_all_joints(&mut self, destroy: bool) { self.reg.remove_all_joints(destroy); }

    /// Frees a joint that was never added, or removes and destroys an owned one.
    pub fn destroy_joint(&mut self, id: JointId) {
        match self.reg.joints.get(id).map(|j| j.state) {
            Some(Membership::NotInWorld) => self.reg.forget_joint(id),
            Some(_) => self.reg.remove_joint(id, true),
            None => warn!("destroy_joint: {id} is not tracked by this world"),
        }
    }

    #[inline] pub fn joint(&self, id: JointId) -> Option<&Joint> { self.reg.joint(id) }
    #[inline] pub fn joints(&self) -> &[JointId] { self.reg.joints() }

    pub fn set_joint_enabled(&mut self, id: JointId, enabled: bool) {
        let Some(joint) = self.reg.joints.get_mut(id) else { return; };
        joint.desc.enabled = enabled;
        if let Some(c) = joint.constraint { self.solver.set_constraint_enabled(c, enabled); }
    }

    /// World-space anchors of a materialized joint.
    pub fn joint_anchors(&self, id: JointId) -> Option<(Vec2, Vec2)> {
        self.solver.constraint_anchors(self.reg.joints.get(id)?.constraint?)
    }

    /* ---------- node association ---------- */

    /// Binds `body` to `node`, replacing either side's previous partner.
    /// The node's transform is pushed into the body at the next update.
    pub fn attach(&mut self, body: BodyId, node: NodeId) {
        let Some(b) = self.reg.bodies.get_mut(body) else {
            warn!("attach: {body} is not tracked by this world");
            return;
        };
        b.sync.reset();
        self.reg.link_node(body, node);
    }

    pub fn detach(&mut self, body: BodyId) -> Option<NodeId> { self.reg.unlink_body(body) }
    #[inline] pub fn node_of(&self, body: BodyId) -> Option<NodeId> { self.reg.node_of(body) }
    #[inline] pub fn body_of(&self, node: NodeId) -> Option<BodyId> { self.reg.body_of(node) }

    /* ---------- contacts ---------- */

    #[inline] pub fn contact(&self, id: ContactId) -> Option<&Contact> { self.contacts.get(id) }
    pub fn contacts(&self) -> impl Iterator<Item = &Contact> + '_ { self.contacts.values() }
    #[inline] pub fn contact_count(&self) -> usize { self.contacts.len() }

    /* ---------- diagnostics ---------- */

    /// Stages run by the last update, in order.
    #[inline] pub fn schedule(&self) -> &[UpdateStage] { self.schedule.stages() }
    #[inline] pub fn schedule_digest(&self) -> [u8; 32] { self.schedule.digest() }
    #[inline] pub fn solver(&self) -> &S { &self.solver }
    #[inline] pub fn registry(&self) -> &Registry { &self.reg }

    /// blake3 over owned body poses and velocities, in owned order.
    pub fn state_hash(&self) -> [u8; 32] {
        let mut h = StepHasher::new();
        for id in self.reg.bodies() {
            let Some(rb) = self.rigid_body(*id) else { continue; };
            hash_vec2(&mut h, &rb.pose.pos);
            hash_f32(&mut h, rb.pose.rot);
            hash_vec2(&mut h, &rb.vel.lin);
            hash_f32(&mut h, rb.vel.ang);
        }
        h.finalize()
    }

    pub(crate) fn flush_bodies(&mut self) -> usize {
        flush::flush_bodies(&mut self.solver, &mut self.reg, &mut self.contacts, &mut self.events)
    }
}

/// Builds a [`World`] with preallocated arenas.
#[derive(Clone, Debug, Default)]
pub struct WorldBuilder {
    capacity: usize,
    config: WorldConfig,
}

impl WorldBuilder {
    pub fn new() -> Self { Self::default() }
    pub fn with_capacity(mut self, cap: usize) -> Self { self.capacity = cap; self }
    pub fn with_config(mut self, config: WorldConfig) -> Self { self.config = config; self }

    pub fn build(self) -> World<Space> {
        World::from_parts(Space::with_capacity(self.capacity), Registry::with_capacity(self.capacity), self.config)
    }

    pub fn build_with<S: Solver>(self, solver: S) -> World<S> {
        World::from_parts(solver, Registry::with_capacity(self.capacity), self.config)
    }
}

//! Contact lifecycle, filtering policy and event fan-out.

use log::trace;
use scenephys_collision::Manifold;
use scenephys_core::{key_from_user, key_to_user, BodyId, ContactId, Scalar, ShapeId, Vec2};
use scenephys_solver::{Arbiter, CollisionHandler};
use slotmap::SlotMap;

use crate::ctx::WorldCtx;
use crate::registry::Registry;
use crate::shape::ShapeFilter;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum EventCode {
    #[default]
    None,
    Begin,
    PreSolve,
    PostSolve,
    Separate,
}

/// Geometry of the latest manifold. The normal points from shape A to shape B.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContactData {
    pub points: Vec<Vec2>,
    pub depths: Vec<Scalar>,
    pub normal: Vec2,
}

impl From<&Manifold> for ContactData {
    fn from(m: &Manifold) -> Self {
        Self {
            points: m.points.iter().map(|p| p.point).collect(),
            depths: m.points.iter().map(|p| p.depth).collect(),
            normal: m.normal,
        }
    }
}

/// One touching shape pair, from Begin to Separate.
#[derive(Clone, Debug)]
pub struct Contact {
    pub id: ContactId,
    pub shape_a: ShapeId,
    pub shape_b: ShapeId,
    pub body_a: BodyId,
    pub body_b: BodyId,
    pub event_code: EventCode,
    /// Decided once, at Begin.
    pub notification_enabled: bool,
    pub accept_response: bool,
    pub data: ContactData,
}

impl Contact {
    #[inline] pub fn involves(&self, body: BodyId) -> bool { self.body_a == body || self.body_b == body }
}

/// Pre-solve knobs a listener may edit.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PreSolve {
    pub restitution: Scalar,
    pub friction: Scalar,
    pub surface_velocity: Vec2,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PostSolve {
    pub restitution: Scalar,
    pub friction: Scalar,
    pub total_impulse: Vec2,
}

pub struct ContactEvent<'a> {
    pub contact: &'a Contact,
    /// Cleared by a listener to veto the response (Begin: until separation, PreSolve: this step).
    pub result: bool,
    pub pre_solve: Option<&'a mut PreSolve>,
    pub post_solve: Option<&'a PostSolve>,
}

impl ContactEvent<'_> {
    #[inline] pub fn code(&self) -> EventCode { self.contact.event_code }
}

/// Receiver of published contact events.
pub trait EventBus {
    fn dispatch_event(&mut self, event: &mut ContactEvent<'_>, world: &mut WorldCtx<'_>);
}

type Gate = Box<dyn FnMut(&mut ContactEvent<'_>, &mut WorldCtx<'_>) -> bool>;
type Observe = Box<dyn FnMut(&ContactEvent<'_>, &mut WorldCtx<'_>)>;

/// Per-phase closures, optionally limited to contacts between two body tags.
#[derive(Default)]
pub struct ContactListener {
    tags: Option<(i32, i32)>,
    begin: Option<Gate>,
    pre_solve: Option<Gate>,
    post_solve: Option<Observe>,
    separate: Option<Observe>,
}

impl ContactListener {
    pub fn new() -> Self { Self::default() }

    /// Only contacts between a body tagged `a` and one tagged `b`, in either order.
    pub fn between_tags(mut self, a: i32, b: i32) -> Self { self.tags = Some((a, b)); self }

    pub fn on_begin(mut self, f: impl FnMut(&mut ContactEvent<'_>, &mut WorldCtx<'_>) -> bool + 'static) -> Self {
        self.begin = Some(Box::new(f));
        self
    }
    pub fn on_pre_solve(mut self, f: impl FnMut(&mut ContactEvent<'_>, &mut WorldCtx<'_>) -> bool + 'static) -> Self {
        self.pre_solve = Some(Box::new(f));
        self
    }
    pub fn on_post_solve(mut self, f: impl FnMut(&ContactEvent<'_>, &mut WorldCtx<'_>) + 'static) -> Self {
        self.post_solve = Some(Box::new(f));
        self
    }
    pub fn on_separate(mut self, f: impl FnMut(&ContactEvent<'_>, &mut WorldCtx<'_>) + 'static) -> Self {
        self.separate = Some(Box::new(f));
        self
    }

    fn matches(&self, c: &Contact, world: &WorldCtx<'_>) -> bool {
        let Some((ta, tb)) = self.tags else { return true; };
        let tag = |b: BodyId| world.body(b).map(|x| x.tag);
        match (tag(c.body_a), tag(c.body_b)) {
            (Some(a), Some(b)) => (a == ta && b == tb) || (a == tb && b == ta),
            _ => false,
        }
    }
}

impl EventBus for ContactListener {
    fn dispatch_event(&mut self, event: &mut ContactEvent<'_>, world: &mut WorldCtx<'_>) {
        if !self.matches(event.contact, world) { return; }
        let gate = match event.code() {
            EventCode::Begin => self.begin.as_mut(),
            EventCode::PreSolve => self.pre_solve.as_mut(),
            code => {
                let observe = match code {
                    EventCode::PostSolve => self.post_solve.as_mut(),
                    EventCode::Separate => self.separate.as_mut(),
                    _ => None,
                };
                if let Some(f) = observe { f(event, world); }
                return;
            }
        };
        if let Some(f) = gate {
            let ok = f(event, world);
            event.result &= ok;
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

/// Fans every event out to the registered buses in registration order.
#[derive(Default)]
pub struct EventDispatcher {
    sinks: Vec<(ListenerId, Box<dyn EventBus>)>,
    next: u64,
}

impl EventDispatcher {
    pub fn add(&mut self, bus: Box<dyn EventBus>) -> ListenerId {
        self.next += 1;
        let id = ListenerId(self.next);
        self.sinks.push((id, bus));
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.sinks.len();
        self.sinks.retain(|(x, _)| *x != id);
        self.sinks.len() != before
    }

    #[inline] pub fn len(&self) -> usize { self.sinks.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.sinks.is_empty() }
}

impl EventBus for EventDispatcher {
    fn dispatch_event(&mut self, event: &mut ContactEvent<'_>, world: &mut WorldCtx<'_>) {
        for (_, sink) in self.sinks.iter_mut() { sink.dispatch_event(event, world); }
    }
}

/* ---------- filtering ---------- */

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FilterVerdict {
    pub notify: bool,
    pub accept: bool,
}

/// Decides notification and response for a new pair. Rules apply in order:
/// joint veto, contact-test bits, shared group, collision bits.
pub fn filter_contact(a: &ShapeFilter, b: &ShapeFilter, joint_veto: bool) -> FilterVerdict {
    if joint_veto { return FilterVerdict { notify: false, accept: false }; }
    let notify = (a.category & b.contact_test) != 0 && (b.category & a.contact_test) != 0;
    let accept = if a.group != 0 && a.group == b.group {
        a.group > 0
    } else {
        (a.category & b.collision) != 0 && (b.category & a.collision) != 0
    };
    FilterVerdict { notify, accept }
}

/* ---------- kernel callbacks ---------- */

/// Bridges kernel callbacks to world contacts for the duration of one step or shape removal.
pub(crate) struct Dispatcher<'a> {
    pub(crate) reg: &'a mut Registry,
    pub(crate) contacts: &'a mut SlotMap<ContactId, Contact>,
    pub(crate) events: &'a mut EventDispatcher,
}

impl Dispatcher<'_> {
    fn contact_of(&self, arb: &Arbiter) -> Option<ContactId> {
        let id: ContactId = key_from_user(arb.user_data?);
        self.contacts.contains_key(id).then_some(id)
    }

    fn publish(&mut self, id: ContactId, pre: Option<&mut PreSolve>, post: Option<&PostSolve>) -> bool {
        let Some(contact) = self.contacts.get(id) else { return true; };
        let mut event = ContactEvent { contact, result: true, pre_solve: pre, post_solve: post };
        let mut ctx = WorldCtx::new(self.reg);
        self.events.dispatch_event(&mut event, &mut ctx);
        event.result
    }
}

impl CollisionHandler for Dispatcher<'_> {
    fn begin(&mut self, arb: &mut Arbiter) -> bool {
        let (Some((sa, ba)), Some((sb, bb))) = (
            self.reg.shape_by_handle(arb.shape_a, arb.user_a),
            self.reg.shape_by_handle(arb.shape_b, arb.user_b),
        ) else { return true; };
        let veto = self.reg.joint_blocks_collision(ba, bb);
        let verdict = filter_contact(&self.reg.shapes[sa].filter, &self.reg.shapes[sb].filter, veto);
        let id = self.contacts.insert_with_key(|id| Contact {
            id,
            shape_a: sa, shape_b: sb,
            body_a: ba, body_b: bb,
            event_code: EventCode::None,
            notification_enabled: verdict.notify,
            accept_response: verdict.accept,
            data: ContactData::from(&arb.manifold),
        });
        arb.user_data = Some(key_to_user(id));
        if veto { return false; }

        let mut accept = verdict.accept;
        if verdict.notify {
            self.contacts[id].event_code = EventCode::Begin;
            accept &= self.publish(id, None, None);
        }
        self.contacts[id].accept_response = accept;
        trace!("contact {id} begin, notify={} accept={accept}", verdict.notify);
        accept
    }

    fn pre_solve(&mut self, arb: &mut Arbiter) -> bool {
        let Some(id) = self.contact_of(arb) else { return true; };
        let contact = &mut self.contacts[id];
        contact.data = ContactData::from(&arb.manifold);
        if !contact.notification_enabled { return true; }
        contact.event_code = EventCode::PreSolve;
        let mut knobs = PreSolve { restitution: arb.restitution, friction: arb.friction, surface_velocity: arb.surface_velocity };
        let result = self.publish(id, Some(&mut knobs), None);
        arb.restitution = knobs.restitution;
        arb.friction = knobs.friction;
        arb.surface_velocity = knobs.surface_velocity;
        result
    }

    fn post_solve(&mut self, arb: &Arbiter) {
        let Some(id) = self.contact_of(arb) else { return; };
        if !self.contacts[id].notification_enabled { return; }
        self.contacts[id].event_code = EventCode::PostSolve;
        let info = PostSolve { restitution: arb.restitution, friction: arb.friction, total_impulse: arb.total_impulse };
        self.publish(id, None, Some(&info));
    }

    fn separate(&mut self, arb: &Arbiter) {
        let Some(id) = self.contact_of(arb) else { return; };
        if self.contacts[id].notification_enabled {
            self.contacts[id].event_code = EventCode::Separate;
            self.publish(id, None, None);
        }
        self.contacts.remove(id);
        trace!("contact {id} separated");
    }
}

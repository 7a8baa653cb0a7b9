#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use scenephys_world::*;

pub const DT: f32 = 1.0 / 60.0;

/// Notifies on everything, collides with everything.
pub fn loud() -> ShapeFilter {
    ShapeFilter { contact_test: 0xFFFF_FFFF, ..ShapeFilter::default() }
}

pub fn dead_material() -> Material { Material::new(1.0, 0.0, 0.5) }

/// Static 100x10 slab centered on the origin (top face at y = 5).
pub fn ground(world: &mut World, filter: ShapeFilter) -> BodyId {
    let b = world.create_body(&BodyDesc::fixed().with_tag(2));
    world.add_shape(b, ShapeDesc::new(ShapeGeom::rect(100.0, 10.0)).with_material(dead_material()).with_filter(filter));
    world.add_body(b);
    b
}

pub fn ball(world: &mut World, at: Vec2, radius: f32, filter: ShapeFilter) -> BodyId {
    let b = world.create_body(&BodyDesc::dynamic().at(at).with_tag(1));
    world.add_shape(b, ShapeDesc::new(ShapeGeom::circle(radius)).with_material(dead_material()).with_filter(filter));
    world.add_body(b);
    b
}

/// Every event code seen, in order.
pub fn recorder(world: &mut World) -> Rc<RefCell<Vec<EventCode>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let (a, b, c, d) = (log.clone(), log.clone(), log.clone(), log.clone());
    world.add_contact_listener(
        ContactListener::new()
            .on_begin(move |ev, _| { a.borrow_mut().push(ev.code()); true })
            .on_pre_solve(move |ev, _| { b.borrow_mut().push(ev.code()); true })
            .on_post_solve(move |ev, _| c.borrow_mut().push(ev.code()))
            .on_separate(move |ev, _| d.borrow_mut().push(ev.code())),
    );
    log
}

pub fn count(log: &Rc<RefCell<Vec<EventCode>>>, code: EventCode) -> usize {
    log.borrow().iter().filter(|c| **c == code).count()
}

pub fn run(world: &mut World, scene: &mut Scene, frames: usize) {
    for _ in 0..frames { world.update(scene, DT); }
}

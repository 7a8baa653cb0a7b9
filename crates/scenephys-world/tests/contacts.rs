mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::*;
use scenephys_world::*;

fn ball_y(world: &World, b: BodyId) -> f32 { world.position(b).map_or(f32::NAN, |p| p.y) }

#[test]
fn contact_lives_from_one_begin_to_one_separate() {
    let mut world = World::default();
    let mut scene = Scene::new();
    let log = recorder(&mut world);
    ground(&mut world, loud());
    let b = ball(&mut world, Vec2::new(0.0, 5.5), 1.0, loud());

    run(&mut world, &mut scene, 5);
    assert_eq!(count(&log, EventCode::Begin), 1);
    assert_eq!(count(&log, EventCode::Separate), 0);
    assert!(count(&log, EventCode::PreSolve) >= 5);
    assert!(count(&log, EventCode::PostSolve) >= 5);
    assert_eq!(log.borrow().first(), Some(&EventCode::Begin));
    let id = world.contacts().next().map(|c| c.id).unwrap();
    assert!(world.contact(id).is_some_and(|c| c.involves(b)));

    world.remove_body(b);
    world.update(&mut scene, DT);
    assert_eq!(count(&log, EventCode::Separate), 1);
    assert_eq!(log.borrow().last(), Some(&EventCode::Separate));
    assert!(world.contact(id).is_none());
    assert_eq!(world.contact_count(), 0);
}

/// Dynamic A (category 0x1) resting on static B (category 0x2), both masks 0xFFFF.
fn category_scenario(a_contact_test: u32) -> (usize, Vec<bool>, f32) {
    let mut world = World::default();
    let mut scene = Scene::new();
    let accepted = Rc::new(RefCell::new(Vec::new()));
    let seen = accepted.clone();
    world.add_contact_listener(ContactListener::new().on_begin(move |ev, _| {
        seen.borrow_mut().push(ev.contact.accept_response);
        true
    }));
    ground(&mut world, ShapeFilter { category: 0x2, collision: 0xFFFF, ..loud() });
    let a = ball(&mut world, Vec2::new(0.0, 5.5), 1.0, ShapeFilter { category: 0x1, collision: 0xFFFF, ..loud() });
    world.set_contact_test_bitmask(a, a_contact_test);

    run(&mut world, &mut scene, 30);
    let flags = accepted.borrow().clone();
    (flags.len(), flags, ball_y(&world, a))
}

#[test]
fn notification_and_response_are_independent() {
    let (begins, flags, y) = category_scenario(0xFFFF_FFFF);
    assert_eq!(begins, 1);
    assert_eq!(flags, vec![true]);
    assert!(y > 5.0, "ball sank to {y}");

    let (begins, _, y) = category_scenario(0);
    assert_eq!(begins, 0);
    assert!(y > 5.0, "ball sank to {y}");
}

#[test]
fn positive_shared_group_collides_despite_masks() {
    let mut world = World::default();
    let mut scene = Scene::new();
    let picky = ShapeFilter { collision: 0, group: 3, ..loud() };
    ground(&mut world, picky);
    let b = ball(&mut world, Vec2::new(0.0, 5.5), 1.0, picky);
    run(&mut world, &mut scene, 30);
    assert_eq!(world.contact_count(), 1);
    assert!(world.contacts().all(|c| c.accept_response));
    assert!(ball_y(&world, b) > 5.0);
}

#[test]
fn negative_shared_group_never_collides() {
    let mut world = World::default();
    let mut scene = Scene::new();
    let log = recorder(&mut world);
    let shy = ShapeFilter { group: -3, ..loud() };
    ground(&mut world, shy);
    let b = ball(&mut world, Vec2::new(0.0, 5.5), 1.0, shy);
    world.update(&mut scene, DT);
    assert!(world.contacts().all(|c| !c.accept_response));
    run(&mut world, &mut scene, 60);
    assert!(ball_y(&world, b) < -10.0);
    assert_eq!(world.contact_count(), 0);
    assert_eq!(count(&log, EventCode::Begin), 1);
    assert_eq!(count(&log, EventCode::Separate), 1);
    assert_eq!(count(&log, EventCode::PostSolve), 0);
}

#[test]
fn one_sided_category_mismatch_blocks_response() {
    let mut world = World::default();
    let mut scene = Scene::new();
    ground(&mut world, ShapeFilter { category: 0x2, collision: 0x2, ..ShapeFilter::default() });
    let b = ball(&mut world, Vec2::new(0.0, 5.5), 1.0, ShapeFilter { category: 0x1, collision: 0xFFFF, ..ShapeFilter::default() });
    run(&mut world, &mut scene, 60);
    assert!(ball_y(&world, b) < -10.0);
}

#[test]
fn joint_without_collision_vetoes_notification_and_response() {
    let mut world = World::new(WorldConfig { gravity: [0.0, 0.0], ..WorldConfig::default() });
    let mut scene = Scene::new();
    let log = recorder(&mut world);
    let a = ball(&mut world, Vec2::ZERO, 1.0, loud());
    let b = ball(&mut world, Vec2::new(1.5, 0.0), 1.0, loud());
    let j = world.create_joint(JointDesc::new(JointKind::Pin { distance: None }, a, b)).unwrap();
    world.add_joint(j);
    world.update(&mut scene, DT);
    assert_eq!(world.contact_count(), 1);
    assert!(world.contacts().all(|c| !c.accept_response && !c.notification_enabled));
    assert!(log.borrow().is_empty());
}

#[test]
fn joint_with_collision_lets_contacts_through() {
    let mut world = World::new(WorldConfig { gravity: [0.0, 0.0], ..WorldConfig::default() });
    let mut scene = Scene::new();
    let log = recorder(&mut world);
    let a = ball(&mut world, Vec2::ZERO, 1.0, loud());
    let b = ball(&mut world, Vec2::new(1.5, 0.0), 1.0, loud());
    let j = world.create_joint(JointDesc::new(JointKind::Pin { distance: None }, a, b).with_collision(true)).unwrap();
    world.add_joint(j);
    world.update(&mut scene, DT);
    assert_eq!(count(&log, EventCode::Begin), 1);
}

#[test]
fn sensors_report_but_do_not_collide() {
    let mut world = World::default();
    let mut scene = Scene::new();
    let log = recorder(&mut world);
    ground(&mut world, loud());
    let b = world.create_body(&BodyDesc::dynamic().at(Vec2::new(0.0, 5.5)));
    world.add_shape(b, ShapeDesc::new(ShapeGeom::circle(1.0)).with_filter(loud()).as_sensor());
    world.add_body(b);
    run(&mut world, &mut scene, 60);
    assert_eq!(count(&log, EventCode::Begin), 1);
    assert_eq!(count(&log, EventCode::Separate), 1);
    assert!(ball_y(&world, b) < -10.0);
}

#[test]
fn listener_can_veto_at_begin_or_per_step() {
    for veto_begin in [true, false] {
        let mut world = World::default();
        let mut scene = Scene::new();
        let listener = if veto_begin {
            ContactListener::new().on_begin(|_, _| false)
        } else {
            ContactListener::new().on_pre_solve(|_, _| false)
        };
        world.add_contact_listener(listener);
        ground(&mut world, loud());
        let b = ball(&mut world, Vec2::new(0.0, 5.5), 1.0, loud());
        run(&mut world, &mut scene, 60);
        assert!(ball_y(&world, b) < -10.0, "veto_begin={veto_begin}");
    }
}

#[test]
fn pre_solve_edits_reach_the_solver() {
    let mut world = World::default();
    let mut scene = Scene::new();
    world.add_contact_listener(ContactListener::new().on_pre_solve(|ev, _| {
        if let Some(knobs) = ev.pre_solve.as_deref_mut() { knobs.restitution = 1.0; }
        true
    }));
    ground(&mut world, loud());
    let b = ball(&mut world, Vec2::new(0.0, 20.0), 1.0, loud());
    let mut peak_after_bounce = f32::MIN;
    let mut bounced = false;
    for _ in 0..120 {
        world.update(&mut scene, DT);
        let vy = world.velocity(b).map_or(0.0, |v| v.y);
        if vy > 5.0 { bounced = true; }
        if bounced { peak_after_bounce = peak_after_bounce.max(ball_y(&world, b)); }
    }
    assert!(bounced);
    assert!(peak_after_bounce > 10.0);
}

#[test]
fn tag_filtered_listener_ignores_other_pairs() {
    let mut world = World::default();
    let mut scene = Scene::new();
    let hits = Rc::new(RefCell::new(0));
    let seen = hits.clone();
    world.add_contact_listener(ContactListener::new().between_tags(5, 6).on_begin(move |_, _| {
        *seen.borrow_mut() += 1;
        true
    }));
    ground(&mut world, loud());
    ball(&mut world, Vec2::new(0.0, 5.5), 1.0, loud());
    run(&mut world, &mut scene, 3);
    assert_eq!(*hits.borrow(), 0);
}

#[test]
fn removed_listener_hears_nothing() {
    let mut world = World::default();
    let mut scene = Scene::new();
    let log = recorder(&mut world);
    let quiet = world.add_contact_listener(ContactListener::new());
    assert!(world.remove_listener(quiet));
    ground(&mut world, loud());
    ball(&mut world, Vec2::new(0.0, 5.5), 1.0, loud());
    world.update(&mut scene, DT);
    assert_eq!(count(&log, EventCode::Begin), 1);
}

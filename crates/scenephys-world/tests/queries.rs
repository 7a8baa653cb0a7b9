mod common;

use approx::assert_relative_eq;
use common::*;
use scenephys_world::*;

fn spaced_balls(world: &mut World) -> Vec<BodyId> {
    [0.0, 10.0, 20.0]
        .into_iter()
        .map(|x| ball(world, Vec2::new(x, 0.0), 1.0, ShapeFilter::default()))
        .collect()
}

#[test]
fn ray_cast_sees_bodies_added_without_an_update() {
    let mut world = World::default();
    let b = ball(&mut world, Vec2::ZERO, 1.0, ShapeFilter::default());
    let mut hits = Vec::new();
    world.ray_cast(Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0), |info| { hits.push(*info); true });
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].body, b);
    assert_relative_eq!(hits[0].fraction, 0.4, epsilon = 1e-5);
    assert_relative_eq!(hits[0].contact.x, -1.0, epsilon = 1e-5);
    assert_relative_eq!(hits[0].normal.x, -1.0, epsilon = 1e-5);
    assert!(world.pending_body_adds().is_empty());
}

#[test]
fn ray_cast_stops_when_the_callback_says_so() {
    let mut world = World::default();
    let balls = spaced_balls(&mut world);
    let mut visited = Vec::new();
    world.ray_cast(Vec2::new(-5.0, 0.0), Vec2::new(30.0, 0.0), |info| { visited.push(info.body); false });
    assert_eq!(visited, vec![balls[0]]);

    let mut all = 0;
    world.ray_cast(Vec2::new(-5.0, 0.0), Vec2::new(30.0, 0.0), |_| { all += 1; true });
    assert_eq!(all, 3);
}

#[test]
fn degenerate_ray_reports_nothing() {
    let mut world = World::default();
    ball(&mut world, Vec2::ZERO, 1.0, ShapeFilter::default());
    let mut hits = 0;
    world.ray_cast(Vec2::ZERO, Vec2::ZERO, |_| { hits += 1; true });
    assert_eq!(hits, 0);
}

#[test]
fn rect_query_uses_bounding_boxes() {
    let mut world = World::default();
    let balls = spaced_balls(&mut world);
    let mut found = Vec::new();
    // Only touches the first ball's box corner region, not the disc itself.
    world.query_rect(Rect::new(0.8, 0.8, 1.0, 1.0), |_, body| { found.push(body); true });
    assert_eq!(found, vec![balls[0]]);

    let mut found = Vec::new();
    world.query_rect(Rect::new(-2.0, -2.0, 30.0, 4.0), |_, body| { found.push(body); true });
    assert_eq!(found.len(), 3);

    let mut first_only = 0;
    world.query_rect(Rect::new(-2.0, -2.0, 30.0, 4.0), |_, _| { first_only += 1; false });
    assert_eq!(first_only, 1);
}

#[test]
fn point_queries_collect_containing_shapes() {
    let mut world = World::default();
    let a = ball(&mut world, Vec2::ZERO, 2.0, ShapeFilter::default());
    let b = ball(&mut world, Vec2::new(1.5, 0.0), 1.0, ShapeFilter::default());
    let shape_b = world.body(b).map(|x| x.shapes()[0]);

    let mut at = world.shapes_at(Vec2::new(1.0, 0.0));
    at.sort();
    let mut expected: Vec<ShapeId> = [a, b].iter().filter_map(|x| world.body(*x).map(|x| x.shapes()[0])).collect();
    expected.sort();
    assert_eq!(at, expected);

    assert_eq!(world.shape_at(Vec2::new(2.3, 0.0)), shape_b);
    assert_eq!(world.shape_at(Vec2::new(10.0, 0.0)), None);

    let mut visits = 0;
    world.query_point(Vec2::new(1.0, 0.0), |_, _| { visits += 1; false });
    assert_eq!(visits, 1);
}

#[test]
fn removed_bodies_drop_out_of_queries() {
    let mut world = World::default();
    let b = ball(&mut world, Vec2::ZERO, 1.0, ShapeFilter::default());
    assert_eq!(world.shapes_at(Vec2::ZERO).len(), 1);
    world.remove_body(b);
    assert!(world.shapes_at(Vec2::ZERO).is_empty());
}

use scenephys_world::*;

fn main() {
    let mut world = WorldBuilder::new()
        .with_capacity(64)
        .with_config(WorldConfig { fixed_rate: 60, ..WorldConfig::default() })
        .build();
    let mut scene = Scene::new();

    // Ground (static)
    let ground_node = scene.create_node(scene.root(), "ground", vec2(0.0, 0.0)).unwrap_or_default();
    let ground = world.create_body(&BodyDesc::fixed().with_name("ground"));
    let notify = ShapeFilter { contact_test: 0xFFFF_FFFF, ..ShapeFilter::default() };
    world.add_shape(ground, ShapeDesc::new(ShapeGeom::rect(200.0, 10.0)).with_filter(notify));
    world.attach(ground, ground_node);
    world.add_body(ground);

    // Falling crate
    let crate_node = scene.create_node(scene.root(), "crate", vec2(0.0, 60.0)).unwrap_or_default();
    let b = world.create_body(&BodyDesc::dynamic().with_tag(1));
    world.add_shape(b, ShapeDesc::new(ShapeGeom::rect(10.0, 10.0)).with_filter(notify));
    world.attach(b, crate_node);
    world.add_body(b);

    world.add_contact_listener(ContactListener::new().on_begin(|ev, _| {
        println!("begin {} / {}", ev.contact.body_a, ev.contact.body_b);
        true
    }));

    for frame in 0..60 {
        let stats = world.update(&mut scene, 1.0 / 60.0);
        let y = scene.world_position(crate_node).y;
        println!("frame {frame:02}  steps={}  contacts={}  y={y:.2}  hash={:02x?}",
                 stats.solver_steps, stats.contacts, &world.state_hash()[..4]);
    }
}

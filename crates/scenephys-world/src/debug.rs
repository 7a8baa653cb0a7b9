use scenephys_geom::ShapeGeom;
use scenephys_solver::{BodyKind, ShapeView, Solver};
use scenephys_viz::{Color, DebugDraw, DEBUG_DRAW_CONTACT, DEBUG_DRAW_JOINT, DEBUG_DRAW_SHAPE};

use crate::world::World;

fn draw_shape(out: &mut dyn DebugDraw, v: &ShapeView<'_>) {
    let fill = if v.sensor {
        Color::SENSOR_FILL
    } else if v.kind == BodyKind::Dynamic {
        Color::SHAPE_FILL
    } else {
        Color::STATIC_FILL
    };
    match v.geom.to_world(&v.pose) {
        ShapeGeom::Circle { center, radius } => out.draw_circle(center, radius, v.pose.rot, Color::SHAPE_OUTLINE, fill),
        ShapeGeom::Polygon { verts } => out.draw_polygon(&verts, Color::SHAPE_OUTLINE, fill),
        ShapeGeom::Segment { a, b, radius } => out.draw_segment(a, b, radius, Color::SHAPE_OUTLINE, fill),
    }
}

impl<S: Solver> World<S> {
    /// Draws the parts selected by the debug-draw mask into `out`.
    pub fn draw_debug(&self, out: &mut dyn DebugDraw) {
        let mask = self.config.debug_draw_mask;
        out.clear();
        if mask & DEBUG_DRAW_SHAPE != 0 {
            self.solver.for_each_shape(&mut |v| draw_shape(&mut *out, v));
        }
        if mask & DEBUG_DRAW_JOINT != 0 {
            for j in self.reg.joints() {
                let Some((a, b)) = self.joint_anchors(*j) else { continue; };
                out.draw_segment(a, b, 0.0, Color::JOINT, Color::JOINT);
                out.draw_dot(a, 3.0, Color::JOINT);
                out.draw_dot(b, 3.0, Color::JOINT);
            }
        }
        if mask & DEBUG_DRAW_CONTACT != 0 {
            for c in self.contacts.values().filter(|c| c.accept_response) {
                for p in &c.data.points { out.draw_dot(*p, 2.0, Color::CONTACT); }
            }
        }
    }

    pub(crate) fn debug_draw_pass(&mut self) {
        let Some(mut renderer) = self.debug_draw.take() else { return; };
        self.draw_debug(renderer.as_mut());
        self.debug_draw = Some(renderer);
    }
}

use scenephys_core::{schedule_digest, UpdateStage, Vec2};

#[derive(Default)]
pub struct ScheduleRecorder { stages: Vec<UpdateStage> }

impl ScheduleRecorder {
    pub fn new() -> Self { Self { stages: Vec::new() } }
    pub fn push(&mut self, s: UpdateStage) { self.stages.push(s); }
    pub fn clear(&mut self) { self.stages.clear(); }
    pub fn stages(&self) -> &[UpdateStage] { &self.stages }
    pub fn digest(&self) -> [u8; 32] { schedule_digest(&self.stages) }
}

/* ---------- debug draw ---------- */

pub const DEBUG_DRAW_NONE: u32 = 0x00;
pub const DEBUG_DRAW_SHAPE: u32 = 0x01;
pub const DEBUG_DRAW_JOINT: u32 = 0x02;
pub const DEBUG_DRAW_CONTACT: u32 = 0x04;
pub const DEBUG_DRAW_ALL: u32 = DEBUG_DRAW_SHAPE | DEBUG_DRAW_JOINT | DEBUG_DRAW_CONTACT;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Color { pub r: f32, pub g: f32, pub b: f32, pub a: f32 }

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self { Self { r, g, b, a } }
    pub const SHAPE_OUTLINE: Color = Color::rgba(0.4, 0.4, 1.0, 1.0);
    pub const SHAPE_FILL: Color = Color::rgba(1.0, 0.0, 0.0, 0.3);
    pub const STATIC_FILL: Color = Color::rgba(0.5, 0.5, 0.5, 0.3);
    pub const SENSOR_FILL: Color = Color::rgba(0.0, 1.0, 0.0, 0.15);
    pub const JOINT: Color = Color::rgba(0.0, 1.0, 0.0, 1.0);
    pub const CONTACT: Color = Color::rgba(1.0, 1.0, 0.0, 1.0);
}

/// Rendering sink for the debug pass. Implement it over whatever renderer is at hand.
pub trait DebugDraw {
    fn draw_circle(&mut self, center: Vec2, radius: f32, angle: f32, outline: Color, fill: Color);
    fn draw_segment(&mut self, a: Vec2, b: Vec2, radius: f32, outline: Color, fill: Color);
    fn draw_polygon(&mut self, verts: &[Vec2], outline: Color, fill: Color);
    fn draw_dot(&mut self, p: Vec2, size: f32, color: Color);
    /// Called before any primitive of a pass.
    fn clear(&mut self) {}
}

#[derive(Clone, Debug, PartialEq)]
pub enum DebugPrim {
    Circle { center: Vec2, radius: f32 },
    Segment { a: Vec2, b: Vec2, radius: f32 },
    Polygon { verts: Vec<Vec2> },
    Dot { p: Vec2, color: Color },
}

/// Keeps the primitives of the last pass in memory; handy headless.
#[derive(Default)]
pub struct DebugRecorder { pub prims: Vec<DebugPrim> }

impl DebugRecorder {
    pub fn new() -> Self { Self::default() }
    pub fn count(&self, pred: impl Fn(&DebugPrim) -> bool) -> usize { self.prims.iter().filter(|p| pred(p)).count() }
}

impl DebugDraw for DebugRecorder {
    fn draw_circle(&mut self, center: Vec2, radius: f32, _angle: f32, _outline: Color, _fill: Color) {
        self.prims.push(DebugPrim::Circle { center, radius });
    }
    fn draw_segment(&mut self, a: Vec2, b: Vec2, radius: f32, _outline: Color, _fill: Color) {
        self.prims.push(DebugPrim::Segment { a, b, radius });
    }
    fn draw_polygon(&mut self, verts: &[Vec2], _outline: Color, _fill: Color) {
        self.prims.push(DebugPrim::Polygon { verts: verts.to_vec() });
    }
    fn draw_dot(&mut self, p: Vec2, _size: f32, color: Color) {
        self.prims.push(DebugPrim::Dot { p, color });
    }
    fn clear(&mut self) { self.prims.clear(); }
}

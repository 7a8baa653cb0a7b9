use scenephys_core::{BodyId, ColliderHandle};
use scenephys_geom::{Material, ShapeGeom};

/// Contact filtering bits. Defaults: every category, collide with everything,
/// no contact notifications.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShapeFilter {
    pub category: u32,
    pub collision: u32,
    pub contact_test: u32,
    /// Shared nonzero group: positive always collides, negative never.
    pub group: i32,
}

impl Default for ShapeFilter {
    fn default() -> Self {
        Self { category: 0xFFFF_FFFF, collision: 0xFFFF_FFFF, contact_test: 0x0000_0000, group: 0 }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShapeDesc {
    pub geom: ShapeGeom,
    pub material: Material,
    pub sensor: bool,
    pub filter: ShapeFilter,
    pub tag: i32,
}

impl ShapeDesc {
    pub fn new(geom: ShapeGeom) -> Self {
        Self { geom, material: Material::default(), sensor: false, filter: ShapeFilter::default(), tag: 0 }
    }
    pub fn with_material(mut self, material: Material) -> Self { self.material = material; self }
    pub fn with_filter(mut self, filter: ShapeFilter) -> Self { self.filter = filter; self }
    pub fn as_sensor(mut self) -> Self { self.sensor = true; self }
}

/// Collidable geometry on a body. `geom` is unscaled; the solver holds the scaled copy.
#[derive(Clone, Debug)]
pub struct Shape {
    pub(crate) handle: ColliderHandle,
    pub(crate) body: BodyId,
    pub(crate) geom: ShapeGeom,
    pub(crate) material: Material,
    pub(crate) sensor: bool,
    pub filter: ShapeFilter,
    pub tag: i32,
}

impl Shape {
    #[inline] pub fn handle(&self) -> ColliderHandle { self.handle }
    #[inline] pub fn body(&self) -> BodyId { self.body }
    #[inline] pub fn geom(&self) -> &ShapeGeom { &self.geom }
    #[inline] pub fn material(&self) -> Material { self.material }
    #[inline] pub fn is_sensor(&self) -> bool { self.sensor }
}

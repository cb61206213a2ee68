//! Shapes written as host path objects, shared by the tests and benchmarks.

use pathway::math::{point, Point};
use pathway::path::extract::write_path;
use pathway::path::layout::{LayoutDescriptor, LAYOUTS_32, LAYOUTS_64};
use pathway::path::memory::MemoryImage;
use pathway::path::{IteratorOptions, PathHandle, PathIterator, Verb};

use std::f32::consts::FRAC_1_SQRT_2;

#[cfg(test)]
mod host_paths;

/// Every known layout, for both pointer widths.
pub fn all_layouts() -> impl Iterator<Item = &'static LayoutDescriptor> {
    LAYOUTS_32.iter().chain(LAYOUTS_64.iter())
}

/// The arrays of a path, built the way the host's path API builds them.
#[derive(Clone, Debug, Default)]
pub struct Shape {
    pub verbs: Vec<Verb>,
    pub points: Vec<Point>,
    pub weights: Vec<f32>,
}

impl Shape {
    pub fn new() -> Self {
        Shape::default()
    }

    pub fn move_to(&mut self, to: Point) -> &mut Self {
        self.verbs.push(Verb::Move);
        self.points.push(to);
        self
    }

    pub fn line_to(&mut self, to: Point) -> &mut Self {
        self.verbs.push(Verb::Line);
        self.points.push(to);
        self
    }

    pub fn quad_to(&mut self, ctrl: Point, to: Point) -> &mut Self {
        self.verbs.push(Verb::Quadratic);
        self.points.push(ctrl);
        self.points.push(to);
        self
    }

    pub fn conic_to(&mut self, ctrl: Point, to: Point, weight: f32) -> &mut Self {
        self.verbs.push(Verb::Conic);
        self.points.push(ctrl);
        self.points.push(to);
        self.weights.push(weight);
        self
    }

    pub fn cubic_to(&mut self, ctrl1: Point, ctrl2: Point, to: Point) -> &mut Self {
        self.verbs.push(Verb::Cubic);
        self.points.push(ctrl1);
        self.points.push(ctrl2);
        self.points.push(to);
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.verbs.push(Verb::Close);
        self
    }

    /// A rectangle with rounded corners made of quarter circle conics, clockwise,
    /// starting at the end of the top left corner.
    pub fn round_rect(min: Point, max: Point, radius: f32) -> Self {
        let mut shape = Shape::new();
        shape
            .move_to(point(min.x + radius, min.y))
            .line_to(point(max.x - radius, min.y))
            .conic_to(point(max.x, min.y), point(max.x, min.y + radius), FRAC_1_SQRT_2)
            .line_to(point(max.x, max.y - radius))
            .conic_to(point(max.x, max.y), point(max.x - radius, max.y), FRAC_1_SQRT_2)
            .line_to(point(min.x + radius, max.y))
            .conic_to(point(min.x, max.y), point(min.x, max.y - radius), FRAC_1_SQRT_2)
            .line_to(point(min.x, min.y + radius))
            .conic_to(point(min.x, min.y), point(min.x + radius, min.y), FRAC_1_SQRT_2)
            .close();

        shape
    }

    /// A circle made of four quarter circle conics.
    pub fn circle(center: Point, radius: f32) -> Self {
        let (x, y, r) = (center.x, center.y, radius);
        let mut shape = Shape::new();
        shape
            .move_to(point(x + r, y))
            .conic_to(point(x + r, y + r), point(x, y + r), FRAC_1_SQRT_2)
            .conic_to(point(x - r, y + r), point(x - r, y), FRAC_1_SQRT_2)
            .conic_to(point(x - r, y - r), point(x, y - r), FRAC_1_SQRT_2)
            .conic_to(point(x + r, y - r), point(x + r, y), FRAC_1_SQRT_2)
            .close();

        shape
    }

    /// A path using every verb, over two contours.
    pub fn kitchen_sink() -> Self {
        let mut shape = Shape::new();
        shape
            .move_to(point(1.0, 1.0))
            .line_to(point(2.0, 2.0))
            .cubic_to(point(3.0, 3.0), point(4.0, 4.0), point(5.0, 5.0))
            .quad_to(point(7.0, 7.0), point(8.0, 8.0))
            .conic_to(point(10.0, 8.0), point(10.0, 10.0), 2.0)
            .move_to(point(20.0, 20.0))
            .line_to(point(30.0, 20.0))
            .conic_to(point(30.0, 30.0), point(20.0, 30.0), 0.5)
            .close();

        shape
    }

    /// Writes the shape as a host path object of the given layout.
    pub fn write(&self, layout: &'static LayoutDescriptor) -> HostPath {
        let mut memory = MemoryImage::new(0x1_0000);
        let handle = write_path(&mut memory, layout, &self.verbs, &self.points, &self.weights);

        HostPath {
            memory,
            handle,
            layout,
        }
    }
}

/// A host path object living in a memory image.
pub struct HostPath {
    pub memory: MemoryImage,
    pub handle: PathHandle,
    pub layout: &'static LayoutDescriptor,
}

impl HostPath {
    pub fn iter(&self, options: IteratorOptions) -> PathIterator {
        match PathIterator::from_handle(&self.memory, self.handle, self.layout, options) {
            Ok(iter) => iter,
            Err(error) => panic!("{:?}: {}", self.layout.kind, error),
        }
    }
}

//! Primitive shapes - RegularPolygon, Star, Circle
//!
//! These are the only shapes the scatter layer knows how to place. Each is
//! built once at a canonical size and then copied through per-instance
//! transforms.

use std::f32::consts::{PI, TAU};

use nalgebra::{Affine2, Point2};
use tiny_skia::{Path, PathBuilder, Transform};

use super::traits::Outline;

/// Length of the segment `from -> from + (radius, 0)` after mapping it
fn mapped_radius(xform: &Affine2<f32>, from: &Point2<f32>, radius: f32) -> f32 {
    let a = xform.transform_point(from);
    let b = xform.transform_point(&Point2::new(from.x + radius, from.y));
    (b - a).norm()
}

fn map_vertices(xform: &Affine2<f32>, vertices: &[Point2<f32>]) -> Vec<Point2<f32>> {
    vertices.iter().map(|v| xform.transform_point(v)).collect()
}

fn trace_closed(vertices: &[Point2<f32>], pb: &mut PathBuilder) {
    let mut iter = vertices.iter();
    if let Some(first) = iter.next() {
        pb.move_to(first.x, first.y);
        for v in iter {
            pb.line_to(v.x, v.y);
        }
        pb.close();
    }
}

/// Shoelace formula, unsigned
fn polygon_area(vertices: &[Point2<f32>]) -> f32 {
    let n = vertices.len();
    let twice: f32 = (0..n)
        .map(|i| {
            let a = vertices[i];
            let b = vertices[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum();
    twice.abs() / 2.0
}

/// A regular polygon with `sides` vertices on a circle of `radius`
///
/// Vertices start on the positive X axis and wind counter-clockwise:
/// ```text
/// angle_k = k * 2π / sides
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct RegularPolygon {
    sides: usize,
    radius: f32,
    vertices: Vec<Point2<f32>>,
}

impl RegularPolygon {
    /// Create a regular polygon centered on the origin
    ///
    /// # Panics
    /// Panics if fewer than 3 sides are requested
    pub fn new(sides: usize, radius: f32) -> Self {
        assert!(sides >= 3, "Regular polygon requires at least 3 sides");

        let step = TAU / sides as f32;
        let vertices = (0..sides)
            .map(|k| {
                let angle = k as f32 * step;
                Point2::new(radius * angle.cos(), radius * angle.sin())
            })
            .collect();

        Self {
            sides,
            radius,
            vertices,
        }
    }

    /// Create a regular polygon whose area equals `area`
    pub fn with_area(sides: usize, area: f32) -> Self {
        let radius = (2.0 * area / (sides as f32 * (TAU / sides as f32).sin())).sqrt();
        Self::new(sides, radius)
    }

    /// Area of a regular polygon: `sides * r² * sin(2π / sides) / 2`
    pub fn area_for(sides: usize, radius: f32) -> f32 {
        sides as f32 * radius * radius * (TAU / sides as f32).sin() / 2.0
    }

    pub fn sides(&self) -> usize {
        self.sides
    }

    pub fn vertices(&self) -> &[Point2<f32>] {
        &self.vertices
    }
}

impl Outline for RegularPolygon {
    fn area(&self) -> f32 {
        Self::area_for(self.sides, self.radius)
    }

    fn radius(&self) -> f32 {
        self.radius
    }

    fn transformed(&self, xform: &Affine2<f32>) -> Self {
        Self {
            sides: self.sides,
            radius: mapped_radius(xform, &Point2::origin(), self.radius),
            vertices: map_vertices(xform, &self.vertices),
        }
    }

    fn trace(&self, pb: &mut PathBuilder) {
        trace_closed(&self.vertices, pb);
    }

    fn name(&self) -> &str {
        match self.sides {
            3 => "Triangle",
            4 => "Square",
            5 => "Pentagon",
            6 => "Hexagon",
            _ => "Polygon",
        }
    }
}

/// Minimal turtle used to trace star outlines
///
/// Headings are in degrees, counter-clockwise from the positive X axis.
/// Every forward/back move made with the pen down records a vertex.
struct Turtle {
    position: Point2<f32>,
    heading: f32,
    pen_down: bool,
    vertices: Vec<Point2<f32>>,
}

impl Turtle {
    fn new() -> Self {
        Self {
            position: Point2::origin(),
            heading: 0.0,
            pen_down: true,
            vertices: Vec::new(),
        }
    }

    fn pen_up(&mut self) -> &mut Self {
        self.pen_down = false;
        self
    }

    fn pen_down(&mut self) -> &mut Self {
        self.pen_down = true;
        self.vertices.push(self.position);
        self
    }

    fn left(&mut self, degrees: f32) -> &mut Self {
        self.heading += degrees;
        self
    }

    fn right(&mut self, degrees: f32) -> &mut Self {
        self.heading -= degrees;
        self
    }

    fn forward(&mut self, distance: f32) -> &mut Self {
        let rad = self.heading.to_radians();
        self.position.x += distance * rad.cos();
        self.position.y += distance * rad.sin();
        if self.pen_down {
            self.vertices.push(self.position);
        }
        self
    }

    fn back(&mut self, distance: f32) -> &mut Self {
        self.forward(-distance)
    }
}

/// A star polygon `{points / turn}` traced with edges of equal length
///
/// The outline alternates tips and crotches, `2 * points` vertices in all.
/// The first vertex is a tip directly below the origin and every tip lies on
/// a circle of `circumradius` around the origin.
///
/// The star's `radius` is its edge length, not the circumradius: lighting
/// sizes its highlights from the edge.
#[derive(Clone, Debug, PartialEq)]
pub struct Star {
    points: usize,
    radius: f32,
    circumradius: f32,
    vertices: Vec<Point2<f32>>,
}

impl Star {
    /// Trace a star with `points` spikes, visiting every `turn`-th point of
    /// the circumscribed polygon, with every edge `edge` long.
    ///
    /// # Panics
    /// Panics if fewer than 3 points are requested
    pub fn new(points: usize, turn: usize, edge: f32) -> Self {
        assert!(points >= 3, "Star requires at least 3 points");

        let n = points as f32;
        let spike_exterior = 360.0 * turn as f32 / n;
        let spike_interior = 180.0 - spike_exterior;
        let crotch = 180.0 - (360.0 / n + spike_interior);

        // Law of cosines on the tip-crotch-tip triangle gives the side of the
        // circumscribed polygon; its circumradius centers the star.
        let polygon_side = edge * (2.0 - 2.0 * (180.0 - crotch).to_radians().cos()).sqrt();
        let circumradius = polygon_side / (2.0 * (PI / n).sin());

        let mut turtle = Turtle::new();
        turtle
            .pen_up()
            .left(90.0)
            .back(circumradius)
            .left(spike_interior / 2.0)
            .pen_down();
        for i in 0..points {
            turtle.forward(edge).left(crotch);
            if i < points - 1 {
                turtle.forward(edge).right(spike_exterior);
            }
        }

        Self {
            points,
            radius: edge,
            circumradius,
            vertices: turtle.vertices,
        }
    }

    /// Classic five-pointed star `{5/2}`
    pub fn pentagram(edge: f32) -> Self {
        Self::new(5, 2, edge)
    }

    pub fn points(&self) -> usize {
        self.points
    }

    /// Distance from the origin to each tip
    pub fn circumradius(&self) -> f32 {
        self.circumradius
    }

    pub fn vertices(&self) -> &[Point2<f32>] {
        &self.vertices
    }
}

impl Outline for Star {
    fn area(&self) -> f32 {
        polygon_area(&self.vertices)
    }

    fn radius(&self) -> f32 {
        self.radius
    }

    fn transformed(&self, xform: &Affine2<f32>) -> Self {
        Self {
            points: self.points,
            radius: mapped_radius(xform, &Point2::origin(), self.radius),
            circumradius: mapped_radius(xform, &Point2::origin(), self.circumradius),
            vertices: map_vertices(xform, &self.vertices),
        }
    }

    fn trace(&self, pb: &mut PathBuilder) {
        trace_closed(&self.vertices, pb);
    }

    fn name(&self) -> &str {
        "Star"
    }
}

/// A circle at `center` with given radius
#[derive(Clone, Debug, PartialEq)]
pub struct Circle {
    pub center: Point2<f32>,
    pub radius: f32,
}

impl Circle {
    /// Create a circle at the origin
    pub fn new(radius: f32) -> Self {
        Self {
            center: Point2::origin(),
            radius,
        }
    }

    /// Create a circle at a specific position
    pub fn at(center: Point2<f32>, radius: f32) -> Self {
        Self { center, radius }
    }
}

impl Outline for Circle {
    fn area(&self) -> f32 {
        PI * self.radius * self.radius
    }

    fn radius(&self) -> f32 {
        self.radius
    }

    fn transformed(&self, xform: &Affine2<f32>) -> Self {
        Self {
            center: xform.transform_point(&self.center),
            radius: mapped_radius(xform, &self.center, self.radius),
        }
    }

    fn trace(&self, pb: &mut PathBuilder) {
        pb.push_circle(self.center.x, self.center.y, self.radius);
    }

    fn name(&self) -> &str {
        "Circle"
    }
}

/// Any shape the catalog can hold
///
/// The set is closed: all rendering code matches on these three variants.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Polygon(RegularPolygon),
    Star(Star),
    Circle(Circle),
}

impl Shape {
    /// The traced boundary, or `None` for a degenerate (zero-size) shape
    pub fn path(&self) -> Option<Path> {
        let mut pb = PathBuilder::new();
        self.trace(&mut pb);
        pb.finish()
    }

    /// The boundary shifted by `(dx, dy)`, used for drop shadows
    pub fn path_translated(&self, dx: f32, dy: f32) -> Option<Path> {
        self.path()?.transform(Transform::from_translate(dx, dy))
    }
}

impl Outline for Shape {
    fn area(&self) -> f32 {
        match self {
            Shape::Polygon(s) => s.area(),
            Shape::Star(s) => s.area(),
            Shape::Circle(s) => s.area(),
        }
    }

    fn radius(&self) -> f32 {
        match self {
            Shape::Polygon(s) => s.radius(),
            Shape::Star(s) => s.radius(),
            Shape::Circle(s) => s.radius(),
        }
    }

    fn transformed(&self, xform: &Affine2<f32>) -> Self {
        match self {
            Shape::Polygon(s) => Shape::Polygon(s.transformed(xform)),
            Shape::Star(s) => Shape::Star(s.transformed(xform)),
            Shape::Circle(s) => Shape::Circle(s.transformed(xform)),
        }
    }

    fn trace(&self, pb: &mut PathBuilder) {
        match self {
            Shape::Polygon(s) => s.trace(pb),
            Shape::Star(s) => s.trace(pb),
            Shape::Circle(s) => s.trace(pb),
        }
    }

    fn name(&self) -> &str {
        match self {
            Shape::Polygon(s) => s.name(),
            Shape::Star(s) => s.name(),
            Shape::Circle(s) => s.name(),
        }
    }
}

impl From<RegularPolygon> for Shape {
    fn from(shape: RegularPolygon) -> Self {
        Shape::Polygon(shape)
    }
}

impl From<Star> for Shape {
    fn from(shape: Star) -> Self {
        Shape::Star(shape)
    }
}

impl From<Circle> for Shape {
    fn from(shape: Circle) -> Self {
        Shape::Circle(shape)
    }
}

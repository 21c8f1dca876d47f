//! 2D geometry primitives for the local search frame
//!
//! Points, lines, and polygons in the planar meters frame, plus the
//! compass-bearing helpers the planner is built on. Compass headings are
//! degrees [0, 360) with 0 at north increasing clockwise; polar angles are
//! radians (-pi, pi] with 0 at east increasing counter-clockwise.

use crate::error::{Result, VarunaError};
use std::f64::consts::PI;

/// Cosines this close to zero are numerical noise from pi/2 multiples and
/// are snapped to exactly zero so near-vertical lines become vertical.
pub(crate) const COS_EPSILON: f64 = 6e-16;

/// Points closer than this to a polygon edge count as inside, so waypoints
/// computed to lie exactly on a boundary line do not flap.
const EDGE_TOLERANCE: f64 = 0.1;

/// A point in the local planar frame (meters)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Euclidean distance to another point, exactly zero for equal points
    pub fn distance(&self, other: Point) -> f64 {
        if *self == other {
            return 0.0;
        }
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Compass bearing in degrees [0, 360) from `from` to `to`
///
/// Returns `None` when the points coincide. Axis-aligned pairs resolve
/// directly to 0/90/180/270; everything else comes from the arctangent of
/// the slope with a quadrant correction on the sign of the y delta.
pub fn bearing_to_point(from: Point, to: Point) -> Option<f64> {
    if from == to {
        return None;
    }

    if from.x == to.x {
        return Some(if to.y > from.y { 0.0 } else { 180.0 });
    }

    if from.y == to.y {
        return Some(if to.x > from.x { 90.0 } else { 270.0 });
    }

    let slope = (to.y - from.y) / (to.x - from.x);
    let bearing = if slope > 0.0 {
        let bearing = 90.0 - slope.atan().to_degrees();
        if to.y < from.y {
            (bearing + 180.0) % 360.0
        } else {
            bearing
        }
    } else {
        let bearing = -slope.atan().to_degrees() + 90.0;
        if to.y > from.y {
            (bearing + 180.0) % 360.0
        } else {
            bearing
        }
    };

    Some(bearing)
}

/// Convert a compass heading in degrees to a polar angle in (-pi, pi]
pub fn compass_heading_to_polar_angle(heading: f64) -> f64 {
    let heading = heading.rem_euclid(360.0);
    let angle = (-(heading - 360.0) + 90.0).rem_euclid(360.0).to_radians();

    if angle > PI {
        angle - 2.0 * PI
    } else {
        angle
    }
}

/// Difference `a - b` between two polar angles, normalized to (-pi, pi]
pub fn angle_difference(a: f64, b: f64) -> f64 {
    let mut difference = a - b;
    while difference > PI {
        difference -= 2.0 * PI;
    }
    while difference <= -PI {
        difference += 2.0 * PI;
    }
    difference
}

/// A line in slope/intercept form
///
/// A vertical line has `slope == f64::INFINITY`, a defined `x`, and a
/// y-intercept only when it passes through x = 0. Exactly one of
/// `y_intercept` and `x` is meaningful per construction mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line {
    pub slope: f64,
    pub y_intercept: Option<f64>,
    pub x: Option<f64>,
}

/// Slope, intercept, and x for the line through two distinct points
fn formula_from_points(p1: Point, p2: Point) -> Line {
    if p1.x == p2.x {
        Line {
            slope: f64::INFINITY,
            y_intercept: if p1.x == 0.0 { Some(0.0) } else { None },
            x: Some(p1.x),
        }
    } else {
        let slope = (p2.y - p1.y) / (p2.x - p1.x);
        Line {
            slope,
            y_intercept: Some(-slope * p2.x + p2.y),
            x: None,
        }
    }
}

impl Line {
    /// Line through two distinct points
    ///
    /// Two equal points do not define a line and are rejected outright
    /// rather than producing an arbitrary vertical.
    pub fn from_two_points(p1: Point, p2: Point) -> Result<Line> {
        if p1 == p2 {
            return Err(VarunaError::Geometry(format!(
                "two identical points ({}, {}) do not define a line",
                p1.x, p1.y
            )));
        }

        Ok(formula_from_points(p1, p2))
    }

    /// Line from an explicit formula
    pub fn from_formula(slope: f64, y_intercept: Option<f64>, x: Option<f64>) -> Result<Line> {
        if slope.is_infinite() {
            let x = match (y_intercept, x) {
                (Some(_), _) => 0.0,
                (None, Some(x)) => x,
                (None, None) => {
                    return Err(VarunaError::Geometry(
                        "not enough information to define a line".into(),
                    ))
                }
            };
            return Ok(Line {
                slope,
                y_intercept,
                x: Some(x),
            });
        }

        match y_intercept {
            Some(_) => Ok(Line {
                slope,
                y_intercept,
                x: None,
            }),
            None => Err(VarunaError::Geometry(
                "not enough information to define a line".into(),
            )),
        }
    }

    /// Line through a point along a compass heading
    pub fn from_heading(point: Point, heading: f64) -> Line {
        let polar_angle = compass_heading_to_polar_angle(heading);

        let mut x_offset = polar_angle.cos();
        if x_offset.abs() < COS_EPSILON {
            x_offset = 0.0;
        }
        let y_offset = polar_angle.sin();

        let second_point = Point::new(point.x + x_offset, point.y + y_offset);

        // The offset is a unit vector, so the two points are always distinct.
        formula_from_points(point, second_point)
    }

    /// Line parallel to this one, through the given point
    pub fn parallel_through(&self, point: Point) -> Line {
        if self.slope.is_infinite() {
            Line {
                slope: f64::INFINITY,
                y_intercept: if point.x == 0.0 { Some(0.0) } else { None },
                x: Some(point.x),
            }
        } else {
            Line {
                slope: self.slope,
                y_intercept: Some(point.y - self.slope * point.x),
                x: None,
            }
        }
    }

    /// Intersection of two lines, `None` for parallel lines
    pub fn find_intersection(&self, other: &Line) -> Option<Point> {
        if self.slope == other.slope {
            // Parallel, including two verticals.
            return None;
        }

        let (intersection_x, slope, y_intercept) = if self.slope.is_infinite() {
            (self.x?, other.slope, other.y_intercept?)
        } else if other.slope.is_infinite() {
            (other.x?, self.slope, self.y_intercept?)
        } else {
            let x = (self.y_intercept? - other.y_intercept?) / (other.slope - self.slope);
            (x, other.slope, other.y_intercept?)
        };

        Some(Point::new(intersection_x, slope * intersection_x + y_intercept))
    }

    /// Line through `point` perpendicular to this one
    pub fn find_perpendicular(&self, point: Point) -> Line {
        if self.slope.is_infinite() {
            Line {
                slope: 0.0,
                y_intercept: Some(point.y),
                x: None,
            }
        } else if self.slope == 0.0 {
            Line {
                slope: f64::INFINITY,
                y_intercept: if point.x == 0.0 { Some(0.0) } else { None },
                x: Some(point.x),
            }
        } else {
            let slope = -1.0 / self.slope;
            Line {
                slope,
                y_intercept: Some(point.y - slope * point.x),
                x: None,
            }
        }
    }

    /// Whether the point satisfies the line equation exactly
    pub fn on_the_line(&self, point: Point) -> bool {
        if self.slope.is_infinite() {
            return self.x == Some(point.x);
        }

        self.y_intercept
            .is_some_and(|b| point.y == self.slope * point.x + b)
    }

    /// Shortest distance from the point to the line
    pub fn distance_to_point(&self, point: Point) -> f64 {
        if self.on_the_line(point) {
            return 0.0;
        }

        // Drop a perpendicular and measure to its foot.
        let perpendicular = self.find_perpendicular(point);
        self.find_intersection(&perpendicular)
            .map(|foot| foot.distance(point))
            .unwrap_or(0.0)
    }

    /// Point on the line `distance` units from `starting_point`, in the
    /// direction of `destination_point`
    ///
    /// Both points must lie on the line; the destination only selects which
    /// of the two candidate directions is taken.
    pub fn point_at_distance(
        &self,
        starting_point: Point,
        destination_point: Point,
        distance: f64,
    ) -> Point {
        if self.slope.is_finite() {
            let offset = distance / (1.0 + self.slope.powi(2)).sqrt();
            let first_x = starting_point.x + offset;
            let second_x = starting_point.x - offset;

            let x = if starting_point.x < destination_point.x {
                if first_x > starting_point.x { first_x } else { second_x }
            } else if first_x < starting_point.x {
                first_x
            } else {
                second_x
            };

            // Finite slope implies a defined intercept.
            let y_intercept = self.y_intercept.unwrap_or(0.0);
            Point::new(x, self.slope * x + y_intercept)
        } else {
            let first_y = starting_point.y + distance;
            let second_y = starting_point.y - distance;

            let y = if starting_point.y < destination_point.y {
                if first_y > starting_point.y { first_y } else { second_y }
            } else if first_y < starting_point.y {
                first_y
            } else {
                second_y
            };

            Point::new(starting_point.x, y)
        }
    }
}

/// A polygon defined by at least three ordered vertices
#[derive(Clone, Debug)]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    pub fn new(vertices: Vec<Point>) -> Result<Polygon> {
        if vertices.len() < 3 {
            return Err(VarunaError::Geometry(
                "a polygon needs a minimum of three vertices".into(),
            ));
        }

        Ok(Polygon { vertices })
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Sum of the edge lengths
    pub fn perimeter(&self) -> f64 {
        let mut total = 0.0;
        for (i, vertex) in self.vertices.iter().enumerate() {
            let next = self.vertices[(i + 1) % self.vertices.len()];
            total += vertex.distance(next);
        }
        total
    }

    /// Whether the point is inside the polygon or on its boundary
    ///
    /// An even-odd ray cast, widened so points within [`EDGE_TOLERANCE`] of
    /// an edge count as inside.
    pub fn point_is_inside(&self, point: Point) -> bool {
        let mut inside = false;
        let mut j = self.vertices.len() - 1;

        for i in 0..self.vertices.len() {
            let vi = self.vertices[i];
            let vj = self.vertices[j];

            if (vi.y > point.y) != (vj.y > point.y) {
                let crossing_x = (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x;
                if point.x < crossing_x {
                    inside = !inside;
                }
            }
            j = i;
        }

        if inside {
            return true;
        }

        // Edge case: on or nearly on the boundary.
        for (i, vertex) in self.vertices.iter().enumerate() {
            let next = self.vertices[(i + 1) % self.vertices.len()];
            if distance_to_segment(*vertex, next, point) <= EDGE_TOLERANCE {
                return true;
            }
        }

        false
    }
}

/// Distance from `point` to the segment between `a` and `b`
fn distance_to_segment(a: Point, b: Point, point: Point) -> f64 {
    let length_squared = (b.x - a.x).powi(2) + (b.y - a.y).powi(2);
    if length_squared == 0.0 {
        return a.distance(point);
    }

    let t = ((point.x - a.x) * (b.x - a.x) + (point.y - a.y) * (b.y - a.y)) / length_squared;
    let t = t.clamp(0.0, 1.0);
    let projection = Point::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y));

    projection.distance(point)
}

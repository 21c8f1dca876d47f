//! Search area and survey path planning
//!
//! A [`SearchSpace`] is a buffered quadrilateral in the local frame together
//! with the water current and depth limits. The planner sweeps the area with
//! tracks perpendicular to the current, stepping depth between passes, so the
//! vehicle crosses anything drifting down-current of a source.

use crate::config::SearchConfig;
use crate::error::{Result, VarunaError};
use crate::geometry::{
    angle_difference, compass_heading_to_polar_angle, Line, Point, Polygon, COS_EPSILON,
};
use tracing::debug;

/// Polar angles closer than this are treated as the same direction when
/// deciding whether a candidate waypoint lies along the track heading.
const HEADING_TOLERANCE_RADIANS: f64 = 1e-5;

/// Water current as a compass set (direction flowed toward, degrees) and
/// drift speed in knots
#[derive(Clone, Copy, Debug)]
pub struct CurrentVelocity {
    pub set: f64,
    pub drift: f64,
}

/// A commanded position on the survey path
///
/// Travel waypoints carry the track heading; depth-change waypoints have no
/// heading because the vehicle holds position while it changes depth.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Waypoint {
    pub position: Point,
    pub depth: f64,
    pub heading: Option<f64>,
}

/// The volume to sweep and the pattern parameters for sweeping it
#[derive(Clone, Debug)]
pub struct SearchSpace {
    boundaries: [Line; 4],
    polygon: Polygon,
    current: CurrentVelocity,
    start: Point,
    min_depth: f64,
    max_depth: f64,
    track_separation: f64,
    up_current_offset: f64,
    vertex_offset: f64,
    min_depth_offset: f64,
}

impl SearchSpace {
    /// Build a search space from the declared corners, pulled inward by the
    /// configured buffer
    ///
    /// Corners are ordered northwest, northeast, southeast, southwest. Each
    /// edge is offset toward the centroid by `buffer_meters` and the offset
    /// edges are re-intersected to form the working boundary.
    pub fn from_corners(
        corners: [Point; 4],
        start: Point,
        current: CurrentVelocity,
        search: &SearchConfig,
    ) -> Result<SearchSpace> {
        let centroid = Point::new(
            corners.iter().map(|c| c.x).sum::<f64>() / 4.0,
            corners.iter().map(|c| c.y).sum::<f64>() / 4.0,
        );

        let mut edges = [Line::from_formula(0.0, Some(0.0), None)?; 4];
        for i in 0..4 {
            let a = corners[i];
            let b = corners[(i + 1) % 4];
            let edge = Line::from_two_points(a, b)?;

            let midpoint = Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
            let inward = edge.find_perpendicular(midpoint);
            let toward = inward
                .find_intersection(&inward.find_perpendicular(centroid))
                .ok_or_else(|| {
                    VarunaError::Planning("search area corners are degenerate".into())
                })?;
            let offset_point = inward.point_at_distance(midpoint, toward, search.buffer_meters);

            edges[i] = edge.parallel_through(offset_point);
        }

        // Buffered corners are the intersections of consecutive offset edges.
        let mut vertices = Vec::with_capacity(4);
        for i in 0..4 {
            let previous = edges[(i + 3) % 4];
            let vertex = previous.find_intersection(&edges[i]).ok_or_else(|| {
                VarunaError::Planning("buffered boundary edges do not close".into())
            })?;
            vertices.push(vertex);
        }

        Ok(SearchSpace {
            boundaries: edges,
            polygon: Polygon::new(vertices)?,
            current,
            start,
            min_depth: search.min_depth_meters,
            max_depth: search.max_depth_meters,
            track_separation: search.track_separation_meters,
            up_current_offset: search.up_current_offset_meters,
            vertex_offset: search.vertex_offset_meters,
            min_depth_offset: search.min_depth_offset_meters,
        })
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn min_depth(&self) -> f64 {
        self.min_depth
    }

    pub fn max_depth(&self) -> f64 {
        self.max_depth
    }

    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    pub fn current(&self) -> CurrentVelocity {
        self.current
    }

    /// Heading and end waypoint for the next track across the area
    ///
    /// Tracks run perpendicular to the current. The track line is intersected
    /// with every boundary and the in-area intersection farthest from `from`
    /// is the next waypoint; the heading is flipped when that waypoint turns
    /// out to lie behind the assumed direction.
    pub fn next_track_heading_and_waypt(&self, from: Point) -> Result<(f64, Point)> {
        let mut heading = (self.current.set + 90.0) % 360.0;
        let track = Line::from_heading(from, heading);

        let mut waypt: Option<Point> = None;
        for boundary in &self.boundaries {
            let candidate = match track.find_intersection(boundary) {
                Some(p) if self.polygon.point_is_inside(p) => p,
                _ => continue,
            };
            if waypt.map_or(true, |w| candidate.distance(from) > w.distance(from)) {
                waypt = Some(candidate);
            }
        }

        let waypt = waypt.ok_or_else(|| {
            VarunaError::Planning(format!(
                "no track from ({}, {}) crosses the search area",
                from.x, from.y
            ))
        })?;

        let track_angle = compass_heading_to_polar_angle(heading);
        let waypt_angle = (waypt.y - from.y).atan2(waypt.x - from.x);
        if angle_difference(waypt_angle, track_angle).abs() > HEADING_TOLERANCE_RADIANS {
            heading = (heading + 180.0) % 360.0;
        }

        Ok((heading, waypt))
    }

    /// Depth for the track after one at `depth`, clamped to the survey band
    pub fn next_track_depth(&self, depth: f64) -> f64 {
        (depth + self.track_separation).clamp(self.min_depth, self.max_depth)
    }

    /// Full survey path from the given position and depth
    ///
    /// Alternating travel and depth-change waypoints until the depth band is
    /// covered. A depth band the track separation cannot cross yields an
    /// empty path.
    pub fn calculate_search_path(&self, position: Point, depth: f64) -> Result<Vec<Waypoint>> {
        let passes = ((self.max_depth - self.min_depth) / self.track_separation).trunc() as i64 + 1;
        if passes <= 0 {
            return Ok(Vec::new());
        }

        let mut path = Vec::with_capacity(2 * passes as usize - 1);
        let mut position = position;
        let mut depth = depth;

        for pass in 0..passes {
            let (heading, waypt) = self.next_track_heading_and_waypt(position)?;
            path.push(Waypoint {
                position: waypt,
                depth,
                heading: Some(heading),
            });

            if pass < passes - 1 {
                depth = self.next_track_depth(depth);
                path.push(Waypoint {
                    position: waypt,
                    depth,
                    heading: None,
                });
            }

            position = waypt;
        }

        debug!(
            passes,
            waypoints = path.len(),
            "calculated search path"
        );

        Ok(path)
    }

    /// Point `offset` meters up-current of `position`
    pub fn up_current_point(&self, position: Point, offset: f64) -> Point {
        let angle = compass_heading_to_polar_angle((self.current.set + 180.0) % 360.0);

        let mut dx = angle.cos();
        if dx.abs() < COS_EPSILON {
            dx = 0.0;
        }
        let mut dy = angle.sin();
        if dy.abs() < COS_EPSILON {
            dy = 0.0;
        }

        Point::new(position.x + offset * dx, position.y + offset * dy)
    }

    /// Tighten the area around a detection
    ///
    /// The start moves up-current of the detection, the boundary shrinks to a
    /// box `vertex_offset` meters around the new start, and the depth floor
    /// rises to just above the detection depth. The boundary buffer is not
    /// reapplied; the constrained box is already well inside the area.
    pub fn constrain_search_area(&mut self, position: Point, depth: f64) -> Result<()> {
        self.start = self.up_current_point(position, self.up_current_offset);

        let v = self.vertex_offset;
        let corners = [
            Point::new(self.start.x - v, self.start.y + v),
            Point::new(self.start.x + v, self.start.y + v),
            Point::new(self.start.x + v, self.start.y - v),
            Point::new(self.start.x - v, self.start.y - v),
        ];

        let mut boundaries = [Line::from_formula(0.0, Some(0.0), None)?; 4];
        for i in 0..4 {
            boundaries[i] = Line::from_two_points(corners[i], corners[(i + 1) % 4])?;
        }

        self.boundaries = boundaries;
        self.polygon = Polygon::new(corners.to_vec())?;
        self.min_depth = self.min_depth.max(depth - self.min_depth_offset);

        debug!(
            start_x = self.start.x,
            start_y = self.start.y,
            min_depth = self.min_depth,
            "constrained search area"
        );

        Ok(())
    }

    /// Re-anchor the start up-current of a repeat detection, keeping the
    /// constrained boundary and depth band
    pub fn shift_search_area(&mut self, position: Point) {
        self.start = self.up_current_point(position, self.up_current_offset);

        debug!(
            start_x = self.start.x,
            start_y = self.start.y,
            "shifted search area"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn test_config() -> SearchConfig {
        SearchConfig {
            buffer_meters: 0.0,
            track_separation_meters: 4.5,
            min_depth_meters: 0.5,
            max_depth_meters: 30.0,
            up_current_offset_meters: 5.0,
            vertex_offset_meters: 10.0,
            min_depth_offset_meters: 10.0,
        }
    }

    /// Unbuffered box x in [10, 100], y in [100, 300]
    fn test_space(set: f64, start: Point) -> SearchSpace {
        let corners = [
            Point::new(10.0, 300.0),
            Point::new(100.0, 300.0),
            Point::new(100.0, 100.0),
            Point::new(10.0, 100.0),
        ];
        SearchSpace::from_corners(corners, start, CurrentVelocity { set, drift: 0.5 }, &test_config())
            .unwrap()
    }

    #[test]
    fn test_buffer_pulls_corners_inward() {
        let corners = [
            Point::new(0.0, 310.0),
            Point::new(110.0, 310.0),
            Point::new(110.0, 90.0),
            Point::new(0.0, 90.0),
        ];
        let mut config = test_config();
        config.buffer_meters = 10.0;

        let space = SearchSpace::from_corners(
            corners,
            Point::new(50.0, 200.0),
            CurrentVelocity {
                set: 90.0,
                drift: 0.5,
            },
            &config,
        )
        .unwrap();

        let vertices = space.polygon().vertices();
        assert_relative_eq!(vertices[0].x, 10.0);
        assert_relative_eq!(vertices[0].y, 300.0);
        assert_relative_eq!(vertices[1].x, 100.0);
        assert_relative_eq!(vertices[1].y, 300.0);
        assert_relative_eq!(vertices[2].x, 100.0);
        assert_relative_eq!(vertices[2].y, 100.0);
        assert_relative_eq!(vertices[3].x, 10.0);
        assert_relative_eq!(vertices[3].y, 100.0);
    }

    #[test]
    fn test_track_with_easterly_current() {
        let space = test_space(90.0, Point::new(80.0, 150.0));
        let (heading, waypt) = space
            .next_track_heading_and_waypt(Point::new(80.0, 150.0))
            .unwrap();

        assert_relative_eq!(heading, 0.0);
        assert_relative_eq!(waypt.x, 80.0);
        assert_relative_eq!(waypt.y, 300.0);
    }

    #[test]
    fn test_track_with_westerly_current() {
        let space = test_space(270.0, Point::new(80.0, 150.0));
        let (heading, waypt) = space
            .next_track_heading_and_waypt(Point::new(80.0, 150.0))
            .unwrap();

        assert_relative_eq!(heading, 0.0);
        assert_relative_eq!(waypt.x, 80.0);
        assert_relative_eq!(waypt.y, 300.0);
    }

    #[test]
    fn test_track_with_northerly_current() {
        let space = test_space(0.0, Point::new(80.0, 150.0));
        let (heading, waypt) = space
            .next_track_heading_and_waypt(Point::new(80.0, 150.0))
            .unwrap();

        assert_relative_eq!(heading, 270.0);
        assert_relative_eq!(waypt.x, 10.0);
        assert_relative_eq!(waypt.y, 150.0);
    }

    #[test]
    fn test_track_with_diagonal_current() {
        let space = test_space(135.0, Point::new(80.0, 105.0));
        let (heading, waypt) = space
            .next_track_heading_and_waypt(Point::new(80.0, 105.0))
            .unwrap();

        assert_relative_eq!(heading, 45.0);
        assert_relative_eq!(waypt.x, 100.0, epsilon = 1e-9);
        assert_relative_eq!(waypt.y, 125.0, epsilon = 1e-9);
    }

    #[test]
    fn test_track_with_opposite_diagonal_current() {
        let space = test_space(225.0, Point::new(80.0, 105.0));
        let (heading, waypt) = space
            .next_track_heading_and_waypt(Point::new(80.0, 105.0))
            .unwrap();

        assert_relative_eq!(heading, 315.0);
        assert_relative_eq!(waypt.x, 10.0, epsilon = 1e-9);
        assert_relative_eq!(waypt.y, 175.0, epsilon = 1e-9);
    }

    #[test]
    fn test_track_from_outside_the_area_fails() {
        let space = test_space(90.0, Point::new(80.0, 150.0));
        assert!(space
            .next_track_heading_and_waypt(Point::new(500.0, 500.0))
            .is_err());
    }

    #[test]
    fn test_next_track_depth() {
        let space = test_space(90.0, Point::new(80.0, 150.0));
        assert_relative_eq!(space.next_track_depth(14.0), 18.5);

        let mut config = test_config();
        config.track_separation_meters = 7.0;
        config.max_depth_meters = 20.0;
        let corners = [
            Point::new(10.0, 300.0),
            Point::new(100.0, 300.0),
            Point::new(100.0, 100.0),
            Point::new(10.0, 100.0),
        ];
        let clamped = SearchSpace::from_corners(
            corners,
            Point::new(80.0, 150.0),
            CurrentVelocity {
                set: 90.0,
                drift: 0.5,
            },
            &config,
        )
        .unwrap();
        assert_relative_eq!(clamped.next_track_depth(14.0), 20.0);

        config.track_separation_meters = -5.0;
        let shallower = SearchSpace::from_corners(
            corners,
            Point::new(80.0, 150.0),
            CurrentVelocity {
                set: 90.0,
                drift: 0.5,
            },
            &config,
        )
        .unwrap();
        assert_relative_eq!(shallower.next_track_depth(14.0), 9.0);
    }

    #[test]
    fn test_calculate_search_path() {
        let space = test_space(90.0, Point::new(80.0, 150.0));
        let path = space
            .calculate_search_path(Point::new(80.0, 150.0), 14.0)
            .unwrap();

        // 7 passes of the 0.5..30 band at 4.5 m separation, with a
        // depth-change waypoint between consecutive passes.
        assert_eq!(path.len(), 13);

        assert_eq!(
            path[0],
            Waypoint {
                position: Point::new(80.0, 300.0),
                depth: 14.0,
                heading: Some(0.0),
            }
        );
        assert_eq!(
            path[1],
            Waypoint {
                position: Point::new(80.0, 300.0),
                depth: 18.5,
                heading: None,
            }
        );

        // The next pass runs back south along the same track line.
        assert_eq!(
            path[2],
            Waypoint {
                position: Point::new(80.0, 100.0),
                depth: 18.5,
                heading: Some(180.0),
            }
        );

        // Depth walks down and clamps at the survey floor.
        let depths: Vec<f64> = path
            .iter()
            .filter(|w| w.heading.is_some())
            .map(|w| w.depth)
            .collect();
        assert_eq!(depths, vec![14.0, 18.5, 23.0, 27.5, 30.0, 30.0, 30.0]);

        // Travel waypoints alternate between the two boundary crossings.
        assert!(path.last().unwrap().heading.is_some());
    }

    #[test]
    fn test_up_current_point() {
        let space = test_space(90.0, Point::new(80.0, 150.0));
        let point = space.up_current_point(Point::new(100.0, 200.0), 5.0);
        assert_eq!(point, Point::new(95.0, 200.0));

        let northerly = test_space(0.0, Point::new(80.0, 150.0));
        let point = northerly.up_current_point(Point::new(100.0, 200.0), 5.0);
        assert_eq!(point, Point::new(100.0, 195.0));
    }

    #[test]
    fn test_constrain_search_area() {
        let mut config = test_config();
        config.min_depth_meters = 5.0;
        let corners = [
            Point::new(10.0, 300.0),
            Point::new(100.0, 300.0),
            Point::new(100.0, 100.0),
            Point::new(10.0, 100.0),
        ];
        let mut space = SearchSpace::from_corners(
            corners,
            Point::new(80.0, 150.0),
            CurrentVelocity {
                set: 90.0,
                drift: 0.5,
            },
            &config,
        )
        .unwrap();

        space
            .constrain_search_area(Point::new(100.0, 200.0), 6.0)
            .unwrap();

        assert_eq!(space.start(), Point::new(95.0, 200.0));

        let vertices = space.polygon().vertices();
        assert_eq!(vertices[0], Point::new(85.0, 210.0));
        assert_eq!(vertices[1], Point::new(105.0, 210.0));
        assert_eq!(vertices[2], Point::new(105.0, 190.0));
        assert_eq!(vertices[3], Point::new(85.0, 190.0));

        // A shallow detection leaves the depth floor alone.
        assert_relative_eq!(space.min_depth(), 5.0);

        // A deep one raises it.
        space
            .constrain_search_area(Point::new(100.0, 200.0), 25.0)
            .unwrap();
        assert_relative_eq!(space.min_depth(), 15.0);
    }

    #[test]
    fn test_shift_search_area() {
        let mut space = test_space(90.0, Point::new(80.0, 150.0));
        let before = space.polygon().vertices().to_vec();

        space.shift_search_area(Point::new(60.0, 250.0));

        assert_eq!(space.start(), Point::new(55.0, 250.0));
        assert_eq!(space.polygon().vertices(), &before[..]);
    }
}

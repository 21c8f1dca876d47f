//! Geodetic to local frame conversion
//!
//! Converts between decimal latitude/longitude and the planar meters frame
//! whose origin is the southwest corner of the declared boundary. Degree
//! lengths come from WGS84-style series expansions, so the conversion is
//! only valid over small spans: degree deltas in [0, 10] at latitudes in
//! [0, 90).

use crate::error::{Result, VarunaError};
use crate::geometry::Point;

/// Meters spanned by `lat_degrees` of latitude at the given latitude
pub fn lat_degrees_to_meters(lat_degrees: f64, at_this_latitude: f64) -> Result<f64> {
    if !(0.0..=10.0).contains(&lat_degrees) || !(0.0..=90.0).contains(&at_this_latitude) {
        return Err(VarunaError::OutOfBounds(
            "degrees must be [0.0, 10.0] and latitude [0.0, 90.0]".into(),
        ));
    }

    let lat = at_this_latitude.abs().to_radians();

    let second = 559.82 * (2.0 * lat).cos();
    let fourth = 1.175 * (4.0 * lat).cos();
    let sixth = 0.0023 * (6.0 * lat).cos();

    let meters_per_degree = 111132.92 - second + fourth - sixth;

    Ok(lat_degrees * meters_per_degree)
}

/// Meters spanned by `lon_degrees` of longitude at the given latitude
pub fn lon_degrees_to_meters(lon_degrees: f64, at_this_latitude: f64) -> Result<f64> {
    if !(0.0..=10.0).contains(&lon_degrees)
        || at_this_latitude >= 90.0
        || at_this_latitude < 0.0
    {
        return Err(VarunaError::OutOfBounds(
            "degrees must be [0.0, 10.0] and latitude [0.0, 90.0)".into(),
        ));
    }

    let lat = at_this_latitude.abs().to_radians();

    let first = 111412.84 * lat.cos();
    let third = 93.5 * (3.0 * lat).cos();
    let fifth = 0.118 * (5.0 * lat).cos();

    let meters_per_degree = first - third + fifth;

    Ok(lon_degrees * meters_per_degree)
}

/// Converter between geodetic positions and the local planar frame
#[derive(Clone, Debug)]
pub struct NavConverter {
    north_lat: f64,
    south_lat: f64,
    east_lon: f64,
    west_lon: f64,
    center_lat: f64,
    center_lon: f64,
    east_west_distance_meters: f64,
    north_south_distance_meters: f64,
}

impl NavConverter {
    /// Build a converter from the declared boundary positions
    pub fn from_boundaries(
        north_lat: f64,
        south_lat: f64,
        east_lon: f64,
        west_lon: f64,
    ) -> Result<NavConverter> {
        if north_lat < south_lat || east_lon < west_lon {
            return Err(VarunaError::Config(
                "north must be greater than south and east greater than west".into(),
            ));
        }

        let center_lat = (north_lat - south_lat) / 2.0 + south_lat;
        let center_lon = (east_lon - west_lon) / 2.0 + west_lon;

        Ok(NavConverter {
            north_lat,
            south_lat,
            east_lon,
            west_lon,
            center_lat,
            center_lon,
            east_west_distance_meters: lon_degrees_to_meters(east_lon - west_lon, center_lat)?,
            north_south_distance_meters: lat_degrees_to_meters(north_lat - south_lat, center_lat)?,
        })
    }

    /// Build a converter from a center position and the area dimensions
    pub fn from_center(
        center_lat: f64,
        center_lon: f64,
        east_west_distance: f64,
        north_south_distance: f64,
    ) -> Result<NavConverter> {
        let lon_deg_per_meter = 1.0 / lon_degrees_to_meters(1.0, center_lat)?;
        let east_west_degrees = east_west_distance * lon_deg_per_meter;

        let lat_deg_per_meter = 1.0 / lat_degrees_to_meters(1.0, center_lat)?;
        let north_south_degrees = north_south_distance * lat_deg_per_meter;

        Ok(NavConverter {
            north_lat: center_lat + north_south_degrees / 2.0,
            south_lat: center_lat - north_south_degrees / 2.0,
            east_lon: center_lon + east_west_degrees / 2.0,
            west_lon: center_lon - east_west_degrees / 2.0,
            center_lat,
            center_lon,
            east_west_distance_meters: east_west_distance,
            north_south_distance_meters: north_south_distance,
        })
    }

    pub fn north_lat(&self) -> f64 {
        self.north_lat
    }

    pub fn south_lat(&self) -> f64 {
        self.south_lat
    }

    pub fn east_lon(&self) -> f64 {
        self.east_lon
    }

    pub fn west_lon(&self) -> f64 {
        self.west_lon
    }

    pub fn center_lat(&self) -> f64 {
        self.center_lat
    }

    pub fn center_lon(&self) -> f64 {
        self.center_lon
    }

    /// East-west span of the area in meters
    pub fn east_west_distance_meters(&self) -> f64 {
        self.east_west_distance_meters
    }

    /// North-south span of the area in meters
    pub fn north_south_distance_meters(&self) -> f64 {
        self.north_south_distance_meters
    }

    /// Map a geodetic position to meters from the southwest corner
    pub fn geo_to_cartesian(&self, lat: f64, lon: f64) -> Result<Point> {
        if lat < self.south_lat || lat > self.north_lat || lon < self.west_lon || lon > self.east_lon
        {
            return Err(VarunaError::OutOfBounds(format!(
                "position ({}, {}) is outside the defined area",
                lat, lon
            )));
        }

        let x = lon_degrees_to_meters(lon - self.west_lon, self.center_lat)?;
        let y = lat_degrees_to_meters(lat - self.south_lat, self.center_lat)?;

        Ok(Point::new(x, y))
    }

    /// Map meters from the southwest corner back to latitude and longitude
    pub fn cartesian_to_geo(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        if x < 0.0
            || x > self.east_west_distance_meters
            || y < 0.0
            || y > self.north_south_distance_meters
        {
            return Err(VarunaError::OutOfBounds(format!(
                "position ({}, {}) is outside the defined area",
                x, y
            )));
        }

        let lat = self.south_lat + y / lat_degrees_to_meters(1.0, self.center_lat)?;
        let lon = self.west_lon + x / lon_degrees_to_meters(1.0, self.center_lat)?;

        Ok((lat, lon))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lat_degrees_to_meters() {
        assert_relative_eq!(
            lat_degrees_to_meters(1.0, 45.0).unwrap(),
            111131.7,
            max_relative = 0.001
        );
        assert_relative_eq!(
            lat_degrees_to_meters(1.0, 18.0).unwrap(),
            110680.38,
            max_relative = 0.001
        );
        assert_relative_eq!(
            lat_degrees_to_meters(1.0, 0.0).unwrap(),
            110574.2,
            max_relative = 0.001
        );

        let one_second = 0.000278;
        assert_relative_eq!(
            lat_degrees_to_meters(one_second, 0.0).unwrap(),
            30.715,
            max_relative = 0.001
        );
    }

    #[test]
    fn test_lon_degrees_to_meters() {
        assert_relative_eq!(
            lon_degrees_to_meters(1.0, 45.0).unwrap(),
            78846.8,
            max_relative = 0.001
        );
        assert_relative_eq!(
            lon_degrees_to_meters(1.0, 30.0).unwrap(),
            96486.2,
            max_relative = 0.001
        );
        assert_relative_eq!(
            lon_degrees_to_meters(1.0, 0.0).unwrap(),
            111319.491,
            max_relative = 0.001
        );
    }

    #[test]
    fn test_degree_conversion_domain() {
        assert!(lat_degrees_to_meters(11.0, 45.0).is_err());
        assert!(lat_degrees_to_meters(-1.0, 45.0).is_err());
        assert!(lat_degrees_to_meters(1.0, 91.0).is_err());
        assert!(lon_degrees_to_meters(1.0, 90.0).is_err());
    }

    #[test]
    fn test_center_calculations() {
        let nc = NavConverter::from_center(18.45, -66.1, 1000.0, 1000.0).unwrap();

        assert_relative_eq!(nc.north_lat(), 18.45451, max_relative = 0.00001);
        assert_relative_eq!(nc.south_lat(), 18.44548, max_relative = 0.00001);
        assert_relative_eq!(nc.east_lon(), -66.09527, max_relative = 0.00001);
        assert_relative_eq!(nc.west_lon(), -66.10474, max_relative = 0.00001);
    }

    #[test]
    fn test_boundary_calculations() {
        let nc = NavConverter::from_boundaries(30.5, 30.4, -65.5, -65.6).unwrap();

        assert_relative_eq!(nc.center_lat(), 30.45);
        assert_relative_eq!(nc.center_lon(), -65.55);
        assert_relative_eq!(nc.east_west_distance_meters(), 9604.7, max_relative = 0.001);
        assert_relative_eq!(
            nc.north_south_distance_meters(),
            11086.0,
            max_relative = 0.001
        );
    }

    #[test]
    fn test_illogical_boundaries_rejected() {
        assert!(NavConverter::from_boundaries(30.4, 30.5, -65.5, -65.6).is_err());
        assert!(NavConverter::from_boundaries(30.5, 30.4, -65.6, -65.5).is_err());
    }

    #[test]
    fn test_geo_to_cartesian() {
        let nc = NavConverter::from_boundaries(30.5, 30.4, -65.5, -65.6).unwrap();

        let southwest = nc.geo_to_cartesian(30.4, -65.6).unwrap();
        assert_eq!(southwest, Point::new(0.0, 0.0));

        let northeast = nc.geo_to_cartesian(30.5, -65.5).unwrap();
        assert_relative_eq!(northeast.x, nc.east_west_distance_meters());
        assert_relative_eq!(northeast.y, nc.north_south_distance_meters());

        assert!(nc.geo_to_cartesian(30.6, -65.55).is_err());
        assert!(nc.geo_to_cartesian(30.45, -65.7).is_err());
    }

    #[test]
    fn test_cartesian_to_geo() {
        let nc = NavConverter::from_boundaries(30.5, 30.4, -65.5, -65.6).unwrap();

        assert_eq!(nc.cartesian_to_geo(0.0, 0.0).unwrap(), (30.4, -65.6));
        assert!(nc.cartesian_to_geo(-1.0, 0.0).is_err());
        assert!(nc.cartesian_to_geo(0.0, 20000.0).is_err());
    }

    #[test]
    fn test_round_trip_is_sub_meter() {
        let nc = NavConverter::from_boundaries(30.5, 30.4, -65.5, -65.6).unwrap();

        let lat = 30.472;
        let lon = -65.531;
        let local = nc.geo_to_cartesian(lat, lon).unwrap();
        let (lat_back, lon_back) = nc.cartesian_to_geo(local.x, local.y).unwrap();

        let lat_error = lat_degrees_to_meters((lat_back - lat).abs(), 30.45).unwrap();
        let lon_error = lon_degrees_to_meters((lon_back - lon).abs(), 30.45).unwrap();
        assert!(lat_error < 1.0, "latitude error {} m", lat_error);
        assert!(lon_error < 1.0, "longitude error {} m", lon_error);
    }
}

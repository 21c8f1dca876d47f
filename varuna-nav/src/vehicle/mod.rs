//! Vehicle link abstraction
//!
//! The mission loop talks to the vehicle through [`VehicleLink`] and to the
//! chemical sensor through [`PlumeSensor`], so the same state machine runs
//! against the real UDP autopilot bridge or the in-memory mocks.

pub mod mock;
pub mod udp;

pub use mock::{MockPlumeSensor, MockVehicle};
pub use udp::UdpVehicle;

use crate::error::Result;
use crate::geometry::Point;
use std::time::{Duration, Instant};

/// One reading of the vehicle's navigation and health state
#[derive(Clone, Copy, Debug)]
pub struct VehicleSnapshot {
    /// Meters east of the local frame origin
    pub easting: f64,
    /// Meters north of the local frame origin
    pub northing: f64,
    /// Meters below the surface
    pub depth: f64,
    /// Meters above the seafloor, 0.0 when the sounder has no lock
    pub altitude: f64,
    /// Compass heading in degrees [0, 360)
    pub heading: f64,
    /// Speed through the water (m/s)
    pub speed: f64,
    /// Main battery voltage
    pub battery_voltage: f64,
    /// When this reading was received
    pub last_update: Instant,
}

impl VehicleSnapshot {
    pub fn position(&self) -> Point {
        Point::new(self.easting, self.northing)
    }

    /// How old this reading is
    pub fn age(&self) -> Duration {
        self.last_update.elapsed()
    }
}

/// Command and telemetry channel to the vehicle
pub trait VehicleLink: Send {
    /// Whether telemetry has been received at all
    fn connected(&self) -> bool;

    /// Latest telemetry, draining anything queued on the link
    fn snapshot(&mut self) -> Result<VehicleSnapshot>;

    /// Command a heading (degrees), depth (meters), and speed (m/s)
    fn command(&mut self, heading: f64, depth: f64, speed: f64) -> Result<()>;

    /// Switch the recovery strobe
    fn set_strobe(&mut self, on: bool) -> Result<()>;
}

/// The chemical plume detector
pub trait PlumeSensor: Send {
    /// Whether the plume chemical is present in the current sample
    fn plume_detected(&mut self) -> bool;
}

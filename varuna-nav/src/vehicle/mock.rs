//! In-memory vehicle and sensor for tests and dry runs

use super::{PlumeSensor, VehicleLink, VehicleSnapshot};
use crate::error::Result;
use crate::geometry::{compass_heading_to_polar_angle, COS_EPSILON};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Vertical rate used when simulating depth changes (m/s)
const DEPTH_RATE: f64 = 0.5;

#[derive(Clone, Copy, Debug)]
struct CommandRecord {
    heading: f64,
    depth: f64,
    speed: f64,
}

struct MockVehicleState {
    snapshot: VehicleSnapshot,
    strobe: bool,
    last_command: Option<CommandRecord>,
    commands_sent: usize,
}

/// Simulated vehicle sharing state between the mission and the test
///
/// Clones share one underlying vehicle, so a test can hand a clone to the
/// mission and keep another to steer the simulation and inspect commands.
#[derive(Clone)]
pub struct MockVehicle {
    state: Arc<Mutex<MockVehicleState>>,
}

impl MockVehicle {
    pub fn new(easting: f64, northing: f64, depth: f64) -> Self {
        MockVehicle {
            state: Arc::new(Mutex::new(MockVehicleState {
                snapshot: VehicleSnapshot {
                    easting,
                    northing,
                    depth,
                    altitude: 10.0,
                    heading: 0.0,
                    speed: 0.0,
                    battery_voltage: 16.0,
                    last_update: Instant::now(),
                },
                strobe: false,
                last_command: None,
                commands_sent: 0,
            })),
        }
    }

    pub fn set_position(&self, easting: f64, northing: f64) {
        let mut state = self.state.lock().unwrap();
        state.snapshot.easting = easting;
        state.snapshot.northing = northing;
        state.snapshot.last_update = Instant::now();
    }

    pub fn set_depth(&self, depth: f64) {
        let mut state = self.state.lock().unwrap();
        state.snapshot.depth = depth;
        state.snapshot.last_update = Instant::now();
    }

    pub fn set_altitude(&self, altitude: f64) {
        self.state.lock().unwrap().snapshot.altitude = altitude;
    }

    pub fn set_battery_voltage(&self, voltage: f64) {
        self.state.lock().unwrap().snapshot.battery_voltage = voltage;
    }

    /// Backdate the telemetry so it reads as `age` old
    pub fn make_stale(&self, age: Duration) {
        self.state.lock().unwrap().snapshot.last_update = Instant::now() - age;
    }

    pub fn strobe_is_on(&self) -> bool {
        self.state.lock().unwrap().strobe
    }

    pub fn commands_sent(&self) -> usize {
        self.state.lock().unwrap().commands_sent
    }

    /// Last commanded (heading, depth, speed), if any
    pub fn last_command(&self) -> Option<(f64, f64, f64)> {
        self.state
            .lock()
            .unwrap()
            .last_command
            .map(|c| (c.heading, c.depth, c.speed))
    }

    /// Advance the simulated vehicle by `dt` along the last command
    pub fn advance(&self, dt: Duration) {
        let mut state = self.state.lock().unwrap();
        let Some(command) = state.last_command else {
            return;
        };

        let seconds = dt.as_secs_f64();
        let angle = compass_heading_to_polar_angle(command.heading);

        let mut dx = angle.cos();
        if dx.abs() < COS_EPSILON {
            dx = 0.0;
        }
        let mut dy = angle.sin();
        if dy.abs() < COS_EPSILON {
            dy = 0.0;
        }

        state.snapshot.easting += command.speed * seconds * dx;
        state.snapshot.northing += command.speed * seconds * dy;
        state.snapshot.heading = command.heading;
        state.snapshot.speed = command.speed;

        let depth_error = command.depth - state.snapshot.depth;
        let depth_step = (DEPTH_RATE * seconds).min(depth_error.abs());
        state.snapshot.depth += depth_step * depth_error.signum();

        state.snapshot.last_update = Instant::now();
    }
}

impl VehicleLink for MockVehicle {
    fn connected(&self) -> bool {
        true
    }

    fn snapshot(&mut self) -> Result<VehicleSnapshot> {
        Ok(self.state.lock().unwrap().snapshot)
    }

    fn command(&mut self, heading: f64, depth: f64, speed: f64) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.last_command = Some(CommandRecord {
            heading,
            depth,
            speed,
        });
        state.commands_sent += 1;
        Ok(())
    }

    fn set_strobe(&mut self, on: bool) -> Result<()> {
        self.state.lock().unwrap().strobe = on;
        Ok(())
    }
}

/// Scripted plume detector
///
/// Pops one scripted reading per sample and reports no detection once the
/// script runs out.
#[derive(Clone, Default)]
pub struct MockPlumeSensor {
    readings: Arc<Mutex<VecDeque<bool>>>,
}

impl MockPlumeSensor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, readings: &[bool]) {
        self.readings.lock().unwrap().extend(readings.iter().copied());
    }
}

impl PlumeSensor for MockPlumeSensor {
    fn plume_detected(&mut self) -> bool {
        self.readings.lock().unwrap().pop_front().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_clones_share_state() {
        let vehicle = MockVehicle::new(10.0, 20.0, 0.0);
        let mut link: Box<dyn VehicleLink> = Box::new(vehicle.clone());

        link.command(90.0, 5.0, 1.5).unwrap();
        link.set_strobe(true).unwrap();

        assert_eq!(vehicle.last_command(), Some((90.0, 5.0, 1.5)));
        assert!(vehicle.strobe_is_on());
    }

    #[test]
    fn test_advance_moves_along_heading() {
        let vehicle = MockVehicle::new(0.0, 0.0, 0.0);
        let mut link: Box<dyn VehicleLink> = Box::new(vehicle.clone());

        link.command(90.0, 2.0, 2.0).unwrap();
        vehicle.advance(Duration::from_secs(3));

        let snapshot = link.snapshot().unwrap();
        assert_relative_eq!(snapshot.easting, 6.0);
        assert_relative_eq!(snapshot.northing, 0.0);
        assert_relative_eq!(snapshot.depth, 1.5);
    }

    #[test]
    fn test_scripted_sensor_runs_out() {
        let sensor = MockPlumeSensor::new();
        sensor.script(&[false, true]);

        let mut boxed: Box<dyn PlumeSensor> = Box::new(sensor);
        assert!(!boxed.plume_detected());
        assert!(boxed.plume_detected());
        assert!(!boxed.plume_detected());
    }
}

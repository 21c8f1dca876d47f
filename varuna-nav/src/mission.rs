//! Mission state machine
//!
//! Drives the vehicle through the survey: wait for the start position, sweep
//! the search area for the plume, tighten or shift the area on detections,
//! and surface to report. Every abnormal condition funnels into the abort
//! path, which surfaces the vehicle and calls home over the satellite link.

use crate::config::{AuvConfig, MissionConfig};
use crate::error::Result;
use crate::geometry::bearing_to_point;
use crate::searchspace::{SearchSpace, Waypoint};
use crate::vehicle::{PlumeSensor, VehicleLink, VehicleSnapshot};
use sindhu_io::Watchdog;
use std::collections::VecDeque;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Top-level state of the mission
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissionState {
    /// Waiting for the vehicle to reach the commanded start position
    WaitingToStart,
    /// Sweeping the search area along the planned path
    SearchForPlume,
    /// First detection: tighten the area around it
    ConstrainSearchArea,
    /// Repeat detection: re-anchor the constrained area
    ShiftSearchArea,
    /// Detection at the survey floor: surface and report the position
    ReportResults,
    /// Something went wrong: surface and call home
    AbortMission,
    /// Nothing left to do
    Done,
}

/// Outcome of one guidance step toward a waypoint
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveStep {
    /// Still in transit, a command was sent
    More,
    /// Within tolerance of the waypoint
    Arrived,
}

/// A global limit that forces an abort
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LimitBreach {
    /// Telemetry is older than the staleness limit
    StaleTelemetry,
    /// Battery voltage below the minimum
    LowBattery,
    /// Mission has run past its time budget
    TimeExpired,
}

impl std::fmt::Display for LimitBreach {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LimitBreach::StaleTelemetry => write!(f, "stale telemetry"),
            LimitBreach::LowBattery => write!(f, "low battery"),
            LimitBreach::TimeExpired => write!(f, "time budget expired"),
        }
    }
}

/// Poll period while waiting to be carried to the start position. Nothing
/// is moving under the mission's control yet, so there is no need to spin
/// at the full loop rate.
const START_POLL_PERIOD: Duration = Duration::from_secs(5);

/// Fixed-period pacing for the control loop
///
/// Overruns do not accumulate: a late cycle logs a warning and the schedule
/// restarts from now.
pub struct RateLimiter {
    period: Duration,
    deadline: Instant,
}

impl RateLimiter {
    pub fn new(hz: f64) -> Self {
        let period = Duration::from_secs_f64(1.0 / hz);
        RateLimiter {
            period,
            deadline: Instant::now() + period,
        }
    }

    /// Sleep out the rest of the current period
    pub fn wait(&mut self) {
        let now = Instant::now();
        if now < self.deadline {
            thread::sleep(self.deadline - now);
            self.deadline += self.period;
        } else {
            warn!(
                overrun_ms = (now - self.deadline).as_millis() as u64,
                "control loop overran its period"
            );
            self.deadline = now + self.period;
        }
    }

    /// Whether the current period has already elapsed
    pub fn overrun(&self) -> bool {
        Instant::now() >= self.deadline
    }
}

/// Tracks when the hardware watchdog is due for a timer reset
pub struct WatchdogTimer {
    interval: Duration,
    last_reset: Option<Instant>,
}

impl WatchdogTimer {
    pub fn new(interval: Duration) -> Self {
        WatchdogTimer {
            interval,
            last_reset: None,
        }
    }

    pub fn due(&self) -> bool {
        self.last_reset.map_or(true, |t| t.elapsed() >= self.interval)
    }

    pub fn mark(&mut self) {
        self.last_reset = Some(Instant::now());
    }
}

/// The plume search mission
pub struct Mission {
    vehicle: Box<dyn VehicleLink>,
    sensor: Box<dyn PlumeSensor>,
    watchdog: Watchdog,
    space: SearchSpace,
    auv: AuvConfig,
    state: MissionState,
    path: Option<VecDeque<Waypoint>>,
    strobe_blip: bool,
    plume_found_once: bool,
    started_at: Option<Instant>,
    detection: Option<(f64, f64, f64)>,
    abort_reason: Option<String>,
    watchdog_timer: WatchdogTimer,
}

impl Mission {
    /// Build a mission and put the vehicle in its pre-start configuration:
    /// strobe off, watchdog timer stopped until the mission begins.
    pub fn new(
        mut vehicle: Box<dyn VehicleLink>,
        sensor: Box<dyn PlumeSensor>,
        mut watchdog: Watchdog,
        space: SearchSpace,
        config: &MissionConfig,
    ) -> Result<Mission> {
        vehicle.set_strobe(false)?;
        watchdog.stop();

        Ok(Mission {
            vehicle,
            sensor,
            watchdog,
            space,
            auv: config.auv.clone(),
            state: MissionState::WaitingToStart,
            path: None,
            strobe_blip: false,
            plume_found_once: false,
            started_at: None,
            detection: None,
            abort_reason: None,
            watchdog_timer: WatchdogTimer::new(Duration::from_secs_f64(
                config.watchdog.reset_interval_secs,
            )),
        })
    }

    pub fn state(&self) -> MissionState {
        self.state
    }

    /// Run the mission to completion
    ///
    /// Before the start position is reached the loop only polls the start
    /// condition, slowly; once underway it runs at the configured rate.
    pub fn run(&mut self) -> Result<()> {
        let mut rate: Option<RateLimiter> = None;

        while self.state != MissionState::Done {
            self.step()?;

            // Keep the hardware timer fed while the mission is underway.
            if self.state != MissionState::WaitingToStart && self.watchdog_timer.due() {
                self.watchdog.reset();
                self.watchdog_timer.mark();
            }

            if self.state == MissionState::WaitingToStart {
                thread::sleep(START_POLL_PERIOD);
            } else {
                rate.get_or_insert_with(|| RateLimiter::new(self.auv.loop_hz))
                    .wait();
            }
        }

        info!("mission complete");
        Ok(())
    }

    /// Execute one control cycle
    pub fn step(&mut self) -> Result<()> {
        if self.state == MissionState::Done {
            return Ok(());
        }

        let snapshot = self.vehicle.snapshot()?;

        // Global limits are evaluated every cycle until the abort path has
        // already been taken.
        if self.state != MissionState::AbortMission {
            if let Some(breach) = self.limit_breached(&snapshot) {
                warn!(%breach, "aborting mission");
                self.abort_reason = Some(breach.to_string());
                self.state = MissionState::AbortMission;
                // The abort handler runs on the next cycle.
                return Ok(());
            }
        }

        match self.state {
            MissionState::WaitingToStart => self.wait_to_start(&snapshot),
            MissionState::SearchForPlume => self.search_for_plume(&snapshot),
            MissionState::ConstrainSearchArea => self.constrain_search_area(&snapshot),
            MissionState::ShiftSearchArea => self.shift_search_area(&snapshot),
            MissionState::ReportResults => self.report_results(&snapshot),
            MissionState::AbortMission => self.abort_mission(&snapshot),
            MissionState::Done => Ok(()),
        }
    }

    /// Which global limit, if any, the current snapshot breaches
    fn limit_breached(&self, snapshot: &VehicleSnapshot) -> Option<LimitBreach> {
        if snapshot.age() > Duration::from_secs_f64(self.auv.data_staleness_secs) {
            return Some(LimitBreach::StaleTelemetry);
        }
        if snapshot.battery_voltage < self.auv.min_battery_voltage {
            return Some(LimitBreach::LowBattery);
        }
        if let Some(started) = self.started_at {
            if started.elapsed() > Duration::from_secs_f64(self.auv.mission_time_budget_secs) {
                return Some(LimitBreach::TimeExpired);
            }
        }
        None
    }

    /// Hold until the vehicle has been carried close enough to the start
    fn wait_to_start(&mut self, snapshot: &VehicleSnapshot) -> Result<()> {
        let distance = snapshot.position().distance(self.space.start());
        if distance > 2.0 * self.auv.distance_tolerance_meters {
            debug!(distance, "waiting to reach the start position");
            return Ok(());
        }

        info!(
            easting = snapshot.easting,
            northing = snapshot.northing,
            "start position reached, mission underway"
        );

        self.started_at = Some(Instant::now());

        // Blip the strobe for one cycle to mark the dive.
        self.vehicle.set_strobe(true)?;
        self.strobe_blip = true;

        self.watchdog.reset();
        self.watchdog_timer.mark();

        // Get under the surface so the control planes bite.
        self.vehicle.command(
            snapshot.heading,
            self.auv.steering_depth_meters,
            self.auv.depth_speed,
        )?;

        self.state = MissionState::SearchForPlume;
        Ok(())
    }

    /// Follow the survey path, watching the sensor
    fn search_for_plume(&mut self, snapshot: &VehicleSnapshot) -> Result<()> {
        if self.strobe_blip {
            self.vehicle.set_strobe(false)?;
            self.strobe_blip = false;
        }

        if self.path.is_none() {
            // The hardware timer is stopped across planning so a long plan
            // cannot trip it, then restarted with the fresh path.
            self.watchdog.stop();
            let path = self
                .space
                .calculate_search_path(self.space.start(), self.space.min_depth())?;
            self.watchdog.reset();
            self.watchdog_timer.mark();

            if path.is_empty() {
                warn!("planner produced an empty path");
                self.abort_reason = Some("no search path".into());
                self.state = MissionState::AbortMission;
                return Ok(());
            }

            info!(waypoints = path.len(), "new search path planned");
            self.path = Some(path.into());
        }

        if self.sensor.plume_detected() {
            info!(
                easting = snapshot.easting,
                northing = snapshot.northing,
                depth = snapshot.depth,
                "plume detected"
            );

            if snapshot.depth >= self.space.max_depth() - self.auv.depth_tolerance_meters {
                self.detection = Some((snapshot.easting, snapshot.northing, snapshot.depth));
                self.state = MissionState::ReportResults;
            } else if !self.plume_found_once {
                self.plume_found_once = true;
                self.state = MissionState::ConstrainSearchArea;
            } else {
                self.state = MissionState::ShiftSearchArea;
            }
            return Ok(());
        }

        let waypoint = match self.path.as_ref().and_then(|p| p.front().copied()) {
            Some(waypoint) => waypoint,
            None => {
                // The whole volume was swept without a detection.
                warn!("search path exhausted without a detection");
                self.abort_reason = Some("search exhausted".into());
                self.state = MissionState::AbortMission;
                return Ok(());
            }
        };

        if self.move_toward_waypoint(snapshot, &waypoint)? == MoveStep::Arrived {
            debug!(
                x = waypoint.position.x,
                y = waypoint.position.y,
                depth = waypoint.depth,
                "waypoint reached"
            );
            if let Some(path) = self.path.as_mut() {
                path.pop_front();
            }
        }

        Ok(())
    }

    /// Tighten the search area around the first detection
    fn constrain_search_area(&mut self, snapshot: &VehicleSnapshot) -> Result<()> {
        self.space
            .constrain_search_area(snapshot.position(), snapshot.depth)?;
        self.path = None;
        self.state = MissionState::SearchForPlume;
        Ok(())
    }

    /// Re-anchor the constrained area on a repeat detection
    fn shift_search_area(&mut self, snapshot: &VehicleSnapshot) -> Result<()> {
        self.space.shift_search_area(snapshot.position());
        self.path = None;
        self.state = MissionState::SearchForPlume;
        Ok(())
    }

    /// Surface and report the detection over the satellite link
    fn report_results(&mut self, snapshot: &VehicleSnapshot) -> Result<()> {
        if !self.at_surface(snapshot)? {
            return Ok(());
        }

        self.vehicle.set_strobe(true)?;

        let (easting, northing, depth) = self.detection.unwrap_or((
            snapshot.easting,
            snapshot.northing,
            snapshot.depth,
        ));
        let message = format!("detected,{:.1},{:.1},{:.1}", easting, northing, depth);

        if self.watchdog.send(&message) {
            self.watchdog.stop();
        } else {
            // Leave the timer running so the module's own expiry alert
            // still calls home.
            warn!("satellite report failed, leaving the watchdog armed");
        }

        self.state = MissionState::Done;
        Ok(())
    }

    /// Surface and call home about the failure
    fn abort_mission(&mut self, snapshot: &VehicleSnapshot) -> Result<()> {
        if !self.at_surface(snapshot)? {
            return Ok(());
        }

        self.vehicle.set_strobe(true)?;

        let reason = self.abort_reason.as_deref().unwrap_or("unknown");
        let message = format!("aborted,{}", reason);

        if self.watchdog.send(&message) {
            self.watchdog.stop();
        } else {
            warn!("satellite abort report failed, leaving the watchdog armed");
        }

        self.state = MissionState::Done;
        Ok(())
    }

    /// Drive toward the surface; true once shallow enough to transmit
    fn at_surface(&mut self, snapshot: &VehicleSnapshot) -> Result<bool> {
        if snapshot.depth > self.auv.depth_tolerance_meters {
            self.vehicle
                .command(snapshot.heading, 0.0, self.auv.depth_speed)?;
            return Ok(false);
        }
        Ok(true)
    }

    /// One guidance step toward a waypoint
    ///
    /// The commanded depth is shallowed when the altimeter shows less than
    /// the minimum altitude; an altimeter reading of zero means no bottom
    /// lock and is ignored. Horizontal error is corrected before depth error.
    fn move_toward_waypoint(
        &mut self,
        snapshot: &VehicleSnapshot,
        waypoint: &Waypoint,
    ) -> Result<MoveStep> {
        let altitude_correction = if snapshot.altitude == 0.0 {
            0.0
        } else {
            (self.auv.min_altitude_meters - snapshot.altitude).max(0.0)
        };
        let safe_depth = waypoint.depth - altitude_correction;

        let distance = snapshot.position().distance(waypoint.position);
        if distance > self.auv.distance_tolerance_meters {
            // Positions are distinct beyond the tolerance, so a bearing
            // always exists.
            let bearing = bearing_to_point(snapshot.position(), waypoint.position)
                .unwrap_or(snapshot.heading);
            self.vehicle
                .command(bearing, safe_depth, self.auv.max_speed)?;
            return Ok(MoveStep::More);
        }

        if (snapshot.depth - safe_depth).abs() > self.auv.depth_tolerance_meters {
            let heading = waypoint.heading.unwrap_or(snapshot.heading);
            self.vehicle
                .command(heading, safe_depth, self.auv.depth_speed)?;
            return Ok(MoveStep::More);
        }

        Ok(MoveStep::Arrived)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MissionConfig;
    use crate::geometry::Point;
    use crate::searchspace::{CurrentVelocity, SearchSpace};
    use crate::vehicle::{MockPlumeSensor, MockVehicle};
    use sindhu_io::{MockTransport, Watchdog};

    fn test_config() -> MissionConfig {
        let mut config = MissionConfig::default();
        config.auv.distance_tolerance_meters = 1.0;
        config.auv.depth_tolerance_meters = 0.5;
        config.auv.loop_hz = 100.0;
        config
    }

    fn test_space(config: &MissionConfig, start: Point) -> SearchSpace {
        let corners = [
            Point::new(10.0, 300.0),
            Point::new(100.0, 300.0),
            Point::new(100.0, 100.0),
            Point::new(10.0, 100.0),
        ];
        let mut search = config.search.clone();
        search.buffer_meters = 0.0;
        SearchSpace::from_corners(
            corners,
            start,
            CurrentVelocity {
                set: 90.0,
                drift: 0.5,
            },
            &search,
        )
        .unwrap()
    }

    fn test_mission(vehicle: &MockVehicle, sensor: &MockPlumeSensor) -> Mission {
        let config = test_config();
        let space = test_space(&config, Point::new(80.0, 150.0));
        let watchdog = Watchdog::with_timing(Box::new(MockTransport::new()), 1, Duration::ZERO);
        Mission::new(
            Box::new(vehicle.clone()),
            Box::new(sensor.clone()),
            watchdog,
            space,
            &config,
        )
        .unwrap()
    }

    #[test]
    fn test_rate_limiter_restarts_after_overrun() {
        let mut rate = RateLimiter::new(1000.0);
        thread::sleep(Duration::from_millis(5));
        assert!(rate.overrun());

        rate.wait();
        assert!(!rate.overrun());
    }

    #[test]
    fn test_watchdog_timer_due() {
        let mut timer = WatchdogTimer::new(Duration::from_secs(60));
        assert!(timer.due());

        timer.mark();
        assert!(!timer.due());

        let mut short = WatchdogTimer::new(Duration::ZERO);
        short.mark();
        assert!(short.due());
    }

    #[test]
    fn test_new_mission_waits_with_strobe_off() {
        let vehicle = MockVehicle::new(500.0, 500.0, 0.0);
        let sensor = MockPlumeSensor::new();
        let mut mission = test_mission(&vehicle, &sensor);

        assert_eq!(mission.state(), MissionState::WaitingToStart);
        assert!(!vehicle.strobe_is_on());

        // Far from the start: still waiting.
        mission.step().unwrap();
        assert_eq!(mission.state(), MissionState::WaitingToStart);
    }

    #[test]
    fn test_mission_starts_near_the_start_point() {
        let vehicle = MockVehicle::new(80.5, 150.5, 0.0);
        let sensor = MockPlumeSensor::new();
        let mut mission = test_mission(&vehicle, &sensor);

        mission.step().unwrap();
        assert_eq!(mission.state(), MissionState::SearchForPlume);

        // The start command dives to steering depth.
        let (_, depth, _) = vehicle.last_command().unwrap();
        assert_eq!(depth, test_config().auv.steering_depth_meters);
    }

    #[test]
    fn test_start_transition_blips_the_strobe() {
        let vehicle = MockVehicle::new(80.0, 150.0, 0.0);
        let sensor = MockPlumeSensor::new();
        let mut mission = test_mission(&vehicle, &sensor);

        // The start transition arms the strobe for one cycle.
        mission.step().unwrap();
        assert_eq!(mission.state(), MissionState::SearchForPlume);
        assert!(vehicle.strobe_is_on());

        // The first search cycle puts it back out.
        mission.step().unwrap();
        assert!(!vehicle.strobe_is_on());
    }

    #[test]
    fn test_waiting_poll_is_slower_than_the_active_loop() {
        let period = Duration::from_secs_f64(1.0 / MissionConfig::default().auv.loop_hz);
        assert!(START_POLL_PERIOD > period);
    }

    #[test]
    fn test_low_battery_aborts() {
        let vehicle = MockVehicle::new(80.0, 150.0, 0.0);
        vehicle.set_battery_voltage(12.0);
        let sensor = MockPlumeSensor::new();
        let mut mission = test_mission(&vehicle, &sensor);

        mission.step().unwrap();
        assert_eq!(mission.state(), MissionState::AbortMission);
    }

    #[test]
    fn test_stale_telemetry_aborts() {
        let vehicle = MockVehicle::new(80.0, 150.0, 0.0);
        vehicle.make_stale(Duration::from_secs(30));
        let sensor = MockPlumeSensor::new();
        let mut mission = test_mission(&vehicle, &sensor);

        mission.step().unwrap();
        assert_eq!(mission.state(), MissionState::AbortMission);
    }

    #[test]
    fn test_abort_surfaces_then_signals() {
        let vehicle = MockVehicle::new(80.0, 150.0, 10.0);
        vehicle.set_battery_voltage(12.0);
        let sensor = MockPlumeSensor::new();
        let mut mission = test_mission(&vehicle, &sensor);

        // Breach detected, then the abort handler commands the surface.
        mission.step().unwrap();
        mission.step().unwrap();
        assert_eq!(mission.state(), MissionState::AbortMission);
        let (_, depth, _) = vehicle.last_command().unwrap();
        assert_eq!(depth, 0.0);
        assert!(!vehicle.strobe_is_on());

        // At the surface the strobe comes on and the mission finishes.
        vehicle.set_depth(0.0);
        mission.step().unwrap();
        assert_eq!(mission.state(), MissionState::Done);
        assert!(vehicle.strobe_is_on());
    }

    #[test]
    fn test_move_toward_distant_waypoint_commands_transit() {
        let vehicle = MockVehicle::new(80.0, 150.0, 5.0);
        let sensor = MockPlumeSensor::new();
        let mut mission = test_mission(&vehicle, &sensor);

        let waypoint = Waypoint {
            position: Point::new(80.0, 162.0),
            depth: 5.0,
            heading: Some(0.0),
        };
        let snapshot = vehicle.clone().snapshot().unwrap();
        let step = mission.move_toward_waypoint(&snapshot, &waypoint).unwrap();

        assert_eq!(step, MoveStep::More);
        let (heading, _, speed) = vehicle.last_command().unwrap();
        assert_eq!(heading, 0.0);
        assert!(speed > 0.0);
    }

    #[test]
    fn test_move_toward_current_position_arrives() {
        let vehicle = MockVehicle::new(80.0, 150.0, 5.0);
        let sensor = MockPlumeSensor::new();
        let mut mission = test_mission(&vehicle, &sensor);

        let waypoint = Waypoint {
            position: Point::new(80.0, 150.0),
            depth: 5.0,
            heading: Some(0.0),
        };
        let snapshot = vehicle.clone().snapshot().unwrap();
        let step = mission.move_toward_waypoint(&snapshot, &waypoint).unwrap();

        assert_eq!(step, MoveStep::Arrived);
        assert_eq!(vehicle.commands_sent(), 0);
    }

    #[test]
    fn test_altitude_floor_shallows_the_commanded_depth() {
        let vehicle = MockVehicle::new(80.0, 150.0, 5.0);
        vehicle.set_altitude(1.0);
        let sensor = MockPlumeSensor::new();
        let mut mission = test_mission(&vehicle, &sensor);

        let waypoint = Waypoint {
            position: Point::new(80.0, 200.0),
            depth: 10.0,
            heading: Some(0.0),
        };
        let snapshot = vehicle.clone().snapshot().unwrap();
        mission.move_toward_waypoint(&snapshot, &waypoint).unwrap();

        // min_altitude 2.0 with altitude 1.0 shallows the depth by 1.0.
        let (_, depth, _) = vehicle.last_command().unwrap();
        assert_eq!(depth, 9.0);
    }

    #[test]
    fn test_no_bottom_lock_skips_the_altitude_floor() {
        let vehicle = MockVehicle::new(80.0, 150.0, 5.0);
        vehicle.set_altitude(0.0);
        let sensor = MockPlumeSensor::new();
        let mut mission = test_mission(&vehicle, &sensor);

        let waypoint = Waypoint {
            position: Point::new(80.0, 200.0),
            depth: 10.0,
            heading: Some(0.0),
        };
        let snapshot = vehicle.clone().snapshot().unwrap();
        mission.move_toward_waypoint(&snapshot, &waypoint).unwrap();

        let (_, depth, _) = vehicle.last_command().unwrap();
        assert_eq!(depth, 10.0);
    }

    #[test]
    fn test_first_detection_constrains_the_area() {
        let vehicle = MockVehicle::new(80.0, 150.0, 0.0);
        let sensor = MockPlumeSensor::new();
        let mut mission = test_mission(&vehicle, &sensor);

        // Reach the start and begin searching.
        mission.step().unwrap();
        assert_eq!(mission.state(), MissionState::SearchForPlume);

        // Mid-depth detection away from the survey floor.
        vehicle.set_depth(10.0);
        sensor.script(&[true]);
        mission.step().unwrap();
        assert_eq!(mission.state(), MissionState::ConstrainSearchArea);

        // The constrain handler replans and resumes the search.
        mission.step().unwrap();
        assert_eq!(mission.state(), MissionState::SearchForPlume);

        // A second detection shifts instead of constraining again.
        sensor.script(&[true]);
        mission.step().unwrap();
        assert_eq!(mission.state(), MissionState::ShiftSearchArea);
    }

    #[test]
    fn test_limit_breach_while_reporting_aborts() {
        let vehicle = MockVehicle::new(80.0, 150.0, 0.0);
        let sensor = MockPlumeSensor::new();
        let mut mission = test_mission(&vehicle, &sensor);

        mission.step().unwrap();
        vehicle.set_depth(29.8);
        sensor.script(&[true]);
        mission.step().unwrap();
        assert_eq!(mission.state(), MissionState::ReportResults);

        // Limits still apply while surfacing to report.
        vehicle.set_battery_voltage(12.0);
        mission.step().unwrap();
        assert_eq!(mission.state(), MissionState::AbortMission);
    }

    #[test]
    fn test_detection_at_the_survey_floor_reports() {
        let vehicle = MockVehicle::new(80.0, 150.0, 0.0);
        let sensor = MockPlumeSensor::new();
        let mut mission = test_mission(&vehicle, &sensor);

        mission.step().unwrap();
        assert_eq!(mission.state(), MissionState::SearchForPlume);

        // Detection within depth tolerance of the survey floor.
        vehicle.set_depth(29.8);
        sensor.script(&[true]);
        mission.step().unwrap();
        assert_eq!(mission.state(), MissionState::ReportResults);
    }

    #[test]
    fn test_search_follows_the_path() {
        let vehicle = MockVehicle::new(80.0, 150.0, 0.0);
        let sensor = MockPlumeSensor::new();
        let mut mission = test_mission(&vehicle, &sensor);

        mission.step().unwrap();
        assert_eq!(mission.state(), MissionState::SearchForPlume);

        // First search cycle plans a path and commands transit toward the
        // first waypoint, north along the track line.
        mission.step().unwrap();
        let (heading, _, speed) = vehicle.last_command().unwrap();
        assert_eq!(heading, 0.0);
        assert_eq!(speed, test_config().auv.max_speed);
        assert!(speed > 0.0);
    }
}

//! Configuration loading for VarunaNav

use crate::error::{Result, VarunaError};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Clone, Debug, Deserialize, Default)]
pub struct MissionConfig {
    #[serde(default)]
    pub geo: GeoConfig,
    #[serde(default)]
    pub starting: StartingConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub auv: AuvConfig,
    #[serde(default)]
    pub watchdog: WatchdogConfig,
}

/// Geodetic corners of the contest area
#[derive(Clone, Debug, Deserialize)]
pub struct GeoConfig {
    /// Northern boundary latitude (decimal degrees)
    #[serde(default = "default_northern_latitude")]
    pub northern_latitude: f64,

    /// Southern boundary latitude (decimal degrees)
    #[serde(default = "default_southern_latitude")]
    pub southern_latitude: f64,

    /// Eastern boundary longitude (decimal degrees)
    #[serde(default = "default_eastern_longitude")]
    pub eastern_longitude: f64,

    /// Western boundary longitude (decimal degrees)
    #[serde(default = "default_western_longitude")]
    pub western_longitude: f64,
}

/// Mission start conditions
#[derive(Clone, Debug, Deserialize)]
pub struct StartingConfig {
    /// Latitude of the commanded start point (decimal degrees)
    #[serde(default = "default_start_latitude")]
    pub latitude: f64,

    /// Longitude of the commanded start point (decimal degrees)
    #[serde(default = "default_start_longitude")]
    pub longitude: f64,

    /// Bearing the water current flows toward (degrees)
    #[serde(default = "default_current_set")]
    pub set: f64,

    /// Speed of the water current (knots)
    #[serde(default = "default_current_drift")]
    pub drift: f64,
}

/// Search area and pattern parameters
#[derive(Clone, Debug, Deserialize)]
pub struct SearchConfig {
    /// Inward offset from the contest boundary (meters)
    #[serde(default = "default_buffer")]
    pub buffer_meters: f64,

    /// Depth change between passes; negative commands shallower passes
    #[serde(default = "default_track_separation")]
    pub track_separation_meters: f64,

    /// Shallowest survey depth (meters)
    #[serde(default = "default_min_depth")]
    pub min_depth_meters: f64,

    /// Deepest survey depth (meters)
    #[serde(default = "default_max_depth")]
    pub max_depth_meters: f64,

    /// How far up-current to re-anchor the start point after a detection (meters)
    #[serde(default = "default_up_current_offset")]
    pub up_current_offset_meters: f64,

    /// Half-width of the constrained search box (meters)
    #[serde(default = "default_vertex_offset")]
    pub vertex_offset_meters: f64,

    /// Raise of the depth floor after a detection (meters)
    #[serde(default = "default_min_depth_offset")]
    pub min_depth_offset_meters: f64,
}

/// Vehicle limits and control parameters
#[derive(Clone, Debug, Deserialize)]
pub struct AuvConfig {
    /// Horizontal arrival tolerance (meters)
    #[serde(default = "default_distance_tolerance")]
    pub distance_tolerance_meters: f64,

    /// Depth arrival tolerance (meters)
    #[serde(default = "default_depth_tolerance")]
    pub depth_tolerance_meters: f64,

    /// Minimum height above the seafloor (meters)
    #[serde(default = "default_min_altitude")]
    pub min_altitude_meters: f64,

    /// Depth at which the control surfaces become effective (meters)
    #[serde(default = "default_steering_depth")]
    pub steering_depth_meters: f64,

    /// Transit speed (m/s)
    #[serde(default = "default_max_speed")]
    pub max_speed: f64,

    /// Speed used for depth-only corrections (m/s)
    #[serde(default = "default_depth_speed")]
    pub depth_speed: f64,

    /// Abort below this battery voltage
    #[serde(default = "default_min_battery_voltage")]
    pub min_battery_voltage: f64,

    /// Abort when telemetry is older than this (seconds)
    #[serde(default = "default_data_staleness")]
    pub data_staleness_secs: f64,

    /// Abort when the mission has run longer than this (seconds)
    #[serde(default = "default_mission_time_budget")]
    pub mission_time_budget_secs: f64,

    /// Control loop frequency (Hz)
    #[serde(default = "default_loop_hz")]
    pub loop_hz: f64,

    /// How long to wait for the vehicle link at startup (seconds)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: f64,

    /// UDP port for incoming telemetry
    #[serde(default = "default_telemetry_port")]
    pub telemetry_port: u16,

    /// Autopilot command address
    #[serde(default = "default_autopilot_addr")]
    pub autopilot_addr: String,
}

/// Watchdog link settings
#[derive(Clone, Debug, Deserialize)]
pub struct WatchdogConfig {
    /// Serial port path
    #[serde(default = "default_watchdog_port")]
    pub port: String,

    /// Baud rate
    #[serde(default = "default_watchdog_data_rate")]
    pub data_rate: u32,

    /// Minimum interval between timer resets (seconds)
    #[serde(default = "default_reset_interval")]
    pub reset_interval_secs: f64,
}

// Default value functions.
// Geodetic defaults bracket the contest area off the Puerto Rico south coast.
fn default_northern_latitude() -> f64 {
    17.9770
}
fn default_southern_latitude() -> f64 {
    17.9675
}
fn default_eastern_longitude() -> f64 {
    -66.6155
}
fn default_western_longitude() -> f64 {
    -66.6260
}
fn default_start_latitude() -> f64 {
    17.9722238
}
fn default_start_longitude() -> f64 {
    -66.6206948
}
fn default_current_set() -> f64 {
    90.0
}
fn default_current_drift() -> f64 {
    0.5
}
fn default_buffer() -> f64 {
    10.0
}
fn default_track_separation() -> f64 {
    4.5
}
fn default_min_depth() -> f64 {
    0.5
}
fn default_max_depth() -> f64 {
    30.0
}
fn default_up_current_offset() -> f64 {
    5.0
}
fn default_vertex_offset() -> f64 {
    10.0
}
fn default_min_depth_offset() -> f64 {
    10.0
}
fn default_distance_tolerance() -> f64 {
    3.0
}
fn default_depth_tolerance() -> f64 {
    1.0
}
fn default_min_altitude() -> f64 {
    2.0
}
fn default_steering_depth() -> f64 {
    1.5
}
fn default_max_speed() -> f64 {
    1.5
}
fn default_depth_speed() -> f64 {
    0.5
}
fn default_min_battery_voltage() -> f64 {
    13.5
}
fn default_data_staleness() -> f64 {
    10.0
}
fn default_mission_time_budget() -> f64 {
    7200.0
}
fn default_loop_hz() -> f64 {
    1.0
}
fn default_connect_timeout() -> f64 {
    60.0
}
fn default_telemetry_port() -> u16 {
    9001
}
fn default_autopilot_addr() -> String {
    "127.0.0.1:9002".to_string()
}
fn default_watchdog_port() -> String {
    "/dev/ttyUSB0".to_string()
}
fn default_watchdog_data_rate() -> u32 {
    19200
}
fn default_reset_interval() -> f64 {
    1.0
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            northern_latitude: default_northern_latitude(),
            southern_latitude: default_southern_latitude(),
            eastern_longitude: default_eastern_longitude(),
            western_longitude: default_western_longitude(),
        }
    }
}

impl Default for StartingConfig {
    fn default() -> Self {
        Self {
            latitude: default_start_latitude(),
            longitude: default_start_longitude(),
            set: default_current_set(),
            drift: default_current_drift(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            buffer_meters: default_buffer(),
            track_separation_meters: default_track_separation(),
            min_depth_meters: default_min_depth(),
            max_depth_meters: default_max_depth(),
            up_current_offset_meters: default_up_current_offset(),
            vertex_offset_meters: default_vertex_offset(),
            min_depth_offset_meters: default_min_depth_offset(),
        }
    }
}

impl Default for AuvConfig {
    fn default() -> Self {
        Self {
            distance_tolerance_meters: default_distance_tolerance(),
            depth_tolerance_meters: default_depth_tolerance(),
            min_altitude_meters: default_min_altitude(),
            steering_depth_meters: default_steering_depth(),
            max_speed: default_max_speed(),
            depth_speed: default_depth_speed(),
            min_battery_voltage: default_min_battery_voltage(),
            data_staleness_secs: default_data_staleness(),
            mission_time_budget_secs: default_mission_time_budget(),
            loop_hz: default_loop_hz(),
            connect_timeout_secs: default_connect_timeout(),
            telemetry_port: default_telemetry_port(),
            autopilot_addr: default_autopilot_addr(),
        }
    }
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            port: default_watchdog_port(),
            data_rate: default_watchdog_data_rate(),
            reset_interval_secs: default_reset_interval(),
        }
    }
}

impl MissionConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| VarunaError::Config(format!("Failed to read config file: {}", e)))?;
        let config: MissionConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject illogical configurations before anything is built from them
    pub fn validate(&self) -> Result<()> {
        if self.geo.northern_latitude <= self.geo.southern_latitude {
            return Err(VarunaError::Config(
                "north and south boundaries illogical".into(),
            ));
        }
        if self.geo.eastern_longitude <= self.geo.western_longitude {
            return Err(VarunaError::Config(
                "east and west boundaries illogical".into(),
            ));
        }
        if self.search.max_depth_meters <= 0.0 {
            return Err(VarunaError::Config(
                "depth boundary is not in the water".into(),
            ));
        }
        if self.search.min_depth_meters < 0.0
            || self.search.min_depth_meters >= self.search.max_depth_meters
        {
            return Err(VarunaError::Config(
                "minimum depth must be within [0, max depth)".into(),
            ));
        }
        if self.search.track_separation_meters == 0.0 {
            return Err(VarunaError::Config("track separation must be non-zero".into()));
        }
        if self.search.buffer_meters < 0.0 {
            return Err(VarunaError::Config("boundary buffer must not be negative".into()));
        }
        if self.auv.loop_hz <= 0.0 {
            return Err(VarunaError::Config("loop rate must be positive".into()));
        }
        if self.auv.distance_tolerance_meters <= 0.0 || self.auv.depth_tolerance_meters <= 0.0 {
            return Err(VarunaError::Config("tolerances must be positive".into()));
        }

        Ok(())
    }
}

//! VarunaNav - AUV plume search mission controller
//!
//! Plans and executes a search of a bounded ocean volume for a chemical
//! plume: geodetic boundaries are mapped into a local planar frame, a
//! current-aware survey path is planned across it, and a state machine
//! drives the vehicle along the path, tightening the search on detections
//! and reporting home over the SindhuIO watchdog link.

pub mod config;
pub mod error;
pub mod geometry;
pub mod mission;
pub mod nav;
pub mod searchspace;
pub mod vehicle;

pub use config::MissionConfig;
pub use error::{Result, VarunaError};
pub use geometry::{Line, Point, Polygon};
pub use mission::{Mission, MissionState};
pub use nav::NavConverter;
pub use searchspace::{CurrentVelocity, SearchSpace, Waypoint};
pub use vehicle::{PlumeSensor, VehicleLink, VehicleSnapshot};

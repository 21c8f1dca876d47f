//! VarunaNav mission executable
//!
//! Builds the search space from the configured contest boundaries, opens
//! the watchdog and vehicle links, and runs the mission to completion.
//! `--dry-run` swaps both links for in-memory simulations.

use std::path::Path;
use std::time::Duration;
use tracing::{error, info};

use sindhu_io::{MockTransport, SerialTransport, Watchdog};
use varuna_nav::config::MissionConfig;
use varuna_nav::error::Result;
use varuna_nav::geometry::Point;
use varuna_nav::mission::Mission;
use varuna_nav::nav::NavConverter;
use varuna_nav::searchspace::{CurrentVelocity, SearchSpace};
use varuna_nav::vehicle::{MockPlumeSensor, MockVehicle, PlumeSensor, UdpVehicle, VehicleLink};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("varuna_nav=info".parse().unwrap()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let dry_run = args.iter().any(|a| a == "--dry-run");

    let config = if args.len() > 1 && !args[1].starts_with("--") {
        let config_path = Path::new(&args[1]);
        info!("Loading configuration from {:?}", config_path);
        MissionConfig::load(config_path)?
    } else if Path::new("varuna.toml").exists() {
        info!("Loading configuration from varuna.toml");
        MissionConfig::load(Path::new("varuna.toml"))?
    } else {
        info!("Using default configuration");
        let config = MissionConfig::default();
        config.validate()?;
        config
    };

    info!("VarunaNav v{}", env!("CARGO_PKG_VERSION"));

    let converter = NavConverter::from_boundaries(
        config.geo.northern_latitude,
        config.geo.southern_latitude,
        config.geo.eastern_longitude,
        config.geo.western_longitude,
    )?;
    info!(
        "Contest area {:.0}m east-west by {:.0}m north-south",
        converter.east_west_distance_meters(),
        converter.north_south_distance_meters()
    );

    let start = converter.geo_to_cartesian(config.starting.latitude, config.starting.longitude)?;
    info!(
        "Start position ({:.1}, {:.1}) in the local frame",
        start.x, start.y
    );

    let east_west = converter.east_west_distance_meters();
    let north_south = converter.north_south_distance_meters();
    let corners = [
        Point::new(0.0, north_south),
        Point::new(east_west, north_south),
        Point::new(east_west, 0.0),
        Point::new(0.0, 0.0),
    ];

    let space = SearchSpace::from_corners(
        corners,
        start,
        CurrentVelocity {
            set: config.starting.set,
            drift: config.starting.drift,
        },
        &config.search,
    )?;

    let watchdog = if dry_run {
        info!("Dry run: using a mock watchdog transport");
        Watchdog::with_timing(Box::new(MockTransport::new()), 1, Duration::ZERO)
    } else {
        info!(
            "Opening watchdog link on {} at {} baud",
            config.watchdog.port, config.watchdog.data_rate
        );
        let transport = SerialTransport::open(&config.watchdog.port, config.watchdog.data_rate)?;
        Watchdog::new(Box::new(transport))
    };

    let (vehicle, sensor): (Box<dyn VehicleLink>, Box<dyn PlumeSensor>) = if dry_run {
        info!("Dry run: simulating the vehicle in-process");
        let simulated = MockVehicle::new(start.x, start.y, 0.0);

        // Background simulator so the mission loop sees the vehicle move.
        let sim = simulated.clone();
        std::thread::spawn(move || loop {
            sim.advance(Duration::from_millis(100));
            std::thread::sleep(Duration::from_millis(100));
        });

        (Box::new(simulated), Box::new(MockPlumeSensor::new()))
    } else {
        let bridge = UdpVehicle::connect_timeout(
            config.auv.telemetry_port,
            &config.auv.autopilot_addr,
            Duration::from_secs_f64(config.auv.connect_timeout_secs),
        )?;
        (Box::new(bridge.clone()), Box::new(bridge))
    };

    let mut mission = Mission::new(vehicle, sensor, watchdog, space, &config)?;
    if let Err(e) = mission.run() {
        error!("Mission failed: {}", e);
        return Err(e);
    }

    Ok(())
}

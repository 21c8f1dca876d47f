//! UDP bridge to the vehicle's autopilot
//!
//! Telemetry arrives as comma-separated `key=value` datagrams on a local
//! port; commands go out the same way to the autopilot address. The socket
//! stays non-blocking and the mission loop drains everything queued each
//! cycle, so a snapshot is always the newest reading received.

use super::{PlumeSensor, VehicleLink, VehicleSnapshot};
use crate::error::{Result, VarunaError};
use std::net::UdpSocket;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Datagrams larger than this are malformed and dropped
const DATAGRAM_BUFFER_SIZE: usize = 1024;

/// Poll interval while waiting for the first telemetry datagram
const CONNECT_POLL_INTERVAL: Duration = Duration::from_millis(200);

struct UdpVehicleInner {
    socket: UdpSocket,
    autopilot_addr: String,
    buffer: [u8; DATAGRAM_BUFFER_SIZE],
    snapshot: Option<VehicleSnapshot>,
    plume: bool,
}

/// Vehicle link over UDP key=value datagrams
///
/// Clones share one socket and cache, so the same bridge can serve as both
/// the vehicle link and the plume sensor.
#[derive(Clone)]
pub struct UdpVehicle {
    inner: Arc<Mutex<UdpVehicleInner>>,
}

impl UdpVehicle {
    /// Bind the telemetry port without waiting for a reading
    pub fn bind(telemetry_port: u16, autopilot_addr: &str) -> Result<Self> {
        let bind_addr = format!("0.0.0.0:{}", telemetry_port);
        let socket = UdpSocket::bind(&bind_addr)
            .map_err(|e| VarunaError::Vehicle(format!("failed to bind {}: {}", bind_addr, e)))?;
        socket.set_nonblocking(true)?;

        info!(port = telemetry_port, "listening for vehicle telemetry");

        Ok(UdpVehicle {
            inner: Arc::new(Mutex::new(UdpVehicleInner {
                socket,
                autopilot_addr: autopilot_addr.to_string(),
                buffer: [0u8; DATAGRAM_BUFFER_SIZE],
                snapshot: None,
                plume: false,
            })),
        })
    }

    /// Bind the telemetry port and wait for the first reading
    pub fn connect_timeout(
        telemetry_port: u16,
        autopilot_addr: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let vehicle = Self::bind(telemetry_port, autopilot_addr)?;

        let deadline = Instant::now() + timeout;
        loop {
            vehicle.inner.lock().unwrap().drain();
            if vehicle.connected() {
                info!("vehicle telemetry established");
                return Ok(vehicle);
            }
            if Instant::now() >= deadline {
                return Err(VarunaError::Vehicle(format!(
                    "no telemetry on port {} within {:?}",
                    telemetry_port, timeout
                )));
            }
            std::thread::sleep(CONNECT_POLL_INTERVAL);
        }
    }

    /// The locally bound telemetry port
    pub fn local_port(&self) -> Result<u16> {
        Ok(self.inner.lock().unwrap().socket.local_addr()?.port())
    }
}

impl UdpVehicleInner {
    /// Receive every queued datagram, keeping the newest parseable one
    ///
    /// Receive failures never propagate: the cached reading stands, and a
    /// persistently dead link surfaces as telemetry staleness upstream.
    fn drain(&mut self) {
        loop {
            match self.socket.recv(&mut self.buffer) {
                Ok(len) => {
                    let text = match std::str::from_utf8(&self.buffer[..len]) {
                        Ok(text) => text,
                        Err(_) => {
                            warn!("dropping non-text telemetry datagram");
                            continue;
                        }
                    };
                    match parse_telemetry(text) {
                        Some((snapshot, plume)) => {
                            self.snapshot = Some(snapshot);
                            self.plume = plume;
                        }
                        None => warn!(datagram = text, "dropping malformed telemetry"),
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => return,
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => return,
                Err(e) => {
                    warn!(error = %e, "telemetry receive failed, keeping the last reading");
                    return;
                }
            }
        }
    }

    fn send(&self, message: &str) -> Result<()> {
        debug!(message, "sending autopilot command");
        self.socket
            .send_to(message.as_bytes(), &self.autopilot_addr)
            .map_err(|e| VarunaError::Vehicle(format!("command send: {}", e)))?;
        Ok(())
    }
}

impl VehicleLink for UdpVehicle {
    fn connected(&self) -> bool {
        self.inner.lock().unwrap().snapshot.is_some()
    }

    fn snapshot(&mut self) -> Result<VehicleSnapshot> {
        let mut inner = self.inner.lock().unwrap();
        inner.drain();
        inner
            .snapshot
            .ok_or_else(|| VarunaError::Vehicle("no telemetry received yet".into()))
    }

    fn command(&mut self, heading: f64, depth: f64, speed: f64) -> Result<()> {
        self.inner.lock().unwrap().send(&format!(
            "heading={:.1},depth={:.2},speed={:.2}",
            heading, depth, speed
        ))
    }

    fn set_strobe(&mut self, on: bool) -> Result<()> {
        self.inner
            .lock()
            .unwrap()
            .send(if on { "strobe=1" } else { "strobe=0" })
    }
}

impl PlumeSensor for UdpVehicle {
    fn plume_detected(&mut self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        inner.drain();
        inner.plume
    }
}

/// Parse one telemetry datagram
///
/// All navigation fields are required; `plume` defaults to absent. Returns
/// `None` when a required field is missing or unparseable.
fn parse_telemetry(text: &str) -> Option<(VehicleSnapshot, bool)> {
    let mut easting = None;
    let mut northing = None;
    let mut depth = None;
    let mut altitude = None;
    let mut heading = None;
    let mut speed = None;
    let mut battery = None;
    let mut plume = false;

    for pair in text.trim().split(',') {
        let (key, value) = pair.split_once('=')?;
        let value: f64 = value.trim().parse().ok()?;
        match key.trim() {
            "easting" => easting = Some(value),
            "northing" => northing = Some(value),
            "depth" => depth = Some(value),
            "altitude" => altitude = Some(value),
            "heading" => heading = Some(value),
            "speed" => speed = Some(value),
            "battery" => battery = Some(value),
            "plume" => plume = value != 0.0,
            // Unknown keys are ignored so the autopilot can add fields.
            _ => {}
        }
    }

    Some((
        VehicleSnapshot {
            easting: easting?,
            northing: northing?,
            depth: depth?,
            altitude: altitude?,
            heading: heading?,
            speed: speed?,
            battery_voltage: battery?,
            last_update: Instant::now(),
        },
        plume,
    ))
}

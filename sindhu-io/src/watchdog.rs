//! Watchdog protocol implementation
//!
//! Frame format: `'$' body '\n'`, comma-separated fields inside the body.
//!
//! Requests: `WDTRESET`, `WDTSTOP`, `STATUS`, `SBD,<message>`
//! Responses: first field is `STATUS`, `SUCCESS`, or `FAIL`
//!
//! The module is a safety device, so every communication failure degrades to
//! a conservative answer instead of an error: an unreachable watchdog is
//! reported as still running with an unknown timer value.

use crate::error::{Error, Result};
use crate::transport::Transport;
use std::collections::VecDeque;
use std::thread;
use std::time::Duration;

/// Frame start delimiter
pub const FRAME_START: u8 = b'$';
/// Frame end delimiter
pub const FRAME_END: u8 = b'\n';
/// Maximum body length, including the `SBD,` prefix on satellite sends
pub const MAX_BODY_LENGTH: usize = 120;

/// Longest legal frame: start delimiter, body, end delimiter
const MAX_FRAME_LENGTH: usize = MAX_BODY_LENGTH + 2;

const RESET: &str = "WDTRESET";
const STOP: &str = "WDTSTOP";
const STATUS: &str = "STATUS";
const SEND_PREFIX: &str = "SBD,";
const SUCCESS: &str = "SUCCESS";

/// Satellite sends are slow; the module needs tens of seconds per attempt.
const DEFAULT_SEND_RETRIES: u32 = 20;
const DEFAULT_RETRY_WAIT: Duration = Duration::from_secs(30);

/// Last reported state of the watchdog module
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatchdogStatus {
    /// Iridium modem status code
    pub iridium_status: i32,
    /// Number of GPS satellites in view
    pub gps_satellites: i32,
    /// Whether the GPS has a position fix
    pub gps_fix: bool,
    /// Whether the watchdog timer is running
    pub running: bool,
    /// Remaining timer value in seconds, if known
    pub timer_seconds: Option<i32>,
}

impl WatchdogStatus {
    /// Conservative fallback for an unreachable watchdog: assume the timer
    /// is still running with an unknown value.
    pub fn unreachable() -> Self {
        WatchdogStatus {
            iridium_status: 0,
            gps_satellites: 0,
            gps_fix: false,
            running: true,
            timer_seconds: None,
        }
    }
}

/// Watchdog channel over a serial transport
pub struct Watchdog {
    transport: Box<dyn Transport>,
    rx: VecDeque<u8>,
    status: WatchdogStatus,
    send_retries: u32,
    retry_wait: Duration,
}

impl Watchdog {
    /// Create a watchdog channel with the default send retry schedule
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self::with_timing(transport, DEFAULT_SEND_RETRIES, DEFAULT_RETRY_WAIT)
    }

    /// Create a watchdog channel with an explicit send retry schedule
    pub fn with_timing(transport: Box<dyn Transport>, send_retries: u32, retry_wait: Duration) -> Self {
        Watchdog {
            transport,
            rx: VecDeque::new(),
            status: WatchdogStatus::unreachable(),
            send_retries,
            retry_wait,
        }
    }

    /// The status recorded by the most recent exchange
    pub fn last_status(&self) -> &WatchdogStatus {
        &self.status
    }

    /// Query the watchdog and refresh the recorded status
    ///
    /// A timeout or malformed response yields the conservative fallback.
    pub fn status(&mut self) -> &WatchdogStatus {
        self.write_frame(STATUS);

        match self.read_frame() {
            Ok(fields) => match parse_status(&fields) {
                Some(status) => self.status = status,
                None => {
                    log::warn!("Malformed watchdog status response: {:?}", fields);
                    self.status = WatchdogStatus::unreachable();
                }
            },
            Err(e) => {
                log::warn!("Failed to get watchdog status: {}", e);
                self.status = WatchdogStatus::unreachable();
            }
        }

        &self.status
    }

    /// Reset the watchdog timer
    pub fn reset(&mut self) {
        self.write_frame(RESET);
        self.status();
        if !self.status.running {
            log::error!("Failed to reset the watchdog");
        }
    }

    /// Stop the watchdog timer
    pub fn stop(&mut self) {
        self.write_frame(STOP);
        self.status();
        if self.status.running {
            log::error!("Failed to stop the watchdog");
        } else {
            log::info!("Watchdog timer stopped");
        }
    }

    /// Send a message over the satellite link
    ///
    /// The message is truncated so the frame body, `SBD,` prefix included,
    /// never exceeds [`MAX_BODY_LENGTH`]. The module is polled up to the
    /// configured retry count, resetting the timer and waiting between
    /// attempts. Returns true only on an explicit `SUCCESS` reply; exhausted
    /// retries are a failure, never a panic or an error.
    pub fn send(&mut self, text: &str) -> bool {
        let body: String = SEND_PREFIX
            .chars()
            .chain(text.chars())
            .take(MAX_BODY_LENGTH)
            .collect();
        self.write_frame(&body);

        let mut reply = None;
        for _ in 0..self.send_retries {
            self.reset();
            thread::sleep(self.retry_wait);

            match self.read_frame() {
                Ok(fields) => {
                    reply = Some(fields);
                    break;
                }
                Err(Error::Timeout) => continue,
                Err(e) => {
                    log::warn!("Bad reply while sending message: {}", e);
                    continue;
                }
            }
        }

        match reply {
            Some(fields) if fields.first().map(String::as_str) == Some(SUCCESS) => true,
            _ => {
                log::warn!("Failed to send message: {}", body);
                false
            }
        }
    }

    /// Frame a request body and write it out. Write failures are logged and
    /// surface later as a response timeout.
    fn write_frame(&mut self, body: &str) {
        let mut frame = Vec::with_capacity(body.len() + 2);
        frame.push(FRAME_START);
        frame.extend_from_slice(body.as_bytes());
        frame.push(FRAME_END);

        let written = self
            .transport
            .write(&frame)
            .and_then(|_| self.transport.flush());
        if let Err(e) = written {
            log::warn!("Failed to write watchdog message {}: {}", body, e);
        }
    }

    /// Read one frame and split its body on commas
    ///
    /// Bytes beyond the first complete frame stay buffered for the next
    /// read. The transport's own read timeout bounds the blocking time, and
    /// delimiter-free input is bounded by [`MAX_FRAME_LENGTH`] so a babbling
    /// device cannot grow the buffer without limit.
    fn read_frame(&mut self) -> Result<Vec<String>> {
        let mut chunk = [0u8; 64];
        while !self.rx.contains(&FRAME_END) {
            if self.rx.len() > MAX_FRAME_LENGTH {
                self.rx.clear();
                return Err(Error::InvalidFrame("oversized frame".into()));
            }
            let n = self.transport.read(&mut chunk)?;
            if n == 0 {
                if self.rx.is_empty() {
                    return Err(Error::Timeout);
                }
                return Err(Error::InvalidFrame("truncated frame".into()));
            }
            self.rx.extend(&chunk[..n]);
        }

        // Invariant: rx contains FRAME_END, so position() finds it.
        let end = self.rx.iter().position(|&b| b == FRAME_END).unwrap_or(0);
        let frame: Vec<u8> = self.rx.drain(..=end).collect();

        if frame.first() != Some(&FRAME_START) {
            return Err(Error::InvalidFrame(format!(
                "missing start delimiter in {} byte frame",
                frame.len()
            )));
        }

        let body = std::str::from_utf8(&frame[1..frame.len() - 1])
            .map_err(|_| Error::InvalidFrame("frame is not UTF-8".into()))?;

        Ok(body.split(',').map(str::to_string).collect())
    }
}

/// Parse the five status fields after the leading `STATUS` tag
fn parse_status(fields: &[String]) -> Option<WatchdogStatus> {
    if fields.len() < 6 || fields[0] != STATUS {
        return None;
    }

    Some(WatchdogStatus {
        iridium_status: fields[1].parse().ok()?,
        gps_satellites: fields[2].parse().ok()?,
        gps_fix: fields[3].parse::<i32>().ok()? == 1,
        running: fields[4].parse::<i32>().ok()? == 1,
        timer_seconds: Some(fields[5].trim().parse().ok()?),
    })
}

//! SindhuIO - Watchdog safety channel for the AUV reporting failsafe
//!
//! The watchdog is an Iridium satellite module on a serial link that acts as
//! the vehicle's last-resort reporting path. While the mission is healthy the
//! controller keeps resetting the watchdog timer; if the timer ever expires
//! the module surfaces a position report on its own. This crate speaks the
//! framed text protocol (`'$' body '\n'`) used to arm, reset, stop, and send
//! messages through that module.

pub mod error;
pub mod transport;
pub mod watchdog;

pub use error::{Error, Result};
pub use transport::{MockTransport, SerialTransport, Transport};
pub use watchdog::{Watchdog, WatchdogStatus};

mod gpio;
mod keyboard;
mod mock;

#[cfg(all(target_os = "linux", feature = "evdev"))]
mod evdev_button;

#[cfg(test)]
mod tests;

pub use gpio::{GpioOutput, SysfsSignals};
pub use keyboard::KeyboardSignals;
pub use mock::{MockSignals, SignalChange};

#[cfg(all(target_os = "linux", feature = "evdev"))]
pub use evdev_button::EvdevSignals;

use crate::error::SignalError;
use async_trait::async_trait;
use std::time::SystemTime;

/// A button press edge reported by a signal adapter
#[derive(Debug, Clone)]
pub struct TriggerEvent {
    pub timestamp: SystemTime,
    pub source: &'static str,
}

impl TriggerEvent {
    pub fn now(source: &'static str) -> Self {
        Self {
            timestamp: SystemTime::now(),
            source,
        }
    }
}

/// Button input plus LED and flash outputs.
///
/// `wait_for_trigger` is the only call expected to block for long; it may be
/// satisfied by polling or by an interrupt-driven source.
#[async_trait]
pub trait SignalAdapter: Send + Sync {
    /// Block until the button reports a press edge
    async fn wait_for_trigger(&self) -> Result<TriggerEvent, SignalError>;

    async fn set_led(&self, on: bool) -> Result<(), SignalError>;

    async fn set_flash(&self, on: bool) -> Result<(), SignalError>;

    /// Last LED level successfully written
    fn led(&self) -> bool;

    /// Last flash level successfully written
    fn flash(&self) -> bool;

    /// Deassert every output and release the underlying devices
    async fn release(&self) -> Result<(), SignalError>;
}

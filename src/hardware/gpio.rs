use super::{SignalAdapter, TriggerEvent};
use crate::config::HardwareConfig;
use crate::error::SignalError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::fs;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// A single output pin driven through its sysfs `value` file.
///
/// Pins are expected to be exported and configured as outputs before the booth starts.
pub struct GpioOutput {
    name: &'static str,
    path: PathBuf,
    state: AtomicBool,
}

impl GpioOutput {
    pub fn new(name: &'static str, path: impl Into<PathBuf>) -> Self {
        Self {
            name,
            path: path.into(),
            state: AtomicBool::new(false),
        }
    }

    pub async fn set(&self, on: bool) -> Result<(), SignalError> {
        fs::write(&self.path, if on { "1" } else { "0" })
            .await
            .map_err(|e| SignalError::Gpio {
                name: self.name.to_string(),
                path: self.path.clone(),
                details: e.to_string(),
            })?;
        self.state.store(on, Ordering::SeqCst);
        Ok(())
    }

    pub fn get(&self) -> bool {
        self.state.load(Ordering::SeqCst)
    }

}

/// Polling signal adapter over sysfs GPIO value files
pub struct SysfsSignals {
    button_path: PathBuf,
    active_low: bool,
    poll_interval: Duration,
    led: GpioOutput,
    flash: GpioOutput,
}

impl SysfsSignals {
    pub fn new(config: &HardwareConfig) -> Result<Self, SignalError> {
        if !config.button_path.exists() {
            return Err(SignalError::Gpio {
                name: "button".to_string(),
                path: config.button_path.clone(),
                details: "value file not found (is the pin exported?)".to_string(),
            });
        }

        info!(
            "Using sysfs GPIO signals: button={}, led={}, flash={}",
            config.button_path.display(),
            config.led_path.display(),
            config.flash_path.display()
        );

        Ok(Self {
            button_path: config.button_path.clone(),
            active_low: config.button_active_low,
            poll_interval: config.poll_interval(),
            led: GpioOutput::new("led", &config.led_path),
            flash: GpioOutput::new("flash", &config.flash_path),
        })
    }

    async fn button_pressed(&self) -> Result<bool, SignalError> {
        let raw = fs::read_to_string(&self.button_path)
            .await
            .map_err(|e| SignalError::Gpio {
                name: "button".to_string(),
                path: self.button_path.clone(),
                details: e.to_string(),
            })?;
        let high = raw.trim() == "1";
        Ok(high != self.active_low)
    }
}

#[async_trait]
impl SignalAdapter for SysfsSignals {
    async fn wait_for_trigger(&self) -> Result<TriggerEvent, SignalError> {
        // A button already held down must be released before it counts again
        let mut was_pressed = self.button_pressed().await?;
        if was_pressed {
            debug!("Button held while arming trigger, waiting for release");
        }

        loop {
            sleep(self.poll_interval).await;
            let pressed = self.button_pressed().await?;
            if pressed && !was_pressed {
                return Ok(TriggerEvent::now("gpio"));
            }
            was_pressed = pressed;
        }
    }

    async fn set_led(&self, on: bool) -> Result<(), SignalError> {
        self.led.set(on).await
    }

    async fn set_flash(&self, on: bool) -> Result<(), SignalError> {
        self.flash.set(on).await
    }

    fn led(&self) -> bool {
        self.led.get()
    }

    fn flash(&self) -> bool {
        self.flash.get()
    }

    async fn release(&self) -> Result<(), SignalError> {
        let flash = self.flash.set(false).await;
        let led = self.led.set(false).await;
        if let Err(e) = &flash {
            warn!("Failed to deassert flash during release: {}", e);
        }
        flash.and(led)
    }
}

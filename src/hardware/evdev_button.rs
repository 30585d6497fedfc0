use super::{GpioOutput, SignalAdapter, TriggerEvent};
use crate::config::HardwareConfig;
use crate::error::SignalError;
use async_trait::async_trait;
use evdev::{Device, EventStream, InputEventKind, Key};
use std::str::FromStr;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Interrupt-driven button through a `gpio-keys` input device; LED and flash
/// stay on sysfs value files.
pub struct EvdevSignals {
    stream: Mutex<EventStream>,
    key: Key,
    led: GpioOutput,
    flash: GpioOutput,
}

impl EvdevSignals {
    pub fn new(config: &HardwareConfig) -> Result<Self, SignalError> {
        let key = Key::from_str(&config.key_code).map_err(|_| SignalError::Input {
            details: format!("unknown key code: {}", config.key_code),
        })?;

        let device = Device::open(&config.input_device).map_err(|e| SignalError::Input {
            details: format!("open {}: {}", config.input_device.display(), e),
        })?;

        let supports_key = device
            .supported_keys()
            .map(|keys| keys.contains(key))
            .unwrap_or(false);
        if !supports_key {
            return Err(SignalError::Input {
                details: format!(
                    "{} does not report {}",
                    config.input_device.display(),
                    config.key_code
                ),
            });
        }

        info!(
            "Using input device {} ({}) for button {}",
            config.input_device.display(),
            device.name().unwrap_or("Unknown"),
            config.key_code
        );

        let stream = device.into_event_stream().map_err(|e| SignalError::Input {
            details: format!("event stream: {}", e),
        })?;

        Ok(Self {
            stream: Mutex::new(stream),
            key,
            led: GpioOutput::new("led", &config.led_path),
            flash: GpioOutput::new("flash", &config.flash_path),
        })
    }
}

#[async_trait]
impl SignalAdapter for EvdevSignals {
    async fn wait_for_trigger(&self) -> Result<TriggerEvent, SignalError> {
        let mut stream = self.stream.lock().await;
        loop {
            let event = stream.next_event().await.map_err(|e| SignalError::Input {
                details: e.to_string(),
            })?;

            if let InputEventKind::Key(key) = event.kind() {
                if key == self.key && event.value() == 1 {
                    return Ok(TriggerEvent::now("evdev"));
                }
                debug!("Ignoring key event {:?} value {}", key, event.value());
            }
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

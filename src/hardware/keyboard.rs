use super::{SignalAdapter, TriggerEvent};
use crate::error::SignalError;
use crate::events::{BoothEvent, EventBus};
use async_trait::async_trait;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::{mpsc, Mutex};
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Bench signal adapter: the space bar is the button, LED and flash are logged.
/// `q` or Esc requests a shutdown through the event bus.
pub struct KeyboardSignals {
    triggers: Mutex<mpsc::UnboundedReceiver<TriggerEvent>>,
    led: AtomicBool,
    flash: AtomicBool,
    cancellation_token: CancellationToken,
}

impl KeyboardSignals {
    /// Start listening for keyboard input
    pub fn start(event_bus: Arc<EventBus>) -> Self {
        info!("Starting keyboard signals - press SPACE to trigger a session, q to quit");

        let (tx, rx) = mpsc::unbounded_channel();
        let cancellation_token = CancellationToken::new();
        let token = cancellation_token.clone();

        task::spawn_blocking(move || {
            if let Err(e) = enable_raw_mode() {
                error!("Failed to enable raw mode for keyboard input: {}", e);
                return;
            }

            loop {
                if token.is_cancelled() {
                    debug!("Keyboard signal task stopping");
                    break;
                }

                match event::poll(Duration::from_millis(100)) {
                    Ok(true) => {
                        let Ok(Event::Key(key_event)) = event::read() else {
                            continue;
                        };
                        if key_event.kind != KeyEventKind::Press {
                            continue;
                        }
                        match key_event.code {
                            KeyCode::Char(' ') => {
                                if tx.send(TriggerEvent::now("keyboard")).is_err() {
                                    break;
                                }
                            }
                            KeyCode::Char('q') | KeyCode::Esc => {
                                let _ = event_bus.publish(BoothEvent::ShutdownRequested {
                                    timestamp: SystemTime::now(),
                                    reason: "User requested via keyboard".to_string(),
                                });
                                break;
                            }
                            other => debug!("Key pressed: {:?}", other),
                        }
                    }
                    Ok(false) => {}
                    Err(e) => warn!("Error polling for keyboard events: {}", e),
                }
            }

            if let Err(e) = disable_raw_mode() {
                error!("Failed to disable raw mode: {}", e);
            }
        });

        Self {
            triggers: Mutex::new(rx),
            led: AtomicBool::new(false),
            flash: AtomicBool::new(false),
            cancellation_token,
        }
    }
}

#[async_trait]
impl SignalAdapter for KeyboardSignals {
    async fn wait_for_trigger(&self) -> Result<TriggerEvent, SignalError> {
        let mut triggers = self.triggers.lock().await;
        triggers.recv().await.ok_or(SignalError::Closed)
    }

    async fn set_led(&self, on: bool) -> Result<(), SignalError> {
        if self.led.swap(on, Ordering::SeqCst) != on {
            info!("LED {}", if on { "on" } else { "off" });
        }
        Ok(())
    }

    async fn set_flash(&self, on: bool) -> Result<(), SignalError> {
        if self.flash.swap(on, Ordering::SeqCst) != on {
            info!("Flash {}", if on { "on" } else { "off" });
        }
        Ok(())
    }

    fn led(&self) -> bool {
        self.led.load(Ordering::SeqCst)
    }

    fn flash(&self) -> bool {
        self.flash.load(Ordering::SeqCst)
    }

    async fn release(&self) -> Result<(), SignalError> {
        self.flash.store(false, Ordering::SeqCst);
        self.led.store(false, Ordering::SeqCst);
        self.cancellation_token.cancel();

        // Give the blocking task a moment to leave raw mode
        tokio::time::sleep(Duration::from_millis(200)).await;
        let _ = disable_raw_mode();
        Ok(())
    }
}

use super::{SignalAdapter, TriggerEvent};
use crate::error::SignalError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tracing::debug;

/// A recorded output transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalChange {
    Led(bool),
    Flash(bool),
}

/// In-memory signal adapter for tests and dry runs.
///
/// Triggers are queued with [`MockSignals::trigger`]; every output write is recorded.
pub struct MockSignals {
    sender: mpsc::UnboundedSender<TriggerEvent>,
    receiver: tokio::sync::Mutex<mpsc::UnboundedReceiver<TriggerEvent>>,
    led: AtomicBool,
    flash: AtomicBool,
    released: AtomicBool,
    disconnected: AtomicBool,
    history: Mutex<Vec<SignalChange>>,
}

impl MockSignals {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: tokio::sync::Mutex::new(receiver),
            led: AtomicBool::new(false),
            flash: AtomicBool::new(false),
            released: AtomicBool::new(false),
            disconnected: AtomicBool::new(false),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Queue a button press
    pub fn trigger(&self) {
        debug!("Mock trigger queued");
        let _ = self.sender.send(TriggerEvent::now("mock"));
    }

    /// Every LED/flash write so far, in order
    pub fn history(&self) -> Vec<SignalChange> {
        self.history.lock().clone()
    }

    /// Make the next `wait_for_trigger` report a closed trigger source
    pub fn disconnect(&self) {
        self.disconnected.store(true, Ordering::SeqCst);
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

impl Default for MockSignals {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalAdapter for MockSignals {
    async fn wait_for_trigger(&self) -> Result<TriggerEvent, SignalError> {
        if self.disconnected.load(Ordering::SeqCst) {
            return Err(SignalError::Closed);
        }
        let mut receiver = self.receiver.lock().await;
        receiver.recv().await.ok_or(SignalError::Closed)
    }

    async fn set_led(&self, on: bool) -> Result<(), SignalError> {
        self.led.store(on, Ordering::SeqCst);
        self.history.lock().push(SignalChange::Led(on));
        Ok(())
    }

    async fn set_flash(&self, on: bool) -> Result<(), SignalError> {
        self.flash.store(on, Ordering::SeqCst);
        self.history.lock().push(SignalChange::Flash(on));
        Ok(())
    }

    fn led(&self) -> bool {
        self.led.load(Ordering::SeqCst)
    }

    fn flash(&self) -> bool {
        self.flash.load(Ordering::SeqCst)
    }

    async fn release(&self) -> Result<(), SignalError> {
        self.set_flash(false).await?;
        self.set_led(false).await?;
        self.released.store(true, Ordering::SeqCst);
        Ok(())
    }
}

use super::BoothOrchestrator;
use crate::error::Result;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, info};

const STEP_TIMEOUT: Duration = Duration::from_secs(5);

impl BoothOrchestrator {
    /// Deassert outputs and release hardware. Runs once; later calls return the first exit code.
    pub async fn shutdown(&mut self) -> Result<i32> {
        if let Some(exit_code) = self.exit_code {
            debug!("Shutdown already completed");
            return Ok(exit_code);
        }

        info!("Beginning graceful shutdown");
        let signals = &self.adapters.signals;
        let camera = &self.adapters.camera;
        let display = &self.adapters.display;

        let results = [
            stop_step("flash", signals.set_flash(false)).await,
            stop_step("led", signals.set_led(false)).await,
            stop_step("signals", signals.release()).await,
            stop_step("camera preview", camera.stop_preview()).await,
            stop_step("camera", camera.close()).await,
            stop_step("display", display.clear()).await,
        ];
        let exit_code = if results.iter().all(|ok| *ok) { 0 } else { 1 };

        self.exit_code = Some(exit_code);
        info!("Graceful shutdown completed with exit code: {}", exit_code);
        Ok(exit_code)
    }
}

async fn stop_step<F, E>(name: &str, step: F) -> bool
where
    F: Future<Output = std::result::Result<(), E>>,
    E: Display,
{
    match timeout(STEP_TIMEOUT, step).await {
        Ok(Ok(())) => {
            debug!("Stopped {}", name);
            true
        }
        Ok(Err(e)) => {
            error!("Error stopping {}: {}", name, e);
            false
        }
        Err(_) => {
            error!("Stopping {} timed out", name);
            false
        }
    }
}

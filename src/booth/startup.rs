use super::BoothOrchestrator;
use crate::display::show_fitted;
use crate::error::Result;
use crate::storage::Screen;
use tokio::time::sleep;
use tracing::{info, warn};

impl BoothOrchestrator {
    /// Prepare storage, acknowledge startup on the LED and show the intro screen
    pub async fn initialize(&mut self) -> Result<()> {
        info!("Initializing photo booth");
        self.install_signal_handlers();

        self.storage.prepare_directories().await?;
        self.blink(self.config.hardware.startup_blinks).await;

        if self.config.storage.clear_on_startup {
            let removed = self.storage.clear_captures().await?;
            info!("Removed {} photos from previous runs", removed);
            self.blink(self.config.hardware.startup_blinks).await;
        }

        self.show_intro().await;

        info!("Photo booth initialized");
        Ok(())
    }

    pub(super) async fn show_intro(&self) {
        let intro = self.storage.screen_path(Screen::Intro);
        if let Err(e) = show_fitted(
            self.adapters.display.as_ref(),
            &intro,
            0.0,
            self.config.display.resolution,
        )
        .await
        {
            warn!("Failed to show intro screen: {}", e);
        }
    }

    /// Flash the LED `count` times
    async fn blink(&self, count: u32) {
        let interval = self.config.hardware.blink_interval();
        let signals = &self.adapters.signals;

        for _ in 0..count {
            for on in [true, false] {
                if let Err(e) = signals.set_led(on).await {
                    warn!("LED blink failed: {}", e);
                }
                sleep(interval).await;
            }
        }
    }
}

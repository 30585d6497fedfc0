use super::{SessionController, SessionTimestamp};
use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Largest tilt, either way, applied to a replayed photo
pub const MAX_REPLAY_ROTATION_DEGREES: f32 = 5.0;

impl SessionController {
    /// Replay every photo of `group` `replay_cycles` times, each at a fresh random tilt
    pub async fn display_pics(&self, group: &SessionTimestamp) {
        let session = &self.config.session;
        let (cycles, total, delay) = (session.replay_cycles, session.total_pics, session.replay_delay());
        debug!("Replaying session {} ({} cycles)", group, cycles);

        for _ in 0..cycles {
            for index in 1..=total {
                let path = self.storage.artifact_path(group, index);
                let rotation = self.random_rotation();

                if let Err(e) = self.show_image(&path, rotation).await {
                    warn!("Failed to replay {}: {}", path.display(), e);
                }
                sleep(delay).await;
            }
        }
    }

    fn random_rotation(&self) -> f32 {
        self.rng
            .lock()
            .random_range(-MAX_REPLAY_ROTATION_DEGREES..=MAX_REPLAY_ROTATION_DEGREES)
    }
}

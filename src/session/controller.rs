use super::{BoothPhase, BoothState, CaptureArtifact, SessionResult, SessionTimestamp};
use crate::camera::CaptureAdapter;
use crate::config::BoothConfig;
use crate::display::{show_fitted, DisplayAdapter};
use crate::error::{BoothError, CaptureError, DisplayError, Result};
use crate::events::{BoothEvent, EventBus};
use crate::hardware::SignalAdapter;
use crate::storage::{BoothStorage, Screen};
use crate::upload::{self, Uploader};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, error, info, warn};

/// Runs one photo session at a time: prep, capture, post-capture review, cooldown.
///
/// Adapters are shared with the booth loop, which owns the ready LED and shutdown.
pub struct SessionController {
    pub(super) config: Arc<BoothConfig>,
    pub(super) signals: Arc<dyn SignalAdapter>,
    pub(super) camera: Arc<dyn CaptureAdapter>,
    pub(super) display: Arc<dyn DisplayAdapter>,
    pub(super) uploader: Arc<dyn Uploader>,
    pub(super) storage: BoothStorage,
    pub(super) event_bus: Arc<EventBus>,
    pub(super) rng: Mutex<Box<dyn RngCore + Send>>,
    pub(super) state: BoothState,
}

impl SessionController {
    pub fn builder() -> SessionControllerBuilder {
        SessionControllerBuilder::default()
    }

    pub fn phase(&self) -> BoothPhase {
        self.state.phase()
    }

    pub fn state(&self) -> &BoothState {
        &self.state
    }

    pub fn storage(&self) -> &BoothStorage {
        &self.storage
    }

    /// Run a session stamped with the current local time
    pub async fn run_session(&mut self) -> SessionResult {
        self.run_session_at(SessionTimestamp::now()).await
    }

    /// Run a full session; always returns with the controller `Idle` and outputs deasserted
    pub async fn run_session_at(&mut self, timestamp: SessionTimestamp) -> SessionResult {
        self.state.reset();
        info!("Starting session {}", timestamp);

        self.enter(BoothPhase::Prep);
        let poses = match self.acquire().await {
            Ok(poses) => poses,
            Err(e) => {
                warn!("Session {} aborted: {}", timestamp, e);
                self.report_error("session", &e);
                self.release_camera().await;
                self.enter(BoothPhase::Idle);
                return self.finish(SessionResult::aborted(timestamp));
            }
        };
        sleep(self.config.session.prep_delay()).await;

        self.enter(BoothPhase::Capturing);
        let artifacts = match self.capture_all(&timestamp, &poses).await {
            Ok(artifacts) => artifacts,
            Err(e) => {
                error!("Session {} failed: {}", timestamp, e);
                self.report_error("camera", &BoothError::from(e));
                self.enter(BoothPhase::Failed);
                self.release_outputs().await;
                self.release_camera().await;
                let discarded = self
                    .storage
                    .discard_session(&timestamp, self.config.session.total_pics)
                    .await;
                if discarded > 0 {
                    info!("Discarded {} photos of failed session {}", discarded, timestamp);
                }
                self.show_screen(Screen::Intro).await;
                self.enter(BoothPhase::Idle);
                return self.finish(SessionResult::failed(timestamp));
            }
        };
        self.release_camera().await;

        self.enter(BoothPhase::PostCapture);
        self.post_capture(&timestamp, &artifacts).await;

        self.enter(BoothPhase::RestartCooldown);
        sleep(self.config.session.restart_delay()).await;
        self.show_screen(Screen::Intro).await;

        self.enter(BoothPhase::Idle);
        self.finish(SessionResult::completed(timestamp, artifacts))
    }

    /// Load pose prompts, open the camera and show the first prompt
    async fn acquire(&self) -> Result<Vec<PathBuf>> {
        let poses = self.storage.pose_images().await?;
        if poses.is_empty() {
            return Err(BoothError::resource_unavailable(
                "pose images",
                DisplayError::NoImages {
                    dir: self.config.storage.pose_dir.clone(),
                },
            ));
        }

        let camera = &self.config.camera;
        self.camera
            .configure(camera.resolution.dimensions(), camera.iso)
            .await
            .map_err(|e| BoothError::resource_unavailable("camera", e))?;
        self.camera
            .start_preview()
            .await
            .map_err(|e| BoothError::resource_unavailable("camera", e))?;

        let prompt = poses[self.rng.lock().random_range(0..poses.len())].clone();
        self.show_image(&prompt, 0.0)
            .await
            .map_err(|e| BoothError::resource_unavailable("display", e))?;

        Ok(poses)
    }

    async fn capture_all(
        &mut self,
        timestamp: &SessionTimestamp,
        poses: &[PathBuf],
    ) -> std::result::Result<Vec<CaptureArtifact>, CaptureError> {
        let total = self.config.session.total_pics;
        let mut artifacts = Vec::with_capacity(total as usize);

        for index in 1..=total {
            let pose = &poses[(index as usize - 1) % poses.len()];
            if let Err(e) = self.show_image(pose, 0.0).await {
                warn!("Failed to show pose prompt {}: {}", pose.display(), e);
            }
            sleep(self.config.session.capture_delay()).await;
            if let Err(e) = self.display.clear().await {
                warn!("Failed to clear display: {}", e);
            }

            let path = self.storage.artifact_path(timestamp, index);
            self.capture_with_retry(&path).await?;

            info!("Captured photo {}/{}: {}", index, total, path.display());
            self.state.record_capture();
            artifacts.push(CaptureArtifact::new(timestamp.clone(), index, path));
        }

        Ok(artifacts)
    }

    /// A transient frame failure gets exactly one more attempt at the same path
    async fn capture_with_retry(&self, path: &Path) -> std::result::Result<(), CaptureError> {
        match self.expose(path).await {
            Err(e) if e.is_transient() => {
                warn!("Capture failed, retrying once: {}", e);
                self.expose(path).await
            }
            result => result,
        }
    }

    async fn expose(&self, path: &Path) -> std::result::Result<(), CaptureError> {
        if self.config.camera.flash_enabled {
            if let Err(e) = self.signals.set_flash(true).await {
                warn!("Failed to assert flash: {}", e);
            }
        }
        if let Err(e) = self.signals.set_led(true).await {
            warn!("Failed to assert LED: {}", e);
        }

        let result = self.camera.capture(path).await;

        self.release_outputs().await;
        result
    }

    async fn post_capture(&self, timestamp: &SessionTimestamp, artifacts: &[CaptureArtifact]) {
        let started = Instant::now();
        let uploading = self.config.upload.enabled;

        self.show_screen(if uploading {
            Screen::Uploading
        } else {
            Screen::Processing
        })
        .await;

        if uploading {
            let success = match self.uploader.upload(artifacts).await {
                Ok(()) => true,
                Err(e) => {
                    warn!("Upload of session {} failed: {}", timestamp, e);
                    false
                }
            };
            self.publish(BoothEvent::UploadFinished {
                session: timestamp.to_string(),
                success,
            });
        }

        sleep_until(started + self.config.session.post_capture_delay()).await;

        self.display_pics(timestamp).await;
        self.show_screen(Screen::Finished).await;
    }

    pub(super) async fn show_image(
        &self,
        path: &Path,
        rotation_degrees: f32,
    ) -> std::result::Result<(), DisplayError> {
        show_fitted(
            self.display.as_ref(),
            path,
            rotation_degrees,
            self.config.display.resolution,
        )
        .await
    }

    async fn show_screen(&self, screen: Screen) {
        let path = self.storage.screen_path(screen);
        if let Err(e) = self.show_image(&path, 0.0).await {
            warn!("Failed to show {:?} screen: {}", screen, e);
        }
    }

    async fn release_outputs(&self) {
        if let Err(e) = self.signals.set_flash(false).await {
            warn!("Failed to deassert flash: {}", e);
        }
        if let Err(e) = self.signals.set_led(false).await {
            warn!("Failed to deassert LED: {}", e);
        }
    }

    async fn release_camera(&self) {
        if let Err(e) = self.camera.stop_preview().await {
            warn!("Failed to stop camera preview: {}", e);
        }
        if let Err(e) = self.camera.close().await {
            warn!("Failed to close camera: {}", e);
        }
    }

    fn enter(&mut self, phase: BoothPhase) {
        self.state.enter(phase);
        self.publish(BoothEvent::PhaseChanged {
            phase,
            timestamp: SystemTime::now(),
        });
    }

    fn finish(&self, result: SessionResult) -> SessionResult {
        info!(
            "Session {} finished: {:?} with {} photos",
            result.timestamp,
            result.status,
            result.artifacts.len()
        );
        self.publish(BoothEvent::SessionFinished {
            session: result.timestamp.to_string(),
            status: result.status,
            photo_count: result.artifacts.len(),
        });
        result
    }

    fn report_error(&self, component: &str, error: &BoothError) {
        self.publish(BoothEvent::SystemError {
            component: component.to_string(),
            error: error.to_string(),
        });
    }

    fn publish(&self, event: BoothEvent) {
        if let Err(e) = self.event_bus.publish(event) {
            debug!("Dropped session event: {}", e);
        }
    }
}

/// Builder for [`SessionController`]; config and the three hardware adapters are required
#[derive(Default)]
pub struct SessionControllerBuilder {
    config: Option<Arc<BoothConfig>>,
    signals: Option<Arc<dyn SignalAdapter>>,
    camera: Option<Arc<dyn CaptureAdapter>>,
    display: Option<Arc<dyn DisplayAdapter>>,
    uploader: Option<Arc<dyn Uploader>>,
    event_bus: Option<Arc<EventBus>>,
    rng: Option<Box<dyn RngCore + Send>>,
}

impl SessionControllerBuilder {
    pub fn with_config(mut self, config: Arc<BoothConfig>) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_signals(mut self, signals: Arc<dyn SignalAdapter>) -> Self {
        self.signals = Some(signals);
        self
    }

    pub fn with_camera(mut self, camera: Arc<dyn CaptureAdapter>) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn with_display(mut self, display: Arc<dyn DisplayAdapter>) -> Self {
        self.display = Some(display);
        self
    }

    pub fn with_uploader(mut self, uploader: Arc<dyn Uploader>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn with_rng<R: RngCore + Send + 'static>(mut self, rng: R) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    pub fn build(self) -> Result<SessionController> {
        let config = self
            .config
            .ok_or_else(|| BoothError::system("Session controller requires a configuration"))?;
        let signals = self
            .signals
            .ok_or_else(|| BoothError::system("Session controller requires a signal adapter"))?;
        let camera = self
            .camera
            .ok_or_else(|| BoothError::system("Session controller requires a camera"))?;
        let display = self
            .display
            .ok_or_else(|| BoothError::system("Session controller requires a display"))?;

        let uploader = self
            .uploader
            .unwrap_or_else(|| upload::from_config(&config.upload));
        let event_bus = self
            .event_bus
            .unwrap_or_else(|| Arc::new(EventBus::new(config.system.event_bus_capacity)));
        let rng = self
            .rng
            .unwrap_or_else(|| Box::new(StdRng::from_os_rng()));

        Ok(SessionController {
            storage: BoothStorage::new(config.storage.clone()),
            config,
            signals,
            camera,
            display,
            uploader,
            event_bus,
            rng: Mutex::new(rng),
            state: BoothState::new(),
        })
    }
}

//! Shared fixtures for session and booth tests

use crate::camera::MockCamera;
use crate::config::BoothConfig;
use crate::display::MockDisplay;
use crate::events::EventBus;
use crate::hardware::MockSignals;
use crate::session::SessionController;
use crate::storage::Screen;
use crate::upload::MockUploader;
use image::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub const SCREEN: (u32, u32) = (80, 60);

/// Booth directories populated with pose prompts and status screens
pub struct BoothFixture {
    pub _temp: TempDir,
    pub config: Arc<BoothConfig>,
    pub signals: Arc<MockSignals>,
    pub display: Arc<MockDisplay>,
    pub uploader: Arc<MockUploader>,
    pub event_bus: Arc<EventBus>,
}

impl BoothFixture {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    pub fn with_config<F: FnOnce(&mut BoothConfig)>(adjust: F) -> Self {
        let temp = TempDir::new().unwrap();
        let mut config = test_config(temp.path());
        adjust(&mut config);
        write_inputs(&config);

        Self {
            _temp: temp,
            event_bus: Arc::new(EventBus::new(config.system.event_bus_capacity)),
            config: Arc::new(config),
            signals: Arc::new(MockSignals::new()),
            display: Arc::new(MockDisplay::new()),
            uploader: Arc::new(MockUploader::new()),
        }
    }

    /// A camera writing small JPEGs and probing the fixture's signals
    pub fn camera(&self) -> MockCamera {
        MockCamera::new()
            .writing_images((32, 24))
            .with_signal_probe(self.signals.clone())
    }

    pub fn controller(&self, camera: Arc<MockCamera>) -> SessionController {
        SessionController::builder()
            .with_config(Arc::clone(&self.config))
            .with_signals(self.signals.clone())
            .with_camera(camera)
            .with_display(self.display.clone())
            .with_uploader(self.uploader.clone())
            .with_event_bus(Arc::clone(&self.event_bus))
            .with_rng(StdRng::seed_from_u64(7))
            .build()
            .unwrap()
    }

    pub fn poses(&self) -> Vec<PathBuf> {
        vec![
            self.config.storage.pose_dir.join("pose1.png"),
            self.config.storage.pose_dir.join("pose2.png"),
        ]
    }

    pub fn screen(&self, screen: Screen) -> PathBuf {
        self.config.storage.display_dir.join(screen.file_name())
    }
}

pub fn test_config(root: &Path) -> BoothConfig {
    let mut config = BoothConfig::default();
    config.display.resolution = SCREEN;
    config.storage.capture_dir = root.join("pics");
    config.storage.display_dir = root.join("display_pics");
    config.storage.pose_dir = root.join("pose_pics");
    config.session.total_pics = 3;
    config.session.debounce_ms = 1000;
    config.session.prep_delay_ms = 5000;
    config.session.capture_delay_ms = 3000;
    config.session.post_capture_delay_ms = 3000;
    config.session.replay_cycles = 2;
    config.session.replay_delay_ms = 1500;
    config.session.restart_delay_ms = 10000;
    config.hardware.startup_blinks = 2;
    config.hardware.blink_interval_ms = 100;
    config
}

/// Expected wall time of one completed session under `config`
pub fn session_duration(config: &BoothConfig) -> std::time::Duration {
    let session = &config.session;
    let pics = session.total_pics;
    session.prep_delay()
        + session.capture_delay() * pics
        + session.post_capture_delay()
        + session.replay_delay() * (session.replay_cycles * pics)
        + session.restart_delay()
}

fn write_inputs(config: &BoothConfig) {
    let storage = &config.storage;
    for dir in [&storage.capture_dir, &storage.display_dir, &storage.pose_dir] {
        std::fs::create_dir_all(dir).unwrap();
    }

    RgbImage::from_pixel(160, 90, Rgb([200, 40, 40]))
        .save(storage.pose_dir.join("pose1.png"))
        .unwrap();
    RgbImage::from_pixel(60, 160, Rgb([40, 200, 40]))
        .save(storage.pose_dir.join("pose2.png"))
        .unwrap();

    for screen in [
        Screen::Intro,
        Screen::Processing,
        Screen::Uploading,
        Screen::Finished,
    ] {
        RgbImage::new(SCREEN.0, SCREEN.1)
            .save(storage.display_dir.join(screen.file_name()))
            .unwrap();
    }
}

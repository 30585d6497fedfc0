use super::types::ShutdownReason;
use crate::camera::CaptureAdapter;
use crate::config::BoothConfig;
use crate::display::DisplayAdapter;
use crate::error::Result;
use crate::events::EventBus;
use crate::hardware::SignalAdapter;
use crate::session::SessionController;
use crate::storage::BoothStorage;
use crate::upload::Uploader;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Hardware and collaborators the booth drives
#[derive(Clone)]
pub struct BoothAdapters {
    pub signals: Arc<dyn SignalAdapter>,
    pub camera: Arc<dyn CaptureAdapter>,
    pub display: Arc<dyn DisplayAdapter>,
    pub uploader: Arc<dyn Uploader>,
}

/// Owns the booth loop: startup, one session per trigger, and shutdown
pub struct BoothOrchestrator {
    pub(super) config: Arc<BoothConfig>,
    pub(super) event_bus: Arc<EventBus>,
    pub(super) adapters: BoothAdapters,
    pub(super) storage: BoothStorage,
    pub(super) controller: SessionController,

    // Lifecycle management
    pub(super) shutdown_sender: Option<oneshot::Sender<ShutdownReason>>,
    pub(super) shutdown_receiver: Option<oneshot::Receiver<ShutdownReason>>,
    pub(super) exit_code: Option<i32>,
}

impl BoothOrchestrator {
    /// Create a new orchestrator; adapters are shared with the session controller
    pub fn new(
        config: Arc<BoothConfig>,
        event_bus: Arc<EventBus>,
        adapters: BoothAdapters,
    ) -> Result<Self> {
        let controller = SessionController::builder()
            .with_config(Arc::clone(&config))
            .with_signals(Arc::clone(&adapters.signals))
            .with_camera(Arc::clone(&adapters.camera))
            .with_display(Arc::clone(&adapters.display))
            .with_uploader(Arc::clone(&adapters.uploader))
            .with_event_bus(Arc::clone(&event_bus))
            .build()?;

        let (shutdown_sender, shutdown_receiver) = oneshot::channel();

        Ok(Self {
            storage: BoothStorage::new(config.storage.clone()),
            config,
            event_bus,
            adapters,
            controller,
            shutdown_sender: Some(shutdown_sender),
            shutdown_receiver: Some(shutdown_receiver),
            exit_code: None,
        })
    }
}

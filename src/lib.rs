pub mod booth;
pub mod camera;
pub mod config;
pub mod display;
pub mod error;
pub mod events;
pub mod hardware;
pub mod session;
pub mod storage;
pub mod upload;

#[cfg(test)]
mod testing;

pub use booth::{BoothAdapters, BoothOrchestrator, ShutdownReason};
pub use camera::{CaptureAdapter, CommandCamera, MockCamera};
pub use config::BoothConfig;
pub use display::{DisplayAdapter, FramebufferDisplay, MockDisplay, Padding, Placement};
pub use error::{BoothError, Result};
pub use events::{BoothEvent, EventBus};
pub use hardware::{KeyboardSignals, MockSignals, SignalAdapter, SysfsSignals, TriggerEvent};
pub use session::{
    BoothPhase, CaptureArtifact, SessionController, SessionResult, SessionStatus,
    SessionTimestamp,
};
pub use storage::{BoothStorage, Screen};
pub use upload::{CommandUploader, MockUploader, Uploader};

mod artifact;
mod controller;
mod replay;
mod state;


pub use artifact::{CaptureArtifact, SessionResult, SessionStatus, SessionTimestamp};
pub use controller::{SessionController, SessionControllerBuilder};
pub use replay::MAX_REPLAY_ROTATION_DEGREES;
pub use state::{BoothPhase, BoothState};

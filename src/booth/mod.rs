mod orchestrator;
mod runtime;
mod shutdown;
mod startup;
mod types;


pub use orchestrator::{BoothAdapters, BoothOrchestrator};
pub use types::ShutdownReason;

mod command;
mod mock;

pub use command::CommandCamera;
pub use mock::MockCamera;

use crate::error::CaptureError;
use async_trait::async_trait;
use std::path::Path;

/// Still camera used by a session.
///
/// `configure` acquires the device; `close` releases it and must be safe to
/// call on a camera that was never opened.
#[async_trait]
pub trait CaptureAdapter: Send + Sync {
    async fn configure(&self, resolution: (u32, u32), iso: u32) -> Result<(), CaptureError>;

    async fn start_preview(&self) -> Result<(), CaptureError>;

    /// Take one photo and write it to `path`, overwriting any existing file
    async fn capture(&self, path: &Path) -> Result<(), CaptureError>;

    async fn stop_preview(&self) -> Result<(), CaptureError>;

    async fn close(&self) -> Result<(), CaptureError>;

    fn is_open(&self) -> bool;
}

use super::CaptureAdapter;
use crate::error::CaptureError;
use crate::hardware::SignalAdapter;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Scriptable camera for tests and dry runs
pub struct MockCamera {
    open: AtomicBool,
    previewing: AtomicBool,
    unavailable: bool,
    failing_attempts: HashSet<usize>,
    image_size: Option<(u32, u32)>,
    signal_probe: Option<Arc<dyn SignalAdapter>>,
    attempts: AtomicUsize,
    close_count: AtomicUsize,
    settings: Mutex<Option<((u32, u32), u32)>>,
    captured: Mutex<Vec<PathBuf>>,
    observed_signals: Mutex<Vec<(bool, bool)>>,
}

impl MockCamera {
    pub fn new() -> Self {
        Self {
            open: AtomicBool::new(false),
            previewing: AtomicBool::new(false),
            unavailable: false,
            failing_attempts: HashSet::new(),
            image_size: None,
            signal_probe: None,
            attempts: AtomicUsize::new(0),
            close_count: AtomicUsize::new(0),
            settings: Mutex::new(None),
            captured: Mutex::new(Vec::new()),
            observed_signals: Mutex::new(Vec::new()),
        }
    }

    /// `configure` fails as if no camera were attached
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// Fail the given capture attempts (1-based, counted across the camera's lifetime)
    pub fn failing_attempts<I: IntoIterator<Item = usize>>(mut self, attempts: I) -> Self {
        self.failing_attempts = attempts.into_iter().collect();
        self
    }

    /// Write a black JPEG of this size for every successful capture
    pub fn writing_images(mut self, size: (u32, u32)) -> Self {
        self.image_size = Some(size);
        self
    }

    /// Record (flash, led) levels of `signals` at the moment of each capture
    pub fn with_signal_probe(mut self, signals: Arc<dyn SignalAdapter>) -> Self {
        self.signal_probe = Some(signals);
        self
    }

    pub fn capture_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn captured_paths(&self) -> Vec<PathBuf> {
        self.captured.lock().clone()
    }

    pub fn observed_signals(&self) -> Vec<(bool, bool)> {
        self.observed_signals.lock().clone()
    }

    pub fn settings(&self) -> Option<((u32, u32), u32)> {
        *self.settings.lock()
    }

    pub fn is_previewing(&self) -> bool {
        self.previewing.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.close_count.load(Ordering::SeqCst)
    }
}

impl Default for MockCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptureAdapter for MockCamera {
    async fn configure(&self, resolution: (u32, u32), iso: u32) -> Result<(), CaptureError> {
        if self.unavailable {
            return Err(CaptureError::Configuration {
                details: "mock camera unavailable".to_string(),
            });
        }
        *self.settings.lock() = Some((resolution, iso));
        self.open.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn start_preview(&self) -> Result<(), CaptureError> {
        if !self.is_open() {
            return Err(CaptureError::NotOpen);
        }
        self.previewing.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn capture(&self, path: &Path) -> Result<(), CaptureError> {
        if !self.is_open() {
            return Err(CaptureError::NotOpen);
        }

        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(signals) = &self.signal_probe {
            self.observed_signals
                .lock()
                .push((signals.flash(), signals.led()));
        }

        if self.failing_attempts.contains(&attempt) {
            debug!("Mock capture attempt {} failing", attempt);
            return Err(CaptureError::Frame {
                path: path.to_path_buf(),
                details: format!("scripted failure on attempt {}", attempt),
            });
        }

        if let Some((width, height)) = self.image_size {
            image::RgbImage::new(width, height)
                .save(path)
                .map_err(|e| CaptureError::Frame {
                    path: path.to_path_buf(),
                    details: e.to_string(),
                })?;
        }

        self.captured.lock().push(path.to_path_buf());
        Ok(())
    }

    async fn stop_preview(&self) -> Result<(), CaptureError> {
        self.previewing.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) -> Result<(), CaptureError> {
        self.previewing.store(false, Ordering::SeqCst);
        self.open.store(false, Ordering::SeqCst);
        self.close_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

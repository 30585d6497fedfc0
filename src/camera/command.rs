use super::CaptureAdapter;
use crate::config::CameraConfig;
use crate::error::CaptureError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::Path;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy)]
struct CaptureSettings {
    resolution: (u32, u32),
    iso: u32,
}

/// Camera driven through an external still-capture tool (`rpicam-still` by default)
pub struct CommandCamera {
    still_command: String,
    preview_command: Option<String>,
    settings: Mutex<Option<CaptureSettings>>,
    preview: tokio::sync::Mutex<Option<Child>>,
}

impl CommandCamera {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            still_command: config.still_command.clone(),
            preview_command: config.preview_command.clone(),
            settings: Mutex::new(None),
            preview: tokio::sync::Mutex::new(None),
        }
    }

    fn command(line: &str) -> Result<Command, String> {
        let mut parts = line.split_whitespace();
        let program = parts.next().ok_or_else(|| "empty command".to_string())?;
        let mut command = Command::new(program);
        command.args(parts);
        Ok(command)
    }

    /// Arguments for one still capture, ISO expressed as analogue gain
    fn still_args(settings: &CaptureSettings, path: &Path) -> Vec<String> {
        let gain = settings.iso as f32 / 100.0;
        vec![
            "--nopreview".to_string(),
            "--immediate".to_string(),
            "--width".to_string(),
            settings.resolution.0.to_string(),
            "--height".to_string(),
            settings.resolution.1.to_string(),
            "--gain".to_string(),
            format!("{:.1}", gain),
            "-o".to_string(),
            path.to_string_lossy().into_owned(),
        ]
    }
}

#[async_trait]
impl CaptureAdapter for CommandCamera {
    async fn configure(&self, resolution: (u32, u32), iso: u32) -> Result<(), CaptureError> {
        let mut command = Self::command(&self.still_command)
            .map_err(|details| CaptureError::Configuration { details })?;

        let output = command
            .arg("--list-cameras")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| CaptureError::Configuration {
                details: format!("spawn {}: {}", self.still_command, e),
            })?;

        let listing = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() || listing.contains("No cameras available") {
            return Err(CaptureError::Configuration {
                details: format!("no camera detected by {}", self.still_command),
            });
        }

        *self.settings.lock() = Some(CaptureSettings { resolution, iso });
        info!(
            "Camera configured: {}x{} ISO {}",
            resolution.0, resolution.1, iso
        );
        Ok(())
    }

    async fn start_preview(&self) -> Result<(), CaptureError> {
        let Some(line) = &self.preview_command else {
            debug!("No preview command configured");
            return Ok(());
        };

        let mut preview = self.preview.lock().await;
        if preview.is_some() {
            return Ok(());
        }

        let child = Self::command(line)
            .map_err(|details| CaptureError::Preview { details })?
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CaptureError::Preview {
                details: format!("spawn {}: {}", line, e),
            })?;
        *preview = Some(child);
        debug!("Preview started");
        Ok(())
    }

    async fn capture(&self, path: &Path) -> Result<(), CaptureError> {
        let settings = (*self.settings.lock()).ok_or(CaptureError::NotOpen)?;

        let mut command = Self::command(&self.still_command).map_err(|details| {
            CaptureError::Frame {
                path: path.to_path_buf(),
                details,
            }
        })?;

        let output = command
            .args(Self::still_args(&settings, path))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| CaptureError::Frame {
                path: path.to_path_buf(),
                details: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(CaptureError::Frame {
                path: path.to_path_buf(),
                details: format!(
                    "{} exited with {}: {}",
                    self.still_command,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        debug!("Captured {}", path.display());
        Ok(())
    }

    async fn stop_preview(&self) -> Result<(), CaptureError> {
        let mut preview = self.preview.lock().await;
        if let Some(mut child) = preview.take() {
            if let Err(e) = child.kill().await {
                warn!("Failed to stop preview process: {}", e);
                return Err(CaptureError::Preview {
                    details: e.to_string(),
                });
            }
            debug!("Preview stopped");
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), CaptureError> {
        self.stop_preview().await?;
        if self.settings.lock().take().is_some() {
            debug!("Camera closed");
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.settings.lock().is_some()
    }
}

use crate::config::UploadConfig;
use crate::error::UploadError;
use crate::session::CaptureArtifact;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, info};

/// Publishes a finished session's photos somewhere off the booth
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, artifacts: &[CaptureArtifact]) -> Result<(), UploadError>;
}

/// Build the uploader selected by configuration
pub fn from_config(config: &UploadConfig) -> Arc<dyn Uploader> {
    match (&config.enabled, &config.command) {
        (true, Some(command)) => Arc::new(CommandUploader::new(command.clone())),
        _ => Arc::new(DisabledUploader),
    }
}

/// Runs a shell command with the photo paths appended as arguments
pub struct CommandUploader {
    command: String,
}

impl CommandUploader {
    pub fn new<S: Into<String>>(command: S) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl Uploader for CommandUploader {
    async fn upload(&self, artifacts: &[CaptureArtifact]) -> Result<(), UploadError> {
        // `sh -c '<cmd> "$@"' sh <paths...>` keeps paths out of shell parsing
        let script = format!("{} \"$@\"", self.command);
        debug!("Running upload command: {}", self.command);

        let status = Command::new("sh")
            .arg("-c")
            .arg(&script)
            .arg("sh")
            .args(artifacts.iter().map(|artifact| artifact.path.as_os_str()))
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| UploadError::Spawn {
                details: e.to_string(),
            })?;

        if !status.success() {
            return Err(UploadError::Failed {
                status: status.to_string(),
            });
        }

        info!("Uploaded {} photos", artifacts.len());
        Ok(())
    }
}

/// Used when uploads are turned off
pub struct DisabledUploader;

#[async_trait]
impl Uploader for DisabledUploader {
    async fn upload(&self, _artifacts: &[CaptureArtifact]) -> Result<(), UploadError> {
        debug!("Upload disabled, skipping");
        Ok(())
    }
}

/// Records every batch it is handed
#[derive(Default)]
pub struct MockUploader {
    fail: bool,
    batches: Mutex<Vec<Vec<CaptureArtifact>>>,
}

impl MockUploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            batches: Mutex::new(Vec::new()),
        }
    }

    pub fn batches(&self) -> Vec<Vec<CaptureArtifact>> {
        self.batches.lock().clone()
    }
}

#[async_trait]
impl Uploader for MockUploader {
    async fn upload(&self, artifacts: &[CaptureArtifact]) -> Result<(), UploadError> {
        self.batches.lock().push(artifacts.to_vec());
        if self.fail {
            return Err(UploadError::Failed {
                status: "exit status: 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionTimestamp;
    use tempfile::TempDir;

    fn artifacts(dir: &std::path::Path) -> Vec<CaptureArtifact> {
        let timestamp = SessionTimestamp::parse("2024-10-14-18-30-00").unwrap();
        (1..=2)
            .map(|index| {
                let path = dir.join(CaptureArtifact::file_name(&timestamp, index));
                std::fs::write(&path, b"jpeg").unwrap();
                CaptureArtifact::new(timestamp.clone(), index, path)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_command_uploader_receives_paths() {
        let temp = TempDir::new().unwrap();
        let outbox = temp.path().join("outbox");
        std::fs::create_dir(&outbox).unwrap();
        let artifacts = artifacts(temp.path());

        let uploader = CommandUploader::new(format!("cp -t {}", outbox.display()));
        uploader.upload(&artifacts).await.unwrap();

        assert!(outbox.join("2024-10-14-18-30-00-01.jpg").exists());
        assert!(outbox.join("2024-10-14-18-30-00-02.jpg").exists());
    }

    #[tokio::test]
    async fn test_command_uploader_failure() {
        let uploader = CommandUploader::new("false");
        assert!(matches!(
            uploader.upload(&[]).await,
            Err(UploadError::Failed { .. })
        ));
    }

    #[tokio::test]
    async fn test_from_config() {
        let disabled = from_config(&UploadConfig::default());
        assert!(disabled.upload(&[]).await.is_ok());

        let enabled = from_config(&UploadConfig {
            enabled: true,
            command: Some("false".to_string()),
        });
        assert!(enabled.upload(&[]).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_uploader_records_batches() {
        let temp = TempDir::new().unwrap();
        let uploader = MockUploader::failing();

        assert!(uploader.upload(&artifacts(temp.path())).await.is_err());
        assert_eq!(uploader.batches().len(), 1);
        assert_eq!(uploader.batches()[0].len(), 2);
    }
}

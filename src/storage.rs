use crate::{
    config::StorageConfig,
    error::{BoothError, Result},
    session::{CaptureArtifact, SessionTimestamp},
};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Extensions accepted as pose prompts
const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

/// Full-screen status images kept in the display directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Intro,
    Processing,
    Uploading,
    Finished,
}

impl Screen {
    pub fn file_name(&self) -> &'static str {
        match self {
            Screen::Intro => "intro.png",
            Screen::Processing => "processing.png",
            Screen::Uploading => "uploading.png",
            Screen::Finished => "finished.png",
        }
    }
}

/// Booth directories: captured photos, status screens and pose prompts
#[derive(Debug, Clone)]
pub struct BoothStorage {
    config: StorageConfig,
}

impl BoothStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    pub fn capture_dir(&self) -> &Path {
        &self.config.capture_dir
    }

    /// Create the capture directory if it does not exist yet
    pub async fn prepare_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.config.capture_dir).await?;

        for dir in [&self.config.display_dir, &self.config.pose_dir] {
            if !dir.is_dir() {
                warn!("Input directory {} does not exist", dir.display());
            }
        }

        info!(
            "Storage ready (captures in {})",
            self.config.capture_dir.display()
        );
        Ok(())
    }

    /// Delete previously captured `.jpg` files; returns how many were removed
    pub async fn clear_captures(&self) -> Result<usize> {
        let mut entries = fs::read_dir(&self.config.capture_dir).await?;
        let mut removed = 0;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !entry.file_type().await?.is_file() || !has_extension(&path, &["jpg"]) {
                continue;
            }

            self.validate_deletion_safety(&path)?;
            match fs::remove_file(&path).await {
                Ok(()) => {
                    debug!("Removed {}", path.display());
                    removed += 1;
                }
                Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
            }
        }

        info!("Cleared {} previous photos", removed);
        Ok(removed)
    }

    /// Remove the photos a session wrote for indices `1..=count`; returns how many existed
    pub async fn discard_session(&self, timestamp: &SessionTimestamp, count: u32) -> usize {
        let mut removed = 0;
        for index in 1..=count {
            let path = self.artifact_path(timestamp, index);
            match fs::remove_file(&path).await {
                Ok(()) => {
                    debug!("Discarded {}", path.display());
                    removed += 1;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to discard {}: {}", path.display(), e),
            }
        }
        removed
    }

    /// Pose prompt images, sorted by file name
    pub async fn pose_images(&self) -> Result<Vec<PathBuf>> {
        let mut entries = fs::read_dir(&self.config.pose_dir).await.map_err(|e| {
            BoothError::resource_unavailable(
                "pose images",
                format!("{}: {}", self.config.pose_dir.display(), e),
            )
        })?;

        let mut poses = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file() && has_extension(&path, &IMAGE_EXTENSIONS) {
                poses.push(path);
            }
        }
        poses.sort();

        debug!("Found {} pose images", poses.len());
        Ok(poses)
    }

    pub fn screen_path(&self, screen: Screen) -> PathBuf {
        self.config.display_dir.join(screen.file_name())
    }

    pub fn artifact_path(&self, timestamp: &SessionTimestamp, index: u32) -> PathBuf {
        self.config
            .capture_dir
            .join(CaptureArtifact::file_name(timestamp, index))
    }

    /// A file is only deleted when it sits directly in the capture directory
    fn validate_deletion_safety(&self, path: &Path) -> Result<()> {
        let relative = path
            .strip_prefix(&self.config.capture_dir)
            .map_err(|_| BoothError::component("storage", "Path is outside capture directory"))?;

        if relative.components().count() != 1 {
            return Err(BoothError::component(
                "storage",
                "Capture file must be directly under the capture directory",
            ));
        }

        Ok(())
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_storage(root: &Path) -> BoothStorage {
        BoothStorage::new(StorageConfig {
            capture_dir: root.join("pics"),
            display_dir: root.join("display_pics"),
            pose_dir: root.join("pose_pics"),
            clear_on_startup: true,
        })
    }

    #[tokio::test]
    async fn test_prepare_creates_capture_dir() {
        let temp = TempDir::new().unwrap();
        let storage = create_test_storage(temp.path());

        storage.prepare_directories().await.unwrap();
        assert!(storage.capture_dir().is_dir());
    }

    #[tokio::test]
    async fn test_clear_captures_only_removes_jpgs() {
        let temp = TempDir::new().unwrap();
        let storage = create_test_storage(temp.path());
        storage.prepare_directories().await.unwrap();

        let capture_dir = storage.capture_dir().to_path_buf();
        std::fs::write(capture_dir.join("2024-10-14-18-30-00-01.jpg"), b"x").unwrap();
        std::fs::write(capture_dir.join("2024-10-14-18-30-00-02.jpg"), b"x").unwrap();
        std::fs::write(capture_dir.join("notes.txt"), b"x").unwrap();
        std::fs::create_dir(capture_dir.join("keep.jpg")).unwrap();

        assert_eq!(storage.clear_captures().await.unwrap(), 2);
        assert!(capture_dir.join("notes.txt").exists());
        assert!(capture_dir.join("keep.jpg").is_dir());
        assert_eq!(storage.clear_captures().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_discard_session_keeps_other_sessions() {
        let temp = TempDir::new().unwrap();
        let storage = create_test_storage(temp.path());
        storage.prepare_directories().await.unwrap();

        let failed = SessionTimestamp::parse("2024-10-14-18-30-00").unwrap();
        let earlier = SessionTimestamp::parse("2024-10-14-18-20-00").unwrap();
        for index in 1..=2 {
            std::fs::write(storage.artifact_path(&failed, index), b"x").unwrap();
            std::fs::write(storage.artifact_path(&earlier, index), b"x").unwrap();
        }

        assert_eq!(storage.discard_session(&failed, 3).await, 2);
        assert!(!storage.artifact_path(&failed, 1).exists());
        assert!(!storage.artifact_path(&failed, 2).exists());
        assert!(storage.artifact_path(&earlier, 1).exists());
        assert!(storage.artifact_path(&earlier, 2).exists());
    }

    #[tokio::test]
    async fn test_pose_images_sorted_and_filtered() {
        let temp = TempDir::new().unwrap();
        let storage = create_test_storage(temp.path());
        let pose_dir = temp.path().join("pose_pics");
        std::fs::create_dir_all(&pose_dir).unwrap();
        std::fs::write(pose_dir.join("b.png"), b"x").unwrap();
        std::fs::write(pose_dir.join("a.JPG"), b"x").unwrap();
        std::fs::write(pose_dir.join("readme.md"), b"x").unwrap();

        let poses = storage.pose_images().await.unwrap();
        assert_eq!(poses, vec![pose_dir.join("a.JPG"), pose_dir.join("b.png")]);
    }

    #[tokio::test]
    async fn test_missing_pose_dir_is_unavailable() {
        let temp = TempDir::new().unwrap();
        let storage = create_test_storage(temp.path());

        assert!(matches!(
            storage.pose_images().await,
            Err(BoothError::ResourceUnavailable { .. })
        ));
    }

    #[test]
    fn test_paths() {
        let temp = TempDir::new().unwrap();
        let storage = create_test_storage(temp.path());
        let timestamp = SessionTimestamp::parse("2024-10-14-18-30-00").unwrap();

        assert_eq!(
            storage.screen_path(Screen::Uploading),
            temp.path().join("display_pics").join("uploading.png")
        );
        assert_eq!(
            storage.artifact_path(&timestamp, 3),
            temp.path().join("pics").join("2024-10-14-18-30-00-03.jpg")
        );
    }

    #[test]
    fn test_deletion_safety() {
        let temp = TempDir::new().unwrap();
        let storage = create_test_storage(temp.path());

        assert!(storage
            .validate_deletion_safety(&temp.path().join("pics").join("a.jpg"))
            .is_ok());
        assert!(storage
            .validate_deletion_safety(&temp.path().join("other").join("a.jpg"))
            .is_err());
        assert!(storage
            .validate_deletion_safety(&temp.path().join("pics").join("sub").join("a.jpg"))
            .is_err());
    }
}

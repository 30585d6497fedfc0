use super::{DisplayAdapter, Placement};
use crate::error::DisplayError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCall {
    Show {
        path: PathBuf,
        rotation_degrees: f32,
        placement: Placement,
    },
    Clear,
}

/// Display that records what it was asked to draw
pub struct MockDisplay {
    broken: bool,
    calls: Mutex<Vec<DisplayCall>>,
}

impl MockDisplay {
    pub fn new() -> Self {
        Self {
            broken: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every `show` fails as if the screen were gone
    pub fn broken() -> Self {
        Self {
            broken: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<DisplayCall> {
        self.calls.lock().clone()
    }

    /// Paths passed to `show`, in order
    pub fn shown_paths(&self) -> Vec<PathBuf> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                DisplayCall::Show { path, .. } => Some(path.clone()),
                DisplayCall::Clear => None,
            })
            .collect()
    }
}

impl Default for MockDisplay {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DisplayAdapter for MockDisplay {
    async fn show(
        &self,
        image: &Path,
        rotation_degrees: f32,
        placement: Placement,
    ) -> Result<(), DisplayError> {
        if self.broken {
            return Err(DisplayError::Framebuffer {
                details: "mock display unavailable".to_string(),
            });
        }
        self.calls.lock().push(DisplayCall::Show {
            path: image.to_path_buf(),
            rotation_degrees,
            placement,
        });
        Ok(())
    }

    async fn clear(&self) -> Result<(), DisplayError> {
        self.calls.lock().push(DisplayCall::Clear);
        Ok(())
    }
}

use super::{DisplayAdapter, DisplayConverter, Placement};
use crate::config::DisplayConfig;
use crate::error::DisplayError;
use async_trait::async_trait;
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Linux framebuffer display writing RGB565 frames
pub struct FramebufferDisplay {
    device: PathBuf,
    resolution: (u32, u32),
    framebuffer: Arc<Mutex<File>>,
}

impl FramebufferDisplay {
    pub fn new(config: &DisplayConfig) -> Result<Self, DisplayError> {
        let framebuffer = OpenOptions::new()
            .write(true)
            .open(&config.framebuffer_device)
            .map_err(|e| DisplayError::Framebuffer {
                details: format!("Failed to open {}: {}", config.framebuffer_device, e),
            })?;

        info!(
            "Framebuffer display {} at {}x{}",
            config.framebuffer_device, config.resolution.0, config.resolution.1
        );

        Ok(Self {
            device: PathBuf::from(&config.framebuffer_device),
            resolution: config.resolution,
            framebuffer: Arc::new(Mutex::new(framebuffer)),
        })
    }

    fn write_frame(framebuffer: &Mutex<File>, device: &Path, data: &[u8]) -> Result<(), DisplayError> {
        let mut fb = framebuffer.lock();
        let result = fb
            .seek(SeekFrom::Start(0))
            .and_then(|_| fb.write_all(data));
        result
            .and_then(|_| fb.flush())
            .map_err(|e| DisplayError::Framebuffer {
                details: format!("Failed to write {}: {}", device.display(), e),
            })
    }
}

/// Decode, scale, rotate and letterbox `path` onto a black screen-sized canvas
pub fn render_frame(
    path: &Path,
    rotation_degrees: f32,
    placement: Placement,
    screen: (u32, u32),
) -> Result<RgbImage, DisplayError> {
    let source = image::open(path)
        .map_err(|e| DisplayError::ImageLoad {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?
        .to_rgb8();

    let mut fitted = imageops::resize(
        &source,
        placement.width.max(1),
        placement.height.max(1),
        FilterType::Triangle,
    );

    if rotation_degrees != 0.0 {
        fitted = rotate_about_center(
            &fitted,
            rotation_degrees.to_radians(),
            Interpolation::Bilinear,
            Rgb([0, 0, 0]),
        );
    }

    let mut canvas = RgbImage::new(screen.0, screen.1);
    imageops::overlay(
        &mut canvas,
        &fitted,
        placement.offset_x as i64,
        placement.offset_y as i64,
    );
    Ok(canvas)
}

#[async_trait]
impl DisplayAdapter for FramebufferDisplay {
    async fn show(
        &self,
        image: &Path,
        rotation_degrees: f32,
        placement: Placement,
    ) -> Result<(), DisplayError> {
        let path = image.to_path_buf();
        let device = self.device.clone();
        let screen = self.resolution;
        let framebuffer = Arc::clone(&self.framebuffer);

        debug!(
            "Showing {} at {:?} rotated {:.1} degrees",
            path.display(),
            placement,
            rotation_degrees
        );

        tokio::task::spawn_blocking(move || {
            let frame = render_frame(&path, rotation_degrees, placement, screen)?;
            let data = DisplayConverter::rgb_to_rgb565(&frame);
            Self::write_frame(&framebuffer, &device, &data)
        })
        .await
        .map_err(|e| DisplayError::Framebuffer {
            details: format!("Render task failed: {}", e),
        })?
    }

    async fn clear(&self) -> Result<(), DisplayError> {
        let device = self.device.clone();
        let (width, height) = self.resolution;
        let framebuffer = Arc::clone(&self.framebuffer);

        tokio::task::spawn_blocking(move || {
            Self::write_frame(
                &framebuffer,
                &device,
                &DisplayConverter::blank_rgb565(width, height),
            )
        })
        .await
        .map_err(|e| DisplayError::Framebuffer {
            details: format!("Clear task failed: {}", e),
        })?
    }
}

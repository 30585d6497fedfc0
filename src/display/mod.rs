mod converter;
mod framebuffer;
mod layout;
mod mock;
#[cfg(test)]
mod tests;

pub use converter::DisplayConverter;
pub use framebuffer::{render_frame, FramebufferDisplay};
pub use layout::{letterbox, probe_dimensions, Padding, Placement};
pub use mock::{DisplayCall, MockDisplay};

use crate::error::DisplayError;
use async_trait::async_trait;
use std::path::Path;

/// The booth's screen
#[async_trait]
pub trait DisplayAdapter: Send + Sync {
    /// Show one image at `placement`, rotated by `rotation_degrees` about its centre
    async fn show(
        &self,
        image: &Path,
        rotation_degrees: f32,
        placement: Placement,
    ) -> Result<(), DisplayError>;

    async fn clear(&self) -> Result<(), DisplayError>;
}

/// Letterbox `image` onto a `screen`-sized display and show it
pub async fn show_fitted(
    display: &dyn DisplayAdapter,
    image: &Path,
    rotation_degrees: f32,
    screen: (u32, u32),
) -> Result<(), DisplayError> {
    let placement = letterbox(probe_dimensions(image)?, screen);
    display.show(image, rotation_degrees, placement).await
}

use crate::error::DisplayError;
use std::cmp::Ordering;
use std::path::Path;

/// Which axis receives bars when an image is fitted to the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Padding {
    None,
    Vertical,
    Horizontal,
}

/// Scaled size and top-left offset of an image on the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub width: u32,
    pub height: u32,
    pub offset_x: u32,
    pub offset_y: u32,
    pub padding: Padding,
}

impl Placement {
    pub fn full_screen(screen: (u32, u32)) -> Self {
        Self {
            width: screen.0,
            height: screen.1,
            offset_x: 0,
            offset_y: 0,
            padding: Padding::None,
        }
    }

    pub fn offset(&self) -> (u32, u32) {
        (self.offset_x, self.offset_y)
    }
}

/// Fit `image` (w, h) into `screen` (W, H) preserving aspect ratio.
///
/// The width-filled height `W*h/w` decides the axis: shorter than the screen
/// pads top and bottom, taller switches to the height-filled width `H*w/h`
/// and pads left and right.
pub fn letterbox(image: (u32, u32), screen: (u32, u32)) -> Placement {
    let (width, height) = (image.0 as u64, image.1 as u64);
    let (screen_width, screen_height) = (screen.0 as u64, screen.1 as u64);

    if width == 0 || height == 0 {
        return Placement::full_screen(screen);
    }

    let scaled_height = screen_width * height / width;
    match scaled_height.cmp(&screen_height) {
        Ordering::Less => Placement {
            width: screen.0,
            height: scaled_height as u32,
            offset_x: 0,
            offset_y: ((screen_height - scaled_height) / 2) as u32,
            padding: Padding::Vertical,
        },
        Ordering::Greater => {
            let scaled_width = screen_height * width / height;
            Placement {
                width: scaled_width as u32,
                height: screen.1,
                offset_x: ((screen_width - scaled_width) / 2) as u32,
                offset_y: 0,
                padding: Padding::Horizontal,
            }
        }
        Ordering::Equal => Placement::full_screen(screen),
    }
}

/// Read an image's dimensions from its header
pub fn probe_dimensions(path: &Path) -> Result<(u32, u32), DisplayError> {
    image::image_dimensions(path).map_err(|e| DisplayError::ImageLoad {
        path: path.to_path_buf(),
        details: e.to_string(),
    })
}

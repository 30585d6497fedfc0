use image::RgbImage;

/// Framebuffer pixel format conversion
pub struct DisplayConverter;

impl DisplayConverter {
    /// Pack an RGB image into little-endian RGB565
    pub fn rgb_to_rgb565(image: &RgbImage) -> Vec<u8> {
        let mut rgb565_data = Vec::with_capacity((image.width() * image.height() * 2) as usize);

        for pixel in image.pixels() {
            let r = pixel[0] >> 3;
            let g = pixel[1] >> 2;
            let b = pixel[2] >> 3;

            let rgb565 = ((r as u16) << 11) | ((g as u16) << 5) | (b as u16);

            rgb565_data.push((rgb565 & 0xFF) as u8);
            rgb565_data.push((rgb565 >> 8) as u8);
        }

        rgb565_data
    }

    /// A black RGB565 frame
    pub fn blank_rgb565(width: u32, height: u32) -> Vec<u8> {
        vec![0; (width * height * 2) as usize]
    }
}

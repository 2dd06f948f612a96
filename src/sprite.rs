use anyhow::{Context, Result};
use image::{imageops::FilterType, RgbaImage};

use crate::draw;

/// The decorative cursor image. Loaded once at startup; the tracking
/// overlay references it unconditionally, so a missing file is fatal
/// before any window appears.
#[derive(Debug)]
pub struct CursorSprite {
    image: RgbaImage,
}

impl CursorSprite {
    pub fn load(path: &str) -> Result<Self> {
        let image = image::open(path)
            .with_context(|| format!("Failed to load cursor image '{}'", path))?
            .to_rgba8();
        Ok(Self { image })
    }

    #[allow(dead_code)]
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Pre-scale to a square of the given side so the per-frame blit is a
    /// plain copy.
    pub fn scaled(&self, side: u32) -> Self {
        Self {
            image: image::imageops::resize(&self.image, side, side, FilterType::Triangle),
        }
    }

    pub fn side(&self) -> u32 {
        self.image.width()
    }

    /// Blend the sprite centered on (cx, cy).
    pub fn blit_centered(&self, buffer: &mut [u8], width: usize, height: usize, cx: f32, cy: f32) {
        let (w, h) = self.image.dimensions();
        let x0 = cx.round() as i32 - w as i32 / 2;
        let y0 = cy.round() as i32 - h as i32 / 2;
        draw::blit_rgba(buffer, width, height, &self.image, x0, y0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(side: u32) -> CursorSprite {
        CursorSprite::from_image(RgbaImage::from_pixel(side, side, Rgba([255, 0, 0, 255])))
    }

    #[test]
    fn test_scaled_is_square_double_cursor_size() {
        let cursor_size = 60;
        let sprite = solid(32).scaled(cursor_size * 2);
        assert_eq!(sprite.side(), 120);
        assert_eq!(sprite.image.width(), sprite.image.height());
    }

    #[test]
    fn test_blit_centered() {
        let mut canvas = vec![0u8; 8 * 8 * 3];
        let sprite = solid(2);
        sprite.blit_centered(&mut canvas, 8, 8, 4.0, 4.0);
        // Sprite covers (3..5, 3..5); center painted, outside untouched
        assert_eq!(canvas[(3 * 8 + 3) * 3], 255);
        assert_eq!(canvas[(4 * 8 + 4) * 3], 255);
        assert_eq!(canvas[(2 * 8 + 2) * 3], 0);
        assert_eq!(canvas[(5 * 8 + 5) * 3], 0);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let err = CursorSprite::load("does/not/exist.png").unwrap_err();
        assert!(err.to_string().contains("does/not/exist.png"));
    }
}

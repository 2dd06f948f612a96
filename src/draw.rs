//! RGB8 canvas primitives. The canvas is a packed `width * height * 3`
//! byte buffer owned by the render loop.

use image::{RgbImage, RgbaImage};

pub fn fill(buffer: &mut [u8], gray: u8) {
    buffer.fill(gray);
}

/// Copy an RGB image onto the canvas at (x0, y0), clipping at the edges.
/// Negative origins crop the source, which is how the fit-height video
/// blit crops a frame wider than the window.
pub fn blit_rgb(buffer: &mut [u8], width: usize, height: usize, img: &RgbImage, x0: i32, y0: i32) {
    for (sx, sy, pixel) in img.enumerate_pixels() {
        let px = x0 + sx as i32;
        let py = y0 + sy as i32;
        if px < 0 || py < 0 || px >= width as i32 || py >= height as i32 {
            continue;
        }
        let idx = (py as usize * width + px as usize) * 3;
        buffer[idx] = pixel[0];
        buffer[idx + 1] = pixel[1];
        buffer[idx + 2] = pixel[2];
    }
}

/// Alpha-blend an RGBA image onto the canvas at (x0, y0).
pub fn blit_rgba(buffer: &mut [u8], width: usize, height: usize, img: &RgbaImage, x0: i32, y0: i32) {
    for (sx, sy, pixel) in img.enumerate_pixels() {
        let a = pixel[3] as u32;
        if a == 0 {
            continue;
        }
        let px = x0 + sx as i32;
        let py = y0 + sy as i32;
        if px < 0 || py < 0 || px >= width as i32 || py >= height as i32 {
            continue;
        }
        let idx = (py as usize * width + px as usize) * 3;
        for c in 0..3 {
            let src = pixel[c] as u32;
            let dst = buffer[idx + c] as u32;
            buffer[idx + c] = ((src * a + dst * (255 - a)) / 255) as u8;
        }
    }
}

/// Translucent filled disc, used for the diagnostic keypoint markers.
pub fn fill_disc(
    buffer: &mut [u8],
    width: usize,
    height: usize,
    cx: f32,
    cy: f32,
    radius: f32,
    color: (u8, u8, u8),
    alpha: u8,
) {
    let r = radius.ceil() as i32;
    let cxi = cx.round() as i32;
    let cyi = cy.round() as i32;
    let r2 = radius * radius;
    let a = alpha as u32;

    for dy in -r..=r {
        for dx in -r..=r {
            if (dx * dx + dy * dy) as f32 > r2 {
                continue;
            }
            let px = cxi + dx;
            let py = cyi + dy;
            if px < 0 || py < 0 || px >= width as i32 || py >= height as i32 {
                continue;
            }
            let idx = (py as usize * width + px as usize) * 3;
            let rgb = [color.0, color.1, color.2];
            for c in 0..3 {
                let dst = buffer[idx + c] as u32;
                buffer[idx + c] = ((rgb[c] as u32 * a + dst * (255 - a)) / 255) as u8;
            }
        }
    }
}

pub fn parse_hex(hex: &str) -> (u8, u8, u8) {
    if hex.len() == 7 && hex.starts_with('#') {
        let r = u8::from_str_radix(&hex[1..3], 16).unwrap_or(255);
        let g = u8::from_str_radix(&hex[3..5], 16).unwrap_or(0);
        let b = u8::from_str_radix(&hex[5..7], 16).unwrap_or(0);
        (r, g, b)
    } else {
        (255, 0, 0) // Default Red
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#FF0000"), (255, 0, 0));
        assert_eq!(parse_hex("#00FF00"), (0, 255, 0));
        assert_eq!(parse_hex("#0000FF"), (0, 0, 255));
        assert_eq!(parse_hex("#FFFFFF"), (255, 255, 255));
        assert_eq!(parse_hex("invalid"), (255, 0, 0)); // Fallback
    }

    #[test]
    fn test_blit_rgb_clips_negative_origin() {
        let mut canvas = vec![0u8; 4 * 4 * 3];
        let img = RgbImage::from_pixel(2, 2, image::Rgb([255, 0, 0]));
        blit_rgb(&mut canvas, 4, 4, &img, -1, -1);
        // Only (0,0) of the canvas receives a pixel
        assert_eq!(&canvas[0..3], &[255, 0, 0]);
        assert_eq!(&canvas[3..6], &[0, 0, 0]);
    }

    #[test]
    fn test_blit_rgba_blends() {
        let mut canvas = vec![0u8; 3];
        let img = RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 128]));
        blit_rgba(&mut canvas, 1, 1, &img, 0, 0);
        assert_eq!(canvas[0], 128);
    }

    #[test]
    fn test_blit_rgba_skips_transparent() {
        let mut canvas = vec![7u8; 3];
        let img = RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 0]));
        blit_rgba(&mut canvas, 1, 1, &img, 0, 0);
        assert_eq!(canvas, vec![7, 7, 7]);
    }

    #[test]
    fn test_disc_stays_within_radius() {
        let mut canvas = vec![0u8; 9 * 9 * 3];
        fill_disc(&mut canvas, 9, 9, 4.0, 4.0, 2.0, (255, 255, 255), 255);
        // Center painted, far corner untouched
        assert_ne!(canvas[(4 * 9 + 4) * 3], 0);
        assert_eq!(canvas[0], 0);
    }
}

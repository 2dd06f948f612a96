use crate::camera::ViewTransform;
use crate::draw;
use crate::sprite::CursorSprite;
use crate::types::{Face, MappedPoint};

const MARKER_ALPHA: u8 = 100;

/// Resolve the canvas-space cursor for the tracked landmark. Empty faces
/// and out-of-range indices resolve to nothing; the caller skips the
/// overlay for that frame.
pub fn cursor_position(face: &Face, tracked_index: usize, view: &ViewTransform) -> Option<MappedPoint> {
    let kp = face.keypoints.get(tracked_index)?;
    Some(view.map_keypoint(kp))
}

pub struct OverlayStyle {
    pub keypoint_radius: f32,
    pub marker_color: (u8, u8, u8),
}

/// Draw the tracking overlay: the sprite centered on the tracked
/// landmark and, when enabled, a translucent marker on every landmark.
/// Returns the cursor position so the caller can place the coordinate
/// caption; None means nothing was drawn.
pub fn draw_tracking(
    buffer: &mut [u8],
    width: usize,
    height: usize,
    face: &Face,
    tracked_index: usize,
    show_all_keypoints: bool,
    view: &ViewTransform,
    sprite: &CursorSprite,
    style: &OverlayStyle,
) -> Option<MappedPoint> {
    let cursor = cursor_position(face, tracked_index, view)?;

    sprite.blit_centered(buffer, width, height, cursor.x, cursor.y);

    if show_all_keypoints {
        for point in view.map_keypoints(&face.keypoints) {
            draw::fill_disc(
                buffer,
                width,
                height,
                point.x,
                point.y,
                style.keypoint_radius,
                style.marker_color,
                MARKER_ALPHA,
            );
        }
    }

    Some(cursor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Keypoint;
    use image::{Rgba, RgbaImage};

    fn identity_view() -> ViewTransform {
        ViewTransform::fit_height(640.0, 480.0, 640.0, 480.0, false)
    }

    fn face_with_nose_at(x: f32, y: f32) -> Face {
        let mut keypoints = vec![Keypoint::default(); 468];
        keypoints[1] = Keypoint { x, y, z: 0.0 };
        Face { keypoints }
    }

    fn test_sprite() -> CursorSprite {
        CursorSprite::from_image(RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255])))
    }

    #[test]
    fn test_cursor_matches_mapping() {
        let view = identity_view();
        let face = face_with_nose_at(320.0, 240.0);
        let cursor = cursor_position(&face, 1, &view).unwrap();
        assert_eq!(cursor, view.map_keypoint(&face.keypoints[1]));
        assert_eq!(cursor, MappedPoint { x: 320.0, y: 240.0 });
    }

    #[test]
    fn test_empty_face_resolves_to_nothing() {
        let view = identity_view();
        let face = Face::default();
        assert!(cursor_position(&face, 1, &view).is_none());
    }

    #[test]
    fn test_out_of_range_index_resolves_to_nothing() {
        let view = identity_view();
        let face = face_with_nose_at(320.0, 240.0);
        assert!(cursor_position(&face, 9999, &view).is_none());
    }

    #[test]
    fn test_out_of_range_index_draws_nothing() {
        let view = identity_view();
        let face = face_with_nose_at(320.0, 240.0);
        let style = OverlayStyle {
            keypoint_radius: 3.0,
            marker_color: (0, 255, 0),
        };
        let mut canvas = vec![0u8; 640 * 480 * 3];
        let result = draw_tracking(
            &mut canvas, 640, 480, &face, 9999, true, &view, &test_sprite(), &style,
        );
        assert!(result.is_none());
        // Markers are skipped too when the tracked index is unresolvable
        assert!(canvas.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_tracking_draws_sprite_at_cursor() {
        let view = identity_view();
        let face = face_with_nose_at(320.0, 240.0);
        let style = OverlayStyle {
            keypoint_radius: 3.0,
            marker_color: (0, 255, 0),
        };
        let mut canvas = vec![0u8; 640 * 480 * 3];
        let cursor = draw_tracking(
            &mut canvas, 640, 480, &face, 1, false, &view, &test_sprite(), &style,
        )
        .unwrap();
        assert_eq!(cursor, MappedPoint { x: 320.0, y: 240.0 });
        // Sprite pixel lands at the cursor
        assert_eq!(canvas[(240 * 640 + 320) * 3], 255);
    }

    #[test]
    fn test_markers_drawn_when_enabled() {
        let view = identity_view();
        let mut face = face_with_nose_at(320.0, 240.0);
        face.keypoints[0] = Keypoint { x: 100.0, y: 100.0, z: 0.0 };
        let style = OverlayStyle {
            keypoint_radius: 3.0,
            marker_color: (0, 255, 0),
        };
        let mut canvas = vec![0u8; 640 * 480 * 3];
        draw_tracking(
            &mut canvas, 640, 480, &face, 1, true, &view, &test_sprite(), &style,
        );
        // Green marker blended at keypoint 0
        assert_ne!(canvas[(100 * 640 + 100) * 3 + 1], 0);
    }
}

/// Friendly names for commonly tracked mesh indices. Anything outside
/// the table falls back to the raw index.
pub fn keypoint_name(index: usize) -> String {
    match index {
        1 => "Nose Tip".to_string(),
        10 => "Top of Face".to_string(),
        13 => "Lips".to_string(),
        152 => "Chin".to_string(),
        234 => "Left Eye".to_string(),
        454 => "Right Eye".to_string(),
        other => format!("Keypoint {}", other),
    }
}

/// Status line shown at the top of the canvas, in priority order:
/// waiting for the camera, waiting for a face, tracking.
pub fn status_line(camera_ready: bool, face_count: usize, tracked_index: usize) -> String {
    if !camera_ready {
        "Starting camera...".to_string()
    } else if face_count == 0 {
        "Show your face to start tracking".to_string()
    } else {
        format!("Tracking: {}", keypoint_name(tracked_index))
    }
}

pub fn toggle_line(label: &str, on: bool) -> String {
    format!("{}: {}", label, if on { "ON" } else { "OFF" })
}

pub fn camera_line(active: bool, mirrored: bool) -> String {
    format!("Camera: {} (mirrored: {})", active, mirrored)
}

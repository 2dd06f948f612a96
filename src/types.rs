/// A single face-mesh landmark in model space (camera pixel coordinates).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    #[allow(dead_code)]
    pub z: f32,
}

/// One detected face: the full landmark set emitted by the mesh pipeline.
/// Replaced wholesale on every detector emission, never merged.
#[derive(Debug, Clone, Default)]
pub struct Face {
    pub keypoints: Vec<Keypoint>,
}

/// A keypoint mapped into canvas (window) space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappedPoint {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }
}

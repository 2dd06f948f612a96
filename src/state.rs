use crate::config::Defaults;
use crate::types::Face;

/// Application flags plus the latest detection batch. Everything here is
/// owned by the render thread: the input handler flips flags between
/// frames and the detector drain replaces `faces` wholesale, so no
/// synchronization is needed.
#[derive(Debug, Clone)]
pub struct AppState {
    pub show_video: bool,
    pub show_all_keypoints: bool,
    pub tracked_index: usize,
    pub faces: Vec<Face>,
}

impl AppState {
    pub fn new(defaults: &Defaults) -> Self {
        Self {
            show_video: defaults.show_video,
            show_all_keypoints: defaults.show_all_keypoints,
            tracked_index: defaults.tracked_index,
            faces: Vec::new(),
        }
    }

    /// Primary-pointer action: flip raw-video visibility.
    pub fn toggle_video(&mut self) {
        self.show_video = !self.show_video;
    }

    /// Single-assignment replacement of the detection batch. Empty
    /// batches are stored as-is; no face means no overlay next frame.
    pub fn set_faces(&mut self, faces: Vec<Face>) {
        self.faces = faces;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Keypoint;

    fn state() -> AppState {
        AppState::new(&Defaults::default())
    }

    #[test]
    fn test_toggle_video_inverts() {
        let mut s = state();
        let before = s.show_video;
        s.toggle_video();
        assert_eq!(s.show_video, !before);
    }

    #[test]
    fn test_double_toggle_restores() {
        let mut s = state();
        let before = s.show_video;
        s.toggle_video();
        s.toggle_video();
        assert_eq!(s.show_video, before);
    }

    #[test]
    fn test_set_faces_replaces_wholesale() {
        let mut s = state();
        s.set_faces(vec![Face {
            keypoints: vec![Keypoint::default(); 468],
        }]);
        assert_eq!(s.faces.len(), 1);

        s.set_faces(Vec::new());
        assert!(s.faces.is_empty());
    }
}

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use anyhow::{anyhow, Context, Result};
use colored::*;
use image::{ImageBuffer, Rgb};
use nokhwa::{
    pixel_format::RgbFormat,
    utils::{CameraIndex, RequestedFormat, RequestedFormatType},
    Camera,
};

use crate::types::{Keypoint, MappedPoint};

pub type Frame = ImageBuffer<Rgb<u8>, Vec<u8>>;

enum CameraEvent {
    Ready { width: u32, height: u32 },
    Frame(Frame),
}

/// Live camera feed running on its own thread. The render loop polls for
/// events each frame; until the device opens the feed reports not ready
/// and the HUD stays in its waiting state. A failed open leaves the feed
/// permanently not ready, which is the accepted degraded behavior.
pub struct CameraFeed {
    rx: Receiver<CameraEvent>,
    ready: bool,
    width: u32,
    height: u32,
    latest: Option<Frame>,
    pub mirror: bool,
}

impl CameraFeed {
    pub fn start(index: usize, mirror: bool) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            if let Err(e) = capture_loop(index, tx) {
                log::error!("Camera worker stopped: {:#}", e);
            }
        });
        Self {
            rx,
            ready: false,
            width: 0,
            height: 0,
            latest: None,
            mirror,
        }
    }

    /// Drain pending events, keeping only the newest frame.
    pub fn poll(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            match event {
                CameraEvent::Ready { width, height } => {
                    self.width = width;
                    self.height = height;
                    self.ready = true;
                }
                CameraEvent::Frame(frame) => self.latest = Some(frame),
            }
        }
    }

    pub fn ready(&self) -> bool {
        self.ready
    }

    pub fn latest_frame(&self) -> Option<&Frame> {
        self.latest.as_ref()
    }

    pub fn view_transform(&self, canvas_w: usize, canvas_h: usize) -> Option<ViewTransform> {
        if !self.ready || self.width == 0 || self.height == 0 {
            return None;
        }
        Some(ViewTransform::fit_height(
            self.width as f32,
            self.height as f32,
            canvas_w as f32,
            canvas_h as f32,
            self.mirror,
        ))
    }
}

fn capture_loop(index: usize, tx: Sender<CameraEvent>) -> Result<()> {
    let cam_index = CameraIndex::Index(index as u32);
    let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
    let mut camera = Camera::new(cam_index, requested).context("Failed to create camera instance")?;

    camera
        .open_stream()
        .map_err(|e| anyhow!(e))
        .context("Failed to open camera stream")?;

    println!("{}", format!("Opened camera: {}", camera.info().human_name()).green());
    log::info!("Camera format: {}", camera.camera_format());

    let resolution = camera.resolution();
    tx.send(CameraEvent::Ready {
        width: resolution.width(),
        height: resolution.height(),
    })?;

    loop {
        let frame = camera
            .frame()
            .map_err(|e| anyhow!(e))
            .context("Failed to get frame")?;
        let decoded = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| anyhow!(e))
            .context("Failed to decode frame")?;
        if tx.send(CameraEvent::Frame(decoded)).is_err() {
            // Window closed, receiver gone
            return Ok(());
        }
    }
}

/// Maps model-space keypoints (camera pixel coordinates) onto the canvas.
/// Fit-height: the frame is scaled so its height fills the canvas and it
/// is centered horizontally, cropping or letterboxing the sides. When the
/// feed mirrors, x flips across the canvas midline so the overlay lines
/// up with the selfie view.
#[derive(Debug, Clone, Copy)]
pub struct ViewTransform {
    pub scale: f32,
    pub offset_x: f32,
    pub canvas_w: f32,
    pub mirror: bool,
}

impl ViewTransform {
    pub fn fit_height(frame_w: f32, frame_h: f32, canvas_w: f32, canvas_h: f32, mirror: bool) -> Self {
        let scale = canvas_h / frame_h;
        let offset_x = (canvas_w - frame_w * scale) / 2.0;
        Self {
            scale,
            offset_x,
            canvas_w,
            mirror,
        }
    }

    pub fn map_keypoint(&self, kp: &Keypoint) -> MappedPoint {
        let x = self.offset_x + kp.x * self.scale;
        let x = if self.mirror { self.canvas_w - x } else { x };
        MappedPoint {
            x,
            y: kp.y * self.scale,
        }
    }

    pub fn map_keypoints(&self, keypoints: &[Keypoint]) -> Vec<MappedPoint> {
        keypoints.iter().map(|kp| self.map_keypoint(kp)).collect()
    }

    /// Width of the scaled frame on the canvas.
    pub fn dest_width(&self, frame_w: f32) -> f32 {
        frame_w * self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kp(x: f32, y: f32) -> Keypoint {
        Keypoint { x, y, z: 0.0 }
    }

    #[test]
    fn test_identity_mapping() {
        // Same-size frame and canvas, no mirror: coordinates pass through
        let vt = ViewTransform::fit_height(640.0, 480.0, 640.0, 480.0, false);
        assert_eq!(vt.map_keypoint(&kp(320.0, 240.0)), MappedPoint { x: 320.0, y: 240.0 });
        assert_eq!(vt.map_keypoint(&kp(0.0, 0.0)), MappedPoint { x: 0.0, y: 0.0 });
    }

    #[test]
    fn test_fit_height_scales_and_centers() {
        // 640x480 frame into 1280x720: scale 1.5, 960 wide, 160px margins
        let vt = ViewTransform::fit_height(640.0, 480.0, 1280.0, 720.0, false);
        assert_eq!(vt.scale, 1.5);
        assert_eq!(vt.offset_x, 160.0);
        assert_eq!(vt.dest_width(640.0), 960.0);
        let p = vt.map_keypoint(&kp(320.0, 240.0));
        assert_eq!(p, MappedPoint { x: 640.0, y: 360.0 });
    }

    #[test]
    fn test_mirror_flips_x_only() {
        let vt = ViewTransform::fit_height(640.0, 480.0, 640.0, 480.0, true);
        let p = vt.map_keypoint(&kp(100.0, 200.0));
        assert_eq!(p, MappedPoint { x: 540.0, y: 200.0 });
        // Midline is a fixed point under mirroring
        let mid = vt.map_keypoint(&kp(320.0, 0.0));
        assert_eq!(mid.x, 320.0);
    }

    #[test]
    fn test_map_keypoints_preserves_order_and_length() {
        let vt = ViewTransform::fit_height(640.0, 480.0, 1280.0, 720.0, false);
        let points = vec![kp(0.0, 0.0), kp(640.0, 480.0), kp(320.0, 240.0)];
        let mapped = vt.map_keypoints(&points);
        assert_eq!(mapped.len(), 3);
        assert_eq!(mapped[0], vt.map_keypoint(&points[0]));
        assert_eq!(mapped[2], vt.map_keypoint(&points[2]));
    }
}

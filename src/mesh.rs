use std::path::Path;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread;

use anyhow::Result;
use image::imageops::FilterType;
use ort::session::Session;

use crate::camera::Frame;
use crate::detector::{build_session, FaceDetector};
use crate::types::{Face, Keypoint, Rect};

const DETECTION_MODEL: &str = "models/face_detection.onnx";
const MESH_MODEL: &str = "models/face_mesh.onnx";
const MESH_MODEL_REFINED: &str = "models/face_mesh_refined.onnx";

const MESH_INPUT: u32 = 192;
const MESH_POINTS: usize = 468;

/// Execution provider selection for the ONNX sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Runtime {
    /// CoreML where available, CPU otherwise.
    Auto,
    Cpu,
}

/// Fixed detector configuration. These mirror the model contract and are
/// not negotiable at runtime.
#[derive(Debug, Clone, Copy)]
pub struct MeshConfig {
    pub max_faces: usize,
    pub refine_landmarks: bool,
    pub runtime: Runtime,
    pub flip_horizontal: bool,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            max_faces: 1,
            refine_landmarks: false,
            runtime: Runtime::Auto,
            flip_horizontal: false,
        }
    }
}

impl MeshConfig {
    fn mesh_model_path(&self) -> &'static str {
        if self.refine_landmarks {
            MESH_MODEL_REFINED
        } else {
            MESH_MODEL
        }
    }
}

/// Face detector + 468-point mesh. When the model files are absent the
/// pipeline degrades to a synthetic landmark ring so the rest of the app
/// stays exercisable.
pub struct FaceMeshPipeline {
    config: MeshConfig,
    mesh_session: Option<Session>,
    detector: Option<FaceDetector>,
    start_time: std::time::Instant,
}

impl FaceMeshPipeline {
    pub fn new(config: MeshConfig) -> Result<Self> {
        let detector = if Path::new(DETECTION_MODEL).exists() {
            log::info!("Loading face detector from {}", DETECTION_MODEL);
            Some(FaceDetector::new(DETECTION_MODEL, config.runtime)?)
        } else {
            log::warn!("Face detector model not found. Mesh will use the full frame.");
            None
        };

        let mesh_path = config.mesh_model_path();
        let mesh_session = if Path::new(mesh_path).exists() {
            log::info!("Loading face mesh from {}", mesh_path);
            Some(build_session(mesh_path, config.runtime)?)
        } else {
            log::warn!("Face mesh model not found. Running synthetic landmarks.");
            None
        };

        Ok(Self {
            config,
            mesh_session,
            detector,
            start_time: std::time::Instant::now(),
        })
    }

    /// Run one frame through the pipeline. Returns at most
    /// `config.max_faces` faces; an empty vec means no face found.
    pub fn process(&mut self, frame: &Frame) -> Result<Vec<Face>> {
        let roi: Option<Rect> = if let Some(det) = &mut self.detector {
            det.detect(frame)?
        } else {
            None
        };

        // Crop to the detected face (padded), fall back to the full frame
        // when no detector is loaded, or report no face when the detector
        // ran and found nothing.
        let (crop, offset_x, offset_y, scale_x, scale_y) = if let Some(rect) = roi {
            let pad_w = rect.width * 0.25;
            let pad_h = rect.height * 0.25;
            let mut x = rect.x - pad_w / 2.0;
            let mut y = rect.y - pad_h / 2.0;
            let mut w = rect.width + pad_w;
            let mut h = rect.height + pad_h;

            if x < 0.0 {
                x = 0.0;
            }
            if y < 0.0 {
                y = 0.0;
            }
            if x + w > frame.width() as f32 {
                w = frame.width() as f32 - x;
            }
            if y + h > frame.height() as f32 {
                h = frame.height() as f32 - y;
            }

            let crop = image::imageops::crop_imm(frame, x as u32, y as u32, w as u32, h as u32)
                .to_image();
            (crop, x, y, w / MESH_INPUT as f32, h / MESH_INPUT as f32)
        } else if self.detector.is_some() {
            return Ok(Vec::new());
        } else {
            (
                frame.clone(),
                0.0,
                0.0,
                frame.width() as f32 / MESH_INPUT as f32,
                frame.height() as f32 / MESH_INPUT as f32,
            )
        };

        let keypoints = if let Some(session) = &mut self.mesh_session {
            let resized = image::imageops::resize(&crop, MESH_INPUT, MESH_INPUT, FilterType::Triangle);

            // NHWC, normalized to [-1, 1]
            let mut input_data = Vec::with_capacity((MESH_INPUT * MESH_INPUT * 3) as usize);
            for pixel in resized.pixels() {
                for c in 0..3 {
                    input_data.push((pixel[c] as f32 / 127.5) - 1.0);
                }
            }

            let shape = vec![1, MESH_INPUT as usize, MESH_INPUT as usize, 3];
            let input = ort::value::Tensor::from_array((shape, input_data))?;
            let outputs = session.run(ort::inputs![input])?;
            let (_shape, data) = outputs[0].try_extract_tensor::<f32>()?;

            if data.len() < MESH_POINTS * 3 {
                return Ok(Vec::new());
            }

            let mut points = Vec::with_capacity(MESH_POINTS);
            for i in 0..MESH_POINTS {
                // Mesh local (0..192) -> crop -> full frame
                points.push(Keypoint {
                    x: offset_x + data[i * 3] * scale_x,
                    y: offset_y + data[i * 3 + 1] * scale_y,
                    z: data[i * 3 + 2],
                });
            }
            points
        } else {
            self.synthetic_keypoints(frame.width() as f32, frame.height() as f32)
        };

        let mut face = Face { keypoints };
        if self.config.flip_horizontal {
            let w = frame.width() as f32;
            for kp in &mut face.keypoints {
                kp.x = w - kp.x;
            }
        }

        let mut faces = vec![face];
        faces.truncate(self.config.max_faces);
        Ok(faces)
    }

    fn synthetic_keypoints(&self, w: f32, h: f32) -> Vec<Keypoint> {
        let cx = w / 2.0;
        let cy = h / 2.0;
        let t = self.start_time.elapsed().as_secs_f32();
        let radius = 100.0 + (t * 2.0).sin() * 20.0;

        (0..MESH_POINTS)
            .map(|i| {
                let angle = (i as f32 / MESH_POINTS as f32) * std::f32::consts::PI * 2.0 + t;
                Keypoint {
                    x: cx + angle.cos() * radius,
                    y: cy + angle.sin() * radius,
                    z: 0.0,
                }
            })
            .collect()
    }
}

/// Continuous detection on a worker thread: the render loop offers the
/// newest camera frame, the worker drains to the latest and emits result
/// batches. Only the most recent batch matters, so the frame channel is
/// bounded at one and offers are dropped while inference is busy.
pub struct MeshWorker {
    tx_frame: SyncSender<Frame>,
    rx_results: Receiver<Vec<Face>>,
}

impl MeshWorker {
    pub fn start(config: MeshConfig) -> Result<Self> {
        let mut pipeline = FaceMeshPipeline::new(config)?;
        let (tx_frame, rx_frame) = mpsc::sync_channel::<Frame>(1);
        let (tx_results, rx_results) = mpsc::channel();

        thread::spawn(move || {
            while let Ok(first) = rx_frame.recv() {
                // Skip to the newest pending frame
                let mut frame = first;
                while let Ok(newer) = rx_frame.try_recv() {
                    frame = newer;
                }

                match pipeline.process(&frame) {
                    Ok(faces) => {
                        if tx_results.send(faces).is_err() {
                            return;
                        }
                    }
                    Err(e) => log::warn!("Mesh inference failed: {:#}", e),
                }
            }
        });

        Ok(Self { tx_frame, rx_results })
    }

    /// Offer the newest camera frame. Dropped when the worker is busy.
    pub fn offer(&self, frame: Frame) {
        let _ = self.tx_frame.try_send(frame);
    }

    /// Newest result batch since the last call, if any. Empty batches are
    /// delivered too, so a face leaving the frame clears the overlay.
    pub fn poll(&self) -> Option<Vec<Face>> {
        let mut latest = None;
        while let Ok(faces) = self.rx_results.try_recv() {
            latest = Some(faces);
        }
        latest
    }
}

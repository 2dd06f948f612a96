use crate::mesh::Runtime;
use crate::types::Rect;
use anyhow::Result;
use image::{imageops::FilterType, ImageBuffer, Rgb};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;

const INPUT_W: u32 = 320;
const INPUT_H: u32 = 240;
const SCORE_THRESHOLD: f32 = 0.7;

// UltraFace box decoding variances
const CENTER_VARIANCE: f32 = 0.1;
const SIZE_VARIANCE: f32 = 0.2;

pub fn build_session(path: &str, runtime: Runtime) -> Result<Session> {
    let providers = match runtime {
        Runtime::Cpu => vec![ort::execution_providers::CPUExecutionProvider::default().build()],
        Runtime::Auto => vec![
            ort::execution_providers::CoreMLExecutionProvider::default().build(),
            ort::execution_providers::CPUExecutionProvider::default().build(),
        ],
    };
    let session = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(4)?
        .with_execution_providers(providers)?
        .commit_from_file(path)?;
    Ok(session)
}

/// UltraFace single-face detector. Finds the highest-scoring face box so
/// the mesh pipeline can crop to it.
pub struct FaceDetector {
    session: Session,
    anchors: Vec<(f32, f32, f32, f32)>, // cx, cy, w, h (normalized)
}

impl FaceDetector {
    pub fn new(model_path: &str, runtime: Runtime) -> Result<Self> {
        let session = build_session(model_path, runtime)?;
        let anchors = generate_anchors(INPUT_W as usize, INPUT_H as usize);
        Ok(Self { session, anchors })
    }

    pub fn detect(&mut self, frame: &ImageBuffer<Rgb<u8>, Vec<u8>>) -> Result<Option<Rect>> {
        let resized = image::imageops::resize(frame, INPUT_W, INPUT_H, FilterType::Triangle);

        // HWC -> NCHW, normalized (p - 127) / 128
        let plane = (INPUT_W * INPUT_H) as usize;
        let mut input_data = vec![0f32; 3 * plane];
        for (i, pixel) in resized.pixels().enumerate() {
            for c in 0..3 {
                input_data[c * plane + i] = (pixel[c] as f32 - 127.0) / 128.0;
            }
        }

        let input_tensor = Tensor::from_array((
            vec![1, 3, INPUT_H as usize, INPUT_W as usize],
            input_data,
        ))?;
        let outputs = self.session.run(ort::inputs![input_tensor])?;

        let (_scores_shape, scores_data) = outputs["scores"].try_extract_tensor::<f32>()?;
        let (_boxes_shape, boxes_data) = outputs["boxes"].try_extract_tensor::<f32>()?;

        let best = decode_best_box(&self.anchors, scores_data, boxes_data, SCORE_THRESHOLD);

        Ok(best.map(|rect| {
            // Scale from detector input space back to the full frame
            let sx = frame.width() as f32 / INPUT_W as f32;
            let sy = frame.height() as f32 / INPUT_H as f32;
            Rect::new(rect.x * sx, rect.y * sy, rect.width * sx, rect.height * sy)
        }))
    }
}

fn decode_best_box(
    anchors: &[(f32, f32, f32, f32)],
    scores: &[f32],
    boxes: &[f32],
    threshold: f32,
) -> Option<Rect> {
    let mut best_score = 0.0;
    let mut best_rect = None;

    for (i, &(ax, ay, aw, ah)) in anchors.iter().enumerate() {
        let score = scores[i * 2 + 1];
        if score <= threshold || score <= best_score {
            continue;
        }

        let cx = boxes[i * 4] * CENTER_VARIANCE * aw + ax;
        let cy = boxes[i * 4 + 1] * CENTER_VARIANCE * ah + ay;
        let w = (boxes[i * 4 + 2] * SIZE_VARIANCE).exp() * aw;
        let h = (boxes[i * 4 + 3] * SIZE_VARIANCE).exp() * ah;

        best_score = score;
        best_rect = Some(Rect::new(
            (cx - w / 2.0) * INPUT_W as f32,
            (cy - h / 2.0) * INPUT_H as f32,
            w * INPUT_W as f32,
            h * INPUT_H as f32,
        ));
    }

    best_rect
}

fn generate_anchors(width: usize, height: usize) -> Vec<(f32, f32, f32, f32)> {
    // UltraFace anchor configuration
    let shrinkage_list = [8, 16, 32, 64];
    let min_boxes = [
        vec![10.0, 16.0, 24.0],
        vec![32.0, 48.0],
        vec![64.0, 96.0],
        vec![128.0, 192.0, 256.0],
    ];

    let w = width as f32;
    let h = height as f32;
    let mut anchors = Vec::new();

    for (i, &shrinkage) in shrinkage_list.iter().enumerate() {
        let feature_h = (h / shrinkage as f32).ceil() as usize;
        let feature_w = (w / shrinkage as f32).ceil() as usize;

        for v in 0..feature_h {
            for u in 0..feature_w {
                let cx = (u as f32 * shrinkage as f32 + shrinkage as f32 / 2.0) / w;
                let cy = (v as f32 * shrinkage as f32 + shrinkage as f32 / 2.0) / h;

                for &min_box in &min_boxes[i] {
                    anchors.push((cx, cy, min_box / w, min_box / h));
                }
            }
        }
    }
    anchors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_count_matches_ultraface_320() {
        // 40x30x3 + 20x15x2 + 10x8x2 + 5x4x3
        let anchors = generate_anchors(320, 240);
        assert_eq!(anchors.len(), 4420);
    }

    #[test]
    fn test_anchors_are_normalized() {
        let anchors = generate_anchors(320, 240);
        for &(cx, cy, _, _) in &anchors {
            assert!((0.0..=1.0).contains(&cx));
            assert!((0.0..=1.0).contains(&cy));
        }
    }

    #[test]
    fn test_decode_rejects_below_threshold() {
        let anchors = vec![(0.5, 0.5, 0.1, 0.1)];
        let scores = vec![0.8, 0.2]; // background, face
        let boxes = vec![0.0, 0.0, 0.0, 0.0];
        assert!(decode_best_box(&anchors, &scores, &boxes, 0.7).is_none());
    }

    #[test]
    fn test_decode_centered_anchor() {
        let anchors = vec![(0.5, 0.5, 0.25, 0.25)];
        let scores = vec![0.1, 0.9];
        let boxes = vec![0.0, 0.0, 0.0, 0.0];
        let rect = decode_best_box(&anchors, &scores, &boxes, 0.7).unwrap();
        // Zero offsets decode to the anchor itself
        assert!((rect.x - (0.5 - 0.125) * 320.0).abs() < 1e-3);
        assert!((rect.width - 0.25 * 320.0).abs() < 1e-3);
    }
}

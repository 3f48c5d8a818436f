/// Frozen-network feature extractor backed by ONNX Runtime.
///
/// Crops the region of interest out of the raw frame, warps it to the
/// square network input, and returns the network's output vector as the
/// embedding. One session is created per process and shared behind a
/// mutex.
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use rand::Rng;

use crate::classifier::domain::embedding::Embedding;
use crate::classifier::domain::feature_extractor::{ExtractError, FeatureExtractor, InferenceMode};
use crate::shared::constants::NETWORK_INPUT_SIZE;
use crate::shared::frame::Frame;
use crate::shared::rect::Rect;

const NORM_MEAN: f32 = 127.5;
const NORM_STD: f32 = 127.5;

/// Fraction of the crop size the random-sample mode may shift the origin.
const JITTER_FRACTION: f32 = 0.05;

pub struct OnnxFeatureExtractor {
    session: Mutex<ort::session::Session>,
    labels: Vec<String>,
    mode: InferenceMode,
}

impl OnnxFeatureExtractor {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let intra_threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let session = ort::session::Session::builder()?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)?
            .with_inter_threads(1)?
            .with_intra_threads(intra_threads)?
            .commit_from_file(model_path)?;
        Ok(Self {
            session: Mutex::new(session),
            labels: Vec::new(),
            mode: InferenceMode::Deterministic,
        })
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_mode(mut self, mode: InferenceMode) -> Self {
        self.mode = mode;
        self
    }

    /// Reads one class name per line, in network output order.
    pub fn labels_from_file(path: &Path) -> std::io::Result<Vec<String>> {
        Ok(fs::read_to_string(path)?
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect())
    }

    /// Multi-class diagnostic classification of a region: top-k
    /// `(label, probability)` pairs via softmax over the network output.
    /// Uses the stochastic sampling mode; this path never feeds the
    /// online-learning classifiers.
    pub fn classify_top(
        &self,
        frame: &Frame,
        region: &Rect,
        k: usize,
    ) -> Result<Vec<(String, f32)>, ExtractError> {
        let values = self.run(frame, region, InferenceMode::RandomSample)?;
        let probs = softmax(&values);
        Ok(top_k(&probs, k)
            .into_iter()
            .map(|(i, p)| (self.label_for(i), p))
            .collect())
    }

    fn label_for(&self, index: usize) -> String {
        self.labels
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("class_{index}"))
    }

    fn run(
        &self,
        frame: &Frame,
        region: &Rect,
        mode: InferenceMode,
    ) -> Result<Vec<f32>, ExtractError> {
        let (x, y, w, h) = region
            .pixel_bounds(frame.width(), frame.height())
            .ok_or(ExtractError::EmptyRegion)?;

        let (x, y) = match mode {
            InferenceMode::Deterministic => (x, y),
            InferenceMode::RandomSample => jitter_origin(x, y, w, h, frame.width(), frame.height()),
        };

        let crop = crop_rgb(frame, x, y, w, h)
            .map_err(|e| ExtractError::PixelBuffer(e.to_string()))?;
        let tensor = preprocess(&crop, w, h);

        let input_value = ort::value::Tensor::from_array(tensor)
            .map_err(|e| ExtractError::PixelBuffer(e.to_string()))?;
        let mut session = self
            .session
            .lock()
            .map_err(|e| ExtractError::Inference(format!("Lock poisoned: {e}")))?;
        let outputs = session
            .run(ort::inputs![input_value])
            .map_err(|e| ExtractError::Inference(e.to_string()))?;
        let array = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| ExtractError::Inference(e.to_string()))?;
        let slice = array
            .as_slice()
            .ok_or_else(|| ExtractError::Inference("Cannot get output slice".into()))?;
        Ok(slice.to_vec())
    }
}

impl FeatureExtractor for OnnxFeatureExtractor {
    fn extract(&self, frame: &Frame, region: &Rect) -> Result<Embedding, ExtractError> {
        let values = self.run(frame, region, self.mode)?;
        Ok(Embedding::with_labels(values, self.labels.clone()))
    }
}

fn jitter_origin(x: u32, y: u32, w: u32, h: u32, frame_w: u32, frame_h: u32) -> (u32, u32) {
    let mut rng = rand::thread_rng();
    let dx = (w as f32 * JITTER_FRACTION) as i64;
    let dy = (h as f32 * JITTER_FRACTION) as i64;
    let jx = if dx > 0 { rng.gen_range(-dx..=dx) } else { 0 };
    let jy = if dy > 0 { rng.gen_range(-dy..=dy) } else { 0 };
    let nx = (x as i64 + jx).clamp(0, (frame_w - w) as i64) as u32;
    let ny = (y as i64 + jy).clamp(0, (frame_h - h) as i64) as u32;
    (nx, ny)
}

/// Copies the region out of the frame as tightly-packed RGB bytes,
/// reversing channel order for BGRA sources.
fn crop_rgb(frame: &Frame, x: u32, y: u32, w: u32, h: u32) -> Result<Vec<u8>, String> {
    if x + w > frame.width() || y + h > frame.height() {
        return Err(format!(
            "crop {}x{}+{}+{} exceeds frame {}x{}",
            w,
            h,
            x,
            y,
            frame.width(),
            frame.height()
        ));
    }

    let channels = frame.format().channels();
    let reversed = frame.format().reversed_channels();
    let stride = frame.width() as usize * channels;
    let data = frame.data();

    let mut crop = Vec::with_capacity(w as usize * h as usize * 3);
    for row in y..y + h {
        let row_start = row as usize * stride;
        for col in x..x + w {
            let offset = row_start + col as usize * channels;
            if reversed {
                crop.push(data[offset + 2]);
                crop.push(data[offset + 1]);
                crop.push(data[offset]);
            } else {
                crop.extend_from_slice(&data[offset..offset + 3]);
            }
        }
    }
    Ok(crop)
}

/// Warps the RGB crop to the square network input, normalized NCHW layout.
fn preprocess(rgb_data: &[u8], width: u32, height: u32) -> ndarray::Array4<f32> {
    let src_w = width as usize;
    let src_h = height as usize;
    let size = NETWORK_INPUT_SIZE;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, size, size));

    for y in 0..size {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / size as f64) as usize).min(src_h - 1);
        for x in 0..size {
            let src_x = (((x as f64 + 0.5) * src_w as f64 / size as f64) as usize).min(src_w - 1);
            let offset = (src_y * src_w + src_x) * 3;
            if offset + 2 < rgb_data.len() {
                for c in 0..3 {
                    tensor[[0, c, y, x]] = (rgb_data[offset + c] as f32 - NORM_MEAN) / NORM_STD;
                }
            }
        }
    }

    tensor
}

fn softmax(values: &[f32]) -> Vec<f32> {
    let max = values.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = values.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|e| e / sum).collect()
}

fn top_k(probs: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut indexed: Vec<(usize, f32)> = probs.iter().cloned().enumerate().collect();
    indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    indexed.truncate(k);
    indexed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::frame::PixelFormat;
    use approx::assert_relative_eq;

    fn gray_frame(w: u32, h: u32, value: u8) -> Frame {
        Frame::new(vec![value; (w * h * 3) as usize], w, h, PixelFormat::Rgb8, 0)
    }

    #[test]
    fn test_preprocess_shape() {
        let data = vec![128u8; 50 * 50 * 3];
        let tensor = preprocess(&data, 50, 50);
        assert_eq!(
            tensor.shape(),
            &[1, 3, NETWORK_INPUT_SIZE, NETWORK_INPUT_SIZE]
        );
    }

    #[test]
    fn test_preprocess_normalization_range() {
        let low = preprocess(&vec![0u8; 10 * 10 * 3], 10, 10);
        let high = preprocess(&vec![255u8; 10 * 10 * 3], 10, 10);
        assert!((low[[0, 0, 0, 0]] - (-1.0)).abs() < 0.01);
        assert!((high[[0, 0, 0, 0]] - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_crop_rgb_extracts_subregion() {
        // 4x2 RGB frame, row 0 dark, row 1 bright
        let mut data = vec![10u8; 4 * 2 * 3];
        for v in data.iter_mut().skip(4 * 3) {
            *v = 200;
        }
        let frame = Frame::new(data, 4, 2, PixelFormat::Rgb8, 0);
        let crop = crop_rgb(&frame, 1, 1, 2, 1).unwrap();
        assert_eq!(crop, vec![200u8; 2 * 3]);
    }

    #[test]
    fn test_crop_rgb_reverses_bgra() {
        // single BGRA pixel: B=1 G=2 R=3 A=4 → RGB (3, 2, 1)
        let frame = Frame::new(vec![1, 2, 3, 4], 1, 1, PixelFormat::Bgra8, 0);
        let crop = crop_rgb(&frame, 0, 0, 1, 1).unwrap();
        assert_eq!(crop, vec![3, 2, 1]);
    }

    #[test]
    fn test_crop_rgb_strips_rgba_alpha() {
        let frame = Frame::new(vec![9, 8, 7, 255], 1, 1, PixelFormat::Rgba8, 0);
        let crop = crop_rgb(&frame, 0, 0, 1, 1).unwrap();
        assert_eq!(crop, vec![9, 8, 7]);
    }

    #[test]
    fn test_crop_rgb_out_of_bounds_is_error() {
        let frame = gray_frame(4, 4, 0);
        assert!(crop_rgb(&frame, 2, 2, 4, 4).is_err());
    }

    #[test]
    fn test_jitter_stays_within_frame() {
        for _ in 0..100 {
            let (x, y) = jitter_origin(0, 0, 80, 80, 100, 100);
            assert!(x <= 20);
            assert!(y <= 20);
        }
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        assert_relative_eq!(probs.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn test_top_k_orders_descending() {
        let top = top_k(&[0.1, 0.5, 0.4], 2);
        assert_eq!(top[0].0, 1);
        assert_eq!(top[1].0, 2);
    }

    #[test]
    fn test_top_k_handles_short_input() {
        let top = top_k(&[0.3], 5);
        assert_eq!(top.len(), 1);
    }
}

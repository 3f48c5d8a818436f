use thiserror::Error;

use crate::classifier::domain::embedding::Embedding;
use crate::shared::frame::Frame;
use crate::shared::rect::Rect;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("region of interest lies outside the frame")]
    EmptyRegion,
    #[error("pixel buffer preparation failed: {0}")]
    PixelBuffer(String),
    #[error("network inference failed: {0}")]
    Inference(String),
}

/// How the frozen network samples the input when producing an output
/// vector.
///
/// `Deterministic` is used for training-feature extraction so the same
/// frame+region always yields the same embedding; `RandomSample` jitters
/// the crop and backs the multi-class diagnostic path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InferenceMode {
    #[default]
    Deterministic,
    RandomSample,
}

/// Domain interface for turning a frame region into an embedding.
///
/// A failed extraction means "skip this frame": the pipeline logs and moves
/// on, it never retries the same frame.
pub trait FeatureExtractor: Send {
    fn extract(&self, frame: &Frame, region: &Rect) -> Result<Embedding, ExtractError>;
}

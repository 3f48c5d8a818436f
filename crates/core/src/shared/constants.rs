use std::ops::RangeInclusive;
use std::time::Duration;

pub const NETWORK_MODEL_NAME: &str = "squeezenet1.1-7.onnx";
pub const NETWORK_MODEL_URL: &str =
    "https://github.com/onnx/models/raw/main/validated/vision/classification/squeezenet/model/squeezenet1.1-7.onnx";

/// Side length of the square input the bundled network expects; crops are
/// warped to it.
pub const NETWORK_INPUT_SIZE: usize = 224;

/// A predictor counts as a detection iff its score is strictly above this.
pub const DETECTION_THRESHOLD: f32 = 0.7;

/// Minimum wall-clock spacing between processed frames (pacing floor).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(200);

/// Valid range for positive/negative sample targets of a learning session.
pub const SAMPLE_RANGE: RangeInclusive<usize> = 5..=200;

pub const DEFAULT_SAMPLE_TARGET: usize = 50;

use crate::shared::frame::Frame;
use crate::shared::rect::Rect;

/// One detected face: its bounding box in frame coordinates and whether
/// the detector judged it to be smiling.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceFeature {
    pub region: Rect,
    pub smiling: bool,
}

/// Domain interface for face detection over a frame region.
///
/// Face detection is an external capability: the pipeline only consumes
/// the resulting features. Implementations may be stateful, hence
/// `&mut self`.
pub trait FaceDetector: Send {
    fn detect(
        &mut self,
        frame: &Frame,
        region: &Rect,
    ) -> Result<Vec<FaceFeature>, Box<dyn std::error::Error>>;
}

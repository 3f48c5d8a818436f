use crate::detection::domain::face_detector::{FaceDetector, FaceFeature};
use crate::shared::frame::Frame;
use crate::shared::rect::Rect;

/// Face detector that never finds anything.
///
/// Used by headless runs where no face model is wired in; the object
/// pipeline is unaffected.
pub struct NullFaceDetector;

impl FaceDetector for NullFaceDetector {
    fn detect(
        &mut self,
        _frame: &Frame,
        _region: &Rect,
    ) -> Result<Vec<FaceFeature>, Box<dyn std::error::Error>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::frame::PixelFormat;

    #[test]
    fn test_always_empty() {
        let frame = Frame::new(vec![0u8; 12], 2, 2, PixelFormat::Rgb8, 0);
        let region = Rect::new(0.0, 0.0, 2.0, 2.0);
        let mut detector = NullFaceDetector;
        assert!(detector.detect(&frame, &region).unwrap().is_empty());
    }
}

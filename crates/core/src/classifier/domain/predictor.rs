use serde::{Deserialize, Serialize};

use crate::shared::constants::DETECTION_THRESHOLD;

/// Immutable trained binary classifier.
///
/// Produced by `Trainer::freeze` and never mutated afterwards; a predictor
/// is only ever deleted wholesale. Scores are deterministic and
/// side-effect-free.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Predictor {
    weights: Vec<f32>,
    bias: f32,
    feature_mean: Vec<f32>,
    feature_std: Vec<f32>,
}

impl Predictor {
    pub(crate) fn new(
        weights: Vec<f32>,
        bias: f32,
        feature_mean: Vec<f32>,
        feature_std: Vec<f32>,
    ) -> Self {
        Self {
            weights,
            bias,
            feature_mean,
            feature_std,
        }
    }

    /// Confidence that the embedding shows the learned object, in (0, 1).
    ///
    /// Inputs shorter or longer than the training dimension are truncated /
    /// zero-extended implicitly by the zip; callers are expected to feed
    /// embeddings from the same network the predictor was trained on.
    pub fn score(&self, values: &[f32]) -> f32 {
        let z: f32 = self
            .weights
            .iter()
            .zip(values.iter().zip(self.feature_mean.iter().zip(&self.feature_std)))
            .map(|(w, (x, (m, s)))| w * ((x - m) / s))
            .sum::<f32>()
            + self.bias;
        sigmoid(z)
    }

    pub fn dimension(&self) -> usize {
        self.weights.len()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Detection rule shared by the registry and its callers: strictly greater
/// than the threshold, so a score of exactly 0.7 is not a detection.
pub fn is_detected(score: f32) -> bool {
    score > DETECTION_THRESHOLD
}

pub(crate) fn sigmoid(z: f32) -> f32 {
    1.0 / (1.0 + (-z).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn identity_predictor(weights: Vec<f32>, bias: f32) -> Predictor {
        let dim = weights.len();
        Predictor::new(weights, bias, vec![0.0; dim], vec![1.0; dim])
    }

    #[test]
    fn test_score_is_sigmoid_of_linear_response() {
        let p = identity_predictor(vec![1.0, -1.0], 0.5);
        let score = p.score(&[2.0, 1.0]);
        assert_relative_eq!(score, sigmoid(2.0 - 1.0 + 0.5), epsilon = 1e-6);
    }

    #[test]
    fn test_score_is_bounded() {
        let p = identity_predictor(vec![100.0], 0.0);
        assert!(p.score(&[100.0]) < 1.0);
        assert!(p.score(&[-100.0]) > 0.0);
    }

    #[test]
    fn test_score_is_deterministic() {
        let p = identity_predictor(vec![0.3, 0.7, -0.2], 0.1);
        let x = [1.0, 2.0, 3.0];
        assert_eq!(p.score(&x), p.score(&x));
    }

    #[test]
    fn test_standardization_applied() {
        let p = Predictor::new(vec![1.0], 0.0, vec![10.0], vec![2.0]);
        // (12 - 10) / 2 = 1.0 standardized
        assert_relative_eq!(p.score(&[12.0]), sigmoid(1.0), epsilon = 1e-6);
    }

    #[rstest]
    #[case::exactly_threshold(0.7, false)]
    #[case::just_above(0.7000001, true)]
    #[case::just_below(0.6999999, false)]
    #[case::far_above(0.99, true)]
    #[case::far_below(0.1, false)]
    fn test_detection_is_strictly_greater(#[case] score: f32, #[case] detected: bool) {
        assert_eq!(is_detected(score), detected);
    }

    #[test]
    fn test_byte_round_trip_preserves_scores() {
        let p = Predictor::new(
            vec![0.25, -1.5, 0.75],
            -0.125,
            vec![0.1, 0.2, 0.3],
            vec![1.0, 2.0, 0.5],
        );
        let restored = Predictor::from_bytes(&p.to_bytes().unwrap()).unwrap();
        let x = [0.4, -0.6, 2.0];
        assert_relative_eq!(p.score(&x), restored.score(&x), epsilon = 1e-6);
    }
}

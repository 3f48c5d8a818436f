use thiserror::Error;

use crate::classifier::domain::embedding::{Embedding, SampleLabel};
use crate::classifier::domain::predictor::{sigmoid, Predictor};

const EPOCHS: usize = 300;
const LEARNING_RATE: f32 = 0.1;
const WEIGHT_DECAY: f32 = 1e-4;
const STD_FLOOR: f32 = 1e-6;

#[derive(Error, Debug)]
pub enum TrainError {
    #[error("embedding has {found} dimensions, trainer expects {expected}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("embedding is empty")]
    EmptyEmbedding,
    #[error("cannot freeze without at least one positive sample")]
    MissingPositive,
    #[error("cannot freeze without at least one negative sample")]
    MissingNegative,
}

/// Mutable, append-only accumulator of labeled embedding samples.
///
/// Exactly one trainer is live at a time; starting a new learning session
/// replaces it. Samples are accumulated as they arrive and the model is fit
/// in one deterministic batch at `freeze`, which consumes the trainer —
/// there is no way to mutate the resulting predictor through it.
#[derive(Debug, Default)]
pub struct Trainer {
    samples: Vec<(Vec<f32>, SampleLabel)>,
    dimension: Option<usize>,
}

impl Trainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sample(&mut self, embedding: &Embedding, label: SampleLabel) -> Result<(), TrainError> {
        if embedding.is_empty() {
            return Err(TrainError::EmptyEmbedding);
        }
        match self.dimension {
            None => self.dimension = Some(embedding.len()),
            Some(expected) if expected != embedding.len() => {
                return Err(TrainError::DimensionMismatch {
                    expected,
                    found: embedding.len(),
                });
            }
            Some(_) => {}
        }
        self.samples.push((embedding.values().to_vec(), label));
        Ok(())
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Fits a logistic-regression predictor over every sample seen so far.
    ///
    /// Deterministic: zero-initialized weights, fixed epoch count, samples
    /// visited in insertion order. Requires at least one sample of each
    /// label.
    pub fn freeze(self) -> Result<Predictor, TrainError> {
        if !self.samples.iter().any(|(_, l)| *l == SampleLabel::Positive) {
            return Err(TrainError::MissingPositive);
        }
        if !self.samples.iter().any(|(_, l)| *l == SampleLabel::Negative) {
            return Err(TrainError::MissingNegative);
        }

        let dim = self.dimension.unwrap_or(0);
        let n = self.samples.len();

        let (mean, std) = feature_moments(&self.samples, dim);
        let standardized: Vec<Vec<f32>> = self
            .samples
            .iter()
            .map(|(x, _)| {
                x.iter()
                    .zip(mean.iter().zip(&std))
                    .map(|(v, (m, s))| (v - m) / s)
                    .collect()
            })
            .collect();

        let mut weights = vec![0.0f32; dim];
        let mut bias = 0.0f32;

        for _ in 0..EPOCHS {
            let mut grad_w = vec![0.0f32; dim];
            let mut grad_b = 0.0f32;

            for (z, (_, label)) in standardized.iter().zip(&self.samples) {
                let pred = sigmoid(dot(&weights, z) + bias);
                let err = pred - label.as_f32();
                for (g, x) in grad_w.iter_mut().zip(z) {
                    *g += err * x;
                }
                grad_b += err;
            }

            let scale = LEARNING_RATE / n as f32;
            for (w, g) in weights.iter_mut().zip(&grad_w) {
                *w -= scale * g + LEARNING_RATE * WEIGHT_DECAY * *w;
            }
            bias -= scale * grad_b;
        }

        Ok(Predictor::new(weights, bias, mean, std))
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn feature_moments(samples: &[(Vec<f32>, SampleLabel)], dim: usize) -> (Vec<f32>, Vec<f32>) {
    let n = samples.len() as f32;
    let mut mean = vec![0.0f32; dim];
    for (x, _) in samples {
        for (m, v) in mean.iter_mut().zip(x) {
            *m += v / n;
        }
    }

    let mut std = vec![0.0f32; dim];
    for (x, _) in samples {
        for ((s, v), m) in std.iter_mut().zip(x).zip(&mean) {
            *s += (v - m) * (v - m) / n;
        }
    }
    for s in std.iter_mut() {
        *s = s.sqrt().max(STD_FLOOR);
    }

    (mean, std)
}

/// Binary training label for one embedding sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleLabel {
    Negative,
    Positive,
}

impl SampleLabel {
    pub fn as_f32(&self) -> f32 {
        match self {
            SampleLabel::Negative => 0.0,
            SampleLabel::Positive => 1.0,
        }
    }
}

/// Fixed-length feature vector produced by the frozen network for one
/// region of one frame.
///
/// `labels` are the network's class names, parallel to `values`; they are
/// only consulted by the diagnostic classification path and may be empty.
/// An embedding is owned by the pipeline iteration that produced it and
/// dropped after use.
#[derive(Clone, Debug)]
pub struct Embedding {
    values: Vec<f32>,
    labels: Vec<String>,
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self {
            values,
            labels: Vec::new(),
        }
    }

    pub fn with_labels(values: Vec<f32>, labels: Vec<String>) -> Self {
        Self { values, labels }
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_values() {
        assert_eq!(SampleLabel::Positive.as_f32(), 1.0);
        assert_eq!(SampleLabel::Negative.as_f32(), 0.0);
    }

    #[test]
    fn test_embedding_without_labels() {
        let e = Embedding::new(vec![0.5, -0.5]);
        assert_eq!(e.len(), 2);
        assert!(e.labels().is_empty());
    }

    #[test]
    fn test_embedding_with_labels() {
        let e = Embedding::with_labels(vec![0.1, 0.9], vec!["cat".into(), "cup".into()]);
        assert_eq!(e.values(), &[0.1, 0.9]);
        assert_eq!(e.labels(), &["cat".to_string(), "cup".to_string()]);
    }
}

use std::path::PathBuf;

use thiserror::Error;

use crate::classifier::domain::predictor::Predictor;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to create store directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write predictor {name}: {source}")]
    Write {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read store directory {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to delete predictor {name}: {source}")]
    Delete {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode predictor {name}: {source}")]
    Encode {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Durable storage for trained predictors, one blob per predictor keyed by
/// its exact name.
///
/// `load_all` returns every entry it could read; individually unreadable
/// entries are logged and skipped so one corrupt blob never hides the
/// rest.
pub trait PredictorStore: Send + Sync {
    fn save(&self, name: &str, predictor: &Predictor) -> Result<(), StoreError>;
    fn load_all(&self) -> Result<Vec<(String, Predictor)>, StoreError>;
    fn delete(&self, name: &str) -> Result<(), StoreError>;
    fn delete_all(&self) -> Result<(), StoreError>;
}

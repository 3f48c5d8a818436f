use std::fs;
use std::path::{Path, PathBuf};

use crate::classifier::domain::predictor::Predictor;
use crate::registry::domain::predictor_store::{PredictorStore, StoreError};

/// File-backed predictor store: one file per predictor, file name equal to
/// the predictor name, all in a single flat directory.
///
/// Session-name validation guarantees names are filesystem-safe before
/// they ever reach this store.
pub struct FilePredictorStore {
    dir: PathBuf,
}

impl FilePredictorStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Default store location under the platform data directory.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("Spotter").join("predictors"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn ensure_dir(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::CreateDir {
            path: self.dir.clone(),
            source: e,
        })
    }
}

impl PredictorStore for FilePredictorStore {
    fn save(&self, name: &str, predictor: &Predictor) -> Result<(), StoreError> {
        self.ensure_dir()?;

        let bytes = predictor.to_bytes().map_err(|e| StoreError::Encode {
            name: name.to_string(),
            source: e,
        })?;

        let dest = self.dir.join(name);
        let temp = dest.with_extension("part");
        let write_err = |e: std::io::Error| StoreError::Write {
            name: name.to_string(),
            source: e,
        };

        fs::write(&temp, &bytes).map_err(write_err)?;
        fs::rename(&temp, &dest).map_err(write_err)?;
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<(String, Predictor)>, StoreError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.dir).map_err(|e| StoreError::Scan {
            path: self.dir.clone(),
            source: e,
        })?;

        let mut loaded = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(n) => n.to_string(),
                None => continue,
            };

            let predictor = fs::read(&path)
                .map_err(|e| e.to_string())
                .and_then(|bytes| Predictor::from_bytes(&bytes).map_err(|e| e.to_string()));

            match predictor {
                Ok(p) => loaded.push((name, p)),
                Err(e) => log::warn!("skipping unreadable predictor file {name}: {e}"),
            }
        }

        // Directory iteration order is platform-defined; keep loads stable.
        loaded.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(loaded)
    }

    fn delete(&self, name: &str) -> Result<(), StoreError> {
        let path = self.dir.join(name);
        if !path.exists() {
            return Ok(());
        }
        fs::remove_file(&path).map_err(|e| StoreError::Delete {
            name: name.to_string(),
            source: e,
        })
    }

    fn delete_all(&self) -> Result<(), StoreError> {
        if !self.dir.exists() {
            return Ok(());
        }
        let entries = fs::read_dir(&self.dir).map_err(|e| StoreError::Scan {
            path: self.dir.clone(),
            source: e,
        })?;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() {
                if let Err(e) = fs::remove_file(&path) {
                    log::warn!("could not remove {}: {e}", path.display());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::domain::embedding::{Embedding, SampleLabel};
    use crate::classifier::domain::trainer::Trainer;
    use tempfile::TempDir;

    fn trained_predictor() -> Predictor {
        let mut trainer = Trainer::new();
        trainer
            .add_sample(&Embedding::new(vec![1.0, 0.0]), SampleLabel::Positive)
            .unwrap();
        trainer
            .add_sample(&Embedding::new(vec![0.0, 1.0]), SampleLabel::Negative)
            .unwrap();
        trainer.freeze().unwrap()
    }

    #[test]
    fn test_save_then_load_all() {
        let tmp = TempDir::new().unwrap();
        let store = FilePredictorStore::new(tmp.path());

        store.save("Cup", &trained_predictor()).unwrap();
        let loaded = store.load_all().unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].0, "Cup");
    }

    #[test]
    fn test_file_name_is_exactly_predictor_name() {
        let tmp = TempDir::new().unwrap();
        let store = FilePredictorStore::new(tmp.path());
        store.save("My Mug", &trained_predictor()).unwrap();
        assert!(tmp.path().join("My Mug").exists());
    }

    #[test]
    fn test_corrupt_file_is_skipped_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let store = FilePredictorStore::new(tmp.path());
        store.save("Good", &trained_predictor()).unwrap();
        fs::write(tmp.path().join("Bad"), b"not json").unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].0, "Good");
    }

    #[test]
    fn test_subdirectories_are_ignored() {
        let tmp = TempDir::new().unwrap();
        let store = FilePredictorStore::new(tmp.path());
        fs::create_dir(tmp.path().join("nested")).unwrap();
        store.save("Only", &trained_predictor()).unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn test_delete_removes_file() {
        let tmp = TempDir::new().unwrap();
        let store = FilePredictorStore::new(tmp.path());
        store.save("Cup", &trained_predictor()).unwrap();
        store.delete("Cup").unwrap();
        assert!(!tmp.path().join("Cup").exists());
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let tmp = TempDir::new().unwrap();
        let store = FilePredictorStore::new(tmp.path());
        assert!(store.delete("Nothing").is_ok());
    }

    #[test]
    fn test_delete_all_empties_store() {
        let tmp = TempDir::new().unwrap();
        let store = FilePredictorStore::new(tmp.path());
        store.save("A", &trained_predictor()).unwrap();
        store.save("B", &trained_predictor()).unwrap();
        store.delete_all().unwrap();
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_load_all_missing_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = FilePredictorStore::new(tmp.path().join("never-created"));
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_round_trip_preserves_decision() {
        let tmp = TempDir::new().unwrap();
        let store = FilePredictorStore::new(tmp.path());
        let predictor = trained_predictor();
        let x = [1.0, 0.0];
        let side_before = predictor.score(&x) > crate::shared::constants::DETECTION_THRESHOLD;

        store.save("Cup", &predictor).unwrap();
        let (_, restored) = store.load_all().unwrap().remove(0);
        let side_after = restored.score(&x) > crate::shared::constants::DETECTION_THRESHOLD;

        assert_eq!(side_before, side_after);
    }
}

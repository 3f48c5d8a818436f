use std::sync::Mutex;

use crate::classifier::domain::predictor::{is_detected, Predictor};
use crate::registry::domain::predictor_store::{PredictorStore, StoreError};

struct RegistryEntry {
    name: String,
    predictor: Predictor,
}

/// Shared, insertion-ordered collection of named trained predictors.
///
/// One mutex guards every operation, including the read-only classify
/// scan, so a classification always sees a consistent snapshot and never
/// interleaves with an add/remove/reload. Ordering carries no meaning
/// beyond display.
pub struct PredictorRegistry {
    entries: Mutex<Vec<RegistryEntry>>,
    store: Box<dyn PredictorStore>,
}

impl PredictorRegistry {
    pub fn new(store: Box<dyn PredictorStore>) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            store,
        }
    }

    /// Appends a predictor and persists it.
    ///
    /// The in-memory append commits first; a persistence failure is logged
    /// and left to the next `load_all` to reconcile.
    pub fn add(&self, name: &str, predictor: Predictor) {
        let mut entries = self.entries.lock().expect("registry lock poisoned");
        entries.push(RegistryEntry {
            name: name.to_string(),
            predictor,
        });
        let entry = entries.last().expect("entry just pushed");
        if let Err(e) = self.store.save(&entry.name, &entry.predictor) {
            log::error!("could not persist predictor {name}: {e}");
        }
    }

    /// Removes the first entry whose name matches exactly, along with its
    /// backing file. No-op if absent.
    pub fn remove(&self, name: &str) {
        let mut entries = self.entries.lock().expect("registry lock poisoned");
        if let Some(pos) = entries.iter().position(|e| e.name == name) {
            entries.remove(pos);
            if let Err(e) = self.store.delete(name) {
                log::error!("could not delete predictor file {name}: {e}");
            }
        }
    }

    /// Replaces the in-memory registry with everything in the store.
    pub fn load_all(&self) -> Result<usize, StoreError> {
        let mut entries = self.entries.lock().expect("registry lock poisoned");
        let loaded = self.store.load_all()?;
        entries.clear();
        entries.extend(
            loaded
                .into_iter()
                .map(|(name, predictor)| RegistryEntry { name, predictor }),
        );
        Ok(entries.len())
    }

    /// Empties the registry and deletes every backing file (global reset).
    pub fn clear_all(&self) {
        let mut entries = self.entries.lock().expect("registry lock poisoned");
        entries.clear();
        if let Err(e) = self.store.delete_all() {
            log::error!("could not clear predictor store: {e}");
        }
    }

    /// Scores the embedding against every registered predictor and returns
    /// the names scoring strictly above the detection threshold, in
    /// registry order.
    pub fn classify(&self, values: &[f32]) -> Vec<String> {
        let entries = self.entries.lock().expect("registry lock poisoned");
        entries
            .iter()
            .filter_map(|e| {
                let score = e.predictor.score(values);
                log::debug!("predictor {} scored {score:.3}", e.name);
                is_detected(score).then(|| e.name.clone())
            })
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        let entries = self.entries.lock().expect("registry lock poisoned");
        entries.iter().map(|e| e.name.clone()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        let entries = self.entries.lock().expect("registry lock poisoned");
        entries.iter().any(|e| e.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

use std::sync::Arc;

use thiserror::Error;

use crate::classifier::domain::embedding::{Embedding, SampleLabel};
use crate::classifier::domain::trainer::Trainer;
use crate::learning::session_config::{ConfigError, SessionConfig};
use crate::learning::session_observer::{
    SessionObserver, NEGATIVE_CAPTURE_PROMPT, NEGATIVE_PHASE_PROMPT, POSITIVE_PHASE_PROMPT,
    PREDICTING_PROMPT,
};
use crate::learning::state::{PipelineState, StateCell};
use crate::registry::domain::predictor_store::StoreError;
use crate::registry::predictor_registry::PredictorRegistry;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("cannot start a new predictor while {0}")]
    InvalidState(PipelineState),
    #[error("predictor name {0:?} is already used")]
    DuplicateName(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// The learning session currently accumulating samples. Exactly one is
/// live at a time; starting a new session replaces it wholesale.
struct LearningSession {
    name: String,
    positive_target: usize,
    negative_target: usize,
    sample_count: usize,
    trainer: Option<Trainer>,
}

/// Owns the learning state machine: the two-slot state cell, the live
/// learning session, and the predictor registry.
///
/// User actions (start/confirm/cancel) and the per-frame `process` call
/// both go through one instance behind a mutex, so a user action can
/// never interleave with an in-flight frame iteration. Transitions
/// triggered from inside an iteration (sample-count thresholds) go
/// through the pending slot and commit at the end of that same
/// iteration.
pub struct SessionController {
    state: StateCell,
    registry: Arc<PredictorRegistry>,
    observer: Box<dyn SessionObserver>,
    session: Option<LearningSession>,
}

impl SessionController {
    pub fn new(registry: Arc<PredictorRegistry>, observer: Box<dyn SessionObserver>) -> Self {
        Self {
            state: StateCell::default(),
            registry,
            observer,
            session: None,
        }
    }

    pub fn current_state(&self) -> PipelineState {
        self.state.current()
    }

    pub fn registry(&self) -> &Arc<PredictorRegistry> {
        &self.registry
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Reloads the registry from durable storage and, when anything was
    /// found, requests the predicting state. The request commits with the
    /// first processed frame.
    pub fn bootstrap(&mut self) -> Result<usize, StoreError> {
        let count = self.registry.load_all()?;
        if count > 0 {
            self.state.request(PipelineState::Predicting);
        }
        Ok(count)
    }

    /// Begins a new learning session: fresh trainer, counts reset,
    /// positive phase entered. Rejected wholesale (no trainer created, no
    /// state touched) on a duplicate name or when called mid-session.
    pub fn start_session(&mut self, config: SessionConfig) -> Result<(), SessionError> {
        let state = self.state.current();
        if !matches!(state, PipelineState::Start | PipelineState::Predicting) {
            return Err(SessionError::InvalidState(state));
        }
        if self.registry.contains(config.name()) {
            return Err(SessionError::DuplicateName(config.name().to_string()));
        }

        self.session = Some(LearningSession {
            name: config.name().to_string(),
            positive_target: config.positive_target(),
            negative_target: config.negative_target(),
            sample_count: 0,
            trainer: Some(Trainer::new()),
        });

        self.apply_state(PipelineState::LearningPositive);
        self.observer.prompt(POSITIVE_PHASE_PROMPT);
        Ok(())
    }

    /// User confirmation that negative-example capture may begin. Only
    /// valid while waiting between the two phases; the trainer is kept.
    pub fn confirm_negative_phase(&mut self) -> Result<(), SessionError> {
        let state = self.state.current();
        if state != PipelineState::Waiting {
            return Err(SessionError::InvalidState(state));
        }
        if let Some(session) = self.session.as_mut() {
            session.sample_count = 0;
        }
        self.apply_state(PipelineState::LearningNegative);
        self.observer.prompt(NEGATIVE_CAPTURE_PROMPT);
        Ok(())
    }

    /// Abandons the in-progress learning phases. No-op outside them. The
    /// trainer is retained until the next session replaces it.
    pub fn cancel_learning(&mut self) {
        if !self.state.current().is_learning() {
            return;
        }
        let next = if self.registry.is_empty() {
            PipelineState::Start
        } else {
            PipelineState::Predicting
        };
        self.apply_state(next);
    }

    /// One frame iteration's object-stage branch: train, classify, or
    /// idle per the current state, then commit any pending transition.
    /// Returns the object display text for this frame.
    pub fn process(&mut self, embedding: &Embedding) -> String {
        let mut object_text = String::new();

        match self.state.current() {
            PipelineState::LearningPositive => {
                self.learn_sample(embedding, SampleLabel::Positive);
            }
            PipelineState::LearningNegative => {
                self.learn_sample(embedding, SampleLabel::Negative);
            }
            PipelineState::Predicting => {
                object_text = self.registry.classify(embedding.values()).join(" ");
            }
            PipelineState::Start | PipelineState::Waiting => {}
        }

        if let Some(new_state) = self.state.commit() {
            self.observer.state_changed(new_state);
        }

        object_text
    }

    fn learn_sample(&mut self, embedding: &Embedding, label: SampleLabel) {
        let (count, target) = {
            let Some(session) = self.session.as_mut() else {
                log::warn!("learning frame arrived without a live session");
                return;
            };
            let Some(trainer) = session.trainer.as_mut() else {
                return;
            };
            if let Err(e) = trainer.add_sample(embedding, label) {
                log::warn!("dropping training sample: {e}");
                return;
            }
            session.sample_count += 1;
            let target = match label {
                SampleLabel::Positive => session.positive_target,
                SampleLabel::Negative => session.negative_target,
            };
            (session.sample_count, target)
        };

        self.observer.learning_progress(count, target);
        if count < target {
            return;
        }

        match label {
            SampleLabel::Positive => {
                self.state.request(PipelineState::Waiting);
                self.observer.prompt(NEGATIVE_PHASE_PROMPT);
            }
            SampleLabel::Negative => {
                self.register_trained_predictor();
                self.state.request(PipelineState::Predicting);
                self.observer.prompt(PREDICTING_PROMPT);
            }
        }
    }

    /// Freezes the accumulated trainer and registers the result. A
    /// training failure is logged and nothing is registered, the session
    /// simply ends.
    fn register_trained_predictor(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(trainer) = session.trainer.take() else {
            return;
        };
        let name = session.name.clone();
        match trainer.freeze() {
            Ok(predictor) => {
                self.registry.add(&name, predictor);
                log::info!("predictor {name} ready");
                self.session = None;
            }
            Err(e) => log::error!("could not train predictor {name}: {e}"),
        }
    }

    /// Applies a user-initiated transition. User actions hold the same
    /// lock as frame iterations, so committing immediately is equivalent
    /// to applying right after the in-flight iteration ends.
    fn apply_state(&mut self, next: PipelineState) {
        self.state.request(next);
        if let Some(new_state) = self.state.commit() {
            self.observer.state_changed(new_state);
        }
    }
}

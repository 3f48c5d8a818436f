use std::fmt;

/// Where the pipeline is in the learn/predict lifecycle. Governs what the
/// object stage does with each accepted frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Start,
    LearningPositive,
    Waiting,
    LearningNegative,
    Predicting,
}

impl PipelineState {
    pub fn is_learning(&self) -> bool {
        matches!(
            self,
            PipelineState::LearningPositive | PipelineState::LearningNegative
        )
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Start => "start",
            PipelineState::LearningPositive => "learning-positive",
            PipelineState::Waiting => "waiting",
            PipelineState::LearningNegative => "learning-negative",
            PipelineState::Predicting => "predicting",
        };
        f.write_str(name)
    }
}

/// Two-slot state holder decoupling transition requests from the frame
/// iteration currently acting on `current`.
///
/// A transition requested while an iteration is in flight lands in
/// `pending` and only becomes `current` when the iteration commits at its
/// end, so the iteration's dispatch branch never observes a state change
/// midway through.
#[derive(Debug)]
pub struct StateCell {
    current: PipelineState,
    pending: Option<PipelineState>,
}

impl StateCell {
    pub fn new(initial: PipelineState) -> Self {
        Self {
            current: initial,
            pending: None,
        }
    }

    pub fn current(&self) -> PipelineState {
        self.current
    }

    /// Records a transition to be applied at the end of the in-flight
    /// iteration.
    pub fn request(&mut self, next: PipelineState) {
        self.pending = Some(next);
    }

    /// Applies the pending transition, if any. Returns the newly entered
    /// state when the commit actually changed something.
    pub fn commit(&mut self) -> Option<PipelineState> {
        match self.pending.take() {
            Some(next) if next != self.current => {
                self.current = next;
                Some(next)
            }
            _ => None,
        }
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new(PipelineState::Start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let cell = StateCell::default();
        assert_eq!(cell.current(), PipelineState::Start);
    }

    #[test]
    fn test_request_does_not_change_current() {
        let mut cell = StateCell::default();
        cell.request(PipelineState::LearningPositive);
        assert_eq!(cell.current(), PipelineState::Start);
    }

    #[test]
    fn test_commit_applies_pending() {
        let mut cell = StateCell::default();
        cell.request(PipelineState::LearningPositive);
        assert_eq!(cell.commit(), Some(PipelineState::LearningPositive));
        assert_eq!(cell.current(), PipelineState::LearningPositive);
    }

    #[test]
    fn test_commit_without_pending_is_noop() {
        let mut cell = StateCell::default();
        assert_eq!(cell.commit(), None);
        assert_eq!(cell.current(), PipelineState::Start);
    }

    #[test]
    fn test_commit_of_same_state_reports_no_change() {
        let mut cell = StateCell::default();
        cell.request(PipelineState::Start);
        assert_eq!(cell.commit(), None);
    }

    #[test]
    fn test_latest_request_wins() {
        let mut cell = StateCell::default();
        cell.request(PipelineState::LearningPositive);
        cell.request(PipelineState::Predicting);
        assert_eq!(cell.commit(), Some(PipelineState::Predicting));
    }

    #[test]
    fn test_commit_consumes_pending() {
        let mut cell = StateCell::default();
        cell.request(PipelineState::Waiting);
        cell.commit();
        assert_eq!(cell.commit(), None);
    }

    #[test]
    fn test_is_learning() {
        assert!(PipelineState::LearningPositive.is_learning());
        assert!(PipelineState::LearningNegative.is_learning());
        assert!(!PipelineState::Waiting.is_learning());
        assert!(!PipelineState::Predicting.is_learning());
        assert!(!PipelineState::Start.is_learning());
    }
}

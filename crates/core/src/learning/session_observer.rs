use crate::learning::state::PipelineState;

/// Voice prompts surfaced at learning milestones. Spoken by the UI/speech
/// collaborator; the core only emits the strings.
pub const POSITIVE_PHASE_PROMPT: &str =
    "Move around the thing you want to recognize, keeping the camera pointed at it, \
     to capture different angles";
pub const NEGATIVE_PHASE_PROMPT: &str =
    "Now I need to see examples of things that are not the object you're looking for. \
     Press the button when you're ready.";
pub const NEGATIVE_CAPTURE_PROMPT: &str =
    "Now move around the room pointing the camera at lots of things, that are not the \
     object you want to recognize";
pub const PREDICTING_PROMPT: &str =
    "You can now scan around using the camera, to detect objects' presence";

/// Cross-cutting observer for learning-session events.
///
/// Decouples the session controller from specific surfaces (speech, GUI
/// progress bars, logs) so each caller can watch learning unfold without
/// changing the control logic.
pub trait SessionObserver: Send {
    /// A message for the user, typically spoken aloud.
    fn prompt(&mut self, message: &str);

    /// Learning progress within the current phase.
    fn learning_progress(&mut self, completed: usize, target: usize);

    /// The state machine entered a new state.
    fn state_changed(&mut self, state: PipelineState);
}

/// Silent observer that discards all events.
pub struct NullSessionObserver;

impl SessionObserver for NullSessionObserver {
    fn prompt(&mut self, _message: &str) {}
    fn learning_progress(&mut self, _completed: usize, _target: usize) {}
    fn state_changed(&mut self, _state: PipelineState) {}
}

/// Observer that forwards everything to the log.
pub struct LogSessionObserver;

impl SessionObserver for LogSessionObserver {
    fn prompt(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn learning_progress(&mut self, completed: usize, target: usize) {
        log::info!(
            "learning progress {:.2}",
            completed as f32 / target as f32
        );
    }

    fn state_changed(&mut self, state: PipelineState) {
        log::info!("state: {state}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_observer_is_noop() {
        let mut observer = NullSessionObserver;
        observer.prompt("hello");
        observer.learning_progress(1, 10);
        observer.state_changed(PipelineState::Predicting);
        // No panics = success
    }
}

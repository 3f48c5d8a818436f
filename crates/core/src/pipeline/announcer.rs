/// Sink for the per-frame result text (object detections + face summary).
///
/// The display/speech collaborator sits behind this; the pipeline only
/// produces plain strings.
pub trait Announcer: Send {
    fn announce(&mut self, text: &str);
}

/// Discards announcements. Used in tests and headless setups that poll
/// state directly.
pub struct NullAnnouncer;

impl Announcer for NullAnnouncer {
    fn announce(&mut self, _text: &str) {}
}

/// Forwards non-empty announcements to the log.
pub struct LogAnnouncer;

impl Announcer for LogAnnouncer {
    fn announce(&mut self, text: &str) {
        if !text.is_empty() {
            log::info!("{text}");
        }
    }
}

/// Joins the object and face summaries into one display line, separated
/// only when both are present.
pub fn combine_result(object_text: &str, face_text: &str) -> String {
    let mut text = object_text.to_string();
    if !face_text.is_empty() && !object_text.is_empty() {
        text += " | ";
    }
    text += face_text;
    text
}

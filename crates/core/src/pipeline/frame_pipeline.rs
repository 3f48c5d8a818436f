use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::classifier::domain::feature_extractor::FeatureExtractor;
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::face_report::format_face_summary;
use crate::learning::session_controller::SessionController;
use crate::pipeline::announcer::{combine_result, Announcer};
use crate::pipeline::infrastructure::object_worker::ObjectWorker;
use crate::shared::constants::FRAME_INTERVAL;
use crate::shared::frame::Frame;
use crate::shared::rect::Rect;
use crate::shared::view_transform::ViewTransform;

/// Pipeline tuning knobs.
///
/// `view_size` is the display surface the user sees and draws selections
/// on; `None` means frames map 1:1 to the view. `frame_interval` is the
/// pacing floor between processed frames.
pub struct PipelineConfig {
    pub view_size: Option<(f32, f32)>,
    pub frame_interval: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            view_size: None,
            frame_interval: FRAME_INTERVAL,
        }
    }
}

/// Per-frame orchestrator.
///
/// Every delivered frame gets face detection; the object stage (feature
/// extraction + train/classify) is handed to the single object worker and
/// dropped outright while a previous frame is still in flight. The
/// combined result text is published after every frame, and the pacing
/// floor keeps publications at most one per `frame_interval`.
pub struct FramePipeline {
    face_detector: Box<dyn FaceDetector>,
    controller: Arc<Mutex<SessionController>>,
    worker: ObjectWorker,
    object_text: Arc<Mutex<String>>,
    face_text: String,
    face_boxes: Vec<Rect>,
    announcer: Box<dyn Announcer>,
    selection: Option<Rect>,
    config: PipelineConfig,
}

impl FramePipeline {
    pub fn new(
        extractor: Box<dyn FeatureExtractor>,
        face_detector: Box<dyn FaceDetector>,
        controller: Arc<Mutex<SessionController>>,
        announcer: Box<dyn Announcer>,
        config: PipelineConfig,
    ) -> Self {
        let object_text = Arc::new(Mutex::new(String::new()));
        let worker = ObjectWorker::spawn(extractor, controller.clone(), object_text.clone());
        Self {
            face_detector,
            controller,
            worker,
            object_text,
            face_text: String::new(),
            face_boxes: Vec::new(),
            announcer,
            selection: None,
            config,
        }
    }

    pub fn controller(&self) -> &Arc<Mutex<SessionController>> {
        &self.controller
    }

    /// The user's selection rectangle, in view coordinates. Extraction
    /// will focus on it until it is cleared.
    pub fn select_region(&mut self, rect: Rect) {
        let clamped = match self.config.view_size {
            Some((w, h)) => rect.keep_within(&Rect::new(0.0, 0.0, w, h)),
            None => rect,
        };
        self.selection = Some(clamped);
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn selection(&self) -> Option<Rect> {
        self.selection
    }

    /// Face boxes from the most recent frame, in view coordinates, for
    /// the overlay collaborator.
    pub fn face_boxes(&self) -> &[Rect] {
        &self.face_boxes
    }

    pub fn object_stage_busy(&self) -> bool {
        self.worker.is_busy()
    }

    /// Entry point for the camera collaborator, once per delivered frame.
    pub fn process_frame(&mut self, frame: &Frame) {
        let started = Instant::now();

        let (view_w, view_h) = self
            .config
            .view_size
            .unwrap_or((frame.width() as f32, frame.height() as f32));
        let transform = ViewTransform::new(frame.width(), frame.height(), view_w, view_h);
        let visible = transform.visible_region();

        // Face stage: always runs, independent of the object worker.
        match self.face_detector.detect(frame, &visible) {
            Ok(faces) => {
                self.face_text = format_face_summary(&faces);
                self.face_boxes = faces
                    .iter()
                    .map(|f| transform.map_to_view(&f.region))
                    .collect();
            }
            Err(e) => log::warn!("face detection failed on frame {}: {e}", frame.index()),
        }

        // Object stage: at most one in flight; drop, never queue.
        if self.worker.is_busy() {
            log::debug!("object stage busy, dropping frame {}", frame.index());
        } else {
            let roi = match &self.selection {
                Some(sel) => transform.map_selection(sel),
                None => visible,
            };
            if !self.worker.submit(frame.clone(), roi) {
                log::debug!("object stage busy, dropping frame {}", frame.index());
            }
        }

        // Publish, then hold the line until the pacing floor has passed.
        let object_text = self
            .object_text
            .lock()
            .expect("object text lock poisoned")
            .clone();
        self.announcer.announce(&combine_result(&object_text, &self.face_text));

        let elapsed = started.elapsed();
        if elapsed < self.config.frame_interval {
            std::thread::sleep(self.config.frame_interval - elapsed);
        }
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::classifier::domain::feature_extractor::FeatureExtractor;
use crate::learning::session_controller::SessionController;
use crate::shared::frame::Frame;
use crate::shared::rect::Rect;

struct ObjectJob {
    frame: Frame,
    roi: Rect,
}

/// The single high-priority object-processing worker.
///
/// One long-lived thread consumes jobs from a bounded channel; the busy
/// flag enforces at most one job in flight and only drops back to idle
/// after the job's effects — the sample add or classify, and the
/// end-of-iteration state commit — have fully landed. A failed extraction
/// clears busy the same way; the frame is simply skipped.
pub struct ObjectWorker {
    job_tx: Option<crossbeam_channel::Sender<ObjectJob>>,
    busy: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ObjectWorker {
    pub fn spawn(
        extractor: Box<dyn FeatureExtractor>,
        controller: Arc<Mutex<SessionController>>,
        object_text: Arc<Mutex<String>>,
    ) -> Self {
        let busy = Arc::new(AtomicBool::new(false));
        let worker_busy = busy.clone();
        let (job_tx, job_rx) = crossbeam_channel::bounded::<ObjectJob>(1);

        let handle = std::thread::spawn(move || {
            for job in job_rx {
                match extractor.extract(&job.frame, &job.roi) {
                    Ok(embedding) => {
                        let text = controller
                            .lock()
                            .expect("controller lock poisoned")
                            .process(&embedding);
                        *object_text.lock().expect("object text lock poisoned") = text;
                    }
                    Err(e) => {
                        log::warn!("skipping frame {}: {e}", job.frame.index());
                    }
                }
                worker_busy.store(false, Ordering::Release);
            }
        });

        Self {
            job_tx: Some(job_tx),
            busy,
            handle: Some(handle),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Hands a frame to the worker. Returns false — leaving nothing
    /// queued — when a previous job has not finished yet.
    pub fn submit(&self, frame: Frame, roi: Rect) -> bool {
        if self.busy.swap(true, Ordering::AcqRel) {
            return false;
        }
        let Some(tx) = &self.job_tx else {
            self.busy.store(false, Ordering::Release);
            return false;
        };
        if tx.send(ObjectJob { frame, roi }).is_err() {
            self.busy.store(false, Ordering::Release);
            return false;
        }
        true
    }
}

impl Drop for ObjectWorker {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop.
        self.job_tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

//! Recording session facade.
//!
//! Wraps a [`CaptureEngine`] together with the last stored copy of the
//! consolidated actions, which is what downloads, clipboard copies and uploads
//! read from. Stopping a recording refreshes that copy.

use crate::capture::{CaptureEngine, CaptureSession, CaptureSettings, RecordingState};
use crate::export::{
    EXPORT_FILENAME, ExportError, ExportOutcome, ExportSink, actions_to_json,
    copy_readable_steps, export_actions,
};
use crate::scheduler::{Scheduler, TimerHandle};
use tracing::{debug, info};
use websteps_common::action::Action;
use websteps_common::element::DomEvent;
use websteps_common::protocol::{ControlRequest, ControlResponse};

pub struct Recorder<S: Scheduler> {
    engine: CaptureEngine<S>,
    stored: Vec<Action>,
}

impl<S: Scheduler> Recorder<S> {
    pub fn new(engine: CaptureEngine<S>) -> Self {
        Self {
            engine,
            stored: Vec::new(),
        }
    }

    pub fn with_scheduler(scheduler: S, settings: CaptureSettings) -> Self {
        Self::new(CaptureEngine::new(CaptureSession::new(), scheduler, settings))
    }

    pub fn engine(&self) -> &CaptureEngine<S> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut CaptureEngine<S> {
        &mut self.engine
    }

    pub fn recording_state(&self) -> RecordingState {
        self.engine.recording_state()
    }

    pub fn is_recording(&self) -> bool {
        self.engine.is_recording()
    }

    pub fn start(&mut self) {
        self.engine.start_recording();
    }

    /// Stops recording and stores the consolidated actions. Returns the stored copy.
    pub fn stop(&mut self) -> Vec<Action> {
        self.engine.stop_recording();
        self.stored = self.engine.recorded_actions();
        info!("Stored {} actions", self.stored.len());
        self.stored.clone()
    }

    pub fn handle_event(&mut self, event: &DomEvent) {
        self.engine.handle_event(event);
    }

    pub fn on_timer_fired(&mut self, handle: TimerHandle) {
        self.engine.on_timer_fired(handle);
    }

    /// Consolidated view of the live log.
    pub fn recorded_actions(&mut self) -> Vec<Action> {
        self.engine.recorded_actions()
    }

    pub fn stored_actions(&self) -> Vec<Action> {
        self.stored.clone()
    }

    pub fn store_actions(&mut self, actions: Vec<Action>) {
        self.stored = actions;
    }

    /// Drops both the stored copy and the live log.
    pub fn clear(&mut self) {
        self.stored.clear();
        self.engine.clear_log();
        info!("Cleared actions");
    }

    pub fn handle_request(&mut self, request: ControlRequest) -> ControlResponse {
        debug!("Received {} request", request.name());
        match request {
            ControlRequest::SetRecordingState { is_recording } => {
                if is_recording {
                    self.start();
                } else {
                    self.stop();
                }
                ControlResponse::ok()
            }
            ControlRequest::GetRecordingState => ControlResponse::State {
                is_recording: self.is_recording(),
            },
            ControlRequest::StoreActions { actions } => {
                self.store_actions(actions);
                ControlResponse::ok()
            }
            ControlRequest::GetRecordedActions => ControlResponse::Actions {
                actions: self.stored_actions(),
            },
            ControlRequest::DownloadActions => {
                if self.stored.is_empty() {
                    return ControlResponse::error("No actions to download");
                }
                match actions_to_json(&self.stored) {
                    Ok(payload) => ControlResponse::Download {
                        success: true,
                        filename: EXPORT_FILENAME.to_string(),
                        payload,
                    },
                    Err(e) => ControlResponse::error(e.to_string()),
                }
            }
            ControlRequest::ClearActions => {
                self.clear();
                ControlResponse::ok()
            }
        }
    }

    /// Handles a raw JSON message; unknown message types get an error response.
    pub fn handle_message(&mut self, message: &str) -> ControlResponse {
        match serde_json::from_str::<ControlRequest>(message) {
            Ok(request) => self.handle_request(request),
            Err(e) => {
                debug!("Rejected message {}: {}", message, e);
                ControlResponse::unknown_type()
            }
        }
    }

    /// Writes the stored actions to `sink`, stopping the recording first if needed.
    pub async fn download<K: ExportSink + ?Sized>(
        &mut self,
        sink: &mut K,
    ) -> Result<ExportOutcome, ExportError> {
        if self.is_recording() {
            self.stop();
        }
        export_actions(&self.stored, sink).await
    }

    /// Copies readable steps for the stored actions, stopping the recording first if needed.
    pub async fn copy_text<K: ExportSink + ?Sized>(
        &mut self,
        sink: &mut K,
        sensitive_fields: &[String],
    ) -> Result<ExportOutcome, ExportError> {
        if self.is_recording() {
            self.stop();
        }
        copy_readable_steps(&self.stored, sink, sensitive_fields).await
    }
}

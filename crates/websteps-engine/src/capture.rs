//! Event capture and input debouncing.
//!
//! The engine turns raw interaction signals into entries of the session's
//! [`ActionLog`]. Clicks are appended unless an identical click is among the
//! most recent entries. Field edits are tracked per selector by a
//! [`PendingInput`] record so that a burst of keystrokes leaves a single
//! tentative Input action holding the latest value; re-editing a field moves
//! its entry to the end of the log.

use crate::config::schema::RecorderConfig;
use crate::consolidate::consolidate;
use crate::scheduler::{Scheduler, TimerHandle};
use crate::selector;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};
use websteps_common::action::{Action, ActionLog};
use websteps_common::element::{DomElement, DomEvent};

pub const DEFAULT_COMMIT_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_DEDUP_WINDOW: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSettings {
    /// Quiet period after the last keystroke before an edit counts as settled.
    pub commit_delay: Duration,
    /// Number of trailing log entries scanned for duplicate clicks.
    pub dedup_window: usize,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            commit_delay: DEFAULT_COMMIT_DELAY,
            dedup_window: DEFAULT_DEDUP_WINDOW,
        }
    }
}

impl From<&RecorderConfig> for CaptureSettings {
    fn from(config: &RecorderConfig) -> Self {
        Self {
            commit_delay: Duration::from_millis(config.commit_delay_ms),
            dedup_window: config.dedup_window,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingState {
    #[default]
    Off,
    On,
}

impl RecordingState {
    pub fn is_on(self) -> bool {
        self == RecordingState::On
    }
}

/// Recording flag plus the action log it guards.
///
/// Created before the engine and handed to it; only explicit start, stop and
/// clear calls change it.
#[derive(Debug, Clone, Default)]
pub struct CaptureSession {
    state: RecordingState,
    log: ActionLog,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(log: ActionLog) -> Self {
        Self {
            state: RecordingState::Off,
            log,
        }
    }
}

/// Edit-tracking state for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingInput {
    /// Field value when tracking began.
    pub initial_value: String,
    /// Running settle timer, if the last keystroke has not settled yet.
    pub pending_commit: Option<TimerHandle>,
    /// Position of this field's tentative Input action in the log.
    pub log_index: Option<usize>,
}

impl PendingInput {
    fn new(initial_value: String) -> Self {
        Self {
            initial_value,
            pending_commit: None,
            log_index: None,
        }
    }
}

fn is_field_tag(tag: &str) -> bool {
    matches!(tag, "input" | "textarea" | "select")
}

fn is_text_entry_tag(tag: &str) -> bool {
    matches!(tag, "input" | "textarea")
}

pub struct CaptureEngine<S: Scheduler> {
    session: CaptureSession,
    scheduler: S,
    settings: CaptureSettings,
    pending: HashMap<String, PendingInput>,
}

impl<S: Scheduler> CaptureEngine<S> {
    pub fn new(session: CaptureSession, scheduler: S, settings: CaptureSettings) -> Self {
        Self {
            session,
            scheduler,
            settings,
            pending: HashMap::new(),
        }
    }

    pub fn log(&self) -> &ActionLog {
        &self.session.log
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn pending(&self, selector: &str) -> Option<&PendingInput> {
        self.pending.get(selector)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn recording_state(&self) -> RecordingState {
        self.session.state
    }

    pub fn is_recording(&self) -> bool {
        self.session.state.is_on()
    }

    pub fn start_recording(&mut self) {
        self.session.state = RecordingState::On;
        info!("Recording started");
    }

    /// Turns recording off, cancelling every settle timer and dropping all
    /// edit-tracking records. Tentative entries already in the log stay.
    pub fn stop_recording(&mut self) {
        self.session.state = RecordingState::Off;
        self.cancel_all_timers();
        self.pending.clear();
        info!("Recording stopped ({} actions in log)", self.session.log.len());
    }

    /// Empties the action log. Tracking records survive but lose their log entries.
    pub fn clear_log(&mut self) {
        self.session.log.clear();
        for record in self.pending.values_mut() {
            record.log_index = None;
        }
    }

    pub fn handle_event(&mut self, event: &DomEvent) {
        match event {
            DomEvent::Click { target } => self.handle_click(target),
            DomEvent::Focus { target } => self.handle_focus(target),
            DomEvent::Blur { target } => self.handle_blur(target),
            DomEvent::Input { target } => self.handle_input(target),
            DomEvent::Submit { .. } => self.handle_submit(),
        }
    }

    pub fn handle_click<E: DomElement + ?Sized>(&mut self, element: &E) {
        if !self.is_recording() {
            return;
        }

        let text = element
            .inner_text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        let action = Action::click(selector::resolve(element), text);

        if self.is_duplicate_click(&action) {
            debug!("Skipping duplicate click action on {}", action.selector);
            return;
        }

        info!("Recorded click action on {}", action.selector);
        self.session.log.push(action);
    }

    pub fn handle_focus<E: DomElement + ?Sized>(&mut self, element: &E) {
        if !self.is_recording() || !is_field_tag(&element.tag_name()) {
            return;
        }

        let selector = selector::resolve(element);
        let value = element.value().unwrap_or_default();
        self.pending
            .entry(selector)
            .or_insert_with(|| PendingInput::new(value.to_string()));
    }

    pub fn handle_input<E: DomElement + ?Sized>(&mut self, element: &E) {
        if !self.is_recording() || !is_text_entry_tag(&element.tag_name()) {
            return;
        }

        let selector = selector::resolve(element);
        let value = element.value().unwrap_or_default().to_string();

        let (changed, previous) = {
            let record = self
                .pending
                .entry(selector.clone())
                .or_insert_with(|| PendingInput::new(value.clone()));
            if let Some(handle) = record.pending_commit.take() {
                self.scheduler.cancel(handle);
            }
            (value != record.initial_value, record.log_index.take())
        };

        // A value typed back to its initial state withdraws the tentative entry.
        if let Some(index) = previous {
            self.withdraw(index);
        }
        if !changed {
            return;
        }

        let index = self.session.log.push(Action::input(selector.clone(), value));
        let handle = self.scheduler.schedule(self.settings.commit_delay);
        if let Some(record) = self.pending.get_mut(&selector) {
            record.log_index = Some(index);
            record.pending_commit = Some(handle);
        }
    }

    pub fn handle_blur<E: DomElement + ?Sized>(&mut self, element: &E) {
        if !self.is_recording() || !is_field_tag(&element.tag_name()) {
            return;
        }

        let selector = selector::resolve(element);
        let Some(mut record) = self.pending.remove(&selector) else {
            return;
        };

        if let Some(handle) = record.pending_commit.take() {
            self.scheduler.cancel(handle);
        }
        // An unchanged value keeps any tentative entry already in the log.
        let value = element.value().unwrap_or_default();
        if value != record.initial_value {
            if let Some(index) = record.log_index.take() {
                self.withdraw(index);
            }
            let action = Action::input(selector, value);
            info!("Finalized input action on blur: {}", action.selector);
            self.session.log.push(action);
        }
    }

    /// Cancels running settle timers ahead of navigation. Records and log are untouched.
    pub fn handle_submit(&mut self) {
        if !self.is_recording() {
            return;
        }

        for (selector, record) in self.pending.iter_mut() {
            if let Some(handle) = record.pending_commit.take() {
                self.scheduler.cancel(handle);
                debug!("Cleared timeout for {} due to form submission", selector);
            }
        }
    }

    /// Marks the edit owning `handle` as settled. Stale handles are ignored.
    pub fn on_timer_fired(&mut self, handle: TimerHandle) {
        if let Some((selector, record)) = self
            .pending
            .iter_mut()
            .find(|(_, r)| r.pending_commit == Some(handle))
        {
            record.pending_commit = None;
            debug!("Input on {} settled", selector);
        }
    }

    /// Consolidated copy of the log. Cancels outstanding settle timers first.
    pub fn recorded_actions(&mut self) -> Vec<Action> {
        self.cancel_all_timers();
        consolidate(self.session.log.as_slice())
    }

    fn cancel_all_timers(&mut self) {
        for record in self.pending.values_mut() {
            if let Some(handle) = record.pending_commit.take() {
                self.scheduler.cancel(handle);
            }
        }
    }

    fn is_duplicate_click(&self, action: &Action) -> bool {
        self.session
            .log
            .recent(self.settings.dedup_window)
            .iter()
            .any(|a| a.kind == action.kind && a.selector == action.selector)
    }

    /// Removes the entry at `index` and shifts the indices other records hold past it.
    fn withdraw(&mut self, index: usize) {
        if self.session.log.remove(index).is_none() {
            return;
        }
        for record in self.pending.values_mut() {
            if let Some(i) = record.log_index.as_mut()
                && *i > index
            {
                *i -= 1;
            }
        }
    }
}

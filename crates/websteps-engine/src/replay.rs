//! Drives a [`Recorder`] from a JSON Lines session script.
//!
//! Each non-blank line that does not start with `#` is one of:
//! - a control message: `{"type": "setRecordingState", "isRecording": true}`
//! - a DOM event: `{"event": "input", "target": {"tag": "input", "id": "q", "value": "a"}}`
//! - a pause: `{"wait_ms": 1200}`

use crate::capture::CaptureSettings;
use crate::recorder::Recorder;
use crate::scheduler::{ManualScheduler, TokioScheduler};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;
use websteps_common::element::DomEvent;
use websteps_common::protocol::ControlRequest;

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("Line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Pause {
    pub wait_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ScriptLine {
    Control(ControlRequest),
    Dom(DomEvent),
    Wait(Pause),
}

/// Parses one script line. Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_line(raw: &str, line: usize) -> Result<Option<ScriptLine>, ReplayError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|source| ReplayError::Parse { line, source })
}

/// Replays a script against a virtual clock. Pauses advance the clock and
/// deliver whichever settle timers expired.
pub fn replay_script(
    content: &str,
    settings: CaptureSettings,
) -> Result<Recorder<ManualScheduler>, ReplayError> {
    let mut recorder = Recorder::with_scheduler(ManualScheduler::new(), settings);

    for (i, raw) in content.lines().enumerate() {
        let Some(entry) = parse_line(raw, i + 1)? else {
            continue;
        };
        match entry {
            ScriptLine::Control(request) => {
                recorder.handle_request(request);
            }
            ScriptLine::Dom(event) => recorder.handle_event(&event),
            ScriptLine::Wait(pause) => {
                let fired = recorder
                    .engine_mut()
                    .scheduler_mut()
                    .advance(Duration::from_millis(pause.wait_ms));
                for handle in fired {
                    recorder.on_timer_fired(handle);
                }
            }
        }
    }

    Ok(recorder)
}

pub async fn replay_file(
    path: &Path,
    settings: CaptureSettings,
) -> Result<Recorder<ManualScheduler>, ReplayError> {
    let content = tokio::fs::read_to_string(path).await?;
    replay_script(&content, settings)
}

/// Feeds lines from `reader` into a recorder running on real timers until EOF.
///
/// Settle timers that fire while waiting for input are delivered as they arrive.
pub async fn run_live<R: AsyncBufRead + Unpin>(
    reader: R,
    settings: CaptureSettings,
) -> Result<Recorder<TokioScheduler>, ReplayError> {
    let (scheduler, mut fired) = TokioScheduler::new();
    let mut recorder = Recorder::with_scheduler(scheduler, settings);
    let mut lines = reader.lines();
    let mut line_no = 0;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(raw) = line? else {
                    break;
                };
                line_no += 1;
                match parse_line(&raw, line_no)? {
                    Some(ScriptLine::Control(request)) => {
                        let response = recorder.handle_request(request);
                        debug!("Control response: {:?}", response);
                    }
                    Some(ScriptLine::Dom(event)) => recorder.handle_event(&event),
                    Some(ScriptLine::Wait(pause)) => {
                        tokio::time::sleep(Duration::from_millis(pause.wait_ms)).await;
                        while let Ok(handle) = fired.try_recv() {
                            recorder.on_timer_fired(handle);
                        }
                    }
                    None => {}
                }
            }
            Some(handle) = fired.recv() => recorder.on_timer_fired(handle),
        }
    }

    Ok(recorder)
}

//! Control messages exchanged between the recorder and the panel that drives it.
//!
//! Field names follow the camelCase convention of the browser-side callers.

use crate::action::Action;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ControlRequest {
    #[serde(rename_all = "camelCase")]
    SetRecordingState { is_recording: bool },
    GetRecordingState,
    StoreActions { actions: Vec<Action> },
    GetRecordedActions,
    DownloadActions,
    ClearActions,
}

impl ControlRequest {
    pub fn name(&self) -> &'static str {
        match self {
            ControlRequest::SetRecordingState { .. } => "setRecordingState",
            ControlRequest::GetRecordingState => "getRecordingState",
            ControlRequest::StoreActions { .. } => "storeActions",
            ControlRequest::GetRecordedActions => "getRecordedActions",
            ControlRequest::DownloadActions => "downloadActions",
            ControlRequest::ClearActions => "clearActions",
        }
    }
}

/// Variant order matters for untagged deserialization: more specific shapes first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlResponse {
    Error {
        error: String,
    },
    #[serde(rename_all = "camelCase")]
    State {
        is_recording: bool,
    },
    Actions {
        actions: Vec<Action>,
    },
    Download {
        success: bool,
        filename: String,
        payload: String,
    },
    Success {
        success: bool,
    },
}

impl ControlResponse {
    pub fn ok() -> Self {
        ControlResponse::Success { success: true }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ControlResponse::Error {
            error: message.into(),
        }
    }

    pub fn unknown_type() -> Self {
        Self::error("Unknown message type")
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ControlResponse::Error { .. })
    }
}

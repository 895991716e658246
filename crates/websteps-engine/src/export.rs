//! Export of recorded actions to files and clipboard-style text sinks.

use crate::formatter::actions_to_readable_text;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use websteps_common::action::Action;

pub const EXPORT_FILENAME: &str = "recorded-actions.json";
pub const STEPS_FILENAME: &str = "steps.txt";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// What an export call produced. An empty action list is a normal outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Exported { target: String, bytes: usize },
    NoActions,
}

impl ExportOutcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, ExportOutcome::NoActions)
    }
}

/// Destination for exported payloads.
#[async_trait]
pub trait ExportSink: Send {
    /// Stores `payload` as a downloadable file called `filename`.
    async fn save_file(&mut self, filename: &str, payload: &[u8]) -> Result<String, ExportError>;

    /// Places `text` where the user can paste it.
    async fn copy_text(&mut self, text: &str) -> Result<String, ExportError>;
}

/// Pretty-printed JSON document of the actions, two-space indented.
pub fn actions_to_json(actions: &[Action]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(actions)
}

pub async fn export_actions<K: ExportSink + ?Sized>(
    actions: &[Action],
    sink: &mut K,
) -> Result<ExportOutcome, ExportError> {
    if actions.is_empty() {
        return Ok(ExportOutcome::NoActions);
    }

    let json = actions_to_json(actions)?;
    let target = sink.save_file(EXPORT_FILENAME, json.as_bytes()).await?;
    info!("Exported {} actions to {}", actions.len(), target);
    Ok(ExportOutcome::Exported {
        target,
        bytes: json.len(),
    })
}

pub async fn copy_readable_steps<K: ExportSink + ?Sized>(
    actions: &[Action],
    sink: &mut K,
    sensitive_fields: &[String],
) -> Result<ExportOutcome, ExportError> {
    if actions.is_empty() {
        return Ok(ExportOutcome::NoActions);
    }

    let text = actions_to_readable_text(actions, sensitive_fields);
    let target = sink.copy_text(&text).await?;
    info!("Steps copied to {}", target);
    Ok(ExportOutcome::Exported {
        target,
        bytes: text.len(),
    })
}

/// Writes exports into a directory. Copied text lands in `steps.txt`.
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn write(&self, filename: &str, payload: &[u8]) -> Result<String, ExportError> {
        if !self.dir.exists() {
            tokio::fs::create_dir_all(&self.dir).await?;
        }
        let path = self.dir.join(filename);
        tokio::fs::write(&path, payload).await?;
        Ok(path.display().to_string())
    }
}

#[async_trait]
impl ExportSink for DirectorySink {
    async fn save_file(&mut self, filename: &str, payload: &[u8]) -> Result<String, ExportError> {
        self.write(filename, payload).await
    }

    async fn copy_text(&mut self, text: &str) -> Result<String, ExportError> {
        self.write(STEPS_FILENAME, text.as_bytes()).await
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryContents {
    pub files: Vec<(String, Vec<u8>)>,
    pub clipboard: Option<String>,
}

/// Keeps exports in memory; clones share the same contents.
#[derive(Clone, Default)]
pub struct MemorySink {
    contents: Arc<Mutex<MemoryContents>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contents(&self) -> MemoryContents {
        self.contents.lock().await.clone()
    }
}

#[async_trait]
impl ExportSink for MemorySink {
    async fn save_file(&mut self, filename: &str, payload: &[u8]) -> Result<String, ExportError> {
        let mut contents = self.contents.lock().await;
        contents.files.push((filename.to_string(), payload.to_vec()));
        Ok(format!("memory:{}", filename))
    }

    async fn copy_text(&mut self, text: &str) -> Result<String, ExportError> {
        self.contents.lock().await.clipboard = Some(text.to_string());
        Ok("memory:clipboard".to_string())
    }
}

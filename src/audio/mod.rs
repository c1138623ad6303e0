#[cfg(test)]
mod tests;

use async_trait::async_trait;
use log::{ debug, info };
use std::path::PathBuf;
use uuid::Uuid;

use crate::error::ChatError;

/// Identifies one recording between `start` and `stop`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingHandle {
    pub id: Uuid,
    pub source: PathBuf,
}

/// Microphone-style capture. The returned bytes are opaque to the session;
/// they are only base64-encoded and shipped.
#[async_trait]
pub trait AudioCapture: Send + Sync {
    async fn start(&self) -> Result<RecordingHandle, ChatError>;

    async fn stop(&self, handle: RecordingHandle) -> Result<Vec<u8>, ChatError>;
}

/// Uses an existing audio file as the "recording". The terminal client has no
/// microphone pipeline, so a clip on disk is what the user records with.
pub struct FileCapture {
    path: PathBuf,
}

impl FileCapture {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AudioCapture for FileCapture {
    async fn start(&self) -> Result<RecordingHandle, ChatError> {
        let meta = tokio::fs::metadata(&self.path).await
            .map_err(|e| ChatError::Capture(format!("{}: {}", self.path.display(), e)))?;
        if !meta.is_file() {
            return Err(ChatError::Capture(format!("{} is not a file", self.path.display())));
        }
        let handle = RecordingHandle {
            id: Uuid::new_v4(),
            source: self.path.clone(),
        };
        debug!("Recording {} started from {}", handle.id, handle.source.display());
        Ok(handle)
    }

    async fn stop(&self, handle: RecordingHandle) -> Result<Vec<u8>, ChatError> {
        let bytes = tokio::fs::read(&handle.source).await
            .map_err(|e| ChatError::Capture(format!("{}: {}", handle.source.display(), e)))?;
        info!("Recording {} stopped: {} bytes", handle.id, bytes.len());
        Ok(bytes)
    }
}

/// Runs a full start/stop cycle.
pub async fn record(capture: &dyn AudioCapture) -> Result<Vec<u8>, ChatError> {
    let handle = capture.start().await?;
    capture.stop(handle).await
}
